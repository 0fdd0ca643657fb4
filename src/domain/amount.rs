use std::fmt;

/// Format an amount with two decimal places.
/// Example: 15.0 -> "15.00", -1.234 -> "-1.23"
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

/// Parse a typed amount. Either '.' or ',' is accepted as decimal separator.
/// Example: "12.5" -> 12.5, "12,5" -> 12.5, "-3" -> -3.0
pub fn parse_amount(input: &str) -> Result<f64, ParseAmountError> {
    let normalized = input.trim().replace(',', ".");
    if normalized.is_empty() {
        return Err(ParseAmountError::InvalidFormat);
    }

    let value: f64 = normalized
        .parse()
        .map_err(|_| ParseAmountError::InvalidFormat)?;

    if !value.is_finite() {
        return Err(ParseAmountError::NotFinite);
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    InvalidFormat,
    NotFinite,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::InvalidFormat => write!(f, "not a numeric value"),
            ParseAmountError::NotFinite => write!(f, "value must be a finite number"),
        }
    }
}

impl std::error::Error for ParseAmountError {}
