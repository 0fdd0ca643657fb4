use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid amount '{0}': please enter a valid numeric value")]
    InvalidAmount(String),

    #[error("Unsupported ledger format: {0} (use .xlsx or .csv)")]
    UnsupportedFormat(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}
