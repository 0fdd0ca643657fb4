use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::application::{AppError, LedgerService, PeriodTotal};
use crate::domain::{LEDGER_DATE_FORMAT, format_amount};
use crate::io::save_charts;
use crate::storage::DEFAULT_SHEET;

/// Tally - Daily Savings Tracker
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Record a daily saved value and see monthly and weekly totals")]
#[command(version)]
pub struct Cli {
    /// Ledger file path (.xlsx or .csv)
    #[arg(short, long, default_value = "daily_values.xlsx")]
    pub ledger: String,

    /// Sheet holding the ledger inside an .xlsx workbook
    #[arg(short, long, default_value = DEFAULT_SHEET)]
    pub sheet: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the ledger file (or sheet) if it does not exist
    Init,

    /// Save a value for today
    Save {
        /// Amount saved (e.g., "12.50" or "12,50")
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Date of the value (YYYY-MM-DD or DD-MM-YYYY, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show the running total
    Total,

    /// List saved values
    List {
        /// Only show the most recent entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show totals per period
    #[command(subcommand)]
    Report(ReportCommands),

    /// Render the monthly bar chart and weekly pie chart to an SVG file
    Chart {
        /// Output file
        #[arg(short, long, default_value = "charts.svg")]
        output: String,
    },

    /// Report ledger rows that could not be read
    Check,
}

/// Output format of a period series
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Output format of the summary, which has no single-table CSV form
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Totals per calendar month
    Monthly {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Totals per ISO week
    Weekly {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Running total with both monthly and weekly series
    Summary {
        /// Output format
        #[arg(long, value_enum, default_value_t = SummaryFormat::Table)]
        format: SummaryFormat,
    },
}

impl Cli {
    fn init_tracing(&self) {
        let directive = if self.verbose {
            "tally=debug"
        } else {
            "tally=warn"
        };
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(directive))
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .try_init();
    }

    pub fn run(self) -> Result<()> {
        self.init_tracing();

        let mut service = LedgerService::open(&self.ledger, &self.sheet)?;

        match self.command {
            Commands::Init => {
                println!(
                    "Ledger ready: {} ({} entries)",
                    service.ledger_path().display(),
                    service.records().len()
                );
            }

            Commands::Save { amount, date } => {
                let date = match date {
                    Some(date_str) => Some(parse_date(&date_str)?),
                    None => None,
                };

                let result = match date {
                    Some(date) => service.save_value(&amount, date),
                    None => service.save_value_today(&amount),
                };

                match result {
                    Ok(record) => {
                        println!(
                            "Value saved: {} on {}",
                            format_amount(record.amount),
                            record.display_date()
                        );
                        println!("Total saved: {}", format_amount(service.total()));
                    }
                    Err(AppError::InvalidAmount(input)) => {
                        println!("Please enter a valid numeric value");
                        anyhow::bail!("Invalid amount: '{}'", input);
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            Commands::Total => {
                println!("Total saved: {}", format_amount(service.total()));
            }

            Commands::List { limit } => {
                run_list_command(&service, limit);
            }

            Commands::Report(report_cmd) => {
                run_report_command(&service, report_cmd)?;
            }

            Commands::Chart { output } => {
                let summary = service.summary();
                save_charts(&output, &summary)?;
                if summary.is_empty() {
                    println!("No data to display charts.");
                }
                println!("Charts written to {}", output);
            }

            Commands::Check => {
                run_check_command(&service);
            }
        }

        Ok(())
    }
}

fn run_list_command(service: &LedgerService, limit: Option<usize>) {
    let records = service.records();
    if records.is_empty() {
        println!("No values saved yet.");
        return;
    }

    let skip = limit.map_or(0, |n| records.len().saturating_sub(n));
    println!("{:<12} {:>12}", "DATE", "VALUE");
    println!("{}", "-".repeat(25));
    for record in &records[skip..] {
        println!(
            "{:<12} {:>12}",
            record.display_date(),
            format_amount(record.amount)
        );
    }
}

fn run_report_command(service: &LedgerService, cmd: ReportCommands) -> Result<()> {
    match cmd {
        ReportCommands::Monthly { format } => {
            print_series("Savings per Month", "MONTH", &service.monthly_report(), format)?;
        }

        ReportCommands::Weekly { format } => {
            print_series("Savings per Week", "WEEK", &service.weekly_report(), format)?;
        }

        ReportCommands::Summary { format } => {
            let report = service.summary();
            match format {
                SummaryFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                SummaryFormat::Table => {
                    if report.is_empty() {
                        println!("No data to display.");
                        return Ok(());
                    }
                    println!("Total saved: {}", format_amount(report.total));
                    println!("Entries:     {}", report.record_count);
                    println!();
                    print_table("MONTH", &report.monthly);
                    println!();
                    print_table("WEEK", &report.weekly);
                }
            }
        }
    }

    Ok(())
}

fn print_series(title: &str, column: &str, series: &[PeriodTotal], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(series)?);
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(["period", "total"])?;
            for point in series {
                writer.write_record([point.label.clone(), point.total.to_string()])?;
            }
            writer.flush()?;
        }
        OutputFormat::Table => {
            if series.is_empty() {
                println!("No data to display.");
                return Ok(());
            }
            println!("{}", title);
            println!();
            print_table(column, series);
        }
    }
    Ok(())
}

fn print_table(column: &str, series: &[PeriodTotal]) {
    println!("{:<20} {:>12}", column, "TOTAL");
    println!("{}", "-".repeat(33));
    for point in series {
        println!("{:<20} {:>12}", point.label, format_amount(point.total));
    }
}

fn run_check_command(service: &LedgerService) {
    let skipped = service.skipped_rows();

    println!("Ledger: {}", service.ledger_path().display());
    println!("  Entries loaded: {}", service.records().len());
    println!("  Rows skipped:   {}", skipped.len());

    if skipped.is_empty() {
        println!("\nAll rows are readable.");
    } else {
        println!("\nSkipped rows:");
        for entry in skipped {
            println!("  Row {}: {}", entry.row, entry.reason);
        }
    }
}

/// Parse a date given on the command line, as YYYY-MM-DD or DD-MM-YYYY.
fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_str, LEDGER_DATE_FORMAT))
        .with_context(|| format!("Invalid date '{}'. Use YYYY-MM-DD or DD-MM-YYYY", date_str))
}
