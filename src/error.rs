use chrono::NaiveDate;
use thiserror::Error;

/// Rejections raised at the input boundary. The `Display` text is shown to
/// the user as-is, and nothing is mutated when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Category name must not be empty")]
    EmptyName,
    #[error("Invalid amount '{0}': enter a positive number")]
    InvalidAmount(String),
    #[error("Budget must be greater than zero")]
    NonPositiveBudget,
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,
    #[error("Amount must not exceed $1,000,000,000,000,000")]
    AmountTooLarge,
    #[error("Invalid date '{0}': use YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Date {0} is in the future")]
    FutureDate(NaiveDate),
    #[error("Invalid id '{0}'")]
    InvalidId(String),
    #[error("Category '{0}' not found")]
    UnknownCategory(String),
    #[error("Transaction {0} not found")]
    UnknownTransaction(String),
    #[error("Please select both start and end dates")]
    IncompleteRange,
    #[error("Start date {start} must not be after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
    #[error("Unknown grouping '{0}': use day, week, month or year")]
    UnknownGranularity(String),
    #[error("Unknown timeframe '{0}': use 7days, 30days, 3months, 6months, 1year, all or custom")]
    UnknownTimeframe(String),
}

/// Failures while reading an import file. The import is abandoned without
/// touching the current data.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Failed to parse file: not valid JSON ({0}) and no CATEGORIES/TRANSACTIONS sections")]
    Unrecognized(String),
    #[error("Invalid file format. No data found.")]
    NoData,
    #[error("Invalid data: {0}")]
    Malformed(String),
    #[error("Line {line}: {reason}")]
    Row { line: usize, reason: String },
    #[error("No backup found. Create a backup first.")]
    NoBackup,
}
