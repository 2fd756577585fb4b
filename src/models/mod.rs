mod category;
mod id;
mod transaction;

pub use category::{random_color, Category, CategoryDraft, PALETTE, UNKNOWN_CATEGORY};
pub(crate) use id::next_id;
pub use id::{CategoryId, TransactionId};
pub use transaction::{Transaction, TransactionDraft};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ValidationError;

/// Largest amount or budget a record may carry (10^15). Sums of any
/// realistic number of records stay far inside `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Parse a strictly positive amount. Accepts a leading `$` and thousands separators.
pub fn parse_amount(s: &str) -> Result<Decimal, ValidationError> {
    let cleaned = s.trim().replace(['$', ','], "");
    let amount = Decimal::from_str(&cleaned)
        .map_err(|_| ValidationError::InvalidAmount(s.trim().to_string()))?;
    check_amount(amount)
}

/// Accept `amount` only when it lies in `(0, MAX_AMOUNT]`.
pub fn check_amount(amount: Decimal) -> Result<Decimal, ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount);
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge);
    }
    Ok(amount)
}

/// Sum amounts, saturating at `Decimal::MAX` rather than overflowing.
pub fn sum_amounts(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Parse an ISO `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = s.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))
}
