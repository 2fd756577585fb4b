use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::{check_amount, parse_amount, parse_date, Category, CategoryId, TransactionId};
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub category_id: CategoryId,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub note: String,
    /// Creation instant in epoch milliseconds. Record-keeping only.
    #[serde(default)]
    pub timestamp: i64,
}

impl Transaction {
    pub fn new(id: TransactionId, draft: TransactionDraft, timestamp: i64) -> Self {
        Self {
            id,
            category_id: draft.category_id,
            amount: draft.amount,
            date: draft.date,
            note: draft.note,
            timestamp,
        }
    }

    pub fn has_note(&self) -> bool {
        !self.note.trim().is_empty()
    }

    /// Replace every user-editable field. `id` and `timestamp` are kept.
    pub fn apply(&mut self, draft: TransactionDraft) {
        self.category_id = draft.category_id;
        self.amount = draft.amount;
        self.date = draft.date;
        self.note = draft.note;
    }
}

/// User-supplied transaction fields, checked against the live categories and
/// the current date before anything is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub category_id: CategoryId,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub note: String,
}

impl TransactionDraft {
    pub fn new(
        category_id: CategoryId,
        amount: Decimal,
        date: NaiveDate,
        note: &str,
    ) -> Result<Self, ValidationError> {
        check_amount(amount)?;
        Ok(Self {
            category_id,
            amount,
            date,
            note: note.trim().to_string(),
        })
    }

    /// Parse raw form input. `category` may be a category name or id.
    pub fn parse(
        categories: &[Category],
        category: &str,
        amount: &str,
        date: &str,
        note: &str,
    ) -> Result<Self, ValidationError> {
        let category_id = Category::resolve(categories, category)
            .map(|c| c.id)
            .ok_or_else(|| ValidationError::UnknownCategory(category.trim().to_string()))?;
        let amount = parse_amount(amount)?;
        let date = parse_date(date)?;
        Self::new(category_id, amount, date, note)
    }

    pub fn validate(&self, categories: &[Category], today: NaiveDate) -> Result<(), ValidationError> {
        if Category::find_by_id(categories, self.category_id).is_none() {
            return Err(ValidationError::UnknownCategory(self.category_id.to_string()));
        }
        check_amount(self.amount)?;
        if self.date > today {
            return Err(ValidationError::FutureDate(self.date));
        }
        Ok(())
    }
}

fn empty_if_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
