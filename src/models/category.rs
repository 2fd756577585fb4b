use rand::seq::SliceRandom;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{check_amount, parse_amount, CategoryId};
use crate::error::ValidationError;

/// Label used wherever a transaction points at a category that no longer exists.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

pub const PALETTE: [&str; 12] = [
    "#667eea", "#764ba2", "#f093fb", "#f5576c", "#4facfe", "#00f2fe", "#43e97b", "#38f9d7",
    "#fa709a", "#fee140", "#30cfd0", "#330867",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub budget: Decimal,
    #[serde(default)]
    pub color: String,
}

impl Category {
    pub fn new(id: CategoryId, draft: CategoryDraft) -> Self {
        Self {
            id,
            name: draft.name,
            budget: draft.budget,
            color: random_color().to_string(),
        }
    }

    /// Find a category by name (case-insensitive) in a slice.
    pub fn find_by_name<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
        let lower = name.trim().to_lowercase();
        categories.iter().find(|c| c.name.to_lowercase() == lower)
    }

    /// Find a category by ID in a slice.
    pub fn find_by_id(categories: &[Category], id: CategoryId) -> Option<&Category> {
        categories.iter().find(|c| c.id == id)
    }

    /// Resolve a user reference: an exact name match first, then a numeric id.
    pub fn resolve<'a>(categories: &'a [Category], reference: &str) -> Option<&'a Category> {
        Self::find_by_name(categories, reference).or_else(|| {
            reference
                .parse::<CategoryId>()
                .ok()
                .and_then(|id| Self::find_by_id(categories, id))
        })
    }

    /// Display name for `id`, or [`UNKNOWN_CATEGORY`] when it cannot be found.
    pub fn name_or_unknown(categories: &[Category], id: CategoryId) -> &str {
        Self::find_by_id(categories, id)
            .map(|c| c.name.as_str())
            .unwrap_or(UNKNOWN_CATEGORY)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A validated name/budget pair, ready to become a [`Category`].
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDraft {
    pub name: String,
    pub budget: Decimal,
}

impl CategoryDraft {
    pub fn new(name: &str, budget: Decimal) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let budget = check_amount(budget).map_err(|e| match e {
            ValidationError::NonPositiveAmount => ValidationError::NonPositiveBudget,
            other => other,
        })?;
        Ok(Self {
            name: name.to_string(),
            budget,
        })
    }

    pub fn parse(name: &str, budget: &str) -> Result<Self, ValidationError> {
        let budget = parse_amount(budget).map_err(|e| match e {
            ValidationError::NonPositiveAmount => ValidationError::NonPositiveBudget,
            other => other,
        })?;
        Self::new(name, budget)
    }
}

pub fn random_color() -> &'static str {
    PALETTE
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(PALETTE[0])
}
