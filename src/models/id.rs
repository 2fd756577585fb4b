use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

use crate::error::ValidationError;

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .filter(|id| *id > 0)
                    .map(Self)
                    .ok_or_else(|| ValidationError::InvalidId(trimmed.to_string()))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(CategoryId);
entity_id!(TransactionId);

/// Pick a creation-time id that no existing record uses.
///
/// Ids start from the millisecond timestamp and are bumped past the current
/// maximum so records created within the same millisecond stay distinct.
/// When the maximum is already `i64::MAX` the lowest unused positive id is
/// taken instead.
pub(crate) fn next_id(now_millis: i64, existing: impl Iterator<Item = i64>) -> i64 {
    let existing: Vec<i64> = existing.collect();
    let max = existing.iter().copied().max().unwrap_or(0);
    match max.checked_add(1) {
        Some(above) => now_millis.max(above).max(1),
        None => {
            let taken: HashSet<i64> = existing.into_iter().collect();
            (1..i64::MAX).find(|id| !taken.contains(id)).unwrap_or(1)
        }
    }
}
