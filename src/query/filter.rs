use chrono::{Days, Months, NaiveDate};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::models::{CategoryId, Transaction};

/// The timeframe selector: a trailing window measured back from today, the
/// whole history, or an explicit range supplied alongside the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) enum Timeframe {
    Last7Days,
    #[default]
    Last30Days,
    Last3Months,
    Last6Months,
    LastYear,
    AllTime,
    Custom,
}

impl Timeframe {
    pub(crate) fn all() -> &'static [Timeframe] {
        &[
            Self::Last7Days,
            Self::Last30Days,
            Self::Last3Months,
            Self::Last6Months,
            Self::LastYear,
            Self::AllTime,
            Self::Custom,
        ]
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Last7Days => "7days",
            Self::Last30Days => "30days",
            Self::Last3Months => "3months",
            Self::Last6Months => "6months",
            Self::LastYear => "1year",
            Self::AllTime => "all",
            Self::Custom => "custom",
        }
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Self::Last7Days => "Last 7 days",
            Self::Last30Days => "Last 30 days",
            Self::Last3Months => "Last 3 months",
            Self::Last6Months => "Last 6 months",
            Self::LastYear => "Last year",
            Self::AllTime => "All time",
            Self::Custom => "Custom range",
        }
    }

    /// Earliest date included by a relative window, `None` when unbounded.
    /// Custom ranges are resolved separately through [`DateRange`].
    pub(crate) fn window_start(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Last7Days => today.checked_sub_days(Days::new(7)),
            Self::Last30Days => today.checked_sub_days(Days::new(30)),
            Self::Last3Months => today.checked_sub_months(Months::new(3)),
            Self::Last6Months => today.checked_sub_months(Months::new(6)),
            Self::LastYear => today.checked_sub_months(Months::new(12)),
            Self::AllTime | Self::Custom => None,
        }
    }

    /// Cycle through the relative windows; `Custom` is only entered explicitly.
    pub(crate) fn next_relative(&self) -> Self {
        match self {
            Self::Last7Days => Self::Last30Days,
            Self::Last30Days => Self::Last3Months,
            Self::Last3Months => Self::Last6Months,
            Self::Last6Months => Self::LastYear,
            Self::LastYear => Self::AllTime,
            Self::AllTime | Self::Custom => Self::Last7Days,
        }
    }
}

impl FromStr for Timeframe {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "7days" | "7d" | "week" => Ok(Self::Last7Days),
            "30days" | "30d" => Ok(Self::Last30Days),
            "3months" | "3m" => Ok(Self::Last3Months),
            "6months" | "6m" => Ok(Self::Last6Months),
            "1year" | "1y" | "year" => Ok(Self::LastYear),
            "all" | "alltime" | "all-time" => Ok(Self::AllTime),
            "custom" => Ok(Self::Custom),
            other => Err(ValidationError::UnknownTimeframe(other.to_string())),
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// An inclusive calendar range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub(crate) fn new(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, ValidationError> {
        let (Some(start), Some(end)) = (start, end) else {
            return Err(ValidationError::IncompleteRange);
        };
        if start > end {
            return Err(ValidationError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub(crate) fn start(&self) -> NaiveDate {
        self.start
    }

    pub(crate) fn end(&self) -> NaiveDate {
        self.end
    }

    pub(crate) fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum CategoryFilter {
    #[default]
    All,
    Only(CategoryId),
}

impl CategoryFilter {
    pub(crate) fn matches(&self, txn: &Transaction) -> bool {
        match self {
            Self::All => true,
            Self::Only(id) => txn.category_id == *id,
        }
    }
}

/// Case-insensitive substring search over transaction notes.
///
/// The query only starts filtering once it reaches `min_chars` characters;
/// shorter (or empty) queries match everything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct NoteQuery {
    needle: String,
    min_chars: usize,
}

impl NoteQuery {
    pub(crate) fn new(text: &str, min_chars: usize) -> Self {
        Self {
            needle: text.trim().to_lowercase(),
            min_chars,
        }
    }

    pub(crate) fn text(&self) -> &str {
        &self.needle
    }

    pub(crate) fn is_active(&self) -> bool {
        !self.needle.is_empty() && self.needle.chars().count() >= self.min_chars
    }

    pub(crate) fn matches(&self, note: &str) -> bool {
        !self.is_active() || note.to_lowercase().contains(&self.needle)
    }
}

/// Every predicate the trends view can apply. All active predicates must hold.
#[derive(Debug, Clone, Default)]
pub(crate) struct TransactionFilter {
    pub(crate) category: CategoryFilter,
    pub(crate) note: NoteQuery,
    pub(crate) timeframe: Timeframe,
    pub(crate) custom_start: Option<NaiveDate>,
    pub(crate) custom_end: Option<NaiveDate>,
}

/// Date predicate after the selector has been checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateWindow {
    Unbounded,
    Since(NaiveDate),
    Between(DateRange),
}

impl DateWindow {
    fn contains(&self, date: NaiveDate) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Since(start) => date >= *start,
            Self::Between(range) => range.contains(date),
        }
    }
}

impl TransactionFilter {
    pub(crate) fn custom_range(&self) -> Result<DateRange, ValidationError> {
        DateRange::new(self.custom_start, self.custom_end)
    }

    fn window(&self, today: NaiveDate) -> Result<DateWindow, ValidationError> {
        if self.timeframe == Timeframe::Custom {
            return self.custom_range().map(DateWindow::Between);
        }
        Ok(self
            .timeframe
            .window_start(today)
            .map_or(DateWindow::Unbounded, DateWindow::Since))
    }

    /// Check the selector without filtering anything.
    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if self.timeframe == Timeframe::Custom {
            self.custom_range()?;
        }
        Ok(())
    }
}

/// Apply `filter` to `transactions`, keeping their order.
///
/// A custom timeframe with a missing or inverted range is rejected before any
/// transaction is examined.
pub(crate) fn filter_transactions<'a>(
    transactions: &'a [Transaction],
    filter: &TransactionFilter,
    today: NaiveDate,
) -> Result<Vec<&'a Transaction>, ValidationError> {
    let window = filter.window(today)?;
    Ok(transactions
        .iter()
        .filter(|t| filter.category.matches(t))
        .filter(|t| filter.note.matches(&t.note))
        .filter(|t| window.contains(t.date))
        .collect())
}

/// The transaction list view: category and note predicates only, newest first.
pub(crate) fn list_transactions<'a>(
    transactions: &'a [Transaction],
    category: CategoryFilter,
    note: &NoteQuery,
) -> Vec<&'a Transaction> {
    let mut listed: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| category.matches(t))
        .filter(|t| note.matches(&t.note))
        .collect();
    listed.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
    listed
}
