mod aggregate;
mod filter;
mod period;

pub(crate) use aggregate::{group_by_period, Aggregation};
pub(crate) use filter::{
    filter_transactions, list_transactions, CategoryFilter, NoteQuery, TransactionFilter,
    Timeframe,
};
pub(crate) use period::Granularity;
