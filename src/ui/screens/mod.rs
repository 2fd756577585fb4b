pub(crate) mod categories;
pub(crate) mod transactions;
pub(crate) mod transfer;
pub(crate) mod trends;
