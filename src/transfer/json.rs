use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ImportData;
use crate::error::TransferError;
use crate::models::{Category, Transaction};
use crate::store::{Snapshot, FORMAT_VERSION};

pub(crate) const APP_NAME: &str = "Budget Tracker";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportMetadata<'a> {
    export_date: DateTime<Utc>,
    version: &'a str,
    app: &'a str,
}

#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    metadata: ExportMetadata<'a>,
    categories: &'a [Category],
    transactions: &'a [Transaction],
}

/// Anything with `categories` and/or `transactions` arrays: exports, full
/// backups, or a hand-written file. Other fields are ignored.
#[derive(Debug, Deserialize)]
struct ImportDocument {
    #[serde(default)]
    categories: Option<Vec<Category>>,
    #[serde(default)]
    transactions: Option<Vec<Transaction>>,
}

pub(crate) fn export_json(snapshot: Snapshot<'_>, now: DateTime<Utc>) -> serde_json::Result<String> {
    let doc = ExportDocument {
        metadata: ExportMetadata {
            export_date: now,
            version: FORMAT_VERSION,
            app: APP_NAME,
        },
        categories: snapshot.categories,
        transactions: snapshot.transactions,
    };
    serde_json::to_string_pretty(&doc)
}

/// `Ok(None)` when `text` is not JSON at all, so the caller can try CSV.
pub(crate) fn parse_json(text: &str) -> Result<Option<ImportData>, TransferError> {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => return Ok(None),
    };
    if !value.is_object() {
        return Err(TransferError::NoData);
    }
    let doc: ImportDocument =
        serde_json::from_value(value).map_err(|e| TransferError::Malformed(e.to_string()))?;
    if doc.categories.is_none() && doc.transactions.is_none() {
        return Err(TransferError::NoData);
    }
    Ok(Some(ImportData {
        categories: doc.categories.unwrap_or_default(),
        transactions: doc.transactions.unwrap_or_default(),
    }))
}
