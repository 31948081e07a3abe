use serde_json::Value;

use crate::errors::{RankError, RankResult};

/// A game as described by an import payload, before it is merged into the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportEntry {
    pub appid: String,
    pub title: String,
    pub image_url: Option<String>,
}

/// Parsed import payload. `received` counts every item in the payload,
/// including the ones skipped for lacking an appid.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportBatch {
    pub received: usize,
    pub entries: Vec<ImportEntry>,
}

impl From<Vec<ImportEntry>> for ImportBatch {
    fn from(entries: Vec<ImportEntry>) -> Self {
        Self {
            received: entries.len(),
            entries,
        }
    }
}

/// Accepts either a list of entries or an appid-keyed object (the export format).
/// In the keyed form the key is the appid unless the value carries its own.
///
/// Entries without a usable appid are skipped.
pub fn parse_import_entries(body: &Value) -> RankResult<ImportBatch> {
    let items: Vec<(Option<&str>, &Value)> = match body {
        Value::Array(items) => items.iter().map(|item| (None, item)).collect(),
        Value::Object(map) => map.iter().map(|(key, item)| (Some(key.as_str()), item)).collect(),
        _ => {
            return Err(RankError::InvalidImport(
                "expected a list of games".to_string(),
            ));
        }
    };

    Ok(ImportBatch {
        received: items.len(),
        entries: items
            .into_iter()
            .filter_map(|(key, item)| parse_entry(key, item))
            .collect(),
    })
}

fn parse_entry(key: Option<&str>, item: &Value) -> Option<ImportEntry> {
    let appid = first_id(item, &["appid", "id"]).or_else(|| {
        key.map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
    })?;
    let title = first_str(item, &["title", "name"]).unwrap_or_else(|| "Untitled".to_string());
    let image_url = first_str(item, &["image_url"]);

    Some(ImportEntry {
        appid,
        title,
        image_url,
    })
}

fn first_id(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| item.get(*key))
        .find_map(id_to_string)
}

fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_str(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| item.get(*key))
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
