use serde_json::{Map, Value};

use crate::records::timestamp;
use crate::store::Document;
use crate::types::fields;

/// Decoded continuation token: the sort key(s) of the last item on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// Default ordering, newest first
    Timestamp(String),
    /// Search ordering: search field value, then creation time
    Keyed { key: String, created_at: String },
}

impl Cursor {
    /// Cursor positioned on `doc` for the given mode (`Some(field)` while searching)
    pub fn from_document(doc: &Document, search_field: Option<&str>) -> Option<Self> {
        let created_at = doc.text(fields::CREATED_AT)?;
        match search_field {
            None => Some(Cursor::Timestamp(created_at)),
            Some(field) => Some(Cursor::Keyed { key: doc.text(field)?, created_at }),
        }
    }

    /// Opaque token text. Keyed cursors become `{"<field>": key, "createdAt": ts}`.
    pub fn encode(&self, search_field: &str) -> String {
        match self {
            Cursor::Timestamp(created_at) => created_at.clone(),
            Cursor::Keyed { key, created_at } => {
                let mut pair = Map::new();
                pair.insert(search_field.to_string(), Value::String(key.clone()));
                pair.insert(fields::CREATED_AT.to_string(), Value::String(created_at.clone()));
                Value::Object(pair).to_string()
            }
        }
    }

    /// Parse a client-supplied token for the given mode; `None` means "ignore it"
    pub fn decode(token: &str, search_field: Option<&str>) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        match search_field {
            None => timestamp::normalize(token).map(Cursor::Timestamp),
            Some(field) => {
                let value: Value = serde_json::from_str(token).ok()?;
                let key = value.get(field)?.as_str()?.to_string();
                let created_at = timestamp::normalize(value.get(fields::CREATED_AT)?.as_str()?)?;
                if key.is_empty() {
                    return None;
                }
                Some(Cursor::Keyed { key, created_at })
            }
        }
    }

    /// Values for [`crate::store::Query::start_after`], in ordering order
    pub fn into_values(self) -> Vec<String> {
        match self {
            Cursor::Timestamp(created_at) => vec![created_at],
            Cursor::Keyed { key, created_at } => vec![key, created_at],
        }
    }
}
