use crate::store::id_text;

use bson::{Bson, DateTime, Document};
use serde_json::{Map, Value};
use std::any::Any;
use time::format_description::well_known::Rfc3339;

/// JSON form of a stored document: `_id` becomes a string `id`, datetimes become
/// ISO-8601 text, everything else is passed through as relaxed extended JSON.
pub fn document_to_json(mut document: Document) -> Value {
    let id = document.remove("_id");
    let mut out = Map::new();
    for (key, value) in document {
        let value = match value {
            Bson::DateTime(dt) => Value::String(iso8601(dt)),
            other => other.into_relaxed_extjson(),
        };
        out.insert(key, value);
    }
    if let Some(id) = id {
        out.insert("id".to_string(), Value::String(id_text(&id)));
    }
    Value::Object(out)
}

pub fn iso8601(dt: DateTime) -> String {
    dt.to_time_0_3()
        .format(&Rfc3339)
        .unwrap_or_else(|_| dt.timestamp_millis().to_string())
}

/// First `max` characters of `text`.
pub fn clip(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Message carried by a caught panic.
pub fn panic_text(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panicked".to_string()
    }
}
