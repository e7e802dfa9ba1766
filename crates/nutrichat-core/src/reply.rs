//! Normalization of backend replies
//!
//! The backend has shipped several payload shapes over time, so the answer
//! text is looked up in a fixed order of fields and anything unrecognized is
//! shown as a JSON dump rather than treated as an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields checked for the answer text, first match wins.
pub const REPLY_FIELDS: [&str; 5] = ["response", "answer", "message", "content", "result"];

/// A menu item with its nutrition facts, as the backend describes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(rename = "nama_menu")]
    pub name: String,
    #[serde(rename = "kategori", default)]
    pub category: String,
    #[serde(rename = "Kalori", default)]
    pub calories: f64,
    #[serde(rename = "Gula", default)]
    pub sugar: f64,
    #[serde(rename = "Garam", default)]
    pub salt: f64,
    #[serde(rename = "Lemak", default)]
    pub fat: f64,
}

impl MenuItem {
    /// One-line nutrition facts, e.g. `550 kkal · gula 9 g · garam 1010 mg · lemak 30 g`.
    pub fn nutrition_summary(&self) -> String {
        format!(
            "{} kkal · gula {} g · garam {} mg · lemak {} g",
            format_amount(self.calories),
            format_amount(self.sugar),
            format_amount(self.salt),
            format_amount(self.fat)
        )
    }
}

fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// A normalized answer from the backend
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reply {
    pub content: String,
    pub menu_items: Vec<MenuItem>,
}

impl Reply {
    pub fn from_value(value: &Value) -> Self {
        Self {
            content: reply_text(value),
            menu_items: menu_items(value),
        }
    }
}

/// Pick the answer text out of a backend payload.
pub fn reply_text(value: &Value) -> String {
    if let Value::String(text) = value {
        return text.clone();
    }

    REPLY_FIELDS
        .iter()
        .find_map(|field| value.get(field).filter(|found| is_truthy(found)))
        .map(render_value)
        .unwrap_or_else(|| pretty_dump(value))
}

/// Menu items attached under `relevant_items`; entries that don't look like
/// menu items are skipped.
pub fn menu_items(value: &Value) -> Vec<MenuItem> {
    value
        .get("relevant_items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => pretty_dump(other),
    }
}

/// Two-space indented JSON, keys in the order the backend sent them.
pub fn pretty_dump(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
