//! Turn oracle text into subgoals and normalized action records
//!
//! Nothing here fails: unusable text yields an empty list, and the caller
//! decides what an empty list means.

use crate::core::types::{ActionRecord, JsonMap};
use crate::llm::extract::{extract_json, extract_json_array};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Ordered subgoals from `{"subgoals": [...]}`
///
/// The list is taken as given: string entries verbatim, any other entry as
/// its JSON text. Anything else yields an empty list.
pub fn parse_subgoals(text: &str) -> Vec<String> {
    let Some(json) = extract_json(text) else {
        return Vec::new();
    };

    match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(map)) => match map.get("subgoals") {
            Some(Value::Array(items)) => items.iter().map(subgoal_text).collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn subgoal_text(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A strategy for locating the action list in oracle text
type ActionSource = fn(&str) -> Option<Vec<Value>>;

/// Tried in order; the first to produce a list wins
const ACTION_SOURCES: &[ActionSource] = &[whole_document, delimited_array, bracketed_array];

/// Raw action entries, before normalization
pub fn locate_actions(text: &str) -> Option<Vec<Value>> {
    ACTION_SOURCES.iter().find_map(|source| source(text))
}

/// Normalized actions in execution order. Empty when nothing usable is found.
pub fn parse_actions(text: &str) -> Vec<ActionRecord> {
    locate_actions(text)
        .map(|items| items.iter().filter_map(normalize_action).collect())
        .unwrap_or_default()
}

/// The whole reply is JSON: a bare list, or a mapping holding one under
/// `actions` (preferred) or `plan`
fn whole_document(text: &str) -> Option<Vec<Value>> {
    match serde_json::from_str::<Value>(text.trim()).ok()? {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => ["actions", "plan"]
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            }),
        _ => None,
    }
}

/// A `[`...`]` span, inside a fence when there is one
fn delimited_array(text: &str) -> Option<Vec<Value>> {
    parse_list(extract_json_array(text)?)
}

/// Greedy multi-line `[`...`]` match over the raw reply
fn bracketed_array(text: &str) -> Option<Vec<Value>> {
    static ARRAY: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = ARRAY.get_or_init(|| Regex::new(r"(?s)\[.*\]").ok()).as_ref()?;
    parse_list(pattern.find(text)?.as_str())
}

fn parse_list(json: &str) -> Option<Vec<Value>> {
    match serde_json::from_str::<Value>(json).ok()? {
        Value::Array(items) => Some(items),
        _ => None,
    }
}

/// Canonicalize one oracle action entry
///
/// The action name may arrive as `action` or `Action`; it is always emitted
/// first under `action`. Other fields pass through, and the camelCase id
/// fields are aliased to `object_id` / `receptacle_id` when those are absent.
pub fn normalize_action(item: &Value) -> Option<ActionRecord> {
    let fields = item.as_object()?;

    let action = ["action", "Action"]
        .iter()
        .filter_map(|key| fields.get(*key).and_then(Value::as_str))
        .find(|name| !name.trim().is_empty())?;

    let mut normalized = JsonMap::new();
    normalized.insert("action".into(), Value::String(action.to_string()));
    for (key, value) in fields {
        if key != "action" {
            normalized.insert(key.clone(), value.clone());
        }
    }

    alias_field(&mut normalized, "object_id", "objectId");
    alias_field(&mut normalized, "receptacle_id", "receptacleObjectId");

    ActionRecord::from_map(normalized)
}

fn alias_field(fields: &mut JsonMap, canonical: &str, alternate: &str) {
    if fields.contains_key(canonical) {
        return;
    }
    if let Some(value) = fields.get(alternate).cloned() {
        fields.insert(canonical.to_string(), value);
    }
}
