//! Inbound message decoding

use crate::core::types::Trial;
use serde_json::Value;

/// What an inbound text message asks for
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// `{"trials": [...]}`: plan each trial
    Plan(Vec<Trial>),
    /// Anything else, kept verbatim
    Opaque(String),
}

impl InboundMessage {
    /// Decode a message body
    ///
    /// Only a JSON mapping whose `trials` value is a list counts as a plan
    /// request. Entries of that list that are not mappings are dropped.
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => match map.get("trials") {
                Some(Value::Array(entries)) => {
                    Self::Plan(entries.iter().filter_map(Trial::from_value).collect())
                }
                _ => Self::Opaque(text.to_string()),
            },
            _ => Self::Opaque(text.to_string()),
        }
    }
}
