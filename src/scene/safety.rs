//! Safety rules keyed by object type
//!
//! The rule file is a JSON object mapping an object type name to a list of
//! rule strings. A missing file is not an error: the table is simply empty.

use crate::core::error::Result;
use crate::core::types::ObjectRecord;
use ahash::{AHashMap, AHashSet};
use std::collections::BTreeSet;
use std::path::Path;

/// Reported when no rule applies to the scene
pub const NO_SAFETY_CONSTRAINTS: &str = "No safety constraints.";

/// Static object-type -> rules table
#[derive(Debug, Clone, Default)]
pub struct SafetyRuleTable {
    rules: AHashMap<String, Vec<String>>,
}

impl SafetyRuleTable {
    /// An empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a table from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: AHashMap<String, Vec<String>> = serde_json::from_str(json)?;
        Ok(Self { rules })
    }

    /// Load a table from disk. A missing file yields an empty table.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No safety rule file at {}", path.display());
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Like [`SafetyRuleTable::load`], but an unreadable or malformed file
    /// is logged and treated as empty.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(table) => {
                tracing::info!(
                    "Loaded safety rules for {} object types",
                    table.rules.len()
                );
                table
            }
            Err(e) => {
                tracing::warn!("Ignoring safety rule file {}: {}", path.display(), e);
                Self::new()
            }
        }
    }

    /// Add rules for an object type
    pub fn insert(&mut self, object_type: impl Into<String>, rules: Vec<String>) {
        self.rules.insert(object_type.into(), rules);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Sorted, deduplicated rules for every object type in the scene
    pub fn rules_for(&self, objects: &[ObjectRecord]) -> Vec<&str> {
        let mut seen_types = AHashSet::new();
        let mut rules = BTreeSet::new();

        for obj in objects {
            let object_type = obj.object_type();
            if !seen_types.insert(object_type) {
                continue;
            }
            if let Some(type_rules) = self.rules.get(object_type) {
                rules.extend(type_rules.iter().map(String::as_str));
            }
        }

        rules.into_iter().collect()
    }

    /// Bullet list of applicable rules, or [`NO_SAFETY_CONSTRAINTS`]
    pub fn constraints_for(&self, objects: &[ObjectRecord]) -> String {
        let rules = self.rules_for(objects);
        if rules.is_empty() {
            return NO_SAFETY_CONSTRAINTS.to_string();
        }
        rules
            .iter()
            .map(|rule| format!("- {}", rule))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
