//! Planner configuration with documented defaults
//!
//! Values come from three layers, later layers winning:
//! built-in defaults, an optional TOML file, then environment variables.
//! A TOML file is checked with [`PlannerConfig::validate`]; environment
//! values that fail to parse or fall out of range are logged and skipped.

use crate::core::error::{PlannerError, Result};
use serde::Deserialize;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default chat-completion endpoint
pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model identifier sent with every request
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat";

/// Fixed upper bound on a single oracle round-trip
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.0..=2.0;
const TOP_P_RANGE: RangeInclusive<f32> = 0.0..=1.0;

/// Which action vocabulary the action prompt exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ActionStyle {
    /// `GotoLocation <object_id>` navigation plus manipulation actions
    #[default]
    Goto,
    /// Raw locomotion (`MoveAhead`, `RotateRight`, ...) plus manipulation actions
    Primitive,
}

impl FromStr for ActionStyle {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "goto" | "navigation" => Ok(Self::Goto),
            "primitive" | "movement" => Ok(Self::Primitive),
            other => Err(PlannerError::Config(format!("unknown action style: {}", other))),
        }
    }
}

/// Connection and sampling settings for the completion oracle
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Bearer credential. `None` puts every batch straight into fallback.
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,

    // === SAMPLING ===
    /// Moderate randomness; plans stay close to the prompt's worked example
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.into(),
            model: DEFAULT_MODEL.into(),
            temperature: 0.5,
            max_tokens: 2048,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl OracleConfig {
    /// True when a non-blank credential is present
    pub fn has_credential(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Top-level configuration for one planner invocation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub oracle: OracleConfig,
    /// JSON file mapping object type to safety rules. May be absent.
    pub safety_rules_path: PathBuf,
    pub action_style: ActionStyle,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            oracle: OracleConfig::default(),
            safety_rules_path: PathBuf::from("safety_rules.json"),
            action_style: ActionStyle::Goto,
        }
    }
}

impl PlannerConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a TOML config file. Missing keys keep their defaults.
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse a config from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PlannerError::Config(e.to_string()))
    }

    /// Overlay environment values onto this config
    ///
    /// `lookup` abstracts `std::env::var` so overrides can be tested without
    /// touching the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("OPENROUTER_API_KEY").or_else(|| get("API_KEY")) {
            self.oracle.api_key = Some(key);
        }
        if let Some(url) = get("OPENROUTER_URL") {
            self.oracle.api_url = url;
        }
        if let Some(model) = get("OPENROUTER_MODEL") {
            self.oracle.model = model;
        }

        override_checked(
            &mut self.oracle.temperature,
            "OPENROUTER_TEMPERATURE",
            &get,
            |t| TEMPERATURE_RANGE.contains(t),
        );
        override_checked(
            &mut self.oracle.max_tokens,
            "OPENROUTER_MAX_TOKENS",
            &get,
            |n| *n > 0,
        );
        override_checked(&mut self.oracle.top_p, "OPENROUTER_TOP_P", &get, |p| {
            TOP_P_RANGE.contains(p)
        });
        override_parsed(
            &mut self.oracle.frequency_penalty,
            "OPENROUTER_FREQUENCY_PENALTY",
            &get,
        );
        override_parsed(
            &mut self.oracle.presence_penalty,
            "OPENROUTER_PRESENCE_PENALTY",
            &get,
        );

        if let Some(path) = get("SAFETY_RULES_PATH") {
            self.safety_rules_path = PathBuf::from(path);
        }
        override_parsed(&mut self.action_style, "PLANNER_ACTION_STYLE", &get);
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let oracle = &self.oracle;

        if !TEMPERATURE_RANGE.contains(&oracle.temperature) {
            return Err(PlannerError::Config(format!(
                "temperature ({}) must be within 0.0..=2.0",
                oracle.temperature
            )));
        }

        if !TOP_P_RANGE.contains(&oracle.top_p) {
            return Err(PlannerError::Config(format!(
                "top_p ({}) must be within 0.0..=1.0",
                oracle.top_p
            )));
        }

        if oracle.max_tokens == 0 {
            return Err(PlannerError::Config("max_tokens must be positive".into()));
        }

        if oracle.request_timeout_secs == 0 {
            return Err(PlannerError::Config(
                "request_timeout_secs must be positive".into(),
            ));
        }

        Ok(())
    }
}

/// Replace `slot` with the parsed env value, keeping the old value on parse failure
fn override_parsed<T, G>(slot: &mut T, key: &str, get: &G)
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    override_checked(slot, key, get, |_| true);
}

/// Like [`override_parsed`], but a parsed value outside `accept` is also ignored.
///
/// Environment overrides never fail a batch; a bad value is logged and the
/// previous (default or file) value stays in effect.
fn override_checked<T, G, A>(slot: &mut T, key: &str, get: &G, accept: A)
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
    A: Fn(&T) -> bool,
{
    let Some(raw) = get(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if accept(&value) => *slot = value,
        Ok(_) => tracing::warn!("Ignoring out-of-range {}={:?}", key, raw),
        Err(_) => tracing::warn!("Ignoring unparseable {}={:?}", key, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert!(config.oracle.api_key.is_none());
        assert_eq!(config.oracle.model, DEFAULT_MODEL);
        assert_eq!(config.oracle.request_timeout_secs, 60);
        assert_eq!(config.action_style, ActionStyle::Goto);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_key_fallback_variable() {
        let mut config = PlannerConfig::default();
        config.apply_env(env_of(&[("API_KEY", "secret")]));
        assert_eq!(config.oracle.api_key.as_deref(), Some("secret"));

        let mut config = PlannerConfig::default();
        config.apply_env(env_of(&[("OPENROUTER_API_KEY", "primary"), ("API_KEY", "secondary")]));
        assert_eq!(config.oracle.api_key.as_deref(), Some("primary"));
    }

    #[test]
    fn test_blank_key_is_not_a_credential() {
        let mut config = PlannerConfig::default();
        config.apply_env(env_of(&[("OPENROUTER_API_KEY", "   ")]));
        assert!(!config.oracle.has_credential());
    }

    #[test]
    fn test_sampling_overrides() {
        let mut config = PlannerConfig::default();
        config.apply_env(env_of(&[
            ("OPENROUTER_TEMPERATURE", "0.2"),
            ("OPENROUTER_MAX_TOKENS", "512"),
            ("OPENROUTER_TOP_P", "bogus"),
            ("PLANNER_ACTION_STYLE", "primitive"),
        ]));
        assert!((config.oracle.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.oracle.max_tokens, 512);
        // Unparseable values keep the default
        assert!((config.oracle.top_p - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.action_style, ActionStyle::Primitive);
    }

    #[test]
    fn test_out_of_range_env_values_are_ignored() {
        let mut config = PlannerConfig::default();
        config.apply_env(env_of(&[
            ("OPENROUTER_TEMPERATURE", "5"),
            ("OPENROUTER_TOP_P", "-0.5"),
            ("OPENROUTER_MAX_TOKENS", "0"),
        ]));
        assert!((config.oracle.temperature - 0.5).abs() < f32::EPSILON);
        assert!((config.oracle.top_p - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.oracle.max_tokens, 2048);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_env_keeps_file_value() {
        let mut config = PlannerConfig::parse_toml("[oracle]\ntemperature = 0.1\n").unwrap();
        config.apply_env(env_of(&[("OPENROUTER_TEMPERATURE", "2.5")]));
        assert!((config.oracle.temperature - 0.1).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml_partial() {
        let config = PlannerConfig::parse_toml(
            r#"
            safety_rules_path = "rules/safety.json"
            action_style = "primitive"

            [oracle]
            model = "test-model"
            temperature = 0.1
            "#,
        )
        .unwrap();
        assert_eq!(config.oracle.model, "test-model");
        assert_eq!(config.oracle.api_url, DEFAULT_API_URL);
        assert_eq!(config.safety_rules_path, PathBuf::from("rules/safety.json"));
        assert_eq!(config.action_style, ActionStyle::Primitive);
    }

    #[test]
    fn test_parse_toml_invalid() {
        let result = PlannerConfig::parse_toml("oracle = 3");
        assert!(matches!(result, Err(PlannerError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_sampling() {
        let mut config = PlannerConfig::default();
        config.oracle.temperature = 3.0;
        assert!(config.validate().is_err());

        let mut config = PlannerConfig::default();
        config.oracle.max_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_action_style_from_str() {
        assert_eq!("GOTO".parse::<ActionStyle>().unwrap(), ActionStyle::Goto);
        assert_eq!("primitive".parse::<ActionStyle>().unwrap(), ActionStyle::Primitive);
        assert!("teleport".parse::<ActionStyle>().is_err());
    }
}
