//! Scene configuration.
//!
//! ```ignore
//! let config = SceneConfig::default()
//!     .with_error_policy(ErrorPolicy::Isolate)
//!     .with_entity_capacity(4096);
//!
//! // or from a data file
//! let config = SceneConfig::from_json(r#"{ "error_policy": "isolate" }"#)?;
//! ```

use serde::{Deserialize, Serialize};

/// What a tick does when a system returns an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop the tick at the failing system and return its error.
    #[default]
    Abort,
    /// Record the failure in the tick report and keep running the rest.
    Isolate,
}

/// Settings for one [`Scene`](crate::scene::Scene).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub error_policy: ErrorPolicy,
    /// Entity slots to reserve up front.
    pub entity_capacity: usize,
}

impl SceneConfig {
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.entity_capacity = capacity;
        self
    }

    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_abort() {
        let config = SceneConfig::default();
        assert_eq!(config.error_policy, ErrorPolicy::Abort);
        assert_eq!(config.entity_capacity, 0);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = SceneConfig::from_json(r#"{ "error_policy": "isolate" }"#).unwrap();
        assert_eq!(config.error_policy, ErrorPolicy::Isolate);
        assert_eq!(config.entity_capacity, 0);
    }

    #[test]
    fn unknown_policy_is_an_error() {
        assert!(SceneConfig::from_json(r#"{ "error_policy": "retry" }"#).is_err());
    }

    #[test]
    fn json_round_trip() {
        let config = SceneConfig::default().with_entity_capacity(64);
        let text = config.to_json().unwrap();
        assert_eq!(SceneConfig::from_json(&text).unwrap(), config);
    }
}
