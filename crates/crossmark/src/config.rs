//! Coordinator configuration.

use crossmark_game::Rules;
use crossmark_lobby::LobbyConfig;
use serde::{Deserialize, Serialize};

use crate::RetryPolicy;

/// Settings for a [`Coordinator`](crate::Coordinator).
///
/// Usually assembled through
/// [`Coordinator::builder()`](crate::Coordinator::builder).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Game rules. Every host sharing a store must use the same ones.
    pub rules: Rules,

    /// Matchmaking settings.
    pub lobby: LobbyConfig,

    /// Backoff for the reads the coordinator makes on its own (cache
    /// seeding, resync). Submissions are never retried automatically.
    pub retry: RetryPolicy,

    /// Re-read a whole collection when its subscription falls behind.
    /// With this off the cache only catches up on the next change to
    /// each record.
    pub cache_resync_on_lag: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            rules: Rules::default(),
            lobby: LobbyConfig::default(),
            retry: RetryPolicy::default(),
            cache_resync_on_lag: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_resyncs_on_lag_without_ready_gate() {
        let config = CoordinatorConfig::default();
        assert!(config.cache_resync_on_lag);
        assert!(!config.rules.require_ready);
    }

    #[test]
    fn test_deserialize_overrides_only_given_fields() {
        let config: CoordinatorConfig =
            serde_json::from_str(r#"{"rules":{"require_ready":true}}"#).unwrap();
        assert!(config.rules.require_ready);
        assert!(config.cache_resync_on_lag);
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn test_deserialize_empty_rules_object_uses_default_rules() {
        let config: CoordinatorConfig = serde_json::from_str(r#"{"rules":{}}"#).unwrap();
        assert_eq!(config.rules, Rules::default());
    }
}
