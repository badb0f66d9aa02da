use serde::Deserialize;

use crate::{
    auth::auth_method::AuthMethod,
    core::{
        types::Dictionary,
        uri::Uri,
    },
};

/// A single configured authentication method for a realm, in offer order.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthMethodConfig {
    pub method: AuthMethod,
    #[serde(default)]
    pub config: Dictionary,
}

/// A realm's authentication policy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Methods offered to joining peers, in preference order.
    #[serde(default)]
    pub methods: Vec<AuthMethodConfig>,
    /// Role assigned to anonymous sessions.
    #[serde(default = "default_anonymous_role")]
    pub anonymous_role: String,
    /// Whether anonymous authentication is implicitly allowed when no method is configured.
    #[serde(default)]
    pub allow_anonymous_by_default: bool,
}

fn default_anonymous_role() -> String {
    "anonymous".to_owned()
}

/// Stats policy for a realm, matching the semantics of [`crate::router::meta::StatsTracker`].
#[derive(Debug, Clone, Deserialize)]
pub struct StatsConfig {
    /// Byte size a message is rated against; must be positive and even.
    #[serde(default = "default_rated_message_size")]
    pub rated_message_size: u32,
    /// Emit a stats record after this many rated messages. Zero disables the trigger.
    #[serde(default)]
    pub trigger_after_rated_messages: u64,
    /// Emit a stats record after this many seconds have elapsed. Zero disables the trigger.
    #[serde(default)]
    pub trigger_after_duration: u64,
    /// Emit a stats record immediately on WELCOME.
    #[serde(default)]
    pub trigger_on_join: bool,
    /// Emit a final stats record on session close.
    #[serde(default = "default_true")]
    pub trigger_on_leave: bool,
}

fn default_rated_message_size() -> u32 {
    512
}

fn default_true() -> bool {
    true
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            rated_message_size: default_rated_message_size(),
            trigger_after_rated_messages: 0,
            trigger_after_duration: 0,
            trigger_on_join: false,
            trigger_on_leave: true,
        }
    }
}

impl StatsConfig {
    /// Validates that at least one emission trigger is configured.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.trigger_after_rated_messages == 0 && self.trigger_after_duration == 0 {
            return Err(anyhow::Error::msg(
                "stats config must set trigger_after_rated_messages or trigger_after_duration",
            ));
        }
        if self.rated_message_size == 0 || self.rated_message_size % 2 != 0 {
            return Err(anyhow::Error::msg(
                "rated_message_size must be a positive even integer",
            ));
        }
        Ok(())
    }
}

/// Configuration for a single realm.
#[derive(Debug, Clone, Deserialize)]
pub struct RealmConfig {
    pub name: String,
    pub uri: Uri,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub stats: Option<StatsConfig>,
}

/// Top-level router configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouterConfig {
    #[serde(default)]
    pub realms: Vec<RealmConfig>,
    /// Agent string reported in WELCOME details.
    #[serde(default = "default_agent")]
    pub agent: String,
    /// Stamped into `authextra.x_cb_node` on every WELCOME.
    pub node_id: String,
    /// Stamped into `authextra.x_cb_worker` on every WELCOME.
    pub worker_id: String,
}

fn default_agent() -> String {
    env!("CARGO_PKG_NAME").to_owned()
}

#[cfg(test)]
mod config_test {
    use super::*;

    #[test]
    fn stats_config_requires_a_trigger() {
        let config = StatsConfig {
            trigger_after_rated_messages: 0,
            trigger_after_duration: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn stats_config_rejects_odd_rated_message_size() {
        let config = StatsConfig {
            rated_message_size: 513,
            trigger_after_duration: 30,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn stats_config_accepts_a_single_trigger() {
        let config = StatsConfig {
            trigger_after_rated_messages: 100,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
