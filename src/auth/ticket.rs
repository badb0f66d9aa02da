use anyhow::Result;
use async_trait::async_trait;

use crate::{
    auth::{
        auth_method::AuthMethod,
        identity::Identity,
        pending::{
            AuthOutcome,
            PendingAuth,
        },
    },
    core::{
        hash::HashMap,
        types::Dictionary,
        uri::Uri,
    },
};

/// Per-realm configuration for ticket authentication.
#[derive(Debug, Clone, Default)]
pub struct TicketConfig {
    /// Map from authid to the ticket (shared secret) that identity must present.
    pub tickets: HashMap<String, String>,
    /// The role assigned on successful authentication.
    pub role: String,
}

/// Challenges once, then compares the client's ticket against the configured secret.
pub struct TicketAuth {
    config: TicketConfig,
    authid: String,
}

impl TicketAuth {
    pub fn new(config: TicketConfig) -> Self {
        Self {
            config,
            authid: String::new(),
        }
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[async_trait]
impl PendingAuth for TicketAuth {
    fn method(&self) -> AuthMethod {
        AuthMethod::Ticket
    }

    async fn hello(&mut self, _realm: &Uri, details: &Dictionary) -> Result<AuthOutcome> {
        self.authid = details
            .get("authid")
            .and_then(|value| value.string().cloned())
            .unwrap_or_default();
        Ok(AuthOutcome::Challenge {
            extra: Dictionary::default(),
        })
    }

    async fn authenticate(&mut self, signature: &str, _extra: &Dictionary) -> Result<AuthOutcome> {
        match self.config.tickets.get(&self.authid) {
            Some(expected) if constant_time_eq(expected, signature) => Ok(AuthOutcome::Accept {
                identity: Identity {
                    id: self.authid.clone(),
                    role: self.config.role.clone(),
                },
                provider: "static".to_owned(),
                authextra: Dictionary::default(),
            }),
            _ => Ok(AuthOutcome::deny(
                Uri::from_known("wamp.error.authorization_failed"),
                "invalid ticket",
            )),
        }
    }
}
