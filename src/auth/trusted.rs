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
    core::types::{
        Dictionary,
        Value,
    },
    core::uri::Uri,
};

/// Accepts any peer immediately, trusting whatever `authid`/`authrole` it claims in HELLO.
///
/// Intended for embedded sessions and other connections the router already trusts by
/// construction (loopback service sessions, local tooling), never for untrusted transports.
#[derive(Default)]
pub struct TrustedAuth {
    role: String,
}

#[async_trait]
impl PendingAuth for TrustedAuth {
    fn method(&self) -> AuthMethod {
        AuthMethod::Trusted
    }

    async fn hello(&mut self, _realm: &Uri, details: &Dictionary) -> Result<AuthOutcome> {
        let id = details
            .get("authid")
            .and_then(Value::string)
            .cloned()
            .unwrap_or_else(|| "trusted".to_owned());
        let role = details
            .get("authrole")
            .and_then(Value::string)
            .cloned()
            .unwrap_or_else(|| self.role.clone());
        Ok(AuthOutcome::Accept {
            identity: Identity { id, role },
            provider: "static".to_owned(),
            authextra: Dictionary::default(),
        })
    }

    async fn authenticate(&mut self, _signature: &str, _extra: &Dictionary) -> Result<AuthOutcome> {
        Ok(AuthOutcome::deny(
            Uri::from_known("wamp.error.authorization_failed"),
            "trusted authentication does not challenge",
        ))
    }
}
