use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    auth::{
        auth_method::AuthMethod,
        identity::Identity,
        pending::{
            AuthOutcome,
            PendingAuth,
        },
    },
    core::types::Dictionary,
    core::uri::Uri,
};

/// Per-realm configuration for anonymous authentication.
#[derive(Debug, Clone)]
pub struct AnonymousConfig {
    /// The role assigned to anonymous sessions.
    pub role: String,
}

impl Default for AnonymousConfig {
    fn default() -> Self {
        Self {
            role: "anonymous".to_owned(),
        }
    }
}

/// Accepts any peer immediately, assigning it a random authid.
pub struct AnonymousAuth {
    config: AnonymousConfig,
}

impl AnonymousAuth {
    pub fn new(config: AnonymousConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PendingAuth for AnonymousAuth {
    fn method(&self) -> AuthMethod {
        AuthMethod::Anonymous
    }

    async fn hello(&mut self, _realm: &Uri, _details: &Dictionary) -> Result<AuthOutcome> {
        Ok(AuthOutcome::Accept {
            identity: Identity {
                id: Uuid::new_v4().to_string(),
                role: self.config.role.clone(),
            },
            provider: "static".to_owned(),
            authextra: Dictionary::default(),
        })
    }

    async fn authenticate(&mut self, _signature: &str, _extra: &Dictionary) -> Result<AuthOutcome> {
        Ok(AuthOutcome::deny(
            Uri::from_known("wamp.error.authorization_failed"),
            "anonymous authentication does not challenge",
        ))
    }
}

#[cfg(test)]
mod anonymous_test {
    use super::*;

    #[tokio::test]
    async fn accepts_immediately_with_random_authid() {
        let mut auth = AnonymousAuth::new(AnonymousConfig::default());
        let outcome = auth
            .hello(&Uri::try_from("com.example").unwrap(), &Dictionary::default())
            .await
            .unwrap();
        assert_matches::assert_matches!(outcome, AuthOutcome::Accept { identity, .. } => {
            assert_eq!(identity.role, "anonymous");
            assert!(!identity.id.is_empty());
        });
    }
}
