use anyhow::Result;
use async_trait::async_trait;
use base64::Engine;
use hmac::Mac;
use rand::Rng;

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
        types::{
            Dictionary,
            Value,
        },
        uri::Uri,
    },
};

/// A single user's WAMP-CRA secret.
#[derive(Debug, Clone)]
pub struct WampCraSecret {
    pub secret: String,
    pub role: String,
}

/// Per-realm configuration for WAMP-CRA authentication.
#[derive(Debug, Clone, Default)]
pub struct WampCraConfig {
    pub users: HashMap<String, WampCraSecret>,
}

fn generate_challenge(authid: &str) -> String {
    let nonce: String = (0..16)
        .map(|_| rand::rng().sample(rand::distr::Alphanumeric) as char)
        .collect();
    format!(r#"{{"authid":"{authid}","nonce":"{nonce}"}}"#)
}

fn sign(secret: &str, challenge: &str) -> Result<String> {
    let mut mac = hmac::Hmac::<sha2::Sha256>::new_from_slice(secret.as_bytes())?;
    mac.update(challenge.as_bytes());
    Ok(base64::prelude::BASE64_STANDARD.encode(mac.finalize().into_bytes()))
}

/// Classic WAMP Challenge-Response Authentication: the server hands back a nonce-bearing
/// challenge, and the client must return `base64(HMAC-SHA256(secret, challenge))`.
pub struct WampCraAuth {
    config: WampCraConfig,
    authid: String,
    challenge: String,
}

impl WampCraAuth {
    pub fn new(config: WampCraConfig) -> Self {
        Self {
            config,
            authid: String::new(),
            challenge: String::new(),
        }
    }
}

#[async_trait]
impl PendingAuth for WampCraAuth {
    fn method(&self) -> AuthMethod {
        AuthMethod::WampCra
    }

    async fn hello(&mut self, _realm: &Uri, details: &Dictionary) -> Result<AuthOutcome> {
        self.authid = details
            .get("authid")
            .and_then(Value::string)
            .cloned()
            .unwrap_or_default();
        if !self.config.users.contains_key(&self.authid) {
            return Ok(AuthOutcome::deny(
                Uri::from_known("wamp.error.no_such_principal"),
                "no such principal",
            ));
        }
        self.challenge = generate_challenge(&self.authid);
        Ok(AuthOutcome::Challenge {
            extra: Dictionary::from_iter([(
                "challenge".to_owned(),
                Value::String(self.challenge.clone()),
            )]),
        })
    }

    async fn authenticate(&mut self, signature: &str, _extra: &Dictionary) -> Result<AuthOutcome> {
        let user = match self.config.users.get(&self.authid) {
            Some(user) => user,
            None => {
                return Ok(AuthOutcome::deny(
                    Uri::from_known("wamp.error.no_such_principal"),
                    "no such principal",
                ));
            }
        };
        let expected = sign(&user.secret, &self.challenge)?;
        if expected == signature {
            Ok(AuthOutcome::Accept {
                identity: Identity {
                    id: self.authid.clone(),
                    role: user.role.clone(),
                },
                provider: "static".to_owned(),
                authextra: Dictionary::default(),
            })
        } else {
            Ok(AuthOutcome::deny(
                Uri::from_known("wamp.error.authorization_failed"),
                "invalid signature",
            ))
        }
    }
}
