use anyhow::{
    Error,
    Result,
};
use async_trait::async_trait;
use rand::RngCore;

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

/// Per-realm configuration for WAMP-Cryptosign authentication.
#[derive(Debug, Clone, Default)]
pub struct CryptosignConfig {
    /// Map from authid to the peer's 32-byte Ed25519 public key.
    pub public_keys: HashMap<String, [u8; 32]>,
    pub role: String,
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(value: &str) -> Result<Vec<u8>> {
    if value.len() % 2 != 0 {
        return Err(Error::msg("hex string must have an even length"));
    }
    (0..value.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&value[i..i + 2], 16).map_err(Error::new))
        .collect()
}

/// Challenges with a random hex-encoded nonce, then verifies an Ed25519 signature over it.
pub struct CryptosignAuth {
    config: CryptosignConfig,
    authid: String,
    nonce: String,
}

impl CryptosignAuth {
    pub fn new(config: CryptosignConfig) -> Self {
        Self {
            config,
            authid: String::new(),
            nonce: String::new(),
        }
    }
}

#[async_trait]
impl PendingAuth for CryptosignAuth {
    fn method(&self) -> AuthMethod {
        AuthMethod::Cryptosign
    }

    async fn hello(&mut self, _realm: &Uri, details: &Dictionary) -> Result<AuthOutcome> {
        self.authid = details
            .get("authid")
            .and_then(Value::string)
            .cloned()
            .unwrap_or_default();
        if !self.config.public_keys.contains_key(&self.authid) {
            return Ok(AuthOutcome::deny(
                Uri::from_known("wamp.error.no_such_principal"),
                "no such principal",
            ));
        }
        let mut nonce_bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut nonce_bytes);
        self.nonce = hex_encode(&nonce_bytes);
        Ok(AuthOutcome::Challenge {
            extra: Dictionary::from_iter([(
                "challenge".to_owned(),
                Value::String(self.nonce.clone()),
            )]),
        })
    }

    async fn authenticate(&mut self, signature: &str, _extra: &Dictionary) -> Result<AuthOutcome> {
        let public_key = match self.config.public_keys.get(&self.authid) {
            Some(key) => *key,
            None => {
                return Ok(AuthOutcome::deny(
                    Uri::from_known("wamp.error.no_such_principal"),
                    "no such principal",
                ));
            }
        };
        let signed = hex_decode(signature)?;
        match nacl::sign::verify(&signed, &public_key) {
            Ok(message) if message == self.nonce.as_bytes() => Ok(AuthOutcome::Accept {
                identity: Identity {
                    id: self.authid.clone(),
                    role: self.config.role.clone(),
                },
                provider: "static".to_owned(),
                authextra: Dictionary::default(),
            }),
            _ => Ok(AuthOutcome::deny(
                Uri::from_known("wamp.error.authorization_failed"),
                "invalid signature",
            )),
        }
    }
}

#[cfg(test)]
mod cryptosign_test {
    use super::*;

    #[tokio::test]
    async fn denies_unknown_principal() {
        let mut auth = CryptosignAuth::new(CryptosignConfig::default());
        let realm = Uri::try_from("com.example").unwrap();
        let details = Dictionary::from_iter([(
            "authid".to_owned(),
            Value::String("nobody".to_owned()),
        )]);
        assert_matches::assert_matches!(auth.hello(&realm, &details).await, Ok(AuthOutcome::Deny { .. }));
    }

    #[tokio::test]
    async fn accepts_valid_signature_over_challenge() {
        let seed = [7u8; 32];
        let keypair = nacl::sign::generate_keypair(&seed);
        let mut public_key = [0u8; 32];
        public_key.copy_from_slice(&keypair.pkey[..32]);

        let config = CryptosignConfig {
            public_keys: HashMap::from_iter([("alice".to_owned(), public_key)]),
            role: "user".to_owned(),
        };
        let mut auth = CryptosignAuth::new(config);
        let realm = Uri::try_from("com.example").unwrap();
        let details = Dictionary::from_iter([(
            "authid".to_owned(),
            Value::String("alice".to_owned()),
        )]);
        let challenge = match auth.hello(&realm, &details).await.unwrap() {
            AuthOutcome::Challenge { extra } => extra.get("challenge").unwrap().string().unwrap().clone(),
            other => panic!("unexpected outcome: {other:?}"),
        };
        let signed = nacl::sign::sign(challenge.as_bytes(), &keypair.skey).unwrap();
        let signature = hex_encode(&signed);
        assert_matches::assert_matches!(
            auth.authenticate(&signature, &Dictionary::default()).await,
            Ok(AuthOutcome::Accept { identity, .. }) => {
                assert_eq!(identity.id, "alice");
            }
        );
    }
}
