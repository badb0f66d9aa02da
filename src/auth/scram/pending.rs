use std::sync::Arc;

use anyhow::{
    Error,
    Result,
};
use async_trait::async_trait;
use base64::Engine;
use rand::Rng;

use crate::{
    auth::{
        auth_method::AuthMethod,
        channel_binding::ChannelBinding,
        pending::{
            AuthOutcome,
            PendingAuth,
        },
        scram::{
            core::{
                auth_message,
                client_signature,
                recovered_client_key,
                server_signature,
                stored_key,
            },
            user::{
                UserData,
                UserDatabase,
            },
        },
    },
    core::{
        error::{
            BasicError,
            InteractionError,
        },
        types::{
            Dictionary,
            Value,
        },
        uri::Uri,
    },
};

fn generate_nonce() -> String {
    (0..16)
        .map(|_| rand::rng().sample(rand::distr::Alphanumeric) as char)
        .collect()
}

fn dict_str(dict: &Dictionary, key: &str) -> Option<String> {
    dict.get(key).and_then(Value::string).cloned()
}

/// Server side of a WAMP-SCRAM exchange, wrapping the underlying SCRAM primitives in the
/// capability set the session core expects.
pub struct ScramAuth {
    user_database: Arc<dyn UserDatabase>,
    server_nonce: String,
    pending: Option<PendingChallenge>,
}

struct PendingChallenge {
    user: UserData,
    client_nonce: String,
}

impl ScramAuth {
    pub fn new(user_database: Arc<dyn UserDatabase>) -> Self {
        Self {
            user_database,
            server_nonce: generate_nonce(),
            pending: None,
        }
    }
}

#[async_trait]
impl PendingAuth for ScramAuth {
    fn method(&self) -> AuthMethod {
        AuthMethod::Scram
    }

    async fn hello(&mut self, _realm: &Uri, details: &Dictionary) -> Result<AuthOutcome> {
        let authid = dict_str(details, "authid").unwrap_or_default();
        let client_nonce = details
            .get("authextra")
            .and_then(Value::dictionary)
            .and_then(|extra| dict_str(extra, "nonce"))
            .ok_or_else(|| Error::msg("missing client nonce for scram"))?;

        let user = self
            .user_database
            .user_data(&authid)
            .await
            .map_err(|err| match err.downcast::<BasicError>() {
                Ok(BasicError::NotFound(_)) => InteractionError::NoSuchPrincipal.into(),
                Ok(err) => err.into(),
                Err(err) => err,
            });
        let user = match user {
            Ok(user) => user,
            Err(err) => {
                return Ok(AuthOutcome::deny(Uri::for_error(&err), err.to_string()));
            }
        };

        let combined_nonce = format!("{client_nonce}{}", self.server_nonce);
        let extra = Dictionary::from_iter([
            ("nonce".to_owned(), Value::String(combined_nonce)),
            (
                "salt".to_owned(),
                Value::String(user.salt.as_str().to_owned()),
            ),
            (
                "kdf".to_owned(),
                Value::String(Into::<String>::into(user.key_derivation_function)),
            ),
            (
                "iterations".to_owned(),
                Value::Integer(user.iterations as u64),
            ),
        ]);
        self.pending = Some(PendingChallenge { user, client_nonce });
        Ok(AuthOutcome::Challenge { extra })
    }

    async fn authenticate(&mut self, signature: &str, extra: &Dictionary) -> Result<AuthOutcome> {
        let pending = match self.pending.take() {
            Some(pending) => pending,
            None => {
                return Ok(AuthOutcome::deny(
                    Uri::from_known("wamp.error.authentication_denied"),
                    "no pending challenge",
                ));
            }
        };

        let channel_binding = dict_str(extra, "channel_binding")
            .map(|value| ChannelBinding::try_from(value.as_str()))
            .transpose()?;
        let cbind_data = dict_str(extra, "cbind_data");

        let client_proof = base64::prelude::BASE64_STANDARD.decode(signature)?;
        let auth_message = auth_message(
            &pending.user.identity.id,
            &pending.client_nonce,
            &self.server_nonce,
            pending.user.salt.as_str(),
            pending.user.iterations,
            channel_binding,
            cbind_data.as_deref(),
        )?;
        let client_signature = client_signature(&pending.user.stored_key, auth_message.as_bytes())?;
        let recovered_client_key = recovered_client_key(&client_signature, &client_proof);
        let recovered_stored_key = stored_key(&recovered_client_key)?;

        if recovered_stored_key != pending.user.stored_key {
            return Ok(AuthOutcome::deny(
                Uri::from_known("wamp.error.authorization_failed"),
                "invalid password",
            ));
        }

        let server_signature = server_signature(&pending.user.server_key, auth_message.as_bytes())?;
        let verifier = base64::prelude::BASE64_STANDARD.encode(server_signature);

        Ok(AuthOutcome::Accept {
            identity: pending.user.identity.clone(),
            provider: "static".to_owned(),
            authextra: Dictionary::from_iter([("verifier".to_owned(), Value::String(verifier))]),
        })
    }
}

#[cfg(test)]
mod scram_pending_test {
    use super::*;
    use crate::auth::scram::user::new_user;
    use anyhow::Result as AnyResult;

    struct SingleUserDatabase {
        user: UserData,
    }

    #[async_trait]
    impl UserDatabase for SingleUserDatabase {
        async fn user_data(&self, id: &str) -> AnyResult<UserData> {
            if id == self.user.identity.id {
                Ok(self.user.clone())
            } else {
                Err(InteractionError::NoSuchPrincipal.into())
            }
        }
    }

    #[tokio::test]
    async fn full_exchange_succeeds_with_correct_password() {
        let user = new_user("alice", "hunter2-correct-horse").unwrap();
        let mut server = ScramAuth::new(Arc::new(SingleUserDatabase { user }));

        let realm = Uri::try_from("com.example").unwrap();
        let details = Dictionary::from_iter([
            ("authid".to_owned(), Value::String("alice".to_owned())),
            (
                "authextra".to_owned(),
                Value::Dictionary(Dictionary::from_iter([(
                    "nonce".to_owned(),
                    Value::String("client-nonce".to_owned()),
                )])),
            ),
        ]);

        let challenge_extra = match server.hello(&realm, &details).await.unwrap() {
            AuthOutcome::Challenge { extra } => extra,
            other => panic!("unexpected outcome: {other:?}"),
        };

        // Rebuild the client side of the exchange using the same primitives the server used.
        use crate::auth::scram::core::{
            client_key,
            client_proof,
            salt_password,
            stored_key,
        };
        use password_hash::Salt;

        let salt = dict_str(&challenge_extra, "salt").unwrap();
        let kdf = dict_str(&challenge_extra, "kdf").unwrap();
        let kdf = crate::auth::key_derivation_function::KeyDerivationFunction::try_from(kdf.as_str())
            .unwrap();
        let iterations = challenge_extra.get("iterations").unwrap().integer().unwrap() as u32;
        let combined_nonce = dict_str(&challenge_extra, "nonce").unwrap();
        let server_nonce = combined_nonce.strip_prefix("client-nonce").unwrap();

        let salted_password = salt_password(
            "hunter2-correct-horse",
            Salt::from_b64(&salt).unwrap(),
            kdf,
            iterations,
            None,
        )
        .unwrap();
        let client_key_bytes = client_key(salted_password.as_bytes()).unwrap();
        let stored_key_bytes = stored_key(&client_key_bytes).unwrap();
        let auth_message_str = auth_message(
            "alice",
            "client-nonce",
            server_nonce,
            &salt,
            iterations,
            None,
            None,
        )
        .unwrap();
        let client_sig = client_signature(&stored_key_bytes, auth_message_str.as_bytes()).unwrap();
        let proof = client_proof(&client_key_bytes, &client_sig);
        let signature = base64::prelude::BASE64_STANDARD.encode(proof);

        let auth_extra = Dictionary::from_iter([(
            "nonce".to_owned(),
            Value::String(combined_nonce),
        )]);
        assert_matches::assert_matches!(
            server.authenticate(&signature, &auth_extra).await,
            Ok(AuthOutcome::Accept { identity, .. }) => {
                assert_eq!(identity.id, "alice");
            }
        );
    }

    #[tokio::test]
    async fn unknown_user_is_denied() {
        let user = new_user("alice", "password").unwrap();
        let mut server = ScramAuth::new(Arc::new(SingleUserDatabase { user }));
        let realm = Uri::try_from("com.example").unwrap();
        let details = Dictionary::from_iter([
            ("authid".to_owned(), Value::String("mallory".to_owned())),
            (
                "authextra".to_owned(),
                Value::Dictionary(Dictionary::from_iter([(
                    "nonce".to_owned(),
                    Value::String("n".to_owned()),
                )])),
            ),
        ]);
        assert_matches::assert_matches!(server.hello(&realm, &details).await, Ok(AuthOutcome::Deny { .. }));
    }
}
