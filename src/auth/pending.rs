use anyhow::Result;
use async_trait::async_trait;

use crate::{
    auth::{
        auth_method::AuthMethod,
        identity::Identity,
    },
    core::{
        types::Dictionary,
        uri::Uri,
    },
};

/// The disposition of a single step in an authentication exchange.
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    /// The peer is authenticated. The session should proceed to WELCOME.
    Accept {
        identity: Identity,
        provider: String,
        authextra: Dictionary,
    },
    /// The peer must respond with an AUTHENTICATE message before a disposition is known.
    Challenge { extra: Dictionary },
    /// The peer is rejected. The session should send ABORT and close.
    Deny { reason: Uri, message: String },
}

impl AuthOutcome {
    pub fn deny<S>(reason: Uri, message: S) -> Self
    where
        S: Into<String>,
    {
        Self::Deny {
            reason,
            message: message.into(),
        }
    }
}

/// A single authentication transaction in progress for one connecting peer.
///
/// A fresh instance is created per HELLO attempt by the [`crate::auth::registry::AuthMethodRegistry`]
/// and lives only until the exchange resolves to [`AuthOutcome::Accept`] or [`AuthOutcome::Deny`].
#[async_trait]
pub trait PendingAuth: Send {
    /// The method this transaction is authenticating.
    fn method(&self) -> AuthMethod;

    /// Handles the initial HELLO for this method.
    async fn hello(&mut self, realm: &Uri, details: &Dictionary) -> Result<AuthOutcome>;

    /// Handles a client's AUTHENTICATE response to a prior challenge.
    ///
    /// Only called if [`Self::hello`] returned [`AuthOutcome::Challenge`]. Implementations that
    /// never challenge (because they resolve fully in `hello`) may return a `Deny` here
    /// unconditionally; the session core never calls it in that case.
    async fn authenticate(&mut self, signature: &str, extra: &Dictionary) -> Result<AuthOutcome>;
}
