use anyhow::Result;
use async_trait::async_trait;

use crate::{
    core::close::CloseReason,
    router::session::SessionDetails,
};

/// Persists session join/leave events for embedded sessions.
///
/// Real implementations might durably log these events; this crate only defines the capability
/// set and a no-op implementation for embeddings that do not need durability.
#[async_trait]
pub trait RealmStore: Send + Sync {
    async fn store_session_joined(&self, details: &SessionDetails) -> Result<()>;
    async fn store_session_left(&self, details: &SessionDetails, reason: CloseReason) -> Result<()>;
}

/// A [`RealmStore`] that discards every event.
#[derive(Debug, Default)]
pub struct NullRealmStore;

#[async_trait]
impl RealmStore for NullRealmStore {
    async fn store_session_joined(&self, _details: &SessionDetails) -> Result<()> {
        Ok(())
    }

    async fn store_session_left(&self, _details: &SessionDetails, _reason: CloseReason) -> Result<()> {
        Ok(())
    }
}
