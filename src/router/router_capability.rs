use anyhow::Result;
use async_trait::async_trait;

use crate::{
    core::{
        id::Id,
        uri::Uri,
    },
    message::message::Message,
};

/// The broker/dealer roles a session is granted once attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachedRoles {
    pub broker: bool,
    pub dealer: bool,
}

/// What [`crate::router::session::RouterSession`] requires of the realm's routing engine.
///
/// The routing tables, subscription matching, and call forwarding behind this trait are external
/// collaborators: this crate only defines the boundary and drives it, it does not implement
/// broker/dealer message routing itself.
#[async_trait]
pub trait Router: Send + Sync {
    /// Attaches a session to the realm, returning the roles it is granted.
    async fn attach(&self, session_id: Id, authrole: &str) -> Result<AttachedRoles>;

    /// Detaches a session from the realm. Fails with [`crate::core::error::InteractionError::NotAttached`]
    /// if the session was never attached.
    async fn detach(&self, session_id: Id) -> Result<()>;

    /// Hands an in-session message off to the broker/dealer for routing.
    async fn process(&self, session_id: Id, message: Message) -> Result<()>;

    /// The realm's URI.
    fn realm_uri(&self) -> &Uri;

    /// Whether the realm recognizes the given authentication role.
    async fn has_role(&self, authrole: &str) -> bool;
}
