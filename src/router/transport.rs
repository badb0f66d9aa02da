use anyhow::Result;
use async_trait::async_trait;

use crate::{
    core::types::Dictionary,
    message::message::Message,
};

/// Transport-reported facts a session uses for logging, WELCOME authextra, and cookie/proxy
/// trust decisions. Distinct from the wire-level [`crate::transport::transport::Transport`]
/// stream/sink: this is the capability set [`crate::router::session::RouterSession`] depends on
/// directly, independent of how bytes actually move.
#[derive(Debug, Clone, Default)]
pub struct TransportDetails {
    /// `"websocket"`, `"rawsocket"`, `"embedded"`, and so on.
    pub channel_type: String,
    /// e.g. `"wamp.2.json"`.
    pub serializer: String,
    /// Human-readable peer address, or a constant for embedded sessions.
    pub peer: String,
    /// Pre-authentication attributes a fronting proxy stamped on the connection, if any.
    pub pre_authenticated: Option<PreAuthenticated>,
    /// Cookie id extracted from the transport (e.g. a browser cookie header), if any.
    pub cbtid: Option<String>,
}

/// Identity a transport already vouches for before the WAMP handshake begins (`_authid` et al.).
#[derive(Debug, Clone)]
pub struct PreAuthenticated {
    pub authid: String,
    pub authrole: String,
    pub authmethod: String,
    pub authextra: Dictionary,
}

/// What [`crate::router::session::RouterSession`] requires of the connection beneath it.
#[async_trait]
pub trait SessionTransport: Send + Sync {
    async fn send(&self, message: Message) -> Result<()>;
    async fn close(&self) -> Result<()>;
    async fn abort(&self) -> Result<()>;
    fn is_open(&self) -> bool;
    fn transport_details(&self) -> &TransportDetails;
}
