use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures_util::lock::Mutex;

use crate::{
    auth::auth_method::AuthMethod,
    core::{
        hash::HashMap,
        id::Id,
        types::Dictionary,
        uri::Uri,
    },
    router::transport::SessionTransport,
};

/// The authentication binding recorded for a browser cookie id.
#[derive(Debug, Clone)]
pub struct CookieAuth {
    pub authid: String,
    pub authrole: String,
    pub authmethod: AuthMethod,
    pub authextra: Dictionary,
    pub realm: Uri,
}

/// Stores cookie-to-identity bindings so a future connection presenting the same cookie id can
/// be pre-authenticated without repeating the original challenge, and tracks which live
/// transports are currently bound to each cookie id so a `wamp.close.logout` can kick the rest.
#[async_trait]
pub trait CookieStore: Send + Sync {
    async fn exists(&self, cbtid: &str) -> bool;
    async fn get_auth(&self, cbtid: &str) -> Option<CookieAuth>;
    async fn set_auth(&self, cbtid: &str, auth: CookieAuth) -> Result<()>;
    async fn del_auth(&self, cbtid: &str) -> Result<()>;

    /// Records that `session_id`'s transport is bound to `cbtid`, so it can be kicked by a later
    /// logout from another session sharing the same cookie.
    async fn bind_transport(&self, cbtid: &str, session_id: Id, transport: Arc<dyn SessionTransport>);
    /// Removes a transport binding, without otherwise touching the cookie's identity binding.
    async fn unbind_transport(&self, cbtid: &str, session_id: Id);
    /// Closes every transport bound to `cbtid` other than `except`, returning how many were kicked.
    async fn kick_others(&self, cbtid: &str, except: Id) -> usize;
}

/// An in-memory [`CookieStore`], suitable for a single router process.
#[derive(Default)]
pub struct InMemoryCookieStore {
    bindings: Mutex<HashMap<String, CookieAuth>>,
    transports: Mutex<HashMap<String, Vec<(Id, Arc<dyn SessionTransport>)>>>,
}

#[async_trait]
impl CookieStore for InMemoryCookieStore {
    async fn exists(&self, cbtid: &str) -> bool {
        self.bindings.lock().await.contains_key(cbtid)
    }

    async fn get_auth(&self, cbtid: &str) -> Option<CookieAuth> {
        self.bindings.lock().await.get(cbtid).cloned()
    }

    async fn set_auth(&self, cbtid: &str, auth: CookieAuth) -> Result<()> {
        self.bindings.lock().await.insert(cbtid.to_owned(), auth);
        Ok(())
    }

    async fn del_auth(&self, cbtid: &str) -> Result<()> {
        self.bindings.lock().await.remove(cbtid);
        Ok(())
    }

    async fn bind_transport(&self, cbtid: &str, session_id: Id, transport: Arc<dyn SessionTransport>) {
        self.transports
            .lock()
            .await
            .entry(cbtid.to_owned())
            .or_default()
            .push((session_id, transport));
    }

    async fn unbind_transport(&self, cbtid: &str, session_id: Id) {
        let mut transports = self.transports.lock().await;
        if let Some(bound) = transports.get_mut(cbtid) {
            bound.retain(|(id, _)| *id != session_id);
            if bound.is_empty() {
                transports.remove(cbtid);
            }
        }
    }

    async fn kick_others(&self, cbtid: &str, except: Id) -> usize {
        let kicked = self.transports.lock().await.remove(cbtid).unwrap_or_default();
        let mut count = 0;
        for (id, transport) in kicked {
            if id == except {
                self.bind_transport(cbtid, id, transport).await;
                continue;
            }
            let _ = transport.abort().await;
            count += 1;
        }
        count
    }
}
