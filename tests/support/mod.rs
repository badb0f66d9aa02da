use std::sync::{
    atomic::{
        AtomicBool,
        Ordering,
    },
    Arc,
    Mutex as StdMutex,
};

use anyhow::Result;
use async_trait::async_trait;
use wampire::{
    core::{
        id::Id,
        uri::Uri,
    },
    message::message::Message,
    router::{
        AttachedRoles,
        CookieStore,
        InMemoryCookieStore,
        NullRealmStore,
        Realm,
        Router,
        SessionTransport,
        TransportDetails,
    },
};

/// Records every `attach`/`detach`/`process` call it sees, and always grants broker+dealer roles.
pub struct RecordingRouter {
    realm: Uri,
    pub attached: StdMutex<Vec<Id>>,
    pub detached: StdMutex<Vec<Id>>,
    pub processed: StdMutex<Vec<Message>>,
}

impl RecordingRouter {
    pub fn new(realm: Uri) -> Self {
        Self {
            realm,
            attached: StdMutex::new(Vec::new()),
            detached: StdMutex::new(Vec::new()),
            processed: StdMutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Router for RecordingRouter {
    async fn attach(&self, session_id: Id, _authrole: &str) -> Result<AttachedRoles> {
        self.attached.lock().unwrap().push(session_id);
        Ok(AttachedRoles { broker: true, dealer: true })
    }

    async fn detach(&self, session_id: Id) -> Result<()> {
        self.detached.lock().unwrap().push(session_id);
        Ok(())
    }

    async fn process(&self, _session_id: Id, message: Message) -> Result<()> {
        self.processed.lock().unwrap().push(message);
        Ok(())
    }

    fn realm_uri(&self) -> &Uri {
        &self.realm
    }

    async fn has_role(&self, _authrole: &str) -> bool {
        true
    }
}

/// A [`SessionTransport`] double that records every message sent to it and tracks whether it has
/// been aborted, standing in for a real wire connection.
pub struct RecordingTransport {
    details: TransportDetails,
    sent: StdMutex<Vec<Message>>,
    aborted: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::with_cbtid(None)
    }

    pub fn with_cbtid(cbtid: Option<String>) -> Self {
        Self {
            details: TransportDetails {
                channel_type: "test".to_owned(),
                serializer: "wamp.2.json".to_owned(),
                peer: "test-peer".to_owned(),
                pre_authenticated: None,
                cbtid,
            },
            sent: StdMutex::new(Vec::new()),
            aborted: AtomicBool::new(false),
        }
    }

    pub fn sent_messages(&self) -> Vec<Message> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionTransport for RecordingTransport {
    async fn send(&self, message: Message) -> Result<()> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.aborted.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn abort(&self) -> Result<()> {
        self.aborted.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_open(&self) -> bool {
        !self.aborted.load(Ordering::SeqCst)
    }

    fn transport_details(&self) -> &TransportDetails {
        &self.details
    }
}

/// Builds a realm backed by a [`RecordingRouter`], an in-memory cookie store, and a no-op realm
/// store, with whatever auth registry the scenario under test needs.
pub fn test_realm(uri: &str, auth_registry: wampire::auth::AuthMethodRegistry) -> (Arc<Realm>, Arc<RecordingRouter>) {
    let uri = Uri::try_from(uri).unwrap();
    let router = Arc::new(RecordingRouter::new(uri.clone()));
    let realm = Arc::new(Realm::new(
        wampire::router::RealmConfig {
            name: "test".to_owned(),
            uri,
            auth: Default::default(),
            stats: None,
        },
        router.clone() as Arc<dyn Router>,
        Arc::new(InMemoryCookieStore::default()) as Arc<dyn CookieStore>,
        Arc::new(NullRealmStore),
        Arc::new(auth_registry),
        Id::MIN,
        "test-agent".to_owned(),
        "node-1".to_owned(),
        "worker-1".to_owned(),
    ));
    (realm, router)
}
