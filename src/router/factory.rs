use std::sync::Arc;

use futures_util::lock::Mutex;

use crate::{
    auth::identity::Identity,
    core::{
        hash::HashMap,
        id::{
            Id,
            IdAllocator,
        },
    },
    router::{
        embedded::{
            ApplicationSession,
            EmbeddedSession,
        },
        realm::{
            Realm,
            RealmManager,
        },
        session::RouterSession,
        transport::SessionTransport,
    },
};

/// Constructs sessions for both entry points into the router: a fresh wire connection, or an
/// in-process application registering itself directly.
///
/// Keeps the `application_session → EmbeddedSession` mapping so the same app object cannot be
/// registered twice; removing it tears down the wrapped session's attachment.
pub struct SessionFactory {
    id_allocator: Arc<dyn IdAllocator>,
    realms: Arc<RealmManager>,
    embedded: Mutex<HashMap<usize, Arc<EmbeddedSession>>>,
}

fn app_key(app: &Arc<dyn ApplicationSession>) -> usize {
    Arc::as_ptr(app) as *const () as usize
}

impl SessionFactory {
    pub fn new(id_allocator: Arc<dyn IdAllocator>, realms: Arc<RealmManager>) -> Self {
        Self {
            id_allocator,
            realms,
            embedded: Mutex::new(HashMap::default()),
        }
    }

    /// Builds a fresh [`RouterSession`] for a newly-opened transport connection.
    pub async fn new_router_session(&self, transport: Arc<dyn SessionTransport>) -> RouterSession {
        let id = self.id_allocator.generate_id().await;
        RouterSession::new(id, transport, self.realms.clone())
    }

    /// Registers an in-process application session, joined to `realm` as `identity`.
    ///
    /// Fails silently into a no-op if the same application object is already registered; callers
    /// should treat a second `register_embedded` for the same `app` as a bug, not retry it.
    pub async fn register_embedded(
        &self,
        identity: Identity,
        realm: Arc<Realm>,
        app: Arc<dyn ApplicationSession>,
    ) -> Arc<EmbeddedSession> {
        let key = app_key(&app);
        let mut embedded = self.embedded.lock().await;
        if let Some(existing) = embedded.get(&key) {
            return existing.clone();
        }
        let id = self.id_allocator.generate_id().await;
        let session = Arc::new(EmbeddedSession::wrap(id, identity, realm, app).await);
        embedded.insert(key, session.clone());
        session
    }

    /// Removes a previously-registered embedded session, detaching it from the router.
    pub async fn unregister_embedded(&self, app: &Arc<dyn ApplicationSession>) {
        let key = app_key(app);
        let mut embedded = self.embedded.lock().await;
        if let Some(session) = embedded.remove(&key) {
            session.close();
        }
    }
}

#[cfg(test)]
mod factory_test {
    use anyhow::Result;
    use async_trait::async_trait;

    use super::*;
    use crate::{
        auth::registry::AuthMethodRegistry,
        core::{
            id::RandomIdAllocator,
            uri::Uri,
        },
        message::message::Message,
        router::{
            config::RealmConfig,
            cookie::InMemoryCookieStore,
            realm_store::NullRealmStore,
            router_capability::{
                AttachedRoles,
                Router,
            },
        },
    };

    struct NullRouter {
        realm: Uri,
    }

    #[async_trait]
    impl Router for NullRouter {
        async fn attach(&self, _session_id: Id, _authrole: &str) -> Result<AttachedRoles> {
            Ok(AttachedRoles::default())
        }

        async fn detach(&self, _session_id: Id) -> Result<()> {
            Ok(())
        }

        async fn process(&self, _session_id: Id, _message: Message) -> Result<()> {
            Ok(())
        }

        fn realm_uri(&self) -> &Uri {
            &self.realm
        }

        async fn has_role(&self, _authrole: &str) -> bool {
            true
        }
    }

    struct NoopApp;

    #[async_trait]
    impl ApplicationSession for NoopApp {
        async fn deliver(&self, _message: Message) -> Result<()> {
            Ok(())
        }
    }

    fn realm(uri: &str) -> Arc<Realm> {
        let uri = Uri::try_from(uri).unwrap();
        Arc::new(Realm::new(
            RealmConfig {
                name: "test".to_owned(),
                uri: uri.clone(),
                auth: Default::default(),
                stats: None,
            },
            Arc::new(NullRouter { realm: uri }),
            Arc::new(InMemoryCookieStore::default()),
            Arc::new(NullRealmStore),
            Arc::new(AuthMethodRegistry::default()),
            Id::MIN,
            "test-agent".to_owned(),
            "node-1".to_owned(),
            "worker-1".to_owned(),
        ))
    }

    #[tokio::test]
    async fn registering_the_same_app_twice_returns_the_same_session() {
        let factory = SessionFactory::new(Arc::new(RandomIdAllocator::default()), Arc::new(RealmManager::default()));
        let app: Arc<dyn ApplicationSession> = Arc::new(NoopApp);
        let identity = Identity { id: "svc".to_owned(), role: "trusted".to_owned() };
        let first = factory.register_embedded(identity.clone(), realm("com.example.realm"), app.clone()).await;
        let second = factory.register_embedded(identity, realm("com.example.realm"), app).await;
        assert_eq!(first.id(), second.id());
    }

    #[tokio::test]
    async fn unregistering_removes_the_mapping() {
        let factory = SessionFactory::new(Arc::new(RandomIdAllocator::default()), Arc::new(RealmManager::default()));
        let app: Arc<dyn ApplicationSession> = Arc::new(NoopApp);
        let identity = Identity { id: "svc".to_owned(), role: "trusted".to_owned() };
        factory.register_embedded(identity, realm("com.example.realm"), app.clone()).await;
        factory.unregister_embedded(&app).await;
        assert!(factory.embedded.lock().await.is_empty());
    }
}
