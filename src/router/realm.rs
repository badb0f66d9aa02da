use std::sync::Arc;

use futures_util::lock::Mutex;

use crate::{
    auth::registry::AuthMethodRegistry,
    core::{
        hash::HashMap,
        id::{
            Id,
            IdAllocator,
            RandomIdAllocator,
        },
        uri::Uri,
    },
    router::{
        config::{
            RealmConfig,
            StatsConfig,
        },
        cookie::CookieStore,
        meta::MetaPublisher,
        realm_store::RealmStore,
        router_capability::Router,
    },
};

/// Everything a [`crate::router::session::RouterSession`] needs from the realm it joins, bundled
/// so the session core does not have to thread five separate handles through every call.
///
/// The broker/dealer behind [`Router`] is an external collaborator; this struct only carries the
/// handles a session needs and the metadata ([`RealmConfig`]) that governs its own behavior.
pub struct Realm {
    pub config: RealmConfig,
    pub router: Arc<dyn Router>,
    pub cookie_store: Arc<dyn CookieStore>,
    pub realm_store: Arc<dyn RealmStore>,
    pub auth_registry: Arc<AuthMethodRegistry>,
    pub meta: Arc<MetaPublisher>,
    pub id_allocator: Arc<dyn IdAllocator>,
    pub agent: String,
    pub node_id: String,
    pub worker_id: String,
}

impl Realm {
    pub fn new(
        config: RealmConfig,
        router: Arc<dyn Router>,
        cookie_store: Arc<dyn CookieStore>,
        realm_store: Arc<dyn RealmStore>,
        auth_registry: Arc<AuthMethodRegistry>,
        service_session_id: Id,
        agent: String,
        node_id: String,
        worker_id: String,
    ) -> Self {
        let id_allocator: Arc<dyn IdAllocator> = Arc::new(RandomIdAllocator::default());
        let meta = Arc::new(MetaPublisher::new(
            router.clone(),
            service_session_id,
            id_allocator.clone(),
        ));
        Self {
            config,
            router,
            cookie_store,
            realm_store,
            auth_registry,
            meta,
            id_allocator,
            agent,
            node_id,
            worker_id,
        }
    }

    pub fn uri(&self) -> &Uri {
        &self.config.uri
    }

    pub fn stats_config(&self) -> Option<&StatsConfig> {
        self.config.stats.as_ref()
    }
}

/// Looks up realms by URI for sessions negotiating a HELLO.
#[derive(Default)]
pub struct RealmManager {
    realms: Mutex<HashMap<Uri, Arc<Realm>>>,
}

impl RealmManager {
    pub async fn register(&self, realm: Arc<Realm>) {
        self.realms.lock().await.insert(realm.uri().clone(), realm);
    }

    pub async fn unregister(&self, uri: &Uri) {
        self.realms.lock().await.remove(uri);
    }

    pub async fn get(&self, uri: &Uri) -> Option<Arc<Realm>> {
        self.realms.lock().await.get(uri).cloned()
    }
}

#[cfg(test)]
mod realm_manager_test {
    use anyhow::Result;

    use super::*;
    use crate::router::{
        cookie::InMemoryCookieStore,
        realm_store::NullRealmStore,
        router_capability::AttachedRoles,
    };

    struct NullRouter {
        realm: Uri,
    }

    #[async_trait::async_trait]
    impl Router for NullRouter {
        async fn attach(&self, _session_id: Id, _authrole: &str) -> Result<AttachedRoles> {
            Ok(AttachedRoles::default())
        }

        async fn detach(&self, _session_id: Id) -> Result<()> {
            Ok(())
        }

        async fn process(
            &self,
            _session_id: Id,
            _message: crate::message::message::Message,
        ) -> Result<()> {
            Ok(())
        }

        fn realm_uri(&self) -> &Uri {
            &self.realm
        }

        async fn has_role(&self, _authrole: &str) -> bool {
            true
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
    async fn registers_and_looks_up_realms_by_uri() {
        let manager = RealmManager::default();
        let uri = Uri::try_from("com.example.realm").unwrap();
        manager.register(realm("com.example.realm")).await;
        assert!(manager.get(&uri).await.is_some());
        assert!(
            manager
                .get(&Uri::try_from("com.example.other").unwrap())
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn unregister_removes_a_realm() {
        let manager = RealmManager::default();
        let uri = Uri::try_from("com.example.realm").unwrap();
        manager.register(realm("com.example.realm")).await;
        manager.unregister(&uri).await;
        assert!(manager.get(&uri).await.is_none());
    }
}
