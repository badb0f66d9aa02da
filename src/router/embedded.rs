use std::sync::{
    atomic::{
        AtomicBool,
        Ordering,
    },
    Arc,
};

use anyhow::{
    Error,
    Result,
};
use async_trait::async_trait;

use crate::{
    auth::identity::Identity,
    core::{
        close::CloseReason,
        id::Id,
        types::Dictionary,
    },
    message::message::Message,
    router::{
        realm::Realm,
        session::SessionDetails,
        transport::{
            SessionTransport,
            TransportDetails,
        },
    },
};

/// Callbacks an in-process application implements to observe its own session's lifecycle.
///
/// Every call is isolated: a failure in one stage is logged and does not prevent the next from
/// running, matching how the router's own connection-service loop treats its callbacks.
#[async_trait]
pub trait ApplicationSession: Send + Sync {
    async fn on_connect(&self) {}
    async fn on_join(&self, _details: &SessionDetails) -> Result<()> {
        Ok(())
    }
    async fn on_ready(&self) -> Result<()> {
        Ok(())
    }
    async fn on_leave(&self) -> Result<()> {
        Ok(())
    }
    async fn on_disconnect(&self) {}
    /// Delivers a router-originated message (EVENT, INVOCATION, RESULT, and so on) to the app.
    async fn deliver(&self, message: Message) -> Result<()>;
}

struct EmbeddedTransport {
    app: Arc<dyn ApplicationSession>,
    open: AtomicBool,
    details: TransportDetails,
}

#[async_trait]
impl SessionTransport for EmbeddedTransport {
    async fn send(&self, message: Message) -> Result<()> {
        if !self.is_open() {
            return Ok(());
        }
        self.app.deliver(message).await
    }

    async fn close(&self) -> Result<()> {
        self.open.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn abort(&self) -> Result<()> {
        self.open.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn transport_details(&self) -> &TransportDetails {
        &self.details
    }
}

fn is_app_to_router(message: &Message) -> bool {
    matches!(
        message,
        Message::Publish(_)
            | Message::Subscribe(_)
            | Message::Unsubscribe(_)
            | Message::Call(_)
            | Message::Cancel(_)
            | Message::Register(_)
            | Message::Unregister(_)
            | Message::Yield(_)
            | Message::Error(_)
    )
}

/// An in-process application session: a peer that lives inside the router rather than connecting
/// over a wire transport. The "transport" beneath it is a direct function-call channel back to
/// the [`ApplicationSession`].
pub struct EmbeddedSession {
    id: Id,
    identity: Identity,
    realm: Arc<Realm>,
    app: Arc<dyn ApplicationSession>,
    transport: Arc<EmbeddedTransport>,
    details: Option<SessionDetails>,
}

impl EmbeddedSession {
    pub async fn wrap(id: Id, identity: Identity, realm: Arc<Realm>, app: Arc<dyn ApplicationSession>) -> Self {
        let transport = Arc::new(EmbeddedTransport {
            app: app.clone(),
            open: AtomicBool::new(true),
            details: TransportDetails {
                channel_type: "embedded".to_owned(),
                serializer: "none".to_owned(),
                peer: "embedded".to_owned(),
                pre_authenticated: None,
                cbtid: None,
            },
        });
        app.on_connect().await;
        Self { id, identity, realm, app, transport, details: None }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn is_joined(&self) -> bool {
        self.details.is_some()
    }

    /// Joins the realm using the identity fixed at wrap time, then fires `join`/`onJoin`/`ready`
    /// in order. Failures in each stage are logged, not propagated: a broken `onJoin` must not
    /// prevent `ready` from running.
    pub async fn join(&mut self) -> Result<()> {
        self.realm.router.attach(self.id, &self.identity.role).await?;

        let details = SessionDetails {
            realm: self.realm.uri().clone(),
            session_id: self.id,
            authid: self.identity.id.clone(),
            authrole: self.identity.role.clone(),
            authmethod: crate::auth::auth_method::AuthMethod::Trusted,
            authprovider: "embedded".to_owned(),
            authextra: Dictionary::default(),
            serializer: self.transport.transport_details().serializer.clone(),
            resumed: false,
            resumable: false,
            resume_token: None,
        };

        if let Err(err) = self.realm.realm_store.store_session_joined(&details).await {
            log::warn!("failed to record embedded session {} join: {err}", self.id);
        }

        if let Err(err) = self.app.on_join(&details).await {
            log::warn!("embedded session {} onJoin failed: {err}", self.id);
        }
        if let Err(err) = self.app.on_ready().await {
            log::warn!("embedded session {} ready observers failed: {err}", self.id);
        }

        self.realm.meta.publish_on_join(self.id, &details.authid, &details.authrole).await?;
        self.details = Some(details);
        Ok(())
    }

    /// Accepts one outbound message from the wrapped application.
    pub async fn handle_app_message(&self, message: Message) -> Result<()> {
        if !is_app_to_router(&message) {
            return Err(Error::msg(format!(
                "{} is not a valid message from an embedded application",
                message.message_name()
            )));
        }
        self.realm.router.process(self.id, message).await
    }

    /// Runs the GOODBYE teardown sequence: `onLeave` then `leave`-equivalent observers, then
    /// publishes `wamp.session.on_leave`. Each stage is isolated.
    pub async fn handle_goodbye(&mut self) -> Result<()> {
        if let Err(err) = self.app.on_leave().await {
            log::warn!("embedded session {} onLeave failed: {err}", self.id);
        }
        self.app.on_disconnect().await;
        self.realm.meta.publish_on_leave(self.id).await?;
        if let Some(details) = &self.details {
            if let Err(err) = self.realm.realm_store.store_session_left(details, CloseReason::Normal).await {
                log::warn!("failed to record embedded session {} leave: {err}", self.id);
            }
        }
        Ok(())
    }

    /// Detaches from the router on the next tick, so a close triggered synchronously from inside
    /// an observer callback does not recurse into the attachment table while it is still locked.
    pub fn close(self: Arc<Self>) {
        let id = self.id;
        let realm = self.realm.clone();
        let transport = self.transport.clone();
        tokio::spawn(async move {
            let _ = transport.close().await;
            if let Err(err) = realm.router.detach(id).await {
                log::warn!("failed to detach embedded session {id}: {err}");
            }
        });
    }
}

#[cfg(test)]
mod embedded_test {
    use std::sync::Mutex as StdMutex;

    use anyhow::Result;

    use super::*;
    use crate::{
        auth::registry::AuthMethodRegistry,
        core::uri::Uri,
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

    #[derive(Default)]
    struct RecordingApp {
        joined: StdMutex<bool>,
        delivered: StdMutex<Vec<Message>>,
    }

    #[async_trait]
    impl ApplicationSession for RecordingApp {
        async fn on_join(&self, _details: &SessionDetails) -> Result<()> {
            *self.joined.lock().unwrap() = true;
            Ok(())
        }

        async fn deliver(&self, message: Message) -> Result<()> {
            self.delivered.lock().unwrap().push(message);
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
    async fn join_attaches_and_fires_on_join() {
        let realm = realm("com.example.realm");
        let app = Arc::new(RecordingApp::default());
        let mut session = EmbeddedSession::wrap(
            Id::try_from(2).unwrap(),
            Identity { id: "svc".to_owned(), role: "trusted".to_owned() },
            realm,
            app.clone(),
        )
        .await;

        session.join().await.unwrap();

        assert!(session.is_joined());
        assert!(*app.joined.lock().unwrap());
    }

    #[tokio::test]
    async fn app_message_forwards_to_router() {
        let realm = realm("com.example.realm");
        let app = Arc::new(RecordingApp::default());
        let mut session = EmbeddedSession::wrap(
            Id::try_from(2).unwrap(),
            Identity { id: "svc".to_owned(), role: "trusted".to_owned() },
            realm,
            app,
        )
        .await;
        session.join().await.unwrap();

        let publish = Message::Publish(crate::message::message::PublishMessage {
            request: Id::MIN,
            options: Dictionary::default(),
            topic: Uri::try_from("com.example.topic").unwrap(),
            arguments: Vec::default(),
            arguments_keyword: Dictionary::default(),
        });
        session.handle_app_message(publish).await.unwrap();
    }

    #[tokio::test]
    async fn router_only_message_from_app_is_rejected() {
        let realm = realm("com.example.realm");
        let app = Arc::new(RecordingApp::default());
        let session = EmbeddedSession::wrap(
            Id::try_from(2).unwrap(),
            Identity { id: "svc".to_owned(), role: "trusted".to_owned() },
            realm,
            app,
        )
        .await;

        let event = Message::Event(crate::message::message::EventMessage {
            subscribed_subscription: Id::MIN,
            published_publication: Id::MIN,
            details: Dictionary::default(),
            publish_arguments: Vec::default(),
            publish_arguments_keyword: Dictionary::default(),
        });
        assert!(session.handle_app_message(event).await.is_err());
    }
}
