mod support;

use std::sync::{
    Arc,
    Mutex as StdMutex,
};

use async_trait::async_trait;
use support::test_realm;
use wampire::{
    auth::{
        AuthMethodRegistry,
        Identity,
    },
    core::id::Id,
    message::message::Message,
    router::{
        ApplicationSession,
        EmbeddedSession,
        SessionDetails,
    },
};

#[derive(Default)]
struct RecordingApp {
    join_order: StdMutex<Vec<&'static str>>,
}

#[async_trait]
impl ApplicationSession for RecordingApp {
    async fn on_join(&self, _details: &SessionDetails) -> anyhow::Result<()> {
        self.join_order.lock().unwrap().push("on_join");
        Ok(())
    }

    async fn on_ready(&self) -> anyhow::Result<()> {
        self.join_order.lock().unwrap().push("ready");
        Ok(())
    }

    async fn deliver(&self, _message: Message) -> anyhow::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn embedded_session_attaches_synchronously_and_fires_join_then_ready() {
    test_utils::setup::setup_test_environment();

    let registry = AuthMethodRegistry::new().with_trusted(true);
    let (realm, router) = test_realm("com.wampire.test", registry);
    let app = Arc::new(RecordingApp::default());
    let identity = Identity { id: "service".to_owned(), role: "admin".to_owned() };

    let mut session = EmbeddedSession::wrap(Id::try_from(1).unwrap(), identity, realm.clone(), app.clone()).await;
    session.join().await.unwrap();

    assert!(session.is_joined());
    assert_eq!(router.attached.lock().unwrap().as_slice(), &[Id::try_from(1).unwrap()]);
    assert_eq!(app.join_order.lock().unwrap().as_slice(), &["on_join", "ready"]);
}
