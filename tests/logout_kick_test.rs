mod support;

use std::sync::Arc;

use support::{
    test_realm,
    RecordingTransport,
};
use wampire::{
    auth::AuthMethodRegistry,
    core::{
        close::CloseReason,
        id::Id,
        types::{
            Dictionary,
            Value,
        },
    },
    message::message::{
        GoodbyeMessage,
        HelloMessage,
        Message,
    },
    router::{
        RealmManager,
        RouterSession,
        SessionTransport,
    },
};

fn hello_with_cookie() -> Message {
    Message::Hello(HelloMessage {
        realm: wampire::core::uri::Uri::try_from("com.wampire.test").unwrap(),
        details: Dictionary::from_iter([(
            "authmethods".to_owned(),
            Value::List(vec![Value::String("anonymous".to_owned())]),
        )]),
    })
}

#[tokio::test]
async fn logout_deletes_the_cookie_and_kicks_every_other_bound_transport() {
    test_utils::setup::setup_test_environment();

    let registry = AuthMethodRegistry::new().with_anonymous(Default::default());
    let (realm, _router) = test_realm("com.wampire.test", registry);
    let realms = Arc::new(RealmManager::default());
    realms.register(realm.clone()).await;

    let transport_a = Arc::new(RecordingTransport::with_cbtid(Some("cb-shared".to_owned())));
    let mut session_a = RouterSession::new(Id::try_from(1).unwrap(), transport_a.clone(), realms.clone());
    session_a.handle_message(hello_with_cookie()).await.unwrap();

    let transport_b = Arc::new(RecordingTransport::with_cbtid(Some("cb-shared".to_owned())));
    let mut session_b = RouterSession::new(Id::try_from(2).unwrap(), transport_b.clone(), realms.clone());
    session_b.handle_message(hello_with_cookie()).await.unwrap();

    let transport_c = Arc::new(RecordingTransport::with_cbtid(Some("cb-shared".to_owned())));
    let mut session_c = RouterSession::new(Id::try_from(3).unwrap(), transport_c.clone(), realms.clone());
    session_c.handle_message(hello_with_cookie()).await.unwrap();

    assert!(transport_a.is_open());
    assert!(transport_b.is_open());
    assert!(transport_c.is_open());

    session_a
        .handle_message(Message::Goodbye(GoodbyeMessage {
            details: Dictionary::default(),
            reason: CloseReason::LogOut.uri(),
        }))
        .await
        .unwrap();

    // The originating transport is never the one kicked.
    assert!(transport_a.is_open());
    assert!(!transport_b.is_open());
    assert!(!transport_c.is_open());
    assert!(!realm.cookie_store.exists("cb-shared").await);
}
