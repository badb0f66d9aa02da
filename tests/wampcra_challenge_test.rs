mod support;

use std::sync::Arc;

use assert_matches::assert_matches;
use base64::Engine;
use hmac::Mac;
use support::{
    test_realm,
    RecordingTransport,
};
use wampire::{
    auth::{
        wampcra::{
            WampCraConfig,
            WampCraSecret,
        },
        AuthMethodRegistry,
    },
    core::{
        hash::HashMap,
        id::Id,
        types::{
            Dictionary,
            Value,
        },
    },
    message::message::{
        AuthenticateMessage,
        HelloMessage,
        Message,
    },
    router::{
        RealmManager,
        RouterSession,
    },
};

fn sign(secret: &str, challenge: &str) -> String {
    let mut mac = hmac::Hmac::<sha2::Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(challenge.as_bytes());
    base64::prelude::BASE64_STANDARD.encode(mac.finalize().into_bytes())
}

fn registry() -> AuthMethodRegistry {
    AuthMethodRegistry::new().with_wampcra(WampCraConfig {
        users: HashMap::from_iter([(
            "alice".to_owned(),
            WampCraSecret {
                secret: "secret123".to_owned(),
                role: "user".to_owned(),
            },
        )]),
    })
}

fn hello() -> Message {
    Message::Hello(HelloMessage {
        realm: wampire::core::uri::Uri::try_from("com.wampire.test").unwrap(),
        details: Dictionary::from_iter([
            (
                "authmethods".to_owned(),
                Value::List(vec![Value::String("wampcra".to_owned())]),
            ),
            ("authid".to_owned(), Value::String("alice".to_owned())),
        ]),
    })
}

#[tokio::test]
async fn correct_signature_completes_the_handshake() {
    test_utils::setup::setup_test_environment();

    let (realm, _router) = test_realm("com.wampire.test", registry());
    let realms = Arc::new(RealmManager::default());
    realms.register(realm.clone()).await;
    let transport = Arc::new(RecordingTransport::new());
    let mut session = RouterSession::new(Id::MIN, transport.clone(), realms);

    session.handle_message(hello()).await.unwrap();

    let challenge = assert_matches!(transport.sent_messages().as_slice(), [Message::Challenge(challenge)] => {
        assert_eq!(challenge.auth_method, "wampcra");
        challenge.extra.get("challenge").unwrap().string().unwrap().clone()
    });

    let signature = sign("secret123", &challenge);
    session
        .handle_message(Message::Authenticate(AuthenticateMessage {
            signature,
            extra: Dictionary::default(),
        }))
        .await
        .unwrap();

    assert_matches!(
        transport.sent_messages().as_slice(),
        [Message::Challenge(_), Message::Welcome(welcome)] => {
            assert_eq!(welcome.details.get("authid").unwrap().string().unwrap(), "alice");
        }
    );
}

#[tokio::test]
async fn bad_signature_aborts_with_authorization_failed() {
    test_utils::setup::setup_test_environment();

    let (realm, _router) = test_realm("com.wampire.test", registry());
    let realms = Arc::new(RealmManager::default());
    realms.register(realm.clone()).await;
    let transport = Arc::new(RecordingTransport::new());
    let mut session = RouterSession::new(Id::MIN, transport.clone(), realms);

    session.handle_message(hello()).await.unwrap();
    session
        .handle_message(Message::Authenticate(AuthenticateMessage {
            signature: "not-the-right-signature".to_owned(),
            extra: Dictionary::default(),
        }))
        .await
        .unwrap();

    assert_matches!(
        transport.sent_messages().as_slice(),
        [Message::Challenge(_), Message::Abort(abort)] => {
            assert_eq!(abort.reason.as_ref(), "wamp.error.authorization_failed");
        }
    );
}
