use std::sync::Arc;

use anyhow::Result;

use crate::{
    auth::{
        auth_method::AuthMethod,
        identity::Identity,
        pending::{
            AuthOutcome,
            PendingAuth,
        },
    },
    core::{
        close::CloseReason,
        id::Id,
        types::{
            Dictionary,
            Value,
        },
        uri::Uri,
    },
    message::message::{
        AbortMessage,
        ChallengeMessage,
        GoodbyeMessage,
        Message,
        WelcomeMessage,
    },
    router::{
        cookie::CookieAuth,
        realm::{
            Realm,
            RealmManager,
        },
        router_capability::AttachedRoles,
        transport::SessionTransport,
    },
};

fn abort_message(reason: Uri, message: String) -> Message {
    Message::Abort(AbortMessage {
        details: Dictionary::from_iter([("message".to_owned(), Value::String(message))]),
        reason,
        ..Default::default()
    })
}

/// The fully-resolved identity and negotiated parameters of a joined session, reported in WELCOME
/// and handed to [`crate::router::realm_store::RealmStore`]/[`crate::router::meta::MetaPublisher`].
#[derive(Debug, Clone)]
pub struct SessionDetails {
    pub realm: Uri,
    pub session_id: Id,
    pub authid: String,
    pub authrole: String,
    pub authmethod: AuthMethod,
    pub authprovider: String,
    pub authextra: Dictionary,
    pub serializer: String,
    pub resumed: bool,
    pub resumable: bool,
    pub resume_token: Option<String>,
}

struct JoinedState {
    details: SessionDetails,
    goodbye_sent: bool,
}

enum SessionState {
    Initial,
    PendingAuth(Box<dyn PendingAuth>),
    Joined(JoinedState),
    Closed,
}

/// The router-side half of one WAMP connection: negotiates the opening handshake, attaches to a
/// realm, forwards routed traffic, and runs the GOODBYE/transport-loss teardown paths.
///
/// Message delivery to this type is assumed to already be serialized one at a time; see the
/// runtime notes on the event loop that owns this value.
pub struct RouterSession {
    id: Id,
    transport: Arc<dyn SessionTransport>,
    realms: Arc<RealmManager>,
    realm: Option<Arc<Realm>>,
    state: SessionState,
    previous_session_id: Option<Id>,
}

impl RouterSession {
    pub fn new(id: Id, transport: Arc<dyn SessionTransport>, realms: Arc<RealmManager>) -> Self {
        Self {
            id,
            transport,
            realms,
            realm: None,
            state: SessionState::Initial,
            previous_session_id: None,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn previous_session_id(&self) -> Option<Id> {
        self.previous_session_id
    }

    /// Dispatches one inbound message according to the current state.
    pub async fn handle_message(&mut self, message: Message) -> Result<()> {
        match &self.state {
            SessionState::Initial => match message {
                Message::Hello(hello) => self.handle_hello(hello.realm, hello.details).await,
                Message::Abort(_) => self.handle_abort().await,
                other => {
                    log::debug!("ignoring {} before HELLO", other.message_name());
                    Ok(())
                }
            },
            SessionState::PendingAuth(_) => match message {
                Message::Authenticate(authenticate) => {
                    self.handle_authenticate(authenticate.signature, authenticate.extra).await
                }
                Message::Abort(_) => self.handle_abort().await,
                other => {
                    log::debug!("ignoring {} while authenticating", other.message_name());
                    Ok(())
                }
            },
            SessionState::Joined(_) => match message {
                Message::Hello(_) => {
                    log::warn!("protocol violation: HELLO received after session {} joined", self.id);
                    Ok(())
                }
                Message::Goodbye(goodbye) => self.handle_goodbye(goodbye.reason).await,
                other => {
                    let realm = self.realm.clone().expect("realm set once joined");
                    realm.router.process(self.id, other).await
                }
            },
            SessionState::Closed => Ok(()),
        }
    }

    /// The transport beneath this session vanished. Detaches if attached and tears down state;
    /// never attempts to send, since there is nothing left to send to.
    pub async fn on_transport_lost(&mut self) {
        if let SessionState::Joined(_) = &self.state {
            if let Some(realm) = &self.realm {
                if let Err(err) = realm.router.detach(self.id).await {
                    log::warn!("failed to detach session {} on transport loss: {err}", self.id);
                }
                if let Some(cbtid) = self.transport.transport_details().cbtid.clone() {
                    realm.cookie_store.unbind_transport(&cbtid, self.id).await;
                }
                if let Err(err) = realm.meta.publish_on_leave(self.id).await {
                    log::warn!("failed to publish on_leave for session {}: {err}", self.id);
                }
            }
        }
        self.state = SessionState::Closed;
        self.realm = None;
    }

    async fn handle_hello(&mut self, realm_uri: Uri, details: Dictionary) -> Result<()> {
        let realm = match self.realms.get(&realm_uri).await {
            Some(realm) => realm,
            None => {
                return self
                    .close_with_abort(
                        Uri::from_known("wamp.error.no_such_realm"),
                        format!("no such realm: {}", realm_uri.as_ref()),
                    )
                    .await;
            }
        };
        self.realm = Some(realm.clone());

        if let Some(pre) = self.transport.transport_details().pre_authenticated.clone() {
            let authmethod = match AuthMethod::try_from(pre.authmethod.as_str()) {
                Ok(method) => method,
                Err(_) => {
                    return self
                        .close_with_abort(
                            Uri::from_known("wamp.error.no_auth_method"),
                            "invalid authmethod".to_owned(),
                        )
                        .await;
                }
            };
            if !realm.router.has_role(&pre.authrole).await {
                return self
                    .close_with_abort(
                        Uri::from_known("wamp.error.no_such_role"),
                        format!("no such role: {}", pre.authrole),
                    )
                    .await;
            }
            let outcome = AuthOutcome::Accept {
                identity: Identity {
                    id: pre.authid,
                    role: pre.authrole,
                },
                provider: "transport".to_owned(),
                authextra: pre.authextra,
            };
            return self.finish_auth(outcome, authmethod).await;
        }

        let peer_methods: Vec<AuthMethod> = match details.get("authmethods") {
            Some(Value::List(methods)) => methods
                .iter()
                .filter_map(|value| value.string())
                .filter_map(|method| AuthMethod::try_from(method.as_str()).ok())
                .collect(),
            _ => vec![AuthMethod::Anonymous],
        };

        if let Some(cbtid) = self.transport.transport_details().cbtid.clone() {
            if peer_methods.contains(&AuthMethod::Cookie) {
                if let Some(auth) = realm.cookie_store.get_auth(&cbtid).await {
                    let outcome = AuthOutcome::Accept {
                        identity: Identity {
                            id: auth.authid,
                            role: auth.authrole,
                        },
                        provider: "cookie".to_owned(),
                        authextra: auth.authextra,
                    };
                    return self.finish_auth(outcome, AuthMethod::Cookie).await;
                }
            }
        }

        let non_cookie_methods: Vec<AuthMethod> =
            peer_methods.into_iter().filter(|method| *method != AuthMethod::Cookie).collect();
        let mut pending = match realm.auth_registry.negotiate(&non_cookie_methods) {
            Ok(pending) => pending,
            Err(_) => {
                return self
                    .close_with_abort(
                        Uri::from_known("wamp.error.no_auth_method"),
                        "no auth method could be negotiated".to_owned(),
                    )
                    .await;
            }
        };
        let authmethod = pending.method();
        let outcome = pending.hello(realm.uri(), &details).await?;
        match outcome {
            AuthOutcome::Challenge { extra } => {
                self.transport
                    .send(Message::Challenge(ChallengeMessage {
                        auth_method: authmethod.into(),
                        extra,
                    }))
                    .await?;
                self.state = SessionState::PendingAuth(pending);
                Ok(())
            }
            other => self.finish_auth(other, authmethod).await,
        }
    }

    async fn handle_authenticate(&mut self, signature: String, extra: Dictionary) -> Result<()> {
        let state = std::mem::replace(&mut self.state, SessionState::Initial);
        let SessionState::PendingAuth(mut pending) = state else {
            self.state = state;
            return self
                .close_with_abort(
                    Uri::from_known("wamp.error.no_auth_method"),
                    "no authentication in progress".to_owned(),
                )
                .await;
        };
        let authmethod = pending.method();
        let outcome = pending.authenticate(&signature, &extra).await?;
        match outcome {
            AuthOutcome::Challenge { extra } => {
                self.transport
                    .send(Message::Challenge(ChallengeMessage {
                        auth_method: authmethod.into(),
                        extra,
                    }))
                    .await?;
                self.state = SessionState::PendingAuth(pending);
                Ok(())
            }
            other => self.finish_auth(other, authmethod).await,
        }
    }

    async fn handle_abort(&mut self) -> Result<()> {
        self.state = SessionState::Closed;
        self.realm = None;
        Ok(())
    }

    async fn finish_auth(&mut self, outcome: AuthOutcome, authmethod: AuthMethod) -> Result<()> {
        match outcome {
            AuthOutcome::Accept { identity, provider, authextra } => {
                self.accept(identity, authmethod, provider, authextra).await
            }
            AuthOutcome::Challenge { extra } => {
                self.transport
                    .send(Message::Challenge(ChallengeMessage {
                        auth_method: authmethod.into(),
                        extra,
                    }))
                    .await
            }
            AuthOutcome::Deny { reason, message } => self.close_with_abort(reason, message).await,
        }
    }

    async fn accept(
        &mut self,
        identity: Identity,
        authmethod: AuthMethod,
        provider: String,
        mut authextra: Dictionary,
    ) -> Result<()> {
        let realm = self.realm.clone().expect("realm resolved before accept");
        let roles = realm.router.attach(self.id, &identity.role).await?;

        authextra.insert("x_cb_node".to_owned(), Value::String(realm.node_id.clone()));
        authextra.insert("x_cb_worker".to_owned(), Value::String(realm.worker_id.clone()));
        authextra.insert(
            "x_cb_peer".to_owned(),
            Value::String(self.transport.transport_details().peer.clone()),
        );
        authextra.insert("x_cb_pid".to_owned(), Value::String(std::process::id().to_string()));

        let cbtid = self.transport.transport_details().cbtid.clone();
        if let Some(cbtid) = &cbtid {
            if authmethod != AuthMethod::Cookie {
                realm
                    .cookie_store
                    .set_auth(cbtid, CookieAuth {
                        authid: identity.id.clone(),
                        authrole: identity.role.clone(),
                        authmethod,
                        authextra: authextra.clone(),
                        realm: realm.uri().clone(),
                    })
                    .await?;
            }
            realm.cookie_store.bind_transport(cbtid, self.id, self.transport.clone()).await;
        }

        let details = SessionDetails {
            realm: realm.uri().clone(),
            session_id: self.id,
            authid: identity.id,
            authrole: identity.role,
            authmethod,
            authprovider: provider,
            authextra,
            serializer: self.transport.transport_details().serializer.clone(),
            resumed: false,
            resumable: false,
            resume_token: None,
        };

        self.transport
            .send(Message::Welcome(WelcomeMessage {
                session: self.id,
                details: welcome_details(&details, roles, &realm.agent),
            }))
            .await?;

        realm.meta.publish_on_join(self.id, &details.authid, &details.authrole).await?;

        self.state = SessionState::Joined(JoinedState { details, goodbye_sent: false });
        Ok(())
    }

    async fn handle_goodbye(&mut self, peer_reason: Uri) -> Result<()> {
        let SessionState::Joined(joined) = &mut self.state else {
            return Ok(());
        };
        if !joined.goodbye_sent {
            self.transport
                .send(Message::Goodbye(GoodbyeMessage {
                    details: Dictionary::default(),
                    reason: Uri::from_known("wamp.close.goodbye_and_out"),
                }))
                .await?;
            if let SessionState::Joined(joined) = &mut self.state {
                joined.goodbye_sent = true;
            }
        }

        let realm = self.realm.clone().expect("realm set once joined");
        if let Err(err) = realm.router.detach(self.id).await {
            log::warn!("failed to detach session {} on goodbye: {err}", self.id);
        }

        if let Some(cbtid) = self.transport.transport_details().cbtid.clone() {
            if CloseReason::from_uri(&peer_reason) == Some(CloseReason::LogOut) {
                realm.cookie_store.del_auth(&cbtid).await?;
                let kicked = realm.cookie_store.kick_others(&cbtid, self.id).await;
                log::info!("logout for session {} kicked {kicked} other transport(s) sharing cookie {cbtid}", self.id);
            } else {
                realm.cookie_store.unbind_transport(&cbtid, self.id).await;
            }
        }

        self.previous_session_id = Some(self.id);
        self.state = SessionState::Initial;
        self.realm = None;

        realm.meta.publish_on_leave(self.previous_session_id.expect("just set")).await?;
        Ok(())
    }

    async fn close_with_abort(&mut self, reason: Uri, message: String) -> Result<()> {
        let _ = self.transport.send(abort_message(reason, message)).await;
        let _ = self.transport.abort().await;
        self.state = SessionState::Closed;
        self.realm = None;
        Ok(())
    }
}

fn welcome_details(details: &SessionDetails, roles: AttachedRoles, agent: &str) -> Dictionary {
    let mut roles_dict = Dictionary::default();
    if roles.broker {
        roles_dict.insert("broker".to_owned(), Value::Dictionary(Dictionary::default()));
    }
    if roles.dealer {
        roles_dict.insert("dealer".to_owned(), Value::Dictionary(Dictionary::default()));
    }
    Dictionary::from_iter([
        ("agent".to_owned(), Value::String(agent.to_owned())),
        ("roles".to_owned(), Value::Dictionary(roles_dict)),
        ("authid".to_owned(), Value::String(details.authid.clone())),
        ("authrole".to_owned(), Value::String(details.authrole.clone())),
        ("authmethod".to_owned(), Value::String(details.authmethod.into())),
        ("authprovider".to_owned(), Value::String(details.authprovider.clone())),
        ("authextra".to_owned(), Value::Dictionary(details.authextra.clone())),
    ])
}
