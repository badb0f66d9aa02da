use std::sync::Arc;

use anyhow::{
    Error,
    Result,
};

use crate::auth::{
    anonymous::{
        AnonymousAuth,
        AnonymousConfig,
    },
    auth_method::AuthMethod,
    cryptosign::{
        CryptosignAuth,
        CryptosignConfig,
    },
    pending::PendingAuth,
    scram::{
        UserDatabase,
        pending::ScramAuth,
    },
    ticket::{
        TicketAuth,
        TicketConfig,
    },
    trusted::TrustedAuth,
    wampcra::{
        WampCraAuth,
        WampCraConfig,
    },
};

/// Per-realm configuration tying every supported auth method to its credentials.
///
/// A realm offers whichever methods have a configuration entry here; the peer's HELLO
/// `authmethods` list is matched against this set to pick one.
#[derive(Default)]
pub struct AuthMethodRegistry {
    anonymous: Option<AnonymousConfig>,
    ticket: Option<TicketConfig>,
    wampcra: Option<WampCraConfig>,
    scram: Option<Arc<dyn UserDatabase>>,
    cryptosign: Option<CryptosignConfig>,
    trusted: bool,
}

impl AuthMethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_anonymous(mut self, config: AnonymousConfig) -> Self {
        self.anonymous = Some(config);
        self
    }

    pub fn with_ticket(mut self, config: TicketConfig) -> Self {
        self.ticket = Some(config);
        self
    }

    pub fn with_wampcra(mut self, config: WampCraConfig) -> Self {
        self.wampcra = Some(config);
        self
    }

    pub fn with_scram(mut self, user_database: Arc<dyn UserDatabase>) -> Self {
        self.scram = Some(user_database);
        self
    }

    pub fn with_cryptosign(mut self, config: CryptosignConfig) -> Self {
        self.cryptosign = Some(config);
        self
    }

    pub fn with_trusted(mut self, trusted: bool) -> Self {
        self.trusted = trusted;
        self
    }

    /// The methods a realm can offer to a joining peer, in preference order.
    pub fn offered_methods(&self) -> Vec<AuthMethod> {
        let mut methods = Vec::new();
        if self.trusted {
            methods.push(AuthMethod::Trusted);
        }
        if self.cryptosign.is_some() {
            methods.push(AuthMethod::Cryptosign);
        }
        if self.scram.is_some() {
            methods.push(AuthMethod::Scram);
        }
        if self.wampcra.is_some() {
            methods.push(AuthMethod::WampCra);
        }
        if self.ticket.is_some() {
            methods.push(AuthMethod::Ticket);
        }
        if self.anonymous.is_some() {
            methods.push(AuthMethod::Anonymous);
        }
        methods
    }

    /// Picks the first method offered by this realm that the peer also offers, and creates a
    /// fresh [`PendingAuth`] transaction for it.
    pub fn negotiate(&self, peer_methods: &[AuthMethod]) -> Result<Box<dyn PendingAuth>> {
        for method in self.offered_methods() {
            if !peer_methods.contains(&method) {
                continue;
            }
            return self.create(method);
        }
        Err(Error::msg("no auth method"))
    }

    fn create(&self, method: AuthMethod) -> Result<Box<dyn PendingAuth>> {
        match method {
            AuthMethod::Anonymous => self
                .anonymous
                .clone()
                .map(|config| Box::new(AnonymousAuth::new(config)) as Box<dyn PendingAuth>)
                .ok_or_else(|| Error::msg("anonymous authentication is not configured")),
            AuthMethod::Ticket => self
                .ticket
                .clone()
                .map(|config| Box::new(TicketAuth::new(config)) as Box<dyn PendingAuth>)
                .ok_or_else(|| Error::msg("ticket authentication is not configured")),
            AuthMethod::WampCra => self
                .wampcra
                .clone()
                .map(|config| Box::new(WampCraAuth::new(config)) as Box<dyn PendingAuth>)
                .ok_or_else(|| Error::msg("wamp-cra authentication is not configured")),
            AuthMethod::Cryptosign => self
                .cryptosign
                .clone()
                .map(|config| Box::new(CryptosignAuth::new(config)) as Box<dyn PendingAuth>)
                .ok_or_else(|| Error::msg("cryptosign authentication is not configured")),
            AuthMethod::Trusted => {
                if self.trusted {
                    Ok(Box::new(TrustedAuth::default()))
                } else {
                    Err(Error::msg("trusted authentication is not configured"))
                }
            }
            AuthMethod::Scram => self
                .scram
                .clone()
                .map(|user_database| Box::new(ScramAuth::new(user_database)) as Box<dyn PendingAuth>)
                .ok_or_else(|| Error::msg("scram authentication is not configured")),
            AuthMethod::Tls | AuthMethod::Cookie => {
                Err(Error::msg(format!("{method} authentication is not configured")))
            }
        }
    }
}

#[cfg(test)]
mod registry_test {
    use super::*;

    #[test]
    fn offers_configured_methods_in_preference_order() {
        let registry = AuthMethodRegistry::new()
            .with_anonymous(AnonymousConfig::default())
            .with_ticket(TicketConfig::default());
        assert_eq!(
            registry.offered_methods(),
            vec![AuthMethod::Ticket, AuthMethod::Anonymous]
        );
    }

    #[test]
    fn negotiate_picks_first_mutually_supported_method() {
        let registry = AuthMethodRegistry::new()
            .with_anonymous(AnonymousConfig::default())
            .with_ticket(TicketConfig::default());
        let pending = registry
            .negotiate(&[AuthMethod::Anonymous])
            .expect("should find a match");
        assert_eq!(pending.method(), AuthMethod::Anonymous);
    }

    #[test]
    fn negotiate_fails_without_overlap() {
        let registry = AuthMethodRegistry::new().with_anonymous(AnonymousConfig::default());
        assert!(registry.negotiate(&[AuthMethod::Ticket]).is_err());
    }
}
