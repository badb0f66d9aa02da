use std::{
    fmt::Display,
    str::FromStr,
};

use battler_wamp_values::{
    Value,
    WampDeserialize,
    WampDeserializeError,
    WampSerialize,
    WampSerializeError,
};
use serde_string_enum::{
    DeserializeStringEnum,
    SerializeStringEnum,
};

/// Authentication methods a realm may offer to joining peers.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, SerializeStringEnum, DeserializeStringEnum,
)]
pub enum AuthMethod {
    /// No credentials; the client chooses (or is assigned) an identity that nothing verifies.
    #[default]
    Anonymous,
    /// A static, shared-secret ticket sent in cleartext on AUTHENTICATE.
    Ticket,
    /// WAMP Challenge-Response Authentication: an HMAC-signed server nonce.
    WampCra,
    /// WAMP Salted Challenge Response Authentication Mechanism (RFC 5802, adapted).
    Scram,
    /// WAMP-Cryptosign: an Ed25519 signature over a server-issued nonce.
    Cryptosign,
    /// Authentication performed out of band by the transport (e.g. mutual TLS).
    Tls,
    /// A previously-established identity recalled via a browser cookie id.
    Cookie,
    /// The connection is implicitly trusted (e.g. a local/embedded session).
    Trusted,
}

impl TryFrom<&str> for AuthMethod {
    type Error = anyhow::Error;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "anonymous" => Ok(Self::Anonymous),
            "ticket" => Ok(Self::Ticket),
            "wampcra" => Ok(Self::WampCra),
            "wamp-scram" => Ok(Self::Scram),
            "cryptosign" => Ok(Self::Cryptosign),
            "tls" => Ok(Self::Tls),
            "cookie" => Ok(Self::Cookie),
            "trusted" => Ok(Self::Trusted),
            _ => Err(Self::Error::msg(format!("invalid auth method: {value}"))),
        }
    }
}

impl FromStr for AuthMethod {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

impl Into<&'static str> for AuthMethod {
    fn into(self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Ticket => "ticket",
            Self::WampCra => "wampcra",
            Self::Scram => "wamp-scram",
            Self::Cryptosign => "cryptosign",
            Self::Tls => "tls",
            Self::Cookie => "cookie",
            Self::Trusted => "trusted",
        }
    }
}

impl Into<String> for AuthMethod {
    fn into(self) -> String {
        Into::<&'static str>::into(self).to_owned()
    }
}

impl Display for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Into::<&'static str>::into(*self))
    }
}

impl WampSerialize for AuthMethod {
    fn wamp_serialize(self) -> Result<Value, WampSerializeError> {
        Ok(Value::String(self.into()))
    }
}

impl WampDeserialize for AuthMethod {
    fn wamp_deserialize(value: Value) -> Result<Self, WampDeserializeError> {
        value
            .string()
            .ok_or_else(|| WampDeserializeError::new("auth method must be a string"))?
            .try_into()
            .map_err(|err: anyhow::Error| WampDeserializeError::new(err.to_string()))
    }
}
