pub mod anonymous;
pub mod auth_method;
pub mod channel_binding;
pub mod cryptosign;
pub mod identity;
pub mod key_derivation_function;
pub mod pending;
pub mod registry;
pub mod scram;
pub mod ticket;
pub mod trusted;
pub mod wampcra;

pub use identity::Identity;
pub use pending::{
    AuthOutcome,
    PendingAuth,
};
pub use registry::AuthMethodRegistry;
