pub mod config;
pub mod cookie;
pub mod embedded;
pub mod factory;
pub mod meta;
pub mod realm;
pub mod realm_store;
pub mod router_capability;
pub mod session;
pub mod transport;

pub use config::{
    AuthConfig,
    AuthMethodConfig,
    RealmConfig,
    RouterConfig,
    StatsConfig,
};
pub use cookie::{
    CookieAuth,
    CookieStore,
    InMemoryCookieStore,
};
pub use embedded::{
    ApplicationSession,
    EmbeddedSession,
};
pub use factory::SessionFactory;
pub use meta::{
    MetaPublisher,
    StatsRecord,
    StatsTracker,
};
pub use realm::{
    Realm,
    RealmManager,
};
pub use realm_store::{
    NullRealmStore,
    RealmStore,
};
pub use router_capability::{
    AttachedRoles,
    Router,
};
pub use session::{
    RouterSession,
    SessionDetails,
};
pub use transport::{
    PreAuthenticated,
    SessionTransport,
    TransportDetails,
};
