pub mod builder;
pub mod connection;
pub mod middleware;

pub use builder::{normalize_path, AppBuilder, RealtimeBuilderExt, DEFAULT_HUB_PATH};
pub use connection::{ConnectionRequest, ConnectionType, PersistentConnection, RequestContext};
pub use middleware::{PersistentConnectionMiddleware, DEFAULT_MAX_BODY_BYTES};
