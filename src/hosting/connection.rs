use crate::error::{ActivationError, HostError};
use crate::hubs::HubDispatcher;
use crate::services::{short_type_name, Activate, ResolverExt, ServiceResolver, ServiceScope};
use axum::{
    body::Bytes,
    http::{HeaderMap, Method},
    response::Response,
};
use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A handler that owns every request under the path it is mapped at.
pub trait PersistentConnection: Send + Sync {
    fn process_request(&self, request: ConnectionRequest) -> BoxFuture<'_, Result<Response, HostError>>;
}

/// Facts about the in-flight request, available from its scope.
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub method: String,
    pub path: String,
    pub received_at: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(method: &Method, path: &str) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            method: method.to_string(),
            path: path.to_string(),
            received_at: Utc::now(),
        }
    }
}

/// A fully buffered request handed to a connection. `path` is relative to
/// the prefix the connection was mapped at.
pub struct ConnectionRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub services: Arc<ServiceScope>,
}

impl ConnectionRequest {
    pub fn context(&self) -> Option<Arc<RequestContext>> {
        self.services.resolve::<RequestContext>()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HostError> {
        if self.body.is_empty() {
            return Err(HostError::BadRequest("request body is empty".to_string()));
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Path split into non-empty segments.
    pub fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }
}

type ConnectionFactory =
    Arc<dyn Fn(&dyn ServiceResolver) -> Result<Arc<dyn PersistentConnection>, ActivationError> + Send + Sync>;

/// Which connection handles a mapped path. Fixed at registration time.
#[derive(Clone)]
pub struct ConnectionType {
    name: &'static str,
    factory: ConnectionFactory,
}

impl ConnectionType {
    pub fn of<C>() -> Self
    where
        C: PersistentConnection + Activate + 'static,
    {
        Self {
            name: short_type_name::<C>(),
            factory: Arc::new(|services: &dyn ServiceResolver| {
                C::activate(services).map(|connection| Arc::new(connection) as Arc<dyn PersistentConnection>)
            }),
        }
    }

    /// The connection that routes requests to registered hubs.
    pub fn hub_dispatcher() -> Self {
        Self::of::<HubDispatcher>()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn activate(&self, services: &dyn ServiceResolver) -> Result<Arc<dyn PersistentConnection>, HostError> {
        (self.factory)(services).map_err(|source| HostError::ActivationFailed {
            type_name: self.name.to_string(),
            source,
        })
    }
}

impl fmt::Debug for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConnectionType").field(&self.name).finish()
    }
}
