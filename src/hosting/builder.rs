use super::{ConnectionType, PersistentConnection, PersistentConnectionMiddleware};
use crate::services::{Activate, ServiceProvider};
use axum::{
    body::Body,
    http::Request,
    response::IntoResponse,
    Router,
};
use std::convert::Infallible;
use std::sync::Arc;
use tower::Service;
use tracing::{info, warn};

/// Where hubs are mapped when no path is given.
pub const DEFAULT_HUB_PATH: &str = "/signalr";

/// Pipeline under construction, together with the application services
/// every middleware added to it can draw from.
pub struct AppBuilder {
    router: Router,
    services: Arc<ServiceProvider>,
    mapped: Vec<String>,
    has_fallback: bool,
}

impl AppBuilder {
    pub fn new(services: Arc<ServiceProvider>) -> Self {
        Self::from_router(Router::new(), services)
    }

    /// `router` must not carry a fallback of its own.
    pub fn from_router(router: Router, services: Arc<ServiceProvider>) -> Self {
        Self {
            router,
            services,
            mapped: Vec::new(),
            has_fallback: false,
        }
    }

    pub fn application_services(&self) -> &Arc<ServiceProvider> {
        &self.services
    }

    /// Branch the pipeline: requests under `path` go to the sub-pipeline
    /// built by `configure`, which sees paths with the prefix removed.
    ///
    /// A path can be mapped once; later maps of the same path are skipped
    /// with a warning. Mapping `/` merges the branch into this pipeline, so
    /// it is skipped as well when both already end in middleware.
    pub fn map<F>(mut self, path: &str, configure: F) -> Self
    where
        F: FnOnce(AppBuilder) -> AppBuilder,
    {
        let path = normalize_path(path);
        if self.mapped.contains(&path) {
            warn!("Path {} is already mapped, ignoring the new branch", path);
            return self;
        }

        let branch = configure(AppBuilder::new(self.services.clone()));

        if path == "/" {
            if self.has_fallback && branch.has_fallback {
                warn!("Pipeline already ends in middleware, ignoring the branch mapped at /");
                return self;
            }
            self.has_fallback |= branch.has_fallback;
            self.router = self.router.merge(branch.router);
        } else {
            self.router = self.router.nest_service(&path, branch.router);
        }

        self.mapped.push(path);
        self
    }

    pub fn is_mapped(&self, path: &str) -> bool {
        self.mapped.contains(&normalize_path(path))
    }

    /// Terminal middleware for whatever the pipeline has not routed.
    pub fn use_middleware<S>(self, middleware: S) -> Self
    where
        S: Service<Request<Body>, Error = Infallible> + Clone + Send + 'static,
        S::Response: IntoResponse,
        S::Future: Send + 'static,
    {
        Self {
            router: self.router.fallback_service(middleware),
            services: self.services,
            mapped: self.mapped,
            has_fallback: true,
        }
    }

    pub fn build(self) -> Router {
        self.router
    }
}

/// Registration helpers for real-time endpoints.
pub trait RealtimeBuilderExt: Sized {
    /// Map hubs at [`DEFAULT_HUB_PATH`].
    fn use_realtime(self) -> Self {
        self.use_realtime_at(DEFAULT_HUB_PATH)
    }

    fn use_realtime_at(self, path: &str) -> Self;

    fn use_connection<C>(self, path: &str) -> Self
    where
        C: PersistentConnection + Activate + 'static,
    {
        self.use_connection_type(path, ConnectionType::of::<C>())
    }

    fn use_connection_type(self, path: &str, connection_type: ConnectionType) -> Self;

    /// Add the hub dispatcher to this pipeline without mapping a path.
    fn run_realtime(self) -> Self {
        self.run_connection_type(ConnectionType::hub_dispatcher())
    }

    fn run_connection<C>(self) -> Self
    where
        C: PersistentConnection + Activate + 'static,
    {
        self.run_connection_type(ConnectionType::of::<C>())
    }

    fn run_connection_type(self, connection_type: ConnectionType) -> Self;
}

impl RealtimeBuilderExt for AppBuilder {
    fn use_realtime_at(self, path: &str) -> Self {
        self.map(path, |sub| sub.run_realtime())
    }

    fn use_connection_type(self, path: &str, connection_type: ConnectionType) -> Self {
        self.map(path, move |sub| sub.run_connection_type(connection_type))
    }

    fn run_connection_type(self, connection_type: ConnectionType) -> Self {
        info!("Registering {} middleware", connection_type.name());
        let middleware = PersistentConnectionMiddleware::new(self.services.clone(), connection_type);
        self.use_middleware(middleware)
    }
}

/// Leading slash added, trailing slashes removed; empty becomes `/`.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    format!("/{}", trimmed)
}
