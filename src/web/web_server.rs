use crate::config::HostConfig;
use crate::error::HostError;
use crate::hosting::{AppBuilder, RealtimeBuilderExt};
use crate::hubs::{DefaultHubActivator, HubActivator, HubRegistry};
use crate::samples::{sample_registry, EchoConnection, InvocationCounter};
use crate::services::{ResolverExt, ServiceCollection, ServiceProvider};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<HostConfig>,
    pub registry: Arc<HubRegistry>,
}

/// Application services: configuration, the sample hubs and a hub
/// activator bound to the process-wide provider.
pub fn build_services(config: HostConfig) -> Arc<ServiceProvider> {
    ServiceCollection::new()
        .add_singleton(config)
        .add_singleton(sample_registry())
        .add_singleton(InvocationCounter::default())
        .add_scoped::<Arc<dyn HubActivator>, _>(|scope| {
            Ok(Arc::new(DefaultHubActivator::new(scope.root().clone())) as Arc<dyn HubActivator>)
        })
        .build()
}

/// Paths the server routes itself; hubs cannot be mapped on or under them.
const RESERVED_PATHS: [&str; 2] = ["/api/status", "/echo"];

fn check_hub_path(hub_path: &str) -> Result<(), HostError> {
    let conflict = RESERVED_PATHS
        .iter()
        .find(|reserved| hub_path == **reserved || hub_path.starts_with(&format!("{}/", reserved)));

    match conflict {
        Some(reserved) => Err(HostError::ConfigurationError(format!(
            "hub_path '{}' collides with the built-in route {}",
            hub_path, reserved
        ))),
        None => Ok(()),
    }
}

pub struct WebServer {
    app: Router,
    addr: String,
}

impl WebServer {
    pub fn new(services: Arc<ServiceProvider>) -> Result<Self, HostError> {
        let config = services
            .resolve::<HostConfig>()
            .ok_or_else(|| HostError::ConfigurationError("HostConfig is not registered".to_string()))?;
        let registry = services
            .resolve::<HubRegistry>()
            .ok_or_else(|| HostError::ConfigurationError("HubRegistry is not registered".to_string()))?;
        check_hub_path(&config.hub_path)?;

        let state = AppState {
            config: config.clone(),
            registry,
        };

        let api = Router::new()
            // Health check
            .route("/api/status", get(super::routes::status_handler))
            .with_state(state);

        let app = AppBuilder::from_router(api, services)
            .use_realtime_at(&config.hub_path)
            .use_connection::<EchoConnection>("/echo")
            .build()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        Ok(Self {
            app,
            addr: config.bind_addr(),
        })
    }

    pub fn router(self) -> Router {
        self.app
    }

    pub async fn run(self) -> Result<(), HostError> {
        info!("Web server starting on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .map_err(|e| HostError::InternalError(format!("Failed to bind to {}: {}", self.addr, e)))?;

        axum::serve(listener, self.app)
            .await
            .map_err(|e| HostError::InternalError(format!("Server error: {}", e)))?;

        Ok(())
    }
}
