use super::{ConnectionRequest, ConnectionType, RequestContext};
use crate::config::HostConfig;
use crate::error::HostError;
use crate::services::{ResolverExt, ServiceProvider};
use axum::{
    body::{to_bytes, Body},
    http::Request,
    response::{IntoResponse, Response},
};
use futures_util::future::BoxFuture;
use http_body_util::LengthLimitError;
use std::convert::Infallible;
use std::error::Error as StdError;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;
use tracing::{debug, error};

pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Terminal middleware: opens a request scope, activates the connection
/// from it and lets the connection answer.
#[derive(Clone)]
pub struct PersistentConnectionMiddleware {
    connection_type: ConnectionType,
    services: Arc<ServiceProvider>,
    max_body_bytes: usize,
}

impl PersistentConnectionMiddleware {
    pub fn new(services: Arc<ServiceProvider>, connection_type: ConnectionType) -> Self {
        let max_body_bytes = services
            .resolve::<HostConfig>()
            .map(|config| config.max_body_bytes)
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);

        Self {
            connection_type,
            services,
            max_body_bytes,
        }
    }

    pub fn connection_type(&self) -> &ConnectionType {
        &self.connection_type
    }

    async fn handle(self, req: Request<Body>) -> Result<Response, HostError> {
        let (parts, body) = req.into_parts();
        let path = parts.uri.path().to_string();

        let scope = Arc::new(self.services.create_scope());
        scope.insert(RequestContext::new(&parts.method, &path));

        let result: Result<Response, HostError> = async {
            let connection = self.connection_type.activate(scope.as_ref())?;

            let body = to_bytes(body, self.max_body_bytes)
                .await
                .map_err(|e| body_read_error(e, self.max_body_bytes))?;

            debug!(
                "Dispatching {} {} to {}",
                parts.method,
                path,
                self.connection_type.name()
            );

            connection
                .process_request(ConnectionRequest {
                    method: parts.method,
                    path,
                    query: parts.uri.query().map(|q| q.to_string()),
                    headers: parts.headers,
                    body,
                    services: scope.clone(),
                })
                .await
        }
        .await;

        scope.dispose();

        if let Err(e) = &result {
            if e.status_code().is_server_error() {
                error!("{} failed: {}", self.connection_type.name(), e);
            }
        }

        result
    }
}

fn body_read_error(err: axum::Error, limit: usize) -> HostError {
    let mut source: Option<&(dyn StdError + 'static)> = Some(&err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return HostError::PayloadTooLarge(limit);
        }
        source = e.source();
    }
    HostError::BadRequest(format!("Failed to read request body: {}", err))
}

impl Service<Request<Body>> for PersistentConnectionMiddleware {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let this = self.clone();
        Box::pin(async move { Ok(this.handle(req).await.into_response()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn only_length_limit_maps_to_payload_too_large() {
        let limited = to_bytes(Body::from("0123456789"), 4).await.unwrap_err();
        assert!(matches!(body_read_error(limited, 4), HostError::PayloadTooLarge(4)));

        let chunks: Vec<Result<&'static str, std::io::Error>> = vec![Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        ))];
        let broken = to_bytes(Body::from_stream(futures_util::stream::iter(chunks)), 4)
            .await
            .unwrap_err();
        assert!(matches!(body_read_error(broken, 4), HostError::BadRequest(_)));
    }
}
