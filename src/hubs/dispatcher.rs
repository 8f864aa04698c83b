use super::{HubActivator, HubRegistry};
use crate::error::{ActivationError, HostError};
use crate::hosting::{ConnectionRequest, PersistentConnection};
use crate::services::{Activate, ResolverExt, ServiceResolver};
use axum::{
    http::Method,
    response::{IntoResponse, Response},
    Json,
};
use futures_util::future::BoxFuture;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct Invocation {
    method: String,
    #[serde(default)]
    args: Vec<Value>,
}

/// The connection mapped by the hub registration helpers. Lists hubs and
/// hands each call to a freshly activated hub.
pub struct HubDispatcher {
    registry: Arc<HubRegistry>,
    activator: Arc<dyn HubActivator>,
}

impl Activate for HubDispatcher {
    fn activate(services: &dyn ServiceResolver) -> Result<Self, ActivationError> {
        let registry = services.require::<HubRegistry>()?;
        let activator = services.require::<Arc<dyn HubActivator>>()?;

        Ok(Self {
            registry,
            activator: activator.as_ref().clone(),
        })
    }
}

impl HubDispatcher {
    fn list_hubs(&self) -> Response {
        let hubs: Vec<Value> = self
            .registry
            .descriptors()
            .map(|descriptor| {
                json!({
                    "name": descriptor.name,
                    "activatable": descriptor.is_activatable(),
                })
            })
            .collect();

        Json(json!({ "hubs": hubs })).into_response()
    }

    async fn invoke(&self, hub_name: &str, request: &ConnectionRequest) -> Result<Response, HostError> {
        let descriptor = self
            .registry
            .get(hub_name)
            .ok_or_else(|| HostError::HubNotFound(hub_name.to_string()))?;

        let invocation: Invocation = request.json()?;

        let hub = self
            .activator
            .create(Some(descriptor), request.services.as_ref())?
            .ok_or_else(|| HostError::HubUnavailable(descriptor.name.clone()))?;

        debug!("Invoking {}.{}", descriptor.name, invocation.method);
        let result = hub.invoke(&invocation.method, invocation.args).await?;

        Ok(Json(json!({
            "hub": descriptor.name,
            "method": invocation.method,
            "result": result,
        }))
        .into_response())
    }
}

impl PersistentConnection for HubDispatcher {
    fn process_request(&self, request: ConnectionRequest) -> BoxFuture<'_, Result<Response, HostError>> {
        Box::pin(async move {
            let segments: Vec<String> = request.segments().into_iter().map(str::to_string).collect();

            match (&request.method, segments.as_slice()) {
                (&Method::GET, [hubs]) if hubs.as_str() == "hubs" => Ok(self.list_hubs()),
                (&Method::POST, [hub]) => self.invoke(hub, &request).await,
                _ => Err(HostError::NotFound(request.path.clone())),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosting::{AppBuilder, RealtimeBuilderExt};
    use crate::hubs::{DefaultHubActivator, Hub, HubDescriptor, HubType};
    use crate::services::ServiceCollection;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Router,
    };
    use tower::ServiceExt;

    struct Suffix(&'static str);

    struct ShoutHub {
        suffix: Arc<Suffix>,
    }

    impl Activate for ShoutHub {
        fn activate(services: &dyn ServiceResolver) -> Result<Self, ActivationError> {
            Ok(Self {
                suffix: services.require::<Suffix>()?,
            })
        }
    }

    impl Hub for ShoutHub {
        fn invoke<'a>(&'a self, method: &'a str, args: Vec<Value>) -> BoxFuture<'a, Result<Value, HostError>> {
            Box::pin(async move {
                match method {
                    "shout" => {
                        let text = args.first().and_then(Value::as_str).unwrap_or_default();
                        Ok(json!(format!("{}{}", text.to_uppercase(), self.suffix.0)))
                    }
                    other => Err(HostError::MethodNotFound {
                        hub: "ShoutHub".to_string(),
                        method: other.to_string(),
                    }),
                }
            })
        }
    }

    fn app(with_suffix: bool) -> Router {
        let registry = HubRegistry::new()
            .with_hub(HubDescriptor::of::<ShoutHub>())
            .with_hub(HubDescriptor::unbound("Placeholder"))
            .with_hub(HubDescriptor::new(
                "Broken",
                HubType::from_fn("Broken", |_| {
                    Err(ActivationError::Constructor {
                        type_name: "Broken",
                        reason: "always fails".into(),
                    })
                }),
            ));

        let mut services = ServiceCollection::new()
            .add_singleton(registry)
            .add_scoped::<Arc<dyn HubActivator>, _>(|scope| {
                Ok(Arc::new(DefaultHubActivator::new(scope.root().clone())) as Arc<dyn HubActivator>)
            });
        if with_suffix {
            services = services.add_singleton(Suffix("!"));
        }

        AppBuilder::new(services.build()).use_realtime().build()
    }

    async fn call(router: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
        let response = router
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(body)
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn lists_registered_hubs() {
        let (status, json) = call(app(true), Method::GET, "/signalr/hubs", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["hubs"],
            json!([
                { "name": "Broken", "activatable": true },
                { "name": "Placeholder", "activatable": false },
                { "name": "ShoutHub", "activatable": true },
            ])
        );
    }

    #[tokio::test]
    async fn invokes_hub_method() {
        let (status, json) = call(
            app(true),
            Method::POST,
            "/signalr/shouthub",
            Some(json!({ "method": "shout", "args": ["hey"] })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["hub"], "ShoutHub");
        assert_eq!(json["result"], "HEY!");
    }

    #[tokio::test]
    async fn unknown_hub_is_not_found() {
        let (status, json) = call(
            app(true),
            Method::POST,
            "/signalr/nope",
            Some(json!({ "method": "shout" })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["type"], "HubNotFound");
    }

    #[tokio::test]
    async fn hub_without_instance_is_unavailable() {
        for hub in ["placeholder", "broken"] {
            let (status, json) = call(
                app(true),
                Method::POST,
                &format!("/signalr/{}", hub),
                Some(json!({ "method": "x" })),
            )
            .await;

            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(json["error"]["type"], "HubUnavailable");
        }
    }

    #[tokio::test]
    async fn missing_dependency_in_both_scopes_is_unavailable() {
        let (status, _) = call(
            app(false),
            Method::POST,
            "/signalr/shouthub",
            Some(json!({ "method": "shout", "args": ["hey"] })),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn unknown_method_and_bad_body() {
        let (status, json) = call(
            app(true),
            Method::POST,
            "/signalr/shouthub",
            Some(json!({ "method": "whisper" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["type"], "MethodNotFound");

        let (status, json) = call(app(true), Method::POST, "/signalr/shouthub", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["type"], "BadRequest");
    }

    #[tokio::test]
    async fn other_routes_are_not_found() {
        let (status, _) = call(app(true), Method::GET, "/signalr", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(app(true), Method::DELETE, "/signalr/shouthub", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
