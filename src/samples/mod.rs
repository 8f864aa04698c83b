//! Hubs and connections served by the `rtf` binary.

use crate::error::{ActivationError, HostError};
use crate::hosting::{ConnectionRequest, PersistentConnection, RequestContext};
use crate::hubs::{Hub, HubDescriptor, HubRegistry};
use crate::services::{Activate, ResolverExt, ServiceResolver};
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::future::BoxFuture;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Process-wide call counter shared by every [`CounterHub`].
#[derive(Debug, Default)]
pub struct InvocationCounter(AtomicU64);

impl InvocationCounter {
    pub fn increment(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

fn method_not_found(hub: &str, method: &str) -> HostError {
    HostError::MethodNotFound {
        hub: hub.to_string(),
        method: method.to_string(),
    }
}

pub struct EchoHub;

impl Activate for EchoHub {
    fn activate(_services: &dyn ServiceResolver) -> Result<Self, ActivationError> {
        Ok(EchoHub)
    }
}

impl Hub for EchoHub {
    fn invoke<'a>(&'a self, method: &'a str, args: Vec<Value>) -> BoxFuture<'a, Result<Value, HostError>> {
        Box::pin(async move {
            match method {
                "echo" => Ok(args.into_iter().next().unwrap_or(Value::Null)),
                other => Err(method_not_found("EchoHub", other)),
            }
        })
    }
}

/// Only constructible inside a request: it needs the request's context.
pub struct CounterHub {
    counter: Arc<InvocationCounter>,
    context: Arc<RequestContext>,
}

impl Activate for CounterHub {
    fn activate(services: &dyn ServiceResolver) -> Result<Self, ActivationError> {
        Ok(Self {
            counter: services.require::<InvocationCounter>()?,
            context: services.require::<RequestContext>()?,
        })
    }
}

impl Hub for CounterHub {
    fn invoke<'a>(&'a self, method: &'a str, _args: Vec<Value>) -> BoxFuture<'a, Result<Value, HostError>> {
        Box::pin(async move {
            match method {
                "increment" => Ok(json!(self.counter.increment())),
                "current" => Ok(json!(self.counter.current())),
                "whoami" => Ok(json!(self.context.request_id.to_string())),
                other => Err(method_not_found("CounterHub", other)),
            }
        })
    }
}

/// Answers every request with its own body.
pub struct EchoConnection;

impl Activate for EchoConnection {
    fn activate(_services: &dyn ServiceResolver) -> Result<Self, ActivationError> {
        Ok(EchoConnection)
    }
}

impl PersistentConnection for EchoConnection {
    fn process_request(&self, request: ConnectionRequest) -> BoxFuture<'_, Result<Response, HostError>> {
        Box::pin(async move {
            let content_type = request
                .headers
                .get(header::CONTENT_TYPE)
                .cloned()
                .unwrap_or_else(|| header::HeaderValue::from_static("application/octet-stream"));

            Ok((StatusCode::OK, [(header::CONTENT_TYPE, content_type)], request.body).into_response())
        })
    }
}

pub fn sample_registry() -> HubRegistry {
    HubRegistry::new()
        .with_hub(HubDescriptor::of::<EchoHub>())
        .with_hub(HubDescriptor::of::<CounterHub>())
}
