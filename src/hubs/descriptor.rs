use crate::error::{ActivationError, HostError};
use crate::services::{short_type_name, Activate, ServiceResolver};
use futures_util::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A hub handles method calls addressed to it by name.
pub trait Hub: Send + Sync {
    fn invoke<'a>(&'a self, method: &'a str, args: Vec<Value>) -> BoxFuture<'a, Result<Value, HostError>>;
}

type HubFactory = Arc<dyn Fn(&dyn ServiceResolver) -> Result<Box<dyn Hub>, ActivationError> + Send + Sync>;

/// The concrete handler type behind a hub descriptor.
#[derive(Clone)]
pub struct HubType {
    name: &'static str,
    factory: HubFactory,
}

impl HubType {
    pub fn of<H>() -> Self
    where
        H: Hub + Activate + 'static,
    {
        Self {
            name: short_type_name::<H>(),
            factory: Arc::new(|services: &dyn ServiceResolver| {
                H::activate(services).map(|hub| Box::new(hub) as Box<dyn Hub>)
            }),
        }
    }

    pub fn from_fn<F>(name: &'static str, factory: F) -> Self
    where
        F: Fn(&dyn ServiceResolver) -> Result<Box<dyn Hub>, ActivationError> + Send + Sync + 'static,
    {
        Self {
            name,
            factory: Arc::new(factory),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Construct the hub from the given scope, injecting its dependencies.
    pub fn create_instance(&self, services: &dyn ServiceResolver) -> Result<Box<dyn Hub>, ActivationError> {
        (self.factory)(services)
    }
}

impl fmt::Debug for HubType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HubType").field(&self.name).finish()
    }
}

#[derive(Debug, Clone)]
pub struct HubDescriptor {
    pub name: String,
    pub hub_type: Option<HubType>,
}

impl HubDescriptor {
    pub fn new(name: impl Into<String>, hub_type: HubType) -> Self {
        Self {
            name: name.into(),
            hub_type: Some(hub_type),
        }
    }

    /// Descriptor named after `H` itself.
    pub fn of<H>() -> Self
    where
        H: Hub + Activate + 'static,
    {
        let hub_type = HubType::of::<H>();
        Self::new(hub_type.name(), hub_type)
    }

    /// A name with nothing behind it; activation yields no instance.
    pub fn unbound(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hub_type: None,
        }
    }

    pub fn is_activatable(&self) -> bool {
        self.hub_type.is_some()
    }
}
