use super::{Hub, HubDescriptor};
use crate::error::HostError;
use crate::services::ServiceResolver;
use std::sync::Arc;
use tracing::{debug, warn};

/// Creates hub instances for descriptors.
pub trait HubActivator: Send + Sync {
    /// `Ok(None)` means there was nothing to activate, or no scope could
    /// construct the hub.
    fn create(
        &self,
        descriptor: Option<&HubDescriptor>,
        request_services: &dyn ServiceResolver,
    ) -> Result<Option<Box<dyn Hub>>, HostError>;
}

/// Constructs hubs from the request scope, then from the process-wide
/// provider. Construction failures are swallowed after both attempts.
#[derive(Clone)]
pub struct DefaultHubActivator {
    services: Arc<dyn ServiceResolver>,
}

impl DefaultHubActivator {
    pub fn new(services: Arc<dyn ServiceResolver>) -> Self {
        Self { services }
    }
}

impl HubActivator for DefaultHubActivator {
    fn create(
        &self,
        descriptor: Option<&HubDescriptor>,
        request_services: &dyn ServiceResolver,
    ) -> Result<Option<Box<dyn Hub>>, HostError> {
        let descriptor = descriptor.ok_or(HostError::InvalidArgument("descriptor"))?;

        let Some(hub_type) = descriptor.hub_type.as_ref() else {
            debug!("Hub '{}' has no handler type, nothing to activate", descriptor.name);
            return Ok(None);
        };

        let attempts: [&dyn ServiceResolver; 2] = [request_services, self.services.as_ref()];

        for services in attempts {
            match hub_type.create_instance(services) {
                Ok(hub) => {
                    debug!(
                        "Activated hub '{}' ({}) from the {} scope",
                        descriptor.name,
                        hub_type.name(),
                        services.scope()
                    );
                    return Ok(Some(hub));
                }
                Err(e) => {
                    debug!(
                        "Could not activate hub '{}' from the {} scope: {}",
                        descriptor.name,
                        services.scope(),
                        e
                    );
                }
            }
        }

        warn!("Hub '{}' could not be activated from any scope", descriptor.name);
        Ok(None)
    }
}
