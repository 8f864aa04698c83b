use super::HubDescriptor;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Hub descriptors keyed by case-insensitive name.
#[derive(Debug, Default)]
pub struct HubRegistry {
    hubs: BTreeMap<String, HubDescriptor>,
}

impl HubRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hub(mut self, descriptor: HubDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    pub fn register(&mut self, descriptor: HubDescriptor) {
        let key = descriptor.name.to_ascii_lowercase();
        if let Some(previous) = self.hubs.insert(key, descriptor) {
            warn!("Hub '{}' was registered twice, keeping the latest", previous.name);
        } else {
            debug!("Registered hub, {} total", self.hubs.len());
        }
    }

    pub fn get(&self, name: &str) -> Option<&HubDescriptor> {
        self.hubs.get(&name.to_ascii_lowercase())
    }

    /// Descriptors ordered by name.
    pub fn descriptors(&self) -> impl Iterator<Item = &HubDescriptor> {
        self.hubs.values()
    }

    pub fn len(&self) -> usize {
        self.hubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hubs.is_empty()
    }
}
