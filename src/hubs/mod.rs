pub mod activator;
pub mod descriptor;
pub mod dispatcher;
pub mod registry;

pub use activator::{DefaultHubActivator, HubActivator};
pub use descriptor::{Hub, HubDescriptor, HubType};
pub use dispatcher::HubDispatcher;
pub use registry::HubRegistry;
