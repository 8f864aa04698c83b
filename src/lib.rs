//! Hosting glue for real-time endpoints on axum: helpers that map hub
//! dispatch or a persistent connection at a path, and a hub activator that
//! builds hubs from the request scope before falling back to the
//! process-wide services.

pub mod config;
pub mod error;
pub mod hosting;
pub mod hubs;
pub mod logging;
pub mod samples;
pub mod services;
pub mod web;

pub use error::{ActivationError, HostError};
pub use hosting::{AppBuilder, ConnectionType, PersistentConnection, RealtimeBuilderExt, DEFAULT_HUB_PATH};
pub use hubs::{DefaultHubActivator, Hub, HubActivator, HubDescriptor, HubType};
pub use services::{Activate, ResolutionScope, ServiceCollection, ServiceProvider, ServiceResolver};
