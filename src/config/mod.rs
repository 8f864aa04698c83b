mod config_manager;
mod host_config;

pub use config_manager::ConfigManager;
pub use host_config::HostConfig;
