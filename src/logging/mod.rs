use crate::config::HostConfig;
use crate::error::HostError;
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins; the configured level is the fallback directive.
pub fn env_filter(level: &str) -> Result<EnvFilter, HostError> {
    let directive = level
        .parse()
        .map_err(|e| HostError::ConfigurationError(format!("Invalid log level '{}': {}", level, e)))?;
    Ok(EnvFilter::from_default_env().add_directive(directive))
}

/// Install the global subscriber: stdout, or the configured log file
/// without ANSI colours.
pub fn init_tracing(config: &HostConfig) -> Result<(), HostError> {
    let filter = env_filter(&config.log_level)?;

    let installed = match &config.log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    HostError::ConfigurationError(format!("Failed to create log directory: {}", e))
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| HostError::ConfigurationError(format!("Failed to open log file: {}", e)))?;

            tracing_subscriber::fmt()
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .with_env_filter(filter)
                .try_init()
        }
        None => tracing_subscriber::fmt().with_env_filter(filter).try_init(),
    };

    installed.map_err(|e| HostError::InternalError(format!("Failed to install tracing subscriber: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_levels_and_directives() {
        assert!(env_filter("debug").is_ok());
        assert!(env_filter("realtime_fusion=trace").is_ok());
    }

    #[test]
    fn rejects_garbage_level() {
        assert!(matches!(
            env_filter("very=loud=please"),
            Err(HostError::ConfigurationError(_))
        ));
    }
}
