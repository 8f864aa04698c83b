use crate::services::ResolutionScope;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Why a handler could not be constructed from a resolution scope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActivationError {
    #[error("service `{service}` is not registered in the {scope} scope")]
    MissingService {
        service: &'static str,
        scope: ResolutionScope,
    },
    #[error("the {scope} scope has been disposed")]
    ScopeDisposed { scope: ResolutionScope },
    #[error("constructor of `{type_name}` failed: {reason}")]
    Constructor {
        type_name: &'static str,
        reason: String,
    },
}

#[derive(Debug)]
pub enum HostError {
    InvalidArgument(&'static str),
    ConfigurationError(String),
    ActivationFailed {
        type_name: String,
        source: ActivationError,
    },
    HubNotFound(String),
    HubUnavailable(String),
    MethodNotFound {
        hub: String,
        method: String,
    },
    BadRequest(String),
    PayloadTooLarge(usize),
    NotFound(String),
    InternalError(String),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::InvalidArgument(name) => write!(f, "Invalid argument: `{}` is required", name),
            HostError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            HostError::ActivationFailed { type_name, source } => {
                write!(f, "Failed to activate {}: {}", type_name, source)
            }
            HostError::HubNotFound(hub) => write!(f, "Hub '{}' is not registered", hub),
            HostError::HubUnavailable(hub) => write!(f, "Hub '{}' could not be created", hub),
            HostError::MethodNotFound { hub, method } => {
                write!(f, "Hub '{}' has no method '{}'", hub, method)
            }
            HostError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            HostError::PayloadTooLarge(limit) => {
                write!(f, "Request body exceeds the {} byte limit", limit)
            }
            HostError::NotFound(path) => write!(f, "No route for {}", path),
            HostError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for HostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HostError::ActivationFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl HostError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HostError::InvalidArgument(_) | HostError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HostError::ConfigurationError(_)
            | HostError::ActivationFailed { .. }
            | HostError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HostError::HubNotFound(_) | HostError::MethodNotFound { .. } | HostError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            HostError::HubUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            HostError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            HostError::InvalidArgument(_) => "InvalidArgument",
            HostError::ConfigurationError(_) => "ConfigurationError",
            HostError::ActivationFailed { .. } => "ActivationFailed",
            HostError::HubNotFound(_) => "HubNotFound",
            HostError::HubUnavailable(_) => "HubUnavailable",
            HostError::MethodNotFound { .. } => "MethodNotFound",
            HostError::BadRequest(_) => "BadRequest",
            HostError::PayloadTooLarge(_) => "PayloadTooLarge",
            HostError::NotFound(_) => "NotFound",
            HostError::InternalError(_) => "InternalError",
        }
    }
}

impl IntoResponse for HostError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = json!({
            "error": {
                "type": self.error_type(),
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        });

        (status, Json(body)).into_response()
    }
}

impl From<serde_json::Error> for HostError {
    fn from(err: serde_json::Error) -> Self {
        HostError::BadRequest(format!("JSON error: {}", err))
    }
}
