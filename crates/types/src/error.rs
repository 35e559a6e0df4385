//! Unified error type for the wayfare workspace.

use thiserror::Error;

/// Enumerates all error kinds that can occur across wayfare crates.
///
/// Every variant carries only owned strings so the gateway can fan a single
/// failure out to multiple queued callers by cloning it.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The stored session could not be renewed; credentials were cleared
    /// and the user must sign in again.
    #[error("session expired - please sign in again")]
    SessionExpired,

    /// Credential failure outside the forced-logout path (e.g. no refresh
    /// token stored, or a request still unauthorized after a refresh).
    #[error("authentication error: {0}")]
    Auth(String),

    /// The request never reached the server (connect failure or timeout).
    #[error("network error: no response received")]
    Network,

    /// The server responded with a non-success status.
    #[error("server error: status={status}, message={message}")]
    Server { status: u16, message: String },

    /// A structured 4xx response carrying field-level detail.
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed or unexpected event sequence on the generation stream.
    #[error("stream protocol error: {0}")]
    StreamProtocol(String),

    /// The server sent a terminal `error` event on the generation stream.
    #[error("generation failed: {0}")]
    StreamTerminated(String),

    /// The caller aborted the generation stream.
    #[error("stream cancelled")]
    Cancelled,

    /// HTTP transport error with a response partially received.
    #[error("http error: {0}")]
    Http(String),

    /// JSON serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Credential store error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration loading or validation error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

// ── Feature-gated From impls ──────────────────────────────────────────────────

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            Self::Network
        } else {
            Self::Http(e.to_string())
        }
    }
}

impl ApiError {
    /// Plain message suitable for direct display in a UI layer.
    ///
    /// Server-supplied messages pass through verbatim; transport failures
    /// with no response collapse to a fixed connectivity hint.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Server { message, .. } => message.clone(),
            Self::Validation(m) | Self::StreamTerminated(m) => m.clone(),
            Self::Network => "Network error - please check your connection".to_string(),
            Self::SessionExpired => "Session expired - please sign in again".to_string(),
            other => other.to_string(),
        }
    }

    /// Returns `true` if the error means the session is gone and the UI
    /// should route to re-authentication.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::Auth(_))
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_auth() {
        let err = ApiError::Auth("no refresh token available".to_string());
        assert_eq!(
            err.to_string(),
            "authentication error: no refresh token available"
        );
    }

    #[test]
    fn test_error_display_server() {
        let err = ApiError::Server {
            status: 404,
            message: "Plan not found".to_string(),
        };
        let s = err.to_string();
        assert!(s.contains("404"));
        assert!(s.contains("Plan not found"));
    }

    #[test]
    fn test_user_message_server_passthrough() {
        let err = ApiError::Server {
            status: 404,
            message: "Plan not found".to_string(),
        };
        assert_eq!(err.user_message(), "Plan not found");
    }

    #[test]
    fn test_user_message_network_fixed_string() {
        assert_eq!(
            ApiError::Network.user_message(),
            "Network error - please check your connection"
        );
    }

    #[test]
    fn test_user_message_validation() {
        let err = ApiError::Validation("endDate must be after startDate".into());
        assert_eq!(err.user_message(), "endDate must be after startDate");
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid {{{").unwrap_err();
        let err: ApiError = json_err.into();
        assert!(matches!(err, ApiError::Serialization(_)));
    }

    #[test]
    fn test_requires_login() {
        assert!(ApiError::SessionExpired.requires_login());
        assert!(ApiError::Auth("bad".into()).requires_login());
        assert!(!ApiError::Network.requires_login());
        assert!(
            !ApiError::Server {
                status: 500,
                message: String::new()
            }
            .requires_login()
        );
    }

    #[test]
    fn test_clone_preserves_kind() {
        let err = ApiError::StreamTerminated("Generation failed".into());
        let copy = err.clone();
        assert!(matches!(copy, ApiError::StreamTerminated(m) if m == "Generation failed"));
    }
}
