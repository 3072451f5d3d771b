use thiserror::Error;

pub const CONNECTION_FAILED_MESSAGE: &str = "Network error: Unable to connect to server. Please check your connection and ensure the server is running.";
pub const REQUEST_TIMEOUT_MESSAGE: &str = "Request Timeout";
pub const UPLOAD_TIMEOUT_MESSAGE: &str =
    "Upload timeout - Please try again with smaller files or check your internet connection";

/// Which deadline expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutKind {
    Request,
    Upload,
}

/// Normalized failure of a single API exchange.
///
/// `Clone` so one in-flight fetch can hand the same failure to every waiter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("{message}")]
    Network { message: String },
    #[error("{message}")]
    Timeout { kind: TimeoutKind, message: String },
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("invalid JSON response: {message}")]
    Parse { message: String },
    #[error("unexpected response shape: {message}")]
    Schema { message: String },
    #[error("{message}")]
    Rejected { message: String },
    #[error("request cancelled")]
    Cancelled,
}

impl ApiError {
    pub fn network<T: Into<String>>(message: T) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn connection_failed() -> Self {
        Self::network(CONNECTION_FAILED_MESSAGE)
    }

    pub fn request_timeout() -> Self {
        Self::Timeout {
            kind: TimeoutKind::Request,
            message: REQUEST_TIMEOUT_MESSAGE.to_string(),
        }
    }

    pub fn upload_timeout() -> Self {
        Self::Timeout {
            kind: TimeoutKind::Upload,
            message: UPLOAD_TIMEOUT_MESSAGE.to_string(),
        }
    }

    pub fn http<T: Into<String>>(status: u16, message: T) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn parse<T: Into<String>>(message: T) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn schema<T: Into<String>>(message: T) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    pub fn rejected<T: Into<String>>(message: T) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Timeout { .. } => "timeout",
            Self::Http { .. } => "http",
            Self::Parse { .. } => "parse",
            Self::Schema { .. } => "schema",
            Self::Rejected { .. } => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Message suitable for showing to an end user, classified by likely cause.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { .. } => {
                "Unable to reach the server. Please check your internet connection.".to_string()
            }
            Self::Timeout {
                kind: TimeoutKind::Upload,
                ..
            } => UPLOAD_TIMEOUT_MESSAGE.to_string(),
            Self::Timeout { .. } => {
                "The server took too long to respond. Please check your internet connection and try again."
                    .to_string()
            }
            Self::Http { status, .. } if *status >= 500 => {
                "Server error. Please try again later.".to_string()
            }
            Self::Http { message, .. } | Self::Rejected { message } => message.clone(),
            Self::Parse { .. } | Self::Schema { .. } => {
                "Received an unexpected response from the server. Please try again later."
                    .to_string()
            }
            Self::Cancelled => "The request was cancelled.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_timeout_keeps_exact_message() {
        let err = ApiError::upload_timeout();
        assert!(err.is_timeout());
        assert_eq!(
            err.to_string(),
            "Upload timeout - Please try again with smaller files or check your internet connection"
        );
        assert_eq!(err.user_message(), err.to_string());
    }

    #[test]
    fn server_errors_get_generic_user_message() {
        let err = ApiError::http(503, "HTTP 503: Service Unavailable");
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.user_message(), "Server error. Please try again later.");

        let client_err = ApiError::http(400, "Phone number is required");
        assert_eq!(client_err.user_message(), "Phone number is required");
    }

    #[test]
    fn kinds_are_stable_labels() {
        assert_eq!(ApiError::connection_failed().kind(), "network");
        assert_eq!(ApiError::request_timeout().kind(), "timeout");
        assert_eq!(ApiError::Cancelled.kind(), "cancelled");
    }
}
