//! Error types for the editor engine
//!
//! Network failures are never fatal: the controllers turn them into
//! [`crate::error_log::ErrorLog`] entries. These types carry them until then.

use thiserror::Error;

/// Failure talking to the genweb API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Any response other than 200; `body` is the server's text
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// 200 with a body that is not the expected JSON
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text shown in the error log area
    pub fn log_text(&self) -> String {
        match self {
            ApiError::Status { body, .. } if !body.is_empty() => body.clone(),
            other => other.to_string(),
        }
    }
}

/// Main error type for the editor engine
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_log_the_server_text() {
        let err = ApiError::Status {
            status: 404,
            body: "Metadata not found: m9".to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.log_text(), "Metadata not found: m9");
        assert_eq!(err.to_string(), "HTTP 404: Metadata not found: m9");
    }

    #[test]
    fn empty_status_body_falls_back_to_display() {
        let err = ApiError::Status {
            status: 500,
            body: String::new(),
        };
        assert_eq!(err.log_text(), "HTTP 500: ");
        assert_eq!(ApiError::Transport("refused".into()).status(), None);
    }
}
