//! Classification of mutating-call responses.

use std::fmt;

use serde::Deserialize;

use crate::error::StoreError;

/// Status the service uses to signal a conflict.
pub const STATUS_CONFLICT: u16 = 409;

/// Status the service uses to signal success.
pub const STATUS_OK: u16 = 200;

/// Result of a mutating call against the storage service.
///
/// Every call yields exactly one outcome; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The mutation was applied.
    Success,
    /// The mutation collides with existing state (name taken, directory not empty).
    Conflict {
        /// Server-provided message, if any
        message: Option<String>,
    },
    /// Any other status, or the request never completed.
    Failure {
        /// HTTP status, `None` for transport errors and timeouts
        status: Option<u16>,
        /// Server- or client-provided reason
        message: String,
    },
}

/// Error body shape returned by the service: `{"msg": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    msg: Option<String>,
}

impl Outcome {
    /// Classify an HTTP status and the raw response body.
    pub fn from_response(status: u16, body: &str) -> Self {
        match status {
            STATUS_OK => Outcome::Success,
            STATUS_CONFLICT => Outcome::Conflict {
                message: error_message(body),
            },
            _ => Outcome::Failure {
                status: Some(status),
                message: error_message(body).unwrap_or_else(|| format!("HTTP status {}", status)),
            },
        }
    }

    /// Map a transport-level error to a failure outcome.
    pub fn from_error(error: &StoreError) -> Self {
        let status = match error {
            StoreError::HttpError(code) => Some(*code),
            _ => None,
        };
        Outcome::Failure {
            status,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => f.write_str("success"),
            Outcome::Conflict { message: Some(m) } => write!(f, "conflict: {}", m),
            Outcome::Conflict { message: None } => f.write_str("conflict"),
            Outcome::Failure { message, .. } => write!(f, "failure: {}", message),
        }
    }
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.msg)
        .filter(|m| !m.is_empty())
}
