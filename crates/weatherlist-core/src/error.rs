//! Centralized error types for WeatherList.
//!
//! Every failure the list manager can hit is one of a small set of kinds:
//! - `NetworkError` for transport and server failures
//! - `LookupError` when a search or single-record read fails
//! - `WriteError` when a create, update or delete fails
//!
//! Each kind maps to one fixed `user_message()` per operation for the
//! notification banner, while `Display` keeps the full detail for logs.

use std::fmt;

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Write error: {0}")]
    Write(#[from] WriteError),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(_) => "Error fetching weather data",
            AppError::Lookup(e) => e.user_message(),
            AppError::Write(e) => e.user_message(),
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The task running the request panicked or was cancelled before answering.
    #[error("Request did not complete: {0}")]
    Aborted(String),
}

impl NetworkError {
    /// HTTP status carried by this error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure to read a single record or a search result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The service answered but holds nothing for this key.
    #[error("No weather record found for '{0}'")]
    NotFound(String),

    #[error("Lookup for '{query}' failed: {source}")]
    Failed {
        query: String,
        #[source]
        source: NetworkError,
    },
}

impl LookupError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LookupError::NotFound(_) => "City not found",
            LookupError::Failed { .. } => "Error searching weather data",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound(_))
    }
}

/// Which write the gateway was attempting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Create,
    Update,
    Delete,
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteOp::Create => f.write_str("create"),
            WriteOp::Update => f.write_str("update"),
            WriteOp::Delete => f.write_str("delete"),
        }
    }
}

/// Failure of a create, update or delete call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Weather {op} failed: {source}")]
pub struct WriteError {
    pub op: WriteOp,
    #[source]
    pub source: NetworkError,
}

impl WriteError {
    pub fn new(op: WriteOp, source: NetworkError) -> Self {
        Self { op, source }
    }

    pub fn user_message(&self) -> &'static str {
        match self.op {
            WriteOp::Create => "Error adding weather",
            WriteOp::Update => "Error updating weather",
            WriteOp::Delete => "Error deleting weather",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
