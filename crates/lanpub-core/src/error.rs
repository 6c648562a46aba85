//! Error types for the LANPUB overlay

use thiserror::Error;

/// Core LANPUB errors
#[derive(Error, Debug)]
pub enum LanpubError {
    // Address errors
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid subnet mask: {0}")]
    InvalidMask(String),

    // Wire errors
    #[error("Missing fields from body, expected [{expected}]")]
    MissingFields { expected: String },

    #[error("Endpoint {method} {path} doesn't exist")]
    UnknownEndpoint { method: String, path: String },

    #[error("Malformed body: {0}")]
    MalformedBody(String),

    // Lifecycle errors
    #[error("Startup failed: {0}")]
    Startup(String),

    #[error("Shutdown incomplete: {0}")]
    Shutdown(String),
}

/// Result type for LANPUB operations
pub type LanpubResult<T> = Result<T, LanpubError>;
