//! Error handling for the radial layout engine
//!
//! Layout anomalies (missing focus, orphaned parents, unknown tags) are
//! logged and degraded per the engine's contract, never raised. Typed
//! errors exist only at the genuine fallibility boundaries: configuration
//! validation and frame serialization.

use thiserror::Error;

/// Error type for the layout engine's fallible surface.
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Invalid layout configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;
