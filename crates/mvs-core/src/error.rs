//! Error types for mvs-core operations.
//!
//! The core crate only fails while loading or validating the session
//! configuration ([`crate::MultiViewInputParams`]). Artifact I/O errors live in
//! `mvs-io`, which wraps this type.
//!
//! # Usage
//!
//! ```rust
//! use mvs_core::{Error, Result};
//!
//! fn check_cameras(count: usize) -> Result<()> {
//!     if count == 0 {
//!         return Err(Error::invalid_params("session declares no cameras"));
//!     }
//!     Ok(())
//! }
//! assert!(check_cameras(0).is_err());
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or validating a session configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while reading a configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration document could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The configuration parsed but violates a session invariant.
    #[error("invalid session parameters: {0}")]
    InvalidParams(String),
}

impl Error {
    /// Creates an [`Error::InvalidParams`] error.
    #[inline]
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }

    /// Returns `true` if this is an I/O error.
    #[inline]
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
