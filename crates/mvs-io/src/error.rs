//! Error types for artifact I/O.
//!
//! Absence of an artifact ([`IoError::NotFound`]) is an expected outcome and
//! is kept apart from corruption ([`IoError::TruncatedStream`],
//! [`IoError::CorruptRecord`]) so callers can choose between recomputing and
//! aborting.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Artifact I/O error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Session configuration error.
    #[error(transparent)]
    Core(#[from] mvs_core::Error),

    /// Camera index out of range, or scale missing/undeclared/not applicable.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The artifact does not exist.
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Fewer bytes remain than a fixed-size record needs.
    #[error("truncated stream: expected {expected} bytes, got {actual}")]
    TruncatedStream {
        /// Bytes the record needs.
        expected: usize,
        /// Bytes that were available.
        actual: usize,
    },

    /// A record is internally inconsistent.
    #[error("corrupt record: {0}")]
    CorruptRecord(String),

    /// A record cannot be written because it violates the format.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Caller buffer does not match the requested image size.
    #[error("buffer size mismatch: expected {expected} pixels, got {actual}")]
    BufferSizeMismatch {
        /// Pixels required.
        expected: usize,
        /// Pixels provided.
        actual: usize,
    },

    /// Decoded image size differs from the session's camera size.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected size.
        expected: String,
        /// Actual size.
        actual: String,
    },

    /// Decimation factor of zero.
    #[error("invalid scale factor: {0}")]
    InvalidScaleFactor(u32),

    /// Unknown band selector, or band not present in the source.
    #[error("unsupported band: {0}")]
    UnsupportedBand(String),

    /// Unsupported image format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),
}

impl IoError {
    /// Returns `true` if the artifact is simply absent.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` if the artifact exists but cannot be trusted.
    #[inline]
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::TruncatedStream { .. } | Self::CorruptRecord(_))
    }
}

/// Result type for artifact I/O.
pub type IoResult<T> = Result<T, IoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(IoError::NotFound(PathBuf::from("a")).is_not_found());
        assert!(!IoError::NotFound(PathBuf::from("a")).is_corruption());
        assert!(IoError::TruncatedStream { expected: 80, actual: 3 }.is_corruption());
        assert!(IoError::CorruptRecord("x".into()).is_corruption());
        assert!(!IoError::InvalidAddress("x".into()).is_corruption());
    }

    #[test]
    fn test_messages() {
        let err = IoError::TruncatedStream { expected: 48, actual: 10 };
        assert_eq!(err.to_string(), "truncated stream: expected 48 bytes, got 10");
        let err = IoError::BufferSizeMismatch { expected: 12, actual: 11 };
        assert!(err.to_string().contains("12"));
    }
}
