//! # Validation Errors
//!
//! Errors raised while constructing domain values from untrusted input.
//! Every variant maps to a client-side (400-class) failure at the API edge.

use thiserror::Error;

/// A domain value could not be constructed from the supplied input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// `full_name` was missing or blank after trimming.
    #[error("full_name must not be empty")]
    EmptyFullName,

    /// `date_of_birth` was not a `YYYY-MM-DD` calendar date.
    #[error("invalid date_of_birth {0:?}: expected YYYY-MM-DD")]
    InvalidDateOfBirth(String),

    /// A caller-supplied request id was blank or too long.
    #[error("invalid request_id: {0}")]
    InvalidRequestId(String),

    /// A dataset scope name was empty or contained characters that cannot
    /// appear in an upstream URL path segment.
    #[error("invalid dataset scope {0:?}: expected ASCII letters, digits, '_', '-' or '.'")]
    InvalidDatasetScope(String),

    /// Threshold triple violated `0 <= info <= review < block <= 1`.
    #[error("invalid thresholds: {0}")]
    InvalidThresholds(String),

    /// Digest input could not be serialized.
    #[error("canonical serialization failed: {0}")]
    Serialization(String),
}
