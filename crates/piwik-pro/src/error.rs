//! Error types for the Piwik PRO bridge.

use crate::validator::VISITOR_ID_PATTERN;

/// Errors returned by bridge operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input rejected locally, before any native call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Rejection reported by the native tracker, passed through unchanged.
    #[error(transparent)]
    Native(#[from] NativeError),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Local validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Parameter must be an integer number")]
    NotAnInteger,

    #[error("ID (key) must be an integer")]
    KeyNotAnInteger,

    #[error("ID (key) must be an integer greater than 0")]
    KeyNotPositive,

    #[error("Max 20 product custom dimensions, 20 is max ID.")]
    TooManyProductDimensions,

    #[error("Visitor ID {0} has invalid format. The format must match the regular expression: {pattern}", pattern = VISITOR_ID_PATTERN)]
    InvalidVisitorId(String),

    #[error("Profile attributes cannot be an empty array")]
    EmptyProfileAttributes,
}

/// Errors raised by a [`NativeTracker`](crate::NativeTracker) implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NativeError {
    #[error("Piwik Pro SDK has been already initialized")]
    AlreadyInitialized,

    #[error("Piwik Pro SDK has not been initialized")]
    NotInitialized,

    /// An argument the native SDK could not accept.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Any other failure inside the native SDK.
    #[error("{0}")]
    Failed(String),
}

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;
