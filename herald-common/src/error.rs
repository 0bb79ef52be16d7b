//! Error types shared across the herald crates.

use thiserror::Error;

/// Errors raised while interpreting contact addresses.
#[derive(Debug, Error)]
pub enum AddressError {
    /// The address contains no scheme delimiter at all.
    #[error("Malformed contact address: {0}")]
    Malformed(String),
}

/// Errors raised by channel adapters and their construction.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// A required configuration field is missing.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A configuration value is invalid.
    #[error("Invalid configuration for {field}: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// The underlying transport rejected the request.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Address(#[from] AddressError),
}

impl ChannelError {
    /// Returns `true` when the failure came from the transport rather than
    /// configuration, and so may succeed on a later send.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Errors raised by configuration providers.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The backing configuration source failed.
    #[error("Configuration source error: {0}")]
    Source(String),

    /// A value was present but could not be interpreted.
    #[error("Invalid value for key {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Errors raised by the database facade.
#[derive(Debug, Error)]
pub enum DataError {
    /// The connection handshake never succeeded within the retry budget.
    #[error("Unable to connect to the database")]
    ConnectionFailed,

    /// The provider does not advertise the requested capability.
    #[error("The database provider does not support {0} mode")]
    UnsupportedCapability(&'static str),

    /// A statement failed at the provider.
    #[error("Statement error: {0}")]
    Statement(String),
}

impl DataError {
    /// Fatal for the operation that raised it, never process-fatal.
    #[must_use]
    pub const fn is_infrastructure(&self) -> bool {
        matches!(self, Self::ConnectionFailed)
    }
}
