//! Error types for the emoji chat client.

use thiserror::Error;

/// Top-level client errors surfaced to the binary.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Terminal or readline failure
    #[error("I/O error: {0}")]
    Io(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The origin could not be parsed as a URL
    #[error("Invalid origin '{origin}': {source}")]
    InvalidOrigin {
        origin: String,
        #[source]
        source: url::ParseError,
    },

    /// The origin scheme has no WebSocket counterpart
    #[error("Unsupported origin scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    /// The origin has no host component
    #[error("Origin '{0}' has no host")]
    MissingHost(String),
}

/// Errors decoding inbound frames. Logged by the connection manager, never fatal.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The frame is not a JSON object
    #[error("Frame is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The frame has no string `type` field
    #[error("Frame has no message type")]
    MissingType,

    /// A known message type arrived with a payload of the wrong shape
    #[error("Invalid payload for message type '{kind}': {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}
