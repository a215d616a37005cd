//! Error types for the relay.

/// Result type alias for startup and I/O paths.
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-level errors raised while bringing the relay up.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be loaded or parsed
    #[error("config error: {0}")]
    Config(String),
}

/// A single line could not be turned into a reading.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The line is not well-formed JSON
    #[error("malformed reading: {0}")]
    Malformed(String),

    /// Structurally valid but the `id` field is absent or empty
    #[error("reading is missing a station id")]
    MissingId,
}

/// A sink rejected one reading. Never retried here.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("broker unavailable: {0}")]
    BrokerUnavailable(String),

    #[error("store write failed: {0}")]
    StoreWriteFailed(String),
}

/// Connectivity failures handled by the supervisor.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("network link lost")]
    NetworkLost,

    #[error("broker handshake failed: {0}")]
    BrokerHandshakeFailed(String),
}

/// The firmware-version sync call failed.
#[derive(Debug, thiserror::Error)]
#[error("firmware version sync failed: {0}")]
pub struct UpdateError(pub String);
