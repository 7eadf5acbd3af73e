//! Error types for the bot.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Signature error: {0}")]
    Signature(#[from] SignatureError),

    #[error("Classification error: {0}")]
    Classify(#[from] ClassifyError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),
}

/// Configuration-related errors. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Webhook signature verification failures. All reject the request
/// with a 4xx before any event is parsed or dispatched.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("signature header is missing")]
    Missing,

    #[error("malformed signature header: {0}")]
    Malformed(String),

    #[error("unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("signature does not match request body")]
    Mismatch,
}

/// Classifier call failures. Logged per event; routing degrades to
/// exact-text rules only.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("classifier request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("classifier returned an invalid response: {reason}")]
    InvalidResponse { reason: String },

    #[error("classifier request timed out")]
    Timeout,

    #[error("no classifier is configured")]
    Disabled,
}

/// Outbound delivery failures. Logged per send; the reply for that turn
/// is lost, no retry.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("send request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("platform rejected the message: {message}")]
    PlatformRejected { message: String },

    #[error("response could not be decoded: {reason}")]
    InvalidResponse { reason: String },

    #[error("send request timed out")]
    Timeout,
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
