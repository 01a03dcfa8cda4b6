#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MimetypeError {
    #[error("Empty mimetype")]
    Empty,
    #[error("Mimetype is missing a subtype")]
    MissingSubtype,
    #[error("Invalid token: {token:?}")]
    InvalidToken { token: String },
    #[error("Invalid parameter: {parameter:?}")]
    InvalidParameter { parameter: String },
    #[error("Unterminated quoted parameter value")]
    UnterminatedQuote,
}

/// Failures a backend can surface to whoever owns the playback session.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("Stream error: {reason}")]
    Stream { reason: String },
    #[error("Stream closed")]
    StreamClosed,
    #[error("Decode error: {reason}")]
    Decode { reason: String },
    #[error("Render error: {reason}")]
    Render { reason: String },
    #[error(transparent)]
    Backend(#[from] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Global player registry is already initialized")]
    AlreadyInstalled,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
