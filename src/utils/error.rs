use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("{literal} is not a valid date")]
    InvalidDate { literal: String },

    #[error("range {start} .. {end} is not valid")]
    InvalidRange { start: String, end: String },

    #[error("{key} not found in the registry")]
    NotFound { key: String },

    #[error("enrollment update for {mk} in {group} lost to a concurrent write")]
    Conflict { mk: String, group: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("registry file error: {0}")]
    RegistryParseError(#[from] toml::de::Error),

    #[error("configuration error: {message}")]
    ConfigError { message: String },
}

impl RosterError {
    /// Stable machine code for transport adapters and CLI exit codes.
    pub fn code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => 9,
            Self::InvalidDate { .. } | Self::InvalidRange { .. } => 10,
            Self::Conflict { .. } => 12,
            Self::ConfigError { .. } | Self::RegistryParseError(_) => 2,
            Self::IoError(_) | Self::SerializationError(_) => 1,
        }
    }

    /// Only `Conflict` is transient; everything else fails the same way
    /// on a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, RosterError>;
