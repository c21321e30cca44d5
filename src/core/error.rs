use thiserror::Error;

/// Load-time errors. Runtime simulation paths never return these;
/// they fail closed with result structs instead.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Event definition '{id}': {message}")]
    EventDefinition { id: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
