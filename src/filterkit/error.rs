use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Duplicate field id: {0}")]
    DuplicateField(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Value rejected by field '{field}'")]
    Validation { field: String },

    #[error("Malformed preset data: {0}")]
    PresetShape(String),

    #[error("Invalid argument: {0}")]
    Usage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FilterError>;
