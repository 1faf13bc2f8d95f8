use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoriseError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Baseline fetch error: {0}")]
    BaselineFetchError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

pub type HistoriseResult<T> = Result<T, HistoriseError>;
