use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Oracle error: {0}")]
    Oracle(String),

    #[error("Oracle credential not configured")]
    MissingCredential,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
