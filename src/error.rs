use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetextError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Input injection error: {0}")]
    Injection(String),

    #[error("Replacement data source error: {0}")]
    DataSource(String),

    #[error("Engine is already running")]
    AlreadyRunning,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RetextError {
    pub fn data_source<T>(msg: impl Into<String>) -> Result<T> {
        Err(RetextError::DataSource(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, RetextError>;
