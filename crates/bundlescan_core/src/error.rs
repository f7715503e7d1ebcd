use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mount error: {0}")]
    Mount(String),

    #[error("Metadata sink error: {0}")]
    Sink(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
