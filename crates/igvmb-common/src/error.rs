use thiserror::Error;

#[derive(Debug, Error)]
pub enum IgvError {
    #[error("Unknown track category: {0}")]
    UnknownCategory(String),

    #[error("Object group not found: {0}")]
    GroupNotFound(String),
}

pub type Result<T> = std::result::Result<T, IgvError>;
