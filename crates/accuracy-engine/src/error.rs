use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccuracyError {
    #[error("Invalid selection query: {0}")]
    InvalidSelector(String),

    #[error("Malformed zone geometry: {0}")]
    Geometry(String),

    #[error("Comparison cancelled")]
    Cancelled,
}
