use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Failed to measure text: {0}")]
    Measure(String),
}
