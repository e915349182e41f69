/// Host application errors
use thiserror::Error;

/// Result type alias using `AppError`
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
}
