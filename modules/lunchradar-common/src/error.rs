use thiserror::Error;

pub type Result<T> = std::result::Result<T, LunchradarError>;

#[derive(Error, Debug)]
pub enum LunchradarError {
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
