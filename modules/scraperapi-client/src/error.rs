use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScraperApiError>;

#[derive(Debug, Error)]
pub enum ScraperApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for ScraperApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScraperApiError::Timeout
        } else {
            ScraperApiError::Network(err.to_string())
        }
    }
}
