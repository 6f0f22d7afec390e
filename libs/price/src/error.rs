use reqwest::header::InvalidHeaderValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PriceError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to decode price response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no price data for `{0}`")]
    NotFound(String),

    #[error("invalid header value: {0}")]
    Header(#[from] InvalidHeaderValue),

    #[error("stock price source is not configured")]
    StockSourceMissing,
}

impl PriceError {
    /// Errors that are worth trying again on the next tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, PriceError::Network(_))
    }
}
