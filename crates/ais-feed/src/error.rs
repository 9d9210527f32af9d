//! Feed error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Connection closed: code={code}, reason={reason}")]
    Closed { code: u16, reason: String },

    #[error("Upstream feed error: {0}")]
    Upstream(String),

    #[error("Connection attempt budget exhausted")]
    RetryBudgetExhausted,

    #[error("Tungstenite error: {0}")]
    Tungstenite(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FeedResult<T> = Result<T, FeedError>;
