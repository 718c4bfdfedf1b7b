#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("unexpected guid: {0}")]
    InvalidIdentifier(String),

    #[error("HTTP {status} for URL: {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FetchError>;
