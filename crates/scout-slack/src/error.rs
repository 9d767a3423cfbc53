use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlackError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    /// Slack answered `ok: false`.
    #[error("Slack API error: {0}")]
    Api(String),

    #[error("unexpected response: {0}")]
    Parse(String),

    #[error("missing header {0}")]
    MissingHeader(&'static str),

    #[error("request timestamp outside the allowed window")]
    StaleTimestamp,

    #[error("signature mismatch")]
    BadSignature,
}

pub type Result<T> = std::result::Result<T, SlackError>;
