use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token expired or revoked")]
    AuthExpired,

    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("notification failed: {0}")]
    Notify(String),

    #[error(transparent)]
    Persist(#[from] scout_core::ScoutError),
}

pub type Result<T> = std::result::Result<T, CalendarError>;
