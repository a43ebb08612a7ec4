use thiserror::Error;

/// Failures of the external spreadsheet store. All of these are recovered by
/// the submission pipeline; none reach the submitter.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid service account credentials: {0}")]
    Credentials(#[from] jsonwebtoken::errors::Error),

    #[error("spreadsheet location is not a valid sheet url: {0}")]
    InvalidLocation(String),

    #[error("worksheet '{0}' not found")]
    WorksheetNotFound(String),

    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("sheets api error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("token missing")]
    Missing,

    #[error("token rejected: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("token issued for '{0}'")]
    WrongPurpose(String),

    #[error("token not issued to this browser")]
    NonceMismatch,
}
