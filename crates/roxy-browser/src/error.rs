use roxy_core::BoundaryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Profile error: {0}")]
    Profile(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<Error> for BoundaryError {
    fn from(err: Error) -> Self {
        BoundaryError::new(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
