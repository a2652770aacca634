use axum::http::StatusCode;
use thiserror::Error;

use crate::store::StoreError;

/// Every way a handler can fail. All of them answer 500.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("could not read request body: {0}")]
    UnreadableBody(String),

    #[error("invalid path parameter: {0}")]
    InvalidPath(String),

    #[error("invalid query string: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}")]
    InvalidValue { name: &'static str, value: String },

    #[error("storage initialization failed: {0}")]
    Store(#[from] StoreError),
}
