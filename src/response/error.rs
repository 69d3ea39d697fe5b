use crate::pipeline::BoxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("Invalid status code: {0}")]
    InvalidStatusCode(u16),

    #[error("Failed to serialize JSON: {0}")]
    JsonSerializationError(#[from] serde_json::Error),

    #[error("Invalid header name")]
    InvalidHeaderName(#[from] hyper::header::InvalidHeaderName),

    #[error("Invalid header value")]
    InvalidHeaderValue(#[from] hyper::header::InvalidHeaderValue),

    #[error("Custom body handler failed: {0}")]
    Custom(BoxError),
}
