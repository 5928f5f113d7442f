use std::borrow::Cow;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repository::RepositoryError;

const INTERNAL_SERVER_ERROR: &str = "internal server error";

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid path format")]
    InvalidPathFormat,

    #[error("invalid id")]
    InvalidId,

    #[error("invalid owner id")]
    InvalidOwnerId,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(&'static str),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("failed to decode request body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidPathFormat
            | ApiError::InvalidId
            | ApiError::InvalidOwnerId
            | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Decode(_) | ApiError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Decoder and database messages stay in the log.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            INTERNAL_SERVER_ERROR.to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(status).json(ErrorResponse { message })
    }
}

/// Parses the integer left after removing `prefix` from `path`.
pub fn extract_id_from_path(path: &str, prefix: &str) -> Result<i64, ApiError> {
    path.strip_prefix(prefix)
        .unwrap_or(path)
        .parse()
        .map_err(|_| ApiError::InvalidId)
}

/// Owner id from a `/users/{id}/tasks` path.
pub fn extract_owner_id_from_path(path: &str) -> Result<i64, ApiError> {
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() != 4 {
        return Err(ApiError::InvalidPathFormat);
    }
    parts[2].parse().map_err(|_| ApiError::InvalidOwnerId)
}

/// Percent-decodes one path segment; the request path arrives still encoded.
pub fn decode_path_segment(segment: &str) -> Result<Cow<'_, str>, ApiError> {
    urlencoding::decode(segment).map_err(|_| ApiError::InvalidPathFormat)
}

pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    Ok(serde_json::from_slice(body)?)
}
