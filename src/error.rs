//! Error type shared by the upload pipeline.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Message returned to clients for every failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

#[derive(Error, Debug)]
pub enum UploadError {
    /// Directory creation, listing, deletion or file write failed.
    #[error("failed to {action} {}: {source}", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The multipart body could not be decoded.
    #[error("malformed multipart body: {0}")]
    Decode(#[from] MultipartError),

    /// The request was not a usable multipart request at all.
    #[error("invalid multipart request: {0}")]
    Rejected(#[from] MultipartRejection),

    #[error("failed to serialize metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

impl UploadError {
    pub fn fs(action: &'static str, path: &Path, source: io::Error) -> Self {
        UploadError::Filesystem {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, UploadError>;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        tracing::error!("Error during file upload: {}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: INTERNAL_ERROR_MESSAGE.to_string(),
            }),
        )
            .into_response()
    }
}
