use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Errors surfaced by the content layer.
///
/// Load failures are remembered for a whole cache epoch and handed to every
/// caller of that epoch, so the underlying causes ride along in `Arc` and the
/// enum stays cheap to clone. File-missing and decode failures are separate
/// variants, but both carry the owning cache's display name so a wrapped
/// error always says which content source broke.
#[derive(Debug, Clone, Error)]
pub enum ContentError {
    /// The backing file for a content source could not be opened or read.
    #[error("failed to read {name} source at {}", .path.display())]
    SourceUnavailable {
        name: &'static str,
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },

    /// The backing file was read but does not decode as a JSON array of the
    /// expected records.
    #[error("failed to decode {name} JSON")]
    MalformedSource {
        name: &'static str,
        #[source]
        source: Arc<serde_json::Error>,
    },

    /// The requested id is unknown to the content source. Never cached.
    #[error("no blog found with id '{id}'")]
    UnknownContentId { id: String },

    /// A table-of-contents artifact could not be written or read back.
    #[error("failed to access table of contents artifact at {}", .path.display())]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },
}

impl IntoResponse for ContentError {
    fn into_response(self) -> Response {
        match &self {
            ContentError::UnknownContentId { .. } => {
                (StatusCode::NOT_FOUND, self.to_string()).into_response()
            }
            _ => {
                error!(error = %self, "content request failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
