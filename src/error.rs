//! Error taxonomy for verse requests and its mapping onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Terminal failures of a verse request.
///
/// Provider-level transient errors never show up here; the fetcher absorbs
/// them and only surfaces [`VerseError::ServiceUnavailable`] once every
/// provider is exhausted.
#[derive(Debug, Error)]
pub enum VerseError {
    /// Requested language tag is not in the language table.
    #[error("Language '{0}' not supported")]
    InvalidLanguage(String),

    /// Surah number does not resolve upstream.
    #[error("Surah {0} not found")]
    SurahNotFound(u32),

    /// Surah exists but has no verse with this in-surah number.
    #[error("Verse {verse} not found in surah {surah}")]
    VerseNotFound { surah: u32, verse: u32 },

    /// Surah number written in digits but too large to be any surah.
    #[error("Surah {0} not found")]
    SurahOutOfRange(String),

    /// Verse number written in digits but too large to be any verse.
    #[error("Verse {verse} not found in surah {surah}")]
    VerseOutOfRange { surah: u32, verse: String },

    /// Malformed path segment or query string.
    #[error("{0}")]
    BadRequest(String),

    /// Every configured provider and retry was exhausted.
    #[error("Verse providers are currently unavailable, please try again later")]
    ServiceUnavailable,

    /// A provider succeeded but its payload shape has no normalizer.
    #[error("No transformation for payload format '{format}' from provider '{provider}'")]
    UnsupportedFormat { provider: String, format: String },

    /// Anything else. Detail stays in the server log.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl VerseError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            VerseError::InvalidLanguage(_) | VerseError::BadRequest(_) => StatusCode::BAD_REQUEST,
            VerseError::SurahNotFound(_)
            | VerseError::VerseNotFound { .. }
            | VerseError::SurahOutOfRange(_)
            | VerseError::VerseOutOfRange { .. } => StatusCode::NOT_FOUND,
            VerseError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            VerseError::UnsupportedFormat { .. } | VerseError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to echo to the client
    fn public_message(&self) -> String {
        match self {
            VerseError::UnsupportedFormat { .. } | VerseError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for VerseError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, status = %status, "Verse request failed");
        }

        (status, Json(json!({ "detail": self.public_message() }))).into_response()
    }
}
