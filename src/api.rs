//! HTTP routes, all under `/api`.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::context::{ServiceContext, VerseQuery};
use crate::error::VerseError;
use crate::i18n::Language;
use crate::normalizer::VerseResponse;
use crate::resolver::SURAH_COUNT;

#[derive(Serialize)]
pub struct RootMessage {
    pub message: String,
}

/// One entry of `/languages`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageInfo {
    pub code: String,
    pub name: String,
    pub flag: String,
}

#[derive(Deserialize)]
pub struct LanguageQuery {
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    Language::DEFAULT_TAG.to_string()
}

/// Build the API router with all routes.
pub fn router(context: Arc<ServiceContext>) -> Router {
    // Open proxy: any origin may call
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api", get(root))
        .route("/api/", get(root))
        .route("/api/languages", get(languages))
        .route("/api/random-verse", get(random_verse))
        .route("/api/verse/:surah_number/:verse_number", get(verse))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_request(())
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        let status = response.status();
                        if status.is_success() {
                            tracing::debug!(status = %status, latency_ms = latency.as_millis(), "request served");
                        } else {
                            tracing::warn!(status = %status, latency_ms = latency.as_millis(), "request failed");
                        }
                    },
                ),
        )
        .with_state(context)
}

pub async fn root() -> Json<RootMessage> {
    Json(RootMessage {
        message: "Quran Verse Generator API".to_string(),
    })
}

/// Supported languages, in table order.
pub async fn languages(State(context): State<Arc<ServiceContext>>) -> Json<Vec<LanguageInfo>> {
    Json(
        context
            .languages
            .list()
            .iter()
            .map(|entry| LanguageInfo {
                code: entry.tag.to_string(),
                name: entry.display_name.to_string(),
                flag: entry.flag.to_string(),
            })
            .collect(),
    )
}

pub async fn random_verse(
    State(context): State<Arc<ServiceContext>>,
    query: Result<Query<LanguageQuery>, QueryRejection>,
) -> Result<Json<VerseResponse>, VerseError> {
    let Query(query) = query.map_err(query_rejection)?;
    context
        .verse(VerseQuery::Random, &query.language)
        .await
        .map(Json)
}

pub async fn verse(
    State(context): State<Arc<ServiceContext>>,
    path: Result<Path<(String, String)>, PathRejection>,
    query: Result<Query<LanguageQuery>, QueryRejection>,
) -> Result<Json<VerseResponse>, VerseError> {
    let Query(query) = query.map_err(query_rejection)?;
    let Path((raw_surah, raw_verse)) =
        path.map_err(|rejection| VerseError::BadRequest(rejection.body_text()))?;
    // Language errors win over coordinate errors
    Language::from_tag(&query.language)?;
    let (surah_number, verse_number) = parse_verse_path(&raw_surah, &raw_verse)?;

    context
        .verse(
            VerseQuery::BySurahVerse {
                surah_number,
                verse_number,
            },
            &query.language,
        )
        .await
        .map(Json)
}

fn query_rejection(rejection: QueryRejection) -> VerseError {
    VerseError::BadRequest(rejection.body_text())
}

/// Path segment parsed as a verse coordinate.
enum PathNumber {
    Valid(u32),
    /// All digits, but past `u32::MAX`
    TooLarge,
}

fn parse_path_number(name: &str, raw: &str) -> Result<PathNumber, VerseError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VerseError::BadRequest(format!(
            "{} must be a non-negative integer, got '{}'",
            name, raw
        )));
    }
    Ok(raw.parse::<u32>().map_or(PathNumber::TooLarge, PathNumber::Valid))
}

/// Malformed segments are a 400; numbers too large for any surah or verse
/// are a 404, the same as any other unknown coordinate.
fn parse_verse_path(raw_surah: &str, raw_verse: &str) -> Result<(u32, u32), VerseError> {
    let surah = parse_path_number("surah_number", raw_surah)?;
    let verse = parse_path_number("verse_number", raw_verse)?;

    match (surah, verse) {
        (PathNumber::Valid(surah), PathNumber::Valid(verse)) => Ok((surah, verse)),
        (PathNumber::TooLarge, _) => Err(VerseError::SurahOutOfRange(raw_surah.to_string())),
        (PathNumber::Valid(surah), PathNumber::TooLarge) if !(1..=SURAH_COUNT).contains(&surah) => {
            Err(VerseError::SurahNotFound(surah))
        }
        (PathNumber::Valid(surah), PathNumber::TooLarge) => Err(VerseError::VerseOutOfRange {
            surah,
            verse: raw_verse.to_string(),
        }),
    }
}
