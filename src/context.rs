//! Process-wide state handed to every request handler.

use crate::config::Config;
use crate::error::VerseError;
use crate::i18n::{Language, LanguageRegistry};
use crate::normalizer::{normalize, VerseResponse};
use crate::resolver::resolve_verse_index;
use crate::selector::{RandomVerseSelector, VerseSelector};
use crate::upstream::UpstreamFetcher;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which verse a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerseQuery {
    Random,
    BySurahVerse { surah_number: u32, verse_number: u32 },
}

/// Built once at startup; read-only afterwards.
pub struct ServiceContext {
    pub languages: &'static LanguageRegistry,
    pub fetcher: UpstreamFetcher,
    selector: Arc<dyn VerseSelector>,
}

impl ServiceContext {
    pub fn new(config: &Config) -> Result<Self> {
        // Per-call timeouts are set on each request
        let client = reqwest::Client::builder()
            .user_agent(concat!("quran-verse-proxy/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            languages: LanguageRegistry::get(),
            fetcher: UpstreamFetcher::new(client, config),
            selector: Arc::new(RandomVerseSelector),
        })
    }

    /// Replace the random source, e.g. with a seeded selector in tests.
    pub fn with_selector(mut self, selector: Arc<dyn VerseSelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Validate the tag, locate the verse, fetch it with fallback, normalize it.
    pub async fn verse(&self, query: VerseQuery, language_tag: &str) -> Result<VerseResponse, VerseError> {
        let language = Language::from_tag(language_tag)?;

        let verse_index = match query {
            VerseQuery::Random => self.selector.pick(),
            VerseQuery::BySurahVerse {
                surah_number,
                verse_number,
            } => resolve_verse_index(&self.fetcher, surah_number, verse_number).await?,
        };

        let raw = self
            .fetcher
            .fetch_verse_with_fallback(verse_index, language.upstream_code())
            .await?;
        debug!(
            verse_index,
            provider = %raw.source,
            attempts = raw.attempts,
            fallback = raw.from_fallback,
            "Fetched verse"
        );

        normalize(raw, language)
    }

    /// Teardown after the server stops; drops the pooled HTTP client.
    ///
    /// Returns `false` when other handles still hold the context, which is
    /// then left to the last of them.
    pub fn shutdown(self: Arc<Self>) -> bool {
        match Arc::try_unwrap(self) {
            Ok(context) => {
                drop(context);
                info!("Service context released");
                true
            }
            Err(context) => {
                warn!(
                    references = Arc::strong_count(&context),
                    "Service context still referenced at shutdown"
                );
                false
            }
        }
    }
}
