//! Outbound calls to verse-data providers.
//!
//! The primary provider gets `max_retries` attempts with linear backoff; each
//! fallback then gets its own smaller budget with a fixed delay. Transient
//! failures stay inside this module. Callers only ever see a tagged
//! [`RawProviderResult`] or [`VerseError::ServiceUnavailable`].

use crate::config::{Config, PayloadFormat, ProviderConfig};
use crate::error::VerseError;
use crate::retry::{with_retry, Backoff, RetryConfig};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug_span, error, info, warn, Instrument};

/// Edition that carries the Arabic base text.
pub const ARABIC_EDITION: &str = "quran-uthmani";

/// Why a single provider attempt failed. Always retriable.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("upstream reported code {code} ({status})")]
    UpstreamStatus { code: i64, status: String },

    #[error("malformed payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else if e.is_decode() {
            ProviderError::Decode(e.to_string())
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

/// Untransformed provider payload, tagged with where it came from.
#[derive(Debug, Clone)]
pub struct RawProviderResult {
    /// Id of the provider that answered
    pub source: String,
    /// Schema of `payload`, so the normalizer can pick a transformation
    pub format: PayloadFormat,
    /// The `data` array for AlQuran Cloud payloads, the whole body otherwise
    pub payload: Value,
    /// Attempts spent across all providers, including the successful one
    pub attempts: u32,
    /// Whether a fallback (not the primary) produced this result
    pub from_fallback: bool,
}

/// One entry of a surah's verse listing.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AyahRef {
    /// Absolute index across the whole text (1–6236)
    pub number: u32,
    #[serde(rename = "numberInSurah")]
    pub number_in_surah: u32,
}

#[derive(Debug, Deserialize)]
struct SurahEnvelope {
    code: i64,
    #[serde(default)]
    status: String,
    data: Option<SurahData>,
}

#[derive(Debug, Deserialize)]
struct SurahData {
    ayahs: Vec<AyahRef>,
}

/// Issues verse requests against the configured providers.
#[derive(Debug, Clone)]
pub struct UpstreamFetcher {
    client: reqwest::Client,
    primary: ProviderConfig,
    fallbacks: Vec<ProviderConfig>,
    primary_retry: RetryConfig,
    fallback_retry: RetryConfig,
    timeout: Duration,
}

impl UpstreamFetcher {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            primary: config.primary.clone(),
            fallbacks: config.fallbacks.clone(),
            primary_retry: RetryConfig::new(config.max_retries, config.retry_base_delay),
            fallback_retry: RetryConfig::new(config.fallback_retries, config.fallback_delay)
                .with_backoff(Backoff::Fixed),
            timeout: config.request_timeout,
        }
    }

    pub fn primary(&self) -> &ProviderConfig {
        &self.primary
    }

    /// Fetch the Arabic text and the `edition` translation for an absolute
    /// verse index, walking the provider list until one succeeds.
    pub async fn fetch_verse_with_fallback(
        &self,
        verse_index: u32,
        edition: &str,
    ) -> Result<RawProviderResult, VerseError> {
        let mut attempts = 0u32;

        let providers = std::iter::once((&self.primary, &self.primary_retry, false)).chain(
            self.fallbacks
                .iter()
                .map(|provider| (provider, &self.fallback_retry, true)),
        );

        let span = debug_span!("fetch_verse", verse_index, edition);
        for (provider, retry, from_fallback) in providers {
            let result = with_retry(retry, &provider.id, || {
                attempts += 1;
                self.fetch_editions(provider, verse_index, edition)
            })
            .instrument(span.clone())
            .await;

            match result {
                Ok(payload) => {
                    if from_fallback {
                        info!(
                            provider = %provider.id,
                            verse_index,
                            attempts,
                            "Served verse from fallback provider"
                        );
                    }
                    return Ok(RawProviderResult {
                        source: provider.id.clone(),
                        format: provider.format.clone(),
                        payload,
                        attempts,
                        from_fallback,
                    });
                }
                Err(e) => {
                    warn!(
                        provider = %provider.id,
                        verse_index,
                        attempts,
                        error = %e,
                        "Provider exhausted, moving on"
                    );
                }
            }
        }

        error!(verse_index, attempts, "All verse providers exhausted");
        Err(VerseError::ServiceUnavailable)
    }

    /// One attempt against one provider.
    async fn fetch_editions(
        &self,
        provider: &ProviderConfig,
        verse_index: u32,
        edition: &str,
    ) -> Result<Value, ProviderError> {
        let url = format!(
            "{}/ayah/{}/editions/{},{}",
            provider.base_url, verse_index, ARABIC_EDITION, edition
        );

        let response = self.client.get(&url).timeout(self.timeout).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::HttpStatus(response.status().as_u16()));
        }

        let body: Value = response.json().await?;
        check_envelope(&provider.format, body)
    }

    /// Fetch the verse listing of one surah from the primary provider.
    ///
    /// No retries: a failed listing means the surah does not resolve.
    pub async fn fetch_surah_ayahs(&self, surah: u32) -> Result<Vec<AyahRef>, ProviderError> {
        let url = format!("{}/surah/{}", self.primary.base_url, surah);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::HttpStatus(response.status().as_u16()));
        }

        let envelope: SurahEnvelope = response.json().await?;
        if envelope.code != 200 {
            return Err(ProviderError::UpstreamStatus {
                code: envelope.code,
                status: envelope.status,
            });
        }

        envelope
            .data
            .map(|data| data.ayahs)
            .ok_or_else(|| ProviderError::Decode("surah listing has no data".to_string()))
    }
}

/// Check the provider's embedded status and unwrap its payload.
fn check_envelope(format: &PayloadFormat, body: Value) -> Result<Value, ProviderError> {
    let embedded_code = body.get("code").and_then(Value::as_i64);

    match format {
        PayloadFormat::AlQuranCloud => {
            let code = embedded_code
                .ok_or_else(|| ProviderError::Decode("missing 'code' field".to_string()))?;
            if code != 200 {
                return Err(ProviderError::UpstreamStatus {
                    code,
                    status: embedded_status(&body),
                });
            }
            match body.get("data") {
                Some(data @ Value::Array(_)) => Ok(data.clone()),
                _ => Err(ProviderError::Decode("'data' is not an array".to_string())),
            }
        }
        PayloadFormat::Other(_) => match embedded_code {
            Some(code) if code != 200 => Err(ProviderError::UpstreamStatus {
                code,
                status: embedded_status(&body),
            }),
            _ => Ok(body),
        },
    }
}

fn embedded_status(body: &Value) -> String {
    body.get("status")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    // ==================== Helper Functions ====================

    fn create_test_config(primary_url: &str, fallbacks: Vec<ProviderConfig>) -> Config {
        Config {
            primary: ProviderConfig::alquran("primary", primary_url),
            fallbacks,
            max_retries: 3,
            retry_base_delay: Duration::from_millis(5),
            fallback_retries: 2,
            fallback_delay: Duration::from_millis(5),
            request_timeout: Duration::from_millis(500),
            ..Config::default()
        }
    }

    fn create_fetcher(config: &Config) -> UpstreamFetcher {
        UpstreamFetcher::new(reqwest::Client::new(), config)
    }

    fn editions_body() -> Value {
        json!({
            "code": 200,
            "status": "OK",
            "data": [
                {
                    "number": 262,
                    "text": "ٱللَّهُ لَآ إِلَـٰهَ إِلَّا هُوَ",
                    "numberInSurah": 255,
                    "surah": {"number": 2, "name": "سُورَةُ البَقَرَةِ", "englishName": "Al-Baqara"}
                },
                {
                    "number": 262,
                    "text": "Allah - there is no deity except Him",
                    "numberInSurah": 255,
                    "surah": {"number": 2, "name": "سُورَةُ البَقَرَةِ", "englishName": "Al-Baqara"}
                }
            ]
        })
    }

    // ==================== fetch_verse_with_fallback Tests ====================

    #[tokio::test]
    async fn test_primary_success_first_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ayah/262/editions/quran-uthmani,en.sahih"))
            .respond_with(ResponseTemplate::new(200).set_body_json(editions_body()))
            .expect(1)
            .mount(&server)
            .await;

        let config = create_test_config(&server.uri(), vec![]);
        let result = create_fetcher(&config)
            .fetch_verse_with_fallback(262, "en.sahih")
            .await
            .expect("should succeed");

        assert_eq!(result.source, "primary");
        assert_eq!(result.format, PayloadFormat::AlQuranCloud);
        assert_eq!(result.attempts, 1);
        assert!(!result.from_fallback);
        assert_eq!(result.payload.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_primary_recovers_after_transient_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(editions_body()))
            .mount(&server)
            .await;

        let config = create_test_config(&server.uri(), vec![]);
        let result = create_fetcher(&config)
            .fetch_verse_with_fallback(262, "en.sahih")
            .await
            .unwrap();

        assert_eq!(result.source, "primary");
        assert_eq!(result.attempts, 2);
    }

    #[tokio::test]
    async fn test_embedded_failure_code_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"code": 400, "status": "Bad Request", "data": "nope"})),
            )
            .expect(3)
            .mount(&server)
            .await;

        let config = create_test_config(&server.uri(), vec![]);
        let result = create_fetcher(&config)
            .fetch_verse_with_fallback(1, "en.sahih")
            .await;

        assert!(matches!(result, Err(VerseError::ServiceUnavailable)));
    }

    #[tokio::test]
    async fn test_falls_back_after_primary_exhausted() {
        let primary = MockServer::start().await;
        let fallback = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&primary)
            .await;
        Mock::given(method("GET"))
            .and(path("/ayah/262/editions/quran-uthmani,de.bubenheim"))
            .respond_with(ResponseTemplate::new(200).set_body_json(editions_body()))
            .expect(1)
            .mount(&fallback)
            .await;

        let config = create_test_config(
            &primary.uri(),
            vec![ProviderConfig::alquran("mirror", &fallback.uri())],
        );
        let result = create_fetcher(&config)
            .fetch_verse_with_fallback(262, "de.bubenheim")
            .await
            .unwrap();

        assert_eq!(result.source, "mirror");
        assert!(result.from_fallback);
        assert_eq!(result.attempts, 4);
    }

    #[tokio::test]
    async fn test_exhaustion_counts_every_attempt() {
        let primary = MockServer::start().await;
        let first = MockServer::start().await;
        let second = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&primary)
            .await;
        for server in [&first, &second] {
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(404))
                .expect(2)
                .mount(server)
                .await;
        }

        let config = create_test_config(
            &primary.uri(),
            vec![
                ProviderConfig::alquran("first", &first.uri()),
                ProviderConfig::alquran("second", &second.uri()),
            ],
        );
        let result = create_fetcher(&config)
            .fetch_verse_with_fallback(7, "en.sahih")
            .await;

        assert!(matches!(result, Err(VerseError::ServiceUnavailable)));
    }

    #[tokio::test]
    async fn test_timeout_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(editions_body())
                    .set_delay(Duration::from_secs(2)),
            )
            .expect(3)
            .mount(&server)
            .await;

        let mut config = create_test_config(&server.uri(), vec![]);
        config.request_timeout = Duration::from_millis(50);

        let result = create_fetcher(&config)
            .fetch_verse_with_fallback(262, "en.sahih")
            .await;

        assert!(matches!(result, Err(VerseError::ServiceUnavailable)));
    }

    #[tokio::test]
    async fn test_unreachable_primary_falls_back() {
        let fallback = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(editions_body()))
            .mount(&fallback)
            .await;

        // Nothing listens on port 9 of localhost
        let config = create_test_config(
            "http://127.0.0.1:9",
            vec![ProviderConfig::alquran("mirror", &fallback.uri())],
        );
        let result = create_fetcher(&config)
            .fetch_verse_with_fallback(262, "en.sahih")
            .await
            .unwrap();

        assert_eq!(result.source, "mirror");
    }

    #[tokio::test]
    async fn test_other_format_passes_whole_body() {
        let primary = MockServer::start().await;
        let other = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&primary)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"verses": []})))
            .mount(&other)
            .await;

        let config = create_test_config(
            &primary.uri(),
            vec![ProviderConfig {
                id: "other".to_string(),
                base_url: other.uri(),
                format: PayloadFormat::Other("quran-com".to_string()),
            }],
        );
        let result = create_fetcher(&config)
            .fetch_verse_with_fallback(1, "en.sahih")
            .await
            .unwrap();

        assert_eq!(result.format, PayloadFormat::Other("quran-com".to_string()));
        assert_eq!(result.payload, json!({"verses": []}));
    }

    // ==================== check_envelope Tests ====================

    #[test]
    fn test_check_envelope_missing_code() {
        let result = check_envelope(&PayloadFormat::AlQuranCloud, json!({"data": []}));
        assert!(matches!(result, Err(ProviderError::Decode(_))));
    }

    #[test]
    fn test_check_envelope_data_not_array() {
        let result = check_envelope(
            &PayloadFormat::AlQuranCloud,
            json!({"code": 200, "data": "Not found"}),
        );
        assert!(matches!(result, Err(ProviderError::Decode(_))));
    }

    #[test]
    fn test_check_envelope_other_with_failure_code() {
        let result = check_envelope(
            &PayloadFormat::Other("x".into()),
            json!({"code": 429, "status": "Too Many Requests"}),
        );
        assert!(matches!(
            result,
            Err(ProviderError::UpstreamStatus { code: 429, ref status }) if status == "Too Many Requests"
        ));
    }

    // ==================== fetch_surah_ayahs Tests ====================

    #[tokio::test]
    async fn test_fetch_surah_ayahs_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/surah/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200,
                "status": "OK",
                "data": {
                    "number": 1,
                    "englishName": "Al-Faatiha",
                    "ayahs": [
                        {"number": 1, "numberInSurah": 1, "text": "..."},
                        {"number": 2, "numberInSurah": 2, "text": "..."}
                    ]
                }
            })))
            .mount(&server)
            .await;

        let config = create_test_config(&server.uri(), vec![]);
        let ayahs = create_fetcher(&config).fetch_surah_ayahs(1).await.unwrap();

        assert_eq!(
            ayahs,
            vec![
                AyahRef { number: 1, number_in_surah: 1 },
                AyahRef { number: 2, number_in_surah: 2 },
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_surah_ayahs_http_error_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/surah/115"))
            .respond_with(ResponseTemplate::new(404).set_body_json(
                json!({"code": 404, "status": "Not Found", "data": "Surah not found"}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let config = create_test_config(&server.uri(), vec![]);
        let result = create_fetcher(&config).fetch_surah_ayahs(115).await;

        assert!(matches!(result, Err(ProviderError::HttpStatus(404))));
    }

    #[test]
    fn test_provider_error_display() {
        assert_eq!(ProviderError::Timeout.to_string(), "request timed out");
        assert_eq!(ProviderError::HttpStatus(502).to_string(), "HTTP status 502");
        assert_eq!(
            ProviderError::UpstreamStatus {
                code: 400,
                status: "Bad Request".into()
            }
            .to_string(),
            "upstream reported code 400 (Bad Request)"
        );
    }
}
