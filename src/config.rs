use anyhow::{bail, Context, Result};
use std::time::Duration;

pub const DEFAULT_PRIMARY_URL: &str = "https://api.alquran.cloud/v1";
pub const DEFAULT_FALLBACK_PROVIDERS: &str = "alquran-cloud-plain=http://api.alquran.cloud/v1";
pub const PRIMARY_PROVIDER_ID: &str = "alquran-cloud";

/// Response body schema a provider speaks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadFormat {
    /// AlQuran Cloud `editions` envelope: `{code, status, data: [arabic, translation]}`
    AlQuranCloud,
    /// Any other schema; fetched and status-checked, but not normalizable
    Other(String),
}

impl PayloadFormat {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "alquran" | "alquran-cloud" => PayloadFormat::AlQuranCloud,
            other => PayloadFormat::Other(other.to_string()),
        }
    }
}

/// One upstream verse-data provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub id: String,
    pub base_url: String,
    pub format: PayloadFormat,
}

impl ProviderConfig {
    pub fn alquran(id: &str, base_url: &str) -> Self {
        Self {
            id: id.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            format: PayloadFormat::AlQuranCloud,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,

    // Providers, primary first
    pub primary: ProviderConfig,
    pub fallbacks: Vec<ProviderConfig>,

    // Retry budget
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub fallback_retries: u32,
    pub fallback_delay: Duration,

    // Outbound calls
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let primary_url = std::env::var("QURAN_PRIMARY_URL")
            .unwrap_or_else(|_| DEFAULT_PRIMARY_URL.to_string());
        let fallbacks = parse_fallback_providers(
            &std::env::var("QURAN_FALLBACK_PROVIDERS")
                .unwrap_or_else(|_| DEFAULT_FALLBACK_PROVIDERS.to_string()),
        )
        .context("QURAN_FALLBACK_PROVIDERS is malformed")?;

        Ok(Self {
            // Server
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("PORT", 8000),

            // Providers
            primary: ProviderConfig::alquran(PRIMARY_PROVIDER_ID, &primary_url),
            fallbacks,

            // Retry budget (at least one attempt per provider)
            max_retries: env_or("QURAN_MAX_RETRIES", 3u32).max(1),
            retry_base_delay: Duration::from_millis(env_or("QURAN_RETRY_BASE_DELAY_MS", 1000)),
            fallback_retries: env_or("QURAN_FALLBACK_RETRIES", 2u32).max(1),
            fallback_delay: Duration::from_millis(env_or("QURAN_FALLBACK_DELAY_MS", 500)),

            // Outbound calls
            request_timeout: Duration::from_secs(env_or("QURAN_REQUEST_TIMEOUT_SECS", 10)),
        })
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            primary: ProviderConfig::alquran(PRIMARY_PROVIDER_ID, DEFAULT_PRIMARY_URL),
            fallbacks: parse_fallback_providers(DEFAULT_FALLBACK_PROVIDERS).unwrap_or_default(),
            max_retries: 3,
            retry_base_delay: Duration::from_secs(1),
            fallback_retries: 2,
            fallback_delay: Duration::from_millis(500),
            request_timeout: Duration::from_secs(10),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parse `id=url[#format]` entries separated by commas
pub fn parse_fallback_providers(raw: &str) -> Result<Vec<ProviderConfig>> {
    let mut providers = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((id, rest)) = entry.split_once('=') else {
            bail!("Fallback provider '{}' must be written as id=url", entry);
        };
        let (url, format) = match rest.split_once('#') {
            Some((url, format)) => (url, PayloadFormat::parse(format)),
            None => (rest, PayloadFormat::AlQuranCloud),
        };

        let id = id.trim();
        let url = url.trim().trim_end_matches('/');
        if id.is_empty() || url.is_empty() {
            bail!("Fallback provider '{}' has an empty id or url", entry);
        }
        if providers.iter().any(|p: &ProviderConfig| p.id == id) || id == PRIMARY_PROVIDER_ID {
            bail!("Duplicate provider id '{}'", id);
        }

        providers.push(ProviderConfig {
            id: id.to_string(),
            base_url: url.to_string(),
            format,
        });
    }

    Ok(providers)
}
