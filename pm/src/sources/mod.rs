//! External data sources for the briefing
//!
//! Each source adapter normalizes one provider and keeps its failures to
//! itself: the composer gets either a value or a [`SourceError`] describing
//! why the section is degraded. All network access goes through the
//! [`Transport`] trait so adapters can be tested without a network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use thiserror::Error;
use tracing::debug;

mod calendar;
mod horoscope;
mod news;
mod weather;

pub use calendar::{CalendarAggregator, CalendarEvent, CalendarSource, normalize_url, parse_events, sort_events};
pub use horoscope::{HoroscopeFetcher, HoroscopeSnapshot, OFFLINE_READINGS, UNKNOWN, ZodiacSign, parse_horoscope};
pub use news::{NewsAggregator, NewsItem, NewsSource, parse_headlines, truncate_headline};
pub use weather::{Location, WeatherFetcher, WeatherSnapshot, parse_weather};

use crate::config::HttpConfig;

/// Result of consulting one source
pub type SourceResult<T> = Result<T, SourceError>;

/// Why a source produced no data
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Malformed data: {0}")]
    Malformed(String),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Missing configuration: {0}")]
    MissingConfig(String),
}

/// Failure taxonomy used for logging and degradation decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    SourceUnavailable,
    MalformedData,
    ConfigurationMissing,
}

impl SourceError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SourceError::Network(_) | SourceError::Timeout(_) | SourceError::Status { .. } => {
                FailureKind::SourceUnavailable
            }
            SourceError::Malformed(_) | SourceError::Json(_) | SourceError::InvalidUrl(_) => FailureKind::MalformedData,
            SourceError::MissingConfig(_) => FailureKind::ConfigurationMissing,
        }
    }
}

/// HTTP seam shared by all source adapters
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` and return the body of a successful response
    async fn get(&self, url: &str) -> SourceResult<String>;

    /// POST to `url` without a body and return the body of a successful response
    async fn post(&self, url: &str) -> SourceResult<String>;
}

/// reqwest-backed transport with a per-request timeout
pub struct HttpTransport {
    http: Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> SourceResult<Self> {
        debug!(?timeout, "HttpTransport::new: called");
        let http = Client::builder().timeout(timeout).user_agent(user_agent).build()?;
        Ok(Self { http, timeout })
    }

    pub fn from_config(config: &HttpConfig) -> SourceResult<Self> {
        Self::new(Duration::from_millis(config.timeout_ms), &config.user_agent)
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> SourceResult<String> {
        let response = request.send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        debug!(%url, %status, "HttpTransport::send: response received");
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(|e| self.classify(e))
    }

    fn classify(&self, error: reqwest::Error) -> SourceError {
        if error.is_timeout() {
            SourceError::Timeout(self.timeout)
        } else {
            SourceError::Network(error)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> SourceResult<String> {
        debug!(%url, "HttpTransport::get: called");
        self.send(self.http.get(url), url).await
    }

    async fn post(&self, url: &str) -> SourceResult<String> {
        debug!(%url, "HttpTransport::post: called");
        self.send(self.http.post(url), url).await
    }
}

/// Append URL-encoded query parameters to `base`
pub(crate) fn with_query(base: &str, params: &[(&str, &str)]) -> SourceResult<String> {
    let url = Url::parse_with_params(base, params).map_err(|e| SourceError::InvalidUrl(format!("{base}: {e}")))?;
    Ok(url.into())
}
