//! Daily horoscope with an offline fallback

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{SourceResult, Transport, with_query};

/// Sentinel for horoscope details the provider did not supply
pub const UNKNOWN: &str = "?";

/// Generic readings used when the provider cannot be reached
pub const OFFLINE_READINGS: [&str; 5] = [
    "Today is a great day for new beginnings.",
    "Pay attention to the details.",
    "Communication will be the key to success.",
    "Trust your intuition.",
    "A good day for creativity.",
];

const NOT_AVAILABLE: &str = "Horoscope not available.";

/// Western zodiac sign
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZodiacSign {
    #[default]
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    /// Lowercase name used by the provider API
    pub fn as_str(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "aries",
            ZodiacSign::Taurus => "taurus",
            ZodiacSign::Gemini => "gemini",
            ZodiacSign::Cancer => "cancer",
            ZodiacSign::Leo => "leo",
            ZodiacSign::Virgo => "virgo",
            ZodiacSign::Libra => "libra",
            ZodiacSign::Scorpio => "scorpio",
            ZodiacSign::Sagittarius => "sagittarius",
            ZodiacSign::Capricorn => "capricorn",
            ZodiacSign::Aquarius => "aquarius",
            ZodiacSign::Pisces => "pisces",
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// Today's reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoroscopeSnapshot {
    pub description: String,
    pub lucky_number: String,
    pub color: String,
    pub mood: String,
}

impl HoroscopeSnapshot {
    /// A generic reading from the offline pool
    pub fn offline<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let description = OFFLINE_READINGS.choose(rng).copied().unwrap_or(OFFLINE_READINGS[0]);
        Self {
            description: description.to_string(),
            lucky_number: UNKNOWN.to_string(),
            color: UNKNOWN.to_string(),
            mood: UNKNOWN.to_string(),
        }
    }

    /// Whether the provider supplied the detail fields
    pub fn has_details(&self) -> bool {
        self.lucky_number != UNKNOWN
    }
}

#[derive(Debug, Deserialize)]
struct AztroResponse {
    description: Option<String>,
    lucky_number: Option<Value>,
    color: Option<Value>,
    mood: Option<Value>,
}

fn text_or_unknown(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Parse a horoscope provider payload; missing fields become `?`
pub fn parse_horoscope(body: &str) -> SourceResult<HoroscopeSnapshot> {
    let data: AztroResponse = serde_json::from_str(body)?;
    Ok(HoroscopeSnapshot {
        description: data
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        lucky_number: text_or_unknown(data.lucky_number),
        color: text_or_unknown(data.color),
        mood: text_or_unknown(data.mood),
    })
}

/// Fetches today's horoscope for a sign
pub struct HoroscopeFetcher {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl HoroscopeFetcher {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    /// Today's reading, falling back to the offline pool on any failure
    pub async fn fetch<R: Rng + ?Sized>(&self, sign: ZodiacSign, rng: &mut R) -> HoroscopeSnapshot {
        match self.try_fetch(sign).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Horoscope unavailable, using offline reading");
                HoroscopeSnapshot::offline(rng)
            }
        }
    }

    /// Today's reading with the reason for any failure
    pub async fn try_fetch(&self, sign: ZodiacSign) -> SourceResult<HoroscopeSnapshot> {
        debug!(%sign, "HoroscopeFetcher::try_fetch: called");
        let url = with_query(&self.base_url, &[("sign", sign.as_str()), ("day", "today")])?;
        let body = self.transport.post(&url).await?;
        parse_horoscope(&body)
    }
}
