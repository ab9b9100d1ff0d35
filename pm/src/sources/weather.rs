//! Current weather from OpenWeatherMap

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use super::{SourceError, SourceResult, Transport, with_query};
use crate::config::WeatherConfig;

/// Normalized current conditions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherSnapshot {
    pub temperature_c: i32,
    pub feels_like_c: i32,
    pub description: String,
    pub humidity_pct: i32,
    pub wind_kmh: i32,
    pub has_rain: bool,
    pub has_snow: bool,
    pub cloud_cover_pct: i32,
}

/// How the configured place is passed to the provider
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    City(String),
    PostalCode(String),
    Coordinates { lat: f64, lon: f64 },
}

impl Location {
    /// Classify a place string: "lat,lon", a postal code, or a city name
    pub fn parse(input: &str) -> Self {
        let input = input.trim();

        if let Some((lat, lon)) = input.split_once(',') {
            if let (Ok(lat), Ok(lon)) = (lat.trim().parse(), lon.trim().parse()) {
                return Location::Coordinates { lat, lon };
            }
            return Location::City(input.to_string());
        }

        let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        let all_digits = !compact.is_empty() && compact.chars().all(|c| c.is_ascii_digit());
        let short_with_digit = input.chars().count() <= 10 && input.chars().any(|c| c.is_ascii_digit());
        if all_digits || short_with_digit {
            return Location::PostalCode(compact);
        }

        Location::City(input.to_string())
    }

    fn query(&self, country_code: &str) -> Vec<(&'static str, String)> {
        let with_country = |place: &str| {
            if country_code.is_empty() {
                place.to_string()
            } else {
                format!("{place},{country_code}")
            }
        };
        match self {
            Location::City(city) => vec![("q", with_country(city))],
            Location::PostalCode(code) => vec![("zip", with_country(code))],
            Location::Coordinates { lat, lon } => vec![("lat", lat.to_string()), ("lon", lon.to_string())],
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    main: OwmMain,
    weather: Vec<OwmCondition>,
    wind: OwmWind,
    clouds: OwmClouds,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    /// Meters per second with metric units
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwmClouds {
    all: f64,
}

/// Parse an OpenWeatherMap current-weather payload (metric units)
///
/// Rain and snow are classified from the structured condition field only.
pub fn parse_weather(body: &str) -> SourceResult<WeatherSnapshot> {
    let data: OwmResponse = serde_json::from_str(body)?;
    let condition = data
        .weather
        .first()
        .ok_or_else(|| SourceError::Malformed("weather payload has no conditions".to_string()))?;
    let condition_text = condition.main.to_lowercase();

    Ok(WeatherSnapshot {
        temperature_c: data.main.temp.round() as i32,
        feels_like_c: data.main.feels_like.round() as i32,
        description: condition.description.clone(),
        humidity_pct: data.main.humidity.round() as i32,
        wind_kmh: (data.wind.speed * 3.6).round() as i32,
        has_rain: condition_text.contains("rain") || condition_text.contains("drizzle"),
        has_snow: condition_text.contains("snow"),
        cloud_cover_pct: data.clouds.all.round() as i32,
    })
}

/// Fetches current conditions for the configured place
pub struct WeatherFetcher {
    transport: Arc<dyn Transport>,
    base_url: String,
    lang: String,
}

impl WeatherFetcher {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            lang: lang.into(),
        }
    }

    pub fn from_config(transport: Arc<dyn Transport>, config: &WeatherConfig) -> Self {
        Self::new(transport, &config.base_url, &config.lang)
    }

    /// Current weather, or `None` when the key is missing or the provider fails
    pub async fn fetch(&self, city: &str, country_code: &str, api_key: &str) -> Option<WeatherSnapshot> {
        match self.try_fetch(city, country_code, api_key).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(error = %e, "Weather unavailable");
                None
            }
        }
    }

    /// Current weather with the reason for any failure
    pub async fn try_fetch(&self, city: &str, country_code: &str, api_key: &str) -> SourceResult<WeatherSnapshot> {
        debug!(%city, %country_code, "WeatherFetcher::try_fetch: called");
        if api_key.trim().is_empty() {
            return Err(SourceError::MissingConfig("OpenWeatherMap API key is not set".to_string()));
        }

        let location = Location::parse(city);
        debug!(?location, "WeatherFetcher::try_fetch: location classified");

        let mut params = location.query(country_code);
        params.push(("appid", api_key.trim().to_string()));
        params.push(("units", "metric".to_string()));
        params.push(("lang", self.lang.clone()));
        let params: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let url = with_query(&self.base_url, &params)?;
        let body = self.transport.get(&url).await?;
        parse_weather(&body)
    }
}
