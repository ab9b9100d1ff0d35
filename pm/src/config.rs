//! PrintMaster configuration types and loading

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::almanac::Almanac;
use crate::layout::DEFAULT_PAPER_WIDTH;
use crate::sources::{CalendarSource, NewsSource, ZodiacSign};
use crate::wardrobe::WardrobeCatalog;

/// Narrowest paper the layout supports
const MIN_PAPER_WIDTH: usize = 16;

/// Configuration values rejected by validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Wardrobe band {category}.{band} has no items")]
    EmptyBand { category: &'static str, band: &'static str },

    #[error("Invalid almanac date '{0}', expected MM-DD")]
    InvalidDateKey(String),

    #[error("paper-width must be at least {min}, got {got}")]
    PaperTooNarrow { min: usize, got: usize },
}

/// Main PrintMaster configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Run mode and logging
    pub general: GeneralConfig,

    /// Paper and console widths
    pub layout: LayoutConfig,

    /// HTTP client settings shared by all sources
    pub http: HttpConfig,

    /// Weather provider settings
    pub weather: WeatherConfig,

    /// Personal details (zodiac sign)
    pub personal: PersonalConfig,

    /// Horoscope provider settings
    pub horoscope: HoroscopeConfig,

    /// iCalendar sources, in print order
    pub calendars: Vec<CalendarSource>,

    /// News feeds
    pub news: NewsConfig,

    /// Clothing catalog for the wardrobe advice
    pub wardrobe: WardrobeCatalog,

    /// Physical printer settings
    pub printer: PrinterConfig,

    /// Holiday and name-day tables
    pub almanac: Almanac,

    /// Joke pool; the built-in pool is used when empty
    pub jokes: Vec<String>,
}

impl Config {
    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        if self.layout.paper_width < MIN_PAPER_WIDTH {
            return Err(ConfigError::PaperTooNarrow {
                min: MIN_PAPER_WIDTH,
                got: self.layout.paper_width,
            }
            .into());
        }
        self.wardrobe.validate()?;
        self.almanac.validate()?;
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try working directory config: ./printmaster.yml
        let local_config = PathBuf::from("printmaster.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/printmaster/printmaster.yml
        if let Some(user_config) = Self::user_config_path() {
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|c| c.general.log_level)
    }

    /// User config location (~/.config/printmaster/printmaster.yml on Linux)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("printmaster").join("printmaster.yml"))
    }

    /// Save config to file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context(format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs::write(path, content).context(format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Run mode and logging
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Print to the console instead of the printer
    #[serde(rename = "dry-run")]
    pub dry_run: bool,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            dry_run: true,
            log_level: None,
        }
    }
}

/// Paper and console widths
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Characters per printed line
    #[serde(rename = "paper-width")]
    pub paper_width: usize,

    /// Console width used to center dry-run output
    #[serde(rename = "console-width")]
    pub console_width: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            paper_width: DEFAULT_PAPER_WIDTH,
            console_width: crate::device::CONSOLE_WIDTH,
        }
    }
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// User-Agent header; some news sites reject unknown clients
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
        }
    }
}

/// Weather provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key
    #[serde(rename = "api-key")]
    pub api_key: String,

    /// Environment variable consulted when `api-key` is empty
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// City name, postal code or "lat,lon"
    pub city: String,

    /// ISO 3166 country code
    #[serde(rename = "country-code")]
    pub country_code: String,

    /// Language of the weather description
    pub lang: String,

    /// Current weather endpoint
    #[serde(rename = "base-url")]
    pub base_url: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_key_env: "OPENWEATHER_API_KEY".to_string(),
            city: "Prague".to_string(),
            country_code: "CZ".to_string(),
            lang: "en".to_string(),
            base_url: "https://api.openweathermap.org/data/2.5/weather".to_string(),
        }
    }
}

impl WeatherConfig {
    /// API key from config, falling back to the environment
    pub fn api_key(&self) -> Option<String> {
        let key = self.api_key.trim();
        if !key.is_empty() {
            return Some(key.to_string());
        }
        std::env::var(&self.api_key_env)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }
}

/// Personal details
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalConfig {
    #[serde(rename = "zodiac-sign")]
    pub zodiac_sign: ZodiacSign,
}

/// Horoscope provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoroscopeConfig {
    #[serde(rename = "base-url")]
    pub base_url: String,
}

impl Default for HoroscopeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://aztro.sameerkumar.website/".to_string(),
        }
    }
}

/// News feeds and limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// Maximum headlines across all feeds
    #[serde(rename = "max-items")]
    pub max_items: usize,

    /// Feeds, consulted in order
    pub sources: Vec<NewsSource>,
}

impl Default for NewsConfig {
    fn default() -> Self {
        let source = |label: &str, url: &str| NewsSource {
            label: label.to_string(),
            url: url.to_string(),
        };
        Self {
            max_items: 5,
            sources: vec![
                source("Novinky.cz", "https://www.novinky.cz/rss"),
                source("ČT24", "https://ct24.ceskatelevize.cz/rss/hlavni-zpravy"),
                source("Hospodářské noviny", "https://ihned.cz/?p=000000_rss"),
                source("Seznam Zprávy", "https://www.seznamzpravy.cz/rss"),
            ],
        }
    }
}

/// Physical printer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// Printer device node receiving ESC/POS bytes
    #[serde(rename = "device-path")]
    pub device_path: PathBuf,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            device_path: PathBuf::from("/dev/usb/lp0"),
        }
    }
}
