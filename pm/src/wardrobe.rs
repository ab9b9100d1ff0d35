//! Clothing advice from the weather
//!
//! The catalog is a fixed set of bands per garment category. Advice picks items
//! from those bands with an injected rng so runs are reproducible under a seed.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ConfigError;
use crate::sources::WeatherSnapshot;

/// Advice shown when no weather data is available
pub const NO_WEATHER_PLACEHOLDER: &str = "Could not load the weather";

/// How many distinct cold-weather accessories to suggest
const COLD_ACCESSORY_COUNT: usize = 2;

/// Garment category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Top,
    Bottom,
    Accessory,
}

/// Threshold bucket inside a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Light,
    Medium,
    Warm,
    VeryWarm,
    Rain,
    Cold,
    Sun,
}

/// Every (category, band) pair the catalog holds
pub const BANDS: [(Category, Band); 9] = [
    (Category::Top, Band::Light),
    (Category::Top, Band::Medium),
    (Category::Top, Band::Warm),
    (Category::Top, Band::VeryWarm),
    (Category::Bottom, Band::Light),
    (Category::Bottom, Band::Warm),
    (Category::Accessory, Band::Rain),
    (Category::Accessory, Band::Cold),
    (Category::Accessory, Band::Sun),
];

impl Category {
    pub fn name(self) -> &'static str {
        match self {
            Category::Top => "top",
            Category::Bottom => "bottom",
            Category::Accessory => "accessory",
        }
    }
}

impl Band {
    pub fn name(self) -> &'static str {
        match self {
            Band::Light => "light",
            Band::Medium => "medium",
            Band::Warm => "warm",
            Band::VeryWarm => "very-warm",
            Band::Rain => "rain",
            Band::Cold => "cold",
            Band::Sun => "sun",
        }
    }
}

fn items(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Upper body layers by warmth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct TopLayers {
    pub light: Vec<String>,
    pub medium: Vec<String>,
    pub warm: Vec<String>,
    pub very_warm: Vec<String>,
}

impl Default for TopLayers {
    fn default() -> Self {
        Self {
            light: items(&["white t-shirt", "black t-shirt", "blue polo", "linen shirt"]),
            medium: items(&["sweater", "hoodie", "light shirt", "cardigan"]),
            warm: items(&["fleece hoodie", "thick sweater", "wool sweater"]),
            very_warm: items(&["winter jacket", "coat", "down vest"]),
        }
    }
}

/// Lower body layers by warmth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BottomLayers {
    pub light: Vec<String>,
    pub warm: Vec<String>,
}

impl Default for BottomLayers {
    fn default() -> Self {
        Self {
            light: items(&["shorts", "light trousers", "jeans"]),
            warm: items(&["warm jeans", "wool trousers", "insulated trousers"]),
        }
    }
}

/// Accessories by condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Accessories {
    pub rain: Vec<String>,
    pub cold: Vec<String>,
    pub sun: Vec<String>,
}

impl Default for Accessories {
    fn default() -> Self {
        Self {
            rain: items(&["umbrella", "waterproof jacket", "rubber boots"]),
            cold: items(&["hat", "gloves", "scarf", "warm socks"]),
            sun: items(&["sunglasses", "cap", "sunscreen"]),
        }
    }
}

/// Clothing catalog, immutable for a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WardrobeCatalog {
    pub top: TopLayers,
    pub bottom: BottomLayers,
    pub accessory: Accessories,
}

impl WardrobeCatalog {
    /// Items of a band; pairs outside [`BANDS`] have none
    pub fn items(&self, category: Category, band: Band) -> &[String] {
        match (category, band) {
            (Category::Top, Band::Light) => &self.top.light,
            (Category::Top, Band::Medium) => &self.top.medium,
            (Category::Top, Band::Warm) => &self.top.warm,
            (Category::Top, Band::VeryWarm) => &self.top.very_warm,
            (Category::Bottom, Band::Light) => &self.bottom.light,
            (Category::Bottom, Band::Warm) => &self.bottom.warm,
            (Category::Accessory, Band::Rain) => &self.accessory.rain,
            (Category::Accessory, Band::Cold) => &self.accessory.cold,
            (Category::Accessory, Band::Sun) => &self.accessory.sun,
            _ => &[],
        }
    }

    /// Every top and bottom band must offer at least one item
    ///
    /// Accessory bands may be empty; the advice then simply skips them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (category, band) in BANDS {
            if category != Category::Accessory && self.items(category, band).is_empty() {
                return Err(ConfigError::EmptyBand {
                    category: category.name(),
                    band: band.name(),
                });
            }
        }
        Ok(())
    }
}

/// Recommend clothing for the day
///
/// Every rule is evaluated and appends in rule order: top layer by felt
/// temperature, bottom layer by temperature, rain gear, cold accessories,
/// sun accessories.
pub fn recommend<R: Rng + ?Sized>(
    weather: Option<&WeatherSnapshot>,
    catalog: &WardrobeCatalog,
    rng: &mut R,
) -> Vec<String> {
    let Some(weather) = weather else {
        debug!("recommend: no weather, returning placeholder");
        return vec![NO_WEATHER_PLACEHOLDER.to_string()];
    };
    debug!(?weather, "recommend: called");

    let mut outfit = Vec::new();

    let feels = weather.feels_like_c;
    if feels < 5 {
        outfit.extend(pick(catalog, Category::Top, Band::VeryWarm, rng));
        outfit.extend(pick(catalog, Category::Top, Band::Warm, rng));
    } else if feels < 12 {
        outfit.extend(pick(catalog, Category::Top, Band::Warm, rng));
    } else if feels < 18 {
        outfit.extend(pick(catalog, Category::Top, Band::Medium, rng));
    } else {
        outfit.extend(pick(catalog, Category::Top, Band::Light, rng));
    }

    if weather.temperature_c < 15 {
        outfit.extend(pick(catalog, Category::Bottom, Band::Warm, rng));
    } else {
        outfit.extend(pick(catalog, Category::Bottom, Band::Light, rng));
    }

    if weather.has_rain || weather.has_snow {
        outfit.extend(pick(catalog, Category::Accessory, Band::Rain, rng));
    }

    if weather.temperature_c < 10 || weather.wind_kmh > 20 {
        let cold = catalog.items(Category::Accessory, Band::Cold);
        outfit.extend(cold.choose_multiple(rng, COLD_ACCESSORY_COUNT).cloned());
    }

    if weather.temperature_c > 22 && weather.cloud_cover_pct < 50 {
        outfit.extend(pick(catalog, Category::Accessory, Band::Sun, rng));
    }

    debug!(?outfit, "recommend: done");
    outfit
}

fn pick<R: Rng + ?Sized>(catalog: &WardrobeCatalog, category: Category, band: Band, rng: &mut R) -> Option<String> {
    catalog.items(category, band).choose(rng).cloned()
}
