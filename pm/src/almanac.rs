//! Holiday and name-day lookup for the briefing header

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ConfigError;

/// Leap year used to check "MM-DD" keys, so 02-29 is accepted
const KEY_CHECK_YEAR: i32 = 2024;

/// What today is remembered for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayNotes {
    pub holiday: Option<String>,
    pub name_day: Option<String>,
}

/// Date-keyed tables, keys are "MM-DD"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Almanac {
    pub holidays: BTreeMap<String, String>,

    #[serde(rename = "name-days")]
    pub name_days: BTreeMap<String, String>,
}

impl Default for Almanac {
    fn default() -> Self {
        let holidays = [
            ("01-01", "New Year's Day"),
            ("05-01", "Labour Day"),
            ("05-08", "Liberation Day"),
            ("07-05", "Saints Cyril and Methodius Day"),
            ("07-06", "Jan Hus Day"),
            ("09-28", "Czech Statehood Day"),
            ("10-28", "Independent Czechoslovak State Day"),
            ("11-17", "Struggle for Freedom and Democracy Day"),
            ("12-24", "Christmas Eve"),
            ("12-25", "Christmas Day"),
            ("12-26", "St. Stephen's Day"),
        ];
        Self {
            holidays: holidays.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            name_days: BTreeMap::new(),
        }
    }
}

impl Almanac {
    /// Reject keys that are not a real "MM-DD" day
    pub fn validate(&self) -> Result<(), ConfigError> {
        for key in self.holidays.keys().chain(self.name_days.keys()) {
            if parse_key(key).is_none() {
                return Err(ConfigError::InvalidDateKey(key.clone()));
            }
        }
        Ok(())
    }

    /// Holiday and name day for `date`, if any
    pub fn lookup(&self, date: NaiveDate) -> DayNotes {
        let key = format!("{:02}-{:02}", date.month(), date.day());
        debug!(%key, "Almanac::lookup: called");
        DayNotes {
            holiday: non_blank(self.holidays.get(&key)),
            name_day: non_blank(self.name_days.get(&key)),
        }
    }
}

fn parse_key(key: &str) -> Option<NaiveDate> {
    let (month, day) = key.split_once('-')?;
    if month.len() != 2 || day.len() != 2 {
        return None;
    }
    NaiveDate::from_ymd_opt(KEY_CHECK_YEAR, month.parse().ok()?, day.parse().ok()?)
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
