use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

fn default_name() -> String {
    "Mecca".to_string()
}
fn default_country() -> String {
    "Saudi Arabia".to_string()
}
fn default_latitude() -> f64 {
    21.4225
}
fn default_longitude() -> f64 {
    39.8262
}
fn default_timezone() -> String {
    "Asia/Riyadh".to_string()
}
fn default_timezone_offset() -> i32 {
    180
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    /// IANA zone name. Takes precedence over `timezone_offset`.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_timezone_offset")]
    pub timezone_offset: i32, // minutes from UTC
}

impl Default for Location {
    fn default() -> Self {
        Self {
            name: default_name(),
            country: default_country(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            timezone: default_timezone(),
            timezone_offset: default_timezone_offset(),
        }
    }
}

impl Location {
    pub fn zone(&self) -> Result<LocationZone> {
        if self.timezone.trim().is_empty() {
            LocationZone::from_offset_minutes(self.timezone_offset)
        } else {
            LocationZone::parse(&self.timezone)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(anyhow!("Latitude must be between -90 and 90, got {}", self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(anyhow!("Longitude must be between -180 and 180, got {}", self.longitude));
        }
        self.zone().map(|_| ())
    }

    /// Stable identifier for cached schedules of this place.
    pub fn key(&self) -> String {
        format!("{:.4},{:.4}", self.latitude, self.longitude)
    }
}

impl From<&LocationPreset> for Location {
    fn from(preset: &LocationPreset) -> Self {
        Self {
            name: preset.name.to_string(),
            country: preset.country.to_string(),
            latitude: preset.latitude,
            longitude: preset.longitude,
            timezone: preset.timezone.to_string(),
            timezone_offset: 0,
        }
    }
}

/// Timezone the schedule's clock times are expressed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationZone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl LocationZone {
    pub fn parse(name: &str) -> Result<Self> {
        let tz: Tz = name
            .trim()
            .parse()
            .map_err(|e| anyhow!("Unknown timezone '{}': {}", name, e))?;
        Ok(LocationZone::Named(tz))
    }

    pub fn from_offset_minutes(minutes: i32) -> Result<Self> {
        FixedOffset::east_opt(minutes * 60)
            .map(LocationZone::Fixed)
            .ok_or_else(|| anyhow!("Invalid timezone offset: {}", minutes))
    }

    /// Wall-clock time at the location for a given instant.
    pub fn local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            LocationZone::Named(tz) => instant.with_timezone(tz).naive_local(),
            LocationZone::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        }
    }
}

impl fmt::Display for LocationZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationZone::Named(tz) => write!(f, "{}", tz.name()),
            LocationZone::Fixed(offset) => write!(f, "UTC{}", offset),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationPreset {
    pub value: &'static str,
    pub name: &'static str,
    pub country: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: &'static str,
}

pub const POPULAR_LOCATIONS: &[LocationPreset] = &[
    LocationPreset { value: "mecca-saudi-arabia", name: "Mecca", country: "Saudi Arabia", latitude: 21.4225, longitude: 39.8262, timezone: "Asia/Riyadh" },
    LocationPreset { value: "medina-saudi-arabia", name: "Medina", country: "Saudi Arabia", latitude: 24.5247, longitude: 39.5692, timezone: "Asia/Riyadh" },
    LocationPreset { value: "jerusalem-palestine", name: "Jerusalem", country: "Palestine", latitude: 31.7683, longitude: 35.2137, timezone: "Asia/Jerusalem" },
    LocationPreset { value: "istanbul-turkey", name: "Istanbul", country: "Turkey", latitude: 41.0082, longitude: 28.9784, timezone: "Europe/Istanbul" },
    LocationPreset { value: "cairo-egypt", name: "Cairo", country: "Egypt", latitude: 30.0444, longitude: 31.2357, timezone: "Africa/Cairo" },
    LocationPreset { value: "dubai-uae", name: "Dubai", country: "UAE", latitude: 25.2048, longitude: 55.2708, timezone: "Asia/Dubai" },
    LocationPreset { value: "kuala-lumpur-malaysia", name: "Kuala Lumpur", country: "Malaysia", latitude: 3.1390, longitude: 101.6869, timezone: "Asia/Kuala_Lumpur" },
    LocationPreset { value: "new-york-usa", name: "New York", country: "USA", latitude: 40.7128, longitude: -74.0060, timezone: "America/New_York" },
    LocationPreset { value: "london-uk", name: "London", country: "UK", latitude: 51.5074, longitude: -0.1278, timezone: "Europe/London" },
    LocationPreset { value: "moscow-russia", name: "Moscow", country: "Russia", latitude: 55.7558, longitude: 37.6173, timezone: "Europe/Moscow" },
    LocationPreset { value: "kazan-russia", name: "Kazan", country: "Russia", latitude: 55.7887, longitude: 49.1221, timezone: "Europe/Moscow" },
    LocationPreset { value: "jakarta-indonesia", name: "Jakarta", country: "Indonesia", latitude: -6.2088, longitude: 106.8456, timezone: "Asia/Jakarta" },
];

/// Look up a preset by its slug or (case-insensitive) city name.
pub fn find_preset(query: &str) -> Option<&'static LocationPreset> {
    let q = query.trim().to_lowercase();
    POPULAR_LOCATIONS
        .iter()
        .find(|p| p.value == q || p.name.to_lowercase() == q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn named_zone_converts_instant() {
        let zone = LocationZone::parse("Asia/Riyadh").unwrap();
        let instant = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        assert_eq!(zone.local(instant).hour(), 13);
    }

    #[test]
    fn fixed_offset_used_without_zone_name() {
        let location = Location {
            timezone: String::new(),
            timezone_offset: 330,
            ..Location::default()
        };
        let zone = location.zone().unwrap();
        let instant = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let local = zone.local(instant);
        assert_eq!((local.hour(), local.minute()), (5, 30));
    }

    #[test]
    fn rejects_unknown_zone_and_bad_coordinates() {
        assert!(LocationZone::parse("Mars/Olympus").is_err());
        let location = Location {
            latitude: 91.0,
            ..Location::default()
        };
        assert!(location.validate().is_err());
    }

    #[test]
    fn presets_have_valid_zones() {
        for preset in POPULAR_LOCATIONS {
            assert!(Location::from(preset).validate().is_ok(), "{}", preset.value);
        }
        assert_eq!(find_preset("Cairo").unwrap().value, "cairo-egypt");
        assert_eq!(find_preset("dubai-uae").unwrap().name, "Dubai");
        assert!(find_preset("atlantis").is_none());
    }
}
