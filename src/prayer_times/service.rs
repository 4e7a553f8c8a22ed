//! Adapter for the local preferences/prayer service response shape:
//! `{ "date": "01 Jun 2024", "timezone": "...", "times": [{ "name", "time", ... }] }`.
//!
//! `timeInMinutes` and the service's own `isCurrent`/`isUpcoming` flags are
//! ignored; times are re-parsed and the flags recomputed locally.

use chrono::NaiveDate;
use log::debug;
use serde::Deserialize;

use crate::models::{PrayerEvent, PrayerName, PrayerSchedule};
use crate::prayer_times::source::FetchError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServicePayload {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    islamic_date: Option<String>,
    #[serde(default)]
    timezone: Option<String>,
    times: Vec<ServiceTime>,
}

#[derive(Debug, Deserialize)]
struct ServiceTime {
    name: String,
    time: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDay {
    pub schedule: PrayerSchedule,
    pub hijri: Option<String>,
    pub timezone: Option<String>,
}

/// `fallback_date` is used when the payload's readable date is absent or
/// cannot be parsed.
pub fn parse_payload(json: &str, fallback_date: NaiveDate) -> Result<ServiceDay, FetchError> {
    let payload: ServicePayload = serde_json::from_str(json)?;

    let date = payload
        .date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%d %b %Y").ok())
        .unwrap_or(fallback_date);

    let mut events = Vec::with_capacity(payload.times.len());
    for entry in &payload.times {
        let Ok(name) = entry.name.parse::<PrayerName>() else {
            debug!("skipping service entry '{}'", entry.name);
            continue;
        };
        let event = PrayerEvent::parse(name, &entry.time)
            .map_err(|source| FetchError::Time { name, source })?;
        events.push(event);
    }

    for name in PrayerName::ALL {
        if !events.iter().any(|e| e.name == name) {
            return Err(FetchError::MissingTiming(name));
        }
    }

    Ok(ServiceDay {
        schedule: PrayerSchedule::new(date, events)?,
        hijri: payload.islamic_date,
        timezone: payload.timezone,
    })
}
