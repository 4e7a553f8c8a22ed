//! Adapter for the public prayer-times API response shape.
//!
//! Both the daily (`data` is an object) and the monthly calendar (`data` is an
//! array) responses are accepted.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;

use crate::models::{PrayerEvent, PrayerName, PrayerSchedule};
use crate::prayer_times::source::FetchError;

#[derive(Debug, Deserialize)]
struct Envelope {
    data: Data,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Data {
    Day(DayPayload),
    Month(Vec<DayPayload>),
}

#[derive(Debug, Deserialize)]
struct DayPayload {
    timings: HashMap<String, String>,
    date: DatePayload,
    #[serde(default)]
    meta: Option<MetaPayload>,
}

#[derive(Debug, Deserialize)]
struct DatePayload {
    gregorian: GregorianPayload,
    #[serde(default)]
    hijri: Option<HijriPayload>,
}

#[derive(Debug, Deserialize)]
struct GregorianPayload {
    /// `DD-MM-YYYY`
    date: String,
}

#[derive(Debug, Deserialize)]
struct HijriPayload {
    day: String,
    month: HijriMonth,
    year: String,
}

#[derive(Debug, Deserialize)]
struct HijriMonth {
    en: String,
}

#[derive(Debug, Deserialize)]
struct MetaPayload {
    #[serde(default)]
    timezone: Option<String>,
}

/// One adapted day.
#[derive(Debug, Clone, PartialEq)]
pub struct AladhanDay {
    pub schedule: PrayerSchedule,
    pub hijri: Option<String>,
    pub timezone: Option<String>,
}

pub fn parse_payload(json: &str) -> Result<Vec<AladhanDay>, FetchError> {
    let envelope: Envelope = serde_json::from_str(json)?;
    match envelope.data {
        Data::Day(day) => Ok(vec![adapt_day(day)?]),
        Data::Month(days) => days.into_iter().map(adapt_day).collect(),
    }
}

fn adapt_day(day: DayPayload) -> Result<AladhanDay, FetchError> {
    let raw_date = day.date.gregorian.date.trim();
    let date = NaiveDate::parse_from_str(raw_date, "%d-%m-%Y")
        .map_err(|_| FetchError::Date(raw_date.to_string()))?;

    let mut events = Vec::with_capacity(PrayerName::ALL.len());
    for name in PrayerName::ALL {
        let raw = day
            .timings
            .get(name.api_key())
            .ok_or(FetchError::MissingTiming(name))?;
        let event = PrayerEvent::parse(name, raw).map_err(|source| FetchError::Time { name, source })?;
        events.push(event);
    }

    Ok(AladhanDay {
        schedule: PrayerSchedule::new(date, events)?,
        hijri: day
            .date
            .hijri
            .map(|h| format!("{} {} {}", h.day.trim_start_matches('0'), h.month.en, h.year)),
        timezone: day.meta.and_then(|m| m.timezone),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScheduleError;

    const DAILY: &str = r#"{
        "code": 200,
        "status": "OK",
        "data": {
            "timings": {
                "Fajr": "04:12 (+03)", "Sunrise": "05:39 (+03)", "Dhuhr": "12:20 (+03)",
                "Asr": "15:39 (+03)", "Sunset": "19:01 (+03)", "Maghrib": "19:01 (+03)",
                "Isha": "20:31 (+03)", "Imsak": "04:02 (+03)", "Midnight": "00:20 (+03)"
            },
            "date": {
                "readable": "01 Jun 2024",
                "gregorian": { "date": "01-06-2024", "day": "01" },
                "hijri": { "date": "24-11-1445", "day": "24", "month": { "number": 11, "en": "Dhū al-Qaʿdah" }, "year": "1445" }
            },
            "meta": { "latitude": 21.4225, "longitude": 39.8262, "timezone": "Asia/Riyadh" }
        }
    }"#;

    #[test]
    fn adapts_daily_payload() {
        let days = parse_payload(DAILY).unwrap();
        assert_eq!(days.len(), 1);
        let day = &days[0];
        assert_eq!(day.schedule.date(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(day.schedule.get(PrayerName::Fajr).unwrap().time.to_string(), "04:12");
        assert_eq!(day.schedule.get(PrayerName::Isha).unwrap().time.to_string(), "20:31");
        assert_eq!(day.timezone.as_deref(), Some("Asia/Riyadh"));
        assert_eq!(day.hijri.as_deref(), Some("24 Dhū al-Qaʿdah 1445"));
    }

    #[test]
    fn adapts_monthly_payload() {
        let json = r#"{ "data": [
            { "timings": { "Fajr": "04:12", "Sunrise": "05:39", "Dhuhr": "12:20", "Asr": "15:39", "Maghrib": "19:01", "Isha": "20:31" },
              "date": { "gregorian": { "date": "01-06-2024" } } },
            { "timings": { "Fajr": "04:12", "Sunrise": "05:39", "Dhuhr": "12:20", "Asr": "15:40", "Maghrib": "19:01", "Isha": "20:31" },
              "date": { "gregorian": { "date": "02-06-2024" } } }
        ] }"#;
        let days = parse_payload(json).unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[1].schedule.get(PrayerName::Asr).unwrap().time.to_string(), "15:40");
        assert!(days[0].timezone.is_none());
    }

    #[test]
    fn missing_and_malformed_timings_are_rejected() {
        let missing = DAILY.replace(r#""Isha": "20:31 (+03)","#, "");
        assert!(matches!(
            parse_payload(&missing),
            Err(FetchError::MissingTiming(PrayerName::Isha))
        ));

        let malformed = DAILY.replace("04:12 (+03)", "4.12");
        assert!(matches!(
            parse_payload(&malformed),
            Err(FetchError::Time { name: PrayerName::Fajr, .. })
        ));
    }

    #[test]
    fn out_of_order_day_is_invalid() {
        let swapped = DAILY.replace("15:39 (+03)", "11:00 (+03)");
        assert!(matches!(
            parse_payload(&swapped),
            Err(FetchError::Schedule(ScheduleError::OutOfOrder { .. }))
        ));
    }

    #[test]
    fn garbage_is_a_payload_error() {
        assert!(matches!(parse_payload("not json"), Err(FetchError::Payload(_))));
        assert!(matches!(
            parse_payload(&DAILY.replace("01-06-2024", "2024/06/01")),
            Err(FetchError::Date(_))
        ));
    }
}
