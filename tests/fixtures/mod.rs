// Shared schedules and payloads for integration tests
#![allow(dead_code)]

use chrono::NaiveDate;
use waqt::models::{MinuteOfDay, PrayerEvent, PrayerName, PrayerSchedule};

pub const ALADHAN_MONTH: &str = include_str!("aladhan_month.json");
pub const SERVICE_DAY: &str = include_str!("service_day.json");

pub fn at(hour: u32, minute: u32) -> MinuteOfDay {
    MinuteOfDay::from_hm(hour, minute).expect("valid clock time")
}

/// 04:55, 05:58, 12:20, 16:51, 18:42, 19:45
pub fn reference_events() -> Vec<PrayerEvent> {
    let times = [at(4, 55), at(5, 58), at(12, 20), at(16, 51), at(18, 42), at(19, 45)];
    PrayerName::ALL
        .iter()
        .zip(times)
        .map(|(name, time)| PrayerEvent::new(*name, time))
        .collect()
}

pub fn reference_schedule(date: NaiveDate) -> PrayerSchedule {
    PrayerSchedule::new(date, reference_events()).expect("reference schedule is valid")
}

pub fn june(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).expect("valid June date")
}
