use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use crate::models::prayer::{MinuteOfDay, PrayerEvent, PrayerName};

/// Every variant means the input cannot be resolved; callers fall back to a
/// "no data" state instead of guessing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("invalid schedule: no events")]
    Empty,
    #[error("invalid schedule: {current} at {current_time} comes after {previous} at {previous_time}")]
    OutOfOrder {
        index: usize,
        previous: PrayerName,
        previous_time: MinuteOfDay,
        current: PrayerName,
        current_time: MinuteOfDay,
    },
    #[error("invalid schedule: {name} appears more than once")]
    DuplicateName { name: PrayerName },
    #[error("invalid schedule: expected 6 events, found {found}")]
    Incomplete { found: usize },
}

impl ScheduleError {
    /// The two failures the resolver itself reports for an event list.
    /// The other variants come from building a full day.
    pub fn is_invalid_schedule(&self) -> bool {
        matches!(self, ScheduleError::Empty | ScheduleError::OutOfOrder { .. })
    }
}

/// Order check used both by the resolver (`strict = false`, ties tolerated)
/// and by `PrayerSchedule::new` (`strict = true`).
pub fn check_order(events: &[PrayerEvent], strict: bool) -> Result<(), ScheduleError> {
    if events.is_empty() {
        return Err(ScheduleError::Empty);
    }
    for (index, pair) in events.windows(2).enumerate() {
        let (prev, cur) = (pair[0], pair[1]);
        let bad = if strict { cur.time <= prev.time } else { cur.time < prev.time };
        if bad {
            return Err(ScheduleError::OutOfOrder {
                index: index + 1,
                previous: prev.name,
                previous_time: prev.time,
                current: cur.name,
                current_time: cur.time,
            });
        }
    }
    Ok(())
}

/// The six events of one calendar day, strictly ascending by time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrayerSchedule {
    date: NaiveDate,
    events: Vec<PrayerEvent>,
}

impl PrayerSchedule {
    pub fn new(date: NaiveDate, events: Vec<PrayerEvent>) -> Result<Self, ScheduleError> {
        check_order(&events, true)?;
        for (i, event) in events.iter().enumerate() {
            if events[..i].iter().any(|e| e.name == event.name) {
                return Err(ScheduleError::DuplicateName { name: event.name });
            }
        }
        if events.len() != PrayerName::ALL.len() {
            return Err(ScheduleError::Incomplete { found: events.len() });
        }
        Ok(Self { date, events })
    }

    /// Build from times given in `PrayerName::ALL` order.
    pub fn from_times(date: NaiveDate, times: [MinuteOfDay; 6]) -> Result<Self, ScheduleError> {
        let events = PrayerName::ALL
            .iter()
            .zip(times)
            .map(|(name, time)| PrayerEvent::new(*name, time))
            .collect();
        Self::new(date, events)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn events(&self) -> &[PrayerEvent] {
        &self.events
    }

    pub fn get(&self, name: PrayerName) -> Option<&PrayerEvent> {
        self.events.iter().find(|e| e.name == name)
    }

    pub fn first(&self) -> &PrayerEvent {
        // Non-empty by construction.
        &self.events[0]
    }
}

/// Day schedules of one Gregorian month, ordered by day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthSchedule {
    pub year: i32,
    pub month: u32,
    pub days: Vec<PrayerSchedule>,
}

impl MonthSchedule {
    pub fn new(year: i32, month: u32, mut days: Vec<PrayerSchedule>) -> Self {
        days.retain(|d| d.date().year() == year && d.date().month() == month);
        days.sort_by_key(|d| d.date());
        days.dedup_by_key(|d| d.date());
        Self { year, month, days }
    }

    pub fn day(&self, day: u32) -> Option<&PrayerSchedule> {
        self.days.iter().find(|d| d.date().day() == day)
    }
}

/// Number of days in the given month, `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(h: u32, min: u32) -> MinuteOfDay {
        MinuteOfDay::from_hm(h, min).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn builds_six_event_schedule() {
        let schedule = PrayerSchedule::from_times(
            date(),
            [m(4, 55), m(5, 58), m(12, 20), m(16, 51), m(18, 42), m(19, 45)],
        )
        .unwrap();
        assert_eq!(schedule.events().len(), 6);
        assert_eq!(schedule.first().name, PrayerName::Fajr);
        assert_eq!(schedule.get(PrayerName::Asr).unwrap().time, m(16, 51));
    }

    #[test]
    fn rejects_equal_neighbours() {
        let err = PrayerSchedule::from_times(
            date(),
            [m(4, 55), m(4, 55), m(12, 20), m(16, 51), m(18, 42), m(19, 45)],
        )
        .unwrap_err();
        assert!(matches!(err, ScheduleError::OutOfOrder { index: 1, .. }));
    }

    #[test]
    fn rejects_short_and_duplicate_schedules() {
        let short = vec![PrayerEvent::new(PrayerName::Fajr, m(4, 0))];
        assert_eq!(
            PrayerSchedule::new(date(), short),
            Err(ScheduleError::Incomplete { found: 1 })
        );

        let dup = vec![
            PrayerEvent::new(PrayerName::Fajr, m(4, 0)),
            PrayerEvent::new(PrayerName::Fajr, m(5, 0)),
        ];
        assert_eq!(
            PrayerSchedule::new(date(), dup),
            Err(ScheduleError::DuplicateName { name: PrayerName::Fajr })
        );
        assert_eq!(PrayerSchedule::new(date(), vec![]), Err(ScheduleError::Empty));
    }

    #[test]
    fn tolerant_order_check_accepts_ties() {
        let events = [
            PrayerEvent::new(PrayerName::Fajr, m(4, 0)),
            PrayerEvent::new(PrayerName::Sunrise, m(4, 0)),
        ];
        assert!(check_order(&events, false).is_ok());
        assert!(check_order(&events, true).is_err());
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2024, 12), Some(31));
        assert_eq!(days_in_month(2024, 13), None);
    }
}
