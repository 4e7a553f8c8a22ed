use chrono::NaiveDate;
use log::{debug, warn};
use rusqlite::Connection;
use thiserror::Error;

use crate::db::repository::{CacheRepo, Origin};
use crate::models::schedule::days_in_month;
use crate::models::{MonthSchedule, PrayerName, PrayerSchedule, ScheduleError, TimeParseError};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("prayer time calculation failed: {0}")]
    Calculation(String),
    #[error("unreadable payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("payload has no {0} time")]
    MissingTiming(PrayerName),
    #[error("bad {name} time: {source}")]
    Time {
        name: PrayerName,
        #[source]
        source: TimeParseError,
    },
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error("bad date '{0}'")]
    Date(String),
    #[error("schedule cache: {0}")]
    Cache(String),
    #[error("no prayer times available for {0}")]
    NotAvailable(NaiveDate),
}

/// Anything that can produce a day's schedule in the location's clock.
pub trait ScheduleSource {
    fn day(&self, date: NaiveDate) -> Result<PrayerSchedule, FetchError>;

    /// Every day that can be produced. Missing days stay absent from the
    /// result; the month is an error only when no day at all is available.
    fn month(&self, year: i32, month: u32) -> Result<MonthSchedule, FetchError> {
        let days = days_in_month(year, month)
            .ok_or_else(|| FetchError::Calculation(format!("invalid month {}-{}", year, month)))?;
        let mut schedules = Vec::with_capacity(days as usize);
        let mut first_error = None;
        for day in 1..=days {
            let date = NaiveDate::from_ymd_opt(year, month, day)
                .ok_or_else(|| FetchError::Calculation(format!("invalid date {}-{}-{}", year, month, day)))?;
            match self.day(date) {
                Ok(schedule) => schedules.push(schedule),
                Err(e) => {
                    debug!("skipping {} in month view: {}", date, e);
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) if schedules.is_empty() => Err(e),
            _ => Ok(MonthSchedule::new(year, month, schedules)),
        }
    }
}

impl<S: ScheduleSource + ?Sized> ScheduleSource for &S {
    fn day(&self, date: NaiveDate) -> Result<PrayerSchedule, FetchError> {
        (**self).day(date)
    }
}

impl<S: ScheduleSource + ?Sized> ScheduleSource for Box<S> {
    fn day(&self, date: NaiveDate) -> Result<PrayerSchedule, FetchError> {
        (**self).day(date)
    }
}

/// Fixed set of days, e.g. parsed from an imported payload.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    days: Vec<PrayerSchedule>,
}

impl StaticSource {
    pub fn new(days: Vec<PrayerSchedule>) -> Self {
        Self { days }
    }

    pub fn days(&self) -> &[PrayerSchedule] {
        &self.days
    }
}

impl ScheduleSource for StaticSource {
    fn day(&self, date: NaiveDate) -> Result<PrayerSchedule, FetchError> {
        self.days
            .iter()
            .find(|d| d.date() == date)
            .cloned()
            .ok_or(FetchError::NotAvailable(date))
    }
}

/// Read-through SQLite cache in front of another source.
pub struct CachedSource<'a, S> {
    conn: &'a Connection,
    key: String,
    inner: S,
}

impl<'a, S: ScheduleSource> CachedSource<'a, S> {
    pub fn new(conn: &'a Connection, key: impl Into<String>, inner: S) -> Self {
        Self {
            conn,
            key: key.into(),
            inner,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Cache `today` and the following `days_ahead` days.
    ///
    /// A day that fails does not stop the rest; the first failure is
    /// returned once every day has been tried.
    pub fn ensure_cached(&self, today: NaiveDate, days_ahead: u32) -> Result<(), FetchError> {
        let mut first_error = None;
        for date in today.iter_days().take(days_ahead as usize + 1) {
            if let Err(e) = self.day(date) {
                debug!("not cached {}: {}", date, e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl<S: ScheduleSource> ScheduleSource for CachedSource<'_, S> {
    fn day(&self, date: NaiveDate) -> Result<PrayerSchedule, FetchError> {
        match CacheRepo::get_schedule(self.conn, &self.key, date) {
            Ok(Some(schedule)) => {
                debug!("cache hit for {} ({})", date, self.key);
                return Ok(schedule);
            }
            Ok(None) => debug!("cache miss for {} ({})", date, self.key),
            Err(e) => warn!("ignoring unreadable cache row for {}: {:#}", date, e),
        }

        let schedule = self.inner.day(date)?;
        CacheRepo::store_schedule(self.conn, &self.key, &schedule, Origin::Calculated)
            .map_err(|e| FetchError::Cache(format!("{:#}", e)))?;
        Ok(schedule)
    }
}

/// Write externally supplied days into the cache under `key`.
pub fn import_into_cache(
    conn: &Connection,
    key: &str,
    days: &[PrayerSchedule],
    origin: Origin,
) -> Result<usize, FetchError> {
    for day in days {
        CacheRepo::store_schedule(conn, key, day, origin)
            .map_err(|e| FetchError::Cache(format!("{:#}", e)))?;
    }
    Ok(days.len())
}
