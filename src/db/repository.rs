use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{parse_clock_time, MinuteOfDay, PrayerSchedule};

// ─── Cached prayer times ────────────────────────────────────────────────────

/// Where a cached day came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Calculated,
    Aladhan,
    Service,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Calculated => "calculated",
            Origin::Aladhan => "aladhan",
            Origin::Service => "service",
        }
    }
}

fn parse_time(s: &str) -> Result<MinuteOfDay> {
    parse_clock_time(s).map_err(|e| anyhow!("Bad cached time '{}': {}", s, e))
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub struct CacheRepo;

impl CacheRepo {
    pub fn get_schedule(
        conn: &Connection,
        source_key: &str,
        date: NaiveDate,
    ) -> Result<Option<PrayerSchedule>> {
        let row = conn
            .query_row(
                "SELECT fajr, sunrise, dhuhr, asr, maghrib, isha FROM prayer_times_cache
                 WHERE source_key = ?1 AND date = ?2",
                params![source_key, date_key(date)],
                |row| {
                    Ok([
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                    ])
                },
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some(raw) => {
                let mut times = [MinuteOfDay::MIDNIGHT; 6];
                for (slot, s) in times.iter_mut().zip(raw.iter()) {
                    *slot = parse_time(s)?;
                }
                let schedule = PrayerSchedule::from_times(date, times)
                    .map_err(|e| anyhow!("Cached day {} is unusable: {}", date, e))?;
                Ok(Some(schedule))
            }
        }
    }

    /// Events are stored by name, so the column order is independent of the
    /// order in the schedule.
    pub fn store_schedule(
        conn: &Connection,
        source_key: &str,
        schedule: &PrayerSchedule,
        origin: Origin,
    ) -> Result<()> {
        use crate::models::PrayerName::*;
        let time = |name| {
            schedule
                .get(name)
                .map(|e| e.time.to_string())
                .ok_or_else(|| anyhow!("Schedule for {} has no {}", schedule.date(), name))
        };
        conn.execute(
            "INSERT OR REPLACE INTO prayer_times_cache
                (source_key, date, fajr, sunrise, dhuhr, asr, maghrib, isha, origin)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                source_key,
                date_key(schedule.date()),
                time(Fajr)?,
                time(Sunrise)?,
                time(Dhuhr)?,
                time(Asr)?,
                time(Maghrib)?,
                time(Isha)?,
                origin.as_str(),
            ],
        )?;
        Ok(())
    }

    pub fn count_for_key(conn: &Connection, source_key: &str) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM prayer_times_cache WHERE source_key = ?1",
            params![source_key],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn clear_key(conn: &Connection, source_key: &str) -> Result<usize> {
        let n = conn.execute(
            "DELETE FROM prayer_times_cache WHERE source_key = ?1",
            params![source_key],
        )?;
        Ok(n)
    }
}

// ─── Meta / mirrored preferences ────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// Mirror a user preference next to the config file.
    pub fn set_preference(conn: &Connection, name: &str, value: &str) -> Result<()> {
        Self::set(conn, &format!("preference.{}", name), value)
    }

    pub fn preference(conn: &Connection, name: &str) -> Result<Option<String>> {
        Self::get(conn, &format!("preference.{}", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::PrayerName;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn schedule(date: NaiveDate) -> PrayerSchedule {
        let m = |h, min| MinuteOfDay::from_hm(h, min).unwrap();
        PrayerSchedule::from_times(
            date,
            [m(4, 55), m(5, 58), m(12, 20), m(16, 51), m(18, 42), m(19, 45)],
        )
        .unwrap()
    }

    #[test]
    fn stores_and_reads_back_a_day() {
        let conn = conn();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(CacheRepo::get_schedule(&conn, "k", date).unwrap().is_none());

        CacheRepo::store_schedule(&conn, "k", &schedule(date), Origin::Calculated).unwrap();
        let loaded = CacheRepo::get_schedule(&conn, "k", date).unwrap().unwrap();
        assert_eq!(loaded, schedule(date));
        assert_eq!(
            loaded.get(PrayerName::Maghrib).unwrap().time.to_string(),
            "18:42"
        );
        assert!(CacheRepo::get_schedule(&conn, "other", date).unwrap().is_none());
    }

    #[test]
    fn clearing_a_key_leaves_others() {
        let conn = conn();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        CacheRepo::store_schedule(&conn, "a", &schedule(date), Origin::Aladhan).unwrap();
        CacheRepo::store_schedule(&conn, "b", &schedule(date), Origin::Service).unwrap();

        assert_eq!(CacheRepo::clear_key(&conn, "a").unwrap(), 1);
        assert_eq!(CacheRepo::count_for_key(&conn, "a").unwrap(), 0);
        assert_eq!(CacheRepo::count_for_key(&conn, "b").unwrap(), 1);
    }

    #[test]
    fn preferences_round_trip() {
        let conn = conn();
        assert_eq!(MetaRepo::preference(&conn, "theme").unwrap(), None);
        MetaRepo::set_preference(&conn, "theme", "light").unwrap();
        MetaRepo::set_preference(&conn, "theme", "dark").unwrap();
        assert_eq!(
            MetaRepo::preference(&conn, "theme").unwrap().as_deref(),
            Some("dark")
        );
    }
}
