// Config, cache and import paths exercised against a real SQLite database

mod fixtures;

use fixtures::{at, june, ALADHAN_MONTH, SERVICE_DAY};
use pretty_assertions::assert_eq;
use rusqlite::Connection;
use waqt::config::{AppConfig, ClockFormat, Theme};
use waqt::db::migrations::run_migrations;
use waqt::db::repository::{CacheRepo, MetaRepo, Origin};
use waqt::i18n::Language;
use waqt::models::location::find_preset;
use waqt::models::{Location, PrayerName};
use waqt::prayer_times::countdown::Granularity;
use waqt::prayer_times::source::import_into_cache;
use waqt::prayer_times::{aladhan, service, CachedSource, FetchError, ScheduleSource, StaticSource};

fn memory_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    conn
}

// ─── Config ─────────────────────────────────────────────────────────────────

#[test]
fn config_survives_a_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = AppConfig::default();
    config.location = Location::from(find_preset("kazan").unwrap());
    config.set("language", "ru").unwrap();
    config.set("theme", "light").unwrap();
    config.set("countdown", "minutes").unwrap();
    config.set("clock", "12h").unwrap();
    config.set("hijri-offset", "-1").unwrap();
    config.save_to(&path).unwrap();

    let loaded = AppConfig::load_from(&path).unwrap();
    assert_eq!(loaded.location.name, "Kazan");
    assert_eq!(loaded.location.timezone, "Europe/Moscow");
    assert_eq!(loaded.display.language, Language::Ru);
    assert_eq!(loaded.display.theme, Theme::Light);
    assert_eq!(loaded.display.countdown, Granularity::Minutes);
    assert_eq!(loaded.display.clock, ClockFormat::H12);
    assert_eq!(loaded.calculation.hijri_offset, -1);
    assert!(loaded.validate().is_ok());
}

#[test]
fn missing_config_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(loaded.location.name, "Mecca");
    assert_eq!(loaded.display.theme, Theme::Dark);
}

#[test]
fn unreadable_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "display = 42").unwrap();
    assert!(AppConfig::load_from(&path).is_err());
}

// ─── Imports into the cache ─────────────────────────────────────────────────

#[test]
fn aladhan_month_is_served_from_cache() {
    let conn = memory_db();
    let days = aladhan::parse_payload(ALADHAN_MONTH).unwrap();
    assert_eq!(days[0].timezone.as_deref(), Some("Europe/Moscow"));

    let schedules: Vec<_> = days.into_iter().map(|d| d.schedule).collect();
    let stored = import_into_cache(&conn, "kazan", &schedules, Origin::Aladhan).unwrap();
    assert_eq!(stored, 2);
    assert_eq!(CacheRepo::count_for_key(&conn, "kazan").unwrap(), 2);

    // Empty inner source: anything not imported is unavailable.
    let source = CachedSource::new(&conn, "kazan", StaticSource::default());
    let second = source.day(june(2)).unwrap();
    assert_eq!(second.get(PrayerName::Isha).unwrap().time, at(23, 3));

    let resolution = second.resolve(at(22, 0)).unwrap();
    assert_eq!(resolution.current().map(|e| e.name), Some(PrayerName::Maghrib));
    assert_eq!(resolution.upcoming().name, PrayerName::Isha);
    assert_eq!(resolution.remaining_minutes(at(22, 0)), 63);

    assert!(matches!(source.day(june(3)), Err(FetchError::NotAvailable(d)) if d == june(3)));
}

#[test]
fn service_day_resolves_like_its_own_flags() {
    let conn = memory_db();
    let day = service::parse_payload(SERVICE_DAY, june(15)).unwrap();
    assert_eq!(day.schedule.date(), june(1));

    import_into_cache(&conn, "kazan", &[day.schedule.clone()], Origin::Service).unwrap();
    let cached = CacheRepo::get_schedule(&conn, "kazan", june(1)).unwrap().unwrap();
    assert_eq!(cached, day.schedule);

    // The payload marks Dhuhr current and Asr upcoming at 13:00.
    let statuses = cached.resolve(at(13, 0)).unwrap().statuses();
    let current: Vec<_> = statuses.iter().filter(|s| s.is_current).map(|s| s.event.name).collect();
    let upcoming: Vec<_> = statuses.iter().filter(|s| s.is_upcoming).map(|s| s.event.name).collect();
    assert_eq!(current, vec![PrayerName::Dhuhr]);
    assert_eq!(upcoming, vec![PrayerName::Asr]);
}

#[test]
fn cache_keys_do_not_leak_into_each_other() {
    let conn = memory_db();
    let days: Vec<_> = aladhan::parse_payload(ALADHAN_MONTH)
        .unwrap()
        .into_iter()
        .map(|d| d.schedule)
        .collect();
    import_into_cache(&conn, "kazan", &days, Origin::Aladhan).unwrap();

    let other = CachedSource::new(&conn, "mecca", StaticSource::default());
    assert!(other.day(june(1)).is_err());

    assert_eq!(CacheRepo::clear_key(&conn, "kazan").unwrap(), 2);
    assert_eq!(CacheRepo::count_for_key(&conn, "kazan").unwrap(), 0);
}

#[test]
fn month_reads_fall_through_to_the_inner_source() {
    let conn = memory_db();
    let inner = StaticSource::new(
        (1..=30).map(|d| fixtures::reference_schedule(june(d))).collect(),
    );
    let source = CachedSource::new(&conn, "reference", inner);

    let month = source.month(2024, 6).unwrap();
    assert_eq!(month.days.len(), 30);
    assert_eq!(month.day(30).unwrap().first().time, at(4, 55));
    assert_eq!(CacheRepo::count_for_key(&conn, "reference").unwrap(), 30);
}

// ─── Preferences ────────────────────────────────────────────────────────────

#[test]
fn preferences_are_mirrored_in_meta() {
    let conn = memory_db();
    assert_eq!(MetaRepo::preference(&conn, "language").unwrap(), None);

    MetaRepo::set_preference(&conn, "language", "ar").unwrap();
    MetaRepo::set_preference(&conn, "language", "tr").unwrap();
    assert_eq!(MetaRepo::preference(&conn, "language").unwrap().as_deref(), Some("tr"));
    assert_eq!(MetaRepo::get(&conn, "preference.language").unwrap().as_deref(), Some("tr"));
}
