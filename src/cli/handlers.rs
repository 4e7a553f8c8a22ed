use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc};
use log::{info, warn};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;

use crate::cli::args::ImportFormat;
use crate::config::AppConfig;
use crate::db::repository::{MetaRepo, Origin};
use crate::i18n::Language;
use crate::models::location::find_preset;
use crate::models::{Location, MinuteOfDay, PrayerName, PrayerSchedule, POPULAR_LOCATIONS};
use crate::prayer_times::calculator::{method_name, parse_method};
use crate::prayer_times::source::import_into_cache;
use crate::prayer_times::{
    aladhan, service, CachedSource, Countdown, EventStatus, Granularity, PrayerCalculator,
    ScheduleSource,
};
use crate::utils::format::format_time;
use crate::utils::hijri::hijri_string;

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

fn open_source<'a>(
    conn: &'a Connection,
    config: &AppConfig,
) -> Result<CachedSource<'a, PrayerCalculator>> {
    let calculator = config.calculator()?;
    let key = calculator.source_key()?;
    Ok(CachedSource::new(conn, key, calculator))
}

/// Wall-clock time at the configured location.
fn local_now(config: &AppConfig) -> Result<NaiveDateTime> {
    Ok(config.zone()?.local(Utc::now()))
}

fn load_day(source: &impl ScheduleSource, date: NaiveDate) -> Result<PrayerSchedule> {
    source
        .day(date)
        .map_err(|e| anyhow!("No data for {}: {}", date, e))
}

// ─── Setup wizard ────────────────────────────────────────────────────────────

pub fn handle_setup(conn: &Connection, config: &mut AppConfig, reset: bool) -> Result<()> {
    if !reset {
        if let Some(done) = MetaRepo::get(conn, "setup_done")? {
            if done == "1" {
                println!("waqt is already configured. Use --reset to reconfigure.");
                return Ok(());
            }
        }
    }
    crate::cli::setup_tui::run_setup_tui(conn, config)
}

// ─── Times ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct EventOutput {
    name: PrayerName,
    time: String,
    minutes: u16,
    is_current: bool,
    is_upcoming: bool,
}

impl From<&EventStatus> for EventOutput {
    fn from(status: &EventStatus) -> Self {
        Self {
            name: status.event.name,
            time: status.event.time.to_string(),
            minutes: status.event.minutes_since_midnight(),
            is_current: status.is_current,
            is_upcoming: status.is_upcoming,
        }
    }
}

#[derive(Debug, Serialize)]
struct TimesOutput<'a> {
    date: NaiveDate,
    location: &'a str,
    timezone: String,
    hijri: String,
    events: Vec<EventOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining_minutes: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wraps_to_tomorrow: Option<bool>,
}

pub fn handle_times(
    conn: &Connection,
    config: &AppConfig,
    date: Option<&str>,
    json: bool,
) -> Result<()> {
    let now = local_now(config)?;
    let date = match date {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .with_context(|| format!("'{}' is not a YYYY-MM-DD date", raw))?,
        None => now.date(),
    };
    let is_today = date == now.date();

    let source = open_source(conn, config)?;
    let schedule = load_day(&source, date)?;

    let now_minute = MinuteOfDay::from_time(now.time());
    let resolution = if is_today {
        Some(schedule.resolve(now_minute)?)
    } else {
        None
    };
    let statuses = match &resolution {
        Some(r) => r.statuses(),
        None => schedule
            .events()
            .iter()
            .map(|event| EventStatus {
                event: *event,
                is_current: false,
                is_upcoming: false,
            })
            .collect(),
    };
    let hijri = hijri_string(date, config.calculation.hijri_offset);

    if json {
        let output = TimesOutput {
            date,
            location: &config.location.name,
            timezone: config.zone()?.to_string(),
            hijri,
            events: statuses.iter().map(EventOutput::from).collect(),
            remaining_minutes: resolution.as_ref().map(|r| r.remaining_minutes(now_minute)),
            wraps_to_tomorrow: resolution.as_ref().map(|r| r.wraps_to_tomorrow()),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let language = config.display.language;
    println!();
    println_colored!(
        GOLD,
        "  {} · {} ({})",
        config.location.name,
        date.format("%Y-%m-%d"),
        config.zone()?
    );
    if !hijri.is_empty() {
        println_colored!(DIM, "  {}", hijri);
    }
    println!();

    for status in &statuses {
        let name = language.prayer_name(status.event.name);
        let time = format_time(status.event.time, config.display.clock);
        if status.is_current {
            println_colored!(GREEN, "  ● {:<10}  {}", name, time);
        } else if status.is_upcoming {
            println_colored!(AMBER, "  ▸ {:<10}  {}", name, time);
        } else if is_today && status.event.time < now_minute {
            println_colored!(DIM, "    {:<10}  {}", name, time);
        } else {
            println_colored!(BOLD, "    {:<10}  {}", name, time);
        }
    }

    if let Some(resolution) = &resolution {
        let countdown = Countdown::at(resolution, now.time(), Granularity::Minutes);
        println!();
        println_colored!(
            AMBER,
            "  {}: {}  ·  {} {}",
            language.next_prayer(),
            language.prayer_name(countdown.upcoming.name),
            countdown.label(&language.unit_labels()),
            language.remaining()
        );
    }
    println!();
    Ok(())
}

// ─── Next ────────────────────────────────────────────────────────────────────

pub fn handle_next(conn: &Connection, config: &AppConfig, seconds: bool) -> Result<()> {
    let now = local_now(config)?;
    let source = open_source(conn, config)?;
    let schedule = load_day(&source, now.date())?;
    let resolution = schedule.resolve(MinuteOfDay::from_time(now.time()))?;

    let granularity = if seconds {
        Granularity::Seconds
    } else {
        Granularity::Minutes
    };
    let countdown = Countdown::at(&resolution, now.time(), granularity);
    let language = config.display.language;

    println!(
        "{} {}  {} {}",
        language.prayer_name(countdown.upcoming.name),
        format_time(countdown.upcoming.time, config.display.clock),
        countdown.label(&language.unit_labels()),
        language.remaining()
    );
    Ok(())
}

// ─── Month ───────────────────────────────────────────────────────────────────

pub fn handle_month(
    conn: &Connection,
    config: &AppConfig,
    month: Option<u32>,
    year: Option<i32>,
) -> Result<()> {
    let today = local_now(config)?.date();
    let month = month.unwrap_or(today.month());
    let year = year.unwrap_or(today.year());
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| anyhow!("Invalid month {}-{}", year, month))?;

    let source = open_source(conn, config)?;
    let schedule = source
        .month(year, month)
        .map_err(|e| anyhow!("No data for {}: {}", first.format("%B %Y"), e))?;

    let language = config.display.language;
    println!();
    println_colored!(GOLD, "  {} · {}", config.location.name, first.format("%B %Y"));
    println!();

    let mut header = String::from("  Day       ");
    for name in PrayerName::ALL {
        header.push_str(&format!("{:<10}", language.prayer_name(name)));
    }
    println_colored!(DIM, "{}", header);

    for date in first.iter_days().take_while(|d| d.month() == month) {
        let mut row = format!("  {:<10}", date.format("%a %d"));
        match schedule.day(date.day()) {
            Some(day) => {
                for event in day.events() {
                    row.push_str(&format!("{:<10}", format_time(event.time, config.display.clock)));
                }
            }
            None => {
                for _ in PrayerName::ALL {
                    row.push_str(&format!("{:<10}", "--:--"));
                }
            }
        }
        if date == today {
            println_colored!(GREEN, "{}", row);
        } else {
            println!("{}", row);
        }
    }
    println!();
    Ok(())
}

// ─── Import ──────────────────────────────────────────────────────────────────

pub fn handle_import(
    conn: &Connection,
    config: &AppConfig,
    file: &Path,
    format: ImportFormat,
) -> Result<()> {
    let json = std::fs::read_to_string(file).with_context(|| format!("Reading {:?}", file))?;
    let today = local_now(config)?.date();
    let zone = config.zone()?.to_string();

    let (days, origin, timezones): (Vec<PrayerSchedule>, Origin, Vec<Option<String>>) = match format {
        ImportFormat::Aladhan => {
            let parsed = aladhan::parse_payload(&json).map_err(|e| anyhow!("No data: {}", e))?;
            let timezones = parsed.iter().map(|d| d.timezone.clone()).collect();
            let days = parsed.into_iter().map(|d| d.schedule).collect();
            (days, Origin::Aladhan, timezones)
        }
        ImportFormat::Service => {
            let parsed = service::parse_payload(&json, today).map_err(|e| anyhow!("No data: {}", e))?;
            (vec![parsed.schedule], Origin::Service, vec![parsed.timezone])
        }
    };

    for tz in timezones.iter().flatten() {
        if *tz != zone {
            warn!("payload times are in {}, configured location uses {}", tz, zone);
            println_colored!(
                AMBER,
                "  ! Payload timezone {} differs from {}; times are stored as given",
                tz,
                zone
            );
            break;
        }
    }

    let key = config.calculator()?.source_key()?;
    let count = import_into_cache(conn, &key, &days, origin).map_err(|e| anyhow!("{}", e))?;
    info!("imported {} day(s) as {} under {}", count, origin.as_str(), key);

    let range = match (days.first(), days.last()) {
        (Some(first), Some(last)) if first.date() != last.date() => {
            format!("{} to {}", first.date(), last.date())
        }
        (Some(first), _) => first.date().to_string(),
        _ => String::new(),
    };
    println_colored!(GREEN, "  ✓ Cached {} day(s) {}", count, range);
    Ok(())
}

// ─── Location ────────────────────────────────────────────────────────────────

pub fn handle_location(
    conn: &Connection,
    config: &mut AppConfig,
    preset: Option<&str>,
    list: bool,
) -> Result<()> {
    if list || preset.is_none() {
        println!();
        println_colored!(
            GOLD,
            "  Current: {} ({:.4}, {:.4}, {})",
            config.location.name,
            config.location.latitude,
            config.location.longitude,
            config.zone()?
        );
        println!();
        for p in POPULAR_LOCATIONS {
            println!("  {:<24} {}, {}", p.value, p.name, p.country);
        }
        println!();
        return Ok(());
    }

    let query = preset.unwrap_or_default();
    let preset = find_preset(query)
        .ok_or_else(|| anyhow!("Unknown location '{}'. Run `waqt location --list`", query))?;

    config.location = Location::from(preset);
    config.validate()?;
    config.save()?;

    let source = open_source(conn, config)?;
    if let Err(e) = source.ensure_cached(local_now(config)?.date(), 7) {
        warn!("could not pre-cache times for {}: {}", preset.name, e);
    }

    println_colored!(
        GREEN,
        "  ✓ Location set to {}, {} ({})",
        preset.name,
        preset.country,
        preset.timezone
    );
    Ok(())
}

// ─── Settings ────────────────────────────────────────────────────────────────

pub fn handle_set(conn: &Connection, config: &mut AppConfig, key: &str, value: &str) -> Result<()> {
    let (name, canonical) = apply_setting(conn, config, key, value)?;
    config.save()?;

    let shown = match name {
        "method" => parse_method(&canonical)
            .map(|m| format!("{} ({})", canonical, method_name(m)))
            .unwrap_or(canonical),
        "language" => canonical
            .parse::<Language>()
            .map(|l| l.native_name().to_string())
            .unwrap_or(canonical),
        _ => canonical,
    };
    println_colored!(GREEN, "  ✓ {} = {}", name, shown);
    Ok(())
}

/// Update `config` and mirror the value under the setting's canonical name.
fn apply_setting(
    conn: &Connection,
    config: &mut AppConfig,
    key: &str,
    value: &str,
) -> Result<(&'static str, String)> {
    let canonical = config.set(key, value)?;
    config.validate()?;
    let name = AppConfig::setting_name(key).unwrap_or("unknown");
    MetaRepo::set_preference(conn, name, &canonical)?;
    Ok((name, canonical))
}
