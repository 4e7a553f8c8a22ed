use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::i18n::UnitLabels;
use crate::models::prayer::MINUTES_PER_DAY;
use crate::models::{MinuteOfDay, PrayerEvent};
use crate::prayer_times::resolver::Resolution;

/// Minutes from `now` until `upcoming`, wrapping past midnight.
///
/// Always in `0..1440`; equal times give 0 ("now").
pub fn remaining_minutes(now: MinuteOfDay, upcoming: MinuteOfDay) -> u16 {
    let diff = i32::from(upcoming.get()) - i32::from(now.get());
    if diff < 0 {
        (diff + i32::from(MINUTES_PER_DAY)) as u16
    } else {
        diff as u16
    }
}

/// `"{h}{hourUnit} {m}{minuteUnit}"`, or just the minutes under an hour.
pub fn format_remaining(total_minutes: u16, labels: &UnitLabels) -> String {
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{}{} {}{}", hours, labels.hour, minutes, labels.minute)
    } else {
        format!("{}{}", minutes, labels.minute)
    }
}

/// Seconds left in the current minute.
///
/// Source times carry no seconds, so the target is assumed to sit exactly on
/// a minute boundary. A leap second reads as 0.
pub fn seconds_in_minute(second_of_minute: u32) -> u8 {
    (59 - second_of_minute.min(59)) as u8
}

pub fn format_remaining_with_seconds(total_minutes: u16, seconds: u8, labels: &UnitLabels) -> String {
    format!(
        "{} {}{}",
        format_remaining(total_minutes, labels),
        seconds,
        labels.second
    )
}

/// Zero-padded `HH:MM:SS` for the big countdown display.
pub fn format_clock_countdown(total_minutes: u16, seconds: u8) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        total_minutes / 60,
        total_minutes % 60,
        seconds
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Minutes,
    #[default]
    Seconds,
}

impl Granularity {
    pub fn tick_interval(&self) -> Duration {
        match self {
            Granularity::Minutes => Duration::from_secs(60),
            Granularity::Seconds => Duration::from_secs(1),
        }
    }

    pub fn toggled(self) -> Granularity {
        match self {
            Granularity::Minutes => Granularity::Seconds,
            Granularity::Seconds => Granularity::Minutes,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Minutes => "minutes",
            Granularity::Seconds => "seconds",
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minutes" | "minute" | "m" => Ok(Granularity::Minutes),
            "seconds" | "second" | "s" => Ok(Granularity::Seconds),
            _ => Err(anyhow::anyhow!("Unknown countdown granularity: {}", s)),
        }
    }
}

/// Remaining time to the upcoming event at one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub upcoming: PrayerEvent,
    pub minutes: u16,
    pub seconds: Option<u8>,
}

impl Countdown {
    /// `local` is the wall-clock time at the schedule's location.
    pub fn at(resolution: &Resolution<'_>, local: NaiveTime, granularity: Granularity) -> Self {
        let now = MinuteOfDay::from_time(local);
        let seconds = match granularity {
            Granularity::Seconds => Some(seconds_in_minute(local.second())),
            Granularity::Minutes => None,
        };
        Self {
            upcoming: *resolution.upcoming(),
            minutes: resolution.remaining_minutes(now),
            seconds,
        }
    }

    pub fn label(&self, labels: &UnitLabels) -> String {
        match self.seconds {
            Some(s) => format_remaining_with_seconds(self.minutes, s, labels),
            None => format_remaining(self.minutes, labels),
        }
    }

    pub fn clock(&self) -> String {
        match self.seconds {
            Some(s) => format_clock_countdown(self.minutes, s),
            None => format!("{:02}:{:02}", self.minutes / 60, self.minutes % 60),
        }
    }
}
