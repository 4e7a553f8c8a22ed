use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The six daily markers, in the order they occur.
///
/// Sunrise is not a prayer but takes part in the same ordering so the
/// countdown can point at it between Fajr and Dhuhr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrayerName {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    pub const ALL: [PrayerName; 6] = [
        PrayerName::Fajr,
        PrayerName::Sunrise,
        PrayerName::Dhuhr,
        PrayerName::Asr,
        PrayerName::Maghrib,
        PrayerName::Isha,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "fajr",
            PrayerName::Sunrise => "sunrise",
            PrayerName::Dhuhr => "dhuhr",
            PrayerName::Asr => "asr",
            PrayerName::Maghrib => "maghrib",
            PrayerName::Isha => "isha",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "Fajr",
            PrayerName::Sunrise => "Sunrise",
            PrayerName::Dhuhr => "Dhuhr",
            PrayerName::Asr => "Asr",
            PrayerName::Maghrib => "Maghrib",
            PrayerName::Isha => "Isha",
        }
    }

    /// Key used by the public prayer-times API in its `timings` object.
    pub fn api_key(&self) -> &'static str {
        self.display_name()
    }

    pub fn is_prayer(&self) -> bool {
        !matches!(self, PrayerName::Sunrise)
    }
}

impl fmt::Display for PrayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PrayerName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fajr" => Ok(PrayerName::Fajr),
            "sunrise" | "shuruq" => Ok(PrayerName::Sunrise),
            "dhuhr" | "zuhr" | "dhuhur" => Ok(PrayerName::Dhuhr),
            "asr" => Ok(PrayerName::Asr),
            "maghrib" => Ok(PrayerName::Maghrib),
            "isha" => Ok(PrayerName::Isha),
            _ => Err(anyhow::anyhow!("Unknown prayer name: {}", s)),
        }
    }
}

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Minutes elapsed since local midnight, always in `0..1440`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    pub const MIDNIGHT: MinuteOfDay = MinuteOfDay(0);

    pub fn new(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self((hour * 60 + minute) as u16))
    }

    /// Drops seconds: 12:20:59 is minute 740.
    pub fn from_time(time: NaiveTime) -> Self {
        Self((time.hour() * 60 + time.minute()) as u16)
    }

    pub fn get(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl TryFrom<u16> for MinuteOfDay {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        MinuteOfDay::new(value).ok_or_else(|| format!("minute of day out of range: {}", value))
    }
}

impl From<MinuteOfDay> for u16 {
    fn from(value: MinuteOfDay) -> Self {
        value.0
    }
}

impl fmt::Display for MinuteOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("empty time string")]
    Empty,
    #[error("malformed time '{0}', expected HH:MM")]
    Malformed(String),
    #[error("time '{0}' is outside 00:00-23:59")]
    OutOfRange(String),
}

/// Parse a zero-padded 24-hour `HH:MM` clock time.
///
/// Upstream values may carry seconds (`04:55:00`) or a zone annotation
/// (`04:55 (+03)`); both are discarded.
pub fn parse_clock_time(raw: &str) -> Result<MinuteOfDay, TimeParseError> {
    let trimmed = raw.trim();
    let clock = trimmed.split_whitespace().next().ok_or(TimeParseError::Empty)?;

    let mut parts = clock.split(':');
    let (hour, minute) = match (parts.next(), parts.next()) {
        (Some(h), Some(m)) => (h, m),
        _ => return Err(TimeParseError::Malformed(trimmed.to_string())),
    };
    let seconds = parts.next();
    let two_digits = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
    if seconds.is_some_and(|s| !two_digits(s)) {
        return Err(TimeParseError::Malformed(trimmed.to_string()));
    }
    if parts.next().is_some() || !two_digits(hour) || !two_digits(minute) {
        return Err(TimeParseError::Malformed(trimmed.to_string()));
    }

    let hour: u32 = hour
        .parse()
        .map_err(|_| TimeParseError::Malformed(trimmed.to_string()))?;
    let minute: u32 = minute
        .parse()
        .map_err(|_| TimeParseError::Malformed(trimmed.to_string()))?;

    MinuteOfDay::from_hm(hour, minute).ok_or_else(|| TimeParseError::OutOfRange(trimmed.to_string()))
}

/// One named marker at a fixed local clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerEvent {
    pub name: PrayerName,
    pub time: MinuteOfDay,
}

impl PrayerEvent {
    pub fn new(name: PrayerName, time: MinuteOfDay) -> Self {
        Self { name, time }
    }

    pub fn parse(name: PrayerName, raw: &str) -> Result<Self, TimeParseError> {
        Ok(Self::new(name, parse_clock_time(raw)?))
    }

    pub fn minutes_since_midnight(&self) -> u16 {
        self.time.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_clock_time() {
        assert_eq!(parse_clock_time("04:55").unwrap().get(), 295);
        assert_eq!(parse_clock_time("00:00").unwrap().get(), 0);
        assert_eq!(parse_clock_time("23:59").unwrap().get(), 1439);
    }

    #[test]
    fn discards_seconds_and_zone_annotation() {
        assert_eq!(parse_clock_time("12:20:45").unwrap().get(), 740);
        assert_eq!(parse_clock_time("16:51 (+03)").unwrap().get(), 1011);
        assert_eq!(parse_clock_time(" 19:45 (EEST) ").unwrap().get(), 1185);
    }

    #[test]
    fn rejects_malformed_times() {
        assert_eq!(parse_clock_time(""), Err(TimeParseError::Empty));
        assert!(matches!(parse_clock_time("4:55"), Err(TimeParseError::Malformed(_))));
        assert!(matches!(parse_clock_time("ab:cd"), Err(TimeParseError::Malformed(_))));
        assert!(matches!(parse_clock_time("0455"), Err(TimeParseError::Malformed(_))));
        assert!(matches!(parse_clock_time("24:00"), Err(TimeParseError::OutOfRange(_))));
        assert!(matches!(parse_clock_time("12:60"), Err(TimeParseError::OutOfRange(_))));
    }

    #[test]
    fn minute_of_day_bounds() {
        assert!(MinuteOfDay::new(1439).is_some());
        assert!(MinuteOfDay::new(1440).is_none());
        assert_eq!(MinuteOfDay::new(775).unwrap().to_string(), "12:55");
    }

    #[test]
    fn prayer_name_aliases() {
        assert_eq!("Zuhr".parse::<PrayerName>().unwrap(), PrayerName::Dhuhr);
        assert_eq!("SUNRISE".parse::<PrayerName>().unwrap(), PrayerName::Sunrise);
        assert!("midnight".parse::<PrayerName>().is_err());
        assert!(!PrayerName::Sunrise.is_prayer());
    }
}
