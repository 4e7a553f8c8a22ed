use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use salah::prelude::{
    Configuration, Coordinates, Madhab, Method, Prayer, PrayerSchedule as SalahSchedule,
};

use crate::models::{Location, LocationZone, MinuteOfDay, PrayerSchedule};
use crate::prayer_times::source::{FetchError, ScheduleSource};

thread_local! {
    static CALCULATING: Cell<bool> = const { Cell::new(false) };
}

/// Route panics raised inside salah to the debug log instead of the
/// installed hook. Call after anything else that installs a hook
/// (`ratatui::init` restores the terminal from its hook).
pub fn silence_calculation_panics() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if CALCULATING.with(Cell::get) {
            debug!("salah gave up: {}", info);
        } else {
            previous(info);
        }
    }));
}

/// Offline source: astronomical calculation for one location.
pub struct PrayerCalculator {
    pub lat: f64,
    pub lng: f64,
    pub method_str: String,
    pub madhab_str: String,
    pub zone: LocationZone,
}

impl PrayerCalculator {
    pub fn new(lat: f64, lng: f64, method: &str, madhab: &str, zone: LocationZone) -> Result<Self> {
        // Validate method + madhab early
        parse_method(method)?;
        parse_madhab(madhab)?;
        Ok(Self {
            lat,
            lng,
            method_str: method.to_string(),
            madhab_str: madhab.to_string(),
            zone,
        })
    }

    pub fn for_location(location: &Location, method: &str, madhab: &str) -> Result<Self> {
        Self::new(location.latitude, location.longitude, method, madhab, location.zone()?)
    }

    /// Cache key: one entry per place, method and madhab.
    pub fn source_key(&self) -> Result<String> {
        Ok(format!(
            "{:.4},{:.4}|{}|{}|{}",
            self.lat,
            self.lng,
            method_name(parse_method(&self.method_str)?),
            self.madhab_str.to_lowercase(),
            self.zone
        ))
    }

    fn compute_times(&self, date: NaiveDate) -> Result<PrayerSchedule, FetchError> {
        let coords = Coordinates::new(self.lat, self.lng);
        let method = parse_method(&self.method_str).map_err(|e| FetchError::Calculation(e.to_string()))?;
        let madhab = parse_madhab(&self.madhab_str).map_err(|e| FetchError::Calculation(e.to_string()))?;
        let params = Configuration::with(method, madhab);

        // salah unwraps internally when the sun never reaches the twilight
        // angle (high latitudes in summer).
        CALCULATING.with(|c| c.set(true));
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            SalahSchedule::new()
                .on(date)
                .for_location(coords)
                .with_configuration(params)
                .calculate()
        }));
        CALCULATING.with(|c| c.set(false));

        let times = match outcome {
            Ok(Ok(times)) => times,
            Ok(Err(e)) => return Err(FetchError::Calculation(e.to_string())),
            Err(_) => {
                return Err(FetchError::Calculation(format!(
                    "no twilight at {:.4},{:.4} on {}",
                    self.lat, self.lng, date
                )))
            }
        };

        let to_local = |utc: DateTime<Utc>| MinuteOfDay::from_time(self.zone.local(utc).time());

        debug!("calculated {} for {:.4},{:.4}", date, self.lat, self.lng);
        let schedule = PrayerSchedule::from_times(
            date,
            [
                to_local(times.time(Prayer::Fajr)),
                to_local(times.time(Prayer::Sunrise)),
                to_local(times.time(Prayer::Dhuhr)),
                to_local(times.time(Prayer::Asr)),
                to_local(times.time(Prayer::Maghrib)),
                to_local(times.time(Prayer::Isha)),
            ],
        )?;
        Ok(schedule)
    }
}

impl ScheduleSource for PrayerCalculator {
    fn day(&self, date: NaiveDate) -> Result<PrayerSchedule, FetchError> {
        self.compute_times(date)
    }
}

/// Accepts a method name or the public API's numeric code.
pub fn parse_method(s: &str) -> Result<Method> {
    let s = s.trim();
    if let Ok(code) = s.parse::<u8>() {
        return CALC_METHODS
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| parse_method(name))
            .unwrap_or_else(|| Err(anyhow!("Unsupported calculation method code: {}", code)));
    }
    match s {
        "MuslimWorldLeague" => Ok(Method::MuslimWorldLeague),
        "Egyptian" => Ok(Method::Egyptian),
        "Karachi" => Ok(Method::Karachi),
        "UmmAlQura" => Ok(Method::UmmAlQura),
        "Dubai" => Ok(Method::Dubai),
        "MoonsightingCommittee" => Ok(Method::MoonsightingCommittee),
        "NorthAmerica" => Ok(Method::NorthAmerica),
        "Kuwait" => Ok(Method::Kuwait),
        "Qatar" => Ok(Method::Qatar),
        "Singapore" => Ok(Method::Singapore),
        "Tehran" => Ok(Method::Tehran),
        "Turkey" => Ok(Method::Turkey),
        "Other" => Ok(Method::Other),
        _ => Err(anyhow!("Unknown calculation method: '{}'", s)),
    }
}

pub fn method_name(method: Method) -> &'static str {
    match method {
        Method::MuslimWorldLeague => "MuslimWorldLeague",
        Method::Egyptian => "Egyptian",
        Method::Karachi => "Karachi",
        Method::UmmAlQura => "UmmAlQura",
        Method::Dubai => "Dubai",
        Method::MoonsightingCommittee => "MoonsightingCommittee",
        Method::NorthAmerica => "NorthAmerica",
        Method::Kuwait => "Kuwait",
        Method::Qatar => "Qatar",
        Method::Singapore => "Singapore",
        Method::Tehran => "Tehran",
        Method::Turkey => "Turkey",
        _ => "Other",
    }
}

pub fn parse_madhab(s: &str) -> Result<Madhab> {
    match s.trim() {
        "Hanafi" | "hanafi" => Ok(Madhab::Hanafi),
        "Shafi" | "Shafi'i" | "shafi" => Ok(Madhab::Shafi),
        _ => Err(anyhow!("Unknown madhab: '{}'", s)),
    }
}

/// Public API method codes and the calculation each maps to.
pub const CALC_METHODS: &[(u8, &str)] = &[
    (1, "Karachi"),
    (2, "NorthAmerica"),
    (3, "MuslimWorldLeague"),
    (4, "UmmAlQura"),
    (5, "Egyptian"),
    (7, "Tehran"),
    (8, "Dubai"),
    (9, "Kuwait"),
    (10, "Qatar"),
    (11, "Singapore"),
    (13, "Turkey"),
    (15, "MoonsightingCommittee"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PrayerName, ScheduleError};

    fn june_21() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 21).unwrap()
    }

    fn at(lat: f64, lng: f64, tz: &str, method: &str) -> PrayerCalculator {
        PrayerCalculator::new(lat, lng, method, "Shafi", LocationZone::parse(tz).unwrap()).unwrap()
    }

    #[test]
    fn method_codes_and_names() {
        assert!(matches!(parse_method("2").unwrap(), Method::NorthAmerica));
        assert!(matches!(parse_method("MuslimWorldLeague").unwrap(), Method::MuslimWorldLeague));
        assert!(parse_method("6").is_err());
        assert!(parse_method("Martian").is_err());
        assert!(parse_madhab("Hanafi").is_ok());
        assert!(parse_madhab("Maliki").is_err());
    }

    #[test]
    fn mecca_schedule_is_ascending() {
        let zone = LocationZone::parse("Asia/Riyadh").unwrap();
        let calc = PrayerCalculator::new(21.4225, 39.8262, "4", "Shafi", zone).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let schedule = calc.day(date).unwrap();

        assert_eq!(schedule.date(), date);
        let fajr = schedule.get(PrayerName::Fajr).unwrap().time;
        let isha = schedule.get(PrayerName::Isha).unwrap().time;
        assert!(fajr.hour() >= 3 && fajr.hour() <= 5, "fajr at {}", fajr);
        assert!(isha.hour() >= 19 && isha.hour() <= 21, "isha at {}", isha);
    }

    #[test]
    fn source_key_normalizes_method_codes() {
        let zone = LocationZone::parse("Asia/Riyadh").unwrap();
        let by_code = PrayerCalculator::new(21.4225, 39.8262, "3", "Shafi", zone).unwrap();
        let by_name =
            PrayerCalculator::new(21.4225, 39.8262, "MuslimWorldLeague", "Shafi", zone).unwrap();
        assert_eq!(by_code.source_key().unwrap(), by_name.source_key().unwrap());
    }

    #[test]
    fn midsummer_without_twilight_is_an_error() {
        for method in ["2", "3", "4", "15"] {
            let kazan = at(55.7887, 49.1221, "Europe/Moscow", method);
            let result = kazan.day(june_21());
            assert!(
                matches!(result, Err(FetchError::Calculation(_))),
                "method {}: {:?}",
                method,
                result
            );
        }
        let moscow = at(55.7558, 37.6173, "Europe/Moscow", "3");
        assert!(moscow.day(june_21()).is_err());
    }

    #[test]
    fn isha_after_midnight_is_out_of_order() {
        let london = at(51.5074, -0.1278, "Europe/London", "2");
        let err = london.day(june_21()).unwrap_err();
        assert!(
            matches!(err, FetchError::Schedule(ScheduleError::OutOfOrder { .. })),
            "{:?}",
            err
        );
    }

    #[test]
    fn high_latitude_spring_still_computes() {
        let kazan = at(55.7887, 49.1221, "Europe/Moscow", "3");
        let march = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        assert_eq!(kazan.day(march).unwrap().events().len(), 6);
    }
}
