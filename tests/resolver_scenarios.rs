// Scenario tables for the resolver and countdown formatting

mod fixtures;

use fixtures::{at, june, reference_events, reference_schedule};
use pretty_assertions::assert_eq;
use test_case::test_case;
use waqt::i18n::Language;
use waqt::models::{MinuteOfDay, PrayerEvent, PrayerName, ScheduleError};
use waqt::prayer_times::countdown::{format_clock_countdown, seconds_in_minute};
use waqt::prayer_times::{format_remaining, remaining_minutes, resolve_current_and_upcoming};

use PrayerName::*;

#[test_case(13, 0, Some(Dhuhr), Asr, 231, "3h 51m" ; "afternoon between dhuhr and asr")]
#[test_case(3, 0, None, Fajr, 115, "1h 55m" ; "before first event of the day")]
#[test_case(23, 0, Some(Isha), Fajr, 355, "5h 55m" ; "after last event wraps to tomorrow")]
#[test_case(12, 20, Some(Dhuhr), Asr, 271, "4h 31m" ; "exactly at dhuhr")]
#[test_case(19, 45, Some(Isha), Fajr, 550, "9h 10m" ; "exactly at isha")]
#[test_case(0, 0, None, Fajr, 295, "4h 55m" ; "midnight")]
#[test_case(4, 54, None, Fajr, 1, "1m" ; "one minute before fajr")]
fn resolves_reference_day(
    hour: u32,
    minute: u32,
    current: Option<PrayerName>,
    upcoming: PrayerName,
    remaining: u16,
    text: &str,
) {
    let events = reference_events();
    let now = at(hour, minute);
    let resolution = resolve_current_and_upcoming(&events, now).unwrap();

    assert_eq!(resolution.current().map(|e| e.name), current);
    assert_eq!(resolution.upcoming().name, upcoming);
    assert_eq!(resolution.remaining_minutes(now), remaining);
    assert_eq!(format_remaining(remaining, &Language::En.unit_labels()), text);
}

#[test]
fn event_at_now_is_current_not_upcoming() {
    let schedule = reference_schedule(june(1));
    let statuses = schedule.resolve(at(12, 20)).unwrap().statuses();

    let flags: Vec<(PrayerName, bool, bool)> = statuses
        .iter()
        .map(|s| (s.event.name, s.is_current, s.is_upcoming))
        .collect();
    assert_eq!(
        flags,
        vec![
            (Fajr, false, false),
            (Sunrise, false, false),
            (Dhuhr, true, false),
            (Asr, false, true),
            (Maghrib, false, false),
            (Isha, false, false),
        ]
    );
}

#[test_case(780, 1011, 231 ; "later today")]
#[test_case(1380, 295, 355 ; "tomorrow")]
#[test_case(600, 600, 0 ; "equal means now")]
#[test_case(0, 1439, 1439 ; "largest gap")]
#[test_case(1439, 0, 1 ; "across midnight")]
fn remaining_wraps_past_midnight(now: u16, upcoming: u16, expected: u16) {
    let now = MinuteOfDay::new(now).unwrap();
    let upcoming = MinuteOfDay::new(upcoming).unwrap();
    assert_eq!(remaining_minutes(now, upcoming), expected);
}

#[test_case(Language::En, "3h 51m" ; "english")]
#[test_case(Language::Ru, "3ч 51м" ; "russian")]
#[test_case(Language::Ar, "3س 51د" ; "arabic")]
#[test_case(Language::Tr, "3s 51d" ; "turkish")]
fn localized_units_fill_the_slots(language: Language, expected: &str) {
    assert_eq!(format_remaining(231, &language.unit_labels()), expected);
}

#[test]
fn seconds_variant_assumes_minute_boundary() {
    assert_eq!(seconds_in_minute(0), 59);
    assert_eq!(seconds_in_minute(15), 44);
    assert_eq!(seconds_in_minute(59), 0);
    assert_eq!(format_clock_countdown(231, 44), "03:51:44");
}

#[test]
fn identical_times_keep_the_earlier_event_current() {
    let events = vec![
        PrayerEvent::new(Maghrib, at(18, 42)),
        PrayerEvent::new(Isha, at(18, 42)),
    ];
    let resolution = resolve_current_and_upcoming(&events, at(18, 50)).unwrap();
    assert_eq!(resolution.current().map(|e| e.name), Some(Maghrib));
    assert_eq!(resolution.upcoming().name, Maghrib);
    assert!(resolution.wraps_to_tomorrow());
}

#[test]
fn malformed_lists_are_invalid_schedules() {
    let empty = resolve_current_and_upcoming(&[], at(12, 0));
    assert_eq!(empty, Err(ScheduleError::Empty));

    let mut swapped = reference_events();
    swapped.swap(2, 3);
    let err = resolve_current_and_upcoming(&swapped, at(12, 0)).unwrap_err();
    assert!(err.is_invalid_schedule());
    assert!(err.to_string().starts_with("invalid schedule"));
}
