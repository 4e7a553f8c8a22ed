pub mod location;
pub mod prayer;
pub mod schedule;

pub use location::{Location, LocationPreset, LocationZone, POPULAR_LOCATIONS};
pub use prayer::{MinuteOfDay, PrayerEvent, PrayerName, TimeParseError, parse_clock_time};
pub use schedule::{MonthSchedule, PrayerSchedule, ScheduleError};
