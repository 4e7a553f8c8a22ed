pub mod aladhan;
pub mod calculator;
pub mod countdown;
pub mod resolver;
pub mod service;
pub mod source;

pub use calculator::PrayerCalculator;
pub use countdown::{Countdown, Granularity, format_remaining, remaining_minutes};
pub use resolver::{EventStatus, Resolution, resolve_current_and_upcoming};
pub use source::{CachedSource, FetchError, ScheduleSource, StaticSource};
