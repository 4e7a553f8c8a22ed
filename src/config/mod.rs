pub mod settings;

pub use settings::{AppConfig, ClockFormat, Theme};
