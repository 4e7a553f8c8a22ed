//! Prayer times for one location, the current/upcoming prayer at any
//! instant, and a localized countdown to the next one.
//!
//! [`prayer_times::resolve_current_and_upcoming`] is the pure core; the rest
//! of the crate feeds it schedules (offline calculation, imported payloads,
//! the SQLite cache) and renders its answer.

pub mod cli;
pub mod config;
pub mod db;
pub mod i18n;
pub mod models;
pub mod prayer_times;
pub mod tui;
pub mod utils;
