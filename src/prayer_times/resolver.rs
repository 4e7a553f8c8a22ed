//! Current / upcoming prayer resolution.
//!
//! Stateless: every call recomputes from the event list and the reference
//! minute. Callers re-invoke on their own timer.

use serde::Serialize;

use crate::models::schedule::check_order;
use crate::models::{MinuteOfDay, PrayerEvent, PrayerSchedule};

pub use crate::models::ScheduleError;

/// Outcome of one resolution over a borrowed event list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
    events: &'a [PrayerEvent],
    current: Option<usize>,
    upcoming: usize,
    wraps: bool,
}

/// One event with the flags recomputed for a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventStatus {
    #[serde(flatten)]
    pub event: PrayerEvent,
    pub is_current: bool,
    pub is_upcoming: bool,
}

impl<'a> Resolution<'a> {
    /// Most recent event at or before the reference minute. `None` before the
    /// first event of the day.
    pub fn current(&self) -> Option<&'a PrayerEvent> {
        self.current.map(|i| &self.events[i])
    }

    pub fn upcoming(&self) -> &'a PrayerEvent {
        &self.events[self.upcoming]
    }

    /// True when every event has passed and `upcoming` is tomorrow's first.
    pub fn wraps_to_tomorrow(&self) -> bool {
        self.wraps
    }

    /// Minutes from `now` until the upcoming event, wrap included.
    pub fn remaining_minutes(&self, now: MinuteOfDay) -> u16 {
        super::countdown::remaining_minutes(now, self.upcoming().time)
    }

    pub fn statuses(&self) -> Vec<EventStatus> {
        self.events
            .iter()
            .enumerate()
            .map(|(i, event)| EventStatus {
                event: *event,
                is_current: self.current == Some(i),
                is_upcoming: self.upcoming == i,
            })
            .collect()
    }
}

/// Scan `events` (ascending by time) against `now`.
///
/// Ties between identical times are tolerated: the earlier entry stays
/// current and the later one is never reported on its own. Descending pairs
/// or an empty list are rejected.
pub fn resolve_current_and_upcoming(
    events: &[PrayerEvent],
    now: MinuteOfDay,
) -> Result<Resolution<'_>, ScheduleError> {
    check_order(events, false)?;

    let mut current: Option<usize> = None;
    let mut upcoming: Option<usize> = None;

    for (i, event) in events.iter().enumerate() {
        if event.time <= now {
            let newer = current.is_none_or(|c| events[c].time < event.time);
            if newer {
                current = Some(i);
            }
        } else if upcoming.is_none() {
            upcoming = Some(i);
        }
    }

    let (upcoming, wraps) = match upcoming {
        Some(i) => (i, false),
        None => (0, true),
    };

    Ok(Resolution {
        events,
        current,
        upcoming,
        wraps,
    })
}

impl PrayerSchedule {
    pub fn resolve(&self, now: MinuteOfDay) -> Result<Resolution<'_>, ScheduleError> {
        resolve_current_and_upcoming(self.events(), now)
    }
}
