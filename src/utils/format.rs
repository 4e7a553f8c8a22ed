use crate::config::ClockFormat;
use crate::models::MinuteOfDay;

/// Format a time of day as "HH:MM" or "h:MM AM".
pub fn format_time(t: MinuteOfDay, clock: ClockFormat) -> String {
    match clock {
        ClockFormat::H24 => t.to_string(),
        ClockFormat::H12 => {
            let (hour, suffix) = match t.hour() {
                0 => (12, "AM"),
                h @ 1..=11 => (h, "AM"),
                12 => (12, "PM"),
                h => (h - 12, "PM"),
            };
            format!("{}:{:02} {}", hour, t.minute(), suffix)
        }
    }
}

/// Create a simple ASCII progress bar
pub fn progress_bar(filled: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).min(1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> MinuteOfDay {
        MinuteOfDay::from_hm(h, m).unwrap()
    }

    #[test]
    fn twelve_hour_clock() {
        assert_eq!(format_time(t(0, 5), ClockFormat::H12), "12:05 AM");
        assert_eq!(format_time(t(12, 0), ClockFormat::H12), "12:00 PM");
        assert_eq!(format_time(t(19, 45), ClockFormat::H12), "7:45 PM");
        assert_eq!(format_time(t(19, 45), ClockFormat::H24), "19:45");
    }

    #[test]
    fn progress_bar_is_clamped() {
        assert_eq!(progress_bar(5, 10, 4), "██░░");
        assert_eq!(progress_bar(20, 10, 3), "███");
        assert_eq!(progress_bar(1, 0, 2), "░░");
    }
}
