use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::config::ClockFormat;
use crate::i18n::Language;
use crate::models::schedule::days_in_month;
use crate::models::{MonthSchedule, PrayerName};
use crate::tui::theme::Palette;
use crate::utils::format::format_time;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const CELL_WIDTH: usize = 11;

/// Weeks of the month, Sunday first. `None` pads days outside the month.
pub fn grid_weeks(year: i32, month: u32) -> Vec<[Option<u32>; 7]> {
    let (Some(first), Some(days)) = (NaiveDate::from_ymd_opt(year, month, 1), days_in_month(year, month)) else {
        return Vec::new();
    };
    let lead = first.weekday().num_days_from_sunday() as usize;

    let mut weeks = Vec::new();
    let mut week = [None; 7];
    let mut slot = lead;
    for day in 1..=days {
        week[slot] = Some(day);
        slot += 1;
        if slot == 7 {
            weeks.push(week);
            week = [None; 7];
            slot = 0;
        }
    }
    if slot > 0 {
        weeks.push(week);
    }
    weeks
}

#[allow(clippy::too_many_arguments)]
pub fn render(
    frame: &mut Frame,
    area: Rect,
    palette: &Palette,
    shown: (i32, u32),
    schedule: Option<&MonthSchedule>,
    today: NaiveDate,
    cursor: NaiveDate,
    language: Language,
    clock: ClockFormat,
) {
    let (year, month) = shown;
    let title = NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format(" %B %Y ").to_string())
        .unwrap_or_default();

    let block = Block::default()
        .title(Span::styled(title, palette.gold().add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(palette.border())
        .style(palette.surface());

    let mut lines = vec![Line::from(
        WEEKDAYS
            .iter()
            .map(|d| Span::styled(format!("{:<width$}", d, width = CELL_WIDTH), palette.gold()))
            .collect::<Vec<_>>(),
    )];

    let fajr_label: String = language.prayer_name(PrayerName::Fajr).chars().take(1).collect();
    let isha_label: String = language.prayer_name(PrayerName::Isha).chars().take(1).collect();

    for week in grid_weeks(year, month) {
        let mut numbers = Vec::with_capacity(7);
        let mut fajr = Vec::with_capacity(7);
        let mut isha = Vec::with_capacity(7);

        for slot in week {
            let Some(day) = slot else {
                for row in [&mut numbers, &mut fajr, &mut isha] {
                    row.push(Span::raw(" ".repeat(CELL_WIDTH)));
                }
                continue;
            };
            let date = NaiveDate::from_ymd_opt(year, month, day);
            let mut style = palette.bold();
            if date == Some(today) {
                style = palette.green().add_modifier(Modifier::BOLD);
            }
            if date == Some(cursor) {
                style = Style::default().fg(palette.bg).bg(palette.gold);
            }
            numbers.push(Span::styled(format!("{:<width$}", day, width = CELL_WIDTH), style));

            let day_schedule = schedule.and_then(|m| m.day(day));
            let time_of = |name: PrayerName| {
                day_schedule
                    .and_then(|s| s.get(name))
                    .map(|e| format_time(e.time, clock))
                    .unwrap_or_else(|| "--:--".to_string())
            };
            fajr.push(Span::styled(
                format!("{:<width$}", format!("{} {}", fajr_label, time_of(PrayerName::Fajr)), width = CELL_WIDTH),
                palette.dim(),
            ));
            isha.push(Span::styled(
                format!("{:<width$}", format!("{} {}", isha_label, time_of(PrayerName::Isha)), width = CELL_WIDTH),
                palette.dim(),
            ));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(numbers));
        lines.push(Line::from(fajr));
        lines.push(Line::from(isha));
    }

    if schedule.is_none() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("  No data for this month", palette.red())));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn june_2024_starts_on_saturday() {
        let weeks = grid_weeks(2024, 6);
        assert_eq!(weeks.len(), 6);
        assert_eq!(weeks[0][6], Some(1));
        assert!(weeks[0][..6].iter().all(Option::is_none));
        assert_eq!(weeks[5][0], Some(30));
    }

    #[test]
    fn february_2015_fills_exactly_four_weeks() {
        let weeks = grid_weeks(2015, 2);
        assert_eq!(weeks.len(), 4);
        assert_eq!(weeks[0][0], Some(1));
        assert_eq!(weeks[3][6], Some(28));
    }

    #[test]
    fn invalid_month_is_empty() {
        assert!(grid_weeks(2024, 13).is_empty());
    }
}
