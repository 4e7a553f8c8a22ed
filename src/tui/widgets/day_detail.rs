use chrono::NaiveDate;
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use crate::config::ClockFormat;
use crate::i18n::Language;
use crate::models::PrayerSchedule;
use crate::tui::theme::Palette;
use crate::utils::format::format_time;

/// Centered popup with one day's six times.
pub fn render(
    frame: &mut Frame,
    palette: &Palette,
    date: NaiveDate,
    schedule: Option<&PrayerSchedule>,
    hijri_str: &str,
    language: Language,
    clock: ClockFormat,
) {
    let area = frame.area();
    let popup_area = Rect {
        x: area.width / 4,
        y: area.height / 4,
        width: area.width / 2,
        height: 13.min(area.height.saturating_sub(area.height / 4)),
    };

    frame.render_widget(Clear, popup_area);

    let mut lines = vec![Line::from("")];
    if !hijri_str.is_empty() {
        lines.push(Line::from(Span::styled(format!("  {}", hijri_str), palette.amber())));
        lines.push(Line::from(""));
    }

    match schedule {
        None => lines.push(Line::from(Span::styled("  No data", palette.dim()))),
        Some(schedule) => {
            for event in schedule.events() {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("  {:<12}", language.prayer_name(event.name)),
                        palette.bold(),
                    ),
                    Span::styled(format_time(event.time, clock), palette.gold()),
                ]));
            }
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  [any key] close", palette.dim())));

    let block = Block::default()
        .title(Span::styled(
            date.format(" %A, %d %B %Y ").to_string(),
            palette.gold().add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(palette.gold())
        .style(palette.surface());

    frame.render_widget(Paragraph::new(lines).block(block), popup_area);
}
