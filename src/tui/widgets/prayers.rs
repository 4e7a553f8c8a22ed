use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::config::ClockFormat;
use crate::i18n::Language;
use crate::prayer_times::EventStatus;
use crate::tui::theme::Palette;
use crate::utils::format::format_time;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    palette: &Palette,
    statuses: &[EventStatus],
    language: Language,
    clock: ClockFormat,
) {
    let block = Block::default()
        .title(Span::styled(" Prayers ", palette.gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(palette.border())
        .style(palette.surface());

    let items: Vec<ListItem> = statuses
        .iter()
        .map(|s| {
            let (icon, icon_style) = if s.is_current {
                ("●", palette.green())
            } else if s.is_upcoming {
                ("▸", palette.amber())
            } else {
                ("○", palette.dim())
            };

            let label = match (s.is_current, s.is_upcoming) {
                (true, _) => "now",
                (_, true) => "next",
                _ => "",
            };

            let name_style = if s.is_current {
                palette.gold().add_modifier(Modifier::BOLD)
            } else if s.event.name.is_prayer() {
                palette.bold()
            } else {
                palette.dim()
            };

            let line = Line::from(vec![
                Span::styled(format!("  {} ", icon), icon_style),
                Span::styled(
                    format!("{:<10}", language.prayer_name(s.event.name)),
                    name_style,
                ),
                Span::styled(format!("{:<9}", format_time(s.event.time, clock)), palette.dim()),
                Span::styled(label, icon_style),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
