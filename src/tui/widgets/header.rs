use chrono::NaiveDate;
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::theme::Palette;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    palette: &Palette,
    location: &str,
    date: NaiveDate,
    hijri_str: &str,
) {
    let gregorian_str = date.format("%A, %b %d, %Y").to_string();

    let title_line = Line::from(vec![
        Span::styled("  وقت  ", palette.gold().add_modifier(Modifier::BOLD)),
        Span::styled("waqt", palette.gold()),
        Span::styled("  ·  ", palette.dim()),
        Span::styled(location, palette.bold()),
    ]);

    let mut date_spans = Vec::new();
    if !hijri_str.is_empty() {
        date_spans.push(Span::styled(hijri_str, palette.amber()));
        date_spans.push(Span::styled("  ·  ", palette.dim()));
    }
    date_spans.push(Span::styled(gregorian_str, palette.dim()));

    let text = vec![title_line, Line::from(""), Line::from(date_spans)];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(palette.gold().add_modifier(Modifier::BOLD))
        .style(palette.base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
