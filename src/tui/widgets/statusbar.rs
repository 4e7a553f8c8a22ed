use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::app::View;
use crate::tui::theme::Palette;

pub fn render(frame: &mut Frame, area: Rect, palette: &Palette, view: &View, message: Option<&str>) {
    if let Some(message) = message {
        let paragraph = Paragraph::new(Line::from(Span::styled(message, palette.amber())))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let hints: &[(&str, &str)] = match view {
        View::Month => &[
            ("[←↑↓→]", " day  "),
            ("[ / ]", " month  "),
            ("[Enter]", " details  "),
            ("[m]", " day view  "),
            ("[Esc]", " quit"),
        ],
        _ => &[
            ("[m]", " month  "),
            ("[t]", " theme  "),
            ("[l]", " language  "),
            ("[s]", " seconds  "),
            ("[?]", " help  "),
            ("[Esc]", " quit"),
        ],
    };

    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(*key, palette.gold()));
        spans.push(Span::styled(*label, palette.dim()));
    }

    let paragraph = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
