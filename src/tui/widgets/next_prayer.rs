use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::i18n::Language;
use crate::prayer_times::Countdown;
use crate::tui::theme::Palette;
use crate::utils::format::progress_bar;

/// `elapsed` is how far into the current interval we are, as (done, total)
/// minutes.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    palette: &Palette,
    countdown: Option<&Countdown>,
    elapsed: Option<(u32, u32)>,
    language: Language,
) {
    let block = Block::default()
        .title(Span::styled(format!(" {} ", language.next_prayer()), palette.gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(palette.border())
        .style(palette.surface());

    let content: Vec<Line> = match countdown {
        None => vec![
            Line::from(""),
            Line::from(Span::styled("  No data", palette.dim())),
        ],
        Some(countdown) => {
            let name = language.prayer_name(countdown.upcoming.name).to_uppercase();
            let labels = language.unit_labels();
            let mut lines = vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("  {}", name),
                    palette.gold().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format!("  {}", countdown.clock()),
                    palette.amber().add_modifier(Modifier::BOLD),
                )),
                Line::from(vec![
                    Span::styled(format!("  {} ", countdown.label(&labels)), palette.amber()),
                    Span::styled(language.remaining(), palette.dim()),
                ]),
            ];
            if let Some((done, total)) = elapsed {
                let width = area.width.saturating_sub(6) as usize;
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("  {}", progress_bar(done, total, width)),
                    palette.green(),
                )));
            }
            lines
        }
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}
