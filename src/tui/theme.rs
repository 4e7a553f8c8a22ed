use ratatui::style::{Color, Modifier, Style};

use crate::config::Theme;

/// Colors for one theme. Passed to every widget explicitly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub bg: Color,
    pub surface: Color,
    pub border: Color,
    pub text: Color,
    pub text_dim: Color,
    pub gold: Color,
    pub green: Color,
    pub amber: Color,
    pub red: Color,
}

pub const DARK: Palette = Palette {
    bg: Color::Rgb(18, 16, 14),
    surface: Color::Rgb(28, 25, 20),
    border: Color::Rgb(55, 48, 36),
    text: Color::Rgb(230, 218, 196),
    text_dim: Color::Rgb(130, 118, 96),
    gold: Color::Rgb(196, 160, 68),
    green: Color::Rgb(92, 148, 92),
    amber: Color::Rgb(210, 138, 60),
    red: Color::Rgb(180, 82, 62),
};

pub const LIGHT: Palette = Palette {
    bg: Color::Rgb(250, 246, 238),
    surface: Color::Rgb(240, 234, 222),
    border: Color::Rgb(200, 188, 164),
    text: Color::Rgb(40, 34, 26),
    text_dim: Color::Rgb(120, 108, 88),
    gold: Color::Rgb(150, 112, 20),
    green: Color::Rgb(46, 110, 56),
    amber: Color::Rgb(176, 94, 24),
    red: Color::Rgb(160, 52, 40),
};

impl Palette {
    pub fn for_theme(theme: Theme) -> Palette {
        match theme {
            Theme::Dark => DARK,
            Theme::Light => LIGHT,
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.bg)
    }

    pub fn surface(&self) -> Style {
        Style::default().fg(self.text).bg(self.surface)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.text_dim)
    }

    pub fn gold(&self) -> Style {
        Style::default().fg(self.gold)
    }

    pub fn green(&self) -> Style {
        Style::default().fg(self.green)
    }

    pub fn amber(&self) -> Style {
        Style::default().fg(self.amber)
    }

    pub fn red(&self) -> Style {
        Style::default().fg(self.red)
    }

    pub fn bold(&self) -> Style {
        Style::default().fg(self.text).add_modifier(Modifier::BOLD)
    }
}
