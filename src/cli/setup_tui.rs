use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::{info, warn};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use rusqlite::Connection;
use std::time::Duration;

use crate::config::{AppConfig, Theme};
use crate::db::repository::{CacheRepo, MetaRepo};
use crate::i18n::Language;
use crate::models::{Location, LocationZone, POPULAR_LOCATIONS};
use crate::prayer_times::calculator::{silence_calculation_panics, CALC_METHODS};
use crate::prayer_times::CachedSource;
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme::Palette;

pub const CACHE_DAYS_AHEAD: u32 = 30;

// ─── Wizard steps ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    Welcome,
    Place,
    LocationName,
    Latitude,
    Longitude,
    Timezone,
    CalcMethod,
    Madhab,
    Language,
    Theme,
    HijriOffset,
    Confirm,
}

const HIJRI_OFFSETS: [i32; 3] = [0, -1, 1];
const THEMES: [Theme; 2] = [Theme::Dark, Theme::Light];

// ─── Wizard state ─────────────────────────────────────────────────────────────

struct SetupWizard {
    step: Step,
    input: String,
    error: Option<String>,
    place_state: ListState,
    method_state: ListState,

    // Collected values
    location: Location,
    place_idx: usize, // POPULAR_LOCATIONS.len() = custom
    method_idx: usize,
    madhab_idx: usize, // 0 = Hanafi, 1 = Shafi
    language_idx: usize,
    theme_idx: usize,
    hijri_idx: usize,

    should_quit: bool,
    confirmed: bool,
}

impl SetupWizard {
    fn new(existing: &AppConfig) -> Self {
        let place_idx = POPULAR_LOCATIONS
            .iter()
            .position(|p| Location::from(p).key() == existing.location.key())
            .unwrap_or(POPULAR_LOCATIONS.len());
        let method_idx = CALC_METHODS
            .iter()
            .position(|(code, name)| {
                code.to_string() == existing.calculation.method || *name == existing.calculation.method
            })
            .unwrap_or(0);
        let madhab_idx = if existing.calculation.madhab == "Hanafi" { 0 } else { 1 };
        let language_idx = Language::ALL
            .iter()
            .position(|l| *l == existing.display.language)
            .unwrap_or(0);
        let theme_idx = THEMES
            .iter()
            .position(|t| *t == existing.display.theme)
            .unwrap_or(0);
        let hijri_idx = HIJRI_OFFSETS
            .iter()
            .position(|o| *o == existing.calculation.hijri_offset)
            .unwrap_or(0);

        let mut place_state = ListState::default();
        place_state.select(Some(place_idx));
        let mut method_state = ListState::default();
        method_state.select(Some(method_idx));

        Self {
            step: Step::Welcome,
            input: String::new(),
            error: None,
            place_state,
            method_state,

            location: existing.location.clone(),
            place_idx,
            method_idx,
            madhab_idx,
            language_idx,
            theme_idx,
            hijri_idx,

            should_quit: false,
            confirmed: false,
        }
    }

    fn is_custom(&self) -> bool {
        self.place_idx >= POPULAR_LOCATIONS.len()
    }

    fn palette(&self) -> Palette {
        Palette::for_theme(THEMES[self.theme_idx])
    }

    fn step_number(&self) -> usize {
        match self.step {
            Step::Welcome => 0,
            Step::Place => 1,
            Step::LocationName => 2,
            Step::Latitude => 3,
            Step::Longitude => 4,
            Step::Timezone => 5,
            Step::CalcMethod => 6,
            Step::Madhab => 7,
            Step::Language => 8,
            Step::Theme => 9,
            Step::HijriOffset => 10,
            Step::Confirm => 11,
        }
    }

    const TOTAL_STEPS: usize = 11;

    fn advance(&mut self) {
        self.error = None;
        self.step = match self.step {
            Step::Welcome => Step::Place,
            Step::Place => match POPULAR_LOCATIONS.get(self.place_idx) {
                Some(preset) => {
                    self.location = Location::from(preset);
                    Step::CalcMethod
                }
                None => Step::LocationName,
            },
            Step::LocationName => Step::Latitude,
            Step::Latitude => Step::Longitude,
            Step::Longitude => Step::Timezone,
            Step::Timezone => Step::CalcMethod,
            Step::CalcMethod => Step::Madhab,
            Step::Madhab => Step::Language,
            Step::Language => Step::Theme,
            Step::Theme => Step::HijriOffset,
            Step::HijriOffset => Step::Confirm,
            Step::Confirm => {
                self.confirmed = true;
                Step::Confirm
            }
        };
        self.prefill_input();
    }

    fn go_back(&mut self) {
        self.error = None;
        self.step = match self.step {
            Step::Welcome => {
                self.should_quit = true;
                Step::Welcome
            }
            Step::Place => Step::Welcome,
            Step::LocationName => Step::Place,
            Step::Latitude => Step::LocationName,
            Step::Longitude => Step::Latitude,
            Step::Timezone => Step::Longitude,
            Step::CalcMethod if self.is_custom() => Step::Timezone,
            Step::CalcMethod => Step::Place,
            Step::Madhab => Step::CalcMethod,
            Step::Language => Step::Madhab,
            Step::Theme => Step::Language,
            Step::HijriOffset => Step::Theme,
            Step::Confirm => Step::HijriOffset,
        };
        self.prefill_input();
    }

    // Pre-fill input with current value when entering a text step
    fn prefill_input(&mut self) {
        self.input = match self.step {
            Step::LocationName => self.location.name.clone(),
            Step::Latitude => format!("{}", self.location.latitude),
            Step::Longitude => format!("{}", self.location.longitude),
            Step::Timezone if self.location.timezone.trim().is_empty() => {
                format_tz(self.location.timezone_offset)
            }
            Step::Timezone => self.location.timezone.clone(),
            _ => String::new(),
        };
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match self.step {
            Step::Welcome => {
                if key.code == KeyCode::Esc {
                    self.should_quit = true;
                } else {
                    self.advance();
                }
            }

            Step::Place => {
                let len = POPULAR_LOCATIONS.len() + 1;
                if let Some(idx) = list_nav(key.code, self.place_idx, len) {
                    self.place_idx = idx;
                    self.place_state.select(Some(idx));
                } else {
                    self.confirm_or_back(key.code);
                }
            }

            Step::LocationName => self.handle_text_input(key, |s| {
                if s.trim().is_empty() {
                    Err("Please enter a city name".to_string())
                } else {
                    Ok(())
                }
            }),

            Step::Latitude => self.handle_text_input(key, |s| {
                s.parse::<f64>()
                    .map_err(|_| "Enter a valid latitude (e.g. 55.7887)".to_string())
                    .and_then(|v| {
                        if (-90.0..=90.0).contains(&v) {
                            Ok(())
                        } else {
                            Err("Latitude must be between -90 and 90".to_string())
                        }
                    })
            }),

            Step::Longitude => self.handle_text_input(key, |s| {
                s.parse::<f64>()
                    .map_err(|_| "Enter a valid longitude (e.g. 49.1221)".to_string())
                    .and_then(|v| {
                        if (-180.0..=180.0).contains(&v) {
                            Ok(())
                        } else {
                            Err("Longitude must be between -180 and 180".to_string())
                        }
                    })
            }),

            Step::Timezone => self.handle_text_input(key, |s| {
                if parse_tz(s).is_ok() || LocationZone::parse(s).is_ok() {
                    Ok(())
                } else {
                    Err("Use a zone like Europe/Moscow, or an offset like +3 or +5:30".to_string())
                }
            }),

            Step::CalcMethod => {
                if let Some(idx) = list_nav(key.code, self.method_idx, CALC_METHODS.len()) {
                    self.method_idx = idx;
                    self.method_state.select(Some(idx));
                } else {
                    self.confirm_or_back(key.code);
                }
            }

            Step::Madhab => self.handle_choice(key.code, 2),
            Step::Language => self.handle_choice(key.code, Language::ALL.len()),
            Step::Theme => self.handle_choice(key.code, THEMES.len()),
            Step::HijriOffset => self.handle_choice(key.code, HIJRI_OFFSETS.len()),

            Step::Confirm => match key.code {
                KeyCode::Enter | KeyCode::Char('y') => {
                    self.confirmed = true;
                }
                KeyCode::Esc | KeyCode::Char('n') => self.go_back(),
                _ => {}
            },
        }
    }

    fn confirm_or_back(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => self.advance(),
            KeyCode::Esc => self.go_back(),
            _ => {}
        }
    }

    fn choice_mut(&mut self) -> Option<&mut usize> {
        match self.step {
            Step::Madhab => Some(&mut self.madhab_idx),
            Step::Language => Some(&mut self.language_idx),
            Step::Theme => Some(&mut self.theme_idx),
            Step::HijriOffset => Some(&mut self.hijri_idx),
            _ => None,
        }
    }

    fn handle_choice(&mut self, code: KeyCode, len: usize) {
        let Some(selected) = self.choice_mut() else {
            return;
        };
        match code {
            KeyCode::Left | KeyCode::Up | KeyCode::Char('h') => {
                *selected = selected.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Down | KeyCode::Char('l') => {
                if *selected + 1 < len {
                    *selected += 1;
                }
            }
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c as usize - '1' as usize;
                if idx < len {
                    *selected = idx;
                }
            }
            other => self.confirm_or_back(other),
        }
    }

    fn handle_text_input<F>(&mut self, key: KeyEvent, validate: F)
    where
        F: Fn(&str) -> std::result::Result<(), String>,
    {
        match key.code {
            KeyCode::Esc => self.go_back(),
            KeyCode::Enter => {
                let val = self.input.trim().to_string();
                match validate(&val) {
                    Ok(()) => {
                        self.commit_text_input(&val);
                        self.advance();
                    }
                    Err(e) => {
                        self.error = Some(e);
                    }
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
                self.error = None;
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                self.error = None;
            }
            _ => {}
        }
    }

    fn commit_text_input(&mut self, val: &str) {
        match self.step {
            Step::LocationName => {
                self.location.name = val.to_string();
                self.location.country.clear();
            }
            Step::Latitude => {
                self.location.latitude = val.parse().unwrap_or(self.location.latitude);
            }
            Step::Longitude => {
                self.location.longitude = val.parse().unwrap_or(self.location.longitude);
            }
            Step::Timezone => match parse_tz(val) {
                Ok(minutes) => {
                    self.location.timezone.clear();
                    self.location.timezone_offset = minutes;
                }
                Err(_) => self.location.timezone = val.to_string(),
            },
            _ => {}
        }
    }

    fn build_config(&self, existing: &AppConfig) -> AppConfig {
        let mut config = existing.clone();
        config.location = self.location.clone();
        config.calculation.method = CALC_METHODS[self.method_idx].0.to_string();
        config.calculation.madhab = if self.madhab_idx == 0 {
            "Hanafi".to_string()
        } else {
            "Shafi".to_string()
        };
        config.calculation.hijri_offset = HIJRI_OFFSETS[self.hijri_idx];
        config.display.language = Language::ALL[self.language_idx];
        config.display.theme = THEMES[self.theme_idx];
        config
    }
}

/// Up/down inside a list of `len` entries. `None` for any other key.
fn list_nav(code: KeyCode, idx: usize, len: usize) -> Option<usize> {
    match code {
        KeyCode::Up | KeyCode::Char('k') => Some(idx.saturating_sub(1)),
        KeyCode::Down | KeyCode::Char('j') => Some((idx + 1).min(len.saturating_sub(1))),
        _ => None,
    }
}

// ─── Rendering ────────────────────────────────────────────────────────────────

fn draw(frame: &mut Frame, wizard: &mut SetupWizard) {
    let palette = wizard.palette();
    let area = frame.area();

    frame.render_widget(Block::default().style(palette.base()), area);

    // Center the wizard box
    let vchunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(26),
            Constraint::Min(0),
        ])
        .split(area);

    let hchunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(64),
            Constraint::Min(0),
        ])
        .split(vchunks[1]);

    let box_area = hchunks[1];
    frame.render_widget(Clear, box_area);

    let outer_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(palette.gold())
        .style(palette.surface())
        .title(Span::styled(
            "  وقت  waqt  ·  Setup  ",
            palette.gold().add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    frame.render_widget(outer_block, box_area);

    let inner = Rect {
        x: box_area.x + 2,
        y: box_area.y + 1,
        width: box_area.width.saturating_sub(4),
        height: box_area.height.saturating_sub(2),
    };

    match wizard.step {
        Step::Welcome => draw_welcome(frame, inner, &palette),
        Step::Place => {
            let mut names: Vec<String> = POPULAR_LOCATIONS
                .iter()
                .map(|p| format!("{}, {}", p.name, p.country))
                .collect();
            names.push("Custom coordinates…".to_string());
            draw_list(
                frame,
                inner,
                &palette,
                "Location",
                "Pick a city or enter your own coordinates",
                &names,
                wizard.place_idx,
                &mut wizard.place_state,
            );
        }
        Step::CalcMethod => {
            let names: Vec<String> = CALC_METHODS
                .iter()
                .map(|(code, name)| format!("{:>2}  {}", code, name))
                .collect();
            draw_list(
                frame,
                inner,
                &palette,
                "Calculation Method",
                "Choose the authority for prayer time calculation",
                &names,
                wizard.method_idx,
                &mut wizard.method_state,
            );
        }
        Step::Madhab => draw_choice(
            frame,
            inner,
            &palette,
            "Madhab",
            "Affects Asr prayer time calculation",
            &["Hanafi  (later Asr)", "Shafi  (earlier Asr)"],
            wizard.madhab_idx,
        ),
        Step::Language => {
            let names: Vec<&str> = Language::ALL.iter().map(|l| l.native_name()).collect();
            draw_choice(
                frame,
                inner,
                &palette,
                "Language",
                "Prayer names and countdown labels",
                &names,
                wizard.language_idx,
            );
        }
        Step::Theme => draw_choice(
            frame,
            inner,
            &palette,
            "Theme",
            "Press [t] in the main view to switch later",
            &["Dark", "Light"],
            wizard.theme_idx,
        ),
        Step::HijriOffset => draw_choice(
            frame,
            inner,
            &palette,
            "Hijri Date",
            "When does your region start each Islamic month?",
            &[
                "Same day as astronomical calculation",
                "One day after (local moon sighting)",
                "One day before",
            ],
            wizard.hijri_idx,
        ),
        Step::Confirm => draw_confirm(frame, inner, &palette, wizard),
        _ => draw_text_step(frame, inner, &palette, wizard),
    }

    draw_progress(frame, inner, &palette, wizard.step_number(), SetupWizard::TOTAL_STEPS);
}

fn draw_progress(frame: &mut Frame, area: Rect, palette: &Palette, current: usize, total: usize) {
    let mut spans = vec![Span::styled("  ", palette.dim())];
    for i in 1..=total {
        if i < current {
            spans.push(Span::styled("● ", palette.green()));
        } else if i == current {
            spans.push(Span::styled("◉ ", palette.gold()));
        } else {
            spans.push(Span::styled("○ ", palette.dim()));
        }
    }
    let progress_area = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: 1,
    };
    frame.render_widget(Paragraph::new(Line::from(spans)), progress_area);
}

fn content_area(area: Rect) -> Rect {
    Rect {
        x: area.x,
        y: area.y + 2,
        width: area.width,
        height: area.height.saturating_sub(2),
    }
}

fn draw_welcome(frame: &mut Frame, area: Rect, palette: &Palette) {
    let bullet = |text: &'static str| {
        Line::from(vec![
            Span::styled("  ●  ", palette.gold()),
            Span::styled(text, palette.dim()),
        ])
    };
    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "بِسۡمِ ٱللَّهِ ٱلرَّحۡمَٰنِ ٱلرَّحِيمِ",
            palette.gold().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled("Welcome to waqt", palette.bold())),
        Line::from(""),
        Line::from(Span::styled(
            "Prayer times and a live countdown in your terminal.",
            palette.dim(),
        )),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled("This wizard will configure:", palette.dim())),
        bullet("Your location and its timezone"),
        bullet("Calculation method and madhab"),
        bullet("Language, theme and Hijri date preference"),
        Line::from(""),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "Press  Enter  to begin  ·  Esc  to cancel",
            palette.dim(),
        )),
    ];

    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        content_area(area),
    );
}

fn draw_text_step(frame: &mut Frame, area: Rect, palette: &Palette, wizard: &SetupWizard) {
    let (title, subtitle, hint) = match wizard.step {
        Step::LocationName => (
            "City Name",
            "Shown in the header",
            "e.g.  Kazan,  Karachi,  London",
        ),
        Step::Latitude => (
            "Latitude",
            "North/south position in degrees",
            "e.g.  55.7887  for Kazan",
        ),
        Step::Longitude => (
            "Longitude",
            "East/west position in degrees",
            "e.g.  49.1221  for Kazan",
        ),
        Step::Timezone => (
            "Timezone",
            "IANA zone name, or a fixed offset from UTC",
            "e.g.  Europe/Moscow  ·  +5:30  ·  -5",
        ),
        _ => ("", "", ""),
    };

    let cursor = if wizard.input.len() < 40 { "█" } else { "" };

    let mut lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(title, palette.gold().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(subtitle, palette.dim())),
        Line::from(""),
        Line::from(""),
    ];

    let input_display = format!("  {}{}  ", wizard.input, cursor);
    let input_width = area.width.saturating_sub(8) as usize;
    let padded = format!("{:<width$}", input_display, width = input_width);

    let input_style = if wizard.error.is_some() {
        palette.red()
    } else {
        palette.amber()
    };

    lines.push(Line::from(Span::styled(padded, input_style.add_modifier(Modifier::BOLD))));
    lines.push(Line::from(""));

    if let Some(err) = &wizard.error {
        lines.push(Line::from(Span::styled(format!("  ✗  {}", err), palette.red())));
    } else {
        lines.push(Line::from(Span::styled(hint, palette.dim())));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(""));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter  confirm   ·   Esc  back",
        palette.dim(),
    )));

    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        content_area(area),
    );
}

#[allow(clippy::too_many_arguments)]
fn draw_list(
    frame: &mut Frame,
    area: Rect,
    palette: &Palette,
    title: &str,
    subtitle: &str,
    entries: &[String],
    selected: usize,
    state: &mut ListState,
) {
    let header_lines = vec![
        Line::from(""),
        Line::from(Span::styled(title, palette.gold().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(subtitle, palette.dim())),
        Line::from(""),
    ];

    let header_area = Rect {
        x: area.x,
        y: area.y + 2,
        width: area.width,
        height: 5,
    };
    frame.render_widget(
        Paragraph::new(header_lines).alignment(Alignment::Center),
        header_area,
    );

    let list_area = Rect {
        x: area.x + 2,
        y: area.y + 8,
        width: area.width.saturating_sub(4),
        height: area.height.saturating_sub(12),
    };

    let items: Vec<ListItem> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let line = if i == selected {
                Line::from(vec![
                    Span::styled("  ◉  ", palette.gold()),
                    Span::styled(entry.as_str(), palette.gold().add_modifier(Modifier::BOLD)),
                ])
            } else {
                Line::from(vec![
                    Span::styled("  ○  ", palette.dim()),
                    Span::styled(entry.as_str(), palette.dim()),
                ])
            };
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).style(palette.surface());
    frame.render_stateful_widget(list, list_area, state);

    let footer = Paragraph::new(Line::from(Span::styled(
        "↑↓  navigate   ·   Enter  select   ·   Esc  back",
        palette.dim(),
    )))
    .alignment(Alignment::Center);
    let footer_area = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(3),
        width: area.width,
        height: 1,
    };
    frame.render_widget(footer, footer_area);
}

fn draw_choice(
    frame: &mut Frame,
    area: Rect,
    palette: &Palette,
    title: &str,
    subtitle: &str,
    options: &[&str],
    selected: usize,
) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(title, palette.gold().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(subtitle, palette.dim())),
        Line::from(""),
        Line::from(""),
    ];

    for (i, opt) in options.iter().enumerate() {
        if i == selected {
            lines.push(Line::from(vec![
                Span::styled("  ◉  ", palette.gold()),
                Span::styled(*opt, palette.gold().add_modifier(Modifier::BOLD)),
            ]));
        } else {
            lines.push(Line::from(vec![
                Span::styled("  ○  ", palette.dim()),
                Span::styled(*opt, palette.dim()),
            ]));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "←→  or  1 2 3  choose   ·   Enter  confirm   ·   Esc  back",
        palette.dim(),
    )));

    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        content_area(area),
    );
}

fn draw_confirm(frame: &mut Frame, area: Rect, palette: &Palette, wizard: &SetupWizard) {
    let madhab = if wizard.madhab_idx == 0 { "Hanafi" } else { "Shafi" };
    let (code, method) = CALC_METHODS[wizard.method_idx];
    let zone = if wizard.location.timezone.trim().is_empty() {
        format!("UTC{}", format_tz(wizard.location.timezone_offset))
    } else {
        wizard.location.timezone.clone()
    };

    let row = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(label, palette.dim()),
            Span::styled(value, palette.bold()),
        ])
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Confirm Settings", palette.gold().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled("Review your configuration:", palette.dim())),
        Line::from(""),
        row("  Location    ", wizard.location.name.clone()),
        row(
            "  Coordinates ",
            format!("{:.4},  {:.4}", wizard.location.latitude, wizard.location.longitude),
        ),
        row("  Timezone    ", zone),
        row("  Method      ", format!("{} ({})", method, code)),
        row("  Madhab      ", madhab.to_string()),
        row("  Language    ", Language::ALL[wizard.language_idx].native_name().to_string()),
        row("  Theme       ", THEMES[wizard.theme_idx].as_str().to_string()),
        row("  Hijri offset", format!("{:+} days", HIJRI_OFFSETS[wizard.hijri_idx])),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            format!("Enter  save & cache {} days   ·   Esc  go back", CACHE_DAYS_AHEAD),
            palette.dim(),
        )),
    ];

    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        content_area(area),
    );
}

fn draw_caching(frame: &mut Frame, palette: &Palette) {
    let area = frame.area();
    frame.render_widget(Block::default().style(palette.base()), area);

    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "Calculating prayer times…",
            palette.gold().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Caching {} days of prayer times offline.", CACHE_DAYS_AHEAD),
            palette.dim(),
        )),
    ];

    let vchunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Min(0)])
        .split(area);
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), vchunks[1]);
}

// ─── Public entry point ──────────────────────────────────────────────────────

/// Save `config`, mirror display preferences and warm the cache.
pub fn apply_setup(conn: &Connection, config: &AppConfig) -> Result<()> {
    config.validate()?;
    config.save()?;
    let today = config.zone()?.local(Utc::now()).date();
    record_setup(conn, config, today)
}

/// Everything after the config file is written: preferences, cache, done flag.
fn record_setup(conn: &Connection, config: &AppConfig, today: NaiveDate) -> Result<()> {
    MetaRepo::set_preference(conn, "language", config.display.language.code())?;
    MetaRepo::set_preference(conn, "theme", config.display.theme.as_str())?;

    let calculator = config.calculator()?;
    let source = CachedSource::new(conn, calculator.source_key()?, calculator);
    // Days the calculator cannot produce show "No data" later; setup still completes.
    if let Err(e) = source.ensure_cached(today, CACHE_DAYS_AHEAD) {
        warn!("some days were not cached for {}: {}", config.location.name, e);
    }

    MetaRepo::set(conn, "setup_done", "1")?;
    info!("setup saved for {} ({})", config.location.name, source.key());
    Ok(())
}

pub fn run_setup_tui(conn: &Connection, config: &mut AppConfig) -> Result<()> {
    let previous_key = config.calculator().and_then(|c| c.source_key()).ok();
    let mut wizard = SetupWizard::new(config);
    let mut terminal = ratatui::init();
    silence_calculation_panics();
    let events = EventHandler::new(Duration::from_millis(100));

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| draw(frame, &mut wizard)) {
            break Err(e.into());
        }

        match events.next() {
            Ok(Event::Key(key)) => {
                wizard.handle_key(key);
                if wizard.should_quit {
                    break Ok(());
                }
                if wizard.confirmed {
                    let palette = wizard.palette();
                    if let Err(e) = terminal.draw(|frame| draw_caching(frame, &palette)) {
                        break Err(e.into());
                    }

                    let new_config = wizard.build_config(config);
                    let outcome = apply_setup(conn, &new_config).and_then(|()| {
                        // Drop rows for the previous place/method; imports for it are stale too
                        let new_key = new_config.calculator()?.source_key()?;
                        if let Some(old) = previous_key.as_deref().filter(|old| *old != new_key) {
                            CacheRepo::clear_key(conn, old)?;
                        }
                        Ok(())
                    });
                    if outcome.is_ok() {
                        *config = new_config;
                    }
                    break outcome;
                }
            }
            Ok(Event::Resize | Event::Tick) => {}
            Err(e) => break Err(e.into()),
        }
    };

    ratatui::restore();
    result
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn format_tz(minutes: i32) -> String {
    let sign = if minutes < 0 { "-" } else { "+" };
    let abs = minutes.abs();
    let h = abs / 60;
    let m = abs % 60;
    if m == 0 {
        format!("{}{}", sign, h)
    } else {
        format!("{}{}:{:02}", sign, h, m)
    }
}

/// `+5:30`, `-3`, `+5.5` into minutes east of UTC.
pub fn parse_tz(s: &str) -> Result<i32> {
    let s = s.trim();
    let negative = s.starts_with('-');
    let s = s.trim_start_matches(['+', '-']);
    if s.is_empty() || !s.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(anyhow!("Not an offset: '{}'", s));
    }
    let sign = if negative { -1 } else { 1 };

    let minutes = if let Some((h, m)) = s.split_once(':') {
        let h: i32 = h.parse()?;
        let m: i32 = m.parse()?;
        if !(0..60).contains(&m) {
            return Err(anyhow!("Minutes out of range: {}", m));
        }
        h * 60 + m
    } else if s.contains('.') {
        let h: f64 = s.parse()?;
        (h * 60.0).round() as i32
    } else {
        let h: i32 = s.parse()?;
        h * 60
    };

    if minutes > 14 * 60 {
        return Err(anyhow!("Offset out of range: {}", s));
    }
    Ok(sign * minutes)
}
