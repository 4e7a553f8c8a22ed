use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::{debug, warn};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use rusqlite::Connection;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::models::{LocationZone, MinuteOfDay, MonthSchedule, PrayerSchedule};
use crate::prayer_times::calculator::silence_calculation_panics;
use crate::prayer_times::{remaining_minutes, CachedSource, Countdown, Resolution, ScheduleSource};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme::Palette;
use crate::tui::widgets::{day_detail, header, month, next_prayer, prayers, statusbar};
use crate::utils::hijri::hijri_string;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View {
    Day,
    Month,
    Help,
}

/// Interactive state. Everything the view needs is owned here; there is no
/// global state.
pub struct App<S> {
    pub view: View,
    pub config: AppConfig,
    config_path: Option<PathBuf>,
    zone: LocationZone,
    source: S,
    pub should_quit: bool,
    pub show_day_detail: bool,
    pub message: Option<String>,

    // Refreshed on tick
    pub now: NaiveDateTime,
    pub schedule: Option<PrayerSchedule>,
    pub hijri_str: String,

    // Month view
    pub shown_month: (i32, u32),
    pub month: Option<MonthSchedule>,
    pub cursor: NaiveDate,
}

impl<S: ScheduleSource> App<S> {
    pub fn new(config: AppConfig, source: S, now_utc: DateTime<Utc>) -> Result<Self> {
        let zone = config.zone()?;
        let now = zone.local(now_utc);
        let today = now.date();

        let mut app = App {
            view: View::Day,
            config,
            config_path: None,
            zone,
            source,
            should_quit: false,
            show_day_detail: false,
            message: None,
            now,
            schedule: None,
            hijri_str: String::new(),
            shown_month: (today.year(), today.month()),
            month: None,
            cursor: today,
        };
        app.refetch_day();
        Ok(app)
    }

    /// Persist theme/language changes to this file.
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }

    pub fn palette(&self) -> Palette {
        Palette::for_theme(self.config.display.theme)
    }

    pub fn tick(&mut self, now_utc: DateTime<Utc>) {
        let local = self.zone.local(now_utc);
        let date_changed = local.date() != self.now.date();
        self.now = local;
        if date_changed || self.schedule.is_none() {
            if date_changed {
                debug!("local date changed to {}", local.date());
            }
            self.refetch_day();
        }
    }

    fn refetch_day(&mut self) {
        let today = self.today();
        self.hijri_str = hijri_string(today, self.config.calculation.hijri_offset);
        match self.source.day(today) {
            Ok(schedule) => {
                self.schedule = Some(schedule);
                self.message = None;
            }
            Err(e) => {
                warn!("no schedule for {}: {}", today, e);
                self.schedule = None;
                self.message = Some(format!("No data: {}", e));
            }
        }
    }

    fn load_month(&mut self, year: i32, month: u32) {
        self.shown_month = (year, month);
        self.month = match self.source.month(year, month) {
            Ok(m) => Some(m),
            Err(e) => {
                warn!("no schedule for {}-{:02}: {}", year, month, e);
                None
            }
        };
    }

    /// Fresh current/upcoming for the present minute.
    pub fn resolution(&self) -> Option<Resolution<'_>> {
        let schedule = self.schedule.as_ref()?;
        schedule.resolve(MinuteOfDay::from_time(self.now.time())).ok()
    }

    pub fn countdown(&self) -> Option<Countdown> {
        let resolution = self.resolution()?;
        Some(Countdown::at(&resolution, self.now.time(), self.config.display.countdown))
    }

    /// Minutes into the current interval and its length.
    fn elapsed(&self) -> Option<(u32, u32)> {
        let resolution = self.resolution()?;
        let start = resolution.current()?.time;
        let total = remaining_minutes(start, resolution.upcoming().time);
        if total == 0 {
            return None;
        }
        let done = remaining_minutes(start, MinuteOfDay::from_time(self.now.time()));
        Some((u32::from(done), u32::from(total)))
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        // Only handle actual key presses; some terminals also report release/repeat
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.show_day_detail {
            self.show_day_detail = false;
            return;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') if self.view == View::Help => {
                self.view = View::Day;
                return;
            }
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('?') => {
                self.view = if self.view == View::Help { View::Day } else { View::Help };
                return;
            }
            KeyCode::Char('t') => {
                self.config.display.theme = self.config.display.theme.toggled();
                self.persist();
                return;
            }
            KeyCode::Char('l') => {
                self.config.display.language = self.config.display.language.next();
                self.persist();
                return;
            }
            KeyCode::Char('s') => {
                self.config.display.countdown = self.config.display.countdown.toggled();
                self.persist();
                return;
            }
            _ => {}
        }

        match self.view {
            View::Day => self.handle_day_key(key),
            View::Month => self.handle_month_key(key),
            View::Help => {}
        }
    }

    fn handle_day_key(&mut self, key: KeyEvent) {
        if let KeyCode::Char('m') | KeyCode::Tab = key.code {
            let today = self.today();
            self.cursor = today;
            self.load_month(today.year(), today.month());
            self.view = View::Month;
        }
    }

    fn handle_month_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('m') | KeyCode::Tab => self.view = View::Day,
            KeyCode::Left => self.move_cursor(-1),
            KeyCode::Right => self.move_cursor(1),
            KeyCode::Up => self.move_cursor(-7),
            KeyCode::Down => self.move_cursor(7),
            KeyCode::Char('[') => self.shift_month(false),
            KeyCode::Char(']') => self.shift_month(true),
            KeyCode::Enter => self.show_day_detail = true,
            _ => {}
        }
    }

    fn move_cursor(&mut self, days: i64) {
        if let Some(date) = self.cursor.checked_add_signed(Duration::days(days)) {
            self.set_cursor(date);
        }
    }

    fn shift_month(&mut self, forward: bool) {
        let shifted = if forward {
            self.cursor.checked_add_months(Months::new(1))
        } else {
            self.cursor.checked_sub_months(Months::new(1))
        };
        if let Some(date) = shifted {
            self.set_cursor(date);
        }
    }

    fn set_cursor(&mut self, date: NaiveDate) {
        self.cursor = date;
        if (date.year(), date.month()) != self.shown_month {
            self.load_month(date.year(), date.month());
        }
    }

    fn persist(&mut self) {
        let Some(path) = &self.config_path else {
            return;
        };
        if let Err(e) = self.config.save_to(path) {
            warn!("could not save settings: {:#}", e);
            self.message = Some("Could not save settings".to_string());
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        match self.view {
            View::Day => self.draw_day(frame),
            View::Month => self.draw_month(frame),
            View::Help => {
                self.draw_day(frame);
                self.draw_help_overlay(frame);
            }
        }

        if self.show_day_detail {
            let schedule = self
                .month
                .as_ref()
                .filter(|m| (m.year, m.month) == (self.cursor.year(), self.cursor.month()))
                .and_then(|m| m.day(self.cursor.day()));
            day_detail::render(
                frame,
                &self.palette(),
                self.cursor,
                schedule,
                &hijri_string(self.cursor, self.config.calculation.hijri_offset),
                self.config.display.language,
                self.config.display.clock,
            );
        }
    }

    fn frame_chunks(&self, frame: &mut Frame) -> (Rect, Rect, Rect) {
        let palette = self.palette();
        let area = frame.area();
        frame.render_widget(Block::default().style(palette.base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(
            frame,
            chunks[0],
            &palette,
            &self.config.location.name,
            self.today(),
            &self.hijri_str,
        );
        statusbar::render(frame, chunks[2], &palette, &self.view, self.message.as_deref());

        (chunks[0], chunks[1], chunks[2])
    }

    fn draw_day(&self, frame: &mut Frame) {
        let palette = self.palette();
        let (_, body, _) = self.frame_chunks(frame);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(body);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(0)])
            .split(columns[0]);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(10), Constraint::Min(0)])
            .split(columns[1]);

        let statuses = self.resolution().map(|r| r.statuses()).unwrap_or_default();
        prayers::render(
            frame,
            left[0],
            &palette,
            &statuses,
            self.config.display.language,
            self.config.display.clock,
        );

        next_prayer::render(
            frame,
            right[0],
            &palette,
            self.countdown().as_ref(),
            self.elapsed(),
            self.config.display.language,
        );
    }

    fn draw_month(&self, frame: &mut Frame) {
        let (_, body, _) = self.frame_chunks(frame);
        month::render(
            frame,
            body,
            &self.palette(),
            self.shown_month,
            self.month.as_ref(),
            self.today(),
            self.cursor,
            self.config.display.language,
            self.config.display.clock,
        );
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let palette = self.palette();
        let area = frame.area();

        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: area.height / 2,
        };

        frame.render_widget(Clear, popup_area);

        let bindings = [
            ("  [m] / Tab    ", "Day / month view"),
            ("  [← ↑ ↓ →]    ", "Move selected day"),
            ("  [ [ ] ]      ", "Previous / next month"),
            ("  [Enter]      ", "Day details"),
            ("  [t]          ", "Toggle theme"),
            ("  [l]          ", "Next language"),
            ("  [s]          ", "Seconds / minutes countdown"),
            ("  [?]          ", "Toggle help"),
            ("  [Esc] / [q]  ", "Quit"),
        ];

        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                palette.gold().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, label) in bindings {
            help_text.push(Line::from(vec![
                Span::styled(key, palette.gold()),
                Span::styled(label, palette.dim()),
            ]));
        }

        let block = Block::default()
            .title(Span::styled(" Help ", palette.gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(palette.gold())
            .style(palette.surface());

        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }
}

/// Run the TUI event loop against the cached calculator for `config`.
pub fn run(conn: &Connection, config: AppConfig) -> Result<()> {
    let calculator = config.calculator()?;
    let source = CachedSource::new(conn, calculator.source_key()?, calculator);
    let tick_rate = config.display.countdown.tick_interval();

    let mut app = App::new(config, source, Utc::now())?.with_config_path(AppConfig::config_path()?);

    let mut terminal = ratatui::init();
    silence_calculation_panics();
    let events = EventHandler::new(tick_rate);

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| app.draw(frame)) {
            break Err(e.into());
        }

        match events.next() {
            Ok(Event::Key(key)) => {
                app.handle_key(key);
                if app.should_quit {
                    break Ok(());
                }
                events.set_tick_rate(app.config.display.countdown.tick_interval());
                app.tick(Utc::now());
            }
            Ok(Event::Resize) => {}
            Ok(Event::Tick) => app.tick(Utc::now()),
            Err(e) => break Err(e.into()),
        }
    };

    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use crate::i18n::Language;
    use crate::models::PrayerName;
    use crate::prayer_times::{FetchError, Granularity, StaticSource};
    use chrono::TimeZone;
    use crossterm::event::KeyModifiers;

    fn day(y: i32, m: u32, d: u32) -> PrayerSchedule {
        let t = |h, min| MinuteOfDay::from_hm(h, min).unwrap();
        PrayerSchedule::from_times(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            [t(4, 55), t(5, 58), t(12, 20), t(16, 51), t(18, 42), t(19, 45)],
        )
        .unwrap()
    }

    fn utc(d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, h, min, s).unwrap()
    }

    // Default location is Mecca, UTC+3 all year.
    fn app_at(now: DateTime<Utc>) -> App<StaticSource> {
        let source = StaticSource::new(vec![day(2024, 6, 1), day(2024, 6, 2)]);
        App::new(AppConfig::default(), source, now).unwrap()
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn resolves_in_location_time() {
        let app = app_at(utc(1, 9, 0, 15));
        let resolution = app.resolution().unwrap();
        assert_eq!(resolution.current().unwrap().name, PrayerName::Sunrise);
        assert_eq!(resolution.upcoming().name, PrayerName::Dhuhr);

        let countdown = app.countdown().unwrap();
        assert_eq!(countdown.minutes, 20);
        assert_eq!(countdown.seconds, Some(44));
    }

    #[test]
    fn before_fajr_has_no_current_or_progress() {
        let app = app_at(utc(1, 0, 30, 0));
        let resolution = app.resolution().unwrap();
        assert!(resolution.current().is_none());
        assert_eq!(resolution.upcoming().name, PrayerName::Fajr);
        assert!(app.elapsed().is_none());
    }

    #[test]
    fn refetches_when_local_date_changes() {
        let mut app = app_at(utc(1, 20, 0, 0));
        assert_eq!(app.schedule.as_ref().unwrap().date(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert!(app.resolution().unwrap().wraps_to_tomorrow());

        // 21:30 UTC is 00:30 on June 2nd in Mecca
        app.tick(utc(1, 21, 30, 0));
        assert_eq!(app.schedule.as_ref().unwrap().date(), NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
        assert!(app.resolution().unwrap().current().is_none());
    }

    #[test]
    fn missing_day_reports_no_data() {
        let mut app = app_at(utc(2, 12, 0, 0));
        app.tick(utc(3, 12, 0, 0));
        assert!(app.schedule.is_none());
        assert!(app.resolution().is_none());
        assert!(app.message.as_deref().unwrap_or_default().starts_with("No data"));
    }

    /// Computes June 1st only; June 2nd has no twilight.
    struct NoTwilight;

    impl ScheduleSource for NoTwilight {
        fn day(&self, date: NaiveDate) -> Result<PrayerSchedule, FetchError> {
            if date == NaiveDate::from_ymd_opt(2024, 6, 1).unwrap() {
                Ok(day(2024, 6, 1))
            } else {
                Err(FetchError::Calculation(format!("no twilight on {}", date)))
            }
        }
    }

    #[test]
    fn failed_calculation_reports_no_data_and_recovers_month() {
        let mut app = App::new(AppConfig::default(), NoTwilight, utc(1, 12, 0, 0)).unwrap();
        assert!(app.resolution().is_some());

        // 21:30 UTC is already June 2nd in Mecca
        app.tick(utc(1, 21, 30, 0));
        assert!(app.schedule.is_none());
        assert!(app.countdown().is_none());
        let message = app.message.clone().unwrap_or_default();
        assert!(message.starts_with("No data"), "{}", message);
        assert!(message.contains("no twilight"), "{}", message);

        app.handle_key(press(KeyCode::Char('m')));
        let month = app.month.as_ref().unwrap();
        assert_eq!(month.days.len(), 1);
        assert!(month.day(2).is_none());
    }

    #[test]
    fn theme_and_language_keys_update_config() {
        let mut app = app_at(utc(1, 9, 0, 0));
        app.handle_key(press(KeyCode::Char('t')));
        app.handle_key(press(KeyCode::Char('l')));
        app.handle_key(press(KeyCode::Char('s')));
        assert_eq!(app.config.display.theme, Theme::Light);
        assert_eq!(app.config.display.language, Language::Ru);
        assert_eq!(app.config.display.countdown, Granularity::Minutes);
        assert!(!app.should_quit);
    }

    #[test]
    fn month_navigation_crosses_month_boundaries() {
        let mut app = app_at(utc(1, 9, 0, 0));
        app.handle_key(press(KeyCode::Char('m')));
        assert_eq!(app.view, View::Month);
        assert_eq!(app.shown_month, (2024, 6));

        app.handle_key(press(KeyCode::Left));
        assert_eq!(app.cursor, NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());
        assert_eq!(app.shown_month, (2024, 5));

        app.handle_key(press(KeyCode::Char(']')));
        assert_eq!(app.cursor, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
        assert_eq!(app.shown_month, (2024, 6));

        app.handle_key(press(KeyCode::Enter));
        assert!(app.show_day_detail);
        app.handle_key(press(KeyCode::Esc));
        assert!(!app.show_day_detail);
        assert!(!app.should_quit);
    }

    #[test]
    fn escape_quits_from_day_view() {
        let mut app = app_at(utc(1, 9, 0, 0));
        app.handle_key(press(KeyCode::Char('?')));
        app.handle_key(press(KeyCode::Esc));
        assert_eq!(app.view, View::Day);
        app.handle_key(press(KeyCode::Esc));
        assert!(app.should_quit);
    }
}
