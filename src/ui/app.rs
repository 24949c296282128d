use std::fs;
use std::mem;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use crossterm::event::KeyCode;
use log::info;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::config::{AppConfig, DataPaths};
use crate::csv::{export_file_name, sample_csv, FILE_COLUMN, SPREADSHEET_COLUMN};
use crate::lottery::{DrawPhase, ImportOutcome, Lottery, TickOutcome};

use super::forms::{BrandingField, BrandingForm, ConfirmAction, ImportField, ImportForm, TextInput};
use super::helpers::{build_draw_panel_lines, centered_rect, surface_error};
use super::screens::{HistoryScreen, ParticipantScreen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// File written by the "sample" shortcut in the working directory.
const SAMPLE_FILE_NAME: &str = "sample-peserta-undian.csv";
/// ASCII textures cycled behind the candidate while a draw spins.
const DRAW_ART: &[&[&str]] = &[
    &["*+*+", "+*+*"],
    &["/\\/\\/", "\\/\\/\\"],
    &["<>><", "><<>"],
    &["oOo ", " OoO"],
    &["^v^v", "v^v^"],
    &["~~  ", "  ~~"],
];

/// Top-level screens, switched with the number keys.
enum Screen {
    Draw,
    Participants(ParticipantScreen),
    History(HistoryScreen),
    Settings,
}

/// Modal state layered over the current screen.
enum Mode {
    Normal,
    AddingParticipant(TextInput),
    Importing(ImportForm),
    Exporting(TextInput),
    EditingBranding(BrandingForm),
    Confirming(ConfirmAction),
    Searching(String),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    lottery: Lottery,
    config: AppConfig,
    paths: DataPaths,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    frame_count: usize,
}

impl App {
    pub fn new(mut lottery: Lottery, config: AppConfig, paths: DataPaths) -> Self {
        lottery.set_winner_count(config.default_winner_count);
        Self {
            lottery,
            config,
            paths,
            screen: Screen::Draw,
            mode: Mode::Normal,
            status: None,
            frame_count: 0,
        }
    }

    /// Period of the draw animation.
    pub fn tick_interval(&self) -> Duration {
        self.config.tick_interval()
    }

    pub fn lottery(&self) -> &Lottery {
        &self.lottery
    }

    /// Advance a running draw. Called by the event loop once per tick.
    pub fn on_tick(&mut self) {
        if !self.lottery.is_drawing() {
            return;
        }
        self.frame_count = self.frame_count.wrapping_add(1);
        match self.lottery.tick() {
            TickOutcome::Finalized(session) => {
                self.set_status(
                    format!(
                        "Session #{} winners: {}",
                        session.session_id,
                        session.winners.join(", ")
                    ),
                    StatusKind::Info,
                );
                self.refresh_screen_data();
            }
            TickOutcome::NothingRecorded => {
                self.set_status("Draw stopped without winners.", StatusKind::Error);
            }
            TickOutcome::Spinning(_) | TickOutcome::Idle => {}
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingParticipant(input) => self.handle_add_participant(code, input)?,
            Mode::Importing(form) => self.handle_import(code, form)?,
            Mode::Exporting(input) => self.handle_export(code, input)?,
            Mode::EditingBranding(form) => self.handle_edit_branding(code, form)?,
            Mode::Confirming(action) => self.handle_confirm(code, action)?,
            Mode::Searching(query) => self.handle_search(code, query)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
                return Ok(Mode::Normal);
            }
            KeyCode::Char('1') => {
                self.screen = Screen::Draw;
                return Ok(Mode::Normal);
            }
            KeyCode::Char('2') => {
                self.screen =
                    Screen::Participants(ParticipantScreen::new(self.lottery.participants()));
                return Ok(Mode::Normal);
            }
            KeyCode::Char('3') => {
                self.screen = Screen::History(HistoryScreen::default());
                return Ok(Mode::Normal);
            }
            KeyCode::Char('4') => {
                self.screen = Screen::Settings;
                return Ok(Mode::Normal);
            }
            _ => {}
        }

        match self.screen {
            Screen::Draw => self.handle_draw_key(code),
            Screen::Participants(_) => self.handle_participants_key(code),
            Screen::History(_) => self.handle_history_key(code),
            Screen::Settings => self.handle_settings_key(code),
        }
    }

    fn handle_draw_key(&mut self, code: KeyCode) -> Result<Mode> {
        match code {
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_draw(),
            KeyCode::Char('+') | KeyCode::Up | KeyCode::Right => self.adjust_winner_count(1),
            KeyCode::Char('-') | KeyCode::Down | KeyCode::Left => self.adjust_winner_count(-1),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if self.ensure_idle() {
                    self.clear_status();
                    return Ok(Mode::Confirming(ConfirmAction::ResetDraw));
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_participants_key(&mut self, code: KeyCode) -> Result<Mode> {
        let Screen::Participants(screen) = &mut self.screen else {
            return Ok(Mode::Normal);
        };
        match code {
            KeyCode::Up => screen.move_selection(-1),
            KeyCode::Down => screen.move_selection(1),
            KeyCode::PageUp => screen.move_selection(-10),
            KeyCode::PageDown => screen.move_selection(10),
            KeyCode::Home => screen.select_first(),
            KeyCode::End => screen.select_last(),
            _ => {}
        }
        let current = screen.current().cloned();
        let filtered = screen.filter.is_some();

        match code {
            KeyCode::Esc => {
                if filtered {
                    self.apply_participant_filter(None);
                } else {
                    self.screen = Screen::Draw;
                }
            }
            KeyCode::Char('f') => return Ok(Mode::Searching(String::new())),
            KeyCode::Char('a') | KeyCode::Char('+') => {
                if self.ensure_idle() {
                    self.clear_status();
                    return Ok(Mode::AddingParticipant(TextInput::default()));
                }
            }
            KeyCode::Char('d') | KeyCode::Char('-') | KeyCode::Delete => {
                if !self.ensure_idle() {
                    return Ok(Mode::Normal);
                }
                match current {
                    Some(name) => {
                        self.clear_status();
                        return Ok(Mode::Confirming(ConfirmAction::RemoveParticipant(name)));
                    }
                    None => self.set_status("No participant selected.", StatusKind::Error),
                }
            }
            KeyCode::Char('i') => {
                if self.ensure_idle() {
                    self.clear_status();
                    return Ok(Mode::Importing(ImportForm::new(self.config.import_column)));
                }
            }
            KeyCode::Char('e') => {
                if self.lottery.participants().is_empty() {
                    self.set_status("There are no participants to export.", StatusKind::Error);
                } else {
                    self.clear_status();
                    let default_path = export_file_name(self.lottery.today());
                    return Ok(Mode::Exporting(TextInput::with_value(default_path)));
                }
            }
            KeyCode::Char('s') => match self.write_sample() {
                Ok(path) => self.set_status(
                    format!("Sample CSV written to {}.", path.display()),
                    StatusKind::Info,
                ),
                Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
            },
            KeyCode::Char('C') => {
                if self.ensure_idle() {
                    self.clear_status();
                    return Ok(Mode::Confirming(ConfirmAction::ClearAll));
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_history_key(&mut self, code: KeyCode) -> Result<Mode> {
        let winner_count = self.lottery.history().winners().len();
        let Screen::History(screen) = &mut self.screen else {
            return Ok(Mode::Normal);
        };
        match code {
            KeyCode::Up => screen.move_selection(-1, winner_count),
            KeyCode::Down => screen.move_selection(1, winner_count),
            KeyCode::PageUp => screen.scroll_by(-10),
            KeyCode::PageDown => screen.scroll_by(10),
            _ => {}
        }
        let selected = screen.selected_winner;

        match code {
            KeyCode::Esc => self.screen = Screen::Draw,
            KeyCode::Char('x') | KeyCode::Char('-') | KeyCode::Delete => {
                if !self.ensure_idle() {
                    return Ok(Mode::Normal);
                }
                let name = self.lottery.history().winners().get(selected).cloned();
                match name {
                    Some(name) => {
                        self.lottery.remove_winner(&name);
                        self.refresh_screen_data();
                        self.set_status(
                            format!("{name} can be drawn again."),
                            StatusKind::Info,
                        );
                    }
                    None => self.set_status("No winner selected.", StatusKind::Error),
                }
            }
            KeyCode::Char('c') => {
                if self.ensure_idle() {
                    self.clear_status();
                    return Ok(Mode::Confirming(ConfirmAction::ClearHistory));
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_settings_key(&mut self, code: KeyCode) -> Result<Mode> {
        match code {
            KeyCode::Esc => self.screen = Screen::Draw,
            KeyCode::Char('e') => {
                self.clear_status();
                return Ok(Mode::EditingBranding(BrandingForm::from_branding(
                    &self.config.branding,
                )));
            }
            KeyCode::Char('r') => {
                self.config.branding.reset();
                self.save_config("Title and subtitle reset to defaults.");
            }
            KeyCode::Char('c') => {
                self.config.import_column = if self.config.import_column == FILE_COLUMN {
                    SPREADSHEET_COLUMN
                } else {
                    FILE_COLUMN
                };
                self.save_config("Default import column updated.");
            }
            KeyCode::Char('+') => {
                self.config.default_winner_count += 1;
                self.save_config("Default winner count updated.");
            }
            KeyCode::Char('-') => {
                self.config.default_winner_count =
                    self.config.default_winner_count.saturating_sub(1).max(1);
                self.save_config("Default winner count updated.");
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_add_participant(&mut self, code: KeyCode, mut input: TextInput) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Add participant closed.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => input.backspace(),
            KeyCode::Enter => match input.required("Name") {
                Ok(name) => {
                    if self.lottery.add_participant(&name) {
                        self.refresh_screen_data();
                        self.set_status(format!("Added {name}."), StatusKind::Info);
                        return Ok(Mode::AddingParticipant(TextInput::default()));
                    }
                    input.error = Some(format!("{name} is already registered."));
                }
                Err(err) => input.error = Some(surface_error(&err)),
            },
            KeyCode::Char(ch) => {
                input.push_char(ch);
            }
            _ => {}
        }
        Ok(Mode::AddingParticipant(input))
    }

    fn handle_import(&mut self, code: KeyCode, mut form: ImportForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Import cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Left | KeyCode::Right => {
                form.flip_switch();
            }
            KeyCode::Backspace => {
                if form.active == ImportField::Path {
                    form.path.backspace();
                }
            }
            KeyCode::Enter => match self.import_file(&form) {
                Ok(outcome) => {
                    let kind = match outcome {
                        ImportOutcome::NoValidRows => StatusKind::Error,
                        _ => StatusKind::Info,
                    };
                    self.set_status(outcome.to_string(), kind);
                    return Ok(Mode::Normal);
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.path.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.active == ImportField::Path {
                    form.path.push_char(ch);
                } else if ch == ' ' {
                    form.flip_switch();
                }
            }
            _ => {}
        }
        Ok(Mode::Importing(form))
    }

    fn handle_export(&mut self, code: KeyCode, mut input: TextInput) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Export cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => input.backspace(),
            KeyCode::Enter => match self.export_file(&input) {
                Ok(message) => {
                    self.set_status(message, StatusKind::Info);
                    return Ok(Mode::Normal);
                }
                Err(err) => {
                    let message = surface_error(&err);
                    input.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                input.push_char(ch);
            }
            _ => {}
        }
        Ok(Mode::Exporting(input))
    }

    fn handle_edit_branding(&mut self, code: KeyCode, mut form: BrandingForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                form.apply_to(&mut self.config.branding);
                self.save_config("Title and subtitle saved.");
                return Ok(Mode::Normal);
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::EditingBranding(form))
    }

    fn handle_confirm(&mut self, code: KeyCode, action: ConfirmAction) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.perform(action);
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::Confirming(action)),
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut query: String) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.apply_participant_filter(None);
                Ok(Mode::Normal)
            }
            KeyCode::Enter => Ok(Mode::Normal),
            KeyCode::Backspace => {
                query.pop();
                self.apply_participant_filter(Some(query.clone()));
                Ok(Mode::Searching(query))
            }
            KeyCode::Char(ch) => {
                query.push(ch);
                self.apply_participant_filter(Some(query.clone()));
                Ok(Mode::Searching(query))
            }
            _ => Ok(Mode::Searching(query)),
        }
    }

    fn toggle_draw(&mut self) {
        match self.lottery.phase() {
            DrawPhase::Idle => {
                if self.lottery.start_draw() {
                    self.frame_count = 0;
                    self.set_status("Drawing... press Space to stop.", StatusKind::Info);
                } else if self.lottery.participants().is_empty() {
                    self.set_status("Add participants before drawing.", StatusKind::Error);
                } else {
                    self.set_status(
                        "Everyone has already won. Reset the draw to start over.",
                        StatusKind::Error,
                    );
                }
            }
            DrawPhase::Running => {
                if self.lottery.request_stop() {
                    self.set_status("Stopping...", StatusKind::Info);
                }
            }
            DrawPhase::StopRequested => {}
        }
    }

    fn adjust_winner_count(&mut self, delta: isize) {
        if !self.ensure_idle() {
            return;
        }
        let count = (self.lottery.winner_count() as isize + delta).max(1) as usize;
        self.lottery.set_winner_count(count);
        self.clear_status();
    }

    fn perform(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::RemoveParticipant(name) => {
                if self.lottery.remove_participant(&name) {
                    self.set_status(format!("Removed {name}."), StatusKind::Info);
                } else {
                    self.set_status(format!("{name} is not registered."), StatusKind::Error);
                }
            }
            ConfirmAction::ClearAll => {
                self.lottery.clear_all_participants();
                self.set_status("All participants and history cleared.", StatusKind::Info);
            }
            ConfirmAction::ResetDraw => {
                self.lottery.reset_draw();
                self.set_status("Draw reset. Everyone is eligible again.", StatusKind::Info);
            }
            ConfirmAction::ClearHistory => {
                self.lottery.clear_history();
                self.set_status("Draw history cleared.", StatusKind::Info);
            }
        }
        self.refresh_screen_data();
    }

    fn import_file(&mut self, form: &ImportForm) -> Result<ImportOutcome> {
        let path = form.path.required("File path")?;
        let text = fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?;
        let outcome = self.lottery.import_csv(&text, form.column, form.mode);
        self.refresh_screen_data();
        Ok(outcome)
    }

    fn export_file(&self, input: &TextInput) -> Result<String> {
        let path = input.required("File path")?;
        let csv = self
            .lottery
            .export_csv()
            .ok_or_else(|| anyhow!("There are no participants to export."))?;
        fs::write(&path, csv).with_context(|| format!("failed to write {path}"))?;
        info!("exported participants to {path}");
        Ok(format!(
            "Exported {} participant(s) to {path}.",
            self.lottery.participants().len()
        ))
    }

    fn write_sample(&self) -> Result<PathBuf> {
        let path = PathBuf::from(SAMPLE_FILE_NAME);
        fs::write(&path, sample_csv()).context("failed to write sample CSV")?;
        Ok(path)
    }

    fn save_config(&mut self, success: &str) {
        match self.config.save_to(&self.paths.config()) {
            Ok(()) => self.set_status(success, StatusKind::Info),
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
    }

    fn apply_participant_filter(&mut self, filter: Option<String>) {
        if let Screen::Participants(screen) = &mut self.screen {
            screen.set_filter(filter, self.lottery.participants());
        }
    }

    /// Re-derive screen-local lists after the lottery state changed.
    fn refresh_screen_data(&mut self) {
        match &mut self.screen {
            Screen::Participants(screen) => screen.refresh(self.lottery.participants()),
            Screen::History(screen) => screen.clamp(self.lottery.history().winners().len()),
            Screen::Draw | Screen::Settings => {}
        }
    }

    /// Refuse state changes while a draw is spinning.
    fn ensure_idle(&mut self) -> bool {
        if self.lottery.is_drawing() {
            self.set_status("Stop the current draw first.", StatusKind::Error);
            false
        } else {
            true
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Draw => self.draw_main(frame, content_area),
            Screen::Participants(screen) => self.draw_participants(frame, content_area, screen),
            Screen::History(screen) => self.draw_history(frame, content_area, screen),
            Screen::Settings => self.draw_settings(frame, content_area),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingParticipant(input) => {
                self.draw_text_input(frame, area, "Add Participant", "Name", input)
            }
            Mode::Importing(form) => self.draw_import_form(frame, area, form),
            Mode::Exporting(input) => self.draw_text_input(frame, area, "Export CSV", "Path", input),
            Mode::EditingBranding(form) => self.draw_branding_form(frame, area, form),
            Mode::Confirming(action) => self.draw_confirm(frame, area, action),
            Mode::Searching(query) => self.draw_search_bar(frame, area, query),
            Mode::Normal => {}
        }
    }

    fn draw_main(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(7),
                Constraint::Length(2),
                Constraint::Length(7),
            ])
            .split(area);

        let header = Paragraph::new(vec![
            Line::from(Span::styled(
                self.config.branding.title.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                self.config.branding.subtitle.clone(),
                Style::default().fg(Color::Gray),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(header, chunks[0]);

        let drawing = self.lottery.is_drawing();
        let panel_title = match self.lottery.phase() {
            DrawPhase::Idle if !self.lottery.latest_winners().is_empty() => "Winner",
            DrawPhase::Idle => "Draw",
            DrawPhase::Running => "Drawing...",
            DrawPhase::StopRequested => "Stopping...",
        };
        let mut block = Block::default().borders(Borders::ALL).title(panel_title);
        if drawing {
            block = block.style(Style::default().fg(Color::Yellow));
        }
        let panel_area = chunks[1];
        match self.lottery.current_candidate() {
            Some(name) => {
                let pattern = if drawing {
                    DRAW_ART[self.frame_count % DRAW_ART.len()]
                } else {
                    DRAW_ART[0]
                };
                let lines = build_draw_panel_lines(
                    Some(name),
                    pattern,
                    panel_area.width.saturating_sub(2),
                    panel_area.height.saturating_sub(2),
                    !drawing,
                );
                frame.render_widget(Paragraph::new(lines).block(block), panel_area);
            }
            None => {
                let message = Paragraph::new("Press Space to start a draw.")
                    .alignment(Alignment::Center)
                    .block(block);
                frame.render_widget(message, panel_area);
            }
        }

        let state = self.lottery.state();
        let info = Paragraph::new(Line::from(format!(
            "Eligible: {} of {}   Winners per draw: {}   Sessions: {}",
            state.available().len(),
            state.registry.len(),
            self.lottery.winner_count(),
            state.history.sessions().len()
        )))
        .alignment(Alignment::Center);
        frame.render_widget(info, chunks[2]);

        let latest: Vec<Line> = self
            .lottery
            .latest_winners()
            .iter()
            .enumerate()
            .map(|(idx, name)| Line::from(format!("{}. {name}", idx + 1)))
            .collect();
        let latest = Paragraph::new(latest)
            .block(Block::default().borders(Borders::ALL).title("Latest Winners"))
            .wrap(Wrap { trim: true });
        frame.render_widget(latest, chunks[3]);
    }

    fn draw_participants(&self, frame: &mut Frame, area: Rect, screen: &ParticipantScreen) {
        let state = self.lottery.state();
        let mut title = format!(
            "Participants ({} total, {} eligible)",
            state.registry.len(),
            state.available().len()
        );
        if let Some(filter) = screen.filter.as_deref().filter(|f| !f.is_empty()) {
            title.push_str(&format!(" - filter: {filter}"));
        }
        let block = Block::default().borders(Borders::ALL).title(title);

        if screen.filtered.is_empty() {
            let text = if state.registry.is_empty() {
                "No participants yet. Press 'a' to add one or 'i' to import a CSV file."
            } else {
                "No participants match the filter."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = screen
            .filtered
            .iter()
            .map(|name| {
                let mut spans = vec![Span::raw(name.clone())];
                if state.history.has_won(name) {
                    spans.push(Span::styled("  (won)", Style::default().fg(Color::Green)));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut list_state = ListState::default();
        list_state.select(Some(screen.selected));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn draw_history(&self, frame: &mut Frame, area: Rect, screen: &HistoryScreen) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(area);

        let history = self.lottery.history();
        let mut lines = Vec::new();
        for session in self.lottery.sessions_newest_first() {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("Session #{}", session.session_id),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {}", session.display_timestamp()),
                    Style::default().fg(Color::Gray),
                ),
            ]));
            for (idx, name) in session.winners.iter().enumerate() {
                lines.push(Line::from(format!("   {}. {name}", idx + 1)));
            }
            lines.push(Line::from(""));
        }
        if lines.is_empty() {
            lines.push(Line::from("No draws recorded yet."));
        }
        let sessions = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Draw History ({})", history.sessions().len())),
            )
            .wrap(Wrap { trim: false })
            .scroll((screen.scroll, 0));
        frame.render_widget(sessions, chunks[0]);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Winners ({})", history.winners().len()));
        let items: Vec<ListItem> = history
            .winners()
            .iter()
            .map(|name| ListItem::new(name.clone()))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("> ");
        let mut list_state = ListState::default();
        if !history.winners().is_empty() {
            list_state.select(Some(screen.selected_winner));
        }
        frame.render_stateful_widget(list, chunks[1], &mut list_state);
    }

    fn draw_settings(&self, frame: &mut Frame, area: Rect) {
        let label = Style::default().fg(Color::Gray);
        let column = if self.config.import_column == FILE_COLUMN {
            "1 (participant file)"
        } else {
            "2 (spreadsheet export)"
        };
        let rows = [
            ("Title", self.config.branding.title.clone()),
            ("Subtitle", self.config.branding.subtitle.clone()),
            (
                "Default winners per draw",
                self.config.default_winner_count.to_string(),
            ),
            ("Import column", column.to_string()),
            (
                "Animation tick",
                format!("{} ms", self.config.tick_interval_ms),
            ),
            ("Data directory", self.paths.root().display().to_string()),
            ("Log file", self.paths.log_file().display().to_string()),
        ];
        let lines: Vec<Line> = rows
            .into_iter()
            .map(|(name, value)| {
                Line::from(vec![
                    Span::styled(format!("{name:<26}"), label),
                    Span::raw(value),
                ])
            })
            .collect();
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Settings"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let hints: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::Confirming(_)) => &[("[y]", "Confirm"), ("[n/Esc]", "Cancel")],
            (_, Mode::Searching(_)) => &[("[Enter]", "Keep Filter"), ("[Esc]", "Clear")],
            (_, Mode::Importing(_)) => &[
                ("[Tab]", "Next Field"),
                ("[Space/←→]", "Switch"),
                ("[Enter]", "Import"),
                ("[Esc]", "Cancel"),
            ],
            (_, Mode::AddingParticipant(_))
            | (_, Mode::Exporting(_))
            | (_, Mode::EditingBranding(_)) => &[("[Enter]", "Save"), ("[Esc]", "Close")],
            (Screen::Draw, Mode::Normal) => {
                if self.lottery.is_drawing() {
                    &[("[Space]", "Stop"), ("[q]", "Quit")]
                } else {
                    &[
                        ("[Space]", "Draw"),
                        ("[+/-]", "Winners"),
                        ("[r]", "Reset"),
                        ("[2]", "Participants"),
                        ("[3]", "History"),
                        ("[4]", "Settings"),
                        ("[q]", "Quit"),
                    ]
                }
            }
            (Screen::Participants(_), Mode::Normal) => &[
                ("[a]", "Add"),
                ("[d]", "Remove"),
                ("[f]", "Filter"),
                ("[i]", "Import"),
                ("[e]", "Export"),
                ("[s]", "Sample"),
                ("[C]", "Clear All"),
                ("[Esc]", "Back"),
            ],
            (Screen::History(_), Mode::Normal) => &[
                ("[↑↓]", "Select"),
                ("[x]", "Re-enable Winner"),
                ("[PgUp/PgDn]", "Scroll"),
                ("[c]", "Clear History"),
                ("[Esc]", "Back"),
            ],
            (Screen::Settings, Mode::Normal) => &[
                ("[e]", "Edit Title"),
                ("[r]", "Reset Title"),
                ("[+/-]", "Default Winners"),
                ("[c]", "Import Column"),
                ("[Esc]", "Back"),
            ],
        };

        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let mut spans = Vec::with_capacity(hints.len() * 2);
        for (key, label) in hints {
            spans.push(Span::styled(key.to_string(), key_style));
            spans.push(Span::raw(format!(" {label}   ")));
        }
        Line::from(spans)
    }

    fn draw_text_input(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        field_name: &str,
        input: &TextInput,
    ) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![input.build_line(field_name, true), Line::from("")];
        lines.push(hint_or_error(
            input.error.as_deref(),
            "Enter to save • Esc to close",
        ));

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let prefix = format!("{field_name}: ").len() as u16;
        frame.set_cursor_position((inner.x + prefix + input.value_len() as u16, inner.y));
    }

    fn draw_import_form(&self, frame: &mut Frame, area: Rect, form: &ImportForm) {
        let popup_area = centered_rect(70, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Import CSV").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            form.path
                .build_line("File", form.active == ImportField::Path),
            form.column_line(),
            form.mode_line(),
            Line::from(""),
            hint_or_error(
                form.path.error.as_deref(),
                "The first row is treated as a header and skipped.",
            ),
        ];
        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        if form.active == ImportField::Path {
            let prefix = "File: ".len() as u16;
            frame.set_cursor_position((inner.x + prefix + form.path.value_len() as u16, inner.y));
        }
    }

    fn draw_branding_form(&self, frame: &mut Frame, area: Rect, form: &BrandingForm) {
        let popup_area = centered_rect(70, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Edit Branding").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            form.build_line("Title", BrandingField::Title),
            form.build_line("Subtitle", BrandingField::Subtitle),
            Line::from(""),
            hint_or_error(
                form.error.as_deref(),
                "Enter to save • Tab to switch • blank restores the default",
            ),
        ];
        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (prefix, row) = match form.active {
            BrandingField::Title => ("Title: ".len() as u16, 0),
            BrandingField::Subtitle => ("Subtitle: ".len() as u16, 1),
        };
        frame.set_cursor_position((
            inner.x + prefix + form.value_len(form.active) as u16,
            inner.y + row,
        ));
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect, action: &ConfirmAction) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(action.title()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(action.prompt()),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, query: &str) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Filter");
        let paragraph = Paragraph::new(Span::raw(format!("Filter: {query}")))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Filter: ".len() as u16 + query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }
}

fn hint_or_error(error: Option<&str>, hint: &str) -> Line<'static> {
    match error {
        Some(error) => Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(Color::Gray),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lottery::random::{FixedClock, SeededRandom};
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn app_with(names: &[&str]) -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut lottery = Lottery::load(
            Box::new(MemoryStore::new()),
            Box::new(SeededRandom::new(99)),
            Box::new(FixedClock(Utc.with_ymd_and_hms(2024, 8, 17, 9, 0, 0).unwrap())),
        );
        for name in names {
            lottery.add_participant(name);
        }
        let paths = DataPaths::resolve(Some(dir.path().to_path_buf())).unwrap();
        (App::new(lottery, AppConfig::default(), paths), dir)
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn render(app: &App) {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
    }

    #[test]
    fn space_starts_and_stops_a_draw() {
        let (mut app, _dir) = app_with(&["A", "B", "C"]);
        app.handle_key(KeyCode::Char('+')).unwrap();
        app.handle_key(KeyCode::Char(' ')).unwrap();
        assert_eq!(app.lottery().phase(), DrawPhase::Running);
        app.on_tick();
        render(&app);

        app.handle_key(KeyCode::Char(' ')).unwrap();
        assert_eq!(app.lottery().phase(), DrawPhase::StopRequested);
        app.on_tick();
        assert_eq!(app.lottery().phase(), DrawPhase::Idle);
        assert_eq!(app.lottery().latest_winners().len(), 2);
        assert_eq!(app.lottery().history().sessions().len(), 1);
        render(&app);
    }

    #[test]
    fn participants_can_be_added_and_removed_from_the_list_screen() {
        let (mut app, _dir) = app_with(&[]);
        app.handle_key(KeyCode::Char('2')).unwrap();
        app.handle_key(KeyCode::Char('a')).unwrap();
        type_text(&mut app, "Ana");
        app.handle_key(KeyCode::Enter).unwrap();
        type_text(&mut app, "Ana");
        app.handle_key(KeyCode::Enter).unwrap();
        app.handle_key(KeyCode::Esc).unwrap();
        assert_eq!(app.lottery().participants(), ["Ana"]);
        render(&app);

        app.handle_key(KeyCode::Char('d')).unwrap();
        app.handle_key(KeyCode::Char('y')).unwrap();
        assert!(app.lottery().participants().is_empty());
        render(&app);
    }

    #[test]
    fn registry_edits_are_blocked_while_drawing() {
        let (mut app, _dir) = app_with(&["A", "B"]);
        app.handle_key(KeyCode::Char(' ')).unwrap();
        app.handle_key(KeyCode::Char('2')).unwrap();
        app.handle_key(KeyCode::Char('a')).unwrap();
        assert!(matches!(app.mode, Mode::Normal));
        app.handle_key(KeyCode::Char('C')).unwrap();
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.lottery().participants().len(), 2);
    }

    #[test]
    fn import_and_export_go_through_files() {
        let (mut app, dir) = app_with(&["Ana"]);
        let source = dir.path().join("in.csv");
        fs::write(&source, "Nama Peserta\n\"Bob\"\n\"Ana\"\n").unwrap();

        app.handle_key(KeyCode::Char('2')).unwrap();
        app.handle_key(KeyCode::Char('i')).unwrap();
        type_text(&mut app, &source.display().to_string());
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.lottery().participants(), ["Ana", "Bob"]);

        let target = dir.path().join("out.csv");
        app.handle_key(KeyCode::Char('e')).unwrap();
        if let Mode::Exporting(input) = &mut app.mode {
            input.value = target.display().to_string();
        }
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "Nama Peserta\n\"Ana\"\n\"Bob\""
        );
    }

    #[test]
    fn missing_import_file_keeps_the_dialog_open() {
        let (mut app, dir) = app_with(&[]);
        app.handle_key(KeyCode::Char('2')).unwrap();
        app.handle_key(KeyCode::Char('i')).unwrap();
        type_text(&mut app, &dir.path().join("nope.csv").display().to_string());
        app.handle_key(KeyCode::Enter).unwrap();
        let Mode::Importing(form) = &app.mode else {
            panic!("import dialog should stay open");
        };
        assert!(form.path.error.is_some());
        render(&app);
    }

    #[test]
    fn history_screen_re_enables_a_winner() {
        let (mut app, _dir) = app_with(&["A"]);
        app.handle_key(KeyCode::Char(' ')).unwrap();
        app.handle_key(KeyCode::Char(' ')).unwrap();
        app.on_tick();
        assert!(app.lottery().available().is_empty());

        app.handle_key(KeyCode::Char('3')).unwrap();
        render(&app);
        app.handle_key(KeyCode::Char('x')).unwrap();
        assert_eq!(app.lottery().available(), ["A"]);
        assert_eq!(app.lottery().history().sessions().len(), 1);
    }

    #[test]
    fn branding_edits_are_saved_to_config() {
        let (mut app, dir) = app_with(&[]);
        app.handle_key(KeyCode::Char('4')).unwrap();
        app.handle_key(KeyCode::Char('e')).unwrap();
        if let Mode::EditingBranding(form) = &mut app.mode {
            form.title.clear();
        }
        type_text(&mut app, "Door Prize");
        app.handle_key(KeyCode::Enter).unwrap();
        render(&app);

        let saved = AppConfig::load_from(&dir.path().join("config.json"));
        assert_eq!(saved.branding.title, "Door Prize");
    }
}
