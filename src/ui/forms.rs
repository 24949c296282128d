use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::csv::{FILE_COLUMN, SPREADSHEET_COLUMN};
use crate::lottery::ImportMode;
use crate::models::Branding;

/// Single-line text entry used for participant names and file paths.
#[derive(Default, Clone)]
pub(crate) struct TextInput {
    pub(crate) value: String,
    pub(crate) error: Option<String>,
}

impl TextInput {
    pub(crate) fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            error: None,
        }
    }

    /// Append a printable character.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value.push(ch);
        self.error = None;
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }

    /// Trimmed value, or an error naming the missing field.
    pub(crate) fn required(&self, field_name: &str) -> Result<String> {
        let value = self.value.trim();
        if value.is_empty() {
            return Err(anyhow!("{field_name} is required."));
        }
        Ok(value.to_string())
    }

    pub(crate) fn build_line(&self, field_name: &str, active: bool) -> Line<'static> {
        field_line(field_name, &self.value, active, "<required>")
    }

    pub(crate) fn value_len(&self) -> usize {
        self.value.chars().count()
    }
}

/// Fields available within the branding form.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum BrandingField {
    Title,
    Subtitle,
}

impl Default for BrandingField {
    fn default() -> Self {
        BrandingField::Title
    }
}

/// Editable copy of the title and subtitle.
#[derive(Default, Clone)]
pub(crate) struct BrandingForm {
    pub(crate) title: String,
    pub(crate) subtitle: String,
    pub(crate) active: BrandingField,
    pub(crate) error: Option<String>,
}

impl BrandingForm {
    pub(crate) fn from_branding(branding: &Branding) -> Self {
        Self {
            title: branding.title.clone(),
            subtitle: branding.subtitle.clone(),
            active: BrandingField::Title,
            error: None,
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            BrandingField::Title => BrandingField::Subtitle,
            BrandingField::Subtitle => BrandingField::Title,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            BrandingField::Title => self.title.push(ch),
            BrandingField::Subtitle => self.subtitle.push(ch),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            BrandingField::Title => {
                self.title.pop();
            }
            BrandingField::Subtitle => {
                self.subtitle.pop();
            }
        }
    }

    /// Apply the form to `branding`; blank fields fall back to the defaults.
    pub(crate) fn apply_to(&self, branding: &mut Branding) {
        branding.update_title(&self.title);
        branding.update_subtitle(&self.subtitle);
    }

    pub(crate) fn build_line(&self, field_name: &str, field: BrandingField) -> Line<'static> {
        let value = match field {
            BrandingField::Title => &self.title,
            BrandingField::Subtitle => &self.subtitle,
        };
        field_line(field_name, value, self.active == field, "<default>")
    }

    pub(crate) fn value_len(&self, field: BrandingField) -> usize {
        match field {
            BrandingField::Title => self.title.chars().count(),
            BrandingField::Subtitle => self.subtitle.chars().count(),
        }
    }
}

/// Focus targets within the import dialog.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum ImportField {
    Path,
    Column,
    Mode,
}

/// File path plus the two import switches.
#[derive(Clone)]
pub(crate) struct ImportForm {
    pub(crate) path: TextInput,
    pub(crate) column: usize,
    pub(crate) mode: ImportMode,
    pub(crate) active: ImportField,
}

impl ImportForm {
    pub(crate) fn new(column: usize) -> Self {
        Self {
            path: TextInput::default(),
            column,
            mode: ImportMode::Merge,
            active: ImportField::Path,
        }
    }

    /// Cycle focus Path → Column → Mode.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            ImportField::Path => ImportField::Column,
            ImportField::Column => ImportField::Mode,
            ImportField::Mode => ImportField::Path,
        };
    }

    /// Flip the focused switch. Returns `false` when the path has focus.
    pub(crate) fn flip_switch(&mut self) -> bool {
        match self.active {
            ImportField::Path => false,
            ImportField::Column => {
                self.column = if self.column == FILE_COLUMN {
                    SPREADSHEET_COLUMN
                } else {
                    FILE_COLUMN
                };
                true
            }
            ImportField::Mode => {
                self.mode = match self.mode {
                    ImportMode::Merge => ImportMode::Replace,
                    ImportMode::Replace => ImportMode::Merge,
                };
                true
            }
        }
    }

    pub(crate) fn column_line(&self) -> Line<'static> {
        let label = if self.column == FILE_COLUMN {
            "1 (participant file)"
        } else {
            "2 (spreadsheet export)"
        };
        field_line("Column", label, self.active == ImportField::Column, "")
    }

    pub(crate) fn mode_line(&self) -> Line<'static> {
        let label = match self.mode {
            ImportMode::Merge => "add new names",
            ImportMode::Replace => "replace the list",
        };
        field_line("Mode", label, self.active == ImportField::Mode, "")
    }
}

/// Destructive actions that need a y/n confirmation.
#[derive(Clone, PartialEq, Eq)]
pub(crate) enum ConfirmAction {
    RemoveParticipant(String),
    ClearAll,
    ResetDraw,
    ClearHistory,
}

impl ConfirmAction {
    pub(crate) fn title(&self) -> &'static str {
        match self {
            ConfirmAction::RemoveParticipant(_) => "Remove Participant",
            ConfirmAction::ClearAll => "Clear Everything",
            ConfirmAction::ResetDraw => "Reset Draw",
            ConfirmAction::ClearHistory => "Clear History",
        }
    }

    pub(crate) fn prompt(&self) -> String {
        match self {
            ConfirmAction::RemoveParticipant(name) => {
                format!("Remove {name} from the participant list?")
            }
            ConfirmAction::ClearAll => {
                "Delete all participants, winners and draw history?".to_string()
            }
            ConfirmAction::ResetDraw => {
                "Forget all winners and draw sessions? Participants are kept.".to_string()
            }
            ConfirmAction::ClearHistory => "Delete the whole draw history?".to_string(),
        }
    }
}

/// Shared `Label: value` rendering with focus and placeholder styling.
fn field_line(field_name: &str, value: &str, is_active: bool, placeholder: &str) -> Line<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{field_name}: ")),
        Span::styled(display, style),
    ])
}
