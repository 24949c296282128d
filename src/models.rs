//! Plain data types shared by the draw core, the store and the TUI. They stay
//! light-weight holders so the other layers can focus on draw semantics and
//! persistence.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title shown when the operator has not customised it.
pub const DEFAULT_TITLE: &str = "Undian Berhadiah";
/// Subtitle shown when the operator has not customised it.
pub const DEFAULT_SUBTITLE: &str = "Kelola peserta dan lakukan undian berhadiah!";

/// One immutable record of a completed draw.
///
/// Field names are serialised in camelCase so the stored JSON keeps the
/// `{sessionId, winners, timestamp}` shape of the persisted schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawSession {
    /// Monotonic identifier, starting at 1 and never reused.
    pub session_id: u64,
    /// Winners in the order they were drawn. Never empty.
    pub winners: Vec<String>,
    /// Completion instant, stored as an ISO-8601 string.
    pub timestamp: DateTime<Utc>,
}

impl DrawSession {
    /// Local-time rendering used by the history screen and the CLI listing.
    pub fn display_timestamp(&self) -> String {
        self.timestamp
            .with_timezone(&chrono::Local)
            .format("%d %b %Y %H:%M")
            .to_string()
    }
}

impl fmt::Display for DrawSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sesi #{} ({}): {}",
            self.session_id,
            self.display_timestamp(),
            self.winners.join(", ")
        )
    }
}

/// Textual branding rendered above the draw panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branding {
    pub title: String,
    pub subtitle: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            subtitle: DEFAULT_SUBTITLE.to_string(),
        }
    }
}

impl Branding {
    /// Replace the title, falling back to the default when the input is blank.
    pub fn update_title(&mut self, title: &str) {
        let trimmed = title.trim();
        self.title = if trimmed.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            trimmed.to_string()
        };
    }

    /// Replace the subtitle, falling back to the default when the input is
    /// blank.
    pub fn update_subtitle(&mut self, subtitle: &str) {
        let trimmed = subtitle.trim();
        self.subtitle = if trimmed.is_empty() {
            DEFAULT_SUBTITLE.to_string()
        } else {
            trimmed.to_string()
        };
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn session_serialises_with_camel_case_keys() {
        let session = DrawSession {
            session_id: 3,
            winners: vec!["Ana".to_string()],
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        };
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("\"sessionId\":3"));
        assert!(json.contains("\"timestamp\":\"2024-05-01T12:30:00Z\""));

        let parsed: DrawSession = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, session);
    }

    #[test]
    fn blank_branding_falls_back_to_defaults() {
        let mut branding = Branding::default();
        branding.update_title("  Grand Prize  ");
        branding.update_subtitle("Spin it");
        assert_eq!(branding.title, "Grand Prize");
        assert_eq!(branding.subtitle, "Spin it");

        branding.update_title("   ");
        assert_eq!(branding.title, DEFAULT_TITLE);

        branding.reset();
        assert_eq!(branding, Branding::default());
    }
}
