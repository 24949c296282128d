use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Repeat a short ASCII motif until it fills the requested width.
pub(crate) fn repeat_pattern_row(row: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    if row.is_empty() {
        return " ".repeat(width);
    }
    let repeat_count = width / row.len() + 2;
    let mut repeated = row.repeat(repeat_count);
    repeated.truncate(width);
    repeated
}

/// Center `label` inside `>> <<` markers, padded to exactly `width` columns.
pub(crate) fn centered_label(label: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return " ".repeat(width);
    }
    let mut decorated: String = format!(">> {trimmed} <<").chars().take(width).collect();
    let used = decorated.chars().count();
    let padding = width - used;
    let left = padding / 2;
    let right = padding - left;
    decorated.insert_str(0, &" ".repeat(left));
    decorated.push_str(&" ".repeat(right));
    decorated
}

/// Build the draw panel: pattern rows above and below a centered name. The
/// name is bold and yellow once a draw has been finalized.
pub(crate) fn build_draw_panel_lines(
    name: Option<&str>,
    pattern: &[&str],
    inner_width: u16,
    inner_height: u16,
    settled: bool,
) -> Vec<Line<'static>> {
    let width = inner_width as usize;
    let height = inner_height as usize;
    if width == 0 || height == 0 {
        return vec![Line::from("")];
    }

    let pattern_style = Style::default().fg(Color::DarkGray);
    let pattern_line = |row_idx: usize| {
        let row = if pattern.is_empty() {
            " ".repeat(width)
        } else {
            repeat_pattern_row(pattern[row_idx % pattern.len()], width)
        };
        Line::from(vec![Span::styled(row, pattern_style)])
    };

    let label = centered_label(name.unwrap_or("?"), width);
    let label_style = if settled {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let label_row = height / 2;
    (0..height)
        .map(|row_idx| {
            if row_idx == label_row {
                Line::from(vec![Span::styled(label.clone(), label_style)])
            } else {
                pattern_line(row_idx)
            }
        })
        .collect()
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};

    #[test]
    fn pattern_rows_fill_the_width() {
        assert_eq!(repeat_pattern_row("ab", 5), "ababa");
        assert_eq!(repeat_pattern_row("", 3), "   ");
        assert_eq!(repeat_pattern_row("ab", 0), "");
    }

    #[test]
    fn label_is_centered_and_padded() {
        assert_eq!(centered_label("Ana", 13), "  >> Ana <<  ");
        assert_eq!(centered_label("Ana", 10), ">> Ana << ");
        assert_eq!(centered_label("Ana", 4), ">> A");
        assert_eq!(centered_label("  ", 3), "   ");
    }

    #[test]
    fn panel_puts_the_name_in_the_middle_row() {
        let lines = build_draw_panel_lines(Some("Ana"), &["*+"], 11, 5, false);
        assert_eq!(lines.len(), 5);
        let middle: String = lines[2].spans.iter().map(|s| s.content.to_string()).collect();
        assert_eq!(middle.trim(), ">> Ana <<");
        let top: String = lines[0].spans.iter().map(|s| s.content.to_string()).collect();
        assert_eq!(top, "*+*+*+*+*+*");
    }

    #[test]
    fn surface_error_prefers_root_cause() {
        let err = Err::<(), _>(anyhow!("disk full"))
            .context("failed to write export")
            .unwrap_err();
        assert_eq!(surface_error(&err), "disk full");
    }
}
