/// Participant list with an optional case-insensitive filter.
pub(crate) struct ParticipantScreen {
    pub(crate) filtered: Vec<String>,
    pub(crate) filter: Option<String>,
    pub(crate) selected: usize,
}

impl ParticipantScreen {
    pub(crate) fn new(names: &[String]) -> Self {
        let mut screen = Self {
            filtered: Vec::new(),
            filter: None,
            selected: 0,
        };
        screen.refresh(names);
        screen
    }

    /// Recompute the visible rows from the registry, keeping the selection in
    /// bounds.
    pub(crate) fn refresh(&mut self, names: &[String]) {
        self.filtered = match &self.filter {
            Some(query) if !query.trim().is_empty() => {
                let query = query.to_lowercase();
                names
                    .iter()
                    .filter(|name| name.to_lowercase().contains(&query))
                    .cloned()
                    .collect()
            }
            _ => names.to_vec(),
        };
        self.ensure_in_bounds();
    }

    pub(crate) fn set_filter(&mut self, filter: Option<String>, names: &[String]) {
        self.filter = filter;
        self.selected = 0;
        self.refresh(names);
    }

    pub(crate) fn current(&self) -> Option<&String> {
        self.filtered.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = clamp_offset(self.selected, offset, self.filtered.len());
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.filtered.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.filtered.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.filtered.len() {
            self.selected = self.filtered.len() - 1;
        }
    }
}

/// History view: a scrollable session list next to the selectable winner set.
#[derive(Default)]
pub(crate) struct HistoryScreen {
    pub(crate) selected_winner: usize,
    pub(crate) scroll: u16,
}

impl HistoryScreen {
    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        self.selected_winner = clamp_offset(self.selected_winner, offset, len);
    }

    pub(crate) fn scroll_by(&mut self, offset: i32) {
        self.scroll = (self.scroll as i32 + offset).max(0) as u16;
    }

    /// Keep the selection valid after the winner set shrinks.
    pub(crate) fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.selected_winner = 0;
        } else if self.selected_winner >= len {
            self.selected_winner = len - 1;
        }
    }
}

fn clamp_offset(current: usize, offset: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let moved = current as isize + offset;
    moved.clamp(0, len as isize - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn filter_is_case_insensitive_and_resets_selection() {
        let all = names(&["Ana", "Bob", "banu", "Cy"]);
        let mut screen = ParticipantScreen::new(&all);
        screen.move_selection(3);
        assert_eq!(screen.current().map(String::as_str), Some("Cy"));

        screen.set_filter(Some("B".to_string()), &all);
        assert_eq!(screen.filtered, names(&["Bob", "banu"]));
        assert_eq!(screen.selected, 0);

        screen.set_filter(None, &all);
        assert_eq!(screen.filtered.len(), 4);
    }

    #[test]
    fn selection_stays_in_bounds_after_removal() {
        let mut screen = ParticipantScreen::new(&names(&["A", "B", "C"]));
        screen.select_last();
        screen.refresh(&names(&["A", "B"]));
        assert_eq!(screen.selected, 1);
        screen.move_selection(-10);
        assert_eq!(screen.selected, 0);
        screen.refresh(&[]);
        assert_eq!(screen.current(), None);
    }

    #[test]
    fn history_scroll_never_goes_negative() {
        let mut screen = HistoryScreen::default();
        screen.scroll_by(-3);
        assert_eq!(screen.scroll, 0);
        screen.scroll_by(5);
        assert_eq!(screen.scroll, 5);
        screen.move_selection(4, 3);
        assert_eq!(screen.selected_winner, 2);
        screen.clamp(1);
        assert_eq!(screen.selected_winner, 0);
    }
}
