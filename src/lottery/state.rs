use std::fmt;

use log::{debug, error, info};

use crate::csv::{export_participants, parse_participants};
use crate::error::LotteryError;
use crate::models::DrawSession;
use crate::store::{clear_state, load_state, save_state, KeyValueStore};

use super::engine::{DrawPhase, TickOutcome, WinnerSelectionEngine};
use super::history::DrawSessionLog;
use super::random::{Clock, RandomSource};
use super::registry::ParticipantRegistry;

/// The two durable aggregates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LotteryState {
    pub registry: ParticipantRegistry,
    pub history: DrawSessionLog,
}

impl LotteryState {
    /// Registered names that have not won yet, in registry order.
    pub fn available(&self) -> Vec<String> {
        self.registry
            .names()
            .iter()
            .filter(|name| !self.history.has_won(name))
            .cloned()
            .collect()
    }

    /// Drop winners that are no longer registered. Past sessions keep their
    /// names. Returns how many were dropped.
    pub fn prune_winners(&mut self) -> usize {
        let stale: Vec<String> = self
            .history
            .winners()
            .iter()
            .filter(|name| !self.registry.contains(name))
            .cloned()
            .collect();
        for name in &stale {
            self.history.remove_winner(name);
        }
        stale.len()
    }
}

/// How imported names are applied to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Append names that are not registered yet.
    Merge,
    /// Install the parsed list in place of the current registry.
    Replace,
}

/// Result of an import, phrased for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Added(usize),
    Replaced(usize),
    NothingNew,
    NoValidRows,
}

impl fmt::Display for ImportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportOutcome::Added(count) => write!(f, "Imported {count} new participant(s)."),
            ImportOutcome::Replaced(count) => {
                write!(f, "Replaced the list with {count} participant(s).")
            }
            ImportOutcome::NothingNew => write!(f, "No new participants to import."),
            ImportOutcome::NoValidRows => write!(f, "No valid participant names found."),
        }
    }
}

/// Owns the raffle state and its collaborators. Every mutation goes through
/// here so persistence is flushed exactly once per change.
pub struct Lottery {
    state: LotteryState,
    engine: WinnerSelectionEngine,
    store: Box<dyn KeyValueStore>,
    rng: Box<dyn RandomSource>,
    clock: Box<dyn Clock>,
    winner_count: usize,
    latest_winners: Vec<String>,
}

impl Lottery {
    /// Restore stored state from `store`. The draw engine always starts idle.
    pub fn load(
        store: Box<dyn KeyValueStore>,
        rng: Box<dyn RandomSource>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let state = load_state(store.as_ref());
        info!(
            "raffle loaded: {} participants, {} sessions",
            state.registry.len(),
            state.history.sessions().len()
        );
        Self {
            state,
            engine: WinnerSelectionEngine::default(),
            store,
            rng,
            clock,
            winner_count: 1,
            latest_winners: Vec::new(),
        }
    }

    pub fn state(&self) -> &LotteryState {
        &self.state
    }

    pub fn participants(&self) -> &[String] {
        self.state.registry.names()
    }

    pub fn history(&self) -> &DrawSessionLog {
        &self.state.history
    }

    pub fn available(&self) -> Vec<String> {
        self.state.available()
    }

    pub fn add_participant(&mut self, name: &str) -> bool {
        if !self.state.registry.add(name) {
            debug!("{}", LotteryError::Validation(name.to_string()));
            return false;
        }
        self.flush();
        true
    }

    /// Delete `name` from the registry and the winner set. Past sessions keep
    /// listing it.
    pub fn remove_participant(&mut self, name: &str) -> bool {
        let removed = self.state.registry.remove(name);
        let was_winner = self.state.history.remove_winner(name);
        if removed || was_winner {
            self.flush();
        }
        removed
    }

    pub fn replace_participants<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.state.registry.replace_all(names);
        self.state.prune_winners();
        self.flush();
    }

    /// Parse `text` and apply it. Bad rows are skipped, never fatal.
    pub fn import_csv(&mut self, text: &str, column: usize, mode: ImportMode) -> ImportOutcome {
        let parsed = parse_participants(text, column);
        if !parsed.skipped.is_empty() {
            info!("{} CSV row(s) skipped during import", parsed.skipped.len());
        }
        if parsed.names.is_empty() {
            return ImportOutcome::NoValidRows;
        }

        let outcome = match mode {
            ImportMode::Merge => {
                let added = parsed
                    .names
                    .iter()
                    .filter(|name| self.state.registry.add(name))
                    .count();
                if added == 0 {
                    return ImportOutcome::NothingNew;
                }
                ImportOutcome::Added(added)
            }
            ImportMode::Replace => {
                self.state.registry.replace_all(&parsed.names);
                self.state.prune_winners();
                ImportOutcome::Replaced(self.state.registry.len())
            }
        };
        self.flush();
        info!("{outcome}");
        outcome
    }

    /// CSV rendering of the registry, or `None` when there is nothing to
    /// export.
    pub fn export_csv(&self) -> Option<String> {
        if self.state.registry.is_empty() {
            None
        } else {
            Some(export_participants(self.state.registry.names()))
        }
    }

    /// Full reset: registry, winners, history and every stored key.
    pub fn clear_all_participants(&mut self) {
        self.state.registry.clear();
        self.state.history.clear();
        self.engine.reset();
        self.latest_winners.clear();
        if let Err(err) = clear_state(self.store.as_ref()) {
            error!("{}", LotteryError::Persistence(err));
        }
        info!("all participants and history cleared");
    }

    /// Forget every winner and session; the registry is untouched.
    pub fn reset_draw(&mut self) {
        self.state.history.clear();
        self.engine.reset();
        self.latest_winners.clear();
        self.flush();
        info!("draw reset");
    }

    /// History-screen variant of [`Lottery::reset_draw`].
    pub fn clear_history(&mut self) {
        self.reset_draw();
    }

    /// Make a past winner eligible again.
    pub fn remove_winner(&mut self, name: &str) -> bool {
        if !self.state.history.remove_winner(name) {
            return false;
        }
        self.latest_winners.retain(|winner| winner != name);
        self.flush();
        true
    }

    pub fn winner_count(&self) -> usize {
        self.winner_count
    }

    /// Requested winners per draw, never below one.
    pub fn set_winner_count(&mut self, count: usize) {
        self.winner_count = count.max(1);
    }

    /// Start a draw for the configured winner count.
    pub fn start_draw(&mut self) -> bool {
        let available = self.state.available();
        let started = self
            .engine
            .start_draw(available, self.winner_count, self.rng.as_mut());
        if started {
            self.latest_winners.clear();
        }
        started
    }

    pub fn request_stop(&mut self) -> bool {
        self.engine.request_stop()
    }

    /// Drive one animation step; call on every timer tick.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.engine.tick(
            &mut self.state.history,
            self.rng.as_mut(),
            self.clock.as_ref(),
        );
        if let TickOutcome::Finalized(session) = &outcome {
            self.latest_winners = session.winners.clone();
            self.flush();
        }
        outcome
    }

    pub fn phase(&self) -> DrawPhase {
        self.engine.phase()
    }

    pub fn is_drawing(&self) -> bool {
        self.engine.is_active()
    }

    pub fn current_candidate(&self) -> Option<&str> {
        self.engine.current()
    }

    pub fn latest_winners(&self) -> &[String] {
        &self.latest_winners
    }

    /// Newest-first history.
    pub fn sessions_newest_first(&self) -> impl Iterator<Item = &DrawSession> + '_ {
        self.state.history.sorted_by_session_descending()
    }

    pub fn today(&self) -> chrono::NaiveDate {
        self.clock.now().date_naive()
    }

    /// Best-effort write of every aggregate; failures are logged and the
    /// in-memory change stands.
    fn flush(&self) {
        if let Err(err) = save_state(self.store.as_ref(), &self.state) {
            error!("{}", LotteryError::Persistence(err));
        }
    }
}
