use log::{debug, info, warn};

use crate::models::DrawSession;

use super::history::DrawSessionLog;
use super::random::{pick_index, shuffle, Clock, RandomSource};

/// Where the engine is within a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawPhase {
    Idle,
    Running,
    StopRequested,
}

/// What a single animation tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No draw is active.
    Idle,
    /// A new display candidate was chosen. Purely cosmetic.
    Spinning(String),
    /// The draw was finalized and recorded as this session.
    Finalized(DrawSession),
    /// The draw was finalized without producing a session.
    NothingRecorded,
}

/// Transient per-draw state. Never persisted.
#[derive(Debug, Clone)]
struct DrawState {
    phase: DrawPhase,
    candidate: String,
    pending: Vec<String>,
    requested: usize,
    effective: usize,
    pool: Vec<String>,
}

impl DrawState {
    /// Pool members not already provisionally chosen.
    fn remaining(&self) -> Vec<String> {
        self.pool
            .iter()
            .filter(|name| !self.pending.contains(name))
            .cloned()
            .collect()
    }
}

/// Runs one draw at a time: a cosmetic spin on every tick, and the real
/// selection only once a stop has been requested.
#[derive(Debug, Default)]
pub struct WinnerSelectionEngine {
    draw: Option<DrawState>,
    current: Option<String>,
}

impl WinnerSelectionEngine {
    /// Begin a draw over `available`. Returns `false` without side effects when
    /// the pool is empty or a draw is already active.
    pub fn start_draw(
        &mut self,
        available: Vec<String>,
        requested: usize,
        rng: &mut dyn RandomSource,
    ) -> bool {
        if self.draw.is_some() {
            debug!("start_draw ignored: a draw is already active");
            return false;
        }
        if available.is_empty() {
            debug!("start_draw ignored: nobody is eligible");
            return false;
        }

        let requested = requested.max(1);
        let effective = requested.min(available.len());
        let candidate = available[pick_index(rng, available.len())].clone();
        info!(
            "draw started: {} requested, {} effective, {} eligible",
            requested,
            effective,
            available.len()
        );

        self.current = Some(candidate.clone());
        self.draw = Some(DrawState {
            phase: DrawPhase::Running,
            candidate,
            pending: Vec::new(),
            requested,
            effective,
            pool: available,
        });
        true
    }

    /// Ask the running draw to finalize on its next tick. No-op unless a draw
    /// is running with no stop pending.
    pub fn request_stop(&mut self) -> bool {
        match self.draw.as_mut() {
            Some(state) if state.phase == DrawPhase::Running => {
                state.phase = DrawPhase::StopRequested;
                debug!("stop requested while showing {}", state.candidate);
                true
            }
            _ => false,
        }
    }

    /// Advance the animation by one step, finalizing into `log` if a stop is
    /// pending.
    pub fn tick(
        &mut self,
        log: &mut DrawSessionLog,
        rng: &mut dyn RandomSource,
        clock: &dyn Clock,
    ) -> TickOutcome {
        let Some(state) = self.draw.as_mut() else {
            return TickOutcome::Idle;
        };

        if state.phase == DrawPhase::StopRequested {
            return self.finalize(log, rng, clock);
        }

        let remaining = state.remaining();
        let next = if !remaining.is_empty() {
            remaining[pick_index(rng, remaining.len())].clone()
        } else if state.pending.is_empty() {
            state.pool[pick_index(rng, state.pool.len())].clone()
        } else {
            return TickOutcome::Spinning(state.candidate.clone());
        };

        state.candidate = next.clone();
        self.current = Some(next.clone());
        TickOutcome::Spinning(next)
    }

    /// Drop any in-progress draw and the displayed candidate.
    pub fn reset(&mut self) {
        if self.draw.take().is_some() {
            debug!("in-progress draw discarded");
        }
        self.current = None;
    }

    pub fn phase(&self) -> DrawPhase {
        self.draw
            .as_ref()
            .map(|state| state.phase)
            .unwrap_or(DrawPhase::Idle)
    }

    pub fn is_active(&self) -> bool {
        self.draw.is_some()
    }

    /// Name on display: the spinning candidate, or the first winner of the
    /// last finalized draw.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Winner count requested for the active draw, before clamping to the pool.
    pub fn requested_count(&self) -> Option<usize> {
        self.draw.as_ref().map(|state| state.requested)
    }

    fn finalize(
        &mut self,
        log: &mut DrawSessionLog,
        rng: &mut dyn RandomSource,
        clock: &dyn Clock,
    ) -> TickOutcome {
        let Some(mut state) = self.draw.take() else {
            return TickOutcome::Idle;
        };

        if state.pending.is_empty() {
            let mut remaining = state.remaining();
            let take = state.effective.min(remaining.len());
            shuffle(rng, &mut remaining);
            remaining.truncate(take);
            state.pending.extend(remaining);
        }

        if let Some(first) = state.pending.first() {
            self.current = Some(first.clone());
        }

        if state.pending.is_empty() {
            info!("draw stopped without winners");
            return TickOutcome::NothingRecorded;
        }

        match log.append(state.pending, clock.now()) {
            Ok(session) => {
                info!(
                    "session #{} recorded: {}",
                    session.session_id,
                    session.winners.join(", ")
                );
                TickOutcome::Finalized(session.clone())
            }
            Err(err) => {
                warn!("draw produced no session: {err}");
                TickOutcome::NothingRecorded
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lottery::random::{FixedClock, SeededRandom, SequenceRandom};
    use chrono::{TimeZone, Utc};
    use std::collections::HashSet;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 8, 17, 9, 0, 0).unwrap())
    }

    fn pool(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn start_shows_a_candidate_immediately() {
        let mut engine = WinnerSelectionEngine::default();
        let mut rng = SequenceRandom::new(vec![0.5]);
        assert!(engine.start_draw(pool(&["A", "B", "C"]), 1, &mut rng));
        assert_eq!(engine.phase(), DrawPhase::Running);
        assert_eq!(engine.current(), Some("B"));
    }

    #[test]
    fn empty_pool_does_not_start() {
        let mut engine = WinnerSelectionEngine::default();
        let mut rng = SeededRandom::new(1);
        assert!(!engine.start_draw(Vec::new(), 3, &mut rng));
        assert_eq!(engine.phase(), DrawPhase::Idle);
        assert_eq!(engine.current(), None);
    }

    #[test]
    fn second_start_while_running_is_ignored() {
        let mut engine = WinnerSelectionEngine::default();
        let mut rng = SequenceRandom::new(vec![0.0]);
        assert!(engine.start_draw(pool(&["A", "B"]), 1, &mut rng));
        assert!(!engine.start_draw(pool(&["C"]), 1, &mut rng));
        assert_eq!(engine.current(), Some("A"));
    }

    #[test]
    fn spinning_never_finalizes_on_its_own() {
        let mut engine = WinnerSelectionEngine::default();
        let mut log = DrawSessionLog::default();
        let mut rng = SeededRandom::new(3);
        engine.start_draw(pool(&["A", "B", "C"]), 2, &mut rng);
        for _ in 0..500 {
            assert!(matches!(
                engine.tick(&mut log, &mut rng, &clock()),
                TickOutcome::Spinning(_)
            ));
        }
        assert!(log.is_empty());
        assert_eq!(engine.phase(), DrawPhase::Running);
    }

    #[test]
    fn stop_then_tick_records_distinct_winners() {
        let mut engine = WinnerSelectionEngine::default();
        let mut log = DrawSessionLog::default();
        let mut rng = SeededRandom::new(11);
        let names = pool(&["A", "B", "C", "D", "E"]);
        engine.start_draw(names.clone(), 3, &mut rng);
        engine.tick(&mut log, &mut rng, &clock());
        assert!(engine.request_stop());
        assert_eq!(engine.phase(), DrawPhase::StopRequested);
        assert!(!engine.request_stop());

        let TickOutcome::Finalized(session) = engine.tick(&mut log, &mut rng, &clock()) else {
            panic!("expected finalization");
        };
        assert_eq!(session.session_id, 1);
        assert_eq!(session.winners.len(), 3);
        let unique: HashSet<&String> = session.winners.iter().collect();
        assert_eq!(unique.len(), 3);
        assert!(session.winners.iter().all(|w| names.contains(w)));
        assert_eq!(engine.current(), Some(session.winners[0].as_str()));
        assert_eq!(engine.phase(), DrawPhase::Idle);
        assert_eq!(log.winners(), session.winners.as_slice());
    }

    #[test]
    fn winner_count_is_capped_by_pool_size() {
        let mut engine = WinnerSelectionEngine::default();
        let mut log = DrawSessionLog::default();
        let mut rng = SeededRandom::new(5);
        engine.start_draw(pool(&["A", "B"]), 10, &mut rng);
        assert_eq!(engine.requested_count(), Some(10));
        engine.request_stop();
        let TickOutcome::Finalized(session) = engine.tick(&mut log, &mut rng, &clock()) else {
            panic!("expected finalization");
        };
        assert_eq!(session.winners.len(), 2);
    }

    #[test]
    fn zero_request_is_treated_as_one() {
        let mut engine = WinnerSelectionEngine::default();
        let mut log = DrawSessionLog::default();
        let mut rng = SeededRandom::new(9);
        engine.start_draw(pool(&["A", "B", "C"]), 0, &mut rng);
        engine.request_stop();
        let TickOutcome::Finalized(session) = engine.tick(&mut log, &mut rng, &clock()) else {
            panic!("expected finalization");
        };
        assert_eq!(session.winners.len(), 1);
    }

    #[test]
    fn stop_while_idle_changes_nothing() {
        let mut engine = WinnerSelectionEngine::default();
        let mut log = DrawSessionLog::default();
        let mut rng = SeededRandom::new(2);
        assert!(!engine.request_stop());
        assert_eq!(engine.tick(&mut log, &mut rng, &clock()), TickOutcome::Idle);
        assert!(log.is_empty());
    }

    #[test]
    fn every_pair_is_reachable() {
        let names = pool(&["A", "B", "C"]);
        let mut rng = SeededRandom::new(1234);
        let mut seen = HashSet::new();
        for _ in 0..300 {
            let mut engine = WinnerSelectionEngine::default();
            let mut log = DrawSessionLog::default();
            engine.start_draw(names.clone(), 2, &mut rng);
            engine.request_stop();
            if let TickOutcome::Finalized(session) = engine.tick(&mut log, &mut rng, &clock()) {
                let mut pair = session.winners.clone();
                pair.sort();
                seen.insert(pair);
            }
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn reset_discards_the_running_draw() {
        let mut engine = WinnerSelectionEngine::default();
        let mut log = DrawSessionLog::default();
        let mut rng = SeededRandom::new(8);
        engine.start_draw(pool(&["A"]), 1, &mut rng);
        engine.request_stop();
        engine.reset();
        assert_eq!(engine.tick(&mut log, &mut rng, &clock()), TickOutcome::Idle);
        assert!(log.is_empty());
        assert_eq!(engine.current(), None);
    }
}
