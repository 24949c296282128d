use std::cmp::Reverse;

use chrono::{DateTime, Utc};

use crate::error::LotteryError;
use crate::models::DrawSession;

/// Chronological record of completed draws plus the live winner set.
///
/// Sessions are an audit trail and are never edited after `append`. The
/// winner set is the mutable eligibility projection: `append` merges into it
/// and `remove_winner` re-enables a name without touching the history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawSessionLog {
    sessions: Vec<DrawSession>,
    counter: u64,
    winners: Vec<String>,
}

impl DrawSessionLog {
    /// Rebuild a log from stored parts. The counter never trails the largest
    /// stored id, so ids stay unique even if the stored counter is stale.
    pub fn from_parts(sessions: Vec<DrawSession>, counter: u64, winners: Vec<String>) -> Self {
        let highest = sessions.iter().map(|s| s.session_id).max().unwrap_or(0);
        let mut log = Self {
            sessions,
            counter: counter.max(highest),
            winners: Vec::new(),
        };
        log.merge_winners(&winners);
        log
    }

    /// Record a completed draw and mark its winners as ineligible.
    pub fn append(
        &mut self,
        winners: Vec<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<&DrawSession, LotteryError> {
        if winners.is_empty() {
            return Err(LotteryError::InvalidSession);
        }
        self.counter += 1;
        self.merge_winners(&winners);
        self.sessions.push(DrawSession {
            session_id: self.counter,
            winners,
            timestamp,
        });
        Ok(&self.sessions[self.sessions.len() - 1])
    }

    /// Empty the history and winner set and restart ids at 1.
    pub fn clear(&mut self) {
        self.sessions.clear();
        self.winners.clear();
        self.counter = 0;
    }

    /// Newest-first view; stored order is left untouched.
    pub fn sorted_by_session_descending(&self) -> impl Iterator<Item = &DrawSession> + '_ {
        let mut ordered: Vec<&DrawSession> = self.sessions.iter().collect();
        ordered.sort_by_key(|session| Reverse(session.session_id));
        ordered.into_iter()
    }

    /// Make `name` eligible again. Past sessions still list it.
    pub fn remove_winner(&mut self, name: &str) -> bool {
        let before = self.winners.len();
        self.winners.retain(|winner| winner != name);
        self.winners.len() != before
    }

    pub fn has_won(&self, name: &str) -> bool {
        self.winners.iter().any(|winner| winner == name)
    }

    /// Stored (chronological) order.
    pub fn sessions(&self) -> &[DrawSession] {
        &self.sessions
    }

    pub fn winners(&self) -> &[String] {
        &self.winners
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn merge_winners(&mut self, names: &[String]) {
        for name in names {
            if !self.has_won(name) {
                self.winners.push(name.clone());
            }
        }
    }
}
