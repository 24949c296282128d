//! Typed mapping between the draw aggregates and the four stored keys. Each
//! value is JSON text; parsing is all-or-nothing so a corrupted key can never
//! leave the registry and history half restored.

use anyhow::{Context, Result};
use log::{debug, error};
use serde::de::DeserializeOwned;

use crate::lottery::{DrawSessionLog, LotteryState, ParticipantRegistry};
use crate::models::DrawSession;

use super::kv::KeyValueStore;

pub const PARTICIPANTS_KEY: &str = "participants";
pub const WINNERS_KEY: &str = "winners";
pub const DRAW_SESSIONS_KEY: &str = "drawSessions";
pub const SESSION_COUNTER_KEY: &str = "sessionCounter";

const ALL_KEYS: [&str; 4] = [
    PARTICIPANTS_KEY,
    WINNERS_KEY,
    DRAW_SESSIONS_KEY,
    SESSION_COUNTER_KEY,
];

/// Restore the durable aggregates. Missing keys fall back to empty defaults;
/// any read or parse failure is logged and yields a completely empty state.
pub fn load_state(store: &dyn KeyValueStore) -> LotteryState {
    match try_load_state(store) {
        Ok(state) => state,
        Err(err) => {
            error!("error loading stored raffle data, starting empty: {err:#}");
            LotteryState::default()
        }
    }
}

fn try_load_state(store: &dyn KeyValueStore) -> Result<LotteryState> {
    let participants: Vec<String> = read_json(store, PARTICIPANTS_KEY)?.unwrap_or_default();
    let winners: Vec<String> = read_json(store, WINNERS_KEY)?.unwrap_or_default();
    let sessions: Vec<DrawSession> = read_json(store, DRAW_SESSIONS_KEY)?.unwrap_or_default();
    let counter: u64 = read_json(store, SESSION_COUNTER_KEY)?.unwrap_or_default();

    debug!(
        "loaded {} participants, {} winners, {} sessions",
        participants.len(),
        winners.len(),
        sessions.len()
    );

    let mut state = LotteryState {
        registry: ParticipantRegistry::from_names(participants),
        history: DrawSessionLog::from_parts(sessions, counter, winners),
    };
    let pruned = state.prune_winners();
    if pruned > 0 {
        debug!("dropped {pruned} stored winner(s) missing from the registry");
    }
    Ok(state)
}

/// Write all four keys. Writes are not transactional across keys.
pub fn save_state(store: &dyn KeyValueStore, state: &LotteryState) -> Result<()> {
    let participants = serde_json::to_string(state.registry.names())
        .context("failed to encode participants")?;
    let winners =
        serde_json::to_string(state.history.winners()).context("failed to encode winners")?;
    let sessions = serde_json::to_string(state.history.sessions())
        .context("failed to encode draw sessions")?;

    store.save(PARTICIPANTS_KEY, &participants)?;
    store.save(WINNERS_KEY, &winners)?;
    store.save(DRAW_SESSIONS_KEY, &sessions)?;
    store.save(SESSION_COUNTER_KEY, &state.history.counter().to_string())?;
    Ok(())
}

/// Remove every stored key.
pub fn clear_state(store: &dyn KeyValueStore) -> Result<()> {
    for key in ALL_KEYS {
        store.remove(key)?;
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.load(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .with_context(|| format!("malformed value for {key}")),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::kv::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn sample_state() -> LotteryState {
        let mut state = LotteryState {
            registry: ParticipantRegistry::from_names(["Ana", "Bob", "Cy"]),
            history: DrawSessionLog::default(),
        };
        state
            .history
            .append(
                vec!["Bob".to_string()],
                Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap(),
            )
            .unwrap();
        state
    }

    #[test]
    fn saved_state_loads_back() {
        let store = MemoryStore::new();
        let state = sample_state();
        save_state(&store, &state).unwrap();
        assert_eq!(store.load(SESSION_COUNTER_KEY).unwrap().as_deref(), Some("1"));

        let loaded = load_state(&store);
        assert_eq!(loaded, state);
    }

    #[test]
    fn stored_winners_outside_the_registry_are_dropped() {
        let store = MemoryStore::new();
        save_state(&store, &sample_state()).unwrap();
        store.save(PARTICIPANTS_KEY, "[\"Ana\",\"Cy\"]").unwrap();

        let loaded = load_state(&store);
        assert!(loaded.history.winners().is_empty());
        assert_eq!(loaded.history.sessions()[0].winners, ["Bob"]);
        assert_eq!(loaded.available(), ["Ana", "Cy"]);
    }

    #[test]
    fn missing_keys_leave_defaults() {
        let store = MemoryStore::new();
        store.save(PARTICIPANTS_KEY, "[\"Ana\"]").unwrap();
        let loaded = load_state(&store);
        assert_eq!(loaded.registry.names(), ["Ana"]);
        assert!(loaded.history.is_empty());
        assert_eq!(loaded.history.counter(), 0);
    }

    #[test]
    fn malformed_value_discards_everything() {
        let store = MemoryStore::new();
        save_state(&store, &sample_state()).unwrap();
        store.save(DRAW_SESSIONS_KEY, "{not json").unwrap();

        let loaded = load_state(&store);
        assert_eq!(loaded, LotteryState::default());
    }

    #[test]
    fn wrong_shape_is_treated_as_malformed() {
        let store = MemoryStore::new();
        store.save(PARTICIPANTS_KEY, "{\"name\":\"Ana\"}").unwrap();
        assert!(load_state(&store).registry.is_empty());
    }

    #[test]
    fn timestamps_are_iso_strings_on_disk() {
        let store = MemoryStore::new();
        save_state(&store, &sample_state()).unwrap();
        let raw = store.load(DRAW_SESSIONS_KEY).unwrap().unwrap();
        assert_eq!(
            raw,
            "[{\"sessionId\":1,\"winners\":[\"Bob\"],\"timestamp\":\"2024-03-02T08:00:00Z\"}]"
        );
    }

    #[test]
    fn clear_removes_all_keys() {
        let store = MemoryStore::new();
        save_state(&store, &sample_state()).unwrap();
        clear_state(&store).unwrap();
        assert!(store.is_empty());
    }
}
