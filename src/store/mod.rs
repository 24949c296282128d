//! Persistence module split across logical submodules.

mod connection;
mod kv;
mod snapshot;

pub use connection::{ensure_schema, ensure_schema_in_memory, DB_FILE_NAME};
pub use kv::{KeyValueStore, MemoryStore, SqliteStore};
pub use snapshot::{
    clear_state, load_state, save_state, DRAW_SESSIONS_KEY, PARTICIPANTS_KEY,
    SESSION_COUNTER_KEY, WINNERS_KEY,
};
