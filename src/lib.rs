//! Core library surface for the Raffle Manager TUI application.
//!
//! The `bin` target and the one-shot subcommands share everything here: the
//! draw core in [`lottery`], the SQLite key-value store, CSV helpers, and the
//! Ratatui front-end.
pub mod cli;
pub mod config;
pub mod csv;
pub mod error;
pub mod logging;
pub mod lottery;
pub mod models;
pub mod store;
pub mod ui;

/// Persistence entry points used by `main.rs` to open the embedded store.
pub use store::{ensure_schema, KeyValueStore, SqliteStore};

/// The domain types other layers manipulate.
pub use lottery::{Lottery, LotteryState};
pub use models::{Branding, DrawSession};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
