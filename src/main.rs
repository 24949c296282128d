//! Binary entry point: resolve the data directory, open the SQLite store,
//! restore the raffle, then either run a subcommand or drive the Ratatui
//! event loop until the user exits.
use std::io;

use clap::Parser;
use log::info;
use raffle_manager::cli::{self, Cli};
use raffle_manager::config::{AppConfig, DataPaths};
use raffle_manager::logging::init_logging;
use raffle_manager::lottery::{SystemClock, ThreadRandom};
use raffle_manager::{ensure_schema, run_app, App, Lottery, SqliteStore};

/// Returning a `Result` bubbles up fatal initialization problems (for example
/// an unwritable data directory) to the terminal instead of crashing silently.
fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let paths = DataPaths::resolve(args.data_dir)?;

    // The TUI owns the screen, so its log goes to a file.
    match args.command {
        Some(_) => init_logging(None),
        None => init_logging(Some(&paths.log_file())),
    }

    let config = AppConfig::load_from(&paths.config());
    let conn = ensure_schema(&paths.database())?;
    let mut lottery = Lottery::load(
        Box::new(SqliteStore::new(conn)),
        Box::new(ThreadRandom),
        Box::new(SystemClock),
    );

    match args.command {
        Some(command) => cli::execute(command, &mut lottery, &mut io::stdout()),
        None => {
            info!("starting TUI with data in {}", paths.root().display());
            let mut app = App::new(lottery, config, paths);
            run_app(&mut app)
        }
    }
}
