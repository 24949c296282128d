//! Command-line surface. Without a subcommand the binary opens the TUI; the
//! subcommands run one operation against the same data directory and exit.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::csv::sample_csv;
use crate::lottery::{ImportMode, Lottery};

#[derive(Parser, Debug)]
#[command(name = "raffle-manager", version, about = "Manage participants and run prize draws")]
pub struct Cli {
    /// Data directory (defaults to ~/.raffle-manager)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Import participant names from a CSV file
    Import {
        file: PathBuf,
        /// Zero-based column holding the names (1 for spreadsheet exports)
        #[arg(long, default_value_t = 0)]
        column: usize,
        /// Replace the participant list instead of adding to it
        #[arg(long)]
        replace: bool,
    },
    /// Export participants to a CSV file
    Export { file: PathBuf },
    /// Write a sample CSV template
    Sample { file: PathBuf },
    /// List participants and whether they have won
    Participants,
    /// Show the draw history, newest first
    History,
    /// Forget all winners and draw sessions
    Reset,
}

/// Run a one-shot subcommand, writing its report to `out`.
pub fn execute<W: Write>(command: Command, lottery: &mut Lottery, out: &mut W) -> Result<()> {
    match command {
        Command::Import {
            file,
            column,
            replace,
        } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let mode = if replace {
                ImportMode::Replace
            } else {
                ImportMode::Merge
            };
            let outcome = lottery.import_csv(&text, column, mode);
            writeln!(out, "{outcome}")?;
        }
        Command::Export { file } => {
            let Some(csv) = lottery.export_csv() else {
                bail!("there are no participants to export");
            };
            fs::write(&file, csv)
                .with_context(|| format!("failed to write {}", file.display()))?;
            writeln!(
                out,
                "Exported {} participant(s) to {}.",
                lottery.participants().len(),
                file.display()
            )?;
        }
        Command::Sample { file } => {
            fs::write(&file, sample_csv())
                .with_context(|| format!("failed to write {}", file.display()))?;
            writeln!(out, "Sample CSV written to {}.", file.display())?;
        }
        Command::Participants => {
            let history = lottery.history();
            for name in lottery.participants() {
                if history.has_won(name) {
                    writeln!(out, "{name} (won)")?;
                } else {
                    writeln!(out, "{name}")?;
                }
            }
            writeln!(
                out,
                "{} participant(s), {} eligible",
                lottery.participants().len(),
                lottery.available().len()
            )?;
        }
        Command::History => {
            if lottery.history().is_empty() {
                writeln!(out, "No draws recorded yet.")?;
            }
            for session in lottery.sessions_newest_first() {
                writeln!(out, "{session}")?;
            }
        }
        Command::Reset => {
            lottery.reset_draw();
            writeln!(out, "Draw reset. Everyone is eligible again.")?;
        }
    }
    Ok(())
}
