use std::fs::{self, File, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};

/// Environment variable holding the log filter, e.g. `RAFFLE_LOG=debug`.
pub const LOG_ENV: &str = "RAFFLE_LOG";

/// Install the global logger. With `log_file` set, records are appended there
/// so they never tear the alternate screen; otherwise they go to stderr.
pub fn init_logging(log_file: Option<&Path>) {
    let mut builder = Builder::from_env(Env::new().filter_or(LOG_ENV, "info"));

    if let Some(path) = log_file {
        match open_log_file(path) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(err) => eprintln!("{err:#}"),
        }
    }

    // A second initialisation (tests, embedding) keeps the first logger.
    let _ = builder.try_init();
}

/// Create the parent directory if needed and open `path` for appending.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("could not create log directory {}", parent.display())
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("could not open log file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_is_created_with_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("raffle-manager.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn unusable_log_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let err = open_log_file(&blocker.join("raffle-manager.log")).unwrap_err();
        assert!(err.to_string().starts_with("could not create log directory"));
    }
}
