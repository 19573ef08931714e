use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use env_logger::{Builder, Env, Target};
use log::LevelFilter;

use crate::app_dirs::AppDirs;

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Opens (creating parents as needed) a log file for appending
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// `level` as the baseline filter, with any `RUST_LOG` directives layered on top
fn builder(level: LogLevel) -> Builder {
    let mut builder = Builder::new();
    builder.filter_level(level.into()).parse_env(Env::default());
    builder
}

/// Sends all logging to a file so it never draws over the game.
/// `RUST_LOG` takes precedence over `level` when set.
/// Returns the path being written to, if any.
pub fn init(path: Option<PathBuf>, level: LogLevel) -> io::Result<Option<PathBuf>> {
    let Some(path) = path.or_else(AppDirs::log_path) else {
        return Ok(None);
    };
    let file = open_log_file(&path)?;

    let result = builder(level)
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init();

    if result.is_err() {
        // A logger was already installed (tests); keep using it
        return Ok(None);
    }
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn open_log_file_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state").join("whack.log");

        let mut file = open_log_file(&path).unwrap();
        writeln!(file, "first").unwrap();
        drop(file);

        let mut file = open_log_file(&path).unwrap();
        writeln!(file, "second").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }

    #[test]
    fn log_level_maps_to_filter() {
        assert_eq!(LevelFilter::from(LogLevel::Off), LevelFilter::Off);
        assert_eq!(LevelFilter::from(LogLevel::Debug), LevelFilter::Debug);
        assert_eq!(LogLevel::Warn.to_string().to_lowercase(), "warn");
    }

    #[test]
    fn cli_level_sets_the_logger_filter() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert_eq!(builder(LogLevel::Warn).build().filter(), LevelFilter::Warn);
        assert_eq!(builder(LogLevel::Trace).build().filter(), LevelFilter::Trace);
    }
}
