use std::{io::Write, sync::OnceLock};

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::config::{PROGRAM_LOG_LEVEL, PROGRAM_NAME};

const DEFAULT_LEVEL: Level = Level::Warn;

/// Stderr logger installed by the `imbatch` binary.
pub struct Logger {
    level: Level,
}

impl Logger {
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    fn format(&self, record: &Record<'_>) -> String {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        format!(
            "{} {} {} [{}] {}",
            timestamp,
            PROGRAM_NAME,
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.format(record);
        // A closed stderr must not take the batch run down with it.
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Parses a level name the way `IMBATCH_LOG_LEVEL` is interpreted.
/// `off`, unknown names and a missing value all fall back to `warn`.
pub(crate) fn parse_level(value: Option<&str>) -> Level {
    value
        .and_then(|s| s.trim().parse::<LevelFilter>().ok())
        .and_then(|filter| filter.to_level())
        .unwrap_or(DEFAULT_LEVEL)
}

fn level_from_env() -> Level {
    parse_level(std::env::var(PROGRAM_LOG_LEVEL).ok().as_deref())
}

pub fn init() -> Result<(), SetLoggerError> {
    init_with_level(level_from_env())
}

/// Installs the global logger. Later calls are no-ops; the first level wins.
pub fn init_with_level(level: Level) -> Result<(), SetLoggerError> {
    static LOGGER: OnceLock<Logger> = OnceLock::new();

    let first_call = LOGGER.get().is_none();
    let logger = LOGGER.get_or_init(|| Logger::new(level));

    if first_call {
        log::set_logger(logger)?;
        log::set_max_level(logger.level.to_level_filter());
    }

    Ok(())
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
