use std::{
    env,
    fs::{self, File, OpenOptions},
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::PROGRAM_NAME;

pub const HISTORY_VERSION: u8 = 1;

pub const HISTORY_DISABLED_ENV: &str = "IMBATCH_HISTORY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    Process,
    Unprocess,
}

impl RunKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RunKind::Process => "process",
            RunKind::Unprocess => "unprocess",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub enum HistoryEvent {
    Run(RunEvent),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunEvent {
    /// Schema version
    pub version: u8,

    pub timestamp: DateTime<Utc>,

    pub kind: RunKind,

    /// Root directory the batch walked.
    pub root: PathBuf,

    pub masks: Vec<String>,

    /// Files transformed (process) or restored (unprocess).
    pub committed: usize,

    /// Matching files left alone because their mark state already fit.
    pub skipped: usize,

    pub duration_ms: u64,

    /// Rendered error chain when the run aborted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunEvent {
    pub fn new(kind: RunKind, root: PathBuf, masks: Vec<String>) -> Self {
        Self {
            version: HISTORY_VERSION,
            timestamp: Utc::now(),
            kind,
            root,
            masks,
            committed: 0,
            skipped: 0,
            duration_ms: 0,
            error: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

pub struct HistoryStore {
    path: PathBuf,
}

pub fn state_dir() -> Option<PathBuf> {
    if let Ok(xdg_state) = env::var("XDG_STATE_HOME")
        && !xdg_state.is_empty()
    {
        return Some(PathBuf::from(xdg_state).join(PROGRAM_NAME));
    }

    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|p| p.join(PROGRAM_NAME))
}

pub fn history_log_path() -> Option<PathBuf> {
    state_dir().map(|d| d.join("history.log"))
}

fn history_disabled() -> bool {
    match env::var(HISTORY_DISABLED_ENV) {
        Ok(val) => val == "0" || val.eq_ignore_ascii_case("false"),
        Err(_) => false,
    }
}

impl HistoryStore {
    pub fn new() -> Option<Self> {
        if history_disabled() {
            return None;
        }

        let path = history_log_path()?;
        Some(Self { path })
    }

    #[cfg(test)]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Best effort: a history write failure never fails the run it describes.
    pub fn log_run(&self, event: RunEvent) {
        if let Err(e) = self.append_event(&HistoryEvent::Run(event)) {
            debug!("[history] failed to log run: {e}");
        }
    }

    fn append_event(&self, event: &HistoryEvent) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut line = serde_json::to_string(event).map_err(io::Error::other)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // One write per line under O_APPEND; an interrupted write can still tear a line,
        // which the reader skips as malformed.
        file.write_all(line.as_bytes())?;

        Ok(())
    }

    pub fn iter_events(&self) -> impl Iterator<Item = HistoryEvent> {
        self.read_events().into_iter().flatten()
    }

    fn read_events(&self) -> Option<Vec<HistoryEvent>> {
        let file = File::open(&self.path).ok()?;
        let reader = BufReader::new(file);
        let mut events = Vec::new();
        for line in reader.lines() {
            match line {
                Ok(line) => match serde_json::from_str(&line) {
                    Ok(ev) => events.push(ev),
                    Err(e) => debug!("[history] skipping malformed line: {e}"),
                },
                Err(e) => {
                    debug!("[history] error reading log: {e}");
                    break;
                }
            }
        }
        Some(events)
    }

    /// Most recent runs first.
    pub fn recent_runs(&self, limit: usize) -> Vec<RunEvent> {
        let mut runs: Vec<RunEvent> = self
            .iter_events()
            .map(|e| match e {
                HistoryEvent::Run(r) => r,
            })
            .collect();

        runs.reverse();
        runs.truncate(limit);
        runs
    }

    pub fn count(&self) -> usize {
        self.iter_events().count()
    }

    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
