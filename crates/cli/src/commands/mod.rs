pub mod history;
pub mod process;
pub mod status;
pub mod unprocess;

use std::{path::PathBuf, process::ExitCode, time::Instant};

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use imbatch_engine::{BatchError, ImageContent, RunReport, TransformError};
use imbatch_fs::MaskSet;
use imbatch_runtime::{
    DEFAULT_BACKUP_SUFFIX, DEFAULT_MARK_SUFFIX, DEFAULT_MASKS,
    history::{HistoryStore, RunEvent, RunKind},
};
use imbatch_store::{SidecarBackupStore, SidecarMarkStore};
use log::{debug, error};

pub use history::HistoryArgs;
pub use process::ProcessArgs;
pub use status::StatusArgs;
pub use unprocess::UnprocessArgs;

/// A run stopped at a failing file.
const EXIT_FAILED: u8 = 1;
/// Arguments that clap accepted but that do not make a valid run.
const EXIT_USAGE: u8 = 2;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Transform every matching file under ROOT that is not processed yet.
    ///
    /// The program after `--` gets each image on stdin and must print the
    /// result on stdout. Example:
    ///   imbatch process ~/photos -m '*.png' -- pngquant -
    Process(ProcessArgs),

    /// Restore the originals of every processed file under ROOT.
    Unprocess(UnprocessArgs),

    /// List matching files and whether they are processed.
    Status(StatusArgs),

    /// Show past runs.
    History(HistoryArgs),
}

/// Where to look and which sidecars to use; shared by all tree commands.
#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Directory to walk recursively
    pub root: PathBuf,

    /// File name glob, repeatable (default: *.jpg *.jpeg *.png *.gif)
    #[arg(long = "mask", short = 'm', value_name = "MASK")]
    pub masks: Vec<String>,

    /// Suffix of the sidecar recording that a file is processed
    #[arg(long, value_name = "SUFFIX", default_value = DEFAULT_MARK_SUFFIX)]
    pub mark_suffix: String,

    /// Suffix of the sidecar holding a file's original bytes
    #[arg(long, value_name = "SUFFIX", default_value = DEFAULT_BACKUP_SUFFIX)]
    pub backup_suffix: String,
}

/// Validated [`TargetArgs`].
pub struct Target {
    pub root: PathBuf,
    pub masks: MaskSet,
    pub marks: SidecarMarkStore,
    pub backups: SidecarBackupStore,
}

impl TargetArgs {
    pub fn resolve(&self) -> Result<Target> {
        if self.mark_suffix == self.backup_suffix {
            bail!(
                "--mark-suffix and --backup-suffix must differ (both are {:?})",
                self.mark_suffix
            );
        }

        let masks = if self.masks.is_empty() {
            MaskSet::new(DEFAULT_MASKS.iter().copied())
        } else {
            MaskSet::new(self.masks.iter().cloned())
        }
        .context("invalid --mask")?;

        for (flag, suffix) in [
            ("--mark-suffix", &self.mark_suffix),
            ("--backup-suffix", &self.backup_suffix),
        ] {
            if masks.selects_suffix(suffix) {
                bail!(
                    "{flag} {suffix:?} is matched by the masks; \
                     the files to process would pass for sidecars"
                );
            }
        }

        Ok(Target {
            root: self.root.clone(),
            masks,
            marks: SidecarMarkStore::new(self.mark_suffix.clone())?,
            backups: SidecarBackupStore::new(self.backup_suffix.clone())?,
        })
    }
}

/// Transform for commands that never rewrite a file (`unprocess`, `status`).
fn passthrough(content: ImageContent) -> Result<ImageContent, TransformError> {
    Ok(content)
}

pub fn usage_error(command: &str, err: anyhow::Error) -> ExitCode {
    eprintln!("[{command}] {err:#}");
    ExitCode::from(EXIT_USAGE)
}

/// Report a finished `process`/`unprocess` run on the terminal and in history.
pub fn finish_run(
    kind: RunKind,
    target: &Target,
    started: Instant,
    outcome: Result<RunReport, BatchError>,
) -> ExitCode {
    let command = kind.as_str();
    let mut event = RunEvent::new(
        kind,
        target.root.clone(),
        target.masks.patterns().to_vec(),
    );
    event.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let code = match outcome {
        Ok(report) => {
            event.committed = report.committed;
            event.skipped = report.skipped;
            println!(
                "[{command}] {} committed, {} skipped, {} filtered in {}ms",
                report.committed, report.skipped, report.filtered, event.duration_ms
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            let chain = format!("{:#}", anyhow::Error::from(e));
            error!("[{command}] {chain}");
            eprintln!("[{command}] {chain}");
            event.error = Some(chain);
            ExitCode::from(EXIT_FAILED)
        }
    };

    match HistoryStore::new() {
        Some(store) => store.log_run(event),
        None => debug!("[{command}] history disabled"),
    }

    code
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
