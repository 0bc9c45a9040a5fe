//! Transactional batch engine.
//!
//! For every matching file the engine runs backup, transform, mark. If the
//! transform or the mark fails, the backup is restored and discarded before the
//! error is returned, so a failed file always ends up with its original bytes
//! and no mark. A run stops at the first failing file; files committed before
//! it stay committed, and re-running picks up where it stopped.

use std::{
    fs,
    path::{Path, PathBuf},
};

use imbatch_fs::{FileCandidate, MaskSet, is_readable_writable, walk};
use imbatch_store::{
    BackupError, BackupStore, MarkError, MarkStore, is_atomic_temp, write_atomic,
};
use log::{debug, error, info, warn};

use crate::{
    codec::{Codec, SniffCodec},
    content::EncodeOptions,
    error::{BatchError, TransformError, ValidationReason},
    transform::Transform,
};

/// What happened to one walked entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Not a regular file, owned by a store, a leftover temp file, or no mask matched
    Filtered,
    /// `process` found a valid mark
    AlreadyMarked,
    /// `unprocess` found no valid mark
    NotMarked,
    /// Transformed and marked, or restored and unmarked
    Committed,
}

/// Totals of a successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub committed: usize,
    /// Matching files whose mark state meant there was nothing to do
    pub skipped: usize,
    pub filtered: usize,
}

impl RunReport {
    fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Filtered => self.filtered += 1,
            FileOutcome::AlreadyMarked | FileOutcome::NotMarked => self.skipped += 1,
            FileOutcome::Committed => self.committed += 1,
        }
    }
}

/// Mark state of one matching file, as reported by [`BatchEngine::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateStatus {
    pub path: PathBuf,
    pub marked: bool,
}

/// The step of an attempt that failed after the backup was taken.
#[derive(Debug)]
enum AttemptFailure {
    Transform(TransformError),
    Mark(MarkError),
}

impl AttemptFailure {
    fn into_batch_error(self, path: &Path) -> BatchError {
        let path = path.to_path_buf();
        match self {
            AttemptFailure::Transform(source) => BatchError::Transform { path, source },
            AttemptFailure::Mark(source) => BatchError::Mark { path, source },
        }
    }
}

pub struct BatchEngine<M, B, T, C = SniffCodec> {
    marks: M,
    backups: B,
    transform: T,
    codec: C,
    encode: EncodeOptions,
}

impl<M, B, T> BatchEngine<M, B, T, SniffCodec>
where
    M: MarkStore,
    B: BackupStore,
    T: Transform,
{
    pub fn new(marks: M, backups: B, transform: T) -> Self {
        Self {
            marks,
            backups,
            transform,
            codec: SniffCodec,
            encode: EncodeOptions::default(),
        }
    }
}

impl<M, B, T, C> BatchEngine<M, B, T, C>
where
    M: MarkStore,
    B: BackupStore,
    T: Transform,
    C: Codec,
{
    pub fn with_codec<C2: Codec>(self, codec: C2) -> BatchEngine<M, B, T, C2> {
        BatchEngine {
            marks: self.marks,
            backups: self.backups,
            transform: self.transform,
            codec,
            encode: self.encode,
        }
    }

    pub fn with_encode_options(mut self, encode: EncodeOptions) -> Self {
        self.encode = encode;
        self
    }

    pub fn marks(&self) -> &M {
        &self.marks
    }

    pub fn backups(&self) -> &B {
        &self.backups
    }

    /// Transform every matching, not yet validly marked file under `root`.
    ///
    /// Fails fast: the first file that cannot be validated, backed up,
    /// transformed or marked ends the run. That file is left with its original
    /// bytes and without a mark.
    pub fn process(&self, root: &Path, masks: &MaskSet) -> Result<RunReport, BatchError> {
        info!("[engine] process {:?} masks={:?}", root, masks.patterns());
        self.run(root, masks, |c| self.process_one(c))
    }

    /// Undo `process`: restore and drop the backup, then the mark, of every
    /// matching file whose mark is still valid. Stale marks are left alone.
    pub fn unprocess(&self, root: &Path, masks: &MaskSet) -> Result<RunReport, BatchError> {
        info!("[engine] unprocess {:?} masks={:?}", root, masks.patterns());
        self.run(root, masks, |c| self.unprocess_one(c))
    }

    /// Mark state of every matching file. Read-only.
    pub fn status(&self, root: &Path, masks: &MaskSet) -> Result<Vec<CandidateStatus>, BatchError> {
        let mut statuses = Vec::new();
        for entry in walk(root) {
            let candidate = entry?;
            if self.is_eligible(&candidate, masks) {
                statuses.push(CandidateStatus {
                    marked: self.marks.is_marked(&candidate.full_path),
                    path: candidate.full_path,
                });
            }
        }
        Ok(statuses)
    }

    fn run<F>(&self, root: &Path, masks: &MaskSet, mut step: F) -> Result<RunReport, BatchError>
    where
        F: FnMut(&FileCandidate) -> Result<FileOutcome, BatchError>,
    {
        let mut report = RunReport::default();

        for entry in walk(root) {
            let candidate = entry?;
            let outcome = if self.is_eligible(&candidate, masks) {
                step(&candidate)?
            } else {
                FileOutcome::Filtered
            };
            report.record(outcome);
        }

        info!(
            "[engine] done: committed={} skipped={} filtered={}",
            report.committed, report.skipped, report.filtered
        );
        Ok(report)
    }

    fn is_eligible(&self, candidate: &FileCandidate, masks: &MaskSet) -> bool {
        candidate.is_regular()
            && masks.matches(&candidate.name)
            && !self.marks.owns_path(&candidate.full_path)
            && !self.backups.owns_path(&candidate.full_path)
            && !is_atomic_temp(&candidate.full_path)
    }

    fn process_one(&self, candidate: &FileCandidate) -> Result<FileOutcome, BatchError> {
        let path = candidate.full_path.as_path();

        if self.marks.is_marked(path) {
            debug!("[engine] {:?} already processed", path);
            return Ok(FileOutcome::AlreadyMarked);
        }

        self.validate_access(candidate)?;
        self.recover_interrupted(path)?;
        self.validate_stores(path)?;

        self.backups
            .backup(path)
            .map_err(|source| BatchError::Backup {
                path: path.to_path_buf(),
                source,
            })?;

        match self.attempt(path) {
            Ok(()) => {
                info!("[engine] processed {:?}", path);
                Ok(FileOutcome::Committed)
            }
            Err(failure) => Err(self.rollback(path, failure)),
        }
    }

    /// A backup with no mark at all is what an attempt killed between backup
    /// and mark leaves behind; the file may already hold transformed bytes.
    /// Put the original back so the new attempt starts from it.
    fn recover_interrupted(&self, path: &Path) -> Result<(), BatchError> {
        if self.marks.has_mark(path) || !self.backups.has_backup(path) {
            return Ok(());
        }

        warn!("[engine] {:?} has a backup but no mark, restoring it first", path);
        let backup_error = |source| BatchError::Backup {
            path: path.to_path_buf(),
            source,
        };
        self.backups.restore_last_backup(path).map_err(backup_error)?;
        self.discard_backup(path).map_err(backup_error)
    }

    /// Decode, transform, encode, overwrite, mark. Nothing here touches the backup.
    fn attempt(&self, path: &Path) -> Result<(), AttemptFailure> {
        self.rewrite(path).map_err(AttemptFailure::Transform)?;
        // The mark store fingerprints the file anew; no metadata read before
        // the rewrite may be reused here.
        self.marks.mark(path).map_err(AttemptFailure::Mark)
    }

    fn rewrite(&self, path: &Path) -> Result<(), TransformError> {
        let bytes = fs::read(path).map_err(|e| TransformError::io("read", e))?;
        let content = self.codec.decode(&bytes)?;
        let transformed = self.transform.apply(content)?;
        let encoded = self.codec.encode(&transformed, &self.encode)?;
        write_atomic(path, &encoded).map_err(|e| TransformError::io("write", e))
    }

    /// Put the original bytes back and drop the backup, then report the failure
    /// that caused the rollback. A failing rollback is reported on top of it.
    fn rollback(&self, path: &Path, failure: AttemptFailure) -> BatchError {
        let cause = failure.into_batch_error(path);
        warn!("[engine] rolling back {:?}: {cause}", path);

        if let Err(source) = self.backups.restore_last_backup(path) {
            error!("[engine] restore of {:?} failed: {source}", path);
            return BatchError::Rollback {
                path: path.to_path_buf(),
                cause: Box::new(cause),
                source,
                restored: false,
            };
        }

        if let Err(source) = self.discard_backup(path) {
            error!("[engine] discarding backup of {:?} failed: {source}", path);
            return BatchError::Rollback {
                path: path.to_path_buf(),
                cause: Box::new(cause),
                source,
                restored: true,
            };
        }

        cause
    }

    /// Delete after restore. A store whose restore consumed the backup reports
    /// it missing here, which is the expected end state.
    fn discard_backup(&self, path: &Path) -> Result<(), BackupError> {
        match self.backups.delete_last_backup(path) {
            Err(e) if e.is_missing() => Ok(()),
            other => other,
        }
    }

    fn unprocess_one(&self, candidate: &FileCandidate) -> Result<FileOutcome, BatchError> {
        let path = candidate.full_path.as_path();

        if !self.marks.is_marked(path) {
            debug!("[engine] {:?} not marked, leaving it", path);
            return Ok(FileOutcome::NotMarked);
        }

        self.validate_access(candidate)?;

        let backup_error = |source| BatchError::Backup {
            path: path.to_path_buf(),
            source,
        };
        self.backups.restore_last_backup(path).map_err(backup_error)?;
        self.discard_backup(path).map_err(backup_error)?;

        self.marks.unmark(path).map_err(|source| BatchError::Mark {
            path: path.to_path_buf(),
            source,
        })?;

        info!("[engine] restored {:?}", path);
        Ok(FileOutcome::Committed)
    }

    fn validate_access(&self, candidate: &FileCandidate) -> Result<(), BatchError> {
        let refuse = |reason| BatchError::Validation {
            path: candidate.full_path.clone(),
            reason,
        };

        if !is_readable_writable(&candidate.parent) {
            return Err(refuse(ValidationReason::DirectoryAccess(
                candidate.parent.clone(),
            )));
        }
        if !is_readable_writable(&candidate.full_path) {
            return Err(refuse(ValidationReason::FileAccess));
        }
        Ok(())
    }

    fn validate_stores(&self, path: &Path) -> Result<(), BatchError> {
        let refuse = |reason| BatchError::Validation {
            path: path.to_path_buf(),
            reason,
        };

        if !self.marks.can_mark(path) {
            return Err(refuse(ValidationReason::CannotMark));
        }
        if !self.backups.can_backup(path) {
            return Err(refuse(ValidationReason::CannotBackup));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
