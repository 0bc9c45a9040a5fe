//! Durable per-file records backing the batch engine.
//!
//! A [`MarkStore`] remembers which content state of a file was already
//! processed; a [`BackupStore`] keeps the bytes needed to undo a transform.
//! Both come as sidecar-file stores living next to the subject and as
//! in-memory stores.

mod atomic;
mod backup;
mod error;
mod fingerprint;
mod mark;
mod memory;
mod sidecar;

pub use atomic::{copy_atomic, is_atomic_temp, write_atomic};
pub use backup::{BackupStore, SidecarBackupStore};
pub use error::{BackupError, InvalidSuffix, MarkError};
pub use fingerprint::Fingerprint;
pub use mark::{MarkStore, SidecarMarkStore};
pub use memory::{MemoryBackupStore, MemoryMarkStore};
