mod access;
mod error;
mod masks;
mod record;
mod walker;

pub use access::{is_readable_writable, is_writable};
pub use error::FsError;
pub use masks::MaskSet;
pub use record::FileCandidate;
pub use walker::{Walk, walk};
