mod batch;
mod codec;
mod content;
mod error;
mod transform;

pub use batch::{BatchEngine, CandidateStatus, FileOutcome, RunReport};
pub use codec::{Codec, SniffCodec};
pub use content::{EncodeOptions, ImageContent, ImageFormat, UnknownFormat};
pub use error::{BatchError, TransformError, ValidationReason};
pub use transform::{CommandTransform, FORMAT_ENV, TARGET_FORMAT_ENV, Transform};
