mod config;
pub mod history;
pub mod logging;

pub use config::{
    DEFAULT_BACKUP_SUFFIX, DEFAULT_JPEG_QUALITY, DEFAULT_MARK_SUFFIX, DEFAULT_MASKS,
    PROGRAM_LOG_LEVEL, PROGRAM_NAME,
};

pub use logging::init;
