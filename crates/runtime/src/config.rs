pub const PROGRAM_NAME: &str = "imbatch";
pub const PROGRAM_LOG_LEVEL: &str = "IMBATCH_LOG_LEVEL";

/// Suffix appended to a file name to form its mark sidecar.
pub const DEFAULT_MARK_SUFFIX: &str = ".processed";

/// Suffix appended to a file name to form its backup sidecar.
pub const DEFAULT_BACKUP_SUFFIX: &str = ".batchbackup";

/// JPEG quality used when re-encoding and no explicit quality is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Masks used by the CLI when the user passes none.
/// Matching is case-sensitive, so `photo.JPG` is not covered by `*.jpg`.
pub const DEFAULT_MASKS: &[&str] = &["*.jpg", "*.jpeg", "*.png", "*.gif"];
