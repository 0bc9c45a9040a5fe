use super::*;

use std::ffi::OsString;

use clap::Parser;
use imbatch_engine::ImageFormat;
use imbatch_runtime::DEFAULT_JPEG_QUALITY;

use crate::Cli;

fn parse(args: &[&str]) -> Command {
    Cli::try_parse_from(args).expect("valid command line").command
}

fn target(masks: &[&str], mark: &str, backup: &str) -> TargetArgs {
    TargetArgs {
        root: PathBuf::from("/photos"),
        masks: masks.iter().map(|m| m.to_string()).collect(),
        mark_suffix: mark.to_string(),
        backup_suffix: backup.to_string(),
    }
}

#[test]
fn process_collects_masks_and_trailing_program() {
    let cmd = parse(&[
        "imbatch", "process", "/photos", "-m", "*.png", "--mask", "*.jpg", "--format", "png",
        "--", "convert", "-", "-resize", "50%", "-",
    ]);

    let Command::Process(args) = cmd else {
        panic!("expected process");
    };
    assert_eq!(args.target.root, PathBuf::from("/photos"));
    assert_eq!(args.target.masks, vec!["*.png", "*.jpg"]);
    assert_eq!(args.format, Some(ImageFormat::Png));
    assert_eq!(args.quality, DEFAULT_JPEG_QUALITY);
    let expected: Vec<OsString> = ["convert", "-", "-resize", "50%", "-"]
        .into_iter()
        .map(OsString::from)
        .collect();
    assert_eq!(args.command, expected);
}

#[test]
fn process_defaults_suffixes() {
    let Command::Process(args) = parse(&["imbatch", "process", ".", "--", "cat"]) else {
        panic!("expected process");
    };
    assert!(args.target.masks.is_empty());
    assert_eq!(args.target.mark_suffix, ".processed");
    assert_eq!(args.target.backup_suffix, ".batchbackup");
    assert_eq!(args.format, None);
}

#[test]
fn quality_out_of_range_is_rejected() {
    let err = Cli::try_parse_from(["imbatch", "process", ".", "--quality", "101", "--", "cat"])
        .expect_err("quality above 100");
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn unknown_format_is_rejected() {
    assert!(Cli::try_parse_from(["imbatch", "process", ".", "--format", "tiff", "--", "cat"]).is_err());
}

#[test]
fn history_takes_limit_and_clear() {
    let Command::History(args) = parse(&["imbatch", "history", "-n", "5", "--clear"]) else {
        panic!("expected history");
    };
    assert_eq!(args.limit, 5);
    assert!(args.clear);
}

#[test]
fn status_accepts_pending_filter() {
    let Command::Status(args) = parse(&["imbatch", "status", "/photos", "--pending"]) else {
        panic!("expected status");
    };
    assert!(args.pending);
}

#[test]
fn resolve_uses_default_masks_when_none_given() {
    let resolved = target(&[], ".processed", ".batchbackup")
        .resolve()
        .expect("resolve");

    assert_eq!(resolved.masks.patterns(), DEFAULT_MASKS);
    assert_eq!(resolved.marks.suffix(), ".processed");
    assert_eq!(resolved.backups.suffix(), ".batchbackup");
}

#[test]
fn resolve_rejects_identical_suffixes() {
    let err = target(&["*.png"], ".side", ".side")
        .resolve()
        .err()
        .expect("identical suffixes");
    assert!(err.to_string().contains("must differ"), "{err}");
}

#[test]
fn resolve_rejects_bad_masks_and_suffixes() {
    assert!(target(&["[a-"], ".processed", ".batchbackup").resolve().is_err());
    assert!(target(&["*.png"], "", ".batchbackup").resolve().is_err());
    assert!(target(&["*.png"], ".processed", "a/b").resolve().is_err());
}

#[test]
fn resolve_rejects_suffix_matched_by_masks() {
    let err = target(&["*.jpg"], ".jpg", ".batchbackup")
        .resolve()
        .err()
        .expect("mark suffix swallows every jpg");
    assert!(err.to_string().contains("--mark-suffix"), "{err}");

    assert!(target(&["*.png"], ".processed", ".png").resolve().is_err());
    assert!(target(&["*"], ".processed", ".batchbackup").resolve().is_ok());
}
