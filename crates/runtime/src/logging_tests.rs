use super::*;
use log::{Level, Metadata, Record};
use serial_test::serial;

#[test]
fn parse_level_accepts_names_in_any_case() {
    let cases: &[(Option<&str>, Level)] = &[
        (None, Level::Warn),
        (Some("debug"), Level::Debug),
        (Some("DEBUG"), Level::Debug),
        (Some(" info "), Level::Info),
        (Some("Warn"), Level::Warn),
        (Some("error"), Level::Error),
        (Some("TRACE"), Level::Trace),
        (Some("garbage"), Level::Warn),
        (Some("off"), Level::Warn),
        (Some(""), Level::Warn),
    ];

    for (value, expected) in cases {
        let got = parse_level(*value);
        assert_eq!(
            got, *expected,
            "value {:?} should yield level {:?}, got {:?}",
            value, expected, got
        );
    }
}

#[test]
#[serial]
fn level_from_env_reads_program_variable() {
    unsafe { std::env::set_var(PROGRAM_LOG_LEVEL, "debug") };
    assert_eq!(level_from_env(), Level::Debug);

    unsafe { std::env::remove_var(PROGRAM_LOG_LEVEL) };
    assert_eq!(level_from_env(), Level::Warn);
}

#[test]
fn enabled_respects_level_threshold() {
    let levels = [
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
        Level::Trace,
    ];

    for logger_level in levels {
        let logger = Logger::new(logger_level);

        for record_level in levels {
            let meta = Metadata::builder()
                .level(record_level)
                .target("imbatch_engine")
                .build();

            assert_eq!(
                logger.enabled(&meta),
                record_level <= logger_level,
                "logger level {:?}, record level {:?}",
                logger_level,
                record_level
            );
        }
    }
}

#[test]
fn format_includes_level_target_and_message() {
    let logger = Logger::new(Level::Info);
    let args = format_args!("committed a.jpg");
    let record = Record::builder()
        .level(Level::Info)
        .target("imbatch_engine")
        .args(args)
        .build();

    let line = logger.format(&record);
    assert!(line.contains("INFO"), "line: {line}");
    assert!(line.contains("[imbatch_engine]"), "line: {line}");
    assert!(line.ends_with("committed a.jpg"), "line: {line}");

    logger.log(&record);
    logger.flush();
}
