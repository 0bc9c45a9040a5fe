use super::*;

use crate::content::ImageFormat;

fn png(payload: &[u8]) -> ImageContent {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.extend_from_slice(payload);
    ImageContent::new(ImageFormat::Png, bytes)
}

#[test]
fn closures_are_transforms() {
    let upper = |mut c: ImageContent| -> Result<ImageContent, TransformError> {
        c.bytes.make_ascii_uppercase();
        Ok(c)
    };

    let out = upper.apply(png(b"abc")).expect("apply");
    assert!(out.bytes.ends_with(b"ABC"));
}

#[cfg(unix)]
#[test]
fn command_pipes_bytes_through_program() {
    let cat = CommandTransform::new("cat");
    let input = png(b"payload");

    let out = cat.apply(input.clone()).expect("cat succeeds");
    assert_eq!(out, input);
}

#[cfg(unix)]
#[test]
fn command_sees_format_and_extra_env() {
    let script = r#"cat; printf '%s-%s' "$IMBATCH_FORMAT" "$STAMP_TEXT""#;
    let t = CommandTransform::new("sh")
        .args(["-c", script])
        .env("STAMP_TEXT", "hello");

    let out = t.apply(png(b"x")).expect("script succeeds");
    assert!(out.bytes.ends_with(b"xpng-hello"), "{:?}", out.bytes);
    assert_eq!(out.format, ImageFormat::Png);
}

#[cfg(unix)]
#[test]
fn command_handles_input_larger_than_pipe_buffer() {
    let big = png(&vec![b'z'; 1 << 20]);
    let out = CommandTransform::new("cat").apply(big.clone()).expect("cat");
    assert_eq!(out.bytes.len(), big.bytes.len());
}

#[cfg(unix)]
#[test]
fn non_zero_exit_is_a_failure_with_stderr() {
    let t = CommandTransform::new("sh").args(["-c", "echo broken logo >&2; exit 3"]);

    match t.apply(png(b"x")) {
        Err(TransformError::Failed { reason }) => {
            assert!(reason.contains("broken logo"), "{reason}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn empty_output_is_a_failure() {
    let t = CommandTransform::new("true");
    assert!(matches!(
        t.apply(png(b"x")),
        Err(TransformError::Failed { .. })
    ));
}

#[test]
fn missing_program_is_an_io_error() {
    let t = CommandTransform::new("imbatch-no-such-program-for-tests");
    assert!(matches!(
        t.apply(png(b"x")),
        Err(TransformError::Io { operation: "spawn", .. })
    ));
}

#[cfg(unix)]
#[test]
fn command_output_is_labelled_by_its_signature() {
    let script = r#"cat >/dev/null; printf '\377\330\377\340%s' "$IMBATCH_TARGET_FORMAT""#;
    let t = CommandTransform::new("sh")
        .args(["-c", script])
        .target_format(ImageFormat::Jpeg);

    let out = t.apply(png(b"x")).expect("script succeeds");
    assert_eq!(out.format, ImageFormat::Jpeg);
    assert!(out.bytes.ends_with(b"jpg"), "{:?}", out.bytes);
}

#[cfg(unix)]
#[test]
fn target_format_defaults_to_input_format() {
    let t = CommandTransform::new("sh").args(["-c", r#"cat; printf '%s' "$IMBATCH_TARGET_FORMAT""#]);

    let out = t.apply(png(b"x")).expect("script succeeds");
    assert!(out.bytes.ends_with(b"xpng"), "{:?}", out.bytes);
}

#[cfg(unix)]
#[test]
fn unrecognised_output_keeps_input_label() {
    let t = CommandTransform::new("sh").args(["-c", "cat >/dev/null; printf garbage"]);

    let out = t.apply(png(b"x")).expect("script succeeds");
    assert_eq!(out.format, ImageFormat::Png);
    assert_eq!(out.bytes, b"garbage");
}
