use std::{
    ffi::{OsStr, OsString},
    io::{self, Write},
    process::{Command, Stdio},
    thread,
};

use log::debug;

use crate::{
    content::{ImageContent, ImageFormat},
    error::TransformError,
};

/// Environment variable telling a [`CommandTransform`] child the input format.
pub const FORMAT_ENV: &str = "IMBATCH_FORMAT";

/// Environment variable telling a [`CommandTransform`] child which format to
/// print. Same as the input format unless a target format is set.
pub const TARGET_FORMAT_ENV: &str = "IMBATCH_TARGET_FORMAT";

/// The operation applied to every selected file.
///
/// Implementations must be pure functions of their input: no hidden state and
/// no file I/O on the subject. Any error makes the engine roll the file back.
pub trait Transform {
    fn apply(&self, content: ImageContent) -> Result<ImageContent, TransformError>;
}

impl<F> Transform for F
where
    F: Fn(ImageContent) -> Result<ImageContent, TransformError>,
{
    fn apply(&self, content: ImageContent) -> Result<ImageContent, TransformError> {
        self(content)
    }
}

/// Transform delegating to an external program: the encoded image goes to its
/// stdin and whatever it prints on stdout replaces it.
///
/// A non-zero exit status or empty output is a failure. The output is labelled
/// with the format sniffed from it, or the input's format if it has no known
/// signature; the codec checks the label on encode.
#[derive(Debug, Clone)]
pub struct CommandTransform {
    program: OsString,
    args: Vec<OsString>,
    envs: Vec<(OsString, OsString)>,
    target: Option<ImageFormat>,
}

impl CommandTransform {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            target: None,
        }
    }

    /// Ask the program to convert everything to `format`.
    pub fn target_format(mut self, format: ImageFormat) -> Self {
        self.target = Some(format);
        self
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }
}

impl Transform for CommandTransform {
    fn apply(&self, content: ImageContent) -> Result<ImageContent, TransformError> {
        debug!(
            "[transform] running {:?} on {} bytes of {}",
            self.program,
            content.bytes.len(),
            content.format
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .env(FORMAT_ENV, content.format.extension())
            .env(
                TARGET_FORMAT_ENV,
                self.target.unwrap_or(content.format).extension(),
            )
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| TransformError::io("spawn", e))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| TransformError::failed("child stdin was not captured"))?;

        // Feed stdin from a second thread so a child that writes before it has
        // read everything cannot deadlock against us.
        let (output, written) = thread::scope(|s| {
            let writer = s.spawn(|| {
                let res = stdin.write_all(&content.bytes);
                drop(stdin);
                res
            });
            let output = child.wait_with_output();
            (output, writer.join())
        });

        let output = output.map_err(|e| TransformError::io("wait", e))?;
        match written {
            Ok(Ok(())) => {}
            // The child may legitimately exit without draining its input.
            Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(TransformError::io("write stdin", e)),
            Err(_) => return Err(TransformError::failed("stdin writer panicked")),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TransformError::failed(format!(
                "{} exited with {}: {}",
                self.program.to_string_lossy(),
                output.status,
                stderr.trim()
            )));
        }

        if output.stdout.is_empty() {
            return Err(TransformError::failed(format!(
                "{} produced no output",
                self.program.to_string_lossy()
            )));
        }

        let format = ImageFormat::sniff(&output.stdout).unwrap_or(content.format);
        Ok(ImageContent::new(format, output.stdout))
    }
}

#[cfg(test)]
#[path = "transform_tests.rs"]
mod tests;
