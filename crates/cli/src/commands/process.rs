use std::{ffi::OsString, process::ExitCode, time::Instant};

use anyhow::anyhow;
use clap::Args;
use imbatch_engine::{BatchEngine, CommandTransform, EncodeOptions, ImageFormat};
use imbatch_runtime::{DEFAULT_JPEG_QUALITY, history::RunKind};

use super::{TargetArgs, finish_run, usage_error};

/// Environment variable telling the transform program the configured JPEG quality.
pub const QUALITY_ENV: &str = "IMBATCH_QUALITY";

#[derive(Debug, Args)]
pub struct ProcessArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Write results in this format instead of each file's own; the program
    /// is told through IMBATCH_TARGET_FORMAT and must do the conversion
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<ImageFormat>,

    /// JPEG quality for re-encoding
    #[arg(
        long,
        value_name = "0-100",
        default_value_t = DEFAULT_JPEG_QUALITY,
        value_parser = clap::value_parser!(u8).range(0..=100)
    )]
    pub quality: u8,

    /// Transform program and its arguments: image on stdin, result on stdout
    #[arg(last = true, value_name = "PROGRAM")]
    pub command: Vec<OsString>,
}

pub fn run(args: ProcessArgs) -> ExitCode {
    let target = match args.target.resolve() {
        Ok(t) => t,
        Err(e) => return usage_error("process", e),
    };

    let Some((program, program_args)) = args.command.split_first() else {
        return usage_error("process", anyhow!("no transform program given after --"));
    };

    let mut transform = CommandTransform::new(program)
        .args(program_args)
        .env(QUALITY_ENV, args.quality.to_string());
    if let Some(format) = args.format {
        transform = transform.target_format(format);
    }

    let engine = BatchEngine::new(&target.marks, &target.backups, transform)
        .with_encode_options(EncodeOptions {
            format: args.format,
            quality: args.quality,
        });

    let started = Instant::now();
    let outcome = engine.process(&target.root, &target.masks);
    finish_run(RunKind::Process, &target, started, outcome)
}
