use std::{process::ExitCode, time::Instant};

use clap::Args;
use imbatch_engine::BatchEngine;
use imbatch_runtime::history::RunKind;

use super::{TargetArgs, finish_run, passthrough, usage_error};

#[derive(Debug, Args)]
pub struct UnprocessArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

pub fn run(args: UnprocessArgs) -> ExitCode {
    let target = match args.target.resolve() {
        Ok(t) => t,
        Err(e) => return usage_error("unprocess", e),
    };

    let engine = BatchEngine::new(&target.marks, &target.backups, passthrough);

    let started = Instant::now();
    let outcome = engine.unprocess(&target.root, &target.masks);
    finish_run(RunKind::Unprocess, &target, started, outcome)
}
