use std::process::ExitCode;

use clap::Args;
use imbatch_engine::BatchEngine;

use super::{EXIT_FAILED, TargetArgs, passthrough, usage_error};

#[derive(Debug, Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Only list files that still need processing
    #[arg(long)]
    pub pending: bool,
}

pub fn run(args: StatusArgs) -> ExitCode {
    let target = match args.target.resolve() {
        Ok(t) => t,
        Err(e) => return usage_error("status", e),
    };

    let engine = BatchEngine::new(&target.marks, &target.backups, passthrough);
    let statuses = match engine.status(&target.root, &target.masks) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("[status] {:#}", anyhow::Error::from(e));
            return ExitCode::from(EXIT_FAILED);
        }
    };

    let processed = statuses.iter().filter(|s| s.marked).count();
    for status in statuses.iter().filter(|s| !(args.pending && s.marked)) {
        let state = if status.marked { "processed" } else { "pending" };
        println!("{:<10}  {}", state, status.path.display());
    }

    println!(
        "\n{} files, {} processed, {} pending",
        statuses.len(),
        processed,
        statuses.len() - processed
    );

    ExitCode::SUCCESS
}
