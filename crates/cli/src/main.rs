use std::process::ExitCode;

use clap::Parser;

mod commands;

use commands::Command;
use imbatch_runtime::logging;

#[derive(Debug, Parser)]
#[command(
    name = "imbatch",
    version,
    about = "Transactional batch processing of image files",
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

fn main() -> ExitCode {
    logging::init().ok();

    let cli = Cli::parse();
    match cli.command {
        Command::Process(args) => commands::process::run(args),
        Command::Unprocess(args) => commands::unprocess::run(args),
        Command::Status(args) => commands::status::run(args),
        Command::History(args) => commands::history::run(args),
    }
}
