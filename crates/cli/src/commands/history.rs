use std::process::ExitCode;

use clap::Args;
use imbatch_runtime::history::HistoryStore;
use log::{error, info};

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Number of entries to display
    #[arg(long, short = 'n', default_value = "20")]
    pub limit: usize,

    /// Clear all history
    #[arg(long)]
    pub clear: bool,
}

pub fn run(args: HistoryArgs) -> ExitCode {
    let store = match HistoryStore::new() {
        Some(s) => s,
        None => {
            info!("[history] history is disabled");
            println!("History is disabled.");
            return ExitCode::SUCCESS;
        }
    };

    if args.clear {
        return match store.clear() {
            Ok(()) => {
                println!("History cleared");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("[history] failed to clear {}: {e}", store.path().display());
                eprintln!("[history] failed to clear history: {e}");
                ExitCode::from(1)
            }
        };
    }

    let runs = store.recent_runs(args.limit);

    if runs.is_empty() {
        println!("No history yet.");
        return ExitCode::SUCCESS;
    }

    println!(
        "{:<20}  {:<9}  {:>6}  {:>6}  {:>8}  {:<6}  ROOT",
        "TIMESTAMP", "KIND", "DONE", "SKIP", "TIME", "RESULT"
    );
    println!("{}", "-".repeat(80));

    for run in &runs {
        let ts = run.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
        let result = if run.succeeded() { "ok" } else { "FAILED" };

        println!(
            "{:<20}  {:<9}  {:>6}  {:>6}  {:>6}ms  {:<6}  {}",
            ts,
            run.kind.as_str(),
            run.committed,
            run.skipped,
            run.duration_ms,
            result,
            run.root.display()
        );
        if let Some(err) = &run.error {
            println!("{:>22}{err}", "");
        }
    }

    let total = store.count();
    if total > args.limit {
        println!(
            "\n({} more entries, use --limit to show more)",
            total - args.limit
        );
    }

    ExitCode::SUCCESS
}
