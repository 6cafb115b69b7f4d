use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use scout_core::{ReplayResult, load_journal_from_file, replay_journal};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSONL journal to replay
    #[arg(short, long)]
    journal: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let journal = load_journal_from_file(&args.journal)
        .with_context(|| format!("Failed to load journal file: {}", args.journal.display()))?;

    let result: ReplayResult =
        replay_journal(&journal).context("Replay failed during execution")?;

    println!("Replay complete.");
    println!("Build: {}", journal.build_id);
    println!("Policy: {:?}", journal.policy);
    println!("Final Tick: {}", result.final_tick);
    println!("Snapshot Hash: {}", result.final_snapshot_hash);

    Ok(())
}
