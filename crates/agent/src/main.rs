use std::env;
use std::io::{self, BufReader};
use std::net::TcpStream;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use scout::run::run_session;
use scout::session::Session;
use scout::settings::{LOG_ENV, Settings};
use scout_core::{Agent, JournalWriter};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file; defaults to scout.toml in the platform config directory
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    host: Option<String>,
    #[arg(short, long)]
    port: Option<u16>,
    /// Directory for episode journals
    #[arg(long)]
    journal_dir: Option<PathBuf>,
    /// Do not write a journal for this episode
    #[arg(long)]
    no_journal: bool,
    /// Never spend a charge on a tree
    #[arg(long)]
    spare_trees: bool,
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(io::stderr)).init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings =
        Settings::load_or_default(args.config.as_deref()).context("Failed to load settings")?;
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(dir) = args.journal_dir {
        settings.journal_dir = Some(dir);
    }
    if args.spare_trees {
        settings.policy.detonate_trees = false;
    }

    init_tracing(&settings.log_filter_with(env::var(LOG_ENV).ok().as_deref()));

    let address = settings.address();
    let stream = TcpStream::connect(&address)
        .with_context(|| format!("Failed to connect to game server at {address}"))?;
    let reader = stream.try_clone().context("Failed to clone server stream")?;
    let mut session = Session::new(BufReader::new(reader), stream);
    info!(%address, policy = ?settings.policy, "connected");

    let mut writer = if args.no_journal {
        None
    } else {
        let started_at = SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_millis());
        match settings.journal_path(started_at) {
            Some(path) => {
                info!(path = %path.display(), "journaling episode");
                let writer = JournalWriter::create(&path, env!("CARGO_PKG_VERSION"), settings.policy)
                    .with_context(|| format!("Failed to create journal {}", path.display()))?;
                Some(writer)
            }
            None => None,
        }
    };

    let mut agent = Agent::new(settings.policy);
    let summary =
        run_session(&mut session, &mut agent, writer.as_mut()).context("Session failed")?;

    println!("Session ended: {:?}", summary.end);
    println!("Ticks: {}", summary.ticks);
    println!("Snapshot Hash: {}", summary.final_snapshot_hash);

    Ok(())
}
