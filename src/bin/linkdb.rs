//! linkdb Console Binary
//!
//! Runs the interactive command loop on stdin / stdout.

use std::io;

use clap::Parser;
use linkdb::console::Session;
use linkdb::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// linkdb console
#[derive(Parser, Debug)]
#[command(name = "linkdb")]
#[command(about = "Buyer / book record store over fixed-length binary files")]
#[command(version)]
struct Args {
    /// Directory holding the data files
    #[arg(short, long, default_value = ".")]
    data_dir: String,

    /// Skip pruning free-lists against the data files on startup
    #[arg(long)]
    no_verify: bool,

    /// Rebuild the index from the master file instead of loading it
    #[arg(long)]
    rebuild_index: bool,
}

fn main() {
    // Logs go to stderr so they never mix with console output
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,linkdb=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("linkdb v{}", linkdb::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .verify_free_lists(!args.no_verify)
        .rebuild_index(args.rebuild_index)
        .build();

    let mut engine = match Engine::open(config) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    {
        let mut session = Session::new(&mut engine, io::stdin().lock(), io::stdout().lock());
        if let Err(e) = session.run() {
            tracing::error!("Console error: {}", e);
        }
    }

    // Persist index and free-lists even if the console failed
    if let Err(e) = engine.close() {
        tracing::error!("Failed to persist session state: {}", e);
    }
}
