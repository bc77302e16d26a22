//! Roster development server
//!
//! Serves an in-memory employee directory over the same REST contract the
//! sync engine expects, so the client can be exercised without a backend.
//!
//! Usage:
//!   roster-devserver --port 5012 --seed 25
//!
//! Nothing is persisted; every restart begins from the seeded data set.

use std::sync::Arc;
use anyhow::{Context, Result};
use clap::Parser;
use roster_devserver::{build_router, Directory};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "roster-devserver")]
#[command(about = "In-memory employee directory for Roster development")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5012")]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Number of generated employees to start with
    #[arg(short, long, default_value = "25")]
    seed: usize,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("Roster devserver starting...");
    let directory = Arc::new(Directory::seeded(args.seed));
    info!("Seeded {} employees", directory.len().await);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    println!("\n========================================");
    println!("  Roster Devserver Running");
    println!("========================================");
    println!("  Base URL:  http://{}/api", addr);
    println!("  Employees: {}", args.seed);
    println!("========================================\n");

    axum::serve(listener, build_router(directory))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Roster devserver stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl-C, shutting down");
    }
}
