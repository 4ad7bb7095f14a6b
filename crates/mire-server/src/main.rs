//! mire-server entry point
//!
//! Startup order matters: config, swap files, listener, then exactly one
//! accepted connection. Any failure before the serving loop is startup-fatal;
//! any failure inside it is a transport fault and exits nonzero. That is the
//! whole lifecycle; there is no shutdown path.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use mire_server::{serve, Config, ServerCtx};
use mire_store::SwapFile;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mire-server", about = "Swap-space backend daemon")]
struct Args {
    /// Path to the TOML config file
    #[arg(long, default_value = "mire.toml")]
    config: PathBuf,

    /// Log filter (overrides RUST_LOG)
    #[arg(long)]
    log: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = match &args.log {
        Some(spec) => EnvFilter::new(spec),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;
    tracing::info!(?config, "configuration loaded");

    let files = config
        .swap_files
        .iter()
        .map(|path| SwapFile::create(path, config.max_pages(), config.page_size))
        .collect::<std::io::Result<Vec<_>>>()
        .context("creating swap files")?;

    let mut ctx = ServerCtx {
        files,
        max_frames: config.max_frames,
        delay: config.delay(),
    };

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "listening for the memory client");

    // This flow serves exactly one connection for the process lifetime.
    let (mut stream, peer) = listener.accept().await.context("accepting the client")?;
    tracing::info!(%peer, "memory client connected");

    match serve(&mut stream, &mut ctx).await {
        Ok(never) => match never {},
        Err(fault) => {
            tracing::error!(error = %fault, "connection is dead, exiting");
            Err(fault.into())
        }
    }
}
