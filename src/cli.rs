//! # CLI
//!
//! ```bash
//! kennel serve --config config/kennel.yaml --addr 127.0.0.1:8080
//! kennel serve --db data/kennel.db --views views --assets assets
//! kennel routes
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::app;
use crate::config::AppConfig;
use crate::registry;
use crate::runtime_config::RuntimeConfig;
use crate::server::HttpServer;

#[derive(Parser)]
#[command(name = "kennel")]
#[command(about = "Cat and dog registry service", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// YAML configuration file (default: config/kennel.yaml if present)
        #[arg(short, long, env = "KENNEL_CONFIG")]
        config: Option<PathBuf>,

        /// Address and port to bind
        #[arg(long)]
        addr: Option<String>,

        /// SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,

        /// Template directory overriding the built-in views
        #[arg(long)]
        views: Option<PathBuf>,

        /// Directory served under /assets/
        #[arg(long)]
        assets: Option<PathBuf>,
    },
    /// Print the routing table
    Routes,
}

pub fn run_cli(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve {
            config,
            addr,
            db,
            views,
            assets,
        } => {
            let mut app_config = AppConfig::load(config.as_deref())?;
            app_config.apply_env();
            if let Some(addr) = addr {
                app_config.server.addr = addr;
            }
            if db.is_some() {
                app_config.storage.path = db;
            }
            if views.is_some() {
                app_config.views.dir = views;
            }
            if assets.is_some() {
                app_config.assets.dir = assets;
            }
            serve(&app_config)
        }
        Commands::Routes => {
            for line in route_lines() {
                println!("{line}");
            }
            Ok(())
        }
    }
}

fn route_lines() -> Vec<String> {
    let mut lines: Vec<String> = registry::endpoints()
        .iter()
        .map(|e| format!("{:<6} {:<12} {}", e.method.as_str(), e.path, e.handler_name))
        .collect();
    lines.push(format!("{:<6} {:<12} {}", "GET", "/health", "(built-in)"));
    lines.push(format!("{:<6} {:<12} {}", "GET", "/metrics", "(built-in)"));
    lines.push(format!("{:<6} {:<12} {}", "GET", "/assets/*", "(static)"));
    lines
}

fn serve(config: &AppConfig) -> Result<()> {
    let runtime = RuntimeConfig::from_env();
    may::config().set_stack_size(runtime.stack_size);

    let app = app::from_config(config, runtime)?;
    let handle = HttpServer(app.service)
        .start(config.server.addr.as_str())
        .with_context(|| format!("Failed to bind {}", config.server.addr))?;
    handle.wait_ready().context("Server did not become ready")?;
    info!(addr = %handle.addr(), "Kennel is ready");

    wait_for_shutdown(handle)
}

#[cfg(unix)]
fn wait_for_shutdown(handle: crate::server::ServerHandle) -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM]).context("Failed to install signal handlers")?;
    if let Some(signal) = signals.forever().next() {
        info!(signal, "Shutdown signal received");
    }
    handle.stop();
    Ok(())
}

#[cfg(not(unix))]
fn wait_for_shutdown(handle: crate::server::ServerHandle) -> Result<()> {
    handle
        .join()
        .map_err(|e| anyhow::anyhow!("Server coroutine panicked: {e:?}"))
}
