//! td - taskdeck CLI
//!
//! A task tracker backed by a hosted auth/data service: log in once, then
//! add, edit, filter, and complete tasks from the command line or the
//! terminal dashboard.

use clap::Parser;
use taskdeck::cli::Cli;
use taskdeck::output::{emit_error, infer_command_name_from_args};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    let command = infer_command_name_from_args();
    let cli = Cli::parse();

    // Tracing is opt-in via RUST_LOG (or --verbose).
    // Keep startup robust in CI/robot envs: ignore invalid/huge filters.
    let fallback = if cli.verbose { "taskdeck=debug" } else { "off" };
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let json = cli.json;
    if let Err(err) = cli.run().await {
        let _ = emit_error(&command, &err, json);
        std::process::exit(err.exit_code());
    }
}
