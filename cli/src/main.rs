//! Terminal front end for the habit tracker.
//!
//! Reads one command per line from stdin, drives `HabitController`, and
//! prints the rendered view after every command. Set `HABIT_API_BASE` to
//! point at a different backend and `RUST_LOG` to see request logs on
//! stderr.

mod command;
mod shell;
mod terminal;
mod transport;

use std::io;

use habit_core::{Config, HabitClient, HabitController};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::terminal::Terminal;
use crate::transport::UreqTransport;

fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let config = Config::from_env();
    info!(base_url = %config.base_url, "starting habit shell");

    let terminal = Terminal::new(io::stdin().lock(), io::stdout());
    let mut controller =
        HabitController::new(HabitClient::new(&config.base_url), UreqTransport::new(), terminal);
    shell::run(&mut controller)?;
    Ok(())
}
