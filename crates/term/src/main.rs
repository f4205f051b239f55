//! `smudge`: line markers for unsaved edits, in a terminal.
//!
//! - `smudge diff` classifies the lines of one file against another
//! - `smudge watch` tracks a file and prints its markers as it changes

mod cli;
mod diff;
mod host;
mod watch;

use std::path::PathBuf;

use clap::Parser;
use cli::{Cli, Command};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	match cli.command {
		Command::Diff(args) => diff::run(args).await,
		Command::Watch(args) => watch::run(args).await,
	}
}

fn setup_tracing(verbose: bool) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let filter = || {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("smudge=trace,debug")
			} else {
				EnvFilter::new("smudge=info")
			}
		})
	};

	// SMUDGE_LOG_DIR keeps stderr quiet while watching
	if let Some(log_dir) = std::env::var("SMUDGE_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("smudge.{}.log", std::process::id()));
		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_target(true);
			tracing_subscriber::registry().with(filter()).with(file_layer).init();
			tracing::info!(path = ?log_path, "smudge.tracing_initialized");
			return;
		}
	}

	tracing_subscriber::fmt()
		.with_env_filter(filter())
		.with_writer(std::io::stderr)
		.init();
}
