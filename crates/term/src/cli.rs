use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use smudge_core::DifferKind;

#[derive(Parser, Debug)]
#[command(name = "smudge")]
#[command(about = "Line markers for unsaved edits")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// Classify the lines of CURRENT against BASELINE
	Diff(DiffArgs),
	/// Track FILE and print its markers whenever they change
	Watch(WatchArgs),
}

#[derive(Args, Debug)]
pub struct DiffArgs {
	/// Known-clean text
	pub baseline: PathBuf,

	/// Edited text
	pub current: PathBuf,

	/// Line differ to use
	#[arg(long, value_enum, default_value_t = DifferArg::Builtin)]
	pub differ: DifferArg,

	/// Git executable for `--differ git`
	#[arg(long, value_name = "PATH", default_value = "git")]
	pub git_path: String,

	/// Print classifications as JSON
	#[arg(long)]
	pub json: bool,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
	/// File to track
	pub file: PathBuf,

	/// Configuration file (defaults to the user config directory)
	#[arg(short, long, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// How often FILE is re-read, in milliseconds
	#[arg(long, value_name = "MS", default_value_t = 200)]
	pub poll_ms: u64,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifferArg {
	/// In-process line diff
	Builtin,
	/// `git diff --no-index`
	Git,
}

impl From<DifferArg> for DifferKind {
	fn from(value: DifferArg) -> Self {
		match value {
			DifferArg::Builtin => DifferKind::Builtin,
			DifferArg::Git => DifferKind::Git,
		}
	}
}
