use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::unified::{ops_from_hunks, parse_hunks};
use crate::{DiffError, DiffOp, LineDiffer, Result, all_equal, split_lines};

/// Differ that runs `git diff --no-index` on two temporary files.
#[derive(Debug, Clone)]
pub struct GitDiffer {
	program: PathBuf,
}

impl GitDiffer {
	/// Resolves `program` (a name on `PATH` or a path) to an executable.
	pub fn new(program: impl AsRef<OsStr>) -> Result<Self> {
		let program = program.as_ref();
		let resolved = which::which(program)
			.map_err(|err| DiffError::Unavailable(format!("cannot find {}: {err}", program.to_string_lossy())))?;
		debug!(program = %resolved.display(), "smudge.differ.git_resolved");
		Ok(Self { program: resolved })
	}

	/// Resolved executable path.
	pub fn program(&self) -> &Path {
		&self.program
	}
}

#[async_trait]
impl LineDiffer for GitDiffer {
	fn name(&self) -> &'static str {
		"git"
	}

	async fn diff(&self, baseline: &str, current: &str) -> Result<Vec<DiffOp>> {
		let dir = tempfile::tempdir()?;
		let old_path = dir.path().join("baseline");
		let new_path = dir.path().join("current");
		tokio::fs::write(&old_path, baseline).await?;
		tokio::fs::write(&new_path, current).await?;

		let output = Command::new(&self.program)
			.args(["diff", "--no-index", "--no-renames", "--no-color", "--no-ext-diff", "--unified=0"])
			.arg(&old_path)
			.arg(&new_path)
			.stdin(Stdio::null())
			.kill_on_drop(true)
			.output()
			.await?;

		trace!(status = ?output.status.code(), bytes = output.stdout.len(), "smudge.differ.git_exit");

		match output.status.code() {
			Some(0) => Ok(all_equal(current)),
			Some(1) => {
				let stdout = String::from_utf8_lossy(&output.stdout);
				let hunks = parse_hunks(&stdout)?;
				let baseline_len = split_lines(baseline).len();
				ops_from_hunks(hunks, baseline_len, &split_lines(current))
			}
			code => {
				let stderr = String::from_utf8_lossy(&output.stderr);
				Err(DiffError::Unavailable(format!(
					"git diff exited with {}: {}",
					code.map_or_else(|| "signal".to_string(), |c| c.to_string()),
					stderr.trim()
				)))
			}
		}
	}
}
