//! Line differs: turn a baseline and a current text into aligned per-line operations.
//!
//! A [`LineDiffer`] is a swappable strategy. [`SimilarDiffer`] runs in-process,
//! [`GitDiffer`] shells out to `git diff --no-index`. Both produce the same
//! [`DiffOp`] stream contract:
//!
//! - operations are ordered by position in the current text,
//! - deletions sit at the old position they would have occupied,
//! - inside a replaced block, deletions and insertions alternate pairwise before
//!   any leftover deletions or insertions,
//! - output is deterministic for identical inputs.
//!
//! Callers go through [`diff_lines`], which handles the empty-baseline case
//! without consulting the strategy.

use async_trait::async_trait;

mod builtin;
mod error;
mod git;
mod unified;

pub use builtin::SimilarDiffer;
pub use error::{DiffError, Result};
pub use git::GitDiffer;
pub use unified::{Hunk, ops_from_hunks, parse_hunks};

/// One aligned line operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOp {
	/// Line present unchanged in both texts.
	Equal { old_index: usize, new_index: usize, text: String },
	/// Line present only in the current text.
	Insert { new_index: usize, text: String },
	/// Line present only in the baseline.
	Delete { old_index: usize, text: String },
	/// Baseline line replaced by a current line.
	Replace {
		old_index: usize,
		new_index: usize,
		old_text: String,
		new_text: String,
	},
}

impl DiffOp {
	/// Returns true for operations that leave the line untouched.
	pub fn is_equal(&self) -> bool {
		matches!(self, Self::Equal { .. })
	}
}

/// Renders the operation as unified-diff body lines.
impl std::fmt::Display for DiffOp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Equal { text, .. } => write!(f, " {text}"),
			Self::Insert { text, .. } => write!(f, "+{text}"),
			Self::Delete { text, .. } => write!(f, "-{text}"),
			Self::Replace { old_text, new_text, .. } => write!(f, "-{old_text}\n+{new_text}"),
		}
	}
}

/// Strategy that aligns two texts line by line.
#[async_trait]
pub trait LineDiffer: Send + Sync {
	/// Short name for logs.
	fn name(&self) -> &'static str;

	/// Diffs `baseline` against `current`.
	///
	/// Must not return partial output: on failure the whole call fails.
	async fn diff(&self, baseline: &str, current: &str) -> Result<Vec<DiffOp>>;
}

/// Diffs two texts through `differ`.
///
/// An empty baseline is answered directly with one insertion per current line,
/// so a document that starts empty never shows as a single file-wide replace.
pub async fn diff_lines(differ: &dyn LineDiffer, baseline: &str, current: &str) -> Result<Vec<DiffOp>> {
	if baseline.is_empty() {
		return Ok(all_inserted(current));
	}
	differ.diff(baseline, current).await
}

/// Every line of `text` as an insertion.
pub fn all_inserted(text: &str) -> Vec<DiffOp> {
	split_lines(text)
		.into_iter()
		.enumerate()
		.map(|(new_index, line)| DiffOp::Insert {
			new_index,
			text: line.to_string(),
		})
		.collect()
}

/// Every line of `text` as an unchanged line.
pub fn all_equal(text: &str) -> Vec<DiffOp> {
	split_lines(text)
		.into_iter()
		.enumerate()
		.map(|(index, line)| DiffOp::Equal {
			old_index: index,
			new_index: index,
			text: line.to_string(),
		})
		.collect()
}

/// Splits text into lines without their terminators.
///
/// A trailing terminator does not start another line, so `"a\n"` is one line
/// and `""` is none.
pub fn split_lines(text: &str) -> Vec<&str> {
	text.split_inclusive('\n').map(strip_terminator).collect()
}

fn strip_terminator(line: &str) -> &str {
	match line.strip_suffix('\n') {
		Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
		None => line,
	}
}
