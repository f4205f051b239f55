use serde::Serialize;

/// How a line differs from the baseline snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
	/// Present in the current text only.
	Added,
	/// Removed from the baseline; marks the gap where it used to be.
	Deleted,
	/// Present in both, with different content.
	Changed,
}

impl LineKind {
	/// All kinds, in marker-style order.
	pub const ALL: [LineKind; 3] = [LineKind::Added, LineKind::Deleted, LineKind::Changed];

	/// Lowercase name used in labels and logs.
	pub const fn name(self) -> &'static str {
		match self {
			Self::Added => "added",
			Self::Deleted => "deleted",
			Self::Changed => "changed",
		}
	}
}

/// One classified line of the current document.
///
/// Produced in batches by the normalizer; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineClassification {
	/// Zero-based line in the current document. For deletions, the gap position.
	pub line_number: usize,
	/// Best-known zero-based line in the baseline (deleted and changed lines only).
	pub old_line_number: Option<usize>,
	/// New text for added/changed lines, removed text for deletions.
	pub line_value: String,
	pub kind: LineKind,
	/// Number of baseline lines this entry accounts for.
	///
	/// Zero for additions, one for changes, the run length for deletions.
	pub old_lines: usize,
}

impl LineClassification {
	pub fn added(line_number: usize, text: impl Into<String>) -> Self {
		Self {
			line_number,
			old_line_number: None,
			line_value: text.into(),
			kind: LineKind::Added,
			old_lines: 0,
		}
	}

	pub fn changed(line_number: usize, old_line_number: usize, text: impl Into<String>) -> Self {
		Self {
			line_number,
			old_line_number: Some(old_line_number),
			line_value: text.into(),
			kind: LineKind::Changed,
			old_lines: 1,
		}
	}

	pub fn deleted(line_number: usize, old_line_number: usize, text: impl Into<String>, old_lines: usize) -> Self {
		Self {
			line_number,
			old_line_number: Some(old_line_number),
			line_value: text.into(),
			kind: LineKind::Deleted,
			old_lines,
		}
	}

	/// Line number shown to users: the baseline line when known.
	pub fn display_line(&self) -> usize {
		self.old_line_number.unwrap_or(self.line_number)
	}
}
