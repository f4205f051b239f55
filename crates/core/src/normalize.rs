//! Diff operations to per-line classifications.
//!
//! # Rules
//!
//! Walking the operation stream with a cursor over current-document lines:
//!
//! 1. `equal` produces nothing and moves the cursor past its line.
//! 2. `replace` is a changed line.
//! 3. A run of `delete`s immediately followed by a run of `insert`s starting at
//!    the cursor is a replaced block: deletions and insertions pair up in order
//!    as changed lines (new line number and text, old line number). Pairing
//!    never reaches across any other operation.
//! 4. Unpaired insertions are added lines.
//! 5. Unpaired deletions left at one gap collapse into a single deleted entry at
//!    the gap position in the current document, carrying the removed text (or a
//!    placeholder when it is blank) and the number of baseline lines removed.
//!
//! The output is sorted by line number with no duplicates. If a malformed
//! stream would put two entries on one line, they are merged; a deletion merged
//! into an added line turns it into a changed line.

use std::collections::VecDeque;

use smudge_differ::DiffOp;
use smudge_primitives::{LineClassification, LineKind};

/// Stand-in text for deletions whose removed text is blank.
pub const DELETED_PLACEHOLDER: &str = "...";

/// Classifies a differ's operation stream.
pub fn normalize(ops: &[DiffOp]) -> Vec<LineClassification> {
	let mut walker = Walker::default();
	for op in ops {
		walker.feed(op);
	}
	walker.finish()
}

#[derive(Default)]
struct Walker<'a> {
	entries: Vec<LineClassification>,
	/// Next current-document line not yet accounted for.
	cursor: usize,
	/// Deletions waiting for an insertion run at `cursor`.
	deletes: VecDeque<(usize, &'a str)>,
	/// The previous operation was an insertion paired into `deletes`.
	pairing: bool,
}

impl<'a> Walker<'a> {
	fn feed(&mut self, op: &'a DiffOp) {
		match op {
			DiffOp::Equal { new_index, .. } => {
				self.flush_deletes();
				self.cursor = new_index + 1;
			}
			DiffOp::Replace {
				old_index,
				new_index,
				new_text,
				..
			} => {
				self.flush_deletes();
				self.entries.push(LineClassification::changed(*new_index, *old_index, new_text.as_str()));
				self.cursor = new_index + 1;
			}
			DiffOp::Delete { old_index, text } => {
				if self.pairing {
					self.flush_deletes();
				}
				self.deletes.push_back((*old_index, text.as_str()));
			}
			DiffOp::Insert { new_index, text } => {
				let partner = if *new_index == self.cursor {
					self.deletes.pop_front()
				} else {
					None
				};
				match partner {
					Some((old_index, _)) => {
						self.entries.push(LineClassification::changed(*new_index, old_index, text.as_str()));
						self.pairing = true;
					}
					None => {
						self.flush_deletes();
						self.entries.push(LineClassification::added(*new_index, text.as_str()));
					}
				}
				self.cursor = new_index + 1;
			}
		}
	}

	/// Emits pending deletions as one entry at the current gap.
	fn flush_deletes(&mut self) {
		self.pairing = false;
		let Some(&(first_old, _)) = self.deletes.front() else {
			return;
		};
		let count = self.deletes.len();
		let text = self.deletes.drain(..).map(|(_, text)| text).collect::<Vec<_>>().join("\n");
		self.entries.push(LineClassification::deleted(self.cursor, first_old, deleted_value(text), count));
	}

	fn finish(mut self) -> Vec<LineClassification> {
		self.flush_deletes();
		let mut entries = self.entries;
		entries.sort_by_key(|entry| entry.line_number);

		let mut out: Vec<LineClassification> = Vec::with_capacity(entries.len());
		for entry in entries {
			match out.pop() {
				Some(prev) if prev.line_number == entry.line_number => out.push(merge(prev, entry)),
				Some(prev) => {
					out.push(prev);
					out.push(entry);
				}
				None => out.push(entry),
			}
		}
		out
	}
}

fn deleted_value(text: String) -> String {
	if text.trim().is_empty() {
		DELETED_PLACEHOLDER.to_string()
	} else {
		text
	}
}

/// Merges two entries that landed on the same line; `a` came first.
fn merge(a: LineClassification, b: LineClassification) -> LineClassification {
	let old_lines = a.old_lines + b.old_lines;
	let old_line_number = match (a.old_line_number, b.old_line_number) {
		(Some(x), Some(y)) => Some(x.min(y)),
		(x, y) => x.or(y),
	};

	let (kind, line_value) = match (a.kind, b.kind) {
		(LineKind::Deleted, LineKind::Deleted) => {
			let joined = format!("{}\n{}", a.line_value, b.line_value);
			(LineKind::Deleted, joined)
		}
		(LineKind::Deleted, _) => (LineKind::Changed, b.line_value),
		(_, LineKind::Deleted) => (LineKind::Changed, a.line_value),
		(kind, _) => (kind, a.line_value),
	};
	let kind = if kind == LineKind::Added && old_line_number.is_some() {
		LineKind::Changed
	} else {
		kind
	};

	LineClassification {
		line_number: a.line_number,
		old_line_number,
		line_value,
		kind,
		old_lines,
	}
}
