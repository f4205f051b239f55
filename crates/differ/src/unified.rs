//! Zero-context unified diff parsing.
//!
//! Only the hunk bodies of `--unified=0` output are read; file headers before
//! the first `@@` line are ignored. Equal runs between hunks are rebuilt from
//! the current text.

use crate::{DiffError, DiffOp, Result};

/// One `@@ -a,b +c,d @@` hunk with its removed and added lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hunk {
	/// One-based start in the baseline, or the line after which lines were inserted.
	pub old_start: usize,
	pub old_count: usize,
	/// One-based start in the current text, or the line after which lines were removed.
	pub new_start: usize,
	pub new_count: usize,
	pub removed: Vec<String>,
	pub added: Vec<String>,
}

impl Hunk {
	/// Zero-based index of the first affected baseline line (or the gap).
	fn old_begin(&self) -> usize {
		if self.old_count == 0 { self.old_start } else { self.old_start - 1 }
	}

	/// Zero-based index of the first affected current line (or the gap).
	fn new_begin(&self) -> usize {
		if self.new_count == 0 { self.new_start } else { self.new_start - 1 }
	}
}

/// Parses the hunks of a zero-context unified diff.
pub fn parse_hunks(output: &str) -> Result<Vec<Hunk>> {
	let mut hunks: Vec<Hunk> = Vec::new();

	for line in output.lines() {
		if let Some(header) = line.strip_prefix("@@") {
			hunks.push(parse_header(header)?);
			continue;
		}
		let Some(hunk) = hunks.last_mut() else {
			continue;
		};
		if let Some(text) = line.strip_prefix('-') {
			hunk.removed.push(text.to_string());
		} else if let Some(text) = line.strip_prefix('+') {
			hunk.added.push(text.to_string());
		} else if line.starts_with('\\') {
			// "\ No newline at end of file"
		} else if line.starts_with("diff ") {
			return Err(DiffError::Malformed("output spans more than one file".into()));
		} else {
			return Err(DiffError::Malformed(format!("unexpected line in hunk: {line:?}")));
		}
	}

	for hunk in &hunks {
		if hunk.removed.len() != hunk.old_count || hunk.added.len() != hunk.new_count {
			return Err(DiffError::Malformed(format!(
				"hunk -{},{} +{},{} has {} removed and {} added lines",
				hunk.old_start,
				hunk.old_count,
				hunk.new_start,
				hunk.new_count,
				hunk.removed.len(),
				hunk.added.len()
			)));
		}
	}

	Ok(hunks)
}

fn parse_header(header: &str) -> Result<Hunk> {
	let malformed = || DiffError::Malformed(format!("bad hunk header: @@{header}"));

	let mut parts = header.split_whitespace();
	let old = parts.next().and_then(|p| p.strip_prefix('-')).ok_or_else(malformed)?;
	let new = parts.next().and_then(|p| p.strip_prefix('+')).ok_or_else(malformed)?;
	let (old_start, old_count) = parse_range(old).ok_or_else(malformed)?;
	let (new_start, new_count) = parse_range(new).ok_or_else(malformed)?;

	if (old_count > 0 && old_start == 0) || (new_count > 0 && new_start == 0) {
		return Err(malformed());
	}

	Ok(Hunk {
		old_start,
		old_count,
		new_start,
		new_count,
		..Hunk::default()
	})
}

fn parse_range(range: &str) -> Option<(usize, usize)> {
	match range.split_once(',') {
		Some((start, count)) => Some((start.parse().ok()?, count.parse().ok()?)),
		None => Some((range.parse().ok()?, 1)),
	}
}

/// Expands hunks into the full operation stream for `current`.
///
/// `baseline_len` is the baseline line count; `current_lines` supplies the text
/// of the equal runs.
pub fn ops_from_hunks(hunks: Vec<Hunk>, baseline_len: usize, current_lines: &[&str]) -> Result<Vec<DiffOp>> {
	let mut ops = Vec::with_capacity(current_lines.len());
	let (mut old_pos, mut new_pos) = (0usize, 0usize);

	for hunk in hunks {
		let (old_begin, new_begin) = (hunk.old_begin(), hunk.new_begin());
		push_equal_run(&mut ops, old_pos, new_pos, old_begin, new_begin, current_lines)?;

		let paired = hunk.removed.len().min(hunk.added.len());
		let mut removed = hunk.removed.into_iter();
		let mut added = hunk.added.into_iter();
		for i in 0..paired {
			if let (Some(old_text), Some(new_text)) = (removed.next(), added.next()) {
				// Pairs that differ only in line terminators are unchanged lines.
				if same_line(&old_text, &new_text) {
					ops.push(DiffOp::Equal {
						old_index: old_begin + i,
						new_index: new_begin + i,
						text: new_text,
					});
					continue;
				}
				ops.push(DiffOp::Delete {
					old_index: old_begin + i,
					text: old_text,
				});
				ops.push(DiffOp::Insert {
					new_index: new_begin + i,
					text: new_text,
				});
			}
		}
		for (i, text) in removed.enumerate() {
			ops.push(DiffOp::Delete {
				old_index: old_begin + paired + i,
				text,
			});
		}
		for (i, text) in added.enumerate() {
			ops.push(DiffOp::Insert {
				new_index: new_begin + paired + i,
				text,
			});
		}

		old_pos = old_begin + hunk.old_count;
		new_pos = new_begin + hunk.new_count;
	}

	push_equal_run(&mut ops, old_pos, new_pos, baseline_len, current_lines.len(), current_lines)?;
	Ok(ops)
}

fn same_line(old_text: &str, new_text: &str) -> bool {
	old_text.strip_suffix('\r').unwrap_or(old_text) == new_text.strip_suffix('\r').unwrap_or(new_text)
}

/// Pushes the unchanged lines between two positions.
fn push_equal_run(
	ops: &mut Vec<DiffOp>,
	old_pos: usize,
	new_pos: usize,
	old_end: usize,
	new_end: usize,
	current_lines: &[&str],
) -> Result<()> {
	let (Some(old_gap), Some(new_gap)) = (old_end.checked_sub(old_pos), new_end.checked_sub(new_pos)) else {
		return Err(DiffError::Malformed(format!("hunks out of order at -{old_end} +{new_end}")));
	};
	if old_gap != new_gap || new_end > current_lines.len() {
		return Err(DiffError::Malformed(format!(
			"unchanged run mismatch: {old_gap} baseline lines vs {new_gap} current lines"
		)));
	}
	for k in 0..new_gap {
		ops.push(DiffOp::Equal {
			old_index: old_pos + k,
			new_index: new_pos + k,
			text: current_lines[new_pos + k].to_string(),
		});
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::split_lines;

	const REPLACE_AND_APPEND: &str = "\
diff --git a/baseline b/current
index 1111111..2222222 100644
--- a/baseline
+++ b/current
@@ -2 +2 @@
-b
+X
@@ -3,0 +4 @@
+d
";

	#[test]
	fn test_parse_headers_and_bodies() {
		let hunks = parse_hunks(REPLACE_AND_APPEND).unwrap();
		assert_eq!(hunks.len(), 2);
		assert_eq!((hunks[0].old_start, hunks[0].old_count, hunks[0].new_start, hunks[0].new_count), (2, 1, 2, 1));
		assert_eq!(hunks[0].removed, vec!["b".to_string()]);
		assert_eq!(hunks[0].added, vec!["X".to_string()]);
		assert_eq!((hunks[1].old_start, hunks[1].old_count, hunks[1].new_start, hunks[1].new_count), (3, 0, 4, 1));
	}

	#[test]
	fn test_ops_rebuild_equal_runs() {
		let current = "a\nX\nc\nd\n";
		let lines = split_lines(current);
		let ops = ops_from_hunks(parse_hunks(REPLACE_AND_APPEND).unwrap(), 3, &lines).unwrap();
		assert_eq!(
			ops,
			vec![
				DiffOp::Equal {
					old_index: 0,
					new_index: 0,
					text: "a".into()
				},
				DiffOp::Delete {
					old_index: 1,
					text: "b".into()
				},
				DiffOp::Insert {
					new_index: 1,
					text: "X".into()
				},
				DiffOp::Equal {
					old_index: 2,
					new_index: 2,
					text: "c".into()
				},
				DiffOp::Insert {
					new_index: 3,
					text: "d".into()
				},
			]
		);
	}

	#[test]
	fn test_pure_deletion_gap() {
		let output = "@@ -2 +1,0 @@\n-b\n";
		let lines = split_lines("a\n");
		let ops = ops_from_hunks(parse_hunks(output).unwrap(), 2, &lines).unwrap();
		assert_eq!(
			ops,
			vec![
				DiffOp::Equal {
					old_index: 0,
					new_index: 0,
					text: "a".into()
				},
				DiffOp::Delete {
					old_index: 1,
					text: "b".into()
				},
			]
		);
	}

	#[test]
	fn test_uneven_block_alternates_then_leftovers() {
		let output = "@@ -1,3 +1 @@\n-a\n-b\n-c\n+Z\n";
		let lines = split_lines("Z\n");
		let ops = ops_from_hunks(parse_hunks(output).unwrap(), 3, &lines).unwrap();
		let kinds: Vec<_> = ops
			.iter()
			.map(|op| match op {
				DiffOp::Delete { old_index, .. } => format!("-{old_index}"),
				DiffOp::Insert { new_index, .. } => format!("+{new_index}"),
				other => format!("{other:?}"),
			})
			.collect();
		assert_eq!(kinds, vec!["-0", "+0", "-1", "-2"]);
	}

	#[test]
	fn test_no_newline_marker_is_skipped() {
		let output = "@@ -1 +1 @@\n-a\n\\ No newline at end of file\n+b\n\\ No newline at end of file\n";
		let hunks = parse_hunks(output).unwrap();
		assert_eq!(hunks[0].removed, vec!["a".to_string()]);
		assert_eq!(hunks[0].added, vec!["b".to_string()]);
	}

	#[test]
	fn test_terminator_only_change_is_equal() {
		let output = "@@ -2 +2 @@\n-b\n\\ No newline at end of file\n+b\n";
		let lines = split_lines("a\nb\n");
		let ops = ops_from_hunks(parse_hunks(output).unwrap(), 2, &lines).unwrap();
		assert_eq!(ops, crate::all_equal("a\nb\n"));
	}

	#[test]
	fn test_crlf_pair_is_equal_but_real_edit_survives() {
		let output = "@@ -1,2 +1,2 @@\n-a\r\n-b\r\n+a\n+X\n";
		let lines = split_lines("a\nX\n");
		let ops = ops_from_hunks(parse_hunks(output).unwrap(), 2, &lines).unwrap();
		assert_eq!(
			ops,
			vec![
				DiffOp::Equal {
					old_index: 0,
					new_index: 0,
					text: "a".into()
				},
				DiffOp::Delete {
					old_index: 1,
					text: "b".into()
				},
				DiffOp::Insert {
					new_index: 1,
					text: "X".into()
				},
			]
		);
	}

	#[test]
	fn test_count_mismatch_is_malformed() {
		let output = "@@ -1,2 +1 @@\n-a\n+b\n";
		assert!(matches!(parse_hunks(output), Err(DiffError::Malformed(_))));
	}

	#[test]
	fn test_bad_header_is_malformed() {
		assert!(matches!(parse_hunks("@@ nonsense @@\n"), Err(DiffError::Malformed(_))));
	}

	#[test]
	fn test_length_mismatch_is_malformed() {
		let lines = split_lines("a\nb\n");
		assert!(matches!(ops_from_hunks(Vec::new(), 5, &lines), Err(DiffError::Malformed(_))));
	}
}
