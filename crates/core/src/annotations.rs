//! Read-only annotation threads for deleted and changed lines.

use smudge_primitives::{DocumentId, LineClassification, LineKind};

use crate::host::{AnnotationComment, AnnotationThread};
use crate::normalize::DELETED_PLACEHOLDER;

/// Prefix of every thread label.
pub const ANNOTATION_LABEL: &str = "Show Unsaved Changes";

/// Builds one thread per run of consecutive deleted or changed lines.
///
/// `entries` must be sorted by line number, as [`crate::normalize`] returns them.
pub fn build_threads(doc: &DocumentId, language: Option<&str>, entries: &[LineClassification]) -> Vec<AnnotationThread> {
	let relevant: Vec<&LineClassification> = entries.iter().filter(|e| e.kind != LineKind::Added).collect();
	let label = format!("{ANNOTATION_LABEL}: {}", doc.stem());

	relevant
		.chunk_by(|a, b| b.line_number == a.line_number + 1)
		.map(|group| AnnotationThread {
			anchor_line: group[0].line_number,
			label: label.clone(),
			comments: group.iter().map(|entry| comment(entry, language)).collect(),
			can_reply: false,
		})
		.collect()
}

fn comment(entry: &LineClassification, language: Option<&str>) -> AnnotationComment {
	let verb = match entry.kind {
		LineKind::Changed => "Changed",
		_ => "Deleted",
	};
	let value = if entry.line_value.is_empty() {
		DELETED_PLACEHOLDER
	} else {
		entry.line_value.as_str()
	};
	AnnotationComment {
		author: format!("{verb} :{}", entry.display_line() + 1),
		body: format!("```{}\n{value}\n```", language.unwrap_or_default()),
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn test_groups_consecutive_lines() {
		let doc = DocumentId::new("/w/src/main.rs");
		let entries = [
			LineClassification::changed(1, 1, "let a = 2;"),
			LineClassification::deleted(2, 3, "old();", 1),
			LineClassification::added(3, "new();"),
			LineClassification::changed(6, 5, ""),
		];
		let threads = build_threads(&doc, Some("rust"), &entries);
		assert_eq!(threads.len(), 2);

		assert_eq!(threads[0].anchor_line, 1);
		assert_eq!(threads[0].label, "Show Unsaved Changes: main");
		assert!(!threads[0].can_reply);
		assert_eq!(
			threads[0].comments,
			vec![
				AnnotationComment {
					author: "Changed :2".into(),
					body: "```rust\nlet a = 2;\n```".into(),
				},
				AnnotationComment {
					author: "Deleted :4".into(),
					body: "```rust\nold();\n```".into(),
				},
			]
		);

		assert_eq!(threads[1].anchor_line, 6);
		assert_eq!(threads[1].comments[0].author, "Changed :6");
		assert_eq!(threads[1].comments[0].body, "```rust\n...\n```");
	}

	#[test]
	fn test_added_only_builds_nothing() {
		let doc = DocumentId::new("untitled-1");
		let entries = [LineClassification::added(0, "x"), LineClassification::added(1, "y")];
		assert!(build_threads(&doc, None, &entries).is_empty());
	}

	#[test]
	fn test_added_line_splits_groups() {
		let doc = DocumentId::new("a.txt");
		let entries = [
			LineClassification::changed(0, 0, "a"),
			LineClassification::added(1, "b"),
			LineClassification::changed(2, 2, "c"),
		];
		let threads = build_threads(&doc, None, &entries);
		assert_eq!(threads.len(), 2);
		assert_eq!(threads[0].comments[0].body, "```\na\n```");
	}
}
