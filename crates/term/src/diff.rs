//! `smudge diff`: classify one file against another and print the result.

use anyhow::Context;
use smudge_core::{Config, normalize};
use smudge_differ::diff_lines;
use smudge_primitives::{LineClassification, LineKind};

use crate::cli::DiffArgs;

pub async fn run(args: DiffArgs) -> anyhow::Result<()> {
	let baseline = tokio::fs::read_to_string(&args.baseline)
		.await
		.with_context(|| format!("reading {}", args.baseline.display()))?;
	let current = tokio::fs::read_to_string(&args.current)
		.await
		.with_context(|| format!("reading {}", args.current.display()))?;

	let config = Config {
		differ: args.differ.into(),
		git_path: args.git_path,
		..Config::default()
	};
	let differ = config.build_differ().context("preparing line differ")?;
	let ops = diff_lines(differ.as_ref(), &baseline, &current)
		.await
		.with_context(|| format!("diffing with {}", differ.name()))?;
	let entries = normalize(&ops);
	tracing::debug!(differ = differ.name(), ops = ops.len(), entries = entries.len(), "smudge.diff.done");

	if args.json {
		println!("{}", serde_json::to_string_pretty(&entries)?);
	} else {
		print!("{}", render(&entries));
	}
	Ok(())
}

/// One line per classification: `<line> <kind> [old <n>] <text>`, 1-based.
pub fn render(entries: &[LineClassification]) -> String {
	let mut out = String::new();
	for entry in entries {
		out.push_str(&format!("{} {}", entry.line_number + 1, entry.kind.name()));
		if let Some(old) = entry.old_line_number {
			out.push_str(&format!(" old {}", old + 1));
		}
		let text = match entry.kind {
			// Collapsed runs keep their lines on one row.
			LineKind::Deleted => entry.line_value.replace('\n', " | "),
			_ => entry.line_value.clone(),
		};
		if !text.is_empty() {
			out.push(' ');
			out.push_str(&text);
		}
		out.push('\n');
	}
	out
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn render_scenario() {
		let entries = [LineClassification::changed(1, 1, "X"), LineClassification::added(3, "d")];
		assert_eq!(render(&entries), "2 changed old 2 X\n4 added d\n");
	}

	#[test]
	fn render_collapsed_deletion() {
		let entries = [LineClassification::deleted(1, 1, "b\nc", 2)];
		assert_eq!(render(&entries), "2 deleted old 2 b | c\n");
	}

	#[test]
	fn render_blank_added_line() {
		let entries = [LineClassification::added(0, "")];
		assert_eq!(render(&entries), "1 added\n");
	}

	#[test]
	fn render_nothing() {
		assert_eq!(render(&[]), "");
	}
}
