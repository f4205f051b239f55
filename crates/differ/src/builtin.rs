use async_trait::async_trait;
use similar::{DiffTag, TextDiff};

use crate::{DiffError, DiffOp, LineDiffer, Result, split_lines};

/// In-process differ backed by `similar`'s Myers implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimilarDiffer;

impl SimilarDiffer {
	/// Synchronous diff, usable outside a runtime.
	pub fn line_ops(baseline: &str, current: &str) -> Vec<DiffOp> {
		let old_lines = split_lines(baseline);
		let new_lines = split_lines(current);
		let diff = TextDiff::from_slices(&old_lines, &new_lines);

		let mut ops = Vec::with_capacity(new_lines.len().max(old_lines.len()));
		for op in diff.ops() {
			let (tag, old_range, new_range) = op.as_tag_tuple();
			match tag {
				DiffTag::Equal => {
					for (old_index, new_index) in old_range.zip(new_range) {
						ops.push(DiffOp::Equal {
							old_index,
							new_index,
							text: new_lines[new_index].to_string(),
						});
					}
				}
				DiffTag::Delete => {
					for old_index in old_range {
						ops.push(DiffOp::Delete {
							old_index,
							text: old_lines[old_index].to_string(),
						});
					}
				}
				DiffTag::Insert => {
					for new_index in new_range {
						ops.push(DiffOp::Insert {
							new_index,
							text: new_lines[new_index].to_string(),
						});
					}
				}
				DiffTag::Replace => {
					let paired = old_range.len().min(new_range.len());
					for i in 0..paired {
						let (old_index, new_index) = (old_range.start + i, new_range.start + i);
						ops.push(DiffOp::Replace {
							old_index,
							new_index,
							old_text: old_lines[old_index].to_string(),
							new_text: new_lines[new_index].to_string(),
						});
					}
					for old_index in old_range.start + paired..old_range.end {
						ops.push(DiffOp::Delete {
							old_index,
							text: old_lines[old_index].to_string(),
						});
					}
					for new_index in new_range.start + paired..new_range.end {
						ops.push(DiffOp::Insert {
							new_index,
							text: new_lines[new_index].to_string(),
						});
					}
				}
			}
		}
		ops
	}
}

#[async_trait]
impl LineDiffer for SimilarDiffer {
	fn name(&self) -> &'static str {
		"builtin"
	}

	async fn diff(&self, baseline: &str, current: &str) -> Result<Vec<DiffOp>> {
		let baseline = baseline.to_owned();
		let current = current.to_owned();
		tokio::task::spawn_blocking(move || Self::line_ops(&baseline, &current))
			.await
			.map_err(|err| DiffError::Unavailable(format!("diff task failed: {err}")))
	}
}
