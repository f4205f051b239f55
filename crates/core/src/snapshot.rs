//! Baseline snapshots: what each document looked like before unsaved edits.

use ropey::Rope;
use rustc_hash::FxHashMap;
use smudge_primitives::DocumentId;

use crate::error::{Error, Result};

/// Immutable capture of a document's known-clean text.
#[derive(Debug, Clone)]
pub struct Snapshot {
	content: Rope,
	line_count: usize,
}

impl Snapshot {
	pub fn new(content: Rope, line_count: usize) -> Self {
		Self { content, line_count }
	}

	pub fn content(&self) -> &Rope {
		&self.content
	}

	pub fn line_count(&self) -> usize {
		self.line_count
	}

	/// Line counts first, full text only when they agree.
	pub fn matches(&self, content: &Rope, line_count: usize) -> bool {
		self.line_count == line_count && self.content == *content
	}
}

/// One snapshot per tracked document.
#[derive(Debug, Default)]
pub struct SnapshotStore {
	snapshots: FxHashMap<DocumentId, Snapshot>,
}

impl SnapshotStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Captures the first snapshot for `id`.
	pub fn start_tracking(&mut self, id: DocumentId, content: Rope, line_count: usize) -> Result<()> {
		if self.snapshots.contains_key(&id) {
			return Err(Error::AlreadyTracked(id));
		}
		self.snapshots.insert(id, Snapshot::new(content, line_count));
		Ok(())
	}

	pub fn get(&self, id: &DocumentId) -> Result<&Snapshot> {
		self.snapshots.get(id).ok_or_else(|| Error::NotTracked(id.clone()))
	}

	/// Whether `content` is exactly the stored snapshot.
	pub fn is_unchanged(&self, id: &DocumentId, content: &Rope, line_count: usize) -> Result<bool> {
		Ok(self.get(id)?.matches(content, line_count))
	}

	/// Replaces the snapshot of an already tracked document wholesale.
	pub fn replace(&mut self, id: &DocumentId, content: Rope, line_count: usize) -> Result<()> {
		let slot = self.snapshots.get_mut(id).ok_or_else(|| Error::NotTracked(id.clone()))?;
		*slot = Snapshot::new(content, line_count);
		Ok(())
	}

	/// Drops the snapshot. Returns whether one existed.
	pub fn stop_tracking(&mut self, id: &DocumentId) -> bool {
		self.snapshots.remove(id).is_some()
	}

	pub fn len(&self) -> usize {
		self.snapshots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.snapshots.is_empty()
	}
}
