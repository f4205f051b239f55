//! Trailing-edge debounce of reconciliation passes, keyed by document.
//!
//! Each edit replaces the pending pass for its document and pushes the
//! deadline out. Nothing runs here: the reconciler polls [`Debouncer::take_due`]
//! from its tick.

use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use smudge_primitives::DocumentId;

use crate::host::DocumentView;

#[derive(Debug)]
struct PendingPass {
	due: Instant,
	view: DocumentView,
}

/// At most one pending pass per document.
#[derive(Debug)]
pub struct Debouncer {
	delay: Duration,
	pending: FxHashMap<DocumentId, PendingPass>,
}

impl Debouncer {
	pub fn new(delay: Duration) -> Self {
		Self {
			delay,
			pending: FxHashMap::default(),
		}
	}

	/// Applies to passes scheduled from now on.
	pub fn set_delay(&mut self, delay: Duration) {
		self.delay = delay;
	}

	/// Schedules a pass over `view` due at `now + delay`. Returns whether one was already pending.
	pub fn schedule(&mut self, view: DocumentView, now: Instant) -> bool {
		let due = now + self.delay;
		self.pending.insert(view.id.clone(), PendingPass { due, view }).is_some()
	}

	/// Drops the pending pass for `id`. Returns whether one existed.
	pub fn cancel(&mut self, id: &DocumentId) -> bool {
		self.pending.remove(id).is_some()
	}

	pub fn is_pending(&self, id: &DocumentId) -> bool {
		self.pending.contains_key(id)
	}

	/// Earliest due time across pending passes.
	pub fn next_deadline(&self) -> Option<Instant> {
		self.pending.values().map(|p| p.due).min()
	}

	/// Removes and returns passes due by `now` for which `eligible` holds.
	///
	/// Ineligible due passes stay pending until a later call.
	pub fn take_due(&mut self, now: Instant, mut eligible: impl FnMut(&DocumentId) -> bool) -> Vec<DocumentView> {
		let ready: Vec<DocumentId> = self
			.pending
			.iter()
			.filter(|(id, pass)| pass.due <= now && eligible(id))
			.map(|(id, _)| id.clone())
			.collect();
		let mut views: Vec<DocumentView> = ready
			.iter()
			.filter_map(|id| self.pending.remove(id).map(|p| p.view))
			.collect();
		views.sort_by(|a, b| a.id.cmp(&b.id));
		views
	}

	pub fn len(&self) -> usize {
		self.pending.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pending.is_empty()
	}
}
