//! Per-document marker styles and the line ranges currently drawn with them.

use rustc_hash::FxHashMap;
use smudge_primitives::{AnnotationId, DocumentId, LineClassification, LineKind, StyleId, SurfaceId};
use tracing::trace;

use crate::error::{Error, Result};
use crate::host::{AnnotationThread, MarkerHost};
use crate::style::MarkerStyle;

/// Host handles for one document's three marker styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleSet {
	pub add: StyleId,
	pub del: StyleId,
	pub change: StyleId,
}

impl StyleSet {
	/// Creates one host style per kind. `styles` is in [`LineKind::ALL`] order.
	pub fn create(host: &mut dyn MarkerHost, styles: &[MarkerStyle; 3]) -> Self {
		Self {
			add: host.create_style(&styles[0]),
			del: host.create_style(&styles[1]),
			change: host.create_style(&styles[2]),
		}
	}

	pub fn get(&self, kind: LineKind) -> StyleId {
		match kind {
			LineKind::Added => self.add,
			LineKind::Deleted => self.del,
			LineKind::Changed => self.change,
		}
	}

	fn dispose(self, host: &mut dyn MarkerHost) {
		for kind in LineKind::ALL {
			host.dispose_style(self.get(kind));
		}
	}
}

/// Marker lines per kind, each sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineRanges {
	pub add: Vec<usize>,
	pub del: Vec<usize>,
	pub change: Vec<usize>,
}

impl LineRanges {
	pub fn from_classifications(entries: &[LineClassification]) -> Self {
		let mut ranges = Self::default();
		for entry in entries {
			ranges.lines_mut(entry.kind).push(entry.line_number);
		}
		for kind in LineKind::ALL {
			let lines = ranges.lines_mut(kind);
			lines.sort_unstable();
			lines.dedup();
		}
		ranges
	}

	pub fn is_empty(&self) -> bool {
		self.add.is_empty() && self.del.is_empty() && self.change.is_empty()
	}

	pub fn lines(&self, kind: LineKind) -> &[usize] {
		match kind {
			LineKind::Added => &self.add,
			LineKind::Deleted => &self.del,
			LineKind::Changed => &self.change,
		}
	}

	fn lines_mut(&mut self, kind: LineKind) -> &mut Vec<usize> {
		match kind {
			LineKind::Added => &mut self.add,
			LineKind::Deleted => &mut self.del,
			LineKind::Changed => &mut self.change,
		}
	}

	/// Every marked line across kinds, unsorted.
	pub fn all_lines(&self) -> impl Iterator<Item = usize> + '_ {
		self.add.iter().chain(&self.del).chain(&self.change).copied()
	}
}

/// What is currently rendered for one document.
#[derive(Debug)]
pub struct DecorationState {
	pub styles: StyleSet,
	pub ranges: LineRanges,
	pub annotations: Vec<AnnotationId>,
}

impl DecorationState {
	/// Draws the current ranges on `surface`. Idempotent.
	pub fn apply_to(&self, surface: SurfaceId, host: &mut dyn MarkerHost) {
		for kind in LineKind::ALL {
			host.apply_markers(surface, self.styles.get(kind), self.ranges.lines(kind));
		}
	}
}

/// Owns every tracked document's [`DecorationState`].
///
/// Styles are created on first use and released exactly once, in
/// [`DecorationStore::dispose`] or when replaced by [`DecorationStore::restyle`].
#[derive(Debug, Default)]
pub struct DecorationStore {
	states: FxHashMap<DocumentId, DecorationState>,
}

impl DecorationStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the state for `id`, creating styles with `create` if absent.
	pub fn ensure(&mut self, id: &DocumentId, create: impl FnOnce() -> StyleSet) -> &mut DecorationState {
		self.states.entry(id.clone()).or_insert_with(|| DecorationState {
			styles: create(),
			ranges: LineRanges::default(),
			annotations: Vec::new(),
		})
	}

	/// Swaps in new ranges and annotation threads as one unit.
	///
	/// Old annotations are disposed before the new ones are created.
	pub fn replace_ranges(
		&mut self,
		id: &DocumentId,
		ranges: LineRanges,
		threads: &[AnnotationThread],
		host: &mut dyn MarkerHost,
	) -> Result<()> {
		let state = self.states.get_mut(id).ok_or_else(|| Error::NotTracked(id.clone()))?;
		for annotation in state.annotations.drain(..) {
			host.dispose_annotation(annotation);
		}
		let annotations = threads.iter().filter_map(|thread| host.create_annotation(id, thread)).collect();
		trace!(
			doc = %id,
			added = ranges.add.len(),
			deleted = ranges.del.len(),
			changed = ranges.change.len(),
			"smudge.decoration.replace"
		);
		state.ranges = ranges;
		state.annotations = annotations;
		Ok(())
	}

	/// Replaces the styles of `id`, releasing the old ones. Ranges survive.
	pub fn restyle(&mut self, id: &DocumentId, styles: StyleSet, host: &mut dyn MarkerHost) -> Result<()> {
		let state = self.states.get_mut(id).ok_or_else(|| Error::NotTracked(id.clone()))?;
		let old = std::mem::replace(&mut state.styles, styles);
		old.dispose(host);
		Ok(())
	}

	/// Releases every host resource held for `id`. Returns whether anything was held.
	pub fn dispose(&mut self, id: &DocumentId, host: &mut dyn MarkerHost) -> bool {
		let Some(state) = self.states.remove(id) else {
			return false;
		};
		for annotation in state.annotations {
			host.dispose_annotation(annotation);
		}
		state.styles.dispose(host);
		true
	}

	pub fn get(&self, id: &DocumentId) -> Option<&DecorationState> {
		self.states.get(id)
	}

	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}
}
