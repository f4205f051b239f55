//! A [`MarkerHost`] that has no surfaces to paint and only keeps the bookkeeping.

use rustc_hash::FxHashMap;
use smudge_core::{MarkerHost, MarkerStyle};
use smudge_primitives::{DocumentId, LineKind, StyleId, SurfaceId};
use tracing::{trace, warn};

#[derive(Debug, Default)]
pub struct ConsoleHost {
	next_style: u64,
	styles: FxHashMap<StyleId, LineKind>,
	flags: FxHashMap<DocumentId, bool>,
}

impl ConsoleHost {
	pub fn live_styles(&self) -> usize {
		self.styles.len()
	}

	pub fn has_markers(&self, doc: &DocumentId) -> bool {
		self.flags.get(doc).copied().unwrap_or(false)
	}
}

impl MarkerHost for ConsoleHost {
	fn create_style(&mut self, style: &MarkerStyle) -> StyleId {
		self.next_style += 1;
		let id = StyleId(self.next_style);
		self.styles.insert(id, style.kind);
		id
	}

	fn apply_markers(&mut self, surface: SurfaceId, style: StyleId, lines: &[usize]) {
		let kind = self.styles.get(&style).map(|kind| kind.name());
		trace!(surface = surface.0, style = style.0, kind, lines = lines.len(), "smudge.term.apply_markers");
	}

	fn dispose_style(&mut self, style: StyleId) {
		self.styles.remove(&style);
	}

	fn set_context_flag(&mut self, doc: &DocumentId, has_markers: bool) {
		self.flags.insert(doc.clone(), has_markers);
	}

	fn show_warning(&mut self, message: &str) {
		warn!("{message}");
		eprintln!("warning: {message}");
	}
}
