//! Test doubles shared by the unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use smudge_differ::{DiffError, DiffOp, LineDiffer, SimilarDiffer};
use smudge_primitives::{AnnotationId, DocumentId, LineKind, StyleId, SurfaceId};
use tokio::sync::Semaphore;

use crate::host::{AnnotationThread, MarkerHost};
use crate::style::MarkerStyle;

/// Records every host call and panics on double disposal.
#[derive(Debug, Default)]
pub struct RecordingHost {
	next_id: u64,
	pub styles: FxHashMap<StyleId, MarkerStyle>,
	pub disposed_styles: Vec<StyleId>,
	pub applied: FxHashMap<(SurfaceId, StyleId), Vec<usize>>,
	pub apply_calls: usize,
	pub annotations: FxHashMap<AnnotationId, (DocumentId, AnnotationThread)>,
	pub disposed_annotations: Vec<AnnotationId>,
	pub flags: FxHashMap<DocumentId, bool>,
	pub warnings: Vec<String>,
	pub annotations_supported: bool,
}

impl RecordingHost {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_annotations() -> Self {
		Self {
			annotations_supported: true,
			..Self::default()
		}
	}

	/// Lines currently drawn on `surface` by live styles of `kind`.
	pub fn markers(&self, surface: SurfaceId, kind: LineKind) -> Vec<usize> {
		let mut lines: Vec<usize> = self
			.applied
			.iter()
			.filter(|((s, style), _)| *s == surface && self.styles.get(style).is_some_and(|m| m.kind == kind))
			.flat_map(|(_, lines)| lines.iter().copied())
			.collect();
		lines.sort_unstable();
		lines
	}

	/// Whether `surface` shows no markers at all.
	pub fn is_clear(&self, surface: SurfaceId) -> bool {
		LineKind::ALL.iter().all(|kind| self.markers(surface, *kind).is_empty())
	}

	pub fn flag(&self, doc: &DocumentId) -> Option<bool> {
		self.flags.get(doc).copied()
	}

	pub fn live_annotations(&self, doc: &DocumentId) -> Vec<&AnnotationThread> {
		let mut threads: Vec<_> = self.annotations.values().filter(|(d, _)| d == doc).map(|(_, t)| t).collect();
		threads.sort_by_key(|t| t.anchor_line);
		threads
	}

	fn next(&mut self) -> u64 {
		self.next_id += 1;
		self.next_id
	}
}

impl MarkerHost for RecordingHost {
	fn create_style(&mut self, style: &MarkerStyle) -> StyleId {
		let id = StyleId(self.next());
		self.styles.insert(id, style.clone());
		id
	}

	fn apply_markers(&mut self, surface: SurfaceId, style: StyleId, lines: &[usize]) {
		assert!(self.styles.contains_key(&style), "applied disposed style {style:?}");
		self.apply_calls += 1;
		self.applied.insert((surface, style), lines.to_vec());
	}

	fn dispose_style(&mut self, style: StyleId) {
		assert!(self.styles.remove(&style).is_some(), "style {style:?} disposed twice");
		self.applied.retain(|(_, s), _| *s != style);
		self.disposed_styles.push(style);
	}

	fn create_annotation(&mut self, doc: &DocumentId, thread: &AnnotationThread) -> Option<AnnotationId> {
		if !self.annotations_supported {
			return None;
		}
		let id = AnnotationId(self.next());
		self.annotations.insert(id, (doc.clone(), thread.clone()));
		Some(id)
	}

	fn dispose_annotation(&mut self, annotation: AnnotationId) {
		assert!(self.annotations.remove(&annotation).is_some(), "annotation {annotation:?} disposed twice");
		self.disposed_annotations.push(annotation);
	}

	fn set_context_flag(&mut self, doc: &DocumentId, has_markers: bool) {
		self.flags.insert(doc.clone(), has_markers);
	}

	fn show_warning(&mut self, message: &str) {
		self.warnings.push(message.to_string());
	}
}

/// Diffs in-process, but each call blocks until a permit is released.
#[derive(Debug, Clone)]
pub struct GatedDiffer {
	gate: Arc<Semaphore>,
	calls: Arc<AtomicUsize>,
}

impl GatedDiffer {
	pub fn new() -> Self {
		Self {
			gate: Arc::new(Semaphore::new(0)),
			calls: Arc::new(AtomicUsize::new(0)),
		}
	}

	/// Lets `n` pending or future diffs finish.
	pub fn release(&self, n: usize) {
		self.gate.add_permits(n);
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl LineDiffer for GatedDiffer {
	fn name(&self) -> &'static str {
		"gated"
	}

	async fn diff(&self, baseline: &str, current: &str) -> Result<Vec<DiffOp>, DiffError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		let permit = self
			.gate
			.acquire()
			.await
			.map_err(|_| DiffError::Unavailable("gate closed".into()))?;
		permit.forget();
		Ok(SimilarDiffer::line_ops(baseline, current))
	}
}

/// Always fails, as a missing external tool would.
#[derive(Debug, Default)]
pub struct FailingDiffer;

#[async_trait]
impl LineDiffer for FailingDiffer {
	fn name(&self) -> &'static str {
		"failing"
	}

	async fn diff(&self, _baseline: &str, _current: &str) -> Result<Vec<DiffOp>, DiffError> {
		Err(DiffError::Unavailable("differ offline".into()))
	}
}

/// In-process differ that counts its calls.
#[derive(Debug, Clone, Default)]
pub struct CountingDiffer {
	calls: Arc<AtomicUsize>,
}

impl CountingDiffer {
	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl LineDiffer for CountingDiffer {
	fn name(&self) -> &'static str {
		"counting"
	}

	async fn diff(&self, baseline: &str, current: &str) -> Result<Vec<DiffOp>, DiffError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Ok(SimilarDiffer::line_ops(baseline, current))
	}
}
