//! Reconciliation controller: the per-document tracking state machine.
//!
//! [`Reconciler`] owns every tracked document's snapshot and decorations and
//! turns host events into reconciliation passes:
//! - edits are debounced per document and only the latest one is diffed
//! - at most one pass per document runs at a time, as a spawned task
//! - completions come back over a channel and are applied from [`Reconciler::tick`]
//!
//! # Staleness
//!
//! Every tracking session and every clean reset draws a fresh [`Generation`].
//! A completed pass is applied only if its document is still tracked under the
//! generation the pass started with; anything else is dropped, so a closed
//! document is never resurrected by a late diff.
//!
//! # Failures
//!
//! A failed diff disposes the document's decorations and restarts tracking
//! from the latest text the controller saw. Other documents are unaffected.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use rustc_hash::FxHashMap;
use smudge_differ::{LineDiffer, diff_lines};
use smudge_primitives::{DocumentId, LineClassification, SeqDirection, SurfaceId};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::annotations::{ANNOTATION_LABEL, build_threads};
use crate::config::Config;
use crate::decoration::{DecorationStore, LineRanges, StyleSet};
use crate::error::{Error, Result};
use crate::host::{DocumentView, MarkerHost, VisibleEditor};
use crate::navigation::{NavigationAction, changed_lines, next_changed_line};
use crate::normalize::normalize;
use crate::scheduler::Debouncer;
use crate::scm::has_scm_marker;
use crate::snapshot::SnapshotStore;
use crate::style::MarkerStyle;

/// Identity of one tracking session or clean reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(pub u64);

/// Tracking state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackPhase {
	/// Text matches the snapshot; no markers.
	Clean,
	/// Text differs from the snapshot, or a pass is pending.
	Dirty,
}

/// Counters from one [`Reconciler::tick`] or [`Reconciler::settle`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickStats {
	/// Passes whose results were installed.
	pub applied: usize,
	/// Completions dropped as stale.
	pub discarded: usize,
	/// Passes started.
	pub started: usize,
	/// Passes whose differ failed.
	pub failed: usize,
}

/// Completion message from spawned reconciliation passes.
#[derive(Debug)]
struct PassComplete {
	id: DocumentId,
	generation: Generation,
	result: Result<Vec<LineClassification>>,
}

#[derive(Debug)]
struct TrackedDoc {
	generation: Generation,
	phase: TrackPhase,
	/// Generation of the running pass, if any.
	in_flight: Option<Generation>,
	/// Most recent view of the document the controller has seen.
	latest: DocumentView,
}

/// Owns all tracking state and drives reconciliation passes.
pub struct Reconciler {
	config: Config,
	styles: [MarkerStyle; 3],
	differ: Arc<dyn LineDiffer>,
	snapshots: SnapshotStore,
	decorations: DecorationStore,
	scheduler: Debouncer,
	docs: FxHashMap<DocumentId, TrackedDoc>,
	surfaces: FxHashMap<SurfaceId, DocumentId>,
	active: Option<DocumentId>,
	workspace_root: Option<PathBuf>,
	suspended: bool,
	next_generation: u64,
	in_flight: usize,
	completion_tx: mpsc::UnboundedSender<PassComplete>,
	completion_rx: mpsc::UnboundedReceiver<PassComplete>,
}

impl std::fmt::Debug for Reconciler {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Reconciler")
			.field("differ", &self.differ.name())
			.field("docs", &self.docs.len())
			.field("pending", &self.scheduler.len())
			.field("in_flight", &self.in_flight)
			.field("suspended", &self.suspended)
			.finish()
	}
}

impl Reconciler {
	pub fn new(config: Config, differ: Arc<dyn LineDiffer>) -> Self {
		let (completion_tx, completion_rx) = mpsc::unbounded_channel();
		Self {
			styles: MarkerStyle::set_from_config(&config),
			scheduler: Debouncer::new(config.debounce()),
			config,
			differ,
			snapshots: SnapshotStore::new(),
			decorations: DecorationStore::new(),
			docs: FxHashMap::default(),
			surfaces: FxHashMap::default(),
			active: None,
			workspace_root: None,
			suspended: false,
			next_generation: 0,
			in_flight: 0,
			completion_tx,
			completion_rx,
		}
	}

	/// Swaps the diff strategy. Running passes finish with the old one.
	pub fn set_differ(&mut self, differ: Arc<dyn LineDiffer>) {
		debug!(differ = differ.name(), "smudge.reconcile.set_differ");
		self.differ = differ;
	}

	/// Starts tracking `view` with its current text as baseline.
	///
	/// Returns `Ok(false)` if it is already tracked or the controller is suspended.
	pub fn observe(&mut self, view: &DocumentView, host: &mut dyn MarkerHost) -> Result<bool> {
		if self.suspended || self.docs.contains_key(&view.id) {
			return Ok(false);
		}
		if !self.config.tracks_scheme(&view.scheme) {
			trace!(doc = %view.id, scheme = %view.scheme, "smudge.reconcile.scheme_unsupported");
			return Err(Error::SchemeUnsupported {
				scheme: view.scheme.clone(),
			});
		}
		self.track(view, host)?;
		Ok(true)
	}

	/// Handles an edit to `view`.
	///
	/// An untracked document starts tracking with this text as baseline. An edit
	/// back to the snapshot resets to clean immediately; any other edit schedules
	/// a pass, replacing one already pending.
	pub fn on_content_changed(&mut self, view: DocumentView, now: Instant, host: &mut dyn MarkerHost) -> Result<()> {
		if self.suspended {
			return Ok(());
		}
		if !self.docs.contains_key(&view.id) {
			self.observe(&view, host)?;
			return Ok(());
		}

		if self.snapshots.is_unchanged(&view.id, &view.text, view.line_count())? {
			debug!(doc = %view.id, version = view.version, "smudge.reconcile.back_to_clean");
			return self.rebaseline(view, host);
		}

		let doc = self.docs.get_mut(&view.id).ok_or_else(|| Error::NotTracked(view.id.clone()))?;
		doc.phase = TrackPhase::Dirty;
		doc.latest = view.clone();
		trace!(doc = %view.id, version = view.version, "smudge.reconcile.doc_edit");
		self.scheduler.schedule(view, now);
		Ok(())
	}

	/// Handles a save. With `clear_on_save`, the saved text becomes the new baseline.
	pub fn on_saved(&mut self, view: DocumentView, host: &mut dyn MarkerHost) -> Result<()> {
		if self.suspended || !self.config.clear_on_save || !self.docs.contains_key(&view.id) {
			return Ok(());
		}
		debug!(doc = %view.id, version = view.version, "smudge.reconcile.clear_on_save");
		self.rebaseline(view, host)
	}

	/// Stops tracking `id` and releases its host resources. Returns whether it was tracked.
	pub fn on_closed(&mut self, id: &DocumentId, host: &mut dyn MarkerHost) -> bool {
		self.scheduler.cancel(id);
		let tracked = self.docs.remove(id).is_some();
		self.decorations.dispose(id, host);
		self.snapshots.stop_tracking(id);
		self.surfaces.retain(|_, doc| doc != id);
		if self.active.as_ref() == Some(id) {
			self.active = None;
		}
		if tracked {
			debug!(doc = %id, "smudge.reconcile.doc_close");
		}
		tracked
	}

	/// Replaces the set of visible surfaces and redraws each one.
	///
	/// Untracked documents in a supported scheme start tracking.
	pub fn on_visible_editors_changed(&mut self, editors: &[VisibleEditor], host: &mut dyn MarkerHost) {
		self.surfaces = editors
			.iter()
			.map(|editor| (editor.surface, editor.document.id.clone()))
			.collect();
		if self.suspended {
			return;
		}
		for editor in editors {
			self.show(editor, host);
		}
	}

	pub fn on_active_editor_changed(&mut self, editor: Option<VisibleEditor>, host: &mut dyn MarkerHost) {
		let Some(editor) = editor else {
			self.active = None;
			return;
		};
		let id = editor.document.id.clone();
		self.surfaces.insert(editor.surface, id.clone());
		self.active = Some(id.clone());
		if self.suspended {
			return;
		}
		self.show(&editor, host);
		if let Some(state) = self.decorations.get(&id) {
			host.set_context_flag(&id, !state.ranges.is_empty());
		}
	}

	/// Applies new configuration to every tracked document.
	///
	/// Documents whose scheme is no longer tracked are closed. Marker styles are
	/// recreated and redrawn.
	pub fn on_configuration_changed(&mut self, config: Config, host: &mut dyn MarkerHost) {
		let dropped: Vec<DocumentId> = self
			.docs
			.iter()
			.filter(|(_, doc)| !config.tracks_scheme(&doc.latest.scheme))
			.map(|(id, _)| id.clone())
			.collect();

		self.scheduler.set_delay(config.debounce());
		self.styles = MarkerStyle::set_from_config(&config);
		self.config = config;
		debug!(dropped = dropped.len(), "smudge.reconcile.config_changed");

		for id in &dropped {
			self.on_closed(id, host);
		}

		let ids: Vec<DocumentId> = self.docs.keys().cloned().collect();
		for id in &ids {
			let styles = StyleSet::create(host, &self.styles);
			if let Err(err) = self.decorations.restyle(id, styles, host) {
				warn!(doc = %id, error = %err, "smudge.reconcile.restyle_failed");
				continue;
			}
			self.reapply(id, host);
		}

		self.refresh_suspension(host);
	}

	/// Records the workspace root and suspends in version-controlled workspaces
	/// when configured to. Returns whether the controller is suspended.
	pub fn set_workspace_root(&mut self, root: &Path, host: &mut dyn MarkerHost) -> bool {
		self.workspace_root = Some(root.to_path_buf());
		self.refresh_suspension(host)
	}

	pub fn is_suspended(&self) -> bool {
		self.suspended
	}

	/// Applies finished passes, then starts every due pass whose document is idle.
	pub fn tick(&mut self, now: Instant, host: &mut dyn MarkerHost) -> TickStats {
		let mut stats = TickStats::default();
		while let Ok(complete) = self.completion_rx.try_recv() {
			self.apply_completion(complete, host, &mut stats);
		}
		if self.suspended {
			return stats;
		}

		let docs = &self.docs;
		let due = self
			.scheduler
			.take_due(now, |id| docs.get(id).is_some_and(|doc| doc.in_flight.is_none()));
		for view in due {
			if self.start_pass(view) {
				stats.started += 1;
			}
		}
		stats
	}

	/// Waits for every running pass and applies its result.
	pub async fn settle(&mut self, host: &mut dyn MarkerHost) -> TickStats {
		let mut stats = TickStats::default();
		while self.in_flight > 0 {
			let Some(complete) = self.completion_rx.recv().await else {
				break;
			};
			self.apply_completion(complete, host, &mut stats);
		}
		stats
	}

	/// Earliest time a pending pass becomes due.
	pub fn next_deadline(&self) -> Option<Instant> {
		self.scheduler.next_deadline()
	}

	/// Nearest changed line of `id` after or before `current`, wrapping around.
	pub fn next_changed_line(&self, id: &DocumentId, current: usize, direction: SeqDirection) -> Option<usize> {
		let state = self.decorations.get(id)?;
		next_changed_line(&changed_lines(&state.ranges), current, direction)
	}

	/// Target line of a navigation action.
	pub fn goto(&self, id: &DocumentId, current: usize, action: NavigationAction) -> Option<usize> {
		self.next_changed_line(id, current, action.direction())
	}

	/// Disposes every tracked document.
	pub fn shutdown(&mut self, host: &mut dyn MarkerHost) {
		let ids: Vec<DocumentId> = self.docs.keys().cloned().collect();
		for id in &ids {
			self.on_closed(id, host);
		}
		debug!(closed = ids.len(), "smudge.reconcile.shutdown");
	}

	pub fn is_tracked(&self, id: &DocumentId) -> bool {
		self.docs.contains_key(id)
	}

	pub fn phase(&self, id: &DocumentId) -> Option<TrackPhase> {
		self.docs.get(id).map(|doc| doc.phase)
	}

	pub fn generation(&self, id: &DocumentId) -> Option<Generation> {
		self.docs.get(id).map(|doc| doc.generation)
	}

	/// Ranges currently drawn for `id`.
	pub fn ranges(&self, id: &DocumentId) -> Option<&LineRanges> {
		self.decorations.get(id).map(|state| &state.ranges)
	}

	pub fn tracked_count(&self) -> usize {
		self.docs.len()
	}

	pub fn pending_count(&self) -> usize {
		self.scheduler.len()
	}

	pub fn in_flight_count(&self) -> usize {
		self.in_flight
	}

	fn bump_generation(&mut self) -> Generation {
		self.next_generation += 1;
		Generation(self.next_generation)
	}

	fn track(&mut self, view: &DocumentView, host: &mut dyn MarkerHost) -> Result<()> {
		self.snapshots
			.start_tracking(view.id.clone(), view.text.clone(), view.line_count())?;
		let styles = &self.styles;
		self.decorations.ensure(&view.id, || StyleSet::create(host, styles));
		let generation = self.bump_generation();
		self.docs.insert(
			view.id.clone(),
			TrackedDoc {
				generation,
				phase: TrackPhase::Clean,
				in_flight: None,
				latest: view.clone(),
			},
		);
		debug!(doc = %view.id, generation = generation.0, lines = view.line_count(), "smudge.reconcile.doc_open");
		self.reapply(&view.id, host);
		self.publish_flag(&view.id, false, host);
		Ok(())
	}

	/// Makes `view` the new baseline and clears its markers.
	fn rebaseline(&mut self, view: DocumentView, host: &mut dyn MarkerHost) -> Result<()> {
		let generation = self.bump_generation();
		let doc = self.docs.get_mut(&view.id).ok_or_else(|| Error::NotTracked(view.id.clone()))?;

		self.scheduler.cancel(&view.id);
		self.snapshots.replace(&view.id, view.text.clone(), view.line_count())?;
		self.decorations
			.replace_ranges(&view.id, LineRanges::default(), &[], host)?;

		doc.generation = generation;
		doc.phase = TrackPhase::Clean;
		doc.latest = view;

		let id = doc.latest.id.clone();
		trace!(doc = %id, generation = generation.0, "smudge.reconcile.rebaseline");
		self.reapply(&id, host);
		self.publish_flag(&id, false, host);
		Ok(())
	}

	fn show(&mut self, editor: &VisibleEditor, host: &mut dyn MarkerHost) {
		let id = &editor.document.id;
		if let Err(err) = self.observe(&editor.document, host) {
			trace!(doc = %id, error = %err, "smudge.reconcile.skip_surface");
			return;
		}
		if let Some(state) = self.decorations.get(id) {
			state.apply_to(editor.surface, host);
		}
	}

	/// Redraws `id` on every surface currently showing it.
	fn reapply(&self, id: &DocumentId, host: &mut dyn MarkerHost) {
		let Some(state) = self.decorations.get(id) else {
			return;
		};
		for (surface, doc) in &self.surfaces {
			if doc == id {
				state.apply_to(*surface, host);
			}
		}
	}

	/// Reports marker presence for `id` when it is the active document.
	fn publish_flag(&self, id: &DocumentId, has_markers: bool, host: &mut dyn MarkerHost) {
		if self.active.as_ref() == Some(id) {
			host.set_context_flag(id, has_markers);
		}
	}

	fn refresh_suspension(&mut self, host: &mut dyn MarkerHost) -> bool {
		let suspend = self.config.disable_in_scm_workspace
			&& self.workspace_root.as_deref().is_some_and(has_scm_marker);
		if suspend && !self.suspended {
			info!(root = ?self.workspace_root, "smudge.reconcile.suspended");
			self.shutdown(host);
		} else if !suspend && self.suspended {
			info!(root = ?self.workspace_root, "smudge.reconcile.resumed");
		}
		self.suspended = suspend;
		suspend
	}

	fn start_pass(&mut self, view: DocumentView) -> bool {
		let Some(doc) = self.docs.get_mut(&view.id) else {
			return false;
		};
		let Ok(snapshot) = self.snapshots.get(&view.id) else {
			warn!(doc = %view.id, "smudge.reconcile.no_snapshot");
			return false;
		};

		let generation = doc.generation;
		doc.in_flight = Some(generation);
		self.in_flight += 1;

		let id = view.id.clone();
		let baseline = snapshot.content().to_string();
		let current = view.text.to_string();
		let differ = Arc::clone(&self.differ);
		let tx = self.completion_tx.clone();
		let show_output = self.config.show_diff_output;

		debug!(
			doc = %id,
			generation = generation.0,
			version = view.version,
			differ = differ.name(),
			"smudge.reconcile.pass_start"
		);

		tokio::spawn(async move {
			let start = Instant::now();
			let result = diff_lines(differ.as_ref(), &baseline, &current)
				.await
				.map(|ops| {
					if show_output {
						let body: Vec<String> = ops.iter().filter(|op| !op.is_equal()).map(ToString::to_string).collect();
						info!(target: "smudge::diff_output", doc = %id, "{}", body.join("\n"));
					}
					normalize(&ops)
				})
				.map_err(Error::DiffUnavailable);
			let latency_ms = start.elapsed().as_millis() as u64;
			match &result {
				Ok(entries) => {
					debug!(doc = %id, generation = generation.0, entries = entries.len(), latency_ms, "smudge.reconcile.pass_done")
				}
				Err(err) => {
					debug!(doc = %id, generation = generation.0, error = %err, latency_ms, "smudge.reconcile.pass_failed")
				}
			}
			let _ = tx.send(PassComplete { id, generation, result });
		});
		true
	}

	fn apply_completion(&mut self, complete: PassComplete, host: &mut dyn MarkerHost, stats: &mut TickStats) {
		self.in_flight = self.in_flight.saturating_sub(1);
		let PassComplete { id, generation, result } = complete;

		let Some(doc) = self.docs.get_mut(&id) else {
			debug!(doc = %id, generation = generation.0, reason = "untracked", "smudge.reconcile.stale_discard");
			stats.discarded += 1;
			return;
		};
		if doc.in_flight == Some(generation) {
			doc.in_flight = None;
		}
		if doc.generation != generation {
			debug!(
				doc = %id,
				generation = generation.0,
				current = doc.generation.0,
				reason = "generation",
				"smudge.reconcile.stale_discard"
			);
			stats.discarded += 1;
			return;
		}

		let entries = match result {
			Ok(entries) => entries,
			Err(err) => {
				stats.failed += 1;
				self.reinitialize(&id, err, host);
				return;
			}
		};

		let ranges = LineRanges::from_classifications(&entries);
		let threads = if self.config.show_annotations {
			build_threads(&id, doc.latest.language.as_deref(), &entries)
		} else {
			Vec::new()
		};
		let has_markers = !ranges.is_empty();
		doc.phase = if has_markers || self.scheduler.is_pending(&id) {
			TrackPhase::Dirty
		} else {
			TrackPhase::Clean
		};

		if let Err(err) = self.decorations.replace_ranges(&id, ranges, &threads, host) {
			warn!(doc = %id, error = %err, "smudge.reconcile.apply_failed");
			return;
		}
		trace!(doc = %id, generation = generation.0, entries = entries.len(), "smudge.reconcile.applied");
		self.reapply(&id, host);
		self.publish_flag(&id, has_markers, host);
		stats.applied += 1;
	}

	/// Drops all state for `id` and tracks it again from the latest known text.
	fn reinitialize(&mut self, id: &DocumentId, err: Error, host: &mut dyn MarkerHost) {
		warn!(doc = %id, error = %err, "smudge.reconcile.diff_unavailable");
		host.show_warning(&format!("{ANNOTATION_LABEL}: {err}"));

		let Some(doc) = self.docs.remove(id) else {
			return;
		};
		self.scheduler.cancel(id);
		self.decorations.dispose(id, host);
		self.snapshots.stop_tracking(id);
		if let Err(err) = self.track(&doc.latest, host) {
			warn!(doc = %id, error = %err, "smudge.reconcile.reinit_failed");
		}
	}
}
