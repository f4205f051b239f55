//! Tracks unsaved edits per document and turns them into line markers.
//!
//! The [`Reconciler`] owns everything: a [`SnapshotStore`] holding each tracked
//! document's last known-clean text, a [`DecorationStore`] holding the marker
//! ranges and host handles, and a [`Debouncer`] that coalesces edit bursts into
//! one reconciliation pass. A pass diffs the snapshot against the current text
//! through a [`smudge_differ::LineDiffer`], runs the result through
//! [`normalize`], and swaps the new ranges in as one unit.
//!
//! Rendering is left to the host through [`MarkerHost`].

pub mod annotations;
pub mod config;
pub mod decoration;
pub mod error;
pub mod host;
pub mod navigation;
pub mod normalize;
pub mod reconcile;
pub mod scheduler;
pub mod scm;
pub mod snapshot;
pub mod style;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Config, DifferKind};
pub use decoration::{DecorationState, DecorationStore, LineRanges, StyleSet};
pub use error::{ConfigError, Error, Result};
pub use host::{AnnotationComment, AnnotationThread, DocumentView, MarkerHost, VisibleEditor};
pub use navigation::{NavigationAction, changed_lines, next_changed_line};
pub use normalize::normalize;
pub use reconcile::{Generation, Reconciler, TickStats, TrackPhase};
pub use scheduler::Debouncer;
pub use snapshot::{Snapshot, SnapshotStore};
pub use style::{GutterMarker, MarkerStyle, OverviewLane, OverviewMarker};
