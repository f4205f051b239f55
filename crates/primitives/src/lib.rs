//! Core value types shared by the differ, the reconciliation engine and hosts.

/// Navigation direction.
pub mod direction;
/// Identifier types for documents, surfaces and host handles.
pub mod ids;
/// Per-line diff classification.
pub mod line;

pub use direction::SeqDirection;
pub use ids::{AnnotationId, DocumentId, StyleId, SurfaceId};
pub use line::{LineClassification, LineKind};
