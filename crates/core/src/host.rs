//! The seam between the engine and an editing host.
//!
//! Hosts hand the engine [`DocumentView`]s with every lifecycle event and
//! render whatever it asks for through [`MarkerHost`].

use std::path::Path;

use ropey::Rope;
use smudge_primitives::{AnnotationId, DocumentId, StyleId, SurfaceId};

use crate::style::MarkerStyle;

/// Scheme of file-backed documents.
pub const SCHEME_FILE: &str = "file";
/// Scheme of never-saved documents.
pub const SCHEME_UNTITLED: &str = "untitled";

/// A document as the host sees it at one instant.
#[derive(Debug, Clone)]
pub struct DocumentView {
	pub id: DocumentId,
	/// Host classification such as `file`, `untitled`, `git`, `output`.
	pub scheme: String,
	pub text: Rope,
	/// Host edit counter; informational.
	pub version: u64,
	/// Language identifier used for annotation code blocks.
	pub language: Option<String>,
}

impl DocumentView {
	pub fn new(id: DocumentId, scheme: impl Into<String>, text: &str) -> Self {
		Self {
			id,
			scheme: scheme.into(),
			text: Rope::from_str(text),
			version: 0,
			language: None,
		}
	}

	/// A file-backed document keyed by its path.
	pub fn file(path: &Path, text: &str) -> Self {
		Self::new(DocumentId::from_path(path), SCHEME_FILE, text)
	}

	/// An untitled document keyed by its host name.
	pub fn untitled(name: &str, text: &str) -> Self {
		Self::new(DocumentId::new(name), SCHEME_UNTITLED, text)
	}

	pub fn with_version(mut self, version: u64) -> Self {
		self.version = version;
		self
	}

	pub fn with_language(mut self, language: impl Into<String>) -> Self {
		self.language = Some(language.into());
		self
	}

	/// Same document with new content and the next version.
	pub fn edited(&self, text: &str) -> Self {
		Self {
			text: Rope::from_str(text),
			version: self.version + 1,
			..self.clone()
		}
	}

	/// Editor line count: a trailing newline opens one more (empty) line.
	pub fn line_count(&self) -> usize {
		self.text.len_lines()
	}
}

/// A document shown in a specific editor surface.
#[derive(Debug, Clone)]
pub struct VisibleEditor {
	pub surface: SurfaceId,
	pub document: DocumentView,
}

/// One comment inside an annotation thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationComment {
	pub author: String,
	/// Markdown body.
	pub body: String,
}

/// A read-only annotation thread anchored at a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationThread {
	pub anchor_line: usize,
	pub label: String,
	pub comments: Vec<AnnotationComment>,
	pub can_reply: bool,
}

/// Rendering capabilities the engine needs from the host.
///
/// Styles are created once per tracked document and disposed exactly once.
/// Disposing a style removes every marker drawn with it. Annotation and
/// context-flag support is optional.
pub trait MarkerHost {
	/// Creates a marker style and returns its handle.
	fn create_style(&mut self, style: &MarkerStyle) -> StyleId;

	/// Draws `lines` with `style` on `surface`, replacing what that style drew there before.
	fn apply_markers(&mut self, surface: SurfaceId, style: StyleId, lines: &[usize]);

	fn dispose_style(&mut self, style: StyleId);

	/// Creates an annotation thread. `None` when annotations are unsupported.
	fn create_annotation(&mut self, _doc: &DocumentId, _thread: &AnnotationThread) -> Option<AnnotationId> {
		None
	}

	fn dispose_annotation(&mut self, _annotation: AnnotationId) {}

	/// Reports whether `doc` currently shows unsaved-change markers.
	fn set_context_flag(&mut self, _doc: &DocumentId, _has_markers: bool) {}

	/// Non-blocking user-facing warning.
	fn show_warning(&mut self, _message: &str) {}
}
