use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Stable identity of an open document.
///
/// Usually the resolved path of a file-backed document, or the host's name for
/// an untitled buffer. Cheap to clone; compared by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(Arc<str>);

impl DocumentId {
	/// Creates an identity from any string key.
	pub fn new(key: impl AsRef<str>) -> Self {
		Self(Arc::from(key.as_ref()))
	}

	/// Creates an identity from a filesystem path.
	pub fn from_path(path: &Path) -> Self {
		Self::new(path.to_string_lossy())
	}

	/// Returns the underlying key.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Short display name: the file stem of the key, or the whole key.
	pub fn stem(&self) -> &str {
		Path::new(self.as_str())
			.file_stem()
			.and_then(|s| s.to_str())
			.unwrap_or(self.as_str())
	}
}

impl fmt::Display for DocumentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for DocumentId {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

/// A visible editor surface (tab, split pane) that can carry markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

/// Host handle for a created marker style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleId(pub u64);

/// Host handle for a created annotation thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnnotationId(pub u64);
