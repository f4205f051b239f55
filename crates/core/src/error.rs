//! Error types for tracking and configuration.

use std::path::PathBuf;

use smudge_differ::DiffError;
use smudge_primitives::DocumentId;
use thiserror::Error;

/// Errors raised while tracking a document.
#[derive(Debug, Error)]
pub enum Error {
	/// The document's scheme is not eligible for tracking.
	#[error("documents with scheme '{scheme}' are not tracked")]
	SchemeUnsupported {
		/// Scheme reported by the host (e.g. `git`, `output`).
		scheme: String,
	},

	/// A store already holds an entry for this document.
	#[error("document already tracked: {0}")]
	AlreadyTracked(DocumentId),

	/// A store holds no entry for this document.
	#[error("document not tracked: {0}")]
	NotTracked(DocumentId),

	/// The line differ failed; the pass produced nothing usable.
	#[error(transparent)]
	DiffUnavailable(#[from] DiffError),
}

/// Result type for tracking operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// The file is not valid TOML for [`crate::Config`].
	#[error("config parse error: {0}")]
	Parse(#[from] toml::de::Error),

	/// A color value could not be parsed.
	#[error("invalid color for '{key}': {value} (expected #rgb or #rrggbb)")]
	InvalidColor {
		/// Option key holding the color.
		key: &'static str,
		/// The rejected value.
		value: String,
	},

	/// A value is out of its allowed range.
	#[error("invalid value for '{key}': {reason}")]
	InvalidValue {
		/// Option key.
		key: &'static str,
		/// What is wrong with it.
		reason: String,
	},
}
