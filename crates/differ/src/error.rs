use thiserror::Error;

/// Failures of a line differ. Any of them makes the whole diff unusable.
#[derive(Debug, Error)]
pub enum DiffError {
	/// The differ could not run (tool missing, non-diff exit status, task died).
	#[error("line differ unavailable: {0}")]
	Unavailable(String),

	/// Reading or writing the diff inputs failed.
	#[error("I/O error while diffing: {0}")]
	Io(#[from] std::io::Error),

	/// The tool ran but its output did not describe the two inputs.
	#[error("malformed diff output: {0}")]
	Malformed(String),
}

/// Result type for differ operations.
pub type Result<T, E = DiffError> = std::result::Result<T, E>;
