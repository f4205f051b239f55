//! User configuration.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. Unknown keys are rejected to catch typos early.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use smudge_differ::{DiffError, GitDiffer, LineDiffer, SimilarDiffer};
use smudge_primitives::LineKind;

use crate::error::ConfigError;
use crate::style::parse_hex_color;

/// Which [`LineDiffer`] implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DifferKind {
	/// In-process diff.
	#[default]
	Builtin,
	/// `git diff --no-index`.
	Git,
}

/// Engine and marker configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Quiet period after the last edit before a document is re-diffed.
	pub debounce_ms: u64,
	/// Re-baseline and clear markers when a document is saved.
	pub clear_on_save: bool,
	/// Document schemes eligible for tracking.
	pub schemes: Vec<String>,
	/// Suspend tracking in workspaces that are under source control.
	pub disable_in_scm_workspace: bool,
	pub show_in_gutter: bool,
	pub show_in_overview: bool,
	/// Attach annotation threads showing removed/replaced text.
	pub show_annotations: bool,
	/// Markers span the whole line instead of the line start only.
	pub whole_line: bool,
	/// Log every pass's raw diff operations.
	pub show_diff_output: bool,
	/// Executable used by [`DifferKind::Git`].
	pub git_path: String,
	pub differ: DifferKind,
	pub styles: Styles,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			debounce_ms: 250,
			clear_on_save: false,
			schemes: vec!["file".to_string(), "untitled".to_string()],
			disable_in_scm_workspace: false,
			show_in_gutter: true,
			show_in_overview: true,
			show_annotations: false,
			whole_line: false,
			show_diff_output: false,
			git_path: "git".to_string(),
			differ: DifferKind::Builtin,
			styles: Styles::default(),
		}
	}
}

/// Marker colors and sizes.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Styles {
	pub gutter: GutterStyles,
	pub overview: OverviewStyles,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GutterStyles {
	pub add: String,
	pub del: String,
	pub change: String,
	/// Host-interpreted icon size (`auto`, `contain`, `cover`, or a percentage).
	pub size: String,
}

impl Default for GutterStyles {
	fn default() -> Self {
		Self {
			add: "#2faf64".to_string(),
			del: "#c74e39".to_string(),
			change: "#00bcf2".to_string(),
			size: "auto".to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverviewStyles {
	pub add: String,
	pub del: String,
	pub change: String,
	/// Alpha applied to the overview-ruler colors, `0.0..=1.0`.
	pub opacity: f32,
}

impl Default for OverviewStyles {
	fn default() -> Self {
		Self {
			add: "#2faf64".to_string(),
			del: "#c74e39".to_string(),
			change: "#00bcf2".to_string(),
			opacity: 0.6,
		}
	}
}

impl GutterStyles {
	pub fn color(&self, kind: LineKind) -> &str {
		match kind {
			LineKind::Added => &self.add,
			LineKind::Deleted => &self.del,
			LineKind::Changed => &self.change,
		}
	}
}

impl OverviewStyles {
	pub fn color(&self, kind: LineKind) -> &str {
		match kind {
			LineKind::Added => &self.add,
			LineKind::Deleted => &self.del,
			LineKind::Changed => &self.change,
		}
	}
}

impl Config {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let config: Config = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads, parses and validates a TOML file.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&input)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		let colors = [
			("styles.gutter.add", &self.styles.gutter.add),
			("styles.gutter.del", &self.styles.gutter.del),
			("styles.gutter.change", &self.styles.gutter.change),
			("styles.overview.add", &self.styles.overview.add),
			("styles.overview.del", &self.styles.overview.del),
			("styles.overview.change", &self.styles.overview.change),
		];
		for (key, value) in colors {
			if parse_hex_color(value).is_none() {
				return Err(ConfigError::InvalidColor {
					key,
					value: value.clone(),
				});
			}
		}

		let opacity = self.styles.overview.opacity;
		if !(0.0..=1.0).contains(&opacity) {
			return Err(ConfigError::InvalidValue {
				key: "styles.overview.opacity",
				reason: format!("{opacity} is outside 0.0..=1.0"),
			});
		}

		if self.differ == DifferKind::Git && self.git_path.trim().is_empty() {
			return Err(ConfigError::InvalidValue {
				key: "git_path",
				reason: "must not be empty when differ = \"git\"".to_string(),
			});
		}

		Ok(())
	}

	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}

	/// Whether documents with `scheme` are tracked.
	pub fn tracks_scheme(&self, scheme: &str) -> bool {
		self.schemes.iter().any(|s| s == scheme)
	}

	/// Builds the configured differ.
	pub fn build_differ(&self) -> Result<Arc<dyn LineDiffer>, DiffError> {
		Ok(match self.differ {
			DifferKind::Builtin => Arc::new(SimilarDiffer),
			DifferKind::Git => Arc::new(GitDiffer::new(&self.git_path)?),
		})
	}
}
