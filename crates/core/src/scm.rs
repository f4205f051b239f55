//! Detection of version-controlled workspaces.

use std::path::Path;

/// Files whose presence at the workspace root marks it as version-controlled.
const SCM_MARKERS: [&str; 2] = [".gitignore", ".git"];

/// Whether `root` looks like a version-controlled workspace.
pub fn has_scm_marker(root: &Path) -> bool {
	SCM_MARKERS.iter().any(|marker| root.join(marker).exists())
}
