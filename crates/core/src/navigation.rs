//! Jumping between changed lines.

use smudge_primitives::SeqDirection;

use crate::decoration::LineRanges;

/// Host actions for change navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationAction {
	PreviousChange,
	NextChange,
}

impl NavigationAction {
	pub const fn direction(self) -> SeqDirection {
		match self {
			Self::PreviousChange => SeqDirection::Prev,
			Self::NextChange => SeqDirection::Next,
		}
	}

	/// Stable identifier for keybindings and command palettes.
	pub const fn id(self) -> &'static str {
		match self {
			Self::PreviousChange => "smudge.previous_change",
			Self::NextChange => "smudge.next_change",
		}
	}
}

/// Union of all marked lines, ascending and deduplicated.
pub fn changed_lines(ranges: &LineRanges) -> Vec<usize> {
	let mut lines: Vec<usize> = ranges.all_lines().collect();
	lines.sort_unstable();
	lines.dedup();
	lines
}

/// Nearest changed line strictly after (or before) `current`, wrapping around.
///
/// `lines` must be sorted ascending. `None` only when it is empty.
pub fn next_changed_line(lines: &[usize], current: usize, direction: SeqDirection) -> Option<usize> {
	match direction {
		SeqDirection::Next => {
			let idx = lines.partition_point(|&line| line <= current);
			lines.get(idx).or_else(|| lines.first()).copied()
		}
		SeqDirection::Prev => {
			let idx = lines.partition_point(|&line| line < current);
			idx.checked_sub(1)
				.and_then(|i| lines.get(i))
				.or_else(|| lines.last())
				.copied()
		}
	}
}
