//! Marker styles derived from configuration.

use smudge_primitives::LineKind;

use crate::config::Config;

/// Overview-ruler lane a marker is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverviewLane {
	Left,
	#[default]
	Center,
	Right,
	Full,
}

/// Gutter part of a marker style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GutterMarker {
	/// `#rrggbb` color.
	pub color: String,
	pub size: String,
}

/// Overview-ruler part of a marker style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewMarker {
	/// `rgba(r, g, b, a)` color.
	pub color: String,
	pub lane: OverviewLane,
}

/// Everything a host needs to create one marker style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerStyle {
	pub kind: LineKind,
	pub whole_line: bool,
	pub gutter: Option<GutterMarker>,
	pub overview: Option<OverviewMarker>,
}

impl MarkerStyle {
	pub fn from_config(kind: LineKind, config: &Config) -> Self {
		let gutter = config.show_in_gutter.then(|| GutterMarker {
			color: normalize_hex(config.styles.gutter.color(kind)),
			size: config.styles.gutter.size.clone(),
		});
		let overview = config.show_in_overview.then(|| OverviewMarker {
			color: hex_to_rgba(config.styles.overview.color(kind), config.styles.overview.opacity)
				.unwrap_or_else(|| "rgba(0, 0, 0, 0)".to_string()),
			lane: OverviewLane::Center,
		});
		Self {
			kind,
			whole_line: config.whole_line,
			gutter,
			overview,
		}
	}

	/// One style per [`LineKind`], in [`LineKind::ALL`] order.
	pub fn set_from_config(config: &Config) -> [MarkerStyle; 3] {
		LineKind::ALL.map(|kind| Self::from_config(kind, config))
	}
}

/// Parses `#rgb` or `#rrggbb`.
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
	let hex = value.strip_prefix('#')?;
	if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
		return None;
	}
	match hex.len() {
		3 => {
			let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
			Some((digit(0)?, digit(1)?, digit(2)?))
		}
		6 => {
			let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
			Some((pair(0)?, pair(2)?, pair(4)?))
		}
		_ => None,
	}
}

/// Converts a hex color and an opacity into a CSS `rgba(...)` string.
pub fn hex_to_rgba(value: &str, opacity: f32) -> Option<String> {
	let (r, g, b) = parse_hex_color(value)?;
	Some(format!("rgba({r}, {g}, {b}, {})", opacity.clamp(0.0, 1.0)))
}

fn normalize_hex(value: &str) -> String {
	match parse_hex_color(value) {
		Some((r, g, b)) => format!("#{r:02x}{g:02x}{b:02x}"),
		None => value.to_string(),
	}
}
