use serde::{Deserialize, Serialize};

use super::score::SizingMode;

/// Tunables for one mounted graph view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	/// Half-extent of the square new members are scattered into.
	pub scatter_extent: f64,
	/// Radius of the ring used after a filter rebuild.
	pub circle_radius: f64,
	/// Pointer travel, in screen pixels, that turns a press into a drag.
	pub drag_threshold: f64,
	/// Length of zoom/center animations in seconds.
	pub animation_secs: f64,
	/// Scale factor of one zoom-in or zoom-out step.
	pub zoom_ratio: f64,
	/// Lower bound of the camera scale.
	pub min_zoom: f64,
	/// Upper bound of the camera scale.
	pub max_zoom: f64,
	/// Smallest pick radius around a node, in graph units.
	pub min_hit_radius: f64,
	/// Background grid cell size in pixels. Zero disables the grid.
	pub grid_spacing: f64,
	/// Appends the score legend strip to exports.
	pub legend: bool,
	/// Image stamped in the corner of exports. A failed load only drops it.
	pub watermark_url: Option<String>,
	/// How node size follows the evaluation data.
	pub sizing: SizingMode,
	/// Seed for the scatter placement of new members.
	pub seed: u64,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			scatter_extent: 200.0,
			circle_radius: 180.0,
			drag_threshold: 4.0,
			animation_secs: 0.6,
			zoom_ratio: 1.5,
			min_zoom: 0.2,
			max_zoom: 10.0,
			min_hit_radius: 8.0,
			grid_spacing: 20.0,
			legend: true,
			watermark_url: None,
			sizing: SizingMode::default(),
			seed: 0x5eed,
		}
	}
}
