use serde::Deserialize;

use super::types::{NodeType, Point};

/// Base URL of the live graph feed, baked in at build time.
pub const API_ENV: Option<&str> = option_env!("KNOWLEDGE_GRAPH_API");

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
	/// Stationary columns by type. Nodes cannot be dragged.
	#[default]
	Grid,
	/// Nodes on a single circle. Nodes can be dragged.
	Circular,
}

impl LayoutMode {
	pub fn allows_drag(self) -> bool {
		matches!(self, LayoutMode::Circular)
	}

	pub fn toggled(self) -> Self {
		match self {
			LayoutMode::Grid => LayoutMode::Circular,
			LayoutMode::Circular => LayoutMode::Grid,
		}
	}
}

/// Tunables for layout, viewport and drawing.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	pub layout_mode: LayoutMode,
	pub type_priority: Vec<NodeType>,
	pub column_pitch: f64,
	pub row_pitch: f64,
	pub canvas_width: f64,
	pub canvas_height: f64,
	pub canvas_center: Point,
	pub circle_radius: f64,

	pub node_width: f64,
	pub node_height: f64,
	pub node_spacing: f64,
	pub min_ring_radius: f64,
	pub max_ring_radius: f64,
	pub ring_jitter_deg: f64,
	pub collision_passes: usize,

	pub min_zoom: f64,
	pub max_zoom: f64,
	pub zoom_step: f64,
	pub wheel_step: f64,
	pub fit_padding: f64,
	pub key_pan_step: f64,
	pub click_slop: f64,

	pub label_max_chars: usize,
	pub edge_hit_tolerance: f64,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			layout_mode: LayoutMode::Grid,
			type_priority: vec![
				NodeType::Project,
				NodeType::PullRequest,
				NodeType::Ticket,
				NodeType::ChatThread,
				NodeType::File,
				NodeType::Person,
				NodeType::Decision,
				NodeType::Document,
			],
			column_pitch: 200.0,
			row_pitch: 90.0,
			canvas_width: 4000.0,
			canvas_height: 4000.0,
			canvas_center: Point::new(400.0, 300.0),
			circle_radius: 320.0,

			node_width: 120.0,
			node_height: 48.0,
			node_spacing: 20.0,
			min_ring_radius: 180.0,
			max_ring_radius: 420.0,
			ring_jitter_deg: 15.0,
			collision_passes: 3,

			min_zoom: 0.3,
			max_zoom: 3.0,
			zoom_step: 1.2,
			wheel_step: 1.1,
			fit_padding: 80.0,
			key_pan_step: 20.0,
			click_slop: 4.0,

			label_max_chars: 18,
			edge_hit_tolerance: 6.0,
		}
	}
}

impl GraphConfig {
	pub fn clamp_zoom(&self, zoom: f64) -> f64 {
		zoom.clamp(self.min_zoom, self.max_zoom)
	}

	/// Minimum center distance for two node boxes to count as clear.
	pub fn collision_distance(&self) -> f64 {
		self.node_width.hypot(self.node_height) + self.node_spacing
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_config_keeps_defaults() {
		let cfg: GraphConfig =
			serde_json::from_str(r#"{"layout_mode": "circular", "row_pitch": 120.0}"#).unwrap();
		assert_eq!(cfg.layout_mode, LayoutMode::Circular);
		assert_eq!(cfg.row_pitch, 120.0);
		assert_eq!(cfg.column_pitch, GraphConfig::default().column_pitch);
		assert!(cfg.layout_mode.allows_drag());
		assert!(!cfg.layout_mode.toggled().allows_drag());
	}

	#[test]
	fn clamps_zoom_to_bounds() {
		let cfg = GraphConfig::default();
		assert_eq!(cfg.clamp_zoom(10.0), 3.0);
		assert_eq!(cfg.clamp_zoom(0.01), 0.3);
		assert_eq!(cfg.clamp_zoom(1.5), 1.5);
	}
}
