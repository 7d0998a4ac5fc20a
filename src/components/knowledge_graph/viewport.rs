use super::config::GraphConfig;
use super::types::Point;

/// Zoom and pan between graph space and screen space.
///
/// `screen = graph * zoom + pan`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub zoom: f64,
	pub pan: Point,
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			zoom: 1.0,
			pan: Point::default(),
		}
	}
}

impl Viewport {
	pub fn zoom_in(&mut self, cfg: &GraphConfig) {
		self.zoom = cfg.clamp_zoom(self.zoom * cfg.zoom_step);
	}

	pub fn zoom_out(&mut self, cfg: &GraphConfig) {
		self.zoom = cfg.clamp_zoom(self.zoom / cfg.zoom_step);
	}

	/// Zoom one wheel notch, keeping the graph point under `cursor` in place.
	pub fn wheel(&mut self, delta_y: f64, cursor: Point, cfg: &GraphConfig) {
		let next = if delta_y < 0.0 {
			self.zoom * cfg.wheel_step
		} else if delta_y > 0.0 {
			self.zoom / cfg.wheel_step
		} else {
			return;
		};
		let next = cfg.clamp_zoom(next);
		let ratio = next / self.zoom;
		self.pan = Point::new(
			cursor.x - (cursor.x - self.pan.x) * ratio,
			cursor.y - (cursor.y - self.pan.y) * ratio,
		);
		self.zoom = next;
	}

	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.pan.x += dx;
		self.pan.y += dy;
	}

	pub fn to_graph_coords(&self, screen: Point) -> Point {
		Point::new(
			(screen.x - self.pan.x) / self.zoom,
			(screen.y - self.pan.y) / self.zoom,
		)
	}

	pub fn to_screen_coords(&self, graph: Point) -> Point {
		Point::new(
			graph.x * self.zoom + self.pan.x,
			graph.y * self.zoom + self.pan.y,
		)
	}

	/// Pan so `target` lands in the middle of a `width`×`height` view.
	pub fn center_on(&mut self, target: Point, width: f64, height: f64) {
		self.pan = Point::new(
			width / 2.0 - target.x * self.zoom,
			height / 2.0 - target.y * self.zoom,
		);
	}

	pub fn reset(&mut self) {
		*self = Self::default();
	}
}
