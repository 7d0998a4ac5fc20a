//! Pure drawing model for one frame.
//!
//! Everything here is in graph space. The painter applies the viewport
//! transform, and hit testing converts pointer positions before asking.

use std::collections::{HashMap, HashSet};
use std::f64::consts::FRAC_PI_2;

use super::config::GraphConfig;
use super::style::node_style;
use super::types::{GraphEdge, GraphNode, NodeType, Point};

const PERSON_RADIUS: f64 = 28.0;
const PERSON_RADIUS_SELECTED: f64 = 32.0;
const SELECTED_GROW: (f64, f64) = (10.0, 2.0);
const BOW_BASE: f64 = 18.0;
const BOW_STEP: f64 = 28.0;
const ARROW_LEN: f64 = 10.0;
const CURVE_SAMPLES: usize = 16;
const LOOP_SPREAD: f64 = 0.6;
const LOOP_LIFT: f64 = 24.0;
const LABEL_CHAR_W: f64 = 6.5;
const LABEL_PAD: f64 = 12.0;
const LABEL_H: f64 = 18.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
	Circle { radius: f64 },
	RoundedRect { width: f64, height: f64, corner: f64 },
}

impl Shape {
	pub fn for_kind(kind: NodeType, selected: bool, cfg: &GraphConfig) -> Self {
		match kind {
			NodeType::Person => Shape::Circle {
				radius: if selected { PERSON_RADIUS_SELECTED } else { PERSON_RADIUS },
			},
			_ => {
				let (dw, dh) = if selected { SELECTED_GROW } else { (0.0, 0.0) };
				Shape::RoundedRect {
					width: cfg.node_width + dw,
					height: cfg.node_height + dh,
					corner: if kind == NodeType::ChatThread { 16.0 } else { 8.0 },
				}
			}
		}
	}

	fn scaled(self, k: f64) -> Self {
		match self {
			Shape::Circle { radius } => Shape::Circle { radius: radius * k },
			Shape::RoundedRect { width, height, corner } => Shape::RoundedRect {
				width: width * k,
				height: height * k,
				corner,
			},
		}
	}

	/// Distance from the center to the outline along unit direction `(ux, uy)`.
	pub fn boundary(self, ux: f64, uy: f64) -> f64 {
		match self {
			Shape::Circle { radius } => radius,
			Shape::RoundedRect { width, height, .. } => {
				let tx = if ux.abs() > 1e-9 { width / 2.0 / ux.abs() } else { f64::INFINITY };
				let ty = if uy.abs() > 1e-9 { height / 2.0 / uy.abs() } else { f64::INFINITY };
				tx.min(ty)
			}
		}
	}

	pub fn contains(self, center: Point, p: Point) -> bool {
		match self {
			Shape::Circle { radius } => center.distance(p) <= radius,
			Shape::RoundedRect { width, height, .. } => {
				(p.x - center.x).abs() <= width / 2.0 && (p.y - center.y).abs() <= height / 2.0
			}
		}
	}

	/// Vertical offset of the caption below the center.
	pub fn label_offset(self) -> f64 {
		match self {
			Shape::Circle { radius } => radius + 12.0,
			Shape::RoundedRect { height, .. } => height / 2.0 + 8.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeGlyph {
	pub id: String,
	pub center: Point,
	pub shape: Shape,
	pub fill: &'static str,
	pub stroke: &'static str,
	pub stroke_width: f64,
	pub icon: &'static str,
	pub label: String,
	/// Full label, present only when `label` was truncated.
	pub title: Option<String>,
	pub alpha: f64,
	pub selected: bool,
	pub hovered: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LabelBox {
	pub text: String,
	pub center: Point,
	pub width: f64,
	pub height: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeCurve {
	/// Index into the snapshot's edge list.
	pub index: usize,
	pub start: Point,
	pub control: Point,
	pub end: Point,
	pub arrow: [Point; 3],
	pub width: f64,
	pub alpha: f64,
	pub dashed: bool,
	pub hovered: bool,
	pub label: Option<LabelBox>,
}

impl EdgeCurve {
	pub fn point_at(&self, t: f64) -> Point {
		let u = 1.0 - t;
		Point::new(
			u * u * self.start.x + 2.0 * u * t * self.control.x + t * t * self.end.x,
			u * u * self.start.y + 2.0 * u * t * self.control.y + t * t * self.end.y,
		)
	}

	/// Approximate distance from `p` to the drawn curve or its arrowhead.
	pub fn distance_to(&self, p: Point) -> f64 {
		let mut best = p.distance(self.arrow[0]);
		let mut prev = self.start;
		for i in 1..=CURVE_SAMPLES {
			let next = self.point_at(i as f64 / CURVE_SAMPLES as f64);
			best = best.min(segment_distance(p, prev, next));
			prev = next;
		}
		best
	}
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len2 = dx * dx + dy * dy;
	if len2 < 1e-12 {
		return p.distance(a);
	}
	let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
	p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	pub nodes: Vec<NodeGlyph>,
	pub edges: Vec<EdgeCurve>,
}

impl Scene {
	/// Topmost node under `p` (nodes drawn later win).
	pub fn node_at(&self, p: Point) -> Option<&NodeGlyph> {
		self.nodes.iter().rev().find(|g| g.shape.contains(g.center, p))
	}

	pub fn edge_at(&self, p: Point, tolerance: f64) -> Option<usize> {
		self.edges
			.iter()
			.map(|e| (e.index, e.distance_to(p)))
			.filter(|(_, d)| *d <= tolerance)
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(i, _)| i)
	}
}

/// Per-frame emphasis inputs.
#[derive(Clone, Copy, Debug, Default)]
pub struct Emphasis<'a> {
	pub selected: Option<&'a str>,
	pub hovered_edge: Option<usize>,
	/// Node whose neighborhood is highlighted, possibly fading out.
	pub focus: Option<&'a str>,
	pub focus_neighbors: Option<&'a HashSet<String>>,
	/// Eased highlight strength in `[0, 1]`.
	pub highlight: f64,
	pub show_labels: bool,
}

impl Emphasis<'_> {
	fn is_highlighted(&self, id: &str) -> bool {
		self.focus == Some(id) || self.focus_neighbors.is_some_and(|n| n.contains(id))
	}
}

pub fn truncate_label(label: &str, max_chars: usize) -> String {
	if label.chars().count() > max_chars {
		let head: String = label.chars().take(max_chars).collect();
		format!("{head}...")
	} else {
		label.to_owned()
	}
}

/// Builds the frame for already-filtered nodes and edges.
///
/// `edges` must only reference nodes present in `nodes`; anything else is skipped.
pub fn build_scene(
	nodes: &[(&GraphNode, Point)],
	edges: &[(usize, &GraphEdge)],
	em: &Emphasis<'_>,
	cfg: &GraphConfig,
) -> Scene {
	let t = em.highlight.clamp(0.0, 1.0);
	let dimming = em.focus.is_some();

	let glyphs: Vec<NodeGlyph> = nodes
		.iter()
		.map(|(node, center)| {
			let selected = em.selected == Some(node.id.as_str());
			let hovered = em.focus == Some(node.id.as_str());
			let lit = em.is_highlighted(&node.id);
			let style = node_style(node.kind);
			let label = truncate_label(&node.label, cfg.label_max_chars);
			let title = (label != node.label).then(|| node.label.clone());
			let grow = if hovered {
				1.0 + 0.08 * t
			} else if lit {
				1.0 + 0.04 * t
			} else {
				1.0
			};
			NodeGlyph {
				id: node.id.clone(),
				center: *center,
				shape: Shape::for_kind(node.kind, selected, cfg).scaled(grow),
				fill: style.fill,
				stroke: style.stroke,
				stroke_width: if selected { 3.0 } else { 2.0 },
				icon: style.icon,
				label,
				title,
				alpha: if dimming && !lit { 1.0 - 0.65 * t } else { 1.0 },
				selected,
				hovered,
			}
		})
		.collect();

	let by_id: HashMap<&str, &NodeGlyph> = glyphs.iter().map(|g| (g.id.as_str(), g)).collect();
	let mut lanes: HashMap<(&str, &str), usize> = HashMap::new();
	let mut curves = Vec::with_capacity(edges.len());

	for &(index, edge) in edges {
		let (Some(src), Some(tgt)) = (by_id.get(edge.source.as_str()), by_id.get(edge.target.as_str())) else {
			continue;
		};
		// Bow to the left of the lower-id → higher-id direction, one lane per edge.
		let (lo, hi) = if edge.source <= edge.target {
			(edge.source.as_str(), edge.target.as_str())
		} else {
			(edge.target.as_str(), edge.source.as_str())
		};
		let lane = lanes.entry((lo, hi)).or_insert(0);
		let bow = BOW_BASE + BOW_STEP * *lane as f64;
		*lane += 1;

		let route = if edge.source == edge.target {
			loop_route(src, bow)
		} else {
			let Some(route) = arc_route(src, tgt, bow, lo == edge.source) else {
				continue;
			};
			route
		};
		let Route {
			start,
			control,
			apex,
			tip,
			dir: (ex, ey),
		} = route;
		let back = Point::new(tip.x - ex * ARROW_LEN, tip.y - ey * ARROW_LEN);
		let (px, py) = (-ey * ARROW_LEN * 0.5, ex * ARROW_LEN * 0.5);

		let hovered = em.hovered_edge == Some(index);
		let base_width = (edge.strength.clamp(0.0, 1.0) * 3.0).max(1.0);
		let lit = em.is_highlighted(&edge.source) && em.is_highlighted(&edge.target);
		let (alpha, width) = if hovered {
			(0.95, base_width * 1.5)
		} else if dimming && lit {
			(0.6 + 0.3 * t, base_width * (1.0 + 0.3 * t))
		} else if dimming {
			(0.6 - 0.45 * t, base_width * (1.0 - 0.3 * t))
		} else {
			(0.6, base_width)
		};

		let label = (hovered || em.show_labels).then(|| LabelBox {
			text: edge.relationship.clone(),
			center: apex,
			width: edge.relationship.chars().count() as f64 * LABEL_CHAR_W + LABEL_PAD,
			height: LABEL_H,
		});

		curves.push(EdgeCurve {
			index,
			start,
			control,
			end: back,
			arrow: [tip, Point::new(back.x + px, back.y + py), Point::new(back.x - px, back.y - py)],
			width,
			alpha,
			dashed: edge.strength < 0.5,
			hovered,
			label,
		});
	}

	Scene {
		nodes: glyphs,
		edges: curves,
	}
}

/// Curve skeleton of one edge before styling.
struct Route {
	start: Point,
	control: Point,
	/// Where the label sits.
	apex: Point,
	/// Arrow tip on the target outline.
	tip: Point,
	/// Curve direction arriving at `tip`.
	dir: (f64, f64),
}

fn arc_route(src: &NodeGlyph, tgt: &NodeGlyph, bow: f64, forward: bool) -> Option<Route> {
	let (a, b) = (src.center, tgt.center);
	let len = a.distance(b);
	if len < 1e-3 {
		return None;
	}
	let sign = if forward { 1.0 } else { -1.0 };
	let (cx, cy) = (sign * (b.x - a.x) / len, sign * (b.y - a.y) / len);
	let normal = Point::new(-cy, cx);

	let mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
	let apex = Point::new(mid.x + normal.x * bow, mid.y + normal.y * bow);
	let control = Point::new(mid.x + normal.x * 2.0 * bow, mid.y + normal.y * 2.0 * bow);

	let (sx, sy) = unit(a, control);
	let lift = src.shape.boundary(sx, sy);
	let start = Point::new(a.x + sx * lift, a.y + sy * lift);
	let (ex, ey) = unit(control, b);
	let reach = tgt.shape.boundary(ex, ey);
	Some(Route {
		start,
		control,
		apex,
		tip: Point::new(b.x - ex * reach, b.y - ey * reach),
		dir: (ex, ey),
	})
}

/// A teardrop over the top of the node, leaving left of center and
/// coming back in on the right.
fn loop_route(node: &NodeGlyph, bow: f64) -> Route {
	let c = node.center;
	let on_outline = |angle: f64| {
		let (ux, uy) = (angle.cos(), angle.sin());
		let r = node.shape.boundary(ux, uy);
		Point::new(c.x + ux * r, c.y + uy * r)
	};
	let start = on_outline(-FRAC_PI_2 - LOOP_SPREAD);
	let tip = on_outline(-FRAC_PI_2 + LOOP_SPREAD);
	let top = node.shape.boundary(0.0, -1.0);
	let control = Point::new(c.x, c.y - top - 2.0 * bow - LOOP_LIFT);
	let apex = Point::new(
		0.25 * start.x + 0.5 * control.x + 0.25 * tip.x,
		0.25 * start.y + 0.5 * control.y + 0.25 * tip.y,
	);
	Route {
		start,
		control,
		apex,
		tip,
		dir: unit(control, tip),
	}
}

fn unit(from: Point, to: Point) -> (f64, f64) {
	let d = from.distance(to);
	if d < 1e-9 {
		(1.0, 0.0)
	} else {
		((to.x - from.x) / d, (to.y - from.y) / d)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn fixture() -> (Vec<GraphNode>, Vec<GraphEdge>) {
		(
			vec![
				GraphNode::new("A", "Alice Anderson-Smythe", NodeType::Person),
				GraphNode::new("B", "Billing", NodeType::Project),
				GraphNode::new("C", "Chat", NodeType::ChatThread),
			],
			vec![
				GraphEdge::new("A", "B", "leads", 0.8),
				GraphEdge::new("B", "A", "reports to", 0.3),
				GraphEdge::new("A", "B", "reviews", 0.6),
				GraphEdge::new("A", "ghost", "haunts", 1.0),
			],
		)
	}

	fn scene_for(em: &Emphasis<'_>) -> Scene {
		let (nodes, edges) = fixture();
		let placed = [
			(&nodes[0], Point::new(0.0, 0.0)),
			(&nodes[1], Point::new(300.0, 0.0)),
			(&nodes[2], Point::new(0.0, 300.0)),
		];
		let indexed: Vec<(usize, &GraphEdge)> = edges.iter().enumerate().collect();
		build_scene(&placed, &indexed, em, &GraphConfig::default())
	}

	#[test]
	fn truncates_long_labels_only() {
		assert_eq!(truncate_label("Short", 18), "Short");
		assert_eq!(truncate_label("exactly eighteen!!", 18), "exactly eighteen!!");
		assert_eq!(
			truncate_label("Slack: auth-api discussion", 18),
			"Slack: auth-api di..."
		);
	}

	#[test]
	fn shapes_follow_type_and_selection() {
		let cfg = GraphConfig::default();
		assert_eq!(Shape::for_kind(NodeType::Person, false, &cfg), Shape::Circle { radius: 28.0 });
		assert_eq!(Shape::for_kind(NodeType::Person, true, &cfg), Shape::Circle { radius: 32.0 });
		assert_eq!(
			Shape::for_kind(NodeType::ChatThread, false, &cfg),
			Shape::RoundedRect { width: 120.0, height: 48.0, corner: 16.0 }
		);
		assert_eq!(
			Shape::for_kind(NodeType::File, true, &cfg),
			Shape::RoundedRect { width: 130.0, height: 50.0, corner: 8.0 }
		);
	}

	#[test]
	fn dangling_edges_are_not_drawn() {
		let scene = scene_for(&Emphasis::default());
		assert_eq!(scene.nodes.len(), 3);
		let indices: Vec<usize> = scene.edges.iter().map(|e| e.index).collect();
		assert_eq!(indices, [0, 1, 2]);
		assert_eq!(scene.nodes[0].label, "Alice Anderson-Smy...");
		assert_eq!(scene.nodes[0].title.as_deref(), Some("Alice Anderson-Smythe"));
		assert_eq!(scene.nodes[1].title, None);
	}

	#[test]
	fn self_loops_are_drawn_above_their_node() {
		let node = GraphNode::new("A", "Alice", NodeType::Person);
		let edges = [
			GraphEdge::new("A", "A", "mentions", 0.7),
			GraphEdge::new("A", "A", "follows up", 0.4),
		];
		let indexed: Vec<(usize, &GraphEdge)> = edges.iter().enumerate().collect();
		let scene = build_scene(
			&[(&node, Point::new(0.0, 0.0))],
			&indexed,
			&Emphasis::default(),
			&GraphConfig::default(),
		);
		assert_eq!(scene.edges.len(), 2);

		let first = &scene.edges[0];
		assert!((first.arrow[0].distance(Point::new(0.0, 0.0)) - 28.0).abs() < 1e-9);
		assert!((first.start.distance(Point::new(0.0, 0.0)) - 28.0).abs() < 1e-9);
		let top = first.point_at(0.5);
		assert!(top.y < -28.0, "loop apex {top:?} inside the node");
		assert_eq!(scene.edge_at(top, 6.0), Some(0));
		assert!(scene.node_at(top).is_none());

		// A second loop on the same node rises higher.
		assert!(scene.edges[1].point_at(0.5).y < top.y - 10.0);
	}

	#[test]
	fn parallel_and_antiparallel_edges_take_separate_lanes() {
		let scene = scene_for(&Emphasis::default());
		let apexes: Vec<Point> = scene.edges.iter().map(|e| e.point_at(0.5)).collect();
		for i in 0..apexes.len() {
			for j in i + 1..apexes.len() {
				assert!(apexes[i].distance(apexes[j]) > 10.0, "edges {i} and {j} overlap");
			}
		}
	}

	#[test]
	fn arrowheads_touch_the_target_outline() {
		let scene = scene_for(&Emphasis::default());
		let ab = &scene.edges[0];
		// Target B is a 120×48 box centered at (300, 0).
		let tip = ab.arrow[0];
		let on_edge = ((tip.x - 300.0).abs() - 60.0).abs() < 1e-6 || ((tip.y).abs() - 24.0).abs() < 1e-6;
		assert!(on_edge, "tip {tip:?} not on the box outline");
		assert!((ab.end.distance(tip) - ARROW_LEN).abs() < 1e-9);
		// Source A is a circle of radius 28.
		assert!((ab.start.distance(Point::new(0.0, 0.0)) - 28.0).abs() < 1e-9);
	}

	#[test]
	fn strength_drives_width_and_dash() {
		let scene = scene_for(&Emphasis::default());
		assert!((scene.edges[0].width - 2.4).abs() < 1e-9);
		assert!(!scene.edges[0].dashed);
		assert_eq!(scene.edges[1].width, 1.0);
		assert!(scene.edges[1].dashed);
	}

	#[test]
	fn labels_show_on_hover_or_toggle() {
		let plain = scene_for(&Emphasis::default());
		assert!(plain.edges.iter().all(|e| e.label.is_none()));

		let hovered = scene_for(&Emphasis {
			hovered_edge: Some(1),
			..Emphasis::default()
		});
		let labelled: Vec<usize> = hovered.edges.iter().filter(|e| e.label.is_some()).map(|e| e.index).collect();
		assert_eq!(labelled, [1]);
		let label = hovered.edges[1].label.as_ref().unwrap();
		assert_eq!(label.text, "reports to");
		assert!(label.center.distance(hovered.edges[1].point_at(0.5)) < 20.0);

		let all = scene_for(&Emphasis {
			show_labels: true,
			..Emphasis::default()
		});
		assert!(all.edges.iter().all(|e| e.label.is_some()));
	}

	#[test]
	fn hover_dims_everything_outside_the_neighborhood() {
		let neighbors = HashSet::from(["B".to_owned()]);
		let scene = scene_for(&Emphasis {
			focus: Some("A"),
			focus_neighbors: Some(&neighbors),
			highlight: 1.0,
			..Emphasis::default()
		});
		assert_eq!(scene.nodes[0].alpha, 1.0);
		assert!(scene.nodes[0].hovered);
		assert_eq!(scene.nodes[1].alpha, 1.0);
		assert!((scene.nodes[2].alpha - 0.35).abs() < 1e-9);
		// Hovering never moves anything.
		assert_eq!(scene.nodes[0].center, Point::new(0.0, 0.0));
	}

	#[test]
	fn hit_testing_prefers_shapes_and_finds_curves() {
		let scene = scene_for(&Emphasis::default());
		assert_eq!(scene.node_at(Point::new(5.0, 5.0)).map(|g| g.id.as_str()), Some("A"));
		assert_eq!(scene.node_at(Point::new(355.0, 20.0)).map(|g| g.id.as_str()), Some("B"));
		assert!(scene.node_at(Point::new(150.0, 150.0)).is_none());

		let on_curve = scene.edges[2].point_at(0.5);
		assert_eq!(scene.edge_at(on_curve, 6.0), Some(2));
		assert_eq!(scene.edge_at(Point::new(150.0, 250.0), 6.0), None);
	}
}
