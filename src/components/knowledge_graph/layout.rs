//! Deterministic node placement.
//!
//! Initial placement is either stationary columns by type or a single circle.
//! Selecting a node arranges its visible neighbors on rings around it, followed
//! by a bounded relaxation pass that pushes overlapping boxes apart.

use std::collections::HashMap;
use std::f64::consts::{PI, TAU};

use super::config::{GraphConfig, LayoutMode};
use super::types::{GraphNode, NodeType, Point};
use super::viewport::Viewport;

pub type Positions = HashMap<String, Point>;

/// Angle of the first neighbor slot (straight up).
const BASE_ANGLE: f64 = -PI / 2.0;

/// Shortfalls below this are rounding noise, not overlap.
const OVERLAP_EPSILON: f64 = 1e-6;

pub fn initial_layout(nodes: &[GraphNode], cfg: &GraphConfig) -> Positions {
	match cfg.layout_mode {
		LayoutMode::Grid => grid_layout(nodes, cfg),
		LayoutMode::Circular => circular_layout(nodes, cfg),
	}
}

/// Column order: configured priority first, then unseen types as encountered.
pub fn type_columns(nodes: &[GraphNode], priority: &[NodeType]) -> Vec<NodeType> {
	let mut present = Vec::new();
	for node in nodes {
		if !present.contains(&node.kind) {
			present.push(node.kind);
		}
	}
	let mut columns: Vec<NodeType> = Vec::with_capacity(present.len());
	for kind in priority.iter().chain(present.iter()) {
		if present.contains(kind) && !columns.contains(kind) {
			columns.push(*kind);
		}
	}
	columns
}

pub fn grid_layout(nodes: &[GraphNode], cfg: &GraphConfig) -> Positions {
	let columns = type_columns(nodes, &cfg.type_priority);
	let rows: Vec<Vec<&GraphNode>> = columns
		.iter()
		.map(|kind| nodes.iter().filter(|n| n.kind == *kind).collect())
		.collect();

	let tallest = rows.iter().map(Vec::len).max().unwrap_or(0);
	let tallest_h = tallest.saturating_sub(1) as f64 * cfg.row_pitch;
	let grid_w = columns.len().saturating_sub(1) as f64 * cfg.column_pitch;
	let left = cfg.canvas_center.x - grid_w / 2.0;
	let top = cfg.canvas_center.y - tallest_h / 2.0;

	let mut positions = Positions::with_capacity(nodes.len());
	for (col, members) in rows.iter().enumerate() {
		let own_h = members.len().saturating_sub(1) as f64 * cfg.row_pitch;
		let y0 = top + (tallest_h - own_h) / 2.0;
		let x = left + col as f64 * cfg.column_pitch;
		for (row, node) in members.iter().enumerate() {
			positions.insert(node.id.clone(), Point::new(x, y0 + row as f64 * cfg.row_pitch));
		}
	}
	positions
}

pub fn circular_layout(nodes: &[GraphNode], cfg: &GraphConfig) -> Positions {
	let n = nodes.len() as f64;
	nodes
		.iter()
		.enumerate()
		.map(|(i, node)| {
			let angle = i as f64 * TAU / n;
			let pos = Point::new(
				cfg.canvas_center.x + cfg.circle_radius * angle.cos(),
				cfg.canvas_center.y + cfg.circle_radius * angle.sin(),
			);
			(node.id.clone(), pos)
		})
		.collect()
}

/// Radius of the innermost neighbor ring for `count` neighbors.
pub fn ring_radius(count: usize, cfg: &GraphConfig) -> f64 {
	let needed = count as f64 * (cfg.node_width + cfg.node_spacing) / TAU;
	needed
		.max(cfg.min_ring_radius)
		.min(cfg.max_ring_radius.max(cfg.min_ring_radius))
}

/// Places `neighbors` on rings around `center`, one angular slice per type.
///
/// Output order matches input order. The result is already collision-relaxed.
pub fn arrange_neighbors(center: Point, neighbors: &[(&str, NodeType)], cfg: &GraphConfig) -> Vec<(String, Point)> {
	if neighbors.is_empty() {
		return Vec::new();
	}

	let mut groups: Vec<(NodeType, Vec<usize>)> = Vec::new();
	for (i, (_, kind)) in neighbors.iter().enumerate() {
		match groups.iter_mut().find(|(k, _)| k == kind) {
			Some((_, members)) => members.push(i),
			None => groups.push((*kind, vec![i])),
		}
	}

	let slice = TAU / groups.len() as f64;
	let pitch = cfg.node_width + cfg.node_spacing;
	let ring_gap = cfg.node_height + cfg.node_spacing;
	let first_ring = ring_radius(neighbors.len(), cfg);
	let jitter = cfg.ring_jitter_deg.to_radians();

	let mut points = vec![center; neighbors.len()];
	for (g, (_, members)) in groups.iter().enumerate() {
		let slice_start = BASE_ANGLE + g as f64 * slice;
		let mut remaining = members.as_slice();
		let mut layer = 0usize;
		while !remaining.is_empty() {
			let radius = first_ring + layer as f64 * ring_gap;
			let capacity = ((slice * radius / pitch).floor() as usize).max(1);
			let take = capacity.min(remaining.len());
			let (ring, rest) = remaining.split_at(take);
			for (j, &idx) in ring.iter().enumerate() {
				let angle = slice_start + slice * j as f64 / take as f64 + jitter * layer as f64;
				points[idx] = Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin());
			}
			remaining = rest;
			layer += 1;
		}
	}

	resolve_collisions(&mut points, cfg.collision_distance(), cfg.collision_passes);

	neighbors
		.iter()
		.zip(points)
		.map(|((id, _), p)| ((*id).to_owned(), p))
		.collect()
}

/// Sum over all pairs of how far each pair falls short of `min_dist`.
pub fn total_overlap(points: &[Point], min_dist: f64) -> f64 {
	let mut total = 0.0;
	for i in 0..points.len() {
		for j in i + 1..points.len() {
			let short = min_dist - points[i].distance(points[j]);
			if short > OVERLAP_EPSILON {
				total += short;
			}
		}
	}
	total
}

/// Pushes overlapping pairs apart, at most `max_passes` times.
///
/// A pass that would raise the total overlap is thrown away and relaxation
/// stops there. Returns the number of passes applied.
pub fn resolve_collisions(points: &mut [Point], min_dist: f64, max_passes: usize) -> usize {
	let mut overlap = total_overlap(points, min_dist);
	for pass in 0..max_passes {
		if overlap <= 0.0 {
			return pass;
		}
		let mut next = points.to_vec();
		relax_pass(&mut next, min_dist);
		let next_overlap = total_overlap(&next, min_dist);
		if next_overlap > overlap {
			return pass;
		}
		points.copy_from_slice(&next);
		overlap = next_overlap;
	}
	max_passes
}

fn relax_pass(points: &mut [Point], min_dist: f64) {
	for i in 0..points.len() {
		for j in i + 1..points.len() {
			let (a, b) = (points[i], points[j]);
			let dist = a.distance(b);
			if min_dist - dist <= OVERLAP_EPSILON {
				continue;
			}
			let (ux, uy) = if dist > 1e-9 {
				((b.x - a.x) / dist, (b.y - a.y) / dist)
			} else {
				// Coincident: pick a direction from the pair so repeated runs agree.
				let angle = (i * 31 + j * 17) as f64;
				(angle.cos(), angle.sin())
			};
			let push = (min_dist - dist) / 2.0;
			points[i] = Point::new(a.x - ux * push, a.y - uy * push);
			points[j] = Point::new(b.x + ux * push, b.y + uy * push);
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min: Point,
	pub max: Point,
}

impl Bounds {
	pub fn of(points: &[Point]) -> Option<Self> {
		let first = *points.first()?;
		Some(points.iter().fold(Self { min: first, max: first }, |b, p| Self {
			min: Point::new(b.min.x.min(p.x), b.min.y.min(p.y)),
			max: Point::new(b.max.x.max(p.x), b.max.y.max(p.y)),
		}))
	}

	pub fn width(&self) -> f64 {
		self.max.x - self.min.x
	}

	pub fn height(&self) -> f64 {
		self.max.y - self.min.y
	}

	pub fn center(&self) -> Point {
		Point::new((self.min.x + self.max.x) / 2.0, (self.min.y + self.max.y) / 2.0)
	}
}

/// Viewport that frames every point (plus one node box) in a `width`×`height` view.
pub fn fit_to_screen(points: &[Point], width: f64, height: f64, cfg: &GraphConfig) -> Option<Viewport> {
	let bounds = Bounds::of(points)?;
	let box_w = bounds.width() + cfg.node_width;
	let box_h = bounds.height() + cfg.node_height;
	let zoom = cfg.clamp_zoom(((width - cfg.fit_padding) / box_w).min((height - cfg.fit_padding) / box_h));
	let mut vp = Viewport {
		zoom,
		pan: Point::default(),
	};
	vp.center_on(bounds.center(), width, height);
	Some(vp)
}
