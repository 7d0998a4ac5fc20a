use std::collections::HashSet;

use log::{debug, error, info, warn};

use super::config::{GraphConfig, LayoutMode};
use super::error::GraphError;
use super::layout::{self, Positions};
use super::scene::{self, Emphasis, Scene};
use super::types::{GraphData, GraphEdge, GraphNode, NodeType, Point};
use super::viewport::Viewport;
use super::visibility::{self, Visibility};

/// What the primary pointer is currently doing.
///
/// Node presses and background pans are mutually exclusive: a press only
/// starts from `Idle`.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Interaction {
	#[default]
	Idle,
	/// Pressed on a node while dragging is disabled; may become a click.
	NodePressed { id: String, start: Point },
	DraggingNode { id: String, offset: Point, start: Point },
	Panning { last: Point },
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<String>,
	pub neighbors: HashSet<String>,
	pub edge: Option<usize>,
	pub highlight_t: f64,
	pub prev_node: Option<String>,
	pub prev_neighbors: HashSet<String>,
	delay_t: f64,
}

pub struct GraphViewState {
	pub cfg: GraphConfig,
	data: GraphData,
	positions: Positions,
	origin: Positions,
	pub viewport: Viewport,
	pub visibility: Visibility,
	selected: Option<String>,
	pub hover: HoverState,
	interaction: Interaction,
	pub show_labels: bool,
	pub width: f64,
	pub height: f64,
	loading: bool,
	load_seq: u64,
	error: Option<String>,
}

impl GraphViewState {
	pub fn new(cfg: GraphConfig, width: f64, height: f64) -> Self {
		Self {
			cfg,
			data: GraphData::default(),
			positions: Positions::new(),
			origin: Positions::new(),
			viewport: Viewport::default(),
			visibility: Visibility::default(),
			selected: None,
			hover: HoverState::default(),
			interaction: Interaction::Idle,
			show_labels: false,
			width,
			height,
			loading: false,
			load_seq: 0,
			error: None,
		}
	}

	pub fn data(&self) -> &GraphData {
		&self.data
	}

	pub fn position(&self, id: &str) -> Option<Point> {
		self.positions.get(id).copied()
	}

	pub fn selected(&self) -> Option<&GraphNode> {
		self.selected.as_deref().and_then(|id| self.data.node(id))
	}

	/// CSS cursor for the canvas in its current interaction.
	pub fn cursor(&self) -> &'static str {
		match self.interaction {
			Interaction::Panning { .. } | Interaction::DraggingNode { .. } => "grabbing",
			Interaction::NodePressed { .. } => "pointer",
			Interaction::Idle if self.hover.node.is_some() => "pointer",
			Interaction::Idle => "grab",
		}
	}

	pub fn is_loading(&self) -> bool {
		self.loading
	}

	pub fn error(&self) -> Option<&str> {
		self.error.as_deref()
	}

	pub fn layout_mode(&self) -> LayoutMode {
		self.cfg.layout_mode
	}

	// ---- loading ----

	/// Marks a load in flight and returns its ticket.
	pub fn begin_load(&mut self) -> u64 {
		self.load_seq += 1;
		self.loading = true;
		self.load_seq
	}

	/// Applies a finished load unless a newer one has started since.
	pub fn finish_load(&mut self, ticket: u64, result: Result<GraphData, GraphError>) -> bool {
		if ticket != self.load_seq {
			debug!("discarding stale graph load #{ticket} (latest #{})", self.load_seq);
			return false;
		}
		self.loading = false;
		match result {
			Ok(data) => {
				info!("graph loaded: {} nodes, {} edges", data.nodes.len(), data.edges.len());
				self.error = None;
				self.install(data);
			}
			Err(e) => {
				error!("failed to load graph: {e}");
				self.error = Some(e.to_string());
				self.install(GraphData::default());
			}
		}
		true
	}

	fn install(&mut self, data: GraphData) {
		let dangling = data.dangling_edges();
		if dangling > 0 {
			warn!("{dangling} edge(s) reference unknown nodes and will not be drawn");
		}
		self.data = data;
		self.origin = layout::initial_layout(&self.data.nodes, &self.cfg);
		self.positions = self.origin.clone();
		self.selected = None;
		self.hover = HoverState::default();
		self.interaction = Interaction::Idle;
		self.viewport.reset();
		self.visibility = Visibility::default();

		let seed = self
			.data
			.nodes
			.iter()
			.find(|n| n.kind == NodeType::Project)
			.or_else(|| self.data.nodes.iter().find(|n| n.kind == NodeType::PullRequest))
			.or_else(|| self.data.nodes.first())
			.map(|n| n.id.clone());
		if let Some(seed) = seed {
			self.visibility.show_only(&seed);
			self.visibility.expand_neighbors(&self.data, 1);
			if let Some(p) = self.position(&seed) {
				self.viewport.center_on(p, self.width, self.height);
			}
		}
	}

	// ---- derived sets ----

	pub fn rendered_nodes(&self) -> Vec<&GraphNode> {
		visibility::rendered_nodes(&self.data, &self.visibility).collect()
	}

	pub fn rendered_edges(&self) -> Vec<usize> {
		let ids: HashSet<&str> = visibility::rendered_nodes(&self.data, &self.visibility)
			.map(|n| n.id.as_str())
			.collect();
		visibility::rendered_edges(&self.data.edges, &ids)
	}

	/// `(nodes, edges)` currently drawn.
	pub fn counts(&self) -> (usize, usize) {
		(self.rendered_nodes().len(), self.rendered_edges().len())
	}

	// ---- selection & visibility ----

	/// Selects `id`, fans its visible neighbors out around it and centers on it.
	pub fn select_node(&mut self, id: &str) -> bool {
		if self.loading {
			return false;
		}
		let Some(center) = self.position(id) else {
			return false;
		};
		self.positions = self.origin.clone();

		let rendered: HashSet<&str> = visibility::rendered_nodes(&self.data, &self.visibility)
			.map(|n| n.id.as_str())
			.collect();
		let adjacent: HashSet<&str> = self
			.data
			.edges
			.iter()
			.filter_map(|e| e.other_end(id))
			.filter(|other| *other != id && rendered.contains(other))
			.collect();
		let neighbors: Vec<(&str, NodeType)> = self
			.data
			.nodes
			.iter()
			.filter(|n| adjacent.contains(n.id.as_str()))
			.map(|n| (n.id.as_str(), n.kind))
			.collect();

		let placed = layout::arrange_neighbors(center, &neighbors, &self.cfg);
		debug!("selected {id}: arranged {} neighbor(s)", placed.len());
		self.positions.extend(placed);
		self.selected = Some(id.to_owned());
		self.viewport.center_on(center, self.width, self.height);
		true
	}

	pub fn clear_selection(&mut self) {
		self.selected = None;
	}

	pub fn set_query(&mut self, query: &str) {
		self.visibility.set_query(query);
	}

	/// Jumps to the node named by the search box. No match changes nothing.
	pub fn focus_search(&mut self) -> bool {
		if self.loading {
			return false;
		}
		let Some(hit) = visibility::find_search_target(&self.data.nodes, self.visibility.query()) else {
			return false;
		};
		let node = &self.data.nodes[hit.index()];
		let (id, kind) = (node.id.clone(), node.kind);
		let hidden_by_query = !self.visibility.matches_query(node);

		self.visibility.show_only(&id);
		self.visibility.types.insert(kind);
		if hidden_by_query {
			self.visibility.set_query("");
		}
		self.select_node(&id)
	}

	pub fn toggle_type(&mut self, kind: NodeType) {
		self.visibility.toggle_type(kind);
	}

	pub fn expand_neighbors(&mut self, levels: usize) {
		if !self.loading {
			self.visibility.expand_neighbors(&self.data, levels);
		}
	}

	pub fn reveal_all(&mut self) {
		if !self.loading {
			self.visibility.reveal_all(&self.data);
		}
	}

	pub fn clear_visible(&mut self) {
		self.visibility.clear();
	}

	// ---- viewport ----

	pub fn zoom_in(&mut self) {
		self.viewport.zoom_in(&self.cfg);
	}

	pub fn zoom_out(&mut self) {
		self.viewport.zoom_out(&self.cfg);
	}

	/// Home view: identity transform, nothing selected, original layout.
	pub fn reset_view(&mut self) {
		self.viewport.reset();
		self.selected = None;
		self.positions = self.origin.clone();
	}

	pub fn fit_view(&mut self) {
		let points: Vec<Point> = self
			.rendered_nodes()
			.iter()
			.filter_map(|n| self.position(&n.id))
			.collect();
		if let Some(vp) = layout::fit_to_screen(&points, self.width, self.height, &self.cfg) {
			self.viewport = vp;
		}
	}

	pub fn set_layout_mode(&mut self, mode: LayoutMode) {
		if self.loading || mode == self.cfg.layout_mode {
			return;
		}
		info!("switching layout to {mode:?}");
		self.cfg.layout_mode = mode;
		self.origin = layout::initial_layout(&self.data.nodes, &self.cfg);
		self.interaction = Interaction::Idle;
		self.reset_view();
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	// ---- pointer ----

	pub fn pointer_down(&mut self, screen: Point) {
		if self.loading || self.interaction != Interaction::Idle {
			return;
		}
		let graph = self.viewport.to_graph_coords(screen);
		let hit = self.scene().node_at(graph).map(|g| (g.id.clone(), g.center));
		self.interaction = match hit {
			Some((id, center)) if self.cfg.layout_mode.allows_drag() => Interaction::DraggingNode {
				id,
				offset: Point::new(graph.x - center.x, graph.y - center.y),
				start: screen,
			},
			Some((id, _)) => Interaction::NodePressed { id, start: screen },
			None => Interaction::Panning { last: screen },
		};
		debug!("pointer down -> {:?}", self.interaction);
	}

	pub fn pointer_move(&mut self, screen: Point) {
		if self.loading {
			return;
		}
		if self.interaction == Interaction::Idle {
			self.update_hover(screen);
			return;
		}
		match &mut self.interaction {
			Interaction::Panning { last } => {
				let (dx, dy) = (screen.x - last.x, screen.y - last.y);
				*last = screen;
				self.viewport.pan_by(dx, dy);
			}
			Interaction::DraggingNode { id, offset, .. } => {
				let graph = self.viewport.to_graph_coords(screen);
				let p = Point::new(graph.x - offset.x, graph.y - offset.y);
				self.positions.insert(id.clone(), p);
				self.origin.insert(id.clone(), p);
			}
			Interaction::NodePressed { .. } | Interaction::Idle => {}
		}
	}

	pub fn pointer_up(&mut self, screen: Point) {
		let finished = std::mem::take(&mut self.interaction);
		if self.loading {
			return;
		}
		let clicked = match finished {
			Interaction::NodePressed { id, start } | Interaction::DraggingNode { id, start, .. }
				if screen.distance(start) < self.cfg.click_slop =>
			{
				Some(id)
			}
			_ => None,
		};
		if let Some(id) = clicked {
			self.select_node(&id);
		}
	}

	pub fn pointer_leave(&mut self) {
		self.interaction = Interaction::Idle;
		self.set_hover(None);
		self.hover.edge = None;
	}

	pub fn wheel(&mut self, delta_y: f64, screen: Point) {
		if !self.loading {
			self.viewport.wheel(delta_y, screen, &self.cfg);
		}
	}

	/// Keyboard navigation. Returns whether the key was consumed.
	pub fn key(&mut self, key: &str) -> bool {
		if self.loading {
			return false;
		}
		let step = self.cfg.key_pan_step;
		match key {
			"ArrowLeft" => self.viewport.pan_by(step, 0.0),
			"ArrowRight" => self.viewport.pan_by(-step, 0.0),
			"ArrowUp" => self.viewport.pan_by(0.0, step),
			"ArrowDown" => self.viewport.pan_by(0.0, -step),
			"+" | "=" => self.zoom_in(),
			"-" | "_" => self.zoom_out(),
			"0" => self.reset_view(),
			"Escape" => self.clear_selection(),
			_ => return false,
		}
		true
	}

	// ---- hover ----

	fn update_hover(&mut self, screen: Point) {
		let graph = self.viewport.to_graph_coords(screen);
		let scene = self.scene();
		let node = scene.node_at(graph).map(|g| g.id.clone());
		let edge = if node.is_none() {
			scene.edge_at(graph, self.cfg.edge_hit_tolerance / self.viewport.zoom)
		} else {
			None
		};
		self.set_hover(node);
		self.hover.edge = edge;
	}

	pub fn set_hover(&mut self, node: Option<String>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Keep the old neighborhood around so it can fade out.
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.neighbors.clear();
		if let Some(id) = &node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			self.hover.neighbors.extend(
				self.data
					.edges
					.iter()
					.filter_map(|e: &GraphEdge| e.other_end(id))
					.filter(|other| other != id)
					.map(str::to_owned),
			);
		}
		self.hover.node = node;
	}

	pub fn tick(&mut self, dt: f64) {
		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	// ---- drawing ----

	pub fn scene(&self) -> Scene {
		let nodes: Vec<(&GraphNode, Point)> = visibility::rendered_nodes(&self.data, &self.visibility)
			.filter_map(|n| self.position(&n.id).map(|p| (n, p)))
			.collect();
		let edges: Vec<(usize, &GraphEdge)> = self
			.rendered_edges()
			.into_iter()
			.map(|i| (i, &self.data.edges[i]))
			.collect();

		let (focus, neighbors) = if self.hover.node.is_some() {
			(self.hover.node.as_deref(), &self.hover.neighbors)
		} else {
			(self.hover.prev_node.as_deref(), &self.hover.prev_neighbors)
		};
		let em = Emphasis {
			selected: self.selected.as_deref(),
			hovered_edge: self.hover.edge,
			focus,
			focus_neighbors: Some(neighbors),
			highlight: ease_out_cubic(self.hover.highlight_t),
			show_labels: self.show_labels,
		};
		scene::build_scene(&nodes, &edges, &em, &self.cfg)
	}
}

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}
