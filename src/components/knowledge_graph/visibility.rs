use std::collections::HashSet;

use super::types::{GraphData, GraphEdge, GraphNode, NodeType};

/// Which nodes are eligible for drawing.
///
/// A node is rendered iff its id is in `node_ids`, its type is in `types`,
/// and its label contains `query` case-insensitively.
#[derive(Clone, Debug, PartialEq)]
pub struct Visibility {
	pub node_ids: HashSet<String>,
	pub types: HashSet<NodeType>,
	query: String,
	query_lower: String,
}

impl Default for Visibility {
	fn default() -> Self {
		Self {
			node_ids: HashSet::new(),
			types: NodeType::ALL.into_iter().collect(),
			query: String::new(),
			query_lower: String::new(),
		}
	}
}

impl Visibility {
	pub fn query(&self) -> &str {
		&self.query
	}

	pub fn set_query(&mut self, query: &str) {
		self.query = query.to_owned();
		self.query_lower = query.to_lowercase();
	}

	pub fn matches_query(&self, node: &GraphNode) -> bool {
		self.query_lower.is_empty() || node.label.to_lowercase().contains(&self.query_lower)
	}

	pub fn is_rendered(&self, node: &GraphNode) -> bool {
		self.node_ids.contains(&node.id) && self.types.contains(&node.kind) && self.matches_query(node)
	}

	/// Grow the visible set by `levels` hops along edges in either direction.
	///
	/// Only ids of nodes in `data` are added; dangling edge ends are skipped.
	pub fn expand_neighbors(&mut self, data: &GraphData, levels: usize) {
		let known: HashSet<&str> = data.nodes.iter().map(|n| n.id.as_str()).collect();
		for _ in 0..levels {
			let frontier: Vec<&str> = data
				.edges
				.iter()
				.flat_map(|e| {
					let fwd = self.node_ids.contains(&e.source).then_some(e.target.as_str());
					let back = self.node_ids.contains(&e.target).then_some(e.source.as_str());
					fwd.into_iter().chain(back)
				})
				.filter(|id| known.contains(id) && !self.node_ids.contains(*id))
				.collect();
			if frontier.is_empty() {
				break;
			}
			self.node_ids.extend(frontier.into_iter().map(str::to_owned));
		}
	}

	pub fn reveal_all(&mut self, data: &GraphData) {
		self.node_ids = data.nodes.iter().map(|n| n.id.clone()).collect();
		self.types = NodeType::ALL.into_iter().collect();
		self.set_query("");
	}

	pub fn clear(&mut self) {
		self.node_ids.clear();
	}

	pub fn toggle_type(&mut self, kind: NodeType) {
		if !self.types.remove(&kind) {
			self.types.insert(kind);
		}
	}

	pub fn show_only(&mut self, id: &str) {
		self.node_ids.clear();
		self.node_ids.insert(id.to_owned());
	}
}

/// Outcome of a search-box lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchHit {
	Id(usize),
	Label(usize),
}

impl SearchHit {
	pub fn index(self) -> usize {
		match self {
			SearchHit::Id(i) | SearchHit::Label(i) => i,
		}
	}
}

/// Exact id match first, then the first label containing `query`.
///
/// Labels are matched exactly as [`Visibility::matches_query`] does, so a
/// label hit is always renderable under the same query.
pub fn find_search_target(nodes: &[GraphNode], query: &str) -> Option<SearchHit> {
	if query.trim().is_empty() {
		return None;
	}
	let needle = query.to_lowercase();
	nodes
		.iter()
		.position(|n| n.id.to_lowercase() == needle)
		.map(SearchHit::Id)
		.or_else(|| {
			nodes
				.iter()
				.position(|n| n.label.to_lowercase().contains(&needle))
				.map(SearchHit::Label)
		})
}

pub fn rendered_nodes<'a>(data: &'a GraphData, vis: &'a Visibility) -> impl Iterator<Item = &'a GraphNode> {
	data.nodes.iter().filter(move |n| vis.is_rendered(n))
}

/// Indices of edges whose endpoints are both in `rendered`.
pub fn rendered_edges(edges: &[GraphEdge], rendered: &HashSet<&str>) -> Vec<usize> {
	edges
		.iter()
		.enumerate()
		.filter(|(_, e)| rendered.contains(e.source.as_str()) && rendered.contains(e.target.as_str()))
		.map(|(i, _)| i)
		.collect()
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	fn scenario() -> GraphData {
		GraphData {
			nodes: vec![
				GraphNode::new("A", "Alice", NodeType::Person),
				GraphNode::new("B", "Billing", NodeType::Project),
				GraphNode::new("C", "Checkout", NodeType::Project),
			],
			edges: vec![
				GraphEdge::new("A", "B", "leads", 0.8),
				GraphEdge::new("A", "C", "leads", 0.5),
			],
		}
	}

	fn ids<'a>(data: &'a GraphData, vis: &'a Visibility) -> HashSet<&'a str> {
		rendered_nodes(data, vis).map(|n| n.id.as_str()).collect()
	}

	#[test]
	fn expanding_one_hop_reveals_the_second_edge() {
		let data = scenario();
		let mut vis = Visibility::default();
		vis.node_ids = ["A", "B"].map(String::from).into_iter().collect();

		let shown = ids(&data, &vis);
		assert_eq!(shown, HashSet::from(["A", "B"]));
		assert_eq!(rendered_edges(&data.edges, &shown), vec![0]);

		vis.expand_neighbors(&data, 1);
		let shown = ids(&data, &vis);
		assert_eq!(shown, HashSet::from(["A", "B", "C"]));
		assert_eq!(rendered_edges(&data.edges, &shown), vec![0, 1]);
	}

	#[test]
	fn expansion_follows_edges_backwards() {
		let data = scenario();
		let mut vis = Visibility::default();
		vis.show_only("C");
		vis.expand_neighbors(&data, 1);
		assert_eq!(ids(&data, &vis), HashSet::from(["A", "C"]));
		vis.expand_neighbors(&data, 1);
		assert_eq!(ids(&data, &vis), HashSet::from(["A", "B", "C"]));
	}

	#[test]
	fn expansion_skips_dangling_edge_ends() {
		let mut data = scenario();
		data.edges.push(GraphEdge::new("C", "ghost", "links", 0.2));
		data.edges.push(GraphEdge::new("phantom", "A", "links", 0.2));
		let mut vis = Visibility::default();
		vis.show_only("A");
		vis.expand_neighbors(&data, 3);
		assert_eq!(vis.node_ids, HashSet::from(["A", "B", "C"].map(String::from)));
	}

	#[test]
	fn render_eligibility_is_the_and_of_three_predicates() {
		let data = scenario();
		let node = &data.nodes[1];
		for in_set in [false, true] {
			for type_on in [false, true] {
				for query in ["", "bill", "zzz"] {
					let mut vis = Visibility::default();
					if in_set {
						vis.show_only(&node.id);
					}
					if !type_on {
						vis.toggle_type(NodeType::Project);
					}
					vis.set_query(query);
					let expected = in_set && type_on && query != "zzz";
					assert_eq!(vis.is_rendered(node), expected, "{in_set} {type_on} {query:?}");
				}
			}
		}
	}

	#[test]
	fn query_is_case_insensitive() {
		let data = scenario();
		let mut vis = Visibility::default();
		vis.reveal_all(&data);
		vis.set_query("CHECK");
		assert_eq!(ids(&data, &vis), HashSet::from(["C"]));
		assert_eq!(vis.query(), "CHECK");
	}

	#[test]
	fn toggling_a_type_twice_restores_it() {
		let mut vis = Visibility::default();
		vis.toggle_type(NodeType::File);
		assert!(!vis.types.contains(&NodeType::File));
		vis.toggle_type(NodeType::File);
		assert!(vis.types.contains(&NodeType::File));
	}

	#[test]
	fn reveal_all_resets_types_and_query_and_clear_keeps_them() {
		let data = scenario();
		let mut vis = Visibility::default();
		vis.toggle_type(NodeType::Person);
		vis.set_query("nothing");
		vis.reveal_all(&data);
		assert_eq!(ids(&data, &vis).len(), 3);

		vis.toggle_type(NodeType::Person);
		vis.set_query("a");
		vis.clear();
		assert!(ids(&data, &vis).is_empty());
		assert!(rendered_edges(&data.edges, &ids(&data, &vis)).is_empty());
		assert!(!vis.types.contains(&NodeType::Person));
		assert_eq!(vis.query(), "a");
	}

	#[test]
	fn search_prefers_exact_id_over_label() {
		let nodes = vec![
			GraphNode::new("auth-service", "Auth Service", NodeType::Project),
			GraphNode::new("pr-1", "Fix auth", NodeType::PullRequest),
			GraphNode::new("fix", "Something else", NodeType::Ticket),
		];
		assert_eq!(find_search_target(&nodes, "FIX"), Some(SearchHit::Id(2)));
		assert_eq!(find_search_target(&nodes, "auth"), Some(SearchHit::Label(0)));
		assert_eq!(find_search_target(&nodes, "nope"), None);
		assert_eq!(find_search_target(&nodes, "  "), None);
	}

	#[test]
	fn search_matches_labels_like_the_filter() {
		let nodes = vec![GraphNode::new("auth", "Auth Service", NodeType::Project)];
		assert_eq!(find_search_target(&nodes, "service "), None);
		assert_eq!(find_search_target(&nodes, "auth "), None);
		assert_eq!(find_search_target(&nodes, "h s"), Some(SearchHit::Label(0)));

		let mut vis = Visibility::default();
		vis.set_query("h s");
		assert!(vis.matches_query(&nodes[0]));
	}

	fn graph_strategy() -> impl Strategy<Value = GraphData> {
		(1usize..12).prop_flat_map(|n| {
			let edges = proptest::collection::vec((0..n, 0..n, 0.0f64..1.0), 0..24);
			(Just(n), edges).prop_map(|(n, edges)| GraphData {
				nodes: (0..n)
					.map(|i| GraphNode::new(i.to_string(), format!("node {i}"), NodeType::ALL[i % 8]))
					.collect(),
				edges: edges
					.into_iter()
					.map(|(s, t, w)| GraphEdge::new(&s.to_string(), &t.to_string(), "links", w))
					.collect(),
			})
		})
	}

	fn with_subset() -> impl Strategy<Value = (GraphData, Vec<bool>, String)> {
		graph_strategy().prop_flat_map(|g| {
			let n = g.nodes.len();
			(
				Just(g),
				proptest::collection::vec(any::<bool>(), n),
				prop_oneof![Just(String::new()), Just("1".to_owned()), Just("node".to_owned())],
			)
		})
	}

	fn visibility_for(data: &GraphData, mask: &[bool], query: &str) -> Visibility {
		let mut vis = Visibility::default();
		vis.node_ids = data
			.nodes
			.iter()
			.zip(mask)
			.filter(|(_, on)| **on)
			.map(|(n, _)| n.id.clone())
			.collect();
		vis.set_query(query);
		vis
	}

	proptest! {
		#[test]
		fn prop_edges_render_iff_both_endpoints_render((data, mask, query) in with_subset()) {
			let vis = visibility_for(&data, &mask, &query);
			let shown = ids(&data, &vis);
			let edges = rendered_edges(&data.edges, &shown);
			for (i, e) in data.edges.iter().enumerate() {
				let both = shown.contains(e.source.as_str()) && shown.contains(e.target.as_str());
				prop_assert_eq!(edges.contains(&i), both);
			}
		}

		#[test]
		fn prop_expansion_grows_and_stabilizes((data, mask, _q) in with_subset()) {
			let mut vis = visibility_for(&data, &mask, "");
			let mut prev = vis.node_ids.clone();
			// The closure is reached within the node count.
			for _ in 0..=data.nodes.len() {
				vis.expand_neighbors(&data, 1);
				prop_assert!(vis.node_ids.is_superset(&prev));
				prev = vis.node_ids.clone();
			}
			vis.expand_neighbors(&data, 1);
			prop_assert_eq!(&vis.node_ids, &prev);
		}

		#[test]
		fn prop_reveal_then_clear_is_empty((data, mask, query) in with_subset()) {
			let mut vis = visibility_for(&data, &mask, &query);
			vis.reveal_all(&data);
			vis.clear();
			prop_assert!(ids(&data, &vis).is_empty());
		}
	}
}
