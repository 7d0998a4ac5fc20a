use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		(self.x - other.x).hypot(self.y - other.y)
	}
}

/// Entity kinds carried by the knowledge feed.
///
/// The feed predates the current names, so `jira`, `pr` and `slack` are still
/// accepted on input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
	Person,
	Project,
	Document,
	Decision,
	#[serde(alias = "jira")]
	Ticket,
	#[serde(alias = "pr")]
	PullRequest,
	#[serde(alias = "slack")]
	ChatThread,
	File,
}

impl NodeType {
	pub const ALL: [NodeType; 8] = [
		NodeType::Person,
		NodeType::Project,
		NodeType::Document,
		NodeType::Decision,
		NodeType::Ticket,
		NodeType::PullRequest,
		NodeType::ChatThread,
		NodeType::File,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			NodeType::Person => "person",
			NodeType::Project => "project",
			NodeType::Document => "document",
			NodeType::Decision => "decision",
			NodeType::Ticket => "ticket",
			NodeType::PullRequest => "pull_request",
			NodeType::ChatThread => "chat_thread",
			NodeType::File => "file",
		}
	}
}

impl fmt::Display for NodeType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Scalar metadata attached to a node, enough for display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
	Flag(bool),
	Number(f64),
	Text(String),
	List(Vec<MetaValue>),
}

impl fmt::Display for MetaValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			MetaValue::Flag(b) => write!(f, "{b}"),
			MetaValue::Number(n) => write!(f, "{n}"),
			MetaValue::Text(s) => f.write_str(s),
			MetaValue::List(items) => {
				for (i, item) in items.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{item}")?;
				}
				Ok(())
			}
		}
	}
}

impl From<&str> for MetaValue {
	fn from(s: &str) -> Self {
		MetaValue::Text(s.to_owned())
	}
}

impl From<f64> for MetaValue {
	fn from(n: f64) -> Self {
		MetaValue::Number(n)
	}
}

impl From<bool> for MetaValue {
	fn from(b: bool) -> Self {
		MetaValue::Flag(b)
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	pub id: String,
	pub label: String,
	#[serde(rename = "type")]
	pub kind: NodeType,
	#[serde(default)]
	pub metadata: IndexMap<String, MetaValue>,
}

impl GraphNode {
	pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeType) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			kind,
			metadata: IndexMap::new(),
		}
	}

	pub fn with_meta(mut self, key: &str, value: impl Into<MetaValue>) -> Self {
		self.metadata.insert(key.to_owned(), value.into());
		self
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
	pub source: String,
	pub target: String,
	pub relationship: String,
	pub strength: f64,
}

impl GraphEdge {
	pub fn new(source: &str, target: &str, relationship: &str, strength: f64) -> Self {
		Self {
			source: source.to_owned(),
			target: target.to_owned(),
			relationship: relationship.to_owned(),
			strength,
		}
	}

	/// The other endpoint when `id` is one of them.
	pub fn other_end(&self, id: &str) -> Option<&str> {
		if self.source == id {
			Some(&self.target)
		} else if self.target == id {
			Some(&self.source)
		} else {
			None
		}
	}
}

/// A provider snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
}

impl GraphData {
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Edges with an endpoint that is not in the node list.
	pub fn dangling_edges(&self) -> usize {
		self.edges
			.iter()
			.filter(|e| self.node(&e.source).is_none() || self.node(&e.target).is_none())
			.count()
	}
}
