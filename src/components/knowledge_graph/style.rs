use super::types::NodeType;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeStyle {
	pub fill: &'static str,
	pub stroke: &'static str,
	pub icon: &'static str,
	pub legend: &'static str,
}

pub fn node_style(kind: NodeType) -> NodeStyle {
	let (fill, stroke, icon, legend) = match kind {
		NodeType::Person => ("#3B82F6", "#1D4ED8", "👤", "People"),
		NodeType::Project => ("#22C55E", "#15803D", "⎇", "Projects"),
		NodeType::Document => ("#A855F7", "#7E22CE", "📄", "Documents"),
		NodeType::Decision => ("#F59E0B", "#B45309", "💡", "Decisions"),
		NodeType::Ticket => ("#2563EB", "#1E3A8A", "#", "Tickets"),
		NodeType::PullRequest => ("#10B981", "#047857", "⇄", "Pull Requests"),
		NodeType::ChatThread => ("#A21CAF", "#701A75", "💬", "Chat Threads"),
		NodeType::File => ("#6B7280", "#374151", "🗎", "Code Files"),
	};
	NodeStyle {
		fill,
		stroke,
		icon,
		legend,
	}
}

pub const BACKGROUND: &str = "#0f172a";
pub const CANVAS_BACKDROP: &str = "#131c31";
pub const GRID_DOT: &str = "rgba(148, 163, 184, 0.12)";
pub const EDGE_RGB: (u8, u8, u8) = (148, 163, 184);
pub const EDGE_HOVER_RGB: (u8, u8, u8) = (125, 211, 252);
pub const LABEL_BOX_FILL: &str = "rgba(15, 23, 42, 0.9)";
pub const LABEL_BOX_STROKE: &str = "rgba(148, 163, 184, 0.5)";
pub const LABEL_TEXT: &str = "#e2e8f0";

pub fn rgba((r, g, b): (u8, u8, u8), alpha: f64) -> String {
	format!("rgba({r}, {g}, {b}, {alpha:.3})")
}
