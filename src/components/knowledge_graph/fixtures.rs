//! Sample engineering-org graph served by the mock source.

use super::types::{GraphData, GraphEdge, GraphNode, MetaValue, NodeType};

fn list(items: &[&str]) -> MetaValue {
	MetaValue::List(items.iter().map(|s| MetaValue::from(*s)).collect())
}

fn person(id: &str, name: &str, role: &str, team: &str, expertise: &[&str]) -> GraphNode {
	GraphNode::new(id, name, NodeType::Person)
		.with_meta("role", role)
		.with_meta("team", team)
		.with_meta("expertise", list(expertise))
}

fn project(id: &str, name: &str, repo: &str, status: &str, language: &str) -> GraphNode {
	GraphNode::new(id, name, NodeType::Project)
		.with_meta("repository", repo)
		.with_meta("status", status)
		.with_meta("language", language)
}

pub fn developer_graph() -> GraphData {
	let nodes = vec![
		person(
			"john-doe",
			"John Doe",
			"Senior Backend Developer",
			"Backend",
			&["Node.js", "Redis", "PostgreSQL", "Microservices"],
		),
		person(
			"sarah-backend",
			"Sarah Chen",
			"Backend Developer",
			"Backend",
			&["Python", "Django", "Docker", "AWS"],
		),
		person(
			"emma-frontend",
			"Emma Davis",
			"Frontend Lead",
			"Frontend",
			&["React", "TypeScript", "GraphQL", "Next.js"],
		),
		person(
			"mike-devops",
			"Mike Wilson",
			"DevOps Engineer",
			"Infrastructure",
			&["Kubernetes", "CI/CD", "AWS", "Terraform"],
		),
		project("auth-service", "Auth Service", "backend/auth-service", "Active", "Node.js")
			.with_meta("lastDeploy", "2024-01-15"),
		project("mobile-app", "Mobile App", "mobile/react-native-app", "In Development", "React Native")
			.with_meta("lastDeploy", "2024-01-10"),
		project("graphql-api", "GraphQL API", "backend/graphql-gateway", "Planning", "Node.js")
			.with_meta("estimatedStart", "2024-02-01"),
		GraphNode::new("redis-integration", "Redis Caching", NodeType::Decision)
			.with_meta("date", "2024-01-15")
			.with_meta("impact", "High")
			.with_meta("performance", "+70% faster auth"),
		GraphNode::new("oauth-implementation", "OAuth 2.0 Implementation", NodeType::Decision)
			.with_meta("date", "2024-01-10")
			.with_meta("impact", "High")
			.with_meta("security", "Enhanced mobile security"),
		GraphNode::new("ci-pipeline", "CI/CD Pipeline", NodeType::Document)
			.with_meta("lastUpdated", "2024-01-08")
			.with_meta("author", "mike-devops")
			.with_meta("buildTime", "3.2 minutes"),
		GraphNode::new("JIRA-123", "JIRA-123", NodeType::Ticket)
			.with_meta("summary", "Fix auth session bug")
			.with_meta("status", "Done"),
		GraphNode::new("PR-456", "PR #456", NodeType::PullRequest)
			.with_meta("title", "Fix session cache race")
			.with_meta("author", "john-doe"),
		GraphNode::new("SLACK-auth-thread", "Slack: auth-api discussion", NodeType::ChatThread)
			.with_meta("channel", "#backend")
			.with_meta("topic", "auth-api race condition")
			.with_meta("messages", 23.0),
		GraphNode::new("file-auth-session.ts", "auth/session.ts", NodeType::File)
			.with_meta("path", "backend/auth/session.ts")
			.with_meta("owners", list(&["john-doe", "sarah-backend"]))
			.with_meta("loc", 240.0),
	];

	let edges = [
		("john-doe", "auth-service", "maintains", 0.9),
		("john-doe", "redis-integration", "implemented", 0.9),
		("sarah-backend", "auth-service", "contributes", 0.7),
		("emma-frontend", "graphql-api", "leads", 0.8),
		("mike-devops", "ci-pipeline", "maintains", 0.9),
		("auth-service", "mobile-app", "authenticates", 0.8),
		("redis-integration", "auth-service", "optimizes", 0.9),
		("oauth-implementation", "mobile-app", "secures", 0.8),
		("graphql-api", "mobile-app", "serves", 0.7),
		("ci-pipeline", "auth-service", "deploys", 0.8),
		("ci-pipeline", "mobile-app", "builds", 0.7),
		("emma-frontend", "oauth-implementation", "reviewed", 0.6),
		("JIRA-123", "SLACK-auth-thread", "discusses", 0.8),
		("SLACK-auth-thread", "PR-456", "led to", 0.9),
		("PR-456", "file-auth-session.ts", "modifies", 0.9),
		("file-auth-session.ts", "auth-service", "belongs to", 0.7),
		("PR-456", "john-doe", "authored by", 0.9),
	]
	.into_iter()
	.map(|(s, t, rel, w)| GraphEdge::new(s, t, rel, w))
	.collect();

	GraphData { nodes, edges }
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;

	#[test]
	fn dataset_is_self_consistent() {
		let g = developer_graph();
		assert_eq!(g.nodes.len(), 14);
		assert_eq!(g.edges.len(), 17);
		assert_eq!(g.dangling_edges(), 0);
		let ids: HashSet<&str> = g.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids.len(), g.nodes.len());
		assert!(g.edges.iter().all(|e| (0.0..=1.0).contains(&e.strength)));
	}

	#[test]
	fn every_node_type_is_represented() {
		let g = developer_graph();
		let kinds: HashSet<NodeType> = g.nodes.iter().map(|n| n.kind).collect();
		assert_eq!(kinds.len(), NodeType::ALL.len());
	}

	#[test]
	fn metadata_keeps_insertion_order() {
		let g = developer_graph();
		let john = g.node("john-doe").unwrap();
		let keys: Vec<&str> = john.metadata.keys().map(String::as_str).collect();
		assert_eq!(keys, ["role", "team", "expertise"]);
		assert_eq!(john.metadata["expertise"].to_string(), "Node.js, Redis, PostgreSQL, Microservices");
	}
}
