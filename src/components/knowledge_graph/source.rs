use log::debug;

use super::config::API_ENV;
use super::error::{GraphError, Result};
use super::fixtures;
use super::types::GraphData;

/// Where graph snapshots come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphSource {
	/// The built-in developer-knowledge dataset.
	Mock,
	/// `GET {base_url}/graph[?root=<id>]` returning a JSON snapshot.
	Http { base_url: String },
}

impl GraphSource {
	/// HTTP when `KNOWLEDGE_GRAPH_API` was set at build time, mock otherwise.
	pub fn from_env() -> Self {
		match API_ENV {
			Some(base) if !base.trim().is_empty() => GraphSource::Http {
				base_url: base.trim().to_owned(),
			},
			_ => GraphSource::Mock,
		}
	}

	pub async fn get_graph(&self, root_id: Option<&str>) -> Result<GraphData> {
		match self {
			GraphSource::Mock => Ok(fixtures::developer_graph()),
			GraphSource::Http { base_url } => fetch_graph(base_url, root_id).await,
		}
	}
}

pub fn graph_url(base_url: &str) -> String {
	format!("{}/graph", base_url.trim_end_matches('/'))
}

async fn fetch_graph(base_url: &str, root_id: Option<&str>) -> Result<GraphData> {
	let url = graph_url(base_url);
	debug!("GET {url} (root: {root_id:?})");

	let mut request = reqwest::Client::new().get(&url);
	if let Some(root) = root_id {
		request = request.query(&[("root", root)]);
	}
	let response = request.send().await?;

	let status = response.status();
	if !status.is_success() {
		return Err(GraphError::Status(status.as_u16()));
	}
	let body = response.text().await?;
	Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn graph_url_tolerates_trailing_slashes() {
		assert_eq!(graph_url("https://kg.local/api"), "https://kg.local/api/graph");
		assert_eq!(graph_url("https://kg.local/api//"), "https://kg.local/api/graph");
	}

	#[test]
	fn bad_payloads_surface_as_decode_errors() {
		let err: GraphError = serde_json::from_str::<GraphData>("{\"nodes\": 3}")
			.map_err(GraphError::from)
			.unwrap_err();
		assert!(matches!(err, GraphError::Decode(_)));
	}
}
