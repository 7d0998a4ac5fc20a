use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
	#[error("graph request failed: {0}")]
	Request(#[from] reqwest::Error),
	#[error("graph service answered {0}")]
	Status(u16),
	#[error("graph payload could not be decoded: {0}")]
	Decode(#[from] serde_json::Error),
	#[error("canvas unavailable: {0}")]
	Canvas(String),
}

pub type Result<T, E = GraphError> = std::result::Result<T, E>;
