use thiserror::Error;

/// Failures while loading the embedded graph description.
#[derive(Debug, Error)]
pub enum GraphError {
	#[error("graph description is not valid JSON: {0}")]
	Parse(#[from] serde_json::Error),

	#[error("node `{id}` has unknown type `{kind}` (expected Topic or Agent)")]
	UnknownNodeType { id: String, kind: String },

	#[error("node id `{0}` appears more than once")]
	DuplicateNodeId(String),

	#[error("edge `{from}` -> `{to}` references an unknown node")]
	DanglingEdge { from: String, to: String },

	#[error("graph description element `#{0}` not found")]
	MissingData(String),
}
