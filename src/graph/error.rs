//! Error types for graph ingestion.

use std::fmt;

use super::record::ElementId;

/// Result alias used throughout the graph core.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Failure of the underlying byte stream.
///
/// The decoder stops at the first transport failure; retrying means starting
/// the whole pipeline again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamError {
	message: String,
}

impl StreamError {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}

	/// Wrap any transport error that can describe itself.
	pub fn transport(err: impl fmt::Display) -> Self {
		Self::new(err.to_string())
	}

	pub fn message(&self) -> &str {
		&self.message
	}
}

impl fmt::Display for StreamError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "stream failed: {}", self.message)
	}
}

impl std::error::Error for StreamError {}

/// Errors raised while turning decoded records into graph elements.
///
/// Everything except [`GraphError::Stream`] concerns a single record; the
/// ingestion loop logs those and moves on to the next record.
#[derive(Debug)]
pub enum GraphError {
	/// An edge names a vertex that was never ingested.
	DanglingEdge { edge: ElementId, missing: ElementId },
	/// A segment that does not parse as the expected record.
	MalformedRecord { source: serde_json::Error },
	/// A record that parsed but violates a model rule.
	InvalidRecord { id: ElementId, reason: &'static str },
	/// The transport failed; ingestion ends here.
	Stream(StreamError),
}

impl GraphError {
	/// Whether ingestion may continue with the next record after this error.
	pub fn is_record_level(&self) -> bool {
		!matches!(self, GraphError::Stream(_))
	}
}

impl fmt::Display for GraphError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			GraphError::DanglingEdge { edge, missing } => {
				write!(f, "edge {edge} references missing vertex {missing}")
			}
			GraphError::MalformedRecord { source } => write!(f, "malformed record: {source}"),
			GraphError::InvalidRecord { id, reason } => {
				write!(f, "invalid record {id}: {reason}")
			}
			GraphError::Stream(err) => err.fmt(f),
		}
	}
}

impl std::error::Error for GraphError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			GraphError::MalformedRecord { source } => Some(source),
			GraphError::Stream(err) => Some(err),
			_ => None,
		}
	}
}

impl From<StreamError> for GraphError {
	fn from(value: StreamError) -> Self {
		GraphError::Stream(value)
	}
}

impl From<serde_json::Error> for GraphError {
	fn from(value: serde_json::Error) -> Self {
		GraphError::MalformedRecord { source: value }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn stream_errors_end_ingestion() {
		let err = GraphError::from(StreamError::new("connection reset"));
		assert!(!err.is_record_level());
		assert_eq!(err.to_string(), "stream failed: connection reset");
	}

	#[test]
	fn dangling_edge_names_both_ids() {
		let err = GraphError::DanglingEdge {
			edge: ElementId::Num(7),
			missing: ElementId::Text("v9".into()),
		};
		assert!(err.is_record_level());
		assert_eq!(err.to_string(), "edge 7 references missing vertex v9");
	}
}
