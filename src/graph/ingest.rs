//! Turning decoded segments into model elements.

use log::{info, warn};

use super::error::{GraphError, Result, StreamError};
use super::model::GraphModel;

/// Which navigation endpoint a stream comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
	Vertices,
	Edges,
}

impl Endpoint {
	pub fn name(self) -> &'static str {
		match self {
			Endpoint::Vertices => "vertex",
			Endpoint::Edges => "edge",
		}
	}
}

/// Per-endpoint outcome counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
	pub accepted: usize,
	pub duplicates: usize,
	pub rejected: usize,
}

impl IngestReport {
	/// Count one segment's outcome, logging rejected records.
	pub fn record(&mut self, endpoint: Endpoint, outcome: Result<Option<bool>>) {
		match outcome {
			Ok(Some(true)) => self.accepted += 1,
			Ok(Some(false)) => self.duplicates += 1,
			Ok(None) => {}
			Err(err) => {
				warn!("rejected {} record: {err}", endpoint.name());
				self.rejected += 1;
			}
		}
	}
}

/// Parse one segment and add it to the model.
///
/// Blank segments yield `Ok(None)`; otherwise the result tells whether the
/// element was new (`true`) or a duplicate id (`false`).
pub fn ingest_segment(model: &mut GraphModel, endpoint: Endpoint, segment: &str) -> Result<Option<bool>> {
	let text = segment.trim();
	if text.is_empty() {
		return Ok(None);
	}
	let added = match endpoint {
		Endpoint::Vertices => model.add_vertex(serde_json::from_str(text)?)?,
		Endpoint::Edges => model.add_edge(serde_json::from_str(text)?)?,
	};
	Ok(Some(added))
}

/// Ingest a whole record sequence. Bad records are skipped; a stream error
/// stops ingestion with [`GraphError::Stream`] and leaves the model with
/// whatever arrived before it.
pub fn ingest_records<I>(model: &mut GraphModel, endpoint: Endpoint, records: I) -> Result<IngestReport>
where
	I: IntoIterator<Item = std::result::Result<String, StreamError>>,
{
	let mut report = IngestReport::default();
	for record in records {
		let outcome = record
			.map_err(GraphError::from)
			.and_then(|segment| ingest_segment(model, endpoint, &segment));
		match outcome {
			Err(err) if !err.is_record_level() => return Err(err),
			outcome => report.record(endpoint, outcome),
		}
	}
	info!(
		"{} stream complete: {} accepted, {} duplicates, {} rejected",
		endpoint.name(),
		report.accepted,
		report.duplicates,
		report.rejected
	);
	Ok(report)
}
