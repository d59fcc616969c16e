//! One open graph view: ingestion, aggregation, layout and viewport wired
//! together, plus the snapshot handed to the renderer.
//!
//! Vertices load first, then edges; the layout only starts once both
//! streams are complete. After [`GraphSession::dispose`] every entry point is
//! a no-op, so late chunks or ticks cannot touch the model.

use std::fmt;

use log::{debug, error, info};

use super::aggregate::AggregationController;
use super::config::GraphConfig;
use super::error::{GraphError, Result, StreamError};
use super::ingest::{Endpoint, IngestReport, ingest_records, ingest_segment};
use super::kind::VertexKind;
use super::layout::ForceLayoutEngine;
use super::model::{GraphModel, Point};
use super::record::ElementId;
use super::stream::{RecordStream, StreamDecoder};
use super::viewport::{ViewportState, ViewportTransform};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
	LoadingVertices,
	LoadingEdges,
	Ready,
	Failed,
	Disposed,
}

/// A visible vertex as the renderer needs it.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibleVertex {
	pub id: ElementId,
	/// Icon selection key.
	pub kind: VertexKind,
	pub display_name: String,
	pub position: Point,
	pub screen: Point,
	pub aggregated: bool,
	pub collapsible: bool,
}

/// A drawable edge, endpoints already merge-resolved and projected.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibleEdge {
	pub id: ElementId,
	pub display_name: String,
	pub source: Point,
	pub target: Point,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderFrame {
	pub vertices: Vec<VisibleVertex>,
	pub edges: Vec<VisibleEdge>,
	pub transform: ViewportTransform,
}

pub struct GraphSession {
	model: GraphModel,
	aggregation: AggregationController,
	layout: ForceLayoutEngine,
	viewport: ViewportState,
	decoder: StreamDecoder,
	phase: SessionPhase,
	vertex_report: IngestReport,
	edge_report: IngestReport,
	error: Option<StreamError>,
	dragging: Option<ElementId>,
}

impl fmt::Debug for GraphSession {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("GraphSession")
			.field("phase", &self.phase)
			.field("vertices", &self.model.vertex_count())
			.field("edges", &self.model.edge_count())
			.field("transform", &self.viewport.transform())
			.finish()
	}
}

impl GraphSession {
	pub fn new(config: GraphConfig, width: f64, height: f64) -> Self {
		let center = Point::new(width / 2.0, height / 2.0);
		Self {
			model: GraphModel::new(),
			aggregation: AggregationController::new(config.aggregation),
			layout: ForceLayoutEngine::new(config.layout, center),
			viewport: ViewportState::new(config.viewport, width, height),
			decoder: StreamDecoder::new(),
			phase: SessionPhase::LoadingVertices,
			vertex_report: IngestReport::default(),
			edge_report: IngestReport::default(),
			error: None,
			dragging: None,
		}
	}

	pub fn phase(&self) -> SessionPhase {
		self.phase
	}

	pub fn is_ready(&self) -> bool {
		self.phase == SessionPhase::Ready
	}

	pub fn is_disposed(&self) -> bool {
		self.phase == SessionPhase::Disposed
	}

	pub fn model(&self) -> &GraphModel {
		&self.model
	}

	pub fn layout(&self) -> &ForceLayoutEngine {
		&self.layout
	}

	pub fn viewport(&self) -> &ViewportState {
		&self.viewport
	}

	/// The transport failure that ended loading, if any.
	pub fn error(&self) -> Option<&StreamError> {
		self.error.as_ref()
	}

	pub fn report(&self, endpoint: Endpoint) -> IngestReport {
		match endpoint {
			Endpoint::Vertices => self.vertex_report,
			Endpoint::Edges => self.edge_report,
		}
	}

	/// Endpoint whose stream is expected next, if still loading.
	pub fn loading_endpoint(&self) -> Option<Endpoint> {
		match self.phase {
			SessionPhase::LoadingVertices => Some(Endpoint::Vertices),
			SessionPhase::LoadingEdges => Some(Endpoint::Edges),
			_ => None,
		}
	}

	/// Feed a chunk of the stream currently loading. Returns the number of
	/// records decoded from it.
	pub fn push_chunk(&mut self, chunk: &[u8]) -> usize {
		let Some(endpoint) = self.loading_endpoint() else {
			return 0;
		};
		self.decoder.push(chunk);
		self.drain_decoder(endpoint)
	}

	/// The current stream ended normally.
	pub fn finish_stream(&mut self) {
		let Some(endpoint) = self.loading_endpoint() else {
			return;
		};
		self.decoder.finish();
		self.drain_decoder(endpoint);
		if self.loading_endpoint() == Some(endpoint) {
			let report = self.report(endpoint);
			info!(
				"{} stream complete: {} accepted, {} duplicates, {} rejected",
				endpoint.name(),
				report.accepted,
				report.duplicates,
				report.rejected
			);
			self.complete(endpoint);
		}
	}

	/// The current stream's transport failed.
	pub fn fail_stream(&mut self, error: StreamError) {
		let Some(endpoint) = self.loading_endpoint() else {
			return;
		};
		self.decoder.fail(error);
		self.drain_decoder(endpoint);
	}

	/// Pull a whole stream from a blocking chunk source.
	pub fn load<S, C, E>(&mut self, source: S) -> Result<IngestReport>
	where
		S: IntoIterator<Item = std::result::Result<C, E>>,
		C: AsRef<[u8]>,
		E: fmt::Display,
	{
		let Some(endpoint) = self.loading_endpoint() else {
			return Ok(IngestReport::default());
		};
		let records = RecordStream::new(source.into_iter());
		match ingest_records(&mut self.model, endpoint, records) {
			Ok(report) => {
				*self.report_mut(endpoint) = report;
				self.complete(endpoint);
				Ok(report)
			}
			Err(GraphError::Stream(err)) => {
				self.enter_failed(err.clone());
				Err(GraphError::Stream(err))
			}
			Err(err) => Err(err),
		}
	}

	fn report_mut(&mut self, endpoint: Endpoint) -> &mut IngestReport {
		match endpoint {
			Endpoint::Vertices => &mut self.vertex_report,
			Endpoint::Edges => &mut self.edge_report,
		}
	}

	fn drain_decoder(&mut self, endpoint: Endpoint) -> usize {
		let mut decoded = 0;
		while let Some(record) = self.decoder.next_record() {
			match record {
				Ok(segment) => {
					let outcome = ingest_segment(&mut self.model, endpoint, &segment);
					self.report_mut(endpoint).record(endpoint, outcome);
					decoded += 1;
				}
				Err(err) => {
					self.enter_failed(err);
					break;
				}
			}
		}
		decoded
	}

	fn enter_failed(&mut self, error: StreamError) {
		error!("graph loading stopped: {error}");
		self.decoder.cancel();
		self.error = Some(error);
		self.phase = SessionPhase::Failed;
	}

	fn complete(&mut self, endpoint: Endpoint) {
		match endpoint {
			Endpoint::Vertices => {
				self.decoder = StreamDecoder::new();
				self.phase = SessionPhase::LoadingEdges;
			}
			Endpoint::Edges => {
				self.aggregation.initialize(&mut self.model);
				self.phase = SessionPhase::Ready;
			}
		}
	}

	/// Advance the layout one tick. Only runs once loading completed.
	pub fn tick(&mut self) -> usize {
		if !self.is_ready() {
			return 0;
		}
		self.layout.step(&mut self.model)
	}

	pub fn is_settled(&self) -> bool {
		self.layout.is_settled()
	}

	pub fn toggle(&mut self, id: &ElementId) -> bool {
		if !self.is_ready() || !self.aggregation.toggle(&mut self.model, id) {
			return false;
		}
		self.layout.restart();
		true
	}

	pub fn toggle_all(&mut self, collapsed: bool) -> usize {
		if !self.is_ready() {
			return 0;
		}
		let toggled = self.aggregation.toggle_all(&mut self.model, collapsed);
		if toggled > 0 {
			self.layout.restart();
		}
		toggled
	}

	/// Pin a visible vertex where it is and warm up the simulation.
	pub fn begin_drag(&mut self, id: &ElementId) -> bool {
		if !self.is_ready() {
			return false;
		}
		let Some(position) = self
			.model
			.vertex(id)
			.filter(|vertex| vertex.is_visible())
			.and_then(|vertex| vertex.position())
		else {
			return false;
		};
		self.model.set_fixed_position(id, Some(position));
		self.layout.begin_drag();
		self.dragging = Some(id.clone());
		debug!("drag started on {id}");
		true
	}

	/// Move the dragged vertex by a pointer delta given in screen pixels.
	pub fn drag_by(&mut self, dx: f64, dy: f64) -> bool {
		if !self.is_ready() {
			return false;
		}
		let Some(id) = self.dragging.clone() else {
			return false;
		};
		let k = self.viewport.transform().k;
		let Some(pinned) = self.model.vertex(&id).and_then(|v| v.fixed_position()) else {
			return false;
		};
		let moved = Point::new(pinned.x + dx / k, pinned.y + dy / k);
		self.model.set_fixed_position(&id, Some(moved))
	}

	/// Release the dragged vertex where it was dropped.
	pub fn end_drag(&mut self) {
		let Some(id) = self.dragging.take() else {
			return;
		};
		if self.is_disposed() {
			return;
		}
		self.model.set_fixed_position(&id, None);
		self.layout.end_drag();
		debug!("drag ended on {id}");
	}

	pub fn dragging(&self) -> Option<&ElementId> {
		self.dragging.as_ref()
	}

	pub fn zoom_at(&mut self, focal: Point, scale: f64) -> bool {
		!self.is_disposed() && self.viewport.zoom_at(focal, scale)
	}

	pub fn wheel(&mut self, focal: Point, delta_y: f64) -> bool {
		!self.is_disposed() && self.viewport.wheel(focal, delta_y)
	}

	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		if !self.is_disposed() {
			self.viewport.pan_by(dx, dy);
		}
	}

	/// New canvas size; the layout center follows so the picture stays put.
	pub fn resize(&mut self, width: f64, height: f64) {
		if self.is_disposed() {
			return;
		}
		let (dw, dh) = self.viewport.resize(width, height);
		if dw != 0.0 || dh != 0.0 {
			self.layout.recenter(dw, dh, self.viewport.transform().k);
		}
	}

	/// Topmost visible vertex within `radius` model units of a screen point.
	pub fn vertex_at(&self, screen: Point, radius: f64) -> Option<&ElementId> {
		let target = self.viewport.to_model(screen);
		self.model
			.vertices()
			.iter()
			.rev()
			.filter(|vertex| vertex.is_visible())
			.find(|vertex| {
				vertex
					.position()
					.is_some_and(|position| position.distance(target) < radius)
			})
			.map(|vertex| vertex.id())
	}

	/// Snapshot of everything the renderer draws.
	pub fn frame(&self) -> RenderFrame {
		let transform = self.viewport.transform();
		let vertices = self
			.model
			.vertices()
			.iter()
			.filter(|vertex| vertex.is_visible())
			.filter_map(|vertex| {
				let position = vertex.position()?;
				Some(VisibleVertex {
					id: vertex.id().clone(),
					kind: vertex.kind(),
					display_name: vertex.display_name().to_string(),
					position,
					screen: transform.to_screen(position),
					aggregated: vertex.aggregated(),
					collapsible: vertex.collapsible(),
				})
			})
			.collect();
		let edges = self
			.model
			.edges()
			.iter()
			.filter(|edge| !edge.is_degenerate())
			.filter_map(|edge| {
				let (source, target) = edge.endpoints();
				let source = self
					.model
					.vertex_at(self.model.resolved_index(source))
					.position()?;
				let target = self
					.model
					.vertex_at(self.model.resolved_index(target))
					.position()?;
				Some(VisibleEdge {
					id: edge.id().clone(),
					display_name: edge.display_name().to_string(),
					source: transform.to_screen(source),
					target: transform.to_screen(target),
				})
			})
			.collect();
		RenderFrame {
			vertices,
			edges,
			transform,
		}
	}

	/// Stop everything: pending decoding is dropped and later calls do nothing.
	pub fn dispose(&mut self) {
		if self.is_disposed() {
			return;
		}
		self.decoder.cancel();
		self.dragging = None;
		self.phase = SessionPhase::Disposed;
		info!("graph session disposed");
	}
}
