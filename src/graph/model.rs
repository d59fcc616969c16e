//! In-memory vertex/edge store with incidence bookkeeping.

use std::collections::HashMap;

use log::debug;

use super::error::{GraphError, Result};
use super::kind::VertexKind;
use super::record::{EdgeProperty, EdgeRecord, ElementId, PropertyRecord, VertexRecord, value_text};

/// Property keys that name a vertex, in priority order.
pub const DISPLAY_NAME_KEYS: &[&str] = &[
	"resource:bucket_name",
	"resource:file_name",
	"deployer:context_spec_image",
	"project:project_name",
];

const CONTEXT_ID_KEY: &str = "deployer:context_id";
const EXECUTION_ID_KEY: &str = "deployer:execution_id";
const LAUNCH_LABEL: &str = "launch";

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
	}
}

#[derive(Clone, Debug)]
pub struct Vertex {
	id: ElementId,
	kind: VertexKind,
	type_tags: Vec<String>,
	properties: Vec<PropertyRecord>,
	display_name: String,
	detail_url: Option<String>,
	collapsible: bool,
	pub(crate) aggregated: bool,
	pub(crate) merged_to: Option<ElementId>,
	pub(crate) position: Option<Point>,
	pub(crate) fixed_position: Option<Point>,
	incident_out: Vec<ElementId>,
	incident_in: Vec<ElementId>,
}

impl Vertex {
	fn from_record(record: VertexRecord) -> Result<Self> {
		let Some(primary) = record.types.first() else {
			return Err(GraphError::InvalidRecord {
				id: record.id,
				reason: "vertex has no type tags",
			});
		};
		let kind = VertexKind::from_tag(primary);

		let mut properties: Vec<PropertyRecord> = Vec::with_capacity(record.properties.len());
		for property in record.properties {
			if properties.iter().all(|p| p.key != property.key) {
				properties.push(property);
			}
		}

		let mut vertex = Self {
			display_name: String::new(),
			detail_url: None,
			collapsible: kind.is_collapsible(),
			kind,
			type_tags: record.types,
			properties,
			id: record.id,
			aggregated: false,
			merged_to: None,
			position: None,
			fixed_position: None,
			incident_out: Vec::new(),
			incident_in: Vec::new(),
		};
		vertex.display_name = vertex.derive_display_name();
		vertex.detail_url = match kind {
			VertexKind::Context => vertex
				.property_text(CONTEXT_ID_KEY)
				.map(|context| format!("deploy/context/{context}")),
			VertexKind::Bucket => Some(format!("storage/{}", vertex.id)),
			_ => None,
		};
		Ok(vertex)
	}

	fn derive_display_name(&self) -> String {
		DISPLAY_NAME_KEYS
			.iter()
			.find_map(|key| self.property_text(key))
			.unwrap_or_else(|| format!("id={}", self.id))
	}

	pub fn id(&self) -> &ElementId {
		&self.id
	}

	/// Kind derived from the primary (first) type tag.
	pub fn kind(&self) -> VertexKind {
		self.kind
	}

	pub fn type_tags(&self) -> &[String] {
		&self.type_tags
	}

	pub fn display_name(&self) -> &str {
		&self.display_name
	}

	/// Route to the resource's detail page, when the view knows one.
	pub fn detail_url(&self) -> Option<&str> {
		self.detail_url.as_deref()
	}

	pub fn collapsible(&self) -> bool {
		self.collapsible
	}

	pub fn aggregated(&self) -> bool {
		self.aggregated
	}

	/// Host this vertex is hidden behind.
	pub fn merged_to(&self) -> Option<&ElementId> {
		self.merged_to.as_ref()
	}

	pub fn is_visible(&self) -> bool {
		self.merged_to.is_none()
	}

	pub fn position(&self) -> Option<Point> {
		self.position
	}

	pub fn fixed_position(&self) -> Option<Point> {
		self.fixed_position
	}

	pub fn incident_out(&self) -> &[ElementId] {
		&self.incident_out
	}

	pub fn incident_in(&self) -> &[ElementId] {
		&self.incident_in
	}

	/// First value of a property, as shown to users.
	pub fn property_text(&self, key: &str) -> Option<String> {
		self.properties
			.iter()
			.find(|p| p.key == key)
			.and_then(|p| p.values.first())
			.map(|v| value_text(&v.value))
	}

	/// Rows for a hover tooltip: id, types, then every property value.
	pub fn describe(&self) -> Vec<(String, String)> {
		let mut rows = vec![
			("id".to_string(), self.id.to_string()),
			("types".to_string(), self.type_tags.join(" ")),
		];
		for property in &self.properties {
			for value in &property.values {
				let key = value.key.clone().unwrap_or_else(|| property.key.clone());
				rows.push((key, value_text(&value.value)));
			}
		}
		rows
	}
}

#[derive(Clone, Debug)]
pub struct Edge {
	id: ElementId,
	label: String,
	display_name: String,
	source: ElementId,
	target: ElementId,
	source_index: usize,
	target_index: usize,
	properties: Vec<EdgeProperty>,
	pub(crate) degenerate: bool,
}

impl Edge {
	pub fn id(&self) -> &ElementId {
		&self.id
	}

	pub fn label(&self) -> &str {
		&self.label
	}

	/// Label without its namespace prefix (`deployer:launch` shows as `launch`).
	pub fn display_name(&self) -> &str {
		&self.display_name
	}

	pub fn source_id(&self) -> &ElementId {
		&self.source
	}

	pub fn target_id(&self) -> &ElementId {
		&self.target
	}

	pub(crate) fn endpoints(&self) -> (usize, usize) {
		(self.source_index, self.target_index)
	}

	/// Both ends currently resolve to the same visible vertex.
	pub fn is_degenerate(&self) -> bool {
		self.degenerate
	}

	pub fn describe(&self) -> Vec<(String, String)> {
		let mut rows = vec![
			("id".to_string(), self.id.to_string()),
			("label".to_string(), self.label.clone()),
		];
		rows.extend(
			self.properties
				.iter()
				.map(|p| (p.key.clone(), value_text(&p.value))),
		);
		rows
	}
}

fn strip_namespace(label: &str) -> &str {
	label.split_once(':').map_or(label, |(_, name)| name)
}

/// Vertices and edges of one loaded graph, in insertion order.
///
/// Elements are never removed; a new graph means a new model.
#[derive(Clone, Debug, Default)]
pub struct GraphModel {
	vertices: Vec<Vertex>,
	vertex_index: HashMap<ElementId, usize>,
	edges: Vec<Edge>,
	edge_index: HashMap<ElementId, usize>,
}

impl GraphModel {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a vertex unless its id is already taken.
	///
	/// Returns `Ok(false)` for a duplicate; the first occurrence wins.
	pub fn add_vertex(&mut self, record: VertexRecord) -> Result<bool> {
		if self.vertex_index.contains_key(&record.id) {
			return Ok(false);
		}
		let vertex = Vertex::from_record(record)?;
		self.vertex_index
			.insert(vertex.id.clone(), self.vertices.len());
		self.vertices.push(vertex);
		Ok(true)
	}

	/// Insert an edge unless its id is already taken.
	///
	/// Both endpoints must already exist; otherwise the edge is rejected with
	/// [`GraphError::DanglingEdge`] and the model is left untouched.
	pub fn add_edge(&mut self, record: EdgeRecord) -> Result<bool> {
		if self.edge_index.contains_key(&record.id) {
			return Ok(false);
		}
		let Some(&source_index) = self.vertex_index.get(&record.from) else {
			return Err(GraphError::DanglingEdge {
				edge: record.id,
				missing: record.from,
			});
		};
		let Some(&target_index) = self.vertex_index.get(&record.to) else {
			return Err(GraphError::DanglingEdge {
				edge: record.id,
				missing: record.to,
			});
		};

		let edge = Edge {
			display_name: strip_namespace(&record.label).to_string(),
			label: record.label,
			id: record.id,
			source: record.from,
			target: record.to,
			source_index,
			target_index,
			properties: record.properties,
			degenerate: false,
		};
		self.vertices[source_index]
			.incident_out
			.push(edge.id.clone());
		self.vertices[target_index]
			.incident_in
			.push(edge.id.clone());
		self.edge_index.insert(edge.id.clone(), self.edges.len());
		let is_launch = edge.display_name == LAUNCH_LABEL;
		self.edges.push(edge);

		if is_launch {
			self.link_launched_execution(source_index, target_index);
		}
		Ok(true)
	}

	/// A context launching an execution gives the execution a route under
	/// the context.
	fn link_launched_execution(&mut self, source: usize, target: usize) {
		let (context, execution) = (&self.vertices[source], &self.vertices[target]);
		if context.kind != VertexKind::Context || execution.kind != VertexKind::Execution {
			return;
		}
		let (Some(context_id), Some(execution_id)) = (
			context.property_text(CONTEXT_ID_KEY),
			execution.property_text(EXECUTION_ID_KEY),
		) else {
			return;
		};
		debug!("execution {} launched by context {}", execution.id, context.id);
		self.vertices[target].detail_url = Some(format!(
			"deploy/context/{context_id}/execution/{execution_id}"
		));
	}

	pub fn vertices(&self) -> &[Vertex] {
		&self.vertices
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	pub fn vertex_count(&self) -> usize {
		self.vertices.len()
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	pub fn is_empty(&self) -> bool {
		self.vertices.is_empty()
	}

	pub fn index_of(&self, id: &ElementId) -> Option<usize> {
		self.vertex_index.get(id).copied()
	}

	pub fn vertex(&self, id: &ElementId) -> Option<&Vertex> {
		self.index_of(id).map(|idx| &self.vertices[idx])
	}

	pub fn edge(&self, id: &ElementId) -> Option<&Edge> {
		self.edge_index.get(id).map(|&idx| &self.edges[idx])
	}

	pub(crate) fn vertex_at(&self, index: usize) -> &Vertex {
		&self.vertices[index]
	}

	pub(crate) fn vertex_at_mut(&mut self, index: usize) -> &mut Vertex {
		&mut self.vertices[index]
	}

	pub(crate) fn edges_mut(&mut self) -> &mut [Edge] {
		&mut self.edges
	}

	/// Indices of the vertices one edge away, in incidence order.
	pub(crate) fn neighbor_indices(&self, index: usize) -> Vec<usize> {
		let vertex = &self.vertices[index];
		vertex
			.incident_out
			.iter()
			.chain(vertex.incident_in.iter())
			.filter_map(|edge_id| self.edge_index.get(edge_id))
			.map(|&edge_idx| {
				let (source, target) = self.edges[edge_idx].endpoints();
				if source == index { target } else { source }
			})
			.collect()
	}

	/// Index of the vertex standing in for `index` on screen.
	pub(crate) fn resolved_index(&self, index: usize) -> usize {
		match &self.vertices[index].merged_to {
			Some(host) => self.index_of(host).unwrap_or(index),
			None => index,
		}
	}

	/// Id of the vertex standing in for `id` on screen.
	pub fn resolve(&self, id: &ElementId) -> Option<&ElementId> {
		self.index_of(id)
			.map(|idx| &self.vertices[self.resolved_index(idx)].id)
	}

	/// Pin a vertex while it is dragged, or release it with `None`.
	///
	/// Releasing keeps the last position as the new starting point.
	pub fn set_fixed_position(&mut self, id: &ElementId, fixed: Option<Point>) -> bool {
		let Some(idx) = self.index_of(id) else {
			return false;
		};
		let vertex = &mut self.vertices[idx];
		if let Some(point) = fixed {
			vertex.position = Some(point);
		}
		vertex.fixed_position = fixed;
		true
	}
}
