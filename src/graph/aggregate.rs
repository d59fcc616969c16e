//! Collapse/expand of vertex clusters.
//!
//! A collapsed host hides its eligible neighbors by pointing their
//! `merged_to` at itself. Merges never chain: a vertex that currently hides
//! others is never hidden itself.

use log::{debug, warn};

use super::config::AggregationConfig;
use super::model::GraphModel;
use super::record::ElementId;

#[derive(Clone, Debug, Default)]
pub struct AggregationController {
	config: AggregationConfig,
}

impl AggregationController {
	pub fn new(config: AggregationConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &AggregationConfig {
		&self.config
	}

	/// Bring a freshly ingested model into its initial aggregation state.
	pub fn initialize(&self, model: &mut GraphModel) {
		if self.config.start_collapsed {
			let toggled = self.toggle_all(model, true);
			debug!("collapsed {toggled} vertices on start");
		} else {
			mark_degenerate_edges(model);
		}
	}

	/// Collapse a visible collapsible vertex, or expand it if collapsed.
	///
	/// Anything else (unknown id, non-collapsible kind, hidden vertex) is a
	/// no-op and returns `false`.
	pub fn toggle(&self, model: &mut GraphModel, id: &ElementId) -> bool {
		match model.index_of(id) {
			Some(index) => self.toggle_index(model, index),
			None => false,
		}
	}

	/// Drive every collapsible vertex towards `collapsed`. Returns how many
	/// vertices actually changed state.
	pub fn toggle_all(&self, model: &mut GraphModel, collapsed: bool) -> usize {
		let mut toggled = 0;
		for index in 0..model.vertex_count() {
			let vertex = model.vertex_at(index);
			if vertex.collapsible() && vertex.aggregated() != collapsed && self.toggle_index(model, index) {
				toggled += 1;
			}
		}
		toggled
	}

	fn toggle_index(&self, model: &mut GraphModel, index: usize) -> bool {
		let host = model.vertex_at(index);
		if !host.collapsible() || !host.is_visible() {
			return false;
		}
		let host_id = host.id().clone();
		let host_kind = host.kind();
		let collapsing = !host.aggregated();
		model.vertex_at_mut(index).aggregated = collapsing;

		if collapsing {
			let mut merged = 0;
			for neighbor in model.neighbor_indices(index) {
				if neighbor == index {
					continue;
				}
				let candidate = model.vertex_at(neighbor);
				if !candidate.is_visible() || !self.config.is_eligible(host_kind, candidate.kind()) {
					continue;
				}
				if hosts_merged_vertices(model, neighbor) {
					warn!(
						"not merging {} into {host_id}: it already hides vertices (nested aggregation)",
						candidate.id()
					);
					continue;
				}
				model.vertex_at_mut(neighbor).merged_to = Some(host_id.clone());
				merged += 1;
			}
			debug!("collapsed {host_id}, hiding {merged} neighbors");
		} else {
			let mut released = 0;
			for other in 0..model.vertex_count() {
				let vertex = model.vertex_at_mut(other);
				if vertex.merged_to.as_ref() == Some(&host_id) {
					vertex.merged_to = None;
					released += 1;
				}
			}
			debug!("expanded {host_id}, showing {released} vertices");
		}

		mark_degenerate_edges(model);
		true
	}
}

/// Merged vertices are always neighbors of their host.
fn hosts_merged_vertices(model: &GraphModel, index: usize) -> bool {
	let id = model.vertex_at(index).id();
	model
		.neighbor_indices(index)
		.into_iter()
		.any(|n| model.vertex_at(n).merged_to() == Some(id))
}

/// Flag every edge whose two ends currently resolve to the same visible
/// vertex. Returns the number of flagged edges.
pub fn mark_degenerate_edges(model: &mut GraphModel) -> usize {
	let flags: Vec<bool> = model
		.edges()
		.iter()
		.map(|edge| {
			let (source, target) = edge.endpoints();
			model.resolved_index(source) == model.resolved_index(target)
		})
		.collect();
	let mut flagged = 0;
	for (edge, degenerate) in model.edges_mut().iter_mut().zip(flags) {
		edge.degenerate = degenerate;
		flagged += usize::from(degenerate);
	}
	flagged
}

/// Vertices whose host is itself hidden. Always empty for models only
/// mutated through [`AggregationController`].
pub fn merge_chains(model: &GraphModel) -> Vec<ElementId> {
	model
		.vertices()
		.iter()
		.filter(|vertex| {
			vertex
				.merged_to()
				.and_then(|host| model.vertex(host))
				.is_some_and(|host| host.merged_to().is_some())
		})
		.map(|vertex| vertex.id().clone())
		.collect()
}
