//! Tunables for one open graph view.
//!
//! Every field has a default, so a partial JSON object is a valid config.

use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Serialize};

use super::kind::VertexKind;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	pub aggregation: AggregationConfig,
	pub layout: LayoutConfig,
	pub viewport: ViewportConfig,
}

impl GraphConfig {
	pub fn from_json(text: &str) -> serde_json::Result<Self> {
		serde_json::from_str(text)
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
	/// Collapse every collapsible vertex once ingestion completes.
	pub start_collapsed: bool,
	/// Neighbor kinds a host of the given kind may swallow.
	pub eligible_neighbors: HashMap<VertexKind, Vec<VertexKind>>,
}

impl Default for AggregationConfig {
	fn default() -> Self {
		let eligible_neighbors = HashMap::from([
			(
				VertexKind::File,
				vec![VertexKind::FileVersion, VertexKind::FileLocation],
			),
			(VertexKind::Project, vec![VertexKind::Bucket]),
			(VertexKind::Context, vec![VertexKind::Execution]),
		]);
		Self {
			start_collapsed: false,
			eligible_neighbors,
		}
	}
}

impl AggregationConfig {
	pub fn is_eligible(&self, host: VertexKind, neighbor: VertexKind) -> bool {
		self.eligible_neighbors
			.get(&host)
			.is_some_and(|kinds| kinds.contains(&neighbor))
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	pub link_distance: f64,
	pub link_strength: f64,
	/// Negative values repel.
	pub charge_strength: f64,
	pub charge_distance_min: f64,
	/// Pairs further apart than this do not interact.
	pub charge_distance_max: f64,
	pub center_strength: f64,
	pub velocity_decay: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	/// Energy the simulation heads for while a vertex is dragged.
	pub drag_alpha_target: f64,
	/// Energy injected when the simulation is restarted (e.g. on resize).
	pub restart_alpha: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		let alpha_min: f64 = 0.001;
		Self {
			link_distance: 20.0,
			link_strength: 0.5,
			charge_strength: -300.0,
			charge_distance_min: 1.0,
			charge_distance_max: 200.0,
			center_strength: 1.0,
			velocity_decay: 0.4,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			drag_alpha_target: 0.3,
			restart_alpha: 0.3,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
	pub min_zoom: f64,
	pub max_zoom: f64,
	/// Scale factor applied per wheel notch.
	pub wheel_zoom_step: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			min_zoom: 0.1,
			max_zoom: 10.0,
			wheel_zoom_step: 1.1,
		}
	}
}

impl ViewportConfig {
	/// Zoom bounds and step that the viewport can rely on: a missing,
	/// non-finite or non-positive bound falls back to its default, reversed
	/// bounds are swapped, and the wheel step must be finite and above 1.
	pub fn sanitized(self) -> Self {
		let defaults = Self::default();
		let positive = |value: f64, fallback: f64| {
			if value.is_finite() && value > 0.0 { value } else { fallback }
		};
		let mut min_zoom = positive(self.min_zoom, defaults.min_zoom);
		let mut max_zoom = positive(self.max_zoom, defaults.max_zoom);
		if min_zoom > max_zoom {
			std::mem::swap(&mut min_zoom, &mut max_zoom);
		}
		let wheel_zoom_step = if self.wheel_zoom_step.is_finite() && self.wheel_zoom_step > 1.0 {
			self.wheel_zoom_step
		} else {
			defaults.wheel_zoom_step
		};
		let fixed = Self {
			min_zoom,
			max_zoom,
			wheel_zoom_step,
		};
		if fixed != self {
			warn!("viewport config {self:?} adjusted to {fixed:?}");
		}
		fixed
	}
}
