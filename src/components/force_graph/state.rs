use std::collections::HashSet;

use crate::graph::{ElementId, GraphConfig, GraphSession, Point, RenderFrame};

pub const NODE_RADIUS: f64 = 12.0;
pub const HIT_RADIUS: f64 = 14.0;
pub const LABEL_OFFSET: f64 = 24.0;
/// Once settled, tick only every this many frames so drags still get a response.
const IDLE_TICK_INTERVAL: u64 = 10;

#[derive(Clone, Debug, PartialEq)]
pub enum Hovered {
	Vertex(ElementId),
	Edge(ElementId),
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub vertex: Option<ElementId>,
	pub last_x: f64,
	pub last_y: f64,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub last_x: f64,
	pub last_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub target: Option<Hovered>,
	pub neighbors: HashSet<ElementId>,
	pub x: f64,
	pub y: f64,
	/// Eases toward 1 while something is hovered, back to 0 otherwise.
	pub highlight_t: f64,
}

pub struct ForceGraphState {
	pub session: GraphSession,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
	frames: u64,
}

impl ForceGraphState {
	pub fn new(config: GraphConfig, width: f64, height: f64) -> Self {
		Self {
			session: GraphSession::new(config, width, height),
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			flow_time: 0.0,
			frames: 0,
		}
	}

	/// Called once per animation frame.
	pub fn tick(&mut self, dt: f64) {
		self.frames += 1;
		self.flow_time += dt;
		let goal = if self.hover.target.is_some() { 1.0 } else { 0.0 };
		self.hover.highlight_t += (goal - self.hover.highlight_t) * (dt * 8.0).min(1.0);
		let dragging = self.drag.vertex.is_some();
		if !self.session.is_settled() || dragging || self.frames % IDLE_TICK_INTERVAL == 0 {
			self.session.tick();
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.session.resize(width, height);
	}

	fn vertex_at(&self, x: f64, y: f64) -> Option<ElementId> {
		self.session
			.vertex_at(Point::new(x, y), HIT_RADIUS)
			.cloned()
	}

	pub fn pointer_down(&mut self, x: f64, y: f64) {
		match self.vertex_at(x, y) {
			Some(id) if self.session.begin_drag(&id) => {
				self.drag = DragState {
					vertex: Some(id),
					last_x: x,
					last_y: y,
					moved: false,
				};
			}
			_ => {
				self.pan = PanState {
					active: true,
					last_x: x,
					last_y: y,
				};
			}
		}
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		if self.drag.vertex.is_some() {
			let (dx, dy) = (x - self.drag.last_x, y - self.drag.last_y);
			if dx != 0.0 || dy != 0.0 {
				self.session.drag_by(dx, dy);
				self.drag.moved = true;
			}
			self.drag.last_x = x;
			self.drag.last_y = y;
		} else if self.pan.active {
			self.session
				.pan_by(x - self.pan.last_x, y - self.pan.last_y);
			self.pan.last_x = x;
			self.pan.last_y = y;
		} else {
			self.update_hover(x, y);
		}
	}

	/// Ends a drag or pan. A press and release without movement on a vertex
	/// toggles its aggregation.
	pub fn pointer_up(&mut self) {
		let drag = std::mem::take(&mut self.drag);
		self.pan.active = false;
		let Some(id) = drag.vertex else {
			return;
		};
		self.session.end_drag();
		if !drag.moved {
			self.session.toggle(&id);
			self.clear_hover();
		}
	}

	pub fn pointer_leave(&mut self) {
		self.session.end_drag();
		self.drag = DragState::default();
		self.pan.active = false;
		self.clear_hover();
	}

	fn clear_hover(&mut self) {
		self.hover.target = None;
		self.hover.neighbors.clear();
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.highlight_t > 0.01
	}

	pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) {
		self.session.wheel(Point::new(x, y), delta_y);
	}

	/// Detail route of the vertex under the pointer.
	pub fn detail_url_at(&self, x: f64, y: f64) -> Option<String> {
		let id = self.vertex_at(x, y)?;
		self.session
			.model()
			.vertex(&id)
			.and_then(|vertex| vertex.detail_url())
			.map(str::to_string)
	}

	fn update_hover(&mut self, x: f64, y: f64) {
		self.hover.x = x;
		self.hover.y = y;
		let target = match self.vertex_at(x, y) {
			Some(id) => Some(Hovered::Vertex(id)),
			None => edge_at(&self.session.frame(), Point::new(x, y), HIT_RADIUS / 2.0)
				.map(Hovered::Edge),
		};
		if self.hover.target == target {
			return;
		}
		self.hover.neighbors.clear();
		if let Some(Hovered::Vertex(id)) = &target {
			let model = self.session.model();
			for edge in model.edges().iter().filter(|e| !e.is_degenerate()) {
				let (Some(from), Some(to)) =
					(model.resolve(edge.source_id()), model.resolve(edge.target_id()))
				else {
					continue;
				};
				if from == id {
					self.hover.neighbors.insert(to.clone());
				} else if to == id {
					self.hover.neighbors.insert(from.clone());
				}
			}
		}
		self.hover.target = target;
	}

	pub fn is_highlighted(&self, id: &ElementId) -> bool {
		matches!(&self.hover.target, Some(Hovered::Vertex(hovered)) if hovered == id)
			|| self.hover.neighbors.contains(id)
	}

	/// Tooltip rows for whatever is hovered.
	pub fn tooltip(&self) -> Option<Vec<(String, String)>> {
		let model = self.session.model();
		match self.hover.target.as_ref()? {
			Hovered::Vertex(id) => model.vertex(id).map(|v| v.describe()),
			Hovered::Edge(id) => model.edge(id).map(|e| e.describe()),
		}
	}
}

/// Closest drawn edge within `tolerance` screen pixels.
fn edge_at(frame: &RenderFrame, p: Point, tolerance: f64) -> Option<ElementId> {
	frame
		.edges
		.iter()
		.map(|edge| (segment_distance(p, edge.source, edge.target), edge))
		.filter(|(distance, _)| *distance < tolerance)
		.min_by(|a, b| a.0.total_cmp(&b.0))
		.map(|(_, edge)| edge.id.clone())
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let length2 = dx * dx + dy * dy;
	if length2 == 0.0 {
		return p.distance(a);
	}
	let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / length2).clamp(0.0, 1.0);
	p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}
