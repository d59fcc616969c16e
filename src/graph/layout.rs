//! Force-directed layout of the visible vertices.
//!
//! One [`ForceLayoutEngine::step`] is one tick: link springs, many-body
//! repulsion and centering are applied scaled by the current energy
//! (`alpha`), which decays towards `alpha_target`. Scheduling ticks is the
//! embedder's business.

use std::collections::HashMap;
use std::f64::consts::PI;

use log::debug;

use super::config::LayoutConfig;
use super::model::{GraphModel, Point};

/// Mutable simulation state, owned by one open view.
#[derive(Clone, Debug)]
pub struct SimulationState {
	pub alpha: f64,
	pub alpha_target: f64,
	/// Point the vertex centroid is pulled towards.
	pub center: Point,
	/// Per-vertex velocity, indexed like the model's vertices.
	velocities: Vec<Point>,
	ticks: u64,
}

impl SimulationState {
	pub fn new(center: Point) -> Self {
		Self {
			alpha: 1.0,
			alpha_target: 0.0,
			center,
			velocities: Vec::new(),
			ticks: 0,
		}
	}

	pub fn ticks(&self) -> u64 {
		self.ticks
	}
}

struct Body {
	index: usize,
	position: Point,
	velocity: Point,
	fixed: Option<Point>,
}

pub struct ForceLayoutEngine {
	config: LayoutConfig,
	state: SimulationState,
}

impl ForceLayoutEngine {
	pub fn new(config: LayoutConfig, center: Point) -> Self {
		Self {
			config,
			state: SimulationState::new(center),
		}
	}

	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	pub fn state(&self) -> &SimulationState {
		&self.state
	}

	/// Energy dropped below the threshold and nothing is holding it up.
	pub fn is_settled(&self) -> bool {
		self.state.alpha < self.config.alpha_min && self.state.alpha_target < self.config.alpha_min
	}

	/// Raise the energy so the layout moves again.
	pub fn restart(&mut self) {
		self.state.alpha = self.state.alpha.max(self.config.restart_alpha);
	}

	/// Keep the simulation warm while a vertex is dragged.
	pub fn begin_drag(&mut self) {
		self.state.alpha_target = self.config.drag_alpha_target;
		self.restart();
	}

	pub fn end_drag(&mut self) {
		self.state.alpha_target = 0.0;
	}

	/// Follow a viewport resize: the center moves by half the size change,
	/// converted to model units at the current zoom.
	pub fn recenter(&mut self, width_delta: f64, height_delta: f64, scale: f64) {
		self.state.center.x += 0.5 * width_delta / scale;
		self.state.center.y += 0.5 * height_delta / scale;
		debug!(
			"layout center moved to ({:.1}, {:.1})",
			self.state.center.x, self.state.center.y
		);
		self.restart();
	}

	/// Advance one tick. Returns the number of vertices whose position was
	/// updated by the forces (pinned vertices are not counted).
	pub fn step(&mut self, model: &mut GraphModel) -> usize {
		tick(&mut self.state, &self.config, model)
	}
}

/// One simulation tick over the visible vertices of `model`.
pub fn tick(state: &mut SimulationState, config: &LayoutConfig, model: &mut GraphModel) -> usize {
	let mut bodies = collect_bodies(state, model);
	if bodies.is_empty() {
		return 0;
	}
	state.alpha += (state.alpha_target - state.alpha) * config.alpha_decay;
	state.ticks += 1;
	let alpha = state.alpha;

	let links = resolved_links(model, &bodies);
	apply_links(&mut bodies, &links, config, alpha);
	apply_charge(&mut bodies, config, alpha);
	apply_centering(&mut bodies, state.center, config.center_strength);

	let mut updated = 0;
	for body in &mut bodies {
		match body.fixed {
			Some(fixed) => {
				body.position = fixed;
				body.velocity = Point::ZERO;
			}
			None => {
				body.velocity.x *= 1.0 - config.velocity_decay;
				body.velocity.y *= 1.0 - config.velocity_decay;
				body.position.x += body.velocity.x;
				body.position.y += body.velocity.y;
				updated += 1;
			}
		}
		state.velocities[body.index] = body.velocity;
		model.vertex_at_mut(body.index).position = Some(body.position);
	}
	updated
}

fn collect_bodies(state: &mut SimulationState, model: &GraphModel) -> Vec<Body> {
	if state.velocities.len() < model.vertex_count() {
		state.velocities.resize(model.vertex_count(), Point::ZERO);
	}
	model
		.vertices()
		.iter()
		.enumerate()
		.filter(|(_, vertex)| vertex.is_visible())
		.map(|(index, vertex)| Body {
			index,
			position: vertex
				.fixed_position()
				.or(vertex.position())
				.unwrap_or_else(|| initial_position(index, state.center)),
			velocity: state.velocities[index],
			fixed: vertex.fixed_position(),
		})
		.collect()
}

/// Phyllotaxis placement around the center, so new vertices never stack.
fn initial_position(index: usize, center: Point) -> Point {
	let radius = 10.0 * (0.5 + index as f64).sqrt();
	let angle = index as f64 * PI * (3.0 - 5f64.sqrt());
	Point::new(
		center.x + radius * angle.cos(),
		center.y + radius * angle.sin(),
	)
}

/// Springs between the merge-resolved ends of every non-degenerate edge,
/// as pairs of body slots.
fn resolved_links(model: &GraphModel, bodies: &[Body]) -> Vec<(usize, usize)> {
	let slots: HashMap<usize, usize> = bodies
		.iter()
		.enumerate()
		.map(|(slot, body)| (body.index, slot))
		.collect();
	model
		.edges()
		.iter()
		.filter_map(|edge| {
			let (source, target) = edge.endpoints();
			let source = *slots.get(&model.resolved_index(source))?;
			let target = *slots.get(&model.resolved_index(target))?;
			(source != target).then_some((source, target))
		})
		.collect()
}

/// Deterministic stand-in for a random nudge when two points coincide.
fn jiggle(seed: usize) -> f64 {
	let sign = if seed % 2 == 0 { 1.0 } else { -1.0 };
	sign * 1e-6 * (1 + seed % 7) as f64
}

fn apply_links(bodies: &mut [Body], links: &[(usize, usize)], config: &LayoutConfig, alpha: f64) {
	let mut degree = vec![0usize; bodies.len()];
	for &(source, target) in links {
		degree[source] += 1;
		degree[target] += 1;
	}
	for (n, &(source, target)) in links.iter().enumerate() {
		let (s, t) = (&bodies[source], &bodies[target]);
		let mut dx = t.position.x + t.velocity.x - s.position.x - s.velocity.x;
		let mut dy = t.position.y + t.velocity.y - s.position.y - s.velocity.y;
		if dx == 0.0 {
			dx = jiggle(n);
		}
		if dy == 0.0 {
			dy = jiggle(n + 1);
		}
		let length = (dx * dx + dy * dy).sqrt();
		let pull = (length - config.link_distance) / length * alpha * config.link_strength;
		dx *= pull;
		dy *= pull;
		// The less connected end moves more.
		let bias = degree[source] as f64 / (degree[source] + degree[target]) as f64;
		bodies[target].velocity.x -= dx * bias;
		bodies[target].velocity.y -= dy * bias;
		bodies[source].velocity.x += dx * (1.0 - bias);
		bodies[source].velocity.y += dy * (1.0 - bias);
	}
}

fn apply_charge(bodies: &mut [Body], config: &LayoutConfig, alpha: f64) {
	let max2 = config.charge_distance_max * config.charge_distance_max;
	let min2 = config.charge_distance_min * config.charge_distance_min;
	for i in 0..bodies.len() {
		let mut push = Point::ZERO;
		for j in 0..bodies.len() {
			if i == j {
				continue;
			}
			let mut dx = bodies[j].position.x - bodies[i].position.x;
			let mut dy = bodies[j].position.y - bodies[i].position.y;
			let mut l2 = dx * dx + dy * dy;
			if l2 >= max2 {
				continue;
			}
			if dx == 0.0 {
				dx = jiggle(i + j);
				l2 += dx * dx;
			}
			if dy == 0.0 {
				dy = jiggle(i * 31 + j);
				l2 += dy * dy;
			}
			if l2 < min2 {
				l2 = (min2 * l2).sqrt();
			}
			let w = config.charge_strength * alpha / l2;
			push.x += dx * w;
			push.y += dy * w;
		}
		bodies[i].velocity.x += push.x;
		bodies[i].velocity.y += push.y;
	}
}

fn apply_centering(bodies: &mut [Body], center: Point, strength: f64) {
	let n = bodies.len() as f64;
	let (sum_x, sum_y) = bodies
		.iter()
		.fold((0.0, 0.0), |(x, y), b| (x + b.position.x, y + b.position.y));
	let shift_x = (sum_x / n - center.x) * strength;
	let shift_y = (sum_y / n - center.y) * strength;
	for body in bodies {
		body.position.x -= shift_x;
		body.position.y -= shift_y;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::aggregate::AggregationController;
	use crate::graph::testing::{id, model};

	fn engine() -> ForceLayoutEngine {
		ForceLayoutEngine::new(LayoutConfig::default(), Point::new(400.0, 300.0))
	}

	fn run(engine: &mut ForceLayoutEngine, model: &mut GraphModel, ticks: usize) {
		for _ in 0..ticks {
			engine.step(model);
		}
	}

	#[test]
	fn empty_graph_does_no_work() {
		let mut model = GraphModel::new();
		let mut engine = engine();
		assert_eq!(engine.step(&mut model), 0);
		assert_eq!(engine.state().ticks(), 0);
		assert_eq!(engine.state().alpha, 1.0);
	}

	#[test]
	fn connected_pair_settles_near_link_distance() {
		let mut model = model(&[(1, "resource:file"), (2, "resource:file")], &[(10, 1, 2)]);
		let mut engine = ForceLayoutEngine::new(
			LayoutConfig {
				charge_strength: 0.0,
				..LayoutConfig::default()
			},
			Point::new(0.0, 0.0),
		);
		run(&mut engine, &mut model, 300);
		let a = model.vertex(&id(1)).unwrap().position().unwrap();
		let b = model.vertex(&id(2)).unwrap().position().unwrap();
		assert!((a.distance(b) - 20.0).abs() < 1.0, "distance {}", a.distance(b));
	}

	#[test]
	fn isolated_vertices_repel_and_stay_centered() {
		let mut model = model(&[(1, "resource:file"), (2, "resource:bucket")], &[]);
		let mut engine = engine();
		run(&mut engine, &mut model, 50);
		let a = model.vertex(&id(1)).unwrap().position().unwrap();
		let b = model.vertex(&id(2)).unwrap().position().unwrap();
		assert!(a.distance(b) > 20.0);
		let mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
		assert!(mid.distance(Point::new(400.0, 300.0)) < 1e-6);
	}

	#[test]
	fn pinned_vertex_does_not_move() {
		let mut model = model(&[(1, "resource:file"), (2, "resource:file")], &[(10, 1, 2)]);
		let mut engine = engine();
		run(&mut engine, &mut model, 5);
		let pin = Point::new(10.0, 20.0);
		model.set_fixed_position(&id(1), Some(pin));
		engine.begin_drag();
		for _ in 0..20 {
			assert_eq!(engine.step(&mut model), 1);
			assert_eq!(model.vertex(&id(1)).unwrap().position(), Some(pin));
		}
		model.set_fixed_position(&id(1), None);
		engine.end_drag();
		assert_eq!(model.vertex(&id(1)).unwrap().position(), Some(pin));
		assert_eq!(engine.step(&mut model), 2);
	}

	#[test]
	fn drag_keeps_energy_up() {
		let mut model = model(&[(1, "resource:file")], &[]);
		let mut engine = engine();
		run(&mut engine, &mut model, 600);
		assert!(engine.is_settled());
		engine.begin_drag();
		run(&mut engine, &mut model, 600);
		assert!(!engine.is_settled());
		assert!((engine.state().alpha - 0.3).abs() < 0.01);
		engine.end_drag();
		run(&mut engine, &mut model, 600);
		assert!(engine.is_settled());
	}

	#[test]
	fn merged_vertices_are_frozen() {
		let mut model = model(
			&[(1, "resource:file"), (2, "resource:file_version"), (3, "resource:file")],
			&[(10, 2, 1), (11, 1, 3)],
		);
		let mut engine = engine();
		run(&mut engine, &mut model, 3);
		AggregationController::default().toggle(&mut model, &id(1));
		let hidden = model.vertex(&id(2)).unwrap().position();
		assert_eq!(engine.step(&mut model), 2);
		assert_eq!(model.vertex(&id(2)).unwrap().position(), hidden);
	}

	#[test]
	fn recenter_scales_by_zoom() {
		let mut engine = engine();
		engine.recenter(200.0, -100.0, 2.0);
		assert_eq!(engine.state().center, Point::new(450.0, 275.0));
	}
}
