use lineage_graph_canvas::graph::aggregate::merge_chains;
use lineage_graph_canvas::graph::{AggregationConfig, AggregationController, ElementId, GraphModel};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

const KINDS: [&str; 7] = [
	"resource:file",
	"resource:file_version",
	"resource:file_location",
	"project:project",
	"resource:bucket",
	"deployer:context",
	"deployer:execution",
];

fn build(kinds: &[usize], links: &[(usize, usize)]) -> GraphModel {
	let mut model = GraphModel::new();
	for (n, kind) in kinds.iter().enumerate() {
		let record = serde_json::from_value(json!({ "id": n, "types": [KINDS[*kind]] }))
			.expect("vertex record");
		model.add_vertex(record).expect("vertex accepted");
	}
	for (n, (from, to)) in links.iter().enumerate() {
		let record = serde_json::from_value(json!({
			"id": 1000 + n,
			"label": "rel",
			"from": from % kinds.len(),
			"to": to % kinds.len(),
		}))
		.expect("edge record");
		model.add_edge(record).expect("edge accepted");
	}
	model
}

fn visibility(model: &GraphModel) -> Vec<(ElementId, bool, bool)> {
	model
		.vertices()
		.iter()
		.map(|v| (v.id().clone(), v.is_visible(), v.aggregated()))
		.collect()
}

fn check_invariants(model: &GraphModel) -> Result<(), TestCaseError> {
	prop_assert!(merge_chains(model).is_empty());
	for vertex in model.vertices() {
		if let Some(host) = vertex.merged_to() {
			let host = model.vertex(host).expect("host exists");
			prop_assert!(host.aggregated());
			prop_assert!(host.is_visible());
			prop_assert_ne!(host.id(), vertex.id());
		}
	}
	for edge in model.edges() {
		let source = model.resolve(edge.source_id());
		let target = model.resolve(edge.target_id());
		prop_assert_eq!(edge.is_degenerate(), source == target);
	}
	Ok(())
}

fn graph() -> impl Strategy<Value = (Vec<usize>, Vec<(usize, usize)>)> {
	(
		prop::collection::vec(0..KINDS.len(), 1..12),
		prop::collection::vec((0..12usize, 0..12usize), 0..24),
	)
}

proptest! {
	#[test]
	fn toggling_never_creates_merge_chains(
		(kinds, links) in graph(),
		toggles in prop::collection::vec(0..12usize, 0..30),
	) {
		let mut model = build(&kinds, &links);
		let controller = AggregationController::new(AggregationConfig::default());
		controller.initialize(&mut model);
		check_invariants(&model)?;
		for pick in toggles {
			controller.toggle(&mut model, &ElementId::from((pick % kinds.len()) as i64));
			check_invariants(&model)?;
		}
	}

	#[test]
	fn collapse_then_expand_restores_visibility(
		(kinds, links) in graph(),
		pick in 0..12usize,
	) {
		let mut model = build(&kinds, &links);
		let controller = AggregationController::new(AggregationConfig::default());
		controller.initialize(&mut model);
		let before = visibility(&model);
		let id = ElementId::from((pick % kinds.len()) as i64);
		if controller.toggle(&mut model, &id) {
			prop_assert!(controller.toggle(&mut model, &id));
		}
		prop_assert_eq!(visibility(&model), before);
		let degenerate_flags_consistent = model.edges().iter().all(|edge| {
			edge.is_degenerate() == (edge.source_id() == edge.target_id())
		});
		prop_assert!(degenerate_flags_consistent);
	}
}

#[test]
fn collapse_all_then_expand_all_is_a_round_trip() {
	let mut model = build(&[0, 1, 2, 5, 6, 6], &[(1, 0), (2, 0), (3, 4), (3, 5)]);
	let controller = AggregationController::new(AggregationConfig::default());
	let before = visibility(&model);

	assert_eq!(controller.toggle_all(&mut model, true), 2);
	let hidden: Vec<i64> = model
		.vertices()
		.iter()
		.filter(|v| !v.is_visible())
		.filter_map(|v| match v.id() {
			ElementId::Num(n) => Some(*n),
			ElementId::Text(_) => None,
		})
		.collect();
	assert_eq!(hidden, vec![1, 2, 4, 5]);

	assert_eq!(controller.toggle_all(&mut model, false), 2);
	assert_eq!(visibility(&model), before);
}
