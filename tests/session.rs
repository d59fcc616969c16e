use lineage_graph_canvas::graph::{
	ElementId, Endpoint, GraphConfig, GraphError, GraphSession, Point, SessionPhase, StreamError,
	ViewportConfig, ViewportState,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const VERTICES: &str = concat!(
	r#"{"id": 1, "types": ["deployer:context"], "properties": [{"key": "deployer:context_id", "values": [{"value": "ctx-7"}]}]}"#,
	"\r",
	r#"{"id": 2, "types": ["deployer:execution"], "properties": [{"key": "deployer:execution_id", "values": [{"value": "run-3"}]}]}"#,
	"\r",
	r#"{"id": 3, "types": ["resource:bucket"], "properties": [{"key": "resource:bucket_id", "values": [{"value": "b-1"}]}]}"#,
	"\r",
	r#"{"id": 4, "types": ["project:project"]}"#,
	"\r",
);

const EDGES: &str = concat!(
	r#"{"id": 20, "label": "deployer:launch", "from": 1, "to": 2}"#,
	"\r",
	r#"{"id": 21, "label": "project:contains", "from": 4, "to": 3}"#,
	"\r",
	r#"{"id": 22, "label": "deployer:writes", "from": 2, "to": 3}"#,
	"\r",
);

fn chunks(text: &str, size: usize) -> Vec<Result<Vec<u8>, String>> {
	text.as_bytes().chunks(size).map(|c| Ok(c.to_vec())).collect()
}

fn loaded() -> GraphSession {
	let mut session = GraphSession::new(GraphConfig::default(), 640.0, 480.0);
	session.load(chunks(VERTICES, 7)).expect("vertices load");
	session.load(chunks(EDGES, 5)).expect("edges load");
	session
}

#[test]
fn pull_loading_reaches_ready_state() {
	let session = loaded();
	assert_eq!(session.phase(), SessionPhase::Ready);
	assert_eq!(session.report(Endpoint::Vertices).accepted, 4);
	assert_eq!(session.report(Endpoint::Edges).accepted, 3);
	assert_eq!(session.loading_endpoint(), None);
}

#[test]
fn launched_execution_links_to_its_run_page() {
	let session = loaded();
	let execution = session.model().vertex(&ElementId::Num(2)).expect("execution");
	assert_eq!(
		execution.detail_url(),
		Some("deploy/context/ctx-7/execution/run-3")
	);
}

#[test]
fn failed_edge_stream_keeps_vertices() {
	let mut session = GraphSession::new(GraphConfig::default(), 640.0, 480.0);
	session.load(chunks(VERTICES, 64)).expect("vertices load");
	let source: Vec<Result<Vec<u8>, String>> = vec![
		Ok(EDGES.as_bytes()[..30].to_vec()),
		Err("502 from upstream".to_string()),
	];
	assert!(matches!(session.load(source), Err(GraphError::Stream(_))));
	assert_eq!(session.phase(), SessionPhase::Failed);
	assert_eq!(session.model().vertex_count(), 4);
	assert!(session.error().is_some_and(|err: &StreamError| err.message().contains("502")));
}

#[test]
fn layout_settles_and_stays_finite() {
	let mut session = loaded();
	let mut ticks = 0;
	while !session.is_settled() && ticks < 1000 {
		session.tick();
		ticks += 1;
	}
	assert!(session.is_settled());
	for vertex in session.model().vertices() {
		let position = vertex.position().expect("positioned");
		assert!(position.x.is_finite() && position.y.is_finite());
	}
	// Settled layouts wake up again on toggle.
	assert!(session.toggle(&ElementId::Num(4)));
	assert!(!session.is_settled());
}

#[test]
fn disposal_stops_everything() {
	let mut session = loaded();
	session.tick();
	session.dispose();
	let before = session.frame();
	assert_eq!(session.tick(), 0);
	assert!(!session.toggle(&ElementId::Num(4)));
	assert!(!session.wheel(Point::new(10.0, 10.0), -1.0));
	session.pan_by(50.0, 50.0);
	assert_eq!(session.frame(), before);
	assert!(session.load(chunks(VERTICES, 8)).is_ok_and(|report| report.accepted == 0));
}

#[test]
fn resize_after_dispose_is_ignored() {
	let mut session = loaded();
	let center = session.layout().state().center;
	session.dispose();
	session.resize(1200.0, 900.0);
	assert_eq!(session.viewport().size(), (640.0, 480.0));
	assert_eq!(session.layout().state().center, center);
}

#[test]
fn reversed_zoom_bounds_still_zoom() {
	let config = GraphConfig::from_json(r#"{"viewport": {"max_zoom": 0.05}}"#).expect("config");
	let mut session = GraphSession::new(config, 640.0, 480.0);
	for _ in 0..40 {
		session.wheel(Point::new(1.0, 1.0), 1.0);
	}
	assert_eq!(session.viewport().transform().k, 0.05);
	assert!(session.wheel(Point::new(1.0, 1.0), -1.0));
	assert!((0.05..=0.1).contains(&session.viewport().transform().k));
}

proptest! {
	#[test]
	fn model_point_under_cursor_survives_zoom(
		tx in -500.0f64..500.0,
		ty in -500.0f64..500.0,
		fx in 0.0f64..800.0,
		fy in 0.0f64..600.0,
		scale in 0.01f64..50.0,
	) {
		let mut view = ViewportState::new(ViewportConfig::default(), 800.0, 600.0);
		view.pan_by(tx, ty);
		let focal = Point::new(fx, fy);
		let anchor = view.to_model(focal);
		prop_assert!(view.zoom_at(focal, scale));
		let k = view.transform().k;
		prop_assert!((0.1..=10.0).contains(&k));
		prop_assert!(view.to_screen(anchor).distance(focal) < 1e-6);
	}

	#[test]
	fn screen_model_round_trip(
		x in -1e4f64..1e4,
		y in -1e4f64..1e4,
		scale in 0.1f64..10.0,
	) {
		let mut view = ViewportState::new(ViewportConfig::default(), 800.0, 600.0);
		view.zoom_at(Point::new(400.0, 300.0), scale);
		let point = Point::new(x, y);
		prop_assert!(view.to_model(view.to_screen(point)).distance(point) < 1e-6);
	}
}
