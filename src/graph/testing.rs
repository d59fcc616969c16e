//! Record builders shared by the unit tests.

use serde_json::{Value, json};

use super::model::GraphModel;
use super::record::{EdgeRecord, ElementId, VertexRecord};

pub(crate) fn vertex(id: i64, kind: &str, props: Value) -> VertexRecord {
	serde_json::from_value(json!({ "id": id, "types": [kind], "properties": props })).unwrap()
}

pub(crate) fn edge(id: i64, label: &str, from: i64, to: i64) -> EdgeRecord {
	serde_json::from_value(json!({ "id": id, "label": label, "from": from, "to": to })).unwrap()
}

pub(crate) fn prop(key: &str, value: Value) -> Value {
	json!({ "key": key, "values": [{ "key": key, "data_type": "string", "value": value }] })
}

/// Builds a model from `(id, kind)` vertices and `(id, from, to)` edges.
pub(crate) fn model(vertices: &[(i64, &str)], edges: &[(i64, i64, i64)]) -> GraphModel {
	let mut model = GraphModel::new();
	for &(id, kind) in vertices {
		model.add_vertex(vertex(id, kind, json!([]))).unwrap();
	}
	for &(id, from, to) in edges {
		model.add_edge(edge(id, "rel", from, to)).unwrap();
	}
	model
}

pub(crate) fn id(n: i64) -> ElementId {
	ElementId::Num(n)
}
