//! Wire records served by the vertex and edge navigation endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a vertex or edge: the endpoints use integers or strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementId {
	Num(i64),
	Text(String),
}

impl fmt::Display for ElementId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ElementId::Num(n) => write!(f, "{n}"),
			ElementId::Text(s) => f.write_str(s),
		}
	}
}

impl From<i64> for ElementId {
	fn from(value: i64) -> Self {
		ElementId::Num(value)
	}
}

impl From<&str> for ElementId {
	fn from(value: &str) -> Self {
		ElementId::Text(value.to_string())
	}
}

/// One vertex as streamed by the vertex endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VertexRecord {
	pub id: ElementId,
	#[serde(default)]
	pub types: Vec<String>,
	#[serde(default)]
	pub properties: Vec<PropertyRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
	pub key: String,
	#[serde(default)]
	pub values: Vec<PropertyValue>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyValue {
	#[serde(default)]
	pub key: Option<String>,
	#[serde(default)]
	pub data_type: Option<String>,
	pub value: Value,
}

/// One edge as streamed by the edge endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
	pub id: ElementId,
	pub label: String,
	pub from: ElementId,
	pub to: ElementId,
	#[serde(default)]
	pub properties: Vec<EdgeProperty>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeProperty {
	pub key: String,
	pub value: Value,
}

/// Render a property value the way it is shown to users: strings bare,
/// everything else as JSON.
pub fn value_text(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ids_accept_numbers_and_strings() {
		let num: ElementId = serde_json::from_str("42").unwrap();
		let text: ElementId = serde_json::from_str("\"v42\"").unwrap();
		assert_eq!(num, ElementId::Num(42));
		assert_eq!(text, ElementId::Text("v42".into()));
		assert_ne!(num, ElementId::Text("42".into()));
	}

	#[test]
	fn vertex_record_defaults_missing_lists() {
		let record: VertexRecord = serde_json::from_str(r#"{"id": 3}"#).unwrap();
		assert!(record.types.is_empty());
		assert!(record.properties.is_empty());
	}

	#[test]
	fn edge_record_parses_wire_shape() {
		let record: EdgeRecord = serde_json::from_str(
			r#"{"id": 9, "label": "deployer:launch", "from": 1, "to": 2,
			    "properties": [{"key": "k", "value": 1}]}"#,
		)
		.unwrap();
		assert_eq!(record.from, ElementId::Num(1));
		assert_eq!(record.properties[0].key, "k");
	}
}
