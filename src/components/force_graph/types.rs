/// Where the canvas streams its graph from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphSource {
	pub vertex_url: String,
	pub edge_url: String,
}

impl Default for GraphSource {
	fn default() -> Self {
		Self {
			vertex_url: "./api/navigation/vertex".to_string(),
			edge_url: "./api/navigation/edge".to_string(),
		}
	}
}
