//! Known vertex kinds, keyed by a vertex's primary type tag.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

/// Closed set of vertex kinds the view knows how to draw and aggregate.
///
/// Tags the view does not know map to [`VertexKind::Unknown`]; the original
/// tag is still kept on the vertex.
#[derive(
	Clone,
	Copy,
	Debug,
	PartialEq,
	Eq,
	Hash,
	PartialOrd,
	Ord,
	EnumString,
	EnumIter,
	IntoStaticStr,
	Serialize,
	Deserialize,
)]
#[serde(from = "String", into = "&'static str")]
pub enum VertexKind {
	#[strum(serialize = "resource:file")]
	File,
	#[strum(serialize = "resource:file_version")]
	FileVersion,
	#[strum(serialize = "resource:file_location")]
	FileLocation,
	#[strum(serialize = "resource:bucket")]
	Bucket,
	#[strum(serialize = "project:project")]
	Project,
	#[strum(serialize = "deployer:context")]
	Context,
	#[strum(serialize = "deployer:execution")]
	Execution,
	#[strum(serialize = "unknown")]
	Unknown,
}

impl VertexKind {
	pub fn from_tag(tag: &str) -> Self {
		VertexKind::from_str(tag).unwrap_or(VertexKind::Unknown)
	}

	pub fn tag(self) -> &'static str {
		self.into()
	}

	/// Kinds that can act as collapse hosts.
	pub fn is_collapsible(self) -> bool {
		matches!(
			self,
			VertexKind::File | VertexKind::Project | VertexKind::Context
		)
	}
}

impl From<String> for VertexKind {
	fn from(value: String) -> Self {
		VertexKind::from_tag(&value)
	}
}
