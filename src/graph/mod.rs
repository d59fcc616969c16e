//! Platform-independent core of the lineage graph view.
//!
//! Data flows one way: [`stream`] frames the endpoint bytes, [`ingest`] fills
//! the [`model`], [`aggregate`] decides what is hidden, [`layout`] positions
//! what is visible and [`viewport`] projects it to the screen. [`session`]
//! owns one instance of each for an open view.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod ingest;
pub mod kind;
pub mod layout;
pub mod model;
pub mod record;
pub mod session;
pub mod stream;
pub mod viewport;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregate::AggregationController;
pub use config::{AggregationConfig, GraphConfig, LayoutConfig, ViewportConfig};
pub use error::{GraphError, Result, StreamError};
pub use ingest::{Endpoint, IngestReport};
pub use kind::VertexKind;
pub use layout::{ForceLayoutEngine, SimulationState};
pub use model::{Edge, GraphModel, Point, Vertex};
pub use record::{EdgeRecord, ElementId, VertexRecord};
pub use session::{GraphSession, RenderFrame, SessionPhase, VisibleEdge, VisibleVertex};
pub use stream::{RecordStream, StreamDecoder};
pub use viewport::{ViewportState, ViewportTransform};
