//! Process ancestry graphs from kernel process-trace logs

pub mod config;
pub mod distance;
pub mod encode;
pub mod error;
pub mod graph;
pub mod parser;
pub mod pipeline;
pub mod reconcile;
pub mod render;

mod prelude;

pub use config::GraphConfig;
pub use distance::RootDistances;
pub use encode::{EncodingConfig, EncodingVariant, VisualAttributes, VisualEncoder};
pub use error::GraphError;
pub use graph::{GraphBuilder, ProcessGraph};
pub use graph_artifacts::artifacts::{LayoutOptions, RenderedGraph, Rgb};
pub use parser::{LogTable, ParseOptions, ParsedRecord};
pub use reconcile::{ColumnNames, UnifiedRecord};
pub use render::{ArtifactRenderer, GraphRenderer};
