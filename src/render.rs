use crate::distance::RootDistances;
use crate::encode::VisualEncoder;
use crate::graph::ProcessGraph;
use crate::prelude::*;
use graph_artifacts::artifacts::{
    ArtifactExt, LayoutOptions, RenderedEdge, RenderedGraph, RenderedNode,
};
use std::path::PathBuf;

/// Consumes the annotated graph and produces the visual artifact (layout, drawing, files)
pub trait GraphRenderer {
    fn render(&mut self, graph: &RenderedGraph) -> Result<()>;
}

/// Attach the visual encoding to every node of `graph`
pub fn annotate(
    graph: &ProcessGraph,
    distances: &RootDistances,
    encoder: &VisualEncoder<'_>,
    layout: &LayoutOptions,
) -> RenderedGraph {
    let nodes = graph
        .nodes()
        .map(|node| {
            let attributes = encoder.encode(&node.pid, node.label.as_deref(), distances);
            RenderedNode {
                id: node.pid.clone(),
                label: attributes.display_label,
                color: attributes.color,
                size: attributes.size,
            }
        })
        .collect();

    let edges = graph
        .edges()
        .map(|(from, to)| RenderedEdge {
            from: from.to_string(),
            to: to.to_string(),
        })
        .collect();

    RenderedGraph {
        root_id: distances.root().to_string(),
        nodes,
        edges,
        layout: layout.clone(),
    }
}

/// Writes the graph as `RenderedGraph.json` (vis-network data and options) and
/// `RenderedGraph.msgpack`, for an external viewer to lay out and draw
pub struct ArtifactRenderer {
    output_dir: PathBuf,
}

impl ArtifactRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl GraphRenderer for ArtifactRenderer {
    fn render(&mut self, graph: &RenderedGraph) -> Result<()> {
        graph
            .save_json_to(&self.output_dir)
            .with_context(|| format!("Failed to write graph to {}", self.output_dir.display()))?;
        graph.save_to(&self.output_dir)?;

        info!(
            "Wrote process graph ({} nodes, {} edges) to {}",
            graph.nodes.len(),
            graph.edges.len(),
            self.output_dir.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{EncodingConfig, UNREACHABLE_COLOR};
    use crate::reconcile::UnifiedRecord;

    fn sample() -> (ProcessGraph, RootDistances) {
        let records = [("1", "0", "init"), ("42", "1", "bash  -x "), ("7", "6", "orphan")]
            .iter()
            .map(|(pid, ppid, command)| UnifiedRecord {
                pid: pid.to_string(),
                ppid: ppid.to_string(),
                command: command.to_string(),
            })
            .collect::<Vec<_>>();
        let graph = ProcessGraph::from_records(&records);
        let distances = RootDistances::analyze(&graph, "0").unwrap();
        (graph, distances)
    }

    #[test]
    fn test_annotate_nodes_and_edges() {
        let (graph, distances) = sample();
        let config = EncodingConfig::default();
        let rendered = annotate(
            &graph,
            &distances,
            &VisualEncoder::new(&config),
            &LayoutOptions::default(),
        );

        let ids = rendered.nodes.iter().map(|n| n.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["1", "0", "42", "7", "6"]);
        assert_eq!(rendered.edges.len(), 3);
        assert_eq!(rendered.edges[1].from, "1");
        assert_eq!(rendered.edges[1].to, "42");
        assert_eq!(rendered.root_id, "0");

        let bash = &rendered.nodes[2];
        assert_eq!(bash.label, "PID: 42:\n bash  -x ");
        assert_eq!(bash.size, 6.75);

        let orphan = &rendered.nodes[3];
        assert_eq!(orphan.color, UNREACHABLE_COLOR);
    }

    #[test]
    fn test_artifact_renderer_writes_files() {
        let (graph, distances) = sample();
        let config = EncodingConfig::default();
        let rendered = annotate(
            &graph,
            &distances,
            &VisualEncoder::new(&config),
            &LayoutOptions::hierarchical(),
        );

        let dir = tempfile::tempdir().unwrap();
        let mut renderer = ArtifactRenderer::new(dir.path().join("out"));
        renderer.render(&rendered).unwrap();

        let json = std::fs::read_to_string(dir.path().join("out/RenderedGraph.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["nodes"].as_array().unwrap().len(), 5);
        assert_eq!(value["options"]["layout"]["hierarchical"]["enabled"], true);
        assert_eq!(value["options"]["layout"]["hierarchical"]["sortMethod"], "directed");
        assert!(value["options"].get("physics").is_none());
        assert!(dir.path().join("out/RenderedGraph.msgpack").exists());
    }
}
