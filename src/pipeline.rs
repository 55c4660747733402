use crate::config::GraphConfig;
use crate::distance::RootDistances;
use crate::encode::VisualEncoder;
use crate::graph::ProcessGraph;
use crate::parser::{self, LogTable};
use crate::prelude::*;
use crate::reconcile::{self, UnifiedRecord};
use crate::render::{self, GraphRenderer};
use graph_artifacts::artifacts::RenderedGraph;

/// Everything one run produced, stage by stage
#[derive(Debug)]
pub struct PipelineOutput {
    pub records: Vec<UnifiedRecord>,
    pub graph: ProcessGraph,
    pub distances: RootDistances,
    pub rendered: RenderedGraph,
}

/// Parse both logs named in `config` and turn them into an annotated graph
pub fn run(config: &GraphConfig) -> Result<PipelineOutput> {
    let init = parser::parse_file(&config.logs.init, config.parse)?;
    let trace = parser::parse_file(&config.logs.trace, config.parse)?;
    info!(
        "Read {} init record(s) and {} trace record(s)",
        init.len(),
        trace.len()
    );

    process_tables(&init, &trace, config)
}

/// The in-memory part of the pipeline, after both logs have been parsed
pub fn process_tables(
    init: &LogTable,
    trace: &LogTable,
    config: &GraphConfig,
) -> Result<PipelineOutput> {
    let records = reconcile::reconcile(&init.records, &trace.records, &config.columns)?;
    let graph = ProcessGraph::from_records(&records);
    let distances = RootDistances::analyze(&graph, &config.root_id)?;

    let encoder = VisualEncoder::new(&config.encoding);
    let rendered = render::annotate(&graph, &distances, &encoder, &config.layout);

    let unreachable = graph.node_count() - distances.len();
    if unreachable > 0 {
        warn!(
            "{unreachable} process(es) are not reachable from root {:?}",
            config.root_id
        );
    }

    Ok(PipelineOutput {
        records,
        graph,
        distances,
        rendered,
    })
}

/// Run the pipeline once and hand the result to `renderer`
pub fn run_with_renderer<R: GraphRenderer>(
    config: &GraphConfig,
    renderer: &mut R,
) -> Result<PipelineOutput> {
    let output = run(config)?;
    renderer
        .render(&output.rendered)
        .context("Failed to render the process graph")?;
    Ok(output)
}
