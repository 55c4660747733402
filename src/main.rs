use anyhow::Result;
use clap::Parser;
use kernel_graph::{ArtifactRenderer, GraphConfig, pipeline};
use log::{debug, info};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kernel-graph")]
#[command(about = "Build a process ancestry graph from kernel process-trace logs")]
#[command(version)]
struct Cli {
    /// Snapshot of the processes alive when tracing started
    #[arg(long, env = "KERNEL_GRAPH_INIT_LOG")]
    init_log: Option<PathBuf>,

    /// Process trace recorded afterwards
    #[arg(long, env = "KERNEL_GRAPH_TRACE_LOG")]
    trace_log: Option<PathBuf>,

    /// YAML file overriding the default graph settings
    #[arg(short, long, env = "KERNEL_GRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Output folder for the rendered graph
    #[arg(short, long, default_value = ".")]
    output: PathBuf,
}

fn main() {
    env_logger::builder()
        .parse_env(env_logger::Env::new().filter_or("KERNEL_GRAPH_LOG", "info"))
        .format_timestamp(None)
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = GraphConfig::load(cli.config.as_deref())?;
    if let Some(init_log) = cli.init_log {
        config.logs.init = init_log;
    }
    if let Some(trace_log) = cli.trace_log {
        config.logs.trace = trace_log;
    }
    debug!("Running with config: {config:#?}");

    let mut renderer = ArtifactRenderer::new(&cli.output);
    let output = pipeline::run_with_renderer(&config, &mut renderer)?;

    info!(
        "{} process(es) reachable from root {:?}, deepest chain has {} process(es)",
        output.distances.len(),
        config.root_id,
        output.distances.max_path_length()
    );
    Ok(())
}
