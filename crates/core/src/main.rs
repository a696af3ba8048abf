use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use protocol::CityId;
use routefinder::input::{self, InputFormat};
use routefinder::metrics::MetricsCollector;
use routefinder::report;
use std::path::PathBuf;
use store::{GraphLimits, RoadGraph, RouteError, RouteExporter, ShortestPathEngine, DEFAULT_MAX_CITIES};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "routefinder")]
#[command(about = "Shortest routes between cities with Bellman-Ford", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct GraphArgs {
    /// Road network file
    #[arg(long)]
    graph: PathBuf,

    /// Input format; inferred from the file extension when omitted
    #[arg(long, value_enum)]
    format: Option<InputFormat>,

    #[arg(long, default_value_t = DEFAULT_MAX_CITIES)]
    max_cities: usize,
}

#[derive(Subcommand)]
enum Commands {
    Solve {
        #[command(flatten)]
        input: GraphArgs,

        /// Source city; repeat to run several queries against the same graph
        #[arg(long = "source")]
        sources: Vec<String>,

        /// Print the route to this city as well
        #[arg(long)]
        to: Option<String>,

        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        #[arg(long)]
        no_write: bool,

        /// Print run metrics as JSON
        #[arg(long)]
        metrics: bool,
    },

    Stats {
        #[command(flatten)]
        input: GraphArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Solve {
            input,
            sources,
            to,
            out_dir,
            no_write,
            metrics,
        } => solve(input, sources, to, out_dir, no_write, metrics),

        Commands::Stats { input } => {
            let (graph, _) = load_graph(&input)?;
            print!("{}", report::render_stats(&graph.stats()));
            Ok(())
        }
    }
}

/// Builds the graph and returns it with the source city named in the file,
/// if any.
fn load_graph(args: &GraphArgs) -> Result<(RoadGraph, Option<String>)> {
    let spec = input::load_graph_spec(&args.graph, args.format)?;
    let graph = RoadGraph::from_spec(&spec, &GraphLimits::new(args.max_cities))
        .with_context(|| format!("invalid road network in {:?}", args.graph))?;
    Ok((graph, spec.source))
}

fn solve(
    args: GraphArgs,
    sources: Vec<String>,
    to: Option<String>,
    out_dir: PathBuf,
    no_write: bool,
    print_metrics: bool,
) -> Result<()> {
    let mut metrics = MetricsCollector::new();

    metrics.start_phase("load");
    let (graph, file_source) = load_graph(&args)?;
    metrics.record_graph(graph.city_count(), graph.road_count());
    metrics.end_phase("load");

    let sources = if sources.is_empty() {
        file_source.into_iter().collect()
    } else {
        sources
    };
    if sources.is_empty() {
        bail!("no source city given: pass --source or end the graph file with a source line");
    }

    // Every name is resolved before any query runs.
    let source_ids = sources
        .iter()
        .map(|name| graph.resolve(name).with_context(|| format!("'{}' not found in city list", name)))
        .collect::<Result<Vec<CityId>>>()?;
    let target = to
        .as_deref()
        .map(|name| graph.resolve(name).with_context(|| format!("'{}' not found in city list", name)))
        .transpose()?;

    let engine = ShortestPathEngine::new(graph);

    let exporter = if no_write {
        None
    } else {
        Some(RouteExporter::new(&out_dir).with_context(|| format!("cannot write to {:?}", out_dir))?)
    };

    if let Some(exporter) = &exporter {
        metrics.start_phase("export");
        let edges = exporter.export_edges(engine.graph())?;
        metrics.record_export();
        exporter.export_meta(engine.graph(), source_ids[0])?;
        metrics.record_export();
        metrics.end_phase("export");
        println!("Graph data saved to {:?}", edges);
    }

    for (position, &source) in source_ids.iter().enumerate() {
        let cached = engine.is_cached(source);

        metrics.start_phase("solve");
        let outcome = engine.shortest_paths_from(source);
        metrics.end_phase("solve");

        match outcome {
            Ok(paths) => {
                print!("{}", report::render_distances(engine.graph(), &paths, cached));
                if let Some(target) = target {
                    println!("{}", report::render_route(engine.graph(), &paths, target));
                }

                if position == 0 {
                    if let Some(exporter) = &exporter {
                        metrics.start_phase("export");
                        let results = exporter.export_results(engine.graph(), &paths.distances)?;
                        metrics.record_export();
                        metrics.end_phase("export");
                        println!("Results saved to {:?}", results);
                    }
                }
            }
            Err(RouteError::NegativeCycle(cycle)) => {
                print!("{}", report::render_negative_cycle(engine.graph(), &cycle));
            }
            Err(e) => return Err(e.into()),
        }
    }

    let run_metrics = metrics.finalize(engine.stats());
    if print_metrics {
        println!("{}", serde_json::to_string_pretty(&run_metrics)?);
    }

    info!("Answered {} queries", source_ids.len());
    Ok(())
}
