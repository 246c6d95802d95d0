use clap::{Parser, Subcommand, ValueEnum};
use eagle_core::{Node, Pod};
use eagle_scheduler::{Registry, ScheduleResult, Scheduler, SchedulerConfig, Snapshot};
use serde::Deserialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "eagle", about = "Eagle resource-balanced pod scheduler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick a node for a pod against a cluster snapshot
    Schedule {
        /// Pod manifest (YAML)
        #[arg(long)]
        pod: PathBuf,
        /// Cluster manifest (YAML) with `nodes` and bound `pods`
        #[arg(long)]
        cluster: PathBuf,
        /// Scheduler profile (YAML)
        #[arg(long, env = "EAGLE_CONFIG")]
        config: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
    /// List the registered plugins
    Plugins,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Nodes of the cluster and the pods already bound to them
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClusterManifest {
    nodes: Vec<Node>,
    pods: Vec<Pod>,
}

fn main() -> miette::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Schedule {
            pod,
            cluster,
            config,
            output,
        } => {
            let result = run_schedule(&pod, &cluster, config.as_deref())?;
            let rendered = match output {
                OutputFormat::Text => render_text(&result),
                OutputFormat::Json => eagle_core::to_json_pretty(&result)?,
            };
            println!("{}", rendered);
            Ok(())
        }
        Commands::Plugins => {
            for name in Registry::with_defaults().names() {
                println!("{}", name);
            }
            Ok(())
        }
    }
}

/// Load the inputs and run one scheduling decision
fn run_schedule(
    pod_path: &Path,
    cluster_path: &Path,
    config_path: Option<&Path>,
) -> miette::Result<ScheduleResult> {
    let config = match config_path {
        Some(path) => {
            info!("Loading scheduler profile from {}", path.display());
            SchedulerConfig::from_file(path)?
        }
        None => SchedulerConfig::default(),
    };

    let pod: Pod = eagle_core::from_yaml(&read_file(pod_path)?)?;
    let cluster: ClusterManifest = eagle_core::from_yaml(&read_file(cluster_path)?)?;

    let snapshot = Snapshot::new(cluster.nodes, &cluster.pods, config.feature_gates.pod_overhead)?;
    let scheduler = Scheduler::new(config, &Registry::with_defaults())?;

    Ok(scheduler.schedule_pod(&pod, snapshot)?)
}

fn read_file(path: &Path) -> miette::Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| miette::miette!("Failed to read '{}': {}", path.display(), e))
}

/// Human readable summary: selected node, scores, then rejected nodes
fn render_text(result: &ScheduleResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Selected node: {}", result.suggested_host);
    let _ = writeln!(
        out,
        "Feasible nodes: {}/{}",
        result.feasible_nodes, result.evaluated_nodes
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "{:<32} {:>8}", "NODE", "SCORE");
    for score in &result.scores {
        let _ = writeln!(out, "{:<32} {:>8}", score.name, score.score);
    }

    let rejected: Vec<_> = result.filter_results.iter().filter(|r| !r.passed).collect();
    if !rejected.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{:<32} {:<16} REASONS", "REJECTED", "PLUGIN");
        for r in rejected {
            let _ = writeln!(
                out,
                "{:<32} {:<16} {}",
                r.node_name,
                r.plugin.as_deref().unwrap_or("-"),
                r.reasons.join(", ")
            );
        }
    }

    out.trim_end().to_string()
}
