//! Strata cluster validation harness binary.
//!
//! Resolves the live cluster topology over SSH, then drives verified object
//! I/O workloads on the selected nodes in parallel.
//!
//! # Smoke run against every node
//!
//! ```bash
//! strata-validate cluster-head.example.com
//! ```
//!
//! # Full sweep on two nodes, with a cluster restart first
//!
//! ```bash
//! strata-validate cluster-head.example.com --profile full \
//!     --node n1 --node n2 --restart --budget-secs 1800
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use strata_core::NodeName;
use strata_remote::{SshConfig, SshRemote};
use strata_topology::{
    CliOrchestrator, ClusterTopology, DisruptionController, DisruptionControllerConfig,
    TopologyResolver,
};
use strata_workload::{
    load_profile, ParallelRunner, SweepProfile, WorkloadExecutor, WorkloadOptions, WorkloadResult,
};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Strata cluster validation harness.
#[derive(Parser, Debug)]
#[command(name = "strata-validate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host to issue topology and orchestration queries on.
    query_host: String,

    /// Node to run workloads on. Can be specified multiple times; defaults
    /// to every node in the resolved topology.
    #[arg(long = "node")]
    nodes: Vec<String>,

    /// Built-in workload profile (smoke, full, corruption).
    #[arg(long, default_value = "smoke", conflicts_with = "profile_file")]
    profile: String,

    /// Load the workload profile from a TOML file instead.
    #[arg(long)]
    profile_file: Option<PathBuf>,

    /// Base seed for object ids and content; each node gets its own offset.
    /// Overrides the profile's seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Wall-clock budget in seconds for the whole fan-out. Unfinished nodes
    /// are reported as exhausted; their remote commands are not killed.
    #[arg(long)]
    budget_secs: Option<u64>,

    /// Restart the whole cluster (and re-resolve topology) before running.
    #[arg(long)]
    restart: bool,

    /// Seconds to wait between a healthy restart report and the topology
    /// refresh.
    #[arg(long, default_value = "30")]
    settle_secs: u64,

    /// SSH login user; defaults to the current user.
    #[arg(long)]
    user: Option<String>,

    /// SSH identity file.
    #[arg(long)]
    identity: Option<String>,

    /// Remote staging directory for workload files.
    #[arg(long, default_value = "/var/tmp/strata-validate")]
    staging_dir: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "validation run aborted");
            ExitCode::FAILURE
        }
    }
}

/// Runs the harness; `Ok(true)` means every node passed.
async fn run(args: Args) -> Result<bool, Box<dyn std::error::Error>> {
    let profile = resolve_profile(&args)?;
    let sweep = profile.sweep()?;
    let options = profile.options();
    let base_seed = args.seed.unwrap_or(profile.seed);

    info!(
        profile = %profile.name,
        entries = sweep.len(),
        seed = base_seed,
        "starting validation run"
    );

    let remote = Arc::new(SshRemote::new(SshConfig {
        user: args.user.clone(),
        identity_file: args.identity.clone(),
    }));
    let query_node = NodeName::new(args.query_host.as_str());
    let mut resolver = TopologyResolver::new(Arc::clone(&remote), query_node.clone());

    let mut topology = resolver.refresh().await?;

    if args.restart {
        // Drive the restart from the coordinator; endpoints resolved before
        // this point are invalid afterwards.
        let orchestrator = CliOrchestrator::new(Arc::clone(&remote), topology.coordinator().clone());
        let config = DisruptionControllerConfig {
            settle: Duration::from_secs(args.settle_secs),
        };
        let mut controller = DisruptionController::new(&orchestrator, &mut resolver, config);
        topology = controller.restart_cluster().await?;
    }

    let nodes = select_nodes(&args, &topology)?;
    let seeds: Arc<HashMap<NodeName, u64>> = Arc::new(
        nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.clone(), base_seed.wrapping_add(index as u64)))
            .collect(),
    );

    let mut runner = ParallelRunner::new();
    if let Some(secs) = args.budget_secs {
        runner = runner.with_budget(Duration::from_secs(secs));
    }

    let sweep = Arc::new(sweep);
    let staging_dir = Arc::new(args.staging_dir.clone());
    let results = runner
        .run_many(&nodes, |node| {
            let remote = Arc::clone(&remote);
            let topology = Arc::clone(&topology);
            let sweep = Arc::clone(&sweep);
            let staging_dir = Arc::clone(&staging_dir);
            let seed = seeds.get(&node).copied().unwrap_or(base_seed);
            async move {
                let mut executor = WorkloadExecutor::new(remote, topology, seed)
                    .with_staging_dir(staging_dir.as_str());
                run_node(&mut executor, &node, &sweep, &options).await
            }
        })
        .await;

    let mut all_passed = true;
    for (node, result) in &results {
        match result {
            Ok(result) => {
                info!(node = %node, objects = result.len(), "node passed");
                println!("{node}: PASS ({} objects)", result.len());
            }
            Err(error) => {
                all_passed = false;
                println!("{node}: FAIL ({error})");
            }
        }
    }
    Ok(all_passed)
}

/// Runs one node's sweep and cleans up whatever a failed run left behind.
async fn run_node(
    executor: &mut WorkloadExecutor<SshRemote>,
    node: &NodeName,
    sweep: &[(strata_core::BlockSize, u32)],
    options: &WorkloadOptions,
) -> Result<WorkloadResult, strata_workload::WorkloadError> {
    let mut outcome = executor.run_workload(node, sweep, options).await;

    if outcome.error.is_some() && options.cleanup {
        for record in outcome.result.records_mut() {
            if record.is_deleted() {
                continue;
            }
            if let Err(e) = executor.delete_object(record).await {
                warn!(node = %node, object = %record.id(), error = %e,
                    "cleanup of leftover object failed");
            }
        }
    }

    outcome.into_result()
}

fn resolve_profile(args: &Args) -> Result<SweepProfile, strata_workload::ProfileError> {
    match &args.profile_file {
        Some(path) => SweepProfile::from_file(path),
        None => load_profile(&args.profile),
    }
}

/// Resolves the node list: explicit `--node` flags, validated against the
/// topology, or every node in it.
fn select_nodes(
    args: &Args,
    topology: &ClusterTopology,
) -> Result<Vec<NodeName>, strata_topology::TopologyError> {
    if args.nodes.is_empty() {
        return Ok(topology.nodes().to_vec());
    }
    let nodes: Vec<NodeName> = args.nodes.iter().map(NodeName::new).collect();
    for node in &nodes {
        topology.endpoint_for(node)?;
    }
    Ok(nodes)
}
