//! Cluster-wide disruption control.
//!
//! A cluster restart invalidates every previously resolved endpoint and
//! client-process identifier, so the controller always re-resolves topology
//! after the orchestrator reports the cluster back. Skipping that refresh
//! is a latent bug: the old identifiers may still "work" against recycled
//! ports while addressing the wrong processes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use strata_core::NodeName;
use strata_remote::RemoteExecutor;
use tracing::{info, warn};

use crate::resolver::TopologyResolver;
use crate::topology::{ClusterTopology, TopologyError};

/// Cluster health as reported by the orchestration collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// All nodes and services are up.
    Healthy,
    /// The cluster came back but is not fully serviceable.
    Degraded(String),
}

/// The orchestration/restart collaborator.
#[async_trait]
pub trait ClusterOrchestrator: Send + Sync {
    /// Triggers a cluster-wide restart and blocks until the orchestrator
    /// can report a health status.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::ClusterRestartFailed`] when the restart
    /// could not be driven at all.
    async fn restart_cluster(&self) -> Result<HealthStatus, TopologyError>;
}

/// Orchestrator backed by the engine's own CLI.
#[derive(Debug)]
pub struct CliOrchestrator<R> {
    remote: Arc<R>,
    node: NodeName,
}

impl<R: RemoteExecutor> CliOrchestrator<R> {
    /// Restart command issued to the engine.
    pub const RESTART_COMMAND: &'static str = "stratactl cluster restart --all";
    /// Health query issued after the restart returns.
    pub const HEALTH_COMMAND: &'static str = "stratactl cluster health";

    /// Creates an orchestrator that drives the restart from `node`.
    #[must_use]
    pub const fn new(remote: Arc<R>, node: NodeName) -> Self {
        Self { remote, node }
    }
}

#[async_trait]
impl<R: RemoteExecutor> ClusterOrchestrator for CliOrchestrator<R> {
    async fn restart_cluster(&self) -> Result<HealthStatus, TopologyError> {
        let restart = self
            .remote
            .execute(&self.node, Self::RESTART_COMMAND)
            .await
            .map_err(|e| restart_failed(format!("restart transport failure: {e}")))?;
        if !restart.success() {
            return Err(restart_failed(format!(
                "restart command exited {}: {}",
                restart.exit_code,
                restart.stderr.trim()
            )));
        }

        let health = self
            .remote
            .execute(&self.node, Self::HEALTH_COMMAND)
            .await
            .map_err(|e| restart_failed(format!("health query transport failure: {e}")))?;
        if !health.success() {
            return Err(restart_failed(format!(
                "health query exited {}: {}",
                health.exit_code,
                health.stderr.trim()
            )));
        }

        if health.stdout.trim() == "HEALTHY" {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded(health.stdout.trim().to_string()))
        }
    }
}

/// Settings for [`DisruptionController`].
#[derive(Debug, Clone, Copy)]
pub struct DisruptionControllerConfig {
    /// Fixed delay between the orchestrator reporting healthy and the
    /// topology refresh. A heuristic, not a readiness poll: services can
    /// report healthy shortly before they accept I/O. Known gap - a
    /// poll-until-ready loop may replace this once the engine exposes a
    /// reliable readiness signal.
    pub settle: Duration,
}

impl Default for DisruptionControllerConfig {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(30),
        }
    }
}

/// Drives cluster-wide restarts and forces topology re-resolution.
///
/// Must not run concurrently with in-flight workload operations; no
/// internal mutual exclusion is provided. The exclusive borrow of the
/// resolver covers the refresh, but callers are responsible for quiescing
/// workloads first.
#[derive(Debug)]
pub struct DisruptionController<'a, O, R> {
    orchestrator: &'a O,
    resolver: &'a mut TopologyResolver<R>,
    config: DisruptionControllerConfig,
}

impl<'a, O, R> DisruptionController<'a, O, R>
where
    O: ClusterOrchestrator,
    R: RemoteExecutor,
{
    /// Creates a controller over the given orchestrator and resolver.
    pub fn new(
        orchestrator: &'a O,
        resolver: &'a mut TopologyResolver<R>,
        config: DisruptionControllerConfig,
    ) -> Self {
        Self {
            orchestrator,
            resolver,
            config,
        }
    }

    /// Restarts the whole cluster and re-resolves topology.
    ///
    /// Fatal on any failure; there is no retry at this layer. On success
    /// the returned topology is the only valid handle - endpoints and
    /// process identifiers from before the restart must be discarded. The
    /// resolver's cache is invalidated as part of the restart, so on
    /// failure it holds no topology rather than the stale pre-restart one.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::ClusterRestartFailed`] if the orchestrator
    /// fails, reports a degraded cluster, or the post-restart topology
    /// refresh fails.
    pub async fn restart_cluster(&mut self) -> Result<Arc<ClusterTopology>, TopologyError> {
        info!("restarting cluster");
        let health = self.orchestrator.restart_cluster().await?;

        match health {
            HealthStatus::Healthy => {}
            HealthStatus::Degraded(detail) => {
                warn!(detail, "cluster degraded after restart");
                return Err(restart_failed(format!("cluster degraded: {detail}")));
            }
        }

        // The restart invalidated every pre-restart endpoint and process
        // identifier; drop them now so a failed refresh cannot leave the
        // resolver serving the stale topology.
        self.resolver.invalidate();

        tokio::time::sleep(self.config.settle).await;

        self.resolver.refresh().await.map_err(|e| {
            restart_failed(format!("post-restart topology refresh failed: {e}"))
        })
    }
}

fn restart_failed(reason: String) -> TopologyError {
    TopologyError::ClusterRestartFailed { reason }
}
