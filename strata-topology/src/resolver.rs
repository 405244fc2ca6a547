//! Topology resolution against the live cluster.
//!
//! [`TopologyResolver`] owns the one cached topology handle for a run.
//! `refresh()` takes `&mut self`, which makes concurrent refreshes
//! unrepresentable in safe code; the resolved [`ClusterTopology`] is handed
//! out as an `Arc` and is immutable, so concurrent reads between refreshes
//! are safe by construction.

use std::sync::Arc;

use strata_core::NodeName;
use strata_remote::RemoteExecutor;
use tracing::{debug, info};

use crate::status::StatusPayload;
use crate::topology::{ClusterTopology, NodeEndpoint, TopologyError};

/// The engine's status query.
pub const STATUS_COMMAND: &str = "stratactl status --output json";

/// Resolves and caches the live cluster topology.
#[derive(Debug)]
pub struct TopologyResolver<R> {
    remote: Arc<R>,
    query_node: NodeName,
    current: Option<Arc<ClusterTopology>>,
}

impl<R: RemoteExecutor> TopologyResolver<R> {
    /// Creates a resolver that issues status queries on `query_node`.
    ///
    /// No topology is resolved until the first [`refresh`](Self::refresh).
    #[must_use]
    pub const fn new(remote: Arc<R>, query_node: NodeName) -> Self {
        Self {
            remote,
            query_node,
            current: None,
        }
    }

    /// Queries the cluster and replaces the cached topology wholesale.
    ///
    /// The previous topology (if any) stays in place until a complete
    /// replacement has been built, so a failed refresh never leaves a
    /// partial model behind - but after a cluster-level event the caller
    /// must treat a failed refresh as "no usable topology".
    ///
    /// # Errors
    ///
    /// - [`TopologyError::TopologyUnavailable`] if the query fails or its
    ///   payload cannot be shaped into a topology.
    /// - [`TopologyError::PrimaryNodeNotFound`] if no coordinator marker is
    ///   present.
    pub async fn refresh(&mut self) -> Result<Arc<ClusterTopology>, TopologyError> {
        debug!(query_node = %self.query_node, "refreshing cluster topology");

        let output = self
            .remote
            .execute(&self.query_node, STATUS_COMMAND)
            .await
            .map_err(|e| TopologyError::TopologyUnavailable {
                reason: format!("status query transport failure: {e}"),
            })?;

        if !output.success() {
            return Err(TopologyError::TopologyUnavailable {
                reason: format!(
                    "status query exited {}: {}",
                    output.exit_code,
                    output.stderr.trim()
                ),
            });
        }

        let payload = StatusPayload::parse(&output.stdout).map_err(|e| {
            TopologyError::TopologyUnavailable {
                reason: format!("unparseable status payload: {e}"),
            }
        })?;

        let topology = Arc::new(ClusterTopology::from_status(&payload)?);
        info!(
            profile = %topology.profile_id(),
            nodes = topology.nodes().len(),
            coordinator = %topology.coordinator(),
            "resolved cluster topology"
        );

        self.current = Some(Arc::clone(&topology));
        Ok(topology)
    }

    /// Drops the cached topology.
    ///
    /// After a cluster-level event the previous endpoints and process
    /// identifiers are unsafe even if the follow-up refresh fails, so the
    /// restart path invalidates before refreshing. Lookups fail with
    /// [`TopologyError::TopologyUnavailable`] until the next successful
    /// refresh.
    pub fn invalidate(&mut self) {
        self.current = None;
    }

    /// Returns the most recently resolved topology handle.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::TopologyUnavailable`] before the first
    /// successful refresh.
    pub fn current(&self) -> Result<Arc<ClusterTopology>, TopologyError> {
        self.current
            .as_ref()
            .map(Arc::clone)
            .ok_or_else(|| TopologyError::TopologyUnavailable {
                reason: "no topology resolved yet".to_string(),
            })
    }

    /// Returns the endpoints of `node` from the last-resolved topology.
    ///
    /// # Errors
    ///
    /// - [`TopologyError::TopologyUnavailable`] before the first refresh.
    /// - [`TopologyError::NodeNotInTopology`] if the node is absent.
    pub fn endpoints_for(&self, node: &NodeName) -> Result<NodeEndpoint, TopologyError> {
        let topology = self.current()?;
        topology.endpoint_for(node).cloned()
    }

    /// Returns the most recently resolved coordinator node.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::TopologyUnavailable`] before the first
    /// refresh.
    pub fn coordinator(&self) -> Result<NodeName, TopologyError> {
        Ok(self.current()?.coordinator().clone())
    }
}
