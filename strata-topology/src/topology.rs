//! The immutable in-memory cluster model.
//!
//! A [`ClusterTopology`] is built wholesale from one status payload and
//! never mutated afterwards. Conversion validates the full shape up front:
//! if any node is missing its administrative service the whole conversion
//! fails, so callers can never observe a partially-populated topology.

use std::collections::HashMap;

use strata_core::{NodeName, ProfileId, ServiceId};
use thiserror::Error;

use crate::status::{ServiceKind, StatusPayload};

/// Errors in topology resolution and lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// The status query failed or returned data that cannot be shaped into
    /// a topology. Transient: the caller may retry.
    #[error("cluster topology unavailable: {reason}")]
    TopologyUnavailable {
        /// What went wrong with the query or its payload.
        reason: String,
    },

    /// No coordinator marker anywhere in the status payload. Fatal for
    /// coordinator-dependent operations.
    #[error("no coordinator marker present in cluster status")]
    PrimaryNodeNotFound,

    /// The requested node is absent from the last-resolved topology.
    /// A caller/configuration error, not a cluster fault.
    #[error("node '{node}' is not in the resolved topology")]
    NodeNotInTopology {
        /// The node that was requested.
        node: NodeName,
    },

    /// A cluster-wide restart did not leave the cluster usable. Fatal;
    /// aborts the remaining workload for the run.
    #[error("cluster restart failed: {reason}")]
    ClusterRestartFailed {
        /// Why the restart was declared failed.
        reason: String,
    },
}

/// A per-node client I/O process: address plus cluster-minted identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientProcess {
    /// Network address of the process.
    pub addr: String,
    /// Opaque identifier, passed back verbatim to the I/O utilities.
    pub id: ServiceId,
}

/// Resolved endpoints of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEndpoint {
    /// Address of the administrative/health service.
    pub admin_addr: String,
    /// Identifier of the administrative service.
    pub admin_id: ServiceId,
    /// Client I/O processes, in the order the cluster reported them.
    pub clients: Vec<ClientProcess>,
}

/// The resolved shape of the cluster at one instant.
///
/// Immutable between refreshes; shared read-only across concurrent
/// workload executions via `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterTopology {
    profile_id: ProfileId,
    nodes: Vec<NodeName>,
    endpoints: HashMap<NodeName, NodeEndpoint>,
    coordinator: NodeName,
}

impl ClusterTopology {
    /// Builds a topology from a parsed status payload.
    ///
    /// # Errors
    ///
    /// - [`TopologyError::TopologyUnavailable`] if the payload has no live
    ///   profile, no nodes, a duplicate node name, or a node without an
    ///   administrative service.
    /// - [`TopologyError::PrimaryNodeNotFound`] if no admin service carries
    ///   the coordinator marker.
    pub fn from_status(payload: &StatusPayload) -> Result<Self, TopologyError> {
        let profile_id = payload
            .live_profile()
            .ok_or_else(|| unavailable("status payload has no active profile"))?;

        if payload.nodes.is_empty() {
            return Err(unavailable("status payload lists no nodes"));
        }

        let mut nodes = Vec::with_capacity(payload.nodes.len());
        let mut endpoints = HashMap::with_capacity(payload.nodes.len());
        let mut coordinator: Option<NodeName> = None;

        for node in &payload.nodes {
            let name = node.node_name();

            let mut admin = None;
            let mut clients = Vec::new();
            for service in &node.services {
                match service.name {
                    ServiceKind::Admin => {
                        if service.coordinator {
                            coordinator = Some(name.clone());
                        }
                        admin = Some((service.endpoint.clone(), service.service_id()));
                    }
                    ServiceKind::IoProcess => clients.push(ClientProcess {
                        addr: service.endpoint.clone(),
                        id: service.service_id(),
                    }),
                    ServiceKind::Other => {}
                }
            }

            let (admin_addr, admin_id) = admin.ok_or_else(|| {
                unavailable(&format!("node '{name}' reports no admin service"))
            })?;

            let endpoint = NodeEndpoint {
                admin_addr,
                admin_id,
                clients,
            };
            if endpoints.insert(name.clone(), endpoint).is_some() {
                return Err(unavailable(&format!("duplicate node name '{name}'")));
            }
            nodes.push(name);
        }

        let coordinator = coordinator.ok_or(TopologyError::PrimaryNodeNotFound)?;

        Ok(Self {
            profile_id,
            nodes,
            endpoints,
            coordinator,
        })
    }

    /// Returns the active configuration profile id.
    #[must_use]
    pub const fn profile_id(&self) -> &ProfileId {
        &self.profile_id
    }

    /// Returns the node names, in reported order.
    #[must_use]
    pub fn nodes(&self) -> &[NodeName] {
        &self.nodes
    }

    /// Returns the coordinator node name.
    #[must_use]
    pub const fn coordinator(&self) -> &NodeName {
        &self.coordinator
    }

    /// Returns the endpoints of `node`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::NodeNotInTopology`] if the node is absent.
    pub fn endpoint_for(&self, node: &NodeName) -> Result<&NodeEndpoint, TopologyError> {
        self.endpoints
            .get(node)
            .ok_or_else(|| TopologyError::NodeNotInTopology { node: node.clone() })
    }
}

fn unavailable(reason: &str) -> TopologyError {
    TopologyError::TopologyUnavailable {
        reason: reason.to_string(),
    }
}
