//! Strata Topology - live cluster state resolution.
//!
//! The cluster's shape (nodes, administrative endpoints, client I/O
//! processes, active configuration profile, coordinator) is discovered at
//! runtime by querying the engine's status utility and parsed into an
//! immutable [`ClusterTopology`]. The resolver rebuilds that model
//! wholesale on every refresh: after any cluster-level event the old
//! endpoints and process identifiers are unsafe to mix with fresh ones, so
//! partial merges are never performed.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod disruption;
mod resolver;
mod status;
mod topology;

pub use disruption::{
    CliOrchestrator, ClusterOrchestrator, DisruptionController, DisruptionControllerConfig,
    HealthStatus,
};
pub use resolver::{TopologyResolver, STATUS_COMMAND};
pub use status::{NodeStatus, ProfileStatus, ServiceKind, ServiceStatus, StatusPayload};
pub use topology::{ClientProcess, ClusterTopology, NodeEndpoint, TopologyError};
