//! Wire model of the engine's status query.
//!
//! `stratactl status --output json` returns the active configuration
//! profiles and, per node, the services running there. Only two service
//! kinds matter to the harness; anything else the engine reports is carried
//! as [`ServiceKind::Other`] and ignored, so newer engine builds with extra
//! services do not break resolution.

use serde::Deserialize;
use strata_core::{NodeName, ProfileId, ServiceId};

/// Top-level status payload.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusPayload {
    /// Active configuration profiles; the first entry is the live one.
    #[serde(default)]
    pub profiles: Vec<ProfileStatus>,
    /// Per-node service listings.
    #[serde(default)]
    pub nodes: Vec<NodeStatus>,
}

/// One configuration profile entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileStatus {
    /// Opaque profile token.
    pub id: String,
}

/// Status of one cluster node.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeStatus {
    /// Node name as minted by the cluster.
    pub name: String,
    /// Services running on this node, in reported order.
    #[serde(default)]
    pub services: Vec<ServiceStatus>,
}

/// One service entry on a node.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceStatus {
    /// What kind of service this is.
    pub name: ServiceKind,
    /// Network address of the service.
    pub endpoint: String,
    /// Opaque service identifier minted by the cluster.
    pub identifier: String,
    /// Coordinator marker; set on the admin service of the node currently
    /// holding cluster administrative responsibility.
    #[serde(default)]
    pub coordinator: bool,
}

/// The service kinds the harness recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ServiceKind {
    /// Per-node administrative/health service.
    #[serde(rename = "admin")]
    Admin,
    /// Per-node client I/O process issuing storage I/O for workloads.
    #[serde(rename = "io-proc")]
    IoProcess,
    /// Anything else the engine reports; ignored.
    #[serde(other)]
    Other,
}

impl StatusPayload {
    /// Parses the JSON status output.
    ///
    /// # Errors
    ///
    /// Returns the underlying serde error when the payload does not have
    /// the expected shape.
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Returns the live profile id, if any profile is active.
    #[must_use]
    pub fn live_profile(&self) -> Option<ProfileId> {
        self.profiles.first().map(|p| ProfileId::new(&p.id))
    }
}

impl NodeStatus {
    /// Returns this node's name as a typed token.
    #[must_use]
    pub fn node_name(&self) -> NodeName {
        NodeName::new(&self.name)
    }
}

impl ServiceStatus {
    /// Returns this service's identifier as a typed token.
    #[must_use]
    pub fn service_id(&self) -> ServiceId {
        ServiceId::new(&self.identifier)
    }
}
