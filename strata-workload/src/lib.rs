//! Strata Workload - verifiable object I/O against a live cluster.
//!
//! Drives write/read/delete workloads through the engine's own I/O utility
//! and verifies end-to-end data integrity with content checksums. The same
//! logic runs against a real cluster (SSH remote) or against the scripted
//! remote for tests.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use strata_core::NodeName;
//! use strata_remote::{SshConfig, SshRemote};
//! use strata_topology::TopologyResolver;
//! use strata_workload::{load_profile, ParallelRunner, WorkloadExecutor};
//!
//! let remote = Arc::new(SshRemote::new(SshConfig::default()));
//! let mut resolver = TopologyResolver::new(Arc::clone(&remote), NodeName::new("n1"));
//! let topology = resolver.refresh().await?;
//!
//! let profile = load_profile("smoke")?;
//! let mut executor = WorkloadExecutor::new(Arc::clone(&remote), topology, 42);
//! let outcome = executor
//!     .run_workload(&NodeName::new("n1"), &profile.sweep()?, &profile.options())
//!     .await;
//! assert!(outcome.error.is_none());
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod error;
mod executor;
mod integrity;
mod object;
mod parallel;
mod profiles;

pub use error::WorkloadError;
pub use executor::{
    CorruptionMode, ReadOutcome, WorkloadExecutor, WorkloadOptions, WorkloadOutcome,
    WriteRequest,
};
pub use integrity::{verify_roundtrip, Digest, IntegrityVerifier, ReadEvidence, VerifyOutcome};
pub use object::{ObjectRecord, ObjectState, WorkloadResult};
pub use parallel::ParallelRunner;
pub use profiles::{load_profile, ProfileError, SweepEntry, SweepProfile};
