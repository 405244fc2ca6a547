//! Strata Remote - command execution and file transfer collaborators.
//!
//! Everything the harness knows about the cluster it learns by running
//! commands on cluster nodes. This crate owns that boundary: the
//! [`RemoteExecutor`] trait, the SSH-backed production implementation, and
//! a scripted in-memory implementation used by the rest of the workspace
//! for tests. The same harness logic runs against either, which is what
//! makes the workload and topology crates testable without a live cluster.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod executor;
mod script;
mod ssh;

pub use executor::{CommandOutput, RemoteError, RemoteExecutor};
pub use script::ScriptedRemote;
pub use ssh::{SshConfig, SshRemote};
