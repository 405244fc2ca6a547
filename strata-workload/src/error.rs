//! Workload error taxonomy.
//!
//! Errors bubble up from the executor to its caller; the parallel runner
//! is the only layer that converts them into per-node values instead of
//! propagating. Callers attempt cleanup (object deletion) even on a
//! failure path, using whatever partial result was handed back.

use strata_core::{LayoutError, NodeName, ObjectId};
use strata_remote::RemoteError;
use strata_topology::TopologyError;
use thiserror::Error;

/// Errors that can occur while executing a workload.
#[derive(Debug, Error)]
pub enum WorkloadError {
    /// A caller error at the layout catalog boundary; reject, no retry.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// Topology resolution or lookup failed.
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// Remote transport failed before the engine could respond.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A local workload file could not be staged.
    #[error("failed to stage workload file: {0}")]
    Staging(#[from] std::io::Error),

    /// The engine signaled failure while writing an object.
    #[error("write of object {object} failed: {detail}")]
    ObjectWriteFailed {
        /// The object being written.
        object: ObjectId,
        /// Engine output describing the failure.
        detail: String,
    },

    /// The engine signaled failure while reading an object.
    #[error("read of object {object} failed: {detail}")]
    ObjectReadFailed {
        /// The object being read.
        object: ObjectId,
        /// Engine output describing the failure.
        detail: String,
    },

    /// The engine signaled failure while deleting an object.
    #[error("delete of object {object} failed: {detail}")]
    ObjectDeleteFailed {
        /// The object being deleted.
        object: ObjectId,
        /// Engine output describing the failure.
        detail: String,
    },

    /// The remote checksum utility could not produce a digest.
    #[error("checksum unavailable for {path} on {node}: {detail}")]
    ChecksumUnavailable {
        /// Node the checksum ran on.
        node: NodeName,
        /// Path that was being checksummed.
        path: String,
        /// Utility output describing the failure.
        detail: String,
    },

    /// Written and read-back content differ. Always fatal unless corruption
    /// was explicitly expected.
    #[error("object {object}: checksum mismatch (written {written}, read {read})")]
    ChecksumMismatch {
        /// The object whose round-trip failed.
        object: ObjectId,
        /// Digest of the written content.
        written: String,
        /// Digest of the read-back content.
        read: String,
    },

    /// Deliberately injected corruption came back byte-identical: the
    /// system under test failed to catch it. A correctness failure of the
    /// engine, not of this harness.
    #[error("object {object}: injected corruption was not detected by the engine")]
    CorruptionNotDetected {
        /// The object that was corrupted.
        object: ObjectId,
    },

    /// The requested client-process index does not exist on the node.
    #[error("node {node} has no client process at index {index}")]
    ClientProcessUnavailable {
        /// The node that was targeted.
        node: NodeName,
        /// The requested client-process index.
        index: usize,
    },

    /// The wall-clock budget lapsed before this node's unit completed.
    /// The underlying remote command is not forcibly terminated.
    #[error("wall-clock budget exhausted before node {node} completed")]
    BudgetExhausted {
        /// The node whose unit was abandoned.
        node: NodeName,
    },

    /// A per-node execution unit panicked; captured, never propagated.
    #[error("workload unit for node {node} panicked: {detail}")]
    UnitPanicked {
        /// The node whose unit panicked.
        node: NodeName,
        /// Panic payload, if it was a string.
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_object() {
        let err = WorkloadError::ObjectWriteFailed {
            object: ObjectId::new(1, 2),
            detail: "ERROR: out of space".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("1:2"));
        assert!(msg.contains("out of space"));
    }

    #[test]
    fn test_lower_taxa_wrap_transparently() {
        let err: WorkloadError = LayoutError::UnsupportedLayoutId(0).into();
        assert_eq!(err.to_string(), "unsupported layout id 0 (supported: 1..=14)");
    }
}
