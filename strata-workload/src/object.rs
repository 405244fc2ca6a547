//! Per-object lifecycle records and the per-run result map.
//!
//! An [`ObjectRecord`] is created when an object is written and mutated as
//! read-back and deletion happen. Records are never removed: they live for
//! the duration of the run so the caller can clean up and report, even
//! after a failure. The `Deleted` state tracks storage-side deletion only.

use std::collections::btree_map;
use std::collections::BTreeMap;

use strata_core::{BlockSize, NodeName, ObjectId};

use crate::integrity::Digest;

/// Lifecycle of one workload object. Transitions are one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    /// Record created, write not yet acknowledged.
    Created,
    /// Write acknowledged by the engine.
    Written,
    /// Read back and checksum-verified.
    ReadVerified,
    /// Deleted from storage. The record itself survives.
    Deleted,
}

/// One object written during a workload run.
#[derive(Debug, Clone)]
pub struct ObjectRecord {
    id: ObjectId,
    node: NodeName,
    client_index: usize,
    block_size: BlockSize,
    block_count: u32,
    remote_source: String,
    checksum: Option<Digest>,
    state: ObjectState,
}

impl ObjectRecord {
    /// Creates a record in the `Created` state.
    #[must_use]
    pub fn new(
        id: ObjectId,
        node: NodeName,
        client_index: usize,
        block_size: BlockSize,
        block_count: u32,
        remote_source: impl Into<String>,
    ) -> Self {
        Self {
            id,
            node,
            client_index,
            block_size,
            block_count,
            remote_source: remote_source.into(),
            checksum: None,
            state: ObjectState::Created,
        }
    }

    /// Returns the object id.
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Returns the node the object was written on.
    #[must_use]
    pub const fn node(&self) -> &NodeName {
        &self.node
    }

    /// Returns the client-process index used for this object's I/O.
    #[must_use]
    pub const fn client_index(&self) -> usize {
        self.client_index
    }

    /// Returns the block size.
    #[must_use]
    pub const fn block_size(&self) -> BlockSize {
        self.block_size
    }

    /// Returns the block count.
    #[must_use]
    pub const fn block_count(&self) -> u32 {
        self.block_count
    }

    /// Returns the staged source path on the node.
    #[must_use]
    pub fn remote_source(&self) -> &str {
        &self.remote_source
    }

    /// Returns the read-back digest, if a verified read was performed.
    #[must_use]
    pub const fn checksum(&self) -> Option<&Digest> {
        self.checksum.as_ref()
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ObjectState {
        self.state
    }

    /// Returns true if the object was deleted from storage.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.state == ObjectState::Deleted
    }

    /// Marks the write acknowledged. Only valid from `Created`.
    pub fn mark_written(&mut self) {
        if self.state == ObjectState::Created {
            self.state = ObjectState::Written;
        }
    }

    /// Records a verified read-back digest. Only valid from `Written`.
    pub fn mark_verified(&mut self, digest: Digest) {
        if self.state == ObjectState::Written {
            self.checksum = Some(digest);
            self.state = ObjectState::ReadVerified;
        }
    }

    /// Marks the object deleted from storage. Valid from `Written` or
    /// `ReadVerified`; never reversed.
    pub fn mark_deleted(&mut self) {
        if matches!(self.state, ObjectState::Written | ObjectState::ReadVerified) {
            self.state = ObjectState::Deleted;
        }
    }
}

/// All objects touched by one workload run, keyed by object id.
///
/// Owned by the caller once returned; records persist for cleanup and
/// reporting regardless of how the run ended.
#[derive(Debug, Default)]
pub struct WorkloadResult {
    records: BTreeMap<ObjectId, ObjectRecord>,
}

impl WorkloadResult {
    /// Creates an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, keyed by its object id.
    pub fn insert(&mut self, record: ObjectRecord) {
        self.records.insert(record.id(), record);
    }

    /// Returns the record for an object id.
    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<&ObjectRecord> {
        self.records.get(id)
    }

    /// Returns the number of objects touched.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no objects were touched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates records in object-id order.
    pub fn records(&self) -> impl Iterator<Item = &ObjectRecord> {
        self.records.values()
    }

    /// Iterates records mutably, for caller-side cleanup.
    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut ObjectRecord> {
        self.records.values_mut()
    }
}

impl IntoIterator for WorkloadResult {
    type Item = (ObjectId, ObjectRecord);
    type IntoIter = btree_map::IntoIter<ObjectId, ObjectRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ObjectRecord {
        ObjectRecord::new(
            ObjectId::new(1, 2),
            NodeName::new("n1"),
            0,
            BlockSize::K4,
            4,
            "/var/tmp/obj-1-2.src",
        )
    }

    #[test]
    fn test_lifecycle_one_way() {
        let mut rec = record();
        assert_eq!(rec.state(), ObjectState::Created);

        rec.mark_written();
        assert_eq!(rec.state(), ObjectState::Written);

        rec.mark_verified(Digest::new("abc"));
        assert_eq!(rec.state(), ObjectState::ReadVerified);
        assert_eq!(rec.checksum().unwrap().as_str(), "abc");

        rec.mark_deleted();
        assert!(rec.is_deleted());

        // No transition reverses.
        rec.mark_written();
        rec.mark_verified(Digest::new("xyz"));
        assert!(rec.is_deleted());
        assert_eq!(rec.checksum().unwrap().as_str(), "abc");
    }

    #[test]
    fn test_verify_requires_written() {
        let mut rec = record();
        rec.mark_verified(Digest::new("abc"));
        assert_eq!(rec.state(), ObjectState::Created);
        assert!(rec.checksum().is_none());
    }

    #[test]
    fn test_delete_requires_written() {
        let mut rec = record();
        rec.mark_deleted();
        assert_eq!(rec.state(), ObjectState::Created);
    }

    #[test]
    fn test_result_keyed_by_object_id() {
        let mut result = WorkloadResult::new();
        let rec = record();
        let id = rec.id();
        result.insert(rec);

        assert_eq!(result.len(), 1);
        assert!(result.get(&id).is_some());
        assert!(result.get(&ObjectId::new(9, 9)).is_none());
    }
}
