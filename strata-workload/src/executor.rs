//! Object I/O workload execution.
//!
//! Every object follows a one-way lifecycle driven by one remote
//! invocation per transition: `Created -> Written -> [ReadVerified] ->
//! [Deleted]`. The engine signals failures inside its output rather than
//! via exit codes alone, so each invocation's combined output is scanned
//! for known error signatures, and corruption-detected signals are kept
//! distinct from generic errors.

use std::io::Write as _;
use std::sync::Arc;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strata_core::{layout_for, BlockSize, NodeName, ObjectId, ProfileId};
use strata_remote::{CommandOutput, RemoteExecutor};
use strata_topology::{ClientProcess, ClusterTopology};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::WorkloadError;
use crate::integrity::{verify_roundtrip, IntegrityVerifier, ReadEvidence};
use crate::object::{ObjectRecord, WorkloadResult};

/// The engine's object I/O utility.
const IO_UTILITY: &str = "strata-io";

/// Default remote directory for staged source/destination files.
const STAGING_DIR_DEFAULT: &str = "/var/tmp/strata-validate";

/// Signatures the engine prints when an I/O utility invocation fails.
const ENGINE_ERROR_SIGNATURES: [&str; 3] = ["ERROR:", "FAILED:", "ABORTED:"];

/// Signatures the engine prints when its own integrity checking catches
/// corrupted content during a read.
const CORRUPTION_SIGNATURES: [&str; 2] = ["CORRUPTION DETECTED", "CHECKSUM VIOLATION"];

/// Chunk size for generating staged source files.
const STAGING_CHUNK_BYTES: usize = 64 * 1024;

/// Returns the first engine error signature found in the output, if any.
fn engine_error(output: &CommandOutput) -> Option<String> {
    let combined = output.combined();
    combined
        .lines()
        .find(|line| ENGINE_ERROR_SIGNATURES.iter().any(|sig| line.contains(sig)))
        .map(ToString::to_string)
}

/// Returns true if the output carries the engine's corruption signal.
fn corruption_signalled(output: &CommandOutput) -> bool {
    let combined = output.combined();
    CORRUPTION_SIGNATURES.iter().any(|sig| combined.contains(sig))
}

/// Everything the I/O utility needs to address one client process.
struct IoTarget<'a> {
    admin_addr: &'a str,
    client: &'a ClientProcess,
    profile: &'a ProfileId,
}

/// One object operation, rendered to an I/O utility command line.
///
/// A closed set: adding an operation kind forces every match over it to
/// be extended.
enum ObjectOp<'a> {
    Write {
        target: IoTarget<'a>,
        block_size: BlockSize,
        block_count: u32,
        object: ObjectId,
        source: &'a str,
        corrupt_block: Option<u32>,
    },
    Read {
        target: IoTarget<'a>,
        block_size: BlockSize,
        block_count: u32,
        object: ObjectId,
        dest: &'a str,
    },
    Delete {
        target: IoTarget<'a>,
        object: ObjectId,
    },
}

impl ObjectOp<'_> {
    /// Renders the full utility invocation.
    fn render(&self) -> String {
        let common = |target: &IoTarget<'_>| {
            format!(
                "--admin {} --proc {} --proc-id {} --profile {}",
                target.admin_addr, target.client.addr, target.client.id, target.profile
            )
        };

        match self {
            Self::Write {
                target,
                block_size,
                block_count,
                object,
                source,
                corrupt_block,
            } => {
                let mut cmd = format!(
                    "{IO_UTILITY} write {} --block-size {} --block-count {block_count} \
                     --layout {} --object {object} --source {source}",
                    common(target),
                    block_size.bytes(),
                    layout_for(*block_size),
                );
                if let Some(block) = corrupt_block {
                    cmd.push_str(&format!(" --corrupt-block {block}"));
                }
                cmd
            }
            Self::Read {
                target,
                block_size,
                block_count,
                object,
                dest,
            } => format!(
                "{IO_UTILITY} read {} --block-size {} --block-count {block_count} \
                 --layout {} --object {object} --dest {dest}",
                common(target),
                block_size.bytes(),
                layout_for(*block_size),
            ),
            Self::Delete { target, object } => {
                format!("{IO_UTILITY} delete {} --object {object}", common(target))
            }
        }
    }
}

/// Corruption-injection behavior for a workload run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptionMode {
    /// Write content as-is.
    #[default]
    Disabled,
    /// Write altered bytes at the start of the given block, then expect
    /// the engine to flag the discrepancy on read.
    InjectAtBlockBoundary {
        /// Zero-based block whose boundary is corrupted; clamped to the
        /// object's last block.
        block_index: u32,
    },
}

/// Per-run behavior switches.
#[derive(Debug, Clone, Copy)]
pub struct WorkloadOptions {
    /// Read every object back and verify its checksum.
    pub verify: bool,
    /// Delete every object after its lifecycle completes.
    pub cleanup: bool,
    /// Corruption-injection behavior.
    pub corruption: CorruptionMode,
}

impl Default for WorkloadOptions {
    fn default() -> Self {
        Self {
            verify: true,
            cleanup: true,
            corruption: CorruptionMode::Disabled,
        }
    }
}

/// Parameters for a single object write.
#[derive(Debug, Clone)]
pub struct WriteRequest<'a> {
    /// Node to write on.
    pub node: &'a NodeName,
    /// Block size of the object.
    pub block_size: BlockSize,
    /// Number of blocks.
    pub block_count: u32,
    /// Staged source file path on the node.
    pub source_path: &'a str,
    /// Object id; freshly generated when `None`.
    pub object_id: Option<ObjectId>,
    /// Client-process index on the node; first process when `None`.
    pub client_index: Option<usize>,
    /// Corruption injection for this write.
    pub corrupt_block: Option<u32>,
}

/// What a read produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The read completed; the destination file holds the content.
    Completed,
    /// The engine flagged corruption during the read (only reachable when
    /// corruption was expected).
    CorruptionDetected,
}

/// Result of one workload run: everything written, plus the error that
/// aborted the run, if any.
///
/// Kept separate from `Result` so a failed run still hands back the
/// partial record map for caller-side cleanup.
#[derive(Debug)]
pub struct WorkloadOutcome {
    /// All objects written before the run ended.
    pub result: WorkloadResult,
    /// The error that aborted the run, if it did not complete.
    pub error: Option<WorkloadError>,
}

impl WorkloadOutcome {
    /// Converts to a plain `Result`, dropping the partial record map on
    /// the error path. Use only when cleanup has already happened.
    ///
    /// # Errors
    ///
    /// Returns the error that aborted the run.
    pub fn into_result(self) -> Result<WorkloadResult, WorkloadError> {
        match self.error {
            None => Ok(self.result),
            Some(error) => Err(error),
        }
    }
}

/// Issues write/read/delete operations against the engine and drives
/// parameterized workload sweeps.
///
/// Holds an explicit topology handle resolved by the caller; after a
/// cluster disruption the caller must construct a new executor from the
/// re-resolved topology.
#[derive(Debug)]
pub struct WorkloadExecutor<R> {
    remote: Arc<R>,
    topology: Arc<ClusterTopology>,
    rng: ChaCha8Rng,
    staging_dir: String,
}

impl<R: RemoteExecutor> WorkloadExecutor<R> {
    /// Creates an executor over a resolved topology, with a seeded random
    /// source for object-id and content generation.
    #[must_use]
    pub fn new(remote: Arc<R>, topology: Arc<ClusterTopology>, seed: u64) -> Self {
        Self {
            remote,
            topology,
            rng: ChaCha8Rng::seed_from_u64(seed),
            staging_dir: STAGING_DIR_DEFAULT.to_string(),
        }
    }

    /// Overrides the remote staging directory.
    #[must_use]
    pub fn with_staging_dir(mut self, dir: impl Into<String>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    /// Returns the topology handle this executor operates against.
    #[must_use]
    pub fn topology(&self) -> &Arc<ClusterTopology> {
        &self.topology
    }

    fn target<'a>(
        &'a self,
        node: &NodeName,
        client_index: usize,
    ) -> Result<IoTarget<'a>, WorkloadError> {
        let endpoint = self.topology.endpoint_for(node)?;
        let client = endpoint.clients.get(client_index).ok_or_else(|| {
            WorkloadError::ClientProcessUnavailable {
                node: node.clone(),
                index: client_index,
            }
        })?;
        Ok(IoTarget {
            admin_addr: &endpoint.admin_addr,
            client,
            profile: self.topology.profile_id(),
        })
    }

    /// Writes one object.
    ///
    /// # Errors
    ///
    /// - [`WorkloadError::ObjectWriteFailed`] if the utility exits
    ///   non-zero or its output carries an engine error signature.
    /// - [`WorkloadError::ClientProcessUnavailable`] for a bad client
    ///   index; topology lookup errors pass through.
    pub async fn write_object(
        &mut self,
        request: WriteRequest<'_>,
    ) -> Result<ObjectRecord, WorkloadError> {
        let object = request
            .object_id
            .unwrap_or_else(|| ObjectId::generate(&mut self.rng));
        let client_index = request.client_index.unwrap_or(0);

        let mut record = ObjectRecord::new(
            object,
            request.node.clone(),
            client_index,
            request.block_size,
            request.block_count,
            request.source_path,
        );

        let command = ObjectOp::Write {
            target: self.target(request.node, client_index)?,
            block_size: request.block_size,
            block_count: request.block_count,
            object,
            source: request.source_path,
            corrupt_block: request.corrupt_block,
        }
        .render();

        debug!(node = %request.node, object = %object, "writing object");
        let output = self.remote.execute(request.node, &command).await?;

        if !output.success() {
            return Err(WorkloadError::ObjectWriteFailed {
                object,
                detail: format!("exited {}: {}", output.exit_code, output.stderr.trim()),
            });
        }
        if let Some(signature) = engine_error(&output) {
            return Err(WorkloadError::ObjectWriteFailed {
                object,
                detail: signature,
            });
        }

        record.mark_written();
        Ok(record)
    }

    /// Reads an object back to `dest_path` on its node.
    ///
    /// With `expect_corruption` the engine's corruption signal is a valid
    /// outcome; without it, any failure is [`WorkloadError::ObjectReadFailed`].
    ///
    /// # Errors
    ///
    /// Returns [`WorkloadError::ObjectReadFailed`] for engine failures and
    /// unexpected corruption signals.
    pub async fn read_object(
        &self,
        record: &ObjectRecord,
        dest_path: &str,
        expect_corruption: bool,
    ) -> Result<ReadOutcome, WorkloadError> {
        let object = record.id();
        let command = ObjectOp::Read {
            target: self.target(record.node(), record.client_index())?,
            block_size: record.block_size(),
            block_count: record.block_count(),
            object,
            dest: dest_path,
        }
        .render();

        debug!(node = %record.node(), object = %object, "reading object back");
        let output = self.remote.execute(record.node(), &command).await?;

        if corruption_signalled(&output) {
            if expect_corruption {
                info!(object = %object, "engine flagged injected corruption on read");
                return Ok(ReadOutcome::CorruptionDetected);
            }
            return Err(WorkloadError::ObjectReadFailed {
                object,
                detail: "unexpected engine corruption signal".to_string(),
            });
        }

        if !output.success() {
            return Err(WorkloadError::ObjectReadFailed {
                object,
                detail: format!("exited {}: {}", output.exit_code, output.stderr.trim()),
            });
        }
        if let Some(signature) = engine_error(&output) {
            return Err(WorkloadError::ObjectReadFailed {
                object,
                detail: signature,
            });
        }

        Ok(ReadOutcome::Completed)
    }

    /// Deletes an object from storage.
    ///
    /// Deleting twice is not attempted: the engine's behavior for a double
    /// delete is unspecified, so an already-deleted record is a no-op here.
    ///
    /// # Errors
    ///
    /// Returns [`WorkloadError::ObjectDeleteFailed`] if the utility exits
    /// non-zero or signals an engine error.
    pub async fn delete_object(&self, record: &mut ObjectRecord) -> Result<(), WorkloadError> {
        let object = record.id();
        if record.is_deleted() {
            debug!(object = %object, "object already deleted, skipping");
            return Ok(());
        }

        let command = ObjectOp::Delete {
            target: self.target(record.node(), record.client_index())?,
            object,
        }
        .render();

        debug!(node = %record.node(), object = %object, "deleting object");
        let output = self.remote.execute(record.node(), &command).await?;

        if !output.success() {
            return Err(WorkloadError::ObjectDeleteFailed {
                object,
                detail: format!("exited {}: {}", output.exit_code, output.stderr.trim()),
            });
        }
        if let Some(signature) = engine_error(&output) {
            return Err(WorkloadError::ObjectDeleteFailed {
                object,
                detail: signature,
            });
        }

        record.mark_deleted();
        Ok(())
    }

    /// Runs a full sweep on one node: for every (block size, block count)
    /// entry, write a fresh object, optionally read it back and verify,
    /// optionally delete it.
    ///
    /// The first error aborts the remaining steps, but everything written
    /// so far stays in the outcome so the caller can clean up.
    pub async fn run_workload(
        &mut self,
        node: &NodeName,
        sweep: &[(BlockSize, u32)],
        options: &WorkloadOptions,
    ) -> WorkloadOutcome {
        let mut result = WorkloadResult::new();

        info!(node = %node, entries = sweep.len(), "starting workload sweep");
        for &(block_size, block_count) in sweep {
            if let Err(error) = self
                .run_object(node, block_size, block_count, options, &mut result)
                .await
            {
                warn!(node = %node, %error, "workload sweep aborted");
                return WorkloadOutcome {
                    result,
                    error: Some(error),
                };
            }
        }

        info!(node = %node, objects = result.len(), "workload sweep complete");
        WorkloadOutcome {
            result,
            error: None,
        }
    }

    /// Drives the full lifecycle of one sweep object.
    async fn run_object(
        &mut self,
        node: &NodeName,
        block_size: BlockSize,
        block_count: u32,
        options: &WorkloadOptions,
        result: &mut WorkloadResult,
    ) -> Result<(), WorkloadError> {
        let object = ObjectId::generate(&mut self.rng);
        let (hi, lo) = object.parts();
        let remote_source = format!("{}/obj-{hi}-{lo}.src", self.staging_dir);
        let remote_dest = format!("{}/obj-{hi}-{lo}.dst", self.staging_dir);

        let staged = self.stage_source(block_size, block_count)?;
        self.remote
            .copy_to_remote(staged.path(), node, &remote_source)
            .await?;

        let corrupt_block = match options.corruption {
            CorruptionMode::Disabled => None,
            CorruptionMode::InjectAtBlockBoundary { block_index } => {
                Some(block_index.min(block_count.saturating_sub(1)))
            }
        };

        let mut record = self
            .write_object(WriteRequest {
                node,
                block_size,
                block_count,
                source_path: &remote_source,
                object_id: Some(object),
                client_index: None,
                corrupt_block,
            })
            .await?;

        // The record enters the result as soon as the write lands, so a
        // later failure still leaves it visible for cleanup.
        let steps = self
            .verify_and_cleanup(&mut record, &remote_source, &remote_dest, options, corrupt_block)
            .await;
        result.insert(record);
        steps
    }

    async fn verify_and_cleanup(
        &self,
        record: &mut ObjectRecord,
        remote_source: &str,
        remote_dest: &str,
        options: &WorkloadOptions,
        corrupt_block: Option<u32>,
    ) -> Result<(), WorkloadError> {
        let expect_corruption = corrupt_block.is_some();

        if options.verify {
            let verifier = IntegrityVerifier::new(Arc::clone(&self.remote));
            let written = verifier.checksum(record.node(), remote_source).await?;

            let evidence_digest;
            let evidence = match self
                .read_object(record, remote_dest, expect_corruption)
                .await?
            {
                ReadOutcome::Completed => {
                    evidence_digest = verifier.checksum(record.node(), remote_dest).await?;
                    ReadEvidence::Digest(&evidence_digest)
                }
                ReadOutcome::CorruptionDetected => ReadEvidence::EngineCorruptionSignal,
            };

            verify_roundtrip(record.id(), &written, evidence, expect_corruption)?;

            if let ReadEvidence::Digest(digest) = evidence {
                record.mark_verified(digest.clone());
            }
        }

        if options.cleanup {
            self.delete_object(record).await?;
        }

        Ok(())
    }

    /// Generates the staged source file: `block_size * block_count` bytes
    /// of seeded random content.
    fn stage_source(
        &mut self,
        block_size: BlockSize,
        block_count: u32,
    ) -> Result<NamedTempFile, WorkloadError> {
        let mut file = NamedTempFile::new()?;
        let total = block_size.bytes() * u64::from(block_count);

        let mut chunk = vec![0u8; STAGING_CHUNK_BYTES];
        let mut remaining = total;
        while remaining > 0 {
            let len = usize::try_from(remaining.min(STAGING_CHUNK_BYTES as u64))
                .unwrap_or(STAGING_CHUNK_BYTES);
            self.rng.fill_bytes(&mut chunk[..len]);
            file.write_all(&chunk[..len])?;
            remaining -= len as u64;
        }
        file.flush()?;

        debug!(bytes = total, "staged workload source file");
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_remote::ScriptedRemote;
    use strata_topology::StatusPayload;

    const STATUS: &str = r#"{
        "profiles": [{"id": "prof-1"}],
        "nodes": [
            {"name": "n1", "services": [
                {"name": "admin", "endpoint": "a1:7000", "identifier": "adm-1",
                 "coordinator": true},
                {"name": "io-proc", "endpoint": "a1:7101", "identifier": "iop-1a"},
                {"name": "io-proc", "endpoint": "a1:7102", "identifier": "iop-1b"}
            ]}
        ]
    }"#;

    fn topology() -> Arc<ClusterTopology> {
        let payload = StatusPayload::parse(STATUS).unwrap();
        Arc::new(ClusterTopology::from_status(&payload).unwrap())
    }

    fn executor(remote: Arc<ScriptedRemote>) -> WorkloadExecutor<ScriptedRemote> {
        WorkloadExecutor::new(remote, topology(), 42)
    }

    fn node() -> NodeName {
        NodeName::new("n1")
    }

    #[tokio::test]
    async fn test_write_renders_full_command() {
        let remote = Arc::new(ScriptedRemote::new());
        remote.respond("strata-io write", CommandOutput::ok("object stored"));

        let mut executor = executor(Arc::clone(&remote));
        let record = executor
            .write_object(WriteRequest {
                node: &node(),
                block_size: BlockSize::M1,
                block_count: 2,
                source_path: "/var/tmp/src",
                object_id: Some(ObjectId::new(11, 22)),
                client_index: None,
                corrupt_block: None,
            })
            .await
            .unwrap();

        assert_eq!(record.id(), ObjectId::new(11, 22));
        assert_eq!(record.state(), crate::object::ObjectState::Written);

        let (_, command) = remote.commands().pop().unwrap();
        assert!(command.contains("--admin a1:7000"));
        assert!(command.contains("--proc a1:7101"));
        assert!(command.contains("--proc-id iop-1a"));
        assert!(command.contains("--profile prof-1"));
        assert!(command.contains("--block-size 1048576"));
        assert!(command.contains("--block-count 2"));
        assert!(command.contains("--layout 9"));
        assert!(command.contains("--object 11:22"));
        assert!(command.contains("--source /var/tmp/src"));
        assert!(!command.contains("--corrupt-block"));
    }

    #[tokio::test]
    async fn test_write_uses_selected_client_process() {
        let remote = Arc::new(ScriptedRemote::new());
        remote.respond("strata-io write", CommandOutput::ok(""));

        let mut executor = executor(Arc::clone(&remote));
        executor
            .write_object(WriteRequest {
                node: &node(),
                block_size: BlockSize::K4,
                block_count: 1,
                source_path: "/var/tmp/src",
                object_id: None,
                client_index: Some(1),
                corrupt_block: None,
            })
            .await
            .unwrap();

        let (_, command) = remote.commands().pop().unwrap();
        assert!(command.contains("--proc a1:7102"));
        assert!(command.contains("--proc-id iop-1b"));
    }

    #[tokio::test]
    async fn test_write_engine_error_signature() {
        let remote = Arc::new(ScriptedRemote::new());
        remote.respond(
            "strata-io write",
            CommandOutput::ok("progress 50%\nERROR: device offline\n"),
        );

        let mut executor = executor(remote);
        let err = executor
            .write_object(WriteRequest {
                node: &node(),
                block_size: BlockSize::K4,
                block_count: 1,
                source_path: "/var/tmp/src",
                object_id: None,
                client_index: None,
                corrupt_block: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, WorkloadError::ObjectWriteFailed { .. }));
        assert!(err.to_string().contains("device offline"));
    }

    #[tokio::test]
    async fn test_bad_client_index() {
        let remote = Arc::new(ScriptedRemote::new());
        let mut executor = executor(remote);
        let err = executor
            .write_object(WriteRequest {
                node: &node(),
                block_size: BlockSize::K4,
                block_count: 1,
                source_path: "/var/tmp/src",
                object_id: None,
                client_index: Some(5),
                corrupt_block: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkloadError::ClientProcessUnavailable { index: 5, .. }
        ));
    }

    #[tokio::test]
    async fn test_unknown_node_fails_lookup() {
        let remote = Arc::new(ScriptedRemote::new());
        let mut executor = executor(remote);
        let err = executor
            .write_object(WriteRequest {
                node: &NodeName::new("n9"),
                block_size: BlockSize::K4,
                block_count: 1,
                source_path: "/var/tmp/src",
                object_id: None,
                client_index: None,
                corrupt_block: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkloadError::Topology(strata_topology::TopologyError::NodeNotInTopology { .. })
        ));
    }

    #[tokio::test]
    async fn test_read_classifies_corruption_signal() {
        let remote = Arc::new(ScriptedRemote::new());
        remote.respond(
            "strata-io read",
            CommandOutput::failed(1, "CORRUPTION DETECTED at block 1"),
        );

        let executor = executor(remote);
        let record = ObjectRecord::new(
            ObjectId::new(1, 1),
            node(),
            0,
            BlockSize::K4,
            4,
            "/var/tmp/src",
        );

        // Expected: a valid outcome.
        let outcome = executor
            .read_object(&record, "/var/tmp/dst", true)
            .await
            .unwrap();
        assert_eq!(outcome, ReadOutcome::CorruptionDetected);

        // Unexpected: a hard failure.
        let err = executor
            .read_object(&record, "/var/tmp/dst", false)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkloadError::ObjectReadFailed { .. }));
    }

    #[tokio::test]
    async fn test_delete_skips_already_deleted() {
        let remote = Arc::new(ScriptedRemote::new());
        remote.respond("strata-io delete", CommandOutput::ok(""));

        let executor = executor(Arc::clone(&remote));
        let mut record = ObjectRecord::new(
            ObjectId::new(1, 1),
            node(),
            0,
            BlockSize::K4,
            4,
            "/var/tmp/src",
        );
        record.mark_written();

        executor.delete_object(&mut record).await.unwrap();
        assert!(record.is_deleted());
        assert_eq!(remote.commands().len(), 1);

        // Second delete never reaches the engine.
        executor.delete_object(&mut record).await.unwrap();
        assert_eq!(remote.commands().len(), 1);
    }

    #[tokio::test]
    async fn test_run_workload_full_sweep() {
        let remote = Arc::new(ScriptedRemote::new());
        remote.respond("strata-io write", CommandOutput::ok("stored"));
        remote.respond("strata-io read", CommandOutput::ok("retrieved"));
        remote.respond("strata-io delete", CommandOutput::ok("removed"));
        remote.respond("md5sum", CommandOutput::ok("feedface  /some/path\n"));

        let mut executor = executor(Arc::clone(&remote));
        let sweep = [(BlockSize::K4, 1), (BlockSize::M1, 2)];
        let outcome = executor
            .run_workload(&node(), &sweep, &WorkloadOptions::default())
            .await;

        assert!(outcome.error.is_none());
        assert_eq!(outcome.result.len(), 2);
        for record in outcome.result.records() {
            assert!(record.is_deleted());
            assert_eq!(record.checksum().unwrap().as_str(), "feedface");
        }
        // One staged upload per object.
        assert_eq!(remote.uploads().len(), 2);
    }

    #[tokio::test]
    async fn test_run_workload_preserves_partial_result_on_failure() {
        let remote = Arc::new(ScriptedRemote::new());
        // First write succeeds, second hits an engine error.
        remote.respond_once("strata-io write", CommandOutput::ok("stored"));
        remote.respond("strata-io write", CommandOutput::ok("ERROR: quota exceeded"));
        remote.respond("strata-io read", CommandOutput::ok("retrieved"));
        remote.respond("md5sum", CommandOutput::ok("feedface  /p\n"));

        let mut executor = executor(remote);
        let sweep = [(BlockSize::K4, 1), (BlockSize::K8, 1), (BlockSize::K16, 1)];
        let options = WorkloadOptions {
            cleanup: false,
            ..WorkloadOptions::default()
        };
        let outcome = executor.run_workload(&node(), &sweep, &options).await;

        // The first object survives for cleanup; the failed one was never
        // written; the third was never attempted.
        assert_eq!(outcome.result.len(), 1);
        let error = outcome.error.unwrap();
        assert!(matches!(error, WorkloadError::ObjectWriteFailed { .. }));
        assert!(error.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_run_workload_corruption_mode() {
        let remote = Arc::new(ScriptedRemote::new());
        remote.respond("strata-io write", CommandOutput::ok("stored"));
        remote.respond(
            "strata-io read",
            CommandOutput::failed(1, "CHECKSUM VIOLATION block 0"),
        );
        remote.respond("md5sum", CommandOutput::ok("feedface  /p\n"));
        remote.respond("strata-io delete", CommandOutput::ok(""));

        let mut executor = executor(Arc::clone(&remote));
        let options = WorkloadOptions {
            corruption: CorruptionMode::InjectAtBlockBoundary { block_index: 3 },
            ..WorkloadOptions::default()
        };
        let outcome = executor
            .run_workload(&node(), &[(BlockSize::K4, 2)], &options)
            .await;

        assert!(outcome.error.is_none(), "error: {:?}", outcome.error);
        assert_eq!(outcome.result.len(), 1);

        // block_index clamps to the last block of a 2-block object.
        let write_cmd = remote
            .commands()
            .iter()
            .find(|(_, c)| c.contains("write"))
            .map(|(_, c)| c.clone())
            .unwrap();
        assert!(write_cmd.contains("--corrupt-block 1"));
    }

    #[tokio::test]
    async fn test_run_workload_silent_corruption_is_caught() {
        let remote = Arc::new(ScriptedRemote::new());
        remote.respond("strata-io write", CommandOutput::ok("stored"));
        // Read succeeds and content comes back identical: the engine
        // missed the injected corruption.
        remote.respond("strata-io read", CommandOutput::ok("retrieved"));
        remote.respond("md5sum", CommandOutput::ok("feedface  /p\n"));

        let mut executor = executor(remote);
        let options = WorkloadOptions {
            cleanup: false,
            corruption: CorruptionMode::InjectAtBlockBoundary { block_index: 0 },
            ..WorkloadOptions::default()
        };
        let outcome = executor
            .run_workload(&node(), &[(BlockSize::K4, 1)], &options)
            .await;

        assert!(matches!(
            outcome.error,
            Some(WorkloadError::CorruptionNotDetected { .. })
        ));
        // The written object is still in the result for cleanup.
        assert_eq!(outcome.result.len(), 1);
    }

    #[test]
    fn test_engine_error_scans_all_signatures() {
        for sig in ["ERROR: x", "FAILED: y", "ABORTED: z"] {
            let output = CommandOutput::ok(format!("ok\n{sig}\n"));
            assert_eq!(engine_error(&output).unwrap(), sig);
        }
        assert!(engine_error(&CommandOutput::ok("all good")).is_none());
    }
}
