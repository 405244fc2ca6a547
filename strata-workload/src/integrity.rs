//! Content-checksum integrity verification.
//!
//! Digests are computed on the node that holds the file, by the standard
//! checksum utility, so no file content ever crosses back to the harness.
//! The round-trip check distinguishes a genuine mismatch from the expected
//! outcome of a corruption-injection run: there, the *absence* of a
//! mismatch is the failure.

use std::fmt;
use std::sync::Arc;

use strata_core::{NodeName, ObjectId};
use strata_remote::RemoteExecutor;
use tracing::debug;

use crate::error::WorkloadError;

/// Remote checksum utility.
pub const CHECKSUM_UTILITY: &str = "md5sum";

/// A content digest, as printed by the checksum utility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest(String);

impl Digest {
    /// Wraps a raw digest string.
    #[must_use]
    pub fn new(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// Returns the raw digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the read step produced, as evidence for the round-trip check.
#[derive(Debug, Clone, Copy)]
pub enum ReadEvidence<'a> {
    /// The read completed and this is the digest of what came back.
    Digest(&'a Digest),
    /// The read did not complete because the engine itself flagged
    /// corruption - distinguished from a generic tool error.
    EngineCorruptionSignal,
}

/// Successful outcomes of a round-trip verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Digests matched, no corruption expected.
    Match,
    /// Corruption was expected and the digests did differ.
    MismatchObserved,
    /// Corruption was expected and the engine flagged it during the read.
    EngineDetected,
}

/// Computes and compares content checksums over the remote collaborator.
#[derive(Debug)]
pub struct IntegrityVerifier<R> {
    remote: Arc<R>,
}

impl<R: RemoteExecutor> IntegrityVerifier<R> {
    /// Creates a verifier over the given remote.
    #[must_use]
    pub const fn new(remote: Arc<R>) -> Self {
        Self { remote }
    }

    /// Computes the digest of `path` on `node`.
    ///
    /// The digest is the leading token of the utility's output.
    ///
    /// # Errors
    ///
    /// Returns [`WorkloadError::ChecksumUnavailable`] if the remote
    /// invocation fails or produces no digest.
    pub async fn checksum(&self, node: &NodeName, path: &str) -> Result<Digest, WorkloadError> {
        let command = format!("{CHECKSUM_UTILITY} {path}");
        let output = self.remote.execute(node, &command).await.map_err(|e| {
            WorkloadError::ChecksumUnavailable {
                node: node.clone(),
                path: path.to_string(),
                detail: e.to_string(),
            }
        })?;

        if !output.success() {
            return Err(WorkloadError::ChecksumUnavailable {
                node: node.clone(),
                path: path.to_string(),
                detail: format!("exited {}: {}", output.exit_code, output.stderr.trim()),
            });
        }

        let digest = output
            .stdout
            .split_whitespace()
            .next()
            .map(Digest::new)
            .ok_or_else(|| WorkloadError::ChecksumUnavailable {
                node: node.clone(),
                path: path.to_string(),
                detail: "empty checksum output".to_string(),
            })?;

        debug!(node = %node, path, digest = %digest, "computed remote checksum");
        Ok(digest)
    }
}

/// Compares written and read-back evidence for one object.
///
/// With `expect_mismatch` false this is a plain equality check. With it
/// true (corruption-injection mode) the check succeeds when the digests
/// differ or the engine flagged the corruption itself; a silently matching
/// digest means the engine failed to catch the injected corruption.
///
/// # Errors
///
/// - [`WorkloadError::ChecksumMismatch`] for a genuine mismatch.
/// - [`WorkloadError::CorruptionNotDetected`] when injected corruption
///   came back byte-identical.
pub fn verify_roundtrip(
    object: ObjectId,
    written: &Digest,
    read: ReadEvidence<'_>,
    expect_mismatch: bool,
) -> Result<VerifyOutcome, WorkloadError> {
    match (read, expect_mismatch) {
        (ReadEvidence::Digest(read), false) => {
            if read == written {
                Ok(VerifyOutcome::Match)
            } else {
                Err(WorkloadError::ChecksumMismatch {
                    object,
                    written: written.to_string(),
                    read: read.to_string(),
                })
            }
        }
        (ReadEvidence::Digest(read), true) => {
            if read == written {
                Err(WorkloadError::CorruptionNotDetected { object })
            } else {
                Ok(VerifyOutcome::MismatchObserved)
            }
        }
        (ReadEvidence::EngineCorruptionSignal, true) => Ok(VerifyOutcome::EngineDetected),
        // An unexpected engine corruption signal is a data-integrity
        // failure, not a tool error.
        (ReadEvidence::EngineCorruptionSignal, false) => Err(WorkloadError::ChecksumMismatch {
            object,
            written: written.to_string(),
            read: "<engine corruption signal>".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_remote::{CommandOutput, ScriptedRemote};

    fn object() -> ObjectId {
        ObjectId::new(7, 7)
    }

    #[tokio::test]
    async fn test_checksum_takes_leading_token() {
        let remote = Arc::new(ScriptedRemote::new());
        remote.respond(
            "md5sum /data/obj.src",
            CommandOutput::ok("d41d8cd98f00b204e9800998ecf8427e  /data/obj.src\n"),
        );

        let verifier = IntegrityVerifier::new(remote);
        let digest = verifier
            .checksum(&NodeName::new("n1"), "/data/obj.src")
            .await
            .unwrap();
        assert_eq!(digest.as_str(), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[tokio::test]
    async fn test_checksum_failure_is_unavailable() {
        let remote = Arc::new(ScriptedRemote::new());
        remote.respond("md5sum", CommandOutput::failed(1, "No such file"));

        let verifier = IntegrityVerifier::new(remote);
        let err = verifier
            .checksum(&NodeName::new("n1"), "/data/missing")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkloadError::ChecksumUnavailable { .. }));
        assert!(err.to_string().contains("No such file"));
    }

    #[tokio::test]
    async fn test_empty_checksum_output_is_unavailable() {
        let remote = Arc::new(ScriptedRemote::new());
        remote.respond("md5sum", CommandOutput::ok("   \n"));

        let verifier = IntegrityVerifier::new(remote);
        assert!(matches!(
            verifier.checksum(&NodeName::new("n1"), "/p").await,
            Err(WorkloadError::ChecksumUnavailable { .. })
        ));
    }

    #[test]
    fn test_roundtrip_match() {
        let written = Digest::new("abc");
        let read = Digest::new("abc");
        let outcome =
            verify_roundtrip(object(), &written, ReadEvidence::Digest(&read), false).unwrap();
        assert_eq!(outcome, VerifyOutcome::Match);
    }

    #[test]
    fn test_roundtrip_mismatch_is_fatal() {
        let written = Digest::new("abc");
        let read = Digest::new("def");
        let err =
            verify_roundtrip(object(), &written, ReadEvidence::Digest(&read), false).unwrap_err();
        assert!(matches!(err, WorkloadError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_expected_mismatch_observed() {
        let written = Digest::new("abc");
        let read = Digest::new("def");
        let outcome =
            verify_roundtrip(object(), &written, ReadEvidence::Digest(&read), true).unwrap();
        assert_eq!(outcome, VerifyOutcome::MismatchObserved);
    }

    #[test]
    fn test_engine_detected_counts_as_success() {
        let written = Digest::new("abc");
        let outcome =
            verify_roundtrip(object(), &written, ReadEvidence::EngineCorruptionSignal, true)
                .unwrap();
        assert_eq!(outcome, VerifyOutcome::EngineDetected);
    }

    #[test]
    fn test_silently_matching_digest_is_corruption_not_detected() {
        let written = Digest::new("abc");
        let read = Digest::new("abc");
        let err =
            verify_roundtrip(object(), &written, ReadEvidence::Digest(&read), true).unwrap_err();
        assert!(matches!(err, WorkloadError::CorruptionNotDetected { .. }));
    }

    #[test]
    fn test_unexpected_engine_signal_is_mismatch() {
        let written = Digest::new("abc");
        let err =
            verify_roundtrip(object(), &written, ReadEvidence::EngineCorruptionSignal, false)
                .unwrap_err();
        assert!(matches!(err, WorkloadError::ChecksumMismatch { .. }));
    }
}
