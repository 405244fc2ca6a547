//! The remote-execution collaborator boundary.
//!
//! The engine signals most failures inside its command output rather than
//! through exit codes alone, so a completed command with a non-zero exit
//! status is data, not an error: callers classify the output themselves.
//! [`RemoteError`] is reserved for transport-level failures where no
//! output was obtained at all.

use std::path::Path;

use async_trait::async_trait;
use strata_core::NodeName;
use thiserror::Error;

/// Errors at the remote transport level.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The local command (ssh/scp) could not be spawned or awaited.
    #[error("failed to spawn remote command: {0}")]
    Spawn(#[from] std::io::Error),

    /// Remote output was not valid UTF-8.
    #[error("remote output on {node} was not valid UTF-8")]
    NonUtf8Output {
        /// The node that produced the output.
        node: NodeName,
    },

    /// A file transfer to or from a node failed.
    #[error("file transfer with {node} failed: {detail}")]
    TransferFailed {
        /// The node involved in the transfer.
        node: NodeName,
        /// Transfer tool output describing the failure.
        detail: String,
    },
}

/// Captured output of one remote command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output, as UTF-8.
    pub stdout: String,
    /// Standard error, as UTF-8.
    pub stderr: String,
    /// Process exit code (-1 if terminated by signal).
    pub exit_code: i32,
}

impl CommandOutput {
    /// Creates a successful output with the given stdout.
    #[must_use]
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    /// Creates a failed output with the given exit code and stderr.
    #[must_use]
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    /// Returns true if the command exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns stdout and stderr concatenated, for signature scanning.
    #[must_use]
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Executes commands and moves files on cluster nodes.
///
/// One implementation talks SSH to a live cluster; another replays scripted
/// responses for tests. Implementations must be shareable across the
/// per-node tasks spawned by the parallel runner.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Runs `command` on `node` and captures its output.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] only for transport failures; a command that
    /// ran and exited non-zero is an `Ok` with that exit code.
    async fn execute(&self, node: &NodeName, command: &str) -> Result<CommandOutput, RemoteError>;

    /// Copies a local file to `remote_path` on `node`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::TransferFailed`] if the transfer tool
    /// reported failure.
    async fn copy_to_remote(
        &self,
        local_path: &Path,
        node: &NodeName,
        remote_path: &str,
    ) -> Result<(), RemoteError>;

    /// Copies `remote_path` on `node` to a local file.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::TransferFailed`] if the transfer tool
    /// reported failure.
    async fn copy_from_remote(
        &self,
        node: &NodeName,
        remote_path: &str,
        local_path: &Path,
    ) -> Result<(), RemoteError>;
}
