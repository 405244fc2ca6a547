//! SSH-backed remote execution.
//!
//! Commands run through `ssh -o BatchMode=yes`; transfers go through `scp`.
//! `BatchMode` makes a missing key an immediate failure instead of a
//! password prompt hanging the run.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use strata_core::NodeName;
use tokio::process::Command;
use tracing::debug;

use crate::executor::{CommandOutput, RemoteError, RemoteExecutor};

/// Connection settings shared by every node.
#[derive(Debug, Clone, Default)]
pub struct SshConfig {
    /// Login user; defaults to the current user when `None`.
    pub user: Option<String>,
    /// Identity file passed as `-i`.
    pub identity_file: Option<String>,
}

/// [`RemoteExecutor`] over ssh/scp subprocesses.
#[derive(Debug)]
pub struct SshRemote {
    config: SshConfig,
}

impl SshRemote {
    /// Creates an executor with the given connection settings.
    #[must_use]
    pub const fn new(config: SshConfig) -> Self {
        Self { config }
    }

    fn target(&self, node: &NodeName) -> String {
        self.config.user.as_ref().map_or_else(
            || node.as_str().to_string(),
            |user| format!("{user}@{node}"),
        )
    }

    fn base_command(&self, program: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.arg("-o").arg("BatchMode=yes");
        if let Some(identity) = &self.config.identity_file {
            cmd.arg("-i").arg(identity);
        }
        cmd.stdin(Stdio::null());
        cmd
    }

    async fn run_transfer(&self, mut cmd: Command, node: &NodeName) -> Result<(), RemoteError> {
        let output = cmd.output().await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(RemoteError::TransferFailed {
                node: node.clone(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[async_trait]
impl RemoteExecutor for SshRemote {
    async fn execute(&self, node: &NodeName, command: &str) -> Result<CommandOutput, RemoteError> {
        debug!(node = %node, command, "executing remote command");

        let mut cmd = self.base_command("ssh");
        cmd.arg(self.target(node)).arg(command);

        let output = cmd.output().await?;
        let stdout = String::from_utf8(output.stdout)
            .map_err(|_| RemoteError::NonUtf8Output { node: node.clone() })?;
        let stderr = String::from_utf8(output.stderr)
            .map_err(|_| RemoteError::NonUtf8Output { node: node.clone() })?;

        Ok(CommandOutput {
            stdout,
            stderr,
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    async fn copy_to_remote(
        &self,
        local_path: &Path,
        node: &NodeName,
        remote_path: &str,
    ) -> Result<(), RemoteError> {
        debug!(node = %node, ?local_path, remote_path, "copying file to node");

        let mut cmd = self.base_command("scp");
        cmd.arg(local_path)
            .arg(format!("{}:{remote_path}", self.target(node)));
        self.run_transfer(cmd, node).await
    }

    async fn copy_from_remote(
        &self,
        node: &NodeName,
        remote_path: &str,
        local_path: &Path,
    ) -> Result<(), RemoteError> {
        debug!(node = %node, remote_path, ?local_path, "copying file from node");

        let mut cmd = self.base_command("scp");
        cmd.arg(format!("{}:{remote_path}", self.target(node)))
            .arg(local_path);
        self.run_transfer(cmd, node).await
    }
}
