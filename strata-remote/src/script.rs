//! Scripted in-memory remote for tests.
//!
//! Implements [`RemoteExecutor`] by replaying canned responses, so the
//! topology and workload logic can be exercised end to end without a
//! cluster. Responses are matched by substring against the issued command
//! (optionally pinned to one node). One-shot rules beat persistent ones and
//! node-pinned rules beat generic ones, so a per-node override can be
//! registered after the generic defaults; ties go to insertion order.
//! Unmatched commands come back as exit 127 so a missing script line fails
//! the test loudly instead of silently succeeding.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use strata_core::NodeName;

use crate::executor::{CommandOutput, RemoteError, RemoteExecutor};

#[derive(Debug, Clone)]
struct Rule {
    node: Option<NodeName>,
    needle: String,
    output: CommandOutput,
    once: bool,
}

#[derive(Debug, Default)]
struct Log {
    commands: Vec<(NodeName, String)>,
    uploads: Vec<(PathBuf, NodeName, String)>,
    downloads: Vec<(NodeName, String, PathBuf)>,
}

/// A scripted [`RemoteExecutor`] for tests.
#[derive(Debug, Default)]
pub struct ScriptedRemote {
    rules: Mutex<Vec<Rule>>,
    log: Mutex<Log>,
    fail_transfers: Mutex<bool>,
}

impl ScriptedRemote {
    /// Creates an empty scripted remote.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a response for any command containing `needle`, on any node.
    pub fn respond(&self, needle: impl Into<String>, output: CommandOutput) {
        self.rules.lock().expect("rules lock").push(Rule {
            node: None,
            needle: needle.into(),
            output,
            once: false,
        });
    }

    /// Registers a response that is consumed by its first match.
    ///
    /// One-shot rules take precedence over persistent ones, so a sequence
    /// of `respond_once` calls followed by a `respond` fallback scripts
    /// "first call sees X, later calls see Y".
    pub fn respond_once(&self, needle: impl Into<String>, output: CommandOutput) {
        self.rules.lock().expect("rules lock").push(Rule {
            node: None,
            needle: needle.into(),
            output,
            once: true,
        });
    }

    /// Registers a response pinned to one node.
    ///
    /// Pinned rules take precedence over generic ones on their node, so an
    /// override can be layered on top of already-registered defaults.
    pub fn respond_on(
        &self,
        node: impl Into<NodeName>,
        needle: impl Into<String>,
        output: CommandOutput,
    ) {
        self.rules.lock().expect("rules lock").push(Rule {
            node: Some(node.into()),
            needle: needle.into(),
            output,
            once: false,
        });
    }

    /// Makes every subsequent file transfer fail.
    pub fn fail_transfers(&self) {
        *self.fail_transfers.lock().expect("flag lock") = true;
    }

    /// Returns every command executed so far, in order.
    #[must_use]
    pub fn commands(&self) -> Vec<(NodeName, String)> {
        self.log.lock().expect("log lock").commands.clone()
    }

    /// Returns every upload performed so far, in order.
    #[must_use]
    pub fn uploads(&self) -> Vec<(PathBuf, NodeName, String)> {
        self.log.lock().expect("log lock").uploads.clone()
    }

    /// Returns every download performed so far, in order.
    #[must_use]
    pub fn downloads(&self) -> Vec<(NodeName, String, PathBuf)> {
        self.log.lock().expect("log lock").downloads.clone()
    }
}

#[async_trait]
impl RemoteExecutor for ScriptedRemote {
    async fn execute(&self, node: &NodeName, command: &str) -> Result<CommandOutput, RemoteError> {
        self.log
            .lock()
            .expect("log lock")
            .commands
            .push((node.clone(), command.to_string()));

        let mut rules = self.rules.lock().expect("rules lock");
        let matches = |rule: &Rule| {
            rule.node.as_ref().is_none_or(|n| n == node) && command.contains(&rule.needle)
        };

        // One-shot before persistent, node-pinned before generic, insertion
        // order within each tier.
        let index = rules
            .iter()
            .position(|rule| rule.once && rule.node.is_some() && matches(rule))
            .or_else(|| {
                rules
                    .iter()
                    .position(|rule| rule.once && rule.node.is_none() && matches(rule))
            })
            .or_else(|| {
                rules
                    .iter()
                    .position(|rule| !rule.once && rule.node.is_some() && matches(rule))
            })
            .or_else(|| {
                rules
                    .iter()
                    .position(|rule| !rule.once && rule.node.is_none() && matches(rule))
            });

        Ok(index.map_or_else(
            || CommandOutput::failed(127, format!("no scripted response for: {command}")),
            |i| {
                if rules[i].once {
                    rules.remove(i).output
                } else {
                    rules[i].output.clone()
                }
            },
        ))
    }

    async fn copy_to_remote(
        &self,
        local_path: &Path,
        node: &NodeName,
        remote_path: &str,
    ) -> Result<(), RemoteError> {
        if *self.fail_transfers.lock().expect("flag lock") {
            return Err(RemoteError::TransferFailed {
                node: node.clone(),
                detail: "scripted transfer failure".to_string(),
            });
        }
        self.log.lock().expect("log lock").uploads.push((
            local_path.to_path_buf(),
            node.clone(),
            remote_path.to_string(),
        ));
        Ok(())
    }

    async fn copy_from_remote(
        &self,
        node: &NodeName,
        remote_path: &str,
        local_path: &Path,
    ) -> Result<(), RemoteError> {
        if *self.fail_transfers.lock().expect("flag lock") {
            return Err(RemoteError::TransferFailed {
                node: node.clone(),
                detail: "scripted transfer failure".to_string(),
            });
        }
        self.log.lock().expect("log lock").downloads.push((
            node.clone(),
            remote_path.to_string(),
            local_path.to_path_buf(),
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_substring_match_first_wins() {
        let remote = ScriptedRemote::new();
        remote.respond("status", CommandOutput::ok("first"));
        remote.respond("status", CommandOutput::ok("second"));

        let out = remote
            .execute(&NodeName::new("n1"), "stratactl status")
            .await
            .unwrap();
        assert_eq!(out.stdout, "first");
    }

    #[tokio::test]
    async fn test_respond_once_is_consumed() {
        let remote = ScriptedRemote::new();
        remote.respond_once("status", CommandOutput::ok("first"));
        remote.respond("status", CommandOutput::ok("later"));

        let node = NodeName::new("n1");
        let first = remote.execute(&node, "stratactl status").await.unwrap();
        let second = remote.execute(&node, "stratactl status").await.unwrap();
        let third = remote.execute(&node, "stratactl status").await.unwrap();
        assert_eq!(first.stdout, "first");
        assert_eq!(second.stdout, "later");
        assert_eq!(third.stdout, "later");
    }

    #[tokio::test]
    async fn test_pinned_override_beats_earlier_generic_rule() {
        let remote = ScriptedRemote::new();
        remote.respond("strata-io write", CommandOutput::ok("stored"));
        remote.respond_on(
            "n2",
            "strata-io write",
            CommandOutput::ok("FAILED: no capacity"),
        );

        let generic = remote
            .execute(&NodeName::new("n1"), "strata-io write --object 1:1")
            .await
            .unwrap();
        assert_eq!(generic.stdout, "stored");

        let pinned = remote
            .execute(&NodeName::new("n2"), "strata-io write --object 1:1")
            .await
            .unwrap();
        assert_eq!(pinned.stdout, "FAILED: no capacity");
    }

    #[tokio::test]
    async fn test_node_pinned_rule() {
        let remote = ScriptedRemote::new();
        remote.respond_on("n2", "status", CommandOutput::ok("n2 only"));

        let miss = remote
            .execute(&NodeName::new("n1"), "stratactl status")
            .await
            .unwrap();
        assert_eq!(miss.exit_code, 127);

        let hit = remote
            .execute(&NodeName::new("n2"), "stratactl status")
            .await
            .unwrap();
        assert_eq!(hit.stdout, "n2 only");
    }

    #[tokio::test]
    async fn test_unmatched_command_fails_loudly() {
        let remote = ScriptedRemote::new();
        let out = remote
            .execute(&NodeName::new("n1"), "anything")
            .await
            .unwrap();
        assert!(!out.success());
        assert!(out.stderr.contains("no scripted response"));
    }

    #[tokio::test]
    async fn test_transfer_logging_and_failure() {
        let remote = ScriptedRemote::new();
        remote
            .copy_to_remote(Path::new("/tmp/src"), &NodeName::new("n1"), "/data/src")
            .await
            .unwrap();
        assert_eq!(remote.uploads().len(), 1);

        remote.fail_transfers();
        let err = remote
            .copy_to_remote(Path::new("/tmp/src"), &NodeName::new("n1"), "/data/src")
            .await;
        assert!(matches!(err, Err(RemoteError::TransferFailed { .. })));
    }
}
