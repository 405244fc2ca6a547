//! Concurrent per-node workload execution.
//!
//! One tokio task per node; each node's outcome is an independent
//! `Result`, so one node failing or panicking never disturbs another.
//! The optional wall-clock budget bounds how long the runner *waits*:
//! when it lapses, unfinished nodes are reported as exhausted and their
//! tasks are detached, but any remote commands already in flight are not
//! forcibly terminated.

use std::collections::BTreeMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use strata_core::NodeName;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::{error, warn};

use crate::error::WorkloadError;

/// Fans one workload function out across nodes and collects per-node
/// results.
#[derive(Debug, Default)]
pub struct ParallelRunner {
    budget: Option<Duration>,
}

impl ParallelRunner {
    /// Creates a runner with no wall-clock budget.
    #[must_use]
    pub const fn new() -> Self {
        Self { budget: None }
    }

    /// Sets a wall-clock budget for the whole fan-out.
    #[must_use]
    pub const fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Runs `workload_fn` once per node, concurrently, and returns each
    /// node's result keyed by node name.
    ///
    /// A panic inside one node's unit is captured as
    /// [`WorkloadError::UnitPanicked`] for that node only. Nodes still
    /// unfinished when the budget lapses come back as
    /// [`WorkloadError::BudgetExhausted`].
    pub async fn run_many<T, F, Fut>(
        &self,
        nodes: &[NodeName],
        workload_fn: F,
    ) -> BTreeMap<NodeName, Result<T, WorkloadError>>
    where
        T: Send + 'static,
        F: Fn(NodeName) -> Fut,
        Fut: Future<Output = Result<T, WorkloadError>> + Send + 'static,
    {
        let mut join_set = JoinSet::new();
        for node in nodes {
            let node = node.clone();
            let unit = workload_fn(node.clone());
            join_set.spawn(async move {
                let result = match AssertUnwindSafe(unit).catch_unwind().await {
                    Ok(result) => result,
                    Err(payload) => Err(WorkloadError::UnitPanicked {
                        node: node.clone(),
                        detail: panic_detail(payload.as_ref()),
                    }),
                };
                (node, result)
            });
        }

        let deadline = self.budget.map(|budget| Instant::now() + budget);
        let mut results = BTreeMap::new();

        while !join_set.is_empty() {
            let joined = match deadline {
                None => join_set.join_next().await,
                Some(deadline) => match timeout_at(deadline, join_set.join_next()).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        warn!(
                            pending = join_set.len(),
                            "wall-clock budget exhausted, abandoning unfinished nodes"
                        );
                        break;
                    }
                },
            };

            match joined {
                Some(Ok((node, result))) => {
                    if let Err(error) = &result {
                        error!(node = %node, %error, "node workload failed");
                    }
                    results.insert(node, result);
                }
                // catch_unwind inside the task makes a join error
                // unreachable short of task cancellation.
                Some(Err(join_error)) => {
                    error!(%join_error, "workload task could not be joined");
                }
                None => break,
            }
        }

        // Abandoned tasks keep running detached; their remote commands are
        // not killed.
        join_set.detach_all();

        for node in nodes {
            if !results.contains_key(node) {
                results.insert(
                    node.clone(),
                    Err(WorkloadError::BudgetExhausted { node: node.clone() }),
                );
            }
        }
        results
    }
}

fn panic_detail(payload: &(dyn std::any::Any + Send)) -> String {
    payload.downcast_ref::<&str>().map_or_else(
        || {
            payload
                .downcast_ref::<String>()
                .cloned()
                .unwrap_or_else(|| "non-string panic payload".to_string())
        },
        ToString::to_string,
    )
}
