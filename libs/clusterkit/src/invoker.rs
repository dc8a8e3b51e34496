//! Fan-out cluster invoker: one logical call, every endpoint, one merged
//! result.
//!
//! `invoke` submits the call to every endpoint the directory lists, waits
//! for all of them under one shared deadline and merges the collected
//! results according to the configured strategy. Any single endpoint
//! failure or timeout voids the whole operation; there is no retry, no
//! partial result, and no cancellation of sibling tasks. Tasks that outlive
//! a failed or timed-out operation run to completion on the invoker's task
//! tracker and their results are discarded; `destroy` drains the tracker
//! deterministically.

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::task::TaskTracker;

use crate::call::Call;
use crate::config::ClusterConfig;
use crate::contracts::Directory;
use crate::descriptor::ServiceDescriptor;
use crate::error::ClusterError;
use crate::merge::{self, MergerRegistry};
use crate::value::Value;

pub struct MergeInvoker {
    directory: Arc<dyn Directory>,
    mergers: Arc<MergerRegistry>,
    tasks: TaskTracker,
}

impl std::fmt::Debug for MergeInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeInvoker").finish_non_exhaustive()
    }
}

impl MergeInvoker {
    /// Builds an invoker over `directory`, validating every configured
    /// merger name against the registry up front for methods present in the
    /// descriptor.
    ///
    /// # Errors
    /// Returns [`ClusterError::MergerNotFound`] when the method
    /// configuration names a merger that is not registered.
    pub fn new(
        directory: Arc<dyn Directory>,
        mergers: Arc<MergerRegistry>,
    ) -> Result<Self, ClusterError> {
        let descriptor = directory.descriptor();
        let config = directory.configuration();
        for (method, merger) in config.configured_mergers() {
            let Some(shape) = descriptor.shape_of_method(method) else {
                continue;
            };
            if !mergers.contains(merger) {
                return Err(ClusterError::MergerNotFound {
                    merger: merger.to_owned(),
                    shape,
                });
            }
        }

        Ok(Self {
            directory,
            mergers,
            tasks: TaskTracker::new(),
        })
    }

    /// Fans the call out to every listed endpoint and merges the results.
    ///
    /// # Errors
    /// Any of the [`ClusterError`] variants; a single endpoint failure or
    /// timeout voids the whole operation.
    pub async fn invoke(&self, call: Call) -> Result<Value, ClusterError> {
        let config = self.directory.configuration();
        let timeout = Duration::from_millis(config.timeout_ms(call.method()));
        let endpoints = self.directory.list(&call).await;

        tracing::debug!(
            method = call.method(),
            endpoints = endpoints.len(),
            timeout_ms = timeout.as_millis() as u64,
            "fanning out cluster call"
        );

        // One task per endpoint, pending handles kept in listing order so
        // the merge input order is reproducible across runs.
        let mut pending: Vec<(String, JoinHandle<anyhow::Result<Value>>)> =
            Vec::with_capacity(endpoints.len());
        for endpoint in endpoints {
            let retargeted = call.retarget(endpoint.uri());
            let key = endpoint.endpoint_key().to_owned();
            let handle = self
                .tasks
                .spawn(async move { endpoint.invoke(retargeted).await });
            pending.push((key, handle));
        }

        let descriptor = self.directory.descriptor();
        let shape = descriptor
            .return_shape(&call)
            .ok_or_else(|| ClusterError::Resolution {
                service: descriptor.service().to_owned(),
                method: call.signature().to_string(),
            })?;

        // One deadline bounds the whole collection pass regardless of
        // endpoint count. Handles past the deadline are abandoned, not
        // cancelled.
        let deadline = Instant::now() + timeout;
        let mut results = Vec::with_capacity(pending.len());
        for (key, handle) in pending {
            match tokio::time::timeout_at(deadline, handle).await {
                Ok(Ok(Ok(value))) => results.push(value),
                Ok(Ok(Err(source))) => {
                    return Err(ClusterError::Invocation {
                        endpoint: key,
                        source,
                    });
                }
                Ok(Err(join_error)) => {
                    return Err(ClusterError::Invocation {
                        endpoint: key,
                        source: anyhow::Error::new(join_error),
                    });
                }
                Err(_) => {
                    let ms = timeout.as_millis();
                    return Err(ClusterError::Invocation {
                        endpoint: key,
                        source: anyhow!("timed out after {ms}ms"),
                    });
                }
            }
        }

        tracing::debug!(
            method = call.method(),
            results = results.len(),
            shape = %shape,
            merger = config.merger(call.method()).unwrap_or("<builtin>"),
            "merging collected results"
        );

        merge::merge(&self.mergers, shape, config.merger(call.method()), results)
    }

    pub fn descriptor(&self) -> Arc<ServiceDescriptor> {
        self.directory.descriptor()
    }

    pub fn configuration(&self) -> Arc<ClusterConfig> {
        self.directory.configuration()
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.directory.is_available()
    }

    /// Tears the invoker down: waits for in-flight endpoint tasks to
    /// finish, then forwards teardown to the directory.
    pub async fn destroy(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.directory.destroy().await;
    }
}
