//! Contracts between the cluster invoker and its external collaborators.
//!
//! Discovery, health filtering, routing policy and the wire transport all
//! live behind these two traits; the invoker only orchestrates.

use async_trait::async_trait;
use std::sync::Arc;

use crate::call::Call;
use crate::config::ClusterConfig;
use crate::descriptor::ServiceDescriptor;
use crate::value::Value;

/// One remote-callable provider instance for a service.
#[async_trait]
pub trait Endpoint: Send + Sync {
    /// Stable key identifying this endpoint; used to attribute failures and
    /// to key pending calls within one operation.
    fn endpoint_key(&self) -> &str;

    /// URL-like address the call is re-targeted to before dispatch.
    fn uri(&self) -> &str;

    /// Performs the remote call. May fail or outlive the caller's wait
    /// budget; the transport is the implementor's concern.
    async fn invoke(&self, call: Call) -> anyhow::Result<Value>;
}

/// Supplies the candidate endpoint set and per-method configuration for a
/// call.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Current candidate endpoints in listing order. The order fixes the
    /// merge input order for the operation.
    async fn list(&self, call: &Call) -> Vec<Arc<dyn Endpoint>>;

    /// Interface descriptor of the backing service.
    fn descriptor(&self) -> Arc<ServiceDescriptor>;

    /// Per-method invocation options.
    fn configuration(&self) -> Arc<ClusterConfig>;

    fn is_available(&self) -> bool;

    /// Passthrough teardown.
    async fn destroy(&self);
}
