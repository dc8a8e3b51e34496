//! Operation-level errors surfaced by the cluster invoker.
//!
//! Every failure voids the whole operation: there is no retry and no
//! partial-success mode. Causes stay reachable through
//! `std::error::Error::source`.

use crate::descriptor::ReturnShape;

#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    /// Return-shape lookup against the service descriptor failed.
    #[error("method {method} not found in descriptor of service {service}")]
    Resolution { service: String, method: String },

    /// A single endpoint call failed or timed out.
    #[error("failed to invoke endpoint {endpoint}: {source}")]
    Invocation {
        endpoint: String,
        #[source]
        source: anyhow::Error,
    },

    /// A merger is configured by name but not registered.
    #[error("no merger named '{merger}' registered for {shape} results")]
    MergerNotFound { merger: String, shape: ReturnShape },

    /// No built-in merge rule matches the declared return shape.
    #[error("no merger available for {shape} results")]
    NoMergerForShape { shape: ReturnShape },

    /// The merge algorithm itself failed.
    #[error("failed to merge results with '{merger}': {source}")]
    MergeExecution {
        merger: String,
        #[source]
        source: anyhow::Error,
    },
}
