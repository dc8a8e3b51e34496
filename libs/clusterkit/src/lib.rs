#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! # `clusterkit` - fan-out cluster invocation with mergeable results
//!
//! One logical call goes out to *every* provider endpoint a directory lists
//! for a service; the per-endpoint results are merged into one logical
//! result. The crate provides:
//!
//! - **Contracts** (`contracts` module) - `Directory` and `Endpoint` traits
//!   behind which discovery, routing and transport live
//! - **The invoker** (`invoker` module) - `MergeInvoker` fans out, collects
//!   under a shared deadline and fails fast on any single endpoint failure
//! - **Merge strategies** (`merge` module) - built-in list/set/map/array
//!   mergers keyed by declared return shape, plus named custom fold or
//!   in-place mutation mergers in a `MergerRegistry`
//! - **A static directory** (`directory` module) - in-process endpoint
//!   registry for embedded deployments and tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use clusterkit::{Call, ClusterConfig, MergeInvoker, MergerRegistry,
//!                  ReturnShape, ServiceDescriptor, StaticDirectory};
//!
//! let descriptor = ServiceDescriptor::new("search.Index")
//!     .with_method("find", ["text"], ReturnShape::List);
//! let directory = StaticDirectory::new(descriptor, ClusterConfig::new())
//!     .with_endpoint(shard_a)
//!     .with_endpoint(shard_b);
//!
//! let invoker = MergeInvoker::new(Arc::new(directory), Arc::new(MergerRegistry::new()))?;
//! let merged = invoker
//!     .invoke(Call::new("find").with_arg("text", "rust".into()))
//!     .await?;
//! ```

pub mod call;
pub mod config;
pub mod contracts;
pub mod descriptor;
pub mod directory;
pub mod error;
pub mod invoker;
pub mod merge;
pub mod value;

pub use call::{Call, MethodSig};
pub use config::{ClusterConfig, ConfigError, MethodOptions, DEFAULT_TIMEOUT_MS};
pub use contracts::{Directory, Endpoint};
pub use descriptor::{ReturnShape, ServiceDescriptor};
pub use directory::StaticDirectory;
pub use error::ClusterError;
pub use invoker::MergeInvoker;
pub use merge::{CustomMerger, MergerRegistry};
pub use value::Value;
