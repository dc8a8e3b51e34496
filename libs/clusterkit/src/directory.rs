//! In-process directory over a fixed endpoint set.
//!
//! Useful as the cluster-side registry for embedded deployments and as the
//! directory implementation in tests. Listing order is registration order,
//! which in turn fixes the merge input order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::call::Call;
use crate::config::ClusterConfig;
use crate::contracts::{Directory, Endpoint};
use crate::descriptor::ServiceDescriptor;

pub struct StaticDirectory {
    descriptor: Arc<ServiceDescriptor>,
    config: Arc<ClusterConfig>,
    endpoints: RwLock<Vec<Arc<dyn Endpoint>>>,
    destroyed: AtomicBool,
}

impl StaticDirectory {
    pub fn new(descriptor: ServiceDescriptor, config: ClusterConfig) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            config: Arc::new(config),
            endpoints: RwLock::new(Vec::new()),
            destroyed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_endpoint(self, endpoint: Arc<dyn Endpoint>) -> Self {
        self.register_endpoint(endpoint);
        self
    }

    /// Registers an endpoint, replacing any previous one with the same key
    /// in place.
    pub fn register_endpoint(&self, endpoint: Arc<dyn Endpoint>) {
        let mut endpoints = self.endpoints.write();
        if let Some(pos) = endpoints
            .iter()
            .position(|e| e.endpoint_key() == endpoint.endpoint_key())
        {
            endpoints[pos] = endpoint;
        } else {
            endpoints.push(endpoint);
        }
    }

    /// Removes the endpoint with `key`; later endpoints shift up.
    pub fn deregister_endpoint(&self, key: &str) {
        self.endpoints.write().retain(|e| e.endpoint_key() != key);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.read().is_empty()
    }
}

#[async_trait]
impl Directory for StaticDirectory {
    async fn list(&self, _call: &Call) -> Vec<Arc<dyn Endpoint>> {
        self.endpoints.read().clone()
    }

    fn descriptor(&self) -> Arc<ServiceDescriptor> {
        Arc::clone(&self.descriptor)
    }

    fn configuration(&self) -> Arc<ClusterConfig> {
        Arc::clone(&self.config)
    }

    fn is_available(&self) -> bool {
        !self.destroyed.load(Ordering::SeqCst) && !self.is_empty()
    }

    async fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
        self.endpoints.write().clear();
    }
}
