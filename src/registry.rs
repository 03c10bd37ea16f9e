//! Process-wide domain registry
//!
//! The registry is the surface module-hosting code consumes: it tracks
//! which domains exist, hands out the per-pair adapter caches, and tears
//! both down when a domain deactivates so no cache keeps references into
//! a dead domain.

use crate::domain::{Domain, DomainId};
use crate::errors::{AdapterError, AdapterResult};
use crate::factory::{AdapterCache, ShapeCache};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info};

/// Registry of every active domain and the adapter state scoped to them
#[derive(Default)]
pub struct DomainRegistry {
    domains: RwLock<HashMap<DomainId, Arc<Domain>>>,
    adapters: Mutex<HashMap<(DomainId, DomainId), Arc<AdapterCache>>>,
    shapes: ShapeCache,
}

impl DomainRegistry {
    /// Create an empty registry
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Activate a new domain
    pub fn create_domain(&self, name: impl Into<String>) -> Arc<Domain> {
        let domain = Arc::new(Domain::new(name));
        info!(domain = domain.name(), id = %domain.id(), "domain activated");
        self.domains
            .write()
            .unwrap()
            .insert(domain.id(), domain.clone());
        domain
    }

    /// Look up a domain by handle
    pub fn domain(&self, id: DomainId) -> AdapterResult<Arc<Domain>> {
        self.domains
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| AdapterError::DomainInactive(id.to_string()))
    }

    /// Look up a domain that must still be active
    pub(crate) fn active_domain(&self, id: DomainId) -> AdapterResult<Arc<Domain>> {
        let domain = self.domain(id)?;
        if !domain.is_active() {
            return Err(AdapterError::DomainInactive(domain.name().to_string()));
        }
        Ok(domain)
    }

    /// Deactivate a domain and invalidate every adapter bound to it
    ///
    /// Proxies already handed out keep existing but every call through
    /// them fails once either of their domains is deactivated.
    pub fn deactivate(&self, id: DomainId) {
        let domain = match self.domains.read().unwrap().get(&id).cloned() {
            Some(domain) => domain,
            None => return,
        };
        domain.deactivate();
        info!(domain = domain.name(), "domain deactivated");

        let mut adapters = self.adapters.lock().unwrap();
        let before = adapters.len();
        adapters.retain(|(calling, owning), _| *calling != id && *owning != id);
        debug!(
            domain = domain.name(),
            purged = before - adapters.len(),
            "purged adapter caches for deactivated domain"
        );
        drop(adapters);

        self.shapes.purge_domain(id);
    }

    /// The adapter cache scoped to one (calling, delegate) domain pair
    pub(crate) fn adapter_cache(
        &self,
        calling: DomainId,
        owning: DomainId,
    ) -> Arc<AdapterCache> {
        self.adapters
            .lock()
            .unwrap()
            .entry((calling, owning))
            .or_default()
            .clone()
    }

    pub(crate) fn shapes(&self) -> &ShapeCache {
        &self.shapes
    }
}
