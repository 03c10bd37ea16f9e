//! Enhancement builder: the public entry point
//!
//! Calling-domain code configures an enhancement with the two domains
//! involved and optionally an explicit target type, then hands values
//! through [`AdapterBuilder::enhance`]. Values that are already usable on
//! the calling side come back unchanged; values that are already adapters
//! come back unwrapped or as-is rather than double-wrapped; everything
//! else goes through the adapter factory.

use crate::classify::{classify, translate, Classification};
use crate::domain::Domain;
use crate::errors::{AdapterError, AdapterResult};
use crate::factory;
use crate::registry::DomainRegistry;
use crate::value::Value;
use std::sync::Arc;

/// Query whether a value is a cross-domain proxy
///
/// Pure inspection: never triggers adaptation. Containers report `false`;
/// they are rebuilt on each crossing, never proxied as a whole.
pub fn is_adapted(value: &Value) -> bool {
    matches!(value, Value::Object(obj) if obj.is_proxy())
}

/// Configuration for one enhancement: calling domain, delegate domain and
/// an optional explicit target type
#[derive(Clone)]
pub struct AdapterBuilder {
    registry: Arc<DomainRegistry>,
    calling: Option<Arc<Domain>>,
    delegate: Option<Arc<Domain>>,
    target_type: Option<String>,
}

impl AdapterBuilder {
    /// Start configuring an enhancement through a registry
    pub fn new(registry: &Arc<DomainRegistry>) -> Self {
        Self {
            registry: registry.clone(),
            calling: None,
            delegate: None,
            target_type: None,
        }
    }

    /// Domain whose code will use the enhanced value
    pub fn calling_domain(mut self, domain: &Arc<Domain>) -> Self {
        self.calling = Some(domain.clone());
        self
    }

    /// Domain that owns the delegate instance
    pub fn delegate_domain(mut self, domain: &Arc<Domain>) -> Self {
        self.delegate = Some(domain.clone());
        self
    }

    /// Explicit target type; when absent the most derived logically equal
    /// type reachable from the calling domain is inferred
    pub fn target_type(mut self, qualified_name: impl Into<String>) -> Self {
        self.target_type = Some(qualified_name.into());
        self
    }

    /// Produce the calling-domain view of a value
    pub fn enhance(&self, value: &Value) -> AdapterResult<Value> {
        let calling = self
            .calling
            .as_ref()
            .ok_or_else(|| AdapterError::Unenhanceable("calling domain not configured".into()))?;
        let delegate_domain = self
            .delegate
            .as_ref()
            .ok_or_else(|| AdapterError::Unenhanceable("delegate domain not configured".into()))?;
        if !calling.is_active() {
            return Err(AdapterError::DomainInactive(calling.name().to_string()));
        }
        if !delegate_domain.is_active() {
            return Err(AdapterError::DomainInactive(delegate_domain.name().to_string()));
        }

        let obj = match value {
            Value::Object(obj) => obj,
            // primitives pass through; lists are rebuilt element-wise
            other => return translate(&self.registry, other, calling),
        };

        let classification =
            classify(&self.registry, value, calling).map_err(|err| match err {
                AdapterError::UnadaptableType { type_name, domain } => {
                    AdapterError::Unenhanceable(format!(
                        "no logically equal type for {type_name} reachable from domain {domain}"
                    ))
                }
                other => other,
            })?;

        match classification {
            Classification::Passthrough => Ok(value.clone()),
            Classification::AlreadyAdapted(unwrapped) => Ok(Value::Object(unwrapped)),
            Classification::NeedsAdaptation(inferred) => {
                let instance = obj.underlying().clone();
                let owning = self.registry.active_domain(instance.domain())?;
                if owning.id() != delegate_domain.id() {
                    return Err(AdapterError::Unenhanceable(format!(
                        "value of type {} is owned by domain {}, not the configured delegate domain {}",
                        instance.descriptor().qualified_name(),
                        owning.name(),
                        delegate_domain.name(),
                    )));
                }

                let target = match &self.target_type {
                    Some(name) => calling.resolve(name)?,
                    None => inferred,
                };
                factory::build(&self.registry, &instance, &owning, calling, target)
                    .map(Value::Object)
            }
        }
    }
}
