//! Passthrough classification and value translation
//!
//! Every value crossing a domain boundary is classified into exactly one
//! outcome: forwarded unchanged, unwrapped because it is already an
//! adapter for the target side, or sent through the adapter factory. A
//! value with no logically equal counterpart on the target side is a hard
//! failure for that slot; it is never silently replaced.
//!
//! Classification for a given concrete type is stable for the lifetime of
//! the domains involved: it depends only on descriptor identity and
//! logical equality, both of which are fixed once the types are loaded.

use crate::descriptor::TypeDescriptor;
use crate::domain::{Domain, Instance};
use crate::errors::{AdapterError, AdapterResult};
use crate::factory;
use crate::object::Object;
use crate::registry::DomainRegistry;
use crate::value::Value;
use std::sync::Arc;

/// Outcome of classifying a value against a target domain
#[derive(Debug)]
pub enum Classification {
    /// Value is usable on the target side as-is; forwarded unchanged
    Passthrough,
    /// Value is already an adapter for this boundary; carries the handle
    /// the target side should use instead of a new wrapper
    AlreadyAdapted(Object),
    /// Value's type is domain-owned and logically equal to this
    /// target-side descriptor; must go through the adapter factory
    NeedsAdaptation(Arc<TypeDescriptor>),
}

/// Classify a value against a target domain
///
/// Primitive values and lists are shared infrastructure at the container
/// level; lists are rebuilt element-wise by [`translate`] rather than
/// classified as a whole. Object classification rules, in order:
///
/// 1. a proxy whose owning domain is the target unwraps to its delegate
/// 2. a proxy whose calling domain is the target is already the right view
/// 3. a proxy for some other boundary classifies as its delegate instance
/// 4. a real object whose descriptor is identity-equal to the target
///    domain's resolution of the same name passes through
/// 5. a real object whose type (or a super, most derived first) is
///    logically equal to a target-side type needs adaptation
/// 6. anything else has no counterpart and is unadaptable
pub fn classify(
    registry: &Arc<DomainRegistry>,
    value: &Value,
    target: &Arc<Domain>,
) -> AdapterResult<Classification> {
    let obj = match value {
        Value::Object(obj) => obj,
        _ => return Ok(Classification::Passthrough),
    };

    if let Some(state) = obj.proxy_state() {
        if state.binding.owning_domain() == target.id() {
            return Ok(Classification::AlreadyAdapted(Object::from_instance(
                state.binding.delegate().clone(),
            )));
        }
        if state.binding.calling_domain() == target.id() {
            return Ok(Classification::AlreadyAdapted(obj.clone()));
        }
        // Proxy for an unrelated boundary: adapt the delegate itself.
        return classify_instance(registry, state.binding.delegate(), target);
    }

    classify_instance(registry, obj.underlying(), target)
}

fn classify_instance(
    registry: &Arc<DomainRegistry>,
    instance: &Arc<Instance>,
    target: &Arc<Domain>,
) -> AdapterResult<Classification> {
    let owning = registry.active_domain(instance.domain())?;
    let concrete = instance.descriptor();

    let mut chain = Vec::with_capacity(1 + concrete.supers().len());
    chain.push(concrete.qualified_name().to_string());
    chain.extend(concrete.supers().iter().cloned());

    for name in &chain {
        let owning_side = if name == concrete.qualified_name() {
            concrete.clone()
        } else {
            match owning.resolve(name) {
                Ok(descriptor) => descriptor,
                Err(AdapterError::TypeResolution { .. }) => continue,
                Err(other) => return Err(other),
            }
        };

        let target_side = match target.resolve(name) {
            Ok(descriptor) => descriptor,
            Err(AdapterError::TypeResolution { .. }) => continue,
            Err(other) => return Err(other),
        };

        if Arc::ptr_eq(&owning_side, &target_side) {
            return Ok(Classification::Passthrough);
        }
        if target_side.logically_equal(&owning_side) {
            return Ok(Classification::NeedsAdaptation(target_side));
        }
    }

    Err(AdapterError::UnadaptableType {
        type_name: concrete.qualified_name().to_string(),
        domain: target.name().to_string(),
    })
}

/// Translate a value for use in the target domain
///
/// Applies classification recursively: primitives are cloned, lists are
/// rebuilt as fresh containers of the same length and order with each
/// element independently translated, and objects are passed through,
/// unwrapped, or adapted as classification dictates.
pub(crate) fn translate(
    registry: &Arc<DomainRegistry>,
    value: &Value,
    target: &Arc<Domain>,
) -> AdapterResult<Value> {
    match value {
        Value::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(translate(registry, item, target)?);
            }
            Ok(Value::List(out))
        }
        Value::Object(obj) => match classify(registry, value, target)? {
            Classification::Passthrough => Ok(value.clone()),
            Classification::AlreadyAdapted(unwrapped) => Ok(Value::Object(unwrapped)),
            Classification::NeedsAdaptation(descriptor) => {
                let instance = obj.underlying().clone();
                let owning = registry.active_domain(instance.domain())?;
                factory::build(registry, &instance, &owning, target, descriptor)
                    .map(Value::Object)
            }
        },
        other => Ok(other.clone()),
    }
}
