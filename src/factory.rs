//! Adapter factory: proxy synthesis and caching
//!
//! Building a proxy has two costs: deriving the dispatch table for a
//! (owning domain, calling domain, target type) shape, and publishing the
//! proxy for an individual instance. Shapes are built once per key and may
//! be raced by concurrent builders, with the loser discarding its result.
//! Proxies are published under a single lock per domain pair, so two
//! concurrent enhancements of the same instance can never produce two
//! distinct proxies.

use crate::descriptor::{MemberSignature, TypeDescriptor};
use crate::domain::{Domain, DomainId, Instance, InstanceId};
use crate::errors::{AdapterError, AdapterResult};
use crate::object::{DelegateBinding, Object, ProxyState};
use crate::registry::DomainRegistry;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock, Weak};
use tracing::debug;

/// Dispatch table for one (owning, calling, target type) adapter shape
///
/// Maps every member of the target descriptor to the matching
/// delegate-side overloads it forwards to. Built once and shared by every
/// proxy of the same shape.
pub(crate) struct AdapterShape {
    target: Arc<TypeDescriptor>,
    members: IndexMap<String, Vec<MemberSignature>>,
}

impl AdapterShape {
    /// Derive the table, validating that the delegate type answers every
    /// signature the target surface declares
    ///
    /// Only delegate overloads matching a target-declared signature are
    /// forwarded; a delegate-only overload of an in-surface name is not
    /// part of the proxy's surface.
    fn build(
        target: &Arc<TypeDescriptor>,
        delegate: &Arc<TypeDescriptor>,
    ) -> AdapterResult<Self> {
        let mut members = IndexMap::new();
        for member in target.members() {
            if members.contains_key(&member.name) {
                continue;
            }
            let declared = target.overloads(&member.name);
            let candidates = delegate.overloads(&member.name);
            for surface in declared {
                if !candidates.iter().any(|c| signatures_match(surface, c)) {
                    return Err(AdapterError::MemberNotFound {
                        type_name: delegate.qualified_name().to_string(),
                        member: member.name.clone(),
                    });
                }
            }
            let forwarded: Vec<MemberSignature> = candidates
                .iter()
                .filter(|c| declared.iter().any(|s| signatures_match(s, c)))
                .cloned()
                .collect();
            members.insert(member.name.clone(), forwarded);
        }
        Ok(Self {
            target: target.clone(),
            members,
        })
    }

    /// Delegate-side overloads for a member of the target surface
    pub(crate) fn overloads(&self, member: &str) -> Option<&[MemberSignature]> {
        self.members.get(member).map(Vec::as_slice)
    }

    pub(crate) fn target(&self) -> &Arc<TypeDescriptor> {
        &self.target
    }
}

fn signatures_match(surface: &MemberSignature, candidate: &MemberSignature) -> bool {
    surface.kind == candidate.kind && surface.params == candidate.params
}

/// Process-wide cache of adapter shapes, keyed per domain pair and type
#[derive(Default)]
pub(crate) struct ShapeCache {
    inner: RwLock<HashMap<(DomainId, DomainId, String), Arc<AdapterShape>>>,
}

impl ShapeCache {
    /// Look up a shape, deriving it on a miss
    ///
    /// Derivation runs without holding the write lock, so concurrent
    /// misses for the same key may both build; the first insert wins and
    /// the loser adopts it.
    fn get_or_build(
        &self,
        owning: DomainId,
        calling: DomainId,
        target: &Arc<TypeDescriptor>,
        delegate: &Arc<TypeDescriptor>,
    ) -> AdapterResult<Arc<AdapterShape>> {
        let key = (owning, calling, target.qualified_name().to_string());
        if let Some(shape) = self.inner.read().unwrap().get(&key) {
            return Ok(shape.clone());
        }

        let built = Arc::new(AdapterShape::build(target, delegate)?);
        debug!(
            target_type = target.qualified_name(),
            "derived adapter shape"
        );

        let mut shapes = self.inner.write().unwrap();
        Ok(shapes.entry(key).or_insert(built).clone())
    }

    /// Drop every shape involving a deactivated domain
    pub(crate) fn purge_domain(&self, domain: DomainId) {
        self.inner
            .write()
            .unwrap()
            .retain(|(owning, calling, _), _| *owning != domain && *calling != domain);
    }
}

/// Proxy registry for one (calling, delegate) domain pair
///
/// Entries are held weakly so the cache never extends the lifetime of a
/// delegate instance or its proxy; dead entries are swept on every lookup.
#[derive(Default)]
pub(crate) struct AdapterCache {
    entries: Mutex<HashMap<(InstanceId, String), Weak<ProxyState>>>,
}

impl AdapterCache {
    /// Atomic lookup-or-create for one (instance, target type) key
    ///
    /// The check and the insert happen under one lock acquisition, so
    /// concurrent callers observe exactly one proxy.
    fn lookup_or_create(
        &self,
        instance: InstanceId,
        target_type: &str,
        create: impl FnOnce() -> Arc<ProxyState>,
    ) -> Object {
        let mut entries = self.entries.lock().unwrap();
        // dropped proxies leave dead entries under arbitrary keys; sweep
        // them while the lock is held anyway
        entries.retain(|_, entry| entry.strong_count() > 0);
        let key = (instance, target_type.to_string());

        if let Some(existing) = entries.get(&key).and_then(Weak::upgrade) {
            debug!(%instance, target_type, "adapter cache hit");
            return Object::from_proxy(existing);
        }

        let state = create();
        entries.insert(key, Arc::downgrade(&state));
        Object::from_proxy(state)
    }
}

/// Build or retrieve the proxy adapting `instance` for the calling domain
///
/// The cache key includes both domains: the same instance adapted for two
/// different calling domains yields two distinct proxies.
pub(crate) fn build(
    registry: &Arc<DomainRegistry>,
    instance: &Arc<Instance>,
    owning: &Arc<Domain>,
    calling: &Arc<Domain>,
    target: Arc<TypeDescriptor>,
) -> AdapterResult<Object> {
    let shape = registry.shapes().get_or_build(
        owning.id(),
        calling.id(),
        &target,
        instance.descriptor(),
    )?;

    let cache = registry.adapter_cache(calling.id(), owning.id());
    Ok(cache.lookup_or_create(instance.id(), target.qualified_name(), || {
        debug!(
            instance = %instance.id(),
            owning = owning.name(),
            calling = calling.name(),
            target_type = target.qualified_name(),
            "building cross-domain proxy"
        );
        Arc::new(ProxyState {
            binding: DelegateBinding {
                registry: registry.clone(),
                delegate: instance.clone(),
                owning: owning.id(),
                calling: calling.id(),
                target: target.clone(),
            },
            shape,
        })
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueShape;
    use pretty_assertions::assert_eq;

    fn contact_descriptor() -> TypeDescriptor {
        TypeDescriptor::builder("mock.Contact")
            .accessor("name", ValueShape::Text)
            .method("describe", vec![], ValueShape::Text)
            .build()
    }

    fn setup() -> (Arc<DomainRegistry>, Arc<Domain>, Arc<Domain>, Arc<Instance>) {
        let registry = DomainRegistry::new();
        let a = registry.create_domain("addon-a");
        let b = registry.create_domain("addon-b");
        a.register_type(contact_descriptor());
        b.register_type(contact_descriptor());
        let instance = b.instantiate("mock.Contact").unwrap().underlying().clone();
        (registry, a, b, instance)
    }

    #[test]
    fn test_build_returns_proxy_with_binding() {
        let (registry, a, b, instance) = setup();
        let target = a.resolve("mock.Contact").unwrap();

        let proxy = build(&registry, &instance, &b, &a, target).unwrap();
        assert!(proxy.is_proxy());

        let binding = proxy.binding().unwrap();
        assert_eq!(binding.owning_domain(), b.id());
        assert_eq!(binding.calling_domain(), a.id());
        assert_eq!(binding.target().qualified_name(), "mock.Contact");
        assert_eq!(proxy.id(), instance.id());
    }

    /// Repeated builds for the same (instance, target, pair) are idempotent
    #[test]
    fn test_build_is_idempotent() {
        let (registry, a, b, instance) = setup();
        let target = a.resolve("mock.Contact").unwrap();

        let first = build(&registry, &instance, &b, &a, target.clone()).unwrap();
        let second = build(&registry, &instance, &b, &a, target).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_distinct_proxies_per_calling_domain() {
        let (registry, a, b, instance) = setup();
        let c = registry.create_domain("addon-c");
        c.register_type(contact_descriptor());

        let for_a = build(
            &registry,
            &instance,
            &b,
            &a,
            a.resolve("mock.Contact").unwrap(),
        )
        .unwrap();
        let for_c = build(
            &registry,
            &instance,
            &b,
            &c,
            c.resolve("mock.Contact").unwrap(),
        )
        .unwrap();

        assert_ne!(for_a, for_c);
        assert_eq!(for_a.id(), for_c.id());
    }

    #[test]
    fn test_weak_cache_rebuilds_after_drop() {
        let (registry, a, b, instance) = setup();
        let target = a.resolve("mock.Contact").unwrap();

        let first = build(&registry, &instance, &b, &a, target.clone()).unwrap();
        let first_id = first.id();
        drop(first);

        // entry is dead now; a fresh proxy is built for the same key
        let second = build(&registry, &instance, &b, &a, target).unwrap();
        assert_eq!(second.id(), first_id);
        assert!(second.is_proxy());
    }

    #[test]
    fn test_shape_build_requires_matching_signatures() {
        let (registry, a, b, _instance) = setup();
        a.register_type(
            TypeDescriptor::builder("mock.Chatty")
                .method("describe", vec![ValueShape::Int], ValueShape::Text)
                .build(),
        );
        let target = a.resolve("mock.Chatty").unwrap();
        let narrow = b.instantiate("mock.Contact").unwrap().underlying().clone();

        // delegate declares describe(), never describe(Int)
        let err = build(&registry, &narrow, &b, &a, target).unwrap_err();
        assert_eq!(err.to_string(), "Member not found: mock.Contact::describe");
    }

    /// A delegate-only overload of an in-surface name never enters the
    /// dispatch table
    #[test]
    fn test_shape_drops_delegate_only_overloads() {
        let (registry, a, b, _instance) = setup();
        b.register_type(
            TypeDescriptor::builder("mock.LoudContact")
                .accessor("name", ValueShape::Text)
                .method("describe", vec![], ValueShape::Text)
                .method("describe", vec![ValueShape::Int], ValueShape::Text)
                .build(),
        );
        let target = a.resolve("mock.Contact").unwrap();
        let loud = b.instantiate("mock.LoudContact").unwrap().underlying().clone();

        let proxy = build(&registry, &loud, &b, &a, target).unwrap();
        let state = proxy.proxy_state().unwrap();
        assert_eq!(state.shape.overloads("describe").map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_dead_entries_are_swept_on_lookup() {
        let (registry, a, b, instance) = setup();
        let target = a.resolve("mock.Contact").unwrap();
        let dropped = build(&registry, &instance, &b, &a, target.clone()).unwrap();
        drop(dropped);

        let other = b.instantiate("mock.Contact").unwrap().underlying().clone();
        let kept = build(&registry, &other, &b, &a, target).unwrap();

        let cache = registry.adapter_cache(a.id(), b.id());
        let entries = cache.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key(&(kept.id(), "mock.Contact".to_string())));
    }

    #[test]
    fn test_shape_build_rejects_missing_member() {
        let (registry, a, b, _instance) = setup();
        a.register_type(
            TypeDescriptor::builder("mock.Wider")
                .method("extra", vec![], ValueShape::Unit)
                .build(),
        );
        let wider = a.resolve("mock.Wider").unwrap();
        let narrow_instance = b.instantiate("mock.Contact").unwrap().underlying().clone();

        let err = build(&registry, &narrow_instance, &b, &a, wider).unwrap_err();
        assert_eq!(err.to_string(), "Member not found: mock.Contact::extra");
    }

    #[test]
    fn test_shape_cache_purge_on_domain_teardown() {
        let (registry, a, b, instance) = setup();
        let target = a.resolve("mock.Contact").unwrap();
        let proxy = build(&registry, &instance, &b, &a, target).unwrap();
        assert!(proxy.is_proxy());

        registry.deactivate(b.id());
        let shapes = registry.shapes().inner.read().unwrap();
        assert!(shapes
            .keys()
            .all(|(owning, calling, _)| *owning != b.id() && *calling != b.id()));
    }
}
