//! Object handles: real instances and cross-domain proxies
//!
//! An [`Object`] is the uniform handle cross-domain code holds. It is
//! either a real instance living in its owning domain, or a proxy carrying
//! a [`DelegateBinding`] whose calls are forwarded through the invocation
//! bridge. Both answer the same member dispatch surface, so calling code
//! never needs to know which one it has.

use crate::bridge;
use crate::descriptor::{MemberKind, TypeDescriptor};
use crate::domain::{DomainId, Instance, InstanceId};
use crate::errors::AdapterResult;
use crate::factory::AdapterShape;
use crate::registry::DomainRegistry;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Handle to a real instance or a cross-domain proxy
#[derive(Clone)]
pub struct Object {
    inner: ObjectInner,
}

#[derive(Clone)]
enum ObjectInner {
    Real(Arc<Instance>),
    Proxy(Arc<ProxyState>),
}

/// The contract of one adapter: calls on the proxy forward to the delegate
/// instance in its owning domain, translated through the calling domain's
/// type view
pub struct DelegateBinding {
    pub(crate) registry: Arc<DomainRegistry>,
    pub(crate) delegate: Arc<Instance>,
    pub(crate) owning: DomainId,
    pub(crate) calling: DomainId,
    pub(crate) target: Arc<TypeDescriptor>,
}

impl DelegateBinding {
    /// Domain that owns the delegate instance
    pub fn owning_domain(&self) -> DomainId {
        self.owning
    }

    /// Domain whose code calls through the proxy
    pub fn calling_domain(&self) -> DomainId {
        self.calling
    }

    /// Target descriptor as the calling domain sees it
    pub fn target(&self) -> &Arc<TypeDescriptor> {
        &self.target
    }

    pub(crate) fn registry(&self) -> &Arc<DomainRegistry> {
        &self.registry
    }

    pub(crate) fn delegate(&self) -> &Arc<Instance> {
        &self.delegate
    }
}

pub(crate) struct ProxyState {
    pub(crate) binding: DelegateBinding,
    pub(crate) shape: Arc<AdapterShape>,
}

impl Object {
    pub(crate) fn from_instance(instance: Arc<Instance>) -> Self {
        Self {
            inner: ObjectInner::Real(instance),
        }
    }

    pub(crate) fn from_proxy(state: Arc<ProxyState>) -> Self {
        Self {
            inner: ObjectInner::Proxy(state),
        }
    }

    /// Whether this handle is a cross-domain proxy
    pub fn is_proxy(&self) -> bool {
        matches!(self.inner, ObjectInner::Proxy(_))
    }

    /// The adapter binding, when this handle is a proxy
    pub fn binding(&self) -> Option<&DelegateBinding> {
        match &self.inner {
            ObjectInner::Real(_) => None,
            ObjectInner::Proxy(state) => Some(&state.binding),
        }
    }

    /// Descriptor of the type this handle answers to
    ///
    /// For a real instance this is its concrete type; for a proxy it is the
    /// target descriptor in the calling domain's view.
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        match &self.inner {
            ObjectInner::Real(instance) => instance.descriptor(),
            ObjectInner::Proxy(state) => &state.binding.target,
        }
    }

    /// Identity of the underlying instance
    ///
    /// A proxy reports its delegate's identity, which is what makes
    /// repeated adaptation of the same instance idempotent.
    pub fn id(&self) -> InstanceId {
        self.underlying().id()
    }

    /// Domain whose code can use this handle natively
    pub fn domain(&self) -> DomainId {
        match &self.inner {
            ObjectInner::Real(instance) => instance.domain(),
            ObjectInner::Proxy(state) => state.binding.calling,
        }
    }

    /// The real instance behind this handle, unwrapping a proxy
    pub(crate) fn underlying(&self) -> &Arc<Instance> {
        match &self.inner {
            ObjectInner::Real(instance) => instance,
            ObjectInner::Proxy(state) => &state.binding.delegate,
        }
    }

    pub(crate) fn proxy_state(&self) -> Option<&Arc<ProxyState>> {
        match &self.inner {
            ObjectInner::Real(_) => None,
            ObjectInner::Proxy(state) => Some(state),
        }
    }

    /// Invoke a method member
    pub fn call(&self, member: &str, args: &[Value]) -> AdapterResult<Value> {
        self.dispatch(member, MemberKind::Method, args)
    }

    /// Read an accessor member
    pub fn get(&self, member: &str) -> AdapterResult<Value> {
        self.dispatch(member, MemberKind::Getter, &[])
    }

    /// Write an accessor member
    pub fn set(&self, member: &str, value: Value) -> AdapterResult<()> {
        self.dispatch(member, MemberKind::Setter, &[value]).map(|_| ())
    }

    fn dispatch(&self, member: &str, kind: MemberKind, args: &[Value]) -> AdapterResult<Value> {
        match &self.inner {
            ObjectInner::Real(instance) => {
                let descriptor = instance.descriptor();
                let signature = bridge::resolve_member(
                    descriptor.overloads(member),
                    descriptor.qualified_name(),
                    member,
                    kind,
                    args,
                )?;
                instance.call_local(signature, args)
            }
            ObjectInner::Proxy(state) => bridge::invoke(state, member, kind, args),
        }
    }
}

impl PartialEq for Object {
    /// Handle identity: same instance or same proxy, never structural
    fn eq(&self, other: &Self) -> bool {
        match (&self.inner, &other.inner) {
            (ObjectInner::Real(a), ObjectInner::Real(b)) => Arc::ptr_eq(a, b),
            (ObjectInner::Proxy(a), ObjectInner::Proxy(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            ObjectInner::Real(instance) => f
                .debug_struct("Object")
                .field("instance", instance)
                .finish(),
            ObjectInner::Proxy(state) => f
                .debug_struct("Object")
                .field("proxy_for", &state.binding.delegate)
                .field("target", &state.binding.target.qualified_name())
                .finish(),
        }
    }
}
