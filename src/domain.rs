//! Isolated type universes and the instances that live in them
//!
//! A [`Domain`] is one module's type universe: the descriptors it can
//! load, the behavior registered for them, and the instances created from
//! them. Domains are created at module activation and deactivated at
//! module deactivation; every proxy bound to a deactivated domain becomes
//! invalid.

use crate::descriptor::{MemberKind, MemberSignature, TypeDescriptor};
use crate::errors::{AdapterError, AdapterResult};
use crate::object::Object;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Opaque handle identifying a domain, stable for the domain's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainId(Uuid);

impl DomainId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of an object instance within its owning domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(Uuid);

impl InstanceId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Method body registered for a type within one domain
pub type MethodFn = Arc<dyn Fn(&Instance, &[Value]) -> AdapterResult<Value> + Send + Sync>;

/// Lazy type loading hook consulted when a name is not yet registered
pub type TypeLoader = Box<dyn Fn(&str) -> Option<Arc<TypeDescriptor>> + Send + Sync>;

/// Behavior registered for a type within one domain
///
/// Only methods carry bodies; getters and setters are always backed by the
/// instance's field map.
#[derive(Default, Clone)]
pub struct TypeImpl {
    methods: HashMap<String, MethodFn>,
}

impl TypeImpl {
    /// Create an empty implementation table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method body under a member name
    pub fn method<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> AdapterResult<Value> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(body));
        self
    }

    fn body(&self, name: &str) -> Option<&MethodFn> {
        self.methods.get(name)
    }
}

impl fmt::Debug for TypeImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        f.debug_struct("TypeImpl").field("methods", &names).finish()
    }
}

/// A real object instance living in its owning domain
pub struct Instance {
    id: InstanceId,
    domain: DomainId,
    domain_name: String,
    descriptor: Arc<TypeDescriptor>,
    fields: RwLock<HashMap<String, Value>>,
    methods: Arc<TypeImpl>,
}

impl Instance {
    /// Identity of this instance
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Handle of the domain that owns this instance
    pub fn domain(&self) -> DomainId {
        self.domain
    }

    /// Descriptor of this instance's concrete type
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Read a field directly, bypassing accessor dispatch
    pub fn field(&self, name: &str) -> Option<Value> {
        self.fields.read().unwrap().get(name).cloned()
    }

    /// Write a field directly, bypassing accessor dispatch
    pub fn set_field(&self, name: impl Into<String>, value: Value) {
        self.fields.write().unwrap().insert(name.into(), value);
    }

    /// Dispatch a resolved member against this instance
    ///
    /// Arguments must already be translated into this instance's domain.
    pub(crate) fn call_local(
        &self,
        member: &MemberSignature,
        args: &[Value],
    ) -> AdapterResult<Value> {
        match member.kind {
            MemberKind::Getter => Ok(self.field(&member.name).unwrap_or(Value::Unit)),
            MemberKind::Setter => {
                self.set_field(member.name.clone(), args[0].clone());
                Ok(Value::Unit)
            }
            MemberKind::Method => match self.methods.body(&member.name) {
                Some(body) => body(self, args),
                None => Err(AdapterError::MemberNotFound {
                    type_name: self.descriptor.qualified_name().to_string(),
                    member: member.name.clone(),
                }),
            },
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field("domain", &self.domain_name)
            .field("type", &self.descriptor.qualified_name())
            .finish()
    }
}

/// An isolated type universe owned by one module
pub struct Domain {
    id: DomainId,
    name: String,
    active: AtomicBool,
    types: RwLock<HashMap<String, Arc<TypeDescriptor>>>,
    impls: RwLock<HashMap<String, Arc<TypeImpl>>>,
    loader: RwLock<Option<TypeLoader>>,
}

impl Domain {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            id: DomainId::new(),
            name: name.into(),
            active: AtomicBool::new(true),
            types: RwLock::new(HashMap::new()),
            impls: RwLock::new(HashMap::new()),
            loader: RwLock::new(None),
        }
    }

    /// Handle of this domain
    pub fn id(&self) -> DomainId {
        self.id
    }

    /// Human readable domain name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this domain is still active
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub(crate) fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    fn ensure_active(&self) -> AdapterResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(AdapterError::DomainInactive(self.name.clone()))
        }
    }

    /// Register a type owned by this domain
    ///
    /// Returns the shared handle under which the descriptor is now known;
    /// registering that same handle into another domain via
    /// [`Domain::register_shared_type`] makes the type shared
    /// infrastructure between the two.
    pub fn register_type(&self, descriptor: TypeDescriptor) -> Arc<TypeDescriptor> {
        let descriptor = Arc::new(descriptor);
        self.types
            .write()
            .unwrap()
            .insert(descriptor.qualified_name().to_string(), descriptor.clone());
        descriptor
    }

    /// Register an identity-shared type descriptor
    ///
    /// A descriptor registered by handle into several domains is identical
    /// on every side, so values of the type pass through boundaries
    /// unchanged.
    pub fn register_shared_type(&self, descriptor: &Arc<TypeDescriptor>) {
        self.types
            .write()
            .unwrap()
            .insert(descriptor.qualified_name().to_string(), descriptor.clone());
    }

    /// Register behavior for a type
    pub fn register_impl(&self, qualified_name: impl Into<String>, type_impl: TypeImpl) {
        self.impls
            .write()
            .unwrap()
            .insert(qualified_name.into(), Arc::new(type_impl));
    }

    /// Install a lazy loading hook consulted on resolution misses
    ///
    /// Loaded descriptors are memoized, so repeated resolution of the same
    /// name calls the hook at most once.
    pub fn set_loader(&self, loader: TypeLoader) {
        *self.loader.write().unwrap() = Some(loader);
    }

    /// Resolve a type descriptor by qualified name
    pub fn resolve(&self, qualified_name: &str) -> AdapterResult<Arc<TypeDescriptor>> {
        self.ensure_active()?;

        if let Some(found) = self.types.read().unwrap().get(qualified_name) {
            return Ok(found.clone());
        }

        // Resolution miss: consult the lazy loader without holding the
        // types lock, then memoize whatever it produced.
        let loaded = match &*self.loader.read().unwrap() {
            Some(loader) => loader(qualified_name),
            None => None,
        };
        if let Some(descriptor) = loaded {
            let mut types = self.types.write().unwrap();
            return Ok(types
                .entry(qualified_name.to_string())
                .or_insert(descriptor)
                .clone());
        }

        Err(AdapterError::TypeResolution {
            domain: self.name.clone(),
            name: qualified_name.to_string(),
        })
    }

    /// Create a real instance of a type registered in this domain
    pub fn instantiate(&self, qualified_name: &str) -> AdapterResult<Object> {
        self.ensure_active()?;
        let descriptor = self.resolve(qualified_name)?;
        let methods = self
            .impls
            .read()
            .unwrap()
            .get(qualified_name)
            .cloned()
            .unwrap_or_default();

        Ok(Object::from_instance(Arc::new(Instance {
            id: InstanceId::new(),
            domain: self.id,
            domain_name: self.name.clone(),
            descriptor,
            fields: RwLock::new(HashMap::new()),
            methods,
        })))
    }
}

impl fmt::Debug for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Domain")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("active", &self.is_active())
            .finish()
    }
}
