//! # Domain Bridge
//!
//! Cross-domain object adapter for modular plugin containers where every
//! module owns its own isolated type universe.
//!
//! Given an object instance belonging to domain B and a target type known
//! in domain A, this crate produces a proxy usable as that type in domain
//! A whose member calls are transparently forwarded to the real instance
//! in domain B, translating arguments and return values across the
//! boundary as needed:
//!
//! - **Domain**: an isolated type universe with its own descriptors,
//!   behavior tables and instances
//! - **Passthrough classification**: per-value decision between forwarding
//!   unchanged, unwrapping an existing adapter, or adapting
//! - **Adapter factory**: cached proxy synthesis per (owning domain,
//!   calling domain, target type) shape
//! - **Invocation bridge**: stateless per-call forwarding with recursive
//!   argument, return and failure translation
//! - **Enhancement builder**: the public configuration + `enhance` entry
//!   point
//!
//! ## Design Principles
//!
//! 1. **Transparency**: a proxy is interchangeable with the value it
//!    adapts; calls execute against the domain that owns the instance
//! 2. **Identity**: type identity is the descriptor handle, never the
//!    name; logically equal types adapt, identical types pass through
//! 3. **No double wrapping**: re-adapting a value for the same domain
//!    pair returns the cached proxy or unwraps, never nests
//! 4. **No silent loss**: an untranslatable argument or return aborts its
//!    call; failures cross the boundary translated, never raw
//!
//! ## Example
//!
//! ```
//! use domain_bridge::{AdapterBuilder, DomainRegistry, TypeDescriptor, Value, ValueShape, is_adapted};
//!
//! let registry = DomainRegistry::new();
//! let host = registry.create_domain("host");
//! let addon = registry.create_domain("addon");
//!
//! // both domains carry their own copy of the same logical type
//! let descriptor = || TypeDescriptor::builder("mock.Contact")
//!     .accessor("name", ValueShape::Text)
//!     .build();
//! host.register_type(descriptor());
//! addon.register_type(descriptor());
//!
//! let contact = addon.instantiate("mock.Contact").unwrap();
//! contact.set("name", Value::from("alice")).unwrap();
//!
//! let enhanced = AdapterBuilder::new(&registry)
//!     .calling_domain(&host)
//!     .delegate_domain(&addon)
//!     .enhance(&Value::Object(contact))
//!     .unwrap();
//!
//! assert!(is_adapted(&enhanced));
//! let proxy = enhanced.as_object().unwrap();
//! assert_eq!(proxy.get("name").unwrap(), Value::from("alice"));
//! ```

#![warn(missing_docs)]

mod bridge;
mod classify;
mod descriptor;
mod domain;
mod enhance;
mod errors;
mod factory;
mod object;
mod registry;
mod value;

pub use classify::{classify, Classification};
pub use descriptor::{MemberKind, MemberSignature, TypeDescriptor, TypeDescriptorBuilder};
pub use domain::{Domain, DomainId, Instance, InstanceId, MethodFn, TypeImpl, TypeLoader};
pub use enhance::{is_adapted, AdapterBuilder};
pub use errors::{AdapterError, AdapterResult};
pub use object::{DelegateBinding, Object};
pub use registry::DomainRegistry;
pub use value::{Value, ValueShape};
