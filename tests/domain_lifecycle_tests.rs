//! Domain deactivation and its effect on live adapters
//!
//! Deactivating a domain invalidates every proxy bound to it on either
//! side. Proxies between unrelated domains keep working.

use domain_bridge::{
    AdapterBuilder, AdapterError, Domain, DomainRegistry, Object, TypeDescriptor, TypeImpl,
    Value, ValueShape,
};
use std::sync::Arc;

fn contact_descriptor() -> TypeDescriptor {
    TypeDescriptor::builder("mock.Contact")
        .accessor("name", ValueShape::Text)
        .method("describe", vec![], ValueShape::Text)
        .build()
}

fn domain_with_contact(registry: &Arc<DomainRegistry>, name: &str) -> Arc<Domain> {
    let domain = registry.create_domain(name);
    domain.register_type(contact_descriptor());
    domain.register_impl(
        "mock.Contact",
        TypeImpl::new().method("describe", |instance, _args| {
            let name = instance
                .field("name")
                .and_then(|v| v.as_text().map(str::to_string))
                .unwrap_or_else(|| "unnamed".to_string());
            Ok(Value::Text(format!("contact {name}")))
        }),
    );
    domain
}

fn enhanced_proxy(
    registry: &Arc<DomainRegistry>,
    calling: &Arc<Domain>,
    delegate_domain: &Arc<Domain>,
) -> Object {
    let delegate = delegate_domain.instantiate("mock.Contact").unwrap();
    delegate.set("name", Value::from("bob")).unwrap();
    let enhanced = AdapterBuilder::new(registry)
        .calling_domain(calling)
        .delegate_domain(delegate_domain)
        .enhance(&Value::Object(delegate))
        .unwrap();
    enhanced.as_object().unwrap().clone()
}

#[test]
fn calls_fail_after_owning_domain_deactivates() {
    let registry = DomainRegistry::new();
    let host = domain_with_contact(&registry, "host");
    let dep = domain_with_contact(&registry, "dep");
    let proxy = enhanced_proxy(&registry, &host, &dep);

    assert_eq!(proxy.call("describe", &[]).unwrap(), Value::from("contact bob"));

    registry.deactivate(dep.id());
    let err = proxy.call("describe", &[]).unwrap_err();
    assert_eq!(err.to_string(), "Domain is no longer active: dep");
    assert!(proxy.get("name").is_err());
}

#[test]
fn calls_fail_after_calling_domain_deactivates() {
    let registry = DomainRegistry::new();
    let host = domain_with_contact(&registry, "host");
    let dep = domain_with_contact(&registry, "dep");
    let proxy = enhanced_proxy(&registry, &host, &dep);

    registry.deactivate(host.id());
    let err = proxy.call("describe", &[]).unwrap_err();
    assert!(matches!(err, AdapterError::DomainInactive(_)));
}

#[test]
fn enhancement_rejects_deactivated_domains() {
    let registry = DomainRegistry::new();
    let host = domain_with_contact(&registry, "host");
    let dep = domain_with_contact(&registry, "dep");
    let delegate = dep.instantiate("mock.Contact").unwrap();

    registry.deactivate(dep.id());
    let err = AdapterBuilder::new(&registry)
        .calling_domain(&host)
        .delegate_domain(&dep)
        .enhance(&Value::Object(delegate))
        .unwrap_err();
    assert!(matches!(err, AdapterError::DomainInactive(_)));
}

#[test]
fn instantiation_rejects_deactivated_domain() {
    let registry = DomainRegistry::new();
    let dep = domain_with_contact(&registry, "dep");
    registry.deactivate(dep.id());

    let err = dep.instantiate("mock.Contact").unwrap_err();
    assert!(matches!(err, AdapterError::DomainInactive(_)));
}

#[test]
fn unrelated_proxies_survive_deactivation() {
    let registry = DomainRegistry::new();
    let host = domain_with_contact(&registry, "host");
    let dep = domain_with_contact(&registry, "dep");
    let bystander = domain_with_contact(&registry, "bystander");
    let proxy = enhanced_proxy(&registry, &host, &dep);

    registry.deactivate(bystander.id());
    assert_eq!(proxy.call("describe", &[]).unwrap(), Value::from("contact bob"));
}

#[test]
fn fresh_proxies_after_reactivation_under_new_identity() {
    let registry = DomainRegistry::new();
    let host = domain_with_contact(&registry, "host");
    let dep = domain_with_contact(&registry, "dep");
    let stale = enhanced_proxy(&registry, &host, &dep);

    registry.deactivate(dep.id());

    // a replacement domain under the same name is a new identity; new
    // adapters work while the stale one stays invalid
    let dep_reborn = domain_with_contact(&registry, "dep");
    assert_ne!(dep.id(), dep_reborn.id());

    let fresh = enhanced_proxy(&registry, &host, &dep_reborn);
    assert_eq!(fresh.call("describe", &[]).unwrap(), Value::from("contact bob"));
    assert!(stale.call("describe", &[]).is_err());
}
