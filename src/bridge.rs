//! Invocation bridge: forwarding proxy calls across the boundary
//!
//! Each forwarded call is stateless start to finish: resolve the member on
//! the delegate's real type, translate every argument into the owning
//! domain, invoke, translate the result back into the calling domain. A
//! failure from the underlying invocation is translated the same way as a
//! return value would be: calling-domain code only ever observes an
//! [`AdapterError::AdaptedInvocation`] whose cause is carried as plain
//! strings, never a failure type it cannot load.

use crate::classify::translate;
use crate::descriptor::{MemberKind, MemberSignature};
use crate::errors::{AdapterError, AdapterResult};
use crate::object::ProxyState;
use crate::value::Value;
use tracing::trace;

/// Resolve a member among overloads by kind and translated argument shape
///
/// Candidates are filtered to the requested kind and exact parameter
/// count, then ranked structurally: an exactly matching parameter shape
/// outranks one that merely accepts the argument. A tie at the best rank
/// is ambiguous and reported as such rather than resolved arbitrarily.
pub(crate) fn resolve_member<'a>(
    overloads: &'a [MemberSignature],
    type_name: &str,
    member: &str,
    kind: MemberKind,
    args: &[Value],
) -> AdapterResult<&'a MemberSignature> {
    let of_kind: Vec<&MemberSignature> =
        overloads.iter().filter(|m| m.kind == kind).collect();
    if of_kind.is_empty() {
        return Err(AdapterError::MemberNotFound {
            type_name: type_name.to_string(),
            member: member.to_string(),
        });
    }

    let arity_matched: Vec<&MemberSignature> = of_kind
        .iter()
        .copied()
        .filter(|m| m.params.len() == args.len())
        .collect();
    if arity_matched.is_empty() {
        // report the declared arity closest to what the caller supplied
        let expected = of_kind
            .iter()
            .map(|m| m.params.len())
            .min_by_key(|declared| declared.abs_diff(args.len()))
            .unwrap_or_default();
        return Err(AdapterError::ArityMismatch {
            member: member.to_string(),
            expected,
            actual: args.len(),
        });
    }

    let arg_shapes: Vec<_> = args.iter().map(Value::shape).collect();
    let mut best_score = 0u32;
    let mut best: Vec<&MemberSignature> = Vec::new();

    for candidate in arity_matched {
        let mut score = 1u32;
        let mut compatible = true;
        for (declared, actual) in candidate.params.iter().zip(&arg_shapes) {
            if declared == actual {
                score += 2;
            } else if declared.accepts(actual) {
                score += 1;
            } else {
                compatible = false;
                break;
            }
        }
        if !compatible {
            continue;
        }
        if score > best_score {
            best_score = score;
            best = vec![candidate];
        } else if score == best_score {
            best.push(candidate);
        }
    }

    match best.len() {
        0 => Err(AdapterError::MemberNotFound {
            type_name: type_name.to_string(),
            member: member.to_string(),
        }),
        1 => Ok(best[0]),
        n => Err(AdapterError::ResolutionAmbiguity {
            type_name: type_name.to_string(),
            member: member.to_string(),
            candidates: n,
        }),
    }
}

/// Execute one forwarded call against a proxy's delegate
pub(crate) fn invoke(
    state: &ProxyState,
    member: &str,
    kind: MemberKind,
    args: &[Value],
) -> AdapterResult<Value> {
    let binding = &state.binding;
    let registry = binding.registry();
    let owning = registry.active_domain(binding.owning_domain())?;
    let calling = registry.active_domain(binding.calling_domain())?;

    trace!(
        member,
        target_type = binding.target().qualified_name(),
        owning = owning.name(),
        calling = calling.name(),
        args = %crate::value::Value::List(args.to_vec()).to_json(),
        "forwarding call across domains"
    );

    // Arguments cross into the owning domain before the member is chosen,
    // so overload selection sees the shapes the delegate will receive.
    let mut translated = Vec::with_capacity(args.len());
    for arg in args {
        translated.push(translate(registry, arg, &owning)?);
    }

    let overloads = state.shape.overloads(member).ok_or_else(|| {
        AdapterError::MemberNotFound {
            type_name: state.shape.target().qualified_name().to_string(),
            member: member.to_string(),
        }
    })?;
    let signature = resolve_member(
        overloads,
        binding.target().qualified_name(),
        member,
        kind,
        &translated,
    )?;

    match binding.delegate().call_local(signature, &translated) {
        Ok(result) => {
            let result = translate(registry, &result, &calling)?;
            trace!(member, result = %result.to_json(), "call returned across domains");
            Ok(result)
        }
        Err(failure) => Err(translate_failure(member, failure)),
    }
}

/// Translate a delegate-side failure into one the calling domain can hold
fn translate_failure(member: &str, failure: AdapterError) -> AdapterError {
    let (cause_type, message) = match failure {
        AdapterError::Raised { type_name, message } => (type_name, message),
        other => (other.kind_name().to_string(), other.to_string()),
    };
    AdapterError::AdaptedInvocation {
        member: member.to_string(),
        cause_type,
        message,
    }
}
