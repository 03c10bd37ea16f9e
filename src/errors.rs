//! Error types for cross-domain adaptation
//!
//! Every failure an adapter can produce is reported synchronously to the
//! caller of the operation that detected it. Nothing is retried and nothing
//! is silently swallowed: a classification failure for a single argument
//! aborts the whole call rather than substituting a default value.

use thiserror::Error;

/// Errors that can occur while adapting values across domains
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    /// A type could not be resolved within a domain
    #[error("Type not found: {name} in domain {domain}")]
    TypeResolution {
        /// Domain that was searched
        domain: String,
        /// Qualified name that was requested
        name: String,
    },

    /// No logically equal counterpart type exists on the other side
    #[error("No adaptable counterpart for type {type_name} in domain {domain}")]
    UnadaptableType {
        /// Qualified name of the value's concrete type
        type_name: String,
        /// Domain in which a counterpart was sought
        domain: String,
    },

    /// Overload resolution produced a tie between candidates
    #[error("Ambiguous overload resolution for {type_name}::{member}: {candidates} equally ranked candidates")]
    ResolutionAmbiguity {
        /// Type that declares the overloads
        type_name: String,
        /// Member name being resolved
        member: String,
        /// Number of equally ranked candidates
        candidates: usize,
    },

    /// A forwarded invocation failed; carries the translated cause
    ///
    /// The cause type and message are plain strings so calling-domain code
    /// can inspect a delegate-domain failure without being able to load the
    /// delegate's failure type.
    #[error("Invocation of {member} failed: {cause_type}: {message}")]
    AdaptedInvocation {
        /// Member whose invocation failed
        member: String,
        /// Qualified name of the underlying failure type
        cause_type: String,
        /// Message reported by the underlying failure
        message: String,
    },

    /// Enhancement could not determine a usable target type
    #[error("Cannot enhance value: {0}")]
    Unenhanceable(String),

    /// A member was requested that the type does not declare
    #[error("Member not found: {type_name}::{member}")]
    MemberNotFound {
        /// Type that was searched
        type_name: String,
        /// Member name that was requested
        member: String,
    },

    /// An operation touched a domain that has been deactivated
    #[error("Domain is no longer active: {0}")]
    DomainInactive(String),

    /// A failure raised by delegate code, typed in the delegate's domain
    ///
    /// Never escapes the invocation bridge untranslated; callers observe it
    /// as [`AdapterError::AdaptedInvocation`].
    #[error("{type_name}: {message}")]
    Raised {
        /// Qualified name of the failure type as the raising domain sees it
        type_name: String,
        /// Failure message
        message: String,
    },

    /// An invocation supplied the wrong number of arguments
    #[error("Arity mismatch for {member}: expected {expected} arguments, got {actual}")]
    ArityMismatch {
        /// Member being invoked
        member: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        actual: usize,
    },
}

/// Result type for adapter operations
pub type AdapterResult<T> = Result<T, AdapterError>;

impl AdapterError {
    /// Raise a failure typed in the raising domain
    pub fn raised(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        AdapterError::Raised {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Stable name of this error kind, used when translating failures
    pub fn kind_name(&self) -> &'static str {
        match self {
            AdapterError::TypeResolution { .. } => "TypeResolution",
            AdapterError::UnadaptableType { .. } => "UnadaptableType",
            AdapterError::ResolutionAmbiguity { .. } => "ResolutionAmbiguity",
            AdapterError::AdaptedInvocation { .. } => "AdaptedInvocation",
            AdapterError::Unenhanceable(_) => "Unenhanceable",
            AdapterError::MemberNotFound { .. } => "MemberNotFound",
            AdapterError::DomainInactive(_) => "DomainInactive",
            AdapterError::Raised { .. } => "Raised",
            AdapterError::ArityMismatch { .. } => "ArityMismatch",
        }
    }

    /// Check if this is a type or member resolution failure
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            AdapterError::TypeResolution { .. }
                | AdapterError::MemberNotFound { .. }
                | AdapterError::ResolutionAmbiguity { .. }
        )
    }

    /// Check if this failure came out of a forwarded invocation
    pub fn is_invocation_error(&self) -> bool {
        matches!(self, AdapterError::AdaptedInvocation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Test error display messages
    ///
    /// ```mermaid
    /// graph TD
    ///     A[AdapterError] -->|Display| B[Error Message]
    ///     A -->|kind_name| C[Stable Label]
    /// ```
    #[test]
    fn test_error_display_messages() {
        let err = AdapterError::TypeResolution {
            domain: "addon-a".to_string(),
            name: "mock.Contact".to_string(),
        };
        assert_eq!(err.to_string(), "Type not found: mock.Contact in domain addon-a");

        let err = AdapterError::UnadaptableType {
            type_name: "mock.Secret".to_string(),
            domain: "addon-a".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No adaptable counterpart for type mock.Secret in domain addon-a"
        );

        let err = AdapterError::ResolutionAmbiguity {
            type_name: "mock.Contact".to_string(),
            member: "blend".to_string(),
            candidates: 2,
        };
        assert_eq!(
            err.to_string(),
            "Ambiguous overload resolution for mock.Contact::blend: 2 equally ranked candidates"
        );

        let err = AdapterError::AdaptedInvocation {
            member: "explode".to_string(),
            cause_type: "mock.ExplosionError".to_string(),
            message: "kaboom".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invocation of explode failed: mock.ExplosionError: kaboom"
        );

        let err = AdapterError::Unenhanceable("no target type".to_string());
        assert_eq!(err.to_string(), "Cannot enhance value: no target type");

        let err = AdapterError::MemberNotFound {
            type_name: "mock.Contact".to_string(),
            member: "vanish".to_string(),
        };
        assert_eq!(err.to_string(), "Member not found: mock.Contact::vanish");

        let err = AdapterError::DomainInactive("addon-b".to_string());
        assert_eq!(err.to_string(), "Domain is no longer active: addon-b");

        let err = AdapterError::ArityMismatch {
            member: "greet".to_string(),
            expected: 1,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "Arity mismatch for greet: expected 1 arguments, got 3"
        );
    }

    #[test]
    fn test_raised_constructor() {
        let err = AdapterError::raised("mock.ExplosionError", "kaboom");
        assert_eq!(err.to_string(), "mock.ExplosionError: kaboom");
        assert_eq!(err.kind_name(), "Raised");
    }

    #[test]
    fn test_kind_names_are_stable() {
        let cases = vec![
            (
                AdapterError::TypeResolution {
                    domain: "a".into(),
                    name: "t".into(),
                },
                "TypeResolution",
            ),
            (
                AdapterError::UnadaptableType {
                    type_name: "t".into(),
                    domain: "a".into(),
                },
                "UnadaptableType",
            ),
            (AdapterError::Unenhanceable("x".into()), "Unenhanceable"),
            (AdapterError::DomainInactive("a".into()), "DomainInactive"),
        ];
        for (err, expected) in cases {
            assert_eq!(err.kind_name(), expected);
        }
    }

    #[test]
    fn test_is_resolution_error() {
        assert!(AdapterError::TypeResolution {
            domain: "a".into(),
            name: "t".into(),
        }
        .is_resolution_error());
        assert!(AdapterError::MemberNotFound {
            type_name: "t".into(),
            member: "m".into(),
        }
        .is_resolution_error());
        assert!(AdapterError::ResolutionAmbiguity {
            type_name: "t".into(),
            member: "m".into(),
            candidates: 2,
        }
        .is_resolution_error());

        assert!(!AdapterError::Unenhanceable("x".into()).is_resolution_error());
        assert!(!AdapterError::raised("t", "m").is_resolution_error());
    }

    #[test]
    fn test_is_invocation_error() {
        assert!(AdapterError::AdaptedInvocation {
            member: "m".into(),
            cause_type: "t".into(),
            message: "x".into(),
        }
        .is_invocation_error());
        assert!(!AdapterError::raised("t", "m").is_invocation_error());
    }

    #[test]
    fn test_all_errors_clone() {
        let errors = vec![
            AdapterError::TypeResolution {
                domain: "a".into(),
                name: "t".into(),
            },
            AdapterError::UnadaptableType {
                type_name: "t".into(),
                domain: "a".into(),
            },
            AdapterError::ResolutionAmbiguity {
                type_name: "t".into(),
                member: "m".into(),
                candidates: 2,
            },
            AdapterError::AdaptedInvocation {
                member: "m".into(),
                cause_type: "t".into(),
                message: "x".into(),
            },
            AdapterError::Unenhanceable("x".into()),
            AdapterError::MemberNotFound {
                type_name: "t".into(),
                member: "m".into(),
            },
            AdapterError::DomainInactive("a".into()),
            AdapterError::raised("t", "x"),
            AdapterError::ArityMismatch {
                member: "m".into(),
                expected: 1,
                actual: 2,
            },
        ];
        for err in errors {
            let cloned = err.clone();
            assert_eq!(err.to_string(), cloned.to_string());
        }
    }
}
