//! Type descriptors and member signatures
//!
//! A [`TypeDescriptor`] is one domain's view of a type: a qualified name
//! plus the set of member signatures visible on it. Two descriptors from
//! different domains are *logically equal* when their qualified names and
//! member shapes match; they are never identity-equal. Identity is carried
//! by the `Arc` the descriptor lives in: a shared infrastructure type is
//! the same `Arc` registered into several domains.

use crate::value::ValueShape;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The kind of a type member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberKind {
    /// A callable method
    Method,
    /// A property read accessor; no parameters
    Getter,
    /// A property write accessor; one parameter, returns unit
    Setter,
}

/// Signature of a single member as seen inside one domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSignature {
    /// Member name
    pub name: String,
    /// Whether this is a method, getter or setter
    pub kind: MemberKind,
    /// Parameter shapes, in order
    pub params: Vec<ValueShape>,
    /// Return shape
    pub returns: ValueShape,
}

/// One domain's descriptor for a type
///
/// Member tables are ordered so that dispatch tables derived from a
/// descriptor are deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDescriptor {
    qualified_name: String,
    supers: Vec<String>,
    members: IndexMap<String, Vec<MemberSignature>>,
}

impl TypeDescriptor {
    /// Start building a descriptor for the given qualified name
    pub fn builder(qualified_name: impl Into<String>) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder {
            qualified_name: qualified_name.into(),
            supers: Vec::new(),
            members: IndexMap::new(),
        }
    }

    /// The fully qualified type name
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Qualified names of super types, most derived first
    pub fn supers(&self) -> &[String] {
        &self.supers
    }

    /// Iterate all member signatures in declaration order
    pub fn members(&self) -> impl Iterator<Item = &MemberSignature> {
        self.members.values().flatten()
    }

    /// All signatures declared under a member name, every kind included
    pub fn overloads(&self, name: &str) -> &[MemberSignature] {
        self.members.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any member with this name is declared
    pub fn has_member(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// The getter/setter pair declared under a member name, if any
    pub fn accessor_pair(
        &self,
        name: &str,
    ) -> (Option<&MemberSignature>, Option<&MemberSignature>) {
        let getter = self
            .overloads(name)
            .iter()
            .find(|m| m.kind == MemberKind::Getter);
        let setter = self
            .overloads(name)
            .iter()
            .find(|m| m.kind == MemberKind::Setter);
        (getter, setter)
    }

    /// Logical equality: same qualified name and member shapes
    ///
    /// Never compares identity. Two domains each compiling their own copy
    /// of a type produce distinct descriptors that are logically equal.
    pub fn logically_equal(&self, other: &TypeDescriptor) -> bool {
        self.qualified_name == other.qualified_name && self.members == other.members
    }
}

/// Builder for [`TypeDescriptor`]
pub struct TypeDescriptorBuilder {
    qualified_name: String,
    supers: Vec<String>,
    members: IndexMap<String, Vec<MemberSignature>>,
}

impl TypeDescriptorBuilder {
    /// Declare a super type; call order determines derivation order
    pub fn extends(mut self, qualified_name: impl Into<String>) -> Self {
        self.supers.push(qualified_name.into());
        self
    }

    /// Declare a method member
    pub fn method(
        mut self,
        name: impl Into<String>,
        params: Vec<ValueShape>,
        returns: ValueShape,
    ) -> Self {
        let name = name.into();
        self.members.entry(name.clone()).or_default().push(MemberSignature {
            name,
            kind: MemberKind::Method,
            params,
            returns,
        });
        self
    }

    /// Declare a getter member
    pub fn getter(mut self, name: impl Into<String>, shape: ValueShape) -> Self {
        let name = name.into();
        self.members.entry(name.clone()).or_default().push(MemberSignature {
            name,
            kind: MemberKind::Getter,
            params: Vec::new(),
            returns: shape,
        });
        self
    }

    /// Declare a setter member
    pub fn setter(mut self, name: impl Into<String>, shape: ValueShape) -> Self {
        let name = name.into();
        self.members.entry(name.clone()).or_default().push(MemberSignature {
            name,
            kind: MemberKind::Setter,
            params: vec![shape],
            returns: ValueShape::Unit,
        });
        self
    }

    /// Declare a getter/setter pair under one member name
    pub fn accessor(self, name: impl Into<String>, shape: ValueShape) -> Self {
        let name = name.into();
        self.getter(name.clone(), shape.clone()).setter(name, shape)
    }

    /// Finish building the descriptor
    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor {
            qualified_name: self.qualified_name,
            supers: self.supers,
            members: self.members,
        }
    }
}
