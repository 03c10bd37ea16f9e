//! Dynamic values crossing domain boundaries
//!
//! Everything that flows through the adapter is a [`Value`]. Primitive
//! kinds are shared infrastructure and pass through every boundary
//! unchanged; lists are rebuilt element-wise on each crossing; objects
//! carry their owning domain with them and are the only kind that can
//! require adaptation.

use crate::object::Object;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// A dynamic value as seen by cross-domain code
#[derive(Debug, Clone)]
pub enum Value {
    /// No value
    Unit,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Text value
    Text(String),
    /// Ordered collection; rebuilt element-wise when crossing a boundary
    List(Vec<Value>),
    /// An object instance owned by some domain, or a proxy onto one
    Object(Object),
}

/// The structural shape of a value or member parameter
///
/// Shapes are what member signatures are made of, and what overload
/// resolution compares. Object shapes carry the qualified type name only;
/// whether two object shapes are compatible across domains is decided by
/// classification, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueShape {
    /// Unconstrained shape, produced by empty lists
    Any,
    /// Shape of [`Value::Unit`]
    Unit,
    /// Shape of [`Value::Bool`]
    Bool,
    /// Shape of [`Value::Int`]
    Int,
    /// Shape of [`Value::Float`]
    Float,
    /// Shape of [`Value::Text`]
    Text,
    /// Shape of [`Value::List`] with the element shape
    List(Box<ValueShape>),
    /// Shape of [`Value::Object`] carrying the qualified type name
    Object(String),
}

impl ValueShape {
    /// Object shape for a qualified type name
    pub fn object(qualified_name: impl Into<String>) -> Self {
        ValueShape::Object(qualified_name.into())
    }

    /// List shape with the given element shape
    pub fn list(element: ValueShape) -> Self {
        ValueShape::List(Box::new(element))
    }

    /// Whether a value of shape `actual` is acceptable where `self` is declared
    ///
    /// Primitives match exactly, lists match element-wise, and any object
    /// shape accepts any other object shape: the classifier has the final
    /// say on object compatibility during translation.
    pub fn accepts(&self, actual: &ValueShape) -> bool {
        match (self, actual) {
            (ValueShape::Any, _) | (_, ValueShape::Any) => true,
            (ValueShape::List(a), ValueShape::List(b)) => a.accepts(b),
            (ValueShape::Object(_), ValueShape::Object(_)) => true,
            (a, b) => a == b,
        }
    }
}

impl Value {
    /// The structural shape of this value
    pub fn shape(&self) -> ValueShape {
        match self {
            Value::Unit => ValueShape::Unit,
            Value::Bool(_) => ValueShape::Bool,
            Value::Int(_) => ValueShape::Int,
            Value::Float(_) => ValueShape::Float,
            Value::Text(_) => ValueShape::Text,
            Value::List(items) => ValueShape::List(Box::new(
                items.first().map(|v| v.shape()).unwrap_or(ValueShape::Any),
            )),
            Value::Object(obj) => {
                ValueShape::Object(obj.descriptor().qualified_name().to_string())
            }
        }
    }

    /// Text content, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean content, if this is a boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer content, if this is an integer value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// List elements, if this is a list value
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Object handle, if this is an object value
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Diagnostic JSON rendering
    ///
    /// Objects render as their type name, instance id and proxy flag.
    /// Used in the bridge's trace output, never for transport.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Unit => json!(null),
            Value::Bool(b) => json!(b),
            Value::Int(i) => json!(i),
            Value::Float(f) => json!(f),
            Value::Text(s) => json!(s),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(|v| v.to_json()).collect())
            }
            Value::Object(obj) => json!({
                "type": obj.descriptor().qualified_name(),
                "instance": obj.id().to_string(),
                "proxied": obj.is_proxy(),
            }),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            // Objects compare by handle identity, never structurally
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(obj)
    }
}
