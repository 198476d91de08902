//! Dynamic values flowing through the dispatch chain.
//!
//! Aspects are resolved through an object-safe chain, so every resolved value
//! travels as a [`Value`]. Typed code converts at the edges with
//! [`BindValue`].

use std::fmt;

use crate::model::ObjectRef;

/// A resolved aspect value.
///
/// Objects compare by identity, floats by bit pattern (so `NaN == NaN` and
/// `0.0 != -0.0`), everything else by value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
    Object(ObjectRef),
}

/// Shape of a [`Value`], used for accessor declarations and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Text,
    List,
    Object,
    /// Any shape; used by members declared as raw [`Value`].
    Any,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Text => "text",
            Self::List => "list",
            Self::Object => "object",
            Self::Any => "any",
        };
        f.write_str(name)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Value {
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Text(_) => ValueKind::Text,
            Self::List(_) => ValueKind::List,
            Self::Object(_) => ValueKind::Object,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str(""),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Object(obj) => write!(f, "{obj:?}"),
        }
    }
}

/// Conversion between a Rust type and [`Value`].
///
/// `from_value` hands the value back on mismatch so callers can report what
/// they actually received.
pub trait BindValue: Sized {
    /// Declared shape of this type.
    const KIND: ValueKind;

    fn into_value(self) -> Value;

    fn from_value(value: Value) -> Result<Self, Value>;
}

impl BindValue for Value {
    const KIND: ValueKind = ValueKind::Any;

    fn into_value(self) -> Value {
        self
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        Ok(value)
    }
}

impl BindValue for () {
    const KIND: ValueKind = ValueKind::Null;

    fn into_value(self) -> Value {
        Value::Null
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Null => Ok(()),
            other => Err(other),
        }
    }
}

impl BindValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(other),
        }
    }
}

impl BindValue for i64 {
    const KIND: ValueKind = ValueKind::Int;

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Int(i) => Ok(i),
            other => Err(other),
        }
    }
}

impl BindValue for i32 {
    const KIND: ValueKind = ValueKind::Int;

    fn into_value(self) -> Value {
        Value::Int(i64::from(self))
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Int(i) => i32::try_from(i).map_err(|_| Value::Int(i)),
            other => Err(other),
        }
    }
}

impl BindValue for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Float(x) => Ok(x),
            Value::Int(i) => Ok(i as f64),
            other => Err(other),
        }
    }
}

impl BindValue for String {
    const KIND: ValueKind = ValueKind::Text;

    fn into_value(self) -> Value {
        Value::Text(self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(other),
        }
    }
}

impl BindValue for ObjectRef {
    const KIND: ValueKind = ValueKind::Object;

    fn into_value(self) -> Value {
        Value::Object(self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Object(obj) => Ok(obj),
            other => Err(other),
        }
    }
}

impl<T: BindValue> BindValue for Option<T> {
    const KIND: ValueKind = T::KIND;

    fn into_value(self) -> Value {
        self.map_or(Value::Null, BindValue::into_value)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: BindValue> BindValue for Vec<T> {
    const KIND: ValueKind = ValueKind::List;

    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(BindValue::into_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        let Value::List(items) = value else {
            return Err(value);
        };
        let mut out = Vec::with_capacity(items.len());
        let mut iter = items.into_iter();
        while let Some(item) = iter.next() {
            match T::from_value(item) {
                Ok(v) => out.push(v),
                Err(bad) => {
                    // Rebuild the original list for the error report.
                    let mut original: Vec<Value> =
                        out.into_iter().map(BindValue::into_value).collect();
                    original.push(bad);
                    original.extend(iter);
                    return Err(Value::List(original));
                }
            }
        }
        Ok(out)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Self::Object(obj)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}
