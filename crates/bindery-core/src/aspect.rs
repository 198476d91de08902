//! Aspects: named, independently bindable facets of a property.
//!
//! An [`Aspect`] is a cheap request object created per resolution call. It
//! either carries a fixed value ([`ValuePresence::Static`]) that the chain
//! returns as is, or nothing ([`ValuePresence::Absent`]) which asks the chain
//! to resolve the aspect from the model.
//!
//! Two aspects are equal when their names are equal.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::value::{BindValue, Value};

/// Well-known aspect names.
pub mod names {
    /// The current value of a property.
    pub const VALUE: &str = "value";
    pub const ENABLED: &str = "enabled";
    pub const VISIBLE: &str = "visible";
    pub const REQUIRED: &str = "required";
    pub const AVAILABLE_VALUES: &str = "availableValues";
    pub const CAPTION: &str = "caption";
    pub const TOOLTIP: &str = "tooltip";
    /// Row collection of a container property.
    pub const ITEMS: &str = "items";
    /// Summary row of a container property.
    pub const FOOTER: &str = "footer";
    /// Invocation of an action member.
    pub const INVOKE: &str = "invoke";
}

/// Whether an aspect request carries its value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValuePresence<T> {
    /// Ask the chain.
    Absent,
    /// Use exactly this value.
    Static(T),
}

/// A named aspect request, optionally carrying a fixed value.
#[derive(Clone)]
pub struct Aspect<T = Value> {
    name: Cow<'static, str>,
    presence: ValuePresence<T>,
}

impl<T> Aspect<T> {
    /// An aspect to be resolved by the chain.
    #[must_use]
    pub fn of(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            presence: ValuePresence::Absent,
        }
    }

    /// An aspect carrying a fixed value.
    #[must_use]
    pub fn with_value(name: impl Into<Cow<'static, str>>, value: T) -> Self {
        Self {
            name: name.into(),
            presence: ValuePresence::Static(value),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_value_present(&self) -> bool {
        matches!(self.presence, ValuePresence::Static(_))
    }

    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match &self.presence {
            ValuePresence::Static(v) => Some(v),
            ValuePresence::Absent => None,
        }
    }

    #[must_use]
    pub fn presence(&self) -> &ValuePresence<T> {
        &self.presence
    }

    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self.presence {
            ValuePresence::Static(v) => Some(v),
            ValuePresence::Absent => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Aspect<U> {
        Aspect {
            name: self.name,
            presence: match self.presence {
                ValuePresence::Static(v) => ValuePresence::Static(f(v)),
                ValuePresence::Absent => ValuePresence::Absent,
            },
        }
    }
}

impl<T: BindValue> Aspect<T> {
    /// Erase the value type for dispatch.
    #[must_use]
    pub fn into_dynamic(self) -> Aspect<Value> {
        self.map(BindValue::into_value)
    }
}

impl<T> PartialEq for Aspect<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for Aspect<T> {}

impl<T> Hash for Aspect<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<T: fmt::Debug> fmt::Debug for Aspect<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.presence {
            ValuePresence::Absent => write!(f, "Aspect({})", self.name),
            ValuePresence::Static(v) => write!(f, "Aspect({} = {v:?})", self.name),
        }
    }
}

/// Name of the model member answering `aspect` for `property`.
///
/// The value, row collection and invocation aspects map to the property
/// itself; every other aspect maps to the property name followed by the
/// capitalized aspect name (`name` + `enabled` → `nameEnabled`).
#[must_use]
pub fn member_name(property: &str, aspect: &str) -> String {
    match aspect {
        names::VALUE | names::ITEMS | names::INVOKE | "" => property.to_owned(),
        _ => {
            let mut out = String::with_capacity(property.len() + aspect.len());
            out.push_str(property);
            let mut chars = aspect.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_name() {
        let a: Aspect = Aspect::with_value(names::ENABLED, Value::Bool(true));
        let b: Aspect = Aspect::of(names::ENABLED);
        assert_eq!(a, b);
        assert_ne!(a, Aspect::of(names::VISIBLE));
    }

    #[test]
    fn presence() {
        let absent: Aspect<bool> = Aspect::of(names::VISIBLE);
        assert!(!absent.is_value_present());
        assert_eq!(absent.value(), None);

        let fixed = Aspect::with_value(names::VISIBLE, false);
        assert!(fixed.is_value_present());
        assert_eq!(fixed.clone().into_dynamic().value(), Some(&Value::Bool(false)));
        assert_eq!(fixed.into_value(), Some(false));
    }

    #[test]
    fn member_names() {
        assert_eq!(member_name("foo", names::VALUE), "foo");
        assert_eq!(member_name("foo", names::ENABLED), "fooEnabled");
        assert_eq!(member_name("foo", names::AVAILABLE_VALUES), "fooAvailableValues");
        assert_eq!(member_name("rows", names::ITEMS), "rows");
        assert_eq!(member_name("rows", names::FOOTER), "rowsFooter");
    }

    #[test]
    fn debug_shows_value() {
        let a = Aspect::with_value(names::CAPTION, "Name".to_string());
        assert_eq!(format!("{a:?}"), "Aspect(caption = \"Name\")");
    }
}
