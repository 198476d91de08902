//! Error type shared by the dispatch chain, aspect definitions and bindings.
//!
//! Only programming errors and refresh failures are errors. A behavior veto
//! is routine control flow and never produces a [`BindingError`].

use thiserror::Error;

/// Errors raised while resolving, writing or refreshing bound properties.
#[derive(Debug, Error)]
pub enum BindingError {
    /// No stage of the chain could answer a pull for this property/aspect.
    #[error("cannot resolve property '{property}' (aspect '{aspect}') on any of {candidates:?}")]
    UnresolvableProperty {
        property: String,
        aspect: String,
        candidates: Vec<String>,
    },

    /// A push reached the end of the chain without finding a writable member.
    #[error("cannot write property '{property}' (aspect '{aspect}') on any of {candidates:?}")]
    NotWritable {
        property: String,
        aspect: String,
        candidates: Vec<String>,
    },

    /// The member exists but has no getter.
    #[error("property '{property}' of {owner} is not readable")]
    NotReadable { property: String, owner: String },

    /// Configuration declares the property immutable.
    #[error("property '{property}' is declared read-only")]
    ReadOnly { property: String },

    /// A resolved or pushed value has the wrong shape.
    #[error("type mismatch for '{property}': expected {expected}, found {found}")]
    TypeMismatch {
        property: String,
        expected: String,
        found: String,
    },

    /// An aspect definition that requires a widget capability was applied to
    /// a widget without it.
    #[error("widget {widget} cannot display aspect '{aspect}': missing capability {capability}")]
    MissingCapability {
        widget: String,
        aspect: String,
        capability: String,
    },

    /// A failure while refreshing one binding, with the binding identity.
    #[error("failed to refresh {widget} bound to '{property}': {source}")]
    Refresh {
        widget: String,
        property: String,
        #[source]
        source: Box<BindingError>,
    },

    /// A decision table could not be loaded.
    #[error("invalid binding configuration: {0}")]
    InvalidConfig(String),
}

impl BindingError {
    /// Wrap this error with the identity of the binding being refreshed.
    ///
    /// Errors that already carry a binding identity are returned unchanged so
    /// nested containers report the innermost failing binding.
    #[must_use]
    pub fn in_binding(self, widget: impl Into<String>, property: impl Into<String>) -> Self {
        match self {
            Self::Refresh { .. } => self,
            other => Self::Refresh {
                widget: widget.into(),
                property: property.into(),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, looking through refresh wrappers.
    #[must_use]
    pub fn root_cause(&self) -> &BindingError {
        match self {
            Self::Refresh { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type BindingResult<T> = Result<T, BindingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolvable_names_property_and_candidates() {
        let err = BindingError::UnresolvableProperty {
            property: "foo".into(),
            aspect: "value".into(),
            candidates: vec!["Person".into(), "PersonPmo".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'foo'"));
        assert!(msg.contains("Person"));
        assert!(msg.contains("PersonPmo"));
    }

    #[test]
    fn in_binding_wraps_once() {
        let err = BindingError::ReadOnly {
            property: "foo".into(),
        }
        .in_binding("TextField#1", "foo")
        .in_binding("Table#2", "rows");
        match &err {
            BindingError::Refresh { widget, .. } => assert_eq!(widget, "TextField#1"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(err.root_cause(), BindingError::ReadOnly { .. }));
    }
}
