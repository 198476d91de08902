//! Per-property decision tables.
//!
//! A [`PropertyConfig`] is the already-resolved declarative configuration of
//! one bound property: for every aspect it says whether the aspect is fixed
//! (and to what) or resolved dynamically from the model. Where the table
//! comes from is the application's business; this module only defines its
//! shape, a fluent builder and (with the `config` feature) a TOML loader.
//!
//! # TOML shape
//!
//! ```toml
//! [PersonPmo.name]
//! enabled = "dynamic"
//! required = "required-if-enabled"
//! caption = { static = "Name" }
//!
//! [PersonPmo.country]
//! available-values = { fixed = ["CH", "DE", "AT"] }
//! writability = "read-only"
//! ```

use std::collections::BTreeMap;
use std::rc::Rc;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::aspect::names;
use crate::error::{BindingError, BindingResult};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "kebab-case"))]
pub enum EnabledType {
    #[default]
    Enabled,
    Disabled,
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "kebab-case"))]
pub enum VisibleType {
    #[default]
    Visible,
    Invisible,
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "kebab-case"))]
pub enum RequiredType {
    #[default]
    NotRequired,
    Required,
    /// Required exactly when the property is enabled.
    RequiredIfEnabled,
    Dynamic,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "kebab-case"))]
pub enum AvailableValuesType {
    /// The widget offers no option list.
    #[default]
    NoValues,
    /// A fixed list of textual options.
    Fixed(Vec<String>),
    Dynamic,
}

/// Mode of a textual aspect such as caption or tooltip.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "kebab-case"))]
pub enum TextType {
    /// The aspect is not bound at all.
    #[default]
    None,
    /// A fixed text, subject to localization.
    Static(String),
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "kebab-case"))]
pub enum Writability {
    #[default]
    Editable,
    /// Writes through the value aspect are rejected.
    ReadOnly,
}

/// What the configuration says about one aspect.
#[derive(Debug, Clone, PartialEq)]
pub enum Declared {
    /// Always this value.
    Fixed(Value),
    /// Resolve from the model.
    Dynamic,
    /// The configuration has no opinion.
    Unspecified,
}

/// Decision table for one bound property.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default, rename_all = "kebab-case"))]
pub struct PropertyConfig {
    pub enabled: EnabledType,
    pub visible: VisibleType,
    pub required: RequiredType,
    pub available_values: AvailableValuesType,
    pub caption: TextType,
    pub tooltip: TextType,
    pub writability: Writability,
    /// Member name used on the nested model object, if it differs from the
    /// view-model property.
    pub model_attribute: Option<String>,
    /// Containers only: resolve the footer aspect on every refresh.
    pub footer: bool,
}

impl PropertyConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn enabled(mut self, enabled: EnabledType) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn visible(mut self, visible: VisibleType) -> Self {
        self.visible = visible;
        self
    }

    #[must_use]
    pub fn required(mut self, required: RequiredType) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn available_values(mut self, available_values: AvailableValuesType) -> Self {
        self.available_values = available_values;
        self
    }

    #[must_use]
    pub fn caption(mut self, caption: TextType) -> Self {
        self.caption = caption;
        self
    }

    /// Shorthand for a static caption.
    #[must_use]
    pub fn with_caption(self, caption: impl Into<String>) -> Self {
        self.caption(TextType::Static(caption.into()))
    }

    #[must_use]
    pub fn tooltip(mut self, tooltip: TextType) -> Self {
        self.tooltip = tooltip;
        self
    }

    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.writability = Writability::ReadOnly;
        self
    }

    #[must_use]
    pub fn model_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.model_attribute = Some(attribute.into());
        self
    }

    #[must_use]
    pub fn with_footer(mut self) -> Self {
        self.footer = true;
        self
    }

    /// The configured decision for `aspect`.
    #[must_use]
    pub fn declared(&self, aspect: &str) -> Declared {
        match aspect {
            names::ENABLED => match self.enabled {
                EnabledType::Enabled => Declared::Fixed(Value::Bool(true)),
                EnabledType::Disabled => Declared::Fixed(Value::Bool(false)),
                EnabledType::Dynamic => Declared::Dynamic,
            },
            names::VISIBLE => match self.visible {
                VisibleType::Visible => Declared::Fixed(Value::Bool(true)),
                VisibleType::Invisible => Declared::Fixed(Value::Bool(false)),
                VisibleType::Dynamic => Declared::Dynamic,
            },
            names::REQUIRED => match self.required {
                RequiredType::Required => Declared::Fixed(Value::Bool(true)),
                RequiredType::NotRequired => Declared::Fixed(Value::Bool(false)),
                RequiredType::Dynamic => Declared::Dynamic,
                // Depends on the resolved enabled state.
                RequiredType::RequiredIfEnabled => Declared::Unspecified,
            },
            names::AVAILABLE_VALUES => match &self.available_values {
                AvailableValuesType::NoValues => Declared::Fixed(Value::List(Vec::new())),
                AvailableValuesType::Fixed(values) => Declared::Fixed(Value::List(
                    values.iter().map(|v| Value::Text(v.clone())).collect(),
                )),
                AvailableValuesType::Dynamic => Declared::Dynamic,
            },
            names::CAPTION => text_declared(&self.caption),
            names::TOOLTIP => text_declared(&self.tooltip),
            _ => Declared::Unspecified,
        }
    }

    /// Member name on the nested model object.
    #[must_use]
    pub fn model_attribute_or<'a>(&'a self, property: &'a str) -> &'a str {
        self.model_attribute.as_deref().unwrap_or(property)
    }
}

fn text_declared(text: &TextType) -> Declared {
    match text {
        TextType::None => Declared::Unspecified,
        TextType::Static(s) => Declared::Fixed(Value::Text(s.clone())),
        TextType::Dynamic => Declared::Dynamic,
    }
}

/// Decision tables of many properties, keyed by owner type and property.
///
/// Owner types are short type names (`PersonPmo`, not `app::PersonPmo`).
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(transparent))]
pub struct BindingConfig {
    owners: BTreeMap<String, BTreeMap<String, PropertyConfig>>,
}

impl BindingConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        owner: impl Into<String>,
        property: impl Into<String>,
        config: PropertyConfig,
    ) {
        self.owners
            .entry(owner.into())
            .or_default()
            .insert(property.into(), config);
    }

    #[must_use]
    pub fn get(&self, owner: &str, property: &str) -> Option<&PropertyConfig> {
        self.owners.get(owner).and_then(|props| props.get(property))
    }

    /// Table for `property`, or the default table when none is configured.
    #[must_use]
    pub fn resolve(&self, owner: &str, property: &str) -> Rc<PropertyConfig> {
        Rc::new(self.get(owner, property).cloned().unwrap_or_default())
    }

    /// Number of configured properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse decision tables from TOML.
    #[cfg(feature = "config")]
    pub fn from_toml_str(source: &str) -> BindingResult<Self> {
        toml::from_str(source).map_err(|e| BindingError::InvalidConfig(e.to_string()))
    }

    /// Check invariants the type system does not capture.
    pub fn validate(&self) -> BindingResult<()> {
        for (owner, props) in &self.owners {
            for (property, config) in props {
                if property.is_empty() {
                    return Err(BindingError::InvalidConfig(format!(
                        "empty property name under '{owner}'"
                    )));
                }
                if config.model_attribute.as_deref() == Some("") {
                    return Err(BindingError::InvalidConfig(format!(
                        "empty model attribute for '{owner}.{property}'"
                    )));
                }
            }
        }
        Ok(())
    }
}
