#![forbid(unsafe_code)]

//! Aspect definitions.
//!
//! An [`AspectDefinition`] knows, for one aspect, how to build the request
//! sent through the dispatcher, how to apply the answer to a widget and,
//! for writable aspects, how to route widget events back into the model.
//!
//! Each definition declares what happens when the widget lacks the
//! capability it needs ([`CapabilityPolicy`]):
//!
//! | Definition | Capability | Policy |
//! |------------|------------|--------|
//! | [`ValueAspectDefinition`] | `VALUE` | fail fast |
//! | [`AvailableValuesAspectDefinition`] | `ITEMS` | fail fast |
//! | [`InvokeAspectDefinition`] | `CLICK` | fail fast |
//! | [`ModelToUiAspectDefinition`] (enabled, visible, caption, tooltip, footer) | matching flag | no-op |
//! | [`RequiredAspectDefinition`] | `REQUIRED` | no-op |
//!
//! A [`CompositeAspectDefinition`] runs its parts in declared order.

mod available_values;
mod invoke;
mod model_to_ui;
mod required;
mod value;

pub use available_values::AvailableValuesAspectDefinition;
pub use invoke::InvokeAspectDefinition;
pub use model_to_ui::ModelToUiAspectDefinition;
pub use required::RequiredAspectDefinition;
pub use value::ValueAspectDefinition;

use std::rc::Rc;

use bindery_core::config::AvailableValuesType;
use bindery_core::widget::describe;
use bindery_core::{
    Aspect, BindingError, BindingResult, Capabilities, PropertyConfig, PropertyDispatcher, Value,
    Widget,
};

/// Zero-argument refresh action produced by a definition. Idempotent.
pub type UiUpdater = Box<dyn Fn() -> BindingResult<()>>;

/// Notification that the model was changed through a widget.
pub type ModelChanged = Rc<dyn Fn() -> BindingResult<()>>;

/// What a definition does with a widget lacking its capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityPolicy {
    /// Produce a no-op updater.
    Ignore,
    /// Fail with [`BindingError::MissingCapability`].
    Require,
}

/// Declares how one aspect is resolved and displayed.
pub trait AspectDefinition {
    /// Aspect name, for diagnostics.
    fn name(&self) -> &str;

    /// Widget capability this definition needs.
    fn capability(&self) -> Capabilities;

    fn capability_policy(&self) -> CapabilityPolicy;

    /// The request sent through the dispatcher, or `None` if the aspect is
    /// not bound for this property.
    fn create_aspect(&self) -> Option<Aspect>;

    /// Build the refresh action for `widget`.
    fn create_ui_updater(
        &self,
        dispatcher: Rc<dyn PropertyDispatcher>,
        widget: Rc<dyn Widget>,
    ) -> BindingResult<UiUpdater>;

    /// Register widget listeners that write back into the model.
    fn init_model_update(
        &self,
        _dispatcher: Rc<dyn PropertyDispatcher>,
        _widget: Rc<dyn Widget>,
        _model_changed: ModelChanged,
    ) -> BindingResult<()> {
        Ok(())
    }
}

/// Updater that does nothing.
#[must_use]
pub fn nop_updater() -> UiUpdater {
    Box::new(|| Ok(()))
}

/// Whether `widget` supports `definition`, applying its capability policy.
///
/// `Ok(false)` means the definition should produce a no-op.
pub fn supports(definition: &dyn AspectDefinition, widget: &dyn Widget) -> BindingResult<bool> {
    if widget.capabilities().contains(definition.capability()) {
        return Ok(true);
    }
    match definition.capability_policy() {
        CapabilityPolicy::Ignore => {
            tracing::trace!(
                widget = %describe(widget),
                aspect = definition.name(),
                "widget lacks capability, aspect ignored"
            );
            Ok(false)
        }
        CapabilityPolicy::Require => Err(BindingError::MissingCapability {
            widget: describe(widget),
            aspect: definition.name().to_owned(),
            capability: format!("{:?}", definition.capability()),
        }),
    }
}

/// Expect a boolean answer for `aspect`.
pub(crate) fn expect_bool(dispatcher: &dyn PropertyDispatcher, aspect: &Aspect) -> BindingResult<bool> {
    match dispatcher.pull(aspect)? {
        Value::Bool(b) => Ok(b),
        other => Err(mismatch(dispatcher, aspect, "bool", &other)),
    }
}

pub(crate) fn mismatch(
    dispatcher: &dyn PropertyDispatcher,
    aspect: &Aspect,
    expected: &str,
    found: &Value,
) -> BindingError {
    BindingError::TypeMismatch {
        property: format!("{}.{}", dispatcher.property(), aspect.name()),
        expected: expected.to_owned(),
        found: found.kind().to_string(),
    }
}

/// Several definitions applied as one, in declared order.
#[derive(Default)]
pub struct CompositeAspectDefinition {
    definitions: Vec<Box<dyn AspectDefinition>>,
}

impl CompositeAspectDefinition {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, definition: impl AspectDefinition + 'static) -> Self {
        self.definitions.push(Box::new(definition));
        self
    }

    pub fn push(&mut self, definition: Box<dyn AspectDefinition>) {
        self.definitions.push(definition);
    }

    /// Names of the parts, in the order they run.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.name()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl AspectDefinition for CompositeAspectDefinition {
    fn name(&self) -> &str {
        "composite"
    }

    fn capability(&self) -> Capabilities {
        Capabilities::empty()
    }

    fn capability_policy(&self) -> CapabilityPolicy {
        CapabilityPolicy::Ignore
    }

    fn create_aspect(&self) -> Option<Aspect> {
        None
    }

    fn create_ui_updater(
        &self,
        dispatcher: Rc<dyn PropertyDispatcher>,
        widget: Rc<dyn Widget>,
    ) -> BindingResult<UiUpdater> {
        let updaters = self
            .definitions
            .iter()
            .map(|d| d.create_ui_updater(Rc::clone(&dispatcher), Rc::clone(&widget)))
            .collect::<BindingResult<Vec<_>>>()?;
        Ok(Box::new(move || updaters.iter().try_for_each(|update| update())))
    }

    fn init_model_update(
        &self,
        dispatcher: Rc<dyn PropertyDispatcher>,
        widget: Rc<dyn Widget>,
        model_changed: ModelChanged,
    ) -> BindingResult<()> {
        for definition in &self.definitions {
            definition.init_model_update(
                Rc::clone(&dispatcher),
                Rc::clone(&widget),
                Rc::clone(&model_changed),
            )?;
        }
        Ok(())
    }
}

/// Definitions of an input field bound to `config`.
///
/// Options are applied before the value so a selection always refers to a
/// current option; the value precedes the state aspects.
#[must_use]
pub fn field_definitions(config: &PropertyConfig) -> CompositeAspectDefinition {
    let mut composite = CompositeAspectDefinition::new();
    if config.available_values != AvailableValuesType::NoValues {
        composite.push(Box::new(AvailableValuesAspectDefinition::new(config)));
    }
    composite.push(Box::new(ValueAspectDefinition::new()));
    push_state_definitions(&mut composite, config);
    composite.push(Box::new(RequiredAspectDefinition::new(config)));
    push_text_definitions(&mut composite, config);
    composite
}

/// Definitions of a button bound to an action member.
#[must_use]
pub fn action_definitions(config: &PropertyConfig) -> CompositeAspectDefinition {
    let mut composite = CompositeAspectDefinition::new().with(InvokeAspectDefinition::new());
    push_state_definitions(&mut composite, config);
    push_text_definitions(&mut composite, config);
    composite
}

/// Definitions of a container's own aspects. Rows are handled by the
/// container binding.
#[must_use]
pub fn container_definitions(config: &PropertyConfig) -> CompositeAspectDefinition {
    let mut composite = CompositeAspectDefinition::new();
    push_state_definitions(&mut composite, config);
    push_text_definitions(&mut composite, config);
    if config.footer {
        composite.push(Box::new(ModelToUiAspectDefinition::footer()));
    }
    composite
}

fn push_state_definitions(composite: &mut CompositeAspectDefinition, config: &PropertyConfig) {
    composite.push(Box::new(ModelToUiAspectDefinition::enabled(config)));
    composite.push(Box::new(ModelToUiAspectDefinition::visible(config)));
}

fn push_text_definitions(composite: &mut CompositeAspectDefinition, config: &PropertyConfig) {
    composite.push(Box::new(ModelToUiAspectDefinition::caption(config)));
    composite.push(Box::new(ModelToUiAspectDefinition::tooltip(config)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_core::aspect::names;
    use bindery_core::config::{AvailableValuesType, TextType};

    #[test]
    fn field_order_is_stable() {
        let config = PropertyConfig::new()
            .available_values(AvailableValuesType::Dynamic)
            .caption(TextType::Static("Name".into()));
        assert_eq!(
            field_definitions(&config).names(),
            vec![
                names::AVAILABLE_VALUES,
                names::VALUE,
                names::ENABLED,
                names::VISIBLE,
                names::REQUIRED,
                names::CAPTION,
                names::TOOLTIP,
            ]
        );
    }

    #[test]
    fn field_without_options_skips_available_values() {
        let names = field_definitions(&PropertyConfig::new()).names().join(",");
        assert!(!names.contains("availableValues"));
    }

    #[test]
    fn action_starts_with_invoke() {
        let composite = action_definitions(&PropertyConfig::new());
        assert_eq!(composite.names()[0], names::INVOKE);
    }

    #[test]
    fn footer_only_when_configured() {
        assert!(!container_definitions(&PropertyConfig::new())
            .names()
            .contains(&names::FOOTER));
        assert!(container_definitions(&PropertyConfig::new().with_footer())
            .names()
            .contains(&names::FOOTER));
    }
}
