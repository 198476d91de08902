use std::rc::Rc;

use bindery_core::aspect::names;
use bindery_core::config::Declared;
use bindery_core::{
    Aspect, BindingResult, Capabilities, PropertyConfig, PropertyDispatcher, Value, Widget,
};

use super::{
    AspectDefinition, CapabilityPolicy, UiUpdater, expect_bool, mismatch, nop_updater, supports,
};

type Apply = fn(&dyn PropertyDispatcher, &dyn Widget, &Aspect) -> BindingResult<()>;

/// A one-way aspect: resolved from the model and shown by the widget.
///
/// Covers enabled, visible, caption, tooltip and container footers. Widgets
/// without the matching capability are skipped.
pub struct ModelToUiAspectDefinition {
    name: &'static str,
    capability: Capabilities,
    declared: Declared,
    apply: Apply,
}

impl ModelToUiAspectDefinition {
    fn new(
        name: &'static str,
        capability: Capabilities,
        declared: Declared,
        apply: Apply,
    ) -> Self {
        Self {
            name,
            capability,
            declared,
            apply,
        }
    }

    #[must_use]
    pub fn enabled(config: &PropertyConfig) -> Self {
        Self::new(
            names::ENABLED,
            Capabilities::ENABLED,
            config.declared(names::ENABLED),
            |d, w, a| {
                w.set_enabled(expect_bool(d, a)?);
                Ok(())
            },
        )
    }

    #[must_use]
    pub fn visible(config: &PropertyConfig) -> Self {
        Self::new(
            names::VISIBLE,
            Capabilities::VISIBLE,
            config.declared(names::VISIBLE),
            |d, w, a| {
                w.set_visible(expect_bool(d, a)?);
                Ok(())
            },
        )
    }

    #[must_use]
    pub fn caption(config: &PropertyConfig) -> Self {
        Self::new(
            names::CAPTION,
            Capabilities::CAPTION,
            config.declared(names::CAPTION),
            |d, w, a| {
                let text = expect_text(d, a)?;
                w.set_caption(text.as_deref());
                Ok(())
            },
        )
    }

    #[must_use]
    pub fn tooltip(config: &PropertyConfig) -> Self {
        Self::new(
            names::TOOLTIP,
            Capabilities::TOOLTIP,
            config.declared(names::TOOLTIP),
            |d, w, a| {
                let text = expect_text(d, a)?;
                w.set_tooltip(text.as_deref());
                Ok(())
            },
        )
    }

    /// Container summary row, resolved from the model on every refresh.
    #[must_use]
    pub fn footer() -> Self {
        Self::new(
            names::FOOTER,
            Capabilities::FOOTER,
            Declared::Dynamic,
            |d, w, a| {
                w.set_footer(&d.pull(a)?);
                Ok(())
            },
        )
    }
}

fn expect_text(dispatcher: &dyn PropertyDispatcher, aspect: &Aspect) -> BindingResult<Option<String>> {
    match dispatcher.pull(aspect)? {
        Value::Text(text) => Ok(Some(text)),
        Value::Null => Ok(None),
        other => Err(mismatch(dispatcher, aspect, "text", &other)),
    }
}

impl AspectDefinition for ModelToUiAspectDefinition {
    fn name(&self) -> &str {
        self.name
    }

    fn capability(&self) -> Capabilities {
        self.capability
    }

    fn capability_policy(&self) -> CapabilityPolicy {
        CapabilityPolicy::Ignore
    }

    fn create_aspect(&self) -> Option<Aspect> {
        match &self.declared {
            Declared::Fixed(value) => Some(Aspect::with_value(self.name, value.clone())),
            Declared::Dynamic => Some(Aspect::of(self.name)),
            Declared::Unspecified => None,
        }
    }

    fn create_ui_updater(
        &self,
        dispatcher: Rc<dyn PropertyDispatcher>,
        widget: Rc<dyn Widget>,
    ) -> BindingResult<UiUpdater> {
        let Some(aspect) = self.create_aspect() else {
            return Ok(nop_updater());
        };
        if !supports(self, widget.as_ref())? {
            return Ok(nop_updater());
        }
        let apply = self.apply;
        Ok(Box::new(move || {
            apply(dispatcher.as_ref(), widget.as_ref(), &aspect)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_core::config::{EnabledType, TextType};

    #[test]
    fn fixed_configuration_becomes_static_aspect() {
        let config = PropertyConfig::new().enabled(EnabledType::Disabled);
        let aspect = ModelToUiAspectDefinition::enabled(&config)
            .create_aspect()
            .unwrap();
        assert_eq!(aspect.value(), Some(&Value::Bool(false)));
    }

    #[test]
    fn dynamic_configuration_asks_the_chain() {
        let config = PropertyConfig::new().caption(TextType::Dynamic);
        let aspect = ModelToUiAspectDefinition::caption(&config)
            .create_aspect()
            .unwrap();
        assert!(!aspect.is_value_present());
    }

    #[test]
    fn unbound_text_has_no_aspect() {
        assert!(ModelToUiAspectDefinition::tooltip(&PropertyConfig::new())
            .create_aspect()
            .is_none());
    }
}
