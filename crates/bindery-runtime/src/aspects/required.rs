use std::rc::Rc;

use bindery_core::aspect::names;
use bindery_core::config::{Declared, RequiredType};
use bindery_core::{Aspect, BindingResult, Capabilities, PropertyConfig, PropertyDispatcher, Widget};

use super::{AspectDefinition, CapabilityPolicy, UiUpdater, expect_bool, nop_updater, supports};

/// The required marker of an input field.
///
/// With [`RequiredType::RequiredIfEnabled`] the marker mirrors the resolved
/// enabled aspect instead of a member of its own.
pub struct RequiredAspectDefinition {
    required: Declared,
    if_enabled: Option<Declared>,
}

impl RequiredAspectDefinition {
    #[must_use]
    pub fn new(config: &PropertyConfig) -> Self {
        let if_enabled = (config.required == RequiredType::RequiredIfEnabled)
            .then(|| config.declared(names::ENABLED));
        Self {
            required: config.declared(names::REQUIRED),
            if_enabled,
        }
    }

    fn source_aspect(&self) -> Option<Aspect> {
        let (name, declared) = match &self.if_enabled {
            Some(enabled) => (names::ENABLED, enabled),
            None => (names::REQUIRED, &self.required),
        };
        match declared {
            Declared::Fixed(value) => Some(Aspect::with_value(name, value.clone())),
            Declared::Dynamic => Some(Aspect::of(name)),
            Declared::Unspecified => None,
        }
    }
}

impl AspectDefinition for RequiredAspectDefinition {
    fn name(&self) -> &str {
        names::REQUIRED
    }

    fn capability(&self) -> Capabilities {
        Capabilities::REQUIRED
    }

    fn capability_policy(&self) -> CapabilityPolicy {
        CapabilityPolicy::Ignore
    }

    fn create_aspect(&self) -> Option<Aspect> {
        self.source_aspect()
    }

    fn create_ui_updater(
        &self,
        dispatcher: Rc<dyn PropertyDispatcher>,
        widget: Rc<dyn Widget>,
    ) -> BindingResult<UiUpdater> {
        let Some(aspect) = self.source_aspect() else {
            return Ok(nop_updater());
        };
        if !supports(self, widget.as_ref())? {
            return Ok(nop_updater());
        }
        Ok(Box::new(move || {
            widget.set_required(expect_bool(dispatcher.as_ref(), &aspect)?);
            Ok(())
        }))
    }
}
