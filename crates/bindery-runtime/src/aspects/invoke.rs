use std::rc::Rc;

use bindery_core::aspect::names;
use bindery_core::{Aspect, BindingResult, Capabilities, PropertyDispatcher, Widget};

use super::{AspectDefinition, CapabilityPolicy, ModelChanged, UiUpdater, nop_updater, supports};

/// Invokes the bound action member when the widget is clicked.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvokeAspectDefinition;

impl InvokeAspectDefinition {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl AspectDefinition for InvokeAspectDefinition {
    fn name(&self) -> &str {
        names::INVOKE
    }

    fn capability(&self) -> Capabilities {
        Capabilities::CLICK
    }

    fn capability_policy(&self) -> CapabilityPolicy {
        CapabilityPolicy::Require
    }

    fn create_aspect(&self) -> Option<Aspect> {
        Some(Aspect::of(names::INVOKE))
    }

    fn create_ui_updater(
        &self,
        _dispatcher: Rc<dyn PropertyDispatcher>,
        widget: Rc<dyn Widget>,
    ) -> BindingResult<UiUpdater> {
        // Checked here so a missing capability fails at bind time.
        supports(self, widget.as_ref())?;
        Ok(nop_updater())
    }

    fn init_model_update(
        &self,
        dispatcher: Rc<dyn PropertyDispatcher>,
        widget: Rc<dyn Widget>,
        model_changed: ModelChanged,
    ) -> BindingResult<()> {
        supports(self, widget.as_ref())?;
        widget.on_click(Box::new(move || {
            dispatcher.push(&Aspect::of(names::INVOKE))?;
            model_changed()
        }));
        Ok(())
    }
}
