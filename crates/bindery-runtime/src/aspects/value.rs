use std::rc::Rc;

use bindery_core::aspect::names;
use bindery_core::{Aspect, BindingResult, Capabilities, PropertyDispatcher, Widget};

use super::{AspectDefinition, CapabilityPolicy, ModelChanged, UiUpdater, nop_updater, supports};

/// The current value of a property, in both directions.
///
/// The widget is made read-only whenever the dispatcher reports the value as
/// not writable: a behavior veto, a declared read-only property or a member
/// without setter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueAspectDefinition;

impl ValueAspectDefinition {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl AspectDefinition for ValueAspectDefinition {
    fn name(&self) -> &str {
        names::VALUE
    }

    fn capability(&self) -> Capabilities {
        Capabilities::VALUE
    }

    fn capability_policy(&self) -> CapabilityPolicy {
        CapabilityPolicy::Require
    }

    fn create_aspect(&self) -> Option<Aspect> {
        Some(Aspect::of(names::VALUE))
    }

    fn create_ui_updater(
        &self,
        dispatcher: Rc<dyn PropertyDispatcher>,
        widget: Rc<dyn Widget>,
    ) -> BindingResult<UiUpdater> {
        if !supports(self, widget.as_ref())? {
            return Ok(nop_updater());
        }
        let aspect = Aspect::of(names::VALUE);
        Ok(Box::new(move || {
            let value = dispatcher.pull(&aspect)?;
            widget.set_value(&value);
            widget.set_read_only(!dispatcher.is_push_writable(&aspect));
            Ok(())
        }))
    }

    fn init_model_update(
        &self,
        dispatcher: Rc<dyn PropertyDispatcher>,
        widget: Rc<dyn Widget>,
        model_changed: ModelChanged,
    ) -> BindingResult<()> {
        if !supports(self, widget.as_ref())? {
            return Ok(());
        }
        widget.on_value_change(Box::new(move |value| {
            dispatcher.push(&Aspect::with_value(names::VALUE, value))?;
            model_changed()
        }));
        Ok(())
    }
}
