use std::cell::RefCell;
use std::rc::Rc;

use bindery_core::aspect::names;
use bindery_core::config::Declared;
use bindery_core::{
    Aspect, BindingResult, Capabilities, PropertyConfig, PropertyDispatcher, Value, Widget,
};

use super::{AspectDefinition, CapabilityPolicy, UiUpdater, mismatch, nop_updater, supports};
use crate::item_cache::ItemCache;

/// The option list of a selection widget.
///
/// The widget's list is reset only when the resolved options differ from
/// the previous refresh.
pub struct AvailableValuesAspectDefinition {
    declared: Declared,
    cache: Rc<RefCell<ItemCache<Value>>>,
}

impl AvailableValuesAspectDefinition {
    #[must_use]
    pub fn new(config: &PropertyConfig) -> Self {
        Self {
            declared: config.declared(names::AVAILABLE_VALUES),
            cache: Rc::new(RefCell::new(ItemCache::new())),
        }
    }

    /// Options currently shown.
    #[must_use]
    pub fn items(&self) -> Vec<Value> {
        self.cache.borrow().items().to_vec()
    }
}

impl AspectDefinition for AvailableValuesAspectDefinition {
    fn name(&self) -> &str {
        names::AVAILABLE_VALUES
    }

    fn capability(&self) -> Capabilities {
        Capabilities::ITEMS
    }

    fn capability_policy(&self) -> CapabilityPolicy {
        CapabilityPolicy::Require
    }

    fn create_aspect(&self) -> Option<Aspect> {
        match &self.declared {
            Declared::Fixed(values) => Some(Aspect::with_value(names::AVAILABLE_VALUES, values.clone())),
            Declared::Dynamic => Some(Aspect::of(names::AVAILABLE_VALUES)),
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
        let cache = Rc::clone(&self.cache);
        Ok(Box::new(move || {
            let options = match dispatcher.pull(&aspect)? {
                Value::List(options) => options,
                Value::Null => Vec::new(),
                other => return Err(mismatch(dispatcher.as_ref(), &aspect, "list", &other)),
            };
            let changed = cache.borrow_mut().replace_content(options);
            if changed {
                let items = cache.borrow().items().to_vec();
                tracing::trace!(
                    property = dispatcher.property(),
                    options = items.len(),
                    "available values changed"
                );
                widget.set_items(&items);
            }
            Ok(())
        }))
    }
}
