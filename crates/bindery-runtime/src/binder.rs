//! Shared construction of bindings for a context and its container rows.

use std::rc::Rc;

use bindery_core::{
    BehaviorProvider, BindingConfig, BindingResult, DispatcherFactory, ObjectRef, PropertyConfig,
    PropertyDispatcher, Widget,
};

use crate::aspects::{self, ModelChanged};
use crate::binding::{ActionBinding, ElementBinding};
use crate::container::{ContainerBinding, RowBuilder};
use crate::scope::Refresher;

/// Everything needed to bind a property, shared by a context and every
/// container created in it.
pub(crate) struct BinderEnv {
    pub(crate) factory: DispatcherFactory,
    pub(crate) behaviors: BehaviorProvider,
    pub(crate) config: BindingConfig,
    pub(crate) refresher: Refresher,
    pub(crate) model_changed: ModelChanged,
}

impl BinderEnv {
    /// Decision table for `property` of `pmo`, defaulting when unconfigured.
    pub(crate) fn config_for(&self, pmo: &ObjectRef, property: &str) -> Rc<PropertyConfig> {
        self.config.resolve(pmo.short_type_name(), property)
    }

    fn dispatcher(
        &self,
        pmo: &ObjectRef,
        property: &str,
        config: &Rc<PropertyConfig>,
    ) -> Rc<dyn PropertyDispatcher> {
        Rc::new(
            self.factory
                .create(pmo, property, Rc::clone(config), &self.behaviors),
        )
    }

    pub(crate) fn element(
        &self,
        pmo: &ObjectRef,
        property: &str,
        widget: Rc<dyn Widget>,
        config: Rc<PropertyConfig>,
    ) -> BindingResult<Rc<ElementBinding>> {
        let dispatcher = self.dispatcher(pmo, property, &config);
        let definition = aspects::field_definitions(&config);
        let binding = ElementBinding::new(
            widget,
            dispatcher,
            &definition,
            Rc::clone(&self.model_changed),
        )?;
        Ok(Rc::new(binding))
    }

    pub(crate) fn action(
        &self,
        pmo: &ObjectRef,
        property: &str,
        widget: Rc<dyn Widget>,
        config: Rc<PropertyConfig>,
    ) -> BindingResult<Rc<ActionBinding>> {
        let dispatcher = self.dispatcher(pmo, property, &config);
        let definition = aspects::action_definitions(&config);
        let binding = ActionBinding::new(
            widget,
            dispatcher,
            &definition,
            Rc::clone(&self.model_changed),
        )?;
        Ok(Rc::new(binding))
    }

    pub(crate) fn container(
        self: &Rc<Self>,
        pmo: &ObjectRef,
        property: &str,
        widget: Rc<dyn Widget>,
        config: Rc<PropertyConfig>,
        row_builder: RowBuilder,
    ) -> BindingResult<Rc<ContainerBinding>> {
        let dispatcher = self.dispatcher(pmo, property, &config);
        let definition = aspects::container_definitions(&config);
        let binding = ContainerBinding::new(
            widget,
            dispatcher,
            &definition,
            Rc::clone(self),
            row_builder,
        )?;
        Ok(Rc::new(binding))
    }
}
