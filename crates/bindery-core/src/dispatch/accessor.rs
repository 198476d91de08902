use std::rc::Rc;

use super::{BoundProperty, DispatchStage, Resolution};
use crate::accessor::{Accessor, AccessorCache};
use crate::aspect::{Aspect, member_name, names};
use crate::config::PropertyConfig;
use crate::error::BindingResult;
use crate::model::ObjectRef;
use crate::value::{Value, ValueKind};

/// Which object an [`AccessorStage`] reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSource {
    /// The domain object exposed by the bound view model.
    ModelObject,
    /// The domain object exposed by that domain object.
    NestedModelObject,
    /// The bound view model itself.
    ViewModel,
}

impl TargetSource {
    /// Current target for `object`. Looked up per call; the model object of
    /// a view model may be replaced at any time.
    #[must_use]
    pub fn resolve(self, object: &ObjectRef) -> Option<ObjectRef> {
        match self {
            Self::ModelObject => object.model_object(),
            Self::NestedModelObject => object.model_object()?.model_object(),
            Self::ViewModel => Some(object.clone()),
        }
    }

    fn stage_name(self) -> &'static str {
        match self {
            Self::ModelObject => "model-object",
            Self::NestedModelObject => "nested-model-object",
            Self::ViewModel => "view-model",
        }
    }
}

/// Reads and writes members by name through the accessor cache.
///
/// Delegates whenever the target lacks the member or the member lacks the
/// required getter or setter.
#[derive(Debug, Clone)]
pub struct AccessorStage {
    source: TargetSource,
    cache: Rc<AccessorCache>,
    config: Rc<PropertyConfig>,
}

impl AccessorStage {
    #[must_use]
    pub fn new(source: TargetSource, cache: Rc<AccessorCache>, config: Rc<PropertyConfig>) -> Self {
        Self {
            source,
            cache,
            config,
        }
    }

    #[must_use]
    pub fn source(&self) -> TargetSource {
        self.source
    }

    /// Target object and accessor for `aspect`, if both exist.
    fn lookup(&self, bound: &BoundProperty, aspect: &str) -> Option<(ObjectRef, Rc<Accessor>)> {
        let target = self.source.resolve(&bound.object)?;
        let property = match self.source {
            TargetSource::ViewModel => bound.property.as_str(),
            _ => self.config.model_attribute_or(&bound.property),
        };
        let accessor = self.cache.accessor(&target, &member_name(property, aspect))?;
        Some((target, accessor))
    }
}

impl DispatchStage for AccessorStage {
    fn stage_name(&self) -> &'static str {
        self.source.stage_name()
    }

    fn pull(&self, bound: &BoundProperty, aspect: &Aspect) -> BindingResult<Resolution<Value>> {
        match self.lookup(bound, aspect.name()) {
            Some((target, accessor)) if accessor.can_read() => {
                Ok(Resolution::Resolved(accessor.get(&target)?))
            }
            _ => Ok(Resolution::Delegate),
        }
    }

    fn push(&self, bound: &BoundProperty, aspect: &Aspect) -> BindingResult<Resolution<()>> {
        match self.lookup(bound, aspect.name()) {
            Some((target, accessor)) if accessor.can_write() => {
                // Invocations carry no value.
                let value = aspect.value().cloned().unwrap_or_default();
                accessor.set(&target, value)?;
                Ok(Resolution::Resolved(()))
            }
            _ => Ok(Resolution::Delegate),
        }
    }

    fn is_push_writable(&self, bound: &BoundProperty, aspect: &Aspect) -> Resolution<bool> {
        match self.lookup(bound, aspect.name()) {
            Some((_, accessor)) if accessor.can_write() => Resolution::Resolved(true),
            _ => Resolution::Delegate,
        }
    }

    fn value_kind(&self, bound: &BoundProperty) -> Resolution<ValueKind> {
        match self.lookup(bound, names::VALUE) {
            Some((_, accessor)) => Resolution::Resolved(accessor.value_kind()),
            None => Resolution::Delegate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::Members;
    use crate::model::ModelObject;
    use std::cell::{Cell, RefCell};

    struct Contract {
        number: RefCell<String>,
    }

    impl ModelObject for Contract {
        fn members(&self) -> Members {
            Members::of::<Self>()
                .property(
                    "number",
                    |c: &Contract| c.number.borrow().clone(),
                    |c: &Contract, v: String| *c.number.borrow_mut() = v,
                )
                .build()
        }
    }

    struct ContractPmo {
        contract: RefCell<ObjectRef>,
        submitted: Cell<u32>,
    }

    impl ModelObject for ContractPmo {
        fn members(&self) -> Members {
            Members::of::<Self>()
                .read("numberEnabled", |_: &ContractPmo| false)
                .action("submit", |p: &ContractPmo| {
                    p.submitted.set(p.submitted.get() + 1);
                })
                .build()
        }

        fn model_object(&self) -> Option<ObjectRef> {
            Some(self.contract.borrow().clone())
        }
    }

    fn contract(number: &str) -> ObjectRef {
        ObjectRef::new(Contract {
            number: RefCell::new(number.into()),
        })
    }

    fn stage(source: TargetSource) -> AccessorStage {
        AccessorStage::new(
            source,
            Rc::new(AccessorCache::new()),
            Rc::new(PropertyConfig::new()),
        )
    }

    #[test]
    fn model_object_is_looked_up_per_call() {
        let pmo = ContractPmo {
            contract: RefCell::new(contract("A-1")),
            submitted: Cell::new(0),
        };
        let pmo = ObjectRef::new(pmo);
        let bound = BoundProperty::new(pmo.clone(), "number");
        let stage = stage(TargetSource::ModelObject);

        assert_eq!(
            stage.pull(&bound, &Aspect::of(names::VALUE)).unwrap(),
            Resolution::Resolved(Value::from("A-1"))
        );

        let replacement = contract("B-2");
        *pmo.downcast_ref::<ContractPmo>().unwrap().contract.borrow_mut() = replacement;
        assert_eq!(
            stage.pull(&bound, &Aspect::of(names::VALUE)).unwrap(),
            Resolution::Resolved(Value::from("B-2"))
        );
    }

    #[test]
    fn missing_member_delegates() {
        let pmo = ObjectRef::new(ContractPmo {
            contract: RefCell::new(contract("A-1")),
            submitted: Cell::new(0),
        });
        let bound = BoundProperty::new(pmo, "number");
        let model = stage(TargetSource::ModelObject);
        let view = stage(TargetSource::ViewModel);

        assert_eq!(
            model.pull(&bound, &Aspect::of(names::ENABLED)).unwrap(),
            Resolution::Delegate
        );
        assert_eq!(
            view.pull(&bound, &Aspect::of(names::ENABLED)).unwrap(),
            Resolution::Resolved(Value::Bool(false))
        );
        assert_eq!(view.value_kind(&bound), Resolution::Delegate);
        assert_eq!(model.value_kind(&bound), Resolution::Resolved(ValueKind::Text));
    }

    #[test]
    fn absent_push_invokes_action() {
        let pmo = ObjectRef::new(ContractPmo {
            contract: RefCell::new(contract("A-1")),
            submitted: Cell::new(0),
        });
        let bound = BoundProperty::new(pmo.clone(), "submit");
        let view = stage(TargetSource::ViewModel);

        assert_eq!(
            view.push(&bound, &Aspect::of(names::INVOKE)).unwrap(),
            Resolution::Resolved(())
        );
        assert_eq!(view.is_push_writable(&bound, &Aspect::of(names::INVOKE)), Resolution::Resolved(true));
        assert_eq!(pmo.downcast_ref::<ContractPmo>().unwrap().submitted.get(), 1);
    }

    #[test]
    fn no_nested_model_object_delegates() {
        let pmo = ObjectRef::new(ContractPmo {
            contract: RefCell::new(contract("A-1")),
            submitted: Cell::new(0),
        });
        assert!(TargetSource::NestedModelObject.resolve(&pmo).is_none());
        let bound = BoundProperty::new(pmo, "number");
        assert_eq!(
            stage(TargetSource::NestedModelObject)
                .pull(&bound, &Aspect::of(names::VALUE))
                .unwrap(),
            Resolution::Delegate
        );
    }
}
