use super::{BoundProperty, DispatchStage, Resolution};
use crate::aspect::{Aspect, names};
use crate::behavior::BehaviorProvider;
use crate::error::BindingResult;
use crate::message::MessageList;
use crate::value::Value;

/// Outermost stage: applies behavior vetoes.
///
/// A veto substitutes a safe answer (hidden, read-only, no messages) and
/// never raises an error. Without a veto every request is delegated.
#[derive(Debug, Clone)]
pub struct BehaviorStage {
    behaviors: BehaviorProvider,
}

impl BehaviorStage {
    #[must_use]
    pub fn new(behaviors: BehaviorProvider) -> Self {
        Self { behaviors }
    }
}

impl DispatchStage for BehaviorStage {
    fn stage_name(&self) -> &'static str {
        "behavior"
    }

    fn pull(&self, bound: &BoundProperty, aspect: &Aspect) -> BindingResult<Resolution<Value>> {
        if aspect.name() == names::VISIBLE
            && !self.behaviors.is_visible(&bound.object, &bound.property)
        {
            tracing::debug!(property = %bound.property, "visibility vetoed by behavior");
            return Ok(Resolution::Resolved(Value::Bool(false)));
        }
        Ok(Resolution::Delegate)
    }

    fn push(&self, bound: &BoundProperty, aspect: &Aspect) -> BindingResult<Resolution<()>> {
        // Invocations carry no value and are not subject to the write veto.
        if aspect.is_value_present()
            && !self.behaviors.is_writable(&bound.object, &bound.property)
        {
            tracing::debug!(
                property = %bound.property,
                aspect = aspect.name(),
                "write vetoed by behavior"
            );
            return Ok(Resolution::Resolved(()));
        }
        Ok(Resolution::Delegate)
    }

    fn is_push_writable(&self, bound: &BoundProperty, aspect: &Aspect) -> Resolution<bool> {
        if aspect.name() != names::INVOKE
            && !self.behaviors.is_writable(&bound.object, &bound.property)
        {
            return Resolution::Resolved(false);
        }
        Resolution::Delegate
    }

    fn messages(&self, bound: &BoundProperty, _messages: &MessageList) -> Resolution<MessageList> {
        if self
            .behaviors
            .is_show_validation_messages(&bound.object, &bound.property)
        {
            Resolution::Delegate
        } else {
            tracing::debug!(property = %bound.property, "messages vetoed by behavior");
            Resolution::Resolved(MessageList::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::Members;
    use crate::behavior::{FnBehavior, PropertyBehavior};
    use crate::message::Message;
    use crate::model::{ModelObject, ObjectRef};
    use std::rc::Rc;
    use tracing_test::traced_test;

    struct Pmo;

    impl ModelObject for Pmo {
        fn members(&self) -> Members {
            Members::of::<Self>().build()
        }
    }

    fn stage(behavior: FnBehavior) -> BehaviorStage {
        BehaviorStage::new(BehaviorProvider::with([
            Rc::new(behavior) as Rc<dyn PropertyBehavior>
        ]))
    }

    #[test]
    fn no_behaviors_delegates_everything() {
        let bound = BoundProperty::new(ObjectRef::new(Pmo), "foo");
        let stage = BehaviorStage::new(BehaviorProvider::new());
        let visible: Aspect = Aspect::of(names::VISIBLE);
        assert_eq!(stage.pull(&bound, &visible).unwrap(), Resolution::Delegate);
        assert_eq!(
            stage
                .push(&bound, &Aspect::with_value(names::VALUE, Value::Int(1)))
                .unwrap(),
            Resolution::Delegate
        );
        assert_eq!(stage.messages(&bound, &MessageList::new()), Resolution::Delegate);
    }

    #[test]
    fn hidden_overrides_static_visible() {
        let bound = BoundProperty::new(ObjectRef::new(Pmo), "foo");
        let stage = stage(FnBehavior::new().visible(|_, _| false));
        let aspect = Aspect::with_value(names::VISIBLE, Value::Bool(true));
        assert_eq!(
            stage.pull(&bound, &aspect).unwrap(),
            Resolution::Resolved(Value::Bool(false))
        );
    }

    #[test]
    fn invoke_passes_write_veto() {
        let bound = BoundProperty::new(ObjectRef::new(Pmo), "save");
        let stage = stage(FnBehavior::read_only());
        let invoke: Aspect = Aspect::of(names::INVOKE);
        assert_eq!(stage.push(&bound, &invoke).unwrap(), Resolution::Delegate);
        assert_eq!(stage.is_push_writable(&bound, &invoke), Resolution::Delegate);
    }

    #[test]
    fn suppressed_messages_are_empty() {
        let pmo = ObjectRef::new(Pmo);
        let bound = BoundProperty::new(pmo.clone(), "foo");
        let stage = stage(FnBehavior::new().show_messages(|_, _| false));
        let all: MessageList = [Message::error("x").with_invalid(&pmo, "foo")]
            .into_iter()
            .collect();
        assert_eq!(stage.messages(&bound, &all), Resolution::Resolved(MessageList::new()));
    }

    #[traced_test]
    #[test]
    fn veto_is_logged_not_raised() {
        let bound = BoundProperty::new(ObjectRef::new(Pmo), "foo");
        let stage = stage(FnBehavior::read_only());
        let result = stage.push(&bound, &Aspect::with_value(names::VALUE, Value::Int(1)));
        assert_eq!(result.unwrap(), Resolution::Resolved(()));
        assert_eq!(
            stage.is_push_writable(&bound, &Aspect::of(names::VALUE)),
            Resolution::Resolved(false)
        );
        assert!(logs_contain("write vetoed by behavior"));
    }
}
