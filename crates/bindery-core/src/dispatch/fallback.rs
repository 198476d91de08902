use std::rc::Rc;

use super::{BoundProperty, DispatchStage, Resolution, TargetSource};
use crate::aspect::Aspect;
use crate::config::PropertyConfig;
use crate::error::{BindingError, BindingResult};
use crate::message::MessageList;
use crate::value::Value;

/// Terminal stage. Never delegates.
///
/// Unanswered pulls and pushes become errors naming every object that was
/// searched. Messages are selected for the bound property, the mapped member
/// of the model object, and the fatal code.
#[derive(Debug, Clone)]
pub struct FallbackStage {
    config: Rc<PropertyConfig>,
    fatal_code: Option<String>,
}

impl FallbackStage {
    #[must_use]
    pub fn new(config: Rc<PropertyConfig>, fatal_code: Option<String>) -> Self {
        Self { config, fatal_code }
    }

    fn candidates(bound: &BoundProperty) -> Vec<String> {
        [
            TargetSource::ModelObject,
            TargetSource::NestedModelObject,
            TargetSource::ViewModel,
        ]
        .into_iter()
        .filter_map(|source| source.resolve(&bound.object))
        .map(|object| object.short_type_name().to_owned())
        .collect()
    }
}

impl DispatchStage for FallbackStage {
    fn stage_name(&self) -> &'static str {
        "fallback"
    }

    fn pull(&self, bound: &BoundProperty, aspect: &Aspect) -> BindingResult<Resolution<Value>> {
        Err(BindingError::UnresolvableProperty {
            property: bound.property.clone(),
            aspect: aspect.name().to_owned(),
            candidates: Self::candidates(bound),
        })
    }

    fn push(&self, bound: &BoundProperty, aspect: &Aspect) -> BindingResult<Resolution<()>> {
        Err(BindingError::NotWritable {
            property: bound.property.clone(),
            aspect: aspect.name().to_owned(),
            candidates: Self::candidates(bound),
        })
    }

    fn is_push_writable(&self, _bound: &BoundProperty, _aspect: &Aspect) -> Resolution<bool> {
        Resolution::Resolved(false)
    }

    fn messages(&self, bound: &BoundProperty, messages: &MessageList) -> Resolution<MessageList> {
        let mut shown = messages.messages_for(&bound.object, &bound.property);
        if let Some(model) = bound.object.model_object() {
            let attribute = self.config.model_attribute_or(&bound.property);
            shown.merge(messages.messages_for(&model, attribute));
        }
        if let Some(code) = &self.fatal_code {
            shown.merge(messages.with_code(code));
        }
        Resolution::Resolved(shown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::Members;
    use crate::aspect::names;
    use crate::message::Message;
    use crate::model::{ModelObject, ObjectRef};

    struct Address;

    impl ModelObject for Address {
        fn members(&self) -> Members {
            Members::of::<Self>().build()
        }
    }

    struct AddressPmo(ObjectRef);

    impl ModelObject for AddressPmo {
        fn members(&self) -> Members {
            Members::of::<Self>().build()
        }

        fn model_object(&self) -> Option<ObjectRef> {
            Some(self.0.clone())
        }
    }

    #[test]
    fn pull_error_lists_searched_objects() {
        let pmo = ObjectRef::new(AddressPmo(ObjectRef::new(Address)));
        let stage = FallbackStage::new(Rc::new(PropertyConfig::new()), None);
        let err = stage
            .pull(&BoundProperty::new(pmo, "street"), &Aspect::of(names::VALUE))
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("'street'"), "{text}");
        assert!(text.contains("Address"), "{text}");
        assert!(text.contains("AddressPmo"), "{text}");
    }

    #[test]
    fn messages_include_mapped_model_attribute() {
        let address = ObjectRef::new(Address);
        let pmo = ObjectRef::new(AddressPmo(address.clone()));
        let stage = FallbackStage::new(
            Rc::new(PropertyConfig::new().model_attribute("streetName")),
            None,
        );
        let all: MessageList = [
            Message::error("pmo").with_invalid(&pmo, "street"),
            Message::error("model").with_invalid(&address, "streetName"),
            Message::error("unrelated").with_invalid(&address, "zip"),
        ]
        .into_iter()
        .collect();

        let Resolution::Resolved(shown) =
            stage.messages(&BoundProperty::new(pmo, "street"), &all)
        else {
            panic!("fallback must resolve messages");
        };
        let texts: Vec<_> = shown.iter().map(Message::text).collect();
        assert_eq!(texts, vec!["pmo", "model"]);
    }
}
