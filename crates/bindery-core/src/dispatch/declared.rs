use std::rc::Rc;

use bindery_i18n::Localizer;

use super::{BoundProperty, DispatchStage, Resolution};
use crate::aspect::{Aspect, ValuePresence, names};
use crate::config::{Declared, PropertyConfig, Writability};
use crate::error::{BindingError, BindingResult};
use crate::value::Value;

/// Answers from the property's decision table.
///
/// Static aspects are returned as carried (texts localized); aspects the
/// table fixes are answered without consulting the model; writes to a
/// property declared read-only are rejected.
#[derive(Debug, Clone)]
pub struct DeclaredStage {
    config: Rc<PropertyConfig>,
    localizer: Option<Localizer>,
}

impl DeclaredStage {
    #[must_use]
    pub fn new(config: Rc<PropertyConfig>, localizer: Option<Localizer>) -> Self {
        Self { config, localizer }
    }

    fn localized(&self, bound: &BoundProperty, aspect: &str, value: Value) -> Value {
        match (&self.localizer, value) {
            (Some(localizer), Value::Text(text)) if aspect != names::VALUE => {
                Value::Text(localizer.localize(
                    bound.object.type_name(),
                    &bound.property,
                    aspect,
                    &text,
                ))
            }
            (_, value) => value,
        }
    }
}

impl DispatchStage for DeclaredStage {
    fn stage_name(&self) -> &'static str {
        "declared"
    }

    fn pull(&self, bound: &BoundProperty, aspect: &Aspect) -> BindingResult<Resolution<Value>> {
        let value = match aspect.presence() {
            ValuePresence::Static(value) => value.clone(),
            ValuePresence::Absent => match self.config.declared(aspect.name()) {
                Declared::Fixed(value) => value,
                Declared::Dynamic | Declared::Unspecified => return Ok(Resolution::Delegate),
            },
        };
        Ok(Resolution::Resolved(self.localized(bound, aspect.name(), value)))
    }

    fn push(&self, bound: &BoundProperty, aspect: &Aspect) -> BindingResult<Resolution<()>> {
        if aspect.name() == names::VALUE && self.config.writability == Writability::ReadOnly {
            return Err(BindingError::ReadOnly {
                property: bound.property.clone(),
            });
        }
        Ok(Resolution::Delegate)
    }

    fn is_push_writable(&self, _bound: &BoundProperty, aspect: &Aspect) -> Resolution<bool> {
        if aspect.name() == names::VALUE && self.config.writability == Writability::ReadOnly {
            Resolution::Resolved(false)
        } else {
            Resolution::Delegate
        }
    }
}
