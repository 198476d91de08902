//! The property dispatcher chain.
//!
//! A [`DispatcherChain`] answers pull and push requests for one bound
//! property by asking an ordered list of [`DispatchStage`]s. Each stage either
//! resolves the request or returns [`Resolution::Delegate`] to hand it to the
//! next stage. The last stage built by [`DispatcherFactory`] never delegates:
//! it turns an unanswered pull or push into a descriptive error.
//!
//! Stages built by the factory, outer to inner:
//!
//! | Stage | Role |
//! |-------|------|
//! | [`BehaviorStage`] | vetoes visibility, writes and message display |
//! | [`DeclaredStage`] | static values, localization, declared read-only |
//! | [`AccessorStage`] (model object) | members of the wrapped domain object |
//! | [`AccessorStage`] (nested model object) | only if present when built |
//! | [`AccessorStage`] (view model) | members of the bound object itself |
//! | [`FallbackStage`] | errors, message selection |
//!
//! # Invariants
//!
//! 1. The first stage returning [`Resolution::Resolved`] wins; later stages
//!    are not consulted.
//! 2. Stages hold no state of a particular refresh. Anything that may change
//!    between calls (the nested model object, behavior votes) is looked up
//!    per call.
//! 3. A chain without a resolving stage reports
//!    [`BindingError::UnresolvableProperty`] instead of a default.

mod accessor;
mod behavior;
mod declared;
mod fallback;

pub use accessor::{AccessorStage, TargetSource};
pub use behavior::BehaviorStage;
pub use declared::DeclaredStage;
pub use fallback::FallbackStage;

use std::fmt;
use std::rc::Rc;

use bindery_i18n::Localizer;

use crate::accessor::AccessorCache;
use crate::aspect::Aspect;
use crate::behavior::BehaviorProvider;
use crate::config::PropertyConfig;
use crate::error::{BindingError, BindingResult};
use crate::message::MessageList;
use crate::model::ObjectRef;
use crate::value::{BindValue, Value, ValueKind};

/// Outcome of asking one stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    Resolved(T),
    /// Not answerable here; try the next stage.
    Delegate,
}

/// The object and property a chain is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundProperty {
    pub object: ObjectRef,
    pub property: String,
}

impl BoundProperty {
    #[must_use]
    pub fn new(object: ObjectRef, property: impl Into<String>) -> Self {
        Self {
            object,
            property: property.into(),
        }
    }
}

/// One resolver in a dispatcher chain.
///
/// Every operation defaults to delegating.
pub trait DispatchStage {
    fn stage_name(&self) -> &'static str;

    fn pull(&self, _bound: &BoundProperty, _aspect: &Aspect) -> BindingResult<Resolution<Value>> {
        Ok(Resolution::Delegate)
    }

    fn push(&self, _bound: &BoundProperty, _aspect: &Aspect) -> BindingResult<Resolution<()>> {
        Ok(Resolution::Delegate)
    }

    fn is_push_writable(&self, _bound: &BoundProperty, _aspect: &Aspect) -> Resolution<bool> {
        Resolution::Delegate
    }

    fn messages(&self, _bound: &BoundProperty, _messages: &MessageList) -> Resolution<MessageList> {
        Resolution::Delegate
    }

    fn value_kind(&self, _bound: &BoundProperty) -> Resolution<ValueKind> {
        Resolution::Delegate
    }
}

/// Resolves the aspects of one bound property.
pub trait PropertyDispatcher {
    fn property(&self) -> &str;

    fn bound_object(&self) -> &ObjectRef;

    /// Resolve `aspect`. Static aspects may be answered without touching the
    /// model.
    fn pull(&self, aspect: &Aspect) -> BindingResult<Value>;

    /// Write the value carried by `aspect`, or invoke the member when the
    /// aspect carries none. A vetoed write is not an error.
    fn push(&self, aspect: &Aspect) -> BindingResult<()>;

    /// Whether a push of `aspect` would reach the model.
    fn is_push_writable(&self, aspect: &Aspect) -> bool;

    /// The subset of `messages` this property displays.
    fn messages(&self, messages: &MessageList) -> MessageList;

    /// Declared type of the value member, if known.
    fn value_kind(&self) -> Option<ValueKind>;
}

/// Typed convenience over [`PropertyDispatcher::pull`].
pub trait DispatcherExt: PropertyDispatcher {
    fn pull_as<T: BindValue>(&self, aspect: &Aspect) -> BindingResult<T> {
        let value = self.pull(aspect)?;
        T::from_value(value).map_err(|found| BindingError::TypeMismatch {
            property: self.property().to_owned(),
            expected: T::KIND.to_string(),
            found: found.kind().to_string(),
        })
    }
}

impl<D: PropertyDispatcher + ?Sized> DispatcherExt for D {}

/// Ordered list of stages bound to one property.
pub struct DispatcherChain {
    bound: BoundProperty,
    stages: Vec<Box<dyn DispatchStage>>,
}

impl DispatcherChain {
    /// Chain over explicit stages, outermost first.
    #[must_use]
    pub fn from_stages(bound: BoundProperty, stages: Vec<Box<dyn DispatchStage>>) -> Self {
        Self { bound, stages }
    }

    /// Stage names, outermost first.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.stage_name()).collect()
    }

    fn unresolved(&self, aspect: &Aspect) -> BindingError {
        BindingError::UnresolvableProperty {
            property: self.bound.property.clone(),
            aspect: aspect.name().to_owned(),
            candidates: Vec::new(),
        }
    }
}

impl PropertyDispatcher for DispatcherChain {
    fn property(&self) -> &str {
        &self.bound.property
    }

    fn bound_object(&self) -> &ObjectRef {
        &self.bound.object
    }

    fn pull(&self, aspect: &Aspect) -> BindingResult<Value> {
        for stage in &self.stages {
            if let Resolution::Resolved(value) = stage.pull(&self.bound, aspect)? {
                tracing::trace!(
                    property = %self.bound.property,
                    aspect = aspect.name(),
                    stage = stage.stage_name(),
                    "pull resolved"
                );
                return Ok(value);
            }
        }
        Err(self.unresolved(aspect))
    }

    fn push(&self, aspect: &Aspect) -> BindingResult<()> {
        for stage in &self.stages {
            if let Resolution::Resolved(()) = stage.push(&self.bound, aspect)? {
                tracing::trace!(
                    property = %self.bound.property,
                    aspect = aspect.name(),
                    stage = stage.stage_name(),
                    "push resolved"
                );
                return Ok(());
            }
        }
        Err(BindingError::NotWritable {
            property: self.bound.property.clone(),
            aspect: aspect.name().to_owned(),
            candidates: Vec::new(),
        })
    }

    fn is_push_writable(&self, aspect: &Aspect) -> bool {
        self.stages
            .iter()
            .find_map(|stage| match stage.is_push_writable(&self.bound, aspect) {
                Resolution::Resolved(writable) => Some(writable),
                Resolution::Delegate => None,
            })
            .unwrap_or(false)
    }

    fn messages(&self, messages: &MessageList) -> MessageList {
        self.stages
            .iter()
            .find_map(|stage| match stage.messages(&self.bound, messages) {
                Resolution::Resolved(list) => Some(list),
                Resolution::Delegate => None,
            })
            .unwrap_or_default()
    }

    fn value_kind(&self) -> Option<ValueKind> {
        self.stages
            .iter()
            .find_map(|stage| match stage.value_kind(&self.bound) {
                Resolution::Resolved(kind) => Some(kind),
                Resolution::Delegate => None,
            })
    }
}

impl fmt::Debug for DispatcherChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherChain")
            .field("bound", &self.bound)
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builds dispatcher chains for one application or session scope.
///
/// Owns nothing global: the accessor cache and the optional localizer are
/// injected and shared by every chain it builds.
#[derive(Clone, Debug)]
pub struct DispatcherFactory {
    accessors: Rc<AccessorCache>,
    localizer: Option<Localizer>,
    fatal_code: Option<String>,
}

impl DispatcherFactory {
    #[must_use]
    pub fn new(accessors: Rc<AccessorCache>) -> Self {
        Self {
            accessors,
            localizer: None,
            fatal_code: None,
        }
    }

    /// Localize static texts through `localizer`.
    #[must_use]
    pub fn with_localizer(mut self, localizer: Localizer) -> Self {
        self.localizer = Some(localizer);
        self
    }

    /// Messages with this code are shown by every binding.
    #[must_use]
    pub fn with_fatal_code(mut self, code: impl Into<String>) -> Self {
        self.fatal_code = Some(code.into());
        self
    }

    #[must_use]
    pub fn accessors(&self) -> &Rc<AccessorCache> {
        &self.accessors
    }

    /// Build the chain for `property` of `object`.
    #[must_use]
    pub fn create(
        &self,
        object: &ObjectRef,
        property: &str,
        config: Rc<PropertyConfig>,
        behaviors: &BehaviorProvider,
    ) -> DispatcherChain {
        let accessor = |source| {
            Box::new(AccessorStage::new(
                source,
                Rc::clone(&self.accessors),
                Rc::clone(&config),
            )) as Box<dyn DispatchStage>
        };

        let mut stages: Vec<Box<dyn DispatchStage>> = vec![
            Box::new(BehaviorStage::new(behaviors.clone())),
            Box::new(DeclaredStage::new(Rc::clone(&config), self.localizer.clone())),
            accessor(TargetSource::ModelObject),
        ];
        if TargetSource::NestedModelObject.resolve(object).is_some() {
            stages.push(accessor(TargetSource::NestedModelObject));
        }
        stages.push(accessor(TargetSource::ViewModel));
        stages.push(Box::new(FallbackStage::new(
            Rc::clone(&config),
            self.fatal_code.clone(),
        )));

        tracing::trace!(
            owner = object.short_type_name(),
            property,
            stages = stages.len(),
            "built dispatcher chain"
        );
        DispatcherChain::from_stages(BoundProperty::new(object.clone(), property), stages)
    }
}
