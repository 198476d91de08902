#![forbid(unsafe_code)]

//! The binding context: owner of the bindings of one UI region and driver
//! of its update cycle.
//!
//! # Update cycle
//!
//! [`BindingContext::update_ui`] runs three phases in a fixed order:
//!
//! 1. **structure**: every container recomputes its rows, creating and
//!    releasing row bindings;
//! 2. **properties**: every binding, including freshly created rows, pulls
//!    its aspects and updates its widget;
//! 3. **messages**: the validation service is asked once and its messages
//!    are distributed to every binding.
//!
//! # Invariants
//!
//! 1. No binding is refreshed before every container has settled its rows.
//! 2. A model change reported while a cycle runs does not recurse; it
//!    schedules one follow-up cycle after the current one.
//! 3. Follow-up cycles are bounded by
//!    [`ContextOptions::max_follow_up_cycles`].
//!
//! # Failure Modes
//!
//! - Under [`RefreshPolicy::AbortOnFirstError`] the first failing binding
//!   stops the cycle; the error names the widget and property.
//! - Under [`RefreshPolicy::ContainPerBinding`] failures are logged and
//!   collected; see [`BindingContext::take_failures`].
//! - Vetoes are never failures.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use bindery_core::{
    BehaviorProvider, BindingConfig, BindingError, BindingResult, DispatcherFactory, MessageList,
    NoValidation, ObjectRef, PropertyConfig, ValidationService, Widget, WidgetId,
};

use crate::aspects::ModelChanged;
use crate::binder::BinderEnv;
use crate::binding::{ActionBinding, Binding, ElementBinding};
use crate::container::{ContainerBinding, RowBinder};
use crate::scope::{BindingScope, RefreshPolicy, Refresher};

/// Tuning of one binding context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
    /// Name used in log spans.
    pub name: String,
    pub refresh_policy: RefreshPolicy,
    /// Follow-up cycles allowed after model changes reported during a cycle.
    pub max_follow_up_cycles: usize,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            name: "default".to_owned(),
            refresh_policy: RefreshPolicy::AbortOnFirstError,
            max_follow_up_cycles: 4,
        }
    }
}

impl ContextOptions {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_policy = policy;
        self
    }

    #[must_use]
    pub fn max_follow_up_cycles(mut self, cycles: usize) -> Self {
        self.max_follow_up_cycles = cycles;
        self
    }
}

/// Builder for [`BindingContext`].
pub struct BindingContextBuilder {
    factory: DispatcherFactory,
    behaviors: BehaviorProvider,
    config: BindingConfig,
    validation: Rc<dyn ValidationService>,
    options: ContextOptions,
}

impl BindingContextBuilder {
    #[must_use]
    pub fn behaviors(mut self, behaviors: BehaviorProvider) -> Self {
        self.behaviors = behaviors;
        self
    }

    /// Decision tables used by [`BindingContext::bind`] and friends.
    #[must_use]
    pub fn config(mut self, config: BindingConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn validation(mut self, validation: impl ValidationService + 'static) -> Self {
        self.validation = Rc::new(validation);
        self
    }

    #[must_use]
    pub fn options(mut self, options: ContextOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn build(self) -> BindingContext {
        let inner = Rc::new_cyclic(|weak: &Weak<ContextInner>| {
            let weak = weak.clone();
            let model_changed: ModelChanged = Rc::new(move || match weak.upgrade() {
                Some(inner) => inner.update_ui(),
                None => Ok(()),
            });
            ContextInner {
                env: Rc::new(BinderEnv {
                    factory: self.factory,
                    behaviors: self.behaviors,
                    config: self.config,
                    refresher: Refresher::new(self.options.refresh_policy),
                    model_changed,
                }),
                scope: BindingScope::new(),
                validation: self.validation,
                options: self.options,
                updating: Cell::new(false),
                pending: Cell::new(false),
                shown: RefCell::new(MessageList::new()),
            }
        });
        BindingContext { inner }
    }
}

struct ContextInner {
    env: Rc<BinderEnv>,
    scope: BindingScope,
    validation: Rc<dyn ValidationService>,
    options: ContextOptions,
    updating: Cell<bool>,
    pending: Cell<bool>,
    shown: RefCell<MessageList>,
}

impl ContextInner {
    fn update_ui(&self) -> BindingResult<()> {
        if self.updating.get() {
            tracing::trace!(context = %self.options.name, "model changed during update, coalesced");
            self.pending.set(true);
            return Ok(());
        }
        self.updating.set(true);
        let result = self.run_cycles();
        self.updating.set(false);
        result
    }

    fn run_cycles(&self) -> BindingResult<()> {
        let mut follow_ups = 0;
        loop {
            self.pending.set(false);
            self.cycle()?;
            if !self.pending.get() {
                return Ok(());
            }
            if follow_ups == self.options.max_follow_up_cycles {
                tracing::warn!(
                    context = %self.options.name,
                    cycles = follow_ups,
                    "model still changing after follow-up cycles, giving up"
                );
                self.pending.set(false);
                return Ok(());
            }
            follow_ups += 1;
        }
    }

    fn cycle(&self) -> BindingResult<()> {
        let span = tracing::debug_span!(
            "update_ui",
            context = %self.options.name,
            bindings = self.scope.len()
        );
        let _guard = span.enter();
        let refresher = &self.env.refresher;

        tracing::trace!("phase: structure");
        self.scope.update_structure(refresher)?;

        tracing::trace!("phase: properties");
        self.scope.update_from_pmo(refresher)?;

        tracing::trace!("phase: messages");
        let messages = self.validation.validation_messages();
        let shown = self.scope.display_messages(&messages);
        tracing::trace!(messages = messages.len(), shown = shown.len(), "messages distributed");
        *self.shown.borrow_mut() = shown;
        Ok(())
    }
}

/// Owns the bindings of one UI region.
///
/// Cloning shares the context.
#[derive(Clone)]
pub struct BindingContext {
    inner: Rc<ContextInner>,
}

impl BindingContext {
    /// Start building a context whose chains come from `factory`.
    #[must_use]
    pub fn builder(factory: DispatcherFactory) -> BindingContextBuilder {
        BindingContextBuilder {
            factory,
            behaviors: BehaviorProvider::new(),
            config: BindingConfig::new(),
            validation: Rc::new(NoValidation),
            options: ContextOptions::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.options.name
    }

    /// Bind `property` of `pmo` to `widget` using the configured decision
    /// table. The widget is updated immediately.
    pub fn bind(
        &self,
        pmo: &ObjectRef,
        property: &str,
        widget: Rc<dyn Widget>,
    ) -> BindingResult<Rc<ElementBinding>> {
        let config = self.inner.env.config_for(pmo, property);
        self.bind_with(pmo, property, widget, config)
    }

    /// Bind with an explicit decision table.
    pub fn bind_with(
        &self,
        pmo: &ObjectRef,
        property: &str,
        widget: Rc<dyn Widget>,
        config: impl Into<Rc<PropertyConfig>>,
    ) -> BindingResult<Rc<ElementBinding>> {
        let binding = self.inner.env.element(pmo, property, widget, config.into())?;
        self.register(binding.clone())?;
        Ok(binding)
    }

    /// Bind a button to the action member `property` of `pmo`.
    pub fn bind_action(
        &self,
        pmo: &ObjectRef,
        property: &str,
        widget: Rc<dyn Widget>,
    ) -> BindingResult<Rc<ActionBinding>> {
        let config = self.inner.env.config_for(pmo, property);
        let binding = self.inner.env.action(pmo, property, widget, config)?;
        self.register(binding.clone())?;
        Ok(binding)
    }

    /// Bind a container widget to the row collection `property` of `pmo`.
    ///
    /// `row_builder` binds the properties of each row.
    pub fn bind_container(
        &self,
        pmo: &ObjectRef,
        property: &str,
        widget: Rc<dyn Widget>,
        config: impl Into<Rc<PropertyConfig>>,
        row_builder: impl Fn(&RowBinder<'_>) -> BindingResult<()> + 'static,
    ) -> BindingResult<Rc<ContainerBinding>> {
        let binding = self.inner.env.container(
            pmo,
            property,
            widget,
            config.into(),
            Rc::new(row_builder),
        )?;
        self.register(binding.clone())?;
        Ok(binding)
    }

    /// Initial update of a new binding; it is kept only if that succeeds.
    fn register(&self, binding: Rc<dyn Binding>) -> BindingResult<()> {
        let refresher = Refresher::new(RefreshPolicy::AbortOnFirstError);
        refresher.structure(binding.as_ref())?;
        refresher.refresh(binding.as_ref())?;
        self.inner.scope.add(binding);
        Ok(())
    }

    /// Run one update cycle.
    pub fn update_ui(&self) -> BindingResult<()> {
        self.inner.update_ui()
    }

    /// Callback to hand to code that changes the model outside a widget
    /// event. Holds the context weakly.
    #[must_use]
    pub fn model_changed(&self) -> ModelChanged {
        Rc::clone(&self.inner.env.model_changed)
    }

    /// Whether an update cycle is running.
    #[must_use]
    pub fn is_updating(&self) -> bool {
        self.inner.updating.get()
    }

    /// Release every binding of `pmo`, including rows of containers.
    pub fn remove_bindings_for_pmo(&self, pmo: &ObjectRef) -> usize {
        let removed = self.inner.scope.remove_for_pmo(pmo);
        tracing::debug!(context = %self.name(), pmo = ?pmo, removed, "removed bindings for pmo");
        removed
    }

    /// Release every binding of `widget` and of the widgets nested in it.
    pub fn remove_bindings_for_widget(&self, widget: &dyn Widget) -> usize {
        let mut ids = Vec::new();
        collect_widget_ids(widget, &mut ids);
        let removed = self.inner.scope.remove_for_widgets(&ids);
        tracing::debug!(context = %self.name(), widgets = ids.len(), removed, "removed bindings for widget");
        removed
    }

    /// Number of bindings registered directly with this context.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.inner.scope.len()
    }

    /// Messages shown by the last update cycle.
    #[must_use]
    pub fn messages(&self) -> MessageList {
        self.inner.shown.borrow().clone()
    }

    /// Failures collected under [`RefreshPolicy::ContainPerBinding`].
    pub fn take_failures(&self) -> Vec<BindingError> {
        self.inner.env.refresher.take_failures()
    }
}

fn collect_widget_ids(widget: &dyn Widget, ids: &mut Vec<WidgetId>) {
    ids.push(widget.widget_id());
    for child in widget.child_widgets() {
        collect_widget_ids(child.as_ref(), ids);
    }
}

impl fmt::Debug for BindingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingContext")
            .field("name", &self.name())
            .field("bindings", &self.binding_count())
            .field("policy", &self.inner.options.refresh_policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_core::accessor::Members;
    use bindery_core::{AccessorCache, Capabilities, Message, ModelObject, Value, ValueListener};
    use std::cell::Cell;
    use tracing_test::traced_test;

    struct Pmo {
        name: RefCell<String>,
    }

    impl ModelObject for Pmo {
        fn members(&self) -> Members {
            Members::of::<Self>()
                .property(
                    "name",
                    |p: &Pmo| p.name.borrow().clone(),
                    |p: &Pmo, v: String| *p.name.borrow_mut() = v,
                )
                .build()
        }
    }

    struct Field {
        id: WidgetId,
        value: RefCell<Value>,
        listener: RefCell<Option<ValueListener>>,
        on_set: RefCell<Option<ModelChanged>>,
        sets: Cell<u32>,
    }

    impl Field {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                id: WidgetId::next(),
                value: RefCell::new(Value::Null),
                listener: RefCell::new(None),
                on_set: RefCell::new(None),
                sets: Cell::new(0),
            })
        }

        fn type_text(&self, text: &str) -> BindingResult<()> {
            match &*self.listener.borrow() {
                Some(listener) => listener(Value::from(text)),
                None => Ok(()),
            }
        }
    }

    impl Widget for Field {
        fn widget_id(&self) -> WidgetId {
            self.id
        }

        fn widget_type(&self) -> &'static str {
            "Field"
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities::FIELD
        }

        fn set_value(&self, value: &Value) {
            self.sets.set(self.sets.get() + 1);
            *self.value.borrow_mut() = value.clone();
            let hook = self.on_set.borrow().clone();
            if let Some(hook) = hook {
                let _ = hook();
            }
        }

        fn on_value_change(&self, listener: ValueListener) {
            *self.listener.borrow_mut() = Some(listener);
        }
    }

    fn pmo(name: &str) -> ObjectRef {
        ObjectRef::new(Pmo {
            name: RefCell::new(name.to_owned()),
        })
    }

    fn factory() -> DispatcherFactory {
        DispatcherFactory::new(Rc::new(AccessorCache::new()))
    }

    #[test]
    fn bind_updates_widget_immediately() {
        let ctx = BindingContext::builder(factory()).build();
        let field = Field::new();
        ctx.bind(&pmo("Ada"), "name", field.clone()).unwrap();

        assert_eq!(*field.value.borrow(), Value::from("Ada"));
        assert_eq!(ctx.binding_count(), 1);
    }

    #[test]
    fn failed_initial_update_does_not_register() {
        let ctx = BindingContext::builder(factory()).build();
        let err = ctx.bind(&pmo("Ada"), "missing", Field::new()).unwrap_err();
        assert!(matches!(err.root_cause(), BindingError::UnresolvableProperty { .. }));
        assert_eq!(ctx.binding_count(), 0);
    }

    #[test]
    fn user_edit_writes_model_and_refreshes() {
        let ctx = BindingContext::builder(factory()).build();
        let object = pmo("Ada");
        let field = Field::new();
        let other = Field::new();
        ctx.bind(&object, "name", field.clone()).unwrap();
        ctx.bind(&object, "name", other.clone()).unwrap();

        field.type_text("Grace").unwrap();

        let model = object.downcast_ref::<Pmo>().unwrap();
        assert_eq!(*model.name.borrow(), "Grace");
        assert_eq!(*other.value.borrow(), Value::from("Grace"));
    }

    #[test]
    fn messages_are_collected_per_cycle() {
        let object = pmo("Ada");
        let target = object.clone();
        let ctx = BindingContext::builder(factory())
            .validation(move || {
                MessageList::from_iter([
                    Message::error("name missing").with_invalid(&target, "name"),
                    Message::error("unrelated"),
                ])
            })
            .build();
        ctx.bind(&object, "name", Field::new()).unwrap();
        ctx.update_ui().unwrap();

        let shown = ctx.messages();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown.iter().next().map(Message::text), Some("name missing"));
    }

    #[traced_test]
    #[test]
    fn reentrant_change_is_coalesced_and_bounded() {
        let cycles = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&cycles);
        let ctx = BindingContext::builder(factory())
            .validation(move || {
                counter.set(counter.get() + 1);
                MessageList::new()
            })
            .options(ContextOptions::named("form").max_follow_up_cycles(2))
            .build();
        let field = Field::new();
        ctx.bind(&pmo("Ada"), "name", field.clone()).unwrap();

        *field.on_set.borrow_mut() = Some(ctx.model_changed());
        ctx.update_ui().unwrap();

        // One regular cycle plus two follow-ups, never nested.
        assert_eq!(cycles.get(), 3);
        assert!(!ctx.is_updating());
        assert!(logs_contain("giving up"));
    }

    #[test]
    fn single_reentrant_change_runs_one_follow_up() {
        let cycles = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&cycles);
        let ctx = BindingContext::builder(factory())
            .validation(move || {
                counter.set(counter.get() + 1);
                MessageList::new()
            })
            .build();
        let field = Field::new();
        ctx.bind(&pmo("Ada"), "name", field.clone()).unwrap();

        let fired = Rc::new(Cell::new(false));
        let once = Rc::clone(&fired);
        let changed = ctx.model_changed();
        *field.on_set.borrow_mut() = Some(Rc::new(move || {
            if once.replace(true) {
                Ok(())
            } else {
                changed()
            }
        }));
        ctx.update_ui().unwrap();

        assert!(fired.get());
        assert_eq!(cycles.get(), 2);
    }

    #[test]
    fn remove_by_widget_and_pmo() {
        let ctx = BindingContext::builder(factory()).build();
        let (a, b) = (pmo("a"), pmo("b"));
        let field = Field::new();
        ctx.bind(&a, "name", field.clone()).unwrap();
        ctx.bind(&b, "name", Field::new()).unwrap();
        ctx.bind(&b, "name", Field::new()).unwrap();

        assert_eq!(ctx.remove_bindings_for_widget(field.as_ref()), 1);
        assert_eq!(ctx.remove_bindings_for_pmo(&b), 2);
        assert_eq!(ctx.binding_count(), 0);
    }

    #[test]
    fn callback_outliving_context_is_inert() {
        let ctx = BindingContext::builder(factory()).build();
        let changed = ctx.model_changed();
        drop(ctx);
        assert!(changed().is_ok());
    }
}
