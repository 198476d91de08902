#![forbid(unsafe_code)]

//! Bindings: the live association of one widget with one dispatcher.
//!
//! - [`ElementBinding`] drives an input or display widget.
//! - [`ActionBinding`] drives a button; it never displays messages.
//! - [`ContainerBinding`](crate::container::ContainerBinding) owns the
//!   bindings of its rows.

use std::fmt;
use std::rc::Rc;

use bindery_core::widget::describe;
use bindery_core::{
    BindingResult, Capabilities, MessageList, ObjectRef, PropertyDispatcher, Widget, WidgetId,
};

use crate::aspects::{AspectDefinition, ModelChanged, UiUpdater};
use crate::scope::Refresher;

/// A widget bound to a property.
pub trait Binding {
    fn widget(&self) -> &Rc<dyn Widget>;

    fn dispatcher(&self) -> &Rc<dyn PropertyDispatcher>;

    fn widget_id(&self) -> WidgetId {
        self.widget().widget_id()
    }

    fn bound_object(&self) -> &ObjectRef {
        self.dispatcher().bound_object()
    }

    fn property(&self) -> &str {
        self.dispatcher().property()
    }

    /// `"Type#id"` of the widget, for diagnostics.
    fn describe(&self) -> String {
        describe(self.widget().as_ref())
    }

    /// Recompute the set of nested bindings. Only containers have any.
    fn update_structure(&self, _refresher: &Refresher) -> BindingResult<()> {
        Ok(())
    }

    /// Pull every aspect and apply it to the widget.
    fn update_from_pmo(&self, refresher: &Refresher) -> BindingResult<()>;

    /// Show the messages relevant to this binding and return them.
    fn display_messages(&self, messages: &MessageList) -> MessageList;

    /// Bindings owned by this one at any depth. Only containers have any.
    fn nested_binding_count(&self) -> usize {
        0
    }

    /// Release nested bindings of `pmo`. Returns how many were removed.
    fn remove_bindings_for_pmo(&self, _pmo: &ObjectRef) -> usize {
        0
    }

    /// Release nested bindings of the given widgets.
    fn remove_bindings_for_widgets(&self, _widgets: &[WidgetId]) -> usize {
        0
    }
}

/// Binding of an input or display widget.
pub struct ElementBinding {
    widget: Rc<dyn Widget>,
    dispatcher: Rc<dyn PropertyDispatcher>,
    updater: UiUpdater,
}

impl ElementBinding {
    /// Wire `definition` between `widget` and `dispatcher`.
    ///
    /// Fails if the widget lacks a capability the definition requires.
    pub fn new(
        widget: Rc<dyn Widget>,
        dispatcher: Rc<dyn PropertyDispatcher>,
        definition: &dyn AspectDefinition,
        model_changed: ModelChanged,
    ) -> BindingResult<Self> {
        let updater = definition.create_ui_updater(Rc::clone(&dispatcher), Rc::clone(&widget))?;
        definition.init_model_update(Rc::clone(&dispatcher), Rc::clone(&widget), model_changed)?;
        Ok(Self {
            widget,
            dispatcher,
            updater,
        })
    }

    /// Run the updater directly, bypassing any refresh policy.
    pub fn refresh(&self) -> BindingResult<()> {
        (self.updater)()
    }
}

impl Binding for ElementBinding {
    fn widget(&self) -> &Rc<dyn Widget> {
        &self.widget
    }

    fn dispatcher(&self) -> &Rc<dyn PropertyDispatcher> {
        &self.dispatcher
    }

    fn update_from_pmo(&self, _refresher: &Refresher) -> BindingResult<()> {
        self.refresh()
    }

    fn display_messages(&self, messages: &MessageList) -> MessageList {
        let shown = self.dispatcher.messages(messages);
        if self.widget.capabilities().contains(Capabilities::MESSAGES) {
            self.widget.show_messages(&shown);
        }
        shown
    }
}

impl fmt::Debug for ElementBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementBinding")
            .field("widget", &self.describe())
            .field("property", &self.property())
            .finish()
    }
}

/// Binding of a button to an action member.
pub struct ActionBinding {
    inner: ElementBinding,
}

impl ActionBinding {
    pub fn new(
        widget: Rc<dyn Widget>,
        dispatcher: Rc<dyn PropertyDispatcher>,
        definition: &dyn AspectDefinition,
        model_changed: ModelChanged,
    ) -> BindingResult<Self> {
        Ok(Self {
            inner: ElementBinding::new(widget, dispatcher, definition, model_changed)?,
        })
    }
}

impl Binding for ActionBinding {
    fn widget(&self) -> &Rc<dyn Widget> {
        self.inner.widget()
    }

    fn dispatcher(&self) -> &Rc<dyn PropertyDispatcher> {
        self.inner.dispatcher()
    }

    fn update_from_pmo(&self, refresher: &Refresher) -> BindingResult<()> {
        self.inner.update_from_pmo(refresher)
    }

    fn display_messages(&self, _messages: &MessageList) -> MessageList {
        MessageList::new()
    }
}

impl fmt::Debug for ActionBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionBinding")
            .field("widget", &self.describe())
            .field("property", &self.property())
            .finish()
    }
}
