#![forbid(unsafe_code)]

//! Headless widgets recording everything the engine tells them.
//!
//! Every widget is a [`HeadlessWidget`] with a type label and a capability
//! set. Setters only record state; tests read it back through the
//! accessors and drive user interaction with [`HeadlessWidget::type_value`]
//! and [`HeadlessWidget::click`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use bindery_core::widget::describe;
use bindery_core::{
    BindingResult, Capabilities, ClickListener, MessageList, Value, ValueListener, Widget, WidgetId,
};

/// Recorded state of a headless widget.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetState {
    pub value: Value,
    pub enabled: bool,
    pub visible: bool,
    pub required: bool,
    pub read_only: bool,
    pub caption: Option<String>,
    pub tooltip: Option<String>,
    pub items: Vec<Value>,
    pub footer: Value,
    pub messages: MessageList,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self {
            value: Value::Null,
            enabled: true,
            visible: true,
            required: false,
            read_only: false,
            caption: None,
            tooltip: None,
            items: Vec::new(),
            footer: Value::Null,
            messages: MessageList::new(),
        }
    }
}

/// Number of times each setter was called.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SetterCalls {
    pub value: u32,
    pub items: u32,
    pub footer: u32,
    pub messages: u32,
}

/// In-memory widget for tests.
pub struct HeadlessWidget {
    id: WidgetId,
    widget_type: &'static str,
    capabilities: Capabilities,
    state: RefCell<WidgetState>,
    calls: Cell<SetterCalls>,
    value_listener: RefCell<Option<ValueListener>>,
    click_listener: RefCell<Option<ClickListener>>,
    children: RefCell<Vec<Rc<dyn Widget>>>,
}

impl HeadlessWidget {
    #[must_use]
    pub fn new(widget_type: &'static str, capabilities: Capabilities) -> Rc<Self> {
        Rc::new(Self {
            id: WidgetId::next(),
            widget_type,
            capabilities,
            state: RefCell::new(WidgetState::default()),
            calls: Cell::new(SetterCalls::default()),
            value_listener: RefCell::new(None),
            click_listener: RefCell::new(None),
            children: RefCell::new(Vec::new()),
        })
    }

    /// Single line text input.
    #[must_use]
    pub fn text_field() -> Rc<Self> {
        Self::new("TextField", Capabilities::FIELD)
    }

    #[must_use]
    pub fn check_box() -> Rc<Self> {
        Self::new("CheckBox", Capabilities::FIELD)
    }

    /// Selection from a list of options.
    #[must_use]
    pub fn combo_box() -> Rc<Self> {
        Self::new("ComboBox", Capabilities::FIELD | Capabilities::ITEMS)
    }

    /// Read-only display; shows neither messages nor a required marker.
    #[must_use]
    pub fn label() -> Rc<Self> {
        Self::new(
            "Label",
            Capabilities::VALUE | Capabilities::VISIBLE | Capabilities::CAPTION,
        )
    }

    #[must_use]
    pub fn button() -> Rc<Self> {
        Self::new(
            "Button",
            Capabilities::CLICK
                | Capabilities::ENABLED
                | Capabilities::VISIBLE
                | Capabilities::CAPTION
                | Capabilities::TOOLTIP,
        )
    }

    /// Row container with an optional footer.
    #[must_use]
    pub fn table() -> Rc<Self> {
        Self::new(
            "Table",
            Capabilities::ITEMS
                | Capabilities::ENABLED
                | Capabilities::VISIBLE
                | Capabilities::CAPTION
                | Capabilities::TOOLTIP
                | Capabilities::FOOTER
                | Capabilities::MESSAGES
                | Capabilities::CHILDREN,
        )
    }

    /// Plain grouping of child widgets.
    #[must_use]
    pub fn layout(children: Vec<Rc<dyn Widget>>) -> Rc<Self> {
        let layout = Self::new("Layout", Capabilities::VISIBLE | Capabilities::CHILDREN);
        *layout.children.borrow_mut() = children;
        layout
    }

    pub fn add_child(&self, child: Rc<dyn Widget>) {
        self.children.borrow_mut().push(child);
    }

    /// Snapshot of the recorded state.
    #[must_use]
    pub fn state(&self) -> WidgetState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn value(&self) -> Value {
        self.state.borrow().value.clone()
    }

    #[must_use]
    pub fn items(&self) -> Vec<Value> {
        self.state.borrow().items.clone()
    }

    #[must_use]
    pub fn messages(&self) -> MessageList {
        self.state.borrow().messages.clone()
    }

    #[must_use]
    pub fn calls(&self) -> SetterCalls {
        self.calls.get()
    }

    /// Simulate a user edit. Does nothing if no binding listens.
    pub fn type_value(&self, value: impl Into<Value>) -> BindingResult<()> {
        let value = value.into();
        tracing::trace!(widget = %describe(self), %value, "simulated edit");
        self.state.borrow_mut().value = value.clone();
        match &*self.value_listener.borrow() {
            Some(listener) => listener(value),
            None => Ok(()),
        }
    }

    /// Simulate an activation. Does nothing if no binding listens.
    pub fn click(&self) -> BindingResult<()> {
        tracing::trace!(widget = %describe(self), "simulated click");
        match &*self.click_listener.borrow() {
            Some(listener) => listener(),
            None => Ok(()),
        }
    }

    fn record(&self, f: impl FnOnce(&mut SetterCalls)) {
        let mut calls = self.calls.get();
        f(&mut calls);
        self.calls.set(calls);
    }
}

impl Widget for HeadlessWidget {
    fn widget_id(&self) -> WidgetId {
        self.id
    }

    fn widget_type(&self) -> &'static str {
        self.widget_type
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn set_enabled(&self, enabled: bool) {
        self.state.borrow_mut().enabled = enabled;
    }

    fn set_visible(&self, visible: bool) {
        self.state.borrow_mut().visible = visible;
    }

    fn set_required(&self, required: bool) {
        self.state.borrow_mut().required = required;
    }

    fn set_caption(&self, caption: Option<&str>) {
        self.state.borrow_mut().caption = caption.map(str::to_owned);
    }

    fn set_tooltip(&self, tooltip: Option<&str>) {
        self.state.borrow_mut().tooltip = tooltip.map(str::to_owned);
    }

    fn set_value(&self, value: &Value) {
        self.record(|c| c.value += 1);
        self.state.borrow_mut().value = value.clone();
    }

    fn set_read_only(&self, read_only: bool) {
        self.state.borrow_mut().read_only = read_only;
    }

    fn set_items(&self, items: &[Value]) {
        self.record(|c| c.items += 1);
        self.state.borrow_mut().items = items.to_vec();
    }

    fn set_footer(&self, footer: &Value) {
        self.record(|c| c.footer += 1);
        self.state.borrow_mut().footer = footer.clone();
    }

    fn show_messages(&self, messages: &MessageList) {
        self.record(|c| c.messages += 1);
        self.state.borrow_mut().messages = messages.clone();
    }

    fn on_value_change(&self, listener: ValueListener) {
        *self.value_listener.borrow_mut() = Some(listener);
    }

    fn on_click(&self, listener: ClickListener) {
        *self.click_listener.borrow_mut() = Some(listener);
    }

    fn child_widgets(&self) -> Vec<Rc<dyn Widget>> {
        self.children.borrow().clone()
    }
}

impl fmt::Debug for HeadlessWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessWidget")
            .field("id", &self.id)
            .field("type", &self.widget_type)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_edit_reaches_listener() {
        let field = HeadlessWidget::text_field();
        let seen = Rc::new(RefCell::new(Value::Null));
        let sink = Rc::clone(&seen);
        field.on_value_change(Box::new(move |v| {
            *sink.borrow_mut() = v;
            Ok(())
        }));

        field.type_value("hello").unwrap();
        assert_eq!(*seen.borrow(), Value::from("hello"));
        assert_eq!(field.value(), Value::from("hello"));
    }

    #[test]
    fn click_without_listener_is_noop() {
        assert!(HeadlessWidget::button().click().is_ok());
    }

    #[test]
    fn layout_reports_children() {
        let child: Rc<dyn Widget> = HeadlessWidget::text_field();
        let layout = HeadlessWidget::layout(vec![Rc::clone(&child)]);
        let ids: Vec<_> = layout.child_widgets().iter().map(|w| w.widget_id()).collect();
        assert_eq!(ids, vec![child.widget_id()]);
    }

    #[test]
    fn setters_are_counted() {
        let combo = HeadlessWidget::combo_box();
        combo.set_items(&[Value::from("a")]);
        combo.set_items(&[Value::from("b")]);
        assert_eq!(combo.calls().items, 2);
        assert_eq!(combo.items(), vec![Value::from("b")]);
    }
}
