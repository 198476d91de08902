//! The widget seam.
//!
//! Bindings never know concrete widget types. They see a [`Widget`] that
//! advertises which aspects it can display through [`Capabilities`]; every
//! setter defaults to a no-op so a widget only implements what it shows.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;

use crate::error::BindingResult;
use crate::message::MessageList;
use crate::value::Value;

static WIDGET_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a widget instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WidgetId(u64);

impl WidgetId {
    /// Allocate a fresh id.
    #[must_use]
    pub fn next() -> Self {
        Self(WIDGET_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

bitflags! {
    /// Aspects a widget is able to display or emit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u16 {
        const VALUE    = 0b0000_0000_0001;
        const ENABLED  = 0b0000_0000_0010;
        const VISIBLE  = 0b0000_0000_0100;
        const REQUIRED = 0b0000_0000_1000;
        /// Option list or row collection.
        const ITEMS    = 0b0000_0001_0000;
        const CAPTION  = 0b0000_0010_0000;
        const TOOLTIP  = 0b0000_0100_0000;
        const MESSAGES = 0b0000_1000_0000;
        /// Emits click events.
        const CLICK    = 0b0001_0000_0000;
        const FOOTER   = 0b0010_0000_0000;
        /// Owns child widgets.
        const CHILDREN = 0b0100_0000_0000;

        /// What every labelled input field supports.
        const FIELD = Self::VALUE.bits()
            | Self::ENABLED.bits()
            | Self::VISIBLE.bits()
            | Self::REQUIRED.bits()
            | Self::CAPTION.bits()
            | Self::TOOLTIP.bits()
            | Self::MESSAGES.bits();
    }
}

/// Callback invoked with the new value when the user edits a widget.
pub type ValueListener = Box<dyn Fn(Value) -> BindingResult<()>>;

/// Callback invoked when the user activates a widget.
pub type ClickListener = Box<dyn Fn() -> BindingResult<()>>;

/// A UI element as seen by the binding engine.
pub trait Widget {
    fn widget_id(&self) -> WidgetId;

    /// Short type label used in diagnostics (`"TextField"`).
    fn widget_type(&self) -> &'static str;

    fn capabilities(&self) -> Capabilities;

    fn set_enabled(&self, _enabled: bool) {}

    fn set_visible(&self, _visible: bool) {}

    fn set_required(&self, _required: bool) {}

    fn set_caption(&self, _caption: Option<&str>) {}

    fn set_tooltip(&self, _tooltip: Option<&str>) {}

    fn set_value(&self, _value: &Value) {}

    fn set_read_only(&self, _read_only: bool) {}

    fn set_items(&self, _items: &[Value]) {}

    fn set_footer(&self, _footer: &Value) {}

    fn show_messages(&self, _messages: &MessageList) {}

    /// Register the listener for user edits, replacing any previous one.
    fn on_value_change(&self, _listener: ValueListener) {}

    /// Register the listener for activations, replacing any previous one.
    fn on_click(&self, _listener: ClickListener) {}

    /// Widgets nested in this one.
    fn child_widgets(&self) -> Vec<Rc<dyn Widget>> {
        Vec::new()
    }
}

/// `"Type#id"` label for logs and errors.
#[must_use]
pub fn describe(widget: &dyn Widget) -> String {
    format!("{}#{}", widget.widget_type(), widget.widget_id())
}
