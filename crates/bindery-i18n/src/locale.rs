#![forbid(unsafe_code)]

//! Locale context read by the [`Localizer`](crate::Localizer).
//!
//! A context is owned by the application or session and handed to whatever
//! needs it; there is no process-wide instance. Static texts pick up a
//! locale switch on the next update cycle of their binding context.

use std::cell::RefCell;
use std::rc::Rc;

use crate::catalog::Locale;

/// The active locale of one application or session.
///
/// Cloning shares the underlying state.
#[derive(Clone, Debug)]
pub struct LocaleContext {
    current: Rc<RefCell<Locale>>,
}

impl Default for LocaleContext {
    fn default() -> Self {
        Self::new("en")
    }
}

impl LocaleContext {
    #[must_use]
    pub fn new(locale: impl Into<Locale>) -> Self {
        Self {
            current: Rc::new(RefCell::new(locale.into())),
        }
    }

    #[must_use]
    pub fn current_locale(&self) -> Locale {
        self.current.borrow().clone()
    }

    /// Switch every clone of this context to `locale`.
    pub fn set_locale(&self, locale: impl Into<Locale>) {
        *self.current.borrow_mut() = locale.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_english() {
        assert_eq!(LocaleContext::default().current_locale(), "en");
    }

    #[test]
    fn clones_share_state() {
        let ctx = LocaleContext::new("en");
        let other = ctx.clone();
        other.set_locale("fr");
        assert_eq!(ctx.current_locale(), "fr");
    }
}
