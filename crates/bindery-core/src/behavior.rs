//! Property behaviors: externally supplied vetoes on writability, visibility
//! and message display.
//!
//! Behaviors combine by unanimous consent. An empty set allows everything; a
//! single behavior returning `false` vetoes. Vetoes are never errors.
//!
//! # Invariants
//!
//! 1. [`BehaviorProvider::is_consensus`] is re-evaluated on every call; no
//!    result is cached, since behaviors may read external state.
//! 2. Behaviors are read-only to the dispatch chain.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::model::ObjectRef;

/// Predicate set over `(bound object, property)`.
///
/// Every predicate defaults to `true`.
pub trait PropertyBehavior {
    fn is_writable(&self, _object: &ObjectRef, _property: &str) -> bool {
        true
    }

    fn is_visible(&self, _object: &ObjectRef, _property: &str) -> bool {
        true
    }

    fn is_show_validation_messages(&self, _object: &ObjectRef, _property: &str) -> bool {
        true
    }
}

type Predicate = Box<dyn Fn(&ObjectRef, &str) -> bool>;

/// Behavior assembled from closures.
///
/// ```
/// use bindery_core::behavior::FnBehavior;
///
/// let read_only = FnBehavior::read_only();
/// let hide_secrets = FnBehavior::new().visible(|_, property| property != "password");
/// # let _ = (read_only, hide_secrets);
/// ```
#[derive(Default)]
pub struct FnBehavior {
    writable: Option<Predicate>,
    visible: Option<Predicate>,
    messages: Option<Predicate>,
}

impl FnBehavior {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deny every write.
    #[must_use]
    pub fn read_only() -> Self {
        Self::new().writable(|_, _| false)
    }

    #[must_use]
    pub fn writable(mut self, predicate: impl Fn(&ObjectRef, &str) -> bool + 'static) -> Self {
        self.writable = Some(Box::new(predicate));
        self
    }

    #[must_use]
    pub fn visible(mut self, predicate: impl Fn(&ObjectRef, &str) -> bool + 'static) -> Self {
        self.visible = Some(Box::new(predicate));
        self
    }

    #[must_use]
    pub fn show_messages(
        mut self,
        predicate: impl Fn(&ObjectRef, &str) -> bool + 'static,
    ) -> Self {
        self.messages = Some(Box::new(predicate));
        self
    }
}

impl PropertyBehavior for FnBehavior {
    fn is_writable(&self, object: &ObjectRef, property: &str) -> bool {
        self.writable.as_ref().is_none_or(|p| p(object, property))
    }

    fn is_visible(&self, object: &ObjectRef, property: &str) -> bool {
        self.visible.as_ref().is_none_or(|p| p(object, property))
    }

    fn is_show_validation_messages(&self, object: &ObjectRef, property: &str) -> bool {
        self.messages.as_ref().is_none_or(|p| p(object, property))
    }
}

impl fmt::Debug for FnBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnBehavior")
            .field("writable", &self.writable.is_some())
            .field("visible", &self.visible.is_some())
            .field("messages", &self.messages.is_some())
            .finish()
    }
}

/// Shared, mutable set of behaviors for one application or scope.
///
/// Cloning shares the backing collection.
#[derive(Clone, Default)]
pub struct BehaviorProvider {
    behaviors: Rc<RefCell<Vec<Rc<dyn PropertyBehavior>>>>,
}

impl BehaviorProvider {
    /// A provider without behaviors: everything is allowed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(behaviors: impl IntoIterator<Item = Rc<dyn PropertyBehavior>>) -> Self {
        Self {
            behaviors: Rc::new(RefCell::new(behaviors.into_iter().collect())),
        }
    }

    pub fn add(&self, behavior: Rc<dyn PropertyBehavior>) {
        self.behaviors.borrow_mut().push(behavior);
    }

    /// Remove a behavior by identity. Returns whether it was registered.
    pub fn remove(&self, behavior: &Rc<dyn PropertyBehavior>) -> bool {
        let mut behaviors = self.behaviors.borrow_mut();
        let before = behaviors.len();
        behaviors.retain(|b| !Rc::ptr_eq(b, behavior));
        behaviors.len() != before
    }

    pub fn clear(&self) {
        self.behaviors.borrow_mut().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.behaviors.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.behaviors.borrow().is_empty()
    }

    /// `true` if there are no behaviors or every behavior satisfies
    /// `predicate`.
    pub fn is_consensus(&self, predicate: impl Fn(&dyn PropertyBehavior) -> bool) -> bool {
        // Snapshot so a behavior may touch the provider while being asked.
        let behaviors: Vec<_> = self.behaviors.borrow().iter().cloned().collect();
        behaviors.iter().all(|b| predicate(b.as_ref()))
    }

    pub fn is_writable(&self, object: &ObjectRef, property: &str) -> bool {
        self.is_consensus(|b| b.is_writable(object, property))
    }

    pub fn is_visible(&self, object: &ObjectRef, property: &str) -> bool {
        self.is_consensus(|b| b.is_visible(object, property))
    }

    pub fn is_show_validation_messages(&self, object: &ObjectRef, property: &str) -> bool {
        self.is_consensus(|b| b.is_show_validation_messages(object, property))
    }
}

impl fmt::Debug for BehaviorProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorProvider")
            .field("behaviors", &self.len())
            .finish()
    }
}
