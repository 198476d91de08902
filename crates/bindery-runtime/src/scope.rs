#![forbid(unsafe_code)]

//! Binding scopes and refresh policies.
//!
//! A [`BindingScope`] collects the bindings of one logical region: a
//! binding context or one row of a container. It refreshes them in two
//! phases (structure first, then properties) and routes every failure
//! through a [`Refresher`] that applies the [`RefreshPolicy`].
//!
//! # Invariants
//!
//! 1. Bindings are refreshed in registration order.
//! 2. Every phase iterates a snapshot, so bindings may be added or removed
//!    while a phase runs without invalidating it.
//! 3. A failure leaving the refresher carries the identity of the binding
//!    that raised it.
//! 4. `clear()` releases all bindings immediately; the scope is reusable.
//! 5. Removal counts a released binding together with everything nested in
//!    it; bindings that survive are searched for nested matches.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use bindery_core::{BindingError, BindingResult, MessageList, ObjectRef, WidgetId};

use crate::binding::Binding;

// ---------------------------------------------------------------------------
// Refresh policy
// ---------------------------------------------------------------------------

/// What happens when refreshing one binding fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Stop the refresh and return the wrapped error.
    #[default]
    AbortOnFirstError,
    /// Log and collect the wrapped error, then continue with the next
    /// binding. Collected failures are taken with
    /// [`Refresher::take_failures`].
    ContainPerBinding,
}

/// Applies a [`RefreshPolicy`] to binding refreshes.
///
/// Clones share the collected failures.
#[derive(Clone, Debug, Default)]
pub struct Refresher {
    policy: RefreshPolicy,
    failures: Rc<RefCell<Vec<BindingError>>>,
}

impl Refresher {
    #[must_use]
    pub fn new(policy: RefreshPolicy) -> Self {
        Self {
            policy,
            failures: Rc::default(),
        }
    }

    #[must_use]
    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// Recompute the nested bindings of `binding`.
    pub fn structure(&self, binding: &dyn Binding) -> BindingResult<()> {
        self.guard(binding, binding.update_structure(self))
    }

    /// Refresh all aspects of `binding`.
    pub fn refresh(&self, binding: &dyn Binding) -> BindingResult<()> {
        self.guard(binding, binding.update_from_pmo(self))
    }

    fn guard(&self, binding: &dyn Binding, result: BindingResult<()>) -> BindingResult<()> {
        let Err(err) = result else {
            return Ok(());
        };
        let fresh = !matches!(err, BindingError::Refresh { .. });
        let err = err.in_binding(binding.describe(), binding.property());
        match self.policy {
            RefreshPolicy::AbortOnFirstError => {
                if fresh {
                    tracing::warn!(error = %err, "binding refresh failed");
                }
                Err(err)
            }
            RefreshPolicy::ContainPerBinding => {
                tracing::error!(error = %err, "binding refresh failed, continuing");
                self.failures.borrow_mut().push(err);
                Ok(())
            }
        }
    }

    /// Failures collected under [`RefreshPolicy::ContainPerBinding`].
    pub fn take_failures(&self) -> Vec<BindingError> {
        std::mem::take(&mut *self.failures.borrow_mut())
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.borrow().len()
    }
}

// ---------------------------------------------------------------------------
// BindingScope
// ---------------------------------------------------------------------------

/// Ordered set of bindings of one region.
#[derive(Default)]
pub struct BindingScope {
    bindings: RefCell<Vec<Rc<dyn Binding>>>,
}

impl BindingScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, binding: Rc<dyn Binding>) {
        self.bindings.borrow_mut().push(binding);
    }

    /// Direct bindings of this scope (not counting rows of containers).
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.borrow().is_empty()
    }

    /// Direct bindings plus everything nested in containers, at any depth.
    #[must_use]
    pub fn total_binding_count(&self) -> usize {
        self.snapshot()
            .iter()
            .map(|binding| 1 + binding.nested_binding_count())
            .sum()
    }

    pub fn clear(&self) {
        let released = std::mem::take(&mut *self.bindings.borrow_mut());
        drop(released);
    }

    /// Current bindings, in registration order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Rc<dyn Binding>> {
        self.bindings.borrow().clone()
    }

    /// Phase one: let every container recompute its rows.
    pub fn update_structure(&self, refresher: &Refresher) -> BindingResult<()> {
        self.snapshot()
            .iter()
            .try_for_each(|binding| refresher.structure(binding.as_ref()))
    }

    /// Phase two: refresh every binding.
    pub fn update_from_pmo(&self, refresher: &Refresher) -> BindingResult<()> {
        self.snapshot()
            .iter()
            .try_for_each(|binding| refresher.refresh(binding.as_ref()))
    }

    /// Distribute `messages` and return everything that was shown.
    pub fn display_messages(&self, messages: &MessageList) -> MessageList {
        let mut shown = MessageList::new();
        for binding in self.snapshot() {
            shown.merge(binding.display_messages(messages));
        }
        shown
    }

    /// Remove all bindings of `pmo`, here and in nested containers.
    pub fn remove_for_pmo(&self, pmo: &ObjectRef) -> usize {
        self.remove_or_descend(
            |b| b.bound_object() == pmo,
            |b| b.remove_bindings_for_pmo(pmo),
        )
    }

    /// Remove all bindings of the given widgets, here and in nested
    /// containers.
    pub fn remove_for_widgets(&self, widgets: &[WidgetId]) -> usize {
        self.remove_or_descend(
            |b| widgets.contains(&b.widget_id()),
            |b| b.remove_bindings_for_widgets(widgets),
        )
    }

    fn remove_or_descend(
        &self,
        matches: impl Fn(&dyn Binding) -> bool,
        descend: impl Fn(&dyn Binding) -> usize,
    ) -> usize {
        let released: Vec<Rc<dyn Binding>> = {
            let mut bindings = self.bindings.borrow_mut();
            let (released, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut *bindings)
                .into_iter()
                .partition(|b| matches(b.as_ref()));
            *bindings = kept;
            released
        };
        let nested: usize = self
            .snapshot()
            .iter()
            .map(|binding| descend(binding.as_ref()))
            .sum();
        let released: usize = released
            .iter()
            .map(|binding| 1 + binding.nested_binding_count())
            .sum();
        released + nested
    }
}

impl fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingScope")
            .field("binding_count", &self.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_core::accessor::Members;
    use bindery_core::widget::{Capabilities, Widget};
    use bindery_core::{
        Aspect, DispatcherChain, ModelObject, PropertyDispatcher, Value, dispatch::BoundProperty,
    };
    use std::cell::Cell;
    use tracing_test::traced_test;

    struct Pmo;

    impl ModelObject for Pmo {
        fn members(&self) -> Members {
            Members::of::<Self>().build()
        }
    }

    struct Dummy(WidgetId);

    impl Widget for Dummy {
        fn widget_id(&self) -> WidgetId {
            self.0
        }

        fn widget_type(&self) -> &'static str {
            "Dummy"
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities::VALUE
        }
    }

    /// Binding whose refresh fails on demand and counts calls.
    struct Stub {
        widget: Rc<dyn Widget>,
        dispatcher: Rc<dyn PropertyDispatcher>,
        fail: bool,
        refreshed: Cell<u32>,
    }

    impl Stub {
        fn new(pmo: &ObjectRef, fail: bool) -> Rc<Self> {
            Rc::new(Self {
                widget: Rc::new(Dummy(WidgetId::next())),
                dispatcher: Rc::new(DispatcherChain::from_stages(
                    BoundProperty::new(pmo.clone(), "foo"),
                    Vec::new(),
                )),
                fail,
                refreshed: Cell::new(0),
            })
        }
    }

    impl Binding for Stub {
        fn widget(&self) -> &Rc<dyn Widget> {
            &self.widget
        }

        fn dispatcher(&self) -> &Rc<dyn PropertyDispatcher> {
            &self.dispatcher
        }

        fn update_from_pmo(&self, _refresher: &Refresher) -> BindingResult<()> {
            self.refreshed.set(self.refreshed.get() + 1);
            if self.fail {
                self.dispatcher.pull(&Aspect::of("value")).map(|_: Value| ())
            } else {
                Ok(())
            }
        }

        fn display_messages(&self, _messages: &MessageList) -> MessageList {
            MessageList::new()
        }
    }

    #[traced_test]
    #[test]
    fn abort_stops_at_first_failure() {
        let pmo = ObjectRef::new(Pmo);
        let scope = BindingScope::new();
        let (a, b, c) = (Stub::new(&pmo, false), Stub::new(&pmo, true), Stub::new(&pmo, false));
        scope.add(a.clone());
        scope.add(b.clone());
        scope.add(c.clone());

        let err = scope
            .update_from_pmo(&Refresher::new(RefreshPolicy::AbortOnFirstError))
            .unwrap_err();
        match &err {
            BindingError::Refresh { widget, property, .. } => {
                assert!(widget.starts_with("Dummy#"));
                assert_eq!(property, "foo");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!((a.refreshed.get(), b.refreshed.get(), c.refreshed.get()), (1, 1, 0));
        assert!(logs_contain("binding refresh failed"));
    }

    #[traced_test]
    #[test]
    fn contain_keeps_going() {
        let pmo = ObjectRef::new(Pmo);
        let scope = BindingScope::new();
        let (a, b, c) = (Stub::new(&pmo, true), Stub::new(&pmo, false), Stub::new(&pmo, true));
        scope.add(a.clone());
        scope.add(b.clone());
        scope.add(c.clone());

        let refresher = Refresher::new(RefreshPolicy::ContainPerBinding);
        scope.update_from_pmo(&refresher).unwrap();
        assert_eq!(c.refreshed.get(), 1);
        assert_eq!(refresher.failure_count(), 2);
        assert_eq!(refresher.take_failures().len(), 2);
        assert_eq!(refresher.failure_count(), 0);
        assert!(logs_contain("continuing"));
    }

    /// Binding owning a nested scope, like a container with a single row.
    struct Holder {
        stub: Rc<Stub>,
        inner: BindingScope,
    }

    impl Holder {
        fn new(pmo: &ObjectRef) -> Rc<Self> {
            Rc::new(Self {
                stub: Stub::new(pmo, false),
                inner: BindingScope::new(),
            })
        }
    }

    impl Binding for Holder {
        fn widget(&self) -> &Rc<dyn Widget> {
            self.stub.widget()
        }

        fn dispatcher(&self) -> &Rc<dyn PropertyDispatcher> {
            self.stub.dispatcher()
        }

        fn update_from_pmo(&self, refresher: &Refresher) -> BindingResult<()> {
            self.inner.update_from_pmo(refresher)
        }

        fn display_messages(&self, _messages: &MessageList) -> MessageList {
            MessageList::new()
        }

        fn nested_binding_count(&self) -> usize {
            self.inner.total_binding_count()
        }

        fn remove_bindings_for_pmo(&self, pmo: &ObjectRef) -> usize {
            self.inner.remove_for_pmo(pmo)
        }

        fn remove_bindings_for_widgets(&self, widgets: &[WidgetId]) -> usize {
            self.inner.remove_for_widgets(widgets)
        }
    }

    /// outer holder (bound to `outer`)
    ///   stub (row)
    ///   inner holder (row)
    ///     stub (row), stub (row)
    fn nested(outer: &ObjectRef, row: &ObjectRef) -> (BindingScope, Rc<Holder>) {
        let inner = Holder::new(row);
        inner.inner.add(Stub::new(row, false));
        inner.inner.add(Stub::new(row, false));
        let holder = Holder::new(outer);
        holder.inner.add(Stub::new(row, false));
        holder.inner.add(inner);
        let scope = BindingScope::new();
        scope.add(holder.clone());
        (scope, holder)
    }

    #[test]
    fn released_binding_counts_everything_nested() {
        let (outer, row) = (ObjectRef::new(Pmo), ObjectRef::new(Pmo));
        let (scope, _holder) = nested(&outer, &row);
        assert_eq!(scope.total_binding_count(), 5);

        assert_eq!(scope.remove_for_pmo(&outer), 5);
        assert!(scope.is_empty());
    }

    #[test]
    fn released_widget_counts_everything_nested() {
        let (outer, row) = (ObjectRef::new(Pmo), ObjectRef::new(Pmo));
        let (scope, holder) = nested(&outer, &row);

        assert_eq!(scope.remove_for_widgets(&[holder.widget_id()]), 5);
        assert!(scope.is_empty());
    }

    #[test]
    fn surviving_binding_is_searched_for_nested_matches() {
        let (outer, row) = (ObjectRef::new(Pmo), ObjectRef::new(Pmo));
        let (scope, holder) = nested(&outer, &row);

        // The first stub and the inner holder with its two stubs.
        assert_eq!(scope.remove_for_pmo(&row), 4);
        assert_eq!(scope.len(), 1);
        assert!(holder.inner.is_empty());
    }

    #[test]
    fn remove_by_pmo_and_widget() {
        let first = ObjectRef::new(Pmo);
        let second = ObjectRef::new(Pmo);
        let scope = BindingScope::new();
        let a = Stub::new(&first, false);
        let b = Stub::new(&second, false);
        let c = Stub::new(&second, false);
        scope.add(a.clone());
        scope.add(b.clone());
        scope.add(c.clone());

        assert_eq!(scope.remove_for_pmo(&second), 2);
        assert_eq!(scope.len(), 1);
        assert_eq!(scope.remove_for_widgets(&[a.widget_id()]), 1);
        assert!(scope.is_empty());
    }
}
