#![forbid(unsafe_code)]

//! Container bindings: a widget showing one row per object of a collection.
//!
//! Each row owns a [`BindingScope`] populated by the container's row
//! builder. When the collection is recomputed, the new row list is diffed
//! against the previous one by object identity:
//!
//! - unchanged list: no row is touched, the widget keeps its data source;
//! - changed list: scopes of retained rows are kept as they are, scopes of
//!   removed rows are released, new rows get fresh scopes, and the widget's
//!   data source is reset once.
//!
//! # Invariants
//!
//! 1. Structure is recomputed only in [`Binding::update_structure`], never
//!    while properties are refreshed.
//! 2. The footer aspect, if configured, is resolved on every property
//!    refresh whether or not the rows changed.
//! 3. Rows are identified by [`ObjectRef`] identity, not by value.
//! 4. A row whose bindings were removed while it is still in the list is
//!    rebound on the next structure pass without resetting the widget.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;

use bindery_core::aspect::names;
use bindery_core::widget::describe;
use bindery_core::{
    Aspect, BindingError, BindingResult, Capabilities, MessageList, ObjectRef, PropertyConfig,
    PropertyDispatcher, Value, Widget, WidgetId,
};

use crate::aspects::{AspectDefinition, UiUpdater};
use crate::binder::BinderEnv;
use crate::binding::{ActionBinding, Binding, ElementBinding};
use crate::item_cache::ItemCache;
use crate::scope::{BindingScope, Refresher};

/// Populates the scope of one row.
pub type RowBuilder = Rc<dyn Fn(&RowBinder<'_>) -> BindingResult<()>>;

/// Binds the properties of one row object.
pub struct RowBinder<'a> {
    env: &'a Rc<BinderEnv>,
    row: &'a ObjectRef,
    scope: &'a BindingScope,
}

impl RowBinder<'_> {
    /// The row object every binding of this binder is bound to.
    #[must_use]
    pub fn row(&self) -> &ObjectRef {
        self.row
    }

    /// Bind `property` of the row using its configured decision table.
    pub fn bind(&self, property: &str, widget: Rc<dyn Widget>) -> BindingResult<Rc<ElementBinding>> {
        let config = self.env.config_for(self.row, property);
        self.bind_with(property, widget, config)
    }

    pub fn bind_with(
        &self,
        property: &str,
        widget: Rc<dyn Widget>,
        config: impl Into<Rc<PropertyConfig>>,
    ) -> BindingResult<Rc<ElementBinding>> {
        let binding = self.env.element(self.row, property, widget, config.into())?;
        self.scope.add(binding.clone());
        Ok(binding)
    }

    pub fn bind_action(
        &self,
        property: &str,
        widget: Rc<dyn Widget>,
    ) -> BindingResult<Rc<ActionBinding>> {
        let config = self.env.config_for(self.row, property);
        let binding = self.env.action(self.row, property, widget, config)?;
        self.scope.add(binding.clone());
        Ok(binding)
    }

    /// Bind a nested container. Its rows are built during the same
    /// structure phase.
    pub fn bind_container(
        &self,
        property: &str,
        widget: Rc<dyn Widget>,
        config: impl Into<Rc<PropertyConfig>>,
        row_builder: impl Fn(&RowBinder<'_>) -> BindingResult<()> + 'static,
    ) -> BindingResult<Rc<ContainerBinding>> {
        let binding = self.env.container(
            self.row,
            property,
            widget,
            config.into(),
            Rc::new(row_builder),
        )?;
        self.scope.add(binding.clone());
        Ok(binding)
    }
}

struct RowScope {
    row: ObjectRef,
    scope: Rc<BindingScope>,
}

/// Binding of a container widget to a collection of row objects.
pub struct ContainerBinding {
    widget: Rc<dyn Widget>,
    dispatcher: Rc<dyn PropertyDispatcher>,
    updater: UiUpdater,
    env: Rc<BinderEnv>,
    row_builder: RowBuilder,
    rows: RefCell<ItemCache<ObjectRef>>,
    row_scopes: RefCell<Vec<RowScope>>,
}

impl ContainerBinding {
    /// Fails fast if `widget` cannot show rows.
    pub(crate) fn new(
        widget: Rc<dyn Widget>,
        dispatcher: Rc<dyn PropertyDispatcher>,
        definition: &dyn AspectDefinition,
        env: Rc<BinderEnv>,
        row_builder: RowBuilder,
    ) -> BindingResult<Self> {
        if !widget.capabilities().contains(Capabilities::ITEMS) {
            return Err(BindingError::MissingCapability {
                widget: describe(widget.as_ref()),
                aspect: names::ITEMS.to_owned(),
                capability: format!("{:?}", Capabilities::ITEMS),
            });
        }
        let updater = definition.create_ui_updater(Rc::clone(&dispatcher), Rc::clone(&widget))?;
        definition.init_model_update(
            Rc::clone(&dispatcher),
            Rc::clone(&widget),
            Rc::clone(&env.model_changed),
        )?;
        Ok(Self {
            widget,
            dispatcher,
            updater,
            env,
            row_builder,
            rows: RefCell::new(ItemCache::new()),
            row_scopes: RefCell::new(Vec::new()),
        })
    }

    /// Row objects currently shown, in order.
    #[must_use]
    pub fn rows(&self) -> Vec<ObjectRef> {
        self.rows.borrow().items().to_vec()
    }

    /// The binding scope of `row`, if it is shown.
    #[must_use]
    pub fn row_scope(&self, row: &ObjectRef) -> Option<Rc<BindingScope>> {
        self.row_scopes
            .borrow()
            .iter()
            .find(|r| r.row == *row)
            .map(|r| Rc::clone(&r.scope))
    }

    /// Direct bindings across all rows.
    #[must_use]
    pub fn row_binding_count(&self) -> usize {
        self.row_scopes.borrow().iter().map(|r| r.scope.len()).sum()
    }

    fn scopes(&self) -> Vec<Rc<BindingScope>> {
        self.row_scopes
            .borrow()
            .iter()
            .map(|r| Rc::clone(&r.scope))
            .collect()
    }

    fn pull_rows(&self) -> BindingResult<Vec<ObjectRef>> {
        let mismatch = |found: &Value| BindingError::TypeMismatch {
            property: format!("{}.{}", self.dispatcher.property(), names::ITEMS),
            expected: "list of objects".to_owned(),
            found: found.kind().to_string(),
        };
        match self.dispatcher.pull(&Aspect::of(names::ITEMS))? {
            Value::List(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(row) => Ok(row),
                    other => Err(mismatch(&other)),
                })
                .collect(),
            Value::Null => Ok(Vec::new()),
            other => Err(mismatch(&other)),
        }
    }

    fn build_row(&self, row: &ObjectRef) -> BindingResult<Rc<BindingScope>> {
        let scope = BindingScope::new();
        let binder = RowBinder {
            env: &self.env,
            row,
            scope: &scope,
        };
        (self.row_builder)(&binder)?;
        Ok(Rc::new(scope))
    }

    fn has_unbound_rows(&self) -> bool {
        self.row_scopes.borrow().len() != self.rows.borrow().len()
    }

    /// Align row scopes with the cached row list. `reset_items` hands the
    /// list to the widget afterwards.
    fn rebuild_rows(&self, reset_items: bool) -> BindingResult<()> {
        let rows = self.rows();
        let mut previous: AHashMap<ObjectRef, Rc<BindingScope>> =
            std::mem::take(&mut *self.row_scopes.borrow_mut())
                .into_iter()
                .map(|r| (r.row, r.scope))
                .collect();

        let mut next = Vec::with_capacity(rows.len());
        let mut created = 0usize;
        for row in &rows {
            let scope = match previous.remove(row) {
                Some(scope) => scope,
                None => match self.build_row(row) {
                    Ok(scope) => {
                        created += 1;
                        scope
                    }
                    Err(err) => {
                        // Keep what exists and retry next time.
                        next.extend(previous.into_iter().map(|(row, scope)| RowScope { row, scope }));
                        *self.row_scopes.borrow_mut() = next;
                        if reset_items {
                            self.rows.borrow_mut().clear();
                        }
                        return Err(err);
                    }
                },
            };
            next.push(RowScope {
                row: row.clone(),
                scope,
            });
        }

        let released = previous.len();
        *self.row_scopes.borrow_mut() = next;
        drop(previous);

        tracing::trace!(
            widget = %describe(self.widget.as_ref()),
            rows = rows.len(),
            created,
            released,
            reset_items,
            "container rows rebuilt"
        );
        if reset_items {
            let items: Vec<Value> = rows.into_iter().map(Value::Object).collect();
            self.widget.set_items(&items);
        }
        Ok(())
    }
}

impl Binding for ContainerBinding {
    fn widget(&self) -> &Rc<dyn Widget> {
        &self.widget
    }

    fn dispatcher(&self) -> &Rc<dyn PropertyDispatcher> {
        &self.dispatcher
    }

    fn update_structure(&self, refresher: &Refresher) -> BindingResult<()> {
        let rows = self.pull_rows()?;
        let changed = self.rows.borrow_mut().replace_content(rows);
        if changed || self.has_unbound_rows() {
            self.rebuild_rows(changed)?;
        }
        for scope in self.scopes() {
            scope.update_structure(refresher)?;
        }
        Ok(())
    }

    fn update_from_pmo(&self, refresher: &Refresher) -> BindingResult<()> {
        (self.updater)()?;
        for scope in self.scopes() {
            scope.update_from_pmo(refresher)?;
        }
        Ok(())
    }

    fn display_messages(&self, messages: &MessageList) -> MessageList {
        let mut shown = self.dispatcher.messages(messages);
        if self.widget.capabilities().contains(Capabilities::MESSAGES) {
            self.widget.show_messages(&shown);
        }
        for scope in self.scopes() {
            shown.merge(scope.display_messages(messages));
        }
        shown
    }

    fn nested_binding_count(&self) -> usize {
        self.scopes()
            .iter()
            .map(|scope| scope.total_binding_count())
            .sum()
    }

    fn remove_bindings_for_pmo(&self, pmo: &ObjectRef) -> usize {
        let dropped: Vec<RowScope> = {
            let mut scopes = self.row_scopes.borrow_mut();
            let (dropped, kept): (Vec<RowScope>, Vec<RowScope>) = std::mem::take(&mut *scopes)
                .into_iter()
                .partition(|r| r.row == *pmo);
            *scopes = kept;
            dropped
        };
        let mut removed: usize = dropped.iter().map(|r| r.scope.total_binding_count()).sum();
        for scope in self.scopes() {
            removed += scope.remove_for_pmo(pmo);
        }
        removed
    }

    fn remove_bindings_for_widgets(&self, widgets: &[WidgetId]) -> usize {
        self.scopes()
            .iter()
            .map(|scope| scope.remove_for_widgets(widgets))
            .sum()
    }
}

impl fmt::Debug for ContainerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBinding")
            .field("widget", &self.describe())
            .field("property", &self.property())
            .field("rows", &self.rows.borrow().len())
            .finish()
    }
}
