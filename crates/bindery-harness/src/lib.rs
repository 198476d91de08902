#![forbid(unsafe_code)]

//! Headless widgets and model fixtures for testing Bindery bindings.
//!
//! Nothing here renders. [`HeadlessWidget`] records what the engine sets
//! and replays user edits and clicks; [`fixtures`] holds presentation
//! models used across the integration tests.

pub mod fixtures;
pub mod widgets;

pub use fixtures::object_ref;
pub use widgets::{HeadlessWidget, SetterCalls, WidgetState};

use std::rc::Rc;

use bindery_core::{AccessorCache, DispatcherFactory};
use bindery_i18n::Localizer;
use bindery_runtime::{BindingContext, BindingContextBuilder};

/// Context builder over a fresh accessor cache.
#[must_use]
pub fn context() -> BindingContextBuilder {
    BindingContext::builder(DispatcherFactory::new(Rc::new(AccessorCache::new())))
}

/// Context builder whose static texts go through `localizer`.
#[must_use]
pub fn localized_context(localizer: Localizer) -> BindingContextBuilder {
    BindingContext::builder(
        DispatcherFactory::new(Rc::new(AccessorCache::new())).with_localizer(localizer),
    )
}
