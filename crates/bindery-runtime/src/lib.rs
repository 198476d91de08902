#![forbid(unsafe_code)]

//! Bindings and the update cycle of the Bindery engine.
//!
//! A [`BindingContext`] owns the bindings of one UI region. Each binding
//! pairs a widget with a property dispatcher from `bindery-core` and a set
//! of [`aspects`] that move values between the two:
//!
//! - model to UI: every update cycle pulls each aspect and applies it;
//! - UI to model: widget listeners push edits and clicks, then report the
//!   change so the context refreshes everything.
//!
//! Containers ([`ContainerBinding`]) bind one scope per row and keep row
//! scopes stable across refreshes with an [`ItemCache`].

pub mod aspects;
mod binder;
pub mod binding;
pub mod container;
pub mod context;
pub mod item_cache;
pub mod scope;

pub use aspects::{
    AspectDefinition, CapabilityPolicy, CompositeAspectDefinition, ModelChanged, UiUpdater,
};
pub use binding::{ActionBinding, Binding, ElementBinding};
pub use container::{ContainerBinding, RowBinder, RowBuilder};
pub use context::{BindingContext, BindingContextBuilder, ContextOptions};
pub use item_cache::ItemCache;
pub use scope::{BindingScope, RefreshPolicy, Refresher};
