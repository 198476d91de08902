#![forbid(unsafe_code)]

//! Core types of the Bindery aspect dispatch engine.
//!
//! This crate provides:
//! - [`Value`] and [`BindValue`] for values travelling through the chain
//! - [`ModelObject`], [`ObjectRef`] and the [`AccessorCache`] for member access by name
//! - [`Aspect`] requests and the well-known aspect [`names`]
//! - [`PropertyBehavior`] vetoes combined by a [`BehaviorProvider`]
//! - [`PropertyConfig`] decision tables
//! - the [`dispatch`] chain answering pull and push requests per property
//! - the [`Widget`] seam and validation [`MessageList`]s
//!
//! Bindings, aspect definitions and the update cycle live in
//! `bindery-runtime`.

pub mod accessor;
pub mod aspect;
pub mod behavior;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod message;
pub mod model;
pub mod value;
pub mod widget;

pub use accessor::{Accessor, AccessorCache, Members, MembersBuilder};
pub use aspect::{Aspect, ValuePresence, member_name, names};
pub use behavior::{BehaviorProvider, FnBehavior, PropertyBehavior};
pub use config::{
    AvailableValuesType, BindingConfig, Declared, EnabledType, PropertyConfig, RequiredType,
    TextType, VisibleType, Writability,
};
pub use dispatch::{
    BoundProperty, DispatchStage, DispatcherChain, DispatcherExt, DispatcherFactory,
    PropertyDispatcher, Resolution,
};
pub use error::{BindingError, BindingResult};
pub use message::{Message, MessageList, NoValidation, Severity, ValidationService};
pub use model::{ModelObject, ObjectRef};
pub use value::{BindValue, Value, ValueKind};
pub use widget::{Capabilities, ClickListener, ValueListener, Widget, WidgetId};
