//! Model objects and shared references to them.
//!
//! A model object is anything whose members can be described by name. View
//! models ("PMOs") and the domain objects they wrap both implement
//! [`ModelObject`]; the view model may expose the domain object through
//! [`ModelObject::model_object`] so bindings can fall back to it.
//!
//! Model objects are shared between the application and the bindings, so
//! members write through `&self` and use interior mutability.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::accessor::Members;

/// An object exposing named, readable and writable members.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use bindery_core::model::{ModelObject, ObjectRef};
/// use bindery_core::accessor::Members;
///
/// struct Person {
///     name: RefCell<String>,
/// }
///
/// impl ModelObject for Person {
///     fn members(&self) -> Members {
///         Members::of::<Self>()
///             .property(
///                 "name",
///                 |p: &Person| p.name.borrow().clone(),
///                 |p: &Person, v: String| *p.name.borrow_mut() = v,
///             )
///             .build()
///     }
/// }
///
/// let person = ObjectRef::new(Person { name: RefCell::new("Ada".into()) });
/// assert!(person.downcast_ref::<Person>().is_some());
/// ```
pub trait ModelObject: Any {
    /// Describe the members of this type.
    ///
    /// Called at most once per type and accessor cache; the result must not
    /// depend on instance state.
    fn members(&self) -> Members;

    /// Nested model object consulted before this object.
    fn model_object(&self) -> Option<ObjectRef> {
        None
    }

    /// Fully qualified type name, used in diagnostics and text keys.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Shared, identity-compared handle to a model object.
#[derive(Clone)]
pub struct ObjectRef(Rc<dyn ModelObject>);

impl ObjectRef {
    pub fn new<T: ModelObject>(object: T) -> Self {
        Self(Rc::new(object))
    }

    pub fn from_rc<T: ModelObject>(object: Rc<T>) -> Self {
        Self(object)
    }

    #[must_use]
    pub fn downcast_ref<T: ModelObject>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    #[must_use]
    pub fn as_any(&self) -> &dyn Any {
        let object: &dyn ModelObject = &*self.0;
        object
    }

    /// `TypeId` of the concrete model type.
    #[must_use]
    pub fn concrete_type_id(&self) -> TypeId {
        self.as_any().type_id()
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    /// Type name without module path.
    #[must_use]
    pub fn short_type_name(&self) -> &'static str {
        bindery_i18n::short_type_name(self.0.type_name())
    }

    #[must_use]
    pub fn model_object(&self) -> Option<ObjectRef> {
        self.0.model_object()
    }

    #[must_use]
    pub fn members(&self) -> Members {
        self.0.members()
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.addr(), other.addr())
    }
}

impl Eq for ObjectRef {}

impl Hash for ObjectRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.addr() as usize).hash(state);
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:p}", self.short_type_name(), self.addr())
    }
}
