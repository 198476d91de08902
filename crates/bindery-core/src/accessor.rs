//! Named member access without reflection.
//!
//! Every model type describes its members once through a [`MembersBuilder`].
//! The resulting [`Accessor`]s are cached per concrete type in an
//! [`AccessorCache`] that is owned by the application (or session) and
//! injected into the dispatcher factory.
//!
//! # Invariants
//!
//! 1. A type is described at most once per cache.
//! 2. An accessor never holds state of a particular object; it only knows how
//!    to read or write a member of any object of its type.
//! 3. Reading a member without a getter and writing one without a setter are
//!    errors, never silent defaults.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use ahash::AHashMap;

use crate::error::{BindingError, BindingResult};
use crate::model::{ModelObject, ObjectRef};
use crate::value::{BindValue, Value, ValueKind};

type Getter = Rc<dyn Fn(&dyn Any) -> BindingResult<Value>>;
type Setter = Rc<dyn Fn(&dyn Any, Value) -> BindingResult<()>>;

/// Read/write capability for one member of one model type.
pub struct Accessor {
    owner: &'static str,
    property: String,
    value_kind: ValueKind,
    getter: Option<Getter>,
    setter: Option<Setter>,
}

impl Accessor {
    fn new(owner: &'static str, property: &str, value_kind: ValueKind) -> Self {
        Self {
            owner,
            property: property.to_owned(),
            value_kind,
            getter: None,
            setter: None,
        }
    }

    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    #[must_use]
    pub fn can_read(&self) -> bool {
        self.getter.is_some()
    }

    #[must_use]
    pub fn can_write(&self) -> bool {
        self.setter.is_some()
    }

    #[must_use]
    pub fn value_kind(&self) -> ValueKind {
        self.value_kind
    }

    /// Read the member from `object`.
    pub fn get(&self, object: &ObjectRef) -> BindingResult<Value> {
        let getter = self.getter.as_ref().ok_or_else(|| BindingError::NotReadable {
            property: self.property.clone(),
            owner: self.owner.to_owned(),
        })?;
        getter(object.as_any())
    }

    /// Write `value` into the member of `object`.
    pub fn set(&self, object: &ObjectRef, value: Value) -> BindingResult<()> {
        let setter = self.setter.as_ref().ok_or_else(|| BindingError::NotWritable {
            property: self.property.clone(),
            aspect: String::new(),
            candidates: vec![self.owner.to_owned()],
        })?;
        setter(object.as_any(), value)
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("owner", &self.owner)
            .field("property", &self.property)
            .field("value_kind", &self.value_kind)
            .field("can_read", &self.can_read())
            .field("can_write", &self.can_write())
            .finish()
    }
}

/// All members of one model type.
#[derive(Debug)]
pub struct Members {
    owner: &'static str,
    accessors: AHashMap<String, Rc<Accessor>>,
}

impl Members {
    /// Start describing the members of `T`.
    #[must_use]
    pub fn of<T: ModelObject>() -> MembersBuilder<T> {
        MembersBuilder {
            owner: std::any::type_name::<T>(),
            accessors: AHashMap::new(),
            _owner: PhantomData,
        }
    }

    #[must_use]
    pub fn get(&self, property: &str) -> Option<&Rc<Accessor>> {
        self.accessors.get(property)
    }

    #[must_use]
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }
}

/// Fluent builder collecting getters, setters and actions of `T`.
///
/// Declaring a getter and a setter under the same name merges them into one
/// accessor. The value kind of the last declaration wins.
pub struct MembersBuilder<T> {
    owner: &'static str,
    accessors: AHashMap<String, Accessor>,
    _owner: PhantomData<fn(&T)>,
}

impl<T: ModelObject> MembersBuilder<T> {
    fn entry(&mut self, name: &str, kind: ValueKind) -> &mut Accessor {
        let owner = self.owner;
        let accessor = self
            .accessors
            .entry(name.to_owned())
            .or_insert_with(|| Accessor::new(owner, name, kind));
        accessor.value_kind = kind;
        accessor
    }

    /// Declare a readable member.
    #[must_use]
    pub fn read<V, F>(mut self, name: &str, get: F) -> Self
    where
        V: BindValue,
        F: Fn(&T) -> V + 'static,
    {
        let property = name.to_owned();
        let getter: Getter = Rc::new(move |any: &dyn Any| {
            let object = downcast::<T>(any, &property)?;
            Ok(get(object).into_value())
        });
        self.entry(name, V::KIND).getter = Some(getter);
        self
    }

    /// Declare a writable member.
    #[must_use]
    pub fn write<V, F>(mut self, name: &str, set: F) -> Self
    where
        V: BindValue,
        F: Fn(&T, V) + 'static,
    {
        let property = name.to_owned();
        let setter: Setter = Rc::new(move |any: &dyn Any, value: Value| {
            let object = downcast::<T>(any, &property)?;
            let typed = V::from_value(value).map_err(|found| BindingError::TypeMismatch {
                property: property.clone(),
                expected: V::KIND.to_string(),
                found: found.kind().to_string(),
            })?;
            set(object, typed);
            Ok(())
        });
        self.entry(name, V::KIND).setter = Some(setter);
        self
    }

    /// Declare a readable and writable member.
    #[must_use]
    pub fn property<V, G, S>(self, name: &str, get: G, set: S) -> Self
    where
        V: BindValue,
        G: Fn(&T) -> V + 'static,
        S: Fn(&T, V) + 'static,
    {
        self.read(name, get).write(name, set)
    }

    /// Declare an invokable action (e.g. a button handler).
    ///
    /// Actions are write-only members of kind [`ValueKind::Null`].
    #[must_use]
    pub fn action<F>(self, name: &str, invoke: F) -> Self
    where
        F: Fn(&T) + 'static,
    {
        self.write(name, move |object: &T, (): ()| invoke(object))
    }

    #[must_use]
    pub fn build(self) -> Members {
        Members {
            owner: self.owner,
            accessors: self
                .accessors
                .into_iter()
                .map(|(name, accessor)| (name, Rc::new(accessor)))
                .collect(),
        }
    }
}

fn downcast<'a, T: 'static>(any: &'a dyn Any, property: &str) -> BindingResult<&'a T> {
    any.downcast_ref::<T>()
        .ok_or_else(|| BindingError::TypeMismatch {
            property: property.to_owned(),
            expected: std::any::type_name::<T>().to_owned(),
            found: "object of another type".to_owned(),
        })
}

/// Per-type table of described members.
///
/// Owned by the application or session scope and shared with every
/// dispatcher factory of that scope.
#[derive(Default)]
pub struct AccessorCache {
    types: RefCell<AHashMap<TypeId, Rc<Members>>>,
}

impl AccessorCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Members of the concrete type of `object`, describing it on first use.
    pub fn members_of(&self, object: &ObjectRef) -> Rc<Members> {
        let type_id = object.concrete_type_id();
        if let Some(members) = self.types.borrow().get(&type_id) {
            return Rc::clone(members);
        }
        // Describe outside the borrow: `members()` is user code.
        let members = Rc::new(object.members());
        tracing::trace!(
            owner = members.owner(),
            members = members.len(),
            "described model type"
        );
        self.types
            .borrow_mut()
            .entry(type_id)
            .or_insert(members)
            .clone()
    }

    /// Accessor for `property` on the type of `object`, if declared.
    pub fn accessor(&self, object: &ObjectRef, property: &str) -> Option<Rc<Accessor>> {
        self.members_of(object).get(property).cloned()
    }

    /// Number of types described so far.
    #[must_use]
    pub fn described_types(&self) -> usize {
        self.types.borrow().len()
    }
}

impl fmt::Debug for AccessorCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorCache")
            .field("described_types", &self.described_types())
            .finish()
    }
}
