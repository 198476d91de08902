//! Presentation models and domain objects shared by the integration tests.
//!
//! - [`FooPmo`]: one property with a dynamic enabled state.
//! - [`Address`] wrapped by [`AddressPmo`]: view model over a domain object,
//!   with a renamed member and an option list.
//! - [`OrderPmo`] with [`OrderLinePmo`] rows: a container with a footer.
//! - [`FlakyPmo`]: a property whose enabled state can be made to fail.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bindery_core::{Members, ModelObject, ObjectRef, Value};

/// Handle to a fixture that tests keep inspecting after binding it.
#[must_use]
pub fn object_ref<T: ModelObject>(fixture: &Rc<T>) -> ObjectRef {
    ObjectRef::from_rc(Rc::clone(fixture))
}

// ---------------------------------------------------------------------------
// FooPmo
// ---------------------------------------------------------------------------

/// `foo` with getter, setter and `fooEnabled`.
#[derive(Debug)]
pub struct FooPmo {
    pub foo: RefCell<String>,
    pub foo_enabled: Cell<bool>,
    pub reads: Cell<u32>,
    pub enabled_reads: Cell<u32>,
}

impl FooPmo {
    #[must_use]
    pub fn new(foo: &str) -> Rc<Self> {
        Rc::new(Self {
            foo: RefCell::new(foo.to_owned()),
            foo_enabled: Cell::new(true),
            reads: Cell::new(0),
            enabled_reads: Cell::new(0),
        })
    }

    #[must_use]
    pub fn foo(&self) -> String {
        self.foo.borrow().clone()
    }
}

impl ModelObject for FooPmo {
    fn members(&self) -> Members {
        Members::of::<Self>()
            .property(
                "foo",
                |p: &FooPmo| {
                    p.reads.set(p.reads.get() + 1);
                    p.foo.borrow().clone()
                },
                |p: &FooPmo, v: String| *p.foo.borrow_mut() = v,
            )
            .read("fooEnabled", |p: &FooPmo| {
                p.enabled_reads.set(p.enabled_reads.get() + 1);
                p.foo_enabled.get()
            })
            .build()
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// Domain object.
#[derive(Debug)]
pub struct Address {
    pub street: RefCell<String>,
    pub zip_code: RefCell<String>,
    pub country: RefCell<String>,
}

impl Address {
    #[must_use]
    pub fn new(street: &str, zip_code: &str, country: &str) -> Rc<Self> {
        Rc::new(Self {
            street: RefCell::new(street.to_owned()),
            zip_code: RefCell::new(zip_code.to_owned()),
            country: RefCell::new(country.to_owned()),
        })
    }
}

impl ModelObject for Address {
    fn members(&self) -> Members {
        Members::of::<Self>()
            .property(
                "street",
                |a: &Address| a.street.borrow().clone(),
                |a: &Address, v: String| *a.street.borrow_mut() = v,
            )
            .property(
                "zipCode",
                |a: &Address| a.zip_code.borrow().clone(),
                |a: &Address, v: String| *a.zip_code.borrow_mut() = v,
            )
            .property(
                "country",
                |a: &Address| a.country.borrow().clone(),
                |a: &Address, v: String| *a.country.borrow_mut() = v,
            )
            .build()
    }
}

/// View model over an [`Address`].
///
/// `zip` is stored as `zipCode` on the address; `countryAvailableValues`
/// and `streetRequired` are view model state.
#[derive(Debug)]
pub struct AddressPmo {
    pub address: RefCell<Rc<Address>>,
    pub countries: RefCell<Vec<String>>,
    pub street_required: Cell<bool>,
    pub saved: Cell<u32>,
}

impl AddressPmo {
    #[must_use]
    pub fn new(address: Rc<Address>) -> Rc<Self> {
        Rc::new(Self {
            address: RefCell::new(address),
            countries: RefCell::new(vec!["DE".to_owned(), "FR".to_owned()]),
            street_required: Cell::new(true),
            saved: Cell::new(0),
        })
    }

    /// Swap the wrapped domain object.
    pub fn set_address(&self, address: Rc<Address>) {
        *self.address.borrow_mut() = address;
    }
}

impl ModelObject for AddressPmo {
    fn members(&self) -> Members {
        Members::of::<Self>()
            .read("streetRequired", |p: &AddressPmo| p.street_required.get())
            .read("countryAvailableValues", |p: &AddressPmo| {
                p.countries.borrow().clone()
            })
            .action("save", |p: &AddressPmo| p.saved.set(p.saved.get() + 1))
            .build()
    }

    fn model_object(&self) -> Option<ObjectRef> {
        Some(object_ref(&*self.address.borrow()))
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// One row of an order.
#[derive(Debug)]
pub struct OrderLinePmo {
    pub item: RefCell<String>,
    pub quantity: Cell<i64>,
}

impl OrderLinePmo {
    #[must_use]
    pub fn new(item: &str, quantity: i64) -> Rc<Self> {
        Rc::new(Self {
            item: RefCell::new(item.to_owned()),
            quantity: Cell::new(quantity),
        })
    }
}

impl ModelObject for OrderLinePmo {
    fn members(&self) -> Members {
        Members::of::<Self>()
            .property(
                "item",
                |l: &OrderLinePmo| l.item.borrow().clone(),
                |l: &OrderLinePmo, v: String| *l.item.borrow_mut() = v,
            )
            .property(
                "quantity",
                |l: &OrderLinePmo| l.quantity.get(),
                |l: &OrderLinePmo, v: i64| l.quantity.set(v),
            )
            .build()
    }
}

/// Order with a `lines` collection and a `linesFooter` total.
#[derive(Debug, Default)]
pub struct OrderPmo {
    pub lines: RefCell<Vec<Rc<OrderLinePmo>>>,
    pub footer_reads: Cell<u32>,
}

impl OrderPmo {
    #[must_use]
    pub fn new(lines: Vec<Rc<OrderLinePmo>>) -> Rc<Self> {
        Rc::new(Self {
            lines: RefCell::new(lines),
            footer_reads: Cell::new(0),
        })
    }

    pub fn set_lines(&self, lines: Vec<Rc<OrderLinePmo>>) {
        *self.lines.borrow_mut() = lines;
    }

    #[must_use]
    pub fn total_quantity(&self) -> i64 {
        self.lines.borrow().iter().map(|l| l.quantity.get()).sum()
    }
}

impl ModelObject for OrderPmo {
    fn members(&self) -> Members {
        Members::of::<Self>()
            .read("lines", |o: &OrderPmo| {
                o.lines.borrow().iter().map(object_ref).collect::<Vec<_>>()
            })
            .read("linesFooter", |o: &OrderPmo| {
                o.footer_reads.set(o.footer_reads.get() + 1);
                format!("Total: {}", o.total_quantity())
            })
            .build()
    }
}

// ---------------------------------------------------------------------------
// FlakyPmo
// ---------------------------------------------------------------------------

/// `flag` whose `flagEnabled` answers text instead of a boolean while
/// `broken` is set.
#[derive(Debug, Default)]
pub struct FlakyPmo {
    pub flag: Cell<bool>,
    pub broken: Cell<bool>,
}

impl FlakyPmo {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }
}

impl ModelObject for FlakyPmo {
    fn members(&self) -> Members {
        Members::of::<Self>()
            .property(
                "flag",
                |p: &FlakyPmo| p.flag.get(),
                |p: &FlakyPmo, v: bool| p.flag.set(v),
            )
            .read("flagEnabled", |p: &FlakyPmo| {
                if p.broken.get() {
                    Value::from("sometimes")
                } else {
                    Value::Bool(true)
                }
            })
            .build()
    }
}
