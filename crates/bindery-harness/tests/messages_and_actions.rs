#![forbid(unsafe_code)]

//! Integration tests: validation message distribution and action bindings.

use std::rc::Rc;

use bindery_core::{
    AccessorCache, BehaviorProvider, BindingConfig, DispatcherFactory, FnBehavior, Message,
    MessageList, ObjectRef, PropertyBehavior, PropertyConfig, Value, Widget,
};
use bindery_harness::fixtures::{Address, AddressPmo};
use bindery_harness::{HeadlessWidget, context, object_ref};
use bindery_runtime::BindingContext;
use tracing_test::traced_test;

const FATAL: &str = "FATAL";

fn validation(pmo: &ObjectRef, address: &ObjectRef) -> impl Fn() -> MessageList + 'static {
    let (pmo, address) = (pmo.clone(), address.clone());
    move || {
        MessageList::from_iter([
            Message::error("street is empty").with_invalid(&address, "street"),
            Message::warning("zip looks odd").with_invalid(&address, "zipCode"),
            Message::info("unsaved changes").with_invalid(&pmo, "save"),
            Message::error("backend unreachable").with_code(FATAL),
        ])
    }
}

struct Form {
    street: Rc<HeadlessWidget>,
    zip: Rc<HeadlessWidget>,
    save: Rc<HeadlessWidget>,
}

fn bind_form(ctx: &BindingContext, pmo: &ObjectRef) -> Form {
    let form = Form {
        street: HeadlessWidget::text_field(),
        zip: HeadlessWidget::text_field(),
        save: HeadlessWidget::button(),
    };
    ctx.bind(pmo, "street", form.street.clone()).unwrap();
    ctx.bind_with(
        pmo,
        "zip",
        form.zip.clone(),
        PropertyConfig::new().model_attribute("zipCode"),
    )
    .unwrap();
    ctx.bind_action(pmo, "save", form.save.clone()).unwrap();
    form
}

fn texts(messages: &MessageList) -> Vec<&str> {
    messages.iter().map(Message::text).collect()
}

// ============================================================================
// Messages
// ============================================================================

#[test]
fn messages_follow_model_attribute() {
    let address = Address::new("", "1", "DE");
    let pmo = object_ref(&AddressPmo::new(Rc::clone(&address)));
    let ctx = context()
        .validation(validation(&pmo, &object_ref(&address)))
        .build();
    let form = bind_form(&ctx, &pmo);
    ctx.update_ui().unwrap();

    assert_eq!(texts(&form.street.messages()), vec!["street is empty"]);
    assert_eq!(texts(&form.zip.messages()), vec!["zip looks odd"]);
    // Action bindings report nothing, even for messages on their member.
    assert_eq!(form.save.calls().messages, 0);
    assert_eq!(ctx.messages().len(), 2);
}

#[test]
fn fatal_message_reaches_every_field() {
    let address = Address::new("", "1", "DE");
    let pmo = object_ref(&AddressPmo::new(Rc::clone(&address)));
    let factory =
        DispatcherFactory::new(Rc::new(AccessorCache::new())).with_fatal_code(FATAL);
    let ctx = BindingContext::builder(factory)
        .validation(validation(&pmo, &object_ref(&address)))
        .build();
    let form = bind_form(&ctx, &pmo);
    ctx.update_ui().unwrap();

    assert_eq!(
        texts(&form.street.messages()),
        vec!["street is empty", "backend unreachable"]
    );
    assert_eq!(
        texts(&form.zip.messages()),
        vec!["zip looks odd", "backend unreachable"]
    );
    // Shown once in the merged result.
    assert_eq!(ctx.messages().len(), 3);
}

#[traced_test]
#[test]
fn message_veto_hides_everything() {
    let address = Address::new("", "1", "DE");
    let pmo = object_ref(&AddressPmo::new(Rc::clone(&address)));
    let quiet: Rc<dyn PropertyBehavior> =
        Rc::new(FnBehavior::new().show_messages(|_, property| property != "street"));
    let factory =
        DispatcherFactory::new(Rc::new(AccessorCache::new())).with_fatal_code(FATAL);
    let ctx = BindingContext::builder(factory)
        .behaviors(BehaviorProvider::with([quiet]))
        .validation(validation(&pmo, &object_ref(&address)))
        .build();
    let form = bind_form(&ctx, &pmo);
    ctx.update_ui().unwrap();

    assert!(form.street.messages().is_empty());
    assert_eq!(form.zip.messages().len(), 2);
    assert!(logs_contain("messages vetoed by behavior"));
}

#[test]
fn label_without_message_capability_is_skipped() {
    let address = Address::new("", "1", "DE");
    let pmo = object_ref(&AddressPmo::new(Rc::clone(&address)));
    let ctx = context()
        .validation(validation(&pmo, &object_ref(&address)))
        .build();
    let label = HeadlessWidget::label();
    ctx.bind(&pmo, "street", label.clone()).unwrap();
    ctx.update_ui().unwrap();

    assert_eq!(label.calls().messages, 0);
    // Still reported as relevant to the binding.
    assert_eq!(ctx.messages().len(), 1);
}

// ============================================================================
// Actions
// ============================================================================

#[test]
fn click_invokes_action_and_refreshes() {
    let address = Address::new("Main St 1", "10115", "DE");
    let pmo = AddressPmo::new(Rc::clone(&address));
    let pmo_ref = object_ref(&pmo);
    let ctx = context().build();
    let form = bind_form(&ctx, &pmo_ref);

    *address.street.borrow_mut() = "Side St 2".to_owned();
    form.save.click().unwrap();

    assert_eq!(pmo.saved.get(), 1);
    assert_eq!(form.street.value(), Value::from("Side St 2"));
}

#[test]
fn action_ignores_write_veto() {
    let pmo = AddressPmo::new(Address::new("Main St 1", "10115", "DE"));
    let ctx = context()
        .behaviors(BehaviorProvider::with([
            Rc::new(FnBehavior::read_only()) as Rc<dyn PropertyBehavior>
        ]))
        .build();
    let save = HeadlessWidget::button();
    ctx.bind_action(&object_ref(&pmo), "save", save.clone()).unwrap();

    save.click().unwrap();
    assert_eq!(pmo.saved.get(), 1);
}

#[test]
fn action_caption_is_static() {
    let pmo = AddressPmo::new(Address::new("Main St 1", "10115", "DE"));
    let mut config = BindingConfig::new();
    config.insert("AddressPmo", "save", PropertyConfig::new().with_caption("Save"));
    let ctx = context().config(config).build();
    let save = HeadlessWidget::button();
    ctx.bind_action(&object_ref(&pmo), "save", save.clone()).unwrap();

    assert_eq!(save.state().caption.as_deref(), Some("Save"));
    assert!(save.state().enabled);
}

#[test]
fn removing_widgets_stops_updates() {
    let address = Address::new("Main St 1", "10115", "DE");
    let pmo = object_ref(&AddressPmo::new(Rc::clone(&address)));
    let ctx = context().build();
    let form = bind_form(&ctx, &pmo);
    let layout =
        HeadlessWidget::layout(vec![form.street.clone() as Rc<dyn Widget>, form.zip.clone()]);

    assert_eq!(ctx.remove_bindings_for_widget(layout.as_ref()), 2);
    assert_eq!(ctx.binding_count(), 1);

    *address.street.borrow_mut() = "Elsewhere".to_owned();
    ctx.update_ui().unwrap();
    assert_eq!(form.street.value(), Value::from("Main St 1"));
}
