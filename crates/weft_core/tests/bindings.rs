//! End-to-end binding scenarios through the public API

use std::cell::RefCell;
use std::rc::Rc;

use weft_core::{
    handler, AttrBinder, BindOptions, BindTarget, ObjectKind, Runtime, Value, ValueBinder,
    WeftError, DEFAULT_DEBOUNCE_DELAY,
};
use weft_dom::NodeId;

/// A form-like fixture: a sandbox div holding two inputs
fn form(rt: &mut Runtime) -> (NodeId, NodeId, NodeId) {
    let root = rt.dom.create_element("form");
    let name = rt.dom.create_element("input");
    rt.dom.add_class(name, "name");
    let email = rt.dom.create_element("input");
    rt.dom.add_class(email, "email");
    rt.dom.append_child(root, name);
    rt.dom.append_child(root, email);
    (root, name, email)
}

#[test]
fn test_bind_by_selector_inside_sandbox() {
    let mut rt = Runtime::new();
    let obj = rt.create_object(ObjectKind::Plain);
    let (root, name, email) = form(&mut rt);
    rt.bind_sandbox(obj, root).unwrap();

    rt.bind_node(obj, "name", ".name", Some(Rc::new(ValueBinder)), BindOptions::no_debounce())
        .unwrap();
    rt.bind_node(obj, "email", ".email", Some(Rc::new(ValueBinder)), BindOptions::no_debounce())
        .unwrap();

    rt.set(obj, "name", "ada").unwrap();
    rt.set(obj, "email", "ada@example.com").unwrap();
    assert_eq!(rt.dom.value(name), "ada");
    assert_eq!(rt.dom.value(email), "ada@example.com");
}

#[test]
fn test_selector_does_not_leak_outside_sandbox() {
    let mut rt = Runtime::new();
    let a = rt.create_object(ObjectKind::Plain);
    let b = rt.create_object(ObjectKind::Plain);
    let (root_a, name_a, _) = form(&mut rt);
    let (root_b, name_b, _) = form(&mut rt);
    rt.bind_sandbox(a, root_a).unwrap();
    rt.bind_sandbox(b, root_b).unwrap();

    rt.bind_node(a, "name", ".name", Some(Rc::new(ValueBinder)), BindOptions::no_debounce())
        .unwrap();
    rt.set(a, "name", "only a").unwrap();

    assert_eq!(rt.dom.value(name_a), "only a");
    assert_eq!(rt.dom.value(name_b), "");
}

#[test]
fn test_debounced_push_coalesces_writes() {
    let mut rt = Runtime::new();
    let obj = rt.create_object(ObjectKind::Plain);
    let node = rt.dom.create_element("input");
    rt.bind_node(obj, "q", node, Some(Rc::new(ValueBinder)), BindOptions::default())
        .unwrap();

    rt.set(obj, "q", "a").unwrap();
    rt.set(obj, "q", "ab").unwrap();
    rt.set(obj, "q", "abc").unwrap();
    assert_eq!(rt.dom.value(node), "", "push still pending");

    rt.advance(DEFAULT_DEBOUNCE_DELAY);
    assert_eq!(rt.dom.value(node), "abc", "one write with the final value");
    assert_eq!(rt.pending_timers(), 0);
}

#[test]
fn test_keystroke_burst_coalesces_into_one_change() {
    let mut rt = Runtime::new();
    let obj = rt.create_object(ObjectKind::Plain);
    let node = rt.dom.create_element("input");
    rt.set(obj, "q", "").unwrap();
    rt.bind_node(obj, "q", node, Some(Rc::new(ValueBinder)), BindOptions::default())
        .unwrap();

    let changes = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&changes);
    rt.on(obj, "change:q", handler(move |_, ev| {
        log.borrow_mut().push(ev.args[0].as_text());
    }))
    .unwrap();

    for text in ["w", "we", "wef", "weft"] {
        rt.dom.set_value(node, text);
        rt.fire_node_event(node, "input", vec![]);
    }
    assert!(changes.borrow().is_empty());

    rt.advance(DEFAULT_DEBOUNCE_DELAY);
    assert_eq!(*changes.borrow(), vec!["weft"]);
}

#[test]
fn test_two_nodes_one_property_stay_in_sync() {
    let mut rt = Runtime::new();
    let obj = rt.create_object(ObjectKind::Plain);
    let field = rt.dom.create_element("input");
    let badge = rt.dom.create_element("span");

    rt.bind_node(obj, "title", field, Some(Rc::new(ValueBinder)), BindOptions::no_debounce())
        .unwrap();
    rt.bind_node(
        obj,
        "title",
        badge,
        Some(Rc::new(AttrBinder::new("data-title"))),
        BindOptions::no_debounce(),
    )
    .unwrap();

    rt.dom.set_value(field, "edited");
    rt.fire_node_event(field, "input", vec![]);

    assert_eq!(rt.get(obj, "title"), Some(Value::from("edited")));
    assert_eq!(rt.dom.attr(badge, "data-title"), Some("edited"));
    assert_eq!(rt.dom.value(field), "edited", "no echo into the edited node");
}

#[test]
fn test_delegated_binding_full_cycle() {
    let mut rt = Runtime::new();
    let app = rt.create_object(ObjectKind::Plain);
    let node = rt.dom.create_element("input");

    // Binding a deep path scaffolds the intermediates
    rt.bind_node(app, "session.user.name", node, Some(Rc::new(ValueBinder)), BindOptions::no_debounce())
        .unwrap();
    assert!(rt.get(app, "session").is_some());

    rt.set(app, "session.user.name", "ada").unwrap();
    assert_eq!(rt.dom.value(node), "ada");

    // Swap the middle of the path: the binding re-targets and syncs
    let user = rt.create_object(ObjectKind::Plain);
    rt.set_key(user, "name", "grace").unwrap();
    rt.set(app, "session.user", Value::Object(user)).unwrap();
    assert_eq!(rt.dom.value(node), "grace");

    // Writes through the new path reach the node; the old object is
    // disconnected
    rt.set_key(user, "name", "grace hopper").unwrap();
    assert_eq!(rt.dom.value(node), "grace hopper");

    // DOM edits land on the new target
    rt.dom.set_value(node, "rear admiral");
    rt.fire_node_event(node, "change", vec![]);
    assert_eq!(rt.get_key(user, "name"), Some(Value::from("rear admiral")));
}

#[test]
fn test_unbind_during_pending_debounce_drops_the_write() {
    let mut rt = Runtime::new();
    let obj = rt.create_object(ObjectKind::Plain);
    let node = rt.dom.create_element("input");
    rt.bind_node(obj, "q", node, Some(Rc::new(ValueBinder)), BindOptions::default())
        .unwrap();

    rt.set(obj, "q", "pending").unwrap();
    rt.unbind_key(obj, "q").unwrap();
    rt.advance(DEFAULT_DEBOUNCE_DELAY);

    assert_eq!(rt.dom.value(node), "", "cancelled push never lands");
    assert_eq!(rt.pending_timers(), 0);
}

#[test]
fn test_removed_node_makes_binding_inert() {
    let mut rt = Runtime::new();
    let obj = rt.create_object(ObjectKind::Plain);
    let node = rt.dom.create_element("input");
    rt.bind_node(obj, "q", node, Some(Rc::new(ValueBinder)), BindOptions::no_debounce())
        .unwrap();

    rt.dom.remove_subtree(node);
    // Writes after removal must not panic and must still update state
    rt.set(obj, "q", "late").unwrap();
    assert_eq!(rt.get(obj, "q"), Some(Value::from("late")));
}

#[test]
fn test_bind_many_entries() {
    let mut rt = Runtime::new();
    let obj = rt.create_object(ObjectKind::Plain);
    let (root, name, email) = form(&mut rt);
    rt.bind_sandbox(obj, root).unwrap();

    rt.bind(
        obj,
        &[
            ("name", BindTarget::from(".name")),
            ("email", BindTarget::from(".email")),
        ],
        Some(Rc::new(ValueBinder)),
        BindOptions::no_debounce(),
    )
    .unwrap();

    rt.set(obj, "name", "n").unwrap();
    rt.set(obj, "email", "e").unwrap();
    assert_eq!(rt.dom.value(name), "n");
    assert_eq!(rt.dom.value(email), "e");
}

#[test]
fn test_bind_events_and_silent_option() {
    let mut rt = Runtime::new();
    let obj = rt.create_object(ObjectKind::Plain);
    let node = rt.dom.create_element("input");

    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    rt.on_many(obj, "bind:x bind:y", handler(move |_, ev| {
        log.borrow_mut().push(ev.name.clone());
    }))
    .unwrap();

    rt.bind_node(obj, "x", node, None, BindOptions::default()).unwrap();
    rt.bind_node(obj, "y", node, None, BindOptions { silent: true, ..BindOptions::default() })
        .unwrap();

    assert_eq!(*seen.borrow(), vec!["bind:x"]);
}

#[test]
fn test_stale_object_id_is_rejected() {
    let mut rt = Runtime::new();
    let obj = rt.create_object(ObjectKind::Plain);
    let node = rt.dom.create_element("input");
    rt.remove_object(obj).unwrap();

    assert!(matches!(
        rt.bind_node(obj, "x", node, None, BindOptions::default()),
        Err(WeftError::UnknownObject)
    ));
    assert!(matches!(rt.unbind(obj), Err(WeftError::UnknownObject)));
}
