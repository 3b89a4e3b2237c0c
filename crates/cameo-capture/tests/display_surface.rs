//! Preview window lifecycle and input dispatch.

use std::cell::RefCell;
use std::rc::Rc;

use cameo_capture::window::pointer;
use cameo_capture::{DisplaySurface, HeadlessWindow, PointerEvent};
use cameo_core::BgrImage;

fn surface() -> (DisplaySurface, HeadlessWindow) {
    let window = HeadlessWindow::new();
    (DisplaySurface::new("Cameo", Box::new(window.clone())), window)
}

fn click(x: i32, y: i32) -> PointerEvent {
    PointerEvent {
        kind: pointer::LEFT_DOWN,
        x,
        y,
        flags: 1,
    }
}

#[test]
fn test_destroy_never_created_is_a_no_op() {
    let (mut surface, window) = surface();
    surface.destroy_window().expect("destroy");
    assert!(!surface.is_window_created());
    assert_eq!(window.open_window(), None);
}

#[test]
fn test_create_is_idempotent() {
    let (mut surface, window) = surface();
    surface.create_window().expect("create");
    surface.create_window().expect("create again");
    assert!(surface.is_window_created());
    assert_eq!(window.created_count(), 1);
    assert_eq!(window.open_window().as_deref(), Some("Cameo"));
}

#[test]
fn test_window_can_be_recreated() {
    let (mut surface, window) = surface();
    surface.create_window().expect("create");
    surface.destroy_window().expect("destroy");
    surface.destroy_window().expect("destroy twice");
    assert!(!surface.is_window_created());
    surface.create_window().expect("recreate");
    assert_eq!(window.created_count(), 2);
}

#[test]
fn test_show_requires_window() {
    let (mut surface, window) = surface();
    let frame = BgrImage::filled(2, 2, [1, 2, 3]);
    surface.show(&frame).expect("show before create");
    assert_eq!(window.shown_count(), 0);

    surface.create_window().expect("create");
    surface.show(&frame).expect("show");
    assert_eq!(window.shown_count(), 1);
    assert_eq!(window.last_frame(), Some(frame));
}

#[test]
fn test_one_key_per_poll() {
    let (mut surface, window) = surface();
    let keys = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&keys);
    surface.set_key_callback(move |code| sink.borrow_mut().push(code));
    surface.create_window().expect("create");

    window.push_key(32);
    window.push_key(27);
    surface.process_events().expect("poll");
    assert_eq!(*keys.borrow(), vec![32]);
    surface.process_events().expect("poll");
    surface.process_events().expect("poll");
    assert_eq!(*keys.borrow(), vec![32, 27]);
}

#[test]
fn test_key_callback_is_replaced() {
    let (mut surface, window) = surface();
    let first = Rc::new(RefCell::new(0));
    let second = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&first);
    surface.set_key_callback(move |_| *sink.borrow_mut() += 1);
    let sink = Rc::clone(&second);
    surface.set_key_callback(move |_| *sink.borrow_mut() += 1);

    window.push_key(9);
    surface.process_events().expect("poll");
    assert_eq!((*first.borrow(), *second.borrow()), (0, 1));
}

#[test]
fn test_scheduled_key_waits_for_frames() {
    let (mut surface, window) = surface();
    let keys = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&keys);
    surface.set_key_callback(move |code| sink.borrow_mut().push(code));
    surface.create_window().expect("create");
    window.schedule_key(2, 27);

    let frame = BgrImage::filled(1, 1, [0; 3]);
    surface.show(&frame).expect("show");
    surface.process_events().expect("poll");
    assert!(keys.borrow().is_empty());
    surface.show(&frame).expect("show");
    surface.process_events().expect("poll");
    assert_eq!(*keys.borrow(), vec![27]);
}

#[test]
fn test_pointer_callback_bound_at_creation() {
    let (mut surface, window) = surface();
    let clicks = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&clicks);
    surface.set_pointer_callback(move |event| sink.borrow_mut().push(event));
    surface.create_window().expect("create");

    window.push_pointer(click(3, 4));
    surface.process_events().expect("poll");
    assert_eq!(*clicks.borrow(), vec![click(3, 4)]);
}

#[test]
fn test_pointer_callback_set_after_creation_is_not_bound() {
    let (mut surface, window) = surface();
    surface.create_window().expect("create");
    let clicks = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&clicks);
    surface.set_pointer_callback(move |event| sink.borrow_mut().push(event));

    window.push_pointer(click(1, 1));
    surface.process_events().expect("poll");
    assert!(clicks.borrow().is_empty());

    surface.destroy_window().expect("destroy");
    surface.create_window().expect("recreate");
    window.push_pointer(click(2, 2));
    surface.process_events().expect("poll");
    assert_eq!(*clicks.borrow(), vec![click(2, 2)]);
}
