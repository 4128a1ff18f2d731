use egui::pos2;
use pdfsnip::dimensions::RenderedDimensions;
use pdfsnip::interaction::{InteractionController, PointerEvent, SelectionCommand};
use pdfsnip::selection::{DisplayRect, SelectionStore};

const EPSILON: f32 = 1e-6;

fn displayed() -> RenderedDimensions {
    RenderedDimensions::new(800.0, 600.0)
}

/// Feed an event and apply whatever command it produces to the store, the
/// way the app shell does.
fn step(
    controller: &mut InteractionController,
    store: &mut SelectionStore,
    page: u16,
    event: PointerEvent,
) -> Option<SelectionCommand> {
    let command = controller.handle(event, page, displayed(), store);
    match command {
        Some(SelectionCommand::Commit { page, rect, displayed }) => {
            store.create(page, rect, displayed);
        }
        Some(SelectionCommand::Move { page, id, left, top }) => {
            store.move_to(page, id, left, top);
        }
        None => {}
    }
    command
}

#[test]
fn draw_and_commit_a_selection() {
    let mut controller = InteractionController::new();
    let mut store = SelectionStore::new();

    step(&mut controller, &mut store, 1, PointerEvent::Down { pos: pos2(100.0, 100.0) });
    step(&mut controller, &mut store, 1, PointerEvent::Moved { pos: pos2(200.0, 180.0) });
    assert_eq!(controller.live_rect(), Some(DisplayRect::new(100.0, 100.0, 100.0, 80.0)));

    step(&mut controller, &mut store, 1, PointerEvent::Up);
    assert!(controller.is_idle());
    assert_eq!(controller.live_rect(), None);

    let sel = store.list(1)[0];
    assert_eq!((sel.left, sel.top, sel.width, sel.height), (100.0, 100.0, 100.0, 80.0));
    assert_eq!(sel.displayed, displayed());
}

#[test]
fn tiny_drags_are_discarded() {
    let mut controller = InteractionController::new();
    let mut store = SelectionStore::new();

    step(&mut controller, &mut store, 1, PointerEvent::Down { pos: pos2(10.0, 10.0) });
    step(&mut controller, &mut store, 1, PointerEvent::Moved { pos: pos2(14.0, 13.0) });
    step(&mut controller, &mut store, 1, PointerEvent::Up);

    assert!(store.list(1).is_empty());
    assert!(controller.is_idle());
}

#[test]
fn anchor_is_clamped_but_the_moving_corner_is_not() {
    let mut controller = InteractionController::new();
    let mut store = SelectionStore::new();

    // Press outside the page: the anchor clamps to the page edge.
    step(&mut controller, &mut store, 1, PointerEvent::Down { pos: pos2(-50.0, -20.0) });
    step(&mut controller, &mut store, 1, PointerEvent::Moved { pos: pos2(100.0, 50.0) });
    assert_eq!(controller.live_rect(), Some(DisplayRect::new(0.0, 0.0, 100.0, 50.0)));

    // Dragging past the far edge leaves the live rect unclamped; the store
    // clamps at commit time.
    step(&mut controller, &mut store, 1, PointerEvent::Moved { pos: pos2(900.0, 50.0) });
    step(&mut controller, &mut store, 1, PointerEvent::Up);
    let sel = store.list(1)[0];
    assert!(sel.left + sel.width <= 800.0);
}

#[test]
fn live_rect_is_the_bounding_box_in_any_drag_direction() {
    let mut controller = InteractionController::new();
    let mut store = SelectionStore::new();

    step(&mut controller, &mut store, 1, PointerEvent::Down { pos: pos2(200.0, 150.0) });
    step(&mut controller, &mut store, 1, PointerEvent::Moved { pos: pos2(100.0, 100.0) });
    assert_eq!(controller.live_rect(), Some(DisplayRect::new(100.0, 100.0, 100.0, 50.0)));
}

#[test]
fn aspect_lock_constrains_to_sixteen_by_nine() {
    let mut controller = InteractionController::new();
    controller.set_aspect_lock(true);
    let mut store = SelectionStore::new();

    // Wider than 16:9: the width shrinks, top-left and height stay.
    step(&mut controller, &mut store, 1, PointerEvent::Down { pos: pos2(0.0, 0.0) });
    step(&mut controller, &mut store, 1, PointerEvent::Moved { pos: pos2(320.0, 90.0) });
    let live = controller.live_rect().unwrap();
    assert!((live.width - 160.0).abs() < EPSILON);
    assert_eq!(live.height, 90.0);
    assert!((live.width / live.height - 16.0 / 9.0).abs() < EPSILON);

    // Taller than 16:9: the height shrinks instead.
    step(&mut controller, &mut store, 1, PointerEvent::Moved { pos: pos2(160.0, 180.0) });
    let live = controller.live_rect().unwrap();
    assert_eq!(live.width, 160.0);
    assert!((live.height - 90.0).abs() < EPSILON);

    // Degenerate boxes are left alone rather than divided by zero, and the
    // minimum-size gate discards them on release.
    step(&mut controller, &mut store, 1, PointerEvent::Moved { pos: pos2(0.0, 120.0) });
    assert_eq!(controller.live_rect(), Some(DisplayRect::new(0.0, 0.0, 0.0, 120.0)));

    step(&mut controller, &mut store, 1, PointerEvent::Up);
    assert!(store.list(1).is_empty());
}

#[test]
fn committed_selections_honor_the_lock_within_tolerance() {
    let mut controller = InteractionController::new();
    controller.set_aspect_lock(true);
    let mut store = SelectionStore::new();

    step(&mut controller, &mut store, 1, PointerEvent::Down { pos: pos2(50.0, 50.0) });
    step(&mut controller, &mut store, 1, PointerEvent::Moved { pos: pos2(370.0, 250.0) });
    step(&mut controller, &mut store, 1, PointerEvent::Up);

    let sel = store.list(1)[0];
    assert!((sel.width / sel.height - 16.0 / 9.0).abs() < EPSILON);
}

#[test]
fn pressing_an_existing_selection_drags_instead_of_drawing() {
    let mut controller = InteractionController::new();
    let mut store = SelectionStore::new();
    let id = store
        .create(1, DisplayRect::new(50.0, 50.0, 100.0, 100.0), displayed())
        .unwrap();

    // Down inside the selection: no drawing starts.
    step(&mut controller, &mut store, 1, PointerEvent::Down { pos: pos2(80.0, 90.0) });
    assert_eq!(controller.live_rect(), None);
    assert!(!controller.is_idle());

    // The pointer offset from the top-left is preserved while dragging.
    let cmd = step(&mut controller, &mut store, 1, PointerEvent::Moved { pos: pos2(200.0, 200.0) });
    assert_eq!(
        cmd,
        Some(SelectionCommand::Move { page: 1, id, left: 170.0, top: 160.0 })
    );
    let sel = store.list(1)[0];
    assert_eq!((sel.left, sel.top), (170.0, 160.0));

    // Releasing ends the drag without committing anything new.
    step(&mut controller, &mut store, 1, PointerEvent::Up);
    assert!(controller.is_idle());
    assert_eq!(store.list(1).len(), 1);
}

#[test]
fn dragging_clamps_at_the_page_bounds() {
    let mut controller = InteractionController::new();
    let mut store = SelectionStore::new();
    store
        .create(1, DisplayRect::new(50.0, 50.0, 100.0, 100.0), displayed())
        .unwrap();

    step(&mut controller, &mut store, 1, PointerEvent::Down { pos: pos2(60.0, 60.0) });
    step(&mut controller, &mut store, 1, PointerEvent::Moved { pos: pos2(2_000.0, 2_000.0) });

    let sel = store.list(1)[0];
    assert_eq!(sel.left, 800.0 - 100.0);
    assert_eq!(sel.top, 600.0 - 100.0);
}

#[test]
fn the_topmost_overlapping_selection_wins_the_hit_test() {
    let mut controller = InteractionController::new();
    let mut store = SelectionStore::new();
    store
        .create(1, DisplayRect::new(50.0, 50.0, 100.0, 100.0), displayed())
        .unwrap();
    let top_id = store
        .create(1, DisplayRect::new(100.0, 100.0, 100.0, 100.0), displayed())
        .unwrap();

    step(&mut controller, &mut store, 1, PointerEvent::Down { pos: pos2(120.0, 120.0) });
    let cmd = step(&mut controller, &mut store, 1, PointerEvent::Moved { pos: pos2(130.0, 130.0) });
    match cmd {
        Some(SelectionCommand::Move { id, .. }) => assert_eq!(id, top_id),
        other => panic!("expected a move of the topmost selection, got {other:?}"),
    }
}

#[test]
fn pointer_leave_acts_like_a_release() {
    let mut controller = InteractionController::new();
    let mut store = SelectionStore::new();

    step(&mut controller, &mut store, 1, PointerEvent::Down { pos: pos2(100.0, 100.0) });
    step(&mut controller, &mut store, 1, PointerEvent::Moved { pos: pos2(300.0, 300.0) });
    step(&mut controller, &mut store, 1, PointerEvent::Left);

    // Leaving mid-draw commits exactly like a release would.
    assert!(controller.is_idle());
    assert_eq!(store.list(1).len(), 1);

    // And leaving mid-drag just ends the drag.
    step(&mut controller, &mut store, 1, PointerEvent::Down { pos: pos2(150.0, 150.0) });
    step(&mut controller, &mut store, 1, PointerEvent::Left);
    assert!(controller.is_idle());
    assert_eq!(store.list(1).len(), 1);
}

#[test]
fn page_change_discards_the_live_rect_only() {
    let mut controller = InteractionController::new();
    let mut store = SelectionStore::new();
    store
        .create(2, DisplayRect::new(10.0, 10.0, 50.0, 50.0), displayed())
        .unwrap();

    step(&mut controller, &mut store, 1, PointerEvent::Down { pos: pos2(100.0, 100.0) });
    step(&mut controller, &mut store, 1, PointerEvent::Moved { pos: pos2(300.0, 300.0) });
    assert!(controller.live_rect().is_some());

    controller.page_changed();
    assert!(controller.is_idle());
    assert_eq!(controller.live_rect(), None);

    // Selections committed on other pages are unaffected.
    assert_eq!(store.list(2).len(), 1);
    assert!(store.list(1).is_empty());
}
