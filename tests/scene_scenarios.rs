//! Scene integration tests
//!
//! Drives the full frame pipeline (pointer hub → resolver → cursor →
//! spotlights) the way a host does.

use prism_folio::content::Portfolio;
use prism_folio::cursor::CursorVisualState;
use prism_folio::geometry::{Point, Rect, Viewport};
use prism_folio::layout::{ElementKey, ElementSpec, LayoutTree};
use prism_folio::page::PageLayout;
use prism_folio::pointer::PointerHub;
use prism_folio::scene::{FrameSnapshot, Scene, SceneSettings};
use prism_folio::spotlight::SPOTLIGHT_CLASS;
use prism_folio::target::{TargetEvent, DEFAULT_TARGET_CLASS};

const FRAME: f32 = 1.0 / 60.0;

fn empty_page() -> LayoutTree {
    LayoutTree::new(Rect::new(0.0, 0.0, 1280.0, 800.0))
}

fn scene_with(tree: LayoutTree) -> (PointerHub, Scene) {
    let hub = PointerHub::new();
    let scene = Scene::new(&hub, SceneSettings::default(), tree).unwrap();
    (hub, scene)
}

fn run(scene: &mut Scene, frames: usize) -> FrameSnapshot {
    let mut last = scene.advance(FRAME);
    for _ in 1..frames {
        last = scene.advance(FRAME);
    }
    last
}

fn assert_rect_near(actual: Rect, expected: Rect) {
    let close = |a: f32, b: f32| (a - b).abs() < 0.05;
    assert!(
        close(actual.left, expected.left)
            && close(actual.top, expected.top)
            && close(actual.width, expected.width)
            && close(actual.height, expected.height),
        "{:?} is not close to {:?}",
        actual,
        expected
    );
}

#[test]
fn test_idle_pointer_sweep_lags_then_settles_monotonically() {
    let (hub, mut scene) = scene_with(empty_page());
    let goal = Point::new(500.0, 500.0);

    let mut previous_x = f32::MIN;
    let mut previous_distance = f32::MAX;
    for i in 0..10 {
        let t = i as f32 / 9.0;
        let pointer = Point::new(500.0 * t, 500.0 * t);
        hub.publish(pointer);
        let frame = scene.advance(FRAME);

        assert!(frame.cursor.state.is_idle());
        let center = frame.cursor.rect.center();
        assert!(center.x >= previous_x - 1e-3, "ring moved backwards");
        assert!(center.x <= pointer.x + 1e-3, "ring ran ahead of the pointer");
        previous_x = center.x;
    }

    let lagging = scene.advance(FRAME).cursor.rect.center();
    assert!(lagging.distance_to(goal) > 1.0, "ring should still be catching up");

    for _ in 0..120 {
        let frame = scene.advance(FRAME);
        assert!(frame.cursor.state.is_idle());
        let distance = frame.cursor.rect.center().distance_to(goal);
        assert!(distance <= previous_distance + 1e-3);
        previous_distance = distance;
    }
    assert!(previous_distance < 0.05);
}

#[test]
fn test_entering_target_frames_inset_box_and_leaving_returns_to_idle() {
    let mut tree = empty_page();
    let root = tree.root();
    tree.append(
        root,
        ElementSpec::new("button", Rect::new(100.0, 100.0, 200.0, 50.0)).class(DEFAULT_TARGET_CLASS),
    )
    .unwrap();
    let (hub, mut scene) = scene_with(tree);

    hub.publish(Point::new(150.0, 125.0));
    let first = scene.advance(FRAME);
    match &first.cursor.state {
        CursorVisualState::Framing { bounding_box, target } => {
            assert_eq!(*bounding_box, Rect::new(90.0, 90.0, 220.0, 70.0));
            assert_eq!(target.as_str(), "button");
        }
        other => panic!("expected framing, got {:?}", other),
    }

    let settled = run(&mut scene, 120);
    assert_rect_near(settled.cursor.rect, Rect::new(90.0, 90.0, 220.0, 70.0));
    assert_eq!(settled.cursor.corners.len(), 4);
    assert!(settled.cursor.native_cursor_hidden);

    hub.publish(Point::new(700.0, 700.0));
    let left = scene.advance(FRAME);
    assert!(matches!(left.event, Some(TargetEvent::Left { .. })));
    assert!(left.cursor.state.is_idle());
    assert!(left.cursor.corners.is_empty());
    assert!(!left.cursor.native_cursor_hidden);
}

#[test]
fn test_removing_framed_element_goes_idle_within_one_frame() {
    let mut tree = empty_page();
    let root = tree.root();
    let button = tree
        .append(
            root,
            ElementSpec::new("button", Rect::new(100.0, 100.0, 200.0, 50.0)).class(DEFAULT_TARGET_CLASS),
        )
        .unwrap();
    let (hub, mut scene) = scene_with(tree.clone());

    hub.publish(Point::new(150.0, 125.0));
    assert!(run(&mut scene, 5).cursor.state.is_framing());

    tree.remove(button);
    scene.set_layout(tree);
    let frame = scene.advance(FRAME);
    assert!(frame.cursor.state.is_idle());
    assert!(matches!(
        frame.event,
        Some(TargetEvent::Left { ref previous }) if previous.as_str() == "button"
    ));
}

#[test]
fn test_collapsed_target_keeps_frame_until_pointer_moves() {
    let mut tree = empty_page();
    let root = tree.root();
    let button = tree
        .append(
            root,
            ElementSpec::new("button", Rect::new(100.0, 100.0, 200.0, 50.0)).class(DEFAULT_TARGET_CLASS),
        )
        .unwrap();
    let (hub, mut scene) = scene_with(tree.clone());

    hub.publish(Point::new(150.0, 125.0));
    assert!(run(&mut scene, 5).cursor.state.is_framing());

    tree.set_bounds(button, Rect::new(100.0, 100.0, 0.0, 0.0));
    scene.set_layout(tree);
    let frame = scene.advance(FRAME);
    assert_eq!(frame.event, None);
    match &frame.cursor.state {
        CursorVisualState::Framing { bounding_box, .. } => {
            assert_eq!(*bounding_box, Rect::new(90.0, 90.0, 220.0, 70.0));
        }
        other => panic!("expected framing, got {:?}", other),
    }

    hub.publish(Point::new(700.0, 700.0));
    assert!(scene.advance(FRAME).cursor.state.is_idle());
}

fn nested_page(outer_is_candidate: bool) -> LayoutTree {
    let mut tree = empty_page();
    let root = tree.root();
    let mut outer = ElementSpec::new("outer", Rect::new(100.0, 100.0, 400.0, 300.0));
    if outer_is_candidate {
        outer = outer.class(DEFAULT_TARGET_CLASS);
    }
    let outer = tree.append(root, outer).unwrap();
    tree.append(
        outer,
        ElementSpec::new("inner", Rect::new(150.0, 150.0, 100.0, 40.0)).class(DEFAULT_TARGET_CLASS),
    )
    .unwrap();
    tree
}

fn framed_target(frame: &FrameSnapshot) -> Option<&str> {
    match &frame.cursor.state {
        CursorVisualState::Framing { target, .. } => Some(target.as_str()),
        CursorVisualState::Idle { .. } => None,
    }
}

#[test]
fn test_nested_leaving_inner_falls_back_to_outer() {
    let (hub, mut scene) = scene_with(nested_page(true));

    hub.publish(Point::new(200.0, 170.0));
    assert_eq!(framed_target(&scene.advance(FRAME)), Some("inner"));

    hub.publish(Point::new(400.0, 300.0));
    let frame = scene.advance(FRAME);
    assert!(matches!(frame.event, Some(TargetEvent::Entered(_))));
    assert_eq!(framed_target(&frame), Some("outer"));
}

#[test]
fn test_nested_leaving_inner_clears_without_outer_candidate() {
    let (hub, mut scene) = scene_with(nested_page(false));

    hub.publish(Point::new(200.0, 170.0));
    assert_eq!(framed_target(&scene.advance(FRAME)), Some("inner"));

    hub.publish(Point::new(400.0, 300.0));
    let frame = scene.advance(FRAME);
    assert!(frame.cursor.state.is_idle());
}

#[test]
fn test_two_spotlights_stay_independent() {
    let mut tree = empty_page();
    let root = tree.root();
    for (key, left) in [("a", 100.0), ("b", 500.0)] {
        tree.append(
            root,
            ElementSpec::new(key, Rect::new(left, 100.0, 300.0, 300.0)).class(SPOTLIGHT_CLASS),
        )
        .unwrap();
    }
    let (hub, mut scene) = scene_with(tree);
    let a = ElementKey::from("a");
    let b = ElementKey::from("b");

    hub.publish(Point::new(200.0, 150.0));
    let frame = run(&mut scene, 20);
    let (sa, sb) = (&frame.spotlights[&a], &frame.spotlights[&b]);
    assert!(sa.state.active);
    assert_eq!((sa.state.offset_x, sa.state.offset_y), (-50.0, -100.0));
    assert!(sa.gradient.is_some());
    assert!(!sb.state.active);
    assert!(sb.gradient.is_none());

    hub.publish(Point::new(700.0, 300.0));
    let frame = scene.advance(FRAME);
    let (sa, sb) = (&frame.spotlights[&a], &frame.spotlights[&b]);
    assert!(!sa.state.active);
    // A fades out in place while B lights up at its own offset
    assert_eq!((sa.state.offset_x, sa.state.offset_y), (-50.0, -100.0));
    assert!(sa.gradient.is_some());
    assert!(sb.state.active);
    assert_eq!((sb.state.offset_x, sb.state.offset_y), (50.0, 50.0));

    let frame = run(&mut scene, 30);
    assert!(frame.spotlights[&a].gradient.is_none());
    assert!(frame.spotlights[&b].gradient.is_some());
}

#[test]
fn test_full_page_hero_button_is_framed() {
    let portfolio = Portfolio::bundled().unwrap();
    let page = PageLayout::build(&portfolio, Viewport::new(1280.0, 800.0), 0.0).unwrap();
    let button = page.tree().element_box(&ElementKey::from("hero/connect")).unwrap();

    let (hub, mut scene) = scene_with(page.into_tree());
    hub.publish(button.center());
    let frame = run(&mut scene, 90);

    assert_eq!(framed_target(&frame), Some("hero/connect"));
    assert_rect_near(frame.cursor.rect, button.inflate(10.0));
}
