//! Property tests for the spring and the cursor state machine

use proptest::prelude::*;

use prism_folio::cursor::CursorVisualState;
use prism_folio::geometry::{Point, Rect};
use prism_folio::layout::{ElementSpec, LayoutTree};
use prism_folio::pointer::PointerHub;
use prism_folio::scene::{Scene, SceneSettings};
use prism_folio::spring::{self, Spring, SpringConfig, SpringState};
use prism_folio::target::DEFAULT_TARGET_CLASS;

const FRAME: f32 = 1.0 / 60.0;

fn page() -> LayoutTree {
    let mut tree = LayoutTree::new(Rect::new(0.0, 0.0, 1000.0, 1000.0));
    let root = tree.root();
    let card = tree
        .append(
            root,
            ElementSpec::new("card", Rect::new(100.0, 100.0, 400.0, 300.0)).class(DEFAULT_TARGET_CLASS),
        )
        .unwrap();
    tree.append(
        card,
        ElementSpec::new("badge", Rect::new(150.0, 150.0, 80.0, 30.0)).class(DEFAULT_TARGET_CLASS),
    )
    .unwrap();
    tree.append(
        root,
        ElementSpec::new("plain", Rect::new(600.0, 600.0, 200.0, 200.0)),
    )
    .unwrap();
    tree.append(
        root,
        ElementSpec::new("link", Rect::new(650.0, 100.0, 120.0, 24.0)).class(DEFAULT_TARGET_CLASS),
    )
    .unwrap();
    tree
}

proptest! {
    #[test]
    fn prop_cursor_is_in_exactly_one_consistent_state(
        moves in prop::collection::vec((0.0f32..1000.0, 0.0f32..1000.0, 1usize..4), 1..60)
    ) {
        let hub = PointerHub::new();
        let tree = page();
        let mut scene = Scene::new(&hub, SceneSettings::default(), tree.clone()).unwrap();

        for (x, y, frames) in moves {
            hub.publish(Point::new(x, y));
            for _ in 0..frames {
                let frame = scene.advance(FRAME);
                match &frame.cursor.state {
                    CursorVisualState::Idle { position } => {
                        prop_assert!(frame.cursor.corners.is_empty());
                        prop_assert!(!frame.cursor.native_cursor_hidden);
                        prop_assert_eq!(*position, Point::new(x, y));
                    }
                    CursorVisualState::Framing { bounding_box, target } => {
                        prop_assert_eq!(frame.cursor.corners.len(), 4);
                        prop_assert_eq!(frame.cursor.rotation_degrees, 0.0);
                        let source = tree.element_box(target);
                        prop_assert_eq!(source.map(|b| b.inflate(10.0)), Some(*bounding_box));
                        prop_assert!(bounding_box.contains(Point::new(x, y)));
                    }
                }
                prop_assert!(frame.cursor.visible);
            }
        }
    }

    #[test]
    fn prop_spring_converges_to_constant_target(
        start in -2000.0f32..2000.0,
        target in -2000.0f32..2000.0,
        stiffness in 50.0f32..1000.0,
    ) {
        let mut spring = Spring::new(start, SpringConfig::critical(stiffness));
        spring.set_target(target);
        for _ in 0..240 {
            spring.step(FRAME);
        }
        prop_assert!((spring.value() - target).abs() < 0.01);
        prop_assert!(spring.is_at_rest());
    }

    #[test]
    fn prop_critical_spring_from_rest_never_overshoots(
        start in -2000.0f32..2000.0,
        target in -2000.0f32..2000.0,
        dt in 0.001f32..0.1,
    ) {
        let config = SpringConfig::default();
        let (low, high) = (start.min(target), start.max(target));
        let mut state = SpringState::at_rest(start);
        for _ in 0..200 {
            state = spring::step(state, target, dt, &config);
            prop_assert!(state.value >= low - 1e-3 && state.value <= high + 1e-3,
                "value {} escaped [{}, {}]", state.value, low, high);
        }
    }
}
