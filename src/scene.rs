//! Per-frame orchestration
//!
//! A [`Scene`] owns everything the pointer drives: the tracker, the target
//! resolver, the global cursor and one spotlight per card. Each call to
//! [`Scene::advance`] runs a full frame in a fixed order:
//!
//! ```text
//! drain pointer ─> resolve target ─> cursor event ─> cursor pointer
//!               ─> step cursor springs ─> sync + step spotlights
//!               ─> step background ─> snapshot
//! ```
//!
//! The layout is replaced with [`Scene::set_layout`] whenever the host
//! re-lays the page out (resize, scroll, content change); boxes are always
//! read from the tree installed at the time of the frame.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace};

use crate::background::{BackgroundConfig, BackgroundFrame, BackgroundPresenter};
use crate::cursor::{CursorConfig, CursorFrame, CursorPresenter};
use crate::geometry::{Point, Viewport};
use crate::layout::{ElementKey, LayoutTree};
use crate::pointer::{PointerHub, PointerTracker};
use crate::spotlight::{SpotlightConfig, SpotlightFrame, SpotlightPresenter, SPOTLIGHT_CLASS};
use crate::spring::SpringConfig;
use crate::target::{TargetEvent, TargetResolver, TargetSelector};

/// Errors building a scene
#[derive(Debug, Error)]
pub enum SceneError {
    /// The configured target selector cannot be used
    #[error("invalid target selector: {0}")]
    InvalidSelector(String),
}

/// Tunables for the interactive layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneSettings {
    /// Custom cursor
    pub cursor: CursorConfig,
    /// Springs used by the cursor and card tilt
    pub spring: SpringConfig,
    /// Card spotlights
    pub spotlight: SpotlightConfig,
    /// Hero background
    pub background: BackgroundConfig,
}

/// Output of one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    /// Frame counter, starting at 1
    pub frame: u64,
    /// Seconds since the scene was created
    pub elapsed_secs: f64,
    /// Latest raw pointer position
    pub pointer: Option<Point>,
    /// Resolver output this frame, if anything changed
    pub event: Option<TargetEvent>,
    /// Cursor drawing instructions
    pub cursor: CursorFrame,
    /// Spotlight drawing instructions per card, in key order
    pub spotlights: BTreeMap<ElementKey, SpotlightFrame>,
    /// Hero background, `None` when disabled
    pub background: Option<BackgroundFrame>,
}

/// Pointer-driven state for one page
#[derive(Debug)]
pub struct Scene {
    settings: SceneSettings,
    tracker: PointerTracker,
    resolver: TargetResolver,
    cursor: CursorPresenter,
    spotlights: BTreeMap<ElementKey, SpotlightPresenter>,
    background: BackgroundPresenter,
    layout: LayoutTree,
    frame: u64,
    elapsed_secs: f64,
}

impl Scene {
    /// Build a scene listening to `hub`
    pub fn new(hub: &PointerHub, settings: SceneSettings, layout: LayoutTree) -> Result<Self, SceneError> {
        let selector: TargetSelector = settings
            .cursor
            .target_selector
            .parse()
            .map_err(SceneError::InvalidSelector)?;
        Ok(Self::with_selector(hub, settings, selector, layout))
    }

    /// Build a scene with an already parsed selector, ignoring
    /// `settings.cursor.target_selector`
    pub fn with_selector(
        hub: &PointerHub,
        settings: SceneSettings,
        selector: TargetSelector,
        layout: LayoutTree,
    ) -> Self {
        debug!(
            "Scene created: selector {}, {} elements",
            selector,
            layout.len()
        );

        Self {
            tracker: PointerTracker::attach(hub),
            resolver: TargetResolver::new(selector),
            cursor: CursorPresenter::new(settings.cursor.clone(), settings.spring),
            spotlights: BTreeMap::new(),
            background: BackgroundPresenter::new(settings.background.clone()),
            layout,
            frame: 0,
            elapsed_secs: 0.0,
            settings,
        }
    }

    /// Install a fresh layout pass
    pub fn set_layout(&mut self, layout: LayoutTree) {
        trace!("Layout replaced ({} elements)", layout.len());
        self.layout = layout;
    }

    /// Layout the next frame resolves against
    pub fn layout(&self) -> &LayoutTree {
        &self.layout
    }

    /// Settings the scene was built with
    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    /// Current cursor presenter
    pub fn cursor(&self) -> &CursorPresenter {
        &self.cursor
    }

    /// Target resolver
    pub fn resolver(&self) -> &TargetResolver {
        &self.resolver
    }

    /// Frames advanced so far
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Run one frame of `dt` seconds
    pub fn advance(&mut self, dt: f32) -> FrameSnapshot {
        self.frame += 1;
        self.elapsed_secs += f64::from(dt.max(0.0));

        let pointer = self.tracker.poll();

        let event = self.resolver.update(&self.layout, pointer);
        if let Some(event) = &event {
            self.cursor.handle_event(event);
        }
        if let Some(pointer) = pointer {
            self.cursor.set_pointer(pointer);
        }
        let cursor = self.cursor.step(dt);

        let spotlights = self.step_spotlights(pointer, dt);

        let viewport = self
            .layout
            .get(self.layout.root())
            .map(|root| Viewport::new(root.bounds().width, root.bounds().height))
            .unwrap_or_default();
        self.background.pointer_moved(viewport, pointer);
        let background = self.background.step(dt);

        trace!(
            "Frame {}: cursor {} at {:?}",
            self.frame,
            cursor.state.name(),
            cursor.rect
        );

        FrameSnapshot {
            frame: self.frame,
            elapsed_secs: self.elapsed_secs,
            pointer,
            event,
            cursor,
            spotlights,
            background,
        }
    }

    fn step_spotlights(&mut self, pointer: Option<Point>, dt: f32) -> BTreeMap<ElementKey, SpotlightFrame> {
        // Cards that left the layout drop their presenter with them
        let layout = &self.layout;
        self.spotlights.retain(|key, _| {
            let keep = layout.find(key).is_some();
            if !keep {
                trace!("Spotlight card {} removed", key);
            }
            keep
        });

        let mut frames = BTreeMap::new();
        for card in self.layout.elements_with_class(SPOTLIGHT_CLASS) {
            let presenter = self
                .spotlights
                .entry(card.key().clone())
                .or_insert_with(|| {
                    SpotlightPresenter::new(self.settings.spotlight.clone(), self.settings.spring)
                });
            presenter.pointer_moved(card.bounds(), pointer);
            frames.insert(card.key().clone(), presenter.step(dt));
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::layout::ElementSpec;

    const FRAME: f32 = 1.0 / 60.0;

    fn page() -> LayoutTree {
        let mut tree = LayoutTree::new(Rect::new(0.0, 0.0, 1280.0, 800.0));
        let root = tree.root();
        tree.append(
            root,
            ElementSpec::new("button", Rect::new(100.0, 100.0, 200.0, 50.0)).class("cursor-target"),
        )
        .unwrap();
        tree.append(
            root,
            ElementSpec::new("card", Rect::new(600.0, 100.0, 300.0, 300.0)).class(SPOTLIGHT_CLASS),
        )
        .unwrap();
        tree
    }

    #[test]
    fn test_rejects_bad_selector() {
        let hub = PointerHub::new();
        let mut settings = SceneSettings::default();
        settings.cursor.target_selector = "div > a".to_string();
        assert!(matches!(
            Scene::new(&hub, settings, page()),
            Err(SceneError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_frame_order_enters_on_same_frame() {
        let hub = PointerHub::new();
        let mut scene = Scene::new(&hub, SceneSettings::default(), page()).unwrap();

        hub.publish(Point::new(150.0, 120.0));
        let snapshot = scene.advance(FRAME);
        assert!(matches!(snapshot.event, Some(TargetEvent::Entered(_))));
        assert!(snapshot.cursor.state.is_framing());
        assert_eq!(snapshot.frame, 1);
    }

    #[test]
    fn test_spotlights_follow_layout() {
        let hub = PointerHub::new();
        let mut scene = Scene::new(&hub, SceneSettings::default(), page()).unwrap();

        hub.publish(Point::new(700.0, 200.0));
        let snapshot = scene.advance(FRAME);
        let card = &snapshot.spotlights[&ElementKey::from("card")];
        assert!(card.state.active);

        let mut tree = page();
        let id = tree.find(&ElementKey::from("card")).unwrap();
        tree.remove(id);
        scene.set_layout(tree);
        let snapshot = scene.advance(FRAME);
        assert!(snapshot.spotlights.is_empty());
    }

    #[test]
    fn test_background_uses_same_sample_as_cursor() {
        let hub = PointerHub::new();
        let mut scene = Scene::new(&hub, SceneSettings::default(), page()).unwrap();

        hub.publish(Point::new(320.0, 400.0));
        let snapshot = scene.advance(FRAME);
        assert_eq!(snapshot.pointer, Some(Point::new(320.0, 400.0)));
        assert_eq!(snapshot.background.map(|b| b.center), Some(Point::new(0.25, 0.5)));
    }

    #[test]
    fn test_snapshot_serializes() {
        let hub = PointerHub::new();
        let mut scene = Scene::new(&hub, SceneSettings::default(), page()).unwrap();
        hub.publish(Point::new(10.0, 10.0));
        let json = serde_json::to_value(scene.advance(FRAME)).unwrap();
        assert_eq!(json["cursor"]["state"]["state"], "idle");
        assert_eq!(json["frame"], 1);
    }
}
