//! Target Resolver
//!
//! Decides which targetable element, if any, the cursor should frame.
//!
//! # Resolution rule
//!
//! Only direct hover containment counts; there is no nearest-target search.
//! The layout tree is hit tested for the deepest element under the pointer,
//! then its ancestors are walked (starting with the element itself) up to the
//! bounding container. The first element carrying the marker class wins, so
//! with nested candidates the innermost one is selected.
//!
//! Boxes are never cached: every frame the active element's box is read from
//! the current tree, and an element that disappeared from the tree clears the
//! resolution. An element whose box collapses to zero size keeps its
//! resolution (and the cursor keeps its last good box) for as long as the
//! pointer rests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::geometry::{Point, Rect};
use crate::layout::{Element, ElementKey, LayoutTree};

/// Marker class carried by target candidates unless configured otherwise
pub const DEFAULT_TARGET_CLASS: &str = "cursor-target";

/// Class selector identifying target candidates (`.cursor-target`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSelector {
    class: String,
}

impl TargetSelector {
    /// Selector matching `class`
    pub fn class(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
        }
    }

    /// Class name without the leading dot
    pub fn class_name(&self) -> &str {
        &self.class
    }

    /// Whether `element` is a candidate
    pub fn matches(&self, element: &Element) -> bool {
        element.has_class(&self.class)
    }
}

impl Default for TargetSelector {
    fn default() -> Self {
        Self::class(DEFAULT_TARGET_CLASS)
    }
}

impl fmt::Display for TargetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}", self.class)
    }
}

impl FromStr for TargetSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let class = s.trim().strip_prefix('.').unwrap_or(s.trim());
        let valid = !class.is_empty()
            && class
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self::class(class))
        } else {
            Err(format!("Unsupported target selector: {:?} (expected .class-name)", s))
        }
    }
}

/// A resolved target: the element and its box from the latest layout pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRegion {
    /// Element box at resolution time
    pub bounding_box: Rect,
    /// Element the box was read from
    pub source_element: ElementKey,
}

/// Change in resolution reported to presenters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetEvent {
    /// The pointer entered a candidate (or moved to a different one)
    Entered(TargetRegion),
    /// The active candidate's box changed (scroll, resize, re-layout)
    Moved(TargetRegion),
    /// No candidate is under the pointer any more
    Left {
        /// Element that was active
        previous: ElementKey,
    },
}

/// Why a resolution attempt produced no usable region
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResolveError {
    /// No candidate encloses the pointer
    #[error("no target candidate under the pointer")]
    NotFound,

    /// The element is no longer part of the document
    #[error("element `{0}` is no longer in the document")]
    Detached(ElementKey),

    /// The element has a zero-size or non-finite box
    #[error("element `{key}` has a degenerate box {bounds:?}")]
    DegenerateBox {
        /// Offending element
        key: ElementKey,
        /// Box as laid out
        bounds: Rect,
    },
}

/// Tracks the active target across frames
#[derive(Debug, Clone, Default)]
pub struct TargetResolver {
    selector: TargetSelector,
    container: Option<ElementKey>,
    active: Option<TargetRegion>,
    last_pointer: Option<Point>,
}

impl TargetResolver {
    /// Resolver for the whole document
    pub fn new(selector: TargetSelector) -> Self {
        Self {
            selector,
            container: None,
            active: None,
            last_pointer: None,
        }
    }

    /// Restrict candidates to the subtree under `container`
    pub fn with_container(mut self, container: impl Into<ElementKey>) -> Self {
        self.container = Some(container.into());
        self
    }

    /// Selector in use
    pub fn selector(&self) -> &TargetSelector {
        &self.selector
    }

    /// Currently active region
    pub fn active(&self) -> Option<&TargetRegion> {
        self.active.as_ref()
    }

    /// Resolve the innermost candidate under `pointer` with a fresh box.
    ///
    /// Pure: does not change the active target.
    pub fn resolve(&self, tree: &LayoutTree, pointer: Point) -> Result<TargetRegion, ResolveError> {
        let container = match &self.container {
            Some(key) => tree
                .find(key)
                .ok_or_else(|| ResolveError::Detached(key.clone()))?,
            None => tree.root(),
        };

        let hit = tree.hit_test(pointer).ok_or(ResolveError::NotFound)?;
        if !tree.is_descendant_of(hit, container) {
            return Err(ResolveError::NotFound);
        }

        let mut candidate = None;
        for element in tree.ancestors(hit) {
            if self.selector.matches(element) {
                candidate = Some(element);
                break;
            }
            if element.id() == container {
                break;
            }
        }
        let element = candidate.ok_or(ResolveError::NotFound)?;

        let bounds = element.bounds();
        if bounds.is_degenerate() {
            return Err(ResolveError::DegenerateBox {
                key: element.key().clone(),
                bounds,
            });
        }

        Ok(TargetRegion {
            bounding_box: bounds,
            source_element: element.key().clone(),
        })
    }

    /// Re-resolve against the current layout and report what changed.
    ///
    /// At most one event is produced per call; callers invoke this once per
    /// frame.
    pub fn update(&mut self, tree: &LayoutTree, pointer: Option<Point>) -> Option<TargetEvent> {
        if let Some(active) = &self.active {
            if tree.find(&active.source_element).is_none() {
                debug!("Target {} detached while active", active.source_element);
                return self.clear();
            }
        }

        let Some(pointer) = pointer else {
            self.last_pointer = None;
            return self.clear();
        };
        let pointer_still = self.last_pointer.replace(pointer) == Some(pointer);

        if let Some(active) = &self.active {
            let collapsed = tree
                .element_box(&active.source_element)
                .is_some_and(|bounds| bounds.is_degenerate());
            if collapsed && pointer_still {
                // Keep chasing the last good box until the element lays out again
                trace!("Skipping frame: {} has a degenerate box", active.source_element);
                return None;
            }
        }

        match self.resolve(tree, pointer) {
            Ok(region) => self.activate(region),
            Err(ResolveError::DegenerateBox { key, bounds }) => {
                // Keep whatever the cursor is chasing until a usable box shows up
                trace!("Skipping frame: {} has degenerate box {:?}", key, bounds);
                None
            }
            Err(ResolveError::NotFound) | Err(ResolveError::Detached(_)) => self.clear(),
        }
    }

    /// Drop the active target, if any
    pub fn clear(&mut self) -> Option<TargetEvent> {
        let previous = self.active.take()?;
        debug!("Target cleared: {}", previous.source_element);
        Some(TargetEvent::Left {
            previous: previous.source_element,
        })
    }

    fn activate(&mut self, region: TargetRegion) -> Option<TargetEvent> {
        match &self.active {
            Some(active) if active.source_element == region.source_element => {
                if active.bounding_box == region.bounding_box {
                    return None;
                }
                trace!(
                    "Target {} moved to {:?}",
                    region.source_element,
                    region.bounding_box
                );
                self.active = Some(region.clone());
                Some(TargetEvent::Moved(region))
            }
            _ => {
                debug!(
                    "Target resolved: {} at {:?}",
                    region.source_element, region.bounding_box
                );
                self.active = Some(region.clone());
                Some(TargetEvent::Entered(region))
            }
        }
    }
}
