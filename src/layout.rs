//! Layout tree
//!
//! A small retained tree of laid-out elements: the stand-in for the document
//! the page is drawn from. Each layout pass produces a fresh tree; elements
//! keep a stable string [`ElementKey`] across passes while their
//! [`ElementId`] handles are only valid inside one tree.
//!
//! Hit testing follows document semantics: children are tested back to front
//! (later siblings paint on top), and the deepest element containing the
//! point wins. Children may overflow their parent's box.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Point, Rect};

/// Handle to an element inside one [`LayoutTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of an element that survives re-layout
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementKey(String);

impl ElementKey {
    /// Wrap a key string
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ElementKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Errors raised while building a tree
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// Two elements claimed the same key
    #[error("duplicate element key `{0}`")]
    DuplicateKey(ElementKey),

    /// The parent handle does not belong to this tree
    #[error("unknown parent element {0}")]
    UnknownParent(ElementId),
}

/// One laid-out element
#[derive(Debug, Clone)]
pub struct Element {
    id: ElementId,
    key: ElementKey,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    classes: Vec<String>,
    label: Option<String>,
    bounds: Rect,
}

impl Element {
    /// Tree-local handle
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Stable identity
    pub fn key(&self) -> &ElementKey {
        &self.key
    }

    /// Parent element, `None` for the root
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Children in paint order (last is topmost)
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Marker classes
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Whether the element carries `class`
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Text drawn inside the element
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Box from the layout pass that produced this tree
    pub fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// Description of an element to insert
#[derive(Debug, Clone)]
pub struct ElementSpec {
    key: ElementKey,
    bounds: Rect,
    classes: Vec<String>,
    label: Option<String>,
}

impl ElementSpec {
    /// An element with a key and box
    pub fn new(key: impl Into<ElementKey>, bounds: Rect) -> Self {
        Self {
            key: key.into(),
            bounds,
            classes: Vec::new(),
            label: None,
        }
    }

    /// Add a marker class
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set the drawn text
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Retained tree produced by one layout pass
#[derive(Debug, Clone)]
pub struct LayoutTree {
    elements: HashMap<ElementId, Element>,
    by_key: HashMap<ElementKey, ElementId>,
    root: ElementId,
    next_id: u32,
}

/// Key of the element every tree starts with
pub const ROOT_KEY: &str = "document";

impl LayoutTree {
    /// A tree holding only the root element
    pub fn new(root_bounds: Rect) -> Self {
        let root = ElementId(0);
        let key = ElementKey::new(ROOT_KEY);
        let mut elements = HashMap::new();
        elements.insert(
            root,
            Element {
                id: root,
                key: key.clone(),
                parent: None,
                children: Vec::new(),
                classes: Vec::new(),
                label: None,
                bounds: root_bounds,
            },
        );
        let mut by_key = HashMap::new();
        by_key.insert(key, root);

        Self {
            elements,
            by_key,
            root,
            next_id: 1,
        }
    }

    /// The root element
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Append `spec` as the last (topmost) child of `parent`
    pub fn append(&mut self, parent: ElementId, spec: ElementSpec) -> Result<ElementId, LayoutError> {
        if !self.elements.contains_key(&parent) {
            return Err(LayoutError::UnknownParent(parent));
        }
        if self.by_key.contains_key(&spec.key) {
            return Err(LayoutError::DuplicateKey(spec.key));
        }

        let id = ElementId(self.next_id);
        self.next_id += 1;

        self.by_key.insert(spec.key.clone(), id);
        self.elements.insert(
            id,
            Element {
                id,
                key: spec.key,
                parent: Some(parent),
                children: Vec::new(),
                classes: spec.classes,
                label: spec.label,
                bounds: spec.bounds,
            },
        );
        if let Some(parent) = self.elements.get_mut(&parent) {
            parent.children.push(id);
        }

        Ok(id)
    }

    /// Detach an element and its whole subtree. Returns false if absent or root.
    pub fn remove(&mut self, id: ElementId) -> bool {
        if id == self.root {
            return false;
        }
        let Some(element) = self.elements.get(&id) else {
            return false;
        };
        if let Some(parent) = element.parent.and_then(|p| self.elements.get_mut(&p)) {
            parent.children.retain(|child| *child != id);
        }

        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(removed) = self.elements.remove(&next) {
                self.by_key.remove(&removed.key);
                pending.extend(removed.children);
            }
        }
        true
    }

    /// Move or resize an element
    pub fn set_bounds(&mut self, id: ElementId, bounds: Rect) -> bool {
        match self.elements.get_mut(&id) {
            Some(element) => {
                element.bounds = bounds;
                true
            }
            None => false,
        }
    }

    /// Look up an element by handle
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Look up an element by stable key
    pub fn find(&self, key: &ElementKey) -> Option<ElementId> {
        self.by_key.get(key).copied()
    }

    /// Current box of the element with `key`, if it is still in the tree
    pub fn element_box(&self, key: &ElementKey) -> Option<Rect> {
        self.find(key)
            .and_then(|id| self.get(id))
            .map(Element::bounds)
    }

    /// Number of elements including the root
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// A tree always holds its root
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Walk from `id` up to the root, starting with `id` itself
    pub fn ancestors(&self, id: ElementId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.elements.contains_key(&id).then_some(id),
        }
    }

    /// Whether `id` is `ancestor` or lies beneath it
    pub fn is_descendant_of(&self, id: ElementId, ancestor: ElementId) -> bool {
        self.ancestors(id).any(|element| element.id == ancestor)
    }

    /// Deepest, topmost element containing `point`
    pub fn hit_test(&self, point: Point) -> Option<ElementId> {
        self.hit_test_from(self.root, point)
    }

    fn hit_test_from(&self, id: ElementId, point: Point) -> Option<ElementId> {
        let element = self.elements.get(&id)?;
        for child in element.children.iter().rev() {
            if let Some(hit) = self.hit_test_from(*child, point) {
                return Some(hit);
            }
        }
        element.bounds.contains(point).then_some(id)
    }

    /// Every element carrying `class`, in document order
    pub fn elements_with_class<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.document_order()
            .into_iter()
            .filter_map(move |id| self.elements.get(&id))
            .filter(move |element| element.has_class(class))
    }

    /// Element handles in depth-first paint order
    pub fn document_order(&self) -> Vec<ElementId> {
        let mut order = Vec::with_capacity(self.elements.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(element) = self.elements.get(&id) {
                stack.extend(element.children.iter().rev());
            }
        }
        order
    }
}

/// Iterator returned by [`LayoutTree::ancestors`]
#[derive(Debug)]
pub struct Ancestors<'a> {
    tree: &'a LayoutTree,
    next: Option<ElementId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.tree.elements.get(&self.next?)?;
        self.next = element.parent;
        Some(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_tree() -> (LayoutTree, ElementId, ElementId) {
        let mut tree = LayoutTree::new(Rect::new(0.0, 0.0, 800.0, 600.0));
        let outer = tree
            .append(tree.root(), ElementSpec::new("outer", Rect::new(100.0, 100.0, 300.0, 200.0)))
            .unwrap();
        let inner = tree
            .append(outer, ElementSpec::new("inner", Rect::new(150.0, 150.0, 50.0, 50.0)))
            .unwrap();
        (tree, outer, inner)
    }

    #[test]
    fn test_hit_test_picks_deepest() {
        let (tree, outer, inner) = nested_tree();
        assert_eq!(tree.hit_test(Point::new(160.0, 160.0)), Some(inner));
        assert_eq!(tree.hit_test(Point::new(110.0, 110.0)), Some(outer));
        assert_eq!(tree.hit_test(Point::new(10.0, 10.0)), Some(tree.root()));
        assert_eq!(tree.hit_test(Point::new(-10.0, 10.0)), None);
    }

    #[test]
    fn test_later_sibling_is_on_top() {
        let mut tree = LayoutTree::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let root = tree.root();
        tree.append(root, ElementSpec::new("below", Rect::new(0.0, 0.0, 50.0, 50.0)))
            .unwrap();
        let above = tree
            .append(root, ElementSpec::new("above", Rect::new(25.0, 25.0, 50.0, 50.0)))
            .unwrap();
        assert_eq!(tree.hit_test(Point::new(30.0, 30.0)), Some(above));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let (mut tree, outer, _) = nested_tree();
        let err = tree
            .append(outer, ElementSpec::new("inner", Rect::new(0.0, 0.0, 1.0, 1.0)))
            .unwrap_err();
        assert_eq!(err, LayoutError::DuplicateKey(ElementKey::new("inner")));
    }

    #[test]
    fn test_remove_detaches_subtree() {
        let (mut tree, outer, inner) = nested_tree();
        assert!(tree.remove(outer));
        assert!(tree.get(inner).is_none());
        assert!(tree.element_box(&ElementKey::new("inner")).is_none());
        assert_eq!(tree.len(), 1);
        assert!(!tree.remove(tree.root()));
    }

    #[test]
    fn test_ancestors_start_with_self() {
        let (tree, outer, inner) = nested_tree();
        let chain: Vec<ElementId> = tree.ancestors(inner).map(Element::id).collect();
        assert_eq!(chain, vec![inner, outer, tree.root()]);
        assert!(tree.is_descendant_of(inner, outer));
        assert!(!tree.is_descendant_of(outer, inner));
    }

    #[test]
    fn test_elements_with_class_in_document_order() {
        let mut tree = LayoutTree::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let root = tree.root();
        let a = tree
            .append(root, ElementSpec::new("a", Rect::new(0.0, 0.0, 10.0, 10.0)).class("card"))
            .unwrap();
        tree.append(a, ElementSpec::new("a.1", Rect::new(0.0, 0.0, 5.0, 5.0)).class("card"))
            .unwrap();
        tree.append(root, ElementSpec::new("b", Rect::new(20.0, 0.0, 10.0, 10.0)).class("card"))
            .unwrap();
        let keys: Vec<&str> = tree
            .elements_with_class("card")
            .map(|e| e.key().as_str())
            .collect();
        assert_eq!(keys, vec!["a", "a.1", "b"]);
    }
}
