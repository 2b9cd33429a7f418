//! Retained element tree standing in for the host page.
//!
//! Elements live in an arena indexed by [`ElementId`]. Removing a subtree frees
//! its slots and later elements reuse them, so a container that is cleared and
//! rebuilt on every render keeps the arena at a fixed size.

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::farm::Seed;

/// Class that marks an element (and everything under it) as not rendered.
pub const HIDDEN_CLASS: &str = "hidden";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unsupported selector '{0}' (expected tag, #id, or .class forms)")]
    Unsupported(String),
}

#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    id: Option<String>,
    classes: BTreeSet<String>,
    attributes: BTreeMap<String, String>,
    text: String,
    children: Vec<ElementId>,
    parent: Option<ElementId>,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Option<Element>>,
    free: Vec<usize>,
    root: ElementId,
}

/// Parsed compound selector: `tag#id.class.class`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    fn parse(input: &str) -> Result<Self, SelectorError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SelectorError::Empty);
        }
        if input.contains(char::is_whitespace) {
            // Descendant/child combinators are not supported
            return Err(SelectorError::Unsupported(input.to_string()));
        }

        let mut selector = Selector::default();
        let mut rest = input;

        let tag_end = rest.find(['#', '.']).unwrap_or(rest.len());
        if tag_end > 0 {
            selector.tag = Some(rest[..tag_end].to_string());
        }
        rest = &rest[tag_end..];

        while !rest.is_empty() {
            let marker = rest.as_bytes()[0];
            let body = &rest[1..];
            let end = body.find(['#', '.']).unwrap_or(body.len());
            let name = &body[..end];
            if name.is_empty() {
                return Err(SelectorError::Unsupported(input.to_string()));
            }
            match marker {
                b'#' if selector.id.is_none() => selector.id = Some(name.to_string()),
                b'.' => selector.classes.push(name.to_string()),
                _ => return Err(SelectorError::Unsupported(input.to_string())),
            }
            rest = &body[end..];
        }

        Ok(selector)
    }

    fn matches(&self, element: &Element) -> bool {
        self.tag.as_deref().map_or(true, |t| element.tag == t)
            && self.id.as_deref().map_or(true, |id| element.id.as_deref() == Some(id))
            && self.classes.iter().all(|c| element.classes.contains(c))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let body = Element {
            tag: "body".to_string(),
            ..Element::default()
        };
        Self {
            nodes: vec![Some(body)],
            free: Vec::new(),
            root: ElementId(0),
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Number of live elements, root included
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Total arena slots, live or free
    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    /// True if the element is reachable from the root
    pub fn is_attached(&self, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                return true;
            }
            current = self.get(node).and_then(|e| e.parent);
        }
        false
    }

    /// True if `ancestor` is a strict ancestor of `id`
    pub fn is_descendant_of(&self, id: ElementId, ancestor: ElementId) -> bool {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        let element = Element {
            tag: tag.to_string(),
            ..Element::default()
        };
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(element);
                ElementId(slot)
            }
            None => {
                self.nodes.push(Some(element));
                ElementId(self.nodes.len() - 1)
            }
        }
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first. Returns false if either element is gone.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        if !self.contains(parent) || !self.contains(child) {
            return false;
        }
        // Refuse to create a cycle
        let mut ancestor = Some(parent);
        while let Some(node) = ancestor {
            if node == child {
                return false;
            }
            ancestor = self.parent(node);
        }
        if let Some(old_parent) = self.get(child).and_then(|e| e.parent) {
            if let Some(old) = self.get_mut(old_parent) {
                old.children.retain(|c| *c != child);
            }
        }
        if let Some(p) = self.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        }
        true
    }

    /// Detach and free every descendant of `parent`
    pub fn clear_children(&mut self, parent: ElementId) {
        let children = match self.get_mut(parent) {
            Some(p) => std::mem::take(&mut p.children),
            None => return,
        };
        let mut stack = children;
        while let Some(id) = stack.pop() {
            if let Some(element) = self.nodes.get_mut(id.0).and_then(Option::take) {
                stack.extend(element.children);
                self.free.push(id.0);
            }
        }
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.get(id).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).and_then(|e| e.parent)
    }

    pub fn set_id(&mut self, id: ElementId, value: &str) {
        if let Some(e) = self.get_mut(id) {
            e.id = Some(value.to_string());
        }
    }

    pub fn add_class(&mut self, id: ElementId, class: &str) {
        if let Some(e) = self.get_mut(id) {
            e.classes.insert(class.to_string());
        }
    }

    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        if let Some(e) = self.get_mut(id) {
            e.classes.remove(class);
        }
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.get(id).is_some_and(|e| e.classes.contains(class))
    }

    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) {
        if let Some(e) = self.get_mut(id) {
            e.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.get(id)
            .and_then(|e| e.attributes.get(name))
            .map(String::as_str)
    }

    pub fn set_text(&mut self, id: ElementId, text: &str) {
        if let Some(e) = self.get_mut(id) {
            e.text = text.to_string();
        }
    }

    pub fn text(&self, id: ElementId) -> &str {
        self.get(id).map(|e| e.text.as_str()).unwrap_or("")
    }

    /// An element is rendered when neither it nor any ancestor is hidden
    pub fn is_rendered(&self, id: ElementId) -> bool {
        if !self.is_attached(id) {
            return false;
        }
        let mut current = Some(id);
        while let Some(node) = current {
            if self.has_class(node, HIDDEN_CLASS) {
                return false;
            }
            current = self.parent(node);
        }
        true
    }

    /// Attached elements in document (pre-)order, root first
    pub fn descendants(&self) -> Vec<ElementId> {
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementId>, SelectorError> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants()
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(|e| selector.matches(e)))
            .collect())
    }

    #[cfg(test)]
    pub fn query_selector(&self, selector: &str) -> Result<Option<ElementId>, SelectorError> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<ElementId> {
        self.descendants()
            .into_iter()
            .find(|e| self.get(*e).and_then(|el| el.id.as_deref()) == Some(id))
    }

    /// Build the default farm page: header, hearts container and the actions
    /// block with its two menu panels.
    pub fn farm_page(seeds: &[Seed]) -> Self {
        let mut doc = Self::new();
        let root = doc.root();

        let header = doc.create_element("h1");
        doc.set_text(header, "Terminal Farm");
        doc.append_child(root, header);

        let hearts = doc.create_element("div");
        doc.set_id(hearts, "hearts-container");
        doc.append_child(root, hearts);

        let block = doc.create_element("section");
        doc.add_class(block, "actions-block");
        doc.append_child(root, block);

        let title = doc.create_element("h2");
        doc.add_class(title, "actions-title");
        doc.set_text(title, "Actions");
        doc.append_child(block, title);

        let main_menu = doc.create_element("div");
        doc.add_class(main_menu, "main-menu");
        doc.append_child(block, main_menu);

        let plant = doc.create_element("button");
        doc.add_class(plant, "action");
        doc.add_class(plant, "primary");
        doc.set_attribute(plant, "data-action", "plant");
        doc.set_text(plant, "Plant");
        doc.append_child(main_menu, plant);

        let harvest = doc.create_element("button");
        doc.add_class(harvest, "action");
        doc.set_attribute(harvest, "data-action", "harvest");
        doc.set_text(harvest, "Harvest");
        doc.append_child(main_menu, harvest);

        let sleep = doc.create_element("button");
        doc.add_class(sleep, "action");
        doc.set_attribute(sleep, "data-action", "sleep");
        doc.set_text(sleep, "Sleep");
        doc.append_child(main_menu, sleep);

        let plant_menu = doc.create_element("div");
        doc.add_class(plant_menu, "plant-menu");
        doc.add_class(plant_menu, HIDDEN_CLASS);
        doc.append_child(block, plant_menu);

        for seed in seeds {
            let button = doc.create_element("button");
            doc.add_class(button, "seed");
            doc.set_attribute(button, "data-seed", &seed.name);
            doc.set_text(button, &seed.label());
            doc.append_child(plant_menu, button);
        }

        let back = doc.create_element("button");
        doc.add_class(back, "back-button");
        doc.add_class(back, HIDDEN_CLASS);
        doc.set_text(back, "Back");
        doc.append_child(block, back);

        doc
    }
}
