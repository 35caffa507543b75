//! # Document
//!
//! A small arena DOM: elements with ids, classes, ordered attributes and
//! text, addressed by [`NodeId`]. Enough structure for binders to render
//! into and for callers to assert on, including ancestor-aware visibility.

use crate::runtime::views::{ATTR_HIDDEN, DATA_CMP_VISIBLE};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Document shared between the form view and the binders' observers
pub type SharedDocument = Rc<RefCell<Document>>;

const VOID_ELEMENTS: &[&str] = &["input", "br", "hr", "img", "meta", "link"];

/// Handle to an element of one [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str, parent: Option<NodeId>) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            classes: Vec::new(),
            attributes: Vec::new(),
            text: None,
            parent,
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    ids: HashMap<String, NodeId>,
    body: NodeId,
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Element::new("body", None)],
            ids: HashMap::new(),
            body: NodeId(0),
        }
    }

    pub fn shared() -> SharedDocument {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a new element as the last child of `parent`
    pub fn create_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let node = NodeId(self.nodes.len());
        let parent = self.nodes.get_mut(parent.0).map(|element| {
            element.children.push(node);
            parent
        });
        self.nodes.push(Element::new(tag, parent));
        node
    }

    /// Assign `id` to `node`. Ids are unique; a node that held `id` before
    /// loses it.
    pub fn set_id(&mut self, node: NodeId, id: &str) {
        if let Some(&previous_owner) = self.ids.get(id) {
            if previous_owner != node {
                tracing::warn!("Element id '{}' moved from {:?} to {:?}", id, previous_owner, node);
                if let Some(element) = self.nodes.get_mut(previous_owner.0) {
                    element.id = None;
                }
            }
        }
        if let Some(element) = self.nodes.get_mut(node.0) {
            if let Some(previous) = element.id.replace(id.to_string()) {
                self.ids.remove(&previous);
            }
            self.ids.insert(id.to_string(), node);
        }
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.nodes.get_mut(node.0) {
            if !element.has_class(class) {
                element.classes.push(class.to_string());
            }
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).is_some_and(|element| element.has_class(class))
    }

    pub fn classes(&self, node: NodeId) -> &[String] {
        match self.element(node) {
            Some(element) => &element.classes,
            None => &[],
        }
    }

    /// Set or replace an attribute, keeping first-insertion order
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.nodes.get_mut(node.0) {
            match element.attributes.iter_mut().find(|(key, _)| key == name) {
                Some((_, existing)) => *existing = value.to_string(),
                None => element
                    .attributes
                    .push((name.to_string(), value.to_string())),
            }
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(element) = self.nodes.get_mut(node.0) {
            element.attributes.retain(|(key, _)| key != name);
        }
    }

    /// Add or remove a boolean attribute such as `disabled`
    pub fn toggle_attribute(&mut self, node: NodeId, name: &str, present: bool) {
        if present {
            self.set_attribute(node, name, "");
        } else {
            self.remove_attribute(node, name);
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attribute(name)
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(element) = self.nodes.get_mut(node.0) {
            element.text = if text.is_empty() {
                None
            } else {
                Some(text.to_string())
            };
        }
    }

    /// Own text followed by descendants' text, in document order
    pub fn text_content(&self, node: NodeId) -> String {
        let mut content = String::new();
        self.collect_text(node, &mut content);
        content
    }

    fn collect_text(&self, node: NodeId, content: &mut String) {
        if let Some(element) = self.element(node) {
            if let Some(text) = &element.text {
                content.push_str(text);
            }
            for child in &element.children {
                self.collect_text(*child, content);
            }
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.element(node)?.parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        match self.element(node) {
            Some(element) => &element.children,
            None => &[],
        }
    }

    /// Every node below `node`, pre-order, excluding `node` itself
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            found.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        found
    }

    /// Whether `node` is `ancestor` or lies below it
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            current = self.parent(candidate);
        }
        false
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// `root` and its descendants carrying `class`, in document order
    pub fn find_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        std::iter::once(root)
            .chain(self.descendants(root))
            .filter(|node| self.has_class(*node, class))
            .collect()
    }

    /// A node is visible only if neither it nor any ancestor is suppressed
    pub fn is_visible(&self, node: NodeId) -> bool {
        if self.element(node).is_none() {
            return false;
        }
        let mut current = Some(node);
        while let Some(candidate) = current {
            if self.attribute(candidate, DATA_CMP_VISIBLE) == Some("false")
                || self.has_attribute(candidate, ATTR_HIDDEN)
            {
                return false;
            }
            current = self.parent(candidate);
        }
        true
    }

    /// Serialize `node` and its subtree as HTML
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut html = String::new();
        self.write_html(node, &mut html);
        html
    }

    fn write_html(&self, node: NodeId, html: &mut String) {
        let Some(element) = self.element(node) else {
            return;
        };

        html.push('<');
        html.push_str(&element.tag);
        if let Some(id) = &element.id {
            html.push_str(&format!(" id=\"{}\"", escape(id)));
        }
        if !element.classes.is_empty() {
            html.push_str(&format!(" class=\"{}\"", escape(&element.classes.join(" "))));
        }
        for (name, value) in &element.attributes {
            if value.is_empty() {
                html.push_str(&format!(" {name}"));
            } else {
                html.push_str(&format!(" {}=\"{}\"", name, escape(value)));
            }
        }
        html.push('>');

        if VOID_ELEMENTS.contains(&element.tag.as_str()) {
            return;
        }
        if let Some(text) = &element.text {
            html.push_str(&escape(text));
        }
        for child in &element.children {
            self.write_html(*child, html);
        }
        html.push_str(&format!("</{}>", element.tag));
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
