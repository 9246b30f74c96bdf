//! DOM-like render surface.
//!
//! A [`Node`] is a shared handle to an element in a small tree. Components
//! draw into the node they are given at construction; hosts mount a bridge by
//! attaching its detached container under one of their own nodes.
//!
//! Children hold their parent weakly, so dropping the last handle to a
//! subtree root frees the subtree. `append_child` follows DOM semantics: a
//! node that already has a parent is moved, never duplicated.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

struct NodeInner {
    tag: String,
    text: Option<String>,
    attributes: BTreeMap<String, String>,
    children: Vec<Node>,
    parent: Weak<RefCell<NodeInner>>,
}

/// Shared handle to a surface element. Cloning shares the same element.
#[derive(Clone)]
pub struct Node {
    inner: Rc<RefCell<NodeInner>>,
}

impl Node {
    /// Create a detached element.
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(NodeInner {
                tag: tag.into(),
                text: None,
                attributes: BTreeMap::new(),
                children: Vec::new(),
                parent: Weak::new(),
            })),
        }
    }

    /// Create a detached text node.
    pub fn text(content: impl Into<String>) -> Self {
        let node = Self::element("#text");
        node.inner.borrow_mut().text = Some(content.into());
        node
    }

    pub fn tag(&self) -> String {
        self.inner.borrow().tag.clone()
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn parent(&self) -> Option<Node> {
        self.inner
            .borrow()
            .parent
            .upgrade()
            .map(|inner| Node { inner })
    }

    pub fn is_attached(&self) -> bool {
        self.parent().is_some()
    }

    pub fn children(&self) -> Vec<Node> {
        self.inner.borrow().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.inner.borrow().children.len()
    }

    /// Whether `other` is this node or one of its descendants.
    pub fn contains(&self, other: &Node) -> bool {
        let mut cursor = Some(other.clone());
        while let Some(node) = cursor {
            if node.ptr_eq(self) {
                return true;
            }
            cursor = node.parent();
        }
        false
    }

    /// Attach `child` as the last child of `self`, detaching it from any
    /// previous parent first.
    ///
    /// Returns `false` (and changes nothing) if `child` is `self` or one of
    /// its ancestors.
    pub fn append_child(&self, child: &Node) -> bool {
        if child.contains(self) {
            return false;
        }
        child.remove();
        child.inner.borrow_mut().parent = Rc::downgrade(&self.inner);
        self.inner.borrow_mut().children.push(child.clone());
        true
    }

    /// Attach `child` right before `reference`, detaching it from any
    /// previous parent first.
    ///
    /// Returns `false` (and changes nothing) if `reference` is not a child
    /// of `self`, or if `child` is `self` or one of its ancestors.
    pub fn insert_before(&self, child: &Node, reference: &Node) -> bool {
        if child.contains(self) || !reference.parent().is_some_and(|p| p.ptr_eq(self)) {
            return false;
        }
        if child.ptr_eq(reference) {
            return true;
        }
        child.remove();
        child.inner.borrow_mut().parent = Rc::downgrade(&self.inner);
        let mut inner = self.inner.borrow_mut();
        let index = inner
            .children
            .iter()
            .position(|c| c.ptr_eq(reference))
            .unwrap_or(inner.children.len());
        inner.children.insert(index, child.clone());
        true
    }

    /// Detach this node from its parent. No-op when already detached.
    pub fn remove(&self) {
        let Some(parent) = self.parent() else {
            return;
        };
        parent
            .inner
            .borrow_mut()
            .children
            .retain(|c| !c.ptr_eq(self));
        self.inner.borrow_mut().parent = Weak::new();
    }

    /// Detach all children.
    pub fn clear(&self) {
        let children = std::mem::take(&mut self.inner.borrow_mut().children);
        for child in children {
            child.inner.borrow_mut().parent = Weak::new();
        }
    }

    pub fn set_text(&self, content: impl Into<String>) {
        self.inner.borrow_mut().text = Some(content.into());
    }

    /// Concatenated text of this node and its descendants, in tree order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        let inner = self.inner.borrow();
        if let Some(text) = &inner.text {
            out.push_str(text);
        }
        for child in &inner.children {
            child.collect_text(out);
        }
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.inner
            .borrow_mut()
            .attributes
            .insert(name.into(), value.into());
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.inner.borrow().attributes.get(name).cloned()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Node")
            .field("tag", &inner.tag)
            .field("children", &inner.children.len())
            .field("attached", &(inner.parent.strong_count() > 0))
            .finish()
    }
}
