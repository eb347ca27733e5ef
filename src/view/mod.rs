//! Host rendering surface.
//!
//! Composition output is mounted into a [`Surface`]: a tree of host elements
//! with attributes, classes and text.
//! [`Element`] composables create one host node each and keep it up to date,
//! issuing only the operations that changed since their last compose.
//!
//! [`Dom`] is an in-memory surface that records every operation as an [`Edit`].

use crate::HashMap;
use alloc::{collections::BTreeMap, rc::Rc};
use core::cell::RefCell;

mod dom;
pub use self::dom::{Dom, Edit};

mod element;
pub use self::element::{button, div, element, span, Element};

slotmap::new_key_type! {
    /// Identifier of a host node.
    pub struct NodeId;
}

/// Kind of an [`Event`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The node was clicked.
    Click,
}

/// An activation event targeting a host node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Event {
    /// Kind of this event.
    pub kind: EventKind,

    /// Node this event was dispatched to.
    pub target: NodeId,
}

impl Event {
    /// Create a click event targeting `target`.
    pub fn click(target: NodeId) -> Self {
        Self {
            kind: EventKind::Click,
            target,
        }
    }
}

/// Host rendering surface.
///
/// Every node a surface creates must stay valid until it is [`remove`](Surface::remove)d.
/// Operations on removed or unknown nodes are ignored.
pub trait Surface {
    /// The node content is mounted into.
    fn root(&self) -> NodeId;

    /// Create a detached element with the given tag.
    fn create_element(&mut self, tag: &str) -> NodeId;

    /// Insert `child` into `parent` at `index`, detaching it from any previous parent.
    fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId);

    /// Remove `node` and all of its descendants.
    fn remove(&mut self, node: NodeId);

    /// Set an attribute of `node`.
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    /// Remove an attribute of `node`.
    fn remove_attribute(&mut self, node: NodeId, name: &str);

    /// Add a class to `node`.
    fn add_class(&mut self, node: NodeId, class: &str);

    /// Remove a class from `node`.
    fn remove_class(&mut self, node: NodeId, class: &str);

    /// Set the text content of `node`.
    fn set_text(&mut self, node: NodeId, text: &str);
}

type Listener = Rc<dyn Fn(&Event)>;

/// Surface shared by every element of a [`Root`](crate::Root), with its event listeners.
pub(crate) struct Host {
    pub(crate) surface: Rc<RefCell<dyn Surface>>,
    pub(crate) listeners: RefCell<HashMap<(NodeId, EventKind), Listener>>,
}

impl Host {
    pub(crate) fn new(surface: Rc<RefCell<dyn Surface>>) -> Self {
        Self {
            surface,
            listeners: RefCell::default(),
        }
    }

    pub(crate) fn listener(&self, event: &Event) -> Option<Listener> {
        self.listeners
            .borrow()
            .get(&(event.target, event.kind))
            .cloned()
    }

    pub(crate) fn set_listeners(&self, node: NodeId, listeners: &[(EventKind, Listener)]) {
        let mut map = self.listeners.borrow_mut();
        map.retain(|(target, _), _| *target != node);

        for (kind, f) in listeners {
            map.insert((node, *kind), f.clone());
        }
    }
}

/// Context for elements mounted into a host node.
pub(crate) struct SurfaceContext {
    pub(crate) host: Rc<Host>,

    /// Host node children are inserted into.
    pub(crate) parent: NodeId,

    /// Children of `parent` by composition path, kept in composition order.
    pub(crate) slots: RefCell<BTreeMap<Vec<usize>, NodeId>>,
}

impl SurfaceContext {
    pub(crate) fn new(host: Rc<Host>, parent: NodeId) -> Self {
        Self {
            host,
            parent,
            slots: RefCell::default(),
        }
    }

    /// Insert `node` at `path`, returning its index among the children of `parent`.
    pub(crate) fn insert_slot(&self, path: Vec<usize>, node: NodeId) -> usize {
        let mut slots = self.slots.borrow_mut();
        let index = slots.range(..path.clone()).count();
        slots.insert(path, node);
        index
    }

    pub(crate) fn remove_slot(&self, path: &[usize]) {
        self.slots.borrow_mut().remove(path);
    }
}
