//! Host Document Seam
//!
//! The binder never talks to a document directly. It goes through the
//! [`Dom`] trait, which covers the handful of operations element
//! construction needs: creating nodes, moving them around, and writing
//! properties, attributes, styles, dataset entries, classes, and listeners.
//!
//! Two implementations ship with the crate:
//!
//! - [`MemoryDom`]: a headless in-memory document. It parses markup with
//!   `scraper`, can dispatch synthetic events, and serializes back to HTML.
//! - `WebDom` (wasm32 only): the browser document through `web-sys`.

mod memory;
#[cfg(target_arch = "wasm32")]
mod web;

use std::fmt;
use std::rc::Rc;

pub use memory::{MemoryDom, MemoryEvent, MemoryNode};
#[cfg(target_arch = "wasm32")]
pub use web::WebDom;

use crate::binder::Value;
use crate::error::Result;

/// Namespace of SVG elements.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Namespace of HTML elements.
pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// An event listener.
pub type Handler<D> = Rc<dyn Fn(&<D as Dom>::Event)>;

/// Operations the binder needs from a host document.
///
/// Node handles are cheap clones that refer to the same underlying node,
/// and compare equal when they do.
pub trait Dom: Clone + 'static {
    type Node: Clone + PartialEq + fmt::Debug + 'static;
    type Event: 'static;

    /// Create an element in the document's default namespace.
    fn create_element(&self, tag: &str) -> Result<Self::Node>;

    /// Create an element in the given namespace.
    fn create_element_ns(&self, namespace: &str, tag: &str) -> Result<Self::Node>;

    fn create_comment(&self, data: &str) -> Self::Node;

    fn create_fragment(&self) -> Self::Node;

    /// Parse an HTML fragment into detached nodes. Parsing is lenient:
    /// malformed markup is repaired, not rejected.
    fn parse_html(&self, html: &str) -> Result<Vec<Self::Node>>;

    /// Append `child` as the last child of `parent`. Appending a fragment
    /// moves its children instead.
    fn append(&self, parent: &Self::Node, child: &Self::Node) -> Result<()>;

    /// Insert `nodes`, in order, right after `anchor`. Does nothing if the
    /// anchor has no parent.
    fn insert_after(&self, anchor: &Self::Node, nodes: &[Self::Node]) -> Result<()>;

    /// Detach a node from its parent, if any.
    fn remove(&self, node: &Self::Node);

    fn namespace_uri(&self, node: &Self::Node) -> Option<String>;

    /// Whether `key` names a property of the node (`key in el`).
    fn has_property(&self, node: &Self::Node, key: &str) -> bool;

    fn set_property(&self, node: &Self::Node, key: &str, value: &Value<Self>) -> Result<()>;

    fn get_property(&self, node: &Self::Node, key: &str) -> Value<Self>;

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str) -> Result<()>;

    fn remove_attribute(&self, node: &Self::Node, name: &str) -> Result<()>;

    /// `style.setProperty(name, value)`, used for custom properties.
    fn set_style_property(&self, node: &Self::Node, name: &str, value: &str) -> Result<()>;

    /// `style[name] = value`, with `name` in camelCase.
    fn set_style_field(&self, node: &Self::Node, name: &str, value: &str) -> Result<()>;

    /// `dataset[name] = value`, with `name` in camelCase.
    fn set_data(&self, node: &Self::Node, name: &str, value: &str) -> Result<()>;

    fn add_classes(&self, node: &Self::Node, classes: &[&str]) -> Result<()>;

    fn remove_classes(&self, node: &Self::Node, classes: &[&str]) -> Result<()>;

    fn add_event_listener(
        &self,
        node: &Self::Node,
        event: &str,
        handler: Handler<Self>,
    ) -> Result<()>;
}

/// `backgroundColor` -> `background-color`.
pub(crate) fn camel_to_kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
