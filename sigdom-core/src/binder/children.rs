//! Child lists.
//!
//! Static children are resolved to nodes and appended once. A reactive
//! child gets a comment marker at its position; each time it changes, the
//! nodes it inserted last time are removed and the new ones go right after
//! the marker. Siblings never move, because every marker only manages the
//! range it inserted itself.

use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;
use tracing::trace;

use super::value::{Source, Value};
use super::Binder;
use crate::dom::Dom;
use crate::error::{Error, Result};

impl<D: Dom> Binder<D> {
    /// `html` / `innerHTML`: markup replaces the subtree, anything else is
    /// a child list.
    pub(super) fn set_inner_html(&self, node: &D::Node, content: Value<D>) -> Result<()> {
        match content {
            Value::Str(html) => self
                .dom
                .set_property(node, "innerHTML", &Value::Str(html)),
            content => self.append_children(node, content),
        }
    }

    pub(super) fn append_children(&self, node: &D::Node, children: Value<D>) -> Result<()> {
        let children = match children {
            Value::List(items) => items,
            child => vec![child],
        };

        for child in children {
            match child {
                Value::Null => {}
                Value::Reactive(source) => self.append_reactive_child(node, source)?,
                child => {
                    for resolved in self.resolve_nodes(child)? {
                        self.dom.append(node, &resolved)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn append_reactive_child(&self, node: &D::Node, source: Rc<dyn Source<D>>) -> Result<()> {
        let marker = self.dom.create_comment(&self.config.marker_label);
        self.dom.append(node, &marker)?;

        let inserted: Rc<RefCell<SmallVec<[D::Node; 4]>>> = Rc::default();
        self.bind(source, move |b, value| {
            for stale in inserted.borrow_mut().drain(..) {
                b.dom.remove(&stale);
            }
            let nodes = b.resolve_nodes(value)?;
            trace!(count = nodes.len(), "replacing reactive children");
            b.dom.insert_after(&marker, &nodes)?;
            *inserted.borrow_mut() = nodes.into_iter().collect();
            Ok(())
        })
    }

    /// Turn a child value into nodes. Scalars are parsed as markup, lists
    /// are flattened, and reactive values are read (and tracked).
    pub(super) fn resolve_nodes(&self, value: Value<D>) -> Result<Vec<D::Node>> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Str(html) => self.dom.parse_html(&html),
            value @ (Value::Bool(_) | Value::Number(_)) => {
                self.dom.parse_html(&value.to_js_string())
            }
            Value::Node(node) => Ok(vec![node]),
            Value::List(items) => {
                let mut nodes = Vec::with_capacity(items.len());
                for item in items {
                    nodes.extend(self.resolve_nodes(item)?);
                }
                Ok(nodes)
            }
            Value::Reactive(source) => self.resolve_nodes(source.read()),
            Value::Map(_) | Value::Handler(_) => Err(Error::unexpected(
                "children",
                "nodes, markup, or lists of them",
            )),
        }
    }
}
