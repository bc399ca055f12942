//! Props maps and the shapes `build` accepts.

use std::fmt;

use indexmap::IndexMap;

use super::value::Value;
use crate::dom::Dom;
use crate::error::{Error, Result};

/// An ordered map of configuration entries.
///
/// Entries are applied in insertion order, after `html`, `innerHTML` and
/// `children`, which always go first.
pub struct Props<D: Dom> {
    entries: IndexMap<String, Value<D>>,
}

impl<D: Dom> Props<D> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value<D>>) -> Self {
        self.insert(key, value);
        self
    }

    /// Register an event listener under `on{event}`.
    pub fn on(self, event: &str, handler: impl Fn(&D::Event) + 'static) -> Self {
        self.with(format!("on{event}"), Value::handler(handler))
    }

    /// Insert an entry. A replaced entry keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value<D>>) -> Option<Value<D>> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value<D>> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove an entry, keeping the order of the others.
    pub fn remove(&mut self, key: &str) -> Option<Value<D>> {
        self.entries.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Static props from a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        match serde_json::from_str::<serde_json::Value>(json)? {
            serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(Error::InvalidProps(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

impl<D: Dom> Default for Props<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Dom> Clone for Props<D> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<D: Dom> fmt::Debug for Props<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<D: Dom, K: Into<String>, V: Into<Value<D>>> FromIterator<(K, V)> for Props<D> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<D: Dom> IntoIterator for Props<D> {
    type Item = (String, Value<D>);
    type IntoIter = indexmap::map::IntoIter<String, Value<D>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// What to build: a tag name, or an existing node to configure.
pub enum Tag<D: Dom> {
    Name(String),
    Node(D::Node),
}

impl<D: Dom> Tag<D> {
    pub fn node(node: D::Node) -> Self {
        Self::Node(node)
    }
}

impl<D: Dom> From<&str> for Tag<D> {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl<D: Dom> From<String> for Tag<D> {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl<D: Dom> fmt::Debug for Tag<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Node(node) => fmt::Debug::fmt(node, f),
        }
    }
}

/// The second argument of `build`.
///
/// Besides a props map it accepts two shorthands:
/// markup or a child list stands for `{ html: ... }`, and a node
/// stands for the parent.
pub enum Config<D: Dom> {
    Props(Props<D>),
    Content(Value<D>),
    Parent(D::Node),
    Empty,
}

impl<D: Dom> Config<D> {
    pub fn parent(node: D::Node) -> Self {
        Self::Parent(node)
    }

    pub fn content(value: impl Into<Value<D>>) -> Self {
        Self::Content(value.into())
    }

    /// Split into the props to apply and the parent the shorthand named.
    pub(crate) fn into_parts(self) -> (Props<D>, Option<D::Node>) {
        match self {
            Self::Props(props) => (props, None),
            Self::Content(value) => (Props::new().with("html", value), None),
            Self::Parent(node) => (Props::new(), Some(node)),
            Self::Empty => (Props::new(), None),
        }
    }
}

impl<D: Dom> From<Props<D>> for Config<D> {
    fn from(props: Props<D>) -> Self {
        Self::Props(props)
    }
}

impl<D: Dom> From<&str> for Config<D> {
    fn from(html: &str) -> Self {
        Self::Content(html.into())
    }
}

impl<D: Dom> From<String> for Config<D> {
    fn from(html: String) -> Self {
        Self::Content(html.into())
    }
}

impl<D: Dom> From<Vec<Value<D>>> for Config<D> {
    fn from(children: Vec<Value<D>>) -> Self {
        Self::Content(Value::List(children))
    }
}

impl<D: Dom> From<()> for Config<D> {
    fn from(_: ()) -> Self {
        Self::Empty
    }
}

impl<D: Dom> From<Value<D>> for Config<D> {
    fn from(value: Value<D>) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::Node(node) => Self::Parent(node),
            Value::Map(entries) => Self::Props(Props { entries }),
            other => Self::Content(other),
        }
    }
}
