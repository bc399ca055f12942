//! In-Memory Document
//!
//! A small headless document tree that behaves like the browser for the
//! operations the binder uses. Nodes are reference-counted and shared, so a
//! `MemoryNode` handle stays valid after the node moves around the tree.
//!
//! Markup is parsed with `scraper` (html5ever), so fragment parsing is as
//! lenient as a real browser's.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::{IndexMap, IndexSet};
use scraper::{ElementRef, Html};

use super::{camel_to_kebab, Dom, Handler, HTML_NAMESPACE, SVG_NAMESPACE};
use crate::binder::Value;
use crate::error::{Error, Result};

/// Properties every HTML element has.
const GLOBAL_PROPERTIES: &[&str] = &[
    "id",
    "title",
    "lang",
    "dir",
    "hidden",
    "tabIndex",
    "className",
    "textContent",
    "innerHTML",
];

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

fn tag_properties(tag: &str) -> &'static [&'static str] {
    match tag {
        "input" => &[
            "value",
            "checked",
            "type",
            "name",
            "placeholder",
            "disabled",
            "required",
            "readOnly",
            "min",
            "max",
            "step",
            "multiple",
            "autofocus",
        ],
        "textarea" => &[
            "value",
            "name",
            "placeholder",
            "disabled",
            "required",
            "readOnly",
            "rows",
            "cols",
        ],
        "select" => &["value", "name", "disabled", "required", "multiple"],
        "option" => &["value", "selected", "disabled", "label"],
        "button" => &["value", "type", "name", "disabled"],
        "a" => &["href", "target", "rel"],
        "img" => &["src", "alt", "width", "height"],
        "canvas" | "video" => &["width", "height"],
        "label" => &["htmlFor"],
        "form" => &["action", "method", "name"],
        _ => &[],
    }
}

/// Properties that read and write an attribute of the same meaning.
fn reflected_attribute(key: &str) -> Option<&'static str> {
    Some(match key {
        "id" => "id",
        "title" => "title",
        "lang" => "lang",
        "dir" => "dir",
        "type" => "type",
        "name" => "name",
        "placeholder" => "placeholder",
        "href" => "href",
        "src" => "src",
        "alt" => "alt",
        "target" => "target",
        "rel" => "rel",
        "htmlFor" => "for",
        "tabIndex" => "tabindex",
        "min" => "min",
        "max" => "max",
        "step" => "step",
        "rows" => "rows",
        "cols" => "cols",
        "width" => "width",
        "height" => "height",
        "action" => "action",
        "method" => "method",
        "label" => "label",
        _ => return None,
    })
}

/// Boolean properties backed by the presence of an attribute.
fn boolean_attribute(key: &str) -> Option<&'static str> {
    Some(match key {
        "hidden" => "hidden",
        "disabled" => "disabled",
        "required" => "required",
        "readOnly" => "readonly",
        "multiple" => "multiple",
        "selected" => "selected",
        "autofocus" => "autofocus",
        _ => return None,
    })
}

/// XML-style name check used for tags and attributes.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}

fn text_of(value: &Value<MemoryDom>) -> String {
    match value {
        Value::Null => String::new(),
        other => other.to_js_string(),
    }
}

fn parse_declarations(style: &str) -> IndexMap<String, String> {
    style
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let (name, value) = (name.trim(), value.trim());
            (!name.is_empty() && !value.is_empty()).then(|| (name.to_owned(), value.to_owned()))
        })
        .collect()
}

fn render_declarations(declarations: &IndexMap<String, String>) -> String {
    declarations
        .iter()
        .map(|(name, value)| format!("{name}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    out
}

// ----------------------------------------------------------------------------
// Nodes
// ----------------------------------------------------------------------------

struct ElementData {
    tag: String,
    namespace: String,
    attributes: IndexMap<String, String>,
    properties: IndexMap<String, Value<MemoryDom>>,
    listeners: Vec<(String, Handler<MemoryDom>)>,
}

enum Content {
    Element(ElementData),
    Text(String),
    Comment(String),
    Fragment,
}

struct NodeData {
    parent: Weak<RefCell<NodeData>>,
    children: Vec<MemoryNode>,
    content: Content,
}

/// A node of a [`MemoryDom`] tree.
///
/// Clones refer to the same node; equality is identity.
#[derive(Clone)]
pub struct MemoryNode(Rc<RefCell<NodeData>>);

impl MemoryNode {
    fn from_content(content: Content) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            parent: Weak::new(),
            children: Vec::new(),
            content,
        })))
    }

    fn element(tag: &str, namespace: &str) -> Self {
        Self::from_content(Content::Element(ElementData {
            tag: tag.to_owned(),
            namespace: namespace.to_owned(),
            attributes: IndexMap::new(),
            properties: IndexMap::new(),
            listeners: Vec::new(),
        }))
    }

    fn text(data: &str) -> Self {
        Self::from_content(Content::Text(data.to_owned()))
    }

    pub fn is_element(&self) -> bool {
        matches!(self.0.borrow().content, Content::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.0.borrow().content, Content::Text(_))
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.0.borrow().content, Content::Comment(_))
    }

    pub fn is_fragment(&self) -> bool {
        matches!(self.0.borrow().content, Content::Fragment)
    }

    /// Tag name as created (lowercase for HTML elements).
    pub fn tag_name(&self) -> Option<String> {
        self.with_element(|el| el.tag.clone())
    }

    pub fn namespace(&self) -> Option<String> {
        self.with_element(|el| el.namespace.clone())
    }

    /// Data of a text or comment node.
    pub fn node_value(&self) -> Option<String> {
        match &self.0.borrow().content {
            Content::Text(data) | Content::Comment(data) => Some(data.clone()),
            _ => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.with_element(|el| el.attributes.get(name).cloned())
            .flatten()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Class tokens in insertion order.
    pub fn classes(&self) -> Vec<String> {
        self.attribute("class")
            .map(|class| class.split_whitespace().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes().iter().any(|class| class == name)
    }

    /// Value of an inline style declaration, by CSS name.
    pub fn style(&self, name: &str) -> Option<String> {
        self.attribute("style")
            .and_then(|style| parse_declarations(&style).shift_remove(name))
    }

    pub fn parent(&self) -> Option<MemoryNode> {
        self.0.borrow().parent.upgrade().map(MemoryNode)
    }

    pub fn children(&self) -> Vec<MemoryNode> {
        self.0.borrow().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    /// Number of listeners registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.with_element(|el| el.listeners.iter().filter(|(name, _)| name == event).count())
            .unwrap_or(0)
    }

    /// Concatenated text of the node and its descendants, comments excluded.
    pub fn text_content(&self) -> String {
        let data = self.0.borrow();
        match &data.content {
            Content::Text(text) | Content::Comment(text) => text.clone(),
            Content::Element(_) | Content::Fragment => data
                .children
                .iter()
                .filter(|child| !child.is_comment())
                .map(MemoryNode::text_content)
                .collect(),
        }
    }

    /// Serialized markup of the node's children.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in self.0.borrow().children.iter() {
            child.write_html(&mut out);
        }
        out
    }

    /// Serialized markup of the node itself.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let data = self.0.borrow();
        match &data.content {
            Content::Text(text) => out.push_str(&escape(text, false)),
            Content::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            Content::Fragment => {
                for child in &data.children {
                    child.write_html(out);
                }
            }
            Content::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape(value, true));
                    out.push('"');
                }
                out.push('>');
                if el.namespace == HTML_NAMESPACE && VOID_ELEMENTS.contains(&el.tag.as_str()) {
                    return;
                }
                for child in &data.children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }

    fn with_element<R>(&self, f: impl FnOnce(&ElementData) -> R) -> Option<R> {
        match &self.0.borrow().content {
            Content::Element(el) => Some(f(el)),
            _ => None,
        }
    }

    fn with_element_mut<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut ElementData) -> R,
    ) -> Result<R> {
        match &mut self.0.borrow_mut().content {
            Content::Element(el) => Ok(f(el)),
            _ => Err(Error::NotAnElement(operation)),
        }
    }

    fn accepts_children(&self) -> bool {
        matches!(
            self.0.borrow().content,
            Content::Element(_) | Content::Fragment
        )
    }

    /// Whether `other` is this node or one of its descendants.
    fn contains(&self, other: &MemoryNode) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if node == *self {
                return true;
            }
            current = node.parent();
        }
        false
    }

    fn index_of(&self, child: &MemoryNode) -> Option<usize> {
        self.0.borrow().children.iter().position(|c| c == child)
    }

    fn detach(&self) {
        let parent = self.0.borrow().parent.upgrade();
        if let Some(parent) = parent {
            parent
                .borrow_mut()
                .children
                .retain(|child| !Rc::ptr_eq(&child.0, &self.0));
        }
        self.0.borrow_mut().parent = Weak::new();
    }

    fn adopt(&self, child: &MemoryNode, index: Option<usize>) {
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        let mut data = self.0.borrow_mut();
        match index {
            Some(index) if index <= data.children.len() => {
                data.children.insert(index, child.clone())
            }
            _ => data.children.push(child.clone()),
        }
    }

    fn clear_children(&self) {
        let children = std::mem::take(&mut self.0.borrow_mut().children);
        for child in &children {
            child.0.borrow_mut().parent = Weak::new();
        }
    }

    fn set_text_content(&self, text: &str) -> Result<()> {
        {
            let mut data = self.0.borrow_mut();
            if let Content::Text(current) | Content::Comment(current) = &mut data.content {
                *current = text.to_owned();
                return Ok(());
            }
        }
        self.clear_children();
        if !text.is_empty() {
            self.adopt(&MemoryNode::text(text), None);
        }
        Ok(())
    }
}

impl PartialEq for MemoryNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for MemoryNode {}

impl fmt::Debug for MemoryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.borrow().content {
            Content::Element(el) => write!(f, "<{}>", el.tag),
            Content::Text(text) => write!(f, "#text {text:?}"),
            Content::Comment(text) => write!(f, "<!--{text}-->"),
            Content::Fragment => f.write_str("#fragment"),
        }
    }
}

/// Event passed to listeners by [`MemoryDom::dispatch`].
#[derive(Debug, Clone)]
pub struct MemoryEvent {
    kind: String,
    target: MemoryNode,
}

impl MemoryEvent {
    /// Event name, such as `click`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn target(&self) -> &MemoryNode {
        &self.target
    }
}

// ----------------------------------------------------------------------------
// Document
// ----------------------------------------------------------------------------

/// Headless implementation of [`Dom`].
#[derive(Debug, Clone, Default)]
pub struct MemoryDom;

impl MemoryDom {
    pub fn new() -> Self {
        Self
    }

    /// Call every listener registered on `node` for `event`. Events do not
    /// bubble. Returns the number of listeners called.
    pub fn dispatch(&self, node: &MemoryNode, event: &str) -> usize {
        let handlers: Vec<Handler<Self>> = node
            .with_element(|el| {
                el.listeners
                    .iter()
                    .filter(|(name, _)| name == event)
                    .map(|(_, handler)| Rc::clone(handler))
                    .collect()
            })
            .unwrap_or_default();

        let event = MemoryEvent {
            kind: event.to_owned(),
            target: node.clone(),
        };
        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }

    fn convert_children(&self, parent: ElementRef<'_>, svg: bool) -> Result<Vec<MemoryNode>> {
        let mut nodes = Vec::new();
        for child in parent.children() {
            match child.value() {
                scraper::Node::Text(text) => nodes.push(MemoryNode::text(text)),
                scraper::Node::Comment(comment) => nodes.push(self.create_comment(comment)),
                scraper::Node::Element(_) => {
                    let Some(element) = ElementRef::wrap(child) else {
                        continue;
                    };
                    let name = element.value().name();
                    let svg = svg || name == "svg";
                    let namespace = if svg { SVG_NAMESPACE } else { HTML_NAMESPACE };

                    let node = MemoryNode::element(name, namespace);
                    node.with_element_mut("parse_html", |el| {
                        for (name, value) in element.value().attrs() {
                            el.attributes.insert(name.to_owned(), value.to_owned());
                        }
                    })?;
                    for grandchild in self.convert_children(element, svg)? {
                        node.adopt(&grandchild, None);
                    }
                    nodes.push(node);
                }
                _ => {}
            }
        }
        Ok(nodes)
    }

    fn update_style(
        &self,
        node: &MemoryNode,
        name: &str,
        value: &str,
        operation: &'static str,
    ) -> Result<()> {
        node.with_element_mut(operation, |el| {
            let mut declarations = el
                .attributes
                .get("style")
                .map(|style| parse_declarations(style))
                .unwrap_or_default();
            if value.is_empty() {
                declarations.shift_remove(name);
            } else {
                declarations.insert(name.to_owned(), value.to_owned());
            }
            if declarations.is_empty() {
                el.attributes.shift_remove("style");
            } else {
                el.attributes
                    .insert("style".to_owned(), render_declarations(&declarations));
            }
        })
    }

    fn update_classes(
        &self,
        node: &MemoryNode,
        operation: &'static str,
        f: impl FnOnce(&mut IndexSet<String>),
    ) -> Result<()> {
        node.with_element_mut(operation, |el| {
            let mut classes: IndexSet<String> = el
                .attributes
                .get("class")
                .map(|class| class.split_whitespace().map(str::to_owned).collect())
                .unwrap_or_default();
            f(&mut classes);
            let joined = classes.into_iter().collect::<Vec<_>>().join(" ");
            el.attributes.insert("class".to_owned(), joined);
        })
    }
}

impl Dom for MemoryDom {
    type Node = MemoryNode;
    type Event = MemoryEvent;

    fn create_element(&self, tag: &str) -> Result<MemoryNode> {
        if !is_valid_name(tag) {
            return Err(Error::InvalidTag(tag.to_owned()));
        }
        Ok(MemoryNode::element(&tag.to_ascii_lowercase(), HTML_NAMESPACE))
    }

    fn create_element_ns(&self, namespace: &str, tag: &str) -> Result<MemoryNode> {
        if namespace.is_empty() {
            return Err(Error::InvalidNamespace(namespace.to_owned()));
        }
        if !is_valid_name(tag) {
            return Err(Error::InvalidTag(tag.to_owned()));
        }
        Ok(MemoryNode::element(tag, namespace))
    }

    fn create_comment(&self, data: &str) -> MemoryNode {
        MemoryNode::from_content(Content::Comment(data.to_owned()))
    }

    fn create_fragment(&self) -> MemoryNode {
        MemoryNode::from_content(Content::Fragment)
    }

    fn parse_html(&self, html: &str) -> Result<Vec<MemoryNode>> {
        let document = Html::parse_fragment(html);
        self.convert_children(document.root_element(), false)
    }

    fn append(&self, parent: &MemoryNode, child: &MemoryNode) -> Result<()> {
        if !parent.accepts_children() {
            return Err(Error::Hierarchy("text and comment nodes cannot have children"));
        }
        if child.is_fragment() {
            for node in child.children() {
                self.append(parent, &node)?;
            }
            return Ok(());
        }
        if child.contains(parent) {
            return Err(Error::Hierarchy("a node cannot be inserted into itself"));
        }
        child.detach();
        parent.adopt(child, None);
        Ok(())
    }

    fn insert_after(&self, anchor: &MemoryNode, nodes: &[MemoryNode]) -> Result<()> {
        let Some(parent) = anchor.parent() else {
            return Ok(());
        };

        let mut expanded = Vec::with_capacity(nodes.len());
        for node in nodes {
            if node.is_fragment() {
                expanded.extend(node.children());
            } else {
                expanded.push(node.clone());
            }
        }

        let mut previous = anchor.clone();
        for node in expanded {
            if node == previous {
                continue;
            }
            if node.contains(&parent) {
                return Err(Error::Hierarchy("a node cannot be inserted into itself"));
            }
            node.detach();
            let index = parent.index_of(&previous).map(|i| i + 1);
            parent.adopt(&node, index);
            previous = node;
        }
        Ok(())
    }

    fn remove(&self, node: &MemoryNode) {
        node.detach();
    }

    fn namespace_uri(&self, node: &MemoryNode) -> Option<String> {
        node.namespace()
    }

    fn has_property(&self, node: &MemoryNode, key: &str) -> bool {
        node.with_element(|el| {
            el.properties.contains_key(key)
                || (el.namespace == HTML_NAMESPACE
                    && (GLOBAL_PROPERTIES.contains(&key)
                        || tag_properties(&el.tag).contains(&key)))
        })
        .unwrap_or(false)
    }

    fn set_property(&self, node: &MemoryNode, key: &str, value: &Value<Self>) -> Result<()> {
        match key {
            "textContent" => node.set_text_content(&text_of(value)),
            "innerHTML" => {
                if !node.accepts_children() {
                    return Err(Error::Hierarchy("text and comment nodes cannot have children"));
                }
                let nodes = self.parse_html(&text_of(value))?;
                node.clear_children();
                for child in &nodes {
                    node.adopt(child, None);
                }
                Ok(())
            }
            "className" => self.set_attribute(node, "class", &text_of(value)),
            "value" => node.with_element_mut("set_property", |el| {
                el.properties
                    .insert(key.to_owned(), Value::Str(text_of(value)));
            }),
            "checked" => node.with_element_mut("set_property", |el| {
                el.properties
                    .insert(key.to_owned(), Value::Bool(value.is_truthy()));
            }),
            _ => {
                if let Some(attribute) = reflected_attribute(key) {
                    return match value {
                        Value::Null => self.remove_attribute(node, attribute),
                        value => self.set_attribute(node, attribute, &value.to_js_string()),
                    };
                }
                if let Some(attribute) = boolean_attribute(key) {
                    return if value.is_truthy() {
                        self.set_attribute(node, attribute, "")
                    } else {
                        self.remove_attribute(node, attribute)
                    };
                }
                node.with_element_mut("set_property", |el| {
                    el.properties.insert(key.to_owned(), value.clone());
                })
            }
        }
    }

    fn get_property(&self, node: &MemoryNode, key: &str) -> Value<Self> {
        match key {
            "textContent" => Value::Str(node.text_content()),
            "innerHTML" => Value::Str(node.inner_html()),
            "className" => Value::Str(node.attribute("class").unwrap_or_default()),
            _ => {
                if let Some(attribute) = reflected_attribute(key) {
                    return Value::Str(node.attribute(attribute).unwrap_or_default());
                }
                if let Some(attribute) = boolean_attribute(key) {
                    return Value::Bool(node.has_attribute(attribute));
                }
                let stored = node
                    .with_element(|el| el.properties.get(key).cloned())
                    .flatten();
                match (stored, key) {
                    (Some(value), _) => value,
                    (None, "value") => Value::Str(String::new()),
                    (None, "checked") => Value::Bool(false),
                    (None, _) => Value::Null,
                }
            }
        }
    }

    fn set_attribute(&self, node: &MemoryNode, name: &str, value: &str) -> Result<()> {
        if !is_valid_name(name) {
            return Err(Error::InvalidAttribute(name.to_owned()));
        }
        node.with_element_mut("set_attribute", |el| {
            el.attributes.insert(name.to_owned(), value.to_owned());
        })
    }

    fn remove_attribute(&self, node: &MemoryNode, name: &str) -> Result<()> {
        node.with_element_mut("remove_attribute", |el| {
            el.attributes.shift_remove(name);
        })
    }

    fn set_style_property(&self, node: &MemoryNode, name: &str, value: &str) -> Result<()> {
        self.update_style(node, name, value, "set_style_property")
    }

    fn set_style_field(&self, node: &MemoryNode, name: &str, value: &str) -> Result<()> {
        let name = match name {
            "cssFloat" => "float".to_owned(),
            name => camel_to_kebab(name),
        };
        self.update_style(node, &name, value, "set_style_field")
    }

    fn set_data(&self, node: &MemoryNode, name: &str, value: &str) -> Result<()> {
        self.set_attribute(node, &format!("data-{}", camel_to_kebab(name)), value)
    }

    fn add_classes(&self, node: &MemoryNode, classes: &[&str]) -> Result<()> {
        self.update_classes(node, "add_classes", |set| {
            for class in classes.iter().filter(|class| !class.is_empty()) {
                set.insert((*class).to_owned());
            }
        })
    }

    fn remove_classes(&self, node: &MemoryNode, classes: &[&str]) -> Result<()> {
        self.update_classes(node, "remove_classes", |set| {
            for class in classes {
                set.shift_remove(*class);
            }
        })
    }

    fn add_event_listener(
        &self,
        node: &MemoryNode,
        event: &str,
        handler: Handler<Self>,
    ) -> Result<()> {
        node.with_element_mut("add_event_listener", |el| {
            el.listeners.push((event.to_owned(), handler));
        })
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
