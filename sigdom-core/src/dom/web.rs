//! Browser Document
//!
//! [`Dom`] over the real `document`, through `web-sys`. Properties, styles
//! and the dataset are reached with `Reflect`, exactly like `el[key] = v`
//! in script. Exceptions thrown by the browser surface as
//! [`Error::Host`].

use std::rc::Rc;

use indexmap::IndexMap;
use js_sys::{Array, Object, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CssStyleDeclaration, Document, DomParser, Element, Event, Node, SupportedType};

use super::{Dom, Handler};
use crate::binder::Value;
use crate::error::{Error, Result};

fn host(err: JsValue) -> Error {
    let message = err
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    Error::Host(message)
}

fn as_element<'a>(node: &'a Node, operation: &'static str) -> Result<&'a Element> {
    node.dyn_ref::<Element>()
        .ok_or(Error::NotAnElement(operation))
}

fn to_js(value: &Value<WebDom>) -> JsValue {
    match value {
        Value::Null => JsValue::NULL,
        Value::Bool(b) => JsValue::from_bool(*b),
        Value::Number(n) => JsValue::from_f64(*n),
        Value::Str(s) => JsValue::from_str(s),
        Value::List(items) => items.iter().map(to_js).collect::<Array>().into(),
        Value::Map(map) => {
            let object = Object::new();
            for (key, value) in map {
                // Setting a property on a fresh plain object cannot throw.
                let _ = Reflect::set(&object, &JsValue::from_str(key), &to_js(value));
            }
            object.into()
        }
        Value::Node(node) => node.clone().into(),
        Value::Handler(handler) => {
            let handler = Rc::clone(handler);
            Closure::<dyn Fn(Event)>::new(move |event: Event| handler(&event)).into_js_value()
        }
        Value::Reactive(source) => to_js(&source.read()),
    }
}

fn from_js(value: JsValue) -> Value<WebDom> {
    if value.is_null() || value.is_undefined() {
        Value::Null
    } else if let Some(b) = value.as_bool() {
        Value::Bool(b)
    } else if let Some(n) = value.as_f64() {
        Value::Number(n)
    } else if let Some(s) = value.as_string() {
        Value::Str(s)
    } else if Array::is_array(&value) {
        Value::List(Array::from(&value).iter().map(from_js).collect())
    } else if let Ok(node) = value.clone().dyn_into::<Node>() {
        Value::Node(node)
    } else if value.is_object() {
        let object = Object::from(value);
        let mut map = IndexMap::new();
        for entry in Object::entries(&object).iter() {
            let entry = Array::from(&entry);
            if let Some(key) = entry.get(0).as_string() {
                map.insert(key, from_js(entry.get(1)));
            }
        }
        Value::Map(map)
    } else {
        Value::Null
    }
}

/// [`Dom`] backed by the browser document.
#[derive(Debug, Clone)]
pub struct WebDom {
    document: Document,
}

impl WebDom {
    /// Use the current window's document.
    pub fn new() -> Result<Self> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| Error::Host("no document available".to_owned()))?;
        Ok(Self { document })
    }

    pub fn with_document(document: Document) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn style(&self, node: &Node, operation: &'static str) -> Result<CssStyleDeclaration> {
        as_element(node, operation)?;
        Reflect::get(node, &JsValue::from_str("style"))
            .map_err(host)?
            .dyn_into::<CssStyleDeclaration>()
            .map_err(|_| Error::NotAnElement(operation))
    }
}

impl Dom for WebDom {
    type Node = Node;
    type Event = Event;

    fn create_element(&self, tag: &str) -> Result<Node> {
        self.document
            .create_element(tag)
            .map(Node::from)
            .map_err(|_| Error::InvalidTag(tag.to_owned()))
    }

    fn create_element_ns(&self, namespace: &str, tag: &str) -> Result<Node> {
        if namespace.is_empty() {
            return Err(Error::InvalidNamespace(namespace.to_owned()));
        }
        self.document
            .create_element_ns(Some(namespace), tag)
            .map(Node::from)
            .map_err(|_| Error::InvalidTag(tag.to_owned()))
    }

    fn create_comment(&self, data: &str) -> Node {
        self.document.create_comment(data).into()
    }

    fn create_fragment(&self) -> Node {
        self.document.create_document_fragment().into()
    }

    fn parse_html(&self, html: &str) -> Result<Vec<Node>> {
        let parsed = DomParser::new()
            .map_err(host)?
            .parse_from_string(html, SupportedType::TextHtml)
            .map_err(host)?;
        let Some(body) = parsed.body() else {
            return Ok(Vec::new());
        };
        let children = body.child_nodes();
        Ok((0..children.length())
            .filter_map(|i| children.item(i))
            .collect())
    }

    fn append(&self, parent: &Node, child: &Node) -> Result<()> {
        parent.append_child(child).map(drop).map_err(host)
    }

    fn insert_after(&self, anchor: &Node, nodes: &[Node]) -> Result<()> {
        let Some(parent) = anchor.parent_node() else {
            return Ok(());
        };
        let next = anchor.next_sibling();
        for node in nodes {
            parent
                .insert_before(node, next.as_ref())
                .map_err(host)?;
        }
        Ok(())
    }

    fn remove(&self, node: &Node) {
        if let Some(parent) = node.parent_node() {
            // The node was just found under this parent, so removal succeeds.
            let _ = parent.remove_child(node);
        }
    }

    fn namespace_uri(&self, node: &Node) -> Option<String> {
        node.dyn_ref::<Element>()
            .and_then(Element::namespace_uri)
    }

    fn has_property(&self, node: &Node, key: &str) -> bool {
        Reflect::has(node, &JsValue::from_str(key)).unwrap_or(false)
    }

    fn set_property(&self, node: &Node, key: &str, value: &Value<Self>) -> Result<()> {
        Reflect::set(node, &JsValue::from_str(key), &to_js(value))
            .map(drop)
            .map_err(host)
    }

    fn get_property(&self, node: &Node, key: &str) -> Value<Self> {
        Reflect::get(node, &JsValue::from_str(key))
            .map(from_js)
            .unwrap_or(Value::Null)
    }

    fn set_attribute(&self, node: &Node, name: &str, value: &str) -> Result<()> {
        as_element(node, "set_attribute")?
            .set_attribute(name, value)
            .map_err(|_| Error::InvalidAttribute(name.to_owned()))
    }

    fn remove_attribute(&self, node: &Node, name: &str) -> Result<()> {
        as_element(node, "remove_attribute")?
            .remove_attribute(name)
            .map_err(host)
    }

    fn set_style_property(&self, node: &Node, name: &str, value: &str) -> Result<()> {
        self.style(node, "set_style_property")?
            .set_property(name, value)
            .map_err(host)
    }

    fn set_style_field(&self, node: &Node, name: &str, value: &str) -> Result<()> {
        let style = self.style(node, "set_style_field")?;
        Reflect::set(&style, &JsValue::from_str(name), &JsValue::from_str(value))
            .map(drop)
            .map_err(host)
    }

    fn set_data(&self, node: &Node, name: &str, value: &str) -> Result<()> {
        as_element(node, "set_data")?;
        let dataset = Reflect::get(node, &JsValue::from_str("dataset")).map_err(host)?;
        Reflect::set(&dataset, &JsValue::from_str(name), &JsValue::from_str(value))
            .map(drop)
            .map_err(host)
    }

    fn add_classes(&self, node: &Node, classes: &[&str]) -> Result<()> {
        let list = as_element(node, "add_classes")?.class_list();
        for class in classes {
            list.add_1(class).map_err(host)?;
        }
        Ok(())
    }

    fn remove_classes(&self, node: &Node, classes: &[&str]) -> Result<()> {
        let list = as_element(node, "remove_classes")?.class_list();
        for class in classes {
            list.remove_1(class).map_err(host)?;
        }
        Ok(())
    }

    fn add_event_listener(&self, node: &Node, event: &str, handler: Handler<Self>) -> Result<()> {
        let closure = Closure::<dyn Fn(Event)>::new(move |event: Event| handler(&event));
        node.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(host)?;
        // The listener lives as long as the node.
        closure.forget();
        Ok(())
    }
}
