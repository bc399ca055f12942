//! Element Binder
//!
//! [`Binder::build`] creates (or reuses) a node and applies a props map to
//! it. Every entry is routed by its key:
//!
//! | Key | Applied as |
//! |---|---|
//! | `html`, `innerHTML` | markup (strings) or children (anything else) |
//! | `children` | children |
//! | `value`, `checked` | form state, two-way when reactive |
//! | `.name` | property `name` |
//! | `class`, `className` | class tokens from strings, lists, and maps |
//! | `on*` | event listener, or inline handler attribute for strings |
//! | `data` | dataset entries |
//! | `style` | inline style string, or map of style fields |
//! | `--name` | custom style property |
//! | `text` | text content |
//! | anything else | property if the element has one, attribute otherwise |
//!
//! A reactive value is not applied once: the binder wraps the rule in an
//! effect that re-applies it whenever the value changes. Effects are never
//! torn down; they live as long as the signals that feed them.
//!
//! Class bindings differ from a plain `classList.add` loop in two ways. A
//! reactive class binding removes the tokens its previous run added and no
//! longer produces, so switching `"a"` to `"b"` leaves only `b`. Token
//! strings are split on any run of whitespace, so `"a  b"` yields `a` and
//! `b` where a browser would reject the empty token.

mod children;
mod props;
mod svg;
mod value;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, error};

pub use props::{Config, Props, Tag};
pub use svg::{is_svg_tag, SVG_TAGS};
pub use value::{Derived, FromValue, Source, Value};

use crate::config::BinderConfig;
use crate::dom::{Dom, SVG_NAMESPACE};
use crate::error::{Error, Result};
use crate::reactive::Runtime;

/// Builds elements on a host document and keeps their reactive facets live.
pub struct Binder<D: Dom> {
    dom: D,
    runtime: Runtime,
    config: Rc<BinderConfig>,
}

impl<D: Dom> Binder<D> {
    /// A binder using the current thread's runtime and the default
    /// configuration.
    pub fn new(dom: D) -> Self {
        Self {
            dom,
            runtime: Runtime::current(),
            config: Rc::new(BinderConfig::default()),
        }
    }

    /// Create binding effects in `runtime` instead.
    pub fn with_runtime(mut self, runtime: Runtime) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_config(mut self, config: BinderConfig) -> Self {
        self.config = Rc::new(config);
        self
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Whether a string tag is created in the SVG namespace.
    pub fn is_svg_tag(&self, name: &str) -> bool {
        is_svg_tag(name) || self.config.extra_svg_tags.iter().any(|tag| tag == name)
    }

    /// Create or reuse a node, apply `config` to it, and append it to
    /// `parent` if there is one.
    ///
    /// A [`Config::Parent`] shorthand takes precedence over `parent`.
    /// Host errors are returned as they happen; entries applied before the
    /// failing one stay applied.
    pub fn build(
        &self,
        tag: impl Into<Tag<D>>,
        config: impl Into<Config<D>>,
        parent: Option<&D::Node>,
    ) -> Result<D::Node> {
        let tag = tag.into();
        let (mut props, shorthand_parent) = config.into().into_parts();
        let parent = shorthand_parent.or_else(|| parent.cloned());
        debug!(?tag, entries = props.len(), "building element");

        let (node, svg) = match tag {
            Tag::Name(name) if self.is_svg_tag(&name) => {
                (self.dom.create_element_ns(SVG_NAMESPACE, &name)?, true)
            }
            Tag::Name(name) => (self.dom.create_element(&name)?, false),
            Tag::Node(node) => {
                let svg = self.dom.namespace_uri(&node).as_deref() == Some(SVG_NAMESPACE);
                (node, svg)
            }
        };

        // Content first: some elements (select) need their options before
        // a value can be assigned.
        for key in ["html", "innerHTML"] {
            if let Some(content) = props.remove(key) {
                if content.is_truthy() {
                    self.set_inner_html(&node, content)?;
                }
            }
        }
        if let Some(children) = props.remove("children") {
            if children.is_truthy() {
                self.append_children(&node, children)?;
            }
        }

        for (key, value) in props {
            self.apply_entry(&node, svg, &key, value)?;
        }

        if let Some(parent) = parent {
            self.dom.append(&parent, &node)?;
        }
        Ok(node)
    }

    fn apply_entry(&self, node: &D::Node, svg: bool, key: &str, value: Value<D>) -> Result<()> {
        match key {
            "value" => return self.bind_value(node, value),
            "checked" => return self.bind_checked(node, value),
            _ => {}
        }
        if let Some(property) = key.strip_prefix('.') {
            return self.set_property(node, property, value);
        }
        if value.is_null() {
            return Ok(());
        }

        match key {
            "class" | "className" => self.set_class_names(node, value),
            "data" => self.set_dataset(node, value),
            "style" => self.set_styles(node, value),
            "text" => self.set_property(node, "textContent", value),
            _ if key.starts_with("on") => self.set_listener(node, key, value),
            _ if key.starts_with("--") => self.set_style_property(node, key, value),
            _ if !svg && self.dom.has_property(node, key) => self.set_property(node, key, value),
            _ => self.set_attribute(node, key, value),
        }
    }

    /// Apply `value` with `rule` once, or on every change if it is reactive.
    fn apply(
        &self,
        value: Value<D>,
        rule: impl Fn(&Self, Value<D>) -> Result<()> + 'static,
    ) -> Result<()> {
        match value {
            Value::Reactive(source) => self.bind(source, rule),
            value => rule(self, value),
        }
    }

    /// Run `rule` in an effect fed by `source`.
    ///
    /// A failure of the first run is returned and the effect is dropped.
    /// Later failures have no caller to go to and are logged.
    fn bind(
        &self,
        source: Rc<dyn Source<D>>,
        rule: impl Fn(&Self, Value<D>) -> Result<()> + 'static,
    ) -> Result<()> {
        let initial = Rc::new(Cell::new(true));
        let failure: Rc<RefCell<Option<Error>>> = Rc::default();
        let this = self.clone();
        let (first_run, first_failure) = (Rc::clone(&initial), Rc::clone(&failure));

        let effect = self.runtime.effect(move || {
            let value = source.read().resolve();
            if let Err(err) = rule(&this, value) {
                if first_run.get() {
                    *first_failure.borrow_mut() = Some(err);
                } else {
                    error!(error = %err, "reactive binding failed to apply");
                }
            }
        });
        initial.set(false);

        let failed = failure.take();
        match failed {
            Some(err) => {
                effect.dispose();
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn bind_value(&self, node: &D::Node, value: Value<D>) -> Result<()> {
        let target = node.clone();
        let source = match &value {
            Value::Reactive(source) => Some(Rc::clone(source)),
            _ => None,
        };
        self.apply(value, move |b, v| b.dom.set_property(&target, "value", &v))?;

        if let Some(source) = source {
            let (dom, target) = (self.dom.clone(), node.clone());
            self.dom.add_event_listener(
                node,
                &self.config.value_event,
                Rc::new(move |_: &D::Event| source.write(dom.get_property(&target, "value"))),
            )?;
        }
        Ok(())
    }

    fn bind_checked(&self, node: &D::Node, value: Value<D>) -> Result<()> {
        let target = node.clone();
        let source = match &value {
            Value::Reactive(source) => Some(Rc::clone(source)),
            _ => None,
        };
        self.apply(value, move |b, v| {
            b.dom
                .set_property(&target, "checked", &Value::Bool(v.is_truthy()))
        })?;

        if let Some(source) = source {
            let (dom, target) = (self.dom.clone(), node.clone());
            self.dom.add_event_listener(
                node,
                &self.config.checked_event,
                Rc::new(move |_: &D::Event| source.write(dom.get_property(&target, "checked"))),
            )?;
        }
        Ok(())
    }

    fn set_property(&self, node: &D::Node, key: &str, value: Value<D>) -> Result<()> {
        let (node, key) = (node.clone(), key.to_owned());
        self.apply(value, move |b, v| b.dom.set_property(&node, &key, &v))
    }

    fn set_attribute(&self, node: &D::Node, key: &str, value: Value<D>) -> Result<()> {
        let (node, key) = (node.clone(), key.to_owned());
        self.apply(value, move |b, v| match v {
            Value::Null => b.dom.remove_attribute(&node, &key),
            v => b.dom.set_attribute(&node, &key, &v.to_js_string()),
        })
    }

    fn set_listener(&self, node: &D::Node, key: &str, value: Value<D>) -> Result<()> {
        match value {
            Value::Str(code) => self.dom.set_attribute(node, key, &code),
            Value::Handler(handler) => self.dom.add_event_listener(node, &key[2..], handler),
            _ => Err(Error::InvalidListener(key.to_owned())),
        }
    }

    fn set_class_names(&self, node: &D::Node, value: Value<D>) -> Result<()> {
        // Reactive entries nested in a list or map make the whole binding
        // reactive, so their reads are tracked by one effect.
        let value = if !value.is_reactive() && contains_reactive(&value) {
            Value::reactive(Derived(move || value.clone()))
        } else {
            value
        };

        let node = node.clone();
        if !value.is_reactive() {
            let tokens = class_tokens(value);
            return self.dom.add_classes(&node, &as_strs(&tokens));
        }

        let applied: Rc<RefCell<Vec<String>>> = Rc::default();
        self.apply(value, move |b, v| {
            let tokens = class_tokens(v);
            let stale: Vec<String> = applied
                .borrow()
                .iter()
                .filter(|&token| !tokens.contains(token))
                .cloned()
                .collect();
            b.dom.remove_classes(&node, &as_strs(&stale))?;
            b.dom.add_classes(&node, &as_strs(&tokens))?;
            *applied.borrow_mut() = tokens;
            Ok(())
        })
    }

    fn set_dataset(&self, node: &D::Node, value: Value<D>) -> Result<()> {
        let node = node.clone();
        self.apply(value, move |b, v| match v {
            Value::Null => Ok(()),
            Value::Map(entries) => {
                for (name, entry) in entries {
                    if entry.is_null() {
                        continue;
                    }
                    let node = node.clone();
                    b.apply(entry, move |b, e| match e {
                        Value::Null => Ok(()),
                        e => b.dom.set_data(&node, &name, &e.to_js_string()),
                    })?;
                }
                Ok(())
            }
            _ => Err(Error::unexpected("data", "a map of dataset entries")),
        })
    }

    fn set_styles(&self, node: &D::Node, value: Value<D>) -> Result<()> {
        let node = node.clone();
        self.apply(value, move |b, v| match v {
            Value::Null => b.dom.remove_attribute(&node, "style"),
            Value::Str(style) => b.dom.set_attribute(&node, "style", &style),
            Value::Map(entries) => {
                for (name, entry) in entries {
                    if name.starts_with("--") {
                        b.set_style_property(&node, &name, entry)?;
                        continue;
                    }
                    let node = node.clone();
                    b.apply(entry, move |b, e| {
                        b.dom.set_style_field(&node, &name, &style_text(&e))
                    })?;
                }
                Ok(())
            }
            _ => Err(Error::unexpected("style", "a string or a map of style fields")),
        })
    }

    fn set_style_property(&self, node: &D::Node, name: &str, value: Value<D>) -> Result<()> {
        let (node, name) = (node.clone(), name.to_owned());
        self.apply(value, move |b, v| {
            b.dom.set_style_property(&node, &name, &style_text(&v))
        })
    }
}

impl<D: Dom> Clone for Binder<D> {
    fn clone(&self) -> Self {
        Self {
            dom: self.dom.clone(),
            runtime: self.runtime.clone(),
            config: Rc::clone(&self.config),
        }
    }
}

impl<D: Dom + fmt::Debug> fmt::Debug for Binder<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("dom", &self.dom)
            .field("runtime", &self.runtime)
            .field("config", &self.config)
            .finish()
    }
}

fn contains_reactive<D: Dom>(value: &Value<D>) -> bool {
    match value {
        Value::Reactive(_) => true,
        Value::List(items) => items.iter().any(contains_reactive),
        Value::Map(entries) => entries.values().any(contains_reactive),
        _ => false,
    }
}

/// Class tokens of a string, a list, or a map of name to flag. Falsy
/// entries contribute nothing.
fn class_tokens<D: Dom>(value: Value<D>) -> Vec<String> {
    let mut tokens = Vec::new();
    collect_class_tokens(value, &mut tokens);
    tokens
}

/// Tokens are split on runs of whitespace; empty tokens never reach the
/// document.
fn collect_class_tokens<D: Dom>(value: Value<D>, tokens: &mut Vec<String>) {
    let push = |names: &str, tokens: &mut Vec<String>| {
        for token in names.split_whitespace() {
            if !tokens.iter().any(|t| t == token) {
                tokens.push(token.to_owned());
            }
        }
    };

    match value.resolve() {
        Value::Str(names) => push(&names, tokens),
        Value::List(items) => {
            for item in items {
                collect_class_tokens(item, tokens);
            }
        }
        Value::Map(entries) => {
            for (names, flag) in entries {
                if flag.resolve().is_truthy() {
                    push(&names, tokens);
                }
            }
        }
        _ => {}
    }
}

fn as_strs(tokens: &[String]) -> Vec<&str> {
    tokens.iter().map(String::as_str).collect()
}

/// Style values clear the field when absent.
fn style_text<D: Dom>(value: &Value<D>) -> String {
    match value {
        Value::Null => String::new(),
        value => value.to_js_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;

    type V = Value<MemoryDom>;

    #[test]
    fn class_tokens_flatten_lists_and_maps() {
        let value = V::List(vec![
            V::from("a b"),
            V::Null,
            V::from([("c", true), ("d", false)]),
            V::List(vec![V::from("a"), V::from("e")]),
        ]);
        assert_eq!(class_tokens(value), ["a", "b", "c", "e"]);
    }

    #[test]
    fn class_tokens_skip_repeated_whitespace() {
        assert_eq!(class_tokens(V::from("a  b\tc ")), ["a", "b", "c"]);
    }

    #[test]
    fn reactive_class_drops_tokens_it_no_longer_produces() {
        let binder = Binder::new(MemoryDom::new()).with_runtime(Runtime::new());
        let class = binder.runtime().signal(String::from("a"));
        let node = binder
            .build("div", Props::new().with("class", class.clone()), None)
            .unwrap();
        assert_eq!(node.classes(), ["a"]);

        class.set(String::from("b"));
        assert_eq!(node.classes(), ["b"]);
    }

    #[test]
    fn style_text_clears_on_null() {
        assert_eq!(style_text(&V::Null), "");
        assert_eq!(style_text(&V::from(4)), "4");
    }

    #[test]
    fn extra_svg_tags_come_from_config() {
        let binder = Binder::new(MemoryDom::new()).with_config(BinderConfig {
            extra_svg_tags: vec!["hatch".to_owned()],
            ..BinderConfig::default()
        });
        assert!(binder.is_svg_tag("hatch"));
        assert!(binder.is_svg_tag("circle"));
        assert!(!binder.is_svg_tag("div"));
    }
}
