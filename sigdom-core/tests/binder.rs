//! Integration Tests for the Element Binder
//!
//! These tests build elements on the in-memory document and check that
//! reactive bindings keep them in sync.

use std::cell::Cell;
use std::rc::Rc;

use sigdom_core::binder::{Binder, Config, Props, Tag, Value};
use sigdom_core::dom::{Dom, MemoryDom, MemoryEvent, MemoryNode, SVG_NAMESPACE};
use sigdom_core::jsx::{fragment, jsx, JsxType};
use sigdom_core::reactive::Runtime;
use sigdom_core::{BinderConfig, Error};

type V = Value<MemoryDom>;

fn binder() -> Binder<MemoryDom> {
    Binder::new(MemoryDom::new()).with_runtime(Runtime::new())
}

/// A reactive `text` entry updates the same text node in place of the old.
#[test]
fn reactive_text_follows_the_signal() {
    let binder = binder();
    let text = binder.runtime().signal(String::from("hi"));

    let span = binder
        .build("span", Props::new().with("text", text.clone()), None)
        .unwrap();
    assert_eq!(span.text_content(), "hi");

    text.set(String::from("bye"));
    assert_eq!(span.text_content(), "bye");
    assert_eq!(span.to_html(), "<span>bye</span>");
}

/// Reactive children keep their position among static siblings.
#[test]
fn reactive_children_keep_their_position() {
    let binder = binder();
    let label = binder.runtime().signal(String::from("a"));

    let div = binder
        .build(
            "div",
            Props::new().with(
                "children",
                V::List(vec![label.clone().into(), "static".into()]),
            ),
            None,
        )
        .unwrap();
    assert_eq!(div.inner_html(), "<!--signal-->astatic");

    label.set(String::from("b"));
    assert_eq!(div.inner_html(), "<!--signal-->bstatic");
    assert_eq!(div.text_content(), "bstatic");
}

/// A reactive `value` writes back into its signal on input events.
#[test]
fn value_binding_is_two_way() {
    let binder = binder();
    let dom = binder.dom().clone();
    let name = binder.runtime().signal(String::from("ada"));

    let input = binder
        .build("input", Props::new().with("value", name.clone()), None)
        .unwrap();
    assert_eq!(dom.get_property(&input, "value").as_str(), Some("ada"));

    name.set(String::from("grace"));
    assert_eq!(dom.get_property(&input, "value").as_str(), Some("grace"));

    dom.set_property(&input, "value", &V::from("typed")).unwrap();
    assert_eq!(dom.dispatch(&input, "input"), 1);
    assert_eq!(name.get(), "typed");
}

/// A reactive `checked` writes back on change events.
#[test]
fn checked_binding_is_two_way() {
    let binder = binder();
    let dom = binder.dom().clone();
    let done = binder.runtime().signal(false);

    let checkbox = binder
        .build(
            "input",
            Props::new().with("type", "checkbox").with("checked", done.clone()),
            None,
        )
        .unwrap();
    assert_eq!(checkbox.attribute("type").as_deref(), Some("checkbox"));
    assert!(!dom.get_property(&checkbox, "checked").is_truthy());

    dom.set_property(&checkbox, "checked", &V::from(true)).unwrap();
    dom.dispatch(&checkbox, "change");
    assert!(done.get());

    done.set(false);
    assert!(!dom.get_property(&checkbox, "checked").is_truthy());
}

/// SVG tags are created in the SVG namespace, with attributes, not
/// properties.
#[test]
fn svg_tags_use_the_svg_namespace() {
    let binder = binder();
    let circle = binder
        .build("circle", Props::new().with("r", 5), None)
        .unwrap();

    assert_eq!(circle.namespace().as_deref(), Some(SVG_NAMESPACE));
    assert_eq!(circle.attribute("r").as_deref(), Some("5"));

    let svg = binder
        .build("svg", Props::new().with("children", V::node(circle.clone())), None)
        .unwrap();
    assert_eq!(svg.to_html(), r#"<svg><circle r="5"></circle></svg>"#);
}

/// The built element is appended to the given parent.
#[test]
fn parent_receives_the_element() {
    let binder = binder();
    let list = binder.build("ul", (), None).unwrap();

    binder.build("li", "one", Some(&list)).unwrap();
    binder.build("li", Config::<MemoryDom>::parent(list.clone()), None).unwrap();
    assert_eq!(list.inner_html(), "<li>one</li><li></li>");
}

/// Strings in `html` replace the subtree; lists become children.
#[test]
fn html_content_shorthand() {
    let binder = binder();
    let p = binder.build("p", "<b>bold</b> text", None).unwrap();
    assert_eq!(p.inner_html(), "<b>bold</b> text");

    let em = binder.build("em", "x", None).unwrap();
    let div = binder
        .build("div", vec![V::from("a"), V::node(em), V::Null, V::from(1)], None)
        .unwrap();
    assert_eq!(div.inner_html(), "a<em>x</em>1");
}

/// Class entries accept strings, lists and maps, and reactive ones drop
/// the tokens they no longer produce.
#[test]
fn class_names_from_strings_lists_and_maps() {
    let binder = binder();
    let active = binder.runtime().signal(true);

    let button = binder
        .build(
            "button",
            Props::new().with(
                "class",
                V::List(vec![
                    "btn primary".into(),
                    V::from([("active", V::from(active.clone()))]),
                ]),
            ),
            None,
        )
        .unwrap();
    assert_eq!(button.classes(), ["btn", "primary", "active"]);

    active.set(false);
    assert_eq!(button.classes(), ["btn", "primary"]);

    active.set(true);
    assert!(button.has_class("active"));
}

/// Style strings set the attribute; style maps set fields and custom
/// properties, each reactive on its own.
#[test]
fn style_strings_and_maps() {
    let binder = binder();
    let color = binder.runtime().signal(String::from("red"));

    let div = binder
        .build(
            "div",
            Props::new()
                .with(
                    "style",
                    V::from([
                        ("backgroundColor", V::from(color.clone())),
                        ("--gap", V::from("4px")),
                    ]),
                )
                .with("--depth", 2),
            None,
        )
        .unwrap();
    assert_eq!(div.style("background-color").as_deref(), Some("red"));
    assert_eq!(div.style("--gap").as_deref(), Some("4px"));
    assert_eq!(div.style("--depth").as_deref(), Some("2"));

    color.set(String::from("blue"));
    assert_eq!(div.style("background-color").as_deref(), Some("blue"));

    let plain = binder
        .build("div", Props::new().with("style", "color: green"), None)
        .unwrap();
    assert_eq!(plain.style("color").as_deref(), Some("green"));
}

/// Dataset entries become `data-*` attributes; reactive entries follow.
#[test]
fn dataset_entries() {
    let binder = binder();
    let id = binder.runtime().signal(7);

    let row = binder
        .build(
            "tr",
            Props::new().with(
                "data",
                V::from([("userId", V::from(id.clone())), ("kind", V::from("admin"))]),
            ),
            None,
        )
        .unwrap();
    assert_eq!(row.attribute("data-user-id").as_deref(), Some("7"));
    assert_eq!(row.attribute("data-kind").as_deref(), Some("admin"));

    id.set(8);
    assert_eq!(row.attribute("data-user-id").as_deref(), Some("8"));

    let err = binder
        .build("tr", Props::new().with("data", "nope"), None)
        .unwrap_err();
    assert!(matches!(err, Error::UnexpectedValue { .. }));
}

/// `on*` entries attach listeners, or inline handlers for strings.
#[test]
fn event_listeners_and_inline_handlers() {
    let binder = binder();
    let clicks = Rc::new(Cell::new(0));
    let counter = Rc::clone(&clicks);

    let button = binder
        .build(
            "button",
            Props::new()
                .on("click", move |_: &MemoryEvent| counter.set(counter.get() + 1))
                .with("onmouseover", "highlight()"),
            None,
        )
        .unwrap();

    binder.dom().dispatch(&button, "click");
    binder.dom().dispatch(&button, "click");
    assert_eq!(clicks.get(), 2);
    assert_eq!(button.attribute("onmouseover").as_deref(), Some("highlight()"));

    let err = binder
        .build("button", Props::new().with("onclick", 3), None)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidListener(key) if key == "onclick"));
}

/// Native properties are assigned; unknown keys become attributes; null
/// entries are skipped and a reactive attribute set to null is removed.
#[test]
fn properties_attributes_and_nulls() {
    let binder = binder();
    let dom = binder.dom().clone();
    let label = binder.runtime().signal(Some(String::from("close")));

    let link = binder
        .build(
            "a",
            Props::new()
                .with("href", "/home")
                .with("aria-label", label.clone())
                .with("title", V::Null)
                .with(".custom", 42),
            None,
        )
        .unwrap();
    assert_eq!(link.attribute("href").as_deref(), Some("/home"));
    assert_eq!(link.attribute("aria-label").as_deref(), Some("close"));
    assert!(!link.has_attribute("title"));
    assert_eq!(dom.get_property(&link, "custom").as_f64(), Some(42.0));

    label.set(None);
    assert!(!link.has_attribute("aria-label"));
}

/// Host errors surface to the caller unchanged.
#[test]
fn host_errors_propagate() {
    let binder = binder();
    assert!(matches!(
        binder.build("not a tag", (), None),
        Err(Error::InvalidTag(_))
    ));
    assert!(matches!(
        binder.build("div", Props::new().with("bad name", "x"), None),
        Err(Error::InvalidAttribute(_))
    ));
}

/// An existing node can be configured in place.
#[test]
fn existing_nodes_are_reused() {
    let binder = binder();
    let existing: MemoryNode = binder.dom().create_element("section").unwrap();
    let node = binder
        .build(Tag::<MemoryDom>::node(existing.clone()), Props::new().with("id", "main"), None)
        .unwrap();
    assert_eq!(node, existing);
    assert_eq!(existing.attribute("id").as_deref(), Some("main"));
}

/// The comment marker label comes from the configuration.
#[test]
fn marker_label_is_configurable() {
    let binder = binder().with_config(BinderConfig {
        marker_label: String::from("live"),
        ..BinderConfig::default()
    });
    let count = binder.runtime().signal(1);
    let div = binder
        .build("div", vec![V::from(count.clone())], None)
        .unwrap();
    assert_eq!(div.inner_html(), "<!--live-->1");
}

/// JSX elements and fragments go through the binder.
#[test]
fn jsx_elements_and_fragments() {
    let binder = binder();
    let count = binder.runtime().signal(0);

    let item = jsx(
        &binder,
        "li",
        Props::new().with("text", count.clone()).with("className", "item"),
    )
    .unwrap();
    let list = fragment(
        &binder,
        Props::new().with("children", vec![V::node(item), V::from("<li>static</li>")]),
    )
    .unwrap();

    let ul = binder.build("ul", (), None).unwrap();
    binder.dom().append(&ul, &list).unwrap();
    assert_eq!(
        ul.to_html(),
        r#"<ul><li class="item">0</li><li>static</li></ul>"#
    );

    count.set(3);
    assert_eq!(ul.text_content(), "3static");

    let wrapper = binder.clone();
    let card = JsxType::component(move |props: Props<MemoryDom>| {
        let title = props.get("title").cloned().unwrap_or(V::Null);
        jsx(&wrapper, "h2", Props::new().with("text", title))
    });
    let heading = jsx(&binder, card, Props::new().with("title", "Hello")).unwrap();
    assert_eq!(heading.to_html(), "<h2>Hello</h2>");
}
