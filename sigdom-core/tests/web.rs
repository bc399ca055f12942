//! Browser Tests
//!
//! Run with: wasm-pack test --headless --firefox sigdom-core

#![cfg(target_arch = "wasm32")]

use sigdom_core::binder::{Binder, Props};
use sigdom_core::dom::{Dom, WebDom, SVG_NAMESPACE};
use sigdom_core::reactive::Runtime;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn binder() -> Binder<WebDom> {
    let dom = WebDom::new().expect("browser document");
    Binder::new(dom).with_runtime(Runtime::new())
}

#[wasm_bindgen_test]
fn reactive_text_updates_the_element() {
    let binder = binder();
    let text = binder.runtime().signal(String::from("hi"));
    let node = binder
        .build("span", Props::new().with("text", text.clone()), None)
        .unwrap();
    assert_eq!(node.text_content().as_deref(), Some("hi"));

    text.set(String::from("bye"));
    assert_eq!(node.text_content().as_deref(), Some("bye"));
}

#[wasm_bindgen_test]
fn svg_tags_use_the_svg_namespace() {
    let binder = binder();
    let node = binder
        .build("circle", Props::new().with("r", 5), None)
        .unwrap();
    let element: web_sys::Element = node.dyn_into().unwrap();
    assert_eq!(element.namespace_uri().as_deref(), Some(SVG_NAMESPACE));
    assert_eq!(element.get_attribute("r").as_deref(), Some("5"));
}

#[wasm_bindgen_test]
fn value_binding_writes_back_on_input() {
    let binder = binder();
    let name = binder.runtime().signal(String::from("ada"));
    let node = binder
        .build("input", Props::new().with("value", name.clone()), None)
        .unwrap();
    let input: web_sys::HtmlInputElement = node.clone().dyn_into().unwrap();
    assert_eq!(input.value(), "ada");

    input.set_value("typed");
    let event = web_sys::Event::new("input").unwrap();
    input.dispatch_event(&event).unwrap();
    assert_eq!(name.get(), "typed");
}

#[wasm_bindgen_test]
fn markup_children_are_parsed() {
    let binder = binder();
    let node = binder.build("div", "<b>x</b>y", None).unwrap();
    let element: web_sys::Element = node.dyn_into().unwrap();
    assert_eq!(element.inner_html(), "<b>x</b>y");
    assert_eq!(binder.dom().parse_html("a<i>b</i>").unwrap().len(), 2);
}
