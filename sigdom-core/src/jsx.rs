//! JSX Runtime
//!
//! The call shape a JSX transform emits, mapped onto [`Binder::build`]:
//! `jsx(type, props)` for elements and components, `jsxs` for the same
//! call with static children, and [`fragment`] for `<>...</>`.

use std::fmt;
use std::rc::Rc;

use crate::binder::{Binder, Props, Tag, Value};
use crate::dom::Dom;
use crate::error::Result;

/// A function component.
pub type Component<D> = Rc<dyn Fn(Props<D>) -> Result<<D as Dom>::Node>>;

/// The `type` of a JSX element.
pub enum JsxType<D: Dom> {
    Tag(String),
    Component(Component<D>),
}

impl<D: Dom> JsxType<D> {
    pub fn component(f: impl Fn(Props<D>) -> Result<D::Node> + 'static) -> Self {
        Self::Component(Rc::new(f))
    }
}

impl<D: Dom> From<&str> for JsxType<D> {
    fn from(tag: &str) -> Self {
        Self::Tag(tag.to_owned())
    }
}

impl<D: Dom> From<String> for JsxType<D> {
    fn from(tag: String) -> Self {
        Self::Tag(tag)
    }
}

impl<D: Dom> Clone for JsxType<D> {
    fn clone(&self) -> Self {
        match self {
            Self::Tag(tag) => Self::Tag(tag.clone()),
            Self::Component(component) => Self::Component(Rc::clone(component)),
        }
    }
}

impl<D: Dom> fmt::Debug for JsxType<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(tag) => f.debug_tuple("Tag").field(tag).finish(),
            Self::Component(_) => f.write_str("Component(..)"),
        }
    }
}

/// Build an element, or call a component with `props`.
///
/// `dangerouslySetInnerHTML: { __html }` becomes `innerHTML`.
pub fn jsx<D: Dom>(
    binder: &Binder<D>,
    ty: impl Into<JsxType<D>>,
    mut props: Props<D>,
) -> Result<D::Node> {
    match ty.into() {
        JsxType::Component(component) => component(props),
        JsxType::Tag(tag) => {
            if let Some(raw) = props.remove("dangerouslySetInnerHTML") {
                if let Some(html) = raw.field("__html") {
                    props.insert("innerHTML", html.clone());
                }
            }
            binder.build(tag, props, None)
        }
    }
}

/// Same as [`jsx`]; transforms call it when children are static.
pub fn jsxs<D: Dom>(
    binder: &Binder<D>,
    ty: impl Into<JsxType<D>>,
    props: Props<D>,
) -> Result<D::Node> {
    jsx(binder, ty, props)
}

/// A document fragment with `props` (usually just `children`) applied.
pub fn fragment<D: Dom>(binder: &Binder<D>, props: Props<D>) -> Result<D::Node> {
    let node = binder.dom().create_fragment();
    binder.build(Tag::<D>::Node(node), props, None)
}

/// Shorthand for a `children` entry.
pub fn children<D: Dom>(items: impl IntoIterator<Item = Value<D>>) -> Value<D> {
    Value::List(items.into_iter().collect())
}
