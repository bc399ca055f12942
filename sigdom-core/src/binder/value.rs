//! Configuration values.
//!
//! A [`Value`] is whatever can be put in a props map: a scalar, a list, a
//! nested map, a host node, an event handler, or a reactive source. The
//! binder applies plain values once and wraps reactive ones in an effect.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::dom::{Dom, Handler};
use crate::reactive::{Computed, SameValue, Signal};

/// A reactive value the binder can read inside an effect, and optionally
/// write back into (two-way `value`/`checked` bindings).
pub trait Source<D: Dom> {
    /// Current value, tracked by the running computation.
    fn read(&self) -> Value<D>;

    /// Store a value coming from the document. Read-only sources ignore it.
    fn write(&self, value: Value<D>);
}

/// Conversion used by two-way bindings to store a value read back from the
/// document into a typed signal.
pub trait FromValue<D: Dom>: Sized {
    fn from_value(value: &Value<D>) -> Option<Self>;
}

/// A configuration value.
pub enum Value<D: Dom> {
    /// Absent value. Skipped by most keys.
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    List(Vec<Value<D>>),
    Map(IndexMap<String, Value<D>>),
    Node(D::Node),
    Handler(Handler<D>),
    Reactive(Rc<dyn Source<D>>),
}

impl<D: Dom> Value<D> {
    /// Wrap any reactive source.
    pub fn reactive(source: impl Source<D> + 'static) -> Self {
        Self::Reactive(Rc::new(source))
    }

    /// Wrap an event handler.
    pub fn handler(f: impl Fn(&D::Event) + 'static) -> Self {
        Self::Handler(Rc::new(f))
    }

    /// Wrap a host node.
    pub fn node(node: D::Node) -> Self {
        Self::Node(node)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_reactive(&self) -> bool {
        matches!(self, Self::Reactive(_))
    }

    /// Truthiness as a script would see it.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Entry of a map value.
    pub fn field(&self, key: &str) -> Option<&Value<D>> {
        match self {
            Self::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Resolve a reactive value to its current contents (tracked).
    pub fn resolve(self) -> Value<D> {
        match self {
            Self::Reactive(source) => source.read().resolve(),
            other => other,
        }
    }

    /// String conversion used for attributes, styles, and dataset entries.
    pub fn to_js_string(&self) -> String {
        match self {
            Self::Null => "null".to_owned(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::Str(s) => s.clone(),
            Self::List(items) => items
                .iter()
                .map(|item| match item {
                    Self::Null => String::new(),
                    other => other.to_js_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Self::Map(_) => "[object Object]".to_owned(),
            Self::Node(_) => "[object Node]".to_owned(),
            Self::Handler(_) => "function".to_owned(),
            Self::Reactive(source) => source.read().to_js_string(),
        }
    }
}

/// Number formatting without a trailing `.0`, with `-0` printed as `0`.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned()
    } else if n == 0.0 {
        "0".to_owned()
    } else {
        n.to_string()
    }
}

impl<D: Dom> Clone for Value<D> {
    fn clone(&self) -> Self {
        match self {
            Self::Null => Self::Null,
            Self::Bool(b) => Self::Bool(*b),
            Self::Number(n) => Self::Number(*n),
            Self::Str(s) => Self::Str(s.clone()),
            Self::List(items) => Self::List(items.clone()),
            Self::Map(map) => Self::Map(map.clone()),
            Self::Node(node) => Self::Node(node.clone()),
            Self::Handler(handler) => Self::Handler(Rc::clone(handler)),
            Self::Reactive(source) => Self::Reactive(Rc::clone(source)),
        }
    }
}

impl<D: Dom> Default for Value<D> {
    fn default() -> Self {
        Self::Null
    }
}

impl<D: Dom> fmt::Debug for Value<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Self::Node(node) => f.debug_tuple("Node").field(node).finish(),
            Self::Handler(_) => f.write_str("Handler(..)"),
            Self::Reactive(_) => f.write_str("Reactive(..)"),
        }
    }
}

impl<D: Dom> SameValue for Value<D> {
    fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a.same_value(b),
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => a.same_value(b),
            (Self::Map(a), Self::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.same_value(vb))
            }
            (Self::Node(a), Self::Node(b)) => a == b,
            (Self::Handler(a), Self::Handler(b)) => a.same_value(b),
            (Self::Reactive(a), Self::Reactive(b)) => a.same_value(b),
            _ => false,
        }
    }
}

// ----------------------------------------------------------------------------
// Conversions
// ----------------------------------------------------------------------------

impl<D: Dom> From<bool> for Value<D> {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<D: Dom> From<String> for Value<D> {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl<D: Dom> From<&str> for Value<D> {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl<D: Dom> From<&String> for Value<D> {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

macro_rules! value_from_number {
    ($($t:ty),*) => {
        $(
            impl<D: Dom> From<$t> for Value<D> {
                fn from(value: $t) -> Self {
                    Self::Number(value as f64)
                }
            }
        )*
    };
}

value_from_number!(f64, f32, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<D: Dom, T: Into<Value<D>>> From<Option<T>> for Value<D> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<D: Dom, T: Into<Value<D>>> From<Vec<T>> for Value<D> {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<D: Dom, T: Into<Value<D>>> From<IndexMap<String, T>> for Value<D> {
    fn from(value: IndexMap<String, T>) -> Self {
        Self::Map(value.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<D: Dom, K: Into<String>, V: Into<Value<D>>, const N: usize> From<[(K, V); N]> for Value<D> {
    fn from(entries: [(K, V); N]) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<D: Dom> From<serde_json::Value> for Value<D> {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match value {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            Json::String(s) => Self::Str(s),
            Json::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Json::Object(map) => Self::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

impl<D, T> From<Signal<T>> for Value<D>
where
    D: Dom,
    T: Clone + SameValue + Into<Value<D>> + FromValue<D> + 'static,
{
    fn from(signal: Signal<T>) -> Self {
        Self::reactive(signal)
    }
}

impl<D, T> From<Computed<T>> for Value<D>
where
    D: Dom,
    T: Clone + Into<Value<D>> + 'static,
{
    fn from(computed: Computed<T>) -> Self {
        Self::reactive(computed)
    }
}

impl<D, T> Source<D> for Signal<T>
where
    D: Dom,
    T: Clone + SameValue + Into<Value<D>> + FromValue<D> + 'static,
{
    fn read(&self) -> Value<D> {
        self.get().into()
    }

    fn write(&self, value: Value<D>) {
        if let Some(value) = T::from_value(&value) {
            self.set(value);
        }
    }
}

impl<D, T> Source<D> for Computed<T>
where
    D: Dom,
    T: Clone + Into<Value<D>> + 'static,
{
    fn read(&self) -> Value<D> {
        self.get().into()
    }

    fn write(&self, _value: Value<D>) {}
}

/// A derivation used directly as a read-only source.
pub struct Derived<F>(pub F);

impl<D, F> Source<D> for Derived<F>
where
    D: Dom,
    F: Fn() -> Value<D>,
{
    fn read(&self) -> Value<D> {
        (self.0)()
    }

    fn write(&self, _value: Value<D>) {}
}

impl<D: Dom> FromValue<D> for Value<D> {
    fn from_value(value: &Value<D>) -> Option<Self> {
        Some(value.clone())
    }
}

impl<D: Dom> FromValue<D> for String {
    fn from_value(value: &Value<D>) -> Option<Self> {
        match value {
            Value::Null => Some(String::new()),
            Value::Str(s) => Some(s.clone()),
            Value::Bool(_) | Value::Number(_) => Some(value.to_js_string()),
            _ => None,
        }
    }
}

impl<D: Dom> FromValue<D> for bool {
    fn from_value(value: &Value<D>) -> Option<Self> {
        Some(value.is_truthy())
    }
}

impl<D: Dom> FromValue<D> for f64 {
    fn from_value(value: &Value<D>) -> Option<Self> {
        match value {
            Value::Number(n) => Some(*n),
            Value::Bool(b) => Some(f64::from(u8::from(*b))),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

macro_rules! from_value_integer {
    ($($t:ty),*) => {
        $(
            impl<D: Dom> FromValue<D> for $t {
                fn from_value(value: &Value<D>) -> Option<Self> {
                    match value {
                        Value::Number(n) if n.fract() == 0.0 => Some(*n as $t),
                        Value::Str(s) => s.trim().parse().ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

from_value_integer!(i32, i64, u32, u64, usize);

impl<D: Dom, T: FromValue<D>> FromValue<D> for Option<T> {
    fn from_value(value: &Value<D>) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<D: Dom, T: FromValue<D>> FromValue<D> for Vec<T> {
    fn from_value(value: &Value<D>) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}
