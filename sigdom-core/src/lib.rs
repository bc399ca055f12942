//! Sigdom Core
//!
//! Fine-grained reactivity for browser UIs, without a virtual DOM.
//! It implements:
//!
//! - Reactive primitives (signals, computed values, effects)
//! - A declarative element binder that keeps DOM facets in sync with signals
//! - A JSX-compatible runtime on top of the binder
//!
//! The crate runs natively against an in-memory document, and in the
//! browser (wasm32) against the real one.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: signals, computed values, effects, and their runtime
//! - `graph`: the dependency arena the runtime is built on
//! - `dom`: the host document seam and its implementations
//! - `binder`: element construction and attribute routing
//! - `jsx`: the `jsx`/`jsxs`/`fragment` entry points
//!
//! # Example
//!
//! ```rust
//! use sigdom_core::binder::{Binder, Props};
//! use sigdom_core::dom::MemoryDom;
//! use sigdom_core::reactive::{computed, signal};
//!
//! let binder = Binder::new(MemoryDom::new());
//!
//! // Create a signal
//! let count = signal(1);
//!
//! // Create a derived value
//! let c = count.clone();
//! let label = computed(move || format!("count: {}", c.get()));
//!
//! // Bind it to an element
//! let p = binder.build("p", Props::new().with("text", label), None).unwrap();
//! assert_eq!(p.to_html(), "<p>count: 1</p>");
//!
//! // Update the signal; the element follows
//! count.set(5);
//! assert_eq!(p.to_html(), "<p>count: 5</p>");
//! ```

pub mod binder;
pub mod config;
pub mod dom;
pub mod error;
pub mod graph;
pub mod jsx;
pub mod reactive;

pub use binder::{Binder, Config, Props, Tag, Value};
pub use config::BinderConfig;
pub use error::{Error, Result};
pub use reactive::{computed, effect, signal, untrack, Computed, EffectHandle, Runtime, Signal};
