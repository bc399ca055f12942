//! Integration Tests for Reactive System
//!
//! These tests verify that signals, computed values, and effects work
//! together correctly.

use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use sigdom_core::reactive::{Computed, Runtime, Signal};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn counter() -> (Rc<Cell<u32>>, Rc<Cell<u32>>) {
    let count = Rc::new(Cell::new(0));
    (Rc::clone(&count), count)
}

/// A read right after a write sees the written value.
#[test]
fn read_after_write() {
    let runtime = Runtime::new();
    let signal = runtime.signal(1);
    signal.set(2);
    assert_eq!(signal.get(), 2);
    assert_eq!(signal.get_untracked(), 2);
}

/// Writing the current value does not re-run anything.
#[test]
fn same_value_write_triggers_nothing() {
    let runtime = Runtime::new();
    let name = runtime.signal(String::from("ada"));
    let (runs, seen) = counter();

    let n = name.clone();
    runtime.effect(move || {
        n.with(|_| ());
        runs.set(runs.get() + 1);
    });
    assert_eq!(seen.get(), 1);

    name.set(String::from("ada"));
    assert_eq!(seen.get(), 1);

    name.set(String::from("grace"));
    assert_eq!(seen.get(), 2);
}

/// A computed value read twice without a write in between derives once.
#[test]
fn computed_is_memoized() {
    let runtime = Runtime::new();
    let base = runtime.signal(3);
    let (calls, seen) = counter();

    let b = base.clone();
    let squared = runtime.computed(move || {
        calls.set(calls.get() + 1);
        b.get() * b.get()
    });

    assert_eq!(squared.get(), 9);
    assert_eq!(squared.get(), 9);
    assert_eq!(seen.get(), 1);
}

/// An effect that reads two computed values over one signal runs once per
/// write and sees both updated.
#[test]
fn diamond_runs_the_effect_once() {
    init_tracing();
    let runtime = Runtime::new();
    let a = runtime.signal(1);

    let a1 = a.clone();
    let b = runtime.computed(move || a1.get() + 1);
    let a2 = a.clone();
    let c = runtime.computed(move || a2.get() * 2);

    let log: Rc<RefCell<Vec<(i32, i32)>>> = Rc::default();
    let (b1, c1, sink) = (b.clone(), c.clone(), Rc::clone(&log));
    runtime.effect(move || sink.borrow_mut().push((b1.get(), c1.get())));

    a.set(5);
    assert_eq!(*log.borrow(), [(2, 2), (6, 10)]);
}

/// In a diamond of computed values, each node derives once per write.
#[test]
fn diamond_evaluates_each_computed_once() {
    let runtime = Runtime::new();
    let a = runtime.signal(1);
    let (b_calls, b_seen) = counter();
    let (c_calls, c_seen) = counter();
    let (d_calls, d_seen) = counter();

    let a1 = a.clone();
    let b = runtime.computed(move || {
        b_calls.set(b_calls.get() + 1);
        a1.get() + 1
    });
    let a2 = a.clone();
    let c = runtime.computed(move || {
        c_calls.set(c_calls.get() + 1);
        a2.get() * 2
    });
    let (b1, c1) = (b.clone(), c.clone());
    let d = runtime.computed(move || {
        d_calls.set(d_calls.get() + 1);
        b1.get() + c1.get()
    });

    assert_eq!(d.get(), 4);
    a.set(2);
    assert_eq!(d.get(), 7);
    assert_eq!(d.get(), 7);
    assert_eq!((b_seen.get(), c_seen.get(), d_seen.get()), (2, 2, 2));
}

/// Creating an effect runs it synchronously, exactly once.
#[test]
fn effect_runs_on_creation() {
    let runtime = Runtime::new();
    let value = runtime.signal(7);
    let observed = Rc::new(Cell::new(0));

    let (v, o) = (value.clone(), Rc::clone(&observed));
    let handle = runtime.effect(move || o.set(v.get()));

    assert_eq!(observed.get(), 7);
    assert!(handle.is_active());
}

/// A branch that stops reading a signal stops reacting to it.
#[test]
fn dependencies_are_pruned_when_branches_change() {
    let runtime = Runtime::new();
    let flag = runtime.signal(true);
    let a = runtime.signal(0);
    let b = runtime.signal(0);
    let (runs, seen) = counter();

    let (f, a1, b1) = (flag.clone(), a.clone(), b.clone());
    runtime.effect(move || {
        runs.set(runs.get() + 1);
        if f.get() {
            a1.get();
        } else {
            b1.get();
        }
    });
    assert_eq!(a.subscriber_count(), 1);

    flag.set(false);
    assert_eq!(seen.get(), 2);
    assert_eq!(a.subscriber_count(), 0);
    assert_eq!(b.subscriber_count(), 1);

    a.set(1);
    assert_eq!(seen.get(), 2);

    b.set(1);
    assert_eq!(seen.get(), 3);
}

/// A computed value evaluated inside another attributes reads correctly.
#[test]
fn nested_computed_values() {
    let runtime = Runtime::new();
    let base = runtime.signal(5);

    let b = base.clone();
    let doubled = runtime.computed(move || b.get() * 2);
    let d = doubled.clone();
    let plus_ten = runtime.computed(move || d.get() + 10);

    let observed = Rc::new(Cell::new(0));
    let (p, o) = (plus_ten.clone(), Rc::clone(&observed));
    runtime.effect(move || o.set(p.get()));
    assert_eq!(observed.get(), 20);

    base.set(10);
    assert_eq!(observed.get(), 30);
    assert_eq!(doubled.dependency_count(), 1);
    assert_eq!(plus_ten.dependency_count(), 1);
    assert_eq!(base.subscriber_count(), 1);
}

/// A computed value that is never read after a write never recomputes.
#[test]
fn unread_computed_values_stay_dirty() {
    let runtime = Runtime::new();
    let base = runtime.signal(1);
    let (calls, seen) = counter();

    let b = base.clone();
    let derived = runtime.computed(move || {
        calls.set(calls.get() + 1);
        b.get()
    });
    derived.get();

    base.set(2);
    base.set(3);
    assert!(derived.is_dirty());
    assert_eq!(seen.get(), 1);
    assert_eq!(derived.get(), 3);
    assert_eq!(seen.get(), 2);
}

/// A panicking derivation unwinds through the read and leaves the runtime
/// usable. It is not retried until one of its inputs changes.
#[test]
fn panicking_derivation_leaves_the_runtime_consistent() {
    let runtime = Runtime::new();
    let divisor = runtime.signal(1);
    let (calls, seen) = counter();

    let d = divisor.clone();
    let quotient: Computed<i32> = runtime.computed(move || {
        calls.set(calls.get() + 1);
        let divisor = d.get();
        assert!(divisor != 0, "division by zero");
        100 / divisor
    });
    assert_eq!(quotient.get(), 100);

    divisor.set(0);
    let result = panic::catch_unwind(AssertUnwindSafe(|| quotient.get()));
    assert!(result.is_err());
    assert!(!runtime.is_tracking());
    assert_eq!(seen.get(), 2);

    // No write since the failure: the last good value is served as is.
    let retry = panic::catch_unwind(AssertUnwindSafe(|| quotient.get()));
    assert_eq!(retry.ok(), Some(100));
    assert_eq!(seen.get(), 2);

    divisor.set(4);
    assert_eq!(quotient.get(), 25);
    assert_eq!(seen.get(), 3);
}

/// Effects that write signals cascade synchronously before `set` returns.
#[test]
fn writes_inside_effects_cascade() {
    let runtime = Runtime::new();
    let celsius = runtime.signal(0.0_f64);
    let fahrenheit = runtime.signal(32.0_f64);

    let (c, f) = (celsius.clone(), fahrenheit.clone());
    runtime.effect(move || f.set(c.get() * 9.0 / 5.0 + 32.0));

    celsius.set(100.0);
    assert_eq!(fahrenheit.get(), 212.0);
}

/// Reads of another runtime's signal are not tracked.
#[test]
fn runtimes_do_not_share_tracking() {
    let first = Runtime::new();
    let second = Runtime::new();
    let value = first.signal(1);
    let (runs, seen) = counter();

    let v = value.clone();
    let handle = second.effect(move || {
        runs.set(runs.get() + 1);
        v.get();
    });

    value.set(2);
    assert_eq!(seen.get(), 1);
    assert!(!handle.is_active());
    assert_eq!(value.subscriber_count(), 0);
}

/// The free functions use the thread's default runtime.
#[test]
fn free_functions_share_the_thread_runtime() {
    let count: Signal<i32> = sigdom_core::signal(2);
    let c = count.clone();
    let doubled = sigdom_core::computed(move || c.get() * 2);
    let observed = Rc::new(Cell::new(0));

    let (d, o) = (doubled.clone(), Rc::clone(&observed));
    let handle = sigdom_core::effect(move || o.set(d.get()));
    assert_eq!(observed.get(), 4);

    count.set(21);
    assert_eq!(observed.get(), 42);
    assert_eq!(sigdom_core::untrack(|| doubled.get()), 42);

    handle.dispose();
    count.set(1);
    assert_eq!(observed.get(), 42);
    assert_eq!(count.runtime(), &Runtime::current());
}

/// Dropping every handle frees the graph.
#[test]
fn dropping_handles_frees_nodes() {
    let runtime = Runtime::new();
    {
        let a = runtime.signal(1);
        let a1 = a.clone();
        let b = runtime.computed(move || a1.get() + 1);
        assert_eq!(b.get(), 2);
        assert_eq!(runtime.node_count(), 2);
    }
    assert_eq!(runtime.node_count(), 0);
}
