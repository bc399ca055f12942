//! Write equality.
//!
//! A write that stores a value equal to the current one is dropped before
//! any dependent is notified. Equality follows the SameValue algorithm
//! (`Object.is`): floats compare by bit pattern except that every NaN
//! equals every other NaN, so `0.0` and `-0.0` are different values and a
//! repeated NaN write is a no-op.
//!
//! Shared pointers compare by identity. Owned collections compare by
//! contents.

use std::borrow::Cow;
use std::rc::Rc;

/// Equality used to decide whether a write changes a signal.
pub trait SameValue {
    fn same_value(&self, other: &Self) -> bool;
}

macro_rules! same_value_by_eq {
    ($($t:ty),* $(,)?) => {
        $(
            impl SameValue for $t {
                #[inline]
                fn same_value(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

same_value_by_eq!(
    (), bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, String, str,
);

impl SameValue for f64 {
    fn same_value(&self, other: &Self) -> bool {
        (self.is_nan() && other.is_nan()) || self.to_bits() == other.to_bits()
    }
}

impl SameValue for f32 {
    fn same_value(&self, other: &Self) -> bool {
        (self.is_nan() && other.is_nan()) || self.to_bits() == other.to_bits()
    }
}

impl<T: SameValue + ?Sized> SameValue for &T {
    fn same_value(&self, other: &Self) -> bool {
        (**self).same_value(*other)
    }
}

impl<T: SameValue + ?Sized> SameValue for Box<T> {
    fn same_value(&self, other: &Self) -> bool {
        (**self).same_value(&**other)
    }
}

impl<T: ?Sized> SameValue for Rc<T> {
    fn same_value(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(self), Rc::as_ptr(other))
    }
}

impl<T: SameValue + ToOwned + ?Sized> SameValue for Cow<'_, T> {
    fn same_value(&self, other: &Self) -> bool {
        (**self).same_value(&**other)
    }
}

impl<T: SameValue> SameValue for Option<T> {
    fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same_value(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: SameValue> SameValue for [T] {
    fn same_value(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.same_value(b))
    }
}

impl<T: SameValue> SameValue for Vec<T> {
    fn same_value(&self, other: &Self) -> bool {
        self.as_slice().same_value(other.as_slice())
    }
}

impl<A: SameValue, B: SameValue> SameValue for (A, B) {
    fn same_value(&self, other: &Self) -> bool {
        self.0.same_value(&other.0) && self.1.same_value(&other.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_is_the_same_as_nan() {
        assert!(f64::NAN.same_value(&f64::NAN));
        assert!(f64::NAN.same_value(&-f64::NAN));
        assert!(f32::NAN.same_value(&f32::NAN));
    }

    #[test]
    fn signed_zeros_differ() {
        assert!(!0.0_f64.same_value(&-0.0));
        assert!((-0.0_f64).same_value(&-0.0));
        assert!(1.5_f64.same_value(&1.5));
    }

    #[test]
    fn rc_compares_by_identity() {
        let a = Rc::new(5);
        let b = Rc::new(5);
        assert!(a.same_value(&Rc::clone(&a)));
        assert!(!a.same_value(&b));
    }

    #[test]
    fn collections_compare_elementwise() {
        assert!(vec![1.0, f64::NAN].same_value(&vec![1.0, f64::NAN]));
        assert!(!vec![0.0].same_value(&vec![-0.0]));
        assert!(Some("x".to_string()).same_value(&Some("x".to_string())));
        assert!(!Some(1).same_value(&None));
    }
}
