//! Numerical tolerance and float comparisons.

use std::cmp::Ordering;

/// The default tolerance for every geometric decision in this crate.
///
/// Two `y` values closer than this are considered tied, a determinant
/// smaller than this marks two lines as parallel, and an intersection may
/// overshoot a segment's horizontal extent by this much. Every function that
/// makes such a decision takes an explicit `eps` argument; this is the value
/// the convenience entry points pass.
pub const EPS: f64 = 1e-9;

/// Are `a` and `b` within `eps` of one another?
#[inline]
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

/// Compares two floats exactly.
///
/// NaN compares equal to everything. Scenes reject NaN up front, so this only
/// keeps sorting from panicking on garbage; it doesn't give a useful order.
#[inline]
pub fn cmp_floats(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// An `f64` that can be used as a key in ordered collections.
///
/// The order is [`cmp_floats`], so this is only a total order on non-NaN values.
#[derive(Debug, Clone, Copy)]
pub struct CheapOrderedFloat(f64);

impl CheapOrderedFloat {
    /// Retrieve the inner `f64`.
    pub fn into_inner(self) -> f64 {
        self.0
    }
}

impl From<f64> for CheapOrderedFloat {
    fn from(value: f64) -> Self {
        CheapOrderedFloat(value)
    }
}

impl PartialEq for CheapOrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CheapOrderedFloat {}

impl PartialOrd for CheapOrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CheapOrderedFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_floats(self.0, other.0)
    }
}
