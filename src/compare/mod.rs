//! # Value Comparison
//!
//! Equality and ordering over [`Value`], defined by [`TypeWeight`] first and
//! structure second.
//!
//! ## Rules
//!
//! | Operands | Decided by |
//! |----------|------------|
//! | different type weights | weight order (`null < bool < number < string < array < object`) |
//! | two arrays / two objects | first decisive member in [`KeySet`] order |
//! | two strings | the configured [`Collator`] |
//! | other scalars | native order (`false < true`) |
//!
//! The ordered operators are evaluated with a three-state recursion: a member
//! pair is either decisive (`Some(bool)`) or tied (`None`). When every member
//! ties, the operator falls back to its tie result, which is why `a <= b` and
//! `a >= b` both hold for equal values while `a < b` and `a > b` do not.
//!
//! None of these functions fail. Wrong operand shapes degrade to `false`.

pub mod example;
pub mod keyset;
pub mod quantifier;

pub use example::{as_example_list, filter_by_example, is_unrestricted, matches, matches_index};
pub use keyset::KeySet;
pub use quantifier::{Quantifier, RelationalOp};

use std::cmp::Ordering;

use crate::model::{TypeWeight, Value};

// ============================================================================
// Collation
// ============================================================================

/// String ordering used for equal-weight string operands.
pub trait Collator: Send + Sync {
    fn compare(&self, lhs: &str, rhs: &str) -> Ordering;
}

/// Byte-wise string order.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCollator;

impl Collator for BinaryCollator {
    fn compare(&self, lhs: &str, rhs: &str) -> Ordering {
        lhs.as_bytes().cmp(rhs.as_bytes())
    }
}

impl<F> Collator for F
where
    F: Fn(&str, &str) -> Ordering + Send + Sync,
{
    fn compare(&self, lhs: &str, rhs: &str) -> Ordering {
        self(lhs, rhs)
    }
}

// ============================================================================
// Comparator
// ============================================================================

/// Relational operators over values, parameterized by string collation.
#[derive(Debug, Clone, Default)]
pub struct Comparator<C = BinaryCollator> {
    collator: C,
}

impl Comparator<BinaryCollator> {
    pub fn new() -> Self {
        Self { collator: BinaryCollator }
    }
}

impl<C: Collator> Comparator<C> {
    pub fn with_collator(collator: C) -> Self {
        Self { collator }
    }

    pub fn equal(&self, lhs: &Value, rhs: &Value) -> bool {
        self.cmp(lhs, rhs) == Ordering::Equal
    }

    pub fn unequal(&self, lhs: &Value, rhs: &Value) -> bool {
        !self.equal(lhs, rhs)
    }

    pub fn less(&self, lhs: &Value, rhs: &Value) -> bool {
        self.ordered(lhs, rhs, RelationalOp::Less)
    }

    pub fn less_equal(&self, lhs: &Value, rhs: &Value) -> bool {
        self.ordered(lhs, rhs, RelationalOp::LessEqual)
    }

    pub fn greater(&self, lhs: &Value, rhs: &Value) -> bool {
        self.ordered(lhs, rhs, RelationalOp::Greater)
    }

    pub fn greater_equal(&self, lhs: &Value, rhs: &Value) -> bool {
        self.ordered(lhs, rhs, RelationalOp::GreaterEqual)
    }

    /// Total three-way comparison.
    pub fn cmp(&self, lhs: &Value, rhs: &Value) -> Ordering {
        let (lw, rw) = (lhs.type_weight(), rhs.type_weight());
        if lw != rw {
            return lw.cmp(&rw);
        }
        if lw.is_container() {
            return KeySet::of(lhs, rhs)
                .members(lhs, rhs)
                .into_iter()
                .map(|(l, r)| self.cmp(l, r))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal);
        }
        self.scalar_cmp(lhs, rhs)
    }

    /// `needle IN haystack`. A non-array haystack is a type mismatch.
    pub fn contains(&self, needle: &Value, haystack: &Value) -> bool {
        let Some(items) = haystack.as_array() else {
            tracing::warn!(got = haystack.type_name(), "IN expects an array operand");
            return false;
        };
        items.iter().any(|item| self.equal(needle, item))
    }

    /// `needle NOT IN haystack`.
    pub fn not_contains(&self, needle: &Value, haystack: &Value) -> bool {
        !self.contains(needle, haystack)
    }

    /// Apply any relational operator.
    pub fn apply(&self, op: RelationalOp, lhs: &Value, rhs: &Value) -> bool {
        match op {
            RelationalOp::Equal => self.equal(lhs, rhs),
            RelationalOp::Unequal => self.unequal(lhs, rhs),
            RelationalOp::In => self.contains(lhs, rhs),
            RelationalOp::NotIn => self.not_contains(lhs, rhs),
            ordered => self.ordered(lhs, rhs, ordered),
        }
    }

    /// `lhs <quantifier> <op> rhs`, e.g. `[1, 2] ALL < 3`.
    ///
    /// The number of elements of `lhs` satisfying `op` against `rhs` must lie
    /// within [`Quantifier::bounds`]. Evaluation stops as soon as the outcome
    /// is fixed. An empty `lhs` satisfies `ALL` and `NONE` but not `ANY`.
    pub fn quantified(
        &self,
        lhs: &Value,
        rhs: &Value,
        quantifier: Quantifier,
        op: RelationalOp,
    ) -> bool {
        let Some(items) = lhs.as_array() else {
            return false;
        };
        let n = items.len();
        if n == 0 {
            return quantifier != Quantifier::Any;
        }
        let (min, max) = quantifier.bounds(n);
        let mut hits = 0;
        for (i, item) in items.iter().enumerate() {
            if self.apply(op, item, rhs) {
                hits += 1;
                if hits > max {
                    return false;
                }
                if hits >= min && quantifier == Quantifier::Any {
                    return true;
                }
            } else if hits + (n - i - 1) < min {
                return false;
            }
        }
        (min..=max).contains(&hits)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn ordered(&self, lhs: &Value, rhs: &Value, op: RelationalOp) -> bool {
        self.decide(lhs, rhs, op).unwrap_or_else(|| op.on_tie())
    }

    /// Three-state recursion: `None` when the operands tie.
    fn decide(&self, lhs: &Value, rhs: &Value, op: RelationalOp) -> Option<bool> {
        let (lw, rw) = (lhs.type_weight(), rhs.type_weight());
        if lw != rw {
            return Some(op.holds(lw.cmp(&rw)));
        }
        if lw.is_container() {
            return KeySet::of(lhs, rhs)
                .members(lhs, rhs)
                .into_iter()
                .find_map(|(l, r)| self.decide(l, r, op));
        }
        match self.scalar_cmp(lhs, rhs) {
            Ordering::Equal => None,
            ord => Some(op.holds(ord)),
        }
    }

    /// Ordering of two scalars of the same weight.
    fn scalar_cmp(&self, lhs: &Value, rhs: &Value) -> Ordering {
        match (lhs, rhs) {
            (Value::Bool(l), Value::Bool(r)) => l.cmp(r),
            (Value::Number(l), Value::Number(r)) => l.partial_cmp(r).unwrap_or(Ordering::Equal),
            (Value::String(l), Value::String(r)) => self.collator.compare(l, r),
            _ => {
                debug_assert_eq!(lhs.type_weight(), TypeWeight::Null);
                Ordering::Equal
            }
        }
    }
}

// ============================================================================
// Free functions (binary collation)
// ============================================================================

pub fn equal(lhs: &Value, rhs: &Value) -> bool {
    Comparator::new().equal(lhs, rhs)
}

pub fn unequal(lhs: &Value, rhs: &Value) -> bool {
    Comparator::new().unequal(lhs, rhs)
}

pub fn less(lhs: &Value, rhs: &Value) -> bool {
    Comparator::new().less(lhs, rhs)
}

pub fn less_equal(lhs: &Value, rhs: &Value) -> bool {
    Comparator::new().less_equal(lhs, rhs)
}

pub fn greater(lhs: &Value, rhs: &Value) -> bool {
    Comparator::new().greater(lhs, rhs)
}

pub fn greater_equal(lhs: &Value, rhs: &Value) -> bool {
    Comparator::new().greater_equal(lhs, rhs)
}

pub fn compare(lhs: &Value, rhs: &Value) -> Ordering {
    Comparator::new().cmp(lhs, rhs)
}

pub fn contains(needle: &Value, haystack: &Value) -> bool {
    Comparator::new().contains(needle, haystack)
}

pub fn not_contains(needle: &Value, haystack: &Value) -> bool {
    Comparator::new().not_contains(needle, haystack)
}

pub fn quantified(lhs: &Value, rhs: &Value, quantifier: Quantifier, op: RelationalOp) -> bool {
    Comparator::new().quantified(lhs, rhs, quantifier, op)
}
