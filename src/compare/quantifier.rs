//! Array quantifiers and relational operators.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How many elements of the left-hand array must satisfy the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantifier {
    None,
    All,
    Any,
}

impl Quantifier {
    /// Inclusive `[min, max]` bound on the match count for `n` elements.
    pub fn bounds(self, n: usize) -> (usize, usize) {
        match self {
            Quantifier::None => (0, 0),
            Quantifier::All => (n, n),
            Quantifier::Any => (usize::from(n > 0), n),
        }
    }
}

/// Binary relational operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationalOp {
    Equal,
    Unequal,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    In,
    NotIn,
}

impl RelationalOp {
    /// Whether an ordering between the operands satisfies the operator.
    /// Membership operators are not decided by an ordering and yield `false`.
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            RelationalOp::Equal => ordering == Ordering::Equal,
            RelationalOp::Unequal => ordering != Ordering::Equal,
            RelationalOp::Less => ordering == Ordering::Less,
            RelationalOp::LessEqual => ordering != Ordering::Greater,
            RelationalOp::Greater => ordering == Ordering::Greater,
            RelationalOp::GreaterEqual => ordering != Ordering::Less,
            RelationalOp::In | RelationalOp::NotIn => false,
        }
    }

    /// Result when every member of two containers tied.
    pub fn on_tie(self) -> bool {
        self.holds(Ordering::Equal)
    }
}

impl fmt::Display for RelationalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RelationalOp::Equal => "==",
            RelationalOp::Unequal => "!=",
            RelationalOp::Less => "<",
            RelationalOp::LessEqual => "<=",
            RelationalOp::Greater => ">",
            RelationalOp::GreaterEqual => ">=",
            RelationalOp::In => "IN",
            RelationalOp::NotIn => "NOT IN",
        })
    }
}
