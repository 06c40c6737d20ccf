//! Abstract syntax trees for the ChiSQL compiler front-end.
//!
//! Three tree families live here, all plain sum types with exclusive
//! parent-to-child ownership:
//!
//! - [`Expr`]: the expression sub-language shared by queries and DDL/DML.
//! - [`SraNode`]: *Sugared Relational Algebra*, the parser's output for
//!   queries. It mirrors SQL's surface conveniences (join kinds, wildcard
//!   projections, inline aliases).
//! - [`RaNode`]: *Relational Algebra*, the minimal operator core the
//!   desugarer lowers SRA onto.
//!
//! Non-query statements ([`CreateTableStatement`], [`InsertStatement`],
//! [`DeleteStatement`]) are defined in [`stmt`].
//!
//! Every type implements `Display` rendering SQL text (see [`display`]), so
//! `parse(sql).to_string()` re-parses to a structurally equal tree. The
//! deterministic prefix tree form used as the canonical test observable lives
//! in [`tree`].

pub mod display;
pub mod expr;
pub mod ra;
pub mod sra;
pub mod stmt;
pub mod tree;

use std::fmt;

pub use expr::{AggregateFunc, BinaryOp, ColumnRef, Expr, Literal, Subquery, UnaryOp};
pub use ra::{OuterJoinKind, RaNode};
pub use sra::{JoinConstraint, JoinKind, ProjectItem, SetOpKind, SortDirection, SraNode};
pub use stmt::{
    ColumnConstraint, ColumnDef, CreateTableStatement, DeleteStatement, InsertStatement, Statement,
    TableKey, TypeName,
};
pub use tree::TreeForm;

// ---------------------------------------------------------------------------
// Span — source location tracking
// ---------------------------------------------------------------------------

/// A byte-offset range into the original SQL source text.
///
/// Tree nodes do not carry spans (structural equality of lowered trees is a
/// contract of the desugarer); tokens and diagnostics do.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Byte offset of the first character (inclusive).
    pub start: u32,
    /// Byte offset one past the last character (exclusive).
    pub end: u32,
}

impl Span {
    /// Create a new span from start (inclusive) to end (exclusive) offsets.
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// A zero-length span at position 0, used as a placeholder.
    pub const ZERO: Self = Self { start: 0, end: 0 };

    /// Merge two spans into one that covers both.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        let start = if self.start < other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end > other.end {
            self.end
        } else {
            other.end
        };
        Self { start, end }
    }

    /// Length in bytes.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.end - self.start
    }

    /// Whether the span is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_merge_covers_both() {
        let a = Span::new(2, 5);
        let b = Span::new(4, 9);
        assert_eq!(a.merge(b), Span::new(2, 9));
        assert_eq!(b.merge(a), Span::new(2, 9));
    }

    #[test]
    fn span_len_and_empty() {
        assert_eq!(Span::new(3, 7).len(), 4);
        assert!(Span::ZERO.is_empty());
        assert!(!Span::new(0, 1).is_empty());
    }
}
