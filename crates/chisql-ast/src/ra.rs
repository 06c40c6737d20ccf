//! Relational Algebra: the desugarer's output.
//!
//! A deliberately minimal operator core: Pi (project), Sigma (select), Cross
//! (Cartesian product), Rho (rename an expression to an attribute name),
//! RhoTable (rename a relation), plus set operations. Two extensions cover
//! what the core cannot express: a marked outer-join node preserving
//! null-padding semantics for a later stage, and an ordering decoration
//! wrapper (no native RA sort operator exists).
//!
//! The outermost `Pi` emitted for any projection holds only column
//! references; computation reaches an attribute list solely through the raw
//! item `Pi` produced during alias lifting, with a `Rho` above it naming each
//! computed attribute.

use crate::expr::{ColumnRef, Expr};
use crate::sra::{SetOpKind, SortDirection};

/// The side(s) of an outer join that null-pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OuterJoinKind {
    Left,
    Right,
    Full,
}

/// A relational algebra node.
#[derive(Debug, Clone, PartialEq)]
pub enum RaNode {
    /// A base table leaf.
    Table(String),

    /// Projection onto an ordered attribute list.
    Pi {
        attrs: Vec<Expr>,
        child: Box<RaNode>,
        distinct: bool,
    },

    /// Selection by a predicate.
    Sigma {
        predicate: Expr,
        child: Box<RaNode>,
    },

    /// Cartesian product.
    Cross { left: Box<RaNode>, right: Box<RaNode> },

    /// Renames one computed expression to a target attribute name.
    Rho {
        expr: Expr,
        name: String,
        child: Box<RaNode>,
    },

    /// Renames the relation as a whole.
    RhoTable { alias: String, child: Box<RaNode> },

    /// Marked outer-join construct: a Cross tagged with null-padding
    /// semantics on the appropriate side. Evaluation belongs to a later
    /// stage; the front-end only preserves kind and condition.
    OuterJoin {
        kind: OuterJoinKind,
        condition: Option<Expr>,
        left: Box<RaNode>,
        right: Box<RaNode>,
    },

    /// Ordering decoration. Chained nodes, outermost = primary key.
    OrderBy {
        column: ColumnRef,
        direction: SortDirection,
        child: Box<RaNode>,
    },

    /// UNION / INTERSECT / EXCEPT.
    SetOp {
        kind: SetOpKind,
        left: Box<RaNode>,
        right: Box<RaNode>,
    },
}

impl RaNode {
    /// Shorthand for a projection without DISTINCT.
    #[must_use]
    pub fn pi(attrs: Vec<Expr>, child: Self) -> Self {
        Self::Pi {
            attrs,
            child: Box::new(child),
            distinct: false,
        }
    }

    /// Shorthand for a selection.
    #[must_use]
    pub fn sigma(predicate: Expr, child: Self) -> Self {
        Self::Sigma {
            predicate,
            child: Box::new(child),
        }
    }

    /// Shorthand for a Cartesian product.
    #[must_use]
    pub fn cross(left: Self, right: Self) -> Self {
        Self::Cross {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Shorthand for an expression rename.
    #[must_use]
    pub fn rho(expr: Expr, name: impl Into<String>, child: Self) -> Self {
        Self::Rho {
            expr,
            name: name.into(),
            child: Box::new(child),
        }
    }

    /// Shorthand for a relation rename.
    #[must_use]
    pub fn rho_table(alias: impl Into<String>, child: Self) -> Self {
        Self::RhoTable {
            alias: alias.into(),
            child: Box::new(child),
        }
    }
}
