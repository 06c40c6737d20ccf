//! Sugared Relational Algebra: the parser's query output.
//!
//! SRA keeps SQL's surface conveniences intact: multi-way joins by kind,
//! wildcard projection items, inline table aliases. The desugarer rewrites
//! all of these away; see `chisql-desugar`.

use crate::expr::{ColumnRef, Expr};

/// A single item in a projection list.
///
/// Item order is preserved: it determines output column order and is
/// observable through the lowered `Pi` attribute list.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectItem {
    /// A bare `*`.
    Star,
    /// A qualified `table.*`.
    TableStar(String),
    /// An arbitrary expression, optionally aliased (`expr AS alias`).
    Expr { expr: Expr, alias: Option<String> },
}

/// The flavour of a join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Cross,
    LeftOuter,
    RightOuter,
    FullOuter,
    Natural,
}

/// The join condition as written: `ON expr` or `USING (cols)`.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinConstraint {
    On(Expr),
    Using(Vec<String>),
}

/// Set operation kinds. All parse left-associatively at equal precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOpKind {
    Union,
    Intersect,
    Except,
}

/// Sort direction for `ORDER BY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A sugared relational algebra node.
#[derive(Debug, Clone, PartialEq)]
pub enum SraNode {
    /// A base table, optionally given a local alias.
    Table { name: String, alias: Option<String> },

    /// Projection. `group_by`, `having`, and `limit` are recorded as
    /// annotations; lowering them is deferred to a later stage.
    Project {
        items: Vec<ProjectItem>,
        child: Box<SraNode>,
        distinct: bool,
        group_by: Vec<Expr>,
        having: Option<Expr>,
        limit: Option<u64>,
    },

    /// Relational selection (WHERE).
    Select {
        predicate: Expr,
        child: Box<SraNode>,
    },

    /// A join of any kind. Operand order is meaningful for outer joins.
    Join {
        kind: JoinKind,
        left: Box<SraNode>,
        right: Box<SraNode>,
        constraint: Option<JoinConstraint>,
    },

    /// A single ordering key. Multiple keys chain, outermost = primary.
    OrderBy {
        column: ColumnRef,
        direction: SortDirection,
        child: Box<SraNode>,
    },

    /// UNION / INTERSECT / EXCEPT.
    SetOp {
        kind: SetOpKind,
        left: Box<SraNode>,
        right: Box<SraNode>,
    },
}

impl SraNode {
    /// Shorthand for an unaliased table leaf.
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self::Table {
            name: name.into(),
            alias: None,
        }
    }

    /// Shorthand for an aliased table leaf.
    #[must_use]
    pub fn aliased_table(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::Table {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    /// Shorthand for a projection with no annotations.
    #[must_use]
    pub fn project(items: Vec<ProjectItem>, child: Self) -> Self {
        Self::Project {
            items,
            child: Box::new(child),
            distinct: false,
            group_by: Vec::new(),
            having: None,
            limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::BinaryOp;

    #[test]
    fn projection_item_order_is_observable() {
        let a = SraNode::project(
            vec![
                ProjectItem::Star,
                ProjectItem::Expr {
                    expr: Expr::column("x"),
                    alias: None,
                },
            ],
            SraNode::table("t"),
        );
        let b = SraNode::project(
            vec![
                ProjectItem::Expr {
                    expr: Expr::column("x"),
                    alias: None,
                },
                ProjectItem::Star,
            ],
            SraNode::table("t"),
        );
        assert_ne!(a, b);
    }

    #[test]
    fn join_operand_order_is_meaningful() {
        let lr = SraNode::Join {
            kind: JoinKind::LeftOuter,
            left: Box::new(SraNode::table("l")),
            right: Box::new(SraNode::table("r")),
            constraint: Some(JoinConstraint::On(Expr::binary(
                BinaryOp::Eq,
                Expr::qualified_column("l", "k"),
                Expr::qualified_column("r", "k"),
            ))),
        };
        let rl = SraNode::Join {
            kind: JoinKind::LeftOuter,
            left: Box::new(SraNode::table("r")),
            right: Box::new(SraNode::table("l")),
            constraint: Some(JoinConstraint::On(Expr::binary(
                BinaryOp::Eq,
                Expr::qualified_column("l", "k"),
                Expr::qualified_column("r", "k"),
            ))),
        };
        assert_ne!(lr, rl);
    }
}
