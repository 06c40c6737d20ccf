//! Deterministic prefix tree rendering for SRA and RA.
//!
//! The canonical observable of both algebras: an operator name followed by a
//! parenthesized argument list, e.g.
//!
//! ```text
//! Project([*, (Add(x, y), z)], Table(t))
//! Pi([w, x, y, z], Rho(Add(x, y), z, Pi([w, x, y, Add(x, y)], RATable(t))))
//! ```
//!
//! The rendering is total and injective up to formatting: two trees print
//! identically exactly when they are structurally equal.

#[allow(clippy::wildcard_imports)]
use crate::*;
use std::fmt;

/// Types that render in the prefix tree form.
pub trait TreeForm {
    /// Write the prefix form of `self`.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    /// Display adapter: `println!("{}", node.tree())`.
    fn tree(&self) -> TreeDisplay<'_, Self>
    where
        Self: Sized,
    {
        TreeDisplay(self)
    }
}

/// Borrowing `Display` wrapper returned by [`TreeForm::tree`].
pub struct TreeDisplay<'a, T: ?Sized>(&'a T);

impl<T: TreeForm + ?Sized> fmt::Display for TreeDisplay<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_tree(f)
    }
}

// ---------------------------------------------------------------------------
// Expr
// ---------------------------------------------------------------------------

/// Column references print raw in the tree form (no SQL identifier quoting,
/// so synthesized names like `Add(x, y)` stay readable).
fn fmt_col(f: &mut fmt::Formatter<'_>, col: &ColumnRef) -> fmt::Result {
    if let Some(ref t) = col.table {
        write!(f, "{t}.")?;
    }
    f.write_str(&col.column)
}

impl TreeForm for Expr {
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::Column(col) => fmt_col(f, col),
            Self::Binary { op, left, right } => {
                let name = match op {
                    BinaryOp::Add => "Add",
                    BinaryOp::Sub => "Sub",
                    BinaryOp::Mul => "Mul",
                    BinaryOp::Div => "Div",
                    BinaryOp::Eq => "Eq",
                    BinaryOp::Ne => "Ne",
                    BinaryOp::Lt => "Lt",
                    BinaryOp::Gt => "Gt",
                    BinaryOp::Le => "Le",
                    BinaryOp::Ge => "Ge",
                    BinaryOp::And => "And",
                    BinaryOp::Or => "Or",
                };
                write!(f, "{name}({}, {})", left.tree(), right.tree())
            }
            Self::Unary { op, expr } => {
                let name = match op {
                    UnaryOp::Neg => "Neg",
                    UnaryOp::Not => "Not",
                };
                write!(f, "{name}({})", expr.tree())
            }
            Self::InSubquery { expr, query } => match query.as_ref() {
                Subquery::Sugared(sra) => write!(f, "In({}, {})", expr.tree(), sra.tree()),
                Subquery::Lowered(ra) => write!(f, "In({}, {})", expr.tree(), ra.tree()),
            },
            Self::Aggregate { func, arg } => {
                let name = match func {
                    AggregateFunc::Count => "Count",
                    AggregateFunc::Sum => "Sum",
                    AggregateFunc::Avg => "Avg",
                    AggregateFunc::Min => "Min",
                    AggregateFunc::Max => "Max",
                };
                write!(f, "{name}({})", arg.tree())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SRA
// ---------------------------------------------------------------------------

impl TreeForm for ProjectItem {
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Star => f.write_str("*"),
            Self::TableStar(t) => write!(f, "{t}.*"),
            Self::Expr { expr, alias: None } => expr.fmt_tree(f),
            Self::Expr {
                expr,
                alias: Some(a),
            } => write!(f, "({}, {a})", expr.tree()),
        }
    }
}

fn fmt_tree_list<T: TreeForm>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        item.fmt_tree(f)?;
    }
    f.write_str("]")
}

const fn set_op_name(kind: SetOpKind) -> &'static str {
    match kind {
        SetOpKind::Union => "Union",
        SetOpKind::Intersect => "Intersect",
        SetOpKind::Except => "Except",
    }
}

const fn direction_name(dir: SortDirection) -> &'static str {
    match dir {
        SortDirection::Asc => "asc",
        SortDirection::Desc => "desc",
    }
}

impl TreeForm for SraNode {
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table { name, alias: None } => write!(f, "Table({name})"),
            Self::Table {
                name,
                alias: Some(a),
            } => write!(f, "Table({name}, {a})"),
            Self::Project {
                items,
                child,
                distinct,
                group_by,
                having,
                limit,
            } => {
                f.write_str("Project(")?;
                if *distinct {
                    f.write_str("distinct, ")?;
                }
                fmt_tree_list(f, items)?;
                write!(f, ", {}", child.tree())?;
                if !group_by.is_empty() {
                    f.write_str(", groupby=")?;
                    fmt_tree_list(f, group_by)?;
                }
                if let Some(h) = having {
                    write!(f, ", having={}", h.tree())?;
                }
                if let Some(n) = limit {
                    write!(f, ", limit={n}")?;
                }
                f.write_str(")")
            }
            Self::Select { predicate, child } => {
                write!(f, "Select({}, {})", predicate.tree(), child.tree())
            }
            Self::Join {
                kind,
                left,
                right,
                constraint,
            } => {
                let name = match kind {
                    JoinKind::Inner => "inner",
                    JoinKind::Cross => "cross",
                    JoinKind::LeftOuter => "left",
                    JoinKind::RightOuter => "right",
                    JoinKind::FullOuter => "full",
                    JoinKind::Natural => "natural",
                };
                write!(f, "Join({name}, {}, {}", left.tree(), right.tree())?;
                match constraint {
                    Some(JoinConstraint::On(e)) => write!(f, ", {}", e.tree())?,
                    Some(JoinConstraint::Using(cols)) => {
                        write!(f, ", using({})", cols.join(", "))?;
                    }
                    None => {}
                }
                f.write_str(")")
            }
            Self::OrderBy {
                column,
                direction,
                child,
            } => {
                f.write_str("OrderBy(")?;
                fmt_col(f, column)?;
                write!(f, ", {}, {})", direction_name(*direction), child.tree())
            }
            Self::SetOp { kind, left, right } => {
                write!(f, "{}({}, {})", set_op_name(*kind), left.tree(), right.tree())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// RA
// ---------------------------------------------------------------------------

impl TreeForm for RaNode {
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(name) => write!(f, "RATable({name})"),
            Self::Pi {
                attrs,
                child,
                distinct,
            } => {
                f.write_str("Pi(")?;
                if *distinct {
                    f.write_str("distinct, ")?;
                }
                fmt_tree_list(f, attrs)?;
                write!(f, ", {})", child.tree())
            }
            Self::Sigma { predicate, child } => {
                write!(f, "Sigma({}, {})", predicate.tree(), child.tree())
            }
            Self::Cross { left, right } => {
                write!(f, "Cross({}, {})", left.tree(), right.tree())
            }
            Self::Rho { expr, name, child } => {
                write!(f, "Rho({}, {name}, {})", expr.tree(), child.tree())
            }
            Self::RhoTable { alias, child } => {
                write!(f, "RhoTable({alias}, {})", child.tree())
            }
            Self::OuterJoin {
                kind,
                condition,
                left,
                right,
            } => {
                let name = match kind {
                    OuterJoinKind::Left => "left",
                    OuterJoinKind::Right => "right",
                    OuterJoinKind::Full => "full",
                };
                write!(f, "OuterJoin({name}, {}, {}", left.tree(), right.tree())?;
                if let Some(c) = condition {
                    write!(f, ", {}", c.tree())?;
                }
                f.write_str(")")
            }
            Self::OrderBy {
                column,
                direction,
                child,
            } => {
                f.write_str("OrderBy(")?;
                fmt_col(f, column)?;
                write!(f, ", {}, {})", direction_name(*direction), child.tree())
            }
            Self::SetOp { kind, left, right } => {
                write!(f, "{}({}, {})", set_op_name(*kind), left.tree(), right.tree())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

impl TreeForm for Statement {
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query(q) => q.fmt_tree(f),
            Self::CreateTable(s) => {
                write!(f, "CreateTable({}, [", s.name)?;
                for (i, col) in s.columns.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{col}")?;
                }
                f.write_str("]")?;
                for key in &s.keys {
                    write!(f, ", {key}")?;
                }
                f.write_str(")")
            }
            Self::Insert(s) => {
                write!(f, "Insert({}", s.table)?;
                if let Some(cols) = &s.columns {
                    write!(f, ", [{}]", cols.join(", "))?;
                }
                f.write_str(", [")?;
                for (i, v) in s.values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("])")
            }
            Self::Delete(s) => {
                write!(f, "Delete({}", s.table)?;
                if let Some(p) = &s.predicate {
                    write!(f, ", {}", p.tree())?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::BinaryOp;

    #[test]
    fn sra_tree_matches_expected_shape() {
        let sra = SraNode::project(
            vec![
                ProjectItem::Star,
                ProjectItem::Expr {
                    expr: Expr::binary(BinaryOp::Add, Expr::column("x"), Expr::column("y")),
                    alias: Some("z".into()),
                },
            ],
            SraNode::table("t"),
        );
        assert_eq!(
            sra.tree().to_string(),
            "Project([*, (Add(x, y), z)], Table(t))"
        );
    }

    #[test]
    fn ra_tree_matches_expected_shape() {
        let add = Expr::binary(BinaryOp::Add, Expr::column("x"), Expr::column("y"));
        let ra = RaNode::pi(
            vec![
                Expr::column("w"),
                Expr::column("x"),
                Expr::column("y"),
                Expr::column("z"),
            ],
            RaNode::rho(
                add.clone(),
                "z",
                RaNode::pi(
                    vec![
                        Expr::column("w"),
                        Expr::column("x"),
                        Expr::column("y"),
                        add,
                    ],
                    RaNode::Table("t".into()),
                ),
            ),
        );
        assert_eq!(
            ra.tree().to_string(),
            "Pi([w, x, y, z], Rho(Add(x, y), z, Pi([w, x, y, Add(x, y)], RATable(t))))"
        );
    }

    #[test]
    fn tree_form_is_injective_on_distinct_flag() {
        let plain = RaNode::pi(vec![Expr::column("a")], RaNode::Table("t".into()));
        let distinct = RaNode::Pi {
            attrs: vec![Expr::column("a")],
            child: Box::new(RaNode::Table("t".into())),
            distinct: true,
        };
        assert_ne!(plain.tree().to_string(), distinct.tree().to_string());
    }

    #[test]
    fn delete_tree_form() {
        let stmt = Statement::Delete(DeleteStatement {
            table: "t".into(),
            predicate: Some(Expr::binary(
                BinaryOp::Gt,
                Expr::column("x"),
                Expr::Literal(Literal::Int(3)),
            )),
        });
        assert_eq!(stmt.tree().to_string(), "Delete(t, Gt(x, 3))");
    }
}
