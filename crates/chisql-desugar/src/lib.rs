//! SRA → RA lowering: wildcard expansion, alias lifting, join elimination.
//!
//! The transformation is a bottom-up recursion parameterised by the injected
//! [`SchemaOracle`]. Each step returns the lowered subtree together with its
//! [`Scope`], the ordered mapping from in-query names to contributed column
//! lists, which the enclosing step uses for wildcard expansion and name
//! synthesis.
//!
//! The output is a pure function of the input tree and the oracle's
//! responses: equal inputs produce structurally equal RA trees, synthesized
//! attribute names included.

pub mod schema;
pub mod scope;

use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chisql_ast::{
    BinaryOp, ColumnRef, Expr, JoinConstraint, JoinKind, OuterJoinKind, ProjectItem, RaNode,
    SraNode, Subquery, TreeForm,
};
use chisql_error::ChiError;

pub use schema::{MemorySchema, SchemaOracle};
pub use scope::{Scope, ScopeSource};

// ---------------------------------------------------------------------------
// Lowering metrics
// ---------------------------------------------------------------------------

/// Monotonic counter of successfully lowered queries.
static CHISQL_QUERIES_LOWERED_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Point-in-time lowering metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DesugarMetricsSnapshot {
    /// Total queries successfully lowered to RA.
    pub chisql_queries_lowered_total: u64,
}

/// Take a point-in-time snapshot of lowering metrics.
#[must_use]
pub fn desugar_metrics_snapshot() -> DesugarMetricsSnapshot {
    DesugarMetricsSnapshot {
        chisql_queries_lowered_total: CHISQL_QUERIES_LOWERED_TOTAL.load(Ordering::Relaxed),
    }
}

/// Reset lowering metrics (used by tests/diagnostics).
pub fn reset_desugar_metrics() {
    CHISQL_QUERIES_LOWERED_TOTAL.store(0, Ordering::Relaxed);
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// A failure during lowering. Aborts only the current statement; the caller
/// moves on to the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesugarError {
    /// A table named in the query is unknown to the schema oracle, or a
    /// `t.*` qualifier names no relation in scope.
    UnknownTable { name: String },
    /// A wildcard expanded against a relation with no columns.
    EmptyWildcard { relation: String },
    /// An unqualified column name is contributed by more than one in-scope
    /// relation.
    AmbiguousColumn { name: String },
    /// A USING column is missing from one of the join operands.
    UsingColumnNotFound { column: String },
    /// A wildcard reference outside a projection list.
    StrayWildcard,
    /// A construct the grammar accepts but lowering does not handle yet.
    Unsupported { what: &'static str },
}

impl fmt::Display for DesugarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTable { name } => write!(f, "no such table: {name}"),
            Self::EmptyWildcard { relation } => {
                write!(f, "wildcard over {relation} expands to no columns")
            }
            Self::AmbiguousColumn { name } => write!(f, "ambiguous column name: {name}"),
            Self::UsingColumnNotFound { column } => {
                write!(f, "USING column {column} is missing from a join operand")
            }
            Self::StrayWildcard => {
                write!(f, "wildcard reference outside a projection list")
            }
            Self::Unsupported { what } => write!(f, "unsupported construct: {what}"),
        }
    }
}

impl Error for DesugarError {}

impl From<DesugarError> for ChiError {
    fn from(e: DesugarError) -> Self {
        match e {
            DesugarError::UnknownTable { name } => Self::UnknownTable { name },
            DesugarError::EmptyWildcard { relation } => Self::EmptyWildcard { relation },
            DesugarError::AmbiguousColumn { name } => Self::AmbiguousColumn { name },
            DesugarError::UsingColumnNotFound { column } => Self::Unsupported {
                what: format!("USING column {column} missing from a join operand"),
            },
            DesugarError::StrayWildcard => {
                Self::Internal("wildcard reference outside a projection list".to_owned())
            }
            DesugarError::Unsupported { what } => Self::Unsupported {
                what: what.to_owned(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Lower a query to pure relational algebra.
///
/// The input is read-only; expressions referenced from more than one output
/// position are cloned, never shared.
pub fn desugar_query(query: &SraNode, schema: &dyn SchemaOracle) -> Result<RaNode, DesugarError> {
    let (ra, _scope) = lower(query, schema)?;
    CHISQL_QUERIES_LOWERED_TOTAL.fetch_add(1, Ordering::Relaxed);
    tracing::debug!(target: "chisql.desugar", "query lowered to relational algebra");
    Ok(ra)
}

// ---------------------------------------------------------------------------
// Node lowering
// ---------------------------------------------------------------------------

fn lower(node: &SraNode, schema: &dyn SchemaOracle) -> Result<(RaNode, Scope), DesugarError> {
    match node {
        SraNode::Table { name, alias } => lower_table(name, alias.as_deref(), schema),

        SraNode::Select { predicate, child } => {
            let (child_ra, scope) = lower(child, schema)?;
            let predicate = lower_expr(predicate, schema)?;
            Ok((RaNode::sigma(predicate, child_ra), scope))
        }

        SraNode::Join {
            kind,
            left,
            right,
            constraint,
        } => lower_join(*kind, left, right, constraint.as_ref(), schema),

        SraNode::Project {
            items,
            child,
            distinct,
            group_by,
            having,
            limit,
        } => {
            if !group_by.is_empty() {
                return Err(DesugarError::Unsupported { what: "GROUP BY" });
            }
            if having.is_some() {
                return Err(DesugarError::Unsupported { what: "HAVING" });
            }
            if limit.is_some() {
                return Err(DesugarError::Unsupported { what: "LIMIT" });
            }
            lower_project(items, child, *distinct, schema)
        }

        SraNode::OrderBy {
            column,
            direction,
            child,
        } => {
            let (child_ra, scope) = lower(child, schema)?;
            Ok((
                RaNode::OrderBy {
                    column: column.clone(),
                    direction: *direction,
                    child: Box::new(child_ra),
                },
                scope,
            ))
        }

        SraNode::SetOp { kind, left, right } => {
            let (left_ra, left_scope) = lower(left, schema)?;
            let (right_ra, _) = lower(right, schema)?;
            // Arity compatibility is not checked here; the result exposes the
            // left operand's columns.
            Ok((
                RaNode::SetOp {
                    kind: *kind,
                    left: Box::new(left_ra),
                    right: Box::new(right_ra),
                },
                left_scope,
            ))
        }
    }
}

fn lower_table(
    name: &str,
    alias: Option<&str>,
    schema: &dyn SchemaOracle,
) -> Result<(RaNode, Scope), DesugarError> {
    let columns = schema
        .columns_of(name)
        .ok_or_else(|| DesugarError::UnknownTable {
            name: name.to_owned(),
        })?;
    let base = RaNode::Table(name.to_owned());
    match alias {
        None => Ok((base, Scope::from_source(name, columns))),
        Some(a) => Ok((RaNode::rho_table(a, base), Scope::from_source(a, columns))),
    }
}

// ---------------------------------------------------------------------------
// Joins
// ---------------------------------------------------------------------------

fn lower_join(
    kind: JoinKind,
    left: &SraNode,
    right: &SraNode,
    constraint: Option<&JoinConstraint>,
    schema: &dyn SchemaOracle,
) -> Result<(RaNode, Scope), DesugarError> {
    let (left_ra, left_scope) = lower(left, schema)?;
    let (right_ra, right_scope) = lower(right, schema)?;

    match kind {
        JoinKind::Cross => Ok((
            RaNode::cross(left_ra, right_ra),
            left_scope.concat(right_scope),
        )),

        JoinKind::Inner => match constraint {
            Some(JoinConstraint::On(c)) => {
                let predicate = lower_expr(c, schema)?;
                Ok((
                    RaNode::sigma(predicate, RaNode::cross(left_ra, right_ra)),
                    left_scope.concat(right_scope),
                ))
            }
            Some(JoinConstraint::Using(cols)) => {
                equi_join(cols, &left_scope, &right_scope, left_ra, right_ra)
            }
            None => Ok((
                RaNode::cross(left_ra, right_ra),
                left_scope.concat(right_scope),
            )),
        },

        JoinKind::Natural => {
            let shared = shared_columns(&left_scope, &right_scope);
            if shared.is_empty() {
                // No common column: a natural join degenerates to a product.
                Ok((
                    RaNode::cross(left_ra, right_ra),
                    left_scope.concat(right_scope),
                ))
            } else {
                equi_join(&shared, &left_scope, &right_scope, left_ra, right_ra)
            }
        }

        JoinKind::LeftOuter | JoinKind::RightOuter | JoinKind::FullOuter => {
            let out_kind = match kind {
                JoinKind::LeftOuter => OuterJoinKind::Left,
                JoinKind::RightOuter => OuterJoinKind::Right,
                _ => OuterJoinKind::Full,
            };
            let condition = match constraint {
                Some(JoinConstraint::On(c)) => Some(lower_expr(c, schema)?),
                Some(JoinConstraint::Using(cols)) => Some(equality_conjunction(
                    cols,
                    &left_scope,
                    &right_scope,
                )?),
                None => None,
            };
            Ok((
                RaNode::OuterJoin {
                    kind: out_kind,
                    condition,
                    left: Box::new(left_ra),
                    right: Box::new(right_ra),
                },
                left_scope.concat(right_scope),
            ))
        }
    }
}

/// Column names common to both scopes, ordered by the left operand's
/// declared order.
fn shared_columns(left: &Scope, right: &Scope) -> Vec<String> {
    let right_names = right.output_names();
    left.output_names()
        .into_iter()
        .filter(|c| right_names.iter().any(|r| r == c))
        .collect()
}

/// The conjunction `L.c = R.c AND ...` over the given columns, folded
/// left-associatively in column order.
fn equality_conjunction(
    columns: &[String],
    left: &Scope,
    right: &Scope,
) -> Result<Expr, DesugarError> {
    let mut conjunction: Option<Expr> = None;
    for col in columns {
        let lhs = left
            .source_of(col)
            .ok_or_else(|| DesugarError::UsingColumnNotFound {
                column: col.clone(),
            })?;
        let rhs = right
            .source_of(col)
            .ok_or_else(|| DesugarError::UsingColumnNotFound {
                column: col.clone(),
            })?;
        let equality = Expr::binary(
            BinaryOp::Eq,
            Expr::qualified_column(lhs.name.clone(), col.clone()),
            Expr::qualified_column(rhs.name.clone(), col.clone()),
        );
        conjunction = Some(match conjunction {
            None => equality,
            Some(acc) => Expr::binary(BinaryOp::And, acc, equality),
        });
    }
    conjunction.ok_or(DesugarError::Unsupported {
        what: "USING with an empty column list",
    })
}

/// Natural/USING join core: project the shared columns once, then the
/// remaining left and right columns in declared order, over an equality
/// selection on the product.
fn equi_join(
    shared: &[String],
    left_scope: &Scope,
    right_scope: &Scope,
    left_ra: RaNode,
    right_ra: RaNode,
) -> Result<(RaNode, Scope), DesugarError> {
    let predicate = equality_conjunction(shared, left_scope, right_scope)?;

    let mut merged: Vec<String> = shared.to_vec();
    for col in left_scope.output_names() {
        if !shared.contains(&col) {
            merged.push(col);
        }
    }
    for col in right_scope.output_names() {
        if !shared.contains(&col) {
            merged.push(col);
        }
    }

    let attrs: Vec<Expr> = merged
        .iter()
        .map(|c| Expr::Column(ColumnRef::bare(c.clone())))
        .collect();
    let ra = RaNode::pi(
        attrs,
        RaNode::sigma(predicate, RaNode::cross(left_ra, right_ra)),
    );
    let scope = left_scope
        .clone()
        .concat(right_scope.clone())
        .with_merged(merged);
    Ok((ra, scope))
}

// ---------------------------------------------------------------------------
// Projection — wildcard expansion and alias lifting
// ---------------------------------------------------------------------------

fn lower_project(
    items: &[ProjectItem],
    child: &SraNode,
    distinct: bool,
    schema: &dyn SchemaOracle,
) -> Result<(RaNode, Scope), DesugarError> {
    let (child_ra, scope) = lower(child, schema)?;

    // 1. Expand wildcards against the child scope.
    let mut expanded: Vec<(Expr, Option<String>)> = Vec::new();
    for item in items {
        match item {
            ProjectItem::Star => {
                for col in scope.expand_star()? {
                    expanded.push((Expr::Column(col), None));
                }
            }
            ProjectItem::TableStar(table) => {
                for col in scope.expand_table_star(table)? {
                    expanded.push((Expr::Column(col), None));
                }
            }
            ProjectItem::Expr { expr, alias } => {
                expanded.push((lower_expr(expr, schema)?, alias.clone()));
            }
        }
    }

    // 2. Split plain references from computed attributes.
    struct Computed {
        expr: Expr,
        name: String,
    }
    let mut computed: Vec<Computed> = Vec::new();
    let mut out_attrs: Vec<Expr> = Vec::new();
    let mut out_names: Vec<String> = Vec::new();
    for (expr, alias) in &expanded {
        match (expr.as_plain_column(), alias) {
            (Some(col), None) => {
                out_attrs.push(expr.clone());
                out_names.push(col.column.clone());
            }
            _ => {
                let name = match alias {
                    Some(a) => a.clone(),
                    None => synthesize_name(expr, &scope, &out_names),
                };
                computed.push(Computed {
                    expr: expr.clone(),
                    name: name.clone(),
                });
                out_attrs.push(Expr::Column(ColumnRef::bare(name.clone())));
                out_names.push(name);
            }
        }
    }

    // 3. Emit. Plain reference lists project directly; computed attributes
    // keep the raw expanded item list in an inner Pi, gain one Rho each
    // (innermost = first listed), and surface through the outer Pi under
    // their attribute names.
    let ra = if computed.is_empty() {
        RaNode::Pi {
            attrs: out_attrs,
            child: Box::new(child_ra),
            distinct,
        }
    } else {
        let raw_attrs: Vec<Expr> = expanded.into_iter().map(|(e, _)| e).collect();
        let mut node = RaNode::pi(raw_attrs, child_ra);
        for c in computed {
            node = RaNode::rho(c.expr, c.name, node);
        }
        RaNode::Pi {
            attrs: out_attrs,
            child: Box::new(node),
            distinct,
        }
    };

    Ok((ra, Scope::from_columns(out_names)))
}

/// Synthesize a deterministic attribute name for an unaliased computed item:
/// the expression's printed prefix form, suffixed on collision with any
/// in-scope attribute or earlier item name.
fn synthesize_name(expr: &Expr, scope: &Scope, taken: &[String]) -> String {
    let base = expr.tree().to_string();
    let collides = |name: &str| scope.contains_attr(name) || taken.iter().any(|t| t == name);
    if !collides(&base) {
        return base;
    }
    let mut n = 2u32;
    loop {
        let candidate = format!("{base}_{n}");
        if !collides(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// Clone an expression into its lowered form: `IN` subqueries are desugared
/// recursively, qualified references are preserved, bare references are left
/// untouched (scope resolution belongs to a later semantic pass). Wildcard
/// references are illegal here; they only live in projection lists and
/// `COUNT(*)`.
fn lower_expr(e: &Expr, schema: &dyn SchemaOracle) -> Result<Expr, DesugarError> {
    match e {
        Expr::Literal(_) => Ok(e.clone()),
        Expr::Column(c) => {
            if c.is_wildcard() {
                return Err(DesugarError::StrayWildcard);
            }
            Ok(e.clone())
        }
        Expr::Binary { op, left, right } => Ok(Expr::Binary {
            op: *op,
            left: Box::new(lower_expr(left, schema)?),
            right: Box::new(lower_expr(right, schema)?),
        }),
        Expr::Unary { op, expr } => Ok(Expr::Unary {
            op: *op,
            expr: Box::new(lower_expr(expr, schema)?),
        }),
        Expr::InSubquery { expr, query } => {
            let lowered = match query.as_ref() {
                Subquery::Sugared(sra) => lower(sra, schema)?.0,
                Subquery::Lowered(ra) => ra.clone(),
            };
            Ok(Expr::InSubquery {
                expr: Box::new(lower_expr(expr, schema)?),
                query: Box::new(Subquery::Lowered(lowered)),
            })
        }
        Expr::Aggregate { func, arg } => {
            // COUNT(*) carries its wildcard argument opaquely.
            let arg = if arg.as_ref() == &Expr::Column(ColumnRef::bare("*")) {
                (**arg).clone()
            } else {
                lower_expr(arg, schema)?
            };
            Ok(Expr::Aggregate {
                func: *func,
                arg: Box::new(arg),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chisql_ast::{SortDirection, SraNode};

    fn schema_tu() -> MemorySchema {
        let mut s = MemorySchema::new();
        s.add_table("T", vec!["a".into(), "b".into()]);
        s.add_table("U", vec!["a".into(), "c".into()]);
        s
    }

    fn tree(ra: &RaNode) -> String {
        ra.tree().to_string()
    }

    #[test]
    fn bare_table_lowers_to_ra_table() {
        let ra = desugar_query(&SraNode::table("T"), &schema_tu()).expect("lowering");
        assert_eq!(tree(&ra), "RATable(T)");
    }

    #[test]
    fn aliased_table_gains_a_rho_table() {
        let ra = desugar_query(&SraNode::aliased_table("T", "x"), &schema_tu()).expect("lowering");
        assert_eq!(tree(&ra), "RhoTable(x, RATable(T))");
    }

    #[test]
    fn unknown_table_is_reported() {
        let err = desugar_query(&SraNode::table("ghost"), &schema_tu()).unwrap_err();
        assert_eq!(
            err,
            DesugarError::UnknownTable {
                name: "ghost".into()
            }
        );
    }

    #[test]
    fn natural_join_matches_the_canonical_equivalence() {
        let join = SraNode::Join {
            kind: JoinKind::Natural,
            left: Box::new(SraNode::table("T")),
            right: Box::new(SraNode::table("U")),
            constraint: None,
        };
        let ra = desugar_query(&join, &schema_tu()).expect("lowering");
        let expected = RaNode::pi(
            vec![Expr::column("a"), Expr::column("b"), Expr::column("c")],
            RaNode::sigma(
                Expr::binary(
                    BinaryOp::Eq,
                    Expr::qualified_column("T", "a"),
                    Expr::qualified_column("U", "a"),
                ),
                RaNode::cross(RaNode::Table("T".into()), RaNode::Table("U".into())),
            ),
        );
        assert_eq!(ra, expected);
    }

    #[test]
    fn natural_join_without_shared_columns_degenerates_to_cross() {
        let mut s = MemorySchema::new();
        s.add_table("T", vec!["a".into()]);
        s.add_table("V", vec!["z".into()]);
        let join = SraNode::Join {
            kind: JoinKind::Natural,
            left: Box::new(SraNode::table("T")),
            right: Box::new(SraNode::table("V")),
            constraint: None,
        };
        let ra = desugar_query(&join, &s).expect("lowering");
        assert_eq!(tree(&ra), "Cross(RATable(T), RATable(V))");
    }

    #[test]
    fn order_by_lowers_to_the_decoration_wrapper() {
        let node = SraNode::OrderBy {
            column: ColumnRef::bare("a"),
            direction: SortDirection::Desc,
            child: Box::new(SraNode::table("T")),
        };
        let ra = desugar_query(&node, &schema_tu()).expect("lowering");
        assert_eq!(tree(&ra), "OrderBy(a, desc, RATable(T))");
    }

    #[test]
    fn group_by_and_having_fail_cleanly() {
        let mut project = SraNode::project(vec![ProjectItem::Star], SraNode::table("T"));
        if let SraNode::Project { group_by, .. } = &mut project {
            group_by.push(Expr::column("a"));
        }
        assert_eq!(
            desugar_query(&project, &schema_tu()).unwrap_err(),
            DesugarError::Unsupported { what: "GROUP BY" }
        );
    }

    #[test]
    fn synthesized_names_avoid_collisions_deterministically() {
        let expr = Expr::binary(BinaryOp::Add, Expr::column("a"), Expr::column("b"));
        let scope = Scope::from_source("T", vec!["a".into(), "Add(a, b)".into()]);
        let first = synthesize_name(&expr, &scope, &[]);
        assert_eq!(first, "Add(a, b)_2");
        let second = synthesize_name(&expr, &scope, &[first.clone()]);
        assert_eq!(second, "Add(a, b)_3");
    }

    #[test]
    fn stray_wildcard_in_a_predicate_is_rejected() {
        let node = SraNode::Select {
            predicate: Expr::Column(ColumnRef::qualified("T", "*")),
            child: Box::new(SraNode::table("T")),
        };
        assert_eq!(
            desugar_query(&node, &schema_tu()).unwrap_err(),
            DesugarError::StrayWildcard
        );
    }

    #[test]
    fn lowering_metric_increments() {
        // Other tests lower concurrently, so only a lower bound is stable.
        let before = desugar_metrics_snapshot().chisql_queries_lowered_total;
        desugar_query(&SraNode::table("T"), &schema_tu()).expect("lowering");
        let after = desugar_metrics_snapshot().chisql_queries_lowered_total;
        assert!(after >= before + 1, "before={before}, after={after}");
    }
}
