//! SQL pretty-printing via `fmt::Display` for AST nodes.
//!
//! Every statement type renders back to SQL text, with compound expression
//! operands fully parenthesized. This carries the round-trip property:
//! `parse(sql).to_string()` parses to a structurally equal tree.
//!
//! SRA trees produced by the parser always have the canonical shape
//! (ordering over set ops over projection over selection over a join tree);
//! non-canonical hand-built trees still render, falling back to nested
//! subquery syntax, so the printer stays total. A lowered `IN` subquery
//! renders in the prefix tree form; it only appears in debug output, never
//! in a round-trip.

#[allow(clippy::wildcard_imports)]
use crate::*;
use std::fmt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn comma_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn comma_idents(f: &mut fmt::Formatter<'_>, names: &[String]) -> fmt::Result {
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_ident(f, name)?;
    }
    Ok(())
}

/// Returns true if the name needs quoting (empty, leading digit, or any
/// character outside `[A-Za-z0-9_]`).
fn needs_quoting(name: &str) -> bool {
    if name.is_empty() {
        return true;
    }
    let first = name.as_bytes()[0];
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return true;
    }
    name.bytes()
        .any(|b| !(b.is_ascii_alphanumeric() || b == b'_'))
}

fn write_ident(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if name == "*" {
        // The wildcard marker is syntax, not an identifier.
        f.write_str("*")
    } else if needs_quoting(name) {
        write!(f, "\"{}\"", name.replace('"', "\"\""))
    } else {
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Literal
// ---------------------------------------------------------------------------

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Double(v) => {
                // Ensure the double always has a decimal point so it
                // re-lexes as a double, never an int.
                if v.fract() == 0.0 && !v.is_infinite() && !v.is_nan() {
                    write!(f, "{v:.1}")
                } else {
                    write!(f, "{v}")
                }
            }
            Self::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Null => f.write_str("NULL"),
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnRef
// ---------------------------------------------------------------------------

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref t) = self.table {
            write_ident(f, t)?;
            f.write_str(".")?;
        }
        write_ident(f, &self.column)
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::And => "AND",
            Self::Or => "OR",
        })
    }
}

// ---------------------------------------------------------------------------
// Expr
// ---------------------------------------------------------------------------

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::Column(col) => write!(f, "{col}"),
            Self::Binary { op, left, right } => write!(f, "({left} {op} {right})"),
            Self::Unary {
                op: UnaryOp::Neg,
                expr,
            } => write!(f, "(-{expr})"),
            Self::Unary {
                op: UnaryOp::Not,
                expr,
            } => write!(f, "(NOT {expr})"),
            Self::InSubquery { expr, query } => match query.as_ref() {
                Subquery::Sugared(sra) => write!(f, "{expr} IN ({sra})"),
                Subquery::Lowered(ra) => write!(f, "{expr} IN ({})", ra.tree()),
            },
            Self::Aggregate { func, arg } => write!(f, "{}({arg})", func.name()),
        }
    }
}

// ---------------------------------------------------------------------------
// SRA
// ---------------------------------------------------------------------------

impl fmt::Display for ProjectItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Star => f.write_str("*"),
            Self::TableStar(t) => {
                write_ident(f, t)?;
                f.write_str(".*")
            }
            Self::Expr { expr, alias } => {
                write!(f, "{expr}")?;
                if let Some(a) = alias {
                    f.write_str(" AS ")?;
                    write_ident(f, a)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for SetOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Union => "UNION",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
        })
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        })
    }
}

impl fmt::Display for SraNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Peel the ordering chain (outermost = primary) so ORDER BY renders
        // last, primary key first.
        let mut keys: Vec<(&ColumnRef, SortDirection)> = Vec::new();
        let mut core = self;
        while let Self::OrderBy {
            column,
            direction,
            child,
        } = core
        {
            keys.push((column, *direction));
            core = child;
        }

        // A LIMIT recorded on the projection renders after the ORDER BY
        // clause, matching the query-level grammar position.
        let hoisted_limit = match (keys.is_empty(), core) {
            (false, SraNode::Project { limit, .. }) => *limit,
            _ => None,
        };

        if hoisted_limit.is_some() {
            if let SraNode::Project {
                items,
                child,
                distinct,
                group_by,
                having,
                ..
            } = core
            {
                write_project(f, items, child, *distinct, group_by, having, &None)?;
            }
        } else {
            write_set_chain(f, core)?;
        }

        if !keys.is_empty() {
            f.write_str(" ORDER BY ")?;
            for (i, (col, dir)) in keys.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{col} {dir}")?;
            }
        }
        if let Some(n) = hoisted_limit {
            write!(f, " LIMIT {n}")?;
        }
        Ok(())
    }
}

fn write_set_chain(f: &mut fmt::Formatter<'_>, node: &SraNode) -> fmt::Result {
    if let SraNode::SetOp { kind, left, right } = node {
        write_set_chain(f, left)?;
        write!(f, " {kind} ")?;
        // Parser output is left-nested; parenthesize a right-nested operand
        // so a hand-built tree keeps its shape through a round-trip.
        if matches!(right.as_ref(), SraNode::SetOp { .. }) {
            f.write_str("(")?;
            write_set_chain(f, right)?;
            f.write_str(")")
        } else {
            write_select_core(f, right)
        }
    } else {
        write_select_core(f, node)
    }
}

fn write_project(
    f: &mut fmt::Formatter<'_>,
    items: &[ProjectItem],
    child: &SraNode,
    distinct: bool,
    group_by: &[Expr],
    having: &Option<Expr>,
    limit: &Option<u64>,
) -> fmt::Result {
    f.write_str("SELECT ")?;
    if distinct {
        f.write_str("DISTINCT ")?;
    }
    comma_list(f, items)?;
    write_from_where(f, child)?;
    if !group_by.is_empty() {
        f.write_str(" GROUP BY ")?;
        comma_list(f, group_by)?;
    }
    if let Some(h) = having {
        write!(f, " HAVING {h}")?;
    }
    if let Some(n) = limit {
        write!(f, " LIMIT {n}")?;
    }
    Ok(())
}

fn write_select_core(f: &mut fmt::Formatter<'_>, node: &SraNode) -> fmt::Result {
    match node {
        SraNode::Project {
            items,
            child,
            distinct,
            group_by,
            having,
            limit,
        } => write_project(f, items, child, *distinct, group_by, having, limit),
        // Non-canonical shapes: keep the printer total.
        SraNode::Select { .. } | SraNode::Table { .. } | SraNode::Join { .. } => {
            f.write_str("SELECT *")?;
            write_from_where(f, node)
        }
        SraNode::SetOp { .. } | SraNode::OrderBy { .. } => {
            f.write_str("(")?;
            write!(f, "{node}")?;
            f.write_str(")")
        }
    }
}

fn write_from_where(f: &mut fmt::Formatter<'_>, node: &SraNode) -> fmt::Result {
    match node {
        SraNode::Select { predicate, child } => {
            f.write_str(" FROM ")?;
            write_from(f, child)?;
            write!(f, " WHERE {predicate}")
        }
        SraNode::Table { .. } | SraNode::Join { .. } => {
            f.write_str(" FROM ")?;
            write_from(f, node)
        }
        other => {
            f.write_str(" FROM (")?;
            write!(f, "{other}")?;
            f.write_str(")")
        }
    }
}

fn write_from(f: &mut fmt::Formatter<'_>, node: &SraNode) -> fmt::Result {
    match node {
        SraNode::Table { name, alias } => {
            write_ident(f, name)?;
            if let Some(a) = alias {
                f.write_str(" ")?;
                write_ident(f, a)?;
            }
            Ok(())
        }
        SraNode::Join {
            kind,
            left,
            right,
            constraint,
        } => {
            write_from(f, left)?;
            f.write_str(match kind {
                JoinKind::Inner => " INNER JOIN ",
                JoinKind::Cross => " CROSS JOIN ",
                JoinKind::LeftOuter => " LEFT OUTER JOIN ",
                JoinKind::RightOuter => " RIGHT OUTER JOIN ",
                JoinKind::FullOuter => " FULL OUTER JOIN ",
                JoinKind::Natural => " NATURAL JOIN ",
            })?;
            if matches!(right.as_ref(), SraNode::Join { .. }) {
                f.write_str("(")?;
                write_from(f, right)?;
                f.write_str(")")?;
            } else {
                write_from(f, right)?;
            }
            match constraint {
                Some(JoinConstraint::On(e)) => write!(f, " ON {e}"),
                Some(JoinConstraint::Using(cols)) => {
                    f.write_str(" USING (")?;
                    comma_idents(f, cols)?;
                    f.write_str(")")
                }
                None => Ok(()),
            }
        }
        other => {
            f.write_str("(")?;
            write!(f, "{other}")?;
            f.write_str(")")
        }
    }
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(size) = self.size {
            write!(f, "({size})")?;
        }
        Ok(())
    }
}

impl fmt::Display for ColumnConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotNull => f.write_str("NOT NULL"),
            Self::Unique => f.write_str("UNIQUE"),
            Self::PrimaryKey => f.write_str("PRIMARY KEY"),
            Self::ForeignKey { table, column } => {
                f.write_str("REFERENCES ")?;
                write_ident(f, table)?;
                if let Some(c) = column {
                    f.write_str(" (")?;
                    write_ident(f, c)?;
                    f.write_str(")")?;
                }
                Ok(())
            }
            Self::Default(lit) => write!(f, "DEFAULT {lit}"),
            Self::AutoIncrement => f.write_str("AUTO INCREMENT"),
            Self::Check(e) => write!(f, "CHECK ({e})"),
        }
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ident(f, &self.name)?;
        write!(f, " {}", self.type_name)?;
        for c in &self.constraints {
            write!(f, " {c}")?;
        }
        Ok(())
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrimaryKey(cols) => {
                f.write_str("PRIMARY KEY (")?;
                comma_idents(f, cols)?;
                f.write_str(")")
            }
            Self::Unique(cols) => {
                f.write_str("UNIQUE (")?;
                comma_idents(f, cols)?;
                f.write_str(")")
            }
            Self::ForeignKey {
                columns,
                table,
                ref_columns,
            } => {
                f.write_str("FOREIGN KEY (")?;
                comma_idents(f, columns)?;
                f.write_str(") REFERENCES ")?;
                write_ident(f, table)?;
                if !ref_columns.is_empty() {
                    f.write_str(" (")?;
                    comma_idents(f, ref_columns)?;
                    f.write_str(")")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for CreateTableStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CREATE TABLE ")?;
        write_ident(f, &self.name)?;
        f.write_str(" (")?;
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{col}")?;
        }
        for key in &self.keys {
            f.write_str(", ")?;
            write!(f, "{key}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for InsertStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("INSERT INTO ")?;
        write_ident(f, &self.table)?;
        if let Some(cols) = &self.columns {
            f.write_str(" (")?;
            comma_idents(f, cols)?;
            f.write_str(")")?;
        }
        f.write_str(" VALUES (")?;
        comma_list(f, &self.values)?;
        f.write_str(")")
    }
}

impl fmt::Display for DeleteStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DELETE FROM ")?;
        write_ident(f, &self.table)?;
        if let Some(p) = &self.predicate {
            write!(f, " WHERE {p}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query(q) => write!(f, "{q}"),
            Self::CreateTable(s) => write!(f, "{s}"),
            Self::Insert(s) => write!(f, "{s}"),
            Self::Delete(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::BinaryOp;

    #[test]
    fn literal_rendering() {
        assert_eq!(Literal::Int(42).to_string(), "42");
        assert_eq!(Literal::Double(3.0).to_string(), "3.0");
        assert_eq!(Literal::Double(2.5).to_string(), "2.5");
        assert_eq!(Literal::String("it's".into()).to_string(), "'it''s'");
        assert_eq!(Literal::Null.to_string(), "NULL");
    }

    #[test]
    fn compound_expr_is_parenthesized() {
        let e = Expr::binary(
            BinaryOp::Add,
            Expr::column("x"),
            Expr::binary(BinaryOp::Mul, Expr::column("y"), Expr::column("z")),
        );
        assert_eq!(e.to_string(), "(x + (y * z))");
    }

    #[test]
    fn quoted_identifier_rendering() {
        let c = ColumnRef::qualified("odd name", "select*");
        assert_eq!(c.to_string(), "\"odd name\".\"select*\"");
    }

    #[test]
    fn select_with_where_renders_canonically() {
        let sra = SraNode::project(
            vec![ProjectItem::Star],
            SraNode::Select {
                predicate: Expr::binary(
                    BinaryOp::Gt,
                    Expr::column("x"),
                    Expr::Literal(Literal::Int(3)),
                ),
                child: Box::new(SraNode::table("t")),
            },
        );
        assert_eq!(sra.to_string(), "SELECT * FROM t WHERE (x > 3)");
    }

    #[test]
    fn order_by_chain_renders_primary_first() {
        let sra = SraNode::OrderBy {
            column: ColumnRef::bare("a"),
            direction: SortDirection::Asc,
            child: Box::new(SraNode::OrderBy {
                column: ColumnRef::bare("b"),
                direction: SortDirection::Desc,
                child: Box::new(SraNode::project(
                    vec![ProjectItem::Star],
                    SraNode::table("t"),
                )),
            }),
        };
        assert_eq!(
            sra.to_string(),
            "SELECT * FROM t ORDER BY a ASC, b DESC"
        );
    }

    #[test]
    fn create_table_rendering() {
        let stmt = CreateTableStatement {
            name: "users".into(),
            columns: vec![
                ColumnDef {
                    name: "id".into(),
                    type_name: TypeName {
                        name: "INT".into(),
                        size: None,
                    },
                    constraints: vec![ColumnConstraint::PrimaryKey],
                },
                ColumnDef {
                    name: "name".into(),
                    type_name: TypeName {
                        name: "VARCHAR".into(),
                        size: Some(64),
                    },
                    constraints: vec![ColumnConstraint::NotNull],
                },
            ],
            keys: vec![],
        };
        assert_eq!(
            stmt.to_string(),
            "CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR(64) NOT NULL)"
        );
    }
}
