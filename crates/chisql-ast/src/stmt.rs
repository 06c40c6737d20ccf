//! Top-level statements: queries plus the non-query DDL/DML nodes.

use crate::expr::{Expr, Literal};
use crate::sra::SraNode;

/// A single parsed SQL statement. The parser produces one per
/// semicolon-delimited command.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Query(SraNode),
    CreateTable(CreateTableStatement),
    Insert(InsertStatement),
    Delete(DeleteStatement),
}

// ---------------------------------------------------------------------------
// CREATE TABLE
// ---------------------------------------------------------------------------

/// A column type name as written in DDL (e.g. `VARCHAR(64)`, `INT`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    /// The type name as written (case preserved).
    pub name: String,
    /// Optional size parameter (e.g. `64` in `VARCHAR(64)`).
    pub size: Option<u32>,
}

/// A per-column constraint, collected in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnConstraint {
    NotNull,
    Unique,
    PrimaryKey,
    ForeignKey {
        table: String,
        /// Target column; `None` means the target table's primary key.
        column: Option<String>,
    },
    Default(Literal),
    AutoIncrement,
    Check(Expr),
}

/// A column declaration inside `CREATE TABLE`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub type_name: TypeName,
    /// Constraints in source order. Ordering is preserved for later
    /// constraint application; it carries no meaning in the front-end.
    pub constraints: Vec<ColumnConstraint>,
}

/// A table-level key declaration, kept separately from per-column ones.
#[derive(Debug, Clone, PartialEq)]
pub enum TableKey {
    PrimaryKey(Vec<String>),
    Unique(Vec<String>),
    ForeignKey {
        columns: Vec<String>,
        table: String,
        ref_columns: Vec<String>,
    },
}

/// A `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub name: String,
    /// Column declarations in source order.
    pub columns: Vec<ColumnDef>,
    pub keys: Vec<TableKey>,
}

impl CreateTableStatement {
    /// The declared column names, in order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// INSERT
// ---------------------------------------------------------------------------

/// An `INSERT` statement. An omitted column list means "use the table's
/// declared column order at execution time"; the front-end does not resolve
/// it. When the list is present its arity matches `values` (parser-checked).
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: String,
    pub columns: Option<Vec<String>>,
    pub values: Vec<Literal>,
}

// ---------------------------------------------------------------------------
// DELETE
// ---------------------------------------------------------------------------

/// A `DELETE` statement. An absent predicate deletes every row.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table: String,
    pub predicate: Option<Expr>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_preserve_declaration_order() {
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
        assert_eq!(stmt.column_names(), vec!["id", "name"]);
    }
}
