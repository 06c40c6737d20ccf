//! The schema oracle: the desugarer's only outside input beyond the SRA tree.
//!
//! The oracle is injected; the front-end does not prescribe its backing
//! store. [`MemorySchema`] is the in-memory implementation used by the CLI
//! and by tests, with a constructor that folds the CREATE TABLE statements
//! of a parsed program.

use std::collections::HashMap;

use chisql_ast::Statement;

/// Read-only provider of table → ordered-column-list information.
///
/// Lookups are case-sensitive: ChiSQL identifiers are case-preserving.
pub trait SchemaOracle {
    /// The declared column names of `table`, in order, or `None` if the
    /// table is unknown.
    fn columns_of(&self, table: &str) -> Option<Vec<String>>;

    /// Whether `table` exists.
    fn exists(&self, table: &str) -> bool {
        self.columns_of(table).is_some()
    }
}

/// An in-memory schema backed by a name-keyed map.
#[derive(Debug, Clone, Default)]
pub struct MemorySchema {
    tables: HashMap<String, Vec<String>>,
}

impl MemorySchema {
    /// Create an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table with its ordered column names. A second registration
    /// under the same name replaces the first.
    pub fn add_table(&mut self, name: impl Into<String>, columns: Vec<String>) {
        self.tables.insert(name.into(), columns);
    }

    /// Fold the CREATE TABLE statements of a parsed program into a schema.
    /// Non-DDL statements are ignored.
    #[must_use]
    pub fn from_statements(stmts: &[Statement]) -> Self {
        let mut schema = Self::new();
        for stmt in stmts {
            if let Statement::CreateTable(ct) = stmt {
                schema.add_table(ct.name.clone(), ct.column_names());
            }
        }
        schema
    }

    /// Number of registered tables.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

impl SchemaOracle for MemorySchema {
    fn columns_of(&self, table: &str) -> Option<Vec<String>> {
        self.tables.get(table).cloned()
    }

    fn exists(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }
}
