//! Scope tracking for desugaring.
//!
//! A scope is the ordered mapping from in-query names (table names and
//! aliases) to the column lists they contribute. It answers the questions
//! wildcard expansion asks: what does a bare `*` cover, what does `t.*`
//! cover, and is an unqualified name ambiguous. Scopes thread upward through
//! the bottom-up lowering; they are never stored in the trees.

use chisql_ast::ColumnRef;

use crate::DesugarError;

/// One relation visible in a scope: its in-query name (alias, or table name
/// when unaliased) and its ordered columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeSource {
    pub name: String,
    pub columns: Vec<String>,
}

/// The relations visible at one point of the lowering, in join order.
///
/// A natural or USING join sets `merged`: the coalesced output column list
/// that a bare `*` expands to (shared columns once). Per-source entries stay
/// available for qualified `t.*` access either way.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    sources: Vec<ScopeSource>,
    merged: Option<Vec<String>>,
}

impl Scope {
    /// A scope exposing a single named relation.
    #[must_use]
    pub fn from_source(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            sources: vec![ScopeSource {
                name: name.into(),
                columns,
            }],
            merged: None,
        }
    }

    /// A scope exposing an anonymous output column list (a lowered
    /// projection). Qualified access into it resolves nothing.
    #[must_use]
    pub fn from_columns(columns: Vec<String>) -> Self {
        Self {
            sources: Vec::new(),
            merged: Some(columns),
        }
    }

    /// The ordered concatenation of two scopes (join result).
    #[must_use]
    pub fn concat(mut self, mut other: Self) -> Self {
        self.sources.append(&mut other.sources);
        self.merged = None;
        self
    }

    /// Attach the coalesced output column list of a natural/USING join.
    #[must_use]
    pub fn with_merged(mut self, merged: Vec<String>) -> Self {
        self.merged = Some(merged);
        self
    }

    /// The relations visible in this scope, in order.
    #[must_use]
    pub fn sources(&self) -> &[ScopeSource] {
        &self.sources
    }

    /// Every output column name in order, without ambiguity checking.
    /// Shared columns of a merged join appear once.
    #[must_use]
    pub fn output_names(&self) -> Vec<String> {
        if let Some(merged) = &self.merged {
            return merged.clone();
        }
        self.sources
            .iter()
            .flat_map(|s| s.columns.iter().cloned())
            .collect()
    }

    /// Expand a bare `*`: all columns in scope, in declared order.
    ///
    /// A column name contributed by more than one source is ambiguous; an
    /// expansion with no columns is an error.
    pub fn expand_star(&self) -> Result<Vec<ColumnRef>, DesugarError> {
        let names = if let Some(merged) = &self.merged {
            merged.clone()
        } else {
            let mut seen: Vec<&str> = Vec::new();
            for source in &self.sources {
                for col in &source.columns {
                    if seen.contains(&col.as_str()) {
                        return Err(DesugarError::AmbiguousColumn { name: col.clone() });
                    }
                    seen.push(col);
                }
            }
            self.output_names()
        };
        if names.is_empty() {
            return Err(DesugarError::EmptyWildcard {
                relation: "*".to_owned(),
            });
        }
        Ok(names.into_iter().map(ColumnRef::bare).collect())
    }

    /// Expand `table.*`: the columns of that relation only, qualified by it.
    pub fn expand_table_star(&self, table: &str) -> Result<Vec<ColumnRef>, DesugarError> {
        let source = self
            .sources
            .iter()
            .find(|s| s.name == table)
            .ok_or_else(|| DesugarError::UnknownTable {
                name: table.to_owned(),
            })?;
        if source.columns.is_empty() {
            return Err(DesugarError::EmptyWildcard {
                relation: table.to_owned(),
            });
        }
        Ok(source
            .columns
            .iter()
            .map(|c| ColumnRef::qualified(table, c))
            .collect())
    }

    /// The first relation contributing `column`, in join order.
    #[must_use]
    pub fn source_of(&self, column: &str) -> Option<&ScopeSource> {
        self.sources
            .iter()
            .find(|s| s.columns.iter().any(|c| c == column))
    }

    /// Whether any visible attribute carries this name. Used to keep
    /// synthesized attribute names collision-free.
    #[must_use]
    pub fn contains_attr(&self, name: &str) -> bool {
        if let Some(merged) = &self.merged {
            if merged.iter().any(|c| c == name) {
                return true;
            }
        }
        self.sources
            .iter()
            .any(|s| s.columns.iter().any(|c| c == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_table_scope() -> Scope {
        Scope::from_source("t", vec!["a".into(), "b".into()])
            .concat(Scope::from_source("u", vec!["c".into()]))
    }

    #[test]
    fn star_expansion_preserves_declared_order() {
        let refs = two_table_scope().expand_star().expect("expansion");
        let names: Vec<_> = refs.iter().map(|c| c.column.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn duplicate_name_across_sources_is_ambiguous() {
        let scope = Scope::from_source("t", vec!["a".into()])
            .concat(Scope::from_source("u", vec!["a".into()]));
        assert!(matches!(
            scope.expand_star(),
            Err(DesugarError::AmbiguousColumn { .. })
        ));
    }

    #[test]
    fn merged_scope_suppresses_the_duplicate() {
        let scope = Scope::from_source("t", vec!["a".into(), "b".into()])
            .concat(Scope::from_source("u", vec!["a".into(), "c".into()]))
            .with_merged(vec!["a".into(), "b".into(), "c".into()]);
        let refs = scope.expand_star().expect("merged expansion");
        let names: Vec<_> = refs.iter().map(|c| c.column.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn table_star_is_qualified() {
        let refs = two_table_scope().expand_table_star("t").expect("expansion");
        assert_eq!(refs, vec![
            ColumnRef::qualified("t", "a"),
            ColumnRef::qualified("t", "b"),
        ]);
    }

    #[test]
    fn table_star_on_unknown_relation_fails() {
        assert!(matches!(
            two_table_scope().expand_table_star("nope"),
            Err(DesugarError::UnknownTable { .. })
        ));
    }

    #[test]
    fn empty_expansion_fails() {
        let scope = Scope::from_source("t", vec![]);
        assert!(matches!(
            scope.expand_star(),
            Err(DesugarError::EmptyWildcard { .. })
        ));
        assert!(matches!(
            scope.expand_table_star("t"),
            Err(DesugarError::EmptyWildcard { .. })
        ));
    }
}
