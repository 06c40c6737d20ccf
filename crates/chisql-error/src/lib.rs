//! Unified error handling for the ChiSQL front-end.
//!
//! Every layer of the compiler (lexer, parser, desugarer, CLI) defines its own
//! narrow error where that helps testing, but all of them convert into
//! [`ChiError`] before crossing a crate boundary toward the caller. Variants
//! are organised by the phase that produces them so callers can match on the
//! failure category without inspecting message strings.

use thiserror::Error;

/// The canonical error type for all ChiSQL front-end operations.
#[derive(Error, Debug)]
pub enum ChiError {
    // === I/O ===
    /// File I/O error (CLI reading source files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Lexical / syntactic ===
    /// The SQL text violated the grammar. Carries the 1-based source locus.
    #[error("{line}:{col}: syntax error: {message}")]
    Syntax {
        message: String,
        line: u32,
        col: u32,
    },

    // === Schema ===
    /// A table named in a query is unknown to the schema oracle.
    #[error("no such table: {name}")]
    UnknownTable { name: String },

    /// A wildcard expanded against a relation with no columns.
    #[error("wildcard over {relation} expands to no columns")]
    EmptyWildcard { relation: String },

    // === Ambiguity ===
    /// An unqualified column name is provided by more than one in-scope
    /// relation.
    #[error("ambiguous column name: {name}")]
    AmbiguousColumn { name: String },

    // === Unsupported ===
    /// A construct the grammar accepts but lowering does not handle.
    #[error("unsupported construct: {what}")]
    Unsupported { what: String },

    // === Internal ===
    /// An internal invariant was violated. Indicates a bug in the front-end.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChiError {
    /// Create a syntax error at the given 1-based locus.
    pub fn syntax(message: impl Into<String>, line: u32, col: u32) -> Self {
        Self::Syntax {
            message: message.into(),
            line,
            col,
        }
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the failure is in the user's input (as opposed to a bug or an
    /// environment problem). Used by the CLI to pick the diagnostic prefix.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Syntax { .. }
                | Self::UnknownTable { .. }
                | Self::EmptyWildcard { .. }
                | Self::AmbiguousColumn { .. }
                | Self::Unsupported { .. }
        )
    }
}

/// Result type alias using [`ChiError`].
pub type Result<T> = std::result::Result<T, ChiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_display_includes_locus() {
        let err = ChiError::syntax("expected FROM", 3, 14);
        assert_eq!(err.to_string(), "3:14: syntax error: expected FROM");
    }

    #[test]
    fn unknown_table_display() {
        let err = ChiError::UnknownTable {
            name: "ghosts".to_owned(),
        };
        assert_eq!(err.to_string(), "no such table: ghosts");
    }

    #[test]
    fn io_error_converts_via_question_mark() {
        fn might_fail() -> Result<()> {
            let _f = std::fs::File::open("/nonexistent/chisql_test")?;
            Ok(())
        }
        assert!(matches!(might_fail().unwrap_err(), ChiError::Io(_)));
    }

    #[test]
    fn user_error_classification() {
        assert!(ChiError::syntax("x", 1, 1).is_user_error());
        assert!(ChiError::AmbiguousColumn {
            name: "a".to_owned()
        }
        .is_user_error());
        assert!(!ChiError::internal("bug").is_user_error());
    }
}
