//! Hand-written recursive descent parser for ChiSQL.
//!
//! Statement grammar lives here; expression parsing lives in `expr.rs`.
//! The parser consumes the full token vector in one pass, recovering at `;`
//! boundaries so a batch reports as many syntax errors as possible.

use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chisql_ast::{
    ColumnConstraint, ColumnDef, ColumnRef, CreateTableStatement, DeleteStatement, Expr,
    InsertStatement, JoinConstraint, JoinKind, Literal, ProjectItem, SetOpKind, SortDirection,
    Span, SraNode, Statement, TableKey, TypeName,
};
use chisql_error::ChiError;

use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

// ---------------------------------------------------------------------------
// Parse metrics
// ---------------------------------------------------------------------------

/// Monotonic counter of successfully parsed statements.
static CHISQL_PARSE_STATEMENTS_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Point-in-time parse metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseMetricsSnapshot {
    /// Total statements successfully parsed.
    pub chisql_parse_statements_total: u64,
}

/// Take a point-in-time snapshot of parse metrics.
#[must_use]
pub fn parse_metrics_snapshot() -> ParseMetricsSnapshot {
    ParseMetricsSnapshot {
        chisql_parse_statements_total: CHISQL_PARSE_STATEMENTS_TOTAL.load(Ordering::Relaxed),
    }
}

/// Reset parse metrics (used by tests/diagnostics).
pub fn reset_parse_metrics() {
    CHISQL_PARSE_STATEMENTS_TOTAL.store(0, Ordering::Relaxed);
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// A syntax error with its 1-based source locus.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    pub line: u32,
    pub col: u32,
}

impl ParseError {
    #[must_use]
    pub(crate) fn at(message: impl Into<String>, token: Option<&Token>) -> Self {
        if let Some(t) = token {
            Self {
                message: message.into(),
                span: t.span,
                line: t.line,
                col: t.col,
            }
        } else {
            Self {
                message: message.into(),
                span: Span::ZERO,
                line: 0,
                col: 0,
            }
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.col, self.message)
    }
}

impl Error for ParseError {}

impl From<ParseError> for ChiError {
    fn from(e: ParseError) -> Self {
        Self::syntax(e.message, e.line, e.col)
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Recursion limit for nested expressions and subqueries.
pub const MAX_PARSE_DEPTH: u32 = 500;

pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) errors: Vec<ParseError>,
    pub(crate) depth: u32,
}

impl Parser {
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            depth: 0,
        }
    }

    #[must_use]
    pub fn from_sql(sql: &str) -> Self {
        Self::new(Lexer::tokenize(sql))
    }

    /// Parse every statement in the input. Returns the statements that parsed
    /// and the errors for those that did not; recovery happens at `;`
    /// boundaries so one malformed statement does not mask the rest.
    pub fn parse_all(&mut self) -> (Vec<Statement>, Vec<ParseError>) {
        let span = tracing::debug_span!(
            target: "chisql.parse",
            "parse",
            statement_count = tracing::field::Empty,
            parse_errors = tracing::field::Empty,
        );
        let _guard = span.enter();

        let mut stmts = Vec::new();
        while !self.at_eof() {
            if self.check(&TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            match self.parse_statement() {
                Ok(s) => {
                    CHISQL_PARSE_STATEMENTS_TOTAL.fetch_add(1, Ordering::Relaxed);
                    stmts.push(s);
                    let _ = self.eat(&TokenKind::Semicolon);
                }
                Err(e) => {
                    tracing::warn!(
                        target: "chisql.parse",
                        error = %e,
                        "parse recovery: skipping malformed statement"
                    );
                    self.errors.push(e);
                    self.synchronize();
                }
            }
        }

        let errors = std::mem::take(&mut self.errors);
        span.record("statement_count", stmts.len() as u64);
        span.record("parse_errors", errors.len() as u64);

        (stmts, errors)
    }

    /// Parse a single statement at the cursor.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        match self.peek() {
            TokenKind::KwSelect => Ok(Statement::Query(self.parse_query()?)),
            TokenKind::KwCreate => self.parse_create_table().map(Statement::CreateTable),
            TokenKind::KwInsert => self.parse_insert().map(Statement::Insert),
            TokenKind::KwDelete => self.parse_delete().map(Statement::Delete),
            TokenKind::Error(msg) => {
                let msg = msg.clone();
                Err(self.err_here(msg))
            }
            other => Err(self.err_here(format!(
                "expected SELECT, CREATE, INSERT, or DELETE, got {other:?}"
            ))),
        }
    }

    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    // -----------------------------------------------------------------------
    // Token navigation
    // -----------------------------------------------------------------------

    pub(crate) fn peek(&self) -> &TokenKind {
        self.tokens.get(self.pos).map_or(&TokenKind::Eof, |t| &t.kind)
    }

    pub(crate) fn peek_nth(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(&TokenKind::Eof, |t| &t.kind)
    }

    pub(crate) fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn at_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    /// Consume and return the current token (never advances past Eof).
    pub(crate) fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    /// Whether the current token has the same discriminant as `kind`.
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(kind)
    }

    /// Consume the current token if it matches `kind`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of the expected kind or fail with a hint.
    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Result<Token, ParseError> {
        if self.check(expected) {
            Ok(self.advance())
        } else {
            Err(self.err_here(format!("expected {expected:?}, got {:?}", self.peek())))
        }
    }

    pub(crate) fn err_here(&self, message: impl Into<String>) -> ParseError {
        ParseError::at(message, self.current())
    }

    pub(crate) fn enter_recursion(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_PARSE_DEPTH {
            return Err(self.err_here(format!(
                "statement is nested too deeply (maximum depth {MAX_PARSE_DEPTH})"
            )));
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Skip tokens until just past the next `;` or to the start of the next
    /// statement, whichever comes first.
    fn synchronize(&mut self) {
        while !self.at_eof() {
            if self.eat(&TokenKind::Semicolon) {
                return;
            }
            if self.peek().is_statement_start() {
                return;
            }
            self.advance();
        }
    }

    /// Consume an identifier (plain or quoted).
    fn expect_ident(&mut self, what: &str) -> Result<String, ParseError> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Id(s) | TokenKind::QuotedId(s) => Ok(s),
            other => Err(ParseError {
                message: format!("expected {what}, got {other:?}"),
                span: tok.span,
                line: tok.line,
                col: tok.col,
            }),
        }
    }

    /// Comma-separated identifier list (at least one).
    fn parse_ident_list(&mut self, what: &str) -> Result<Vec<String>, ParseError> {
        let mut names = vec![self.expect_ident(what)?];
        while self.eat(&TokenKind::Comma) {
            names.push(self.expect_ident(what)?);
        }
        Ok(names)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// A query: SELECT cores combined left-associatively by set operators.
    pub(crate) fn parse_query(&mut self) -> Result<SraNode, ParseError> {
        self.enter_recursion()?;
        let result = self.parse_query_inner();
        self.leave_recursion();
        result
    }

    fn parse_query_inner(&mut self) -> Result<SraNode, ParseError> {
        let mut node = self.parse_select()?;
        loop {
            let kind = match self.peek() {
                TokenKind::KwUnion => SetOpKind::Union,
                TokenKind::KwIntersect => SetOpKind::Intersect,
                TokenKind::KwExcept => SetOpKind::Except,
                _ => break,
            };
            self.advance();
            let right = self.parse_select()?;
            node = SraNode::SetOp {
                kind,
                left: Box::new(node),
                right: Box::new(right),
            };
        }

        // ORDER BY and LIMIT bind the whole query, after any set operators.
        if self.eat(&TokenKind::KwOrder) {
            self.expect(&TokenKind::KwBy)?;
            // Chain ordering keys so the first written key ends up outermost
            // (outermost = primary).
            for (column, direction) in self.parse_order_keys()?.into_iter().rev() {
                node = SraNode::OrderBy {
                    column,
                    direction,
                    child: Box::new(node),
                };
            }
        }
        if self.eat(&TokenKind::KwLimit) {
            let n = self.parse_limit_count()?;
            if !attach_limit(&mut node, n) {
                return Err(self.err_here("LIMIT on a compound query is not supported"));
            }
        }
        Ok(node)
    }

    /// One SELECT core: projection, FROM, WHERE, GROUP BY, HAVING.
    fn parse_select(&mut self) -> Result<SraNode, ParseError> {
        self.expect(&TokenKind::KwSelect)?;
        let distinct = self.eat(&TokenKind::KwDistinct);
        let items = self.parse_project_items()?;
        self.expect(&TokenKind::KwFrom)?;
        let from = self.parse_from()?;

        let where_clause = if self.eat(&TokenKind::KwWhere) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let mut group_by = Vec::new();
        if self.eat(&TokenKind::KwGroup) {
            self.expect(&TokenKind::KwBy)?;
            group_by.push(self.parse_expr()?);
            while self.eat(&TokenKind::Comma) {
                group_by.push(self.parse_expr()?);
            }
        }

        let having = if self.eat(&TokenKind::KwHaving) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let mut node = from;
        if let Some(predicate) = where_clause {
            node = SraNode::Select {
                predicate,
                child: Box::new(node),
            };
        }
        Ok(SraNode::Project {
            items,
            child: Box::new(node),
            distinct,
            group_by,
            having,
            limit: None,
        })
    }

    fn parse_limit_count(&mut self) -> Result<u64, ParseError> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Int(n) if n >= 0 => Ok(n as u64),
            other => Err(ParseError {
                message: format!("expected a non-negative LIMIT count, got {other:?}"),
                span: tok.span,
                line: tok.line,
                col: tok.col,
            }),
        }
    }

    fn parse_order_keys(&mut self) -> Result<Vec<(ColumnRef, SortDirection)>, ParseError> {
        let mut keys = Vec::new();
        loop {
            let name = self.expect_ident("a column name in ORDER BY")?;
            let column = if self.eat(&TokenKind::Dot) {
                let col = self.expect_ident("a column name after `.`")?;
                ColumnRef::qualified(name, col)
            } else {
                ColumnRef::bare(name)
            };
            let direction = if self.eat(&TokenKind::KwDesc) {
                SortDirection::Desc
            } else {
                // ASC is the default and may be written explicitly.
                let _ = self.eat(&TokenKind::KwAsc);
                SortDirection::Asc
            };
            keys.push((column, direction));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(keys)
    }

    fn parse_project_items(&mut self) -> Result<Vec<ProjectItem>, ParseError> {
        let mut items = Vec::new();
        loop {
            if self.eat(&TokenKind::Star) {
                items.push(ProjectItem::Star);
            } else {
                let expr = self.parse_expr()?;
                // `t.*` arrives through the expression path as a qualified
                // wildcard reference; it takes no alias.
                if let Expr::Column(ref c) = expr {
                    if c.is_wildcard() {
                        if let Some(t) = &c.table {
                            items.push(ProjectItem::TableStar(t.clone()));
                            if !self.eat(&TokenKind::Comma) {
                                break;
                            }
                            continue;
                        }
                    }
                }
                let alias = if self.eat(&TokenKind::KwAs) {
                    Some(self.expect_ident("an alias after AS")?)
                } else {
                    match self.peek() {
                        TokenKind::Id(name) | TokenKind::QuotedId(name) => {
                            let name = name.clone();
                            self.advance();
                            Some(name)
                        }
                        _ => None,
                    }
                };
                items.push(ProjectItem::Expr { expr, alias });
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(items)
    }

    // -----------------------------------------------------------------------
    // FROM clause
    // -----------------------------------------------------------------------

    fn parse_from(&mut self) -> Result<SraNode, ParseError> {
        let mut node = self.parse_table_ref()?;
        loop {
            if self.eat(&TokenKind::Comma) {
                // A comma-separated table list is a cross-join chain.
                let right = self.parse_table_ref()?;
                node = SraNode::Join {
                    kind: JoinKind::Cross,
                    left: Box::new(node),
                    right: Box::new(right),
                    constraint: None,
                };
                continue;
            }

            let kind = if self.eat(&TokenKind::KwInner) {
                self.expect(&TokenKind::KwJoin)?;
                JoinKind::Inner
            } else if self.eat(&TokenKind::KwCross) {
                self.expect(&TokenKind::KwJoin)?;
                JoinKind::Cross
            } else if self.eat(&TokenKind::KwNatural) {
                self.expect(&TokenKind::KwJoin)?;
                JoinKind::Natural
            } else if self.eat(&TokenKind::KwLeft) {
                let _ = self.eat(&TokenKind::KwOuter);
                self.expect(&TokenKind::KwJoin)?;
                JoinKind::LeftOuter
            } else if self.eat(&TokenKind::KwRight) {
                let _ = self.eat(&TokenKind::KwOuter);
                self.expect(&TokenKind::KwJoin)?;
                JoinKind::RightOuter
            } else if self.eat(&TokenKind::KwFull) {
                let _ = self.eat(&TokenKind::KwOuter);
                self.expect(&TokenKind::KwJoin)?;
                JoinKind::FullOuter
            } else if self.eat(&TokenKind::KwJoin) {
                JoinKind::Inner
            } else {
                break;
            };

            let right = self.parse_table_ref()?;

            let constraint = if self.eat(&TokenKind::KwOn) {
                Some(JoinConstraint::On(self.parse_expr()?))
            } else if self.eat(&TokenKind::KwUsing) {
                self.expect(&TokenKind::LeftParen)?;
                let cols = self.parse_ident_list("a column name in USING")?;
                self.expect(&TokenKind::RightParen)?;
                Some(JoinConstraint::Using(cols))
            } else {
                None
            };

            match (kind, &constraint) {
                (JoinKind::Cross | JoinKind::Natural, Some(_)) => {
                    return Err(self.err_here(format!(
                        "{} JOIN cannot take an ON or USING clause",
                        if kind == JoinKind::Cross { "CROSS" } else { "NATURAL" }
                    )));
                }
                (
                    JoinKind::Inner
                    | JoinKind::LeftOuter
                    | JoinKind::RightOuter
                    | JoinKind::FullOuter,
                    None,
                ) => {
                    return Err(self.err_here("JOIN requires an ON or USING clause"));
                }
                _ => {}
            }

            node = SraNode::Join {
                kind,
                left: Box::new(node),
                right: Box::new(right),
                constraint,
            };
        }
        Ok(node)
    }

    fn parse_table_ref(&mut self) -> Result<SraNode, ParseError> {
        let name = self.expect_ident("a table name")?;
        let alias = if self.eat(&TokenKind::KwAs) {
            Some(self.expect_ident("an alias after AS")?)
        } else {
            match self.peek() {
                TokenKind::Id(a) | TokenKind::QuotedId(a) => {
                    let a = a.clone();
                    self.advance();
                    Some(a)
                }
                _ => None,
            }
        };
        Ok(SraNode::Table { name, alias })
    }

    // -----------------------------------------------------------------------
    // CREATE TABLE
    // -----------------------------------------------------------------------

    fn parse_create_table(&mut self) -> Result<CreateTableStatement, ParseError> {
        self.expect(&TokenKind::KwCreate)?;
        self.expect(&TokenKind::KwTable)?;
        let name = self.expect_ident("a table name")?;
        self.expect(&TokenKind::LeftParen)?;

        let mut columns = Vec::new();
        let mut keys = Vec::new();
        loop {
            if self.check(&TokenKind::KwPrimary) {
                self.advance();
                self.expect(&TokenKind::KwKey)?;
                self.expect(&TokenKind::LeftParen)?;
                let cols = self.parse_ident_list("a column name in PRIMARY KEY")?;
                self.expect(&TokenKind::RightParen)?;
                keys.push(TableKey::PrimaryKey(cols));
            } else if self.check(&TokenKind::KwUnique)
                && matches!(self.peek_nth(1), TokenKind::LeftParen)
            {
                self.advance();
                self.expect(&TokenKind::LeftParen)?;
                let cols = self.parse_ident_list("a column name in UNIQUE")?;
                self.expect(&TokenKind::RightParen)?;
                keys.push(TableKey::Unique(cols));
            } else if self.check(&TokenKind::KwForeign) {
                self.advance();
                self.expect(&TokenKind::KwKey)?;
                self.expect(&TokenKind::LeftParen)?;
                let cols = self.parse_ident_list("a column name in FOREIGN KEY")?;
                self.expect(&TokenKind::RightParen)?;
                self.expect(&TokenKind::KwReferences)?;
                let table = self.expect_ident("a referenced table name")?;
                let ref_columns = if self.eat(&TokenKind::LeftParen) {
                    let cols = self.parse_ident_list("a referenced column name")?;
                    self.expect(&TokenKind::RightParen)?;
                    cols
                } else {
                    Vec::new()
                };
                keys.push(TableKey::ForeignKey {
                    columns: cols,
                    table,
                    ref_columns,
                });
            } else {
                columns.push(self.parse_column_def()?);
            }

            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightParen)?;

        Ok(CreateTableStatement {
            name,
            columns,
            keys,
        })
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef, ParseError> {
        let name = self.expect_ident("a column name")?;
        let type_name = self.parse_type_name()?;

        let mut constraints = Vec::new();
        loop {
            if self.check(&TokenKind::KwNot) {
                self.advance();
                self.expect(&TokenKind::KwNull)?;
                constraints.push(ColumnConstraint::NotNull);
            } else if self.eat(&TokenKind::KwUnique) {
                constraints.push(ColumnConstraint::Unique);
            } else if self.check(&TokenKind::KwPrimary) {
                self.advance();
                self.expect(&TokenKind::KwKey)?;
                constraints.push(ColumnConstraint::PrimaryKey);
            } else if self.eat(&TokenKind::KwReferences) {
                constraints.push(self.parse_references()?);
            } else if self.check(&TokenKind::KwForeign) {
                // Column-level spelling: FOREIGN KEY REFERENCES t (c)
                self.advance();
                self.expect(&TokenKind::KwKey)?;
                self.expect(&TokenKind::KwReferences)?;
                constraints.push(self.parse_references()?);
            } else if self.eat(&TokenKind::KwDefault) {
                constraints.push(ColumnConstraint::Default(self.parse_literal()?));
            } else if self.check(&TokenKind::KwAuto) {
                self.advance();
                self.expect(&TokenKind::KwIncrement)?;
                constraints.push(ColumnConstraint::AutoIncrement);
            } else if self.eat(&TokenKind::KwCheck) {
                self.expect(&TokenKind::LeftParen)?;
                let e = self.parse_expr()?;
                self.expect(&TokenKind::RightParen)?;
                constraints.push(ColumnConstraint::Check(e));
            } else {
                break;
            }
        }

        Ok(ColumnDef {
            name,
            type_name,
            constraints,
        })
    }

    fn parse_references(&mut self) -> Result<ColumnConstraint, ParseError> {
        let table = self.expect_ident("a referenced table name")?;
        let column = if self.eat(&TokenKind::LeftParen) {
            let col = self.expect_ident("a referenced column name")?;
            self.expect(&TokenKind::RightParen)?;
            Some(col)
        } else {
            None
        };
        Ok(ColumnConstraint::ForeignKey { table, column })
    }

    fn parse_type_name(&mut self) -> Result<TypeName, ParseError> {
        let name = self.expect_ident("a type name")?;
        let size = if self.eat(&TokenKind::LeftParen) {
            let tok = self.advance();
            let n = match tok.kind {
                TokenKind::Int(n) if n >= 0 && n <= i64::from(u32::MAX) => n as u32,
                other => {
                    return Err(ParseError {
                        message: format!("expected a type size, got {other:?}"),
                        span: tok.span,
                        line: tok.line,
                        col: tok.col,
                    });
                }
            };
            self.expect(&TokenKind::RightParen)?;
            Some(n)
        } else {
            None
        };
        Ok(TypeName { name, size })
    }

    // -----------------------------------------------------------------------
    // INSERT / DELETE
    // -----------------------------------------------------------------------

    fn parse_insert(&mut self) -> Result<InsertStatement, ParseError> {
        self.expect(&TokenKind::KwInsert)?;
        self.expect(&TokenKind::KwInto)?;
        let table = self.expect_ident("a table name")?;

        let columns = if self.eat(&TokenKind::LeftParen) {
            let cols = self.parse_ident_list("a target column name")?;
            self.expect(&TokenKind::RightParen)?;
            Some(cols)
        } else {
            None
        };

        self.expect(&TokenKind::KwValues)?;
        self.expect(&TokenKind::LeftParen)?;
        let mut values = vec![self.parse_literal()?];
        while self.eat(&TokenKind::Comma) {
            values.push(self.parse_literal()?);
        }
        self.expect(&TokenKind::RightParen)?;

        if let Some(cols) = &columns {
            if cols.len() != values.len() {
                return Err(self.err_here(format!(
                    "INSERT names {} target columns but supplies {} values",
                    cols.len(),
                    values.len()
                )));
            }
        }

        Ok(InsertStatement {
            table,
            columns,
            values,
        })
    }

    fn parse_delete(&mut self) -> Result<DeleteStatement, ParseError> {
        self.expect(&TokenKind::KwDelete)?;
        self.expect(&TokenKind::KwFrom)?;
        let table = self.expect_ident("a table name")?;
        let predicate = if self.eat(&TokenKind::KwWhere) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(DeleteStatement { table, predicate })
    }

    /// A literal value, allowing a leading minus on numbers.
    fn parse_literal(&mut self) -> Result<Literal, ParseError> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Int(n) => Ok(Literal::Int(n)),
            TokenKind::Double(v) => Ok(Literal::Double(v)),
            TokenKind::Str(s) => Ok(Literal::String(s)),
            TokenKind::KwNull => Ok(Literal::Null),
            TokenKind::Minus => {
                let tok = self.advance();
                match tok.kind {
                    TokenKind::Int(n) => Ok(Literal::Int(-n)),
                    TokenKind::Double(v) => Ok(Literal::Double(-v)),
                    other => Err(ParseError {
                        message: format!("expected a numeric literal after `-`, got {other:?}"),
                        span: tok.span,
                        line: tok.line,
                        col: tok.col,
                    }),
                }
            }
            other => Err(ParseError {
                message: format!("expected a literal value, got {other:?}"),
                span: tok.span,
                line: tok.line,
                col: tok.col,
            }),
        }
    }
}

/// Record a query-level LIMIT on the projection beneath the ordering chain.
/// Returns false when there is no single projection to carry it (a compound
/// query).
fn attach_limit(node: &mut SraNode, n: u64) -> bool {
    match node {
        SraNode::OrderBy { child, .. } => attach_limit(child, n),
        SraNode::Project { limit, .. } => {
            *limit = Some(n);
            true
        }
        _ => false,
    }
}
