//! Pratt expression parser with ChiSQL operator precedence.
//!
//! Precedence table (lowest to highest):
//!   OR
//!   AND
//!   NOT (prefix)
//!   = != < <= > >= IN    (non-associative: chaining is a syntax error)
//!   + -
//!   * /
//!   - (unary prefix)

use chisql_ast::{AggregateFunc, BinaryOp, ColumnRef, Expr, Literal, Subquery, UnaryOp};

use crate::parser::{ParseError, Parser};
use crate::token::TokenKind;

// Binding powers: higher = tighter binding.
// Left BP is checked against min_bp; right BP is passed to the recursive call.
mod bp {
    pub const OR: (u8, u8) = (1, 2);
    pub const AND: (u8, u8) = (3, 4);
    // Prefix NOT right BP:
    pub const NOT_PREFIX: u8 = 5;
    // Comparisons and IN (non-associative, enforced after reduction):
    pub const COMPARISON: (u8, u8) = (7, 8);
    // Addition / subtraction:
    pub const ADD: (u8, u8) = (9, 10);
    // Multiplication / division:
    pub const MUL: (u8, u8) = (11, 12);
    // Unary minus right BP (tighter than any binary arithmetic):
    pub const UNARY: u8 = 15;
}

impl Parser {
    /// Parse a single SQL expression.
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.enter_recursion()?;
        let result = self.parse_expr_bp(0);
        self.leave_recursion();
        result
    }

    // ── Pratt core ──────────────────────────────────────────────────────

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let Some((l_bp, r_bp)) = self.infix_bp() else {
                break;
            };
            if l_bp < min_bp {
                break;
            }
            let comparison = l_bp == bp::COMPARISON.0;
            lhs = self.parse_infix(lhs, r_bp)?;
            if comparison && self.at_comparison() {
                return Err(self.err_here("comparisons are non-associative"));
            }
        }

        Ok(lhs)
    }

    /// Binding powers of the infix operator at the cursor, if any.
    fn infix_bp(&self) -> Option<(u8, u8)> {
        match self.peek() {
            TokenKind::KwOr => Some(bp::OR),
            TokenKind::KwAnd => Some(bp::AND),
            TokenKind::Eq
            | TokenKind::Ne
            | TokenKind::Lt
            | TokenKind::Le
            | TokenKind::Gt
            | TokenKind::Ge
            | TokenKind::KwIn => Some(bp::COMPARISON),
            TokenKind::KwNot if matches!(self.peek_nth(1), TokenKind::KwIn) => {
                Some(bp::COMPARISON)
            }
            TokenKind::Plus | TokenKind::Minus => Some(bp::ADD),
            TokenKind::Star | TokenKind::Slash => Some(bp::MUL),
            _ => None,
        }
    }

    /// Whether the cursor sits on a comparison-family operator.
    fn at_comparison(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Eq
                | TokenKind::Ne
                | TokenKind::Lt
                | TokenKind::Le
                | TokenKind::Gt
                | TokenKind::Ge
                | TokenKind::KwIn
        ) || (matches!(self.peek(), TokenKind::KwNot)
            && matches!(self.peek_nth(1), TokenKind::KwIn))
    }

    fn parse_infix(&mut self, lhs: Expr, r_bp: u8) -> Result<Expr, ParseError> {
        let op = match self.peek() {
            TokenKind::KwOr => BinaryOp::Or,
            TokenKind::KwAnd => BinaryOp::And,
            TokenKind::Eq => BinaryOp::Eq,
            TokenKind::Ne => BinaryOp::Ne,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::Le => BinaryOp::Le,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::Ge => BinaryOp::Ge,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::KwIn => {
                self.advance();
                return self.parse_in_subquery(lhs, false);
            }
            TokenKind::KwNot => {
                self.advance(); // NOT
                self.advance(); // IN (guaranteed by infix_bp)
                return self.parse_in_subquery(lhs, true);
            }
            other => {
                return Err(self.err_here(format!("expected operator, got {other:?}")));
            }
        };
        self.advance();
        self.enter_recursion()?;
        let rhs = self.parse_expr_bp(r_bp);
        self.leave_recursion();
        Ok(Expr::binary(op, lhs, rhs?))
    }

    /// `lhs IN (SELECT ...)`, optionally negated (`NOT IN`).
    fn parse_in_subquery(&mut self, lhs: Expr, negated: bool) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let query = self.parse_query()?;
        self.expect(&TokenKind::RightParen)?;
        let node = Expr::InSubquery {
            expr: Box::new(lhs),
            query: Box::new(Subquery::Sugared(query)),
        };
        if negated {
            Ok(Expr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(node),
            })
        } else {
            Ok(node)
        }
    }

    // ── Prefix (nud) ────────────────────────────────────────────────────

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Int(i) => Ok(Expr::Literal(Literal::Int(i))),
            TokenKind::Double(v) => Ok(Expr::Literal(Literal::Double(v))),
            TokenKind::Str(s) => Ok(Expr::Literal(Literal::String(s))),
            TokenKind::KwNull => Ok(Expr::Literal(Literal::Null)),

            TokenKind::Minus => {
                self.enter_recursion()?;
                let inner = self.parse_expr_bp(bp::UNARY);
                self.leave_recursion();
                Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    expr: Box::new(inner?),
                })
            }
            TokenKind::KwNot => {
                self.enter_recursion()?;
                let inner = self.parse_expr_bp(bp::NOT_PREFIX);
                self.leave_recursion();
                Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    expr: Box::new(inner?),
                })
            }

            TokenKind::LeftParen => {
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RightParen)?;
                Ok(inner)
            }

            TokenKind::Id(name) | TokenKind::QuotedId(name) => self.parse_column_ref(name),

            TokenKind::KwCount => self.parse_aggregate(AggregateFunc::Count),
            TokenKind::KwSum => self.parse_aggregate(AggregateFunc::Sum),
            TokenKind::KwAvg => self.parse_aggregate(AggregateFunc::Avg),
            TokenKind::KwMin => self.parse_aggregate(AggregateFunc::Min),
            TokenKind::KwMax => self.parse_aggregate(AggregateFunc::Max),

            TokenKind::Error(msg) => Err(ParseError {
                message: msg,
                span: tok.span,
                line: tok.line,
                col: tok.col,
            }),
            other => Err(ParseError {
                message: format!("expected expression, got {other:?}"),
                span: tok.span,
                line: tok.line,
                col: tok.col,
            }),
        }
    }

    /// A possibly-qualified column reference; `name` is already consumed.
    fn parse_column_ref(&mut self, name: String) -> Result<Expr, ParseError> {
        if self.eat(&TokenKind::Dot) {
            let tok = self.advance();
            match tok.kind {
                TokenKind::Id(col) | TokenKind::QuotedId(col) => {
                    Ok(Expr::Column(ColumnRef::qualified(name, col)))
                }
                TokenKind::Star => Ok(Expr::Column(ColumnRef::qualified(name, "*"))),
                other => Err(ParseError {
                    message: format!("expected column name after `.`, got {other:?}"),
                    span: tok.span,
                    line: tok.line,
                    col: tok.col,
                }),
            }
        } else {
            Ok(Expr::Column(ColumnRef::bare(name)))
        }
    }

    /// An aggregate call; the function keyword is already consumed.
    /// Aggregates never nest, and only COUNT accepts `*`.
    fn parse_aggregate(&mut self, func: AggregateFunc) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let arg = if func == AggregateFunc::Count && self.check(&TokenKind::Star) {
            self.advance();
            Expr::Column(ColumnRef::bare("*"))
        } else {
            let arg = self.parse_expr()?;
            if arg.contains_aggregate() {
                return Err(self.err_here("aggregate calls cannot nest"));
            }
            arg
        };
        self.expect(&TokenKind::RightParen)?;
        Ok(Expr::Aggregate {
            func,
            arg: Box::new(arg),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_expr_str(sql: &str) -> Result<Expr, ParseError> {
        let mut p = Parser::from_sql(sql);
        p.parse_expr()
    }

    fn expr_ok(sql: &str) -> Expr {
        parse_expr_str(sql).expect("expression should parse")
    }

    #[test]
    fn mul_binds_tighter_than_add() {
        assert_eq!(
            expr_ok("1 + 2 * 3"),
            Expr::binary(
                BinaryOp::Add,
                Expr::Literal(Literal::Int(1)),
                Expr::binary(
                    BinaryOp::Mul,
                    Expr::Literal(Literal::Int(2)),
                    Expr::Literal(Literal::Int(3)),
                ),
            )
        );
    }

    #[test]
    fn arithmetic_is_left_associative() {
        assert_eq!(
            expr_ok("1 - 2 - 3"),
            Expr::binary(
                BinaryOp::Sub,
                Expr::binary(
                    BinaryOp::Sub,
                    Expr::Literal(Literal::Int(1)),
                    Expr::Literal(Literal::Int(2)),
                ),
                Expr::Literal(Literal::Int(3)),
            )
        );
    }

    #[test]
    fn unary_minus_binds_tighter_than_mul() {
        assert_eq!(
            expr_ok("-x * y"),
            Expr::binary(
                BinaryOp::Mul,
                Expr::Unary {
                    op: UnaryOp::Neg,
                    expr: Box::new(Expr::column("x")),
                },
                Expr::column("y"),
            )
        );
    }

    #[test]
    fn not_binds_tighter_than_and_which_binds_tighter_than_or() {
        assert_eq!(
            expr_ok("NOT a AND b OR c"),
            Expr::binary(
                BinaryOp::Or,
                Expr::binary(
                    BinaryOp::And,
                    Expr::Unary {
                        op: UnaryOp::Not,
                        expr: Box::new(Expr::column("a")),
                    },
                    Expr::column("b"),
                ),
                Expr::column("c"),
            )
        );
    }

    #[test]
    fn chained_comparison_is_rejected() {
        let err = parse_expr_str("a = b = c").unwrap_err();
        assert!(err.message.contains("non-associative"), "{}", err.message);
        assert!(parse_expr_str("a < b < c").is_err());
    }

    #[test]
    fn comparison_of_arithmetic_operands() {
        assert_eq!(
            expr_ok("x + 1 < y * 2"),
            Expr::binary(
                BinaryOp::Lt,
                Expr::binary(
                    BinaryOp::Add,
                    Expr::column("x"),
                    Expr::Literal(Literal::Int(1)),
                ),
                Expr::binary(
                    BinaryOp::Mul,
                    Expr::column("y"),
                    Expr::Literal(Literal::Int(2)),
                ),
            )
        );
    }

    #[test]
    fn qualified_column_and_wildcard() {
        assert_eq!(expr_ok("t.x"), Expr::qualified_column("t", "x"));
        assert_eq!(expr_ok("t.*"), Expr::Column(ColumnRef::qualified("t", "*")));
    }

    #[test]
    fn count_star_is_accepted() {
        assert_eq!(
            expr_ok("COUNT(*)"),
            Expr::Aggregate {
                func: AggregateFunc::Count,
                arg: Box::new(Expr::Column(ColumnRef::bare("*"))),
            }
        );
    }

    #[test]
    fn sum_star_is_rejected() {
        assert!(parse_expr_str("SUM(*)").is_err());
    }

    #[test]
    fn nested_aggregate_is_rejected() {
        let err = parse_expr_str("SUM(COUNT(x))").unwrap_err();
        assert!(err.message.contains("nest"), "{}", err.message);
    }

    #[test]
    fn in_subquery() {
        let e = expr_ok("x IN (SELECT a FROM t)");
        assert!(matches!(e, Expr::InSubquery { .. }));
    }

    #[test]
    fn not_in_subquery_desugars_to_not_wrapping_in() {
        let e = expr_ok("x NOT IN (SELECT a FROM t)");
        if let Expr::Unary {
            op: UnaryOp::Not,
            expr,
        } = e
        {
            assert!(matches!(*expr, Expr::InSubquery { .. }));
        } else {
            unreachable!("expected NOT wrapping IN");
        }
    }

    #[test]
    fn parenthesized_expression_overrides_precedence() {
        assert_eq!(
            expr_ok("(1 + 2) * 3"),
            Expr::binary(
                BinaryOp::Mul,
                Expr::binary(
                    BinaryOp::Add,
                    Expr::Literal(Literal::Int(1)),
                    Expr::Literal(Literal::Int(2)),
                ),
                Expr::Literal(Literal::Int(3)),
            )
        );
    }
}
