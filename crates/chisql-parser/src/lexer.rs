//! Byte-driven lexer for ChiSQL source text.
//!
//! Converts SQL text into a vector of tokens, tracking line/column for error
//! reporting. Whitespace, `--` line comments, and nested `/* */` block
//! comments are skipped. Lexical failures (unterminated string, malformed
//! number, unknown character) become [`TokenKind::Error`] tokens so the
//! parser can report them with a locus and recover at the next `;`.

use chisql_ast::Span;

use crate::token::{Token, TokenKind};

/// Lexer that produces a stream of tokens from source text.
pub struct Lexer<'a> {
    /// The source bytes (UTF-8).
    src: &'a [u8],
    /// Current byte offset into src.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source text.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            src: source.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Tokenize the entire input into a Vec of tokens, terminated by `Eof`.
    #[must_use]
    pub fn tokenize(source: &'a str) -> Vec<Token> {
        let mut lexer = Self::new(source);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token();
            let is_eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Produce the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        if self.pos >= self.src.len() {
            return Token {
                kind: TokenKind::Eof,
                span: Span::new(self.pos as u32, self.pos as u32),
                line: self.line,
                col: self.col,
            };
        }

        let start = self.pos;
        let start_line = self.line;
        let start_col = self.col;
        let ch = self.src[self.pos];

        let kind = match ch {
            b'\'' => self.lex_string(),
            b'"' => self.lex_quoted_id(),
            b'0'..=b'9' => self.lex_number(),
            b'.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => self.lex_number(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.lex_identifier(),

            b'+' => {
                self.advance();
                TokenKind::Plus
            }
            b'-' => {
                self.advance();
                TokenKind::Minus
            }
            b'*' => {
                self.advance();
                TokenKind::Star
            }
            b'/' => {
                self.advance();
                TokenKind::Slash
            }
            b'.' => {
                self.advance();
                TokenKind::Dot
            }
            b',' => {
                self.advance();
                TokenKind::Comma
            }
            b';' => {
                self.advance();
                TokenKind::Semicolon
            }
            b'(' => {
                self.advance();
                TokenKind::LeftParen
            }
            b')' => {
                self.advance();
                TokenKind::RightParen
            }
            b'=' => {
                self.advance();
                TokenKind::Eq
            }
            b'<' => self.lex_lt(),
            b'>' => self.lex_gt(),
            b'!' => self.lex_bang(),

            _ => {
                self.advance();
                let s = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
                TokenKind::Error(format!("unexpected character: {s}"))
            }
        };

        Token {
            kind,
            span: Span::new(start as u32, self.pos as u32),
            line: start_line,
            col: start_col,
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn advance(&mut self) -> u8 {
        let ch = self.src[self.pos];
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        ch
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    /// Skip whitespace, line comments (`--`), and nested block comments.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.src.len() && self.src[self.pos].is_ascii_whitespace() {
                self.advance();
            }

            if self.pos >= self.src.len() {
                break;
            }

            if self.src[self.pos] == b'-' && self.peek_at(1) == Some(b'-') {
                self.advance();
                self.advance();
                while self.pos < self.src.len() && self.src[self.pos] != b'\n' {
                    self.advance();
                }
                continue;
            }

            if self.src[self.pos] == b'/' && self.peek_at(1) == Some(b'*') {
                self.advance();
                self.advance();
                let mut depth = 1u32;
                while self.pos < self.src.len() && depth > 0 {
                    if self.src[self.pos] == b'/' && self.peek_at(1) == Some(b'*') {
                        self.advance();
                        self.advance();
                        depth += 1;
                    } else if self.src[self.pos] == b'*' && self.peek_at(1) == Some(b'/') {
                        self.advance();
                        self.advance();
                        depth -= 1;
                    } else {
                        self.advance();
                    }
                }
                continue;
            }

            break;
        }
    }

    // -----------------------------------------------------------------------
    // Literal tokenizers
    // -----------------------------------------------------------------------

    /// Lex a single-quoted string literal with `''` escaping.
    fn lex_string(&mut self) -> TokenKind {
        self.advance(); // opening quote

        let mut value = String::new();
        loop {
            match self.peek() {
                None => return TokenKind::Error("unterminated string literal".to_owned()),
                Some(b'\'') => {
                    self.advance();
                    if self.peek() == Some(b'\'') {
                        self.advance();
                        value.push('\'');
                    } else {
                        return TokenKind::Str(value);
                    }
                }
                Some(_) => {
                    let ch_start = self.pos;
                    self.advance();
                    // Keep multi-byte UTF-8 sequences intact.
                    while self.pos < self.src.len() && (self.src[self.pos] & 0xC0) == 0x80 {
                        self.advance();
                    }
                    value.push_str(&String::from_utf8_lossy(&self.src[ch_start..self.pos]));
                }
            }
        }
    }

    /// Lex a double-quoted identifier with `""` escaping.
    fn lex_quoted_id(&mut self) -> TokenKind {
        self.advance(); // opening quote

        let mut value = String::new();
        loop {
            match self.peek() {
                None => return TokenKind::Error("unterminated quoted identifier".to_owned()),
                Some(b'"') => {
                    self.advance();
                    if self.peek() == Some(b'"') {
                        self.advance();
                        value.push('"');
                    } else {
                        return TokenKind::QuotedId(value);
                    }
                }
                Some(_) => {
                    let ch_start = self.pos;
                    self.advance();
                    while self.pos < self.src.len() && (self.src[self.pos] & 0xC0) == 0x80 {
                        self.advance();
                    }
                    value.push_str(&String::from_utf8_lossy(&self.src[ch_start..self.pos]));
                }
            }
        }
    }

    /// Lex a numeric literal: integer, or double when a decimal point or
    /// exponent is present.
    fn lex_number(&mut self) -> TokenKind {
        let start = self.pos;
        let mut is_double = false;

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        // Covers both `3.14` and the leading-dot form `.5`.
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_double = true;
            self.advance(); // `.`
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mut lookahead = 1;
            if matches!(self.peek_at(1), Some(b'+' | b'-')) {
                lookahead = 2;
            }
            if self.peek_at(lookahead).is_some_and(|c| c.is_ascii_digit()) {
                is_double = true;
                for _ in 0..lookahead {
                    self.advance();
                }
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }

        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap_or("");
        if is_double {
            match text.parse::<f64>() {
                Ok(v) => TokenKind::Double(v),
                Err(_) => TokenKind::Error(format!("malformed numeric literal: {text}")),
            }
        } else {
            match text.parse::<i64>() {
                Ok(v) => TokenKind::Int(v),
                Err(_) => TokenKind::Error(format!("integer literal out of range: {text}")),
            }
        }
    }

    fn lex_identifier(&mut self) -> TokenKind {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.advance();
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap_or("");
        TokenKind::lookup_keyword(text).unwrap_or_else(|| TokenKind::Id(text.to_owned()))
    }

    // -----------------------------------------------------------------------
    // Multi-character operators
    // -----------------------------------------------------------------------

    fn lex_lt(&mut self) -> TokenKind {
        self.advance();
        match self.peek() {
            Some(b'=') => {
                self.advance();
                TokenKind::Le
            }
            Some(b'>') => {
                self.advance();
                TokenKind::Ne
            }
            _ => TokenKind::Lt,
        }
    }

    fn lex_gt(&mut self) -> TokenKind {
        self.advance();
        if self.peek() == Some(b'=') {
            self.advance();
            TokenKind::Ge
        } else {
            TokenKind::Gt
        }
    }

    fn lex_bang(&mut self) -> TokenKind {
        self.advance();
        if self.peek() == Some(b'=') {
            self.advance();
            TokenKind::Ne
        } else {
            TokenKind::Error("unexpected character: !".to_owned())
        }
    }
}
