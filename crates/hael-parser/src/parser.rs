//! Core parser infrastructure: token cursor, error reporting, helpers.

use hael_lexer::{Keywords, Lexer, Token, TokenKind};
use hael_types::ast::{Ident, Program};
use hael_types::{ErrorCode, SourceFile, Span, SyntaxError, SyntaxErrors, MAX_ERRORS};

/// Maximum nesting of expressions and function bodies.
pub const MAX_NESTING_DEPTH: u32 = 100;

/// The Hael parser.
///
/// Pulls tokens from a [`Lexer`] on demand, keeping a two-token window
/// (current and next). Collects errors and recovers so that one parse
/// reports as many problems as possible.
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    /// The token under the cursor.
    current: Token,
    /// One token of lookahead.
    next: Token,
    /// Span of the most recently consumed token.
    previous_span: Span,
    /// Source file for error context.
    source_file: &'src SourceFile,
    /// Collected errors.
    errors: SyntaxErrors,
    /// Current nesting depth, see [`Parser::nested`].
    pub(crate) depth: u32,
}

/// Result of parsing.
///
/// The program is always present; when `errors` is non-empty it holds
/// whatever statements parsed cleanly and must not be evaluated.
#[derive(Debug)]
pub struct ParseResult {
    pub program: Program,
    pub errors: SyntaxErrors,
}

impl ParseResult {
    pub fn has_errors(&self) -> bool {
        self.errors.has_errors()
    }
}

impl<'src> Parser<'src> {
    /// Create a parser reading from `lexer`.
    pub fn new(mut lexer: Lexer<'src>) -> Self {
        let current = lexer.next_token();
        let next = lexer.next_token();
        let source_file = lexer.source_file();
        Self {
            lexer,
            current,
            next,
            previous_span: Span::point(1, 1),
            source_file,
            errors: SyntaxErrors::empty(),
            depth: 0,
        }
    }

    /// Create a parser over a source file with the default keywords.
    pub fn from_source(source_file: &'src SourceFile) -> Self {
        Self::new(Lexer::new(source_file))
    }

    /// Create a parser over a source file with custom boolean keywords.
    pub fn with_keywords(source_file: &'src SourceFile, keywords: Keywords) -> Self {
        Self::new(Lexer::with_keywords(source_file, keywords))
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        &self.current
    }

    /// Returns the kind of the current token.
    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.current.kind
    }

    /// Returns the kind of the token after the current one.
    pub(crate) fn look_ahead(&self) -> TokenKind {
        self.next.kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let following = self.lexer.next_token();
        let next = std::mem::replace(&mut self.next, following);
        let token = std::mem::replace(&mut self.current, next);
        self.previous_span = token.span;
        token
    }

    /// Returns the previously consumed token's span.
    pub(crate) fn previous_span(&self) -> Span {
        self.previous_span
    }

    /// Returns the span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.current.span
    }

    /// Returns `true` if the current token is `Eof`.
    pub(crate) fn at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect a specific token kind. Returns the token if matched, or emits an error.
    pub(crate) fn expect(&mut self, expected: TokenKind) -> Option<Token> {
        if self.check(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected {}, got {}", expected, describe(self.peek())),
            );
            None
        }
    }

    /// Expect an identifier token.
    pub(crate) fn expect_identifier(&mut self) -> Option<Ident> {
        if self.check(TokenKind::Ident) {
            let token = self.advance();
            Some(Ident::new(token.literal, token.span))
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected IDENT, got {}", describe(self.peek())),
            );
            None
        }
    }

    /// Expect the `;` that ends a statement.
    ///
    /// A missing semicolon is recorded but does not abandon the statement;
    /// parsing resumes at the current token. An illegal token in that
    /// position is left to report itself.
    pub(crate) fn expect_semicolon(&mut self, what: &str) {
        if self.eat(TokenKind::Semicolon) || self.check(TokenKind::Illegal) {
            return;
        }
        self.error_at_current(
            ErrorCode::MISSING_SEMICOLON,
            format!("expected ';' after {what}, got {}", describe(self.peek())),
        );
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    /// Report an error at the current token position.
    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    /// Report an error at a specific span.
    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let error = SyntaxError::new(&self.source_file.name, code, message, span, source_line);
        log::trace!("syntax error: {error}");
        self.errors.push(error);
    }

    /// Returns `true` if we've hit the error limit and should stop.
    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.total_errors >= MAX_ERRORS
    }

    /// Run `parse` one nesting level deeper, reporting E106 instead once
    /// [`MAX_NESTING_DEPTH`] is reached.
    pub(crate) fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            self.error_at_current(
                ErrorCode::NESTING_TOO_DEEP,
                format!("maximum nesting depth is {MAX_NESTING_DEPTH}"),
            );
            return None;
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip tokens until a statement boundary.
    ///
    /// Consumes up to and including the next `;`, or stops in front of a
    /// `}` or end of input.
    pub(crate) fn synchronize(&mut self) {
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the whole input into a [`Program`], collecting every error.
    pub fn parse_program(mut self) -> ParseResult {
        let start = self.current_span();
        let mut stmts = Vec::new();
        while !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            if self.check(TokenKind::RBrace) {
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, "unexpected '}'");
                self.advance();
                continue;
            }
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None => {
                    self.synchronize();
                    // A `}` reached by recovery closes the broken statement.
                    self.eat(TokenKind::RBrace);
                }
            }
        }
        let span = if stmts.is_empty() {
            start
        } else {
            start.to(self.previous_span())
        };
        log::debug!(
            "parsed {} statements from {} ({} errors)",
            stmts.len(),
            self.source_file.name,
            self.errors.total_errors
        );
        ParseResult {
            program: Program { stmts, span },
            errors: self.errors,
        }
    }
}

/// Render a token for an error message: `IDENT 'x'`, or just `EOF`.
pub(crate) fn describe(token: &Token) -> String {
    if token.literal.is_empty() {
        token.kind.to_string()
    } else {
        format!("{} '{}'", token.kind, token.literal)
    }
}
