//! Expression parsing (Pratt / precedence climbing).
//!
//! Precedence (lowest → highest):
//! 1. `==`, `!=`
//! 2. `<`, `>`
//! 3. `+`, `-`
//! 4. `*`, `/`
//! 5. prefix `!`, `-`
//! 6. call `f(...)`, index `a[...]`
//!
//! Binary operators are left-associative. Comparisons chain like any
//! other operator: `5 < 10 > 5` parses as `((5 < 10) > 5)`.

use std::rc::Rc;

use hael_lexer::TokenKind;
use hael_types::ast::*;
use hael_types::ErrorCode;

use crate::parser::{describe, Parser};

/// Binding power of an operator in infix position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

impl Precedence {
    /// The precedence of `kind` when it follows an operand.
    pub(crate) fn of(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
            TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
            TokenKind::LParen | TokenKind::LBracket => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }
}

fn infix_op(kind: TokenKind) -> Option<InfixOp> {
    match kind {
        TokenKind::Eq => Some(InfixOp::Eq),
        TokenKind::NotEq => Some(InfixOp::NotEq),
        TokenKind::Lt => Some(InfixOp::Less),
        TokenKind::Gt => Some(InfixOp::Greater),
        TokenKind::Plus => Some(InfixOp::Add),
        TokenKind::Minus => Some(InfixOp::Sub),
        TokenKind::Asterisk => Some(InfixOp::Mul),
        TokenKind::Slash => Some(InfixOp::Div),
        _ => None,
    }
}

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Point
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse an expression whose operators all bind tighter than `precedence`.
    pub(crate) fn parse_expression(&mut self, precedence: Precedence) -> Option<Expr> {
        self.nested(|p| p.parse_precedence(precedence))
    }

    fn parse_precedence(&mut self, precedence: Precedence) -> Option<Expr> {
        let mut left = self.parse_prefix()?;
        while precedence < Precedence::of(self.peek_kind()) {
            left = match self.peek_kind() {
                TokenKind::LParen => self.parse_call(left)?,
                TokenKind::LBracket => self.parse_index(left)?,
                _ => self.parse_infix(left)?,
            };
        }
        Some(left)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Prefix Position
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_prefix(&mut self) -> Option<Expr> {
        match self.peek_kind() {
            TokenKind::Ident => {
                let token = self.advance();
                Some(Expr::new(ExprKind::Identifier(token.literal), token.span))
            }
            TokenKind::Int => self.parse_integer(),
            TokenKind::String => {
                let token = self.advance();
                Some(Expr::new(ExprKind::StringLit(token.literal), token.span))
            }
            TokenKind::True | TokenKind::False => {
                let token = self.advance();
                let value = token.kind == TokenKind::True;
                Some(Expr::new(ExprKind::BooleanLit(value), token.span))
            }
            TokenKind::Bang => self.parse_prefix_op(PrefixOp::Not),
            TokenKind::Minus => self.parse_prefix_op(PrefixOp::Neg),
            TokenKind::LParen => self.parse_grouped(),
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_hash_literal(),
            TokenKind::If => self.parse_if_expr(),
            TokenKind::Function => self.parse_function_literal(),
            TokenKind::Illegal => {
                let token = self.advance();
                if token.literal.starts_with('"') {
                    self.error_at(
                        ErrorCode::UNTERMINATED_STRING,
                        "unterminated string literal",
                        token.span,
                    );
                } else {
                    self.error_at(
                        ErrorCode::ILLEGAL_CHARACTER,
                        format!("illegal character '{}'", token.literal),
                        token.span,
                    );
                }
                None
            }
            kind => {
                self.error_at_current(
                    ErrorCode::NO_PREFIX_RULE,
                    format!("no prefix parse rule for {kind} found"),
                );
                None
            }
        }
    }

    fn parse_integer(&mut self) -> Option<Expr> {
        let token = self.advance();
        match token.literal.parse::<i64>() {
            Ok(value) => Some(Expr::new(ExprKind::IntegerLit(value), token.span)),
            Err(_) => {
                self.error_at(
                    ErrorCode::INVALID_INTEGER,
                    format!("could not parse '{}' as integer", token.literal),
                    token.span,
                );
                None
            }
        }
    }

    /// `!operand` or `-operand`
    fn parse_prefix_op(&mut self, op: PrefixOp) -> Option<Expr> {
        let start = self.advance().span;
        let operand = self.parse_expression(Precedence::Prefix)?;
        let span = start.to(operand.span);
        Some(Expr::new(
            ExprKind::Prefix {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    /// `( expr )`: resets the precedence bound; no node of its own.
    fn parse_grouped(&mut self) -> Option<Expr> {
        self.advance(); // eat `(`
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::RParen)?;
        Some(expr)
    }

    /// `[a, b, ...]`
    fn parse_array_literal(&mut self) -> Option<Expr> {
        let start = self.advance().span;
        let elements = self.parse_expression_list(TokenKind::RBracket)?;
        let span = start.to(self.previous_span());
        Some(Expr::new(ExprKind::ArrayLit(elements), span))
    }

    /// `{key: value, ...}`
    fn parse_hash_literal(&mut self) -> Option<Expr> {
        let start = self.advance().span;
        let mut entries = Vec::new();
        if !self.eat(TokenKind::RBrace) {
            loop {
                let key = self.parse_expression(Precedence::Lowest)?;
                self.expect(TokenKind::Colon)?;
                let value = self.parse_expression(Precedence::Lowest)?;
                entries.push(HashEntry { key, value });
                if !self.eat(TokenKind::Comma) {
                    self.expect(TokenKind::RBrace)?;
                    break;
                }
            }
        }
        let span = start.to(self.previous_span());
        Some(Expr::new(ExprKind::HashLit(entries), span))
    }

    /// `if cond { ... } [else { ... }]`
    ///
    /// The condition is an ordinary expression, so the customary parentheses
    /// parse as grouping.
    fn parse_if_expr(&mut self) -> Option<Expr> {
        let start = self.advance().span;
        let condition = self.parse_expression(Precedence::Lowest)?;
        let consequence = self.parse_block()?;
        let alternative = if self.eat(TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };
        let span = start.to(self.previous_span());
        Some(Expr::new(
            ExprKind::If(Box::new(IfExpr {
                condition,
                consequence,
                alternative,
                span,
            })),
            span,
        ))
    }

    /// `==> (a, b) { body }`
    pub(crate) fn parse_function_literal(&mut self) -> Option<Expr> {
        let start = self.advance().span; // eat `==>`
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.eat(TokenKind::RParen) {
            loop {
                params.push(self.expect_identifier()?);
                if !self.eat(TokenKind::Comma) {
                    self.expect(TokenKind::RParen)?;
                    break;
                }
            }
        }
        let body = self.parse_block()?;
        let span = start.to(self.previous_span());
        let literal = FunctionLit { params, body, span };
        Some(Expr::new(ExprKind::Function(Rc::new(literal)), span))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Infix Position
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_infix(&mut self, left: Expr) -> Option<Expr> {
        let token = self.advance();
        let Some(op) = infix_op(token.kind) else {
            self.error_at(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("unexpected {} in expression", describe(&token)),
                token.span,
            );
            return None;
        };
        let right = self.parse_expression(Precedence::of(token.kind))?;
        let span = left.span.to(right.span);
        Some(Expr::new(
            ExprKind::Infix {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            span,
        ))
    }

    /// `callee(args...)`
    fn parse_call(&mut self, callee: Expr) -> Option<Expr> {
        self.advance(); // eat `(`
        let args = self.parse_expression_list(TokenKind::RParen)?;
        let span = callee.span.to(self.previous_span());
        Some(Expr::new(
            ExprKind::Call {
                callee: Box::new(callee),
                args,
            },
            span,
        ))
    }

    /// `collection[index]`
    fn parse_index(&mut self, collection: Expr) -> Option<Expr> {
        self.advance(); // eat `[`
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::RBracket)?;
        let span = collection.span.to(self.previous_span());
        Some(Expr::new(
            ExprKind::Index {
                collection: Box::new(collection),
                index: Box::new(index),
            },
            span,
        ))
    }

    /// Comma-separated expressions up to and including `end`.
    /// The opening delimiter has already been consumed.
    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expr>> {
        let mut items = Vec::new();
        if self.eat(end) {
            return Some(items);
        }
        loop {
            items.push(self.parse_expression(Precedence::Lowest)?);
            if !self.eat(TokenKind::Comma) {
                self.expect(end)?;
                return Some(items);
            }
        }
    }
}
