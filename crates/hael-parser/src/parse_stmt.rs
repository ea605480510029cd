//! Statement parsing.
//!
//! Semicolon rules:
//! - `$name = ...;` and `return ...;` always need their `;`
//! - an expression statement may drop it in front of `}` or end of input,
//!   or when the expression itself ends with a block (`if`, function literal)

use crate::parse_expr::Precedence;
use crate::parser::Parser;
use hael_lexer::TokenKind;
use hael_types::ast::*;
use hael_types::ErrorCode;

impl<'src> Parser<'src> {
    /// Parse a block of statements: `{ stmts... }`
    pub(crate) fn parse_block(&mut self) -> Option<Block> {
        let start = self.current_span();
        self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize(),
            }
        }
        self.expect(TokenKind::RBrace)?;
        let span = start.to(self.previous_span());
        Some(Block { stmts, span })
    }

    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        match self.peek_kind() {
            TokenKind::Let => self.parse_let_stmt().map(Stmt::Let),
            TokenKind::Return => self.parse_return_stmt().map(Stmt::Return),
            TokenKind::Ident if self.look_ahead() == TokenKind::Assign => {
                let name = self.peek().literal.clone();
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("bindings are declared with '$': write '${name} = ...'"),
                );
                None
            }
            _ => self.parse_expr_stmt().map(Stmt::Expr),
        }
    }

    /// `$name = expr;` or `$name ==> (params) { body };`
    fn parse_let_stmt(&mut self) -> Option<LetStmt> {
        let start = self.advance().span; // eat `$`
        let name = self.expect_identifier()?;
        let value = if self.check(TokenKind::Function) {
            self.nested(Self::parse_function_literal)?
        } else {
            self.expect(TokenKind::Assign)?;
            self.parse_expression(Precedence::Lowest)?
        };
        let span = start.to(value.span);
        self.expect_semicolon("binding");
        Some(LetStmt { name, value, span })
    }

    /// `return expr;`
    fn parse_return_stmt(&mut self) -> Option<ReturnStmt> {
        let start = self.advance().span; // eat `return`
        let value = self.parse_expression(Precedence::Lowest)?;
        let span = start.to(value.span);
        self.expect_semicolon("return value");
        Some(ReturnStmt { value, span })
    }

    fn parse_expr_stmt(&mut self) -> Option<ExprStmt> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        let span = expr.span;
        if !self.eat(TokenKind::Semicolon)
            && !self.check(TokenKind::RBrace)
            && !self.at_end()
            && !expr.ends_with_block()
        {
            self.expect_semicolon("expression");
        }
        Some(ExprStmt { expr, span })
    }
}
