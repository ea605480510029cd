//! AST node types for the Hael language.
//!
//! Every node carries a [`Span`] for error reporting. Recursive expression
//! variants are boxed; function literals sit behind an [`Rc`] so every
//! closure created from one literal shares its parameter list and body.
//!
//! `Display` renders nodes back to source-like text with every prefix and
//! infix expression fully parenthesized, which makes operator precedence
//! visible: `1 + 2 * 3` renders as `(1 + (2 * 3))`.

use crate::Span;
use serde::Serialize;
use std::fmt;
use std::rc::Rc;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete program: the top-level statement sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// `{ statements... }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    /// `$name = expr;` or `$name ==> (params) { body };`
    Let(LetStmt),
    /// `return expr;`
    Return(ReturnStmt),
    /// A bare expression, evaluated for its value.
    Expr(ExprStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Let(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Expr(s) => s.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LetStmt {
    pub name: Ident,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnStmt {
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns `true` if the expression's source text ends with a `}` block,
    /// which lets an expression statement omit its semicolon.
    pub fn ends_with_block(&self) -> bool {
        matches!(self.kind, ExprKind::If(_) | ExprKind::Function(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExprKind {
    // ── Literals ──
    /// `five`
    Identifier(String),
    /// `5`
    IntegerLit(i64),
    /// `"foo bar"`
    StringLit(String),
    /// The true / false keywords, whatever their spelling.
    BooleanLit(bool),
    /// `[expr, ...]`
    ArrayLit(Vec<Expr>),
    /// `{key: value, ...}` in source order; duplicates are kept.
    HashLit(Vec<HashEntry>),

    // ── Operators ──
    /// `!x`, `-x`
    Prefix { op: PrefixOp, operand: Box<Expr> },
    /// `a + b`, `a == b`, ...
    Infix {
        left: Box<Expr>,
        op: InfixOp,
        right: Box<Expr>,
    },
    /// `collection[index]`
    Index {
        collection: Box<Expr>,
        index: Box<Expr>,
    },

    // ── Control Flow ──
    /// `if (cond) { ... } [else { ... }]`
    If(Box<IfExpr>),

    // ── Functions ──
    /// `==> (params) { body }`
    Function(Rc<FunctionLit>),
    /// `callee(args...)`
    Call { callee: Box<Expr>, args: Vec<Expr> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashEntry {
    pub key: Expr,
    pub value: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrefixOp {
    /// `!x`
    Not,
    /// `-x`
    Neg,
}

impl PrefixOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrefixOp::Not => "!",
            PrefixOp::Neg => "-",
        }
    }
}

/// Infix operators, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InfixOp {
    Eq,
    NotEq,
    Less,
    Greater,
    Add,
    Sub,
    Mul,
    Div,
}

impl InfixOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfixOp::Eq => "==",
            InfixOp::NotEq => "!=",
            InfixOp::Less => "<",
            InfixOp::Greater => ">",
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
        }
    }
}

/// `if (cond) { stmts... } [else { stmts... }]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfExpr {
    pub condition: Expr,
    pub consequence: Block,
    pub alternative: Option<Block>,
    pub span: Span,
}

/// `==> (params) { body }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionLit {
    pub params: Vec<Ident>,
    pub body: Block,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Rendering
// ══════════════════════════════════════════════════════════════════════════════

fn write_separated<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    sep: &str,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_separated(f, &self.stmts, " ")
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.stmts.is_empty() {
            return f.write_str("{ }");
        }
        f.write_str("{ ")?;
        write_separated(f, &self.stmts, " ")?;
        f.write_str(" }")
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Let(s) => write!(f, "${} = {};", s.name, s.value),
            Stmt::Return(s) => write!(f, "return {};", s.value),
            Stmt::Expr(s) => write!(f, "{}", s.expr),
        }
    }
}

impl fmt::Display for FunctionLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("==> (")?;
        write_separated(f, &self.params, ", ")?;
        write!(f, ") {}", self.body)
    }
}

impl fmt::Display for HashEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.value)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Identifier(name) => f.write_str(name),
            ExprKind::IntegerLit(n) => write!(f, "{n}"),
            ExprKind::StringLit(s) => write!(f, "\"{s}\""),
            ExprKind::BooleanLit(b) => write!(f, "{b}"),
            ExprKind::ArrayLit(elements) => {
                f.write_str("[")?;
                write_separated(f, elements, ", ")?;
                f.write_str("]")
            }
            ExprKind::HashLit(entries) => {
                f.write_str("{")?;
                write_separated(f, entries, ", ")?;
                f.write_str("}")
            }
            ExprKind::Prefix { op, operand } => write!(f, "({}{operand})", op.as_str()),
            ExprKind::Infix { left, op, right } => {
                write!(f, "({left} {} {right})", op.as_str())
            }
            ExprKind::Index { collection, index } => write!(f, "({collection}[{index}])"),
            ExprKind::If(if_expr) => {
                write!(f, "if {} {}", if_expr.condition, if_expr.consequence)?;
                if let Some(alt) = &if_expr.alternative {
                    write!(f, " else {alt}")?;
                }
                Ok(())
            }
            ExprKind::Function(func) => write!(f, "{func}"),
            ExprKind::Call { callee, args } => {
                write!(f, "{callee}(")?;
                write_separated(f, args, ", ")?;
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(kind: ExprKind) -> Expr {
        Expr::new(kind, Span::point(1, 1))
    }

    fn int(n: i64) -> Expr {
        expr(ExprKind::IntegerLit(n))
    }

    #[test]
    fn test_infix_display_is_parenthesized() {
        let e = expr(ExprKind::Infix {
            left: Box::new(int(1)),
            op: InfixOp::Add,
            right: Box::new(expr(ExprKind::Infix {
                left: Box::new(int(2)),
                op: InfixOp::Mul,
                right: Box::new(int(3)),
            })),
        });
        assert_eq!(e.to_string(), "(1 + (2 * 3))");
    }

    #[test]
    fn test_let_display() {
        let stmt = Stmt::Let(LetStmt {
            name: Ident::new("five", Span::point(1, 2)),
            value: int(5),
            span: Span::point(1, 1),
        });
        assert_eq!(stmt.to_string(), "$five = 5;");
    }

    #[test]
    fn test_function_display() {
        let func = FunctionLit {
            params: vec![
                Ident::new("x", Span::point(1, 1)),
                Ident::new("y", Span::point(1, 1)),
            ],
            body: Block {
                stmts: vec![],
                span: Span::point(1, 1),
            },
            span: Span::point(1, 1),
        };
        assert_eq!(func.to_string(), "==> (x, y) { }");
    }
}
