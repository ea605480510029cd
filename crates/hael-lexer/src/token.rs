//! Token types for the Hael lexer.
//!
//! Defines [`TokenKind`], the closed set of lexical categories, [`Token`],
//! which pairs a kind with its exact source text and [`Span`], and
//! [`Keywords`], the reserved-word table.

use hael_types::Span;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Reserved words whose spelling never changes.
///
/// The true and false literal words are configurable, see [`Keywords`].
pub const FIXED_KEYWORDS: &[&str] = &["if", "else", "return"];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// The exact source text of the token. For string literals this is the
    /// text between the quotes; for [`TokenKind::Eof`] it is empty.
    pub literal: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            literal: literal.into(),
            span,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.kind, self.literal)
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

/// Every lexical category in the Hael language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // ── Literals & names ─────────────────────────────────────
    /// `five`, `add_item`
    Ident,
    /// `5`
    Int,
    /// `"foo bar"`
    String,

    // ── Keywords ─────────────────────────────────────────────
    /// `$` (variable declaration marker)
    Let,
    /// `==>` (function literal introducer)
    Function,
    /// `if`
    If,
    /// `else`
    Else,
    /// `return`
    Return,
    /// The configured true literal word (`good` by default).
    True,
    /// The configured false literal word (`bad` by default).
    False,

    // ── Operators ────────────────────────────────────────────
    /// `=`
    Assign,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Asterisk,
    /// `/`
    Slash,
    /// `!`
    Bang,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,

    // ── Punctuation ──────────────────────────────────────────
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `:`
    Colon,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,

    // ── Special ──────────────────────────────────────────────
    /// A character (or unterminated string) the lexer does not recognise.
    Illegal,
    /// End of input. Repeated calls keep returning it.
    Eof,
}

impl TokenKind {
    /// Category name used in token dumps and parser error messages.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::String => "STRING",
            TokenKind::Let => "LET",
            TokenKind::Function => "FUNCTION",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::Return => "RETURN",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Asterisk => "ASTERISK",
            TokenKind::Slash => "SLASH",
            TokenKind::Bang => "BANG",
            TokenKind::Eq => "EQ",
            TokenKind::NotEq => "NOT_EQ",
            TokenKind::Lt => "LT",
            TokenKind::Gt => "GT",
            TokenKind::Comma => "COMMA",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Colon => "COLON",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
        }
    }

    /// Returns `true` for reserved words (including the boolean literals).
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::If | TokenKind::Else | TokenKind::Return | TokenKind::True | TokenKind::False
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─────────────────────────────────────────────────────────────────────
// Keywords
// ─────────────────────────────────────────────────────────────────────

/// The reserved-word table.
///
/// The spellings of the boolean literals are part of the language
/// configuration, so the table (not the evaluator) decides which words
/// become [`TokenKind::True`] and [`TokenKind::False`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keywords {
    true_word: String,
    false_word: String,
}

impl Keywords {
    pub const DEFAULT_TRUE: &'static str = "good";
    pub const DEFAULT_FALSE: &'static str = "bad";

    pub fn new(true_word: impl Into<String>, false_word: impl Into<String>) -> Self {
        Self {
            true_word: true_word.into(),
            false_word: false_word.into(),
        }
    }

    /// Like [`Keywords::new`], but rejects spellings the lexer could never
    /// produce as the boolean literals.
    pub fn try_new(
        true_word: impl Into<String>,
        false_word: impl Into<String>,
    ) -> Result<Self, KeywordError> {
        let keywords = Self::new(true_word, false_word);
        for word in [&keywords.true_word, &keywords.false_word] {
            if !is_identifier(word) {
                return Err(KeywordError::NotAnIdentifier(word.clone()));
            }
            if FIXED_KEYWORDS.contains(&word.as_str()) {
                return Err(KeywordError::Reserved(word.clone()));
            }
        }
        if keywords.true_word == keywords.false_word {
            return Err(KeywordError::Duplicate(keywords.true_word));
        }
        Ok(keywords)
    }

    pub fn true_word(&self) -> &str {
        &self.true_word
    }

    pub fn false_word(&self) -> &str {
        &self.false_word
    }

    /// Look up a scanned identifier. Returns `None` for user names.
    pub fn lookup(&self, word: &str) -> Option<TokenKind> {
        match word {
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            "return" => Some(TokenKind::Return),
            w if w == self.true_word => Some(TokenKind::True),
            w if w == self.false_word => Some(TokenKind::False),
            _ => None,
        }
    }
}

/// An unusable boolean keyword spelling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeywordError {
    #[error("'{0}' is not an identifier")]
    NotAnIdentifier(String),
    #[error("'{0}' is already a keyword")]
    Reserved(String),
    #[error("true and false are both spelled '{0}'")]
    Duplicate(String),
}

/// Whether the lexer scans `word` as a single identifier.
fn is_identifier(word: &str) -> bool {
    let mut bytes = word.bytes();
    matches!(bytes.next(), Some(b'a'..=b'z' | b'A'..=b'Z' | b'_'))
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

impl Default for Keywords {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TRUE, Self::DEFAULT_FALSE)
    }
}
