//! Hael lexer: converts source text into a token stream.

pub mod lexer;
pub mod token;

pub use lexer::Lexer;
pub use token::{KeywordError, Keywords, Token, TokenKind, FIXED_KEYWORDS};
