//! Shared types for the Hael interpreter.
//!
//! This crate defines the AST node types, source spans and the syntax
//! error model used by the lexer, parser and evaluator crates.

mod error;
mod span;
pub mod ast;

pub use error::{ErrorCode, SyntaxError, SyntaxErrors, MAX_ERRORS};
pub use span::{SourceFile, Span};
