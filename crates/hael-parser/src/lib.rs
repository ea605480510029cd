//! Hael parser: converts a token stream into an AST.

mod parse_expr;
mod parse_stmt;
mod parser;

pub use parser::{ParseResult, Parser, MAX_NESTING_DEPTH};

use hael_lexer::Keywords;
use hael_types::SourceFile;

/// Parse a source file with the default keywords.
pub fn parse(source_file: &SourceFile) -> ParseResult {
    Parser::from_source(source_file).parse_program()
}

/// Parse a source file with custom boolean keywords.
pub fn parse_with_keywords(source_file: &SourceFile, keywords: Keywords) -> ParseResult {
    Parser::with_keywords(source_file, keywords).parse_program()
}
