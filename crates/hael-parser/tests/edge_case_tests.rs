//! Error reporting and recovery tests.
//!
//! Covers:
//! 1. Specific error codes (E100–E106) and their messages
//! 2. Missing-semicolon handling
//! 3. Recovery: one parse reports several errors and keeps good statements
//! 4. Error limit and nesting limit
//! 5. Malformed input never panics

use hael_parser::{parse, ParseResult, MAX_NESTING_DEPTH};
use hael_types::ast::*;
use hael_types::{ErrorCode, SourceFile, MAX_ERRORS};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn parse_src(source: &str) -> ParseResult {
    let sf = SourceFile::new("test.hl", source);
    parse(&sf)
}

fn error_count(source: &str) -> usize {
    parse_src(source).errors.total_errors
}

fn error_codes(source: &str) -> Vec<ErrorCode> {
    parse_src(source).errors.iter().map(|e| e.code).collect()
}

/// Parse source that must produce exactly one error and return its message.
fn single_error(source: &str) -> String {
    let result = parse_src(source);
    assert_eq!(
        result.errors.total_errors,
        1,
        "expected one error for {source:?}, got {:?}",
        result.errors.messages()
    );
    result.errors.errors[0].message.clone()
}

// ─────────────────────────────────────────────────────────────────────
// Error codes
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_missing_binding_name() {
    assert_eq!(single_error("$ = 5;"), "expected IDENT, got ASSIGN '='");
    assert_eq!(error_codes("$ = 5;"), vec![ErrorCode::UNEXPECTED_TOKEN]);
}

#[test]
fn test_missing_assign() {
    assert_eq!(single_error("$x 5;"), "expected ASSIGN, got INT '5'");
}

#[test]
fn test_illegal_character() {
    assert_eq!(error_codes("@;"), vec![ErrorCode::ILLEGAL_CHARACTER]);
    assert_eq!(single_error("@;"), "illegal character '@'");
}

#[test]
fn test_illegal_character_after_operand() {
    let result = parse_src("5 @ 6;");
    assert_eq!(
        result.errors.iter().map(|e| e.code).collect::<Vec<_>>(),
        vec![ErrorCode::ILLEGAL_CHARACTER]
    );
    assert_eq!(result.program.to_string(), "5");
}

#[test]
fn test_unterminated_string() {
    assert_eq!(error_codes("\"abc"), vec![ErrorCode::UNTERMINATED_STRING]);
    assert_eq!(single_error("$s = \"abc;"), "unterminated string literal");
}

#[test]
fn test_integer_out_of_range() {
    assert_eq!(
        error_codes("99999999999999999999;"),
        vec![ErrorCode::INVALID_INTEGER]
    );
}

#[test]
fn test_no_prefix_rule() {
    assert_eq!(single_error("5 + ;"), "no prefix parse rule for SEMICOLON found");
    assert_eq!(error_codes(")"), vec![ErrorCode::NO_PREFIX_RULE]);
}

#[test]
fn test_unclosed_delimiters() {
    assert_eq!(single_error("if (x) { x"), "expected RBRACE, got EOF");
    assert_eq!(single_error("[1, 2"), "expected RBRACKET, got EOF");
    assert_eq!(single_error("add(1 2)"), "expected RPAREN, got INT '2'");
    assert_eq!(single_error("{\"a\" 1}"), "expected COLON, got INT '1'");
    assert_eq!(single_error("{\"a\": 1"), "expected RBRACE, got EOF");
}

#[test]
fn test_non_identifier_parameter() {
    assert_eq!(single_error("==> (1) {}"), "expected IDENT, got INT '1'");
}

#[test]
fn test_assignment_without_marker() {
    let message = single_error("x = 5;");
    assert!(message.contains("'$x = ...'"), "got: {message}");
}

#[test]
fn test_stray_closing_brace() {
    let result = parse_src("1; } 2;");
    assert_eq!(result.errors.messages(), vec!["unexpected '}'".to_string()]);
    assert_eq!(result.program.stmts.len(), 2);
}

// ─────────────────────────────────────────────────────────────────────
// Semicolons
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_missing_semicolon_between_bindings() {
    let result = parse_src("$x = 5 $y = 6;");
    assert_eq!(result.errors.total_errors, 1);
    assert_eq!(result.errors.errors[0].code, ErrorCode::MISSING_SEMICOLON);
    assert_eq!(
        result.errors.errors[0].message,
        "expected ';' after binding, got LET '$'"
    );
    assert_eq!(result.program.stmts.len(), 2);
}

#[test]
fn test_return_needs_semicolon() {
    let result = parse_src("return 5");
    assert_eq!(
        result.errors.messages(),
        vec!["expected ';' after return value, got EOF".to_string()]
    );
    assert!(matches!(result.program.stmts[0], Stmt::Return(_)));
}

#[test]
fn test_adjacent_expressions_need_semicolon() {
    assert_eq!(error_codes("1 2"), vec![ErrorCode::MISSING_SEMICOLON]);
    assert_eq!(error_count("f(1) g(2);"), 1);
}

// ─────────────────────────────────────────────────────────────────────
// Recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_multiple_errors_collected() {
    let result = parse_src("$ = 1; $ = 2; $ = 3;");
    assert_eq!(result.errors.total_errors, 3);
    let cols: Vec<_> = result.errors.iter().map(|e| e.span.start_col).collect();
    assert_eq!(cols, vec![3, 10, 17]);
}

#[test]
fn test_good_statements_survive_errors() {
    let result = parse_src("$ = 10; $ 838383; $ok = 1;");
    assert_eq!(result.errors.total_errors, 2);
    assert_eq!(result.program.stmts.len(), 1);
    assert_eq!(result.program.to_string(), "$ok = 1;");
}

#[test]
fn test_recovery_inside_block() {
    let result = parse_src("==> () { $ = 1; 2 }; 3;");
    assert_eq!(result.errors.total_errors, 1);
    assert_eq!(result.program.stmts.len(), 2);
    assert_eq!(result.program.to_string(), "==> () { 2 } 3");
}

#[test]
fn test_error_location_and_context() {
    let result = parse_src("$a = 1;\n$ = 2;");
    let err = &result.errors.errors[0];
    assert_eq!((err.span.start_line, err.span.start_col), (2, 3));
    assert_eq!(err.source_line, "$ = 2;");
    assert_eq!(err.file, "test.hl");
    assert_eq!(
        err.to_string(),
        "test.hl:2:3: E100 expected IDENT, got ASSIGN '='"
    );
}

// ─────────────────────────────────────────────────────────────────────
// Limits
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_error_limit() {
    let source = "$ = 1;\n".repeat(30);
    let result = parse_src(&source);
    assert_eq!(result.errors.errors.len(), MAX_ERRORS);
    assert!(result.errors.total_errors >= MAX_ERRORS);
}

#[test]
fn test_nesting_within_limit() {
    let depth = 50;
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let result = parse_src(&source);
    assert!(!result.has_errors());
    assert_eq!(result.program.to_string(), "1");
}

#[test]
fn test_nesting_too_deep() {
    let depth = MAX_NESTING_DEPTH as usize + 50;
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(error_codes(&source), vec![ErrorCode::NESTING_TOO_DEEP]);
}

fn nested_bindings(depth: usize) -> String {
    format!("{}1{}", "$a ==> () { ".repeat(depth), " };".repeat(depth))
}

#[test]
fn test_nested_function_bindings_within_limit() {
    let result = parse_src(&nested_bindings(50));
    assert!(!result.has_errors());
    assert_eq!(result.program.stmts.len(), 1);
}

#[test]
fn test_nested_function_bindings_too_deep() {
    let codes = error_codes(&nested_bindings(MAX_NESTING_DEPTH as usize + 50));
    assert_eq!(codes.first(), Some(&ErrorCode::NESTING_TOO_DEEP));
}

#[test]
fn test_unclosed_function_bindings_are_limited() {
    let source = "$a ==> () { ".repeat(50_000);
    let codes = error_codes(&source);
    assert_eq!(codes.first(), Some(&ErrorCode::NESTING_TOO_DEEP));
    assert!(codes.len() <= MAX_ERRORS);
}

#[test]
fn test_deep_prefix_chain_is_limited() {
    let source = format!("{}1;", "-".repeat(500));
    assert_eq!(error_codes(&source), vec![ErrorCode::NESTING_TOO_DEEP]);
}

// ─────────────────────────────────────────────────────────────────────
// Malformed input
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_malformed_input_never_panics() {
    let inputs = [
        "", ")", "]]]", "}", "$", "$$", "==>", "==> (", "if", "else", "{", "(", "[", ",:;",
        "\"", "é", "5 5 5", "return", "!", "$x ==>", "if (1) {} else", "a[", "f(,)",
        "{1: }", "-", "$x = ;;;;", "==> (a,) {}",
    ];
    for input in inputs {
        let result = parse_src(input);
        if !input.trim().is_empty() {
            assert!(result.has_errors(), "expected an error for {input:?}");
        }
    }
}

#[test]
fn test_error_reporting_is_deterministic() {
    let source = "$ = 1; 5 + ; @ \"open";
    let first = parse_src(source).errors;
    for i in 0..100 {
        assert_eq!(first, parse_src(source).errors, "Determinism failure at iteration {i}");
    }
}
