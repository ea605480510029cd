//! Core Hael lexer: converts source text to tokens on demand.
//!
//! - Whitespace (including newlines) separates tokens and is never emitted
//! - `$` is the declaration marker, `==>` the function introducer
//! - String literals end at the next `"`; there are no escape sequences
//! - Unknown characters become [`TokenKind::Illegal`] and scanning continues
//! - After the input is exhausted every call returns [`TokenKind::Eof`]

use hael_types::{SourceFile, Span};

use crate::token::{Keywords, Token, TokenKind};

/// The Hael lexer.
///
/// Scans forward through a [`SourceFile`] one token per
/// [`next_token`](Lexer::next_token) call, peeking at most two bytes ahead.
pub struct Lexer<'src> {
    source_file: &'src SourceFile,
    /// The full source text as bytes.
    source: &'src [u8],
    keywords: Keywords,
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
    /// Set once the iterator has handed out EOF.
    exhausted: bool,
}

impl<'src> Lexer<'src> {
    /// Create a lexer with the default keyword spellings.
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self::with_keywords(source_file, Keywords::default())
    }

    pub fn with_keywords(source_file: &'src SourceFile, keywords: Keywords) -> Self {
        Self {
            source_file,
            source: source_file.source.as_bytes(),
            keywords,
            pos: 0,
            line: 1,
            col: 1,
            exhausted: false,
        }
    }

    pub fn source_file(&self) -> &'src SourceFile {
        self.source_file
    }

    pub fn keywords(&self) -> &Keywords {
        &self.keywords
    }

    /// Lex the remaining input into a vector that ends with exactly one
    /// [`TokenKind::Eof`].
    pub fn lex(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is(TokenKind::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        log::debug!(
            "lexed {} tokens from {}",
            tokens.len(),
            self.source_file.name
        );
        tokens
    }

    /// Scan and return the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos;
        let start_line = self.line;
        let start_col = self.col;

        let Some(ch) = self.advance() else {
            return Token::new(TokenKind::Eof, "", self.current_span());
        };

        let kind = match ch {
            b'"' => return self.scan_string(start, start_line, start_col),
            b'0'..=b'9' => self.scan_number(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_identifier(start),

            b'$' => TokenKind::Let,
            b'=' => {
                if self.peek() == Some(b'=') && self.peek_at(1) == Some(b'>') {
                    self.advance();
                    self.advance();
                    TokenKind::Function
                } else if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::Eq
                } else {
                    TokenKind::Assign
                }
            }
            b'!' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Asterisk,
            b'/' => TokenKind::Slash,
            b'<' => TokenKind::Lt,
            b'>' => TokenKind::Gt,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b':' => TokenKind::Colon,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,

            _ => {
                // Keep a multi-byte character together in one token.
                while matches!(self.peek(), Some(b) if b & 0xC0 == 0x80) {
                    self.advance();
                }
                TokenKind::Illegal
            }
        };

        Token::new(
            kind,
            self.text(start, self.pos),
            self.span_from(start_line, start_col),
        )
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.advance();
        }
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    /// Source text between two byte offsets that sit on character boundaries.
    fn text(&self, start: usize, end: usize) -> &'src str {
        self.source_file.source.get(start..end).unwrap_or("")
    }

    // ─────────────────────────────────────────────────────────────
    // Literals & identifiers
    // ─────────────────────────────────────────────────────────────

    fn scan_number(&mut self) -> TokenKind {
        while let Some(b'0'..=b'9') = self.peek() {
            self.advance();
        }
        TokenKind::Int
    }

    fn scan_identifier(&mut self, start: usize) -> TokenKind {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.advance();
            } else {
                break;
            }
        }
        self.keywords
            .lookup(self.text(start, self.pos))
            .unwrap_or(TokenKind::Ident)
    }

    /// Scan a string literal; the opening `"` is already consumed.
    ///
    /// An unterminated string becomes an [`TokenKind::Illegal`] token whose
    /// literal is the rest of the input, opening quote included.
    fn scan_string(&mut self, start: usize, start_line: u32, start_col: u32) -> Token {
        loop {
            match self.advance() {
                Some(b'"') => {
                    return Token::new(
                        TokenKind::String,
                        self.text(start + 1, self.pos - 1),
                        self.span_from(start_line, start_col),
                    );
                }
                Some(_) => {}
                None => {
                    return Token::new(
                        TokenKind::Illegal,
                        self.text(start, self.pos),
                        self.span_from(start_line, start_col),
                    );
                }
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields every token before the end of input; EOF itself is not yielded.
    fn next(&mut self) -> Option<Token> {
        if self.exhausted {
            return None;
        }
        let token = self.next_token();
        if token.is(TokenKind::Eof) {
            self.exhausted = true;
            return None;
        }
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(source: &str) -> Token {
        let sf = SourceFile::new("test.hl", source);
        Lexer::new(&sf).next_token()
    }

    #[test]
    fn test_function_arrow_beats_equality() {
        assert_eq!(first("==>").kind, TokenKind::Function);
        assert_eq!(first("==").kind, TokenKind::Eq);
        assert_eq!(first("=").kind, TokenKind::Assign);
        assert_eq!(first("=>").kind, TokenKind::Assign);
    }

    #[test]
    fn test_span_of_identifier() {
        let sf = SourceFile::new("test.hl", "\n  five");
        let tok = Lexer::new(&sf).next_token();
        assert_eq!(tok.span, Span::new(2, 3, 2, 6));
    }

    #[test]
    fn test_multibyte_illegal_is_one_token() {
        let tok = first("é");
        assert_eq!(tok.kind, TokenKind::Illegal);
        assert_eq!(tok.literal, "é");
    }

    #[test]
    fn test_iterator_stops_before_eof() {
        let sf = SourceFile::new("test.hl", "1 2");
        let toks: Vec<_> = Lexer::new(&sf).collect();
        assert_eq!(toks.len(), 2);
    }
}
