//! Syntax module for grammar text
//!
//! This module provides the token types and the delimiter-aware scanner that every
//! other stage consumes. Tokens always partition the scanned text exactly.

use serde::{Deserialize, Serialize};

pub mod scanner;

pub use scanner::{scan, scan_with, ScanOptions};

/// Represents a byte span in the scanned text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn join(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Converts a [`Span`] into the span type used by `miette` diagnostics.
pub fn to_source_span(span: Span) -> miette::SourceSpan {
    (span.start, span.len()).into()
}

/// The lexical category of a [`Token`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    Whitespace,
    Identifier,
    QuotedLiteral,
    CharacterClass,
    Operator,
    Comment,
    /// A `{ ... }` block. Only produced when [`ScanOptions::code_blocks`] is set.
    CodeBlock,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Whitespace => "whitespace",
            TokenKind::Identifier => "identifier",
            TokenKind::QuotedLiteral => "quoted-literal",
            TokenKind::CharacterClass => "character-class",
            TokenKind::Operator => "operator",
            TokenKind::Comment => "comment",
            TokenKind::CodeBlock => "code-block",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified lexical span, including its delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Whitespace and comments carry no grammar structure.
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }

    pub fn is_comment(&self) -> bool {
        self.kind == TokenKind::Comment
    }

    /// True for the operator token spelled exactly `op`.
    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }

    /// True for an identifier token that looks like a name.
    ///
    /// The scanner's single-character fallback tokens (`~`, `.`, `-`, ...) share the
    /// identifier kind but are not names.
    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Identifier
            && self
                .text
                .chars()
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_')
    }

    /// True for a one-character fallback token spelled `ch`.
    pub fn is_char(&self, ch: char) -> bool {
        self.kind == TokenKind::Identifier
            && self.text.len() == ch.len_utf8()
            && self.text.starts_with(ch)
    }
}

/// Concatenates token texts. For a full scan this reproduces the input exactly.
pub fn concat(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}
