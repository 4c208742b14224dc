//! Delimiter-aware token scanner
//!
//! Converts raw grammar text into classified tokens in a single left-to-right pass.
//! Scanning is total: unterminated literals, classes, comments and code blocks run to
//! the end of the input instead of failing, so later stages always see every byte.
//!
//! At each position the categories are tried in this order:
//! comment, quoted literal, character class, (code block), `::=`, single-character
//! operator, identifier, whitespace, and finally a one-character fallback token.

use crate::syntax::{Span, Token, TokenKind};

const SINGLE_CHAR_OPERATORS: &[char] = &['|', '(', ')', '?', ',', ';', '+', '*'];

/// Knobs for [`scan_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Classify `{ ... }` as [`TokenKind::CodeBlock`]. Source grammars embed target
    /// language code in braces; the rule notation itself has no braces.
    pub code_blocks: bool,
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Scans rule-notation text into tokens.
pub fn scan(text: &str) -> Vec<Token> {
    scan_with(text, ScanOptions::default())
}

/// Scans text with explicit [`ScanOptions`].
pub fn scan_with(text: &str, options: ScanOptions) -> Vec<Token> {
    let mut scanner = Scanner::new(text, options);
    let mut tokens = Vec::new();
    while let Some(token) = scanner.next_token() {
        tokens.push(token);
    }
    tokens
}

// ============================================================================
// SCANNER
// ============================================================================

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
    options: ScanOptions,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, options: ScanOptions) -> Self {
        Self {
            text,
            pos: 0,
            options,
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        let start = self.pos;
        let first = self.peek()?;

        let kind = if self.starts_with("(*") {
            self.block_comment("*)")
        } else if self.starts_with("/*") {
            self.block_comment("*/")
        } else if self.starts_with("//") {
            self.line_comment()
        } else if first == '\'' || first == '"' {
            self.quoted(first)
        } else if first == '[' {
            self.character_class()
        } else if first == '{' && self.options.code_blocks {
            self.code_block()
        } else if self.starts_with("::=") {
            self.pos += 3;
            TokenKind::Operator
        } else if SINGLE_CHAR_OPERATORS.contains(&first) {
            self.bump();
            TokenKind::Operator
        } else if first.is_alphabetic() || first == '_' {
            self.eat_while(|c| c.is_alphanumeric() || c == '_');
            TokenKind::Identifier
        } else if is_blank(first) {
            self.eat_while(is_blank);
            TokenKind::Whitespace
        } else {
            self.bump();
            TokenKind::Identifier
        };

        Some(Token::new(
            kind,
            &self.text[start..self.pos],
            Span::new(start, self.pos),
        ))
    }

    // --- categories ---

    fn block_comment(&mut self, close: &str) -> TokenKind {
        self.pos += 2;
        match self.rest().find(close) {
            Some(offset) => self.pos += offset + close.len(),
            None => self.pos = self.text.len(),
        }
        TokenKind::Comment
    }

    fn line_comment(&mut self) -> TokenKind {
        self.eat_while(|c| c != '\n');
        TokenKind::Comment
    }

    fn quoted(&mut self, quote: char) -> TokenKind {
        self.bump();
        while let Some(c) = self.bump() {
            if c == '\\' {
                self.bump();
            } else if c == quote {
                break;
            }
        }
        TokenKind::QuotedLiteral
    }

    fn character_class(&mut self) -> TokenKind {
        self.bump();
        let mut depth = 1usize;
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    self.bump();
                }
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
        TokenKind::CharacterClass
    }

    fn code_block(&mut self) -> TokenKind {
        self.bump();
        let mut depth = 1usize;
        while let Some(c) = self.peek() {
            match c {
                '\'' | '"' => {
                    self.quoted(c);
                }
                '\\' => {
                    self.bump();
                    self.bump();
                }
                '{' => {
                    self.bump();
                    depth += 1;
                }
                '}' => {
                    self.bump();
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {
                    self.bump();
                }
            }
        }
        TokenKind::CodeBlock
    }

    // --- cursor helpers ---

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::concat;

    fn kinds(text: &str) -> Vec<(TokenKind, String)> {
        scan(text).into_iter().map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(scan("").is_empty());
    }

    #[test]
    fn test_rule_tokens() {
        let tokens = kinds("expr ::= term ;");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Identifier, "expr".into()),
                (TokenKind::Whitespace, " ".into()),
                (TokenKind::Operator, "::=".into()),
                (TokenKind::Whitespace, " ".into()),
                (TokenKind::Identifier, "term".into()),
                (TokenKind::Whitespace, " ".into()),
                (TokenKind::Operator, ";".into()),
            ]
        );
    }

    #[test]
    fn test_escaped_quote_stays_inside_literal() {
        let tokens = kinds(r#"'it\'s' x"#);
        assert_eq!(tokens[0], (TokenKind::QuotedLiteral, r#"'it\'s'"#.into()));
        assert_eq!(tokens[2], (TokenKind::Identifier, "x".into()));
    }

    #[test]
    fn test_other_quote_does_not_close() {
        let tokens = kinds(r#""a'b" c"#);
        assert_eq!(tokens[0], (TokenKind::QuotedLiteral, r#""a'b""#.into()));
    }

    #[test]
    fn test_nested_character_class() {
        let tokens = kinds("[a[b]c] d");
        assert_eq!(tokens[0], (TokenKind::CharacterClass, "[a[b]c]".into()));
        assert_eq!(tokens[2], (TokenKind::Identifier, "d".into()));
    }

    #[test]
    fn test_escaped_bracket_does_not_close_class() {
        let tokens = kinds(r"[\]a] b");
        assert_eq!(tokens[0], (TokenKind::CharacterClass, r"[\]a]".into()));
    }

    #[test]
    fn test_quote_inside_class_is_plain() {
        let tokens = kinds(r#"["] x"#);
        assert_eq!(tokens[0], (TokenKind::CharacterClass, r#"["]"#.into()));
    }

    #[test]
    fn test_comment_forms() {
        let tokens = kinds("(* a *)// b\n/* c */");
        assert_eq!(tokens[0], (TokenKind::Comment, "(* a *)".into()));
        assert_eq!(tokens[1], (TokenKind::Comment, "// b".into()));
        assert_eq!(tokens[2], (TokenKind::Whitespace, "\n".into()));
        assert_eq!(tokens[3], (TokenKind::Comment, "/* c */".into()));
    }

    #[test]
    fn test_unterminated_spans_run_to_end() {
        for text in ["'abc", "[abc", "(* abc", "/* abc", "\"a\\"] {
            let tokens = scan(text);
            assert_eq!(tokens.len(), 1, "{text}");
            assert_eq!(tokens[0].text, text);
        }
    }

    #[test]
    fn test_colon_without_equals_is_fallback() {
        let tokens = kinds("a : b");
        assert_eq!(tokens[2], (TokenKind::Identifier, ":".into()));
    }

    #[test]
    fn test_code_blocks_only_when_enabled() {
        let text = "{ a { '}' } } x";
        let plain = scan(text);
        assert_eq!(plain[0].text, "{");

        let tokens = scan_with(text, ScanOptions { code_blocks: true });
        assert_eq!(tokens[0].kind, TokenKind::CodeBlock);
        assert_eq!(tokens[0].text, "{ a { '}' } }");
        assert_eq!(concat(&tokens), text);
    }

    #[test]
    fn test_spans_follow_utf8() {
        let text = "é ::= 'ü' ;";
        let tokens = scan(text);
        assert_eq!(concat(&tokens), text);
        for token in &tokens {
            assert_eq!(&text[token.span.start..token.span.end], token.text);
        }
    }
}
