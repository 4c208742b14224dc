//! Source-grammar normalization
//!
//! Converts ANTLR-style grammar text into rule notation with one delimiter-aware
//! token pass. Every construct that has no counterpart in the notation (headers,
//! actions, predicates, lexer commands, parameter lists, labels, element options)
//! is recognized as a token sequence and its span is dropped. Because code blocks,
//! literals and classes are single tokens, nothing inside them can confuse the pass.

use serde::Serialize;

use crate::format::{format_source, FormatOptions};
use crate::grammar::{extract_all, Fragment, Rule};
use crate::syntax::{scan, scan_with, ScanOptions, Token, TokenKind};

/// Keywords that may precede a rule name and carry no meaning in the notation.
const RULE_MODIFIERS: &[&str] = &["fragment", "public", "private", "protected"];

/// Header blocks written as `keyword { ... }`.
const HEADER_BLOCKS: &[&str] = &["options", "tokens", "channels"];

/// Header statements written as `keyword name ... ;`.
const HEADER_STATEMENTS: &[&str] = &["grammar", "import", "mode"];

/// Output of [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedGrammar {
    /// Converted text, source whitespace preserved.
    pub text: String,
    /// Rules extracted from [`NormalizedGrammar::text`].
    pub rules: Vec<Rule>,
    /// Converted text that did not form a rule.
    pub skipped: Vec<Fragment>,
}

impl NormalizedGrammar {
    /// Renders the converted rules with the layout renderer.
    pub fn render(&self, options: &FormatOptions) -> String {
        format_source(&self.text, options)
    }
}

/// Converts source-grammar text to rule notation.
pub fn normalize(source: &str) -> NormalizedGrammar {
    let tokens = scan_with(source, ScanOptions { code_blocks: true });
    let text = Normalizer::new(&tokens).run();
    let extraction = extract_all(&scan(&text));
    NormalizedGrammar {
        text,
        rules: extraction.rules,
        skipped: extraction.skipped,
    }
}

// ============================================================================
// NORMALIZER
// ============================================================================

struct Normalizer<'a> {
    tokens: &'a [Token],
    cursor: usize,
    out: String,
    /// Parser rules start lower-case; only they take arguments.
    in_parser_rule: bool,
}

impl<'a> Normalizer<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            cursor: 0,
            out: String::new(),
            in_parser_rule: false,
        }
    }

    fn run(mut self) -> String {
        while self.cursor < self.tokens.len() {
            self.top_level();
        }
        self.out
    }

    fn top_level(&mut self) {
        let index = self.cursor;
        let tokens = self.tokens;
        let token = &tokens[index];

        if token.is_trivia() {
            self.emit_trivia(token);
            self.cursor += 1;
            return;
        }

        if token.is_char('@') {
            self.cursor = self.skip_named_action(index);
            return;
        }

        if !token.is_word() {
            self.out.push_str(&token.text);
            self.cursor += 1;
            return;
        }

        let word = token.text.as_str();
        let next = self.next_significant(index + 1);
        let next_token = next.map(|n| &tokens[n]);
        let next_is_word = next_token.is_some_and(|t| t.is_word());

        if (word == "lexer" || word == "parser")
            && next_token.is_some_and(|t| t.text == "grammar")
            || HEADER_STATEMENTS.contains(&word) && next_is_word
        {
            self.cursor = self.skip_through_semicolon(index);
        } else if HEADER_BLOCKS.contains(&word)
            && next_token.is_some_and(|t| t.kind == TokenKind::CodeBlock)
        {
            self.cursor = next.map_or(index + 1, |n| n + 1);
        } else if word == "catch" || word == "finally" {
            self.cursor = self.skip_handler(index);
        } else if RULE_MODIFIERS.contains(&word) && next_is_word {
            self.cursor = next.unwrap_or(index + 1);
        } else if let Some(colon) = self.rule_colon(index) {
            self.rule(index, colon);
        } else {
            self.out.push_str(word);
            self.cursor += 1;
        }
    }

    /// Emits `name ::= body ;` for the rule whose header ends at `colon`.
    fn rule(&mut self, name: usize, colon: usize) {
        let name_text = &self.tokens[name].text;
        self.in_parser_rule = name_text.starts_with(|c: char| c.is_lowercase());
        self.out.push_str(name_text);
        self.out.push_str(" ::=");

        let mut depth = 0usize;
        let mut index = colon + 1;
        while index < self.tokens.len() {
            let token = &self.tokens[index];

            if token.is_op(";") && depth == 0 {
                self.out.push(';');
                self.cursor = index + 1;
                return;
            }
            if token.is_op("(") {
                depth += 1;
            } else if token.is_op(")") {
                depth = depth.saturating_sub(1);
            }

            index = self.body_token(index);
        }
        self.cursor = index;
    }

    /// Handles one body token, returning the index after everything it consumed.
    fn body_token(&mut self, index: usize) -> usize {
        let tokens = self.tokens;
        let token = &tokens[index];

        if token.is_trivia() {
            self.emit_trivia(token);
            return index + 1;
        }

        match token.kind {
            // action, or predicate when followed by `?`
            TokenKind::CodeBlock => {
                return match self.next_significant(index + 1) {
                    Some(next) if self.tokens[next].is_op("?") => next + 1,
                    _ => index + 1,
                };
            }
            TokenKind::Identifier if token.is_char('-') && self.is_char_at(index + 1, '>') => {
                return self.skip_lexer_command(index);
            }
            TokenKind::Identifier if token.is_char('#') => {
                return match self.next_significant(index + 1) {
                    Some(next) if self.tokens[next].is_word() => next + 1,
                    _ => index + 1,
                };
            }
            TokenKind::Identifier if token.is_char('<') => {
                if let Some(close) = self.element_options_end(index) {
                    return close + 1;
                }
            }
            _ => {}
        }

        if token.is_word() {
            if let Some(after_label) = self.label_end(index) {
                return after_label;
            }
            self.out.push_str(&token.text);
            // Arguments: `rule[...]` with no space before the bracket.
            let arguments = self.in_parser_rule
                && tokens
                    .get(index + 1)
                    .is_some_and(|t| t.kind == TokenKind::CharacterClass);
            return if arguments { index + 2 } else { index + 1 };
        }

        self.out.push_str(&token.text);
        index + 1
    }

    // --- span finders ---

    /// Index of the `:` that ends the header of a rule named at `name`.
    fn rule_colon(&self, name: usize) -> Option<usize> {
        for index in name + 1..self.tokens.len() {
            let token = &self.tokens[index];
            if token.is_char(':') {
                if self.is_char_at(index + 1, ':') {
                    return None;
                }
                return Some(index);
            }
            if token.is_op(";") || token.is_op("|") || token.is_op("::=") {
                return None;
            }
        }
        None
    }

    /// `x=` or `x+=` in front of an element: index after the `=`.
    fn label_end(&self, word: usize) -> Option<usize> {
        let mut index = self.next_significant(word + 1)?;
        if self.tokens[index].is_op("+") {
            index = self.next_significant(index + 1)?;
        }
        self.tokens[index].is_char('=').then_some(index + 1)
    }

    /// Matching `>` for element options opened at `open`, within the current rule.
    fn element_options_end(&self, open: usize) -> Option<usize> {
        for index in open + 1..self.tokens.len() {
            let token = &self.tokens[index];
            if token.is_char('>') {
                return Some(index);
            }
            if token.is_op(";") || token.is_op("|") {
                return None;
            }
        }
        None
    }

    /// `-> cmd, cmd(arg)`: runs to the next depth-0 `|` or `;`, which is kept.
    fn skip_lexer_command(&self, arrow: usize) -> usize {
        let mut depth = 0usize;
        let mut index = arrow + 2;
        while let Some(token) = self.tokens.get(index) {
            if token.is_op("(") {
                depth += 1;
            } else if token.is_op(")") {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            } else if depth == 0 && (token.is_op("|") || token.is_op(";")) {
                break;
            }
            index += 1;
        }
        index
    }

    /// `@name { ... }` or `@scope::name { ... }`.
    fn skip_named_action(&self, at: usize) -> usize {
        let mut index = at + 1;
        while let Some(token) = self.tokens.get(index) {
            if token.kind == TokenKind::CodeBlock {
                return index + 1;
            }
            if !(token.is_word() || token.is_char(':') || token.is_whitespace()) {
                break;
            }
            index += 1;
        }
        index
    }

    /// `catch [...] { ... }` and `finally { ... }`.
    fn skip_handler(&self, keyword: usize) -> usize {
        let mut index = keyword + 1;
        while let Some(token) = self.tokens.get(index) {
            match token.kind {
                TokenKind::Whitespace | TokenKind::CharacterClass => index += 1,
                TokenKind::CodeBlock => return index + 1,
                _ => break,
            }
        }
        index
    }

    fn skip_through_semicolon(&self, from: usize) -> usize {
        (from..self.tokens.len())
            .find(|&i| self.tokens[i].is_op(";"))
            .map_or(self.tokens.len(), |i| i + 1)
    }

    // --- helpers ---

    fn emit_trivia(&mut self, token: &Token) {
        if token.is_comment() {
            self.out.push_str(&convert_comment(&token.text));
        } else {
            self.out.push_str(&token.text);
        }
    }

    fn next_significant(&self, from: usize) -> Option<usize> {
        (from..self.tokens.len()).find(|&i| !self.tokens[i].is_whitespace())
    }

    fn is_char_at(&self, index: usize, ch: char) -> bool {
        self.tokens.get(index).is_some_and(|t| t.is_char(ch))
    }
}

/// Rewrites `// x` and `/* x */` as `(* x *)`.
pub fn convert_comment(text: &str) -> String {
    let body = if let Some(line) = text.strip_prefix("//") {
        line.trim()
    } else if let Some(block) = text.strip_prefix("/*") {
        let block = block.strip_suffix("*/").unwrap_or(block);
        block.trim_start_matches('*').trim()
    } else {
        return text.to_string();
    };

    if body.is_empty() {
        return "(* *)".to_string();
    }
    format!("(* {} *)", body.replace("*)", "* )"))
}
