//! Layout renderer
//!
//! Re-serializes extracted rules as readable notation. Token spacing comes from a
//! fixed adjacency table, so the original whitespace never matters and rendering
//! its own output again is byte-identical.

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

use crate::grammar::{extract_all, Alternative, Extraction, Rule};
use crate::normalize::convert_comment;
use crate::syntax::{scan, Token, TokenKind};

const DEFINE: &str = "::=";
const TERMINATOR: &str = " ;";

/// Layout configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Soft-wrap column.
    pub width: usize,
}

impl FormatOptions {
    pub const MIN_WIDTH: usize = 20;
    pub const DEFAULT_WIDTH: usize = 80;

    /// Options with `width` clamped to [`FormatOptions::MIN_WIDTH`].
    pub fn with_width(width: usize) -> Self {
        Self {
            width: width.max(Self::MIN_WIDTH),
        }
    }
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
        }
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Renders one rule, preceded by its leading comments.
pub fn render(rule: &Rule, options: &FormatOptions) -> String {
    let mut out = String::new();

    let comments: String = rule.leading_comments.concat();
    let comments = comments.trim_end();
    if !comments.is_empty() {
        out.push_str(comments);
        out.push('\n');
    }

    let prefix = format!("{} {} ", rule.name, DEFINE);
    let alternatives: Vec<Vec<String>> = rule
        .alternatives()
        .iter()
        .map(alternative_pieces)
        .collect();

    let single = single_line(&prefix, &alternatives);
    if single.width() <= options.width {
        out.push_str(&single);
    } else if alternatives.len() > 1 {
        out.push_str(&stacked(&prefix, &alternatives));
    } else {
        out.push_str(&wrapped(&prefix, &alternatives[0], options.width));
    }
    out
}

/// Renders every rule, one blank line apart, with a final newline.
pub fn render_grammar(rules: &[Rule], options: &FormatOptions) -> String {
    join_blocks(rules.iter().map(|rule| render(rule, options)).collect())
}

/// Scans, extracts and renders a whole notation document.
///
/// Comments after the last rule are kept. Malformed fragments are copied through
/// unchanged, in source order.
pub fn format_source(text: &str, options: &FormatOptions) -> String {
    format_extraction(&extract_all(&scan(text)), options)
}

/// Renders an extraction result, skipped fragments and trailing comments included.
pub fn format_extraction(extraction: &Extraction, options: &FormatOptions) -> String {
    let mut blocks: Vec<(usize, String)> = extraction
        .rules
        .iter()
        .map(|rule| (rule.span.start, render(rule, options)))
        .chain(
            extraction
                .skipped
                .iter()
                .map(|fragment| (fragment.span.start, fragment.text.clone())),
        )
        .collect();
    blocks.sort_by_key(|(start, _)| *start);

    let mut out = join_blocks(blocks.into_iter().map(|(_, block)| block).collect());

    let trailing = extraction.trailing_comments.concat();
    let trailing = trailing.trim();
    if !trailing.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(trailing);
        out.push('\n');
    }
    out
}

fn join_blocks(blocks: Vec<String>) -> String {
    let mut out = blocks.join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

// ============================================================================
// LAYOUTS
// ============================================================================

fn single_line(prefix: &str, alternatives: &[Vec<String>]) -> String {
    let mut pieces: Vec<&str> = Vec::new();
    for (index, alternative) in alternatives.iter().enumerate() {
        if index > 0 {
            pieces.push("|");
        }
        pieces.extend(alternative.iter().map(String::as_str));
    }

    let mut line = prefix.trim_end().to_string();
    for piece in pieces {
        line.push(' ');
        line.push_str(piece);
    }
    line.push_str(TERMINATOR);
    line
}

/// One alternative per line, bars aligned under the first alternative.
fn stacked(prefix: &str, alternatives: &[Vec<String>]) -> String {
    let bar_indent = " ".repeat(prefix.width().saturating_sub(2));
    let lines: Vec<String> = alternatives
        .iter()
        .enumerate()
        .map(|(index, pieces)| {
            let lead = if index == 0 {
                prefix.to_string()
            } else {
                format!("{}| ", bar_indent)
            };
            format!("{}{}", lead, pieces.join(" ")).trim_end().to_string()
        })
        .collect();

    let mut out = lines.join("\n");
    out.push_str(TERMINATOR);
    out
}

/// Greedy soft wrap at piece boundaries, continuation lines aligned under the body.
fn wrapped(prefix: &str, pieces: &[String], width: usize) -> String {
    let indent = " ".repeat(prefix.width());
    let mut out = String::new();
    let mut line = prefix.trim_end().to_string();
    let mut line_has_body = false;

    for (index, piece) in pieces.iter().enumerate() {
        let tail = if index + 1 == pieces.len() {
            TERMINATOR.width()
        } else {
            0
        };
        let fits = line.width() + 1 + piece.width() + tail <= width;

        if line_has_body && !fits {
            out.push_str(&line);
            out.push('\n');
            line = format!("{}{}", indent, piece);
        } else {
            line.push(' ');
            line.push_str(piece);
        }
        line_has_body = true;
    }

    out.push_str(&line);
    out.push_str(TERMINATOR);
    out
}

// ============================================================================
// ADJACENCY TABLE
// ============================================================================

/// Groups an alternative's tokens into space-separated pieces.
fn alternative_pieces(alternative: &Alternative<'_>) -> Vec<String> {
    let tokens: Vec<&Token> = alternative
        .tokens
        .iter()
        .filter(|t| !t.is_whitespace())
        .collect();
    let mut pieces: Vec<String> = Vec::new();

    for index in 0..tokens.len() {
        let text = display_text(tokens[index]);
        match pieces.last_mut() {
            Some(last) if !needs_space(&tokens, index) => last.push_str(&text),
            _ => pieces.push(text),
        }
    }
    pieces
}

/// Whether a space separates `tokens[index - 1]` and `tokens[index]`.
fn needs_space(tokens: &[&Token], index: usize) -> bool {
    let prev = tokens[index - 1];
    let next = tokens[index];

    // `(*` would open a comment.
    if prev.is_op("(") && next.is_op("*") {
        return true;
    }
    if prev.is_op("(") || prev.is_char('~') {
        return false;
    }
    if [")", "?", "*", "+", ","].iter().any(|op| next.is_op(op)) {
        return false;
    }

    // `'a'..'z'` ranges stay tight.
    let dot = |i: usize| tokens.get(i).is_some_and(|t| t.is_char('.'));
    let after_range = index >= 2 && dot(index - 1) && dot(index - 2);
    if dot(index - 1) && dot(index) || dot(index) && dot(index + 1) || after_range {
        return false;
    }

    true
}

/// Line comments would swallow the rest of a joined line, so they render as block comments.
fn display_text(token: &Token) -> String {
    if token.kind == TokenKind::Comment && token.text.starts_with("//") {
        return convert_comment(&token.text);
    }
    token.text.clone()
}
