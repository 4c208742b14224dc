//! Rule extraction
//!
//! Recovers `name ::= rhs ;` productions from a token stream. The only structural
//! markers are `::=`, `;`, and parentheses, so extraction is a single forward pass
//! with an explicit cursor. Malformed fragments are skipped, never fatal.

use serde::Serialize;

use crate::grammar::Rule;
use crate::syntax::{concat, Span, Token};

/// Result of a full extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub rules: Vec<Rule>,
    /// Comments after the last rule that no rule claimed.
    pub trailing_comments: Vec<String>,
    /// Fragments that looked like a rule but had no `::=` or no terminating `;`.
    pub skipped: Vec<Fragment>,
}

/// Why a [`Fragment`] did not become a rule.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FragmentKind {
    MissingDefine,
    MissingTerminator,
}

/// Source text that starts like a rule but does not complete one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub kind: FragmentKind,
    /// The identifier the fragment starts with.
    pub name: String,
    /// Verbatim text, trailing whitespace trimmed.
    pub text: String,
    pub line: usize,
    pub span: Span,
}

/// Extracts the rules from `tokens`.
pub fn extract(tokens: &[Token]) -> Vec<Rule> {
    extract_all(tokens).rules
}

/// Extracts the rules from `tokens`, keeping trailing comments and skipped fragments.
pub fn extract_all(tokens: &[Token]) -> Extraction {
    Extractor::new(tokens).run()
}

// ============================================================================
// EXTRACTOR STATE
// ============================================================================

struct Extractor<'a> {
    tokens: &'a [Token],
    /// Line of each token's first byte.
    lines: Vec<usize>,
    cursor: usize,
    pending_comments: Vec<String>,
    output: Extraction,
}

impl<'a> Extractor<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        let mut lines = Vec::with_capacity(tokens.len());
        let mut line = 1;
        for token in tokens {
            lines.push(line);
            line += token.text.matches('\n').count();
        }

        Self {
            tokens,
            lines,
            cursor: 0,
            pending_comments: Vec::new(),
            output: Extraction::default(),
        }
    }

    fn run(mut self) -> Extraction {
        while self.cursor < self.tokens.len() {
            self.collect_trivia();

            let Some(name_index) = self.next_significant(self.cursor) else {
                break;
            };

            if !self.tokens[name_index].is_word() {
                self.cursor = name_index + 1;
                continue;
            }

            let Some(define_index) = self.next_significant(name_index + 1) else {
                self.skip(FragmentKind::MissingDefine, name_index, self.tokens.len());
                break;
            };

            if !self.tokens[define_index].is_op("::=") {
                self.skip(FragmentKind::MissingDefine, name_index, name_index + 1);
                continue;
            }

            self.collect_rule(name_index, define_index + 1);
        }

        self.output.trailing_comments = std::mem::take(&mut self.pending_comments);
        self.output
    }

    /// Accumulates the right-hand side starting at `body_start` and emits the rule
    /// once a depth-0 `;` is found.
    fn collect_rule(&mut self, name_index: usize, body_start: usize) {
        let mut depth = 0usize;
        let mut index = body_start;
        // Last `;` seen inside parentheses; ends the rule if the parens never close.
        let mut nested_terminator = None;

        while index < self.tokens.len() {
            let token = &self.tokens[index];

            if token.is_op("(") {
                depth += 1;
            } else if token.is_op(")") {
                depth = depth.saturating_sub(1);
            } else if token.is_op(";") && depth == 0 {
                self.emit(name_index, body_start, index);
                self.cursor = index + 1;
                return;
            } else if token.is_op(";") {
                nested_terminator = Some(index);
            } else if token.is_op("::=") {
                if let Some(terminator) = nested_terminator {
                    self.emit(name_index, body_start, terminator);
                    self.cursor = terminator + 1;
                    return;
                }
                // A second `::=` means this rule never got its `;`.
                // Resume at the name that owns the new `::=`.
                let restart = self.previous_significant(index).unwrap_or(index);
                self.skip(FragmentKind::MissingTerminator, name_index, restart);
                self.cursor = restart.max(name_index + 1);
                return;
            }

            index += 1;
        }

        if let Some(terminator) = nested_terminator {
            self.emit(name_index, body_start, terminator);
            self.cursor = terminator + 1;
            return;
        }
        self.skip(FragmentKind::MissingTerminator, name_index, self.tokens.len());
        self.cursor = self.tokens.len();
    }

    fn emit(&mut self, name_index: usize, body_start: usize, terminator: usize) {
        let name = &self.tokens[name_index];
        let rhs = trim_whitespace(&self.tokens[body_start..terminator]).to_vec();
        // Comments between the name and `::=` move in front of the rule.
        for token in &self.tokens[name_index + 1..body_start] {
            if token.is_comment() {
                self.pending_comments.push(format!("{}\n", token.text));
            }
        }

        self.output.rules.push(Rule {
            name: name.text.clone(),
            rhs,
            leading_comments: std::mem::take(&mut self.pending_comments),
            line: self.lines[name_index],
            span: name.span.join(self.tokens[terminator].span),
        });
    }

    /// Moves comments (with their trailing whitespace) into the pending buffer.
    fn collect_trivia(&mut self) {
        let mut after_comment = false;
        while let Some(token) = self.tokens.get(self.cursor) {
            if token.is_comment() {
                self.pending_comments.push(token.text.clone());
                after_comment = true;
            } else if token.is_whitespace() {
                if after_comment {
                    if let Some(last) = self.pending_comments.last_mut() {
                        last.push_str(&token.text);
                    }
                }
                after_comment = false;
            } else {
                break;
            }
            self.cursor += 1;
        }
    }

    /// Records `tokens[from..to]` as a fragment, without its trailing whitespace.
    fn skip(&mut self, kind: FragmentKind, from: usize, to: usize) {
        let Some(first) = self.tokens.get(from) else {
            return;
        };
        let end = (from..to.min(self.tokens.len()))
            .rev()
            .find(|&i| !self.tokens[i].is_whitespace())
            .unwrap_or(from);
        let covered = &self.tokens[from..=end];

        self.output.skipped.push(Fragment {
            kind,
            name: first.text.clone(),
            text: concat(covered).trim_end().to_string(),
            line: self.lines[from],
            span: first.span.join(covered[covered.len() - 1].span),
        });
    }

    /// Next token that is neither whitespace nor a comment.
    fn next_significant(&self, from: usize) -> Option<usize> {
        (from..self.tokens.len()).find(|&i| !self.tokens[i].is_trivia())
    }

    fn previous_significant(&self, before: usize) -> Option<usize> {
        (0..before).rev().find(|&i| !self.tokens[i].is_trivia())
    }
}

fn trim_whitespace(tokens: &[Token]) -> &[Token] {
    let start = tokens
        .iter()
        .position(|t| !t.is_whitespace())
        .unwrap_or(tokens.len());
    let end = tokens
        .iter()
        .rposition(|t| !t.is_whitespace())
        .map_or(start, |i| i + 1);
    &tokens[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{concat, scan};

    fn rules(text: &str) -> Vec<Rule> {
        extract(&scan(text))
    }

    #[test]
    fn test_single_rule() {
        let rules = rules("expr ::= term '+' term ;");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "expr");
        assert_eq!(concat(&rules[0].rhs), "term '+' term");
        assert_eq!(rules[0].line, 1);
    }

    #[test]
    fn test_semicolon_inside_parens_does_not_terminate() {
        let rules = rules("a ::= ( b ; c ) ; d ::= e ;");
        assert_eq!(rules.len(), 2);
        assert_eq!(concat(&rules[0].rhs), "( b ; c )");
        assert_eq!(rules[1].name, "d");
    }

    #[test]
    fn test_semicolon_inside_literal_does_not_terminate() {
        let rules = rules("a ::= ';' b ;");
        assert_eq!(concat(&rules[0].rhs), "';' b");
    }

    #[test]
    fn test_empty_rhs() {
        let rules = rules("a ::= ;");
        assert_eq!(rules.len(), 1);
        assert!(rules[0].rhs.is_empty());
    }

    #[test]
    fn test_stray_tokens_are_skipped() {
        let rules = rules("; | ) a ::= b ;");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "a");
    }

    #[test]
    fn test_identifier_without_define_is_abandoned() {
        let extraction = extract_all(&scan("junk a ::= b ;"));
        assert_eq!(extraction.rules.len(), 1);
        assert_eq!(extraction.rules[0].name, "a");
        assert_eq!(extraction.skipped.len(), 1);
    }

    #[test]
    fn test_missing_semicolon_recovers_at_next_rule() {
        let extraction = extract_all(&scan("a ::= b\nc ::= d ;"));
        assert_eq!(extraction.rules.len(), 1);
        assert_eq!(extraction.rules[0].name, "c");
        assert_eq!(extraction.rules[0].line, 2);
        assert_eq!(extraction.skipped.len(), 1);
    }

    #[test]
    fn test_unclosed_paren_ends_at_last_semicolon() {
        let rules = rules("a ::= ( b ;\nc ::= d ;");
        assert_eq!(rules.len(), 2);
        assert_eq!(concat(&rules[0].rhs), "( b");
        assert_eq!(rules[1].name, "c");
    }

    #[test]
    fn test_leading_and_trailing_comments() {
        let text = "(* first *)\na ::= b ;\n(* second *)\n\nc ::= d ;\n(* tail *)\n";
        let extraction = extract_all(&scan(text));
        assert_eq!(extraction.rules[0].leading_comments, vec!["(* first *)\n"]);
        assert_eq!(extraction.rules[1].leading_comments, vec!["(* second *)\n\n"]);
        assert_eq!(extraction.rules[1].line, 5);
        assert_eq!(extraction.trailing_comments, vec!["(* tail *)\n"]);
    }

    #[test]
    fn test_comment_between_name_and_define() {
        let rules = rules("a (* note *) ::= b ;\nc // why\n::= d ;");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].name, "a");
        assert_eq!(concat(&rules[0].rhs), "b");
        assert_eq!(rules[1].name, "c");
        assert_eq!(rules[0].leading_comments, vec!["(* note *)\n"]);
        assert_eq!(rules[1].leading_comments, vec!["// why\n"]);
    }

    #[test]
    fn test_fragment_records_text_and_reason() {
        let extraction = extract_all(&scan("(* lost *)\na ::= b\n\nc ::= d ;\nstray\n"));
        assert_eq!(extraction.rules.len(), 1);
        assert_eq!(extraction.skipped.len(), 2);

        let missing_semicolon = &extraction.skipped[0];
        assert_eq!(missing_semicolon.kind, FragmentKind::MissingTerminator);
        assert_eq!(missing_semicolon.name, "a");
        assert_eq!(missing_semicolon.text, "a ::= b");
        assert_eq!(missing_semicolon.line, 2);

        let stray = &extraction.skipped[1];
        assert_eq!(stray.kind, FragmentKind::MissingDefine);
        assert_eq!(stray.text, "stray");
        assert_eq!(stray.line, 5);
    }

    #[test]
    fn test_open_class_fragment_text_is_trimmed() {
        let extraction = extract_all(&scan("a ::= [abc ;\n\n"));
        assert_eq!(extraction.skipped[0].text, "a ::= [abc ;");
        assert_eq!(extraction.skipped[0].kind, FragmentKind::MissingTerminator);
    }

    #[test]
    fn test_rule_span_covers_terminator() {
        let text = "  a ::= b ;  ";
        let rules = rules(text);
        assert_eq!(&text[rules[0].span.start..rules[0].span.end], "a ::= b ;");
    }
}
