use std::collections::{HashMap, HashSet};

use crate::grammar::{
    is_structural_name, is_terminal_name, Alternative, Fragment, FragmentKind, Rule,
};
use crate::syntax::{scan, Span, Token, TokenKind};
use crate::validation::graph::{references, DependencyGraph, BUILT_IN_TOKENS};
use crate::validation::{Finding, FindingKind, ValidateOptions, ValidationReporter};

/// Validates rules for various correctness issues.
/// Each validator focuses on a single concern and reports through a [`ValidationReporter`].
pub struct GrammarValidators;

impl GrammarValidators {
    /// Index of the first definition of every rule name.
    pub fn first_definitions(rules: &[Rule]) -> HashMap<&str, usize> {
        let mut first = HashMap::new();
        for (index, rule) in rules.iter().enumerate() {
            first.entry(rule.name.as_str()).or_insert(index);
        }
        first
    }

    /// Reports text the extractor could not turn into a rule.
    ///
    /// A class left open swallows the rest of the file, including the `;`, so an
    /// unterminated fragment is also checked for unclosed classes.
    pub fn check_fragment(fragment: &Fragment, reporter: &mut impl ValidationReporter) {
        let message = match fragment.kind {
            FragmentKind::MissingDefine => {
                format!("'{}' is not followed by '::='", fragment.name)
            }
            FragmentKind::MissingTerminator => {
                format!("rule '{}' has no terminating ';'", fragment.name)
            }
        };
        reporter.report(
            Finding::new(FindingKind::MalformedRule, message).in_fragment(fragment),
        );

        if fragment.kind != FragmentKind::MissingTerminator {
            return;
        }
        let offset = fragment.span.start;
        let open_class = scan(&fragment.text)
            .into_iter()
            .find(|t| t.kind == TokenKind::CharacterClass && !class_is_closed(&t.text));
        if let Some(class) = open_class {
            reporter.report(
                Finding::new(
                    FindingKind::UnbalancedCharacterClass,
                    format!("unbalanced character class in rule '{}'", fragment.name),
                )
                .at(Span::new(offset + class.span.start, offset + class.span.end))
                .in_fragment(fragment),
            );
        }
    }

    /// Reports `rules[index]` if an earlier rule has the same name.
    pub fn check_duplicate(
        rules: &[Rule],
        index: usize,
        first_definitions: &HashMap<&str, usize>,
        reporter: &mut impl ValidationReporter,
    ) {
        let rule = &rules[index];
        let Some(&first) = first_definitions.get(rule.name.as_str()) else {
            return;
        };
        if first == index {
            return;
        }

        let original = &rules[first];
        reporter.report(
            Finding::new(
                FindingKind::DuplicateRule,
                format!(
                    "duplicate rule '{}' at line {} (first defined at line {})",
                    rule.name, rule.line, original.line
                ),
            )
            .in_rule(rule),
        );
    }

    /// Checks delimiter balance and emptiness of one alternative.
    pub fn check_balance(
        rule: &Rule,
        position: usize,
        alternative: &Alternative<'_>,
        reporter: &mut impl ValidationReporter,
    ) {
        let Some(span) = significant_span(alternative) else {
            reporter.report(
                Finding::new(
                    FindingKind::EmptyAlternative,
                    format!(
                        "empty alternative {} in rule '{}'",
                        position + 1,
                        rule.name
                    ),
                )
                .in_rule(rule),
            );
            return;
        };

        let mut depth = 0usize;
        let mut parens_balanced = true;
        let mut classes_balanced = true;

        for token in alternative.significant() {
            match token.kind {
                TokenKind::Operator if token.text == "(" => depth += 1,
                TokenKind::Operator if token.text == ")" => match depth.checked_sub(1) {
                    Some(next) => depth = next,
                    None => parens_balanced = false,
                },
                TokenKind::CharacterClass => classes_balanced &= class_is_closed(&token.text),
                _ if token.is_char(']') => classes_balanced = false,
                _ => {}
            }
        }

        if depth != 0 || !parens_balanced {
            reporter.report(
                Finding::new(
                    FindingKind::UnbalancedParentheses,
                    format!(
                        "unbalanced parentheses in alternative {} of rule '{}'",
                        position + 1,
                        rule.name
                    ),
                )
                .at(span)
                .in_rule(rule),
            );
        }

        if !classes_balanced {
            reporter.report(
                Finding::new(
                    FindingKind::UnbalancedCharacterClass,
                    format!(
                        "unbalanced character class in alternative {} of rule '{}'",
                        position + 1,
                        rule.name
                    ),
                )
                .at(span)
                .in_rule(rule),
            );
        }
    }

    /// Resolves every identifier in one alternative against the defined rules.
    pub fn check_references(
        rule: &Rule,
        alternative: &Alternative<'_>,
        graph: &DependencyGraph,
        reporter: &mut impl ValidationReporter,
    ) {
        for reference in references(alternative) {
            let name = reference.text.as_str();
            if graph.is_defined(name) || BUILT_IN_TOKENS.contains(&name) {
                continue;
            }

            let finding = if is_terminal_name(name) {
                Finding::new(
                    FindingKind::UndefinedToken,
                    format!(
                        "token '{}' referenced in rule '{}' but not defined as a lexer rule",
                        name, rule.name
                    ),
                )
            } else {
                Finding::new(
                    FindingKind::UndefinedRule,
                    format!("reference to undefined rule '{}' in rule '{}'", name, rule.name),
                )
            };
            reporter.report(finding.at(reference.span).in_rule(rule));
        }
    }

    /// Flags an alternative whose leading identifier is its own rule.
    pub fn check_left_recursion(
        rule: &Rule,
        position: usize,
        alternative: &Alternative<'_>,
        reporter: &mut impl ValidationReporter,
    ) {
        let Some(leading) = leading_identifier(alternative) else {
            return;
        };
        if leading.text != rule.name {
            return;
        }

        reporter.report(
            Finding::new(
                FindingKind::LeftRecursion,
                format!(
                    "rule '{}' is directly left-recursive in alternative {}: {}",
                    rule.name,
                    position + 1,
                    alternative.text().trim()
                ),
            )
            .at(leading.span)
            .in_rule(rule),
        );
    }

    /// Picks the start rule: the explicit override, else the first structural
    /// rule, else the first rule.
    ///
    /// Returns `None` when reachability cannot be checked.
    pub fn resolve_start_rule(
        rules: &[Rule],
        options: &ValidateOptions,
        reporter: &mut impl ValidationReporter,
    ) -> Option<String> {
        if let Some(name) = &options.start_rule {
            if rules.iter().any(|r| &r.name == name) {
                return Some(name.clone());
            }
            reporter.report(Finding::new(
                FindingKind::UnknownStartRule,
                format!("start rule '{}' is not defined", name),
            ));
            return None;
        }

        let Some(first) = rules.first() else {
            reporter.report(Finding::new(
                FindingKind::NoStartRule,
                "no start rule: the grammar defines no rules",
            ));
            return None;
        };

        let start = rules
            .iter()
            .find(|r| is_structural_name(&r.name))
            .unwrap_or(first);
        Some(start.name.clone())
    }

    /// Reports structural rules that the start rule never reaches.
    ///
    /// Terminal-producing rules are exempt: literal matching invokes them implicitly.
    pub fn check_reachability(
        rules: &[Rule],
        graph: &DependencyGraph,
        start: &str,
        reporter: &mut impl ValidationReporter,
    ) {
        let reached = graph.reachable_from(start);
        let mut reported = HashSet::new();

        for rule in rules {
            if !is_structural_name(&rule.name) || reached.contains(&rule.name) {
                continue;
            }
            if !reported.insert(rule.name.as_str()) {
                continue;
            }

            reporter.report(
                Finding::new(
                    FindingKind::UnreachableRule,
                    format!(
                        "rule '{}' is unreachable from start rule '{}'",
                        rule.name, start
                    ),
                )
                .in_rule(rule),
            );
        }
    }
}

// === helpers ===

/// First identifier after any leading `(`, quoted literals and character classes.
pub fn leading_identifier<'a>(alternative: &Alternative<'a>) -> Option<&'a Token> {
    for token in alternative.significant() {
        match token.kind {
            TokenKind::QuotedLiteral | TokenKind::CharacterClass => continue,
            TokenKind::Operator if token.text == "(" => continue,
            _ if token.is_word() => return Some(token),
            _ => return None,
        }
    }
    None
}

/// A class token is closed when its brackets balance, honoring escapes.
fn class_is_closed(text: &str) -> bool {
    let mut depth = 0i64;
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

fn significant_span(alternative: &Alternative<'_>) -> Option<Span> {
    let mut significant = alternative.significant();
    let first = significant.next()?;
    let last = significant.last().unwrap_or(first);
    Some(first.span.join(last.span))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_with_open_class() {
        use crate::grammar::extract_all;
        use crate::validation::ValidationReport;

        let extraction = extract_all(&scan("a ::= [abc ;\nb ::= a ;"));
        assert!(extraction.rules.is_empty());

        let mut report = ValidationReport::new();
        GrammarValidators::check_fragment(&extraction.skipped[0], &mut report);
        let kinds: Vec<FindingKind> = report.errors.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            [FindingKind::MalformedRule, FindingKind::UnbalancedCharacterClass]
        );
        assert_eq!(report.errors[1].span, Some(Span::new(6, 22)));
    }

    #[test]
    fn test_class_is_closed() {
        assert!(class_is_closed("[a-z]"));
        assert!(class_is_closed("[a[b]]"));
        assert!(class_is_closed(r"[\]]"));
        assert!(!class_is_closed("[a-z"));
        assert!(!class_is_closed(r"[a\]"));
    }
}
