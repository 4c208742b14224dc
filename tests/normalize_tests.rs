// tests/normalize_tests.rs

mod common;

use common::{findings_of, EXPR_G4};
use ebnfkit::syntax::concat;
use ebnfkit::{analyze, normalize, FindingKind, FormatOptions};

fn rhs_of(name: &str) -> String {
    let normalized = normalize(EXPR_G4);
    let rule = normalized
        .rules
        .iter()
        .find(|r| r.name == name)
        .unwrap_or_else(|| panic!("no rule {name} in:\n{}", normalized.text));
    concat(&rule.rhs)
}

#[test]
fn test_converts_every_rule() {
    let normalized = normalize(EXPR_G4);
    let names: Vec<&str> = normalized.rules.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["prog", "stat", "expr", "ID", "INT", "NEWLINE", "WS"]);
}

#[test]
fn test_headers_and_actions_are_gone() {
    let normalized = normalize(EXPR_G4);
    for gone in ["grammar Expr", "options", "language", "@header", "package"] {
        assert!(!normalized.text.contains(gone), "{gone:?} left in:\n{}", normalized.text);
    }
}

#[test]
fn test_labels_and_commands_are_dropped() {
    assert!(!rhs_of("stat").contains('#'));
    assert!(!rhs_of("expr").contains("op"));
    assert_eq!(rhs_of("WS"), "[ \\t]+");
}

#[test]
fn test_comments_become_notation_comments() {
    let normalized = normalize(EXPR_G4);
    let prog = &normalized.rules[0];
    assert_eq!(prog.leading_comments.concat().trim(), "(* entry point *)");
}

#[test]
fn test_converted_grammar_validates() {
    let normalized = normalize(EXPR_G4);
    let report = analyze(&normalized.rules);
    assert!(report.is_valid(), "{:?}", report.errors);
    assert_eq!(report.start_rule.as_deref(), Some("prog"));
    // Leading literals are skipped, so `'(' expr ')'` counts as well.
    let recursive: Vec<String> = findings_of(&report, FindingKind::LeftRecursion)
        .iter()
        .map(|f| f.message.clone())
        .collect();
    assert_eq!(recursive.len(), 3, "{recursive:?}");
    assert!(recursive[2].contains("alternative 5"));
    assert!(findings_of(&report, FindingKind::UnreachableRule).is_empty());
}

#[test]
fn test_rendered_conversion() {
    let rendered = normalize(EXPR_G4).render(&FormatOptions::default());
    assert!(rendered.starts_with("(* entry point *)\nprog ::= stat+ EOF ;\n\n"));
    assert!(rendered.contains("expr ::= expr ('*' | '/') expr\n"));
    assert!(rendered.contains("\nWS ::= [ \\t]+ ;\n"));
    assert!(rendered.ends_with("NEWLINE ::= '\\r'? '\\n' ;\n\nWS ::= [ \\t]+ ;\n"));
}

#[test]
fn test_normalizing_notation_is_harmless() {
    let text = "a ::= b | 'c' ;\nb ::= [x-z]+ ;\n";
    let normalized = normalize(text);
    assert_eq!(normalized.text, text);
    assert_eq!(normalized.rules.len(), 2);
}
