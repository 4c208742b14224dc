// tests/extract_tests.rs

mod common;

use common::rules;
use ebnfkit::syntax::concat;
use ebnfkit::{extract_all, scan, split, RuleClass};

// ---
// Extraction
// ---

#[test]
fn test_extracts_rules_in_order_with_lines() {
    let text = "prog ::= stmt* ;\n\nstmt ::= ID '=' expr\n       | expr ;\nID ::= [a-z]+ ;\n";
    let rules = rules(text);
    let names: Vec<&str> = rules.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["prog", "stmt", "ID"]);
    let lines: Vec<usize> = rules.iter().map(|r| r.line).collect();
    assert_eq!(lines, [1, 3, 5]);
}

#[test]
fn test_trailing_comment_becomes_next_leading_comment() {
    let text = "a ::= b ; (* about c *)\nc ::= d ;";
    let rules = rules(text);
    assert!(rules[0].leading_comments.is_empty());
    assert_eq!(rules[1].leading_comments, vec!["(* about c *)\n"]);
}

#[test]
fn test_malformed_fragments_do_not_stop_extraction() {
    let text = "garbage here\nx ::= ( y ;\nok ::= 'fine' ;\nbroken ::= z\n";
    let extraction = extract_all(&scan(text));
    let names: Vec<&str> = extraction.rules.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["x", "ok"]);
    // `garbage`, `here`, and the unterminated `broken` rule.
    assert_eq!(extraction.skipped.len(), 3);
}

#[test]
fn test_rule_display_uses_source_rhs() {
    let rules = rules("a ::= b  |  c ;");
    assert_eq!(rules[0].to_string(), "a ::= b  |  c ;");
    assert_eq!(rules[0].class(), RuleClass::Structural);
}

// ---
// Alternative splitting
// ---

#[test]
fn test_split_on_top_level_bars_only() {
    let rules = rules("a ::= b ( c | d ) | '|' | [|] e ;");
    let alternatives: Vec<String> = split(&rules[0].rhs)
        .iter()
        .map(|a| a.text().trim().to_string())
        .collect();
    assert_eq!(alternatives, ["b ( c | d )", "'|'", "[|] e"]);
}

#[test]
fn test_split_without_bar_is_whole_rhs() {
    let rules = rules("a ::= b c ;");
    let alternatives = split(&rules[0].rhs);
    assert_eq!(alternatives.len(), 1);
    assert_eq!(concat(alternatives[0].tokens), "b c");
}

#[test]
fn test_split_keeps_empty_alternatives() {
    let rules = rules("a ::= | b | ;");
    let alternatives = split(&rules[0].rhs);
    assert_eq!(alternatives.len(), 3);
    assert!(alternatives[0].is_empty());
    assert!(!alternatives[1].is_empty());
    assert!(alternatives[2].is_empty());
}

#[test]
fn test_split_empty_rhs_yields_one_empty_alternative() {
    let alternatives = split(&[]);
    assert_eq!(alternatives.len(), 1);
    assert!(alternatives[0].is_empty());
}
