//! Shared helpers for the integration tests.
#![allow(dead_code)]

use ebnfkit::{
    analyze, analyze_all, extract, extract_all, scan, Finding, FindingKind, Rule,
    ValidateOptions, ValidationReport,
};

/// Scans and extracts `text`.
pub fn rules(text: &str) -> Vec<Rule> {
    extract(&scan(text))
}

/// Runs the full analysis with start-rule inference.
pub fn report(text: &str) -> ValidationReport {
    analyze(&rules(text))
}

/// Analyzes a whole document, malformed fragments included.
pub fn document_report(text: &str) -> ValidationReport {
    let extraction = extract_all(&scan(text));
    analyze_all(&extraction.rules, &extraction.skipped, &ValidateOptions::default())
}

/// Findings of one kind, errors and warnings together.
pub fn findings_of(report: &ValidationReport, kind: FindingKind) -> Vec<&Finding> {
    report
        .errors
        .iter()
        .chain(&report.warnings)
        .filter(|f| f.kind == kind)
        .collect()
}

/// Names of the rules reported unreachable.
pub fn unreachable(report: &ValidationReport) -> Vec<String> {
    findings_of(report, FindingKind::UnreachableRule)
        .into_iter()
        .filter_map(|f| f.rule.clone())
        .collect()
}

/// A small ANTLR grammar exercising most source-only constructs.
pub const EXPR_G4: &str = r#"grammar Expr;

options { language = Java; }

@header { package calc; }

// entry point
prog : stat+ EOF ;

stat : expr NEWLINE          # printExpr
     | ID '=' expr NEWLINE   # assign
     | NEWLINE               # blank
     ;

expr : expr op=('*'|'/') expr
     | expr op=('+'|'-') expr
     | INT
     | ID
     | '(' expr ')'
     ;

ID : [a-zA-Z]+ ;
INT : [0-9]+ ;
NEWLINE : '\r'? '\n' ;
WS : [ \t]+ -> skip ;
"#;
