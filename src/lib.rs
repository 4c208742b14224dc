//! ebnfkit: scanning, validation and layout for EBNF-style grammar notation.
//!
//! The pipeline is `scan -> extract -> split -> analyze / render`. Every stage is a
//! total, pure function over its input; malformed text degrades into tokens,
//! skipped fragments or findings, never into a panic.

pub mod cli;
pub mod errors;
pub mod format;
pub mod grammar;
pub mod normalize;
pub mod syntax;
pub mod validation;

pub use errors::{EbnfError, FindingDiagnostic};
pub use format::{format_source, render, render_grammar, FormatOptions};
pub use grammar::{
    extract, extract_all, split, Alternative, Extraction, Fragment, FragmentKind, Rule, RuleClass,
};
pub use normalize::{normalize, NormalizedGrammar};
pub use syntax::{scan, scan_with, ScanOptions, Span, Token, TokenKind};
pub use validation::{
    analyze, analyze_all, analyze_with, Finding, FindingKind, Severity, ValidateOptions,
    ValidationReport, ValidationReporter,
};
