//! Static validation of rule notation
//!
//! [`analyze`] is a pure function of the rule list. It builds the dependency graph
//! and reports findings in rule declaration order, then alternative order, with
//! reachability findings last.
//!
//! Errors mean the notation is structurally broken: unbalanced delimiters, empty
//! alternatives, duplicate names, undefined references. Warnings flag likely but
//! uncertain issues: unreachable rules, direct left recursion, undefined tokens.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grammar::{Fragment, Rule};
use crate::syntax::Span;

pub mod checks;
pub mod graph;

pub use checks::GrammarValidators;
pub use graph::DependencyGraph;

// =====================
// Core Data Structures
// =====================

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// What a [`Finding`] is about.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    MalformedRule,
    UnbalancedParentheses,
    UnbalancedCharacterClass,
    EmptyAlternative,
    DuplicateRule,
    UndefinedRule,
    UndefinedToken,
    LeftRecursion,
    UnreachableRule,
    NoStartRule,
    UnknownStartRule,
}

impl FindingKind {
    pub fn severity(&self) -> Severity {
        match self {
            FindingKind::MalformedRule
            | FindingKind::UnbalancedParentheses
            | FindingKind::UnbalancedCharacterClass
            | FindingKind::EmptyAlternative
            | FindingKind::DuplicateRule
            | FindingKind::UndefinedRule
            | FindingKind::UnknownStartRule => Severity::Error,
            FindingKind::UndefinedToken
            | FindingKind::LeftRecursion
            | FindingKind::UnreachableRule
            | FindingKind::NoStartRule => Severity::Warning,
        }
    }

    /// Stable diagnostic code, e.g. `ebnfkit::validation::duplicate-rule`.
    pub fn code(&self) -> &'static str {
        match self {
            FindingKind::MalformedRule => "ebnfkit::validation::malformed-rule",
            FindingKind::UnbalancedParentheses => "ebnfkit::validation::unbalanced-parentheses",
            FindingKind::UnbalancedCharacterClass => {
                "ebnfkit::validation::unbalanced-character-class"
            }
            FindingKind::EmptyAlternative => "ebnfkit::validation::empty-alternative",
            FindingKind::DuplicateRule => "ebnfkit::validation::duplicate-rule",
            FindingKind::UndefinedRule => "ebnfkit::validation::undefined-rule",
            FindingKind::UndefinedToken => "ebnfkit::validation::undefined-token",
            FindingKind::LeftRecursion => "ebnfkit::validation::left-recursion",
            FindingKind::UnreachableRule => "ebnfkit::validation::unreachable-rule",
            FindingKind::NoStartRule => "ebnfkit::validation::no-start-rule",
            FindingKind::UnknownStartRule => "ebnfkit::validation::unknown-start-rule",
        }
    }
}

/// One validation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: Severity,
    pub message: String,
    /// Rule the finding belongs to, if any.
    pub rule: Option<String>,
    pub line: Option<usize>,
    pub span: Option<Span>,
}

impl Finding {
    pub fn new(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            message: message.into(),
            rule: None,
            line: None,
            span: None,
        }
    }

    /// Attaches the rule's name and line.
    pub fn in_rule(mut self, rule: &Rule) -> Self {
        self.rule = Some(rule.name.clone());
        self.line = Some(rule.line);
        self.span.get_or_insert(rule.span);
        self
    }

    /// Attaches a skipped fragment's leading name, line and span.
    pub fn in_fragment(mut self, fragment: &Fragment) -> Self {
        self.rule = Some(fragment.name.clone());
        self.line = Some(fragment.line);
        self.span.get_or_insert(fragment.span);
        self
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Errors and warnings from one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    /// The inferred or overridden start rule.
    pub start_rule: Option<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

/// Explicit configuration for a validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateOptions {
    /// Overrides start-rule inference.
    pub start_rule: Option<String>,
}

// =====================
// Traits
// =====================

pub trait ValidationReporter {
    fn report_error(&mut self, finding: Finding);
    fn report_warning(&mut self, finding: Finding);

    /// Routes a finding by its severity.
    fn report(&mut self, finding: Finding) {
        match finding.severity {
            Severity::Error => self.report_error(finding),
            Severity::Warning => self.report_warning(finding),
        }
    }
}

impl ValidationReporter for ValidationReport {
    fn report_error(&mut self, finding: Finding) {
        self.errors.push(finding);
    }
    fn report_warning(&mut self, finding: Finding) {
        self.warnings.push(finding);
    }
}

// =====================
// Public API
// =====================

/// Validates `rules` with start-rule inference.
pub fn analyze(rules: &[Rule]) -> ValidationReport {
    analyze_with(rules, &ValidateOptions::default())
}

/// Validates a whole document: malformed fragments are reported first, then `rules`.
pub fn analyze_all(
    rules: &[Rule],
    skipped: &[Fragment],
    options: &ValidateOptions,
) -> ValidationReport {
    let mut report = ValidationReport::new();
    for fragment in skipped {
        GrammarValidators::check_fragment(fragment, &mut report);
    }

    let analysis = analyze_with(rules, options);
    report.errors.extend(analysis.errors);
    report.warnings.extend(analysis.warnings);
    report.start_rule = analysis.start_rule;
    report
}

/// Validates `rules` with explicit options.
pub fn analyze_with(rules: &[Rule], options: &ValidateOptions) -> ValidationReport {
    let mut report = ValidationReport::new();
    let graph = DependencyGraph::build(rules);
    let first_definitions = GrammarValidators::first_definitions(rules);

    for (index, rule) in rules.iter().enumerate() {
        GrammarValidators::check_duplicate(rules, index, &first_definitions, &mut report);
        for (position, alternative) in rule.alternatives().iter().enumerate() {
            GrammarValidators::check_balance(rule, position, alternative, &mut report);
            GrammarValidators::check_references(rule, alternative, &graph, &mut report);
            GrammarValidators::check_left_recursion(rule, position, alternative, &mut report);
        }
    }

    let start = GrammarValidators::resolve_start_rule(rules, options, &mut report);
    report.start_rule = start.clone().or_else(|| options.start_rule.clone());
    if let Some(start) = start {
        GrammarValidators::check_reachability(rules, &graph, &start, &mut report);
    }

    report
}
