//! Error handling
//!
//! The analysis core never fails; malformed grammar text is reported as findings.
//! [`EbnfError`] covers the I/O boundary around it, and [`FindingDiagnostic`] lets
//! findings render through `miette` with a labeled source snippet.

use std::path::PathBuf;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, Severity as MietteSeverity, SourceCode};
use thiserror::Error;

use crate::syntax::to_source_span;
use crate::validation::{Finding, Severity};

/// Failures outside the analysis core.
#[derive(Debug, Error, Diagnostic)]
pub enum EbnfError {
    #[error("failed to read '{}'", .path.display())]
    #[diagnostic(code(ebnfkit::io::read), help("check that the file exists and is readable"))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{}'", .path.display())]
    #[diagnostic(code(ebnfkit::io::write))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk '{}'", .path.display())]
    #[diagnostic(code(ebnfkit::io::walk))]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("no grammar files found under '{}'", .path.display())]
    #[diagnostic(
        code(ebnfkit::io::no_input),
        help("validate looks for files ending in .ebnf or .g4")
    )]
    NoInput { path: PathBuf },

    #[error("failed to serialize report")]
    #[diagnostic(code(ebnfkit::output::json))]
    Json(#[from] serde_json::Error),

    #[error("grammar validation failed with {errors} error(s) and {warnings} warning(s)")]
    #[diagnostic(code(ebnfkit::validation::failed))]
    ValidationFailed { errors: usize, warnings: usize },

    #[error("'{}' is not formatted", .path.display())]
    #[diagnostic(code(ebnfkit::format::check), help("run `ebnfkit format` without --check"))]
    NotFormatted { path: PathBuf },
}

impl EbnfError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EbnfError::Read {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EbnfError::Write {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            EbnfError::ValidationFailed { .. } | EbnfError::NotFormatted { .. } => 1,
            _ => 2,
        }
    }
}

pub type Result<T, E = EbnfError> = std::result::Result<T, E>;

/// A validation [`Finding`] paired with the grammar text it was found in.
#[derive(Debug)]
pub struct FindingDiagnostic {
    pub finding: Finding,
    pub source: Arc<NamedSource<String>>,
}

impl FindingDiagnostic {
    pub fn new(finding: Finding, name: impl AsRef<str>, content: impl Into<String>) -> Self {
        Self {
            finding,
            source: Arc::new(NamedSource::new(name, content.into())),
        }
    }
}

impl std::fmt::Display for FindingDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.finding.message)
    }
}

impl std::error::Error for FindingDiagnostic {}

impl Diagnostic for FindingDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(self.finding.kind.code()))
    }

    fn severity(&self) -> Option<MietteSeverity> {
        Some(match self.finding.severity {
            Severity::Error => MietteSeverity::Error,
            Severity::Warning => MietteSeverity::Warning,
        })
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.finding.span.map(|_| self.source.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.finding.span?;
        let label = match &self.finding.rule {
            Some(rule) => format!("in rule '{}'", rule),
            None => "here".to_string(),
        };
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(label),
            to_source_span(span),
        ))))
    }
}

#[cfg(test)]
mod tests {
    use miette::Report;

    use super::*;
    use crate::syntax::Span;
    use crate::validation::FindingKind;

    #[test]
    fn test_finding_renders_with_snippet() {
        let source = "stmt ::= assign ;";
        let finding = Finding::new(
            FindingKind::UndefinedRule,
            "reference to undefined rule 'assign' in rule 'stmt'",
        )
        .at(Span::new(9, 15));
        let report = Report::new(FindingDiagnostic::new(finding, "test.ebnf", source));
        let output = format!("{report:?}");
        assert!(output.contains("reference to undefined rule 'assign'"));
        assert!(output.contains("ebnfkit::validation::undefined-rule"));
    }

    #[test]
    fn test_exit_codes() {
        let failed = EbnfError::ValidationFailed {
            errors: 1,
            warnings: 0,
        };
        assert_eq!(failed.exit_code(), 1);
        let missing = EbnfError::read("x", std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(missing.exit_code(), 2);
    }
}
