//! Handles all user-facing output for the CLI.
//!
//! Results go to stdout, diagnostics and progress to stderr. Colors follow the
//! `--color` flag for both termcolor output and miette reports.

use std::fmt::Display;
use std::io::{IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;

use difference::{Changeset, Difference};
use miette::{MietteHandlerOpts, NamedSource, Report};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::cli::args::ColorMode;
use crate::errors::{EbnfError, FindingDiagnostic};
use crate::syntax::Token;
use crate::validation::{Finding, ValidationReport};

// ============================================================================
// CONSOLE: verbosity and color settings for one invocation
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct Console {
    stdout_choice: ColorChoice,
    stderr_choice: ColorChoice,
    quiet: bool,
    verbose: bool,
}

impl Console {
    pub fn new(mode: ColorMode, quiet: bool, verbose: bool) -> Self {
        Self {
            stdout_choice: resolve_choice(mode, std::io::stdout().is_terminal()),
            stderr_choice: resolve_choice(mode, std::io::stderr().is_terminal()),
            quiet,
            verbose,
        }
    }

    /// Makes miette reports follow the same color decision as stderr.
    pub fn install_report_hook(&self) {
        let color = self.stderr_choice != ColorChoice::Never;
        let _ = miette::set_hook(Box::new(move |_| {
            Box::new(MietteHandlerOpts::new().color(color).build())
        }));
    }

    fn stdout(&self) -> StandardStream {
        StandardStream::stdout(self.stdout_choice)
    }

    fn stderr(&self) -> StandardStream {
        StandardStream::stderr(self.stderr_choice)
    }

    // ========================================================================
    // LOGGING
    // ========================================================================

    /// Per-stage progress line, shown with `--verbose`.
    pub fn progress(&self, message: impl Display) {
        if !self.verbose {
            return;
        }
        let mut stderr = self.stderr();
        let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Blue)));
        let _ = write!(stderr, "  ->");
        let _ = stderr.reset();
        let _ = writeln!(stderr, " {}", message);
    }

    /// One-line status message, hidden with `--quiet`.
    pub fn status(&self, mark: &str, color: Color, message: impl Display) {
        if self.quiet {
            return;
        }
        let mut stderr = self.stderr();
        let _ = stderr.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
        let _ = write!(stderr, "{}", mark);
        let _ = stderr.reset();
        let _ = writeln!(stderr, " {}", message);
    }

    pub fn print_error(&self, error: EbnfError) {
        let report = Report::new(error);
        eprintln!("{report:?}");
    }

    // ========================================================================
    // RESULTS
    // ========================================================================

    /// Prints text produced by a command, as-is.
    pub fn print_text(&self, text: &str) {
        let mut stdout = self.stdout();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }

    /// Prints one file's findings: errors first, then warnings.
    pub fn print_report(&self, path: &Path, source: &str, report: &ValidationReport) {
        let show_warnings = !self.quiet && !report.warnings.is_empty();
        if report.errors.is_empty() && !show_warnings {
            return;
        }

        let named = Arc::new(NamedSource::new(path.display().to_string(), source.to_string()));
        let mut stderr = self.stderr();
        let _ = stderr.set_color(ColorSpec::new().set_bold(true));
        let _ = writeln!(stderr, "{}", path.display());
        let _ = stderr.reset();

        self.print_section(&mut stderr, &report.errors, Color::Red, "ERRORS", &named);
        if show_warnings {
            self.print_section(&mut stderr, &report.warnings, Color::Yellow, "WARNINGS", &named);
        }
    }

    /// Prints the closing line of a validation run.
    pub fn print_summary(&self, files: usize, errors: usize, warnings: usize) {
        if self.quiet && errors == 0 {
            return;
        }
        let mut stdout = self.stdout();
        let (mark, color, verdict) = if errors == 0 {
            ("✓", Color::Green, "validation passed")
        } else {
            ("✗", Color::Red, "validation failed")
        };
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
        let _ = write!(stdout, "{} {}", mark, verdict);
        let _ = stdout.reset();
        let _ = writeln!(
            stdout,
            ": {} file(s), {} error(s), {} warning(s)",
            files, errors, warnings
        );
    }

    /// Prints a line diff between the original and the formatted text.
    pub fn print_diff(&self, path: &Path, original: &str, formatted: &str) {
        let mut stdout = self.stdout();
        let _ = stdout.set_color(ColorSpec::new().set_bold(true));
        let _ = writeln!(stdout, "--- {}", path.display());
        let _ = writeln!(stdout, "+++ {} (formatted)", path.display());
        let _ = stdout.reset();

        let changeset = Changeset::new(original, formatted, "\n");
        for diff in &changeset.diffs {
            let (prefix, color, text) = match diff {
                Difference::Same(x) => (" ", None, x),
                Difference::Add(x) => ("+", Some(Color::Green), x),
                Difference::Rem(x) => ("-", Some(Color::Red), x),
            };
            let _ = stdout.set_color(ColorSpec::new().set_fg(color));
            for line in text.split('\n') {
                let _ = writeln!(stdout, "{}{}", prefix, line);
            }
        }
        let _ = stdout.reset();
    }

    pub fn print_tokens(&self, tokens: &[Token]) {
        let mut stdout = self.stdout();
        for token in tokens {
            let _ = stdout.set_color(ColorSpec::new().set_dimmed(true));
            let _ = write!(stdout, "{:>6}..{:<6}", token.span.start, token.span.end);
            let _ = stdout.reset();
            let _ = writeln!(stdout, " {:<16} {:?}", token.kind.as_str(), token.text);
        }
    }

    // ========================================================================
    // PRIVATE HELPERS
    // ========================================================================

    fn print_section(
        &self,
        stderr: &mut StandardStream,
        findings: &[Finding],
        color: Color,
        title: &str,
        source: &Arc<NamedSource<String>>,
    ) {
        // Guard clause - skip empty sections
        if findings.is_empty() {
            return;
        }

        let _ = stderr.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
        let _ = writeln!(stderr, "{} ({}):", title, findings.len());
        let _ = stderr.reset();

        for finding in findings {
            let report = Report::new(FindingDiagnostic {
                finding: finding.clone(),
                source: Arc::clone(source),
            });
            let _ = writeln!(stderr, "{report:?}");
        }
    }
}

fn resolve_choice(mode: ColorMode, is_terminal: bool) -> ColorChoice {
    match mode {
        ColorMode::Always => ColorChoice::Always,
        ColorMode::Never => ColorChoice::Never,
        ColorMode::Auto if is_terminal => ColorChoice::Auto,
        ColorMode::Auto => ColorChoice::Never,
    }
}
