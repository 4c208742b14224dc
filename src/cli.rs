//! The ebnfkit Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions. Core stages never fail; everything here that can
//! fail is file I/O, reported as an [`EbnfError`].

use std::{
    fs,
    path::{Path, PathBuf},
    process,
};

use clap::Parser;
use serde::Serialize;
use termcolor::Color;
use walkdir::WalkDir;

use crate::{
    errors::{EbnfError, Result},
    format::{format_extraction, FormatOptions},
    grammar::extract_all,
    normalize::normalize,
    syntax::scan,
    validation::{analyze_all, ValidateOptions, ValidationReport},
};

pub mod args;
pub mod output;

use args::{Command, EbnfArgs};
use output::Console;

/// Extensions picked up when `validate` walks a directory.
const GRAMMAR_EXTENSIONS: &[&str] = &["ebnf", "g4"];

/// Extension of source grammars that are normalized before validation.
const SOURCE_GRAMMAR_EXTENSION: &str = "g4";

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// The main entry point for the CLI.
pub fn run() {
    let args = EbnfArgs::parse();
    let console = Console::new(args.color, args.quiet, args.verbose);
    console.install_report_hook();

    let result = match args.command {
        Command::Convert {
            file,
            output,
            width,
        } => handle_convert(&console, &file, output.as_deref(), width),
        Command::Format {
            file,
            width,
            check,
            output,
        } => handle_format(&console, &file, width, check, output.as_deref()),
        Command::Validate { paths, start, json } => {
            handle_validate(&console, &paths, ValidateOptions { start_rule: start }, json)
        }
        Command::Tokens { file } => handle_tokens(&console, &file),
    };

    if let Err(error) = result {
        let code = error.exit_code();
        // These two have already been explained by the command's own output.
        if !matches!(
            error,
            EbnfError::ValidationFailed { .. } | EbnfError::NotFormatted { .. }
        ) {
            console.print_error(error);
        }
        process::exit(code);
    }
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

fn handle_convert(
    console: &Console,
    file: &Path,
    output: Option<&Path>,
    width: usize,
) -> Result<()> {
    let source = read_source(file)?;
    console.progress(format!("normalizing {}", file.display()));

    let normalized = normalize(&source);
    console.progress(format!("extracted {} rules", normalized.rules.len()));

    let rendered = normalized.render(&FormatOptions::with_width(width));
    emit(console, output, &rendered)
}

fn handle_format(
    console: &Console,
    file: &Path,
    width: usize,
    check: bool,
    output: Option<&Path>,
) -> Result<()> {
    let source = read_source(file)?;

    let tokens = scan(&source);
    console.progress(format!("scanned {} tokens", tokens.len()));

    let extraction = extract_all(&tokens);
    console.progress(format!("extracted {} rules", extraction.rules.len()));
    for fragment in &extraction.skipped {
        console.status(
            "!",
            Color::Yellow,
            format!(
                "{}:{}: kept malformed text unchanged: {}",
                file.display(),
                fragment.line,
                fragment.text.lines().next().unwrap_or_default()
            ),
        );
    }

    let formatted = format_extraction(&extraction, &FormatOptions::with_width(width));

    if !check {
        return emit(console, output, &formatted);
    }
    if formatted == source {
        console.status("✓", Color::Green, format!("{} is formatted", file.display()));
        return Ok(());
    }
    console.print_diff(file, &source, &formatted);
    Err(EbnfError::NotFormatted {
        path: file.to_path_buf(),
    })
}

fn handle_validate(
    console: &Console,
    paths: &[PathBuf],
    options: ValidateOptions,
    json: bool,
) -> Result<()> {
    let files = discover_grammar_files(paths)?;

    let mut checked = Vec::with_capacity(files.len());
    for path in files {
        checked.push(check_file(console, path, &options)?);
    }

    let errors: usize = checked.iter().map(|c| c.report.errors.len()).sum();
    let warnings: usize = checked.iter().map(|c| c.report.warnings.len()).sum();

    if json {
        console.print_text(&serde_json::to_string_pretty(&checked)?);
        console.print_text("\n");
    } else {
        for file in &checked {
            console.print_report(&file.path, &file.text, &file.report);
        }
        console.print_summary(checked.len(), errors, warnings);
    }

    if errors > 0 {
        return Err(EbnfError::ValidationFailed { errors, warnings });
    }
    Ok(())
}

fn handle_tokens(console: &Console, file: &Path) -> Result<()> {
    let source = read_source(file)?;
    console.print_tokens(&scan(&source));
    Ok(())
}

// ============================================================================
// VALIDATION PIPELINE
// ============================================================================

/// One validated file. `text` is the notation the findings' spans point into.
#[derive(Debug, Serialize)]
struct CheckedFile {
    path: PathBuf,
    #[serde(skip)]
    text: String,
    #[serde(flatten)]
    report: ValidationReport,
}

fn check_file(console: &Console, path: PathBuf, options: &ValidateOptions) -> Result<CheckedFile> {
    let source = read_source(&path)?;

    let (text, rules, skipped) = if is_source_grammar(&path) {
        let normalized = normalize(&source);
        console.progress(format!("{}: normalized source grammar", path.display()));
        (normalized.text, normalized.rules, normalized.skipped)
    } else {
        let tokens = scan(&source);
        console.progress(format!("{}: scanned {} tokens", path.display(), tokens.len()));
        let extraction = extract_all(&tokens);
        (source, extraction.rules, extraction.skipped)
    };
    console.progress(format!(
        "{}: extracted {} rules, skipped {} fragment(s)",
        path.display(),
        rules.len(),
        skipped.len()
    ));

    let report = analyze_all(&rules, &skipped, options);
    console.progress(format!(
        "{}: {} error(s), {} warning(s)",
        path.display(),
        report.errors.len(),
        report.warnings.len()
    ));

    Ok(CheckedFile { path, text, report })
}

/// Expands directories into their grammar files, sorted; plain paths pass through.
fn discover_grammar_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for root in paths {
        if !root.is_dir() {
            files.push(root.clone());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|source| EbnfError::Walk {
                path: root.clone(),
                source,
            })?;
            if !entry.file_type().is_file() || !has_extension(entry.path(), GRAMMAR_EXTENSIONS) {
                continue;
            }
            found.push(entry.path().to_path_buf());
        }

        if found.is_empty() {
            return Err(EbnfError::NoInput { path: root.clone() });
        }
        found.sort();
        files.extend(found);
    }

    Ok(files)
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| EbnfError::read(path, source))
}

/// Writes `text` to `output`, or to stdout when no path is given.
fn emit(console: &Console, output: Option<&Path>, text: &str) -> Result<()> {
    let Some(path) = output else {
        console.print_text(text);
        return Ok(());
    };
    fs::write(path, text).map_err(|source| EbnfError::write(path, source))?;
    console.status("✓", Color::Green, format!("wrote {}", path.display()));
    Ok(())
}

fn is_source_grammar(path: &Path) -> bool {
    has_extension(path, &[SOURCE_GRAMMAR_EXTENSION])
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}
