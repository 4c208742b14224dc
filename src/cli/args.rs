//! Defines the command-line arguments and subcommands for the ebnfkit CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::format::FormatOptions;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "ebnfkit",
    version,
    about = "Convert, format and validate EBNF-style grammar notation."
)]
pub struct EbnfArgs {
    #[command(subcommand)]
    pub command: Command,

    /// When to use colored output.
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    pub color: ColorMode,

    /// Only print results and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print progress for each pipeline stage to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert an ANTLR-style grammar (.g4) to rule notation.
    Convert {
        /// The source grammar to convert.
        #[arg(required = true)]
        file: PathBuf,
        /// Write the result here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Soft-wrap column for rendered rules.
        #[arg(long, default_value_t = FormatOptions::DEFAULT_WIDTH)]
        width: usize,
    },
    /// Re-render every rule of a notation file.
    Format {
        /// The notation file to format.
        #[arg(required = true)]
        file: PathBuf,
        /// Soft-wrap column for rendered rules.
        #[arg(long, default_value_t = FormatOptions::DEFAULT_WIDTH)]
        width: usize,
        /// Show a diff and fail instead of printing when the file would change.
        #[arg(long, conflicts_with = "output")]
        check: bool,
        /// Write the result here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate grammar files and report errors and warnings.
    Validate {
        /// Files or directories; directories are searched for .ebnf and .g4 files.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Start rule for reachability, instead of the inferred one.
        #[arg(long)]
        start: Option<String>,
        /// Print the reports as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Dump the scanner's tokens, one per line.
    Tokens {
        /// The grammar file to scan.
        #[arg(required = true)]
        file: PathBuf,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}
