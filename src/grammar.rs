//! Rule model for the normalized notation
//!
//! A grammar is an ordered list of [`Rule`]s recovered from a token stream by the
//! [`extract`] pass. Each rule's right-hand side can be split into top-level
//! [`Alternative`]s for formatting or analysis.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::syntax::{Span, Token};

pub mod alternatives;
pub mod extract;

pub use alternatives::{split, Alternative};
pub use extract::{extract, extract_all, Extraction, Fragment, FragmentKind};

static TERMINAL_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z_][A-Z0-9_]*$").unwrap());
static STRUCTURAL_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z_]\w*$").unwrap());

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// One grammar production: `name ::= rhs ;`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    /// Tokens between `::=` and the terminating `;`, interior whitespace included.
    pub rhs: Vec<Token>,
    /// Comment texts (each with its trailing whitespace) that precede the rule.
    pub leading_comments: Vec<String>,
    /// 1-based line of the rule name.
    pub line: usize,
    /// From the rule name through the terminating `;`.
    pub span: Span,
}

/// Naming convention of a rule or reference, derived from its spelling.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleClass {
    /// `[A-Z_][A-Z0-9_]*`: describes a lexical construct.
    TerminalProducing,
    /// `[a-z_]\w*`: composes other rules.
    Structural,
    /// Anything else, e.g. `Pascal` or `IDs`. Tolerated, never rejected.
    Mixed,
}

impl RuleClass {
    pub fn of(name: &str) -> Self {
        if TERMINAL_NAME.is_match(name) {
            RuleClass::TerminalProducing
        } else if STRUCTURAL_NAME.is_match(name) {
            RuleClass::Structural
        } else {
            RuleClass::Mixed
        }
    }
}

pub fn is_terminal_name(name: &str) -> bool {
    RuleClass::of(name) == RuleClass::TerminalProducing
}

pub fn is_structural_name(name: &str) -> bool {
    RuleClass::of(name) == RuleClass::Structural
}

impl Rule {
    pub fn class(&self) -> RuleClass {
        RuleClass::of(&self.name)
    }

    pub fn alternatives(&self) -> Vec<Alternative<'_>> {
        split(&self.rhs)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ::= {} ;", self.name, crate::syntax::concat(&self.rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_classes() {
        assert_eq!(RuleClass::of("ID"), RuleClass::TerminalProducing);
        assert_eq!(RuleClass::of("INT_2"), RuleClass::TerminalProducing);
        assert_eq!(RuleClass::of("_WS"), RuleClass::TerminalProducing);
        assert_eq!(RuleClass::of("expr"), RuleClass::Structural);
        assert_eq!(RuleClass::of("expr_list2"), RuleClass::Structural);
        assert_eq!(RuleClass::of("exprList"), RuleClass::Structural);
        assert_eq!(RuleClass::of("Expr"), RuleClass::Mixed);
        assert_eq!(RuleClass::of("IDs"), RuleClass::Mixed);
        assert_eq!(RuleClass::of(""), RuleClass::Mixed);
    }
}
