//! Alternative splitting
//!
//! Partitions a right-hand side at its depth-0 `|` operators. Parenthesis depth is
//! tracked exactly as during extraction.

use crate::syntax::Token;

/// A maximal run of right-hand-side tokens with no top-level `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alternative<'a> {
    pub tokens: &'a [Token],
}

impl<'a> Alternative<'a> {
    /// Tokens that carry grammar content (no whitespace, no comments).
    pub fn significant(&self) -> impl Iterator<Item = &'a Token> + 'a {
        let tokens: &'a [Token] = self.tokens;
        tokens.iter().filter(|t| !t.is_trivia())
    }

    /// An alternative with no content between its delimiters.
    pub fn is_empty(&self) -> bool {
        self.significant().next().is_none()
    }

    pub fn text(&self) -> String {
        crate::syntax::concat(self.tokens)
    }
}

/// Splits `rhs` into its top-level alternatives.
///
/// Always returns at least one alternative. Without a top-level `|` the single
/// alternative is the whole input.
pub fn split(rhs: &[Token]) -> Vec<Alternative<'_>> {
    let mut alternatives = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (index, token) in rhs.iter().enumerate() {
        if token.is_op("(") {
            depth += 1;
        } else if token.is_op(")") {
            depth = depth.saturating_sub(1);
        } else if token.is_op("|") && depth == 0 {
            alternatives.push(Alternative {
                tokens: &rhs[start..index],
            });
            start = index + 1;
        }
    }

    alternatives.push(Alternative {
        tokens: &rhs[start..],
    });
    alternatives
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::scan;

    fn texts(text: &str) -> Vec<String> {
        let tokens = scan(text);
        split(&tokens).iter().map(|a| a.text().trim().to_string()).collect()
    }

    #[test]
    fn test_no_alternation() {
        assert_eq!(texts("a b c"), vec!["a b c"]);
    }

    #[test]
    fn test_empty_input_has_one_empty_alternative() {
        let alternatives = split(&[]);
        assert_eq!(alternatives.len(), 1);
        assert!(alternatives[0].is_empty());
    }

    #[test]
    fn test_top_level_split() {
        assert_eq!(texts("a | b c | d"), vec!["a", "b c", "d"]);
    }

    #[test]
    fn test_nested_bars_stay_together() {
        assert_eq!(texts("(a | b) c | d"), vec!["(a | b) c", "d"]);
    }

    #[test]
    fn test_bars_in_literals_and_classes_are_not_operators() {
        assert_eq!(texts("'|' | [|]"), vec!["'|'", "[|]"]);
    }

    #[test]
    fn test_empty_alternatives_are_kept() {
        let tokens = scan("a | | b |");
        let alternatives = split(&tokens);
        assert_eq!(alternatives.len(), 4);
        assert!(alternatives[1].is_empty());
        assert!(alternatives[3].is_empty());
    }
}
