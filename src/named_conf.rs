//! Lexical checks for `named.conf` style configuration text.
//!
//! The scanner tracks brace depth outside quoted strings and comments. Block
//! comments are approximated: `/*` never opens one, a `*/` anywhere outside a
//! quoted string ends whatever comment state is active, and a `//` comment
//! only carries over to the next line when its line also contains `*/`.

use crate::validation::ValidationResult;
use tracing::debug;

/// Scanner state carried from one character to the next, across lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexState {
    Normal,
    InQuotes,
    InLineComment,
    InBlockComment,
}

impl LexState {
    fn in_comment(self) -> bool {
        matches!(self, LexState::InLineComment | LexState::InBlockComment)
    }

    /// State carried into the next line once `line` has been scanned
    fn at_end_of_line(self, line: &str) -> LexState {
        if !self.in_comment() {
            self
        } else if line.contains("*/") {
            LexState::InBlockComment
        } else {
            LexState::Normal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Effect {
    None,
    Open,
    Close,
    SkipRestOfLine,
}

/// Character transition table, rules in precedence order
fn transition(
    state: LexState,
    prev: Option<char>,
    c: char,
    next: Option<char>,
) -> (LexState, Effect) {
    use LexState::*;

    match (state, prev, c, next) {
        (InQuotes, _, '"', _) => (Normal, Effect::None),
        (s, _, '"', _) if !s.in_comment() => (InQuotes, Effect::None),
        (s, _, '/', Some('/')) if s != InQuotes => (InLineComment, Effect::SkipRestOfLine),
        // Closes a comment whether or not one was opened
        (s, Some('*'), '/', _) if s != InQuotes => (Normal, Effect::None),
        (Normal, _, '{', _) => (Normal, Effect::Open),
        (Normal, _, '}', _) => (Normal, Effect::Close),
        (s, _, _, _) => (s, Effect::None),
    }
}

/// Final scanner state for a piece of configuration text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexSummary {
    pub brace_depth: i64,
    pub state: LexState,
    pub warnings: Vec<String>,
}

pub struct ConfigLexValidator;

impl ConfigLexValidator {
    pub fn scan(content: &str) -> LexSummary {
        let mut state = LexState::Normal;
        let mut depth: i64 = 0;
        let mut warnings = Vec::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            let chars: Vec<char> = line.chars().collect();

            for (j, &c) in chars.iter().enumerate() {
                let prev = j.checked_sub(1).map(|p| chars[p]);
                let next = chars.get(j + 1).copied();

                let (new_state, effect) = transition(state, prev, c, next);
                state = new_state;
                match effect {
                    Effect::Open => depth += 1,
                    Effect::Close => depth -= 1,
                    Effect::SkipRestOfLine => break,
                    Effect::None => {}
                }
            }

            state = state.at_end_of_line(line);

            if line.ends_with(';') && line.contains('{') {
                warnings.push(format!(
                    "Line {}: Opening brace and semicolon on same line",
                    idx + 1
                ));
            }
        }

        LexSummary {
            brace_depth: depth,
            state,
            warnings,
        }
    }

    pub fn validate(content: &str) -> ValidationResult {
        let summary = Self::scan(content);
        let mut errors = Vec::new();

        if summary.brace_depth > 0 {
            errors.push("Mismatched braces: missing closing brace(s)".to_string());
        } else if summary.brace_depth < 0 {
            errors.push("Mismatched braces: missing opening brace(s)".to_string());
        }

        if summary.state == LexState::InQuotes {
            errors.push("Unclosed quoted string".to_string());
        }

        debug!(
            "Configuration lex check: depth {}, {} errors, {} warnings",
            summary.brace_depth,
            errors.len(),
            summary.warnings.len()
        );
        ValidationResult::new(errors, summary.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_options_block() {
        let result = ConfigLexValidator::validate("options {\n directory \"/x\";\n};");
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_missing_closing_brace() {
        let result = ConfigLexValidator::validate("options {\n directory \"/x\";\n");
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec!["Mismatched braces: missing closing brace(s)"]
        );
    }

    #[test]
    fn test_missing_opening_brace() {
        let result = ConfigLexValidator::validate("};\n");
        assert_eq!(
            result.errors,
            vec!["Mismatched braces: missing opening brace(s)"]
        );
    }

    #[test]
    fn test_braces_inside_quotes_and_comments_ignored() {
        let content = "zone \"{weird}\" {\n  file \"db.x\"; // stray }\n};\n";
        assert!(ConfigLexValidator::validate(content).valid);
    }

    #[test]
    fn test_unclosed_quote() {
        let result = ConfigLexValidator::validate("options { directory \"/x; };");
        assert!(result.errors.contains(&"Unclosed quoted string".to_string()));
    }

    #[test]
    fn test_brace_and_semicolon_warning() {
        let result = ConfigLexValidator::validate("zone \"a\" { type master; };\n");
        assert!(result.valid);
        assert_eq!(
            result.warnings,
            vec!["Line 1: Opening brace and semicolon on same line"]
        );
    }

    #[test]
    fn test_line_comment_does_not_persist() {
        let summary = ConfigLexValidator::scan("// comment {\noptions {\n};\n");
        assert_eq!(summary.state, LexState::Normal);
        assert_eq!(summary.brace_depth, 0);
    }

    #[test]
    fn test_comment_persists_when_line_has_block_end() {
        // `*/` on the same line keeps the comment open into the next line
        let summary = ConfigLexValidator::scan("a */ b // c\n{\n");
        assert_eq!(summary.brace_depth, 0);
        assert_eq!(summary.state, LexState::Normal);

        let summary = ConfigLexValidator::scan("a */ b // c\n{ x */ {\n");
        assert_eq!(summary.brace_depth, 1);
    }

    #[test]
    fn test_block_comment_opener_is_not_recognized() {
        let summary = ConfigLexValidator::scan("/* { */\n");
        assert_eq!(summary.brace_depth, 1);
    }
}
