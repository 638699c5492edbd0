//! Parser error classes
//!
//! Each production that can fail has its own variant so template authors get
//! a specific message instead of a generic parse error.

use crate::config::compile_time::syntax::MAX_PARSE_DEPTH;
use crate::logging::{codes, Code};
use crate::utils::Diagnostic;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("Expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: u32,
        column: u32,
    },

    #[error("Expected an expression, found {found}")]
    MissingExpression { found: String, line: u32, column: u32 },

    #[error("Expected a filter name after '|', found {found}")]
    MissingFilterName { found: String, line: u32, column: u32 },

    #[error("Expected '%}}' to close tag, found {found}")]
    MissingTagEnd { found: String, line: u32, column: u32 },

    #[error("Expected '}}}}' to close variable, found {found}")]
    MissingVariableEnd { found: String, line: u32, column: u32 },

    #[error("Expected a condition after '{tag}'")]
    MissingCondition {
        tag: &'static str,
        line: u32,
        column: u32,
    },

    #[error("Missing '{{% endif %}}' for 'if' opened here")]
    MissingEndIf { line: u32, column: u32 },

    #[error("Missing '{{% endfor %}}' for 'for' opened here")]
    MissingEndFor { line: u32, column: u32 },

    #[error("Expected a loop variable name after 'for', found {found}")]
    MissingIterator { found: String, line: u32, column: u32 },

    #[error("Expected 'in' after '{iterator}' in for loop, found {found}")]
    MissingIn {
        iterator: String,
        found: String,
        line: u32,
        column: u32,
    },

    #[error("Expected an expression to iterate over after 'in'")]
    MissingIterable { line: u32, column: u32 },

    #[error("Expected a variable name after 'set', found {found}")]
    MissingSetName { found: String, line: u32, column: u32 },

    #[error("Expected '=' after '{name}' in set statement, found {found}")]
    MissingSetAssign {
        name: String,
        found: String,
        line: u32,
        column: u32,
    },

    #[error("Expected a value after '=' in set statement for '{name}'")]
    MissingSetValue { name: String, line: u32, column: u32 },

    #[error("Unexpected '{keyword}', no matching opening tag")]
    UnmatchedClosingTag {
        keyword: &'static str,
        line: u32,
        column: u32,
    },

    #[error("Unknown tag '{name}'")]
    UnknownTag { name: String, line: u32, column: u32 },

    #[error("Empty tag")]
    EmptyTag { line: u32, column: u32 },

    #[error("Empty variable")]
    EmptyVariable { line: u32, column: u32 },

    #[error("Unquoted words in variable. To use a prompt, wrap it in quotes: {{{{\"{suggestion}\"}}}}")]
    AmbiguousPrompt {
        suggestion: String,
        line: u32,
        column: u32,
    },

    #[error("Expression nested too deeply (maximum depth is {MAX_PARSE_DEPTH})")]
    NestingTooDeep { line: u32, column: u32 },
}

impl SyntaxError {
    pub fn error_code(&self) -> Code {
        match self {
            SyntaxError::UnexpectedToken { .. }
            | SyntaxError::MissingExpression { .. }
            | SyntaxError::MissingFilterName { .. } => codes::syntax::UNEXPECTED_TOKEN,
            SyntaxError::MissingTagEnd { .. } | SyntaxError::MissingVariableEnd { .. } => {
                codes::syntax::MISSING_CLOSING_DELIMITER
            }
            SyntaxError::MissingCondition { .. } => codes::syntax::MISSING_CONDITION,
            SyntaxError::MissingEndIf { .. } => codes::syntax::MISSING_ENDIF,
            SyntaxError::MissingEndFor { .. } => codes::syntax::MISSING_ENDFOR,
            SyntaxError::MissingIterator { .. } => codes::syntax::MISSING_ITERATOR,
            SyntaxError::MissingIn { .. } => codes::syntax::MISSING_IN,
            SyntaxError::MissingIterable { .. } => codes::syntax::MISSING_ITERABLE,
            SyntaxError::MissingSetName { .. } => codes::syntax::MISSING_SET_NAME,
            SyntaxError::MissingSetAssign { .. } => codes::syntax::MISSING_SET_ASSIGN,
            SyntaxError::MissingSetValue { .. } => codes::syntax::MISSING_SET_VALUE,
            SyntaxError::UnmatchedClosingTag { .. } => codes::syntax::UNMATCHED_CLOSING_TAG,
            SyntaxError::UnknownTag { .. } => codes::syntax::UNKNOWN_TAG,
            SyntaxError::EmptyTag { .. } | SyntaxError::EmptyVariable { .. } => {
                codes::syntax::EMPTY_BLOCK
            }
            SyntaxError::AmbiguousPrompt { .. } => codes::syntax::AMBIGUOUS_PROMPT,
            SyntaxError::NestingTooDeep { .. } => codes::syntax::MAX_NESTING_DEPTH,
        }
    }

    pub fn location(&self) -> (u32, u32) {
        match *self {
            SyntaxError::UnexpectedToken { line, column, .. }
            | SyntaxError::MissingExpression { line, column, .. }
            | SyntaxError::MissingFilterName { line, column, .. }
            | SyntaxError::MissingTagEnd { line, column, .. }
            | SyntaxError::MissingVariableEnd { line, column, .. }
            | SyntaxError::MissingCondition { line, column, .. }
            | SyntaxError::MissingEndIf { line, column }
            | SyntaxError::MissingEndFor { line, column }
            | SyntaxError::MissingIterator { line, column, .. }
            | SyntaxError::MissingIn { line, column, .. }
            | SyntaxError::MissingIterable { line, column }
            | SyntaxError::MissingSetName { line, column, .. }
            | SyntaxError::MissingSetAssign { line, column, .. }
            | SyntaxError::MissingSetValue { line, column, .. }
            | SyntaxError::UnmatchedClosingTag { line, column, .. }
            | SyntaxError::UnknownTag { line, column, .. }
            | SyntaxError::EmptyTag { line, column }
            | SyntaxError::EmptyVariable { line, column }
            | SyntaxError::AmbiguousPrompt { line, column, .. }
            | SyntaxError::NestingTooDeep { line, column } => (line, column),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let (line, column) = self.location();
        Diagnostic::error(self.error_code(), self.to_string(), line, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brace_escaping_in_messages() {
        let error = SyntaxError::MissingEndIf { line: 1, column: 1 };
        assert_eq!(error.to_string(), "Missing '{% endif %}' for 'if' opened here");

        let error = SyntaxError::MissingVariableEnd {
            found: "end of input".to_string(),
            line: 1,
            column: 1,
        };
        assert_eq!(
            error.to_string(),
            "Expected '}}' to close variable, found end of input"
        );

        let error = SyntaxError::AmbiguousPrompt {
            suggestion: "summarize this page".to_string(),
            line: 1,
            column: 3,
        };
        assert_eq!(
            error.to_string(),
            "Unquoted words in variable. To use a prompt, wrap it in quotes: {{\"summarize this page\"}}"
        );
    }

    #[test]
    fn test_unmatched_message() {
        let error = SyntaxError::UnmatchedClosingTag {
            keyword: "endif",
            line: 2,
            column: 1,
        };
        assert_eq!(error.to_string(), "Unexpected 'endif', no matching opening tag");
        assert_eq!(error.error_code(), codes::syntax::UNMATCHED_CLOSING_TAG);
        assert_eq!(error.location(), (2, 1));
    }
}
