//! Tokenizer error classes
//!
//! Lexer errors are never returned as `Err`: the analyzer collects them next to
//! the best-effort token stream and converts them to diagnostics.

use crate::config::compile_time::lexical::MAX_TOKEN_COUNT;
use crate::logging::{codes, Code};
use crate::utils::Diagnostic;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    #[error("Unexpected character '{character}'")]
    UnexpectedCharacter {
        character: char,
        line: u32,
        column: u32,
    },

    #[error("Unclosed string literal: missing closing {quote}")]
    UnclosedString { quote: char, line: u32, column: u32 },

    #[error("Malformed variable end: expected '}}}}'")]
    MalformedVariableEnd { line: u32, column: u32 },

    #[error("Malformed tag end: expected '%}}'")]
    MalformedTagEnd { line: u32, column: u32 },

    #[error("Unclosed variable: missing '}}}}'")]
    UnclosedVariable { line: u32, column: u32 },

    #[error("Unclosed tag: missing '%}}'")]
    UnclosedTag { line: u32, column: u32 },

    #[error("Unclosed '[' in selector")]
    UnclosedSelectorBracket { line: u32, column: u32 },

    #[error("Unclosed '(' in selector")]
    UnclosedSelectorParen { line: u32, column: u32 },

    #[error("Unclosed {quote} quote in selector")]
    UnclosedSelectorQuote { quote: char, line: u32, column: u32 },

    #[error("Unmatched ']' in selector")]
    UnmatchedSelectorBracket { line: u32, column: u32 },

    #[error("Unmatched ')' in selector")]
    UnmatchedSelectorParen { line: u32, column: u32 },

    #[error("Too many tokens: template exceeds {MAX_TOKEN_COUNT} tokens")]
    TooManyTokens { line: u32, column: u32 },
}

impl LexerError {
    pub fn error_code(&self) -> Code {
        match self {
            LexerError::UnexpectedCharacter { .. } => codes::lexical::UNEXPECTED_CHARACTER,
            LexerError::UnclosedString { .. } => codes::lexical::UNCLOSED_STRING,
            LexerError::MalformedVariableEnd { .. } => codes::lexical::MALFORMED_VARIABLE_END,
            LexerError::MalformedTagEnd { .. } => codes::lexical::MALFORMED_TAG_END,
            LexerError::UnclosedVariable { .. } => codes::lexical::UNCLOSED_VARIABLE,
            LexerError::UnclosedTag { .. } => codes::lexical::UNCLOSED_TAG,
            LexerError::UnclosedSelectorBracket { .. } => codes::lexical::UNCLOSED_SELECTOR_BRACKET,
            LexerError::UnclosedSelectorParen { .. } => codes::lexical::UNCLOSED_SELECTOR_PAREN,
            LexerError::UnclosedSelectorQuote { .. } => codes::lexical::UNCLOSED_SELECTOR_QUOTE,
            LexerError::UnmatchedSelectorBracket { .. } => {
                codes::lexical::UNMATCHED_SELECTOR_BRACKET
            }
            LexerError::UnmatchedSelectorParen { .. } => codes::lexical::UNMATCHED_SELECTOR_PAREN,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }

    /// Line and column of the offending character
    pub fn location(&self) -> (u32, u32) {
        match *self {
            LexerError::UnexpectedCharacter { line, column, .. }
            | LexerError::UnclosedString { line, column, .. }
            | LexerError::MalformedVariableEnd { line, column }
            | LexerError::MalformedTagEnd { line, column }
            | LexerError::UnclosedVariable { line, column }
            | LexerError::UnclosedTag { line, column }
            | LexerError::UnclosedSelectorBracket { line, column }
            | LexerError::UnclosedSelectorParen { line, column }
            | LexerError::UnclosedSelectorQuote { line, column, .. }
            | LexerError::UnmatchedSelectorBracket { line, column }
            | LexerError::UnmatchedSelectorParen { line, column }
            | LexerError::TooManyTokens { line, column } => (line, column),
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
    fn test_messages() {
        let error = LexerError::UnexpectedCharacter {
            character: '\u{201C}',
            line: 1,
            column: 4,
        };
        assert_eq!(error.to_string(), "Unexpected character '\u{201C}'");

        let error = LexerError::MalformedVariableEnd { line: 1, column: 1 };
        assert_eq!(error.to_string(), "Malformed variable end: expected '}}'");

        let error = LexerError::UnclosedTag { line: 1, column: 1 };
        assert_eq!(error.to_string(), "Unclosed tag: missing '%}'");
    }

    #[test]
    fn test_to_diagnostic() {
        let error = LexerError::UnclosedString {
            quote: '"',
            line: 3,
            column: 9,
        };
        let diagnostic = error.to_diagnostic();
        assert_eq!(diagnostic.code, codes::lexical::UNCLOSED_STRING);
        assert_eq!((diagnostic.line, diagnostic.column), (3, 9));
        assert!(diagnostic.is_error());
    }
}
