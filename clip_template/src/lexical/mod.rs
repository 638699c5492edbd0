//! Lexical analysis
//!
//! Converts template source into a flat token stream. Never fails: malformed
//! input yields a best-effort stream plus diagnostics.

pub mod analyzer;
pub mod error;
pub mod selector;

use crate::logging::codes;
use crate::tokens::{Token, TokenKind};
use crate::utils::Diagnostic;
use crate::{log_debug, log_success};
use serde::Serialize;

pub use analyzer::{LexicalAnalyzer, LexicalOutput};
pub use error::LexerError;

/// Result of [`tokenize`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct TokenizeResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<Diagnostic>,
}

impl TokenizeResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Number of `{{ ... }}` sites in the stream
    pub fn variable_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::VariableStart { .. }))
            .count()
    }

    /// Number of `{% ... %}` tags in the stream
    pub fn tag_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::TagStart { .. }))
            .count()
    }
}

/// Tokenize template source
pub fn tokenize(input: &str) -> TokenizeResult {
    log_debug!("Starting lexical analysis", "bytes" => input.len());

    let LexicalOutput { tokens, errors } = LexicalAnalyzer::new(input).tokenize();

    for error in &errors {
        let (line, column) = error.location();
        log_debug!("Lexical error",
            "code" => error.error_code(),
            "message" => error,
            "line" => line,
            "column" => column
        );
    }

    let result = TokenizeResult {
        errors: errors.iter().map(LexerError::to_diagnostic).collect(),
        tokens,
    };

    log_success!(
        codes::success::TOKENIZATION_COMPLETE,
        "Lexical analysis completed",
        "tokens" => result.tokens.len(),
        "variables" => result.variable_count(),
        "tags" => result.tag_count(),
        "errors" => result.errors.len()
    );

    result
}
