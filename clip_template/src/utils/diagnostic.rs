//! The serializable `{message, line, column}` diagnostic shape shared by every stage.

use crate::logging::Code;
use crate::utils::Position;
use serde::Serialize;
use std::fmt;

/// Whether a diagnostic should block rendering or is advisory only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

impl DiagnosticLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticLevel::Error => "error",
            DiagnosticLevel::Warning => "warning",
        }
    }
}

/// A positioned message produced by the tokenizer, parser or validator.
///
/// Diagnostics are accumulated rather than returned as `Err`, so a caller
/// always receives a best-effort token stream or AST alongside them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub line: u32,
    pub column: u32,
    pub code: Code,
    pub level: DiagnosticLevel,
}

impl Diagnostic {
    pub fn error(code: Code, message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            line,
            column,
            code,
            level: DiagnosticLevel::Error,
        }
    }

    pub fn warning(code: Code, message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            line,
            column,
            code,
            level: DiagnosticLevel::Warning,
        }
    }

    pub fn at(code: Code, message: impl Into<String>, position: Position) -> Self {
        Self::error(code, message, position.line, position.column)
    }

    pub fn is_error(&self) -> bool {
        self.level == DiagnosticLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == DiagnosticLevel::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}[{}]: {}",
            self.line,
            self.column,
            self.level.as_str(),
            self.code,
            self.message
        )
    }
}
