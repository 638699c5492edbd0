//! Validation warnings

use crate::logging::{codes, Code};
use crate::utils::Diagnostic;

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(". Did you mean \"{}\"?", name),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Unknown variable \"{name}\"{}", suggestion_suffix(.suggestion))]
    UnknownVariable {
        name: String,
        suggestion: Option<String>,
        line: u32,
        column: u32,
    },
}

impl ValidationError {
    pub fn error_code(&self) -> Code {
        match self {
            ValidationError::UnknownVariable { .. } => codes::validation::UNKNOWN_VARIABLE,
        }
    }

    /// Validation findings are advisory and always warnings
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ValidationError::UnknownVariable { line, column, .. } => {
                Diagnostic::warning(self.error_code(), self.to_string(), *line, *column)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_with_and_without_suggestion() {
        let error = ValidationError::UnknownVariable {
            name: "titel".to_string(),
            suggestion: Some("title".to_string()),
            line: 1,
            column: 3,
        };
        assert_eq!(
            error.to_string(),
            "Unknown variable \"titel\". Did you mean \"title\"?"
        );
        assert!(error.to_diagnostic().is_warning());

        let error = ValidationError::UnknownVariable {
            name: "zzz".to_string(),
            suggestion: None,
            line: 1,
            column: 3,
        };
        assert_eq!(error.to_string(), "Unknown variable \"zzz\"");
    }
}
