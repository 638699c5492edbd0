//! Consolidated error codes and classification system
//!
//! Single source of truth for all diagnostic and log codes and their metadata.

use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for error, warning and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Code {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
    pub const INVALID_TEMPLATE_FILE: Code = Code::new("E014");
}

/// Configuration error codes
pub mod config {
    use super::Code;

    pub const INVALID_CONFIGURATION: Code = Code::new("E013");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const UNEXPECTED_CHARACTER: Code = Code::new("E020");
    pub const UNCLOSED_STRING: Code = Code::new("E021");
    pub const MALFORMED_VARIABLE_END: Code = Code::new("E022");
    pub const MALFORMED_TAG_END: Code = Code::new("E023");
    pub const UNCLOSED_VARIABLE: Code = Code::new("E024");
    pub const UNCLOSED_TAG: Code = Code::new("E025");
    pub const UNCLOSED_SELECTOR_BRACKET: Code = Code::new("E026");
    pub const UNCLOSED_SELECTOR_PAREN: Code = Code::new("E027");
    pub const UNCLOSED_SELECTOR_QUOTE: Code = Code::new("E028");
    pub const UNMATCHED_SELECTOR_BRACKET: Code = Code::new("E029");
    pub const UNMATCHED_SELECTOR_PAREN: Code = Code::new("E030");
    pub const TOO_MANY_TOKENS: Code = Code::new("E031");
}

/// Syntax analysis error codes
pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E040");
    pub const MISSING_CLOSING_DELIMITER: Code = Code::new("E041");
    pub const MISSING_CONDITION: Code = Code::new("E042");
    pub const MISSING_ENDIF: Code = Code::new("E043");
    pub const MISSING_ENDFOR: Code = Code::new("E044");
    pub const MISSING_ITERATOR: Code = Code::new("E045");
    pub const MISSING_IN: Code = Code::new("E046");
    pub const MISSING_ITERABLE: Code = Code::new("E047");
    pub const MISSING_SET_NAME: Code = Code::new("E048");
    pub const MISSING_SET_ASSIGN: Code = Code::new("E049");
    pub const MISSING_SET_VALUE: Code = Code::new("E050");
    pub const UNMATCHED_CLOSING_TAG: Code = Code::new("E051");
    pub const UNKNOWN_TAG: Code = Code::new("E052");
    pub const EMPTY_BLOCK: Code = Code::new("E053");
    pub const AMBIGUOUS_PROMPT: Code = Code::new("E054");
    pub const MAX_NESTING_DEPTH: Code = Code::new("E055");
}

/// Variable validation warning codes
pub mod validation {
    use super::Code;

    pub const UNKNOWN_VARIABLE: Code = Code::new("W100");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const FILE_DISCOVERY_COMPLETE: Code = Code::new("I007");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const AST_CONSTRUCTION_COMPLETE: Code = Code::new("I040");
    pub const VARIABLE_VALIDATION_COMPLETE: Code = Code::new("I100");
    pub const TEMPLATE_CHECK_COMPLETE: Code = Code::new("I110");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

const METADATA: &[ErrorMetadata] = &[
    ErrorMetadata::new(
        "ERR001",
        "System",
        Severity::Critical,
        "Critical internal error",
        "File a bug report with the template that triggered it",
    ),
    ErrorMetadata::new(
        "ERR002",
        "System",
        Severity::Critical,
        "Logging or configuration initialization failure",
        "Check CLIP_TEMPLATE_* environment variables and the configuration file",
    ),
    // File processing
    ErrorMetadata::new(
        "E005",
        "FileProcessing",
        Severity::Medium,
        "Template file not found",
        "Verify the path exists",
    ),
    ErrorMetadata::new(
        "E006",
        "FileProcessing",
        Severity::Low,
        "File extension is not a recognized template extension",
        "Use .template, .tmpl or .json, or disable the extension requirement",
    ),
    ErrorMetadata::new(
        "E007",
        "FileProcessing",
        Severity::Medium,
        "File exceeds the maximum template size",
        "Split the template or raise the size limit",
    ),
    ErrorMetadata::new(
        "E009",
        "FileProcessing",
        Severity::Medium,
        "Permission denied reading file",
        "Check file permissions",
    ),
    ErrorMetadata::new(
        "E010",
        "FileProcessing",
        Severity::Medium,
        "File is not valid UTF-8",
        "Re-save the template as UTF-8",
    ),
    ErrorMetadata::new(
        "E011",
        "FileProcessing",
        Severity::Medium,
        "I/O error while reading file",
        "Retry or check the file system",
    ),
    ErrorMetadata::new(
        "E012",
        "FileProcessing",
        Severity::Medium,
        "Invalid file path",
        "Provide a path to a regular file",
    ),
    ErrorMetadata::new(
        "E013",
        "Configuration",
        Severity::High,
        "Invalid runtime configuration",
        "Fix the TOML configuration file",
    ),
    ErrorMetadata::new(
        "E014",
        "FileProcessing",
        Severity::Medium,
        "Clipper template JSON could not be read",
        "Re-export the template from the extension settings",
    ),
    // Lexical
    ErrorMetadata::new(
        "E020",
        "Lexical",
        Severity::Medium,
        "Character not valid inside a variable or tag",
        "Remove the character or quote it inside a string",
    ),
    ErrorMetadata::new(
        "E021",
        "Lexical",
        Severity::Medium,
        "String literal was never closed",
        "Add the matching closing quote",
    ),
    ErrorMetadata::new(
        "E022",
        "Lexical",
        Severity::Medium,
        "Variable closed with a single '}'",
        "Close variables with '}}'",
    ),
    ErrorMetadata::new(
        "E023",
        "Lexical",
        Severity::Medium,
        "Tag closed with '}' instead of '%}'",
        "Close tags with '%}'",
    ),
    ErrorMetadata::new(
        "E024",
        "Lexical",
        Severity::Medium,
        "Variable was never closed",
        "Add '}}' before the next variable or tag",
    ),
    ErrorMetadata::new(
        "E025",
        "Lexical",
        Severity::Medium,
        "Tag was never closed",
        "Add '%}' before the next variable or tag",
    ),
    ErrorMetadata::new(
        "E026",
        "Lexical",
        Severity::Medium,
        "Unclosed '[' in CSS selector",
        "Balance the attribute selector brackets",
    ),
    ErrorMetadata::new(
        "E027",
        "Lexical",
        Severity::Medium,
        "Unclosed '(' in CSS selector",
        "Balance the pseudo-class parentheses",
    ),
    ErrorMetadata::new(
        "E028",
        "Lexical",
        Severity::Medium,
        "Unclosed quote in CSS selector",
        "Close the quoted attribute value",
    ),
    ErrorMetadata::new(
        "E029",
        "Lexical",
        Severity::Medium,
        "Unmatched ']' in CSS selector",
        "Remove the extra bracket",
    ),
    ErrorMetadata::new(
        "E030",
        "Lexical",
        Severity::Medium,
        "Unmatched ')' in CSS selector",
        "Remove the extra parenthesis",
    ),
    ErrorMetadata::new(
        "E031",
        "Lexical",
        Severity::High,
        "Template produced more tokens than the configured limit",
        "Split the template",
    ),
    // Syntax
    ErrorMetadata::new(
        "E040",
        "Syntax",
        Severity::Medium,
        "Unexpected token",
        "Check the expression syntax",
    ),
    ErrorMetadata::new(
        "E041",
        "Syntax",
        Severity::Medium,
        "Variable or tag is missing its closing delimiter",
        "Close variables with '}}' and tags with '%}'",
    ),
    ErrorMetadata::new(
        "E042",
        "Syntax",
        Severity::Medium,
        "Conditional tag has no condition",
        "Add a condition after 'if' or 'elseif'",
    ),
    ErrorMetadata::new(
        "E043",
        "Syntax",
        Severity::Medium,
        "Missing {% endif %}",
        "Close the if block with {% endif %}",
    ),
    ErrorMetadata::new(
        "E044",
        "Syntax",
        Severity::Medium,
        "Missing {% endfor %}",
        "Close the for block with {% endfor %}",
    ),
    ErrorMetadata::new(
        "E045",
        "Syntax",
        Severity::Medium,
        "Loop variable name missing after 'for'",
        "Write {% for item in items %}",
    ),
    ErrorMetadata::new(
        "E046",
        "Syntax",
        Severity::Medium,
        "Missing 'in' keyword in for loop",
        "Write {% for item in items %}",
    ),
    ErrorMetadata::new(
        "E047",
        "Syntax",
        Severity::Medium,
        "Missing iterable after 'in'",
        "Name the list to loop over",
    ),
    ErrorMetadata::new(
        "E048",
        "Syntax",
        Severity::Medium,
        "Variable name missing after 'set'",
        "Write {% set name = value %}",
    ),
    ErrorMetadata::new(
        "E049",
        "Syntax",
        Severity::Medium,
        "Missing '=' in set tag",
        "Write {% set name = value %}",
    ),
    ErrorMetadata::new(
        "E050",
        "Syntax",
        Severity::Medium,
        "Missing value in set tag",
        "Write {% set name = value %}",
    ),
    ErrorMetadata::new(
        "E051",
        "Syntax",
        Severity::Medium,
        "Closing tag without a matching opening tag",
        "Remove the tag or add the opening tag",
    ),
    ErrorMetadata::new(
        "E052",
        "Syntax",
        Severity::Medium,
        "Unknown tag keyword",
        "Use if, for or set",
    ),
    ErrorMetadata::new(
        "E053",
        "Syntax",
        Severity::Low,
        "Empty variable or tag",
        "Remove the empty delimiters",
    ),
    ErrorMetadata::new(
        "E054",
        "Syntax",
        Severity::Medium,
        "Several bare words inside a variable",
        "Quote prompts: {{\"your prompt here\"}}",
    ),
    ErrorMetadata::new(
        "E055",
        "Syntax",
        Severity::High,
        "Expression or block nested too deeply",
        "Reduce nesting",
    ),
    // Validation
    ErrorMetadata::new(
        "W100",
        "Validation",
        Severity::Low,
        "Variable is not a preset variable and is not defined in scope",
        "Check the spelling or define it with {% set %}",
    ),
];

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, &'static ErrorMetadata>> = OnceLock::new();

/// Initialize and get the error registry
fn get_error_registry() -> &'static HashMap<&'static str, &'static ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| METADATA.iter().map(|meta| (meta.code, meta)).collect())
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code).copied()
}

/// Get error severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
