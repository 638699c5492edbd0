//! Variable validation
//!
//! A static pass over the AST that flags references to variables the clipper
//! will not know about. Each reference is checked against the names in scope
//! where it appears, not at the end of the template, so a later `set` never
//! makes an earlier use valid. Findings are warnings only.

pub mod error;
pub mod scope;
pub mod suggestions;

pub use error::ValidationError;
pub use scope::{ReferenceCollector, Scope, ScopedReference};

use crate::config::compile_time::validation::MAX_REPORTED_UNKNOWN_VARIABLES;
use crate::config::ValidationPreferences;
use crate::grammar::ast::Node;
use crate::logging::codes;
use crate::utils::Diagnostic;
use crate::{log_debug, log_success};
use std::collections::HashSet;

/// Variables the clipper always provides
pub const PRESET_VARIABLES: &[&str] = &[
    "author",
    "content",
    "contentHtml",
    "date",
    "description",
    "domain",
    "favicon",
    "fullHtml",
    "highlights",
    "image",
    "published",
    "selection",
    "selectionHtml",
    "site",
    "title",
    "time",
    "url",
    "words",
];

/// Prefixes resolved dynamically at render time and never validated
pub const SPECIAL_PREFIXES: &[&str] = &["schema:", "selector:", "selectorHtml:", "meta:"];

/// Name before the first `.`: `author.name` -> `author`
pub fn base_name(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

pub fn is_preset_variable(name: &str) -> bool {
    PRESET_VARIABLES.contains(&name)
}

pub fn has_special_prefix(name: &str) -> bool {
    SPECIAL_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// Scope-aware unknown-variable checker
#[derive(Debug, Clone)]
pub struct VariableValidator {
    known_variables: HashSet<String>,
    suggest_corrections: bool,
    check_filter_arguments: bool,
}

impl Default for VariableValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableValidator {
    /// Presets only, with suggestions, filter arguments not checked
    pub fn new() -> Self {
        Self {
            known_variables: HashSet::new(),
            suggest_corrections: true,
            check_filter_arguments: false,
        }
    }

    pub fn from_preferences(preferences: &ValidationPreferences) -> Self {
        Self {
            known_variables: preferences.known_variables.iter().cloned().collect(),
            suggest_corrections: preferences.suggest_corrections,
            check_filter_arguments: preferences.check_filter_arguments,
        }
    }

    pub fn is_valid(&self, reference: &ScopedReference) -> bool {
        let name = reference.name.as_str();
        let base = base_name(name);

        name.starts_with('"')
            || has_special_prefix(name)
            || is_preset_variable(name)
            || is_preset_variable(base)
            || base == "loop"
            || reference.scope.contains(base)
            || reference.scope.contains(name)
            || self.known_variables.contains(name)
            || self.known_variables.contains(base)
    }

    /// Walk the AST and report unknown references in document order
    pub fn validate(&self, ast: &[Node]) -> Vec<ValidationError> {
        let references = ReferenceCollector::new(self.check_filter_arguments).collect(ast);
        let total = references.len();

        let errors: Vec<ValidationError> = references
            .into_iter()
            .filter(|reference| !self.is_valid(reference))
            .take(MAX_REPORTED_UNKNOWN_VARIABLES)
            .map(|reference| {
                let suggestion = if self.suggest_corrections {
                    suggestions::suggest(&reference.name, PRESET_VARIABLES.iter().copied())
                        .map(str::to_string)
                } else {
                    None
                };
                ValidationError::UnknownVariable {
                    name: reference.name,
                    suggestion,
                    line: reference.line,
                    column: reference.column,
                }
            })
            .collect();

        log_debug!("Variable references checked",
            "references" => total,
            "unknown" => errors.len()
        );

        errors
    }
}

/// Validate against the preset variables only
pub fn validate_variables(ast: &[Node]) -> Vec<Diagnostic> {
    run(&VariableValidator::new(), ast)
}

/// Validate with extra known names and the given suggestion settings
pub fn validate_variables_with(ast: &[Node], preferences: &ValidationPreferences) -> Vec<Diagnostic> {
    run(&VariableValidator::from_preferences(preferences), ast)
}

fn run(validator: &VariableValidator, ast: &[Node]) -> Vec<Diagnostic> {
    let warnings: Vec<Diagnostic> = validator
        .validate(ast)
        .iter()
        .map(ValidationError::to_diagnostic)
        .collect();

    log_success!(
        codes::success::VARIABLE_VALIDATION_COMPLETE,
        "Variable validation completed",
        "warnings" => warnings.len()
    );

    warnings
}
