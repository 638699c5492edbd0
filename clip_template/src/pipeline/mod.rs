//! Template checking pipeline: source -> tokens -> AST -> variable validation

mod error;
pub mod output;

pub use error::PipelineError;
pub use output::{format_human, format_json, CheckSummary};

use crate::config::runtime::ValidationPreferences;
use crate::file_processor::{ClipperTemplate, FileProcessor, SourceKind};
use crate::grammar::ast::count_statements;
use crate::logging::{self, codes};
use crate::tokens::TokenKind;
use crate::utils::Diagnostic;
use crate::{lexical, log_info, log_success, syntax, validation};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// What [`check_template_with`] runs after parsing
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Run the variable validator
    pub validate: bool,
    pub validation: ValidationPreferences,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            validate: true,
            validation: ValidationPreferences::default(),
        }
    }
}

/// Diagnostics for one template string
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateReport {
    /// Clipper template field the source came from; `None` for plain template files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub token_count: usize,
    pub node_count: usize,
    /// Tokenizer errors first, then parser errors
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl TemplateReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter().chain(self.warnings.iter())
    }
}

/// Diagnostics for every template held by one file
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub path: PathBuf,
    pub templates: Vec<TemplateReport>,
    pub duration_ms: f64,
}

impl FileReport {
    pub fn has_errors(&self) -> bool {
        self.templates.iter().any(TemplateReport::has_errors)
    }

    pub fn error_count(&self) -> usize {
        self.templates.iter().map(|t| t.errors.len()).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.templates.iter().map(|t| t.warnings.len()).sum()
    }
}

/// Tokenize, parse and validate one template with default options
pub fn check_template(source: &str) -> TemplateReport {
    check_template_with(source, &CheckOptions::default())
}

/// Tokenize, parse and optionally validate one template
pub fn check_template_with(source: &str, options: &CheckOptions) -> TemplateReport {
    let tokenized = lexical::tokenize(source);
    let token_count = tokenized
        .tokens
        .iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .count();

    let parsed = syntax::parse_tokens(tokenized.tokens);

    let mut errors = tokenized.errors;
    errors.extend(parsed.errors);

    let warnings = if options.validate {
        validation::validate_variables_with(&parsed.ast, &options.validation)
    } else {
        Vec::new()
    };

    let report = TemplateReport {
        field: None,
        token_count,
        node_count: count_statements(&parsed.ast),
        errors,
        warnings,
    };

    log_success!(
        codes::success::TEMPLATE_CHECK_COMPLETE,
        "Template check completed",
        "tokens" => report.token_count,
        "statements" => report.node_count,
        "errors" => report.errors.len(),
        "warnings" => report.warnings.len()
    );

    report
}

/// Check every template field of a clipper template; property names count as known variables
pub fn check_clipper_template(template: &ClipperTemplate, options: &CheckOptions) -> Vec<TemplateReport> {
    let mut field_options = options.clone();
    field_options.validation = field_options
        .validation
        .with_known_variables(template.property_names());

    template
        .template_fields()
        .into_iter()
        .map(|field| {
            let mut report = check_template_with(&field.source, &field_options);
            report.field = Some(field.field);
            report
        })
        .collect()
}

/// Load a file and check every template it holds
pub fn check_file(
    file_path: &Path,
    processor: &FileProcessor,
    options: &CheckOptions,
) -> Result<FileReport, PipelineError> {
    let start_time = Instant::now();

    logging::with_file_context(file_path, || {
        log_info!("Checking template file", "file" => file_path.display());

        let file_result = processor.process_file(file_path)?;

        let templates = match file_result.metadata.kind {
            SourceKind::Template => vec![check_template_with(&file_result.source, options)],
            SourceKind::ClipperJson => {
                let template =
                    ClipperTemplate::from_json(&file_result.source, &file_result.metadata.path)?;
                check_clipper_template(&template, options)
            }
        };

        Ok(FileReport {
            path: file_path.to_path_buf(),
            templates,
            duration_ms: start_time.elapsed().as_secs_f64() * 1000.0,
        })
    })
}
