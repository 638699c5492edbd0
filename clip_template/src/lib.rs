//! Tokenizer, parser and variable validator for web clipper templates
//!
//! Templates mix literal text with `{{ expression|filter }}` variables and
//! `{% if %}` / `{% for %}` / `{% set %}` tags. Every stage is error tolerant:
//! it returns a best-effort result together with positioned diagnostics.

pub mod batch;
pub mod config;
pub mod file_processor;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod syntax;
pub mod tokens;
pub mod utils;
pub mod validation;

// Re-export key types for library consumers
pub use grammar::ast::{Expression, Node};
pub use lexical::{tokenize, TokenizeResult};
pub use pipeline::{check_template, TemplateReport};
pub use syntax::{parse, parse_tokens, ParseResult};
pub use tokens::{Token, TokenKind};
pub use utils::Diagnostic;
pub use validation::{validate_variables, validate_variables_with};
