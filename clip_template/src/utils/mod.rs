//! Shared primitive types for the template tokenizer, parser and validator.

pub mod diagnostic;
pub mod position;

pub use diagnostic::{Diagnostic, DiagnosticLevel};
pub use position::Position;
