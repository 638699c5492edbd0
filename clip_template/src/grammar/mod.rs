//! Grammar definitions for the template language: keywords and the AST

pub mod ast;
pub mod keywords;

pub use ast::nodes::*;
pub use keywords::{is_keyword, keyword_name, lookup_keyword};
