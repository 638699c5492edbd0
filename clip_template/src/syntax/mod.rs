//! Syntax analysis: token stream to AST
//!
//! The parser never fails. It returns whatever statements it could build plus
//! every error it met on the way, so editors can show inline diagnostics while
//! still rendering the rest of the template.

mod error;
mod expressions;
pub mod parser;

pub use error::SyntaxError;
pub use parser::{Parser, ParserOutput};

use crate::grammar::ast::{count_statements, Node};
use crate::lexical;
use crate::logging::codes;
use crate::tokens::Token;
use crate::utils::Diagnostic;
use crate::{log_debug, log_success};
use serde::Serialize;

/// Result of [`parse`] and [`parse_tokens`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseResult {
    pub ast: Vec<Node>,
    pub errors: Vec<Diagnostic>,
}

impl ParseResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Total statement count, nested bodies included
    pub fn node_count(&self) -> usize {
        count_statements(&self.ast)
    }
}

/// Tokenize and parse template source; tokenizer errors come first
pub fn parse(input: &str) -> ParseResult {
    let tokenized = lexical::tokenize(input);
    let mut result = parse_tokens(tokenized.tokens);

    let mut errors = tokenized.errors;
    errors.append(&mut result.errors);
    result.errors = errors;
    result
}

/// Parse an existing token stream
pub fn parse_tokens(tokens: Vec<Token>) -> ParseResult {
    log_debug!("Starting syntax analysis", "tokens" => tokens.len());

    let ParserOutput { ast, errors } = Parser::new(tokens).parse();

    for error in &errors {
        let (line, column) = error.location();
        log_debug!("Syntax error",
            "code" => error.error_code(),
            "message" => error,
            "line" => line,
            "column" => column
        );
    }

    let result = ParseResult {
        ast,
        errors: errors.iter().map(SyntaxError::to_diagnostic).collect(),
    };

    log_success!(
        codes::success::AST_CONSTRUCTION_COMPLETE,
        "Syntax analysis completed",
        "statements" => result.node_count(),
        "errors" => result.errors.len()
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::ast::Expression;
    use assert_matches::assert_matches;

    #[test]
    fn test_hello_world() {
        let result = parse("Hello, world!");
        assert!(!result.has_errors());
        assert_eq!(result.node_count(), 1);
    }

    #[test]
    fn test_tokenizer_errors_come_first() {
        let result = parse("{{ \u{201C}a\u{201D} }}{% endif %}");
        let codes: Vec<&str> = result.errors.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes.first(), Some(&"E020"));
        assert_eq!(codes.last(), Some(&"E051"));
    }

    #[test]
    fn test_curly_quotes_report_two_unexpected_characters() {
        let result = lexical::tokenize("{{ \u{201C}curly quotes\u{201D} }}");
        assert_eq!(result.errors.len(), 2);
        assert!(result
            .errors
            .iter()
            .all(|e| e.message.starts_with("Unexpected character")));
    }

    #[test]
    fn test_selector_expression() {
        let result = parse(r#"{{selector:div[data-type="content"][class*="highlight"]}}"#);
        assert!(!result.has_errors(), "{:?}", result.errors);
        assert_matches!(result.ast.as_slice(), [Node::Variable(node)] => {
            assert_matches!(&node.expression, Expression::Identifier(id) => {
                assert_eq!(id.name, r#"selector:div[data-type="content"][class*="highlight"]"#);
            });
        });
    }

    #[test]
    fn test_unclosed_string_keeps_later_variables() {
        let result = parse("{{ \"abc }} tail {{ title }}");
        let codes: Vec<&str> = result.errors.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["E021"]);
        assert_matches!(result.ast.as_slice(), [Node::Variable(_), Node::Text(text), Node::Variable(node)] => {
            assert_eq!(text.value, " tail ");
            assert_matches!(&node.expression, Expression::Identifier(id) => {
                assert_eq!(id.name, "title");
            });
        });
    }

    #[test]
    fn test_unterminated_inputs_return_errors() {
        for input in ["{{ title", "{% if x", "{% set x = \"unterminated %}", "{{ \"open }}"] {
            let result = parse(input);
            assert!(result.has_errors(), "expected errors for {:?}", input);
        }
    }

    #[test]
    fn test_ast_json_shape() {
        let result = parse("{% if count > 0 %}positive{% endif %}");
        let json = serde_json::to_value(&result).unwrap();
        let node = &json["ast"][0];
        assert_eq!(node["type"], "if");
        assert_eq!(node["condition"]["type"], "binary");
        assert_eq!(node["condition"]["operator"], ">");
        assert_eq!(node["consequent"][0]["type"], "text");
        assert_eq!(node["consequent"][0]["value"], "positive");
        assert_eq!(node["elseifs"], serde_json::json!([]));
        assert!(node["alternate"].is_null());
        assert_eq!(node["trimRight"], true);
    }

    #[test]
    fn test_reparse_produces_equal_ast() {
        let input = "{% for a in items %}{{ a|upper }}{% endfor %}";
        assert_eq!(parse(input).ast, parse(input).ast);
    }
}
