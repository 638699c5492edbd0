//! AST node definitions for the template language
//!
//! Statements (`Node`) and expressions (`Expression`) are tagged unions that
//! serialize with a `type` field (`text`, `variable`, `if`, `filter`, ...) and
//! camelCase member names, which is the shape editor tooling and the runtime
//! evaluator consume. Every node records the line/column of the token that
//! opened it.

use serde::Serialize;
use std::fmt;

// === STATEMENTS ===

/// A top-level or body statement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Text(TextNode),
    Variable(VariableNode),
    If(IfNode),
    For(ForNode),
    Set(SetNode),
}

/// Literal passthrough text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextNode {
    pub value: String,
    pub line: u32,
    pub column: u32,
}

/// One `{{ ... }}` interpolation site
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableNode {
    pub expression: Expression,
    pub trim_left: bool,
    pub trim_right: bool,
    pub line: u32,
    pub column: u32,
}

/// `{% if %}` with its ordered `elseif` branches and optional `else`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IfNode {
    pub condition: Expression,
    pub consequent: Vec<Node>,
    pub elseifs: Vec<ElseIfBranch>,
    /// `None` when no `else` appeared; `Some(vec![])` for an empty `else`
    pub alternate: Option<Vec<Node>>,
    pub trim_left: bool,
    pub trim_right: bool,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElseIfBranch {
    pub condition: Expression,
    pub body: Vec<Node>,
}

/// `{% for iterator in iterable %}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForNode {
    pub iterator: String,
    pub iterable: Expression,
    pub body: Vec<Node>,
    pub trim_left: bool,
    pub trim_right: bool,
    pub line: u32,
    pub column: u32,
}

/// `{% set variable = value %}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetNode {
    pub variable: String,
    pub value: Expression,
    pub trim_left: bool,
    pub trim_right: bool,
    pub line: u32,
    pub column: u32,
}

impl Node {
    /// The `type` tag this node serializes with
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Text(_) => "text",
            Node::Variable(_) => "variable",
            Node::If(_) => "if",
            Node::For(_) => "for",
            Node::Set(_) => "set",
        }
    }

    pub fn line(&self) -> u32 {
        match self {
            Node::Text(n) => n.line,
            Node::Variable(n) => n.line,
            Node::If(n) => n.line,
            Node::For(n) => n.line,
            Node::Set(n) => n.line,
        }
    }

    pub fn column(&self) -> u32 {
        match self {
            Node::Text(n) => n.column,
            Node::Variable(n) => n.column,
            Node::If(n) => n.column,
            Node::For(n) => n.column,
            Node::Set(n) => n.column,
        }
    }

    /// Number of statement nodes in this subtree, including this one
    pub fn statement_count(&self) -> usize {
        1 + match self {
            Node::If(n) => {
                count_statements(&n.consequent)
                    + n.elseifs
                        .iter()
                        .map(|b| count_statements(&b.body))
                        .sum::<usize>()
                    + n.alternate.as_deref().map(count_statements).unwrap_or(0)
            }
            Node::For(n) => count_statements(&n.body),
            _ => 0,
        }
    }
}

/// Total statement count over a node list
pub fn count_statements(nodes: &[Node]) -> usize {
    nodes.iter().map(Node::statement_count).sum()
}

// === EXPRESSIONS ===

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Expression {
    Literal(LiteralExpression),
    Identifier(IdentifierExpression),
    Binary(BinaryExpression),
    Unary(UnaryExpression),
    Filter(FilterExpression),
    Group(GroupExpression),
    Member(MemberExpression),
}

/// Literal value carried by a `LiteralExpression`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiteralExpression {
    pub value: LiteralValue,
    /// Source spelling (strings keep their surrounding quotes)
    pub raw: String,
    pub line: u32,
    pub column: u32,
}

/// A variable reference; dotted paths and special prefixes are folded into `name`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentifierExpression {
    pub name: String,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryExpression {
    pub operator: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnaryExpression {
    pub operator: UnaryOperator,
    pub argument: Box<Expression>,
    pub line: u32,
    pub column: u32,
}

/// `value|name:args`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterExpression {
    pub value: Box<Expression>,
    pub name: String,
    pub args: Vec<Expression>,
    pub line: u32,
    pub column: u32,
}

/// Explicit parenthesization, kept as its own node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupExpression {
    pub expression: Box<Expression>,
    pub line: u32,
    pub column: u32,
}

/// Bracket indexing `object[property]`; always computed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberExpression {
    pub object: Box<Expression>,
    pub property: Box<Expression>,
    pub computed: bool,
    pub line: u32,
    pub column: u32,
}

impl Expression {
    pub fn identifier(name: impl Into<String>, line: u32, column: u32) -> Self {
        Expression::Identifier(IdentifierExpression {
            name: name.into(),
            line,
            column,
        })
    }

    /// String literal whose `raw` form is the quoted value
    pub fn string(value: impl Into<String>, line: u32, column: u32) -> Self {
        let value = value.into();
        Expression::Literal(LiteralExpression {
            raw: quote(&value),
            value: LiteralValue::String(value),
            line,
            column,
        })
    }

    pub fn literal(value: LiteralValue, raw: impl Into<String>, line: u32, column: u32) -> Self {
        Expression::Literal(LiteralExpression {
            value,
            raw: raw.into(),
            line,
            column,
        })
    }

    /// The `type` tag this expression serializes with
    pub fn type_name(&self) -> &'static str {
        match self {
            Expression::Literal(_) => "literal",
            Expression::Identifier(_) => "identifier",
            Expression::Binary(_) => "binary",
            Expression::Unary(_) => "unary",
            Expression::Filter(_) => "filter",
            Expression::Group(_) => "group",
            Expression::Member(_) => "member",
        }
    }

    pub fn line(&self) -> u32 {
        match self {
            Expression::Literal(e) => e.line,
            Expression::Identifier(e) => e.line,
            Expression::Binary(e) => e.line,
            Expression::Unary(e) => e.line,
            Expression::Filter(e) => e.line,
            Expression::Group(e) => e.line,
            Expression::Member(e) => e.line,
        }
    }

    pub fn column(&self) -> u32 {
        match self {
            Expression::Literal(e) => e.column,
            Expression::Identifier(e) => e.column,
            Expression::Binary(e) => e.column,
            Expression::Unary(e) => e.column,
            Expression::Filter(e) => e.column,
            Expression::Group(e) => e.column,
            Expression::Member(e) => e.column,
        }
    }

    /// Name of a bare identifier expression
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expression::Identifier(e) => Some(&e.name),
            _ => None,
        }
    }
}

/// Double-quote a string, escaping backslashes and embedded quotes
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

// === OPERATORS ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOperator {
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = "<=")]
    LessThanOrEqual,
    #[serde(rename = "and")]
    And,
    #[serde(rename = "or")]
    Or,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "??")]
    Nullish,
}

impl BinaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThanOrEqual => "<=",
            Self::And => "and",
            Self::Or => "or",
            Self::Contains => "contains",
            Self::Nullish => "??",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOperator {
    #[serde(rename = "not")]
    Not,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Node {
        Node::Text(TextNode {
            value: value.to_string(),
            line: 1,
            column: 1,
        })
    }

    #[test]
    fn test_text_node_shape() {
        let json = serde_json::to_value(text("Hello")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "text", "value": "Hello", "line": 1, "column": 1})
        );
    }

    #[test]
    fn test_if_node_shape() {
        let node = Node::If(IfNode {
            condition: Expression::identifier("x", 1, 7),
            consequent: vec![text("yes")],
            elseifs: Vec::new(),
            alternate: None,
            trim_left: false,
            trim_right: true,
            line: 1,
            column: 1,
        });
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["type"], "if");
        assert_eq!(json["condition"]["type"], "identifier");
        assert_eq!(json["condition"]["name"], "x");
        assert!(json["alternate"].is_null());
        assert_eq!(json["elseifs"], serde_json::json!([]));
        assert_eq!(json["trimRight"], true);
    }

    #[test]
    fn test_binary_operator_spelling() {
        let expr = Expression::Binary(BinaryExpression {
            operator: BinaryOperator::GreaterThanOrEqual,
            left: Box::new(Expression::identifier("a", 1, 1)),
            right: Box::new(Expression::literal(LiteralValue::Number(1.0), "1", 1, 6)),
            line: 1,
            column: 3,
        });
        let json = serde_json::to_value(&expr).unwrap();

        assert_eq!(json["type"], "binary");
        assert_eq!(json["operator"], ">=");
        assert_eq!(json["right"]["value"], 1.0);
        assert_eq!(json["right"]["raw"], "1");
    }

    #[test]
    fn test_literal_values() {
        let null = Expression::literal(LiteralValue::Null, "null", 1, 1);
        assert!(serde_json::to_value(&null).unwrap()["value"].is_null());

        let s = Expression::string("a\"b", 1, 1);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["value"], "a\"b");
        assert_eq!(json["raw"], "\"a\\\"b\"");
    }

    #[test]
    fn test_statement_count() {
        let node = Node::If(IfNode {
            condition: Expression::identifier("x", 1, 1),
            consequent: vec![text("a"), text("b")],
            elseifs: vec![ElseIfBranch {
                condition: Expression::identifier("y", 1, 1),
                body: vec![text("c")],
            }],
            alternate: Some(vec![text("d")]),
            trim_left: false,
            trim_right: true,
            line: 1,
            column: 1,
        });
        assert_eq!(node.statement_count(), 5);
        assert_eq!(count_statements(&[node, text("e")]), 6);
    }
}
