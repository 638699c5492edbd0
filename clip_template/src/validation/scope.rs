//! Scope tracking for the variable validator
//!
//! A `Scope` is a copy-on-write name set: taking a snapshot for a reference
//! is a reference-count bump, and the set is only copied when a `set` or a
//! loop defines a name after a snapshot was taken.

use crate::grammar::ast::{Expression, Node};
use std::collections::HashSet;
use std::rc::Rc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope(Rc<HashSet<String>>);

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: impl Into<String>) {
        Rc::make_mut(&mut self.0).insert(name.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An identifier reference with the names defined at its point of use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedReference {
    pub name: String,
    pub line: u32,
    pub column: u32,
    pub scope: Scope,
}

/// Walks the AST in document order collecting identifier references
#[derive(Debug, Default)]
pub struct ReferenceCollector {
    references: Vec<ScopedReference>,
    include_filter_arguments: bool,
}

impl ReferenceCollector {
    pub fn new(include_filter_arguments: bool) -> Self {
        Self {
            references: Vec::new(),
            include_filter_arguments,
        }
    }

    pub fn collect(mut self, ast: &[Node]) -> Vec<ScopedReference> {
        let mut scope = Scope::new();
        self.walk_nodes(ast, &mut scope);
        self.references
    }

    fn walk_nodes(&mut self, nodes: &[Node], scope: &mut Scope) {
        for node in nodes {
            self.walk_node(node, scope);
        }
    }

    fn walk_node(&mut self, node: &Node, scope: &mut Scope) {
        match node {
            Node::Text(_) => {}
            Node::Variable(variable) => self.walk_expression(&variable.expression, scope),
            Node::If(node) => {
                self.walk_expression(&node.condition, scope);
                self.walk_nodes(&node.consequent, scope);
                for branch in &node.elseifs {
                    self.walk_expression(&branch.condition, scope);
                    self.walk_nodes(&branch.body, scope);
                }
                if let Some(alternate) = &node.alternate {
                    self.walk_nodes(alternate, scope);
                }
            }
            Node::For(node) => {
                self.walk_expression(&node.iterable, scope);
                // Loop names live in a copy that is dropped after the body
                let mut body_scope = scope.clone();
                if !node.iterator.is_empty() {
                    body_scope.define(node.iterator.as_str());
                    body_scope.define(format!("{}_index", node.iterator));
                }
                self.walk_nodes(&node.body, &mut body_scope);
            }
            Node::Set(node) => {
                self.walk_expression(&node.value, scope);
                scope.define(node.variable.as_str());
            }
        }
    }

    fn walk_expression(&mut self, expression: &Expression, scope: &Scope) {
        match expression {
            Expression::Literal(_) => {}
            Expression::Identifier(identifier) => self.references.push(ScopedReference {
                name: identifier.name.clone(),
                line: identifier.line,
                column: identifier.column,
                scope: scope.clone(),
            }),
            Expression::Binary(binary) => {
                self.walk_expression(&binary.left, scope);
                self.walk_expression(&binary.right, scope);
            }
            Expression::Unary(unary) => self.walk_expression(&unary.argument, scope),
            Expression::Filter(filter) => {
                self.walk_expression(&filter.value, scope);
                if self.include_filter_arguments {
                    for arg in &filter.args {
                        self.walk_expression(arg, scope);
                    }
                }
            }
            Expression::Group(group) => self.walk_expression(&group.expression, scope),
            Expression::Member(member) => {
                self.walk_expression(&member.object, scope);
                self.walk_expression(&member.property, scope);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn references(input: &str, include_filter_arguments: bool) -> Vec<ScopedReference> {
        let result = parse(input);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        ReferenceCollector::new(include_filter_arguments).collect(&result.ast)
    }

    #[test]
    fn test_snapshot_does_not_see_later_definitions() {
        let mut scope = Scope::new();
        let snapshot = scope.clone();
        scope.define("later");
        assert!(scope.contains("later"));
        assert!(!snapshot.contains("later"));
    }

    #[test]
    fn test_loop_scope_is_discarded() {
        let refs = references("{% for a in items %}{{a_index}}{% endfor %}{{a_index}}", false);
        let names: Vec<_> = refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["items", "a_index", "a_index"]);
        assert!(refs[1].scope.contains("a_index"));
        assert!(!refs[2].scope.contains("a_index"));
    }

    #[test]
    fn test_set_applies_from_its_position() {
        let refs = references("{{x}}{% set x = x %}{{x}}", false);
        assert_eq!(refs.len(), 3);
        assert!(!refs[0].scope.contains("x"));
        // The value of a set is evaluated before the name exists
        assert!(!refs[1].scope.contains("x"));
        assert!(refs[2].scope.contains("x"));
    }

    #[test]
    fn test_set_inside_if_extends_enclosing_scope() {
        let refs = references("{% if a %}{% set b = 1 %}{% endif %}{{b}}", false);
        assert!(refs.last().unwrap().scope.contains("b"));
    }

    #[test]
    fn test_filter_arguments_are_optional() {
        let input = "{{title|default:fallback}}";
        assert_eq!(references(input, false).len(), 1);
        assert_eq!(references(input, true).len(), 2);
    }

    #[test]
    fn test_nested_expressions_are_walked() {
        let refs = references("{% if not (a and b[c]) %}{{ d ?? e }}{% endif %}", false);
        let names: Vec<_> = refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    }
}
