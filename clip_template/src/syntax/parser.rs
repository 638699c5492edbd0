//! Recursive-descent statement parser
//!
//! Bodies are parsed until end of input or until a `{% keyword %}` from any
//! enclosing block's stop set shows up, which lets a block with a missing
//! closer hand the closer to its parent instead of swallowing it.

use super::error::SyntaxError;
use crate::config::compile_time::syntax::MAX_PARSE_DEPTH;
use crate::grammar::ast::{
    ElseIfBranch, Expression, ForNode, IfNode, LiteralValue, Node, SetNode, TextNode, VariableNode,
};
use crate::grammar::keywords::keyword_name;
use crate::tokens::{Token, TokenKind, TokenStream};

const IF_STOPS: &[TokenKind] = &[TokenKind::ElseIf, TokenKind::Else, TokenKind::EndIf];
const ELSE_STOPS: &[TokenKind] = &[TokenKind::EndIf];
const FOR_STOPS: &[TokenKind] = &[TokenKind::EndFor];

/// AST plus the errors found while building it
#[derive(Debug, Clone, Default)]
pub struct ParserOutput {
    pub ast: Vec<Node>,
    pub errors: Vec<SyntaxError>,
}

pub struct Parser {
    pub(super) stream: TokenStream,
    pub(super) errors: Vec<SyntaxError>,
    stop_stack: Vec<&'static [TokenKind]>,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            stream: TokenStream::new(tokens),
            errors: Vec::new(),
            stop_stack: Vec::new(),
            depth: 0,
        }
    }

    /// Parse the whole stream. Always terminates: every loop iteration
    /// consumes at least one token.
    pub fn parse(mut self) -> ParserOutput {
        let ast = self.parse_body();
        ParserOutput {
            ast,
            errors: self.errors,
        }
    }

    // === SHARED HELPERS ===

    pub(super) fn error(&mut self, error: SyntaxError) {
        self.errors.push(error);
    }

    /// Track nesting for blocks and expressions; reports once when the limit is crossed
    pub(super) fn enter(&mut self, line: u32, column: u32) -> bool {
        if self.depth >= MAX_PARSE_DEPTH {
            self.error(SyntaxError::NestingTooDeep { line, column });
            return false;
        }
        self.depth += 1;
        true
    }

    pub(super) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Consume through the next `%}`, stopping early at a region boundary
    pub(super) fn skip_to_end_of_tag(&mut self) {
        loop {
            match self.stream.kind() {
                TokenKind::TagEnd { .. } => {
                    self.stream.advance();
                    return;
                }
                kind if kind.is_region_boundary() => return,
                _ => {
                    self.stream.advance();
                }
            }
        }
    }

    /// Consume through the next `}}`, stopping early at a region boundary
    pub(super) fn skip_to_end_of_variable(&mut self) {
        loop {
            match self.stream.kind() {
                TokenKind::VariableEnd { .. } => {
                    self.stream.advance();
                    return;
                }
                kind if kind.is_region_boundary() => return,
                _ => {
                    self.stream.advance();
                }
            }
        }
    }

    /// Expect `%}`; on failure report, resync, and keep going
    fn expect_tag_end(&mut self) -> bool {
        if let TokenKind::TagEnd { trim_right } = *self.stream.kind() {
            self.stream.advance();
            return trim_right;
        }
        let current = self.stream.current().clone();
        self.error(SyntaxError::MissingTagEnd {
            found: current.describe(),
            line: current.line,
            column: current.column,
        });
        self.skip_to_end_of_tag();
        true
    }

    fn expect_variable_end(&mut self) -> bool {
        if let TokenKind::VariableEnd { trim_right } = *self.stream.kind() {
            self.stream.advance();
            return trim_right;
        }
        let current = self.stream.current().clone();
        self.error(SyntaxError::MissingVariableEnd {
            found: current.describe(),
            line: current.line,
            column: current.column,
        });
        self.skip_to_end_of_variable();
        false
    }

    /// True when the header of the current tag has nothing left before `%}`
    fn at_tag_end(&self) -> bool {
        matches!(self.stream.kind(), TokenKind::TagEnd { .. }) || self.stream.kind().is_region_boundary()
    }

    /// `{% <kind>` at the cursor
    fn at_tag(&self, kind: &TokenKind) -> bool {
        matches!(self.stream.kind(), TokenKind::TagStart { .. })
            && self.stream.peek_ahead(1).kind == *kind
    }

    fn at_stop_keyword(&self) -> bool {
        if !matches!(self.stream.kind(), TokenKind::TagStart { .. }) {
            return false;
        }
        let next = &self.stream.peek_ahead(1).kind;
        self.stop_stack.iter().any(|stops| stops.contains(next))
    }

    /// Placeholder used when a required expression is missing
    fn null_at(token: &Token) -> Expression {
        Expression::literal(LiteralValue::Null, "null", token.line, token.column)
    }

    // === STATEMENTS ===

    fn parse_body(&mut self) -> Vec<Node> {
        let mut nodes = Vec::new();
        while !self.stream.is_at_end() && !self.at_stop_keyword() {
            let before = self.stream.position();
            if let Some(node) = self.parse_statement() {
                nodes.push(node);
            }
            if self.stream.position() == before {
                self.stream.advance();
            }
        }
        nodes
    }

    fn parse_block_body(&mut self, stops: &'static [TokenKind]) -> Vec<Node> {
        self.stop_stack.push(stops);
        let body = self.parse_body();
        self.stop_stack.pop();
        body
    }

    fn parse_statement(&mut self) -> Option<Node> {
        let token = self.stream.current().clone();
        match token.kind {
            TokenKind::Text => {
                self.stream.advance();
                Some(Node::Text(TextNode {
                    value: token.value,
                    line: token.line,
                    column: token.column,
                }))
            }
            TokenKind::VariableStart { trim_left } => self.parse_variable(token, trim_left),
            TokenKind::TagStart { trim_left } => self.parse_tag(token, trim_left),
            _ => {
                self.error(SyntaxError::UnexpectedToken {
                    expected: "text, '{{' or '{%'".to_string(),
                    found: token.describe(),
                    line: token.line,
                    column: token.column,
                });
                self.stream.advance();
                None
            }
        }
    }

    fn parse_variable(&mut self, start: Token, trim_left: bool) -> Option<Node> {
        self.stream.advance();

        if let TokenKind::VariableEnd { .. } = self.stream.kind() {
            self.error(SyntaxError::EmptyVariable {
                line: start.line,
                column: start.column,
            });
            self.stream.advance();
            return None;
        }

        let Some(expression) = self.parse_expression() else {
            self.skip_to_end_of_variable();
            return None;
        };

        if self.stream.check(&TokenKind::Identifier) {
            self.report_ambiguous_prompt(&expression);
            self.skip_to_end_of_variable();
            return None;
        }

        let trim_right = self.expect_variable_end();
        Some(Node::Variable(VariableNode {
            expression,
            trim_left,
            trim_right,
            line: start.line,
            column: start.column,
        }))
    }

    fn parse_tag(&mut self, start: Token, trim_left: bool) -> Option<Node> {
        self.stream.advance();
        let keyword = self.stream.current().clone();

        match keyword.kind {
            TokenKind::If => self.parse_if(start, trim_left),
            TokenKind::For => self.parse_for(start, trim_left),
            TokenKind::Set => self.parse_set(start, trim_left),
            TokenKind::ElseIf | TokenKind::Else | TokenKind::EndIf | TokenKind::EndFor => {
                self.error(SyntaxError::UnmatchedClosingTag {
                    keyword: keyword_name(&keyword.kind).unwrap_or("tag"),
                    line: start.line,
                    column: start.column,
                });
                self.skip_to_end_of_tag();
                None
            }
            TokenKind::TagEnd { .. } => {
                self.error(SyntaxError::EmptyTag {
                    line: start.line,
                    column: start.column,
                });
                self.stream.advance();
                None
            }
            TokenKind::Identifier => {
                self.error(SyntaxError::UnknownTag {
                    name: keyword.value,
                    line: keyword.line,
                    column: keyword.column,
                });
                self.skip_to_end_of_tag();
                None
            }
            _ if keyword.kind.is_region_boundary() => {
                self.error(SyntaxError::MissingTagEnd {
                    found: keyword.describe(),
                    line: keyword.line,
                    column: keyword.column,
                });
                None
            }
            _ => {
                self.error(SyntaxError::UnexpectedToken {
                    expected: "'if', 'for' or 'set'".to_string(),
                    found: keyword.describe(),
                    line: keyword.line,
                    column: keyword.column,
                });
                self.skip_to_end_of_tag();
                None
            }
        }
    }

    /// Condition of an `if`/`elseif` header; a missing or broken condition
    /// becomes a `null` literal so the block structure is still recovered.
    fn parse_condition(&mut self, tag: &'static str) -> (Expression, bool) {
        let current = self.stream.current().clone();
        if self.at_tag_end() {
            self.error(SyntaxError::MissingCondition {
                tag,
                line: current.line,
                column: current.column,
            });
            return (Self::null_at(&current), self.expect_tag_end());
        }

        match self.parse_expression() {
            Some(condition) => {
                let trim_right = self.expect_tag_end();
                (condition, trim_right)
            }
            None => {
                self.skip_to_end_of_tag();
                (Self::null_at(&current), true)
            }
        }
    }

    fn parse_if(&mut self, start: Token, trim_left: bool) -> Option<Node> {
        self.stream.advance();
        if !self.enter(start.line, start.column) {
            self.skip_to_end_of_tag();
            return None;
        }

        let (condition, trim_right) = self.parse_condition("if");
        let consequent = self.parse_block_body(IF_STOPS);

        let mut elseifs = Vec::new();
        let mut alternate = None;
        let mut closed = false;

        while alternate.is_none() && self.at_tag(&TokenKind::ElseIf) {
            self.stream.advance();
            self.stream.advance();
            let (condition, _) = self.parse_condition("elseif");
            let body = self.parse_block_body(IF_STOPS);
            elseifs.push(ElseIfBranch { condition, body });
        }

        if self.at_tag(&TokenKind::Else) {
            self.stream.advance();
            self.stream.advance();
            self.expect_tag_end();
            alternate = Some(self.parse_block_body(ELSE_STOPS));
        }

        if self.at_tag(&TokenKind::EndIf) {
            self.stream.advance();
            self.stream.advance();
            self.expect_tag_end();
            closed = true;
        }

        if !closed {
            self.error(SyntaxError::MissingEndIf {
                line: start.line,
                column: start.column,
            });
        }

        self.leave();
        Some(Node::If(IfNode {
            condition,
            consequent,
            elseifs,
            alternate,
            trim_left,
            trim_right,
            line: start.line,
            column: start.column,
        }))
    }

    fn parse_for(&mut self, start: Token, trim_left: bool) -> Option<Node> {
        self.stream.advance();
        if !self.enter(start.line, start.column) {
            self.skip_to_end_of_tag();
            return None;
        }

        let header = self.parse_for_header();
        let (iterator, iterable, trim_right) = match header {
            Some((iterator, iterable)) => (iterator, iterable, self.expect_tag_end()),
            None => {
                let placeholder = Self::null_at(self.stream.current());
                self.skip_to_end_of_tag();
                (String::new(), placeholder, true)
            }
        };

        let body = self.parse_block_body(FOR_STOPS);

        if self.at_tag(&TokenKind::EndFor) {
            self.stream.advance();
            self.stream.advance();
            self.expect_tag_end();
        } else {
            self.error(SyntaxError::MissingEndFor {
                line: start.line,
                column: start.column,
            });
        }

        self.leave();
        Some(Node::For(ForNode {
            iterator,
            iterable,
            body,
            trim_left,
            trim_right,
            line: start.line,
            column: start.column,
        }))
    }

    /// `<identifier> in <expression>`; reports the first missing piece
    fn parse_for_header(&mut self) -> Option<(String, Expression)> {
        let current = self.stream.current().clone();
        if current.kind != TokenKind::Identifier {
            self.error(SyntaxError::MissingIterator {
                found: current.describe(),
                line: current.line,
                column: current.column,
            });
            return None;
        }
        self.stream.advance();
        let iterator = current.value;

        if !self.stream.consume(&TokenKind::In) {
            let found = self.stream.current().clone();
            self.error(SyntaxError::MissingIn {
                iterator,
                found: found.describe(),
                line: found.line,
                column: found.column,
            });
            return None;
        }

        if self.at_tag_end() {
            let found = self.stream.current().clone();
            self.error(SyntaxError::MissingIterable {
                line: found.line,
                column: found.column,
            });
            return None;
        }

        let iterable = self.parse_expression()?;
        Some((iterator, iterable))
    }

    fn parse_set(&mut self, start: Token, trim_left: bool) -> Option<Node> {
        self.stream.advance();

        let name = self.stream.current().clone();
        if name.kind != TokenKind::Identifier {
            self.error(SyntaxError::MissingSetName {
                found: name.describe(),
                line: name.line,
                column: name.column,
            });
            self.skip_to_end_of_tag();
            return None;
        }
        self.stream.advance();

        if !self.stream.consume(&TokenKind::Assign) {
            let found = self.stream.current().clone();
            self.error(SyntaxError::MissingSetAssign {
                name: name.value,
                found: found.describe(),
                line: found.line,
                column: found.column,
            });
            self.skip_to_end_of_tag();
            return None;
        }

        if self.at_tag_end() {
            let found = self.stream.current().clone();
            self.error(SyntaxError::MissingSetValue {
                name: name.value,
                line: found.line,
                column: found.column,
            });
            self.skip_to_end_of_tag();
            return None;
        }

        let Some(value) = self.parse_expression() else {
            self.skip_to_end_of_tag();
            return None;
        };

        let trim_right = self.expect_tag_end();
        Some(Node::Set(SetNode {
            variable: name.value,
            value,
            trim_left,
            trim_right,
            line: start.line,
            column: start.column,
        }))
    }
}
