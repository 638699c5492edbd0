//! Expression grammar, lowest to highest precedence:
//!
//! nullish (`??`) -> filter (`|name:args`) -> or -> and -> not -> comparison
//! -> postfix (`[index]`) -> primary
//!
//! Every function returns `None` after reporting an error; callers resync.

use super::error::SyntaxError;
use super::parser::Parser;
use crate::config::compile_time::syntax::MAX_LOOKAHEAD_TOKENS;
use crate::grammar::ast::{
    quote, BinaryExpression, BinaryOperator, Expression, FilterExpression, GroupExpression,
    LiteralValue, MemberExpression, UnaryExpression, UnaryOperator,
};
use crate::tokens::{Token, TokenKind};

fn binary(operator: BinaryOperator, left: Expression, right: Expression, at: &Token) -> Expression {
    Expression::Binary(BinaryExpression {
        operator,
        left: Box::new(left),
        right: Box::new(right),
        line: at.line,
        column: at.column,
    })
}

fn comparison_operator(kind: &TokenKind) -> Option<BinaryOperator> {
    let operator = match kind {
        TokenKind::Eq => BinaryOperator::Equal,
        TokenKind::NotEq => BinaryOperator::NotEqual,
        TokenKind::Gt => BinaryOperator::GreaterThan,
        TokenKind::Lt => BinaryOperator::LessThan,
        TokenKind::Gte => BinaryOperator::GreaterThanOrEqual,
        TokenKind::Lte => BinaryOperator::LessThanOrEqual,
        TokenKind::Contains => BinaryOperator::Contains,
        _ => return None,
    };
    Some(operator)
}

/// Source spelling of a token inside a captured arrow-function argument
fn token_source(token: &Token) -> String {
    match token.kind {
        TokenKind::String => quote(&token.value),
        _ => token.value.clone(),
    }
}

impl Parser {
    pub(super) fn parse_expression(&mut self) -> Option<Expression> {
        let (line, column) = {
            let current = self.stream.current();
            (current.line, current.column)
        };
        if !self.enter(line, column) {
            return None;
        }
        let expression = self.parse_nullish();
        self.leave();
        expression
    }

    fn parse_nullish(&mut self) -> Option<Expression> {
        let mut left = self.parse_filter()?;
        while self.stream.check(&TokenKind::Nullish) {
            let operator = self.stream.advance();
            let right = self.parse_filter()?;
            left = binary(BinaryOperator::Nullish, left, right, &operator);
        }
        Some(left)
    }

    fn parse_filter(&mut self) -> Option<Expression> {
        let mut value = self.parse_or()?;
        while self.stream.check(&TokenKind::Pipe) {
            let pipe = self.stream.advance();

            let name = self.stream.current().clone();
            if !(name.kind == TokenKind::Identifier || name.kind.is_keyword()) {
                self.error(SyntaxError::MissingFilterName {
                    found: name.describe(),
                    line: name.line,
                    column: name.column,
                });
                return None;
            }
            self.stream.advance();

            let args = if self.stream.consume(&TokenKind::Colon) {
                self.parse_filter_args()?
            } else {
                Vec::new()
            };

            value = Expression::Filter(FilterExpression {
                value: Box::new(value),
                name: name.value,
                args,
                line: pipe.line,
                column: pipe.column,
            });
        }
        Some(value)
    }

    fn parse_or(&mut self) -> Option<Expression> {
        let mut left = self.parse_and()?;
        while self.stream.check(&TokenKind::Or) {
            let operator = self.stream.advance();
            let right = self.parse_and()?;
            left = binary(BinaryOperator::Or, left, right, &operator);
        }
        Some(left)
    }

    fn parse_and(&mut self) -> Option<Expression> {
        let mut left = self.parse_not()?;
        while self.stream.check(&TokenKind::And) {
            let operator = self.stream.advance();
            let right = self.parse_not()?;
            left = binary(BinaryOperator::And, left, right, &operator);
        }
        Some(left)
    }

    fn parse_not(&mut self) -> Option<Expression> {
        if !self.stream.check(&TokenKind::Not) {
            return self.parse_comparison();
        }

        let operator = self.stream.advance();
        if !self.enter(operator.line, operator.column) {
            return None;
        }
        let argument = self.parse_not();
        self.leave();

        Some(Expression::Unary(UnaryExpression {
            operator: UnaryOperator::Not,
            argument: Box::new(argument?),
            line: operator.line,
            column: operator.column,
        }))
    }

    /// One comparison at most: `a == b == c` leaves the second `==` unparsed
    fn parse_comparison(&mut self) -> Option<Expression> {
        let left = self.parse_postfix()?;
        let Some(operator) = comparison_operator(self.stream.kind()) else {
            return Some(left);
        };
        let token = self.stream.advance();
        let right = self.parse_postfix()?;
        Some(binary(operator, left, right, &token))
    }

    fn parse_postfix(&mut self) -> Option<Expression> {
        let mut object = self.parse_primary()?;
        while self.stream.check(&TokenKind::LBracket) {
            let bracket = self.stream.advance();
            let property = self.parse_expression()?;
            self.expect_closing(&TokenKind::RBracket, "']'")?;
            object = Expression::Member(MemberExpression {
                object: Box::new(object),
                property: Box::new(property),
                computed: true,
                line: bracket.line,
                column: bracket.column,
            });
        }
        Some(object)
    }

    fn parse_primary(&mut self) -> Option<Expression> {
        let token = self.stream.current().clone();
        let (line, column) = (token.line, token.column);

        match token.kind {
            TokenKind::LParen => {
                self.stream.advance();
                let inner = self.parse_expression()?;
                self.expect_closing(&TokenKind::RParen, "')'")?;
                Some(Expression::Group(GroupExpression {
                    expression: Box::new(inner),
                    line,
                    column,
                }))
            }
            TokenKind::String => {
                self.stream.advance();
                Some(Expression::string(token.value, line, column))
            }
            TokenKind::Number => match token.value.parse::<f64>() {
                Ok(number) => {
                    self.stream.advance();
                    Some(Expression::literal(
                        LiteralValue::Number(number),
                        token.value,
                        line,
                        column,
                    ))
                }
                Err(_) => {
                    self.error(SyntaxError::UnexpectedToken {
                        expected: "a number".to_string(),
                        found: token.describe(),
                        line,
                        column,
                    });
                    None
                }
            },
            TokenKind::Boolean => {
                self.stream.advance();
                let value = token.value.eq_ignore_ascii_case("true");
                Some(Expression::literal(
                    LiteralValue::Boolean(value),
                    token.value,
                    line,
                    column,
                ))
            }
            TokenKind::Null => {
                self.stream.advance();
                Some(Expression::literal(LiteralValue::Null, token.value, line, column))
            }
            TokenKind::Identifier => {
                self.stream.advance();
                let name = self.parse_compound_name(token.value);
                Some(Expression::identifier(name, line, column))
            }
            _ => {
                self.error(SyntaxError::MissingExpression {
                    found: token.describe(),
                    line,
                    column,
                });
                None
            }
        }
    }

    /// Fold `:`/`.` continuations into one name, e.g. `schema:@Article.headline`.
    /// After a separator a word must follow; after a word only `:` or `.` continues.
    /// Schema names also take `[*]` and `[n]` array selectors, as in `schema:author[*].name`.
    fn parse_compound_name(&mut self, mut name: String) -> String {
        loop {
            if matches!(self.stream.kind(), TokenKind::Colon | TokenKind::Dot)
                && self.stream.peek_ahead(1).is_word()
            {
                let separator = self.stream.advance();
                let word = self.stream.advance();
                name.push_str(&separator.value);
                name.push_str(&word.value);
            } else if name.starts_with("schema:") && self.at_schema_index() {
                self.stream.advance();
                let index = self.stream.advance();
                self.stream.advance();
                name.push('[');
                name.push_str(&index.value);
                name.push(']');
            } else {
                return name;
            }
        }
    }

    fn at_schema_index(&self) -> bool {
        let index = self.stream.peek_ahead(1);
        let is_index = match index.kind {
            TokenKind::Star => true,
            TokenKind::Number => index.value.chars().all(|c| c.is_ascii_digit()),
            _ => false,
        };
        self.stream.check(&TokenKind::LBracket)
            && is_index
            && self.stream.peek_ahead(2).kind == TokenKind::RBracket
    }

    fn expect_closing(&mut self, kind: &TokenKind, spelling: &str) -> Option<()> {
        if self.stream.consume(kind) {
            return Some(());
        }
        let current = self.stream.current().clone();
        self.error(SyntaxError::UnexpectedToken {
            expected: spelling.to_string(),
            found: current.describe(),
            line: current.line,
            column: current.column,
        });
        None
    }

    // === FILTER ARGUMENTS ===

    fn parse_filter_args(&mut self) -> Option<Vec<Expression>> {
        if self.stream.check(&TokenKind::LParen) {
            return self.parse_parenthesized_args();
        }
        if self.at_quoted_pair() {
            return Some(self.parse_quoted_pairs());
        }

        let mut args = Vec::new();
        loop {
            let arg = if self.at_arrow_argument() {
                self.parse_arrow_argument(false)
            } else {
                self.parse_postfix()?
            };
            args.push(arg);
            if !self.stream.consume(&TokenKind::Comma) {
                break;
            }
        }
        Some(args)
    }

    /// `(arg, arg, ...)` where each argument is a full or-expression
    fn parse_parenthesized_args(&mut self) -> Option<Vec<Expression>> {
        self.stream.advance();
        let mut args = Vec::new();

        if !self.stream.check(&TokenKind::RParen) {
            loop {
                let arg = if self.at_arrow_argument() {
                    self.parse_arrow_argument(true)
                } else {
                    self.parse_or()?
                };
                args.push(arg);
                if !self.stream.consume(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect_closing(&TokenKind::RParen, "')'")?;
        Some(args)
    }

    /// `"search":"replace"` at the cursor
    fn at_quoted_pair(&self) -> bool {
        self.stream.check(&TokenKind::String)
            && self.stream.peek_ahead(1).kind == TokenKind::Colon
            && self.stream.peek_ahead(2).kind == TokenKind::String
    }

    /// `"a":"b","c":"d"` becomes one string literal per pair, so `replace`
    /// receives two arguments here rather than four
    fn parse_quoted_pairs(&mut self) -> Vec<Expression> {
        let mut pairs = Vec::new();
        loop {
            let search = self.stream.advance();
            self.stream.advance();
            let replace = self.stream.advance();

            let value = format!("{}:{}", quote(&search.value), quote(&replace.value));
            pairs.push(Expression::string(value, search.line, search.column));

            let another = self.stream.check(&TokenKind::Comma)
                && self.stream.peek_ahead(1).kind == TokenKind::String
                && self.stream.peek_ahead(2).kind == TokenKind::Colon
                && self.stream.peek_ahead(3).kind == TokenKind::String;
            if !another {
                break;
            }
            self.stream.advance();
        }
        pairs
    }

    fn at_arrow_argument(&self) -> bool {
        self.stream.check(&TokenKind::Identifier)
            && self.stream.peek_ahead(1).kind == TokenKind::Arrow
    }

    /// Capture `item => body` as a string literal of its source tokens. The
    /// capture ends at a top-level `|`, the closing delimiter, or (inside an
    /// argument list) a top-level `,` or `)`.
    fn parse_arrow_argument(&mut self, in_parens: bool) -> Expression {
        let start = self.stream.current().clone();
        let mut parts = Vec::new();
        let mut depth = 0usize;

        loop {
            let kind = self.stream.kind().clone();
            if kind.is_region_boundary()
                || matches!(kind, TokenKind::VariableEnd { .. } | TokenKind::TagEnd { .. })
            {
                break;
            }
            if depth == 0 {
                let ends_list = in_parens && matches!(kind, TokenKind::Comma | TokenKind::RParen);
                if kind == TokenKind::Pipe || ends_list {
                    break;
                }
            }
            match kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            parts.push(token_source(&self.stream.advance()));
        }

        Expression::string(parts.join(" "), start.line, start.column)
    }

    // === AMBIGUOUS PROMPTS ===

    /// `{{summarize this page}}`: bare words after an expression usually mean
    /// the author forgot the quotes around a prompt. Peeks at most
    /// `MAX_LOOKAHEAD_TOKENS` words and restores the cursor afterwards.
    pub(super) fn report_ambiguous_prompt(&mut self, expression: &Expression) {
        let saved = self.stream.position();
        let mut words: Vec<String> = expression.as_identifier().map(str::to_string).into_iter().collect();

        let mut peeked = 0;
        while peeked < MAX_LOOKAHEAD_TOKENS && self.stream.check(&TokenKind::Identifier) {
            words.push(self.stream.advance().value);
            peeked += 1;
        }
        self.stream.restore(saved);

        self.error(SyntaxError::AmbiguousPrompt {
            suggestion: words.join(" "),
            line: expression.line(),
            column: expression.column(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::ast::{LiteralExpression, Node};
    use crate::lexical::LexicalAnalyzer;
    use crate::syntax::parser::ParserOutput;
    use assert_matches::assert_matches;

    fn parse(input: &str) -> ParserOutput {
        Parser::new(LexicalAnalyzer::new(input).tokenize().tokens).parse()
    }

    /// Expression of a single `{{ ... }}` template
    fn expr(input: &str) -> Expression {
        let output = parse(input);
        assert!(output.errors.is_empty(), "{:?}", output.errors);
        match output.ast.into_iter().next() {
            Some(Node::Variable(node)) => node.expression,
            other => panic!("expected a variable node, got {:?}", other),
        }
    }

    fn string_value(expression: &Expression) -> &str {
        match expression {
            Expression::Literal(LiteralExpression {
                value: LiteralValue::String(s),
                ..
            }) => s,
            other => panic!("expected a string literal, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_filter() {
        assert_matches!(expr("{{title|lower}}"), Expression::Filter(f) => {
            assert_eq!(f.name, "lower");
            assert!(f.args.is_empty());
            assert_eq!(f.value.as_identifier(), Some("title"));
        });
    }

    #[test]
    fn test_filter_chain_is_left_associative() {
        assert_matches!(expr("{{a|b|c}}"), Expression::Filter(outer) => {
            assert_eq!(outer.name, "c");
            assert_matches!(*outer.value, Expression::Filter(inner) if inner.name == "b");
        });
    }

    #[test]
    fn test_replace_quoted_pairs() {
        assert_matches!(expr(r#"{{title|replace:"h":"H","d":"D"}}"#), Expression::Filter(f) => {
            assert_eq!(f.name, "replace");
            assert_eq!(f.args.len(), 2);
            assert_eq!(string_value(&f.args[0]), r#""h":"H""#);
            assert_eq!(string_value(&f.args[1]), r#""d":"D""#);
        });
    }

    #[test]
    fn test_single_and_listed_args() {
        assert_matches!(expr("{{date|date:\"YYYY-MM-DD\"}}"), Expression::Filter(f) => {
            assert_eq!(f.args.len(), 1);
            assert_eq!(string_value(&f.args[0]), "YYYY-MM-DD");
        });
        assert_matches!(expr("{{words|slice:0,5}}"), Expression::Filter(f) => {
            assert_eq!(f.args.len(), 2);
        });
        assert_matches!(expr("{{x|f:(a or b, \"c\")}}"), Expression::Filter(f) => {
            assert_matches!(&f.args[0], Expression::Binary(b) if b.operator == BinaryOperator::Or);
            assert_eq!(string_value(&f.args[1]), "c");
        });
        assert_matches!(expr("{{x|f:()}}"), Expression::Filter(f) if f.args.is_empty());
    }

    #[test]
    fn test_arrow_argument_captured_as_source() {
        assert_matches!(expr("{{items|map:item => item.name|join}}"), Expression::Filter(join) => {
            assert_eq!(join.name, "join");
            assert_matches!(*join.value, Expression::Filter(map) => {
                assert_eq!(map.name, "map");
                assert_eq!(string_value(&map.args[0]), "item => item.name");
            });
        });
    }

    #[test]
    fn test_precedence() {
        // a ?? (b or (c and (not d)))
        assert_matches!(expr("{{a ?? b or c and not d}}"), Expression::Binary(nullish) => {
            assert_eq!(nullish.operator, BinaryOperator::Nullish);
            assert_matches!(*nullish.right, Expression::Binary(or) => {
                assert_eq!(or.operator, BinaryOperator::Or);
                assert_matches!(*or.right, Expression::Binary(and) => {
                    assert_eq!(and.operator, BinaryOperator::And);
                    assert_matches!(*and.right, Expression::Unary(_));
                });
            });
        });
    }

    #[test]
    fn test_filter_binds_looser_than_or() {
        assert_matches!(expr("{{a || b|upper}}"), Expression::Filter(f) => {
            assert_matches!(*f.value, Expression::Binary(b) if b.operator == BinaryOperator::Or);
        });
    }

    #[test]
    fn test_symbolic_and_word_operators_match() {
        let symbols = expr("{{ !a && b }}");
        let words = expr("{{ not a and b }}");
        assert_matches!((&symbols, &words), (Expression::Binary(x), Expression::Binary(y)) => {
            assert_eq!(x.operator, y.operator);
        });
    }

    #[test]
    fn test_double_not() {
        assert_matches!(expr("{{not not x}}"), Expression::Unary(outer) => {
            assert_matches!(*outer.argument, Expression::Unary(_));
        });
    }

    #[test]
    fn test_contains_and_group() {
        assert_matches!(expr("{{(tags contains \"rust\")}}"), Expression::Group(group) => {
            assert_matches!(*group.expression, Expression::Binary(b) if b.operator == BinaryOperator::Contains);
        });
    }

    #[test]
    fn test_member_access() {
        assert_matches!(expr("{{items[0][\"name\"]}}"), Expression::Member(outer) => {
            assert!(outer.computed);
            assert_eq!(string_value(&outer.property), "name");
            assert_matches!(*outer.object, Expression::Member(inner) => {
                assert_eq!(inner.object.as_identifier(), Some("items"));
            });
        });
    }

    #[test]
    fn test_compound_identifiers() {
        assert_eq!(
            expr("{{schema:@Article.headline}}").as_identifier(),
            Some("schema:@Article.headline")
        );
        assert_eq!(
            expr("{{meta:property:og:title}}").as_identifier(),
            Some("meta:property:og:title")
        );
        assert_eq!(expr("{{author.name}}").as_identifier(), Some("author.name"));
    }

    #[test]
    fn test_schema_array_selectors() {
        for name in [
            "schema:author[*].name",
            "schema:author[0].name",
            "schema:@Recipe:recipeIngredient[*]",
        ] {
            let output = parse(&format!("{{{{{}}}}}", name));
            assert!(output.errors.is_empty(), "{}: {:?}", name, output.errors);
            assert_matches!(output.ast.as_slice(), [Node::Variable(node)] => {
                assert_eq!(node.expression.as_identifier(), Some(name));
            });
        }
    }

    #[test]
    fn test_member_access_outside_schema_stays_computed() {
        assert_matches!(expr("{{items[0]}}"), Expression::Member(member) => {
            assert!(member.computed);
            assert_eq!(member.object.as_identifier(), Some("items"));
        });
    }

    #[test]
    fn test_literals() {
        assert_matches!(expr("{{ 3.5 }}"), Expression::Literal(l) if l.value == LiteralValue::Number(3.5) && l.raw == "3.5");
        assert_matches!(expr("{{ TRUE }}"), Expression::Literal(l) if l.value == LiteralValue::Boolean(true));
        assert_matches!(expr("{{ null }}"), Expression::Literal(l) if l.value == LiteralValue::Null);
        assert_matches!(expr("{{ \"hi\" }}"), Expression::Literal(l) if l.raw == "\"hi\"");
    }

    #[test]
    fn test_positions_point_at_tokens() {
        assert_matches!(expr("{{ a == b }}"), Expression::Binary(b) => {
            assert_eq!((b.line, b.column), (1, 6));
            assert_eq!((b.left.line(), b.left.column()), (1, 4));
        });
    }

    #[test]
    fn test_ambiguous_prompt() {
        let output = parse("{{summarize this page}}after");
        assert_matches!(output.errors.as_slice(), [SyntaxError::AmbiguousPrompt { suggestion, line: 1, column: 3 }] => {
            assert_eq!(suggestion, "summarize this page");
        });
        // The variable is dropped but parsing resumes after it
        assert_matches!(output.ast.as_slice(), [Node::Text(t)] if t.value == "after");
    }

    #[test]
    fn test_ambiguous_prompt_lookahead_is_bounded() {
        let words: Vec<String> = (0..20).map(|i| format!("w{}", i)).collect();
        let output = parse(&format!("{{{{{}}}}}", words.join(" ")));
        assert_matches!(output.errors.as_slice(), [SyntaxError::AmbiguousPrompt { suggestion, .. }] => {
            assert_eq!(suggestion.split(' ').count(), MAX_LOOKAHEAD_TOKENS + 1);
        });
    }

    #[test]
    fn test_expression_errors() {
        let output = parse("{{ a| }}");
        assert_matches!(output.errors.as_slice(), [SyntaxError::MissingFilterName { .. }]);

        let output = parse("{{ (a }}");
        assert_matches!(output.errors.as_slice(), [SyntaxError::UnexpectedToken { expected, .. }] if expected == "')'");

        let output = parse("{{ a[0 }}");
        assert_matches!(output.errors.as_slice(), [SyntaxError::UnexpectedToken { expected, .. }] if expected == "']'");
    }

    #[test]
    fn test_deep_grouping_is_bounded() {
        let depth = crate::config::compile_time::syntax::MAX_PARSE_DEPTH + 10;
        let input = format!("{{{{{}x{}}}}}", "(".repeat(depth), ")".repeat(depth));
        let output = parse(&input);
        assert_matches!(output.errors.as_slice(), [SyntaxError::NestingTooDeep { .. }]);
    }
}
