//! Tokenizer state machine
//!
//! A single cursor walks the input in one of three modes. Text mode looks for
//! the next `{{` or `{%`; variable and tag modes scan expression tokens until
//! the matching closer. Errors are collected and scanning continues, so a
//! broken region never hides problems later in the template.

use super::error::LexerError;
use super::selector::{scan_selector, SelectorIssueKind};
use crate::config::compile_time::lexical::MAX_TOKEN_COUNT;
use crate::grammar::keywords::lookup_keyword;
use crate::tokens::{Token, TokenKind};
use crate::utils::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Text,
    Variable,
    Tag,
}

/// Tokens plus the errors found while producing them
#[derive(Debug, Clone, Default)]
pub struct LexicalOutput {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexerError>,
}

pub struct LexicalAnalyzer<'a> {
    input: &'a str,
    cursor: Position,
    mode: Mode,
    tokens: Vec<Token>,
    errors: Vec<LexerError>,
    /// Index of the start token of the open variable/tag
    block_start: usize,
    block_position: Position,
    /// `{` nesting inside the current expression
    brace_depth: usize,
    limit_hit: bool,
}

impl<'a> LexicalAnalyzer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            cursor: Position::start(),
            mode: Mode::Text,
            tokens: Vec::new(),
            errors: Vec::new(),
            block_start: 0,
            block_position: Position::start(),
            brace_depth: 0,
            limit_hit: false,
        }
    }

    /// Run the state machine to the end of input. Always ends with an `Eof` token.
    pub fn tokenize(mut self) -> LexicalOutput {
        while !self.limit_hit && !self.at_end() {
            match self.mode {
                Mode::Text => self.scan_text(),
                Mode::Variable | Mode::Tag => self.scan_expression(),
            }
        }

        if !self.limit_hit {
            let Position { line, column, .. } = self.block_position;
            match self.mode {
                Mode::Variable => self
                    .errors
                    .push(LexerError::UnclosedVariable { line, column }),
                Mode::Tag => self.errors.push(LexerError::UnclosedTag { line, column }),
                Mode::Text => {}
            }
        }

        self.tokens
            .push(Token::eof(self.cursor.line, self.cursor.column));

        LexicalOutput {
            tokens: self.tokens,
            errors: self.errors,
        }
    }

    // === CURSOR ===

    fn rest(&self) -> &'a str {
        &self.input[self.cursor.offset..]
    }

    fn at_end(&self) -> bool {
        self.cursor.offset >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.cursor = self.cursor.advance(ch);
        Some(ch)
    }

    fn bump_str(&mut self, s: &str) {
        self.cursor = self.cursor.advance_str(s);
    }

    fn push(&mut self, kind: TokenKind, value: impl Into<String>, start: Position) {
        if self.limit_hit {
            return;
        }
        if self.tokens.len() >= MAX_TOKEN_COUNT {
            self.limit_hit = true;
            self.errors.push(LexerError::TooManyTokens {
                line: start.line,
                column: start.column,
            });
            return;
        }
        self.tokens.push(Token::new(kind, value, start));
    }

    // === TEXT MODE ===

    fn scan_text(&mut self) {
        let rest = self.rest();
        let next_open = match (rest.find("{{"), rest.find("{%")) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };

        let text_len = next_open.unwrap_or(rest.len());
        if text_len > 0 {
            let start = self.cursor;
            let text = &rest[..text_len];
            self.push(TokenKind::Text, text, start);
            self.bump_str(text);
        }

        if next_open.is_some() {
            self.open_block();
        }
    }

    fn open_block(&mut self) {
        let start = self.cursor;
        let is_variable = self.rest().starts_with("{{");
        self.bump();
        self.bump();

        let mut value = if is_variable { "{{" } else { "{%" }.to_string();
        // `{{-` / `{%-` is accepted, but `{{-1}}` is a negative number
        if self.peek() == Some('-') && !self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            value.push('-');
        }

        self.block_start = self.tokens.len();
        self.block_position = start;
        self.brace_depth = 0;

        if is_variable {
            self.push(TokenKind::VariableStart { trim_left: false }, value, start);
            self.mode = Mode::Variable;
        } else {
            self.push(TokenKind::TagStart { trim_left: false }, value, start);
            self.mode = Mode::Tag;
        }
    }

    fn close_block(&mut self, kind: TokenKind, value: &str, start: Position) {
        self.bump_str(value);
        self.push(kind, value, start);
        self.mode = Mode::Text;
        self.brace_depth = 0;
    }

    // === EXPRESSION MODE ===

    fn scan_expression(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        if self.at_end() {
            return;
        }

        let start = self.cursor;
        let rest = self.rest();

        match self.mode {
            Mode::Variable if self.brace_depth == 0 => {
                for closer in ["-}}", "}}"] {
                    if rest.starts_with(closer) {
                        self.close_block(TokenKind::VariableEnd { trim_right: false }, closer, start);
                        return;
                    }
                }
            }
            Mode::Tag => {
                for closer in ["-%}", "%}"] {
                    if rest.starts_with(closer) {
                        // Tag ends always trim, with or without the `-` marker
                        self.close_block(TokenKind::TagEnd { trim_right: true }, closer, start);
                        return;
                    }
                }
            }
            _ => {}
        }

        if rest.starts_with("{{") || rest.starts_with("{%") {
            self.abandon_block();
            return;
        }

        let Some(ch) = self.peek() else {
            return;
        };

        match ch {
            '}' => self.scan_close_brace(start),
            '{' => {
                self.bump();
                self.brace_depth += 1;
                self.push(TokenKind::LBrace, "{", start);
            }
            '"' | '\'' => self.scan_string(ch, start),
            '%' if self.mode == Mode::Variable && rest.starts_with("%}") => {
                self.bump_str("%}");
                self.errors.push(LexerError::MalformedVariableEnd {
                    line: start.line,
                    column: start.column,
                });
                self.push(TokenKind::VariableEnd { trim_right: false }, "%}", start);
                self.mode = Mode::Text;
                self.brace_depth = 0;
            }
            c if c.is_ascii_digit()
                || (c == '-' && self.peek_nth(1).is_some_and(|n| n.is_ascii_digit())) =>
            {
                self.scan_number(start)
            }
            c if c.is_alphabetic() || c == '_' || c == '@' => self.scan_identifier(start),
            _ => self.scan_operator(ch, start),
        }
    }

    /// A new `{{`/`{%` arrived before the current block closed: drop the
    /// unterminated block and resume in text mode at the new delimiter.
    fn abandon_block(&mut self) {
        let Position { line, column, .. } = self.block_position;
        let error = match self.mode {
            Mode::Variable => LexerError::UnclosedVariable { line, column },
            _ => LexerError::UnclosedTag { line, column },
        };
        self.errors.push(error);
        self.tokens.truncate(self.block_start);
        self.mode = Mode::Text;
        self.brace_depth = 0;
    }

    fn scan_close_brace(&mut self, start: Position) {
        if self.brace_depth > 0 {
            self.bump();
            self.brace_depth -= 1;
            self.push(TokenKind::RBrace, "}", start);
            return;
        }

        let (line, column) = (start.line, start.column);
        if self.mode == Mode::Variable {
            // A lone `}` where `}}` was expected
            self.bump();
            self.errors
                .push(LexerError::MalformedVariableEnd { line, column });
            self.push(TokenKind::VariableEnd { trim_right: false }, "}", start);
        } else {
            let value = if self.rest().starts_with("}}") { "}}" } else { "}" };
            self.bump_str(value);
            self.errors.push(LexerError::MalformedTagEnd { line, column });
            self.push(TokenKind::TagEnd { trim_right: true }, value, start);
        }
        self.mode = Mode::Text;
    }

    /// True at a closer for the current mode or at a new `{{`/`{%`
    fn at_block_boundary(&self) -> bool {
        let rest = self.rest();
        let closers: &[&str] = match self.mode {
            Mode::Variable => &["-}}", "}}"],
            Mode::Tag => &["-%}", "%}"],
            Mode::Text => &[],
        };
        rest.starts_with("{{")
            || rest.starts_with("{%")
            || closers.iter().any(|closer| rest.starts_with(closer))
    }

    fn scan_string(&mut self, quote: char, start: Position) {
        self.bump();
        let mut value = String::new();
        // First delimiter seen inside the string, with the value length at that point
        let mut boundary: Option<(Position, usize)> = None;

        loop {
            if boundary.is_none() && self.at_block_boundary() {
                boundary = Some((self.cursor, value.len()));
            }
            match self.bump() {
                None => {
                    self.errors.push(LexerError::UnclosedString {
                        quote,
                        line: start.line,
                        column: start.column,
                    });
                    // Resume at the delimiter so the rest of the template still tokenizes
                    if let Some((at, len)) = boundary {
                        self.cursor = at;
                        value.truncate(len);
                    }
                    break;
                }
                Some(c) if c == quote => break,
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some(other) => value.push(other),
                    None => value.push('\\'),
                },
                Some(c) => value.push(c),
            }
        }

        self.push(TokenKind::String, value, start);
    }

    fn scan_number(&mut self, start: Position) {
        let mut value = String::new();
        if self.peek() == Some('-') {
            self.bump();
            value.push('-');
        }
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            self.bump();
            value.push(c);
        }
        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            value.push('.');
            while let Some(c) = self.peek().filter(char::is_ascii_digit) {
                self.bump();
                value.push(c);
            }
        }
        self.push(TokenKind::Number, value, start);
    }

    fn scan_identifier(&mut self, start: Position) {
        let begin = self.cursor.offset;
        while let Some(c) = self.peek() {
            let continues = c.is_alphanumeric() || matches!(c, '_' | '@' | '.' | '-');
            if !continues {
                break;
            }
            // `name-}}` ends the block rather than extending the name
            if c == '-' {
                let after = &self.rest()[1..];
                if after.starts_with("}}") || after.starts_with("%}") {
                    break;
                }
            }
            self.bump();
        }
        let word = &self.input[begin..self.cursor.offset];

        if matches!(word, "selector" | "selectorHtml") && self.peek() == Some(':') {
            self.scan_selector_identifier(word, start);
            return;
        }

        let kind = lookup_keyword(word).unwrap_or(TokenKind::Identifier);
        self.push(kind, word, start);
    }

    fn scan_selector_identifier(&mut self, prefix: &str, start: Position) {
        self.bump();
        let body_start = self.cursor;
        let scan = scan_selector(self.rest());

        for issue in &scan.issues {
            let at = body_start.advance_str(&self.rest()[..issue.offset]);
            let (line, column) = (at.line, at.column);
            let error = match issue.kind {
                SelectorIssueKind::UnclosedBracket => {
                    LexerError::UnclosedSelectorBracket { line, column }
                }
                SelectorIssueKind::UnclosedParen => LexerError::UnclosedSelectorParen { line, column },
                SelectorIssueKind::UnclosedQuote(quote) => LexerError::UnclosedSelectorQuote {
                    quote,
                    line,
                    column,
                },
                SelectorIssueKind::UnmatchedBracket => {
                    LexerError::UnmatchedSelectorBracket { line, column }
                }
                SelectorIssueKind::UnmatchedParen => {
                    LexerError::UnmatchedSelectorParen { line, column }
                }
            };
            self.errors.push(error);
        }

        let value = format!("{}:{}", prefix, scan.text);
        let consumed = &self.rest()[..scan.consumed];
        self.bump_str(consumed);
        self.push(TokenKind::Identifier, value, start);
    }

    fn scan_operator(&mut self, ch: char, start: Position) {
        const TWO_CHAR: [(&str, TokenKind); 8] = [
            ("==", TokenKind::Eq),
            ("!=", TokenKind::NotEq),
            (">=", TokenKind::Gte),
            ("<=", TokenKind::Lte),
            ("&&", TokenKind::And),
            ("||", TokenKind::Or),
            ("??", TokenKind::Nullish),
            ("=>", TokenKind::Arrow),
        ];

        let rest = self.rest();
        if let Some((op, kind)) = TWO_CHAR.iter().find(|(op, _)| rest.starts_with(*op)) {
            self.bump_str(op);
            self.push(kind.clone(), *op, start);
            return;
        }

        let kind = match ch {
            '>' => TokenKind::Gt,
            '<' => TokenKind::Lt,
            '!' => TokenKind::Not,
            '=' => TokenKind::Assign,
            '|' => TokenKind::Pipe,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ':' => TokenKind::Colon,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '$' => TokenKind::Dollar,
            _ => {
                self.bump();
                self.errors.push(LexerError::UnexpectedCharacter {
                    character: ch,
                    line: start.line,
                    column: start.column,
                });
                return;
            }
        };
        self.bump();
        self.push(kind, ch.to_string(), start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn lex(input: &str) -> LexicalOutput {
        LexicalAnalyzer::new(input).tokenize()
    }

    fn kinds(output: &LexicalOutput) -> Vec<TokenKind> {
        output.tokens.iter().map(|t| t.kind.clone()).collect()
    }

    fn values(output: &LexicalOutput) -> Vec<&str> {
        output.tokens.iter().map(|t| t.value.as_str()).collect()
    }

    #[test]
    fn test_plain_text() {
        let output = lex("Hello, world!");
        assert_eq!(kinds(&output), vec![TokenKind::Text, TokenKind::Eof]);
        assert_eq!(output.tokens[0].value, "Hello, world!");
        assert!(output.errors.is_empty());
    }

    #[test]
    fn test_variable_with_filter() {
        let output = lex("{{title|lower}}");
        assert_eq!(
            kinds(&output),
            vec![
                TokenKind::VariableStart { trim_left: false },
                TokenKind::Identifier,
                TokenKind::Pipe,
                TokenKind::Identifier,
                TokenKind::VariableEnd { trim_right: false },
                TokenKind::Eof,
            ]
        );
        assert!(output.errors.is_empty());
    }

    #[test]
    fn test_tag_end_always_trims() {
        for input in ["{% if x %}", "{% if x -%}"] {
            let output = lex(input);
            assert_matches!(
                output.tokens[output.tokens.len() - 2].kind,
                TokenKind::TagEnd { trim_right: true }
            );
            assert_matches!(output.tokens[0].kind, TokenKind::TagStart { trim_left: false });
        }
    }

    #[test]
    fn test_positions() {
        let output = lex("ab\n{{ x }}");
        let x = &output.tokens[2];
        assert_eq!(x.value, "x");
        assert_eq!((x.line, x.column), (2, 4));
        let start = &output.tokens[1];
        assert_eq!((start.line, start.column), (2, 1));
    }

    #[test]
    fn test_operators_prefer_two_characters() {
        let output = lex("{{ a == b != c >= d <= e && f || g ?? h => i > j < k ! l = m }}");
        let ops: Vec<TokenKind> = kinds(&output)
            .into_iter()
            .filter(|k| !matches!(k, TokenKind::Identifier))
            .collect();
        assert_eq!(
            ops,
            vec![
                TokenKind::VariableStart { trim_left: false },
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::Gte,
                TokenKind::Lte,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Nullish,
                TokenKind::Arrow,
                TokenKind::Gt,
                TokenKind::Lt,
                TokenKind::Not,
                TokenKind::Assign,
                TokenKind::VariableEnd { trim_right: false },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let output = lex("{% IF a AND not b %}");
        assert_eq!(output.tokens[1].kind, TokenKind::If);
        assert_eq!(output.tokens[1].value, "IF");
        assert_eq!(output.tokens[3].kind, TokenKind::And);
        assert_eq!(output.tokens[4].kind, TokenKind::Not);
    }

    #[test]
    fn test_string_escapes() {
        let output = lex(r#"{{ "a\"b\n\q" }}"#);
        assert_eq!(output.tokens[1].kind, TokenKind::String);
        assert_eq!(output.tokens[1].value, "a\"b\nq");
        assert!(output.errors.is_empty());

        let output = lex("{{ 'single' }}");
        assert_eq!(output.tokens[1].value, "single");
    }

    #[test]
    fn test_numbers() {
        let output = lex("{{ 42 -3.5 1. }}");
        assert_eq!(values(&output)[1..5], ["42", "-3.5", "1", "."]);
        assert_eq!(output.tokens[2].kind, TokenKind::Number);
    }

    #[test]
    fn test_identifier_characters() {
        let output = lex("{{ @type author.name my-var _x }}");
        assert_eq!(
            values(&output)[1..5],
            ["@type", "author.name", "my-var", "_x"]
        );
    }

    #[test]
    fn test_trim_marker_after_identifier() {
        let output = lex("{{ name-}}");
        assert_eq!(output.tokens[1].value, "name");
        assert_eq!(output.tokens[2].value, "-}}");
        assert!(output.errors.is_empty());
    }

    #[test]
    fn test_curly_quotes_are_unexpected() {
        let output = lex("{{ \u{201C}curly quotes\u{201D} }}");
        assert_eq!(output.errors.len(), 2);
        for error in &output.errors {
            assert!(error.to_string().starts_with("Unexpected character"));
        }
    }

    #[test]
    fn test_selector_identifier() {
        let output = lex(r#"{{selector:div[data-type="content"][class*="highlight"]}}"#);
        assert!(output.errors.is_empty());
        assert_eq!(output.tokens.len(), 4);
        assert_eq!(output.tokens[1].kind, TokenKind::Identifier);
        assert_eq!(
            output.tokens[1].value,
            r#"selector:div[data-type="content"][class*="highlight"]"#
        );
    }

    #[test]
    fn test_selector_html_with_filter() {
        let output = lex("{{selectorHtml:article > p|markdown}}");
        assert_eq!(output.tokens[1].value, "selectorHtml:article > p");
        assert_eq!(output.tokens[2].kind, TokenKind::Pipe);
    }

    #[test]
    fn test_selector_error_positions() {
        let output = lex("{{selector:div[x}}");
        assert_matches!(
            output.errors.as_slice(),
            [LexerError::UnclosedSelectorBracket { line: 1, column: 15 }]
        );
        assert_matches!(
            output.tokens[2].kind,
            TokenKind::VariableEnd { trim_right: false }
        );
    }

    #[test]
    fn test_unclosed_string_keeps_partial_value() {
        let output = lex("{% set x = \"unterminated %}");
        assert_matches!(output.errors[0], LexerError::UnclosedString { quote: '"', .. });
        let string = output
            .tokens
            .iter()
            .find(|t| t.kind == TokenKind::String)
            .unwrap();
        assert_eq!(string.value, "unterminated ");
        assert_eq!(output.errors.len(), 1);
        assert_matches!(
            output.tokens[output.tokens.len() - 2].kind,
            TokenKind::TagEnd { trim_right: true }
        );
        assert_eq!(output.tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_unclosed_string_stops_at_variable_end() {
        let output = lex("{{ \"abc }} tail {{ title }}");
        assert_matches!(
            output.errors.as_slice(),
            [LexerError::UnclosedString { quote: '"', line: 1, column: 4 }]
        );
        assert_eq!(
            values(&output),
            vec!["{{", "abc ", "}}", " tail ", "{{", "title", "}}", ""]
        );
        assert_eq!(output.tokens[1].kind, TokenKind::String);
    }

    #[test]
    fn test_unclosed_string_stops_at_new_delimiter() {
        let output = lex("{{ 'abc {{ title }}");
        assert_matches!(
            output.errors.as_slice(),
            [
                LexerError::UnclosedString { quote: '\'', .. },
                LexerError::UnclosedVariable { line: 1, column: 1 }
            ]
        );
        assert_eq!(values(&output), vec!["{{", "title", "}}", ""]);
    }

    #[test]
    fn test_unclosed_string_without_delimiter_runs_to_end() {
        let output = lex("{{ \"open");
        assert_matches!(
            output.errors.as_slice(),
            [LexerError::UnclosedString { .. }, LexerError::UnclosedVariable { .. }]
        );
        assert_eq!(output.tokens[1].value, "open");
    }

    #[test]
    fn test_token_limit() {
        let output = lex(&"{{a}}".repeat(MAX_TOKEN_COUNT / 3 + 1));
        let limit_errors = output
            .errors
            .iter()
            .filter(|e| matches!(e, LexerError::TooManyTokens { .. }))
            .count();
        assert_eq!(limit_errors, 1);
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.tokens.len(), MAX_TOKEN_COUNT + 1);
        assert_eq!(output.tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_lone_brace_is_malformed_variable_end() {
        let output = lex("{{ title } after");
        assert_matches!(output.errors[0], LexerError::MalformedVariableEnd { .. });
        assert_eq!(
            kinds(&output),
            vec![
                TokenKind::VariableStart { trim_left: false },
                TokenKind::Identifier,
                TokenKind::VariableEnd { trim_right: false },
                TokenKind::Text,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_brace_in_tag_is_malformed_tag_end() {
        let output = lex("{% if x }}yes");
        assert_matches!(output.errors[0], LexerError::MalformedTagEnd { .. });
        assert_eq!(output.tokens[3].kind, TokenKind::TagEnd { trim_right: true });
        assert_eq!(output.tokens[4].value, "yes");
    }

    #[test]
    fn test_braces_inside_expression() {
        let output = lex("{{ x|f:({a: 1}) }}");
        assert!(output.errors.is_empty());
        assert!(kinds(&output).contains(&TokenKind::RBrace));
        assert_matches!(
            output.tokens[output.tokens.len() - 2].kind,
            TokenKind::VariableEnd { .. }
        );
    }

    #[test]
    fn test_new_delimiter_truncates_unclosed_block() {
        let output = lex("{{ title {{ author }}");
        assert_matches!(
            output.errors.as_slice(),
            [LexerError::UnclosedVariable { line: 1, column: 1 }]
        );
        assert_eq!(values(&output), vec!["{{", "author", "}}", ""]);
    }

    #[test]
    fn test_end_of_input_inside_tag() {
        let output = lex("{% if x");
        assert_matches!(output.errors.as_slice(), [LexerError::UnclosedTag { .. }]);
        assert_eq!(output.tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_retokenize_is_identical() {
        let input = "{% for a in items %}{{a|upper}} {{ b ?? \"x\" }}{% endfor %}";
        let first = lex(input);
        let second = lex(input);
        assert_eq!(first.tokens, second.tokens);
        assert_eq!(first.errors, second.errors);
    }

    #[test]
    fn test_variable_pairs_balance() {
        let output = lex("a {{ x }} b {{ y|z }} c {{ \"p\" }}");
        let starts = output
            .tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::VariableStart { .. }))
            .count();
        let ends = output
            .tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::VariableEnd { .. }))
            .count();
        assert_eq!((starts, ends), (3, 3));
    }
}
