//! Parser cursor over a token vector
//!
//! The stream always ends with an `Eof` token, so `current()` never fails and
//! advancing past the end is a no-op.

use crate::tokens::token::{Token, TokenKind};

#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    position: usize,
}

impl TokenStream {
    /// Create a stream, appending an `Eof` token if the input lacks one
    pub fn new(mut tokens: Vec<Token>) -> Self {
        let needs_eof = !matches!(tokens.last(), Some(token) if token.kind == TokenKind::Eof);
        if needs_eof {
            let (line, column) = tokens
                .last()
                .map(|t| (t.line, t.column))
                .unwrap_or((1, 1));
            tokens.push(Token::eof(line, column));
        }

        Self {
            tokens,
            position: 0,
        }
    }

    /// The current token
    pub fn current(&self) -> &Token {
        self.peek_ahead(0)
    }

    /// The current token's kind
    pub fn kind(&self) -> &TokenKind {
        &self.current().kind
    }

    /// Peek ahead by n positions, clamped to the trailing `Eof`
    pub fn peek_ahead(&self, n: usize) -> &Token {
        let index = (self.position + n).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// Return the current token and move past it (never past `Eof`)
    pub fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        token
    }

    /// Check the current token kind
    pub fn check(&self, kind: &TokenKind) -> bool {
        self.kind() == kind
    }

    /// Advance if the current token has the given kind
    pub fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.check(&TokenKind::Eof)
    }

    /// Save the cursor for a later `restore`
    pub fn position(&self) -> usize {
        self.position
    }

    /// Restore a cursor obtained from `position`
    pub fn restore(&mut self, position: usize) {
        self.position = position.min(self.tokens.len() - 1);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.len() <= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    fn ident(name: &str, column: u32) -> Token {
        Token::new(
            TokenKind::Identifier,
            name,
            Position::new(column as usize - 1, 1, column),
        )
    }

    #[test]
    fn test_appends_eof() {
        let stream = TokenStream::new(vec![ident("a", 1)]);
        assert_eq!(stream.len(), 2);
        assert_eq!(stream.peek_ahead(1).kind, TokenKind::Eof);
    }

    #[test]
    fn test_empty_stream() {
        let mut stream = TokenStream::new(Vec::new());
        assert!(stream.is_empty());
        assert!(stream.is_at_end());
        stream.advance();
        assert!(stream.is_at_end());
    }

    #[test]
    fn test_advance_stops_at_eof() {
        let mut stream = TokenStream::new(vec![ident("a", 1), ident("b", 3)]);
        assert_eq!(stream.advance().value, "a");
        assert_eq!(stream.advance().value, "b");
        assert!(stream.is_at_end());
        stream.advance();
        assert!(stream.is_at_end());
        assert_eq!(stream.peek_ahead(5).kind, TokenKind::Eof);
    }

    #[test]
    fn test_save_and_restore() {
        let mut stream = TokenStream::new(vec![ident("a", 1), ident("b", 3), ident("c", 5)]);
        let saved = stream.position();
        stream.advance();
        stream.advance();
        assert_eq!(stream.current().value, "c");
        stream.restore(saved);
        assert_eq!(stream.current().value, "a");
    }

    #[test]
    fn test_consume() {
        let mut stream = TokenStream::new(vec![ident("a", 1)]);
        assert!(!stream.consume(&TokenKind::Pipe));
        assert!(stream.consume(&TokenKind::Identifier));
        assert!(stream.is_at_end());
    }
}
