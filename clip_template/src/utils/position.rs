//! Source location tracking
//!
//! Every token, AST node and diagnostic carries a 1-based line/column pair so
//! that template editors can point at the offending character.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based, counted in characters)
    pub column: u32,
}

impl Position {
    /// Create a new position
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Create the starting position (offset 0, line 1, column 1)
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Advance position by one character
    pub fn advance(self, ch: char) -> Self {
        match ch {
            '\n' => Self {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 1,
            },
            _ => Self {
                offset: self.offset + ch.len_utf8(),
                line: self.line,
                column: self.column + 1,
            },
        }
    }

    /// Advance position over a string
    pub fn advance_str(self, s: &str) -> Self {
        s.chars().fold(self, |pos, ch| pos.advance(ch))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_position() {
        let pos = Position::start();
        assert_eq!(pos.offset, 0);
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 1);
    }

    #[test]
    fn test_advance_counts_characters_not_bytes() {
        let pos = Position::start().advance('\u{201C}');
        assert_eq!(pos.offset, 3);
        assert_eq!(pos.column, 2);
    }

    #[test]
    fn test_newline_resets_column() {
        let pos = Position::start().advance_str("ab\ncd");
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 3);
        assert_eq!(pos.offset, 5);
    }

    #[test]
    fn test_display() {
        assert_eq!(Position::new(10, 3, 7).to_string(), "3:7");
    }
}
