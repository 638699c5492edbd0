//! Token and token kind definitions

use crate::utils::Position;
use serde::Serialize;
use std::fmt;

/// Closed enumeration of token types.
///
/// Serializes with a `type` tag (`variable_start`, `identifier`, ...) and, for the
/// delimiter variants, a `trimLeft`/`trimRight` flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TokenKind {
    // === STRUCTURE ===
    Text,
    VariableStart {
        #[serde(rename = "trimLeft")]
        trim_left: bool,
    },
    VariableEnd {
        #[serde(rename = "trimRight")]
        trim_right: bool,
    },
    TagStart {
        #[serde(rename = "trimLeft")]
        trim_left: bool,
    },
    TagEnd {
        #[serde(rename = "trimRight")]
        trim_right: bool,
    },

    // === LITERALS AND NAMES ===
    Identifier,
    String,
    Number,
    Boolean,
    Null,

    // === KEYWORDS ===
    If,
    #[serde(rename = "elseif")]
    ElseIf,
    Else,
    #[serde(rename = "endif")]
    EndIf,
    For,
    In,
    #[serde(rename = "endfor")]
    EndFor,
    Set,
    And,
    Or,
    Not,
    Contains,

    // === OPERATORS ===
    #[serde(rename = "eq")]
    Eq,
    #[serde(rename = "neq")]
    NotEq,
    Gt,
    Lt,
    Gte,
    Lte,
    Nullish,
    Arrow,
    Assign,
    Pipe,

    // === PUNCTUATION ===
    #[serde(rename = "lparen")]
    LParen,
    #[serde(rename = "rparen")]
    RParen,
    #[serde(rename = "lbracket")]
    LBracket,
    #[serde(rename = "rbracket")]
    RBracket,
    #[serde(rename = "lbrace")]
    LBrace,
    #[serde(rename = "rbrace")]
    RBrace,
    Colon,
    Comma,
    Dot,
    Star,
    Slash,
    Dollar,

    Eof,
}

impl TokenKind {
    /// Keyword kinds, plus `true`/`false`/`null`, spelled as plain words
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::If
                | TokenKind::ElseIf
                | TokenKind::Else
                | TokenKind::EndIf
                | TokenKind::For
                | TokenKind::In
                | TokenKind::EndFor
                | TokenKind::Set
                | TokenKind::And
                | TokenKind::Or
                | TokenKind::Not
                | TokenKind::Contains
                | TokenKind::Boolean
                | TokenKind::Null
        )
    }

    /// Tokens that can only appear between template regions, never inside one
    pub fn is_region_boundary(&self) -> bool {
        matches!(
            self,
            TokenKind::Text
                | TokenKind::VariableStart { .. }
                | TokenKind::TagStart { .. }
                | TokenKind::Eof
        )
    }
}

/// A token with its source text and start position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    #[serde(flatten)]
    pub kind: TokenKind,
    pub value: String,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            value: value.into(),
            line: position.line,
            column: position.column,
        }
    }

    pub fn eof(line: u32, column: u32) -> Self {
        Self {
            kind: TokenKind::Eof,
            value: String::new(),
            line,
            column,
        }
    }

    /// Identifiers, numbers and keyword spellings; the pieces of a compound name
    pub fn is_word(&self) -> bool {
        matches!(self.kind, TokenKind::Identifier | TokenKind::Number) || self.kind.is_keyword()
    }

    /// Short description used in "found ..." messages
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Text => "text".to_string(),
            TokenKind::String => format!("string \"{}\"", self.value),
            _ => format!("'{}'", self.value),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}", self.describe(), self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiter_serialization() {
        let token = Token::new(
            TokenKind::TagEnd { trim_right: true },
            "%}",
            Position::new(5, 1, 6),
        );
        let json = serde_json::to_value(&token).unwrap();

        assert_eq!(json["type"], "tag_end");
        assert_eq!(json["trimRight"], true);
        assert_eq!(json["value"], "%}");
        assert_eq!(json["line"], 1);
        assert_eq!(json["column"], 6);
    }

    #[test]
    fn test_plain_kind_has_no_trim_fields() {
        let token = Token::new(TokenKind::Identifier, "title", Position::start());
        let json = serde_json::to_value(&token).unwrap();

        assert_eq!(json["type"], "identifier");
        assert!(json.get("trimLeft").is_none());
        assert!(json.get("trimRight").is_none());
    }

    #[test]
    fn test_keyword_type_names() {
        let names: Vec<String> = [
            TokenKind::ElseIf,
            TokenKind::EndIf,
            TokenKind::EndFor,
            TokenKind::NotEq,
            TokenKind::LParen,
            TokenKind::Nullish,
        ]
        .into_iter()
        .map(|kind| {
            let token = Token::new(kind, "", Position::start());
            serde_json::to_value(&token).unwrap()["type"]
                .as_str()
                .unwrap()
                .to_string()
        })
        .collect();

        assert_eq!(
            names,
            vec!["elseif", "endif", "endfor", "neq", "lparen", "nullish"]
        );
    }

    #[test]
    fn test_word_classification() {
        let position = Position::start();
        assert!(Token::new(TokenKind::Identifier, "a", position).is_word());
        assert!(Token::new(TokenKind::In, "in", position).is_word());
        assert!(Token::new(TokenKind::Number, "3", position).is_word());
        assert!(!Token::new(TokenKind::Colon, ":", position).is_word());
    }

    #[test]
    fn test_describe() {
        assert_eq!(Token::eof(1, 1).describe(), "end of input");
        assert_eq!(
            Token::new(TokenKind::Pipe, "|", Position::start()).describe(),
            "'|'"
        );
    }
}
