//! Keyword table for template expressions
//!
//! Keywords are matched case-insensitively: `IF`, `If` and `if` all open a
//! conditional. `true`/`false`/`null` live in the same table so that the
//! tokenizer classifies them in one lookup.
use crate::tokens::TokenKind;

/// Every reserved word, in lowercase
pub const KEYWORDS: &[&str] = &[
    "if", "elseif", "else", "endif", "for", "in", "endfor", "set", "and", "or", "not", "contains",
    "true", "false", "null",
];

/// Look up a word in the keyword table
pub fn lookup_keyword(word: &str) -> Option<TokenKind> {
    let kind = match word.to_ascii_lowercase().as_str() {
        "if" => TokenKind::If,
        "elseif" => TokenKind::ElseIf,
        "else" => TokenKind::Else,
        "endif" => TokenKind::EndIf,
        "for" => TokenKind::For,
        "in" => TokenKind::In,
        "endfor" => TokenKind::EndFor,
        "set" => TokenKind::Set,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "contains" => TokenKind::Contains,
        "true" | "false" => TokenKind::Boolean,
        "null" => TokenKind::Null,
        _ => return None,
    };
    Some(kind)
}

pub fn is_keyword(word: &str) -> bool {
    lookup_keyword(word).is_some()
}

/// Canonical spelling of a keyword kind, used in diagnostics
pub fn keyword_name(kind: &TokenKind) -> Option<&'static str> {
    let name = match kind {
        TokenKind::If => "if",
        TokenKind::ElseIf => "elseif",
        TokenKind::Else => "else",
        TokenKind::EndIf => "endif",
        TokenKind::For => "for",
        TokenKind::In => "in",
        TokenKind::EndFor => "endfor",
        TokenKind::Set => "set",
        TokenKind::And => "and",
        TokenKind::Or => "or",
        TokenKind::Not => "not",
        TokenKind::Contains => "contains",
        TokenKind::Null => "null",
        _ => return None,
    };
    Some(name)
}
