//! Token system for template lexical analysis
//!
//! The tokenizer turns template text into a flat stream of [`Token`]s. Each token
//! records its [`TokenKind`], the source text (or unescaped string value) and the
//! 1-based line/column where it starts. Only the four delimiter kinds carry trim
//! flags; the compiler enforces that no other kind can.
//!
//! [`TokenStream`] is the parser's cursor over that stream.

pub mod token;
pub mod token_stream;

pub use token::{Token, TokenKind};
pub use token_stream::TokenStream;
