//! odal_lexer: Tokenizer for the Odal language.
//!
//! Converts source text into a pull-based token stream with Odin-style
//! automatic semicolon insertion. The parser consumes exactly one token
//! of lookahead and never pushes tokens back.

pub mod lexer;
pub mod token;

pub use lexer::Lexer;
pub use token::{
    AssignKind, KeywordKind, LiteralKind, OperatorKind, Token, TokenFlags, TokenKind,
};
