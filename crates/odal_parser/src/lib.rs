//! odal_parser: Recursive-descent parser for the Odal language.
//!
//! Consumes the lexer's single-lookahead token stream and builds the AST
//! in a type-partitioned arena. Expressions are parsed by precedence
//! climbing; the condition-versus-composite-literal ambiguity is resolved
//! with a threaded expression level and left-hand-side mode. The first
//! grammar violation aborts the parse with one positioned diagnostic.

pub mod parser;
pub mod precedence;

pub use parser::{parse_module, ModuleParse, ParseFailed, Parser};
