//! odal_ast: AST storage and node definitions for the Odal front end.
//!
//! Nodes live in a type-partitioned slab arena ([`arena::Ast`]) and refer
//! to each other through compact 32-bit typed handles ([`arena::AstRef`]).
//! The arena also owns the string intern table, so the node storage and
//! the text it references always share one lifetime.

pub mod arena;
pub mod dump;
pub mod kind;
pub mod node;

pub use arena::{AnyExpr, AnyStmt, Ast, AstId, AstNode, AstRef, Expr, ExprNode, ExprRef, Stmt,
    StmtNode, StmtRef};
pub use kind::NodeKind;
pub use node::*;
