//! AST node payloads.
//!
//! Every node is plain data: a tag-discriminated payload holding
//! [`StringRef`] handles for text and [`AstRef`] handles for child nodes.
//! Nodes never own other nodes' storage; links resolve only through the
//! arena, and a node is written once during its production rule and never
//! mutated afterwards.

use odal_core::intern::StringRef;
use odal_lexer::{AssignKind, LiteralKind, OperatorKind};

use crate::arena::{AstRef, ExprRef, StmtRef};

// ============================================================================
// Statements
// ============================================================================

/// `;`
#[derive(Debug, Clone)]
pub struct EmptyStmt;

/// `{ stmt; stmt; ... }`
#[derive(Debug, Clone)]
pub struct BlockStmt {
    pub stmts: Vec<StmtRef>,
}

/// `import "path"`
#[derive(Debug, Clone)]
pub struct ImportStmt {
    pub path: StringRef,
}

/// `package name`
#[derive(Debug, Clone)]
pub struct PackageStmt {
    pub name: StringRef,
}

/// `defer stmt`
#[derive(Debug, Clone)]
pub struct DeferStmt {
    pub stmt: StmtRef,
}

/// `break` or `break label`
#[derive(Debug, Clone)]
pub struct BreakStmt {
    pub label: Option<StringRef>,
}

/// `continue` or `continue label`
#[derive(Debug, Clone)]
pub struct ContinueStmt {
    pub label: Option<StringRef>,
}

/// `fallthrough`
#[derive(Debug, Clone)]
pub struct FallthroughStmt;

/// `if init; cond { ... } else ...`
#[derive(Debug, Clone)]
pub struct IfStmt {
    pub init: Option<StmtRef>,
    pub cond: ExprRef,
    pub on_true: StmtRef,
    pub on_false: Option<StmtRef>,
}

/// `names : type = values`, covering `x: int`, `x := 1`, `x :: proc() {}`
/// and struct fields. Struct fields and parameters never carry values.
#[derive(Debug, Clone)]
pub struct DeclStmt {
    pub lhs: Vec<ExprRef>,
    pub ty: Option<AstRef<TypeExpr>>,
    pub values: Option<Vec<ExprRef>>,
}

/// `lhs op= rhs`, with one or more expressions on each side.
#[derive(Debug, Clone)]
pub struct AssignStmt {
    pub lhs: Vec<ExprRef>,
    pub op: AssignKind,
    pub rhs: Vec<ExprRef>,
}

/// A bare expression in statement position.
#[derive(Debug, Clone)]
pub struct ExprStmt {
    pub expr: ExprRef,
}

// ============================================================================
// Expressions
// ============================================================================

/// `lhs op rhs`
#[derive(Debug, Clone)]
pub struct BinExpr {
    pub lhs: ExprRef,
    pub rhs: ExprRef,
    pub op: OperatorKind,
}

/// `op operand` (prefix) or `operand^`/`operand or_return` (postfix).
#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub operand: ExprRef,
    pub op: OperatorKind,
}

/// `cond ? on_true : on_false`
#[derive(Debug, Clone)]
pub struct TernaryExpr {
    pub cond: ExprRef,
    pub on_true: ExprRef,
    pub on_false: ExprRef,
}

/// A name in expression position.
#[derive(Debug, Clone)]
pub struct IdentExpr {
    pub ident: StringRef,
}

/// A literal. The spelling is interned verbatim; decoding the value is
/// semantic analysis' job.
#[derive(Debug, Clone)]
pub struct LiteralExpr {
    pub kind: LiteralKind,
    pub value: StringRef,
}

/// The `---` explicit-uninitialized marker.
#[derive(Debug, Clone)]
pub struct UndefExpr;

/// The implicit `context` reference.
#[derive(Debug, Clone)]
pub struct ContextExpr;

/// `struct { field: type, ... }`
#[derive(Debug, Clone)]
pub struct StructExpr {
    pub fields: Vec<AstRef<DeclStmt>>,
}

/// `proc(params) -> ret { body }`
#[derive(Debug, Clone)]
pub struct ProcExpr {
    pub params: Vec<AstRef<DeclStmt>>,
    pub ret: Option<AstRef<TypeExpr>>,
    pub body: AstRef<BlockStmt>,
}

/// An expression used in type position.
#[derive(Debug, Clone)]
pub struct TypeExpr {
    pub expr: ExprRef,
}
