//! The Odal parser.
//!
//! A recursive-descent parser over the lexer's single-lookahead token
//! stream. Every production either fully succeeds with a valid reference
//! or fails with `None` after emitting one positioned diagnostic; there
//! is no recovery and no partial tree. Arena or intern-table exhaustion
//! is reported the same way, as an out-of-memory diagnostic.

use thiserror::Error;

use odal_ast::{
    AssignStmt, Ast, AstNode, AstRef, BinExpr, BlockStmt, BreakStmt, ContextExpr, ContinueStmt,
    DeclStmt, DeferStmt, EmptyStmt, ExprRef, ExprStmt, FallthroughStmt, IdentExpr, IfStmt,
    ImportStmt, LiteralExpr, NodeKind, PackageStmt, ProcExpr, StmtRef, StructExpr, TernaryExpr,
    TypeExpr, UnaryExpr, UndefExpr,
};
use odal_core::intern::StringRef;
use odal_diagnostics::{Diagnostic, DiagnosticCollection};
use odal_lexer::{AssignKind, KeywordKind, Lexer, LiteralKind, OperatorKind, Token, TokenKind};

use crate::precedence::binary_precedence;

/// A successfully parsed translation unit: the root statement list plus
/// the arena (which owns the intern table) it lives in.
pub struct ModuleParse {
    pub ast: Ast,
    pub stmts: Vec<StmtRef>,
}

impl core::fmt::Debug for ModuleParse {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ModuleParse")
            .field("stmts", &self.stmts.len())
            .finish_non_exhaustive()
    }
}

/// The parse aborted on its first grammar violation or on resource
/// exhaustion. The diagnostics hold the positioned error.
#[derive(Debug, Error)]
#[error("parsing failed with {} error(s)", .diagnostics.len())]
pub struct ParseFailed {
    pub diagnostics: DiagnosticCollection,
}

/// Parse one translation unit.
pub fn parse_module(file_name: &str, text: &str) -> Result<ModuleParse, ParseFailed> {
    let mut parser = Parser::new(file_name, text);
    match parser.parse_translation_unit() {
        Some(stmts) => Ok(ModuleParse {
            ast: parser.into_ast(),
            stmts,
        }),
        None => Err(ParseFailed {
            diagnostics: parser.take_diagnostics(),
        }),
    }
}

/// The parser holds exactly one lookahead token and exclusive ownership
/// of the arena it is filling.
pub struct Parser<'a> {
    file_name: String,
    lexer: Lexer<'a>,
    token: Token,
    ast: Ast,
    diagnostics: DiagnosticCollection,
    /// Negative while parsing a control-clause header, where a following
    /// brace must be a block rather than a composite literal.
    expr_level: i32,
    /// Whether `in`-style clauses are currently allowed; saved and
    /// restored together with `expr_level` around control headers.
    allow_in_expr: bool,
    /// Set when a production consumed the newline-synthesized semicolon
    /// that terminates the current statement (an `if` probing for `else`).
    terminator_consumed: bool,
}

impl<'a> Parser<'a> {
    pub fn new(file_name: &str, text: &'a str) -> Self {
        let mut lexer = Lexer::new(text);
        let token = lexer.next();
        Self {
            file_name: file_name.to_string(),
            lexer,
            token,
            ast: Ast::new(),
            diagnostics: DiagnosticCollection::new(),
            expr_level: 0,
            allow_in_expr: true,
            terminator_consumed: false,
        }
    }

    /// Parse statements until end of input. `None` aborts the unit.
    pub fn parse_translation_unit(&mut self) -> Option<Vec<StmtRef>> {
        let mut stmts = Vec::new();
        while !self.is_kind(TokenKind::EndOfFile) {
            stmts.push(self.parse_stmt()?);
        }
        Some(stmts)
    }

    /// The arena built so far.
    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn into_ast(self) -> Ast {
        self.ast
    }

    pub fn take_diagnostics(self) -> DiagnosticCollection {
        self.diagnostics
    }

    // ========================================================================
    // Token helpers
    // ========================================================================

    #[inline]
    fn is_kind(&self, kind: TokenKind) -> bool {
        self.token.kind == kind
    }

    #[inline]
    fn is_keyword(&self, kind: KeywordKind) -> bool {
        self.token.kind == TokenKind::Keyword(kind)
    }

    #[inline]
    fn is_operator(&self, kind: OperatorKind) -> bool {
        self.token.kind == TokenKind::Operator(kind)
    }

    #[inline]
    fn is_literal(&self, kind: LiteralKind) -> bool {
        self.token.kind == TokenKind::Literal(kind)
    }

    #[inline]
    fn is_assignment(&self) -> bool {
        matches!(self.token.kind, TokenKind::Assignment(_))
    }

    fn eat(&mut self) {
        self.token = self.lexer.next();
    }

    fn error(&mut self, message: impl Into<String>) {
        let position = self.lexer.position_of(&self.token);
        self.diagnostics
            .add(Diagnostic::new(self.file_name.clone(), position, message));
    }

    /// Arena construction with exhaustion reported as out of memory.
    fn create<T: AstNode>(&mut self, node: T) -> Option<AstRef<T>> {
        let created = self.ast.create(node);
        if created.is_none() {
            self.error("Out of memory");
        }
        created
    }

    /// Interning with exhaustion reported as out of memory.
    fn intern(&mut self, text: &str) -> Option<StringRef> {
        let interned = self.ast.insert(text);
        if interned.is_none() {
            self.error("Out of memory");
        }
        interned
    }

    /// Consume the current identifier token and return its text.
    fn parse_ident(&mut self) -> &'a str {
        let text = self.lexer.text_of(&self.token);
        self.eat(); // Eat <ident>
        text
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// One statement including its `;` terminator. Block and empty
    /// statements carry their own ending and do not take a terminator.
    fn parse_stmt(&mut self) -> Option<StmtRef> {
        self.terminator_consumed = false;
        let stmt = self.parse_stmt_no_terminator()?;
        if matches!(stmt.kind(), NodeKind::EmptyStmt | NodeKind::BlockStmt) {
            return Some(stmt);
        }
        if self.terminator_consumed {
            return Some(stmt);
        }
        if self.is_kind(TokenKind::Semicolon) {
            self.eat(); // Eat ';'
            // A nested statement's terminator (a `do` branch) also ends
            // the statement that contains it.
            self.terminator_consumed = true;
            return Some(stmt);
        }
        if self.is_kind(TokenKind::EndOfFile) {
            return Some(stmt);
        }
        self.error("Expected ';' or newline after statement");
        None
    }

    /// Statement dispatch on the current token. Anything that is not a
    /// statement keyword falls through to a simple statement.
    fn parse_stmt_no_terminator(&mut self) -> Option<StmtRef> {
        if self.is_kind(TokenKind::Semicolon) {
            return self.parse_empty_stmt().map(Into::into);
        } else if self.is_kind(TokenKind::LeftBrace) {
            return self.parse_block_stmt().map(Into::into);
        } else if self.is_keyword(KeywordKind::Package) {
            return self.parse_package_stmt().map(Into::into);
        } else if self.is_keyword(KeywordKind::Import) {
            return self.parse_import_stmt().map(Into::into);
        } else if self.is_keyword(KeywordKind::Defer) {
            return self.parse_defer_stmt().map(Into::into);
        } else if self.is_keyword(KeywordKind::Break) {
            return self.parse_break_stmt().map(Into::into);
        } else if self.is_keyword(KeywordKind::Continue) {
            return self.parse_continue_stmt().map(Into::into);
        } else if self.is_keyword(KeywordKind::Fallthrough) {
            return self.parse_fallthrough_stmt().map(Into::into);
        } else if self.is_keyword(KeywordKind::If) {
            return self.parse_if_stmt().map(Into::into);
        }
        self.parse_simple_stmt()
    }

    fn parse_empty_stmt(&mut self) -> Option<AstRef<EmptyStmt>> {
        if !self.is_kind(TokenKind::Semicolon) {
            self.error("Expected ';' (or newline)");
            return None;
        }
        self.eat(); // Eat ';'
        self.create(EmptyStmt)
    }

    fn parse_block_stmt(&mut self) -> Option<AstRef<BlockStmt>> {
        if !self.is_kind(TokenKind::LeftBrace) {
            self.error("Expected '{'");
            return None;
        }
        self.eat(); // Eat '{'
        let mut stmts = Vec::new();
        while !self.is_kind(TokenKind::RightBrace) && !self.is_kind(TokenKind::EndOfFile) {
            stmts.push(self.parse_stmt()?);
        }
        if !self.is_kind(TokenKind::RightBrace) {
            self.error("Expected '}'");
            return None;
        }
        self.eat(); // Eat '}'
        // Terminators consumed by the block's children are internal to it.
        self.terminator_consumed = false;
        self.create(BlockStmt { stmts })
    }

    fn parse_package_stmt(&mut self) -> Option<AstRef<PackageStmt>> {
        self.eat(); // Eat 'package'
        if self.is_kind(TokenKind::Identifier) {
            let ident = self.parse_ident();
            let name = self.intern(ident)?;
            return self.create(PackageStmt { name });
        }
        self.error("Expected identifier for package");
        None
    }

    fn parse_import_stmt(&mut self) -> Option<AstRef<ImportStmt>> {
        self.eat(); // Eat 'import'
        if self.is_literal(LiteralKind::String) {
            let value = self.lexer.string_value(&self.token);
            self.eat(); // Eat ""
            let path = self.intern(value)?;
            return self.create(ImportStmt { path });
        }
        self.error("Expected string literal for import path");
        None
    }

    fn parse_break_stmt(&mut self) -> Option<AstRef<BreakStmt>> {
        self.eat(); // Eat 'break'
        let mut label = None;
        if self.is_kind(TokenKind::Identifier) {
            let ident = self.parse_ident();
            label = Some(self.intern(ident)?);
        }
        self.create(BreakStmt { label })
    }

    fn parse_continue_stmt(&mut self) -> Option<AstRef<ContinueStmt>> {
        self.eat(); // Eat 'continue'
        let mut label = None;
        if self.is_kind(TokenKind::Identifier) {
            let ident = self.parse_ident();
            label = Some(self.intern(ident)?);
        }
        self.create(ContinueStmt { label })
    }

    fn parse_fallthrough_stmt(&mut self) -> Option<AstRef<FallthroughStmt>> {
        self.eat(); // Eat 'fallthrough'
        self.create(FallthroughStmt)
    }

    fn parse_defer_stmt(&mut self) -> Option<AstRef<DeferStmt>> {
        self.eat(); // Eat 'defer'
        let stmt = self.parse_stmt_no_terminator()?;
        match stmt.kind() {
            NodeKind::EmptyStmt => {
                self.error("Empty statement after defer (e.g. ';')");
                None
            }
            NodeKind::DeferStmt => {
                self.error("Cannot defer a defer statement");
                None
            }
            _ => self.create(DeferStmt { stmt }),
        }
    }

    fn parse_if_stmt(&mut self) -> Option<AstRef<IfStmt>> {
        self.eat(); // Eat 'if'

        // Inside the header a brace must start the body block, never a
        // composite literal; both context values are restored before the
        // branches are parsed.
        let saved_level = std::mem::replace(&mut self.expr_level, -1);
        let saved_allow_in = std::mem::replace(&mut self.allow_in_expr, true);
        let header = self.parse_if_header();
        self.expr_level = saved_level;
        self.allow_in_expr = saved_allow_in;
        let (init, cond) = header?;

        let on_true: StmtRef = if self.is_keyword(KeywordKind::Do) {
            self.eat(); // Eat 'do'
            self.parse_stmt()?
        } else {
            self.parse_block_stmt()?.into()
        };

        let mut on_false: Option<StmtRef> = None;
        self.skip_possible_newline_for_literal();
        if self.is_keyword(KeywordKind::Else) {
            // The skipped newline separated the body from `else`; the
            // statement is not terminated yet.
            self.terminator_consumed = false;
            self.eat(); // Eat 'else'
            if self.is_keyword(KeywordKind::If) {
                on_false = Some(self.parse_if_stmt()?.into());
            } else if self.is_kind(TokenKind::LeftBrace) {
                on_false = Some(self.parse_block_stmt()?.into());
            } else if self.is_keyword(KeywordKind::Do) {
                self.eat(); // Eat 'do'
                on_false = Some(self.parse_stmt()?);
            } else {
                self.error("Expected a block or 'do' after 'else'");
                return None;
            }
        }

        self.create(IfStmt {
            init,
            cond,
            on_true,
            on_false,
        })
    }

    /// The `if` header: an optional init simple-statement and the
    /// condition. With no `;` after the simple statement, the statement
    /// itself must reduce to a bare expression, which becomes the
    /// condition.
    fn parse_if_header(&mut self) -> Option<(Option<StmtRef>, ExprRef)> {
        if self.is_kind(TokenKind::Semicolon) {
            self.eat(); // Eat ';'
            let cond = self.parse_expr(false)?;
            return Some((None, cond));
        }
        let init = self.parse_simple_stmt()?;
        if self.is_kind(TokenKind::Semicolon) {
            self.eat(); // Eat ';'
            let cond = self.parse_expr(false)?;
            return Some((Some(init), cond));
        }
        match init.downcast::<ExprStmt>() {
            Some(expr_stmt) => {
                let cond = self.ast[expr_stmt].expr;
                Some((None, cond))
            }
            None => {
                self.error("Expected a boolean expression");
                None
            }
        }
    }

    /// Consume a newline-synthesized semicolon so a following `else` (or
    /// similar continuation) can be seen. If nothing continues the
    /// statement, the consumed semicolon counts as its terminator.
    fn skip_possible_newline_for_literal(&mut self) {
        if self.is_kind(TokenKind::Semicolon) && self.token.is_from_newline() {
            self.eat();
            self.terminator_consumed = true;
        }
    }

    /// Declaration, assignment, or bare expression statement, decided by
    /// what follows the left-hand-side expression list.
    fn parse_simple_stmt(&mut self) -> Option<StmtRef> {
        let lhs = self.parse_expr_list(true)?;
        if self.is_operator(OperatorKind::Colon) {
            self.eat(); // Eat ':'
            let ty = if self.is_assignment_eq() || self.is_operator(OperatorKind::Colon) {
                None
            } else {
                Some(self.parse_type_expr()?)
            };
            let values = if self.is_assignment_eq() || self.is_operator(OperatorKind::Colon) {
                self.eat(); // Eat '=' or ':'
                Some(self.parse_expr_list(false)?)
            } else {
                None
            };
            return self.create(DeclStmt { lhs, ty, values }).map(Into::into);
        } else if self.is_assignment() {
            let TokenKind::Assignment(op) = self.token.kind else {
                unreachable!();
            };
            self.eat(); // Eat the assignment operator
            let rhs = self.parse_expr_list(false)?;
            return self.create(AssignStmt { lhs, op, rhs }).map(Into::into);
        }
        if lhs.len() != 1 {
            self.error("Expected 1 expression");
            return None;
        }
        self.create(ExprStmt { expr: lhs[0] }).map(Into::into)
    }

    #[inline]
    fn is_assignment_eq(&self) -> bool {
        self.token.kind == TokenKind::Assignment(AssignKind::Eq)
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn parse_expr_list(&mut self, lhs: bool) -> Option<Vec<ExprRef>> {
        let mut exprs = Vec::new();
        loop {
            exprs.push(self.parse_expr(lhs)?);
            if !self.is_kind(TokenKind::Comma) {
                break;
            }
            self.eat(); // Eat ','
        }
        Some(exprs)
    }

    fn parse_expr(&mut self, lhs: bool) -> Option<ExprRef> {
        self.parse_bin_expr(lhs, 1)
    }

    /// Precedence climbing. The ternary `?` is folded inline; ordinary
    /// binary operators recurse with `prec + 1`, which yields left
    /// associativity at equal precedence.
    fn parse_bin_expr(&mut self, mut lhs: bool, prec: u32) -> Option<ExprRef> {
        let mut expr = self.parse_unary_expr(lhs)?;
        loop {
            let TokenKind::Operator(op) = self.token.kind else {
                break;
            };
            if binary_precedence(op) < prec {
                // Stop climbing, found the correct precedence.
                break;
            }
            if op == OperatorKind::Question {
                self.eat(); // Eat '?'
                let on_true = self.parse_expr(lhs)?;
                if !self.is_operator(OperatorKind::Colon) {
                    self.error("Expected ':' after ternary condition");
                    return None;
                }
                self.eat(); // Eat ':'
                let on_false = self.parse_expr(lhs)?;
                expr = self
                    .create(TernaryExpr {
                        cond: expr,
                        on_true,
                        on_false,
                    })?
                    .into();
            } else {
                self.eat(); // Eat the operator
                let rhs = self.parse_bin_expr(false, binary_precedence(op) + 1)?;
                expr = self
                    .create(BinExpr {
                        lhs: expr,
                        rhs,
                        op,
                    })?
                    .into();
            }
            lhs = false;
        }
        Some(expr)
    }

    /// Prefix operators, then an operand, then the postfix loop.
    fn parse_unary_expr(&mut self, lhs: bool) -> Option<ExprRef> {
        use OperatorKind::*;
        if self.is_operator(Transmute) || self.is_operator(Cast) {
            self.eat(); // Eat 'transmute' or 'cast'
            if !self.is_operator(LParen) {
                self.error("Expected '(' after cast");
                return None;
            }
            self.eat(); // Eat '('
            let _target = self.parse_type_expr()?;
            if !self.is_operator(RParen) {
                self.error("Expected ')' after cast");
                return None;
            }
            self.eat(); // Eat ')'
            // No cast node in the catalog; the operand passes through.
            return self.parse_unary_expr(lhs);
        } else if self.is_operator(AutoCast) {
            self.eat(); // Eat 'auto_cast'
            return self.parse_unary_expr(lhs);
        } else if self.is_operator(Add)
            || self.is_operator(Sub)
            || self.is_operator(Xor)
            || self.is_operator(And)
            || self.is_operator(Not)
            || self.is_operator(Mul)
        {
            let TokenKind::Operator(op) = self.token.kind else {
                unreachable!();
            };
            self.eat(); // Eat the prefix operator
            let expr = self.parse_unary_expr(lhs)?;
            return self.create(UnaryExpr { operand: expr, op }).map(Into::into);
        } else if self.is_operator(Period) {
            // Implicit selector form: the leading '.' is consumed and the
            // selector parses as a bare identifier operand.
            self.eat(); // Eat '.'
        }
        let operand = self.parse_operand(lhs)?;
        self.parse_unary_atom(operand, lhs)
    }

    /// The postfix loop: call application, member and arrow access,
    /// indexing, dereference, `or_*` markers, and composite literals.
    ///
    /// Dereference and the `or_*` markers fold into unary nodes; the call,
    /// member, arrow, and index forms are consumed and leave the operand
    /// unchanged — the node catalog is closed and semantic analysis does
    /// not consume them yet. A brace starts a composite literal unless
    /// this is a left-hand side or a control-clause header.
    fn parse_unary_atom(&mut self, operand: ExprRef, mut lhs: bool) -> Option<ExprRef> {
        use OperatorKind::*;
        let mut expr = operand;
        loop {
            if self.is_operator(LParen) {
                // operand(...)
                self.eat(); // Eat '('
                let saved_level = std::mem::replace(&mut self.expr_level, 0);
                let args = if self.is_operator(RParen) {
                    Some(Vec::new())
                } else {
                    self.parse_expr_list(false)
                };
                self.expr_level = saved_level;
                args?;
                if !self.is_operator(RParen) {
                    self.error("Expected ')'");
                    return None;
                }
                self.eat(); // Eat ')'
            } else if self.is_operator(Period) {
                // operand.expr
                self.eat(); // Eat '.'
                if !self.is_kind(TokenKind::Identifier) {
                    self.error("Expected identifier after '.'");
                    return None;
                }
                self.parse_ident();
            } else if self.is_operator(Arrow) {
                // operand->expr
                self.eat(); // Eat '->'
                if !self.is_kind(TokenKind::Identifier) {
                    self.error("Expected identifier after '->'");
                    return None;
                }
                self.parse_ident();
            } else if self.is_operator(LBracket) {
                // operand[a], operand[:], operand[a:b], operand[a..=b], ...
                self.parse_index_suffix()?;
            } else if self.is_operator(Pointer) {
                // operand^
                self.eat(); // Eat '^'
                expr = self
                    .create(UnaryExpr {
                        operand: expr,
                        op: Pointer,
                    })?
                    .into();
            } else if self.is_operator(OrReturn) {
                self.eat(); // Eat 'or_return'
                expr = self
                    .create(UnaryExpr {
                        operand: expr,
                        op: OrReturn,
                    })?
                    .into();
            } else if self.is_operator(OrBreak) {
                self.eat(); // Eat 'or_break'
                expr = self
                    .create(UnaryExpr {
                        operand: expr,
                        op: OrBreak,
                    })?
                    .into();
            } else if self.is_operator(OrContinue) {
                self.eat(); // Eat 'or_continue'
                expr = self
                    .create(UnaryExpr {
                        operand: expr,
                        op: OrContinue,
                    })?
                    .into();
            } else if self.is_kind(TokenKind::LeftBrace) {
                // operand { ... } — a composite literal, unless this is a
                // left-hand side or a control-clause header.
                if lhs || self.expr_level < 0 {
                    break;
                }
                self.parse_composite_body()?;
            } else {
                break;
            }
            lhs = false;
        }
        Some(expr)
    }

    /// Consume a bracketed index or slice suffix.
    fn parse_index_suffix(&mut self) -> Option<()> {
        use OperatorKind::*;
        self.eat(); // Eat '['
        let saved_level = std::mem::replace(&mut self.expr_level, 0);
        let consumed = loop {
            if self.is_operator(RBracket) {
                break Some(());
            }
            if self.is_kind(TokenKind::EndOfFile) {
                self.error("Expected ']'");
                break None;
            }
            if self.is_operator(Colon)
                || self.is_operator(Ellipsis)
                || self.is_operator(RangeIncl)
                || self.is_operator(RangeExcl)
                || self.is_operator(Question)
                || self.is_kind(TokenKind::Comma)
            {
                self.eat();
                continue;
            }
            if self.parse_expr(false).is_none() {
                break None;
            }
        };
        self.expr_level = saved_level;
        consumed?;
        self.eat(); // Eat ']'
        Some(())
    }

    /// Consume a composite literal body `{ ... }`. The elements are
    /// parsed and discarded; only the brace-versus-block decision matters
    /// at this layer.
    fn parse_composite_body(&mut self) -> Option<()> {
        self.eat(); // Eat '{'
        while !self.is_kind(TokenKind::RightBrace) {
            if self.is_kind(TokenKind::EndOfFile) {
                self.error("Expected '}'");
                return None;
            }
            if self.is_kind(TokenKind::Comma) || self.is_assignment_eq() {
                self.eat();
                continue;
            }
            self.parse_expr(false)?;
        }
        self.eat(); // Eat '}'
        Some(())
    }

    // ========================================================================
    // Operands
    // ========================================================================

    fn parse_operand(&mut self, _lhs: bool) -> Option<ExprRef> {
        if self.is_kind(TokenKind::Identifier) {
            return self.parse_ident_expr().map(Into::into);
        } else if matches!(self.token.kind, TokenKind::Literal(_)) {
            return self.parse_literal_expr().map(Into::into);
        } else if self.is_kind(TokenKind::Undefined) {
            return self.parse_undef_expr().map(Into::into);
        } else if self.is_keyword(KeywordKind::Context) {
            return self.parse_context_expr().map(Into::into);
        } else if self.is_keyword(KeywordKind::Struct) {
            return self.parse_struct_expr().map(Into::into);
        } else if self.is_keyword(KeywordKind::Proc) {
            return self.parse_proc_expr().map(Into::into);
        } else if self.is_operator(OperatorKind::LParen) {
            self.eat(); // Eat '('
            // Parenthesizing re-enters plain expression context, where a
            // brace is a composite literal again.
            let saved_level = std::mem::replace(&mut self.expr_level, 0);
            let inner = self.parse_expr(false);
            self.expr_level = saved_level;
            let inner = inner?;
            if !self.is_operator(OperatorKind::RParen) {
                self.error("Expected ')'");
                return None;
            }
            self.eat(); // Eat ')'
            return Some(inner);
        }
        self.error("Expected an expression");
        None
    }

    fn parse_ident_expr(&mut self) -> Option<AstRef<IdentExpr>> {
        if !self.is_kind(TokenKind::Identifier) {
            self.error("Expected identifier");
            return None;
        }
        let text = self.parse_ident();
        let ident = self.intern(text)?;
        self.create(IdentExpr { ident })
    }

    fn parse_literal_expr(&mut self) -> Option<AstRef<LiteralExpr>> {
        let TokenKind::Literal(kind) = self.token.kind else {
            self.error("Expected a literal");
            return None;
        };
        let text = self.lexer.text_of(&self.token);
        self.eat(); // Eat the literal
        let value = self.intern(text)?;
        self.create(LiteralExpr { kind, value })
    }

    fn parse_undef_expr(&mut self) -> Option<AstRef<UndefExpr>> {
        if !self.is_kind(TokenKind::Undefined) {
            self.error("Expected '---'");
            return None;
        }
        self.eat(); // Eat '---'
        self.create(UndefExpr)
    }

    fn parse_context_expr(&mut self) -> Option<AstRef<ContextExpr>> {
        if !self.is_keyword(KeywordKind::Context) {
            self.error("Expected 'context'");
            return None;
        }
        self.eat(); // Eat 'context'
        self.create(ContextExpr)
    }

    /// A type is an expression parsed in left-hand-side mode so that a
    /// following brace is left alone, wrapped in a type node.
    fn parse_type_expr(&mut self) -> Option<AstRef<TypeExpr>> {
        let operand = self.parse_operand(true)?;
        let expr = self.parse_unary_atom(operand, true)?;
        self.create(TypeExpr { expr })
    }

    fn parse_struct_expr(&mut self) -> Option<AstRef<StructExpr>> {
        if !self.is_keyword(KeywordKind::Struct) {
            self.error("Expected 'struct'");
            return None;
        }
        self.eat(); // Eat 'struct'
        if self.is_operator(OperatorKind::LParen) {
            // Parametric polymorphism parameters, parsed and discarded.
            self.eat(); // Eat '('
            let mut depth = 1u32;
            while depth > 0 {
                if self.is_kind(TokenKind::EndOfFile) {
                    self.error("Expected ')'");
                    return None;
                }
                if self.is_operator(OperatorKind::LParen) {
                    depth += 1;
                } else if self.is_operator(OperatorKind::RParen) {
                    depth -= 1;
                }
                self.eat();
            }
        }
        while self.is_kind(TokenKind::Directive) {
            self.eat(); // Eat <directive>
        }
        if !self.is_kind(TokenKind::LeftBrace) {
            self.error("Expected '{'");
            return None;
        }
        self.eat(); // Eat '{'
        let mut fields = Vec::new();
        while !self.is_kind(TokenKind::RightBrace) && !self.is_kind(TokenKind::EndOfFile) {
            if self.is_kind(TokenKind::Directive) {
                self.eat(); // Eat <directive>
            } else if self.is_keyword(KeywordKind::Using) {
                self.eat(); // Eat 'using'
            }
            let mut lhs: Vec<ExprRef> = Vec::new();
            loop {
                lhs.push(self.parse_ident_expr()?.into());
                if self.is_kind(TokenKind::Comma) {
                    self.eat(); // Eat ','
                } else {
                    break;
                }
            }
            if !self.is_operator(OperatorKind::Colon) {
                self.error("Expected ':'");
                return None;
            }
            self.eat(); // Eat ':'
            let ty = self.parse_type_expr()?;
            let decl = self.create(DeclStmt {
                lhs,
                ty: Some(ty),
                values: None,
            })?;
            fields.push(decl);
            if !self.is_kind(TokenKind::Comma) {
                break;
            }
            self.eat(); // Eat ','
        }
        if self.is_kind(TokenKind::Semicolon) {
            self.eat(); // A newline after the last field inserts one
        }
        if !self.is_kind(TokenKind::RightBrace) {
            self.error("Expected '}'");
            return None;
        }
        self.eat(); // Eat '}'
        self.create(StructExpr { fields })
    }

    fn parse_proc_expr(&mut self) -> Option<AstRef<ProcExpr>> {
        self.eat(); // Eat 'proc'
        if !self.is_operator(OperatorKind::LParen) {
            self.error("Expected '(' after proc");
            return None;
        }
        self.eat(); // Eat '('
        let mut params = Vec::new();
        while !self.is_operator(OperatorKind::RParen) && !self.is_kind(TokenKind::EndOfFile) {
            let mut lhs: Vec<ExprRef> = Vec::new();
            loop {
                lhs.push(self.parse_ident_expr()?.into());
                if self.is_kind(TokenKind::Comma) {
                    self.eat(); // Eat ','
                } else {
                    break;
                }
            }
            if !self.is_operator(OperatorKind::Colon) {
                self.error("Expected ':' in parameter list");
                return None;
            }
            self.eat(); // Eat ':'
            let ty = self.parse_type_expr()?;
            params.push(self.create(DeclStmt {
                lhs,
                ty: Some(ty),
                values: None,
            })?);
            if !self.is_kind(TokenKind::Comma) {
                break;
            }
            self.eat(); // Eat ','
            if self.is_operator(OperatorKind::RParen) {
                break;
            }
        }
        if !self.is_operator(OperatorKind::RParen) {
            self.error("Expected ')'");
            return None;
        }
        self.eat(); // Eat ')'
        let ret = if self.is_operator(OperatorKind::Arrow) {
            self.eat(); // Eat '->'
            Some(self.parse_type_expr()?)
        } else {
            None
        };
        let body = self.parse_block_stmt()?;
        self.create(ProcExpr { params, ret, body })
    }
}
