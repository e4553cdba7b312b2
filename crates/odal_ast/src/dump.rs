//! Debug dump of the AST.
//!
//! Renders one statement per line with two-space indentation; expressions
//! render inline in a parenthesized prefix form, e.g. `(+ a (* b c))`.
//! Output is stable, which makes it usable in golden tests.

use crate::arena::{Ast, Expr, ExprRef, Stmt, StmtRef};
use crate::node::DeclStmt;

fn indent(out: &mut String, nest: usize) {
    for _ in 0..nest {
        out.push_str("  ");
    }
}

/// Append the dump of one statement (and its children) to `out`.
pub fn dump_stmt(ast: &Ast, r: StmtRef, out: &mut String, nest: usize) {
    indent(out, nest);
    match ast.stmt(r) {
        Stmt::Empty(_) => out.push_str("empty\n"),
        Stmt::Block(block) => {
            out.push_str("block\n");
            for stmt in &block.stmts {
                dump_stmt(ast, *stmt, out, nest + 1);
            }
        }
        Stmt::Import(import) => {
            out.push_str("import \"");
            out.push_str(ast.string(import.path));
            out.push_str("\"\n");
        }
        Stmt::Package(package) => {
            out.push_str("package ");
            out.push_str(ast.string(package.name));
            out.push('\n');
        }
        Stmt::Defer(defer) => {
            out.push_str("defer\n");
            dump_stmt(ast, defer.stmt, out, nest + 1);
        }
        Stmt::Break(brk) => {
            out.push_str("break");
            if let Some(label) = brk.label {
                out.push(' ');
                out.push_str(ast.string(label));
            }
            out.push('\n');
        }
        Stmt::Continue(cont) => {
            out.push_str("continue");
            if let Some(label) = cont.label {
                out.push(' ');
                out.push_str(ast.string(label));
            }
            out.push('\n');
        }
        Stmt::Fallthrough(_) => out.push_str("fallthrough\n"),
        Stmt::If(if_stmt) => {
            out.push_str("if\n");
            if let Some(init) = if_stmt.init {
                indent(out, nest + 1);
                out.push_str("init:\n");
                dump_stmt(ast, init, out, nest + 2);
            }
            indent(out, nest + 1);
            out.push_str("cond: ");
            write_expr(ast, if_stmt.cond, out);
            out.push('\n');
            indent(out, nest + 1);
            out.push_str("then:\n");
            dump_stmt(ast, if_stmt.on_true, out, nest + 2);
            if let Some(on_false) = if_stmt.on_false {
                indent(out, nest + 1);
                out.push_str("else:\n");
                dump_stmt(ast, on_false, out, nest + 2);
            }
        }
        Stmt::Decl(decl) => {
            out.push_str("decl ");
            write_expr_list(ast, &decl.lhs, out);
            if let Some(ty) = decl.ty {
                out.push_str(": ");
                write_expr(ast, ast[ty].expr, out);
            }
            if let Some(values) = &decl.values {
                out.push_str(" = ");
                write_expr_list(ast, values, out);
            }
            out.push('\n');
        }
        Stmt::Assign(assign) => {
            out.push_str("assign ");
            write_expr_list(ast, &assign.lhs, out);
            out.push(' ');
            out.push_str(assign.op.as_str());
            out.push(' ');
            write_expr_list(ast, &assign.rhs, out);
            out.push('\n');
        }
        Stmt::Expr(stmt) => {
            out.push_str("expr ");
            write_expr(ast, stmt.expr, out);
            out.push('\n');
        }
    }
}

/// Append the inline dump of one expression to `out`.
pub fn dump_expr(ast: &Ast, r: ExprRef, out: &mut String) {
    write_expr(ast, r, out);
}

fn write_expr(ast: &Ast, r: ExprRef, out: &mut String) {
    match ast.expr(r) {
        Expr::Bin(bin) => {
            out.push('(');
            out.push_str(bin.op.as_str());
            out.push(' ');
            write_expr(ast, bin.lhs, out);
            out.push(' ');
            write_expr(ast, bin.rhs, out);
            out.push(')');
        }
        Expr::Unary(unary) => {
            out.push('(');
            out.push_str(unary.op.as_str());
            out.push(' ');
            write_expr(ast, unary.operand, out);
            out.push(')');
        }
        Expr::Ternary(ternary) => {
            out.push_str("(? ");
            write_expr(ast, ternary.cond, out);
            out.push(' ');
            write_expr(ast, ternary.on_true, out);
            out.push(' ');
            write_expr(ast, ternary.on_false, out);
            out.push(')');
        }
        Expr::Ident(ident) => out.push_str(ast.string(ident.ident)),
        Expr::Literal(literal) => out.push_str(ast.string(literal.value)),
        Expr::Undef(_) => out.push_str("---"),
        Expr::Context(_) => out.push_str("context"),
        Expr::Struct(strct) => {
            out.push_str("struct {");
            for (i, field) in strct.fields.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_field(ast, &ast[*field], out);
            }
            out.push('}');
        }
        Expr::Proc(proc) => {
            out.push_str("proc(");
            for (i, param) in proc.params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_field(ast, &ast[*param], out);
            }
            out.push(')');
            if let Some(ret) = proc.ret {
                out.push_str(" -> ");
                write_expr(ast, ast[ret].expr, out);
            }
            out.push_str(" {...}");
        }
        Expr::Type(ty) => write_expr(ast, ty.expr, out),
    }
}

fn write_expr_list(ast: &Ast, exprs: &[ExprRef], out: &mut String) {
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_expr(ast, *expr, out);
    }
}

/// A struct field or proc parameter: `names: type`, never with values.
fn write_field(ast: &Ast, decl: &DeclStmt, out: &mut String) {
    write_expr_list(ast, &decl.lhs, out);
    if let Some(ty) = decl.ty {
        out.push_str(": ");
        write_expr(ast, ast[ty].expr, out);
    }
}
