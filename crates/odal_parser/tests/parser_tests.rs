//! Parser integration tests.
//!
//! Verifies statement disambiguation, operator precedence, brace
//! resolution, and the abort-on-first-error failure mode.

use odal_ast::{dump, Expr, NodeKind, Stmt};
use odal_lexer::AssignKind;
use odal_parser::{parse_module, ModuleParse};

/// Helper: parse source that must succeed.
fn parse(source: &str) -> ModuleParse {
    match parse_module("test.odal", source) {
        Ok(module) => module,
        Err(failed) => panic!("parse failed for {source:?}: {:?}", failed.diagnostics),
    }
}

/// Helper: parse source that must fail; returns the rendered diagnostics.
fn parse_err(source: &str) -> Vec<String> {
    let failed = parse_module("test.odal", source)
        .err()
        .unwrap_or_else(|| panic!("parse unexpectedly succeeded for {source:?}"));
    failed
        .diagnostics
        .diagnostics()
        .iter()
        .map(|d| d.to_string())
        .collect()
}

/// Helper: the prefix-form dump of a source consisting of one bare
/// expression statement.
fn expr_text(source: &str) -> String {
    let module = parse(source);
    assert_eq!(module.stmts.len(), 1, "source: {source}");
    let Stmt::Expr(stmt) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected an expression statement for {source:?}");
    };
    let mut out = String::new();
    dump::dump_expr(&module.ast, stmt.expr, &mut out);
    out
}

// ============================================================================
// Operator precedence and associativity
// ============================================================================

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    assert_eq!(expr_text("a + b * c"), "(+ a (* b c))");
}

#[test]
fn test_equal_precedence_is_left_associative() {
    assert_eq!(expr_text("a - b - c"), "(- (- a b) c)");
}

#[test]
fn test_parentheses_override_precedence() {
    assert_eq!(expr_text("(a + b) * c"), "(* (+ a b) c)");
}

#[test]
fn test_ternary_nests_on_the_right() {
    assert_eq!(expr_text("a ? b : c ? d : e"), "(? a b (? c d e))");
}

#[test]
fn test_ternary_branches_take_full_expressions() {
    assert_eq!(expr_text("a ? b + c : d"), "(? a (+ b c) d)");
}

#[test]
fn test_logical_operators() {
    assert_eq!(expr_text("a || b && c"), "(|| a (&& b c))");
}

#[test]
fn test_comparison_below_additive() {
    assert_eq!(expr_text("a + b < c"), "(< (+ a b) c)");
}

#[test]
fn test_prefix_unary_binds_tighter_than_binary() {
    assert_eq!(expr_text("-a + b"), "(+ (- a) b)");
    assert_eq!(expr_text("!a && b"), "(&& (! a) b)");
}

#[test]
fn test_shift_and_bitwise() {
    assert_eq!(expr_text("a | b << c"), "(| a (<< b c))");
    assert_eq!(expr_text("a &~ b & c"), "(&~ (&~ a b) c)");
}

// ============================================================================
// Postfix forms
// ============================================================================

#[test]
fn test_pointer_dereference() {
    assert_eq!(expr_text("x^"), "(^ x)");
}

#[test]
fn test_or_return_marker() {
    assert_eq!(expr_text("f() or_return"), "(or_return f)");
}

#[test]
fn test_call_member_and_index_are_consumed() {
    // No call/selector/index nodes yet; the operand passes through.
    assert_eq!(expr_text("f(a, b + 1)"), "f");
    assert_eq!(expr_text("x.y.z"), "x");
    assert_eq!(expr_text("a[1]"), "a");
    assert_eq!(expr_text("a[lo:hi]"), "a");
}

#[test]
fn test_cast_prefix_passes_operand_through() {
    assert_eq!(expr_text("cast(int)x"), "x");
    assert_eq!(expr_text("auto_cast x"), "x");
}

#[test]
fn test_implicit_selector() {
    assert_eq!(expr_text(".Red"), "Red");
}

#[test]
fn test_context_reference() {
    assert_eq!(expr_text("context"), "context");
}

// ============================================================================
// Simple statement disambiguation
// ============================================================================

#[test]
fn test_typed_declaration_with_initializer() {
    let module = parse("x: int = 1;");
    let Stmt::Decl(decl) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected a declaration");
    };
    assert_eq!(decl.lhs.len(), 1);
    assert!(decl.ty.is_some());
    assert_eq!(decl.values.as_deref().unwrap().len(), 1);
}

#[test]
fn test_inferred_declaration() {
    let module = parse("x := 1;");
    let Stmt::Decl(decl) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected a declaration");
    };
    assert!(decl.ty.is_none());
    assert_eq!(decl.values.as_deref().unwrap().len(), 1);
}

#[test]
fn test_constant_declaration() {
    let module = parse("MAX :: 4096;");
    let Stmt::Decl(decl) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected a declaration");
    };
    assert!(decl.ty.is_none());
    assert_eq!(decl.values.as_deref().unwrap().len(), 1);
}

#[test]
fn test_typed_declaration_without_initializer() {
    let module = parse("x: int;");
    let Stmt::Decl(decl) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected a declaration");
    };
    assert!(decl.ty.is_some());
    assert!(decl.values.is_none());
}

#[test]
fn test_undef_initializer() {
    let module = parse("x := ---;");
    let Stmt::Decl(decl) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected a declaration");
    };
    let values = decl.values.as_deref().unwrap();
    assert!(matches!(module.ast.expr(values[0]), Expr::Undef(_)));
}

#[test]
fn test_assignment() {
    let module = parse("x = 1;");
    let Stmt::Assign(assign) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected an assignment");
    };
    assert_eq!(assign.op, AssignKind::Eq);
    assert_eq!(assign.lhs.len(), 1);
    assert_eq!(assign.rhs.len(), 1);
}

#[test]
fn test_compound_assignment() {
    let module = parse("x += 2;");
    let Stmt::Assign(assign) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected an assignment");
    };
    assert_eq!(assign.op, AssignKind::Add);
}

#[test]
fn test_multi_assignment() {
    let module = parse("x, y = 1, 2;");
    let Stmt::Assign(assign) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected an assignment");
    };
    assert_eq!(assign.lhs.len(), 2);
    assert_eq!(assign.rhs.len(), 2);
}

#[test]
fn test_call_is_an_expression_statement() {
    let module = parse("f();");
    assert_eq!(module.stmts[0].kind(), NodeKind::ExprStmt);
}

#[test]
fn test_bare_expression_list_is_an_error() {
    let errors = parse_err("a, b");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Expected 1 expression"), "{errors:?}");
}

// ============================================================================
// Statement keywords
// ============================================================================

#[test]
fn test_package_statement() {
    let module = parse("package main\n");
    let Stmt::Package(package) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected a package statement");
    };
    assert_eq!(module.ast.string(package.name), "main");
}

#[test]
fn test_import_statement_interns_unquoted_path() {
    let module = parse("import \"core:fmt\"\n");
    let Stmt::Import(import) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected an import statement");
    };
    assert_eq!(module.ast.string(import.path), "core:fmt");
}

#[test]
fn test_import_requires_string_literal() {
    let errors = parse_err("import fmt;");
    assert!(errors[0].contains("Expected string literal for import path"));
}

#[test]
fn test_break_with_label() {
    let module = parse("break outer;");
    let Stmt::Break(brk) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected a break statement");
    };
    assert_eq!(module.ast.string(brk.label.unwrap()), "outer");
}

#[test]
fn test_continue_without_label() {
    let module = parse("continue;");
    let Stmt::Continue(cont) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected a continue statement");
    };
    assert!(cont.label.is_none());
}

#[test]
fn test_fallthrough() {
    let module = parse("fallthrough;");
    assert_eq!(module.stmts[0].kind(), NodeKind::FallthroughStmt);
}

#[test]
fn test_empty_statement() {
    let module = parse(";");
    assert_eq!(module.stmts[0].kind(), NodeKind::EmptyStmt);
}

#[test]
fn test_block_statement() {
    let module = parse("{ f(); g(); }");
    let Stmt::Block(block) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected a block");
    };
    assert_eq!(block.stmts.len(), 2);
}

#[test]
fn test_defer_statement() {
    let module = parse("defer f();");
    let Stmt::Defer(defer) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected a defer statement");
    };
    assert_eq!(defer.stmt.kind(), NodeKind::ExprStmt);
}

#[test]
fn test_defer_of_empty_statement_is_an_error() {
    let errors = parse_err("defer ;");
    assert!(errors[0].contains("Empty statement after defer"), "{errors:?}");
}

#[test]
fn test_defer_of_defer_is_an_error() {
    let errors = parse_err("defer defer f()");
    assert!(errors[0].contains("Cannot defer a defer statement"), "{errors:?}");
}

// ============================================================================
// If statements and brace disambiguation
// ============================================================================

#[test]
fn test_if_condition_brace_is_the_body() {
    let module = parse("if a { }\n");
    let Stmt::If(if_stmt) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected an if statement");
    };
    assert!(if_stmt.init.is_none());
    assert!(matches!(module.ast.expr(if_stmt.cond), Expr::Ident(_)));
    assert_eq!(if_stmt.on_true.kind(), NodeKind::BlockStmt);
    assert!(if_stmt.on_false.is_none());
}

#[test]
fn test_parenthesized_composite_literal_condition() {
    // Unparenthesized, `Point{...}` would be refused as a condition; the
    // parentheses re-enter plain expression context.
    let module = parse("if (Point{1, 2}) { }\n");
    let Stmt::If(if_stmt) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected an if statement");
    };
    assert!(matches!(module.ast.expr(if_stmt.cond), Expr::Ident(_)));
}

#[test]
fn test_if_with_init_statement() {
    let module = parse("if x := f(); x > 0 { }\n");
    let Stmt::If(if_stmt) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected an if statement");
    };
    let init = if_stmt.init.expect("expected an init statement");
    assert_eq!(init.kind(), NodeKind::DeclStmt);
    assert!(matches!(module.ast.expr(if_stmt.cond), Expr::Bin(_)));
}

#[test]
fn test_if_else_chain() {
    let module = parse("if a { } else if b { } else { }\n");
    let Stmt::If(if_stmt) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected an if statement");
    };
    let else_ref = if_stmt.on_false.expect("expected an else branch");
    assert_eq!(else_ref.kind(), NodeKind::IfStmt);
    let Stmt::If(nested) = module.ast.stmt(else_ref) else {
        panic!("expected a nested if");
    };
    assert_eq!(nested.on_false.unwrap().kind(), NodeKind::BlockStmt);
}

#[test]
fn test_if_else_across_newlines() {
    let source = "if a {\n} else {\n}\n";
    let module = parse(source);
    let Stmt::If(if_stmt) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected an if statement");
    };
    assert!(if_stmt.on_false.is_some());
}

#[test]
fn test_if_do_single_statement_branch() {
    let module = parse("if a do f();\n");
    let Stmt::If(if_stmt) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected an if statement");
    };
    assert_eq!(if_stmt.on_true.kind(), NodeKind::ExprStmt);
}

#[test]
fn test_if_followed_by_next_statement() {
    let module = parse("if a { }\nf();\n");
    assert_eq!(module.stmts.len(), 2);
    assert_eq!(module.stmts[0].kind(), NodeKind::IfStmt);
    assert_eq!(module.stmts[1].kind(), NodeKind::ExprStmt);
}

#[test]
fn test_if_declaration_header_without_condition_is_an_error() {
    let errors = parse_err("if x := 1 { }\n");
    assert!(errors[0].contains("Expected a boolean expression"), "{errors:?}");
}

// ============================================================================
// Struct and proc literals
// ============================================================================

#[test]
fn test_struct_declaration() {
    let module = parse("V :: struct { x: f32, y: f32 };");
    let Stmt::Decl(decl) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected a declaration");
    };
    let values = decl.values.as_deref().unwrap();
    let Expr::Struct(strct) = module.ast.expr(values[0]) else {
        panic!("expected a struct literal");
    };
    assert_eq!(strct.fields.len(), 2);
    let first = &module.ast[strct.fields[0]];
    assert_eq!(first.lhs.len(), 1);
    assert!(first.ty.is_some());
    assert!(first.values.is_none());
}

#[test]
fn test_struct_multiline_with_inserted_separator() {
    let source = "V :: struct {\n\tx: f32,\n\ty: f32\n}\n";
    let module = parse(source);
    let Stmt::Decl(decl) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected a declaration");
    };
    let values = decl.values.as_deref().unwrap();
    let Expr::Struct(strct) = module.ast.expr(values[0]) else {
        panic!("expected a struct literal");
    };
    assert_eq!(strct.fields.len(), 2);
}

#[test]
fn test_struct_grouped_field_names() {
    let module = parse("V :: struct { x, y, z: f32 };");
    let Stmt::Decl(decl) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected a declaration");
    };
    let values = decl.values.as_deref().unwrap();
    let Expr::Struct(strct) = module.ast.expr(values[0]) else {
        panic!("expected a struct literal");
    };
    assert_eq!(strct.fields.len(), 1);
    assert_eq!(module.ast[strct.fields[0]].lhs.len(), 3);
}

#[test]
fn test_struct_field_requires_type() {
    let errors = parse_err("V :: struct { x };");
    assert!(errors[0].contains("Expected ':'"), "{errors:?}");
}

#[test]
fn test_proc_literal_with_params_and_return_type() {
    let module = parse("add :: proc(a, b: int) -> int { };");
    let Stmt::Decl(decl) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected a declaration");
    };
    let values = decl.values.as_deref().unwrap();
    let Expr::Proc(proc) = module.ast.expr(values[0]) else {
        panic!("expected a proc literal");
    };
    assert_eq!(proc.params.len(), 1);
    assert_eq!(module.ast[proc.params[0]].lhs.len(), 2);
    assert!(proc.ret.is_some());
}

#[test]
fn test_proc_literal_without_return_type() {
    let module = parse("main :: proc() { f(); };");
    let Stmt::Decl(decl) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected a declaration");
    };
    let values = decl.values.as_deref().unwrap();
    let Expr::Proc(proc) = module.ast.expr(values[0]) else {
        panic!("expected a proc literal");
    };
    assert!(proc.params.is_empty());
    assert!(proc.ret.is_none());
    assert_eq!(module.ast[proc.body].stmts.len(), 1);
}

#[test]
fn test_proc_body_statements_parse() {
    let source = "\
run :: proc(store: Store) -> int {
\tok := false
\tif user := find(store); user != nil {
\t\tok = true
\t} else {
\t\tok = false
\t}
\tdefer release(store)
\tresult := ok ? 1 : 0
}
";
    let module = parse(source);
    assert_eq!(module.stmts.len(), 1);
}

// ============================================================================
// Failure semantics
// ============================================================================

#[test]
fn test_single_positioned_diagnostic() {
    let errors = parse_err("@");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0], "test.odal:1:1: error: Expected an expression");
}

#[test]
fn test_missing_statement_terminator() {
    let errors = parse_err("f() g()");
    assert!(
        errors[0].contains("Expected ';' or newline after statement"),
        "{errors:?}"
    );
}

#[test]
fn test_trailing_comma_in_expression_list() {
    let errors = parse_err("x = 1,");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Expected an expression"), "{errors:?}");
}

#[test]
fn test_missing_rhs_in_assignment() {
    let errors = parse_err("x = ;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Expected an expression"), "{errors:?}");
}

#[test]
fn test_failure_reports_no_statements() {
    let failed = parse_module("test.odal", "x :=;").unwrap_err();
    assert!(!failed.diagnostics.is_empty());
    assert!(failed.to_string().contains("error(s)"));
}

#[test]
fn test_error_position_is_on_the_offending_line() {
    let errors = parse_err("x := 1\ny = ,\n");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("test.odal:2:"), "{errors:?}");
}

// ============================================================================
// Whole translation units
// ============================================================================

#[test]
fn test_small_module() {
    let source = "\
package geometry

import \"core:math\"

EPSILON :: 1e9

Vec2 :: struct {
\tx: f32,
\ty: f32,
}

length_squared :: proc(v: Vec2) -> f32 {
\tsq := v.x * v.x + v.y * v.y
}
";
    let module = parse(source);
    assert_eq!(module.stmts.len(), 5);
    assert_eq!(module.stmts[0].kind(), NodeKind::PackageStmt);
    assert_eq!(module.stmts[1].kind(), NodeKind::ImportStmt);
    assert_eq!(module.stmts[2].kind(), NodeKind::DeclStmt);
    assert_eq!(module.stmts[3].kind(), NodeKind::DeclStmt);
    assert_eq!(module.stmts[4].kind(), NodeKind::DeclStmt);
}

#[test]
fn test_identifiers_are_interned_once() {
    let module = parse("x = x + x;");
    // All three `x` occurrences resolve to one interned handle.
    let Stmt::Assign(assign) = module.ast.stmt(module.stmts[0]) else {
        panic!("expected an assignment");
    };
    let Expr::Ident(lhs) = module.ast.expr(assign.lhs[0]) else {
        panic!("expected an identifier");
    };
    let Expr::Bin(bin) = module.ast.expr(assign.rhs[0]) else {
        panic!("expected a binary expression");
    };
    let Expr::Ident(rhs_a) = module.ast.expr(bin.lhs) else {
        panic!("expected an identifier");
    };
    assert_eq!(lhs.ident, rhs_a.ident);
}
