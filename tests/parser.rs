//! Black-box parser scenarios over the public `Parser` entry point.
//! Unit tests in `src/parser/mod.rs` cover precedence/associativity in
//! detail (§8 property 4); these exercise the grammar and recovery at
//! the whole-program level (§4.2, §8 property 3).

use tinyc::ast::Node;
use tinyc::parser::Parser;

fn parse(source: &str) -> (Node, tinyc::diagnostics::Diagnostics) {
    Parser::new(source).parse_program()
}

#[test]
fn empty_program_parses_to_an_empty_declaration_list() {
    let (ast, diagnostics) = parse("");
    assert!(!diagnostics.has_errors());
    let Node::Program(program) = ast else { panic!("expected Program root") };
    assert!(program.declarations.is_empty());
}

#[test]
fn multiple_top_level_declarations_parse_in_source_order() {
    let (ast, diagnostics) = parse("int a; int f() { return 0; } char* b;");
    assert!(!diagnostics.has_errors());
    let Node::Program(program) = ast else { panic!() };
    assert_eq!(program.declarations.len(), 3);
}

#[test]
fn parse_is_a_pure_function_of_the_source() {
    let source = "int main() { int x = (1 + 2) * 3; if (x > 5) { return 1; } return 0; }";
    let (first, first_diag) = parse(source);
    let (second, second_diag) = parse(source);
    assert_eq!(first_diag.len(), second_diag.len());
    assert_eq!(format!("{:?}", first), format!("{:?}", second));
}

#[test]
fn missing_semicolon_reports_a_positioned_error() {
    let (_ast, diagnostics) = parse("int main() { return 0 }");
    assert!(diagnostics.has_errors());
    let message = diagnostics.iter().next().unwrap();
    assert!(message.message.contains("Expected ';'"));
}

#[test]
fn too_many_errors_terminates_parsing() {
    let garbage = "@ ".repeat(60);
    let (_ast, diagnostics) = parse(&garbage);
    assert!(diagnostics.len() <= 51);
    assert!(diagnostics.iter().any(|d| d.message.contains("too many parse errors")));
}

#[test]
fn else_binds_to_nearest_if() {
    let (ast, diagnostics) = parse(
        "int main() { if (1) if (0) return 1; else return 2; return 0; }",
    );
    assert!(!diagnostics.has_errors());
    let Node::Program(program) = ast else { panic!() };
    let Node::FunctionDecl(main) = &program.declarations[0] else { panic!() };
    let Node::CompoundStmt(body) = main.body.as_deref().unwrap() else { panic!() };
    let Node::IfStmt(outer) = &body.statements[0] else { panic!("expected outer if") };
    let Node::IfStmt(inner) = outer.then_branch.as_ref() else {
        panic!("expected nested if as the then-branch")
    };
    assert!(inner.else_branch.is_some());
}

#[test]
fn void_return_with_no_value_is_accepted_syntactically() {
    let (_ast, diagnostics) = parse("void f() { return; }");
    assert!(!diagnostics.has_errors());
}
