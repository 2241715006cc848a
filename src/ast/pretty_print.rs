//! `--debug-ast` support: a recursive, indentation-based dump of a
//! `Node` tree. Not used by any other stage — purely a debugging aid.

use std::fmt::Write;

use super::Node;

pub fn pretty_print(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node, 0);
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    indent(out, depth);
    let _ = writeln!(out, "{} {:?}", node.kind_name(), node.position());

    match node {
        Node::Program(program) => {
            for decl in &program.declarations {
                write_node(out, decl, depth + 1);
            }
        }
        Node::FunctionDecl(function) => {
            for param in &function.parameters {
                write_node(out, param, depth + 1);
            }
            if let Some(body) = &function.body {
                write_node(out, body, depth + 1);
            }
        }
        Node::VariableDecl(decl) => {
            if let Some(init) = &decl.initializer {
                write_node(out, init, depth + 1);
            }
        }
        Node::Parameter(_) => {}
        Node::CompoundStmt(block) => {
            for stmt in &block.statements {
                write_node(out, stmt, depth + 1);
            }
        }
        Node::IfStmt(if_stmt) => {
            write_node(out, &if_stmt.condition, depth + 1);
            write_node(out, &if_stmt.then_branch, depth + 1);
            if let Some(else_branch) = &if_stmt.else_branch {
                write_node(out, else_branch, depth + 1);
            }
        }
        Node::WhileStmt(while_stmt) => {
            write_node(out, &while_stmt.condition, depth + 1);
            write_node(out, &while_stmt.body, depth + 1);
        }
        Node::ForStmt(for_stmt) => {
            if let Some(init) = &for_stmt.init {
                write_node(out, init, depth + 1);
            }
            if let Some(condition) = &for_stmt.condition {
                write_node(out, condition, depth + 1);
            }
            if let Some(update) = &for_stmt.update {
                write_node(out, update, depth + 1);
            }
            write_node(out, &for_stmt.body, depth + 1);
        }
        Node::ReturnStmt(return_stmt) => {
            if let Some(value) = &return_stmt.value {
                write_node(out, value, depth + 1);
            }
        }
        Node::ExpressionStmt(expr_stmt) => {
            if let Some(expr) = &expr_stmt.expression {
                write_node(out, expr, depth + 1);
            }
        }
        Node::BinaryOp(binary) => {
            write_node(out, &binary.left, depth + 1);
            write_node(out, &binary.right, depth + 1);
        }
        Node::UnaryOp(unary) => {
            write_node(out, &unary.operand, depth + 1);
        }
        Node::FunctionCall(call) => {
            write_node(out, &call.callee, depth + 1);
            for arg in &call.arguments {
                write_node(out, arg, depth + 1);
            }
        }
        Node::Identifier(_) | Node::Number(_) | Node::String(_) => {}
    }
}
