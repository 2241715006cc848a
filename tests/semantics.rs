//! Black-box semantic-analysis scenarios over `compile_source`. See
//! spec.md §4.4 and §8's scenario table (entries 6 and 7).

use tinyc::compile_source;

fn errors(source: &str) -> Vec<String> {
    compile_source(source)
        .diagnostics
        .iter()
        .map(|d| d.message.clone())
        .collect()
}

#[test]
fn undeclared_identifier_is_reported() {
    let messages = errors("int main() { return undeclared; }");
    assert!(messages.iter().any(|m| m == "Undefined identifier 'undeclared'"));
}

#[test]
fn assigning_a_string_to_an_int_variable_is_a_type_error() {
    let messages = errors(r#"int main() { int x; x = "hi"; return x; }"#);
    assert!(messages
        .iter()
        .any(|m| m.contains("Cannot assign value of type 'char*' to variable of type 'int'")));
}

#[test]
fn int_and_char_are_numeric_but_not_assignment_compatible() {
    // arithmetic between int and char is fine...
    let ok = compile_source("int main() { char c; int x = 1 + c; return x; }");
    assert!(!ok.diagnostics.has_errors());

    // ...but assigning one to the other is not (§9 design note 7).
    let bad = errors("int main() { char c; int x; x = c; return 0; }");
    assert!(bad
        .iter()
        .any(|m| m.contains("Cannot assign value of type 'char' to variable of type 'int'")));
}

#[test]
fn mutually_recursive_functions_resolve_via_pass_a() {
    let output = compile_source(
        "int is_even(int n); \
         int is_odd(int n) { if (n == 0) { return 0; } return is_even(n - 1); } \
         int is_even(int n) { if (n == 0) { return 1; } return is_odd(n - 1); } \
         int main() { return is_even(10); }",
    );
    assert!(!output.diagnostics.has_errors(), "{:?}", output.diagnostics.iter().collect::<Vec<_>>());
}

#[test]
fn duplicate_top_level_function_is_an_error() {
    let messages = errors("int f() { return 0; } int f() { return 1; }");
    assert!(messages.iter().any(|m| m == "Function 'f' already declared"));
}

#[test]
fn shadowing_a_variable_in_a_nested_block_resolves_lexically() {
    let output = compile_source(
        "int main() { int x = 1; { int x = 2; if (x != 2) { return 1; } } return x - 1; }",
    );
    assert!(!output.diagnostics.has_errors());
}

#[test]
fn wrong_argument_count_is_an_error() {
    let messages = errors("int add(int a, int b) { return a + b; } int main() { return add(1); }");
    assert!(messages.iter().any(|m| m.to_lowercase().contains("argument")));
}

#[test]
fn returning_a_value_from_a_void_function_is_an_error() {
    let messages = errors("void f() { return 1; } int main() { f(); return 0; }");
    assert!(messages.iter().any(|m| m.contains("Cannot return value")));
}

#[test]
fn non_numeric_if_condition_is_an_error() {
    let messages = errors(r#"int main() { if ("x") { return 1; } return 0; }"#);
    assert!(!messages.is_empty());
}
