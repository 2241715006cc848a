//! Black-box lexer scenarios, mirroring the teacher's one-file-per-scenario
//! `tests/` layout. See spec.md §4.1 and §8 property 1/2.

use tinyc::lexer::{Lexer, TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    let mut lexer = Lexer::new(source);
    let mut out = vec![];
    loop {
        let token = lexer.next_token();
        let done = token.kind == TokenKind::Eof;
        out.push(token.kind);
        if done {
            break;
        }
    }
    out
}

#[test]
fn keywords_take_priority_over_identifiers() {
    let mut lexer = Lexer::new("int ints");
    assert_eq!(lexer.next_token().kind, TokenKind::Int);
    let second = lexer.next_token();
    assert_eq!(second.kind, TokenKind::Identifier);
    assert_eq!(second.lexeme.as_deref(), Some("ints"));
}

#[test]
fn two_char_operators_take_precedence_over_one_char() {
    assert_eq!(
        kinds("== != <= >= && ||"),
        vec![
            TokenKind::Eq,
            TokenKind::Ne,
            TokenKind::Le,
            TokenKind::Ge,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn line_comment_runs_to_end_of_line() {
    let mut lexer = Lexer::new("1 // two\n2");
    let first = lexer.next_token();
    assert_eq!(first.lexeme.as_deref(), Some("1"));
    assert_eq!(lexer.next_token().line, 2);
}

#[test]
fn unclosed_block_comment_runs_to_eof_without_error() {
    assert_eq!(kinds("1 /* never closes"), vec![TokenKind::Number, TokenKind::Eof]);
}

#[test]
fn unterminated_string_is_an_error_token_at_the_opening_quote() {
    let mut lexer = Lexer::new("  \"abc");
    let token = lexer.next_token();
    assert_eq!(token.kind, TokenKind::Error);
    assert_eq!(token.lexeme.as_deref(), Some("Unterminated string"));
    assert_eq!(token.column, 3);
}

#[test]
fn lone_ampersand_is_an_error_not_bitwise_and() {
    let mut lexer = Lexer::new("&");
    let token = lexer.next_token();
    assert_eq!(token.kind, TokenKind::Error);
}

#[test]
fn string_escape_pairs_are_preserved_verbatim_in_the_lexeme() {
    let mut lexer = Lexer::new(r#""a\"b""#);
    let token = lexer.next_token();
    assert_eq!(token.kind, TokenKind::String);
    assert_eq!(token.lexeme.as_deref(), Some(r#"a\"b"#));
}

#[test]
fn peek_token_does_not_consume() {
    let mut lexer = Lexer::new("int x;");
    let peeked = lexer.peek_token();
    let next = lexer.next_token();
    assert_eq!(peeked, next);
    assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
}

#[test]
fn eof_is_returned_forever_after_the_end() {
    let mut lexer = Lexer::new("");
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}

#[test]
fn positions_are_one_based_and_track_newlines() {
    let mut lexer = Lexer::new("int\nx");
    let first = lexer.next_token();
    assert_eq!((first.line, first.column), (1, 1));
    let second = lexer.next_token();
    assert_eq!((second.line, second.column), (2, 1));
}
