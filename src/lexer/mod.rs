//! Lexer: source text → token stream. Pull-driven (`next_token`/
//! `peek_token`); skips whitespace and comments; recognizes keywords,
//! identifiers, integer literals, string literals with (undecoded)
//! escapes, punctuation and multi-char operators. See spec.md §4.1.

mod token;
mod token_kind;

pub use token::{Position, Token};
pub use token_kind::TokenKind;

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::cursor::{Cursor, CursorState};

static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert("int", TokenKind::Int);
    map.insert("char", TokenKind::Char);
    map.insert("void", TokenKind::Void);
    map.insert("if", TokenKind::If);
    map.insert("else", TokenKind::Else);
    map.insert("while", TokenKind::While);
    map.insert("for", TokenKind::For);
    map.insert("return", TokenKind::Return);
    map
});

pub struct Lexer<'a> {
    cursor: Cursor,
    initial: CursorState,
    _source: &'a str,
    tokens_produced: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let cursor = Cursor::new(source);
        let initial = cursor.state();
        Self {
            cursor,
            initial,
            _source: source,
            tokens_produced: 0,
        }
    }

    /// Restore the lexer to its initial state, as if freshly constructed.
    pub fn reset(&mut self) {
        self.cursor.restore(self.initial);
        self.tokens_produced = 0;
    }

    /// Total tokens handed out by `next_token` so far, including `Eof`.
    /// Used to log §10.1's "Lexing complete: N tokens" once a consumer
    /// (the parser) has driven the lexer to the end of the stream.
    pub fn token_count(&self) -> usize {
        self.tokens_produced
    }

    /// Non-destructive lookahead: returns the next token without
    /// consuming it from the stream.
    pub fn peek_token(&mut self) -> Token {
        let saved = self.cursor.state();
        let tokens_produced = self.tokens_produced;
        let token = self.next_token();
        self.cursor.restore(saved);
        self.tokens_produced = tokens_produced;
        token
    }

    /// Advance and return the next token. Returns `EOF` forever once the
    /// input is exhausted.
    pub fn next_token(&mut self) -> Token {
        self.tokens_produced += 1;
        self.skip_trivia();

        let (line, column) = (self.cursor.line(), self.cursor.column());

        let Some(c) = self.cursor.peek() else {
            return Token::new(TokenKind::Eof, line, column);
        };

        if is_identifier_start(c) {
            return self.lex_identifier(line, column);
        }
        if c.is_ascii_digit() {
            return self.lex_number(line, column);
        }
        if c == '"' {
            return self.lex_string(line, column);
        }
        self.lex_operator_or_punct(line, column)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.cursor.peek() {
                Some(c) if c.is_whitespace() => {
                    self.cursor.advance();
                }
                Some('/') if self.cursor.peek_at(1) == Some('/') => {
                    while let Some(c) = self.cursor.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.cursor.advance();
                    }
                }
                Some('/') if self.cursor.peek_at(1) == Some('*') => {
                    self.cursor.advance();
                    self.cursor.advance();
                    loop {
                        match self.cursor.peek() {
                            None => break, // unterminated block comment: lenient, runs to EOF
                            Some('*') if self.cursor.peek_at(1) == Some('/') => {
                                self.cursor.advance();
                                self.cursor.advance();
                                break;
                            }
                            Some(_) => {
                                self.cursor.advance();
                            }
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_identifier(&mut self, line: usize, column: usize) -> Token {
        let mut lexeme = String::new();
        while let Some(c) = self.cursor.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                lexeme.push(c);
                self.cursor.advance();
            } else {
                break;
            }
        }

        match KEYWORDS.get(lexeme.as_str()) {
            Some(kind) => Token::new(*kind, line, column),
            None => Token::with_lexeme(TokenKind::Identifier, lexeme, line, column),
        }
    }

    fn lex_number(&mut self, line: usize, column: usize) -> Token {
        let mut lexeme = String::new();
        while let Some(c) = self.cursor.peek() {
            if c.is_ascii_digit() {
                lexeme.push(c);
                self.cursor.advance();
            } else {
                break;
            }
        }
        Token::with_lexeme(TokenKind::Number, lexeme, line, column)
    }

    fn lex_string(&mut self, line: usize, column: usize) -> Token {
        self.cursor.advance(); // opening quote
        let mut lexeme = String::new();
        loop {
            match self.cursor.peek() {
                None => {
                    return Token::with_lexeme(
                        TokenKind::Error,
                        "Unterminated string",
                        line,
                        column,
                    );
                }
                Some('"') => {
                    self.cursor.advance();
                    break;
                }
                Some('\\') => {
                    // a backslash consumes exactly one following character
                    // verbatim; the escape pair is preserved in the lexeme.
                    lexeme.push(self.cursor.advance().unwrap());
                    match self.cursor.advance() {
                        Some(escaped) => lexeme.push(escaped),
                        None => {
                            return Token::with_lexeme(
                                TokenKind::Error,
                                "Unterminated string",
                                line,
                                column,
                            );
                        }
                    }
                }
                Some(c) => {
                    lexeme.push(c);
                    self.cursor.advance();
                }
            }
        }
        Token::with_lexeme(TokenKind::String, lexeme, line, column)
    }

    fn lex_operator_or_punct(&mut self, line: usize, column: usize) -> Token {
        let c = self.cursor.advance().unwrap();
        let next = self.cursor.peek();

        macro_rules! two_char {
            ($second:expr, $kind:expr) => {
                if next == Some($second) {
                    self.cursor.advance();
                    return Token::new($kind, line, column);
                }
            };
        }

        match c {
            '=' => {
                two_char!('=', TokenKind::Eq);
                Token::new(TokenKind::Assign, line, column)
            }
            '!' => {
                two_char!('=', TokenKind::Ne);
                Token::new(TokenKind::Not, line, column)
            }
            '<' => {
                two_char!('=', TokenKind::Le);
                Token::new(TokenKind::Lt, line, column)
            }
            '>' => {
                two_char!('=', TokenKind::Ge);
                Token::new(TokenKind::Gt, line, column)
            }
            '&' => {
                two_char!('&', TokenKind::And);
                Token::with_lexeme(TokenKind::Error, "Unexpected character", line, column)
            }
            '|' => {
                two_char!('|', TokenKind::Or);
                Token::with_lexeme(TokenKind::Error, "Unexpected character", line, column)
            }
            '+' => Token::new(TokenKind::Plus, line, column),
            '-' => Token::new(TokenKind::Minus, line, column),
            '*' => Token::new(TokenKind::Star, line, column),
            '/' => Token::new(TokenKind::Slash, line, column),
            '%' => Token::new(TokenKind::Percent, line, column),
            '(' => Token::new(TokenKind::LParen, line, column),
            ')' => Token::new(TokenKind::RParen, line, column),
            '{' => Token::new(TokenKind::LBrace, line, column),
            '}' => Token::new(TokenKind::RBrace, line, column),
            ';' => Token::new(TokenKind::Semicolon, line, column),
            ',' => Token::new(TokenKind::Comma, line, column),
            other => Token::with_lexeme(
                TokenKind::Error,
                format!("Unexpected character: '{other}'"),
                line,
                column,
            ),
        }
    }

    /// Render the whole remaining token stream for `--debug-tokens`.
    pub fn pretty_print(source: &str) -> String {
        let mut lexer = Lexer::new(source);
        let mut out = String::new();
        loop {
            let token = lexer.next_token();
            let done = token.kind == TokenKind::Eof;
            out.push_str(&format!("{token}\n"));
            if done {
                break;
            }
        }
        out
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn lexes_keywords_and_identifiers() {
        assert_eq!(
            kinds("int x void"),
            vec![
                TokenKind::Int,
                TokenKind::Identifier,
                TokenKind::Void,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lexes_number() {
        let mut lexer = Lexer::new("1337");
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Number);
        assert_eq!(token.lexeme.as_deref(), Some("1337"));
    }

    #[test]
    fn two_char_operators_take_precedence() {
        assert_eq!(
            kinds("== != <= >= && ||"),
            vec![
                TokenKind::Eq,
                TokenKind::Ne,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lone_ampersand_is_an_error_token() {
        let mut lexer = Lexer::new("&");
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Error);
        assert_eq!(token.lexeme.as_deref(), Some("Unexpected character"));
    }

    #[test]
    fn skips_line_and_block_comments() {
        assert_eq!(
            kinds("// comment\nint /* inline */ x"),
            vec![TokenKind::Int, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_block_comment_is_lenient() {
        assert_eq!(kinds("int /* never closes"), vec![TokenKind::Int, TokenKind::Eof]);
    }

    #[test]
    fn unterminated_string_is_an_error_token_at_opening_quote() {
        let mut lexer = Lexer::new("  \"hello");
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Error);
        assert_eq!(token.lexeme.as_deref(), Some("Unterminated string"));
        assert_eq!(token.column, 3);
    }

    #[test]
    fn string_escapes_are_preserved_undecoded() {
        let mut lexer = Lexer::new(r#""a\nb""#);
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::String);
        assert_eq!(token.lexeme.as_deref(), Some(r"a\nb"));
    }

    #[test]
    fn peek_token_does_not_consume() {
        let mut lexer = Lexer::new("int x");
        let peeked = lexer.peek_token();
        let next = lexer.next_token();
        assert_eq!(peeked, next);
        assert_eq!(next.kind, TokenKind::Int);
        assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
    }

    #[test]
    fn reset_rewinds_to_the_start() {
        let mut lexer = Lexer::new("int x");
        lexer.next_token();
        lexer.next_token();
        lexer.reset();
        assert_eq!(lexer.next_token().kind, TokenKind::Int);
    }

    #[test]
    fn eof_is_sticky() {
        let mut lexer = Lexer::new("");
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn positions_are_one_based_and_track_lines() {
        let mut lexer = Lexer::new("int\n  x");
        let int_tok = lexer.next_token();
        assert_eq!((int_tok.line, int_tok.column), (1, 1));
        let x_tok = lexer.next_token();
        assert_eq!((x_tok.line, x_tok.column), (2, 3));
    }
}
