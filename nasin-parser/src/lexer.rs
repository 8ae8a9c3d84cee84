use logos::{Lexer, Logos};
use nasin_source::Span;
use std::collections::VecDeque;

use crate::ast::{BinOp, UnOp};

#[derive(Debug, Logos, Clone, PartialEq)]
pub enum Token {
    // literals
    #[regex(r"0x[0-9a-fA-F][0-9a-fA-F_]*|0b[01][01_]*", |lex| lex.slice().to_string())]
    #[regex(r"[0-9][0-9_]*", decimal)]
    Number(String),
    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| lex.slice()[1..lex.slice().len() - 1].to_string())]
    Str(String),

    // identifiers
    #[regex("[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // keywords
    #[token("let")]
    Let,
    #[token("if")]
    If,
    #[token("then")]
    Then,
    #[token("else")]
    Else,
    #[token("type")]
    Type,
    #[token("fn")]
    Fn,
    #[token("not")]
    Not,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // binary operators
    // - arithmetics
    #[token("+")]
    Plus,
    #[token("-")]
    Minus, // NOTE: can also be unary
    #[token("*")]
    Asterisk,
    #[token("**")]
    AsteriskAsterisk,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    // - equality
    #[token("==")]
    EqualsEquals,
    #[token("!=")]
    NotEquals,
    // - ordering
    #[token(">")]
    GreaterThan,
    #[token(">=")]
    GreaterThanEquals,
    #[token("<")]
    LessThan,
    #[token("<=")]
    LessThanEquals,

    // punctuation
    #[token("=")]
    Equals,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token("@")]
    At,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,

    /// Separates statements and list items.
    #[regex(r"(\r?\n)+")]
    Newline,

    // misc
    #[regex(r"[ \t\f]+", logos::skip)]
    #[regex(r"//[^\n]*", logos::skip)] // single line comments
    #[error]
    Error,

    /// Only generated in parse phase when `lexer.next()` returns `None`.
    Eof,
}

/// Extends an integer with its fraction. The `.` is only part of the number when a digit
/// follows it, so `1.x` is a property access.
fn decimal(lex: &mut Lexer<Token>) -> String {
    let rest = lex.remainder().as_bytes();
    if rest.len() > 1 && rest[0] == b'.' && rest[1].is_ascii_digit() {
        let mut len = 2;
        while len < rest.len() && (rest[len].is_ascii_digit() || rest[len] == b'_') {
            len += 1;
        }
        lex.bump(len);
    }
    lex.slice().to_string()
}

impl Token {
    /// Returns the binary operator this token stands for, if any.
    pub fn binop(&self) -> Option<BinOp> {
        match self {
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Sub),
            Token::Asterisk => Some(BinOp::Mul),
            Token::Slash => Some(BinOp::Div),
            Token::Percent => Some(BinOp::Mod),
            Token::AsteriskAsterisk => Some(BinOp::Pow),
            Token::EqualsEquals => Some(BinOp::Eq),
            Token::NotEquals => Some(BinOp::NotEq),
            Token::GreaterThan => Some(BinOp::Gt),
            Token::LessThan => Some(BinOp::Lt),
            Token::GreaterThanEquals => Some(BinOp::GtEq),
            Token::LessThanEquals => Some(BinOp::LtEq),
            _ => None,
        }
    }

    /// Returns the prefix operator this token stands for, if any.
    pub fn unop(&self) -> Option<UnOp> {
        match self {
            Token::Minus => Some(UnOp::Neg),
            Token::Not => Some(UnOp::Not),
            _ => None,
        }
    }

    /// Human readable description, used in error messages.
    pub fn describe(&self) -> String {
        let symbol = match self {
            Token::Number(num) => return format!("number `{}`", num),
            Token::Str(_) => return "string literal".to_string(),
            Token::Ident(ident) => return format!("identifier `{}`", ident),
            Token::Newline => return "new line".to_string(),
            Token::Error => return "invalid token".to_string(),
            Token::Eof => return "end of file".to_string(),
            Token::Let => "let",
            Token::If => "if",
            Token::Then => "then",
            Token::Else => "else",
            Token::Type => "type",
            Token::Fn => "fn",
            Token::Not => "not",
            Token::True => "true",
            Token::False => "false",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Asterisk => "*",
            Token::AsteriskAsterisk => "**",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::EqualsEquals => "==",
            Token::NotEquals => "!=",
            Token::GreaterThan => ">",
            Token::GreaterThanEquals => ">=",
            Token::LessThan => "<",
            Token::LessThanEquals => "<=",
            Token::Equals => "=",
            Token::Colon => ":",
            Token::Dot => ".",
            Token::Comma => ",",
            Token::Semi => ";",
            Token::At => "@",
            Token::OpenParen => "(",
            Token::CloseParen => ")",
            Token::OpenBracket => "[",
            Token::CloseBracket => "]",
            Token::OpenBrace => "{",
            Token::CloseBrace => "}",
        };
        format!("`{}`", symbol)
    }
}

/// A lazily lexed stream of tokens with unbounded lookahead.
///
/// Tokens are only lexed when they are first peeked at or consumed. Invalid input is
/// produced as [`Token::Error`]; it is up to the parser to report it once it gets there.
pub struct TokenStream<'a> {
    lexer: Lexer<'a, Token>,
    buffer: VecDeque<(Token, Span)>,
    content_len: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            lexer: Token::lexer(content),
            buffer: VecDeque::new(),
            content_len: content.len(),
        }
    }

    /// Makes sure the buffer holds at least `n + 1` tokens.
    fn fill(&mut self, n: usize) {
        while self.buffer.len() <= n {
            let token = match self.lexer.next() {
                Some(token) => (token, self.lexer.span().into()),
                None => (Token::Eof, Span::point(self.content_len)),
            };
            self.buffer.push_back(token);
        }
    }

    /// Returns the `n`-th upcoming token without consuming anything.
    pub fn peek_nth(&mut self, n: usize) -> &(Token, Span) {
        self.fill(n);
        &self.buffer[n]
    }

    /// Consumes the next token. Returns [`Token::Eof`] forever once the input is exhausted.
    pub fn next_token(&mut self) -> (Token, Span) {
        self.fill(0);
        self.buffer
            .pop_front()
            .unwrap_or_else(|| (Token::Eof, Span::point(self.content_len)))
    }
}

impl Iterator for TokenStream<'_> {
    type Item = (Token, Span);

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            (Token::Eof, _) => None,
            token => Some(token),
        }
    }
}
