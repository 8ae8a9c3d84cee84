use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{Token, TokenStream};
use nasin_source::{Source, Span};
use std::mem;
use tracing::debug;

pub mod combinators;
pub mod expr;
pub mod stmt;
pub mod ty;

pub use combinators::Trailing;

/// Deepest nesting of expressions and types the parser descends into.
pub const MAX_NESTING: usize = 200;

pub struct Parser<'a> {
    /// Cached token for peeking.
    current_token: Token,
    current_span: Span,
    /// End offset of the last consumed token. Used to close node spans.
    prev_end: usize,
    /// Number of nested expressions and types being parsed.
    depth: usize,
    tokens: TokenStream<'a>,
    /// Source code
    source: &'a Source<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a Source<'a>) -> Self {
        let mut tokens = TokenStream::new(source.content);
        let (current_token, current_span) = tokens.next_token();
        Self {
            current_token,
            current_span,
            prev_end: 0,
            depth: 0,
            tokens,
            source,
        }
    }
}

impl<'a> Parser<'a> {
    /// Parses a whole module. Fails unless the entire input is consumed.
    pub fn parse_module(&mut self) -> ParseResult<Module> {
        self.skip_newlines();
        let body = self.sep_by(
            Trailing::Optional,
            "module statement",
            "`;` or new line",
            |p| p.at(&Token::Eof),
            Self::eat_stmt_sep,
            Self::parse_module_stmt,
        )?;
        self.expect(Token::Eof)?;

        let span = match (body.first(), body.last()) {
            (Some(first), Some(last)) => first.span.to(last.span),
            _ => Span::point(0),
        };
        debug!(
            module = %self.source.name,
            statements = body.len(),
            "parsed module"
        );
        Ok(Module {
            span,
            name: self.source.name.clone(),
            path: self.source.path.clone(),
            body,
        })
    }

    /// Parses a single expression that must span the entire input.
    pub fn parse_expr_complete(&mut self) -> ParseResult<Expr> {
        self.skip_newlines();
        let expr = self.parse_expr()?;
        self.skip_newlines();
        self.expect(Token::Eof)?;
        Ok(expr)
    }
}

/// Parse utilities
impl<'a> Parser<'a> {
    /// Consumes the current token and returns it.
    fn next(&mut self) -> Token {
        let (token, span) = self.tokens.next_token();
        self.prev_end = self.current_span.end;
        self.current_span = span;
        mem::replace(&mut self.current_token, token)
    }

    /// Predicate that tests whether the current token has the same discriminant as `tok`.
    fn at(&self, tok: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(tok)
    }

    /// Predicate that tests whether the next token has the same discriminant and eats the next token if yes as a side effect.
    fn eat(&mut self, tok: Token) -> bool {
        if self.at(&tok) {
            self.next(); // eat token
            true
        } else {
            false
        }
    }

    /// Eats `tok` and returns its span, or fails.
    fn expect(&mut self, tok: Token) -> ParseResult<Span> {
        if self.at(&tok) {
            let span = self.current_span;
            self.next();
            Ok(span)
        } else {
            self.unexpected(tok.describe())
        }
    }

    fn expect_ident(&mut self, expected: &str) -> ParseResult<(String, Span)> {
        match self.current_token {
            Token::Ident(_) => {
                let span = self.current_span;
                match self.next() {
                    Token::Ident(ident) => Ok((ident, span)),
                    _ => unreachable!(),
                }
            }
            _ => self.unexpected(expected),
        }
    }

    /// Returns the `n`-th token after the current one.
    fn peek_nth(&mut self, n: usize) -> &Token {
        &self.tokens.peek_nth(n).0
    }

    /// Returns `true` if any newline was skipped.
    fn skip_newlines(&mut self) -> bool {
        let mut skipped = false;
        while self.eat(Token::Newline) {
            skipped = true;
        }
        skipped
    }

    /// Returns the first token, starting from the current one, that is not a newline.
    fn peek_past_newlines(&mut self) -> &Token {
        if !self.at(&Token::Newline) {
            return &self.current_token;
        }
        let mut n = 0;
        while self.tokens.peek_nth(n).0 == Token::Newline {
            n += 1;
        }
        &self.tokens.peek_nth(n).0
    }

    fn at_after_newlines(&mut self, tok: &Token) -> bool {
        mem::discriminant(self.peek_past_newlines()) == mem::discriminant(tok)
    }

    /// Eats `tok` even if it is on a following line.
    fn eat_after_newlines(&mut self, tok: Token) -> bool {
        if self.at_after_newlines(&tok) {
            self.skip_newlines();
            self.next();
            true
        } else {
            false
        }
    }

    fn expect_after_newlines(&mut self, tok: Token) -> ParseResult<Span> {
        if self.at_after_newlines(&tok) {
            self.skip_newlines();
        }
        self.expect(tok)
    }

    /// Runs `f` one nesting level deeper. Fails instead of exhausting the stack.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            return self.unexpected("less deeply nested expression");
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Span from `start` up to the end of the last consumed token.
    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.prev_end.max(start))
    }

    /// Raises an unexpected token error.
    fn unexpected<T>(&self, expected: impl ToString) -> ParseResult<T> {
        let span = self.current_span;
        Err(match &self.current_token {
            Token::Error => ParseError::Lex {
                text: self.source.slice(span).to_string(),
                span,
            },
            token => ParseError::Syntax {
                expected: expected.to_string(),
                found: token.describe(),
                span,
            },
        })
    }
}
