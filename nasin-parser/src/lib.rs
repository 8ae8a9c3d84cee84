//! Lexer, parser and AST of the nasin language.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
mod print;

use ast::{Expr, Module};
use error::ParseResult;
use nasin_source::Source;
use parser::Parser;

/// Parses `source` as a module. The module takes its name and path from `source`.
pub fn parse_module(source: &Source) -> ParseResult<Module> {
    Parser::new(source).parse_module()
}

/// Parses `source` as a single expression.
pub fn parse_expr(source: &Source) -> ParseResult<Expr> {
    Parser::new(source).parse_expr_complete()
}
