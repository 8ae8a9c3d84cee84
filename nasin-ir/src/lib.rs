//! Flattened intermediate representation produced by the lowering pass.
//!
//! A [`Module`] owns an arena of [`Scope`]s. Every scope holds the names it binds and a
//! linear list of [`Instr`]s whose operands are all [`Value`]s: literals or names bound
//! earlier in the scope chain.

pub mod instr;
pub mod module;
mod print;

pub use instr::{FnDecl, Instr, InstrKind};
pub use module::{Binding, Module, Scope, ScopeId};

use serde::Serialize;
use std::fmt;

/// A resolved operand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    /// A number literal, as written in the source.
    Num(String),
    Bool(bool),
    Str(String),
    /// A reference to a bound name (source binding or temporary).
    Name(String),
}

impl Value {
    /// Returns the referenced name or `None` if `self` is a literal.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Value::Name(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Num(num) => write!(f, "{}", num),
            Value::Bool(val) => write!(f, "{}", val),
            Value::Str(string) => write!(f, "\"{}\"", string),
            Value::Name(name) => write!(f, "{}", name),
        }
    }
}
