//! Definitions for [`Instr`] and [`InstrKind`].

use crate::{ScopeId, Value};
use nasin_parser::ast::{BinOp, Directive, UnOp};
use nasin_source::Span;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instr {
    /// Span of the source construct this instruction was lowered from.
    pub span: Span,
    pub kind: InstrKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InstrKind {
    /// `name := value`
    Assign { name: String, value: Value },
    /// `name := left op right`
    BinOp {
        name: String,
        op: BinOp,
        left: Value,
        right: Value,
    },
    /// `name := op operand`
    UnOp {
        name: String,
        op: UnOp,
        operand: Value,
    },
    /// `name := callee(args)`. The callee is always a bound name.
    FnCall {
        name: String,
        callee: String,
        args: Vec<Value>,
    },
    /// `name := @macro_name(args)`
    MacroCall {
        name: String,
        macro_name: String,
        args: Vec<Value>,
    },
    /// `name := parent.prop`
    GetProp {
        name: String,
        parent: Value,
        prop: String,
    },
    /// `name := [items]`
    Array { name: String, items: Vec<Value> },
    /// `name := {field = value, ...}`
    Record {
        name: String,
        fields: Vec<(String, Value)>,
    },
    /// Runs `then_body` if `cond` holds and `else_body` otherwise. Each branch ends by
    /// writing its result to `target`. Without an else branch, `target` is only written
    /// when `cond` holds.
    If {
        target: String,
        cond: Value,
        then_body: Vec<Instr>,
        else_body: Option<Vec<Instr>>,
    },
    FnDecl(FnDecl),
    TypeDecl {
        name: String,
        fields: Vec<String>,
        methods: Vec<FnDecl>,
    },
    /// Returns `value` from the enclosing function scope.
    FnReturn(Value),
}

/// A function whose body lives in its own child scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FnDecl {
    pub name: String,
    /// Final names of the parameters, bound in `scope`.
    pub params: Vec<String>,
    /// Directives are carried over untouched from the AST.
    pub directives: Vec<Directive>,
    pub scope: ScopeId,
}

impl Instr {
    pub fn new(kind: InstrKind, span: Span) -> Self {
        Self { span, kind }
    }

    /// Returns the name written by this instruction, if any.
    pub fn target(&self) -> Option<&str> {
        match &self.kind {
            InstrKind::Assign { name, .. }
            | InstrKind::BinOp { name, .. }
            | InstrKind::UnOp { name, .. }
            | InstrKind::FnCall { name, .. }
            | InstrKind::MacroCall { name, .. }
            | InstrKind::GetProp { name, .. }
            | InstrKind::Array { name, .. }
            | InstrKind::Record { name, .. }
            | InstrKind::TypeDecl { name, .. } => Some(name),
            InstrKind::If { target, .. } => Some(target),
            InstrKind::FnDecl(decl) => Some(&decl.name),
            InstrKind::FnReturn(_) => None,
        }
    }

    /// Returns every operand read by this instruction, not including nested branches.
    pub fn operands(&self) -> Vec<&Value> {
        match &self.kind {
            InstrKind::Assign { value, .. } => vec![value],
            InstrKind::BinOp { left, right, .. } => vec![left, right],
            InstrKind::UnOp { operand, .. } => vec![operand],
            InstrKind::FnCall { args, .. } | InstrKind::MacroCall { args, .. } => {
                args.iter().collect()
            }
            InstrKind::GetProp { parent, .. } => vec![parent],
            InstrKind::Array { items, .. } => items.iter().collect(),
            InstrKind::Record { fields, .. } => fields.iter().map(|(_, value)| value).collect(),
            InstrKind::If { cond, .. } => vec![cond],
            InstrKind::FnReturn(value) => vec![value],
            InstrKind::FnDecl(_) | InstrKind::TypeDecl { .. } => Vec::new(),
        }
    }
}
