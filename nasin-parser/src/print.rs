//! Source printer for the AST.
//!
//! The output is valid source code: every compound operand is wrapped in parentheses, so
//! parsing the printed form gives back the same tree.

use crate::ast::*;
use std::fmt::{self, Display, Formatter};

/// Writes `items` separated by `sep`.
fn write_sep<T: Display>(f: &mut Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// An expression in operand position.
struct Operand<'a>(&'a Expr);

impl Display for Operand<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_atomic() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "({})", self.0)
        }
    }
}

impl Display for Module {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_sep(f, &self.body, "\n")
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StmtKind::Func(func) => write!(f, "{}", func),
            StmtKind::Global(decl) => write!(f, "{}", decl),
            StmtKind::Let(decl) => write!(f, "let {}", decl),
            StmtKind::Type(decl) => write!(f, "{}", decl),
        }
    }
}

impl Display for FuncDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        write_sep(f, &self.params, ", ")?;
        f.write_str(")")?;
        if let Some(ret_type) = &self.ret_type {
            write!(f, ": {}", ret_type)?;
        }
        for directive in &self.directives {
            write!(f, " {}", directive)?;
        }
        if let Some(body) = &self.body {
            write!(f, " = {}", body)?;
        }
        Ok(())
    }
}

impl Display for Param {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pat)?;
        if let Some(ty) = &self.ty {
            write!(f, ": {}", ty)?;
        }
        Ok(())
    }
}

impl Display for VarDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pat)?;
        if let Some(ty) = &self.ty {
            write!(f, ": {}", ty)?;
        }
        write!(f, " = {}", self.value)
    }
}

impl Display for TypeDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "type {} {{", self.name)?;
        let members = self
            .fields
            .iter()
            .map(|field| format!("{}: {}", field.name, field.ty))
            .chain(self.methods.iter().map(|method| method.func.to_string()))
            .collect::<Vec<_>>();
        if !members.is_empty() {
            f.write_str(" ")?;
            write_sep(f, &members, ", ")?;
            f.write_str(" ")?;
        }
        f.write_str("}")
    }
}

impl Display for Directive {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        if !self.args.is_empty() {
            f.write_str("(")?;
            write_sep(f, &self.args, ", ")?;
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl Display for DirectiveArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DirectiveArgKind::Bool(value) => write!(f, "{}", value),
            DirectiveArgKind::Ident(ident) => f.write_str(ident),
            DirectiveArgKind::Num(num) => f.write_str(num),
            DirectiveArgKind::Str(string) => write!(f, "\"{}\"", string),
            DirectiveArgKind::Array(items) => {
                f.write_str("[")?;
                write_sep(f, items, ", ")?;
                f.write_str("]")
            }
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Num(num) => f.write_str(num),
            ExprKind::Bool(value) => write!(f, "{}", value),
            ExprKind::Str(string) => write!(f, "\"{}\"", string),
            ExprKind::Ident(ident) => f.write_str(ident),
            ExprKind::GetProp { parent, name } => write!(f, "{}.{}", Operand(parent), name),
            ExprKind::Array(items) => {
                f.write_str("[")?;
                write_sep(f, items, ", ")?;
                f.write_str("]")
            }
            ExprKind::Record(fields) => {
                f.write_str("{")?;
                write_sep(f, fields, ", ")?;
                f.write_str("}")
            }
            ExprKind::Call { callee, args } => {
                write!(f, "{}(", Operand(callee))?;
                write_sep(f, args, ", ")?;
                f.write_str(")")
            }
            ExprKind::Macro { name, args } => {
                write!(f, "@{}(", name)?;
                write_sep(f, args, ", ")?;
                f.write_str(")")
            }
            ExprKind::Unary { op, operand } => match op {
                UnOp::Neg => write!(f, "-{}", Operand(operand)),
                UnOp::Not => write!(f, "not {}", Operand(operand)),
            },
            ExprKind::Binary { op, lhs, rhs } => {
                write!(f, "{} {} {}", Operand(lhs), op.as_str(), Operand(rhs))
            }
            ExprKind::Lambda { params, body } => {
                f.write_str("fn(")?;
                write_sep(f, params, ", ")?;
                write!(f, ") = {}", body)
            }
            ExprKind::Block { body, value } => {
                for stmt in body {
                    write!(f, "{}; ", stmt)?;
                }
                write!(f, "{}", value)
            }
            ExprKind::If {
                cond,
                then,
                otherwise,
            } => {
                // a compound `then` branch could swallow the `else`
                write!(f, "if {} then {}", cond, Operand(then))?;
                if let Some(otherwise) = otherwise {
                    write!(f, " else {}", otherwise)?;
                }
                Ok(())
            }
        }
    }
}

impl Display for RecordLitField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

impl Display for TypeExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeExprKind::Named(name) => f.write_str(name),
            TypeExprKind::Array { item, len: Some(len) } => write!(f, "[{}; {}]", item, len),
            TypeExprKind::Array { item, len: None } => write!(f, "[{}]", item),
            TypeExprKind::Generic { name, args } => {
                write!(f, "{}(", name)?;
                write_sep(f, args, ", ")?;
                f.write_str(")")
            }
        }
    }
}

impl Display for Pat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PatKind::Name(name) => f.write_str(name),
        }
    }
}
