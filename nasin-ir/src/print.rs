//! Textual form of the IR.

use crate::{FnDecl, Instr, InstrKind, Module, ScopeId, Value};
use nasin_parser::ast::UnOp;
use std::fmt;

const INDENT: &str = "  ";

fn write_values(f: &mut fmt::Formatter<'_>, values: &[Value]) -> fmt::Result {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", value)?;
    }
    Ok(())
}

/// Prints instructions, resolving nested scopes through the module they belong to.
struct Printer<'m> {
    module: &'m Module,
}

impl Printer<'_> {
    fn scope(&self, f: &mut fmt::Formatter<'_>, id: ScopeId, depth: usize) -> fmt::Result {
        self.instrs(f, &self.module.scope(id).body, depth)
    }

    fn instrs(&self, f: &mut fmt::Formatter<'_>, instrs: &[Instr], depth: usize) -> fmt::Result {
        for instr in instrs {
            self.instr(f, instr, depth)?;
        }
        Ok(())
    }

    fn fn_decl(&self, f: &mut fmt::Formatter<'_>, decl: &FnDecl, depth: usize) -> fmt::Result {
        write!(f, "{}(", decl.name)?;
        for (i, param) in decl.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")?;
        for directive in &decl.directives {
            write!(f, " {}", directive)?;
        }
        writeln!(f, " =>")?;
        self.scope(f, decl.scope, depth + 1)
    }

    fn instr(&self, f: &mut fmt::Formatter<'_>, instr: &Instr, depth: usize) -> fmt::Result {
        write!(f, "{}", INDENT.repeat(depth))?;
        match &instr.kind {
            InstrKind::Assign { name, value } => writeln!(f, "{} := {}", name, value),
            InstrKind::BinOp {
                name,
                op,
                left,
                right,
            } => writeln!(f, "{} := {} {} {}", name, left, op.as_str(), right),
            InstrKind::UnOp { name, op, operand } => match op {
                UnOp::Neg => writeln!(f, "{} := -{}", name, operand),
                UnOp::Not => writeln!(f, "{} := not {}", name, operand),
            },
            InstrKind::FnCall { name, callee, args } => {
                write!(f, "{} := {}(", name, callee)?;
                write_values(f, args)?;
                writeln!(f, ")")
            }
            InstrKind::MacroCall {
                name,
                macro_name,
                args,
            } => {
                write!(f, "{} := @{}(", name, macro_name)?;
                write_values(f, args)?;
                writeln!(f, ")")
            }
            InstrKind::GetProp { name, parent, prop } => {
                writeln!(f, "{} := {}.{}", name, parent, prop)
            }
            InstrKind::Array { name, items } => {
                write!(f, "{} := [", name)?;
                write_values(f, items)?;
                writeln!(f, "]")
            }
            InstrKind::Record { name, fields } => {
                write!(f, "{} := {{", name)?;
                for (i, (field, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} = {}", field, value)?;
                }
                writeln!(f, "}}")
            }
            InstrKind::If {
                target,
                cond,
                then_body,
                else_body,
            } => {
                writeln!(f, "{} := if {} =>", target, cond)?;
                self.instrs(f, then_body, depth + 1)?;
                if let Some(else_body) = else_body {
                    writeln!(f, "{}else =>", INDENT.repeat(depth))?;
                    self.instrs(f, else_body, depth + 1)?;
                }
                Ok(())
            }
            InstrKind::FnDecl(decl) => self.fn_decl(f, decl, depth),
            InstrKind::TypeDecl {
                name,
                fields,
                methods,
            } => {
                writeln!(f, "type {} {{{}}} =>", name, fields.join(", "))?;
                for method in methods {
                    write!(f, "{}", INDENT.repeat(depth + 1))?;
                    self.fn_decl(f, method, depth + 1)?;
                }
                Ok(())
            }
            InstrKind::FnReturn(value) => writeln!(f, "return {}", value),
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Printer { module: self }.scope(f, self.root, 0)
    }
}
