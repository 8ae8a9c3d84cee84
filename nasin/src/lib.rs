//! The nasin front-end: source text to AST to IR.

pub mod config;
pub mod error;

pub use config::{Config, Emit, Format};
pub use error::Error;

use nasin_ir::Value;
use nasin_parser::ast;
use nasin_source::Source;
use tracing::debug;

/// Everything produced by one run of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifacts {
    pub ast: ast::Module,
    /// `None` when only the AST was requested.
    pub ir: Option<nasin_ir::Module>,
}

/// Parses `source` and, unless only the AST is requested, lowers it.
/// Stops at the first error. `config.module_name` overrides the name of `source`.
pub fn compile(source: &Source, config: &Config) -> Result<Artifacts, Error> {
    let mut ast = nasin_parser::parse_module(source)?;
    if let Some(name) = &config.module_name {
        ast.name = name.clone();
    }
    let ir = match config.emit {
        Emit::Ast => None,
        Emit::Ir | Emit::None => Some(nasin_passes::lower_module(&ast)?),
    };
    debug!(module = %source.name, lowered = ir.is_some(), "compiled");
    Ok(Artifacts { ast, ir })
}

/// Parses and lowers a single expression. Returns the IR and the value of the expression.
pub fn compile_expr(source: &Source) -> Result<(nasin_ir::Module, Value), Error> {
    let expr = nasin_parser::parse_expr(source)?;
    let lowered = nasin_passes::lower_expr(&expr, &source.name, &source.path)?;
    Ok(lowered)
}

/// Renders the artifact selected by `config`, or `None` if nothing is to be printed.
pub fn render(artifacts: &Artifacts, config: &Config) -> serde_json::Result<Option<String>> {
    let rendered = match (config.emit, &artifacts.ir) {
        (Emit::Ast, _) => match config.format {
            Format::Text => artifacts.ast.to_string(),
            Format::Json => serde_json::to_string_pretty(&artifacts.ast)?,
        },
        (Emit::Ir, Some(ir)) => match config.format {
            Format::Text => ir.to_string(),
            Format::Json => serde_json::to_string_pretty(ir)?,
        },
        (Emit::Ir, None) | (Emit::None, _) => return Ok(None),
    };
    Ok(Some(rendered))
}
