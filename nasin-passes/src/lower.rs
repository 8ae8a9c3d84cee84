//! IR lowering pass.
//!
//! Resolves every identifier against the scope chain, renames bindings so that each final
//! name is unique, and flattens expressions into instructions whose operands are all
//! [`Value`]s.

use std::mem;

use nasin_ir::{Binding, FnDecl, Instr, InstrKind, Module, Scope, ScopeId, Value};
use nasin_parser::ast::{self, Directive, Expr, ExprKind, FuncDecl, Param, Stmt, StmtKind, VarDecl};
use nasin_source::Span;
use tracing::{debug, trace};

use crate::error::{LowerError, LowerResult};

/// Deepest expression nesting the pass descends into.
pub const MAX_DEPTH: usize = 256;

/// Lowers a parsed module.
pub fn lower_module(ast: &ast::Module) -> LowerResult<Module> {
    let mut lowerer = Lowerer::new(ast.name.clone(), ast.path.clone());
    lowerer.lower_module_body(&ast.body)?;
    Ok(lowerer.finish())
}

/// Lowers a single expression into the root scope of a fresh module.
/// Returns the module together with the value of the expression.
pub fn lower_expr(expr: &Expr, name: &str, path: &str) -> LowerResult<(Module, Value)> {
    let mut lowerer = Lowerer::new(name.to_string(), path.to_string());
    let value = lowerer.lower_expr(expr, None)?;
    Ok((lowerer.finish(), value))
}

/// IR lowering pass.
pub struct Lowerer {
    module: Module,
    /// The scope instructions are currently emitted into.
    scope: ScopeId,
    /// Number of temporaries created so far, indexed by scope.
    temp_counts: Vec<u32>,
    /// Number of expressions being lowered.
    depth: usize,
}

impl Lowerer {
    pub fn new(name: String, path: String) -> Self {
        let module = Module::new(name, path);
        Self {
            scope: module.root,
            module,
            temp_counts: vec![0],
            depth: 0,
        }
    }

    pub fn finish(self) -> Module {
        debug!(
            module = %self.module.name,
            scopes = self.module.scopes.len(),
            instructions = self.module.body().len(),
            "lowered module"
        );
        self.module
    }

    fn current(&mut self) -> &mut Scope {
        self.module.scope_mut(self.scope)
    }

    fn emit(&mut self, kind: InstrKind, span: Span) {
        self.current().body.push(Instr::new(kind, span));
    }

    /// Emits the instruction built by `make` into `target`, or into a new temporary.
    fn emit_value(
        &mut self,
        target: Option<String>,
        span: Span,
        make: impl FnOnce(String) -> InstrKind,
    ) -> Value {
        let name = target.unwrap_or_else(|| self.temp());
        self.emit(make(name.clone()), span);
        Value::Name(name)
    }

    /// Returns `value` as is, unless a `target` must be written.
    fn pass_through(&mut self, value: Value, target: Option<String>, span: Span) -> Value {
        match target {
            Some(name) => {
                self.emit(
                    InstrKind::Assign {
                        name: name.clone(),
                        value,
                    },
                    span,
                );
                Value::Name(name)
            }
            None => value,
        }
    }

    /* Scopes */
    fn add_scope(&mut self) -> ScopeId {
        self.temp_counts.push(0);
        self.module.add_scope(Some(self.scope))
    }

    /// Runs `f` with `scope` as the current scope.
    fn in_scope<T>(
        &mut self,
        scope: ScopeId,
        f: impl FnOnce(&mut Self) -> LowerResult<T>,
    ) -> LowerResult<T> {
        let outer = mem::replace(&mut self.scope, scope);
        let result = f(self);
        self.scope = outer;
        result
    }

    /* Names */
    /// Binds a new temporary (`$1`, `$2`, ...) in the current scope.
    fn temp(&mut self) -> String {
        let count = &mut self.temp_counts[self.scope.0 as usize];
        *count += 1;
        let name = format!("${}", count);
        self.current().names.push(Binding {
            name: name.clone(),
            original: None,
        });
        name
    }

    /// Picks the final name of a new binding of `original` and claims it in the current
    /// scope. The binding cannot be resolved until it is revealed.
    ///
    /// The `n`-th binding of `x` visible from the current scope is named `x_n`.
    fn reserve(&mut self, original: &str) -> String {
        let mut count = self
            .module
            .ancestors(self.scope)
            .flat_map(|id| self.module.scope(id).names.iter())
            .filter(|binding| binding.original.as_deref() == Some(original))
            .count();

        let name = loop {
            let name = match count {
                0 => original.to_string(),
                _ => format!("{}_{}", original, count),
            };
            if self.module.lookup(self.scope, &name).is_none() {
                break name;
            }
            count += 1;
        };

        self.current().names.push(Binding {
            name: name.clone(),
            original: None,
        });
        name
    }

    /// Makes a reserved binding resolvable. It becomes the newest binding of `original`.
    fn reveal(&mut self, name: &str, original: &str) {
        let names = &mut self.current().names;
        if let Some(pos) = names.iter().position(|binding| binding.name == name) {
            let mut binding = names.remove(pos);
            binding.original = Some(original.to_string());
            names.push(binding);
        }
        trace!(name, original, "bound name");
    }

    fn bind(&mut self, original: &str) -> String {
        let name = self.reserve(original);
        self.reveal(&name, original);
        name
    }

    /// Returns the final name of the closest binding of `ident`.
    fn resolve(&self, ident: &str, span: Span) -> LowerResult<String> {
        self.module
            .lookup_original(self.scope, ident)
            .map(|binding| binding.name.clone())
            .ok_or_else(|| LowerError::UnresolvedName {
                name: ident.to_string(),
                span,
            })
    }

    /* Statements */
    fn lower_module_body(&mut self, body: &[Stmt]) -> LowerResult<()> {
        // top level functions are visible to the whole module
        let hoisted = body
            .iter()
            .map(|stmt| match &stmt.kind {
                StmtKind::Func(func) => Some(self.bind(&func.name)),
                _ => None,
            })
            .collect::<Vec<_>>();

        for (stmt, name) in body.iter().zip(hoisted) {
            self.lower_stmt(stmt, name)?;
        }
        Ok(())
    }

    /// Lowers a statement. `hoisted` is the name a function was already bound to.
    fn lower_stmt(&mut self, stmt: &Stmt, hoisted: Option<String>) -> LowerResult<()> {
        match &stmt.kind {
            StmtKind::Func(func) => {
                // bound before the body so the function can call itself
                let name = match hoisted {
                    Some(name) => {
                        // shadows later declarations of the same name until they are reached
                        self.reveal(&name, &func.name);
                        name
                    }
                    None => self.bind(&func.name),
                };
                let decl = self.lower_func(name, func)?;
                self.emit(InstrKind::FnDecl(decl), stmt.span);
            }
            StmtKind::Global(decl) | StmtKind::Let(decl) => self.lower_var_decl(decl)?,
            StmtKind::Type(decl) => {
                let name = self.bind(&decl.name);
                let fields = decl.fields.iter().map(|field| field.name.clone()).collect();
                let methods = decl
                    .methods
                    .iter()
                    .map(|method| self.lower_func(method.func.name.clone(), &method.func))
                    .collect::<LowerResult<Vec<_>>>()?;
                self.emit(
                    InstrKind::TypeDecl {
                        name,
                        fields,
                        methods,
                    },
                    stmt.span,
                );
            }
        }
        Ok(())
    }

    fn lower_block_stmt(&mut self, stmt: &Stmt) -> LowerResult<()> {
        match stmt.kind {
            StmtKind::Type(_) => Err(LowerError::UnrecognizedNode {
                node: "type declaration inside a block".to_string(),
                span: stmt.span,
            }),
            _ => self.lower_stmt(stmt, None),
        }
    }

    /// Lowers the value straight into the declared name. The name is only visible after
    /// the value, so `x = x + 1` reads the previous `x`.
    fn lower_var_decl(&mut self, decl: &VarDecl) -> LowerResult<()> {
        let original = decl.pat.name();
        let name = self.reserve(original);
        self.lower_expr(&decl.value, Some(name.clone()))?;
        self.reveal(&name, original);
        Ok(())
    }

    fn lower_func(&mut self, name: String, func: &FuncDecl) -> LowerResult<FnDecl> {
        self.lower_fn(name, &func.params, func.body.as_ref(), &func.directives)
    }

    /// Lowers a function body into a new child scope and returns its declaration.
    /// The caller emits the declaration.
    fn lower_fn(
        &mut self,
        name: String,
        params: &[Param],
        body: Option<&Expr>,
        directives: &[Directive],
    ) -> LowerResult<FnDecl> {
        let scope = self.add_scope();
        let params = self.in_scope(scope, |this| {
            let params = params
                .iter()
                .map(|param| this.bind(param.pat.name()))
                .collect::<Vec<_>>();
            if let Some(body) = body {
                let value = this.lower_expr(body, None)?;
                this.emit(InstrKind::FnReturn(value), body.span);
            }
            Ok(params)
        })?;

        Ok(FnDecl {
            name,
            params,
            directives: directives.to_vec(),
            scope,
        })
    }

    /* Expressions */
    fn lower_all(&mut self, exprs: &[Expr]) -> LowerResult<Vec<Value>> {
        exprs.iter().map(|expr| self.lower_expr(expr, None)).collect()
    }

    /// Lowers `expr` to a [`Value`].
    ///
    /// Literals and identifiers pass through without emitting anything, unless `target` is
    /// set. Every other expression emits exactly one instruction, written to `target` if
    /// set or to a new temporary otherwise.
    pub fn lower_expr(&mut self, expr: &Expr, target: Option<String>) -> LowerResult<Value> {
        if self.depth >= MAX_DEPTH {
            return Err(LowerError::NestingTooDeep { span: expr.span });
        }
        self.depth += 1;
        let value = self.lower_expr_kind(expr, target);
        self.depth -= 1;
        value
    }

    fn lower_expr_kind(&mut self, expr: &Expr, target: Option<String>) -> LowerResult<Value> {
        let span = expr.span;
        let value = match &expr.kind {
            ExprKind::Num(num) => self.pass_through(Value::Num(num.clone()), target, span),
            ExprKind::Bool(val) => self.pass_through(Value::Bool(*val), target, span),
            ExprKind::Str(string) => self.pass_through(Value::Str(string.clone()), target, span),
            ExprKind::Ident(ident) => {
                let name = self.resolve(ident, span)?;
                self.pass_through(Value::Name(name), target, span)
            }
            ExprKind::GetProp { parent, name: prop } => {
                let parent = self.lower_expr(parent, None)?;
                self.emit_value(target, span, |name| InstrKind::GetProp {
                    name,
                    parent,
                    prop: prop.clone(),
                })
            }
            ExprKind::Array(items) => {
                let items = self.lower_all(items)?;
                self.emit_value(target, span, |name| InstrKind::Array { name, items })
            }
            ExprKind::Record(fields) => {
                let fields = fields
                    .iter()
                    .map(|field| -> LowerResult<(String, Value)> {
                        Ok((field.name.clone(), self.lower_expr(&field.value, None)?))
                    })
                    .collect::<LowerResult<Vec<_>>>()?;
                self.emit_value(target, span, |name| InstrKind::Record { name, fields })
            }
            ExprKind::Call { callee, args } => {
                let args = self.lower_all(args)?;
                let callee = match self.lower_expr(callee, None)? {
                    Value::Name(name) => name,
                    value => {
                        return Err(LowerError::InvalidCallee {
                            callee: value.to_string(),
                            span: callee.span,
                        })
                    }
                };
                self.emit_value(target, span, |name| InstrKind::FnCall { name, callee, args })
            }
            ExprKind::Macro {
                name: macro_name,
                args,
            } => {
                let args = self.lower_all(args)?;
                self.emit_value(target, span, |name| InstrKind::MacroCall {
                    name,
                    macro_name: macro_name.clone(),
                    args,
                })
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.lower_expr(operand, None)?;
                self.emit_value(target, span, |name| InstrKind::UnOp {
                    name,
                    op: *op,
                    operand,
                })
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let left = self.lower_expr(lhs, None)?;
                let right = self.lower_expr(rhs, None)?;
                self.emit_value(target, span, |name| InstrKind::BinOp {
                    name,
                    op: *op,
                    left,
                    right,
                })
            }
            ExprKind::Lambda { params, body } => {
                let name = target.unwrap_or_else(|| self.temp());
                let decl = self.lower_fn(name.clone(), params, Some(body), &[])?;
                self.emit(InstrKind::FnDecl(decl), span);
                Value::Name(name)
            }
            ExprKind::Block { body, value } => {
                // blocks share the scope they appear in
                for stmt in body {
                    self.lower_block_stmt(stmt)?;
                }
                self.lower_expr(value, target)?
            }
            ExprKind::If {
                cond,
                then,
                otherwise,
            } => {
                let cond = self.lower_expr(cond, None)?;
                let target = target.unwrap_or_else(|| self.temp());
                let then_body = self.lower_branch(then, &target)?;
                let else_body = match otherwise {
                    Some(otherwise) => Some(self.lower_branch(otherwise, &target)?),
                    None => None,
                };
                self.emit(
                    InstrKind::If {
                        target: target.clone(),
                        cond,
                        then_body,
                        else_body,
                    },
                    span,
                );
                Value::Name(target)
            }
        };
        Ok(value)
    }

    /// Lowers a conditional branch into its own instruction list, ending with a write to
    /// `target`. Bindings made by the branch still go to the current scope.
    fn lower_branch(&mut self, expr: &Expr, target: &str) -> LowerResult<Vec<Instr>> {
        let outer = mem::take(&mut self.current().body);
        let result = self.lower_expr(expr, Some(target.to_string()));
        let branch = mem::replace(&mut self.current().body, outer);
        result.map(|_| branch)
    }
}
