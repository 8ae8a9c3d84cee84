use nasin::{compile, compile_expr, render, Config, Emit, Error, Format};
use nasin_ir::{Instr, InstrKind, Module, ScopeId, Value};
use insta::assert_snapshot;
use nasin_parser::ast::{self, BinOp, ExprKind};
use nasin_parser::error::ParseError;
use nasin_passes::LowerError;
use nasin_source::{Diagnostic, Source, Span};

/// Programs that go through the whole pipeline.
const PROGRAMS: &[&str] = &[
    "x = 5\ny = x + 1",
    "f(a, b) = a + b",
    "main() =\n  let x = 1\n  let x = x + 1\n  x",
    "x = 1\nf(x) = x * 2\ng(y) = x + y",
    "main() = helper(1)\nhelper(n) = if n > 0 then helper(n - 1) else n",
    "main() =\n  a = (b = 1; b + 1)\n  a * 2",
    "k = 2\nscale = fn(x) = x * k\nmain() = @print(scale(3), fn() = 0)",
    "p = {x = 1, y = [2, -3]}\nq = p.y",
    "type Point { x: Int, y: Int, sum(self) = self.x + self.y }",
    "puts(s: Str): Int\n  @extern(\"c\", puts)\nmain() = puts(\"hi\")",
    "fib(n: Int): Int =\n  if n < 2 then n\n  else fib(n - 1) + fib(n - 2)",
    "abs(x) = if x < 0 then -x else x\nsign(x) = if x == 0 then 0 else (if x > 0 then 1 else -1)",
    "x = 1\nx = x + 1\nx = x * x\nf() = x ** 2 ** 3",
    "outer(a) =\n  inner(b) = a + b\n  inner(a) % 3",
    "xs = [\n  1\n  -2\n]\nlast(n) =\n  m = n * 2\n  -m",
];

fn ir(source: &str) -> Module {
    let source = Source::from(source);
    compile(&source, &Config::default())
        .unwrap_or_else(|err| panic!("{}", source.report(&err)))
        .ir
        .expect("lowering was requested")
}

fn grouped(source: &str) -> String {
    let source = Source::from(source);
    nasin_parser::parse_expr(&source).unwrap().to_string()
}

/// Visits every instruction of `scope`, including the ones inside `if` branches.
fn walk<'m>(body: &'m [Instr], f: &mut impl FnMut(&'m Instr)) {
    for instr in body {
        f(instr);
        if let InstrKind::If {
            then_body,
            else_body,
            ..
        } = &instr.kind
        {
            walk(then_body, f);
            if let Some(else_body) = else_body {
                walk(else_body, f);
            }
        }
    }
}

/// Serializes `module` with every span removed, so trees can be compared by shape.
fn without_spans(module: &ast::Module) -> serde_json::Value {
    fn strip(value: &mut serde_json::Value) {
        match value {
            serde_json::Value::Object(fields) => {
                fields.remove("span");
                fields.values_mut().for_each(strip);
            }
            serde_json::Value::Array(items) => items.iter_mut().for_each(strip),
            _ => {}
        }
    }
    let mut value = serde_json::to_value(module).unwrap();
    strip(&mut value);
    value
}

fn scope_ids(module: &Module) -> impl Iterator<Item = ScopeId> {
    (0..module.scopes.len() as u32).map(ScopeId)
}

#[test]
fn scenario_nested_binary() {
    let source = Source::from("1 + 2 * 3");
    let expr = nasin_parser::parse_expr(&source).unwrap();
    match &expr.kind {
        ExprKind::Binary { op, rhs, .. } => {
            assert_eq!(*op, BinOp::Add);
            assert!(matches!(rhs.kind, ExprKind::Binary { op: BinOp::Mul, .. }));
        }
        kind => panic!("expected a binary expression, got {:?}", kind),
    }

    let (module, value) = compile_expr(&source).unwrap();
    assert_eq!(module.to_string(), "$1 := 2 * 3\n$2 := 1 + $1\n");
    assert_eq!(value, Value::Name("$2".to_string()));
}

#[test]
fn scenario_bindings() {
    let (module, value) = compile_expr(&Source::from("x = 5; y = x + 1; y")).unwrap();
    assert_eq!(module.to_string(), "x := 5\ny := x + 1\n");
    assert_eq!(value, Value::Name("y".to_string()));
}

#[test]
fn scenario_func_decl() {
    let module = ir("f(a, b) = a + b");
    let decl = match &module.body()[0].kind {
        InstrKind::FnDecl(decl) => decl,
        kind => panic!("expected a function declaration, got {:?}", kind),
    };
    assert_eq!(decl.params, vec!["a", "b"]);

    let scope = module.scope(decl.scope);
    assert_eq!(scope.parent, Some(module.root));
    assert_eq!(scope.body.len(), 2);
    assert!(matches!(
        &scope.body[0].kind,
        InstrKind::BinOp { name, op: BinOp::Add, .. } if name == "$1"
    ));
    assert_eq!(
        scope.body[1].kind,
        InstrKind::FnReturn(Value::Name("$1".to_string()))
    );
}

#[test]
fn scenario_missing_operand() {
    let source = Source::from("x = 1 + ");
    let err = compile(&source, &Config::default()).unwrap_err();
    assert_eq!(
        err,
        Error::Parse(ParseError::Syntax {
            expected: "expression".to_string(),
            found: "end of file".to_string(),
            span: Span::point(8),
        })
    );
}

#[test]
fn scenario_sibling_bindings() {
    let (module, value) = compile_expr(&Source::from("x = 1; y = x; x = 2; x + y")).unwrap();
    assert_eq!(module.to_string(), "x := 1\ny := x\nx_1 := 2\n$1 := x_1 + y\n");
    assert_eq!(value, Value::Name("$1".to_string()));

    let names = module
        .scope(module.root)
        .names
        .iter()
        .map(|binding| binding.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["x", "y", "x_1", "$1"]);
}

#[test]
fn precedence() {
    assert_eq!(grouped("1 + 2 * 3"), "1 + (2 * 3)");
    assert_eq!(grouped("1 * 2 + 3"), "(1 * 2) + 3");
    assert_eq!(grouped("a - b - c"), "(a - b) - c");
    assert_eq!(grouped("a / b % c"), "(a / b) % c");
    assert_eq!(grouped("a ** b ** c"), "a ** (b ** c)");
    assert_eq!(grouped("-a ** 2"), "(-a) ** 2");
    assert_eq!(grouped("a + b == c * d"), "(a + b) == (c * d)");
    assert_eq!(grouped("not a.b(c) < 2"), "(not a.b(c)) < 2");
    assert_eq!(grouped("(1 + 2) * 3"), "(1 + 2) * 3");
}

#[test]
fn flattened_operands_are_bound() {
    for program in PROGRAMS {
        let module = ir(program);
        for id in scope_ids(&module) {
            walk(&module.scope(id).body, &mut |instr| {
                for operand in instr.operands() {
                    if let Some(name) = operand.as_name() {
                        assert!(
                            module.lookup(id, name).is_some(),
                            "`{}` is not bound in {:?} of {:?}",
                            name,
                            id,
                            program
                        );
                    }
                }
                if let InstrKind::FnCall { callee, .. } = &instr.kind {
                    assert!(module.lookup(id, callee).is_some());
                }
                if let Some(target) = instr.target() {
                    assert!(module.lookup(id, target).is_some());
                }
            });
        }
    }
}

#[test]
fn names_are_unique_per_scope() {
    for program in PROGRAMS {
        let module = ir(program);
        for scope in &module.scopes {
            let mut names = scope
                .names
                .iter()
                .map(|binding| binding.name.as_str())
                .collect::<Vec<_>>();
            let count = names.len();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), count, "duplicate names in {:?}", program);
        }
    }
}

#[test]
fn names_resolve_to_the_nearest_binding() {
    let module = ir("x = 1\nf(x) =\n  g(y) = x + y\n  g(x)\nh() = x");
    assert_eq!(
        module.to_string(),
        "x := 1\n\
         f(x_1) =>\n  \
           g(y) =>\n    \
             $1 := x_1 + y\n    \
             return $1\n  \
           $1 := g(x_1)\n  \
           return $1\n\
         h() =>\n  \
           return x\n"
    );

    let err = compile(&Source::from("f() = y"), &Config::default()).unwrap_err();
    assert_eq!(
        err,
        Error::Lower(LowerError::UnresolvedName {
            name: "y".to_string(),
            span: Span::new(6, 7),
        })
    );
}

#[test]
fn printed_module_reparses() {
    for program in PROGRAMS {
        let config = Config {
            emit: Emit::Ast,
            ..Config::default()
        };
        let first = compile(&Source::from(*program), &config).unwrap();
        let printed = first.ast.to_string();
        let second = compile(&Source::from(printed.as_str()), &config).unwrap();
        assert_eq!(
            without_spans(&second.ast),
            without_spans(&first.ast),
            "{:?} did not round trip",
            program
        );
    }
}

#[test]
fn rendered_ir() {
    let source = Source::from("fib(n: Int): Int =\n  if n < 2 then n\n  else fib(n - 1) + fib(n - 2)");
    let config = Config::default();
    let artifacts = compile(&source, &config).unwrap();
    assert_snapshot!(render(&artifacts, &config).unwrap().unwrap(), @r###"
    fib(n) =>
      $1 := n < 2
      $2 := if $1 =>
        $2 := n
      else =>
        $3 := n - 1
        $4 := fib($3)
        $5 := n - 2
        $6 := fib($5)
        $2 := $4 + $6
      return $2
    "###);
}

#[test]
fn json_is_keyed_by_node_kind() {
    let source = Source::from("f(a) = -a");
    let ast_config = Config {
        emit: Emit::Ast,
        format: Format::Json,
        module_name: None,
    };
    let artifacts = compile(&source, &ast_config).unwrap();
    let json = render(&artifacts, &ast_config).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let func = &value["body"][0]["kind"]["Func"];
    assert_eq!(func["name"], "f");
    assert_eq!(func["body"]["kind"]["Unary"]["op"], "Neg");

    let ir_config = Config {
        format: Format::Json,
        ..Config::default()
    };
    let artifacts = compile(&source, &ir_config).unwrap();
    let json = render(&artifacts, &ir_config).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["name"], "main");
    assert_eq!(value["scopes"][0]["body"][0]["kind"]["FnDecl"]["params"][0], "a");
}

#[test]
fn errors_render_with_location() {
    let source = Source::named("main", "main.nas", "x = 1\nf() = 3(x)");
    let err = compile(&source, &Config::default()).unwrap_err();
    assert_eq!(err.span(), Span::new(12, 13));
    assert_eq!(err.to_string(), "cannot call `3`, only names can be called");

    let report = source.report(&err).to_string();
    assert!(report.starts_with("main.nas:2:7\n"), "{}", report);
    assert!(report.contains("2 | f() = 3(x)"));
    assert!(report.contains("cannot call `3`"));
}
