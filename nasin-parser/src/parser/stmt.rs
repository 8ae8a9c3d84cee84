use super::*;

/// A member of a `type` declaration body.
enum TypeMember {
    Field(RecordField),
    Method(Method),
}

impl<'a> Parser<'a> {
    /// Parses a top level statement: a type, function or global declaration.
    pub(crate) fn parse_module_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.current_span.start;
        let kind = match self.current_token {
            Token::Type => StmtKind::Type(self.parse_type_decl()?),
            Token::Ident(_) => {
                if *self.peek_nth(0) == Token::OpenParen {
                    StmtKind::Func(self.parse_func_decl()?)
                } else {
                    StmtKind::Global(self.parse_var_decl()?)
                }
            }
            _ => return self.unexpected("module statement"),
        };
        Ok(Stmt::new(kind, self.span_from(start)))
    }

    /// Parses a statement inside a block: a binding or a local function declaration.
    pub(crate) fn parse_block_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.current_span.start;
        let kind = if self.eat(Token::Let) {
            self.skip_newlines();
            StmtKind::Let(self.parse_var_decl()?)
        } else if *self.peek_nth(0) == Token::OpenParen {
            StmtKind::Func(self.parse_func_decl()?)
        } else {
            StmtKind::Let(self.parse_var_decl()?)
        };
        Ok(Stmt::new(kind, self.span_from(start)))
    }

    /// Returns `true` if the upcoming tokens start a block statement rather than an
    /// expression.
    pub(crate) fn at_block_stmt(&mut self) -> bool {
        match self.current_token {
            Token::Let => true,
            Token::Ident(_) => match self.peek_nth(0).clone() {
                Token::Equals | Token::Colon => true,
                Token::OpenParen => self.looks_like_func_decl(),
                _ => false,
            },
            _ => false,
        }
    }

    /// Tells `f(x) = ...` apart from the call `f(x)` by looking past the balanced
    /// parentheses.
    fn looks_like_func_decl(&mut self) -> bool {
        let mut depth = 0usize;
        let mut n = 0;
        loop {
            match self.peek_nth(n) {
                Token::OpenParen => depth += 1,
                Token::CloseParen => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Token::Eof => return false,
                _ => {}
            }
            n += 1;
        }

        n += 1;
        while *self.peek_nth(n) == Token::Newline {
            n += 1;
        }
        matches!(self.peek_nth(n), Token::Equals | Token::Colon | Token::At)
    }

    /// Parses `name(params) [: type] [directives] [= body]`.
    fn parse_func_decl(&mut self) -> ParseResult<FuncDecl> {
        let (name, _) = self.expect_ident("function name")?;
        let params = self.parse_params()?;
        let ret_type = self.parse_type_annotation()?;
        let directives = self.many0(|p| p.at_after_newlines(&Token::At), Self::parse_directive)?;

        let body = if self.eat_after_newlines(Token::Equals) {
            self.skip_newlines();
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(FuncDecl {
            name,
            params,
            ret_type,
            directives,
            body,
        })
    }

    pub(crate) fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        self.delimited(
            Token::OpenParen,
            Token::CloseParen,
            Trailing::Optional,
            "parameter",
            Self::parse_param,
        )
    }

    fn parse_param(&mut self) -> ParseResult<Param> {
        let pat = self.parse_pat()?;
        let ty = if self.eat(Token::Colon) {
            self.skip_newlines();
            Some(self.parse_type()?)
        } else {
            None
        };
        Ok(Param {
            span: self.span_from(pat.span.start),
            pat,
            ty,
        })
    }

    /// Parses `pattern [: type] = value`.
    fn parse_var_decl(&mut self) -> ParseResult<VarDecl> {
        let pat = self.parse_pat()?;
        let ty = self.parse_type_annotation()?;
        self.expect_after_newlines(Token::Equals)?;
        self.skip_newlines();
        let value = self.parse_expr()?;
        Ok(VarDecl { pat, ty, value })
    }

    /// Parses an optional `: type`, which may start on the next line.
    fn parse_type_annotation(&mut self) -> ParseResult<Option<TypeExpr>> {
        if self.eat_after_newlines(Token::Colon) {
            self.skip_newlines();
            Ok(Some(self.parse_type()?))
        } else {
            Ok(None)
        }
    }

    /* Directives */
    fn parse_directive(&mut self) -> ParseResult<Directive> {
        self.skip_newlines();
        let start = self.expect(Token::At)?.start;
        let (name, _) = self.expect_ident("directive name")?;
        let args = if self.at(&Token::OpenParen) {
            self.delimited(
                Token::OpenParen,
                Token::CloseParen,
                Trailing::Optional,
                "directive argument",
                Self::parse_directive_arg,
            )?
        } else {
            Vec::new()
        };
        Ok(Directive {
            span: self.span_from(start),
            name,
            args,
        })
    }

    fn parse_directive_arg(&mut self) -> ParseResult<DirectiveArg> {
        self.nested(Self::parse_directive_arg_inner)
    }

    fn parse_directive_arg_inner(&mut self) -> ParseResult<DirectiveArg> {
        let start = self.current_span.start;
        let kind = match self.current_token {
            Token::OpenParen => {
                self.next();
                self.skip_newlines();
                let mut arg = self.parse_directive_arg()?;
                self.skip_newlines();
                self.expect(Token::CloseParen)?;
                arg.span = self.span_from(start);
                return Ok(arg);
            }
            Token::OpenBracket => {
                let items = self.delimited(
                    Token::OpenBracket,
                    Token::CloseBracket,
                    Trailing::Optional,
                    "directive argument",
                    Self::parse_directive_arg,
                )?;
                return Ok(DirectiveArg {
                    span: self.span_from(start),
                    kind: DirectiveArgKind::Array(items),
                });
            }
            Token::True => DirectiveArgKind::Bool(true),
            Token::False => DirectiveArgKind::Bool(false),
            Token::Ident(ref ident) => DirectiveArgKind::Ident(ident.clone()),
            Token::Number(ref num) => DirectiveArgKind::Num(num.clone()),
            Token::Str(ref string) => DirectiveArgKind::Str(string.clone()),
            _ => return self.unexpected("directive argument"),
        };
        self.next();
        Ok(DirectiveArg {
            span: self.span_from(start),
            kind,
        })
    }

    /* Type declarations */
    /// Parses `type Name { fields and methods }`.
    fn parse_type_decl(&mut self) -> ParseResult<TypeDecl> {
        self.expect(Token::Type)?;
        let (name, _) = self.expect_ident("type name")?;
        let members = self.delimited(
            Token::OpenBrace,
            Token::CloseBrace,
            Trailing::Optional,
            "record field or method",
            Self::parse_type_member,
        )?;

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        for member in members {
            match member {
                TypeMember::Field(field) => fields.push(field),
                TypeMember::Method(method) => methods.push(method),
            }
        }
        Ok(TypeDecl {
            name,
            fields,
            methods,
        })
    }

    fn parse_type_member(&mut self) -> ParseResult<TypeMember> {
        let (name, name_span) = self.expect_ident("record field or method")?;

        if self.at(&Token::OpenParen) {
            let params = self.parse_params()?;
            let ret_type = self.parse_type_annotation()?;
            self.expect_after_newlines(Token::Equals)?;
            self.skip_newlines();
            let body = self.parse_expr()?;
            Ok(TypeMember::Method(Method {
                span: self.span_from(name_span.start),
                func: FuncDecl {
                    name,
                    params,
                    ret_type,
                    directives: Vec::new(),
                    body: Some(body),
                },
            }))
        } else {
            self.expect_after_newlines(Token::Colon)?;
            self.skip_newlines();
            let ty = self.parse_type()?;
            Ok(TypeMember::Field(RecordField {
                span: self.span_from(name_span.start),
                name,
                ty,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(source: &str) -> Module {
        let source = source.into();
        Parser::new(&source).parse_module().unwrap()
    }

    fn module_err(source: &str) -> ParseError {
        let source = source.into();
        Parser::new(&source).parse_module().unwrap_err()
    }

    fn func(stmt: &Stmt) -> &FuncDecl {
        match &stmt.kind {
            StmtKind::Func(func) => func,
            kind => panic!("expected a function declaration, got {:?}", kind),
        }
    }

    #[test]
    fn test_block_value_may_be_a_negation() {
        let ast = module("f(x) =\n  y = x\n  -y");
        match &func(&ast.body[0]).body.as_ref().map(|body| &body.kind) {
            Some(ExprKind::Block { body, value }) => {
                assert_eq!(body.len(), 1);
                assert!(matches!(value.kind, ExprKind::Unary { op: UnOp::Neg, .. }));
            }
            kind => panic!("expected a block, got {:?}", kind),
        }
    }

    #[test]
    fn test_func_decl() {
        let ast = module("add(a: Int, b: Int): Int = a + b");
        let add = func(&ast.body[0]);
        assert_eq!(add.name, "add");
        assert_eq!(add.params.len(), 2);
        assert_eq!(add.params[1].pat.name(), "b");
        assert_eq!(add.params[1].span, Span::new(12, 18));
        assert_eq!(
            add.ret_type.as_ref().map(|ty| &ty.kind),
            Some(&TypeExprKind::Named("Int".to_string()))
        );
        assert!(add.directives.is_empty());
        assert!(add.body.is_some());
        assert_eq!(ast.body[0].span, Span::new(0, 32));
    }

    #[test]
    fn test_func_decl_across_lines() {
        let ast = module("main(\n  args\n)\n  : Int\n  =\n  0\n");
        let main = func(&ast.body[0]);
        assert_eq!(main.params.len(), 1);
        assert!(main.ret_type.is_some());
        assert_eq!(
            main.body.as_ref().map(|body| &body.kind),
            Some(&ExprKind::Num("0".to_string()))
        );
    }

    #[test]
    fn test_directives() {
        let ast = module("puts(s: Str): Int\n  @extern(\"c\", puts)\n  @inline\n");
        let puts = func(&ast.body[0]);
        assert!(puts.body.is_none());
        assert_eq!(puts.directives.len(), 2);
        assert_eq!(puts.directives[0].name, "extern");
        assert_eq!(
            puts.directives[0]
                .args
                .iter()
                .map(|arg| arg.kind.clone())
                .collect::<Vec<_>>(),
            vec![
                DirectiveArgKind::Str("c".to_string()),
                DirectiveArgKind::Ident("puts".to_string()),
            ]
        );
        assert_eq!(puts.directives[1].name, "inline");
        assert!(puts.directives[1].args.is_empty());
    }

    #[test]
    fn test_directive_args() {
        let ast = module("f() @config(true, (1), [a, [0x2f]]) = 0");
        let args = &func(&ast.body[0]).directives[0].args;
        assert_eq!(args[0].kind, DirectiveArgKind::Bool(true));
        assert_eq!(args[1].kind, DirectiveArgKind::Num("1".to_string()));
        assert_eq!(args[1].span, Span::new(18, 21));
        match &args[2].kind {
            DirectiveArgKind::Array(items) => {
                assert_eq!(items.len(), 2);
                assert!(matches!(items[1].kind, DirectiveArgKind::Array(_)));
            }
            kind => panic!("expected an array, got {:?}", kind),
        }
    }

    #[test]
    fn test_global_decl() {
        let ast = module("answer: Int = 42\ngreeting = \"hi\"");
        match &ast.body[0].kind {
            StmtKind::Global(decl) => {
                assert_eq!(decl.pat.name(), "answer");
                assert!(decl.ty.is_some());
                assert_eq!(decl.value.kind, ExprKind::Num("42".to_string()));
            }
            kind => panic!("expected a global, got {:?}", kind),
        }
        assert!(matches!(ast.body[1].kind, StmtKind::Global(_)));
    }

    #[test]
    fn test_type_decl() {
        let ast = module(
            "type Point {\n  x: Int\n  y: Int,\n  norm2(self) = self.x * self.x + self.y * self.y\n}",
        );
        match &ast.body[0].kind {
            StmtKind::Type(decl) => {
                assert_eq!(decl.name, "Point");
                let fields: Vec<_> = decl.fields.iter().map(|field| field.name.as_str()).collect();
                assert_eq!(fields, vec!["x", "y"]);
                assert_eq!(decl.methods.len(), 1);
                assert_eq!(decl.methods[0].func.name, "norm2");
                assert!(decl.methods[0].func.body.is_some());
            }
            kind => panic!("expected a type declaration, got {:?}", kind),
        }
    }

    #[test]
    fn test_local_statements() {
        let ast = module("main() =\n  let x: Int = 1\n  y = x\n  twice(n) = n * 2\n  twice(y)\n");
        let body = func(&ast.body[0]).body.as_ref().unwrap();
        match &body.kind {
            ExprKind::Block { body, value } => {
                assert_eq!(body.len(), 3);
                assert!(matches!(body[0].kind, StmtKind::Let(_)));
                assert!(matches!(body[1].kind, StmtKind::Let(_)));
                assert!(matches!(body[2].kind, StmtKind::Func(_)));
                assert!(matches!(value.kind, ExprKind::Call { .. }));
            }
            kind => panic!("expected a block, got {:?}", kind),
        }
    }

    #[test]
    fn test_block_ends_before_next_module_stmt() {
        let ast = module("main() =\n  x = 1\n  x\nanswer = 42\n");
        assert_eq!(ast.body.len(), 2);
        assert!(matches!(ast.body[1].kind, StmtKind::Global(_)));
    }

    #[test]
    fn test_invalid_module_stmt() {
        assert_eq!(
            module_err("1 + 1"),
            ParseError::Syntax {
                expected: "module statement".to_string(),
                found: "number `1`".to_string(),
                span: Span::new(0, 1),
            }
        );
        assert_eq!(
            module_err("type Point { x Int }"),
            ParseError::Syntax {
                expected: "`:`".to_string(),
                found: "identifier `Int`".to_string(),
                span: Span::new(15, 18),
            }
        );
    }
}
