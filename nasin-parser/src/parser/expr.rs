use super::*;

impl<'a> Parser<'a> {
    /* Expressions */
    /// Parses any expression, including blocks.
    pub fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.nested(|p| {
            if p.at_block_stmt() {
                p.parse_block_expr()
            } else {
                p.parse_expr_bp(0) // 0 to accept any expression
            }
        })
    }

    /// Parses an expression with the specified `min_bp`.
    /// To parse any expression use, [`Self::parse_expr`].
    ///
    /// The left spine is climbed iteratively, only right operands recurse.
    pub(crate) fn parse_expr_bp(&mut self, min_bp: u8) -> ParseResult<Expr> {
        self.nested(|p| p.parse_binary_expr(min_bp))
    }

    fn parse_binary_expr(&mut self, min_bp: u8) -> ParseResult<Expr> {
        let mut lhs = self.parse_prefix_expr()?;

        loop {
            // a binop on the next line continues the expression, unless it can also start
            // one: `-x` on its own line is a new item
            let on_new_line = self.at(&Token::Newline);
            let next = self.peek_past_newlines();
            let op = if on_new_line && next.unop().is_some() {
                None
            } else {
                next.binop()
            };
            let op = match op {
                Some(op) => op,
                None => break, // not a valid binop, stop parsing
            };
            let (l_bp, r_bp) = op.binding_power();
            if l_bp < min_bp {
                break; // less than the min_bp, stop parsing
            }

            self.skip_newlines();
            self.next(); // eat binop
            self.skip_newlines();

            let rhs = self.parse_expr_bp(r_bp)?;
            let span = lhs.span.to(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }

        Ok(lhs)
    }

    fn parse_prefix_expr(&mut self) -> ParseResult<Expr> {
        let op = match self.current_token.unop() {
            Some(op) => op,
            None => return self.parse_postfix_expr(),
        };
        let start = self.current_span.start;
        self.next(); // eat prefix operator
        self.skip_newlines();

        let operand = self.parse_expr_bp(UnOp::BINDING_POWER)?;
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            self.span_from(start),
        ))
    }

    /// Parses an atom followed by any number of calls and property accesses.
    fn parse_postfix_expr(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary_expr()?;

        loop {
            let start = expr.span.start;
            // a `(` on the next line never starts a call
            if self.at(&Token::OpenParen) {
                let args = self.parse_args()?;
                expr = Expr::new(
                    ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                    },
                    self.span_from(start),
                );
            } else if self.eat_after_newlines(Token::Dot) {
                self.skip_newlines();
                let (name, _) = self.expect_ident("property name")?;
                expr = Expr::new(
                    ExprKind::GetProp {
                        parent: Box::new(expr),
                        name,
                    },
                    self.span_from(start),
                );
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parses a primary (atom) expression.
    fn parse_primary_expr(&mut self) -> ParseResult<Expr> {
        let start = self.current_span.start;
        let kind = match self.current_token {
            Token::Number(ref num) => ExprKind::Num(num.clone()),
            Token::Str(ref string) => ExprKind::Str(string.clone()),
            Token::Ident(ref ident) => ExprKind::Ident(ident.clone()),
            Token::True => ExprKind::Bool(true),
            Token::False => ExprKind::Bool(false),
            Token::OpenParen => return self.parse_paren_expr(),
            Token::OpenBracket => {
                let items = self.delimited(
                    Token::OpenBracket,
                    Token::CloseBracket,
                    Trailing::Optional,
                    "expression",
                    Self::parse_expr,
                )?;
                return Ok(Expr::new(ExprKind::Array(items), self.span_from(start)));
            }
            Token::OpenBrace => {
                let fields = self.delimited(
                    Token::OpenBrace,
                    Token::CloseBrace,
                    Trailing::Optional,
                    "record field",
                    Self::parse_record_lit_field,
                )?;
                return Ok(Expr::new(ExprKind::Record(fields), self.span_from(start)));
            }
            Token::Fn => return self.parse_lambda_expr(),
            Token::At => return self.parse_macro_expr(),
            Token::If => return self.parse_if_expr(),
            _ => return self.unexpected("expression"),
        };
        self.next(); // eat literal or identifier
        Ok(Expr::new(kind, self.span_from(start)))
    }

    /// Parses `( expr )`. The grouped expression keeps its own node, widened to cover the
    /// parentheses.
    fn parse_paren_expr(&mut self) -> ParseResult<Expr> {
        let start = self.expect(Token::OpenParen)?.start;
        self.skip_newlines();
        let mut expr = self.parse_expr()?;
        self.skip_newlines();
        self.expect(Token::CloseParen)?;
        expr.span = self.span_from(start);
        Ok(expr)
    }

    fn parse_args(&mut self) -> ParseResult<Vec<Expr>> {
        self.delimited(
            Token::OpenParen,
            Token::CloseParen,
            Trailing::Optional,
            "expression",
            Self::parse_expr,
        )
    }

    fn parse_record_lit_field(&mut self) -> ParseResult<RecordLitField> {
        let (name, name_span) = self.expect_ident("record field")?;
        self.expect_after_newlines(Token::Equals)?;
        self.skip_newlines();
        let value = self.parse_expr()?;
        Ok(RecordLitField {
            span: self.span_from(name_span.start),
            name,
            value,
        })
    }

    /// Parses `fn (params) = body`.
    fn parse_lambda_expr(&mut self) -> ParseResult<Expr> {
        let start = self.expect(Token::Fn)?.start;
        let params = self.parse_params()?;
        self.expect_after_newlines(Token::Equals)?;
        self.skip_newlines();
        let body = self.parse_expr()?;
        Ok(Expr::new(
            ExprKind::Lambda {
                params,
                body: Box::new(body),
            },
            self.span_from(start),
        ))
    }

    /// Parses `@name(args)`.
    fn parse_macro_expr(&mut self) -> ParseResult<Expr> {
        let start = self.expect(Token::At)?.start;
        let (name, _) = self.expect_ident("macro name")?;
        let args = self.parse_args()?;
        Ok(Expr::new(ExprKind::Macro { name, args }, self.span_from(start)))
    }

    /// Parses `if cond then expr [else expr]`.
    fn parse_if_expr(&mut self) -> ParseResult<Expr> {
        let start = self.expect(Token::If)?.start;
        self.skip_newlines();
        let cond = self.parse_expr()?;
        self.expect_after_newlines(Token::Then)?;
        self.skip_newlines();
        let then = self.parse_expr()?;
        let otherwise = if self.eat_after_newlines(Token::Else) {
            self.skip_newlines();
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        Ok(Expr::new(
            ExprKind::If {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise,
            },
            self.span_from(start),
        ))
    }

    /// Parses local statements followed by the value of the block.
    /// Every statement must be followed by a `;` or a new line.
    fn parse_block_expr(&mut self) -> ParseResult<Expr> {
        let start = self.current_span.start;
        let body = self.sep_by(
            Trailing::Required,
            "local statement",
            "`;` or new line",
            |p| !p.at_block_stmt(),
            Self::eat_stmt_sep,
            Self::parse_block_stmt,
        )?;
        let value = self.parse_expr_bp(0)?;
        Ok(Expr::new(
            ExprKind::Block {
                body,
                value: Box::new(value),
            },
            self.span_from(start),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(source: &str) -> Expr {
        let source = source.into();
        Parser::new(&source).parse_expr_complete().unwrap()
    }

    fn expr_err(source: &str) -> ParseError {
        let source = source.into();
        Parser::new(&source).parse_expr_complete().unwrap_err()
    }

    /// Prints `source` back with every compound operand parenthesized.
    fn grouped(source: &str) -> String {
        expr(source).to_string()
    }

    #[test]
    fn test_literal() {
        assert_eq!(expr("true").kind, ExprKind::Bool(true));
        assert_eq!(expr("false").kind, ExprKind::Bool(false));
        assert_eq!(expr("1").kind, ExprKind::Num("1".to_string()));
        assert_eq!(expr("2.5").kind, ExprKind::Num("2.5".to_string()));
        assert_eq!(expr(r#""hi""#).kind, ExprKind::Str("hi".to_string()));
        assert_eq!(expr("foo").span, Span::new(0, 3));
    }

    #[test]
    fn test_binary_expr() {
        let ast = expr("1 + 2 * 3");
        assert_eq!(ast.span, Span::new(0, 9));
        match ast.kind {
            ExprKind::Binary { op, lhs, rhs } => {
                assert_eq!(op, BinOp::Add);
                assert_eq!(lhs.kind, ExprKind::Num("1".to_string()));
                assert!(matches!(rhs.kind, ExprKind::Binary { op: BinOp::Mul, .. }));
                assert_eq!(rhs.span, Span::new(4, 9));
            }
            kind => panic!("expected a binary expression, got {:?}", kind),
        }
    }

    #[test]
    fn test_binary_precedence() {
        assert_eq!(grouped("1 * 2 + 3"), "(1 * 2) + 3");
        assert_eq!(grouped("1 + 2 * 3"), "1 + (2 * 3)");
        assert_eq!(grouped("a - b - c"), "(a - b) - c");
        assert_eq!(grouped("a / b % c"), "(a / b) % c");
        assert_eq!(grouped("a == b + 1"), "a == (b + 1)");
        assert_eq!(grouped("a < b == c"), "(a < b) == c");
        assert_eq!(grouped("2 * a ** b"), "2 * (a ** b)");
    }

    #[test]
    fn test_pow_is_right_associative() {
        assert_eq!(grouped("a ** b ** c"), "a ** (b ** c)");
    }

    #[test]
    fn test_parentheses_reset_precedence() {
        assert_eq!(grouped("(1 + 2) * 3"), "(1 + 2) * 3");
        assert_eq!(expr("(1 + 2) * 3").span, Span::new(0, 11));
        assert_eq!(expr("(\n  a\n)").span, Span::new(0, 7));
    }

    #[test]
    fn test_unary_expr() {
        assert_eq!(grouped("-a ** 2"), "(-a) ** 2");
        assert_eq!(grouped("not a == b"), "(not a) == b");
        assert_eq!(grouped("- -a"), "-(-a)");
        assert_eq!(grouped("-f(x).y"), "-f(x).y");
    }

    #[test]
    fn test_postfix_expr() {
        assert_eq!(grouped("a.b.c"), "a.b.c");
        assert_eq!(grouped("a.b(c)(d)"), "a.b(c)(d)");
        match expr("point.x").kind {
            ExprKind::GetProp { parent, name } => {
                assert_eq!(parent.kind, ExprKind::Ident("point".to_string()));
                assert_eq!(name, "x");
            }
            kind => panic!("expected a property access, got {:?}", kind),
        }
    }

    #[test]
    fn test_call_expr() {
        assert_eq!(grouped("foo()"), "foo()");
        assert_eq!(grouped("foo(1, a + b,\n  bar)"), "foo(1, a + b, bar)");
        assert_eq!(grouped("@print(\"hi\", 1)"), "@print(\"hi\", 1)");
    }

    #[test]
    fn test_newlines_continue_operators() {
        assert_eq!(grouped("1 +\n  2"), "1 + 2");
        assert_eq!(grouped("1\n  * 2"), "1 * 2");
        assert_eq!(grouped("list\n  .len"), "list.len");
    }

    #[test]
    fn test_minus_on_a_new_line_starts_an_item() {
        assert_eq!(grouped("[\n  1\n  -2\n]"), "[1, -2]");
        assert_eq!(grouped("f(\n  a\n  -1\n)"), "f(a, -1)");
        assert_eq!(grouped("y = x\n-y"), "let y = x; -y");
        assert_eq!(grouped("1 -\n  2"), "1 - 2");
    }

    #[test]
    fn test_call_must_start_on_the_same_line() {
        assert_eq!(
            expr_err("f\n(x)"),
            ParseError::Syntax {
                expected: "end of file".to_string(),
                found: "`(`".to_string(),
                span: Span::new(2, 3),
            }
        );
    }

    #[test]
    fn test_collections() {
        assert_eq!(grouped("[1, 2,\n 3,\n]"), "[1, 2, 3]");
        assert_eq!(grouped("[]"), "[]");
        assert_eq!(grouped("{x = 1\n y = a * 2}"), "{x = 1, y = a * 2}");
    }

    #[test]
    fn test_lambda_expr() {
        assert_eq!(grouped("fn(x) = x * 2"), "fn(x) = x * 2");
        assert_eq!(grouped("map(xs, fn(x) = x + 1)"), "map(xs, fn(x) = x + 1)");
        assert_eq!(grouped("(fn(x) = x) + 1"), "(fn(x) = x) + 1");
    }

    #[test]
    fn test_if_expr() {
        assert_eq!(grouped("if a then b else c"), "if a then b else c");
        assert_eq!(grouped("if a\nthen b\nelse c"), "if a then b else c");
        assert_eq!(grouped("if a < b then b"), "if a < b then b");
        assert_eq!(grouped("1 + if a then 2 else 3"), "1 + (if a then 2 else 3)");
    }

    #[test]
    fn test_block_expr() {
        let ast = expr("x = 5; y = x + 1; y");
        match ast.kind {
            ExprKind::Block { body, value } => {
                assert_eq!(body.len(), 2);
                assert_eq!(value.kind, ExprKind::Ident("y".to_string()));
            }
            kind => panic!("expected a block, got {:?}", kind),
        }
        assert_eq!(grouped("let x = 1\nx"), "let x = 1; x");
        assert_eq!(grouped("double(n) = n * 2\ndouble(3)"), "double(n) = n * 2; double(3)");
    }

    #[test]
    fn test_block_needs_a_value() {
        assert_eq!(
            expr_err("x = 1;"),
            ParseError::Syntax {
                expected: "expression".to_string(),
                found: "end of file".to_string(),
                span: Span::point(6),
            }
        );
    }

    #[test]
    fn test_missing_operand() {
        assert_eq!(
            expr_err("1 + "),
            ParseError::Syntax {
                expected: "expression".to_string(),
                found: "end of file".to_string(),
                span: Span::point(4),
            }
        );
        assert_eq!(
            expr_err("(1 + 2"),
            ParseError::Syntax {
                expected: "`)`".to_string(),
                found: "end of file".to_string(),
                span: Span::point(6),
            }
        );
    }
}
