use super::*;

impl<'a> Parser<'a> {
    /* Types */
    /// Parses a type expression.
    pub(crate) fn parse_type(&mut self) -> ParseResult<TypeExpr> {
        self.nested(Self::parse_type_inner)
    }

    fn parse_type_inner(&mut self) -> ParseResult<TypeExpr> {
        let start = self.current_span.start;
        let kind = match self.current_token {
            Token::Ident(ref name) => {
                let name = name.clone();
                self.next();
                // type arguments must start on the same line
                if !self.at(&Token::OpenParen) {
                    TypeExprKind::Named(name)
                } else {
                    self.next();
                    self.skip_newlines();
                    let args = self.sep_by1(
                        Trailing::None,
                        "type",
                        "`,` or `)`",
                        |p| p.at(&Token::CloseParen),
                        |p| p.eat_list_sep(&Token::CloseParen),
                        Self::parse_type,
                    )?;
                    self.expect(Token::CloseParen)?;
                    TypeExprKind::Generic { name, args }
                }
            }
            Token::OpenBracket => {
                self.next();
                let item = self.parse_type()?;
                let len = if self.eat(Token::Semi) {
                    Some(self.parse_array_len()?)
                } else {
                    None
                };
                self.expect(Token::CloseBracket)?;
                TypeExprKind::Array {
                    item: Box::new(item),
                    len,
                }
            }
            Token::OpenParen => {
                self.next();
                self.skip_newlines();
                let mut ty = self.parse_type()?;
                self.skip_newlines();
                self.expect(Token::CloseParen)?;
                ty.span = self.span_from(start);
                return Ok(ty);
            }
            _ => return self.unexpected("type"),
        };
        Ok(TypeExpr {
            span: self.span_from(start),
            kind,
        })
    }

    fn parse_array_len(&mut self) -> ParseResult<String> {
        match self.current_token {
            Token::Number(ref len) => {
                let len = len.clone();
                self.next();
                Ok(len)
            }
            _ => self.unexpected("array length"),
        }
    }

    /* Patterns */
    pub(crate) fn parse_pat(&mut self) -> ParseResult<Pat> {
        let (name, span) = self.expect_ident("pattern")?;
        Ok(Pat {
            span,
            kind: PatKind::Name(name),
        })
    }
}
