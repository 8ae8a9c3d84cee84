//! Reusable building blocks for the grammar rules: repetition and separated lists.

use super::*;

/// What a separated list accepts after its last item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trailing {
    /// The last item must be followed by a separator.
    Required,
    /// A separator after the last item is accepted but not needed.
    Optional,
    /// A separator after the last item is an error.
    None,
}

impl<'a> Parser<'a> {
    /// Parses `item` for as long as `more` holds (zero or more times).
    pub(crate) fn many0<T>(
        &mut self,
        more: impl Fn(&mut Self) -> bool,
        mut item: impl FnMut(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<Vec<T>> {
        let mut items = Vec::new();
        while more(self) {
            items.push(item(self)?);
        }
        Ok(items)
    }

    /// Parses a list of `item`s separated by whatever `eat_sep` consumes, up to (but not
    /// including) the point where `at_end` holds.
    ///
    /// # Params
    /// * `item_name` - Name of the item, for error messages.
    /// * `sep_name` - Name of the separator, for error messages.
    /// * `eat_sep` - Consumes a separator and returns whether there was one.
    pub(crate) fn sep_by<T>(
        &mut self,
        trailing: Trailing,
        item_name: &str,
        sep_name: &str,
        at_end: impl Fn(&mut Self) -> bool,
        eat_sep: impl Fn(&mut Self) -> bool,
        mut item: impl FnMut(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<Vec<T>> {
        let mut items = Vec::new();
        while !at_end(self) {
            items.push(item(self)?);
            let had_sep = eat_sep(self);

            if at_end(self) {
                match trailing {
                    Trailing::Required if !had_sep => return self.unexpected(sep_name),
                    Trailing::None if had_sep => return self.unexpected(item_name),
                    _ => break,
                }
            }
            if !had_sep {
                return self.unexpected(sep_name);
            }
        }
        Ok(items)
    }

    /// Like [`Self::sep_by`] but requires at least one item.
    pub(crate) fn sep_by1<T>(
        &mut self,
        trailing: Trailing,
        item_name: &str,
        sep_name: &str,
        at_end: impl Fn(&mut Self) -> bool,
        eat_sep: impl Fn(&mut Self) -> bool,
        item: impl FnMut(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<Vec<T>> {
        let items = self.sep_by(trailing, item_name, sep_name, at_end, eat_sep, item)?;
        if items.is_empty() {
            return self.unexpected(item_name);
        }
        Ok(items)
    }

    /// Parses `open`, a list of `item`s separated by `,` or new lines, and `close`.
    /// New lines are allowed right after `open` and right before `close`.
    pub(crate) fn delimited<T>(
        &mut self,
        open: Token,
        close: Token,
        trailing: Trailing,
        item_name: &str,
        item: impl FnMut(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<Vec<T>> {
        self.expect(open)?;
        self.skip_newlines();
        let sep_name = format!("`,` or {}", close.describe());
        let items = self.sep_by(
            trailing,
            item_name,
            &sep_name,
            |p| p.at(&close),
            |p| p.eat_list_sep(&close),
            item,
        )?;
        self.expect(close)?;
        Ok(items)
    }

    /// Eats a list separator: a `,`, new lines, or both.
    /// New lines right before `close` are skipped but do not count as a separator.
    pub(crate) fn eat_list_sep(&mut self, close: &Token) -> bool {
        let newline = self.skip_newlines();
        if self.at(close) {
            return false;
        }
        let comma = self.eat(Token::Comma);
        self.skip_newlines();
        newline || comma
    }

    /// Eats a statement separator: any run of `;` and new lines.
    pub(crate) fn eat_stmt_sep(&mut self) -> bool {
        let mut any = false;
        while self.eat(Token::Semi) || self.eat(Token::Newline) {
            any = true;
        }
        any
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Parses `source` as a parenthesized list of identifiers.
    fn idents(source: &str, trailing: Trailing) -> ParseResult<Vec<String>> {
        let source = source.into();
        let mut parser = Parser::new(&source);
        parser.delimited(
            Token::OpenParen,
            Token::CloseParen,
            trailing,
            "name",
            |p| p.expect_ident("name").map(|(ident, _)| ident),
        )
    }

    #[test]
    fn test_delimited_separators() {
        let expected = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(idents("(a, b, c)", Trailing::Optional), Ok(expected.clone()));
        assert_eq!(idents("(\n  a\n  b,\n  c\n)", Trailing::Optional), Ok(expected.clone()));
        assert_eq!(idents("(a, b, c,)", Trailing::Optional), Ok(expected));
        assert_eq!(idents("()", Trailing::Optional), Ok(vec![]));
    }

    #[test]
    fn test_trailing_policies() {
        assert!(idents("(a, b)", Trailing::None).is_ok());
        assert!(idents("(a, b\n)", Trailing::None).is_ok());
        assert_eq!(
            idents("(a, b,)", Trailing::None),
            Err(ParseError::Syntax {
                expected: "name".to_string(),
                found: "`)`".to_string(),
                span: Span::new(6, 7),
            })
        );
        assert!(idents("(a, b,)", Trailing::Required).is_ok());
        assert!(idents("(a, b)", Trailing::Required).is_err());
    }

    #[test]
    fn test_missing_separator() {
        assert_eq!(
            idents("(a b)", Trailing::Optional),
            Err(ParseError::Syntax {
                expected: "`,` or `)`".to_string(),
                found: "identifier `b`".to_string(),
                span: Span::new(3, 4),
            })
        );
    }
}
