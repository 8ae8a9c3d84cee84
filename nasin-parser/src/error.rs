use nasin_source::{Diagnostic, Span};
use thiserror::Error;

/// The first lexical or syntax error of a parse. There is no recovery: parsing stops here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No token pattern matches the input at `span`.
    #[error("unrecognized input `{text}`")]
    Lex { text: String, span: Span },
    /// A required construct is missing.
    #[error("expected {expected}, found {found}")]
    Syntax {
        expected: String,
        found: String,
        span: Span,
    },
}

impl Diagnostic for ParseError {
    fn span(&self) -> Span {
        match self {
            ParseError::Lex { span, .. } | ParseError::Syntax { span, .. } => *span,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
