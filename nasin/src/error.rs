use nasin_parser::error::ParseError;
use nasin_passes::LowerError;
use nasin_source::{Diagnostic, Span};
use thiserror::Error;

/// Any error of the pipeline. There is exactly one per failed compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Lower(#[from] LowerError),
}

impl Diagnostic for Error {
    fn span(&self) -> Span {
        match self {
            Error::Parse(err) => err.span(),
            Error::Lower(err) => err.span(),
        }
    }
}
