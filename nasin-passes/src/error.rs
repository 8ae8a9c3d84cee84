use nasin_source::{Diagnostic, Span};
use thiserror::Error;

/// A fatal lowering error. No partial IR is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LowerError {
    /// An identifier has no binding in the current scope or any parent scope.
    #[error("cannot find `{name}` in this scope")]
    UnresolvedName { name: String, span: Span },
    /// The callee of a call lowered to a literal instead of a name.
    #[error("cannot call `{callee}`, only names can be called")]
    InvalidCallee { callee: String, span: Span },
    /// An AST node the pass does not handle at this position.
    #[error("unexpected {node}")]
    UnrecognizedNode { node: String, span: Span },
    /// Expressions nest deeper than [`crate::lower::MAX_DEPTH`].
    #[error("expression is nested too deeply")]
    NestingTooDeep { span: Span },
}

impl Diagnostic for LowerError {
    fn span(&self) -> Span {
        match self {
            LowerError::UnresolvedName { span, .. }
            | LowerError::InvalidCallee { span, .. }
            | LowerError::UnrecognizedNode { span, .. }
            | LowerError::NestingTooDeep { span } => *span,
        }
    }
}

pub type LowerResult<T> = Result<T, LowerError>;
