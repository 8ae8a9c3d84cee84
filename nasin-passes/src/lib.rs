//! Passes over the nasin AST.

pub mod error;
pub mod lower;

pub use error::{LowerError, LowerResult};
pub use lower::{lower_expr, lower_module, Lowerer};
