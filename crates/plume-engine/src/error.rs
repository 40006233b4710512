use thiserror::Error;

/// Evaluation failure. Recoverable per call: the expression tree and variable
/// table are untouched, and a later evaluation may succeed once the host has
/// fixed the inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("division by zero")]
    DivideByZero,
    #[error("domain error: {0}")]
    Domain(String),
    #[error("expression has not been parsed")]
    NotParsed,
}
