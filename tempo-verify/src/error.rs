#![forbid(unsafe_code)]
#![allow(unused_assignments)]

use miette::Diagnostic;
use tempo_ast::IrError;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
#[allow(unused_assignments)]
pub enum VerifyError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Ir(#[from] IrError),

    #[error("cannot encode `{expr}`: {message}")]
    #[diagnostic(code(tempo::verify::encode))]
    Encode { expr: String, message: String },

    #[error("no SMT solver available: {message}")]
    #[diagnostic(
        code(tempo::verify::unavailable),
        help("rebuild with `--features z3` (requires libz3), or use `tempo smt` to export the query")
    )]
    SolverUnavailable { message: String },

    #[error("solver failure: {message}")]
    #[diagnostic(code(tempo::verify::solver))]
    Solver { message: String },
}

impl VerifyError {
    pub(crate) fn encode(expr: &tempo_ast::Expr, message: impl Into<String>) -> Self {
        VerifyError::Encode {
            expr: expr.to_string(),
            message: message.into(),
        }
    }
}
