#![forbid(unsafe_code)]
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

#[derive(Clone, Debug, Error, Diagnostic, PartialEq, Eq)]
#[allow(unused_assignments)]
pub enum IrError {
    #[error("used variable `{variable}` in function `{function}` which is not among the inputs: [{params}]")]
    #[diagnostic(code(tempo::ir::scope))]
    Scope {
        function: String,
        variable: String,
        params: String,
    },

    #[error("no function named `{name}` to call")]
    #[diagnostic(code(tempo::ir::undefined))]
    UndefinedFunction { name: String },

    #[error("multiple functions named `{name}` ({count} definitions); the call is ambiguous")]
    #[diagnostic(code(tempo::ir::ambiguous))]
    AmbiguousFunction { name: String, count: usize },

    #[error("unknown operator `{tag}`")]
    #[diagnostic(
        code(tempo::ir::operator),
        help("supported operators: neg, not, add, sub, mult, ints_modulus, leq, lt, geq, gt, equal, distinct, and, or")
    )]
    UnknownOperator { tag: String },

    #[error("function `{callee}` takes {expected} argument(s) but the call passes {found}")]
    #[diagnostic(code(tempo::ir::arity))]
    Arity {
        callee: String,
        expected: usize,
        found: usize,
    },
}
