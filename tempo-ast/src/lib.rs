#![forbid(unsafe_code)]

//! Intermediate representation for tempo programs.
//!
//! Expressions and commands are closed sum types; every transformation builds
//! a new tree. The cost of a command is derived by one-step unfolding against
//! the current annotations of all functions in the program.

use miette::SourceSpan;

pub mod build;
mod command;
mod display;
mod error;
mod expr;
mod program;
mod unknowns;

pub use command::{make_block, Command, CostModel};
pub use error::IrError;
pub use expr::{BinOp, Expr, Literal, Substitution, UnaryOp};
pub use program::{Function, Program};
pub use unknowns::{scale_annotation, FreshNames, UnknownKind, OFFSET_PREFIX, SCALE_PREFIX};

pub type Span = SourceSpan;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spanned<T> {
    pub span: Span,
    pub node: T,
}

impl<T> Spanned<T> {
    pub fn new(span: Span, node: T) -> Self {
        Self { span, node }
    }
}

pub type Ident = Spanned<String>;

pub fn span(start: usize, len: usize) -> Span {
    SourceSpan::new(start.into(), len)
}

pub fn span_between(start: usize, end: usize) -> Span {
    debug_assert!(end >= start);
    span(start, end - start)
}
