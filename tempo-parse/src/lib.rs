#![forbid(unsafe_code)]

//! Surface syntax for tempo programs.
//!
//! A program is a sequence of indentation-structured `def`s. The optional
//! `-> "..."` string after the parameter list is the function's claimed cost.

mod error;
mod fmt;
mod parser;

use tempo_ast::build::int;
use tempo_ast::{Expr, Program};
use tempo_lex::Lexer;

pub use error::ParseError;
pub use fmt::{format_expr, format_function, format_program};
pub use parser::Parser;

pub fn parse_source(src: &str) -> miette::Result<Program> {
    let tokens = Lexer::new(src).lex().map_err(miette::Report::new)?;
    let mut parser = Parser::new(&tokens);
    parser.parse_program().map_err(miette::Report::new)
}

pub fn parse_expr(src: &str) -> miette::Result<Expr> {
    let tokens = Lexer::new(src).lex().map_err(miette::Report::new)?;
    let mut parser = Parser::new(&tokens);
    parser.parse_expr_eof().map_err(miette::Report::new)
}

/// Parses the text of a cost annotation.
///
/// Never fails: unparsable text falls back to the constant `1`.
pub fn parse_annotation(text: &str) -> Expr {
    match parse_expr(text) {
        Ok(expr) => expr,
        Err(err) => {
            tracing::warn!(annotation = text, error = %err, "ignoring unparsable cost annotation");
            int(1)
        }
    }
}
