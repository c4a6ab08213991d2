#![forbid(unsafe_code)]

use tempo_ast::{Expr, Function, Program};

/// Canonical source text: one blank line between definitions, trailing newline.
pub fn format_program(program: &Program) -> String {
    let mut out = String::new();
    for (i, func) in program.functions().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format_function(func));
    }
    out
}

pub fn format_function(func: &Function) -> String {
    let mut out = func.to_string();
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

pub fn format_expr(expr: &Expr) -> String {
    expr.to_string()
}
