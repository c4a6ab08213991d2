#![forbid(unsafe_code)]

use std::fmt::Write as _;

use tempo_ast::{BinOp, Expr, Literal, UnaryOp};

use crate::error::VerifyError;
use crate::query::Query;

/// Renders `query` as a self-contained SMT-LIB2 script.
pub fn render_smtlib(query: &Query) -> Result<String, VerifyError> {
    query.check_sorts()?;

    let mut out = String::new();
    // Options must precede `set-logic`.
    out.push_str("(set-option :produce-models true)\n");
    out.push_str("(set-logic ALL)\n");

    for unknown in &query.unknowns {
        let _ = writeln!(out, "(declare-const {} Int)", unknown.name);
        let _ = writeln!(
            out,
            "(assert (>= {} {}))",
            unknown.name,
            int_literal(unknown.lower_bound())
        );
    }

    for ob in &query.obligations {
        let _ = writeln!(out, "; {}", ob.function);
        let body = sexpr(&ob.formula);
        if ob.binders.is_empty() {
            let _ = writeln!(out, "(assert {body})");
        } else {
            let binders: Vec<String> = ob.binders.iter().map(|b| format!("({b} Int)")).collect();
            let _ = writeln!(out, "(assert (forall ({}) {body}))", binders.join(" "));
        }
    }

    out.push_str("(check-sat)\n");
    if !query.unknowns.is_empty() {
        let names: Vec<&str> = query.unknown_names().collect();
        let _ = writeln!(out, "(get-value ({}))", names.join(" "));
    }
    Ok(out)
}

fn int_literal(n: i64) -> String {
    if n < 0 {
        format!("(- {})", n.unsigned_abs())
    } else {
        n.to_string()
    }
}

fn smt_op(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Mod => "mod",
        BinOp::Le => "<=",
        BinOp::Lt => "<",
        BinOp::Ge => ">=",
        BinOp::Gt => ">",
        BinOp::Eq => "=",
        BinOp::Ne => "distinct",
        BinOp::And => "and",
        BinOp::Or => "or",
    }
}

pub fn sexpr(expr: &Expr) -> String {
    match expr {
        Expr::Var(name) => name.clone(),
        Expr::Const(Literal::Int(n)) => int_literal(*n),
        Expr::Const(Literal::Bool(b)) => b.to_string(),
        Expr::Unary { op, operand } => {
            let head = match op {
                UnaryOp::Neg => "-",
                UnaryOp::Not => "not",
            };
            format!("({head} {})", sexpr(operand))
        }
        Expr::Binary { op, left, right } => {
            format!("({} {} {})", smt_op(*op), sexpr(left), sexpr(right))
        }
        Expr::Cond {
            cond,
            then_expr,
            else_expr,
        } => format!(
            "(ite {} {} {})",
            sexpr(cond),
            sexpr(then_expr),
            sexpr(else_expr)
        ),
    }
}
