#![forbid(unsafe_code)]

use std::fmt;

use tempo_ast::{BinOp, Expr, Literal, UnaryOp};

use crate::error::VerifyError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sort {
    Int,
    Bool,
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Int => f.write_str("Int"),
            Sort::Bool => f.write_str("Bool"),
        }
    }
}

/// Infers the sort of `expr`. Every variable is an integer.
pub fn check_sort(expr: &Expr) -> Result<Sort, VerifyError> {
    match expr {
        Expr::Var(_) => Ok(Sort::Int),
        Expr::Const(Literal::Int(_)) => Ok(Sort::Int),
        Expr::Const(Literal::Bool(_)) => Ok(Sort::Bool),
        Expr::Unary { op, operand } => {
            let want = match op {
                UnaryOp::Neg => Sort::Int,
                UnaryOp::Not => Sort::Bool,
            };
            expect_sort(operand, want)?;
            Ok(want)
        }
        Expr::Binary { op, left, right } => {
            if op.is_arithmetic() {
                expect_sort(left, Sort::Int)?;
                expect_sort(right, Sort::Int)?;
                Ok(Sort::Int)
            } else if op.is_logical() {
                expect_sort(left, Sort::Bool)?;
                expect_sort(right, Sort::Bool)?;
                Ok(Sort::Bool)
            } else if matches!(op, BinOp::Eq | BinOp::Ne) {
                let l = check_sort(left)?;
                let r = check_sort(right)?;
                if l != r {
                    return Err(VerifyError::encode(
                        expr,
                        format!("`{}` compares {l} with {r}", op.tag()),
                    ));
                }
                Ok(Sort::Bool)
            } else {
                expect_sort(left, Sort::Int)?;
                expect_sort(right, Sort::Int)?;
                Ok(Sort::Bool)
            }
        }
        Expr::Cond {
            cond,
            then_expr,
            else_expr,
        } => {
            expect_sort(cond, Sort::Bool)?;
            let t = check_sort(then_expr)?;
            let e = check_sort(else_expr)?;
            if t != e {
                return Err(VerifyError::encode(
                    expr,
                    format!("conditional branches disagree ({t} vs {e})"),
                ));
            }
            Ok(t)
        }
    }
}

pub fn expect_sort(expr: &Expr, want: Sort) -> Result<(), VerifyError> {
    let got = check_sort(expr)?;
    if got == want {
        Ok(())
    } else {
        Err(VerifyError::encode(
            expr,
            format!("expected {want}, found {got}"),
        ))
    }
}
