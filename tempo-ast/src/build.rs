#![forbid(unsafe_code)]

//! Shorthand constructors for expression trees.

use crate::expr::{BinOp, Expr, Literal, UnaryOp};

pub fn var(name: impl Into<String>) -> Expr {
    Expr::Var(name.into())
}

pub fn int(n: i64) -> Expr {
    Expr::Const(Literal::Int(n))
}

pub fn boolean(b: bool) -> Expr {
    Expr::Const(Literal::Bool(b))
}

pub fn add(a: Expr, b: Expr) -> Expr {
    Expr::binary(BinOp::Add, a, b)
}

pub fn sub(a: Expr, b: Expr) -> Expr {
    Expr::binary(BinOp::Sub, a, b)
}

pub fn mul(a: Expr, b: Expr) -> Expr {
    Expr::binary(BinOp::Mul, a, b)
}

pub fn leq(a: Expr, b: Expr) -> Expr {
    Expr::binary(BinOp::Le, a, b)
}

pub fn and(a: Expr, b: Expr) -> Expr {
    Expr::binary(BinOp::And, a, b)
}

pub fn or(a: Expr, b: Expr) -> Expr {
    Expr::binary(BinOp::Or, a, b)
}

pub fn not(a: Expr) -> Expr {
    Expr::unary(UnaryOp::Not, a)
}

/// Integer-valued conditional; encodes to the solver's native if-then-else.
pub fn ite(cond: Expr, then_expr: Expr, else_expr: Expr) -> Expr {
    Expr::cond(cond, then_expr, else_expr)
}

/// `(cond ∧ t) ∨ (¬cond ∧ f)`.
///
/// Only meaningful when both branches are propositions; use [`ite`] for
/// integer branches.
pub fn bool_ite(cond: Expr, t: Expr, f: Expr) -> Expr {
    or(and(cond.clone(), t), and(not(cond), f))
}

/// `a ∨ (b ∨ (... ∨ z))`, nested to the right. An empty list is `False`.
pub fn disjunction(items: impl IntoIterator<Item = Expr>) -> Expr {
    let mut items: Vec<Expr> = items.into_iter().collect();
    match items.pop() {
        Some(last) => items.into_iter().rev().fold(last, |rest, e| or(e, rest)),
        None => boolean(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_ite_is_a_guarded_disjunction() {
        let c = leq(var("n"), int(0));
        let e = bool_ite(c.clone(), boolean(true), leq(var("m"), var("n")));
        assert_eq!(
            e,
            or(
                and(c.clone(), boolean(true)),
                and(not(c), leq(var("m"), var("n")))
            )
        );
        assert_eq!(e.to_string(), "n <= 0 and True or not n <= 0 and m <= n");
    }

    #[test]
    fn disjunction_nests_to_the_right() {
        let (a, b, c) = (
            leq(var("a"), int(0)),
            leq(var("b"), int(0)),
            leq(var("c"), int(0)),
        );
        assert_eq!(
            disjunction([a.clone(), b.clone(), c.clone()]),
            or(a.clone(), or(b, c))
        );
        assert_eq!(disjunction([a.clone()]), a);
        assert_eq!(disjunction(Vec::new()), boolean(false));
    }
}
