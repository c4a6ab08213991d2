#![forbid(unsafe_code)]

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use crate::error::IrError;

/// Maps variable names to the expressions that replace them.
pub type Substitution = HashMap<String, Expr>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Literal {
    Int(i64),
    Bool(bool),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Mod,

    Le,
    Lt,
    Ge,
    Gt,
    Eq,
    Ne,

    And,
    Or,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 2] = [UnaryOp::Neg, UnaryOp::Not];

    /// Solver-facing operator tag.
    pub fn tag(self) -> &'static str {
        match self {
            UnaryOp::Neg => "neg",
            UnaryOp::Not => "not",
        }
    }

    pub fn from_tag(tag: &str) -> Result<Self, IrError> {
        Self::ALL
            .into_iter()
            .find(|op| op.tag().eq_ignore_ascii_case(tag))
            .ok_or_else(|| IrError::UnknownOperator {
                tag: tag.to_string(),
            })
    }
}

impl BinOp {
    pub const ALL: [BinOp; 12] = [
        BinOp::Add,
        BinOp::Sub,
        BinOp::Mul,
        BinOp::Mod,
        BinOp::Le,
        BinOp::Lt,
        BinOp::Ge,
        BinOp::Gt,
        BinOp::Eq,
        BinOp::Ne,
        BinOp::And,
        BinOp::Or,
    ];

    /// Solver-facing operator tag.
    pub fn tag(self) -> &'static str {
        match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mult",
            BinOp::Mod => "ints_modulus",
            BinOp::Le => "leq",
            BinOp::Lt => "lt",
            BinOp::Ge => "geq",
            BinOp::Gt => "gt",
            BinOp::Eq => "equal",
            BinOp::Ne => "distinct",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }

    pub fn from_tag(tag: &str) -> Result<Self, IrError> {
        Self::ALL
            .into_iter()
            .find(|op| op.tag().eq_ignore_ascii_case(tag))
            .ok_or_else(|| IrError::UnknownOperator {
                tag: tag.to_string(),
            })
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Mod)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Le | BinOp::Lt | BinOp::Ge | BinOp::Gt | BinOp::Eq | BinOp::Ne
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

impl FromStr for UnaryOp {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}

impl FromStr for BinOp {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}

/// Integer/boolean term.
///
/// `Cond` never comes out of the parser; it only appears in derived cost
/// expressions, where the two branches are integer-valued.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expr {
    Var(String),
    Const(Literal),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Cond {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
}

impl Expr {
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn cond(cond: Expr, then_expr: Expr, else_expr: Expr) -> Self {
        Expr::Cond {
            cond: Box::new(cond),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        }
    }

    /// Builds a unary node from a solver operator tag, rejecting unknown tags.
    pub fn unary_tagged(tag: &str, operand: Expr) -> Result<Self, IrError> {
        Ok(Self::unary(UnaryOp::from_tag(tag)?, operand))
    }

    /// Builds a binary node from a solver operator tag, rejecting unknown tags.
    pub fn binary_tagged(tag: &str, left: Expr, right: Expr) -> Result<Self, IrError> {
        Ok(Self::binary(BinOp::from_tag(tag)?, left, right))
    }

    /// Free variable names of the tree.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    pub fn collect_variables(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Var(name) => {
                out.insert(name.clone());
            }
            Expr::Const(_) => {}
            Expr::Unary { operand, .. } => operand.collect_variables(out),
            Expr::Binary { left, right, .. } => {
                left.collect_variables(out);
                right.collect_variables(out);
            }
            Expr::Cond {
                cond,
                then_expr,
                else_expr,
            } => {
                cond.collect_variables(out);
                then_expr.collect_variables(out);
                else_expr.collect_variables(out);
            }
        }
    }

    /// Replaces every mapped variable with its replacement.
    ///
    /// Replacements are inserted as-is (they are not substituted again) and no
    /// arithmetic is folded.
    pub fn substitute_evaluate(&self, subs: &Substitution) -> Expr {
        match self {
            Expr::Var(name) => subs.get(name).cloned().unwrap_or_else(|| self.clone()),
            Expr::Const(_) => self.clone(),
            Expr::Unary { op, operand } => Expr::unary(*op, operand.substitute_evaluate(subs)),
            Expr::Binary { op, left, right } => Expr::binary(
                *op,
                left.substitute_evaluate(subs),
                right.substitute_evaluate(subs),
            ),
            Expr::Cond {
                cond,
                then_expr,
                else_expr,
            } => Expr::cond(
                cond.substitute_evaluate(subs),
                then_expr.substitute_evaluate(subs),
                else_expr.substitute_evaluate(subs),
            ),
        }
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        Expr::Const(Literal::Int(n))
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        Expr::Const(Literal::Bool(b))
    }
}
