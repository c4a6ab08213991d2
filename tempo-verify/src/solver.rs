#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VerifyError;
use crate::query::Query;

/// Outcome of one satisfiability check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Every obligation holds for the reported unknown values.
    Sat { witnesses: BTreeMap<String, i64> },
    Unsat,
    Unknown { reason: String },
}

pub trait Prover {
    fn check(&mut self, query: &Query) -> Result<Verdict, VerifyError>;

    /// Backends without a resource limit ignore this.
    fn set_profile(&mut self, _profile: SmtProfile) {}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtProfile {
    /// Interactive use.
    Fast,
    #[default]
    Ci,
    /// Nonlinear programs with several unknowns.
    Thorough,
}

impl SmtProfile {
    pub fn timeout_ms(self) -> u32 {
        match self {
            SmtProfile::Fast => 2_000,
            SmtProfile::Ci => 10_000,
            SmtProfile::Thorough => 60_000,
        }
    }
}

impl fmt::Display for SmtProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SmtProfile::Fast => "fast",
            SmtProfile::Ci => "ci",
            SmtProfile::Thorough => "thorough",
        })
    }
}

impl FromStr for SmtProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fast" => Ok(SmtProfile::Fast),
            "ci" => Ok(SmtProfile::Ci),
            "thorough" => Ok(SmtProfile::Thorough),
            other => Err(format!(
                "unknown SMT profile `{other}` (expected fast, ci, or thorough)"
            )),
        }
    }
}

/// Fallback prover when compiled without `--features tempo-verify/z3`.
///
/// This keeps the workspace buildable on machines without Z3.
pub struct NoZ3Prover;

impl Prover for NoZ3Prover {
    fn check(&mut self, _query: &Query) -> Result<Verdict, VerifyError> {
        Err(VerifyError::SolverUnavailable {
            message: "Z3 prover is not enabled. Rebuild with `--features tempo-verify/z3`."
                .to_string(),
        })
    }
}

#[cfg(feature = "z3")]
pub mod z3_prover {
    use std::collections::{BTreeMap, HashMap};

    use tempo_ast::{BinOp, Expr, Literal, UnaryOp};
    use z3::{
        ast::{forall_const, Ast, Bool, Int},
        Config, Context, Params, SatResult, Solver,
    };

    use super::{Prover, SmtProfile, Verdict};
    use crate::error::VerifyError;
    use crate::query::Query;

    enum Term<'ctx> {
        Int(Int<'ctx>),
        Bool(Bool<'ctx>),
    }

    /// Z3-backed prover. Every query gets a fresh context and solver session.
    #[derive(Default)]
    pub struct Z3Prover {
        profile: SmtProfile,
    }

    impl Z3Prover {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_profile(profile: SmtProfile) -> Self {
            Self { profile }
        }
    }

    impl Prover for Z3Prover {
        fn set_profile(&mut self, profile: SmtProfile) {
            self.profile = profile;
        }

        fn check(&mut self, query: &Query) -> Result<Verdict, VerifyError> {
            query.check_sorts()?;

            let mut cfg = Config::new();
            cfg.set_model_generation(true);
            let ctx = Context::new(&cfg);

            let solver = Solver::new(&ctx);
            let mut params = Params::new(&ctx);
            params.set_u32("timeout", self.profile.timeout_ms());
            // Deterministic runs.
            params.set_u32("smt.random_seed", 0);
            params.set_u32("sat.random_seed", 0);
            solver.set_params(&params);

            let mut globals: HashMap<String, Int<'_>> = HashMap::new();
            for unknown in &query.unknowns {
                let c = Int::new_const(&ctx, unknown.name.as_str());
                solver.assert(&c.ge(&Int::from_i64(&ctx, unknown.lower_bound())));
                globals.insert(unknown.name.clone(), c);
            }

            for ob in &query.obligations {
                let mut scope = globals.clone();
                let bound: Vec<Int<'_>> = ob
                    .binders
                    .iter()
                    .map(|name| {
                        let v = Int::new_const(&ctx, name.as_str());
                        scope.insert(name.clone(), v.clone());
                        v
                    })
                    .collect();

                let body = encode_bool(&ctx, &scope, &ob.formula)?;
                if bound.is_empty() {
                    solver.assert(&body);
                } else {
                    let bound_refs: Vec<&dyn Ast<'_>> =
                        bound.iter().map(|v| v as &dyn Ast<'_>).collect();
                    solver.assert(&forall_const(&ctx, &bound_refs, &[], &body));
                }
            }

            match solver.check() {
                SatResult::Sat => {
                    let model = solver.get_model().ok_or_else(|| VerifyError::Solver {
                        message: "Z3 reported sat but produced no model".to_string(),
                    })?;
                    let mut witnesses = BTreeMap::new();
                    for unknown in &query.unknowns {
                        let Some(c) = globals.get(&unknown.name) else {
                            continue;
                        };
                        let value = model
                            .eval(c, true)
                            .and_then(|v| v.as_i64())
                            .ok_or_else(|| VerifyError::Solver {
                                message: format!(
                                    "model value for `{}` is not a 64-bit integer",
                                    unknown.name
                                ),
                            })?;
                        witnesses.insert(unknown.name.clone(), value);
                    }
                    Ok(Verdict::Sat { witnesses })
                }
                SatResult::Unsat => Ok(Verdict::Unsat),
                SatResult::Unknown => Ok(Verdict::Unknown {
                    reason: solver
                        .get_reason_unknown()
                        .unwrap_or_else(|| "unknown".to_string()),
                }),
            }
        }
    }

    fn encode<'ctx>(
        ctx: &'ctx Context,
        scope: &HashMap<String, Int<'ctx>>,
        expr: &Expr,
    ) -> Result<Term<'ctx>, VerifyError> {
        Ok(match expr {
            Expr::Var(name) => match scope.get(name) {
                Some(v) => Term::Int(v.clone()),
                None => {
                    return Err(VerifyError::encode(expr, format!("`{name}` is not bound")));
                }
            },
            Expr::Const(Literal::Int(n)) => Term::Int(Int::from_i64(ctx, *n)),
            Expr::Const(Literal::Bool(b)) => Term::Bool(Bool::from_bool(ctx, *b)),
            Expr::Unary { op, operand } => match op {
                UnaryOp::Neg => Term::Int(encode_int(ctx, scope, operand)?.unary_minus()),
                UnaryOp::Not => Term::Bool(encode_bool(ctx, scope, operand)?.not()),
            },
            Expr::Binary { op, left, right } => {
                if op.is_logical() {
                    let l = encode_bool(ctx, scope, left)?;
                    let r = encode_bool(ctx, scope, right)?;
                    return Ok(Term::Bool(match op {
                        BinOp::And => Bool::and(ctx, &[&l, &r]),
                        _ => Bool::or(ctx, &[&l, &r]),
                    }));
                }
                if matches!(op, BinOp::Eq | BinOp::Ne) {
                    let eq = match (encode(ctx, scope, left)?, encode(ctx, scope, right)?) {
                        (Term::Int(l), Term::Int(r)) => l._eq(&r),
                        (Term::Bool(l), Term::Bool(r)) => l._eq(&r),
                        _ => return Err(VerifyError::encode(expr, "operands differ in sort")),
                    };
                    return Ok(Term::Bool(if *op == BinOp::Eq { eq } else { eq.not() }));
                }

                let l = encode_int(ctx, scope, left)?;
                let r = encode_int(ctx, scope, right)?;
                match op {
                    BinOp::Add => Term::Int(Int::add(ctx, &[&l, &r])),
                    BinOp::Sub => Term::Int(Int::sub(ctx, &[&l, &r])),
                    BinOp::Mul => Term::Int(Int::mul(ctx, &[&l, &r])),
                    BinOp::Mod => Term::Int(l.modulo(&r)),
                    BinOp::Le => Term::Bool(l.le(&r)),
                    BinOp::Lt => Term::Bool(l.lt(&r)),
                    BinOp::Ge => Term::Bool(l.ge(&r)),
                    BinOp::Gt => Term::Bool(l.gt(&r)),
                    BinOp::Eq | BinOp::Ne | BinOp::And | BinOp::Or => {
                        return Err(VerifyError::encode(expr, "unexpected operator"));
                    }
                }
            }
            Expr::Cond {
                cond,
                then_expr,
                else_expr,
            } => {
                let c = encode_bool(ctx, scope, cond)?;
                match (
                    encode(ctx, scope, then_expr)?,
                    encode(ctx, scope, else_expr)?,
                ) {
                    (Term::Int(t), Term::Int(e)) => Term::Int(c.ite(&t, &e)),
                    (Term::Bool(t), Term::Bool(e)) => Term::Bool(c.ite(&t, &e)),
                    _ => return Err(VerifyError::encode(expr, "branches differ in sort")),
                }
            }
        })
    }

    fn encode_int<'ctx>(
        ctx: &'ctx Context,
        scope: &HashMap<String, Int<'ctx>>,
        expr: &Expr,
    ) -> Result<Int<'ctx>, VerifyError> {
        match encode(ctx, scope, expr)? {
            Term::Int(i) => Ok(i),
            Term::Bool(_) => Err(VerifyError::encode(expr, "expected an integer term")),
        }
    }

    fn encode_bool<'ctx>(
        ctx: &'ctx Context,
        scope: &HashMap<String, Int<'ctx>>,
        expr: &Expr,
    ) -> Result<Bool<'ctx>, VerifyError> {
        match encode(ctx, scope, expr)? {
            Term::Bool(b) => Ok(b),
            Term::Int(_) => Err(VerifyError::encode(expr, "expected a boolean term")),
        }
    }
}
