#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use crate::build::{add, int, ite};
use crate::error::IrError;
use crate::expr::{Expr, Substitution};
use crate::program::{resolve, Function};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    If {
        cond: Expr,
        then_branch: Box<Command>,
        else_branch: Box<Command>,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
    },
    Block {
        first: Box<Command>,
        second: Box<Command>,
    },
    Pass,
}

/// How many abstract steps a call contributes on top of the callee's bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CostModel {
    pub call_cost: i64,
}

impl CostModel {
    /// Calls cost exactly the callee's substituted annotation.
    pub const fn annotations_only() -> Self {
        Self { call_cost: 0 }
    }

    pub const fn unit_calls() -> Self {
        Self { call_cost: 1 }
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::unit_calls()
    }
}

/// Sequential composition of `commands`, nested to the right.
pub fn make_block(commands: Vec<Command>) -> Command {
    commands
        .into_iter()
        .rev()
        .reduce(|rest, cmd| Command::block(cmd, rest))
        .unwrap_or(Command::Pass)
}

impl Command {
    pub fn if_(cond: Expr, then_branch: Command, else_branch: Command) -> Self {
        Command::If {
            cond,
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }
    }

    pub fn call(callee: impl Into<String>, args: Vec<Expr>) -> Self {
        Command::Call {
            callee: callee.into(),
            args,
        }
    }

    pub fn block(first: Command, second: Command) -> Self {
        Command::Block {
            first: Box::new(first),
            second: Box::new(second),
        }
    }

    pub fn variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    pub fn collect_variables(&self, out: &mut BTreeSet<String>) {
        match self {
            Command::If {
                cond,
                then_branch,
                else_branch,
            } => {
                cond.collect_variables(out);
                then_branch.collect_variables(out);
                else_branch.collect_variables(out);
            }
            Command::Call { args, .. } => {
                for arg in args {
                    arg.collect_variables(out);
                }
            }
            Command::Block { first, second } => {
                first.collect_variables(out);
                second.collect_variables(out);
            }
            Command::Pass => {}
        }
    }

    /// Cost of this command under the default [`CostModel`].
    pub fn eval_complexity(&self, functions: &[Function]) -> Result<Expr, IrError> {
        self.eval_complexity_with(functions, &CostModel::default())
    }

    /// Symbolic cost of running this command once.
    ///
    /// Calls are not unfolded: a call costs the callee's current annotation
    /// with its parameters replaced by the actual arguments.
    pub fn eval_complexity_with(
        &self,
        functions: &[Function],
        model: &CostModel,
    ) -> Result<Expr, IrError> {
        match self {
            Command::Pass => Ok(int(0)),
            Command::Block { first, second } => Ok(add(
                first.eval_complexity_with(functions, model)?,
                second.eval_complexity_with(functions, model)?,
            )),
            Command::If {
                cond,
                then_branch,
                else_branch,
            } => Ok(ite(
                cond.clone(),
                then_branch.eval_complexity_with(functions, model)?,
                else_branch.eval_complexity_with(functions, model)?,
            )),
            Command::Call { callee, args } => {
                let func = resolve(functions, callee)?;
                if func.params().len() != args.len() {
                    return Err(IrError::Arity {
                        callee: callee.clone(),
                        expected: func.params().len(),
                        found: args.len(),
                    });
                }

                let subs: Substitution = func
                    .params()
                    .iter()
                    .cloned()
                    .zip(args.iter().cloned())
                    .collect();
                let bound = func.annotation().substitute_evaluate(&subs);

                if model.call_cost == 0 {
                    Ok(bound)
                } else {
                    Ok(add(int(model.call_cost), bound))
                }
            }
        }
    }
}
