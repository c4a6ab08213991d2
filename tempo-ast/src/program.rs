#![forbid(unsafe_code)]

use crate::build::int;
use crate::command::{Command, CostModel};
use crate::error::IrError;
use crate::expr::Expr;
use crate::unknowns::{scale_annotation, FreshNames};

/// A function definition with its claimed worst-case cost.
///
/// The annotation is the only part that can change, and only by building a
/// new value with [`Function::with_annotation`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    name: String,
    params: Vec<String>,
    body: Command,
    annotation: Expr,
}

impl Function {
    /// Fails if the body mentions a variable that is not a parameter.
    pub fn new(
        name: impl Into<String>,
        params: Vec<String>,
        body: Command,
        annotation: Expr,
    ) -> Result<Self, IrError> {
        let name = name.into();
        if let Some(stray) = body.variables().into_iter().find(|v| !params.contains(v)) {
            return Err(IrError::Scope {
                function: name,
                variable: stray,
                params: params.join(", "),
            });
        }
        Ok(Self {
            name,
            params,
            body,
            annotation,
        })
    }

    /// A function claiming constant cost `1`.
    pub fn unannotated(
        name: impl Into<String>,
        params: Vec<String>,
        body: Command,
    ) -> Result<Self, IrError> {
        Self::new(name, params, body, int(1))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn body(&self) -> &Command {
        &self.body
    }

    pub fn annotation(&self) -> &Expr {
        &self.annotation
    }

    pub fn with_annotation(&self, annotation: Expr) -> Function {
        Function {
            annotation,
            ..self.clone()
        }
    }

    /// One-step cost of the body against the annotations in `functions`.
    pub fn eval_complexity(
        &self,
        functions: &[Function],
        model: &CostModel,
    ) -> Result<Expr, IrError> {
        self.body.eval_complexity_with(functions, model)
    }
}

pub(crate) fn resolve<'f>(functions: &'f [Function], name: &str) -> Result<&'f Function, IrError> {
    let mut matches = functions.iter().filter(|f| f.name == name);
    match (matches.next(), matches.count()) {
        (None, _) => Err(IrError::UndefinedFunction {
            name: name.to_string(),
        }),
        (Some(func), 0) => Ok(func),
        (Some(_), rest) => Err(IrError::AmbiguousFunction {
            name: name.to_string(),
            count: rest + 1,
        }),
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    functions: Vec<Function>,
}

impl Program {
    pub fn new(functions: Vec<Function>) -> Self {
        Self { functions }
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Exactly one function named `name`, or a resolution error.
    pub fn lookup(&self, name: &str) -> Result<&Function, IrError> {
        resolve(&self.functions, name)
    }

    pub fn map_annotations(&self, mut f: impl FnMut(&Function) -> Expr) -> Program {
        Program {
            functions: self
                .functions
                .iter()
                .map(|func| func.with_annotation(f(func)))
                .collect(),
        }
    }

    /// Rewrites every annotation `T` into `c0 * T + c1` with fresh unknowns.
    pub fn with_inferred_constants(&self, names: &mut FreshNames) -> Program {
        self.map_annotations(|func| scale_annotation(func.annotation(), names))
    }

    /// Derived cost of every function body, in definition order.
    pub fn derived_costs(&self, model: &CostModel) -> Result<Vec<Expr>, IrError> {
        self.functions
            .iter()
            .map(|func| func.eval_complexity(&self.functions, model))
            .collect()
    }
}

impl FromIterator<Function> for Program {
    fn from_iter<I: IntoIterator<Item = Function>>(iter: I) -> Self {
        Program::new(iter.into_iter().collect())
    }
}
