#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use tempo_ast::build::{disjunction, int, leq, var};
use tempo_ast::{CostModel, Expr, Program, UnknownKind};

use crate::error::VerifyError;
use crate::sort::{expect_sort, Sort};

/// A constant the solver may choose, shared by every obligation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unknown {
    pub name: String,
    pub kind: UnknownKind,
}

impl Unknown {
    pub fn lower_bound(&self) -> i64 {
        self.kind.lower_bound()
    }
}

/// The proof obligation contributed by one function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Obligation {
    pub function: String,
    pub params: Vec<String>,
    /// Universally quantified names: the parameters first, then any other
    /// non-unknown free variable of `formula` in sorted order.
    pub binders: Vec<String>,
    pub cost: Expr,
    pub bound: Expr,
    /// `(p1 <= 0) or ... or (pn <= 0) or (cost <= bound)`.
    pub formula: Expr,
}

/// Everything a backend needs to decide a program: the unknowns to solve for
/// and one universally quantified formula per function.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    pub unknowns: Vec<Unknown>,
    pub obligations: Vec<Obligation>,
}

impl Query {
    /// Sort-checks every obligation; each formula must be a proposition.
    pub fn check_sorts(&self) -> Result<(), VerifyError> {
        for ob in &self.obligations {
            expect_sort(&ob.formula, Sort::Bool)?;
        }
        Ok(())
    }

    pub fn unknown_names(&self) -> impl Iterator<Item = &str> {
        self.unknowns.iter().map(|u| u.name.as_str())
    }
}

pub fn build_query(program: &Program, model: &CostModel) -> Result<Query, VerifyError> {
    let functions = program.functions();
    let mut universe = BTreeSet::new();
    let mut obligations = Vec::with_capacity(functions.len());

    for func in functions {
        let cost = func.eval_complexity(functions, model)?;
        let bound = func.annotation().clone();

        let mut names = BTreeSet::new();
        func.body().collect_variables(&mut names);
        cost.collect_variables(&mut names);
        bound.collect_variables(&mut names);
        // Parameters are quantified per obligation, whatever their prefix.
        universe.extend(names.into_iter().filter(|n| !func.params().contains(n)));

        let formula = disjunction(
            func.params()
                .iter()
                .map(|p| leq(var(p.as_str()), int(0)))
                .chain([leq(cost.clone(), bound.clone())]),
        );

        let mut binders = func.params().to_vec();
        binders.extend(
            formula
                .variables()
                .into_iter()
                .filter(|v| !func.params().contains(v) && UnknownKind::classify(v).is_none()),
        );

        tracing::debug!(
            function = func.name(),
            %cost,
            %bound,
            binders = binders.len(),
            "derived obligation"
        );

        obligations.push(Obligation {
            function: func.name().to_string(),
            params: func.params().to_vec(),
            binders,
            cost,
            bound,
            formula,
        });
    }

    let unknowns = universe
        .into_iter()
        .filter_map(|name| UnknownKind::classify(&name).map(|kind| Unknown { name, kind }))
        .collect();

    let query = Query {
        unknowns,
        obligations,
    };
    query.check_sorts()?;
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempo_ast::build::{add, ite, mul, or, sub};
    use tempo_ast::{Command, FreshNames, Function, IrError};

    fn loop1(annotation: Expr) -> Function {
        let body = Command::if_(
            leq(var("n"), int(0)),
            Command::Pass,
            Command::call("loop1", vec![sub(var("n"), int(1))]),
        );
        Function::new("loop1", vec!["n".to_string()], body, annotation).unwrap()
    }

    #[test]
    fn loop1_obligation_has_escape_clause_and_unit_call() {
        let program = Program::new(vec![loop1(var("n"))]);
        let query = build_query(&program, &CostModel::default()).unwrap();

        assert!(query.unknowns.is_empty());
        let ob = &query.obligations[0];
        assert_eq!(ob.binders, vec!["n".to_string()]);
        assert_eq!(
            ob.cost,
            ite(
                leq(var("n"), int(0)),
                int(0),
                add(int(1), sub(var("n"), int(1)))
            )
        );
        assert_eq!(
            ob.formula,
            or(leq(var("n"), int(0)), leq(ob.cost.clone(), var("n")))
        );
    }

    #[test]
    fn inferred_constants_become_unknowns_with_domains() {
        let program = Program::new(vec![loop1(var("n"))]);
        let inferred = program.with_inferred_constants(&mut FreshNames::new(0));
        let query = build_query(&inferred, &CostModel::default()).unwrap();

        let names: Vec<_> = query.unknown_names().collect();
        assert_eq!(names, vec!["c0__1", "c1__2"]);
        assert_eq!(query.unknowns[0].lower_bound(), 0);
        assert_eq!(query.unknowns[1].lower_bound(), 1);
        assert_eq!(query.obligations[0].binders, vec!["n".to_string()]);
    }

    #[test]
    fn unknowns_of_uncalled_functions_are_declared() {
        let f = Function::new("f", vec![], Command::Pass, var("c1__9")).unwrap();
        let query = build_query(&Program::new(vec![f]), &CostModel::default()).unwrap();
        assert_eq!(query.unknown_names().collect::<Vec<_>>(), vec!["c1__9"]);
        assert!(query.obligations[0].binders.is_empty());
    }

    #[test]
    fn stray_annotation_names_are_quantified() {
        let f = Function::new("f", vec!["n".to_string()], Command::Pass, mul(var("k"), var("n")))
            .unwrap();
        let query = build_query(&Program::new(vec![f]), &CostModel::default()).unwrap();
        assert!(query.unknowns.is_empty());
        assert_eq!(
            query.obligations[0].binders,
            vec!["n".to_string(), "k".to_string()]
        );
    }

    #[test]
    fn multi_parameter_escape_clause_covers_every_parameter() {
        let f = Function::new(
            "f",
            vec!["n".to_string(), "m".to_string()],
            Command::Pass,
            int(0),
        )
        .unwrap();
        let query = build_query(&Program::new(vec![f]), &CostModel::annotations_only()).unwrap();
        assert_eq!(
            query.obligations[0].formula,
            or(
                leq(var("n"), int(0)),
                or(leq(var("m"), int(0)), leq(int(0), int(0)))
            )
        );
    }

    #[test]
    fn reserved_prefix_parameters_stay_bound() {
        let f = Function::new(
            "f",
            vec!["c0__k".to_string()],
            Command::Pass,
            add(var("c0__k"), var("c1__5")),
        )
        .unwrap();
        let query = build_query(&Program::new(vec![f]), &CostModel::default()).unwrap();
        assert_eq!(query.unknown_names().collect::<Vec<_>>(), vec!["c1__5"]);
        assert_eq!(query.obligations[0].binders, vec!["c0__k".to_string()]);
    }

    #[test]
    fn resolution_errors_propagate() {
        let f = Function::unannotated("f", vec![], Command::call("g", vec![])).unwrap();
        let err = build_query(&Program::new(vec![f]), &CostModel::default()).unwrap_err();
        assert!(matches!(
            err,
            VerifyError::Ir(IrError::UndefinedFunction { .. })
        ));
    }

    #[test]
    fn ill_sorted_annotation_is_rejected() {
        let f = Function::new("f", vec![], Command::Pass, leq(int(0), int(1))).unwrap();
        let err = build_query(&Program::new(vec![f]), &CostModel::default()).unwrap_err();
        assert!(matches!(err, VerifyError::Encode { .. }));
    }
}
