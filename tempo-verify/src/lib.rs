#![forbid(unsafe_code)]

//! Whole-program cost validation.
//!
//! Each function contributes one universally quantified obligation: its
//! annotation must dominate the one-step cost of its body wherever every
//! parameter is positive. The conjunction is handed to a [`Prover`], which
//! may pick values for the unknown constants (`c0__*`, `c1__*`).

mod error;
mod query;
mod smtlib;
mod solver;
mod sort;
mod validate;

pub use error::VerifyError;
pub use query::{build_query, Obligation, Query, Unknown};
pub use smtlib::{render_smtlib, sexpr};
pub use solver::{NoZ3Prover, Prover, SmtProfile, Verdict};
#[cfg(feature = "z3")]
pub use solver::z3_prover::Z3Prover;
pub use sort::{check_sort, expect_sort, Sort};
pub use validate::{
    validate_complexities, validate_with_options, ObligationSummary, ValidateOptions,
    ValidationReport, ValidationStatus,
};
