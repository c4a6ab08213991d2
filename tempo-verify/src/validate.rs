#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tempo_ast::{CostModel, Program};

use crate::error::VerifyError;
use crate::query::{build_query, Obligation};
use crate::solver::{Prover, SmtProfile, Verdict};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    pub cost_model: CostModel,
    pub profile: SmtProfile,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Valid,
    Invalid,
    /// The solver gave up (timeout or incompleteness).
    Unknown,
}

impl ValidationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationStatus::Valid => "valid",
            ValidationStatus::Invalid => "invalid",
            ValidationStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ObligationSummary {
    pub function: String,
    pub binders: Vec<String>,
    pub cost: String,
    pub bound: String,
    pub formula: String,
}

impl From<&Obligation> for ObligationSummary {
    fn from(ob: &Obligation) -> Self {
        Self {
            function: ob.function.clone(),
            binders: ob.binders.clone(),
            cost: ob.cost.to_string(),
            bound: ob.bound.to_string(),
            formula: ob.formula.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub status: ValidationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Solver-chosen values for the unknown constants; empty unless valid.
    pub witnesses: BTreeMap<String, i64>,
    pub obligations: Vec<ObligationSummary>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.status == ValidationStatus::Valid
    }
}

/// True iff some choice of the unknown constants makes every function's
/// annotation dominate its one-step cost. Uses [`ValidateOptions::default`].
pub fn validate_complexities<P: Prover + ?Sized>(
    program: &Program,
    prover: &mut P,
) -> Result<bool, VerifyError> {
    Ok(validate_with_options(program, prover, &ValidateOptions::default())?.is_valid())
}

pub fn validate_with_options<P: Prover + ?Sized>(
    program: &Program,
    prover: &mut P,
    opts: &ValidateOptions,
) -> Result<ValidationReport, VerifyError> {
    let span = tracing::info_span!(
        "validate",
        functions = program.functions().len(),
        call_cost = opts.cost_model.call_cost,
        profile = %opts.profile,
    );
    let _enter = span.enter();

    let query = build_query(program, &opts.cost_model)?;
    tracing::debug!(
        unknowns = query.unknowns.len(),
        obligations = query.obligations.len(),
        "query built"
    );

    prover.set_profile(opts.profile);
    let verdict = prover.check(&query)?;

    let obligations = query.obligations.iter().map(ObligationSummary::from).collect();
    let report = match verdict {
        Verdict::Sat { witnesses } => ValidationReport {
            status: ValidationStatus::Valid,
            reason: None,
            witnesses,
            obligations,
        },
        Verdict::Unsat => ValidationReport {
            status: ValidationStatus::Invalid,
            reason: None,
            witnesses: BTreeMap::new(),
            obligations,
        },
        Verdict::Unknown { reason } => ValidationReport {
            status: ValidationStatus::Unknown,
            reason: Some(reason),
            witnesses: BTreeMap::new(),
            obligations,
        },
    };

    tracing::info!(status = %report.status, witnesses = ?report.witnesses, "solver verdict");
    Ok(report)
}
