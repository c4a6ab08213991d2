#![forbid(unsafe_code)]

use crate::build::{add, mul, var};
use crate::expr::Expr;

/// Names starting with this prefix are multiplicative unknowns (domain `>= 0`).
pub const SCALE_PREFIX: &str = "c0__";
/// Names starting with this prefix are additive unknowns (domain `>= 1`).
pub const OFFSET_PREFIX: &str = "c1__";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnknownKind {
    Scale,
    Offset,
}

impl UnknownKind {
    pub fn classify(name: &str) -> Option<Self> {
        if name.starts_with(SCALE_PREFIX) {
            Some(UnknownKind::Scale)
        } else if name.starts_with(OFFSET_PREFIX) {
            Some(UnknownKind::Offset)
        } else {
            None
        }
    }

    /// Smallest value the solver may pick for an unknown of this kind.
    pub fn lower_bound(self) -> i64 {
        match self {
            UnknownKind::Scale => 0,
            UnknownKind::Offset => 1,
        }
    }

    /// Base handed to [`FreshNames::fresh`]; the generator's `_` separator
    /// completes the prefix.
    fn fresh_base(self) -> &'static str {
        match self {
            UnknownKind::Scale => "c0_",
            UnknownKind::Offset => "c1_",
        }
    }
}

/// Counter-based name generator. Each instance is independent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FreshNames {
    next: u64,
}

impl FreshNames {
    /// The first generated name carries `start + 1`.
    pub fn new(start: u64) -> Self {
        Self { next: start }
    }

    pub fn fresh(&mut self, base: &str) -> String {
        self.next += 1;
        format!("{base}_{}", self.next)
    }

    pub fn fresh_unknown(&mut self, kind: UnknownKind) -> String {
        self.fresh(kind.fresh_base())
    }
}

/// `c0 * annotation + c1` with two fresh unknowns.
pub fn scale_annotation(annotation: &Expr, names: &mut FreshNames) -> Expr {
    let scale = var(names.fresh_unknown(UnknownKind::Scale));
    let offset = var(names.fresh_unknown(UnknownKind::Offset));
    add(mul(scale, annotation.clone()), offset)
}
