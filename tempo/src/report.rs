#![forbid(unsafe_code)]

use std::fs;
use std::path::Path;

use miette::IntoDiagnostic;
use serde::Serialize;
use tempo_verify::{SmtProfile, ValidationReport};

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub schema: &'static str,
    pub input: String,
    pub settings: CheckSettings,
    #[serde(flatten)]
    pub result: ValidationReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckSettings {
    pub call_cost: i64,
    pub smt_profile: SmtProfile,
    pub infer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
}

impl CheckReport {
    pub const SCHEMA: &'static str = "tempo.check.v1";

    pub fn new(input: &Path, settings: CheckSettings, result: ValidationReport) -> Self {
        Self {
            schema: Self::SCHEMA,
            input: input.display().to_string(),
            settings,
            result,
        }
    }

    pub fn write_json(&self, out: &Path) -> miette::Result<()> {
        let json = serde_json::to_string_pretty(self).into_diagnostic()?;
        fs::write(out, json + "\n").into_diagnostic()?;
        tracing::info!(path = %out.display(), "wrote check report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempo_verify::ValidationStatus;

    #[test]
    fn report_flattens_the_validation_result() {
        let result = ValidationReport {
            status: ValidationStatus::Valid,
            reason: None,
            witnesses: BTreeMap::from([("c0__1".to_string(), 1), ("c1__2".to_string(), 1)]),
            obligations: vec![],
        };
        let settings = CheckSettings {
            call_cost: 1,
            smt_profile: SmtProfile::Ci,
            infer: true,
            manifest: None,
        };
        let report = CheckReport::new(Path::new("loops.tempo"), settings, result);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["schema"], CheckReport::SCHEMA);
        assert_eq!(json["status"], "valid");
        assert_eq!(json["witnesses"]["c0__1"], 1);
        assert_eq!(json["settings"]["smt_profile"], "ci");
        assert!(json["settings"].get("manifest").is_none());
    }
}
