#![forbid(unsafe_code)]
#![allow(unused_assignments)]

use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use tempo_verify::SmtProfile;
use thiserror::Error;

pub const MANIFEST_NAME: &str = "tempo.toml";

#[derive(Debug, Error, Diagnostic)]
#[error("manifest error: {message}")]
#[diagnostic(code(tempo::manifest))]
#[allow(unused_assignments)]
pub struct ManifestError {
    pub message: String,
}

/// Project settings after discovery. Every field is optional so command-line
/// flags can be layered on top.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedManifest {
    pub manifest_path: Option<PathBuf>,
    pub smt_profile: Option<SmtProfile>,
    pub call_cost: Option<i64>,
    pub infer: Option<bool>,
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
struct Manifest {
    #[serde(default)]
    check: Option<Check>,
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
struct Check {
    #[serde(default)]
    smt_profile: Option<SmtProfile>,

    #[serde(default)]
    call_cost: Option<i64>,

    #[serde(default)]
    infer: Option<bool>,
}

pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    let mut cur = if start.is_file() {
        start.parent()?.to_path_buf()
    } else {
        start.to_path_buf()
    };

    loop {
        let candidate = cur.join(MANIFEST_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
        match cur.parent() {
            Some(p) => cur = p.to_path_buf(),
            None => return None,
        }
    }
}

pub fn load_resolved_manifest(start: &Path) -> Result<ResolvedManifest, ManifestError> {
    // Relative inputs would stop the walk at the working directory.
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());

    let Some(manifest_path) = find_manifest(&start) else {
        return Ok(ResolvedManifest::default());
    };

    let raw = fs::read_to_string(&manifest_path).map_err(|e| ManifestError {
        message: format!("failed to read {}: {e}", manifest_path.display()),
    })?;

    let mut out = parse_manifest(&raw, &manifest_path)?;
    out.manifest_path = Some(manifest_path);
    Ok(out)
}

pub fn parse_manifest(raw: &str, origin: &Path) -> Result<ResolvedManifest, ManifestError> {
    let parsed: Manifest = toml::from_str(raw).map_err(|e| ManifestError {
        message: format!("failed to parse {}: {e}", origin.display()),
    })?;

    let check = parsed.check.unwrap_or_default();
    if let Some(cost) = check.call_cost {
        if cost < 0 {
            return Err(ManifestError {
                message: format!(
                    "{}: `check.call_cost` must be non-negative, found {cost}",
                    origin.display()
                ),
            });
        }
    }

    Ok(ResolvedManifest {
        manifest_path: None,
        smt_profile: check.smt_profile,
        call_cost: check.call_cost,
        infer: check.infer,
    })
}
