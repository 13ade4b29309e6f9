use anyhow::{Context, Result};
use isochrone::{Isochrone, IsochroneCfg};
use serde::Serialize;
use serde_json::{json, Value};
use std::ffi::OsString;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Inputs of one contour run, recorded next to the artifact.
#[derive(Clone, Debug, Serialize)]
pub struct RunParams {
    pub origin: String,
    pub access: String,
    pub target_minutes: f64,
    pub spokes: usize,
    pub tolerance_minutes: f64,
    pub max_rounds: usize,
    pub min_speed_mph: f64,
    pub max_speed_mph: f64,
    pub pause_ms: u64,
}

impl RunParams {
    pub fn new(origin: &str, access: &str, cfg: &IsochroneCfg, pause_ms: u64) -> Self {
        Self {
            origin: origin.to_string(),
            access: access.to_string(),
            target_minutes: cfg.target_minutes,
            spokes: cfg.spokes,
            tolerance_minutes: cfg.tolerance_minutes,
            max_rounds: cfg.max_rounds,
            min_speed_mph: cfg.min_speed_mph,
            max_speed_mph: cfg.max_speed_mph,
            pause_ms,
        }
    }
}

/// Metadata used to generate a provenance sidecar.
pub struct Payload {
    pub params: Value,
    pub result: Value,
}

impl Payload {
    pub fn new(params: &RunParams) -> Result<Self> {
        Ok(Self {
            params: serde_json::to_value(params)?,
            result: Value::Null,
        })
    }

    /// Attach the headline numbers of a finished run.
    pub fn with_result(mut self, iso: &Isochrone) -> Self {
        self.result = json!({
            "origin": [iso.origin.lat, iso.origin.lng],
            "rounds": iso.rounds,
            "vertices": iso.points.len(),
        });
        self
    }
}

/// Write `<artifact>.provenance.json` containing the git commit, callsite, params, result, and outputs.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let provenance_path = provenance_path(artifact);
    if let Some(parent) = provenance_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating provenance dir {}", parent.display()))?;
        }
    }

    let callsite = Location::caller();
    let doc = json!({
        "code_rev": current_git_rev(),
        "version": isochrone::VERSION,
        "callsite": {
            "file": callsite.file(),
            "line": callsite.line()
        },
        "params": payload.params,
        "result": payload.result,
        "outputs": [artifact.to_string_lossy()]
    });
    fs::write(&provenance_path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", provenance_path.display()))?;
    Ok(provenance_path)
}

fn provenance_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("contour"));
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

pub fn current_git_rev() -> String {
    if let Some(from_env) = option_env!("GIT_COMMIT") {
        if !from_env.is_empty() {
            return from_env.to_string();
        }
    }
    if let Ok(env_override) = std::env::var("GIT_COMMIT") {
        if !env_override.is_empty() {
            return env_override;
        }
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
