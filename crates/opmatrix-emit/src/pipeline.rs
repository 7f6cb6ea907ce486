//! From an operator matrix to the files of a loadable extension.
//!
//! Every definition reaches the three renderers unmodified and in emission
//! order. Nothing time- or environment-dependent is written, so two runs over
//! the same matrix produce byte-identical artifacts and manifests.

use crate::config::EmitterConfig;
use crate::emitter::Emitter;
use crate::native::NativeEmitter;
use crate::registration::RegistrationEmitter;
use crate::scenario::ScenarioEmitter;
use anyhow::{Context, Result};
use opmatrix_core::{OperatorDefinition, OperatorMatrix};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub const NATIVE_PATH: &str = "operators.c";
pub const REGISTRATION_PATH: &str = "operators.sql";
pub const SCENARIO_PATH: &str = "test/sql/operators.sql";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub definitions: usize,
    pub native: String,
    pub registration: String,
    pub scenarios: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: String,
    pub bytes: usize,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub definitions: usize,
    pub artifacts: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn sha256_hex(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Resolve `matrix` and render every artifact. Files never carry color codes,
/// whatever `config.use_colors` says.
pub fn generate(matrix: &OperatorMatrix, config: &EmitterConfig) -> Result<Artifacts> {
    let definitions = matrix
        .definitions()
        .context("failed to resolve the operator matrix")?;
    render(&definitions, config)
}

pub fn render(definitions: &[OperatorDefinition], config: &EmitterConfig) -> Result<Artifacts> {
    let config = EmitterConfig {
        use_colors: false,
        ..config.clone()
    };

    let native = NativeEmitter::new(config.clone()).emit_to_string(definitions)?;
    debug!(bytes = native.len(), "rendered native functions");
    let registration = RegistrationEmitter::new(config.clone()).emit_to_string(definitions)?;
    debug!(bytes = registration.len(), "rendered registration script");
    let scenarios = ScenarioEmitter::new(config).emit_to_string(definitions)?;
    debug!(bytes = scenarios.len(), "rendered scenario script");

    Ok(Artifacts {
        definitions: definitions.len(),
        native,
        registration,
        scenarios,
    })
}

impl Artifacts {
    /// Relative path and content of every artifact, in write order.
    pub fn files(&self) -> [(&'static str, &str); 3] {
        [
            (NATIVE_PATH, self.native.as_str()),
            (REGISTRATION_PATH, self.registration.as_str()),
            (SCENARIO_PATH, self.scenarios.as_str()),
        ]
    }

    pub fn manifest(&self) -> Manifest {
        Manifest {
            definitions: self.definitions,
            artifacts: self
                .files()
                .iter()
                .map(|(path, content)| ManifestEntry {
                    path: path.to_string(),
                    bytes: content.len(),
                    sha256: sha256_hex(content.as_bytes()),
                })
                .collect(),
        }
    }

    pub fn write_to(&self, dir: &Path) -> Result<Manifest> {
        for (relative, content) in self.files() {
            let path = dir.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(&path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            debug!(path = %path.display(), bytes = content.len(), "wrote artifact");
        }

        let manifest = self.manifest();
        info!(
            definitions = manifest.definitions,
            dir = %dir.display(),
            "generated extension sources"
        );
        Ok(manifest)
    }
}
