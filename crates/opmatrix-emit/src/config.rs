use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    pub use_colors: bool,
    pub indent_style: IndentStyle,
    /// Shared library name used in `AS '$libdir/<module>'`.
    pub module_name: String,
    /// Extra header included by the native prologue.
    pub header: Option<String>,
    pub annotate_expected: bool,
    pub emit_commutators: bool,
    pub verbosity: VerbosityLevel,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            use_colors: true,
            indent_style: IndentStyle::Tabs,
            module_name: "uint".to_string(),
            header: Some("uint.h".to_string()),
            annotate_expected: false,
            emit_commutators: true,
            verbosity: VerbosityLevel::Normal,
        }
    }
}

impl EmitterConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid emitter config")
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&content)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IndentStyle {
    Spaces(usize),
    Tabs,
}

impl IndentStyle {
    pub fn to_string(&self) -> String {
        match self {
            IndentStyle::Spaces(n) => " ".repeat(*n),
            IndentStyle::Tabs => "\t".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerbosityLevel {
    Quiet,
    Normal,
    Verbose,
    Debug,
}

impl VerbosityLevel {
    /// Section banners between operand pairs.
    pub fn should_print_sections(&self) -> bool {
        !matches!(self, VerbosityLevel::Quiet)
    }

    /// A comment naming the resolved signature above every native function.
    pub fn should_print_signatures(&self) -> bool {
        matches!(self, VerbosityLevel::Verbose | VerbosityLevel::Debug)
    }

    pub fn should_print_predicates(&self) -> bool {
        matches!(self, VerbosityLevel::Debug)
    }
}
