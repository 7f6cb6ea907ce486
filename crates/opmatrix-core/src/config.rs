use crate::{MatrixError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which operator classes the matrix enumerates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    pub comparisons: bool,
    pub arithmetic: bool,
    pub bitwise: bool,
    pub complement: bool,
    pub shifts: bool,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            comparisons: true,
            arithmetic: true,
            bitwise: true,
            complement: true,
            shifts: true,
        }
    }
}

impl MatrixConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| MatrixError::Config(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| MatrixError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }
}
