//! Audit trail and diagnostic log settings (`[audit]`, `[logging]`)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAuditConfig {
    /// Primary JSONL file (default: `<data dir>/haven/audit.jsonl`)
    pub path: Option<PathBuf>,
    /// Best-effort secondary file (default: `<data dir>/haven/audit.fallback.jsonl`)
    pub fallback_path: Option<PathBuf>,
}

impl FileAuditConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| data_dir().join("audit.jsonl"))
    }

    pub fn resolved_fallback_path(&self) -> PathBuf {
        self.fallback_path
            .clone()
            .unwrap_or_else(|| data_dir().join("audit.fallback.jsonl"))
    }
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("haven")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for daily-rolling diagnostic logs; console only when unset
    pub dir: Option<PathBuf>,
    /// Default filter directive when RUST_LOG is unset (e.g. "haven=debug")
    pub filter: Option<String>,
}
