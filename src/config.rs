//! Project configuration file (`emuctl.json`).
//!
//! The per-kind sections mark which emulators belong to the project; the
//! `emulators` table overrides listen addresses. Port values are kept untyped
//! so that a non-numeric port surfaces as a configuration error from the
//! address resolver instead of a deserialization failure.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::emulator::EmulatorKind;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub database: Option<RulesTarget>,
    #[serde(default)]
    pub firestore: Option<RulesTarget>,
    #[serde(default)]
    pub functions: Option<FunctionsTarget>,
    #[serde(default)]
    pub hosting: Option<HostingTarget>,
    /// Address overrides keyed by emulator kind name
    #[serde(default)]
    pub emulators: HashMap<String, EmulatorSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesTarget {
    /// Security rules file, hot-reloaded while the emulator runs
    pub rules: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionsTarget {
    /// Directory holding the functions runtime code
    pub source: Option<PathBuf>,
    /// Command that starts the runtime server (run via the shell)
    pub runtime: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostingTarget {
    /// Directory of static assets to serve
    pub public: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmulatorSettings {
    pub host: Option<String>,
    pub port: Option<serde_json::Value>,
}

impl ProjectConfig {
    /// A config with every emulator section present, used when no project
    /// file exists.
    pub fn permissive() -> Self {
        Self {
            database: Some(RulesTarget::default()),
            firestore: Some(RulesTarget::default()),
            functions: Some(FunctionsTarget::default()),
            hosting: Some(HostingTarget::default()),
            emulators: HashMap::new(),
        }
    }

    /// Whether the project configures the given emulator kind at all.
    pub fn is_configured(&self, kind: EmulatorKind) -> bool {
        match kind {
            EmulatorKind::Database => self.database.is_some(),
            EmulatorKind::Firestore => self.firestore.is_some(),
            EmulatorKind::Functions => self.functions.is_some(),
            EmulatorKind::Hosting => self.hosting.is_some(),
        }
    }

    /// Address overrides for a kind, if any.
    pub fn settings(&self, kind: EmulatorKind) -> Option<&EmulatorSettings> {
        self.emulators.get(kind.label())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))
    }
}

/// Load the project config, falling back to a permissive default when the
/// file does not exist. Returns the config and the project root directory
/// (rules and source paths are resolved relative to it).
pub fn load_or_default(path: &Path) -> Result<(ProjectConfig, PathBuf)> {
    let root = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    if path.exists() {
        Ok((ProjectConfig::load(path)?, root))
    } else {
        warn!(
            "Could not find config ({}), using defaults.",
            path.display()
        );
        Ok((ProjectConfig::permissive(), root))
    }
}
