//! Configuration handling for forms and drafts

use crate::draft::{DraftSpec, DEFAULT_DEBOUNCE};
use crate::state::FormKind;
use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding where drafts are stored
pub const STORAGE_PATH_ENV: &str = "FORMDRAFT_STORAGE_PATH";

const DRAFTS_FILE: &str = "drafts.json";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "formdraft", "formdraft")
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FormsConfig {
    /// Quiet period before a draft is written, in milliseconds
    pub debounce_ms: Option<u64>,
    /// Draft storage file
    pub storage_path: Option<PathBuf>,
    /// Field paths persisted for the login form
    pub login_persisted_fields: Option<Vec<String>>,
    /// Field paths persisted for the signup form
    pub signup_persisted_fields: Option<Vec<String>>,
}

impl FormsConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the platform config dir
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: FormsConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn debounce(&self) -> Duration {
        self.debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DEBOUNCE)
    }

    /// Where drafts live: the env override, then the config file, then the
    /// platform data dir. `None` if no location can be determined.
    pub fn storage_path(&self) -> Option<PathBuf> {
        self.storage_path_with(std::env::var_os(STORAGE_PATH_ENV).map(PathBuf::from))
    }

    fn storage_path_with(&self, env_override: Option<PathBuf>) -> Option<PathBuf> {
        env_override
            .or_else(|| self.storage_path.clone())
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().join(DRAFTS_FILE)))
    }

    /// Storage key and persisted fields for a form
    pub fn draft_spec(&self, kind: FormKind) -> DraftSpec {
        let fields = match kind {
            FormKind::Login => self.login_persisted_fields.as_ref(),
            FormKind::Signup => self.signup_persisted_fields.as_ref(),
        };
        match fields {
            Some(fields) => DraftSpec::new(kind.draft_key(), fields.clone()),
            None => kind.default_draft_spec(),
        }
    }
}
