//! Data directory resolution and fixed file layout.

use crate::constants;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub key_file: PathBuf,
    pub credential_file: PathBuf,
    pub history_file: PathBuf,
    pub history_lock: PathBuf,
    pub settings_file: PathBuf,
}

impl AppPaths {
    /// Resolve from CLI arg, then env var, then the current directory.
    pub fn resolve(root_arg: Option<PathBuf>) -> Result<Self> {
        if let Some(root) = root_arg {
            return Ok(Self::from_root(root));
        }
        if let Ok(root) = env::var(constants::ROOT_ENV) {
            if !root.trim().is_empty() {
                return Ok(Self::from_root(PathBuf::from(root)));
            }
        }
        let cwd = env::current_dir().context("resolve current directory")?;
        Ok(Self::from_root(cwd))
    }

    pub fn from_root(root: PathBuf) -> Self {
        let key_file = root.join(constants::KEY_FILE);
        let credential_file = root.join(constants::CREDENTIAL_FILE);
        let history_file = root.join(constants::HISTORY_FILE);
        let history_lock = root.join(constants::HISTORY_LOCK);
        let settings_file = root.join(constants::SETTINGS_FILE);
        Self {
            root,
            key_file,
            credential_file,
            history_file,
            history_lock,
            settings_file,
        }
    }
}

impl std::fmt::Display for AppPaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "phishguard@{}", self.root.display())
    }
}
