//! Process-wide state, built once at startup and passed by reference.

use crate::core::paths::AppPaths;
use crate::core::{settings, vault};
use crate::models::settings::Settings;
use anyhow::Result;

pub struct AppContext {
    pub paths: AppPaths,
    pub settings: Settings,
    credential: vault::SecretState,
}

impl AppContext {
    /// Load settings and the stored credential from `paths`.
    pub fn init(paths: AppPaths) -> Result<Self> {
        let settings = settings::load(&paths.settings_file)?;
        let credential = vault::load_secret_state(&paths);
        tracing::debug!(root = %paths.root.display(), credential = ?credential, "context initialized");
        Ok(Self {
            paths,
            settings,
            credential,
        })
    }

    /// Build a context without touching disk.
    pub fn with_parts(paths: AppPaths, settings: Settings, credential: vault::SecretState) -> Self {
        Self {
            paths,
            settings,
            credential,
        }
    }

    /// The live API key, if one is usable.
    pub fn credential(&self) -> Option<&str> {
        match &self.credential {
            vault::SecretState::Loaded(secret) => Some(secret.as_str()),
            _ => None,
        }
    }

    pub fn credential_state(&self) -> &vault::SecretState {
        &self.credential
    }

    /// Persist a new key and make it live for the rest of the process.
    pub fn set_credential(&mut self, secret: &str) -> Result<()> {
        vault::save_secret(&self.paths, secret)?;
        self.credential = vault::load_secret_state(&self.paths);
        Ok(())
    }

    pub fn clear_credential(&mut self) -> Result<bool> {
        let removed = vault::clear_secret(&self.paths)?;
        self.credential = vault::SecretState::Empty;
        Ok(removed)
    }
}
