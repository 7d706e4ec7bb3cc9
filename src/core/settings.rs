//! Loading and saving `settings.toml`.

use crate::constants;
use crate::models::settings::Settings;
use crate::util::fs as app_fs;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Defaults when the file is missing; an unreadable or invalid file is an error.
pub fn load(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("read settings {}", path.display()))?;
    let settings: Settings = toml::from_str(&content)
        .with_context(|| format!("parse settings {}", path.display()))?;
    validate(&settings).with_context(|| format!("invalid settings {}", path.display()))?;
    Ok(settings)
}

pub fn save(path: &Path, settings: &Settings) -> Result<()> {
    let content = toml::to_string_pretty(settings).context("serialize settings")?;
    app_fs::write_atomic(path, content.as_bytes(), constants::SETTINGS_FILE_MODE)
        .with_context(|| format!("write settings {}", path.display()))
}

fn validate(settings: &Settings) -> Result<()> {
    let inference = &settings.inference;
    if inference.endpoint.trim().is_empty() {
        anyhow::bail!("inference.endpoint must not be empty");
    }
    if inference.text_model.trim().is_empty() || inference.vision_model.trim().is_empty() {
        anyhow::bail!("model names must not be empty");
    }
    if !(0.0..=2.0).contains(&inference.temperature) {
        anyhow::bail!(
            "inference.temperature must be between 0 and 2, got {}",
            inference.temperature
        );
    }
    if inference.max_tokens == 0 {
        anyhow::bail!("inference.max_tokens must be positive");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = load(&dir.path().join("settings.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.inference.text_model, "gpt-4o-mini");
        assert_eq!(settings.inference.vision_model, "gpt-4o");
        assert_eq!(settings.inference.max_tokens, 200);
        assert!(!settings.history.record_failures);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[inference]\ntext_model = \"local-model\"\n").unwrap();
        let settings = load(&path).unwrap();
        assert_eq!(settings.inference.text_model, "local-model");
        assert_eq!(settings.inference.vision_model, "gpt-4o");
        assert_eq!(settings.inference.timeout_secs, 60);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        let mut settings = Settings::default();
        settings.history.record_failures = true;
        settings.inference.endpoint = "http://localhost:8080/v1/chat/completions".into();
        save(&path, &settings).unwrap();
        assert_eq!(load(&path).unwrap(), settings);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[inference\n").unwrap();
        assert!(load(&path).is_err());
    }

    #[test]
    fn test_out_of_range_temperature_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[inference]\ntemperature = 5.0\n").unwrap();
        let err = load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("temperature"));
    }
}
