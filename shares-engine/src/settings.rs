// SPDX-License-Identifier: GPL-3.0-only

//! Application settings persistence
//!
//! Settings live in one TOML file. A missing file yields the defaults;
//! saves are atomic and validated by the engine before they reach here.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use shares_types::{validate_path, AppSettings};

use crate::error::{EngineError, FieldViolation, Result, ValidationError};

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SettingsStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<AppSettings> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings file at {:?}, using defaults", self.path);
                return Ok(AppSettings::default());
            }
            Err(e) => {
                return Err(EngineError::io(
                    format!("failed to read {}", self.path.display()),
                    e,
                ))
            }
        };

        toml::from_str(&content).map_err(|e| {
            EngineError::io(format!("failed to parse {}", self.path.display()), e)
        })
    }

    pub fn save(&self, settings: &AppSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::io(format!("failed to create {}", parent.display()), e)
            })?;
        }

        let content = toml::to_string(settings)
            .map_err(|e| EngineError::Io(format!("failed to serialize settings: {e}")))?;

        let temp = self.path.with_extension("tmp");
        fs::write(&temp, content)
            .map_err(|e| EngineError::io(format!("failed to write {}", temp.display()), e))?;
        if let Err(e) = fs::rename(&temp, &self.path) {
            let _ = fs::remove_file(&temp);
            return Err(EngineError::io(
                format!("failed to move {} into place", self.path.display()),
                e,
            ));
        }
        Ok(())
    }
}

/// Per-field validation of the configurable paths. Violations block the
/// save and are reported field by field.
pub fn validate_settings(settings: &AppSettings) -> Result<()> {
    let mut violations = Vec::new();

    if let Some(violation) = validate_path(&settings.share_config_base_path) {
        violations.push(FieldViolation {
            field: "share_config_base_path",
            message: violation.to_string(),
        });
    }
    if let Some(violation) = validate_path(&settings.default_parent_path) {
        violations.push(FieldViolation {
            field: "default_parent_path",
            message: violation.to_string(),
        });
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.toml"));
        assert_eq!(store.load().unwrap(), AppSettings::default());
    }

    #[test]
    fn save_and_reload() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.toml"));

        let mut settings = AppSettings::default();
        settings.share_config_base_path = dir.path().join("shares.d").display().to_string();
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn both_paths_are_validated_per_field() {
        let settings = AppSettings {
            share_config_base_path: "relative/path".to_string(),
            default_parent_path: "/trailing/".to_string(),
            ..AppSettings::default()
        };

        match validate_settings(&settings).unwrap_err() {
            EngineError::Validation(validation) => {
                let fields: Vec<_> = validation
                    .violations
                    .iter()
                    .map(|violation| violation.field)
                    .collect();
                assert_eq!(fields, vec!["share_config_base_path", "default_parent_path"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn root_paths_are_valid() {
        let settings = AppSettings {
            share_config_base_path: "/".to_string(),
            default_parent_path: "/srv/data".to_string(),
            ..AppSettings::default()
        };
        validate_settings(&settings).unwrap();
    }
}
