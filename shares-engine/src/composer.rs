// SPDX-License-Identifier: GPL-3.0-only

//! Configuration composition
//!
//! Two artifacts keep the main Samba configuration in sync with the record
//! directory:
//!
//! - an aggregate `includes.conf` inside the base directory, regenerated
//!   from the directory's current membership (one include line per record)
//! - a single marked directive in the main `smb.conf` pointing at that
//!   aggregate, which the operator can leave disabled to stage records
//!   without activating them
//!
//! Composition changes are intent declarations only. The running service
//! observes them when the commit step validates and reloads.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use shares_types::AppSettings;

use crate::error::{EngineError, Result};

/// Aggregate include file maintained inside the record directory.
pub const INCLUDES_FILE: &str = "includes.conf";

const DIRECTIVE_MARKER: &str = "# Managed by smb-shares: load per-share records";

pub struct Composer {
    main_conf: PathBuf,
}

impl Composer {
    pub fn new(main_conf: impl Into<PathBuf>) -> Self {
        Composer {
            main_conf: main_conf.into(),
        }
    }

    pub fn main_conf(&self) -> &Path {
        &self.main_conf
    }

    fn directive_for(base: &Path) -> String {
        format!("include = {}", base.join(INCLUDES_FILE).display())
    }

    /// Whether the main configuration currently carries the inclusion
    /// directive for `base`. A missing main file is simply "not enabled".
    pub fn is_enabled(&self, base: &Path) -> Result<bool> {
        let content = match fs::read_to_string(&self.main_conf) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => {
                return Err(EngineError::io(
                    format!("failed to read {}", self.main_conf.display()),
                    e,
                ))
            }
        };

        let directive = Self::directive_for(base);
        Ok(content.lines().any(|line| line.trim() == directive))
    }

    /// Provision the record directory and point the inclusion directive at
    /// `base`. There is at most one marked directive in the main file: a
    /// directive left over from a previous base is replaced, never kept
    /// alongside the new one. Re-running with the same base is a no-op.
    pub fn enable(&self, base: &Path) -> Result<()> {
        fs::create_dir_all(base)
            .map_err(|e| EngineError::io(format!("failed to create {}", base.display()), e))?;

        let content = match fs::read_to_string(&self.main_conf) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(EngineError::io(
                    format!("failed to read {}", self.main_conf.display()),
                    e,
                ))
            }
        };

        // strip every existing marker pair, then append the current one
        let mut kept: Vec<&str> = Vec::new();
        let mut after_marker = false;
        for line in content.lines() {
            if after_marker {
                after_marker = false;
                if line.trim().starts_with("include =") {
                    continue;
                }
            }
            if line.trim() == DIRECTIVE_MARKER {
                after_marker = true;
                continue;
            }
            kept.push(line);
        }

        let mut updated = kept.join("\n");
        if !updated.is_empty() {
            updated.push('\n');
        }
        updated.push_str(DIRECTIVE_MARKER);
        updated.push('\n');
        updated.push_str(&Self::directive_for(base));
        updated.push('\n');

        if updated == content {
            debug!(
                "Inclusion directive in {:?} already points at {:?}",
                self.main_conf, base
            );
            return Ok(());
        }

        write_atomically(&self.main_conf, &updated)?;
        info!(
            "Enabled share inclusion in {:?} for {:?}",
            self.main_conf, base
        );
        Ok(())
    }

    /// Regenerate the aggregate include file from the given record files.
    pub fn compose(&self, base: &Path, record_files: &[PathBuf]) -> Result<()> {
        fs::create_dir_all(base)
            .map_err(|e| EngineError::io(format!("failed to create {}", base.display()), e))?;

        let mut content = String::from("# Generated by smb-shares; do not edit.\n");
        for file in record_files {
            content.push_str(&format!("include = {}\n", file.display()));
        }

        write_atomically(&base.join(INCLUDES_FILE), &content)?;
        debug!(
            "Composed {} record include(s) under {:?}",
            record_files.len(),
            base
        );
        Ok(())
    }

    /// Ensure every directory the current settings depend on exists. Safe
    /// to call unconditionally before any store operation.
    pub fn create_config_directories(&self, settings: &AppSettings) -> Result<()> {
        for dir in [
            settings.share_config_base_path.as_str(),
            settings.default_parent_path.as_str(),
        ] {
            fs::create_dir_all(dir)
                .map_err(|e| EngineError::io(format!("failed to create {dir}"), e))?;
        }
        Ok(())
    }
}

fn write_atomically(target: &Path, content: &str) -> Result<()> {
    let temp = target.with_extension("tmp");
    fs::write(&temp, content)
        .map_err(|e| EngineError::io(format!("failed to write {}", temp.display()), e))?;
    if let Err(e) = fs::rename(&temp, target) {
        let _ = fs::remove_file(&temp);
        return Err(EngineError::io(
            format!("failed to move {} into place", target.display()),
            e,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_main_conf_reads_as_not_enabled() {
        let dir = TempDir::new().unwrap();
        let composer = Composer::new(dir.path().join("smb.conf"));
        assert!(!composer.is_enabled(&dir.path().join("shares.d")).unwrap());
    }

    #[test]
    fn enable_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let main_conf = dir.path().join("smb.conf");
        fs::write(&main_conf, "[global]\nworkgroup = HOME\n").unwrap();

        let base = dir.path().join("shares.d");
        let composer = Composer::new(&main_conf);

        composer.enable(&base).unwrap();
        assert!(composer.is_enabled(&base).unwrap());
        assert!(base.is_dir());

        composer.enable(&base).unwrap();
        let content = fs::read_to_string(&main_conf).unwrap();
        let occurrences = content.matches("include =").count();
        assert_eq!(occurrences, 1, "directive must not be duplicated");
        assert!(content.starts_with("[global]"), "existing content is kept");
    }

    #[test]
    fn enable_repoints_a_previous_directive() {
        let dir = TempDir::new().unwrap();
        let main_conf = dir.path().join("smb.conf");
        fs::write(&main_conf, "[global]\nworkgroup = HOME\n").unwrap();
        let composer = Composer::new(&main_conf);

        let old_base = dir.path().join("old.d");
        let new_base = dir.path().join("new.d");
        composer.enable(&old_base).unwrap();
        composer.enable(&new_base).unwrap();

        let content = fs::read_to_string(&main_conf).unwrap();
        assert_eq!(content.matches("include =").count(), 1);
        assert_eq!(content.matches("# Managed by smb-shares").count(), 1);
        assert!(composer.is_enabled(&new_base).unwrap());
        assert!(
            !composer.is_enabled(&old_base).unwrap(),
            "the old base's directive must be gone"
        );
        assert!(content.starts_with("[global]"), "existing content is kept");
    }

    #[test]
    fn enable_treats_each_base_separately() {
        let dir = TempDir::new().unwrap();
        let main_conf = dir.path().join("smb.conf");
        let composer = Composer::new(&main_conf);

        let old_base = dir.path().join("old");
        composer.enable(&old_base).unwrap();
        let new_base = dir.path().join("new");
        assert!(!composer.is_enabled(&new_base).unwrap());
    }

    #[test]
    fn compose_lists_every_record() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("shares.d");
        let composer = Composer::new(dir.path().join("smb.conf"));

        let records = vec![base.join("alpha.conf"), base.join("beta.conf")];
        composer.compose(&base, &records).unwrap();

        let content = fs::read_to_string(base.join(INCLUDES_FILE)).unwrap();
        assert!(content.contains("alpha.conf"));
        assert!(content.contains("beta.conf"));

        composer.compose(&base, &records[..1].to_vec()).unwrap();
        let content = fs::read_to_string(base.join(INCLUDES_FILE)).unwrap();
        assert!(!content.contains("beta.conf"), "membership is regenerated");
    }
}
