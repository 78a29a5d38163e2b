// SPDX-License-Identifier: GPL-3.0-only

//! Samba CLI operations
//!
//! This module wraps the Samba command-line tools used to validate a
//! composed configuration and to reload the running service without
//! interrupting existing connections.

use std::path::{Path, PathBuf};
use std::process::Command;

use configparser::ini::Ini;
use tracing::{debug, info, warn};
use which::which;

use crate::error::{Result, SysError};

/// Discovered Samba tooling. Every tool is optional so the engine can run
/// (and be tested) on hosts without a full Samba installation; callers
/// fall back per-tool.
pub struct SambaTools {
    testparm: Option<PathBuf>,
    smbcontrol: Option<PathBuf>,
    systemctl: Option<PathBuf>,
}

impl SambaTools {
    /// Locate the Samba tools in PATH.
    pub fn discover() -> Self {
        let testparm = which("testparm").ok();
        let smbcontrol = which("smbcontrol").ok();
        let systemctl = which("systemctl").ok();

        debug!(
            "Samba tooling: testparm={:?}, smbcontrol={:?}, systemctl={:?}",
            testparm, smbcontrol, systemctl
        );

        SambaTools {
            testparm,
            smbcontrol,
            systemctl,
        }
    }

    pub fn has_testparm(&self) -> bool {
        self.testparm.is_some()
    }

    /// Validate the fully composed configuration with `testparm`.
    ///
    /// `testparm -s` loads the given main file and every file it includes,
    /// which is exactly the set the running service would load on reload.
    /// Rejection carries the tool's stderr verbatim.
    pub fn validate_config(&self, main_conf: &Path) -> Result<()> {
        let testparm = self
            .testparm
            .as_ref()
            .ok_or_else(|| SysError::ToolNotFound("testparm".to_string()))?;

        debug!("Validating {:?} with testparm", main_conf);
        let output = Command::new(testparm)
            .arg("--suppress-prompt")
            .arg(main_conf)
            .output()
            .map_err(|e| SysError::OperationFailed(format!("Failed to execute testparm: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("testparm rejected {:?}: {}", main_conf, stderr);
            return Err(SysError::ConfigRejected(stderr.trim().to_string()));
        }

        Ok(())
    }

    /// Syntax-only check used when `testparm` is not installed: every file
    /// must parse as an ini document.
    pub fn syntax_check(&self, files: &[PathBuf]) -> Result<()> {
        for file in files {
            if !file.exists() {
                continue;
            }
            let content = std::fs::read_to_string(file)?;
            let mut conf = Ini::new();
            if let Err(e) = conf.read(content) {
                return Err(SysError::ConfigRejected(format!(
                    "{}: {}",
                    file.display(),
                    e
                )));
            }
        }
        Ok(())
    }

    /// Signal the running service to re-read its configuration.
    ///
    /// Prefers `smbcontrol all reload-config`, which reloads in place;
    /// falls back to `systemctl reload smbd`. Neither interrupts existing
    /// connections.
    pub fn reload_service(&self) -> Result<()> {
        if let Some(smbcontrol) = &self.smbcontrol {
            let output = Command::new(smbcontrol)
                .args(["all", "reload-config"])
                .output()
                .map_err(|e| {
                    SysError::OperationFailed(format!("Failed to execute smbcontrol: {e}"))
                })?;

            if output.status.success() {
                info!("Reloaded Samba configuration via smbcontrol");
                return Ok(());
            }

            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("smbcontrol reload-config failed: {}", stderr.trim());
        }

        if let Some(systemctl) = &self.systemctl {
            let output = Command::new(systemctl)
                .args(["reload", "smbd"])
                .output()
                .map_err(|e| {
                    SysError::OperationFailed(format!("Failed to execute systemctl: {e}"))
                })?;

            if output.status.success() {
                info!("Reloaded Samba configuration via systemctl");
                return Ok(());
            }

            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SysError::OperationFailed(format!(
                "systemctl reload smbd failed: {}",
                stderr.trim()
            )));
        }

        Err(SysError::ToolNotFound("smbcontrol or systemctl".to_string()))
    }
}

impl std::fmt::Debug for SambaTools {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SambaTools")
            .field("testparm", &self.testparm)
            .field("smbcontrol", &self.smbcontrol)
            .field("systemctl", &self.systemctl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_tools() -> SambaTools {
        SambaTools {
            testparm: None,
            smbcontrol: None,
            systemctl: None,
        }
    }

    #[test]
    fn validate_without_testparm_reports_missing_tool() {
        let tools = no_tools();
        let err = tools.validate_config(Path::new("/etc/samba/smb.conf"));
        assert!(matches!(err, Err(SysError::ToolNotFound(_))));
    }

    #[test]
    fn reload_without_any_tool_fails() {
        let tools = no_tools();
        assert!(matches!(
            tools.reload_service(),
            Err(SysError::ToolNotFound(_))
        ));
    }

    #[test]
    fn syntax_check_skips_missing_files() {
        let tools = no_tools();
        tools
            .syntax_check(&[PathBuf::from("/nonexistent/smb.conf")])
            .expect("missing files are not a syntax error");
    }
}
