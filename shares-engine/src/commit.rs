// SPDX-License-Identifier: GPL-3.0-only

//! Commit-and-reload protocol
//!
//! The single choke point for making configuration changes live. A commit
//! recomposes the aggregate include file, validates the fully composed
//! configuration, and only on success signals the service to reload.
//! Rejection leaves the running service on its previous configuration and
//! carries the validator's message verbatim.
//!
//! There is no automatic retry: a rejected validation means a
//! configuration the operator must fix, not a transient fault.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use shares_sys::{SambaTools, SysError};

use crate::composer::Composer;
use crate::error::{EngineError, Result};
use crate::store::ShareStore;

/// Seam to the running service. The real implementation shells out to the
/// Samba tools; tests substitute a stub so engine behavior can be checked
/// without a running smbd.
pub trait ServiceController {
    /// Validate the composed configuration: the main file plus every
    /// included record.
    fn validate(&self, main_conf: &Path, record_files: &[PathBuf])
        -> std::result::Result<(), SysError>;

    /// Ask the running service to reload without dropping connections.
    fn reload(&self) -> std::result::Result<(), SysError>;
}

/// Production controller backed by the discovered Samba tooling.
pub struct SambaController {
    tools: SambaTools,
}

impl SambaController {
    pub fn discover() -> Self {
        SambaController {
            tools: SambaTools::discover(),
        }
    }
}

impl ServiceController for SambaController {
    fn validate(
        &self,
        main_conf: &Path,
        record_files: &[PathBuf],
    ) -> std::result::Result<(), SysError> {
        if self.tools.has_testparm() {
            return self.tools.validate_config(main_conf);
        }

        // No testparm on this host; an ini syntax pass over every file is
        // still a real check.
        debug!("testparm not found, falling back to syntax check");
        let mut files = vec![main_conf.to_path_buf()];
        files.extend_from_slice(record_files);
        self.tools.syntax_check(&files)
    }

    fn reload(&self) -> std::result::Result<(), SysError> {
        self.tools.reload_service()
    }
}

/// Run one commit cycle: compose, validate, apply.
///
/// No partial state is observable: either the previous running
/// configuration stays fully in effect (rejected) or the new one is fully
/// in effect (applied).
pub fn commit_and_reload(
    controller: &dyn ServiceController,
    composer: &Composer,
    store: &ShareStore,
) -> Result<()> {
    let record_files = store.record_files()?;
    composer.compose(store.base(), &record_files)?;

    debug!("Validating composed configuration");
    match controller.validate(composer.main_conf(), &record_files) {
        Ok(()) => {}
        Err(SysError::ConfigRejected(message)) => {
            warn!("Commit rejected: {}", message);
            return Err(EngineError::ConfigRejected(message));
        }
        Err(other) => return Err(other.into()),
    }

    debug!("Applying: reloading the service");
    controller.reload()?;
    info!(
        "Committed {} share record(s) and reloaded the service",
        record_files.len()
    );
    Ok(())
}
