// SPDX-License-Identifier: GPL-3.0-only

//! Best-effort usage reporting
//!
//! Usage probes are decoupled from the mutation path by contract: a probe
//! failure is logged and rendered as an unknown marker, never returned as
//! an error. Nothing here may block or fail a share operation.

use std::path::Path;

use tracing::{debug, warn};

use shares_types::{AppSettings, FilesystemUsage, Share};

/// Query the filesystem backing the configured default parent path.
pub fn filesystem_usage(settings: &AppSettings) -> FilesystemUsage {
    let probe_path = Path::new(&settings.default_parent_path);

    match shares_sys::filesystem_usage_at(probe_path) {
        Ok(row) => FilesystemUsage {
            filesystem: row.filesystem,
            mountpoint: row.mountpoint,
            size: row.size_kb,
            available: row.available_kb,
            used: row.used_kb,
            used_percent: row.used_percent,
        },
        Err(e) => {
            warn!(
                "Filesystem usage probe failed for {}: {}",
                probe_path.display(),
                e
            );
            // still report which mountpoint we were looking at, if we can
            let mountpoint = shares_sys::mountpoint_for(probe_path)
                .map(|mountpoint| mountpoint.display().to_string())
                .unwrap_or_else(|_| settings.default_parent_path.clone());
            FilesystemUsage::unknown(&mountpoint)
        }
    }
}

/// Attach current per-directory usage to each share. Failures leave
/// `used` unset for that share only.
pub fn attach_used(shares: &mut [Share]) {
    for share in shares.iter_mut() {
        match shares_sys::directory_used_kb(Path::new(&share.path)) {
            Ok(kb) => share.used = Some(kb),
            Err(e) => {
                debug!("Usage probe failed for share '{}': {}", share.name, e);
                share.used = None;
            }
        }
    }
}
