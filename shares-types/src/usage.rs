// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

/// Live usage figures for the filesystem backing the configured paths.
///
/// All size fields are canonical kilobyte strings; `used_percent` keeps
/// the probe's own rendering (e.g. "42%"). The entity is fully derived
/// and read-only; unknown fields carry the "N/A" marker rather than
/// failing the read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesystemUsage {
    pub filesystem: String,
    pub mountpoint: String,
    pub size: String,
    pub available: String,
    pub used: String,
    pub used_percent: String,
}

impl FilesystemUsage {
    pub const UNKNOWN: &'static str = "N/A";

    /// A fully-unknown report for the given mountpoint, used when the
    /// usage probe fails but the primary flow must continue.
    pub fn unknown(mountpoint: &str) -> Self {
        FilesystemUsage {
            filesystem: Self::UNKNOWN.to_string(),
            mountpoint: mountpoint.to_string(),
            size: Self::UNKNOWN.to_string(),
            available: Self::UNKNOWN.to_string(),
            used: Self::UNKNOWN.to_string(),
            used_percent: Self::UNKNOWN.to_string(),
        }
    }
}
