// SPDX-License-Identifier: GPL-3.0-only

//! Filesystem and per-directory usage probes
//!
//! All figures are reported in kilobytes, which is the canonical unit for
//! the whole engine. These probes are best-effort by design: callers must
//! treat a failure as "unknown", never as a reason to block a share
//! operation.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{Result, SysError};

/// One parsed row of `df -Pk` output. Size fields stay as the strings the
/// tool printed (kilobyte counts, plus the tool's own "42%" rendering).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DfRow {
    pub filesystem: String,
    pub size_kb: String,
    pub used_kb: String,
    pub available_kb: String,
    pub used_percent: String,
    pub mountpoint: String,
}

/// Query the filesystem backing `path` via `df -Pk`.
pub fn filesystem_usage_at(path: &Path) -> Result<DfRow> {
    debug!("Probing filesystem usage at {:?}", path);
    let output = Command::new("df")
        .arg("-Pk")
        .arg(path)
        .output()
        .map_err(|e| SysError::OperationFailed(format!("Failed to execute df: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SysError::OperationFailed(format!(
            "df failed for {}: {}",
            path.display(),
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_df(&stdout).ok_or_else(|| {
        SysError::OperationFailed(format!("unparseable df output for {}", path.display()))
    })
}

/// Parse POSIX `df -Pk` output: a header line, then
/// `filesystem size used available capacity mountpoint`.
pub fn parse_df(output: &str) -> Option<DfRow> {
    let line = output.lines().nth(1)?;
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 6 {
        return None;
    }

    // A mountpoint may contain spaces; everything from field 5 on is part
    // of it.
    let mountpoint = fields[5..].join(" ");

    Some(DfRow {
        filesystem: fields[0].to_string(),
        size_kb: fields[1].to_string(),
        used_kb: fields[2].to_string(),
        available_kb: fields[3].to_string(),
        used_percent: fields[4].to_string(),
        mountpoint,
    })
}

/// Current usage of a directory tree in kilobytes, via `du -sk`.
pub fn directory_used_kb(path: &Path) -> Result<String> {
    let output = Command::new("du")
        .arg("-sk")
        .arg(path)
        .output()
        .map_err(|e| SysError::OperationFailed(format!("Failed to execute du: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SysError::OperationFailed(format!(
            "du failed for {}: {}",
            path.display(),
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .split_whitespace()
        .next()
        .map(ToString::to_string)
        .ok_or_else(|| {
            SysError::OperationFailed(format!("unparseable du output for {}", path.display()))
        })
}

/// Resolve the mountpoint hosting `path` from `/proc/self/mountinfo`,
/// by longest prefix match. Fallback for when `df` itself is unavailable.
pub fn mountpoint_for(path: &Path) -> Result<PathBuf> {
    let mount_info = std::fs::read_to_string("/proc/self/mountinfo")?;
    best_mountpoint(&mount_info, path).ok_or_else(|| {
        SysError::OperationFailed(format!("no mountpoint found for {}", path.display()))
    })
}

pub fn best_mountpoint(mount_info: &str, path: &Path) -> Option<PathBuf> {
    let mut best: Option<PathBuf> = None;

    for line in mount_info.lines().filter(|line| !line.trim().is_empty()) {
        let Some(mount_point) = line.split_whitespace().nth(4) else {
            continue;
        };
        let mount_point = PathBuf::from(unescape_mount_field(mount_point));

        if path.starts_with(&mount_point) {
            let better = match &best {
                Some(current) => mount_point.as_os_str().len() > current.as_os_str().len(),
                None => true,
            };
            if better {
                best = Some(mount_point);
            }
        }
    }

    best
}

/// mountinfo escapes space, tab, newline and backslash as octal triples.
fn unescape_mount_field(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let bytes = value.as_bytes();
    let mut index = 0;

    while index < bytes.len() {
        if bytes[index] == b'\\'
            && index + 3 < bytes.len()
            && bytes[index + 1].is_ascii_digit()
            && bytes[index + 2].is_ascii_digit()
            && bytes[index + 3].is_ascii_digit()
        {
            let octal = &value[index + 1..index + 4];
            if let Ok(num) = u8::from_str_radix(octal, 8) {
                output.push(num as char);
                index += 4;
                continue;
            }
        }

        output.push(bytes[index] as char);
        index += 1;
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_df_output() {
        let sample = "Filesystem     1024-blocks      Used Available Capacity Mounted on\n\
                      /dev/nvme0n1p2   487652352 123456789 339483647      27% /srv\n";

        let row = parse_df(sample).expect("sample should parse");
        assert_eq!(row.filesystem, "/dev/nvme0n1p2");
        assert_eq!(row.size_kb, "487652352");
        assert_eq!(row.used_kb, "123456789");
        assert_eq!(row.available_kb, "339483647");
        assert_eq!(row.used_percent, "27%");
        assert_eq!(row.mountpoint, "/srv");
    }

    #[test]
    fn df_mountpoint_with_spaces() {
        let sample = "Filesystem 1024-blocks Used Available Capacity Mounted on\n\
                      /dev/sdb1 1000 100 900 10% /mnt/my drive\n";
        let row = parse_df(sample).expect("sample should parse");
        assert_eq!(row.mountpoint, "/mnt/my drive");
    }

    #[test]
    fn rejects_truncated_df_output() {
        assert_eq!(parse_df("Filesystem\n/dev/sda1 100\n"), None);
        assert_eq!(parse_df(""), None);
    }

    #[test]
    fn picks_longest_matching_mountpoint() {
        let sample = "36 25 8:2 / / rw,relatime - ext4 /dev/nvme0n1p2 rw\n\
                      48 36 8:3 / /srv rw,relatime - ext4 /dev/nvme0n1p3 rw\n";

        let best = best_mountpoint(sample, Path::new("/srv/projects")).unwrap();
        assert_eq!(best, PathBuf::from("/srv"));

        let root = best_mountpoint(sample, Path::new("/home/user")).unwrap();
        assert_eq!(root, PathBuf::from("/"));
    }

    #[test]
    fn unescapes_octal_mount_fields() {
        let sample = "36 25 8:2 / /mnt/with\\040space rw - ext4 /dev/sda1 rw\n";
        let best = best_mountpoint(sample, Path::new("/mnt/with space/sub")).unwrap();
        assert_eq!(best, PathBuf::from("/mnt/with space"));
    }
}
