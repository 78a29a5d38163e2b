// SPDX-License-Identifier: GPL-3.0-only

//! Pure validators for operator input
//!
//! All validation that can run without touching the filesystem lives here,
//! so bad input is rejected before any record is written.

use std::fmt;

/// Violation of the configurable-directory path invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathViolation {
    NotAbsolute,
    TrailingSeparator,
}

impl fmt::Display for PathViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathViolation::NotAbsolute => write!(f, "path must start with \"/\""),
            PathViolation::TrailingSeparator => write!(f, "path must not end with \"/\""),
        }
    }
}

/// Check a configurable directory path: absolute, and no trailing slash
/// unless the path is the root itself.
pub fn validate_path(value: &str) -> Option<PathViolation> {
    if !value.starts_with('/') {
        return Some(PathViolation::NotAbsolute);
    }
    if value.len() > 1 && value.ends_with('/') {
        return Some(PathViolation::TrailingSeparator);
    }
    None
}

/// Violation of the quota grammar `^\d+\s*(K|M|G|T|P)?B?$`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaViolation {
    BadFormat,
    NotPositive,
}

impl fmt::Display for QuotaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaViolation::BadFormat => write!(
                f,
                "invalid format; use a positive integer plus unit (e.g. 100KB, 500MB, 1G, 2TB)"
            ),
            QuotaViolation::NotPositive => write!(f, "quota must be a positive integer"),
        }
    }
}

/// Validate a quota string and return it normalized to uppercase.
///
/// An empty string is valid and means "no quota". Fractions are not
/// accepted here: quotas are stored as whole units.
pub fn validate_quota(value: &str) -> Result<String, QuotaViolation> {
    let normalized = value.trim().to_ascii_uppercase();
    if normalized.is_empty() {
        return Ok(normalized);
    }

    let digits = normalized
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return Err(QuotaViolation::BadFormat);
    }

    match normalized[digits..].trim_start() {
        "" | "B" | "K" | "KB" | "M" | "MB" | "G" | "GB" | "T" | "TB" | "P" | "PB" => {}
        _ => return Err(QuotaViolation::BadFormat),
    }

    // Reject 0, 00, 0GB and friends; overflow of u64 is equally unusable.
    match normalized[..digits].parse::<u64>() {
        Ok(0) | Err(_) => Err(QuotaViolation::NotPositive),
        Ok(_) => Ok(normalized),
    }
}

/// Check a share name for use as a Samba section name and a filename stem.
pub fn validate_name(value: &str) -> Result<(), String> {
    let name = value.trim();
    if name.is_empty() {
        return Err("share name must not be empty".to_string());
    }
    if name.contains(['/', '[', ']']) || name.bytes().any(|b| b.is_ascii_control()) {
        return Err(format!("share name '{name}' contains invalid characters"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_shapes() {
        assert_eq!(validate_path("relative/path"), Some(PathViolation::NotAbsolute));
        assert_eq!(
            validate_path("/trailing/"),
            Some(PathViolation::TrailingSeparator)
        );
        assert_eq!(validate_path("/"), None);
        assert_eq!(validate_path("/srv/data"), None);
    }

    #[test]
    fn quota_accepts_and_normalizes() {
        assert_eq!(validate_quota("100KB").unwrap(), "100KB");
        assert_eq!(validate_quota("500mb").unwrap(), "500MB");
        assert_eq!(validate_quota("1g").unwrap(), "1G");
        assert_eq!(validate_quota("2TB").unwrap(), "2TB");
        assert_eq!(validate_quota("").unwrap(), "");
    }

    #[test]
    fn quota_rejects() {
        assert_eq!(validate_quota("-5GB"), Err(QuotaViolation::BadFormat));
        assert_eq!(validate_quota("abc"), Err(QuotaViolation::BadFormat));
        assert_eq!(validate_quota("5X"), Err(QuotaViolation::BadFormat));
        assert_eq!(validate_quota("1.5G"), Err(QuotaViolation::BadFormat));
        assert_eq!(validate_quota("0GB"), Err(QuotaViolation::NotPositive));
        assert_eq!(validate_quota("0"), Err(QuotaViolation::NotPositive));
    }

    #[test]
    fn share_names() {
        assert!(validate_name("projects").is_ok());
        assert!(validate_name("team share").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("  ").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("bad[name]").is_err());
    }
}
