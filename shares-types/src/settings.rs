// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

/// Application settings persisted as TOML.
///
/// `share_config_base_path` is structural: changing it changes which
/// directory the record store reads and writes, so the engine must
/// re-provision and re-compose before trusting the store again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Directory holding one record file per share.
    pub share_config_base_path: String,
    /// Directory suggested as the parent for new share paths.
    pub default_parent_path: String,
    /// Name fragment appended under the parent path for suggestions.
    pub default_mountpoint_name: String,
    pub theme: Theme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            share_config_base_path: "/etc/samba/shares.d".to_string(),
            default_parent_path: "/srv".to_string(),
            default_mountpoint_name: "smbdatastore".to_string(),
            theme: Theme::Dark,
        }
    }
}

impl AppSettings {
    /// Suggested filesystem path for a new share, built from the configured
    /// parent path and mountpoint name.
    pub fn suggested_share_path(&self, name: &str) -> String {
        let mut parts = Vec::new();
        let parent = self.default_parent_path.trim_end_matches('/');
        if !parent.is_empty() {
            parts.push(parent);
        }
        let mountpoint = self.default_mountpoint_name.trim_matches('/');
        if !mountpoint.is_empty() {
            parts.push(mountpoint);
        }
        let name = name.trim_matches('/');
        if !name.is_empty() {
            parts.push(name);
        }

        if parts.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", parts.join("/").trim_start_matches('/'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.share_config_base_path, "/etc/samba/shares.d");
        assert_eq!(settings.default_parent_path, "/srv");
        assert_eq!(settings.theme, Theme::Dark);
    }

    #[test]
    fn suggested_paths() {
        let settings = AppSettings::default();
        assert_eq!(
            settings.suggested_share_path("media"),
            "/srv/smbdatastore/media"
        );

        let bare = AppSettings {
            default_parent_path: String::new(),
            default_mountpoint_name: String::new(),
            ..AppSettings::default()
        };
        assert_eq!(bare.suggested_share_path(""), "/");
    }

    #[test]
    fn settings_round_trip_toml() {
        let settings = AppSettings::default();
        let text = toml::to_string(&settings).unwrap();
        let back: AppSettings = toml::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let back: AppSettings = toml::from_str("theme = \"light\"").unwrap();
        assert_eq!(back.theme, Theme::Light);
        assert_eq!(back.default_parent_path, "/srv");
    }
}
