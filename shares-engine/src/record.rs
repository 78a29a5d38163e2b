// SPDX-License-Identifier: GPL-3.0-only

//! On-disk codec for individual share records
//!
//! Each record is an independently parseable Samba section. Fields the
//! service does not know about (the stable id, the quota) ride on marked
//! comment lines, which Samba ignores. Whatever the operator put into
//! `advanced_settings` is appended verbatim, indentation included, and
//! recovered verbatim; only blank lines at its outer edges are dropped.
//!
//! ```text
//! ; smb-shares: id = 4be7…
//! ; smb-shares: quota = 10GB
//! [projects]
//!     path = /srv/projects
//!     comment = Team projects
//!     guest ok = no
//!     read only = no
//!     browseable = yes
//!     vfs objects = catia
//! ```

use uuid::Uuid;

use shares_types::Share;

const META_PREFIX: &str = "; smb-shares:";

/// Render a share as its record file content.
pub fn render_record(share: &Share) -> String {
    let mut out = String::new();

    out.push_str(&format!("{META_PREFIX} id = {}\n", share.id));
    if !share.quota.is_empty() {
        out.push_str(&format!("{META_PREFIX} quota = {}\n", share.quota));
    }

    out.push_str(&format!("[{}]\n", share.name));
    out.push_str(&format!("    path = {}\n", share.path));
    if !share.comment.is_empty() {
        out.push_str(&format!("    comment = {}\n", share.comment));
    }
    out.push_str(&format!("    guest ok = {}\n", yes_no(share.guest_ok)));
    out.push_str(&format!("    read only = {}\n", yes_no(share.read_only)));
    out.push_str(&format!("    browseable = {}\n", yes_no(share.browsable)));

    // every line byte-verbatim; outer blank lines are the one normalization
    let advanced = share.advanced_settings.trim_matches('\n');
    if !advanced.is_empty() {
        for line in advanced.lines() {
            out.push_str(line);
            out.push('\n');
        }
    }

    out
}

/// Parse a record file back into a [`Share`].
///
/// Returns `None` when the content is not a manager-written record (no
/// marked id, or no section header); callers skip such files rather than
/// failing the whole listing.
pub fn parse_record(content: &str) -> Option<Share> {
    let mut id: Option<Uuid> = None;
    let mut quota = String::new();
    let mut name: Option<String> = None;
    let mut path: Option<String> = None;
    let mut comment: Option<String> = None;
    let mut guest_ok: Option<bool> = None;
    let mut read_only: Option<bool> = None;
    let mut browsable: Option<bool> = None;
    let mut advanced: Vec<&str> = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();

        if let Some(meta) = trimmed.strip_prefix(META_PREFIX) {
            if let Some((key, value)) = meta.split_once('=') {
                match key.trim() {
                    "id" => id = Uuid::parse_str(value.trim()).ok(),
                    "quota" => quota = value.trim().to_string(),
                    _ => {}
                }
            }
            continue;
        }

        if name.is_none() {
            if trimmed.len() > 2 && trimmed.starts_with('[') && trimmed.ends_with(']') {
                name = Some(trimmed[1..trimmed.len() - 1].to_string());
            }
            // anything before the section header that is not metadata is
            // not ours to keep
            continue;
        }

        if trimmed.is_empty() {
            if !advanced.is_empty() {
                advanced.push(line);
            }
            continue;
        }

        // Known keys are consumed at most once and only before the
        // advanced block starts; everything else is the operator's raw
        // configuration and must survive byte-verbatim, so the raw line
        // is kept, not the trimmed one.
        match trimmed.split_once('=') {
            Some((key, value)) if advanced.is_empty() => {
                let value = value.trim();
                match normalize_key(key).as_str() {
                    "path" if path.is_none() => path = Some(value.to_string()),
                    "comment" if comment.is_none() => comment = Some(value.to_string()),
                    "guest ok" if guest_ok.is_none() => guest_ok = Some(parse_bool(value, false)),
                    "read only" if read_only.is_none() => {
                        read_only = Some(parse_bool(value, false))
                    }
                    "browseable" | "browsable" if browsable.is_none() => {
                        browsable = Some(parse_bool(value, true))
                    }
                    _ => advanced.push(line),
                }
            }
            _ => advanced.push(line),
        }
    }

    let share = Share {
        id: id?,
        name: name?,
        path: path.unwrap_or_default(),
        comment: comment.unwrap_or_default(),
        guest_ok: guest_ok.unwrap_or(false),
        read_only: read_only.unwrap_or(false),
        browsable: browsable.unwrap_or(true),
        quota,
        used: None,
        advanced_settings: join_advanced(advanced),
    };
    Some(share)
}

fn join_advanced(lines: Vec<&str>) -> String {
    let mut text = lines.join("\n");
    while text.ends_with('\n') {
        text.pop();
    }
    text
}

fn normalize_key(key: &str) -> String {
    key.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn parse_bool(value: &str, default: bool) -> bool {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" => true,
        "no" | "false" | "0" => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shares_types::ShareDraft;

    fn sample() -> Share {
        Share::from_draft(
            Uuid::new_v4(),
            ShareDraft {
                name: "projects".to_string(),
                path: "/srv/projects".to_string(),
                comment: "Team projects".to_string(),
                guest_ok: false,
                read_only: true,
                browsable: true,
                quota: "10GB".to_string(),
                advanced_settings: String::new(),
            },
        )
    }

    #[test]
    fn record_round_trips_every_field() {
        let share = sample();
        let parsed = parse_record(&render_record(&share)).expect("record should parse");
        assert_eq!(parsed, share);
    }

    #[test]
    fn advanced_settings_survive_verbatim() {
        let mut share = sample();
        share.advanced_settings =
            "vfs objects = catia fruit\n\nfruit:encoding = native".to_string();

        let rendered = render_record(&share);
        let parsed = parse_record(&rendered).expect("record should parse");
        assert_eq!(parsed.advanced_settings, share.advanced_settings);
    }

    #[test]
    fn advanced_settings_keep_their_indentation() {
        let mut share = sample();
        share.advanced_settings =
            "\tvfs objects = catia\n    fruit:locking = netatalk".to_string();

        let rendered = render_record(&share);
        assert!(rendered.contains("\tvfs objects = catia\n"));
        assert!(rendered.contains("    fruit:locking = netatalk\n"));
        let parsed = parse_record(&rendered).expect("record should parse");
        assert_eq!(parsed.advanced_settings, share.advanced_settings);
    }

    #[test]
    fn empty_quota_is_omitted_and_recovered_empty() {
        let mut share = sample();
        share.quota = String::new();

        let rendered = render_record(&share);
        assert!(!rendered.contains("quota"));
        let parsed = parse_record(&rendered).expect("record should parse");
        assert_eq!(parsed.quota, "");
    }

    #[test]
    fn foreign_conf_files_are_not_records() {
        assert_eq!(parse_record("[global]\nworkgroup = HOME\n"), None);
        assert_eq!(parse_record(""), None);
        // a marked id without a section is still not a record
        assert_eq!(parse_record("; smb-shares: id = not-a-uuid\n[x]\n"), None);
    }

    #[test]
    fn unknown_keys_fold_into_advanced_settings() {
        let text = "; smb-shares: id = 7f8a1f9e-30a3-4df5-a2f3-9a9f64d4c1aa\n\
                    [media]\n\
                    path = /srv/media\n\
                    guest ok = yes\n\
                    read only = no\n\
                    browseable = yes\n\
                    hosts allow = 192.168.1.\n";
        let parsed = parse_record(text).expect("record should parse");
        assert_eq!(parsed.advanced_settings, "hosts allow = 192.168.1.");
        assert!(parsed.guest_ok);
    }
}
