// SPDX-License-Identifier: GPL-3.0-only

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One exported network directory with its own access and quota settings.
///
/// `id` is assigned by the record store and never user-editable. `used` is
/// derived: the usage reporter attaches it on read paths, and it is never
/// persisted into the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub id: Uuid,
    pub name: String,
    pub path: String,
    pub comment: String,
    pub guest_ok: bool,
    pub read_only: bool,
    pub browsable: bool,
    /// Canonical size string ("10GB"); empty means no quota.
    pub quota: String,
    /// Current on-disk usage in kilobytes, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<String>,
    /// Raw configuration text appended verbatim to the record.
    pub advanced_settings: String,
}

/// A share as entered by the operator, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShareDraft {
    pub name: String,
    pub path: String,
    pub comment: String,
    pub guest_ok: bool,
    pub read_only: bool,
    pub browsable: bool,
    pub quota: String,
    pub advanced_settings: String,
}

impl Share {
    pub fn from_draft(id: Uuid, draft: ShareDraft) -> Self {
        Share {
            id,
            name: draft.name,
            path: draft.path,
            comment: draft.comment,
            guest_ok: draft.guest_ok,
            read_only: draft.read_only,
            browsable: draft.browsable,
            quota: draft.quota,
            used: None,
            advanced_settings: draft.advanced_settings,
        }
    }
}

/// Sortable share-list columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    Path,
    Quota,
    Used,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "name" => Ok(SortKey::Name),
            "path" => Ok(SortKey::Path),
            "quota" => Ok(SortKey::Quota),
            "used" => Ok(SortKey::Used),
            other => Err(format!("unknown sort key '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_promotion_keeps_fields_and_leaves_used_unset() {
        let draft = ShareDraft {
            name: "projects".to_string(),
            path: "/srv/projects".to_string(),
            comment: "team projects".to_string(),
            guest_ok: false,
            read_only: true,
            browsable: true,
            quota: "10GB".to_string(),
            advanced_settings: String::new(),
        };

        let id = Uuid::new_v4();
        let share = Share::from_draft(id, draft.clone());
        assert_eq!(share.id, id);
        assert_eq!(share.name, draft.name);
        assert_eq!(share.quota, "10GB");
        assert!(share.used.is_none());
    }
}
