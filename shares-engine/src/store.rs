// SPDX-License-Identifier: GPL-3.0-only

//! CRUD over individually persisted share records
//!
//! One `<name>.conf` per share under the configured base directory. Every
//! mutating operation re-reads the directory and returns the full list so
//! callers reconcile against persisted truth instead of trusting their
//! input. Record writes are all-or-nothing: content goes to a temp file
//! in the same directory, then a rename.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use shares_types::{validate_name, validate_quota, Share, ShareDraft};

use crate::composer::INCLUDES_FILE;
use crate::error::{EngineError, Result, ValidationError};
use crate::record::{parse_record, render_record};

pub struct ShareStore {
    base: PathBuf,
}

impl ShareStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        ShareStore { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// All parseable records in the base directory, ordered by name.
    ///
    /// A missing directory is an empty store, and record files that fail
    /// to parse are skipped with a warning; neither fails the listing.
    pub fn list(&self) -> Result<Vec<Share>> {
        let mut shares = Vec::new();

        for file in self.record_files()? {
            let content = fs::read_to_string(&file)
                .map_err(|e| EngineError::io(format!("failed to read {}", file.display()), e))?;
            match parse_record(&content) {
                Some(share) => shares.push(share),
                None => warn!("Skipping unparseable record file {:?}", file),
            }
        }

        shares.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(shares)
    }

    /// Record files currently present, ordered by filename. This is the
    /// membership the composer aggregates.
    pub fn record_files(&self) -> Result<Vec<PathBuf>> {
        if !self.base.exists() {
            debug!("Record directory {:?} does not exist yet", self.base);
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.base).map_err(|e| {
            EngineError::io(format!("failed to read {}", self.base.display()), e)
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                EngineError::io(format!("failed to read {}", self.base.display()), e)
            })?;
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "conf") {
                continue;
            }
            if path.file_name().is_some_and(|name| name == INCLUDES_FILE) {
                continue;
            }
            files.push(path);
        }

        files.sort();
        Ok(files)
    }

    /// Validate and persist a new share; the store assigns the id.
    pub fn add(&self, draft: ShareDraft) -> Result<Vec<Share>> {
        let quota = validate_draft_fields(&draft.name, &draft.path, &draft.quota)?;

        let existing = self.list()?;
        if existing
            .iter()
            .any(|share| share.name.eq_ignore_ascii_case(&draft.name))
        {
            return Err(EngineError::DuplicateName(draft.name));
        }

        self.refuse_foreign_target(&draft.name)?;

        let mut share = Share::from_draft(Uuid::new_v4(), draft);
        share.quota = quota;
        self.write_record(&share)?;
        debug!("Added share '{}' ({})", share.name, share.id);

        self.list()
    }

    /// Persist changes to an existing share; the id must already exist
    /// and is immutable.
    pub fn update(&self, share: Share) -> Result<Vec<Share>> {
        let quota = validate_draft_fields(&share.name, &share.path, &share.quota)?;

        let existing = self.list()?;
        let previous = existing
            .iter()
            .find(|candidate| candidate.id == share.id)
            .ok_or(EngineError::NotFound(share.id))?;

        if existing.iter().any(|candidate| {
            candidate.id != share.id && candidate.name.eq_ignore_ascii_case(&share.name)
        }) {
            return Err(EngineError::DuplicateName(share.name));
        }

        let renamed_from = (previous.name != share.name).then(|| previous.name.clone());
        if renamed_from.is_some() {
            self.refuse_foreign_target(&share.name)?;
        }

        let mut share = share;
        share.quota = quota;
        share.used = None;
        self.write_record(&share)?;

        // only drop the old record once the new one is durable
        if let Some(old_name) = renamed_from {
            let old_path = self.record_path(&old_name);
            fs::remove_file(&old_path).map_err(|e| {
                EngineError::io(format!("failed to remove {}", old_path.display()), e)
            })?;
            debug!("Renamed share '{}' to '{}'", old_name, share.name);
        }

        self.list()
    }

    /// Delete the record backing `id`.
    pub fn remove(&self, id: Uuid) -> Result<Vec<Share>> {
        let existing = self.list()?;
        let share = existing
            .iter()
            .find(|candidate| candidate.id == id)
            .ok_or(EngineError::NotFound(id))?;

        let path = self.record_path(&share.name);
        fs::remove_file(&path)
            .map_err(|e| EngineError::io(format!("failed to remove {}", path.display()), e))?;
        debug!("Removed share '{}' ({})", share.name, id);

        self.list()
    }

    pub(crate) fn record_path(&self, name: &str) -> PathBuf {
        self.base.join(format!("{name}.conf"))
    }

    /// A write may only replace a file this manager wrote. A foreign
    /// `<name>.conf` is invisible to the duplicate check (it does not
    /// parse), so it has to be caught before it would be clobbered.
    fn refuse_foreign_target(&self, name: &str) -> Result<()> {
        let target = self.record_path(name);
        match fs::read_to_string(&target) {
            Ok(content) if parse_record(&content).is_none() => {
                Err(EngineError::ForeignFile(target))
            }
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EngineError::io(
                format!("failed to read {}", target.display()),
                e,
            )),
        }
    }

    pub(crate) fn write_record(&self, share: &Share) -> Result<()> {
        fs::create_dir_all(&self.base).map_err(|e| {
            EngineError::io(format!("failed to create {}", self.base.display()), e)
        })?;

        let target = self.record_path(&share.name);
        let temp = self.base.join(format!(".{}.conf.tmp", share.name));
        let content = render_record(share);

        fs::write(&temp, content)
            .map_err(|e| EngineError::io(format!("failed to write {}", temp.display()), e))?;

        if let Err(e) = fs::rename(&temp, &target) {
            let _ = fs::remove_file(&temp);
            return Err(EngineError::io(
                format!("failed to move record into place at {}", target.display()),
                e,
            ));
        }

        Ok(())
    }
}

fn validate_draft_fields(name: &str, path: &str, quota: &str) -> Result<String> {
    let mut violations = Vec::new();

    if let Err(message) = validate_name(name) {
        violations.push(crate::error::FieldViolation {
            field: "name",
            message,
        });
    }
    if path.is_empty() {
        violations.push(crate::error::FieldViolation {
            field: "path",
            message: "share path must not be empty".to_string(),
        });
    }

    let quota = match validate_quota(quota) {
        Ok(normalized) => normalized,
        Err(violation) => {
            violations.push(crate::error::FieldViolation {
                field: "quota",
                message: violation.to_string(),
            });
            String::new()
        }
    };

    if violations.is_empty() {
        Ok(quota)
    } else {
        Err(ValidationError { violations }.into())
    }
}
