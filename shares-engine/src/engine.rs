// SPDX-License-Identifier: GPL-3.0-only

//! The engine facade consumed by the presentation layer
//!
//! One operation at a time, synchronous and sequential: no operation
//! returns before its on-disk and service-reload effects are durable, so
//! callers can safely re-read state immediately after. Settings are read
//! back from the file on every operation rather than cached, so the store
//! always works against persisted truth.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use uuid::Uuid;

use shares_types::{AppSettings, FilesystemUsage, Share, ShareDraft};

use crate::commit::{self, SambaController, ServiceController};
use crate::composer::Composer;
use crate::error::{EngineError, Result};
use crate::settings::{validate_settings, SettingsStore};
use crate::store::ShareStore;
use crate::usage;

/// Default location of the application settings file.
pub const DEFAULT_SETTINGS_PATH: &str = "/etc/samba/share-manager.toml";
/// Default main Samba configuration.
pub const DEFAULT_MAIN_CONF: &str = "/etc/samba/smb.conf";

pub struct ShareEngine {
    settings_store: SettingsStore,
    composer: Composer,
    controller: Box<dyn ServiceController>,
}

impl ShareEngine {
    /// Engine wired to the host's Samba tooling.
    pub fn new(settings_path: impl Into<PathBuf>, main_conf: impl Into<PathBuf>) -> Self {
        Self::with_controller(
            settings_path,
            main_conf,
            Box::new(SambaController::discover()),
        )
    }

    pub fn with_controller(
        settings_path: impl Into<PathBuf>,
        main_conf: impl Into<PathBuf>,
        controller: Box<dyn ServiceController>,
    ) -> Self {
        ShareEngine {
            settings_store: SettingsStore::new(settings_path),
            composer: Composer::new(main_conf),
            controller,
        }
    }

    /// Whether the main configuration currently loads records from the
    /// configured base directory.
    pub fn check_configured(&self) -> Result<bool> {
        let settings = self.settings()?;
        self.composer
            .is_enabled(Path::new(&settings.share_config_base_path))
    }

    pub fn settings(&self) -> Result<AppSettings> {
        self.settings_store.load()
    }

    /// All shares, with best-effort usage figures attached.
    pub fn shares(&self) -> Result<Vec<Share>> {
        let store = self.store()?;
        self.reconciled(&store)
    }

    /// Persist a new share, commit, and return the reconciled list.
    pub fn add_share(&self, draft: ShareDraft) -> Result<Vec<Share>> {
        let store = self.store()?;
        let name = draft.name.clone();
        store.add(draft)?;

        if let Err(e) = self.commit_with(&store) {
            // a rejected commit must leave no partial record behind
            let _ = fs::remove_file(store.record_path(&name));
            self.recompose_best_effort(&store);
            return Err(e);
        }

        self.reconciled(&store)
    }

    /// Persist changes to an existing share, commit, and return the
    /// reconciled list.
    pub fn update_share(&self, share: Share) -> Result<Vec<Share>> {
        let store = self.store()?;
        let previous = store
            .list()?
            .into_iter()
            .find(|candidate| candidate.id == share.id)
            .ok_or(EngineError::NotFound(share.id))?;

        let new_name = share.name.clone();
        store.update(share)?;

        if let Err(e) = self.commit_with(&store) {
            if previous.name != new_name {
                let _ = fs::remove_file(store.record_path(&new_name));
            }
            let _ = store.write_record(&previous);
            self.recompose_best_effort(&store);
            return Err(e);
        }

        self.reconciled(&store)
    }

    /// Delete a share's record, commit, and return the reconciled list.
    pub fn delete_share(&self, id: Uuid) -> Result<Vec<Share>> {
        let store = self.store()?;
        let removed = store
            .list()?
            .into_iter()
            .find(|candidate| candidate.id == id)
            .ok_or(EngineError::NotFound(id))?;

        store.remove(id)?;

        if let Err(e) = self.commit_with(&store) {
            let _ = store.write_record(&removed);
            self.recompose_best_effort(&store);
            return Err(e);
        }

        self.reconciled(&store)
    }

    /// Validate and persist settings. Changing the record base path is a
    /// structural event: the new directory is provisioned and a full
    /// commit runs before this returns. An unchanged base path never
    /// triggers a reload.
    pub fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        validate_settings(settings)?;

        let previous = self.settings_store.load()?;
        self.settings_store.save(settings)?;

        if previous.share_config_base_path != settings.share_config_base_path {
            info!(
                "Share record base path changed from {} to {}",
                previous.share_config_base_path, settings.share_config_base_path
            );
            // work from persisted truth, not the caller's copy
            let current = self.settings_store.load()?;
            self.composer.create_config_directories(&current)?;
            // a live directive must follow the store it describes
            if self
                .composer
                .is_enabled(Path::new(&previous.share_config_base_path))?
            {
                self.composer
                    .enable(Path::new(&current.share_config_base_path))?;
            }
            let store = ShareStore::new(&current.share_config_base_path);
            self.commit_with(&store)?;
        }

        Ok(())
    }

    /// Live usage for the filesystem backing the configured paths.
    /// Infallible by contract; unknown figures carry the "N/A" marker.
    pub fn filesystem_usage(&self, settings: &AppSettings) -> FilesystemUsage {
        usage::filesystem_usage(settings)
    }

    /// Ensure every directory the current settings depend on exists.
    pub fn create_config_directories(&self) -> Result<()> {
        let settings = self.settings()?;
        self.composer.create_config_directories(&settings)
    }

    /// Insert the inclusion directive into the main configuration
    /// (idempotent). The service observes it at the next commit.
    pub fn enable_config(&self) -> Result<()> {
        let settings = self.settings()?;
        self.composer
            .enable(Path::new(&settings.share_config_base_path))
    }

    /// Recompose, validate, and reload. The idempotent commit primitive
    /// behind every structural boundary.
    pub fn commit_and_reload(&self) -> Result<()> {
        let store = self.store()?;
        self.commit_with(&store)
    }

    fn store(&self) -> Result<ShareStore> {
        let settings = self.settings()?;
        Ok(ShareStore::new(settings.share_config_base_path))
    }

    fn commit_with(&self, store: &ShareStore) -> Result<()> {
        commit::commit_and_reload(self.controller.as_ref(), &self.composer, store)
    }

    fn reconciled(&self, store: &ShareStore) -> Result<Vec<Share>> {
        let mut shares = store.list()?;
        usage::attach_used(&mut shares);
        Ok(shares)
    }

    fn recompose_best_effort(&self, store: &ShareStore) {
        if let Ok(files) = store.record_files() {
            let _ = self.composer.compose(store.base(), &files);
        }
    }
}
