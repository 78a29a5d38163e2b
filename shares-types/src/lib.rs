// SPDX-License-Identifier: GPL-3.0-only

//! Canonical domain models for the Samba share manager
//!
//! This crate defines the single source of truth for the domain types used
//! throughout the stack:
//!
//! - **shares-engine**: persists and composes these types
//! - **shares-cli**: consumes them for display and JSON output
//!
//! It also hosts the size codec and the pure validators (path shape, quota
//! grammar, share names) so they can be exercised without any I/O.

pub mod settings;
pub mod share;
pub mod sizes;
pub mod usage;
pub mod validate;

pub use settings::{AppSettings, Theme};
pub use share::{Share, ShareDraft, SortKey};
pub use sizes::{compare_sizes, from_kilobytes, to_kilobytes, SORT_LAST};
pub use usage::FilesystemUsage;
pub use validate::{validate_name, validate_path, validate_quota, PathViolation, QuotaViolation};
