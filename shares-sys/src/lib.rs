// SPDX-License-Identifier: GPL-3.0-only

//! Low-level system operations for Samba share management
//!
//! This crate wraps the command-line tools the engine depends on:
//! - `testparm` for validating a composed configuration
//! - `smbcontrol` (with a `systemctl reload` fallback) for zero-downtime
//!   reloads
//! - `df`/`du` for filesystem and per-directory usage probes
//!
//! Everything here is synchronous and short-lived; callers decide what is
//! fatal and what is best-effort.

pub mod error;
pub mod samba;
pub mod usage;

pub use error::{Result, SysError};
pub use samba::SambaTools;
pub use usage::{directory_used_kb, filesystem_usage_at, mountpoint_for, DfRow};
