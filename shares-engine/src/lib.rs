// SPDX-License-Identifier: GPL-3.0-only

//! Share configuration synchronization engine
//!
//! The engine persists each Samba share as an independent `.conf` record
//! under a configurable base directory, keeps the main configuration's
//! include directive in sync with that directory, and funnels every
//! structural change through a single validate-then-reload commit step so
//! the running service always reflects the persisted truth.
//!
//! Consumers drive it exclusively through [`ShareEngine`]:
//!
//! - record CRUD returns the full, freshly reloaded share list rather
//!   than a delta (write-then-reconcile)
//! - composition changes are intent declarations; only
//!   [`ShareEngine::commit_and_reload`] makes the service observe them
//! - usage figures are best-effort and never block a mutation

pub mod commit;
pub mod composer;
pub mod engine;
pub mod error;
pub mod record;
pub mod settings;
pub mod store;
pub mod usage;

pub use commit::{SambaController, ServiceController};
pub use composer::Composer;
pub use engine::ShareEngine;
pub use error::{EngineError, FieldViolation, Result, ValidationError};
pub use settings::SettingsStore;
pub use store::ShareStore;
