//! # Flashr Common
//!
//! Shared vocabulary of the upgrade engine.
//!
//! * **[`firmware`]**: Firmware versions, hardware models and local images.
//! * **[`device`]**: Device identity, storage inventory and the per-cycle [`device::state::DeviceState`].
//! * **[`upgrade`]**: Stages, failure classes and the final [`upgrade::UpgradeOutcome`].
//! * **[`session`]**, **[`transfer`]**, **[`catalog`]**: Ports implemented by the infrastructure.
//! * **[`config`]** and **[`error`]**: Runtime settings and the error taxonomy.

pub mod catalog;
pub mod config;
pub mod device;
pub mod error;
pub mod firmware;
pub mod session;
pub mod transfer;
pub mod upgrade;
