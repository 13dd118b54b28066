//! # Adapters
//!
//! Concrete implementations of the ports defined in `flashr_common`.
//!
//! * **[`catalog`]**: The local image repository, one directory per hardware model.
//! * **[`openssh`]**: Device sessions driven through the system `ssh` and `scp` binaries.

pub mod catalog;
pub mod openssh;
