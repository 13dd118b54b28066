//! # Device Models
//!
//! Everything known about one device during one inspection cycle.
//!
//! * [`identity::DeviceIdentity`]: how the operator names and reaches the device.
//! * [`inventory::DiskInventory`]: capacity, free space and image files on device storage.
//! * [`state::DeviceState`]: the immutable snapshot consumed by selection and upgrade.

pub mod identity;
pub mod inventory;
pub mod state;
