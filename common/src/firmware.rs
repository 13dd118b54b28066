//! # Firmware Models
//!
//! * [`version::FirmwareVersion`]: a dotted firmware version with a total order.
//! * [`hardware::HardwareModel`]: the recognized platform of a device.
//! * [`image::LocalImage`] and [`image::UpgradeCandidate`]: images in the local repository.

pub mod hardware;
pub mod image;
pub mod version;
