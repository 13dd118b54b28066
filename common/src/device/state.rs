use crate::device::identity::DeviceIdentity;
use crate::device::inventory::DiskInventory;
use crate::firmware::hardware::HardwareModel;
use crate::firmware::version::FirmwareVersion;

/// Snapshot of a device, built once per inspection cycle and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    pub identity: DeviceIdentity,
    pub current_version: FirmwareVersion,
    pub hardware_model: HardwareModel,
    pub inventory: DiskInventory,
}
