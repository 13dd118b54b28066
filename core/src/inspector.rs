//! # Device Inspection
//!
//! Reads `show version` and the storage listing over the command channel and folds
//! them into one [`DeviceState`]. Parsing itself is delegated to [`crate::parser`].

use flashr_common::config::Config;
use flashr_common::device::identity::DeviceIdentity;
use flashr_common::device::state::DeviceState;
use flashr_common::error::InspectionError;
use flashr_common::firmware::hardware::HardwareAllowList;
use flashr_common::session::CommandChannel;
use tracing::{info, warn};

use crate::parser::inventory::InventoryParser;
use crate::parser::version::VersionParser;

pub const SHOW_VERSION: &str = "show version";

#[derive(Debug, Clone)]
pub struct DeviceInspector {
    version_parser: VersionParser,
    inventory_parser: InventoryParser,
    dir_command: String,
}

impl DeviceInspector {
    pub fn new(config: &Config) -> Self {
        Self {
            version_parser: VersionParser::new(HardwareAllowList::with_extra(
                config.extra_hardware_models.iter().cloned(),
            )),
            inventory_parser: InventoryParser::new(config.image_extension.clone()),
            dir_command: config.dir_command(),
        }
    }

    /// Builds the snapshot for one cycle.
    ///
    /// Session failures and an unreadable running version are errors. Problems in the
    /// storage listing are logged and the partial inventory is kept.
    pub async fn inspect<S: CommandChannel + ?Sized>(
        &self,
        session: &mut S,
        identity: &DeviceIdentity,
    ) -> Result<DeviceState, InspectionError> {
        let device = identity.name.as_str();

        info!(device, "Parsing '{SHOW_VERSION}' output");
        let raw_version = session.send_command(SHOW_VERSION).await?;
        let (current_version, hardware_model) = self.version_parser.parse(&raw_version)?;
        info!(device, version = %current_version, "Parsed running firmware version");
        if hardware_model.is_known() {
            info!(device, hardware = %hardware_model, "Hardware type detected");
        } else {
            warn!(device, "Hardware type not recognized");
        }

        info!(device, "Parsing '{}' output", self.dir_command);
        let raw_listing = session.send_command(&self.dir_command).await?;
        let scan = self.inventory_parser.parse(&raw_listing);
        for error in &scan.errors {
            warn!(device, "Storage listing: {error}");
        }
        info!(
            device,
            free = scan.inventory.free_space_bytes(),
            total = scan.inventory.total_capacity_bytes(),
            images = scan.inventory.files().len(),
            "Storage parsed"
        );

        Ok(DeviceState {
            identity: identity.clone(),
            current_version,
            hardware_model,
            inventory: scan.inventory,
        })
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
