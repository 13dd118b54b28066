use flashr_common::config::Config;
use flashr_common::device::identity::DeviceIdentity;
use flashr_common::device::state::DeviceState;
use flashr_common::error::InspectionError;
use flashr_core::adapters::openssh::{OpenSshSession, SshOptions};
use flashr_core::inspector::DeviceInspector;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, warn};

use crate::commands::{Summary, interrupted};
use crate::mprint;
use crate::terminal::{format, print, spinner};

pub async fn inspect(
    devices: Vec<DeviceIdentity>,
    cfg: &Config,
    ssh: &SshOptions,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let inspector = DeviceInspector::new(cfg);
    let mut summary = Summary::start();

    for (idx, identity) in devices.iter().enumerate() {
        if interrupted(&cancel, devices.len() - idx) {
            break;
        }

        let span = spinner::busy(&format!("Inspecting {identity}"));
        match inspect_one(&inspector, identity, ssh, cfg).instrument(span).await {
            Ok(state) => {
                print_state(idx, &state, cfg);
                summary.succeeded();
            }
            Err(InspectionError::Session(e)) => summary.unreachable(identity, &e),
            Err(InspectionError::Parse(e)) => {
                warn!(device = %identity.name, "Cannot determine running firmware: {e}");
                summary.skipped();
            }
        }
    }

    summary.finish("inspected", cfg)
}

async fn inspect_one(
    inspector: &DeviceInspector,
    identity: &DeviceIdentity,
    ssh: &SshOptions,
    cfg: &Config,
) -> Result<DeviceState, InspectionError> {
    let mut session = OpenSshSession::connect(identity.clone(), ssh.clone(), cfg).await?;
    inspector.inspect(&mut session, identity).await
}

fn print_state(idx: usize, state: &DeviceState, cfg: &Config) {
    if cfg.quiet > 1 {
        return;
    }
    mprint!();
    print::tree_head(idx, &state.identity.name);
    print::as_tree_one_level(format::state_details(state));
}
