use flashr_common::config::Config;
use flashr_common::device::identity::DeviceIdentity;
use flashr_common::error::SessionError;
use flashr_common::upgrade::UpgradeOutcome;
use flashr_core::adapters::catalog::DirectoryCatalog;
use flashr_core::adapters::openssh::{OpenSshSession, SshOptions};
use flashr_core::upgrade::UpgradeService;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::commands::{Summary, interrupted};
use crate::mprint;
use crate::terminal::{format, print, spinner};

pub async fn upgrade(
    devices: Vec<DeviceIdentity>,
    cfg: &Config,
    ssh: &SshOptions,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let catalog = DirectoryCatalog::new(cfg.repository_root.clone());
    let service = UpgradeService::new(Box::new(catalog), cfg.clone());
    let mut summary = Summary::start();

    for (idx, identity) in devices.iter().enumerate() {
        if interrupted(&cancel, devices.len() - idx) {
            break;
        }

        let span = spinner::busy(&format!("Upgrading {identity}"));
        let result = upgrade_one(&service, identity, ssh, cfg, cancel.clone())
            .instrument(span)
            .await;

        match result {
            Ok(outcome) => {
                summary.outcome(&outcome);
                print_outcome(idx, identity, &outcome, cfg);
            }
            Err(e) => summary.unreachable(identity, &e),
        }
    }

    summary.finish("upgraded", cfg)
}

async fn upgrade_one(
    service: &UpgradeService,
    identity: &DeviceIdentity,
    ssh: &SshOptions,
    cfg: &Config,
    cancel: CancellationToken,
) -> Result<UpgradeOutcome, SessionError> {
    let mut session = OpenSshSession::connect(identity.clone(), ssh.clone(), cfg).await?;
    service.run_cycle(&mut session, identity, cancel).await
}

fn print_outcome(idx: usize, identity: &DeviceIdentity, outcome: &UpgradeOutcome, cfg: &Config) {
    if cfg.quiet > 1 {
        return;
    }
    mprint!();
    print::tree_head(idx, &identity.name);
    print::as_tree_one_level(vec![
        ("Address".to_string(), identity.address.as_str().into()),
        format::outcome_detail(outcome),
    ]);
}
