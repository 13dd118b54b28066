use flashr_common::config::Config;
use flashr_common::device::identity::DeviceIdentity;
use flashr_common::error::SessionError;
use flashr_core::adapters::catalog::DirectoryCatalog;
use flashr_core::adapters::openssh::{OpenSshSession, SshOptions};
use flashr_core::upgrade::{Plan, UpgradeService};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::commands::{Summary, interrupted};
use crate::mprint;
use crate::terminal::format::{self, Detail};
use crate::terminal::{print, spinner};

pub async fn plan(
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

        let span = spinner::busy(&format!("Planning {identity}"));
        match plan_one(&service, identity, ssh, cfg).instrument(span).await {
            Ok(plan) => {
                match &plan {
                    Plan::Upgrade { .. } => summary.succeeded(),
                    Plan::Skip { .. } => summary.skipped(),
                }
                print_plan(idx, identity, &plan, cfg);
            }
            Err(e) => summary.unreachable(identity, &e),
        }
    }

    summary.finish("planned", cfg)
}

async fn plan_one(
    service: &UpgradeService,
    identity: &DeviceIdentity,
    ssh: &SshOptions,
    cfg: &Config,
) -> Result<Plan, SessionError> {
    let mut session = OpenSshSession::connect(identity.clone(), ssh.clone(), cfg).await?;
    service.plan(&mut session, identity).await
}

fn print_plan(idx: usize, identity: &DeviceIdentity, plan: &Plan, cfg: &Config) {
    if cfg.quiet > 1 {
        return;
    }

    let mut details: Vec<Detail> = plan.state().map(format::state_details).unwrap_or_default();
    match plan {
        Plan::Upgrade { candidate, .. } => details.push(format::candidate_detail(candidate)),
        Plan::Skip { reason, .. } => details.push(format::skip_detail(reason)),
    }

    mprint!();
    print::tree_head(idx, &identity.name);
    print::as_tree_one_level(details);
}
