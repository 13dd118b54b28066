mod commands;
mod terminal;

use commands::{CommandLine, Commands, inspect, plan, upgrade};
use terminal::{logging, print};
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init(commands.quiet, commands.log_file.as_deref())?;

    let cfg = commands.config();
    let ssh = commands.ssh_options();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping at the next safe point");
            on_interrupt.cancel();
        }
    });

    match commands.command {
        Commands::Inspect { devices } => {
            print::header("inspecting devices", cfg.quiet);
            inspect::inspect(devices, &cfg, &ssh, cancel).await
        }
        Commands::Plan { devices } => {
            print::header("planning upgrades", cfg.quiet);
            plan::plan(devices, &cfg, &ssh, cancel).await
        }
        Commands::Upgrade { devices } => {
            let title = if cfg.dry_run { "upgrading (dry run)" } else { "upgrading devices" };
            print::header(title, cfg.quiet);
            upgrade::upgrade(devices, &cfg, &ssh, cancel).await
        }
    }
}
