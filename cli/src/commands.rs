pub mod inspect;
pub mod plan;
pub mod upgrade;

use std::path::PathBuf;
use std::time::Duration;
use std::time::Instant;

use clap::{ArgAction, Parser, Subcommand};
use colored::*;
use flashr_common::config::{Config, DEFAULT_FILE_SYSTEM, DEFAULT_IMAGE_EXTENSION, DEFAULT_REPOSITORY};
use flashr_common::device::identity::DeviceIdentity;
use flashr_common::error::SessionError;
use flashr_common::upgrade::UpgradeOutcome;
use flashr_core::adapters::openssh::SshOptions;
use tracing::{error, warn};

use crate::terminal::{colors, print};

#[derive(Parser)]
#[command(name = "flashr", version)]
#[command(about = "Firmware upgrades for IOS XE switches and routers.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Local image repository, one directory per hardware model
    #[arg(long, global = true, default_value = DEFAULT_REPOSITORY)]
    pub repo: PathBuf,

    /// Device file system receiving the image
    #[arg(long, global = true, default_value = DEFAULT_FILE_SYSTEM)]
    pub file_system: String,

    /// Image file extension
    #[arg(long, global = true, default_value = DEFAULT_IMAGE_EXTENSION)]
    pub extension: String,

    /// Transfer timeout in seconds
    #[arg(long, global = true, default_value_t = 1800)]
    pub transfer_timeout: u64,

    /// Timeout for a single device command in seconds
    #[arg(long, global = true, default_value_t = 60)]
    pub command_timeout: u64,

    /// Additional hardware tag to recognize, may be repeated
    #[arg(long = "hardware-model", global = true)]
    pub hardware_models: Vec<String>,

    /// SSH user name
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// SSH port
    #[arg(short, long, global = true, default_value_t = 22)]
    pub port: u16,

    /// SSH private key
    #[arg(short, long, global = true)]
    pub identity: Option<PathBuf>,

    /// Less output, repeat for even less
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// Also write the log to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Select candidates but never touch a device
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show version, hardware and storage of devices
    #[command(alias = "i")]
    Inspect {
        #[arg(required = true, value_name = "NAME@ADDRESS")]
        devices: Vec<DeviceIdentity>,
    },
    /// Show the image each device would be upgraded to
    #[command(alias = "p")]
    Plan {
        #[arg(required = true, value_name = "NAME@ADDRESS")]
        devices: Vec<DeviceIdentity>,
    },
    /// Transfer and activate the newest image on each device
    #[command(alias = "u")]
    Upgrade {
        #[arg(required = true, value_name = "NAME@ADDRESS")]
        devices: Vec<DeviceIdentity>,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        Config {
            repository_root: self.repo.clone(),
            file_system: self.file_system.clone(),
            image_extension: self.extension.clone(),
            transfer_timeout: Duration::from_secs(self.transfer_timeout),
            command_timeout: Duration::from_secs(self.command_timeout),
            extra_hardware_models: self.hardware_models.clone(),
            dry_run: self.dry_run,
            quiet: self.quiet,
        }
    }

    pub fn ssh_options(&self) -> SshOptions {
        SshOptions {
            user: self.user.clone(),
            port: self.port,
            identity_file: self.identity.clone(),
            ..SshOptions::default()
        }
    }
}

/// Tally of per-device results across one invocation.
pub struct Summary {
    started: Instant,
    succeeded: usize,
    skipped: usize,
    failed: usize,
    severe: usize,
    unreachable: usize,
}

impl Summary {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            succeeded: 0,
            skipped: 0,
            failed: 0,
            severe: 0,
            unreachable: 0,
        }
    }

    pub fn succeeded(&mut self) {
        self.succeeded += 1;
    }

    pub fn skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn outcome(&mut self, outcome: &UpgradeOutcome) {
        match outcome {
            UpgradeOutcome::Succeeded { .. } => self.succeeded += 1,
            UpgradeOutcome::Skipped(_) => self.skipped += 1,
            UpgradeOutcome::Failed { .. } => {
                self.failed += 1;
                if outcome.is_severe() {
                    self.severe += 1;
                }
            }
        }
    }

    pub fn unreachable(&mut self, identity: &DeviceIdentity, e: &SessionError) {
        error!(device = %identity.name, "{e}");
        self.unreachable += 1;
    }

    /// Prints the summary line and fails if any device needs attention.
    pub fn finish(self, verb: &str, cfg: &Config) -> anyhow::Result<()> {
        let done = format!("{} {verb}", self.succeeded).bold().green();
        let skipped = format!("{} skipped", self.skipped).bold().yellow();
        let failed = format!("{} failed", self.failed + self.unreachable).bold().red();
        let elapsed = format!("{:.2}s", self.started.elapsed().as_secs_f64()).bold();
        let output = format!("{done}, {skipped}, {failed} in {elapsed}")
            .color(colors::TEXT_DEFAULT)
            .to_string();

        match cfg.quiet {
            0 => {
                print::fat_separator();
                print::centerln(&output);
                print::end_of_program();
            }
            _ => print::print(&output),
        }

        if self.unreachable > 0 || self.severe > 0 {
            anyhow::bail!(
                "{} device(s) unreachable, {} with an ambiguous boot configuration",
                self.unreachable,
                self.severe
            );
        }
        Ok(())
    }
}

/// True when the operator asked to stop; remaining devices are left untouched.
pub fn interrupted(cancel: &tokio_util::sync::CancellationToken, remaining: usize) -> bool {
    if cancel.is_cancelled() {
        warn!("Interrupted, {remaining} device(s) not processed");
        return true;
    }
    false
}
