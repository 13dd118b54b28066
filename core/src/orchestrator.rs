//! # Upgrade State Machine
//!
//! One [`UpgradeOrchestrator`] drives one upgrade attempt against one device:
//!
//! ```text
//! Idle ─▶ SpaceCheck ─▶ Transferring ─▶ Verifying ─▶ Activating ─▶ Done
//!              │              │              │             │
//!              └──────────────┴──────────────┴─────────────┴──▶ Failed(stage)
//! ```
//!
//! Each call to [`UpgradeOrchestrator::step`] performs exactly one transition, and
//! stages never overlap. The boot configuration is only touched in `Activating`, so
//! every failure before that stage leaves the device booting its current image.
//!
//! Activation commits in three steps: save, replace the boot reference, save again.
//! A crash before the first save leaves the old image referenced; a crash between the
//! change and the second save leaves a running configuration that a repeated save
//! persists. Cancellation is honored between stages and during a transfer, but once the
//! boot reference has been sent the second save always runs.
//!
//! There are no retries. A caller re-drives a failed attempt with a fresh orchestrator
//! built from a fresh inspection, so the space check always sees current free space.

use std::time::Duration;

use flashr_common::config::Config;
use flashr_common::device::inventory::DiskInventory;
use flashr_common::error::TransferError;
use flashr_common::firmware::image::UpgradeCandidate;
use flashr_common::session::{CommandChannel, DeviceSession};
use flashr_common::transfer::{TransferReport, TransferRequest, TransferService};
use flashr_common::upgrade::{FailureKind, UpgradeOutcome, UpgradeStage};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument};

use crate::parser;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeState {
    Idle,
    SpaceCheck,
    Transferring,
    Verifying,
    Activating,
    Done,
    Failed {
        stage: UpgradeStage,
        kind: FailureKind,
        detail: String,
    },
}

impl UpgradeState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed { .. })
    }

    /// The outcome a terminal state stands for, `None` while the machine is still running.
    pub fn outcome(&self, activated_image: &str) -> Option<UpgradeOutcome> {
        match self {
            Self::Done => Some(UpgradeOutcome::Succeeded {
                activated_image: activated_image.to_string(),
            }),
            Self::Failed {
                stage,
                kind,
                detail,
            } => Some(UpgradeOutcome::Failed {
                stage: *stage,
                kind: *kind,
                detail: detail.clone(),
            }),
            _ => None,
        }
    }

    fn failed(stage: UpgradeStage, kind: FailureKind, detail: impl Into<String>) -> Self {
        Self::Failed {
            stage,
            kind,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub file_system: String,
    pub transfer_timeout: Duration,
}

impl From<&Config> for OrchestratorSettings {
    fn from(config: &Config) -> Self {
        Self {
            file_system: config.file_system.clone(),
            transfer_timeout: config.transfer_timeout,
        }
    }
}

pub struct UpgradeOrchestrator<'s, S: DeviceSession + ?Sized> {
    session: &'s mut S,
    candidate: UpgradeCandidate,
    free_space_bytes: u64,
    settings: OrchestratorSettings,
    cancel: CancellationToken,
    state: UpgradeState,
    transfer: Option<TransferReport>,
}

impl<'s, S: DeviceSession + ?Sized> UpgradeOrchestrator<'s, S> {
    pub fn new(
        session: &'s mut S,
        candidate: UpgradeCandidate,
        inventory: &DiskInventory,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            session,
            candidate,
            free_space_bytes: inventory.free_space_bytes(),
            settings,
            cancel: CancellationToken::new(),
            state: UpgradeState::Idle,
            transfer: None,
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn state(&self) -> &UpgradeState {
        &self.state
    }

    /// Boot statements that make the device load only the candidate image.
    pub fn boot_commands(&self) -> Vec<String> {
        vec![
            "no boot system".to_string(),
            format!(
                "boot system flash {}{}",
                self.settings.file_system, self.candidate.file_name
            ),
        ]
    }

    /// Drives the machine to a terminal state and reports the outcome.
    pub async fn run(mut self) -> UpgradeOutcome {
        let span = info_span!("orchestrate", image = %self.candidate.file_name);
        async {
            loop {
                if let Some(outcome) = self.state.outcome(&self.candidate.file_name) {
                    return outcome;
                }
                self.step().await;
            }
        }
        .instrument(span)
        .await
    }

    /// Performs a single transition. Terminal states are left unchanged.
    pub async fn step(&mut self) -> &UpgradeState {
        let next = match self.state {
            UpgradeState::Idle => UpgradeState::SpaceCheck,
            UpgradeState::SpaceCheck => self.check_space(),
            UpgradeState::Transferring => self.transfer_image().await,
            UpgradeState::Verifying => self.verify(),
            UpgradeState::Activating => self.activate().await,
            UpgradeState::Done | UpgradeState::Failed { .. } => return &self.state,
        };

        match &next {
            UpgradeState::Failed {
                stage,
                kind,
                detail,
            } if kind.is_severe() => {
                error!(%stage, %kind, "{detail}");
            }
            UpgradeState::Failed {
                stage,
                kind,
                detail,
            } => {
                warn!(%stage, %kind, "{detail}");
            }
            state => info!(state = ?state, "Upgrade stage entered"),
        }

        self.state = next;
        &self.state
    }

    fn cancelled(&self, stage: UpgradeStage) -> Option<UpgradeState> {
        self.cancel.is_cancelled().then(|| {
            UpgradeState::failed(
                stage,
                FailureKind::Cancelled,
                "cancelled before the boot configuration was touched",
            )
        })
    }

    fn check_space(&self) -> UpgradeState {
        if let Some(cancelled) = self.cancelled(UpgradeStage::SpaceCheck) {
            return cancelled;
        }

        let required = self.candidate.file_size_bytes;
        // Equal size leaves no headroom on the device and is rejected.
        if required < self.free_space_bytes {
            info!(required, available = self.free_space_bytes, "Sufficient space available");
            UpgradeState::Transferring
        } else {
            UpgradeState::failed(
                UpgradeStage::SpaceCheck,
                FailureKind::InsufficientSpace,
                format!(
                    "not enough space on {}: required {required} bytes, available {}",
                    self.settings.file_system, self.free_space_bytes
                ),
            )
        }
    }

    async fn transfer_image(&mut self) -> UpgradeState {
        if let Some(cancelled) = self.cancelled(UpgradeStage::Transferring) {
            return cancelled;
        }

        let request = TransferRequest {
            source_path: self.candidate.image_path.clone(),
            dest_name: self.candidate.file_name.clone(),
            file_system: self.settings.file_system.clone(),
            timeout: self.settings.transfer_timeout,
        };
        info!(destination = %request.destination(), "Transferring image");

        let limit = request.timeout;
        let cancel = self.cancel.clone();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return UpgradeState::failed(
                    UpgradeStage::Transferring,
                    FailureKind::Cancelled,
                    format!("transfer of {} interrupted; remote file left in place", request.destination()),
                );
            }
            result = tokio::time::timeout(limit, self.session.transfer(&request)) => {
                result.unwrap_or(Err(TransferError::Timeout(limit)))
            }
        };

        match result {
            Ok(report) => {
                if !report.copied {
                    info!("Image already present on the device, copy skipped");
                }
                self.transfer = Some(report);
                UpgradeState::Verifying
            }
            Err(e) => UpgradeState::failed(
                UpgradeStage::Transferring,
                FailureKind::TransferError,
                e.to_string(),
            ),
        }
    }

    fn verify(&self) -> UpgradeState {
        if let Some(cancelled) = self.cancelled(UpgradeStage::Verifying) {
            return cancelled;
        }

        match self.transfer {
            Some(report) if report.verified => {
                info!("Image transferred and verified");
                UpgradeState::Activating
            }
            _ => UpgradeState::failed(
                UpgradeStage::Verifying,
                FailureKind::VerificationFailed,
                format!(
                    "{}{} did not verify; file left in place, boot configuration unchanged",
                    self.settings.file_system, self.candidate.file_name
                ),
            ),
        }
    }

    async fn activate(&mut self) -> UpgradeState {
        info!("Updating boot system and saving configuration");

        if let Err(e) = self.session.save_config().await {
            return UpgradeState::failed(
                UpgradeStage::Activating,
                FailureKind::ConfigSaveError,
                format!("saving configuration before the boot change failed: {e}"),
            );
        }

        if let Some(cancelled) = self.cancelled(UpgradeStage::Activating) {
            return cancelled;
        }

        let commands = self.boot_commands();
        match self.session.send_config_set(&commands).await {
            Ok(output) if parser::has_error_marker(&output) => {
                return UpgradeState::failed(
                    UpgradeStage::Activating,
                    FailureKind::ActivationError,
                    format!(
                        "device rejected the boot change, check `show boot` before reloading: {}",
                        output.trim()
                    ),
                );
            }
            Ok(_) => {}
            Err(e) => {
                return UpgradeState::failed(
                    UpgradeStage::Activating,
                    FailureKind::ActivationError,
                    format!("boot change failed, check `show boot` before reloading: {e}"),
                );
            }
        }

        if self.cancel.is_cancelled() {
            info!("Cancellation requested, completing the configuration save first");
        }

        match self.session.save_config().await {
            Ok(()) => UpgradeState::Done,
            Err(e) => UpgradeState::failed(
                UpgradeStage::Activating,
                FailureKind::ActivationError,
                format!("boot change applied but not saved, re-issue the save: {e}"),
            ),
        }
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
