//! # Upgrade Service
//!
//! Implements the per-device use case.
//!
//! 1. **Inspect**: build a [`DeviceState`] through the command channel.
//! 2. **Plan**: look up the catalog for the hardware model and select a candidate.
//! 3. **Upgrade**: hand the candidate to the [`UpgradeOrchestrator`].
//!
//! Only a broken session is returned as an error. Every other condition ends in an
//! [`UpgradeOutcome`], so callers can tell skip-and-continue apart from fatal problems
//! without looking at error text.

use flashr_common::catalog::ImageCatalog;
use flashr_common::config::Config;
use flashr_common::device::identity::DeviceIdentity;
use flashr_common::device::state::DeviceState;
use flashr_common::error::{InspectionError, SessionError};
use flashr_common::firmware::image::UpgradeCandidate;
use flashr_common::session::{CommandChannel, DeviceSession};
use flashr_common::upgrade::{SkipReason, UpgradeOutcome};
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

use crate::inspector::DeviceInspector;
use crate::orchestrator::{OrchestratorSettings, UpgradeOrchestrator};
use crate::selector::ImageSelector;

/// What a cycle would do to a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Upgrade {
        state: DeviceState,
        candidate: UpgradeCandidate,
    },
    Skip {
        state: Option<DeviceState>,
        reason: SkipReason,
    },
}

impl Plan {
    pub fn state(&self) -> Option<&DeviceState> {
        match self {
            Self::Upgrade { state, .. } => Some(state),
            Self::Skip { state, .. } => state.as_ref(),
        }
    }
}

pub struct UpgradeService {
    catalog: Box<dyn ImageCatalog>,
    inspector: DeviceInspector,
    selector: ImageSelector,
    config: Config,
}

impl UpgradeService {
    pub fn new(catalog: Box<dyn ImageCatalog>, config: Config) -> Self {
        Self {
            catalog,
            inspector: DeviceInspector::new(&config),
            selector: ImageSelector::new(config.image_extension.clone()),
            config,
        }
    }

    pub async fn inspect<S: CommandChannel + ?Sized>(
        &self,
        session: &mut S,
        identity: &DeviceIdentity,
    ) -> Result<DeviceState, InspectionError> {
        self.inspector.inspect(session, identity).await
    }

    /// Inspects the device and decides on a candidate without changing anything.
    pub async fn plan<S: CommandChannel + ?Sized>(
        &self,
        session: &mut S,
        identity: &DeviceIdentity,
    ) -> Result<Plan, SessionError> {
        let state = match self.inspect(session, identity).await {
            Ok(state) => state,
            Err(InspectionError::Session(e)) => return Err(e),
            Err(InspectionError::Parse(e)) => {
                warn!(device = %identity.name, "Skipping device, {e}");
                return Ok(Plan::Skip {
                    state: None,
                    reason: SkipReason::UnknownVersion(e.to_string()),
                });
            }
        };

        let Some(hardware) = state.hardware_model.tag().map(str::to_string) else {
            return Ok(Plan::Skip {
                state: Some(state),
                reason: SkipReason::UnknownHardware,
            });
        };

        info!(
            device = %identity.name,
            "Checking for newer images in {}",
            self.config.repository_root.join(&hardware).display()
        );
        let images = match self.catalog.list_images(&hardware).await {
            Ok(images) => images,
            Err(e) => {
                return Ok(Plan::Skip {
                    state: Some(state),
                    reason: SkipReason::CatalogUnavailable(format!("{e:#}")),
                });
            }
        };

        match self.selector.select(&images, &state.current_version) {
            Some(candidate) => {
                info!(
                    device = %identity.name,
                    image = %candidate.file_name,
                    version = %candidate.version,
                    "Newer image found"
                );
                Ok(Plan::Upgrade { state, candidate })
            }
            None => {
                let current = state.current_version;
                info!(device = %identity.name, "No newer image found");
                Ok(Plan::Skip {
                    state: Some(state),
                    reason: SkipReason::NoNewerImage { current },
                })
            }
        }
    }

    /// Runs one full cycle against a device.
    ///
    /// A cycle that has to be repeated must call this again: the device is inspected
    /// anew so the space check sees the current free space.
    pub async fn run_cycle<S: DeviceSession + ?Sized>(
        &self,
        session: &mut S,
        identity: &DeviceIdentity,
        cancel: CancellationToken,
    ) -> Result<UpgradeOutcome, SessionError> {
        let span = info_span!("upgrade", device = %identity.name);
        self.cycle(session, identity, cancel).instrument(span).await
    }

    async fn cycle<S: DeviceSession + ?Sized>(
        &self,
        session: &mut S,
        identity: &DeviceIdentity,
        cancel: CancellationToken,
    ) -> Result<UpgradeOutcome, SessionError> {
        let (state, candidate) = match self.plan(session, identity).await? {
            Plan::Upgrade { state, candidate } => (state, candidate),
            Plan::Skip { reason, .. } => return Ok(UpgradeOutcome::Skipped(reason)),
        };

        if self.config.dry_run {
            return Ok(UpgradeOutcome::Skipped(SkipReason::DryRun {
                candidate: candidate.file_name,
            }));
        }

        let outcome = UpgradeOrchestrator::new(
            session,
            candidate,
            &state.inventory,
            OrchestratorSettings::from(&self.config),
        )
        .with_cancellation(cancel)
        .run()
        .await;

        info!(device = %identity.name, "{outcome}");
        Ok(outcome)
    }
}
