//! # Upgrade Outcomes
//!
//! Every device cycle ends in exactly one [`UpgradeOutcome`]:
//! * `Skipped`: nothing was attempted on the device.
//! * `Failed`: an attempt stopped at a [`UpgradeStage`] for a [`FailureKind`].
//! * `Succeeded`: the device boots the new image on next restart.

use std::fmt;

use crate::firmware::version::FirmwareVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradeStage {
    SpaceCheck,
    Transferring,
    Verifying,
    Activating,
}

impl UpgradeStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpaceCheck => "space_check",
            Self::Transferring => "transferring",
            Self::Verifying => "verifying",
            Self::Activating => "activating",
        }
    }
}

impl fmt::Display for UpgradeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The image does not fit with headroom. Nothing was transferred.
    InsufficientSpace,
    /// Copy failed or timed out. A partial file may remain on the device.
    TransferError,
    /// The copied image did not verify. The file is left for inspection.
    VerificationFailed,
    /// The save preceding the boot change failed. Boot configuration is untouched.
    ConfigSaveError,
    /// The boot reference change failed or was not persisted. Boot state is ambiguous.
    ActivationError,
    /// The operator stopped the attempt before the boot reference was touched.
    Cancelled,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientSpace => "insufficient_space",
            Self::TransferError => "transfer_error",
            Self::VerificationFailed => "verification_failed",
            Self::ConfigSaveError => "config_save_error",
            Self::ActivationError => "activation_error",
            Self::Cancelled => "cancelled",
        }
    }

    /// Only an activation error requires manual recovery of the boot reference.
    pub fn is_severe(&self) -> bool {
        matches!(self, Self::ActivationError)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The running version could not be read from the device.
    UnknownVersion(String),
    UnknownHardware,
    CatalogUnavailable(String),
    NoNewerImage { current: FirmwareVersion },
    /// A candidate exists but the cycle was configured not to touch the device.
    DryRun { candidate: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownVersion(detail) => write!(f, "running version unknown ({detail})"),
            Self::UnknownHardware => write!(f, "hardware model not recognized"),
            Self::CatalogUnavailable(detail) => write!(f, "image catalog unavailable ({detail})"),
            Self::NoNewerImage { current } => write!(f, "no image newer than {current}"),
            Self::DryRun { candidate } => write!(f, "dry run, would install {candidate}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    Skipped(SkipReason),
    Failed {
        stage: UpgradeStage,
        kind: FailureKind,
        detail: String,
    },
    Succeeded {
        activated_image: String,
    },
}

impl UpgradeOutcome {
    pub fn failed(stage: UpgradeStage, kind: FailureKind, detail: impl Into<String>) -> Self {
        Self::Failed {
            stage,
            kind,
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn is_severe(&self) -> bool {
        matches!(self, Self::Failed { kind, .. } if kind.is_severe())
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for UpgradeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
            Self::Failed {
                stage,
                kind,
                detail,
            } => write!(f, "failed during {stage} ({kind}): {detail}"),
            Self::Succeeded { activated_image } => write!(f, "activated {activated_image}"),
        }
    }
}
