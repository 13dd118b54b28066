#![cfg(test)]
use std::time::Duration;

use flashr_common::config::Config;
use flashr_common::device::identity::DeviceIdentity;
use flashr_common::upgrade::{FailureKind, UpgradeOutcome, UpgradeStage};
use flashr_core::upgrade::UpgradeService;
use tokio_util::sync::CancellationToken;

use crate::support::{MB, MockDevice, StaticCatalog, TransferBehavior};

const HARDWARE: &str = "ISR4331";

fn service() -> UpgradeService {
    let catalog = StaticCatalog::default().with(HARDWARE, &[("16.9.3a.bin", 400 * MB)]);
    UpgradeService::new(Box::new(catalog), Config::default())
}

fn identity() -> DeviceIdentity {
    "edge-r1@10.20.0.9".parse().unwrap()
}

#[tokio::test]
async fn cancelling_during_transfer_stops_the_cycle() {
    let mut device = MockDevice::new("16.6.1", HARDWARE).with_transfer(TransferBehavior::Hang);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let outcome = service()
        .run_cycle(&mut device, &identity(), cancel)
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        UpgradeOutcome::Failed {
            stage: UpgradeStage::Transferring,
            kind: FailureKind::Cancelled,
            ..
        }
    ));
    assert_eq!(device.transfers.len(), 1);
    assert!(!device.boot_touched());
    assert_eq!(device.startup_boot, vec!["bootflash:16.6.1.bin"]);
}

#[tokio::test]
async fn cancelled_token_prevents_any_change() {
    let mut device = MockDevice::new("16.6.1", HARDWARE);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = service()
        .run_cycle(&mut device, &identity(), cancel)
        .await
        .unwrap();

    assert_eq!(outcome.failure_kind(), Some(FailureKind::Cancelled));
    assert!(device.transfers.is_empty());
    assert!(!device.boot_touched());
}
