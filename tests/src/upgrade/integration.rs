#![cfg(test)]
use std::time::Duration;

use flashr_common::config::Config;
use flashr_common::device::identity::DeviceIdentity;
use flashr_common::upgrade::{FailureKind, SkipReason, UpgradeOutcome, UpgradeStage};
use flashr_core::upgrade::{Plan, UpgradeService};
use tokio_util::sync::CancellationToken;

use crate::support::{MB, MockDevice, StaticCatalog, TransferBehavior};

const HARDWARE: &str = "WS-C3850-24XS-S";

fn identity() -> DeviceIdentity {
    "core-sw1@10.20.0.1".parse().unwrap()
}

fn catalog() -> StaticCatalog {
    StaticCatalog::default().with(HARDWARE, &[("16.6.1.bin", 300 * MB), ("16.9.3a.bin", 400 * MB)])
}

fn service(config: Config) -> UpgradeService {
    UpgradeService::new(Box::new(catalog()), config)
}

async fn cycle(device: &mut MockDevice, config: Config) -> UpgradeOutcome {
    service(config)
        .run_cycle(device, &identity(), CancellationToken::new())
        .await
        .expect("device is reachable")
}

#[tokio::test]
async fn upgrades_to_newest_image() {
    let mut device = MockDevice::new("16.6.1", HARDWARE);

    let outcome = cycle(&mut device, Config::default()).await;

    assert_eq!(
        outcome,
        UpgradeOutcome::Succeeded {
            activated_image: "16.9.3a.bin".to_string()
        }
    );
    assert_eq!(device.transfers.len(), 1);
    assert_eq!(device.transfers[0].destination(), "bootflash:16.9.3a.bin");
    assert_eq!(device.startup_boot, vec!["bootflash:16.9.3a.bin"]);
    assert_eq!(device.saves, 2);
    assert_eq!(
        device.config_sets,
        vec![vec![
            "no boot system".to_string(),
            "boot system flash bootflash:16.9.3a.bin".to_string()
        ]]
    );
}

#[tokio::test]
async fn insufficient_space_leaves_device_untouched() {
    let mut device = MockDevice::new("16.6.1", HARDWARE).with_free(350 * MB);

    let outcome = cycle(&mut device, Config::default()).await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::InsufficientSpace));
    assert!(matches!(
        outcome,
        UpgradeOutcome::Failed {
            stage: UpgradeStage::SpaceCheck,
            ..
        }
    ));
    assert!(device.transfers.is_empty());
    assert!(!device.boot_touched());
    assert_eq!(device.saves, 0);
}

#[tokio::test]
async fn free_space_equal_to_image_size_is_not_enough() {
    let mut device = MockDevice::new("16.6.1", HARDWARE).with_free(400 * MB);

    let outcome = cycle(&mut device, Config::default()).await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::InsufficientSpace));
    assert!(device.transfers.is_empty());
}

#[tokio::test]
async fn failed_transfer_keeps_boot_configuration() {
    let mut device = MockDevice::new("16.6.1", HARDWARE).with_transfer(TransferBehavior::Fail);

    let outcome = cycle(&mut device, Config::default()).await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::TransferError));
    assert!(!device.boot_touched());
    assert_eq!(device.startup_boot, vec!["bootflash:16.6.1.bin"]);
}

#[tokio::test]
async fn unverified_image_is_never_activated() {
    let mut device = MockDevice::new("16.6.1", HARDWARE).with_transfer(TransferBehavior::Corrupt);

    let outcome = cycle(&mut device, Config::default()).await;

    assert!(matches!(
        outcome,
        UpgradeOutcome::Failed {
            stage: UpgradeStage::Verifying,
            kind: FailureKind::VerificationFailed,
            ..
        }
    ));
    assert!(!device.boot_touched());
    assert_eq!(device.saves, 0);
}

#[tokio::test]
async fn hanging_transfer_times_out() {
    let mut device = MockDevice::new("16.6.1", HARDWARE).with_transfer(TransferBehavior::Hang);
    let config = Config {
        transfer_timeout: Duration::from_millis(50),
        ..Config::default()
    };

    let outcome = cycle(&mut device, config).await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::TransferError));
    assert!(!device.boot_touched());
}

#[tokio::test]
async fn rejected_boot_change_is_severe() {
    let mut device = MockDevice::new("16.6.1", HARDWARE);
    device.reject_config = true;

    let outcome = cycle(&mut device, Config::default()).await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::ActivationError));
    assert!(outcome.is_severe());
    assert_eq!(device.saves, 1);
}

#[tokio::test]
async fn failed_first_save_stops_before_boot_change() {
    let mut device = MockDevice::new("16.6.1", HARDWARE);
    device.fail_save = Some(1);

    let outcome = cycle(&mut device, Config::default()).await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::ConfigSaveError));
    assert!(!outcome.is_severe());
    assert!(!device.boot_touched());
}

#[tokio::test]
async fn unsaved_boot_change_is_severe() {
    let mut device = MockDevice::new("16.6.1", HARDWARE);
    device.fail_save = Some(2);

    let outcome = cycle(&mut device, Config::default()).await;

    assert!(outcome.is_severe());
    assert_eq!(device.running_boot, vec!["bootflash:16.9.3a.bin"]);
    assert_eq!(device.startup_boot, vec!["bootflash:16.6.1.bin"]);
}

#[tokio::test]
async fn running_newest_version_is_skipped() {
    let mut device = MockDevice::new("16.9.3a", HARDWARE);

    let outcome = cycle(&mut device, Config::default()).await;

    assert_eq!(
        outcome,
        UpgradeOutcome::Skipped(SkipReason::NoNewerImage {
            current: "16.9.3a".parse().unwrap()
        })
    );
    assert!(device.transfers.is_empty());
}

#[tokio::test]
async fn unknown_hardware_is_skipped() {
    let mut device = MockDevice::new("16.6.1", "C9300-48P");

    let outcome = cycle(&mut device, Config::default()).await;

    assert_eq!(outcome, UpgradeOutcome::Skipped(SkipReason::UnknownHardware));
    assert!(device.transfers.is_empty());
}

#[tokio::test]
async fn extra_hardware_tags_make_a_device_eligible() {
    let mut device = MockDevice::new("16.6.1", "C9300-48P");
    let config = Config {
        extra_hardware_models: vec!["C9300-48P".to_string()],
        ..Config::default()
    };
    let catalog = StaticCatalog::default().with("C9300-48P", &[("17.3.4.bin", 450 * MB)]);
    let service = UpgradeService::new(Box::new(catalog), config);

    let outcome = service
        .run_cycle(&mut device, &identity(), CancellationToken::new())
        .await
        .unwrap();

    assert!(outcome.is_success(), "{outcome}");
    assert_eq!(device.startup_boot, vec!["bootflash:17.3.4.bin"]);
}

#[tokio::test]
async fn missing_catalog_directory_is_skipped() {
    let mut device = MockDevice::new("16.6.1", "ISR4331");

    let outcome = cycle(&mut device, Config::default()).await;

    assert!(matches!(
        outcome,
        UpgradeOutcome::Skipped(SkipReason::CatalogUnavailable(_))
    ));
}

#[tokio::test]
async fn unreadable_version_is_skipped() {
    let mut device = MockDevice::new("16.6.1", HARDWARE);
    device.show_version = "Cisco Nexus Operating System (NX-OS) Software\n".to_string();

    let outcome = cycle(&mut device, Config::default()).await;

    assert!(matches!(
        outcome,
        UpgradeOutcome::Skipped(SkipReason::UnknownVersion(_))
    ));
}

#[tokio::test]
async fn dry_run_selects_without_touching_the_device() {
    let mut device = MockDevice::new("16.6.1", HARDWARE);
    let config = Config {
        dry_run: true,
        ..Config::default()
    };

    let outcome = cycle(&mut device, config).await;

    assert_eq!(
        outcome,
        UpgradeOutcome::Skipped(SkipReason::DryRun {
            candidate: "16.9.3a.bin".to_string()
        })
    );
    assert!(device.transfers.is_empty());
    assert_eq!(device.saves, 0);
}

#[tokio::test]
async fn unreachable_device_is_an_error() {
    let mut device = MockDevice::new("16.6.1", HARDWARE).unreachable();

    let err = service(Config::default())
        .run_cycle(&mut device, &identity(), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_connection());
}

#[tokio::test]
async fn plan_reports_state_and_candidate() {
    let mut device = MockDevice::new("16.6.1", HARDWARE);

    let plan = service(Config::default())
        .plan(&mut device, &identity())
        .await
        .unwrap();

    let Plan::Upgrade { state, candidate } = plan else {
        panic!("expected an upgrade plan");
    };
    assert_eq!(state.current_version, "16.6.1".parse().unwrap());
    assert_eq!(state.inventory.free_space_bytes(), 500 * MB);
    assert_eq!(candidate.file_name, "16.9.3a.bin");
    assert!(device.transfers.is_empty());
    assert!(!device.boot_touched());
}

#[tokio::test]
async fn repeated_cycle_sees_current_free_space() {
    let mut device = MockDevice::new("16.6.1", HARDWARE);

    let first = cycle(&mut device, Config::default()).await;
    assert!(first.is_success());

    // The device has not reloaded, so it still runs 16.6.1 but has less room.
    let second = cycle(&mut device, Config::default()).await;
    assert_eq!(second.failure_kind(), Some(FailureKind::InsufficientSpace));
    assert_eq!(device.transfers.len(), 1);
}

#[tokio::test]
async fn vendor_file_names_are_ordered_by_version() {
    let mut device = MockDevice::new("16.6.1", HARDWARE);
    let catalog = StaticCatalog::default().with(
        HARDWARE,
        &[
            ("cat3k_caa-universalk9.16.09.03a.SPA.bin", 450 * MB),
            ("cat3k_caa-universalk9.16.10.01.SPA.bin", 460 * MB),
            ("cat3k_caa-universalk9.16.06.01.SPA.bin", 420 * MB),
        ],
    );
    device.image_size = 460 * MB;
    device.free_bytes = 900 * MB;

    let outcome = UpgradeService::new(Box::new(catalog), Config::default())
        .run_cycle(&mut device, &identity(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        UpgradeOutcome::Succeeded {
            activated_image: "cat3k_caa-universalk9.16.10.01.SPA.bin".to_string()
        }
    );
}
