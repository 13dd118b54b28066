use colored::*;
use flashr_common::device::state::DeviceState;
use flashr_common::firmware::image::UpgradeCandidate;
use flashr_common::upgrade::{SkipReason, UpgradeOutcome};

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

pub fn bytes(value: u64) -> String {
    const MIB: f64 = 1024.0 * 1024.0;
    format!("{:.1} MiB ({value} bytes)", value as f64 / MIB)
}

pub fn state_details(state: &DeviceState) -> Vec<Detail> {
    let inventory = &state.inventory;
    let mut details: Vec<Detail> = vec![
        ("Address".to_string(), state.identity.address.normal()),
        (
            "Version".to_string(),
            state.current_version.to_string().color(colors::VERSION),
        ),
        ("Hardware".to_string(), hardware_value(state)),
        ("Free".to_string(), bytes(inventory.free_space_bytes()).normal()),
        ("Total".to_string(), bytes(inventory.total_capacity_bytes()).normal()),
    ];

    for file in inventory.files() {
        details.push((
            "Image".to_string(),
            format!("{} {}", file.name.color(colors::IMAGE), file.timestamp.dimmed()).normal(),
        ));
    }

    details
}

fn hardware_value(state: &DeviceState) -> ColoredString {
    if state.hardware_model.is_known() {
        state.hardware_model.to_string().color(colors::HARDWARE)
    } else {
        "not recognized".yellow()
    }
}

pub fn candidate_detail(candidate: &UpgradeCandidate) -> Detail {
    (
        "Candidate".to_string(),
        format!(
            "{} {} {}",
            candidate.file_name.color(colors::IMAGE),
            candidate.version.to_string().color(colors::VERSION),
            bytes(candidate.file_size_bytes).dimmed()
        )
        .normal(),
    )
}

pub fn outcome_detail(outcome: &UpgradeOutcome) -> Detail {
    let value = match outcome {
        UpgradeOutcome::Succeeded { .. } => outcome.to_string().green().bold(),
        UpgradeOutcome::Skipped(_) => outcome.to_string().yellow(),
        UpgradeOutcome::Failed { .. } if outcome.is_severe() => outcome.to_string().red().bold(),
        UpgradeOutcome::Failed { .. } => outcome.to_string().red(),
    };
    ("Outcome".to_string(), value)
}

pub fn skip_detail(reason: &SkipReason) -> Detail {
    ("Skipped".to_string(), reason.to_string().yellow())
}
