//! # Device Output Parsers
//!
//! Both parsers work on plain text and never touch the session, so they can be
//! exercised against captured output.
//!
//! * [`version::VersionParser`]: `show version` output.
//! * [`inventory::InventoryParser`]: `dir <file system>` output.

pub mod inventory;
pub mod version;

/// Prefix the device puts in front of an error in command output.
pub const ERROR_MARKER: char = '%';

/// True if any line of `output` is a device error, e.g. `% Invalid input detected`.
pub fn has_error_marker(output: &str) -> bool {
    output
        .lines()
        .any(|line| line.trim_start().starts_with(ERROR_MARKER))
}
