//! # Error Taxonomy
//!
//! * [`SessionError`]: the remote command session failed. `Connection` is fatal for the
//!   whole device cycle.
//! * [`ParseError`]: device output could not be read. Local to one field or one pass.
//! * [`TransferError`]: the image copy did not complete.
//! * [`InspectionError`]: building a device snapshot failed.
//!
//! Expected outcomes such as insufficient space or a failed verification are not errors.
//! They are reported through [`crate::upgrade::UpgradeOutcome`].

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot reach {address}: {reason}")]
    Connection { address: String, reason: String },

    #[error("`{command}` failed: {reason}")]
    Command { command: String, reason: String },

    #[error("`{command}` timed out after {}s", .after.as_secs())]
    Timeout { command: String, after: Duration },

    #[error("device rejected `{command}`: {output}")]
    Rejected { command: String, output: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SessionError {
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no software version line found")]
    MissingVersionLine,

    #[error("malformed version `{0}`")]
    InvalidVersion(String),

    #[error("invalid {field} `{token}`")]
    InvalidField { field: &'static str, token: String },

    #[error("no `{0}` line in listing")]
    MissingField(&'static str),

    #[error("free space {free} exceeds total capacity {total}")]
    CapacityMismatch { free: u64, total: u64 },
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("cannot read local image {path}: {source}")]
    LocalImage {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("transfer did not finish within {}s", .0.as_secs())]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum InspectionError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("cannot determine running firmware: {0}")]
    Parse(#[from] ParseError),
}

impl InspectionError {
    /// True when the device itself could not be reached, as opposed to unreadable output.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Session(_))
    }
}
