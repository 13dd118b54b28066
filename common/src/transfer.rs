use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransferError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub source_path: PathBuf,
    pub dest_name: String,
    /// Destination file system including the trailing colon, e.g. `bootflash:`.
    pub file_system: String,
    pub timeout: Duration,
}

impl TransferRequest {
    /// Fully qualified destination, e.g. `bootflash:16.9.3a.bin`.
    pub fn destination(&self) -> String {
        format!("{}{}", self.file_system, self.dest_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReport {
    /// The destination file matches the source.
    pub verified: bool,
    /// False when a matching file was already present and nothing was copied.
    pub copied: bool,
}

/// Copies an image onto device storage.
///
/// A transfer is atomic-or-failed from the caller's point of view: either a report is
/// returned or an error is. Partial progress is never exposed.
#[async_trait]
pub trait TransferService: Send {
    async fn transfer(&mut self, request: &TransferRequest) -> Result<TransferReport, TransferError>;
}
