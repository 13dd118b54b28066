//! # Command Session Port
//!
//! The remote command session to one device. Implementations deliver commands
//! synchronously and in order; the session is not safe for concurrent submission,
//! which is why every method takes `&mut self`.

use async_trait::async_trait;

use crate::error::SessionError;
use crate::transfer::TransferService;

#[async_trait]
pub trait CommandChannel: Send {
    /// Runs a non-mutating command and returns its raw output.
    async fn send_command(&mut self, command: &str) -> Result<String, SessionError>;

    /// Applies configuration lines and returns the raw output of the configuration session.
    async fn send_config_set(&mut self, lines: &[String]) -> Result<String, SessionError>;

    /// Persists the running configuration. Safe to repeat.
    async fn save_config(&mut self) -> Result<(), SessionError>;
}

/// Everything the upgrade engine needs from one device connection.
pub trait DeviceSession: CommandChannel + TransferService {}

impl<T: CommandChannel + TransferService> DeviceSession for T {}
