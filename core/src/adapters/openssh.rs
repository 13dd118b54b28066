//! # OpenSSH Session
//!
//! A [`DeviceSession`](flashr_common::session::DeviceSession) backed by the system `ssh`
//! and `scp` binaries. Every command runs in its own non-interactive connection with
//! `BatchMode` enabled, so a missing key fails fast instead of prompting.
//!
//! Child processes are spawned with `kill_on_drop`: dropping a pending call, for example
//! when a transfer is cancelled, terminates the process.

use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use flashr_common::config::Config;
use flashr_common::device::identity::DeviceIdentity;
use flashr_common::error::{SessionError, TransferError};
use flashr_common::session::CommandChannel;
use flashr_common::transfer::{TransferReport, TransferRequest, TransferService};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::parser;
use crate::parser::inventory::InventoryParser;

/// Exit status OpenSSH reserves for its own failures.
const SSH_FAILURE: i32 = 255;
const REACHABILITY_COMMAND: &str = "show clock";
const SAVE_COMMAND: &str = "write memory";

#[derive(Debug, Clone)]
pub struct SshOptions {
    pub user: Option<String>,
    pub port: u16,
    pub identity_file: Option<PathBuf>,
    pub keepalive: Duration,
    pub connect_timeout: Duration,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            user: None,
            port: 22,
            identity_file: None,
            keepalive: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl SshOptions {
    /// Options shared by `ssh` and `scp`, minus the port flag which differs between them.
    fn common_args(&self) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ServerAliveInterval={}", self.keepalive.as_secs()),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout.as_secs()),
        ];
        if let Some(identity) = &self.identity_file {
            args.push("-i".to_string());
            args.push(identity.display().to_string());
        }
        args
    }

    fn ssh_args(&self) -> Vec<String> {
        let mut args = self.common_args();
        args.extend(["-p".to_string(), self.port.to_string()]);
        args
    }

    fn scp_args(&self) -> Vec<String> {
        let mut args = self.common_args();
        args.extend(["-P".to_string(), self.port.to_string()]);
        args
    }

    fn destination(&self, address: &str) -> String {
        match &self.user {
            Some(user) => format!("{user}@{address}"),
            None => address.to_string(),
        }
    }
}

pub struct OpenSshSession {
    identity: DeviceIdentity,
    options: SshOptions,
    command_timeout: Duration,
    dir_command: String,
    inventory_parser: InventoryParser,
}

impl OpenSshSession {
    /// Opens a session and checks that the device answers.
    pub async fn connect(
        identity: DeviceIdentity,
        options: SshOptions,
        config: &Config,
    ) -> Result<Self, SessionError> {
        let mut session = Self {
            identity,
            options,
            command_timeout: config.command_timeout,
            dir_command: config.dir_command(),
            inventory_parser: InventoryParser::new(config.image_extension.clone()),
        };

        info!(device = %session.identity, "Connecting");
        if let Err(e) = session.send_command(REACHABILITY_COMMAND).await {
            return Err(unreachable_device(&session.identity.address, e));
        }

        Ok(session)
    }

    async fn run_ssh(&self, command: &str, stdin: Option<String>) -> Result<String, SessionError> {
        let mut cmd = Command::new("ssh");
        cmd.args(self.options.ssh_args());
        if stdin.is_some() {
            cmd.arg("-T");
        }
        cmd.arg(self.options.destination(&self.identity.address));
        if stdin.is_none() {
            cmd.arg(command);
        }

        debug!(device = %self.identity.name, command, "Running remote command");
        let output = self.run_with_timeout(cmd, command, stdin, self.command_timeout).await?;
        self.check_status(command, output)
    }

    async fn run_with_timeout(
        &self,
        mut cmd: Command,
        label: &str,
        stdin: Option<String>,
        limit: Duration,
    ) -> Result<Output, SessionError> {
        cmd.stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn()?;
        if let (Some(script), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(script.as_bytes()).await?;
        }

        match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(output) => Ok(output?),
            Err(_) => Err(SessionError::Timeout {
                command: label.to_string(),
                after: limit,
            }),
        }
    }

    fn check_status(&self, command: &str, output: Output) -> Result<String, SessionError> {
        exit_result(
            &self.identity.address,
            command,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        )
    }

    /// Size of `name` on the device storage, or `None` when it is not listed.
    async fn remote_size(&mut self, name: &str) -> Result<Option<u64>, SessionError> {
        let command = self.dir_command.clone();
        let listing = self.send_command(&command).await;
        if let Err(SessionError::Command { reason, .. }) = &listing {
            debug!(device = %self.identity.name, %reason, "Listing unavailable");
        }
        listed_size(&self.inventory_parser, listing, name)
    }
}

/// Maps the exit code of an `ssh` or `scp` run to the command result.
fn exit_result(
    address: &str,
    command: &str,
    code: Option<i32>,
    stdout: String,
    stderr: String,
) -> Result<String, SessionError> {
    match code {
        Some(0) => Ok(stdout),
        Some(SSH_FAILURE) => Err(SessionError::Connection {
            address: address.to_string(),
            reason: stderr,
        }),
        code => Err(SessionError::Command {
            command: command.to_string(),
            reason: match code {
                Some(code) => format!("exit status {code}: {stderr}"),
                None => format!("terminated by signal: {stderr}"),
            },
        }),
    }
}

/// Any failure of the reachability check makes the device unreachable.
fn unreachable_device(address: &str, error: SessionError) -> SessionError {
    match error {
        SessionError::Connection { .. } => error,
        other => SessionError::Connection {
            address: address.to_string(),
            reason: other.to_string(),
        },
    }
}

/// Size of `name` in a storage listing. A listing the device refuses to produce
/// counts as "not listed"; a broken connection is still an error.
fn listed_size(
    parser: &InventoryParser,
    listing: Result<String, SessionError>,
    name: &str,
) -> Result<Option<u64>, SessionError> {
    let listing = match listing {
        Ok(listing) => listing,
        Err(SessionError::Command { .. }) => return Ok(None),
        Err(e) => return Err(e),
    };
    let scan = parser.parse(&listing);
    Ok(scan.inventory.find(name).map(|entry| entry.size_bytes))
}

/// A file of the same size already on the device is taken as the image itself.
fn already_present(remote: Option<u64>, local: u64) -> Option<TransferReport> {
    (remote == Some(local)).then_some(TransferReport {
        verified: true,
        copied: false,
    })
}

fn copied_report(remote: Option<u64>, local: u64) -> TransferReport {
    TransferReport {
        verified: remote == Some(local),
        copied: true,
    }
}

fn config_script(lines: &[String]) -> String {
    let mut script = String::from("configure terminal\n");
    for line in lines {
        script.push_str(line);
        script.push('\n');
    }
    script.push_str("end\nexit\n");
    script
}

#[async_trait]
impl CommandChannel for OpenSshSession {
    async fn send_command(&mut self, command: &str) -> Result<String, SessionError> {
        self.run_ssh(command, None).await
    }

    async fn send_config_set(&mut self, lines: &[String]) -> Result<String, SessionError> {
        self.run_ssh("configure terminal", Some(config_script(lines))).await
    }

    async fn save_config(&mut self) -> Result<(), SessionError> {
        let output = self.run_ssh(SAVE_COMMAND, None).await?;
        if parser::has_error_marker(&output) {
            return Err(SessionError::Rejected {
                command: SAVE_COMMAND.to_string(),
                output: output.trim().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TransferService for OpenSshSession {
    async fn transfer(&mut self, request: &TransferRequest) -> Result<TransferReport, TransferError> {
        let local_size = tokio::fs::metadata(&request.source_path)
            .await
            .map_err(|source| TransferError::LocalImage {
                path: request.source_path.display().to_string(),
                source,
            })?
            .len();

        let existing = self.remote_size(&request.dest_name).await?;
        if let Some(report) = already_present(existing, local_size) {
            info!(
                device = %self.identity.name,
                destination = %request.destination(),
                "Same-size image already on device"
            );
            return Ok(report);
        }

        let target = format!(
            "{}:{}",
            self.options.destination(&self.identity.address),
            request.destination()
        );
        let mut cmd = Command::new("scp");
        cmd.args(self.options.scp_args())
            .arg(&request.source_path)
            .arg(&target);

        info!(device = %self.identity.name, bytes = local_size, "Copying {}", request.source_path.display());
        let output = match self.run_with_timeout(cmd, "scp", None, request.timeout).await {
            Ok(output) => output,
            Err(SessionError::Timeout { after, .. }) => return Err(TransferError::Timeout(after)),
            Err(e) => return Err(e.into()),
        };
        self.check_status("scp", output)?;

        let remote = self.remote_size(&request.dest_name).await?;
        let report = copied_report(remote, local_size);
        if !report.verified {
            warn!(
                device = %self.identity.name,
                expected = local_size,
                found = ?remote,
                "Size mismatch after copy"
            );
        }

        Ok(report)
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
