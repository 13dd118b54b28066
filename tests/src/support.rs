use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::anyhow;
use async_trait::async_trait;
use flashr_common::catalog::ImageCatalog;
use flashr_common::error::{SessionError, TransferError};
use flashr_common::firmware::image::LocalImage;
use flashr_common::session::CommandChannel;
use flashr_common::transfer::{TransferReport, TransferRequest, TransferService};

pub const MB: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferBehavior {
    /// Copies the file and reports it verified.
    Copy,
    /// Copies the file but it does not verify.
    Corrupt,
    /// Fails with a session error.
    Fail,
    /// Never completes.
    Hang,
}

/// Scripted device keeping just enough state to observe what a cycle did to it.
pub struct MockDevice {
    pub address: String,
    pub show_version: String,
    pub total_bytes: u64,
    pub free_bytes: u64,
    pub files: Vec<(String, u64)>,
    pub transfer_behavior: TransferBehavior,
    /// Bytes a transfer adds to storage.
    pub image_size: u64,
    pub reachable: bool,
    pub reject_config: bool,
    /// 1-based index of the save call that fails.
    pub fail_save: Option<usize>,

    pub running_boot: Vec<String>,
    pub startup_boot: Vec<String>,
    pub saves: usize,
    pub transfers: Vec<TransferRequest>,
    pub config_sets: Vec<Vec<String>>,
}

impl MockDevice {
    pub fn new(version: &str, hardware: &str) -> Self {
        let boot = vec![format!("bootflash:{version}.bin")];
        Self {
            address: "10.20.0.1".to_string(),
            show_version: show_version(version, hardware),
            total_bytes: 1_600 * MB,
            free_bytes: 500 * MB,
            files: vec![(format!("{version}.bin"), 300 * MB)],
            transfer_behavior: TransferBehavior::Copy,
            image_size: 400 * MB,
            reachable: true,
            reject_config: false,
            fail_save: None,
            running_boot: boot.clone(),
            startup_boot: boot,
            saves: 0,
            transfers: Vec::new(),
            config_sets: Vec::new(),
        }
    }

    pub fn with_free(mut self, free_bytes: u64) -> Self {
        self.free_bytes = free_bytes;
        self
    }

    pub fn with_transfer(mut self, behavior: TransferBehavior) -> Self {
        self.transfer_behavior = behavior;
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    /// The boot configuration changed in any way, persisted or not.
    pub fn boot_touched(&self) -> bool {
        !self.config_sets.is_empty()
    }

    fn listing(&self) -> String {
        let mut out = String::from("Directory of bootflash:/\n\n");
        for (idx, (name, size)) in self.files.iter().enumerate() {
            out.push_str(&format!(
                "{:>6}  -rw-  {size:>12}  Mar 7 2019 10:06:37 +00:00  {name}\n",
                idx + 11
            ));
        }
        out.push_str(&format!(
            "\n{} bytes total ({} bytes free)\n",
            self.total_bytes, self.free_bytes
        ));
        out
    }

    fn check_reachable(&self) -> Result<(), SessionError> {
        if self.reachable {
            return Ok(());
        }
        Err(SessionError::Connection {
            address: self.address.clone(),
            reason: "Connection timed out".to_string(),
        })
    }
}

pub fn show_version(version: &str, hardware: &str) -> String {
    format!(
        "Cisco IOS XE Software, Version {version}\n\
         Cisco IOS Software [Fuji], Catalyst L3 Switch Software, Version {version}, RELEASE SOFTWARE (fc2)\n\
         ROM: IOS-XE ROMMON\n\
         \n\
         cisco {hardware} (MIPS) processor (revision K0) with 865815K/6147K bytes of memory.\n\
         Processor board ID FOC1234X0YZ\n"
    )
}

#[async_trait]
impl CommandChannel for MockDevice {
    async fn send_command(&mut self, command: &str) -> Result<String, SessionError> {
        self.check_reachable()?;
        match command {
            "show version" => Ok(self.show_version.clone()),
            "dir bootflash:" => Ok(self.listing()),
            other => Err(SessionError::Command {
                command: other.to_string(),
                reason: "% Invalid input detected at '^' marker.".to_string(),
            }),
        }
    }

    async fn send_config_set(&mut self, lines: &[String]) -> Result<String, SessionError> {
        self.check_reachable()?;
        self.config_sets.push(lines.to_vec());
        if self.reject_config {
            return Ok("boot system flash bootflash:x.bin\n% Invalid input detected at '^' marker.\n".to_string());
        }

        for line in lines {
            if line == "no boot system" {
                self.running_boot.clear();
            } else if let Some(image) = line.strip_prefix("boot system flash ") {
                self.running_boot.push(image.to_string());
            }
        }
        Ok(String::new())
    }

    async fn save_config(&mut self) -> Result<(), SessionError> {
        self.check_reachable()?;
        self.saves += 1;
        if self.fail_save == Some(self.saves) {
            return Err(SessionError::Rejected {
                command: "write memory".to_string(),
                output: "% Error writing nvram".to_string(),
            });
        }
        self.startup_boot = self.running_boot.clone();
        Ok(())
    }
}

#[async_trait]
impl TransferService for MockDevice {
    async fn transfer(&mut self, request: &TransferRequest) -> Result<TransferReport, TransferError> {
        self.check_reachable()?;
        self.transfers.push(request.clone());

        let size = self.image_size;

        match self.transfer_behavior {
            TransferBehavior::Copy | TransferBehavior::Corrupt => {
                self.files.push((request.dest_name.clone(), size));
                self.free_bytes = self.free_bytes.saturating_sub(size);
                Ok(TransferReport {
                    verified: self.transfer_behavior == TransferBehavior::Copy,
                    copied: true,
                })
            }
            TransferBehavior::Fail => Err(SessionError::Command {
                command: "scp".to_string(),
                reason: "lost connection".to_string(),
            }
            .into()),
            TransferBehavior::Hang => std::future::pending().await,
        }
    }
}

/// In-memory image repository keyed by hardware model.
#[derive(Default)]
pub struct StaticCatalog {
    images: HashMap<String, Vec<LocalImage>>,
}

impl StaticCatalog {
    pub fn with(mut self, hardware: &str, images: &[(&str, u64)]) -> Self {
        let entries = images
            .iter()
            .map(|(name, size)| {
                LocalImage::new(PathBuf::from("IOS_IMAGES").join(hardware).join(name), *size)
            })
            .collect();
        self.images.insert(hardware.to_string(), entries);
        self
    }
}

#[async_trait]
impl ImageCatalog for StaticCatalog {
    async fn list_images(&self, hardware_model: &str) -> anyhow::Result<Vec<LocalImage>> {
        self.images
            .get(hardware_model)
            .cloned()
            .ok_or_else(|| anyhow!("no image directory for {hardware_model}"))
    }
}
