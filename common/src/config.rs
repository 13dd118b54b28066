use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_FILE_SYSTEM: &str = "bootflash:";
pub const DEFAULT_IMAGE_EXTENSION: &str = ".bin";
pub const DEFAULT_REPOSITORY: &str = "IOS_IMAGES";

#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the local image repository.
    ///
    /// Images for a device are looked up in `<repository_root>/<hardware model>/`.
    pub repository_root: PathBuf,
    /// Device file system that receives the image, including the trailing colon.
    pub file_system: String,
    /// Extension every firmware image carries, both locally and on the device.
    pub image_extension: String,
    /// Upper bound for the transfer stage.
    pub transfer_timeout: Duration,
    /// Upper bound for a single non-transfer command.
    pub command_timeout: Duration,
    /// Hardware tags recognized on top of the built-in list.
    pub extra_hardware_models: Vec<String>,
    /// Stops every cycle after candidate selection.
    pub dry_run: bool,
    pub quiet: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repository_root: PathBuf::from(DEFAULT_REPOSITORY),
            file_system: DEFAULT_FILE_SYSTEM.to_string(),
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
            transfer_timeout: Duration::from_secs(30 * 60),
            command_timeout: Duration::from_secs(60),
            extra_hardware_models: Vec::new(),
            dry_run: false,
            quiet: 0,
        }
    }
}

impl Config {
    /// The listing command for the configured file system, e.g. `dir bootflash:`.
    pub fn dir_command(&self) -> String {
        format!("dir {}", self.file_system)
    }
}
