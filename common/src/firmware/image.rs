use std::path::PathBuf;

use crate::firmware::version::FirmwareVersion;

/// An image file found in the local repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalImage {
    pub file_name: String,
    pub size_bytes: u64,
    pub path: PathBuf,
}

impl LocalImage {
    pub fn new(path: PathBuf, size_bytes: u64) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            file_name,
            size_bytes,
            path,
        }
    }
}

/// The image chosen to replace the running firmware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeCandidate {
    pub image_path: PathBuf,
    pub file_name: String,
    pub file_size_bytes: u64,
    pub version: FirmwareVersion,
}

impl UpgradeCandidate {
    pub fn from_image(image: &LocalImage, version: FirmwareVersion) -> Self {
        Self {
            image_path: image.path.clone(),
            file_name: image.file_name.clone(),
            file_size_bytes: image.size_bytes,
            version,
        }
    }
}
