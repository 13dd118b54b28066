//! # Image Selection
//!
//! Picks the image to install from the local repository listing of one hardware model.
//! Selection is based on the structured [`FirmwareVersion`] order, never on file name
//! string comparison.

use flashr_common::firmware::image::{LocalImage, UpgradeCandidate};
use flashr_common::firmware::version::FirmwareVersion;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ImageSelector {
    extension: String,
}

impl ImageSelector {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// Returns the newest image strictly newer than `current`, if any.
    ///
    /// Only files ending in the image extension with a version in their name are
    /// considered. When several files carry the same newest version, the
    /// lexicographically last file name is chosen so the result does not depend on
    /// listing order.
    pub fn select(
        &self,
        images: &[LocalImage],
        current: &FirmwareVersion,
    ) -> Option<UpgradeCandidate> {
        let versioned: Vec<(FirmwareVersion, &LocalImage)> = images
            .iter()
            .filter(|image| image.file_name.ends_with(&self.extension))
            .filter_map(|image| match FirmwareVersion::from_file_name(&image.file_name) {
                Some(version) => Some((version, image)),
                None => {
                    debug!(file = %image.file_name, "No version in image name, ignoring");
                    None
                }
            })
            .collect();

        let (best_version, best_image) = versioned
            .iter()
            .max_by(|(va, a), (vb, b)| va.cmp(vb).then_with(|| a.file_name.cmp(&b.file_name)))
            .copied()?;

        let tied: Vec<&str> = versioned
            .iter()
            .filter(|(version, _)| *version == best_version)
            .map(|(_, image)| image.file_name.as_str())
            .collect();
        if tied.len() > 1 {
            warn!(
                version = %best_version,
                candidates = ?tied,
                chosen = %best_image.file_name,
                "Several images carry the same version"
            );
        }

        if best_version <= *current {
            debug!(newest = %best_version, current = %current, "No newer image available");
            return None;
        }

        Some(UpgradeCandidate::from_image(best_image, best_version))
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn image(name: &str, size: u64) -> LocalImage {
        LocalImage::new(PathBuf::from("IOS_IMAGES/ISR4331").join(name), size)
    }

    fn v(s: &str) -> FirmwareVersion {
        s.parse().unwrap()
    }

    fn selector() -> ImageSelector {
        ImageSelector::new(".bin")
    }

    #[test]
    fn picks_newest_image_above_current() {
        let images = vec![
            image("16.6.1.bin", 300),
            image("16.9.3a.bin", 400),
            image("16.9.3.bin", 390),
        ];
        let candidate = selector().select(&images, &v("16.6.1")).unwrap();
        assert_eq!(candidate.file_name, "16.9.3a.bin");
        assert_eq!(candidate.file_size_bytes, 400);
        assert_eq!(candidate.version, v("16.9.3a"));
        assert_eq!(candidate.image_path, PathBuf::from("IOS_IMAGES/ISR4331/16.9.3a.bin"));
    }

    #[test]
    fn never_proposes_the_running_version() {
        let images = vec![image("16.9.3a.bin", 400)];
        assert_eq!(selector().select(&images, &v("16.9.3a")), None);
    }

    #[test]
    fn older_images_are_not_candidates() {
        let images = vec![image("16.6.1.bin", 300), image("16.9.3.bin", 390)];
        assert_eq!(selector().select(&images, &v("16.9.3a")), None);
    }

    #[test]
    fn numeric_order_beats_string_order() {
        let images = vec![image("16.9.9.bin", 1), image("16.9.10.bin", 1)];
        let candidate = selector().select(&images, &v("16.9.1")).unwrap();
        assert_eq!(candidate.file_name, "16.9.10.bin");
    }

    #[test]
    fn equal_versions_break_ties_by_last_file_name() {
        let names = ["image-16.9.3.bin", "cat-16.09.03.bin", "x-16.9.3.bin", "16.9.3.bin.bak"];
        let forward: Vec<LocalImage> = names.iter().map(|n| image(n, 10)).collect();
        let backward: Vec<LocalImage> = forward.iter().rev().cloned().collect();

        for _ in 0..3 {
            let a = selector().select(&forward, &v("16.6.1")).unwrap();
            let b = selector().select(&backward, &v("16.6.1")).unwrap();
            assert_eq!(a.file_name, "x-16.9.3.bin");
            assert_eq!(a, b);
        }
    }

    #[test]
    fn files_without_extension_or_version_are_ignored() {
        let images = vec![
            image("17.1.1.tar", 1),
            image("readme.bin", 1),
            image("packages.conf", 1),
        ];
        assert_eq!(selector().select(&images, &v("1.0.0")), None);
        assert_eq!(selector().select(&[], &v("1.0.0")), None);
    }
}
