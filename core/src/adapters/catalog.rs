use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use flashr_common::catalog::ImageCatalog;
use flashr_common::firmware::image::LocalImage;
use tracing::debug;

/// Image repository laid out as `<root>/<hardware model>/<image files>`.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ImageCatalog for DirectoryCatalog {
    async fn list_images(&self, hardware_model: &str) -> anyhow::Result<Vec<LocalImage>> {
        let dir = self.root.join(hardware_model);
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .with_context(|| format!("cannot read image directory {}", dir.display()))?;

        let mut images: Vec<LocalImage> = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("cannot list {}", dir.display()))?
        {
            let metadata = entry
                .metadata()
                .await
                .with_context(|| format!("cannot stat {}", entry.path().display()))?;
            if !metadata.is_file() {
                continue;
            }
            images.push(LocalImage::new(entry.path(), metadata.len()));
        }

        images.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        debug!(dir = %dir.display(), images = images.len(), "Image directory listed");
        Ok(images)
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
