use async_trait::async_trait;

use crate::firmware::image::LocalImage;

/// Read-only view of the local image repository.
#[async_trait]
pub trait ImageCatalog: Send + Sync {
    /// Lists every file stored for `hardware_model`, in no particular order.
    async fn list_images(&self, hardware_model: &str) -> anyhow::Result<Vec<LocalImage>>;
}
