use std::future::Future;
use std::path::{Path, PathBuf};

use image::RgbaImage;

use super::TextureError;

/// Directory textures are read from unless configured otherwise.
pub const DEFAULT_TEXTURE_ROOT: &str = "data";

/// Where encoded texture bytes come from.
///
/// Reads run as tasks on the vault's fetch runtime; decoding happens
/// afterwards on its blocking pool.
pub trait ImageSource: Send + Sync + 'static {
    fn read(&self, name: &str) -> impl Future<Output = Result<Vec<u8>, TextureError>> + Send;
}

/// Reads `root/name` from disk.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a filename resolves to. No normalization is applied.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Default for DirectorySource {
    fn default() -> Self {
        Self::new(DEFAULT_TEXTURE_ROOT)
    }
}

impl ImageSource for DirectorySource {
    async fn read(&self, name: &str) -> Result<Vec<u8>, TextureError> {
        let path = self.path_for(name);
        tokio::fs::read(&path)
            .await
            .map_err(|source| TextureError::Io { path, source })
    }
}

/// Decodes PNG/JPEG/BMP/GIF bytes to RGBA8. CPU-bound.
pub(crate) fn decode(name: &str, bytes: &[u8]) -> Result<RgbaImage, TextureError> {
    let image = image::load_from_memory(bytes).map_err(|source| TextureError::Decode {
        name: name.to_string(),
        source,
    })?;
    Ok(image.to_rgba8())
}
