use std::path::{Path, PathBuf};
use std::sync::Arc;

use retouch_core::surface::Surface;
use thiserror::Error;
use tracing::info;

/// Why a session could not start.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image has no pixels")]
    EmptyImage,
}

/// Decoded source raster. Never mutated after load; clones share pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceImage {
    pixels: Arc<Surface>,
}

impl SourceImage {
    pub fn from_surface(surface: Surface) -> Result<Self, LoadError> {
        if surface.is_empty() {
            return Err(LoadError::EmptyImage);
        }
        Ok(Self {
            pixels: Arc::new(surface),
        })
    }

    /// Decode an encoded image (format sniffed from its bytes).
    pub fn decode(bytes: &[u8]) -> Result<Self, LoadError> {
        let image = image::load_from_memory(bytes)?;
        Self::from_surface(Surface::from_rgba_image(image.to_rgba8()))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width
    }

    pub fn height(&self) -> u32 {
        self.pixels.height
    }

    pub fn surface(&self) -> &Surface {
        &self.pixels
    }
}

/// Read and decode `path` off the async runtime's worker threads.
pub async fn load_decoded_image(path: impl AsRef<Path>) -> Result<SourceImage, LoadError> {
    let path = path.as_ref().to_path_buf();
    let bytes = tokio::fs::read(&path).await.map_err(|source| LoadError::Io {
        path: path.clone(),
        source,
    })?;

    let image = tokio::task::spawn_blocking(move || SourceImage::decode(&bytes))
        .await
        .map_err(|e| LoadError::Io {
            path: path.clone(),
            source: std::io::Error::other(e),
        })??;

    info!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "source image loaded"
    );
    Ok(image)
}
