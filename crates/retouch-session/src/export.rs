use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat};
use retouch_core::surface::Surface;
use tracing::info;

/// Encode a rendered surface. Formats without alpha get the RGB channels.
pub fn encode(surface: &Surface, format: ImageFormat) -> Result<Vec<u8>> {
    let rgba = DynamicImage::ImageRgba8(surface.to_rgba_image()?);
    let image = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(rgba.to_rgb8()),
        _ => rgba,
    };
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, format)
        .with_context(|| format!("cannot encode {format:?}"))?;
    Ok(out.into_inner())
}

/// Write `surface` to `path`, picking the format from the extension.
pub fn save(surface: &Surface, path: &Path) -> Result<()> {
    let format = ImageFormat::from_path(path)
        .with_context(|| format!("unknown image format for {}", path.display()))?;
    let bytes = encode(surface, format)?;
    std::fs::write(path, &bytes).with_context(|| format!("cannot write {}", path.display()))?;
    info!(
        path = %path.display(),
        width = surface.width,
        height = surface.height,
        bytes = bytes.len(),
        "image exported"
    );
    Ok(())
}
