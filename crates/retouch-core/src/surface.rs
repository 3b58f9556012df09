use anyhow::{Context, Result};
use image::RgbaImage;
use tiny_skia::{ColorU8, Pixmap};

/// 8-bit RGBA raster shared by every pipeline stage.
///
/// Pixels are stored interleaved RGBARGBA... with straight (non-premultiplied)
/// alpha, row-major from the top-left corner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    /// Flat pixel data: [R, G, B, A, R, G, B, A, ...].
    pub data: Vec<u8>,
}

impl Surface {
    /// Fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; byte_len(width, height)],
        }
    }

    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(byte_len(width, height));
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn from_data(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = byte_len(width, height);
        anyhow::ensure!(
            data.len() == expected,
            "expected {expected} bytes for {width}x{height} RGBA, got {}",
            data.len()
        );
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }

    pub fn to_rgba_image(&self) -> Result<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .context("surface buffer does not match its dimensions")
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Pixel at `(x, y)`, or transparent black outside the surface.
    pub fn pixel(&self, x: i64, y: i64) -> [u8; 4] {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return [0; 4];
        }
        let i = self.offset(x as u32, y as u32);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.offset(x, y);
        self.data[i..i + 4].copy_from_slice(&rgba);
    }

    /// Copy a `width`x`height` window whose top-left corner sits at `(x, y)`.
    ///
    /// The window may hang over the edges; uncovered pixels are transparent.
    pub fn sub_region(&self, x: i64, y: i64, width: u32, height: u32) -> Self {
        let mut out = Self::new(width, height);
        for row in 0..height {
            let src_y = y + row as i64;
            if src_y < 0 || src_y >= self.height as i64 {
                continue;
            }
            let col_start = x.max(0);
            let col_end = (x + width as i64).min(self.width as i64);
            if col_start >= col_end {
                continue;
            }
            let src = self.offset(col_start as u32, src_y as u32);
            let len = (col_end - col_start) as usize * 4;
            let dst = out.offset((col_start - x) as u32, row);
            out.data[dst..dst + len].copy_from_slice(&self.data[src..src + len]);
        }
        out
    }

    /// Overwrite the pixels under `src` placed with its top-left at `(x, y)`.
    /// Parts falling outside `self` are skipped.
    pub fn copy_from(&mut self, src: &Surface, x: i64, y: i64) {
        let col_start = x.max(0);
        let col_end = (x + src.width as i64).min(self.width as i64);
        if col_start >= col_end {
            return;
        }
        let len = (col_end - col_start) as usize * 4;
        for row in 0..src.height {
            let dst_y = y + row as i64;
            if dst_y < 0 || dst_y >= self.height as i64 {
                continue;
            }
            let from = src.offset((col_start - x) as u32, row);
            let to = self.offset(col_start as u32, dst_y as u32);
            self.data[to..to + len].copy_from_slice(&src.data[from..from + len]);
        }
    }

    /// Convert into a premultiplied tiny-skia pixmap for vector drawing.
    pub fn to_pixmap(&self) -> Result<Pixmap> {
        let mut pixmap = Pixmap::new(self.width, self.height)
            .with_context(|| format!("cannot allocate {}x{} pixmap", self.width, self.height))?;
        for (dst, src) in pixmap
            .pixels_mut()
            .iter_mut()
            .zip(self.data.chunks_exact(4))
        {
            *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }
        Ok(pixmap)
    }

    pub fn from_pixmap(pixmap: &Pixmap) -> Self {
        let mut data = Vec::with_capacity(byte_len(pixmap.width(), pixmap.height()));
        for pixel in pixmap.pixels() {
            let c = pixel.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Self {
            width: pixmap.width(),
            height: pixmap.height(),
            data,
        }
    }
}

fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}
