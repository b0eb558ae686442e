use crate::error::TextureError;
use crate::framebuffer::pack_rgb;

/// Pixel source for wall and ground slices.
///
/// A texture that is still waiting for its pixels reports `is_loaded() ==
/// false` and is skipped by the column renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
    loaded: bool,
}

impl Texture {
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u32>) -> Result<Self, TextureError> {
        let expected = width * height;
        if pixels.len() != expected || expected == 0 {
            return Err(TextureError::PixelCount {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            loaded: true,
        })
    }

    /// Placeholder with known dimensions and no pixels yet.
    pub fn pending(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: Vec::new(),
            loaded: false,
        }
    }

    /// Running-bond brick pattern with dark mortar lines.
    pub fn brick(size: usize, brick: u32, mortar: u32) -> Self {
        let size = size.max(4);
        let course = size / 4;
        let mut pixels = vec![0; size * size];
        for y in 0..size {
            let row = y / course;
            let shift = if row % 2 == 0 { 0 } else { size / 4 };
            for x in 0..size {
                let joint = (x + shift) % (size / 2) == 0;
                pixels[y * size + x] = if y % course == 0 || joint { mortar } else { brick };
            }
        }
        Self {
            width: size,
            height: size,
            pixels,
            loaded: true,
        }
    }

    pub fn checker(size: usize, tiles: usize, a: u32, b: u32) -> Self {
        let size = size.max(1);
        let tile = (size / tiles.max(1)).max(1);
        let pixels = (0..size * size)
            .map(|i| {
                let (x, y) = (i % size, i / size);
                if (x / tile + y / tile) % 2 == 0 { a } else { b }
            })
            .collect();
        Self {
            width: size,
            height: size,
            pixels,
            loaded: true,
        }
    }

    /// Grey gravel-ish noise, deterministic per pixel.
    pub fn gravel(size: usize) -> Self {
        let size = size.max(1);
        let pixels = (0..size * size)
            .map(|i| {
                let mut h = (i as u32).wrapping_mul(0x9E37_79B9);
                h ^= h >> 15;
                let v = 50 + (h % 40) as u8;
                pack_rgb(v, v, v.saturating_sub(6))
            })
            .collect();
        Self {
            width: size,
            height: size,
            pixels,
            loaded: true,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if !self.loaded || x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// Texture column for a wall offset in `[0, 1)`.
    #[inline]
    pub fn column_for(&self, offset: f64) -> usize {
        let x = (self.width as f64 * offset).floor() as usize;
        x.min(self.width.saturating_sub(1))
    }
}
