use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::render::{Rect, Surface};
use crate::texture::Texture;

#[inline]
pub const fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // 0RGB, which softbuffer reads as BGRA8 in little-endian memory
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
}

#[inline]
fn lerp_color_u32(a: u32, b: u32, w256: u32) -> u32 {
    // w256 in [0, 256]; R and B ride together under 0x00FF00FF, G alone
    let inv = 256 - w256;
    let rb = (((a & 0x00FF00FF) * inv + (b & 0x00FF00FF) * w256) >> 8) & 0x00FF00FF;
    let g = (((a & 0x0000FF00) * inv + (b & 0x0000FF00) * w256) >> 8) & 0x0000FF00;
    rb | g
}

/// Software render target the column renderer draws into.
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    /// Reallocates only when the size actually changes.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.pixels = vec![0; width * height];
        }
    }

    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// Fills the top half with `upper` and the rest with `lower`.
    pub fn clear_split(&mut self, upper: u32, lower: u32) {
        let mid = (self.height / 2) * self.width;
        self.pixels[..mid].fill(upper);
        self.pixels[mid..].fill(lower);
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Pixel span covered by `rect`, clipped to the buffer.
    fn clip(&self, rect: Rect) -> Option<(usize, usize, usize, usize)> {
        let (right, bottom) = (rect.x + rect.w, rect.y + rect.h);
        if [rect.x, rect.y, right, bottom].iter().any(|v| v.is_nan()) {
            return None;
        }
        let x0 = rect.x.round().max(0.0);
        let y0 = rect.y.round().max(0.0);
        let x1 = right.round().min(self.width as f64);
        let y1 = bottom.round().min(self.height as f64);
        if !(x1 > x0 && y1 > y0) {
            return None;
        }
        Some((x0 as usize, x1 as usize, y0 as usize, y1 as usize))
    }

    /// Nearest-neighbour stretch into a window-sized buffer, rows in parallel.
    pub fn present_scaled(&self, dst: &mut [u32], dst_w: usize, dst_h: usize) {
        if dst_w == 0 || dst_h == 0 || self.width == 0 || self.height == 0 {
            return;
        }
        let columns: Vec<usize> = (0..dst_w)
            .map(|x| (x * self.width / dst_w).min(self.width - 1))
            .collect();
        let (src, src_w, src_h) = (&self.pixels, self.width, self.height);

        dst.par_chunks_mut(dst_w)
            .take(dst_h)
            .enumerate()
            .for_each(|(y, row)| {
                let sy = (y * src_h / dst_h).min(src_h - 1);
                let src_row = &src[sy * src_w..(sy + 1) * src_w];
                for (out, &sx) in row.iter_mut().zip(&columns) {
                    *out = src_row[sx];
                }
            });
    }
}

impl Surface for FrameBuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn fill_rect(&mut self, dst: Rect, color: u32, alpha: f64) {
        if !(alpha > 0.0) {
            return;
        }
        let Some((x0, x1, y0, y1)) = self.clip(dst) else {
            return;
        };
        let w256 = (alpha.min(1.0) * 256.0).round() as u32;
        for y in y0..y1 {
            let row = &mut self.pixels[y * self.width + x0..y * self.width + x1];
            if w256 >= 256 {
                row.fill(color);
            } else {
                for px in row {
                    *px = lerp_color_u32(*px, color, w256);
                }
            }
        }
    }

    fn blit(&mut self, texture: &Texture, src: Rect, dst: Rect) {
        if !texture.is_loaded() || dst.w <= 0.0 || dst.h <= 0.0 {
            return;
        }
        let Some((x0, x1, y0, y1)) = self.clip(dst) else {
            return;
        };
        let su = src.w / dst.w;
        let sv = src.h / dst.h;
        for y in y0..y1 {
            let v = src.y + (y as f64 + 0.5 - dst.y) * sv;
            if v < 0.0 {
                continue;
            }
            for x in x0..x1 {
                let u = src.x + (x as f64 + 0.5 - dst.x) * su;
                if u < 0.0 {
                    continue;
                }
                if let Some(texel) = texture.pixel(u as usize, v as usize) {
                    self.pixels[y * self.width + x] = texel;
                }
            }
        }
    }
}
