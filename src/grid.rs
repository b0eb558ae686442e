use std::sync::Arc;

use rand::Rng;

use crate::error::MapError;

pub const DEFAULT_WIDTH: usize = 32;
pub const DEFAULT_HEIGHT: usize = 32;

/// Read access to a tile grid addressed by world-space coordinates.
///
/// Coordinates are floored to the containing cell. Anything outside the grid
/// reads as `None`, which callers treat as open space.
pub trait Occupancy {
    fn cell(&self, x: f64, y: f64) -> Option<u8>;
}

impl<T: Occupancy + ?Sized> Occupancy for &T {
    #[inline]
    fn cell(&self, x: f64, y: f64) -> Option<u8> {
        (**self).cell(x, y)
    }
}

impl<T: Occupancy + ?Sized> Occupancy for Arc<T> {
    #[inline]
    fn cell(&self, x: f64, y: f64) -> Option<u8> {
        (**self).cell(x, y)
    }
}

/// Fixed-size occupancy grid, row-major. 0 is open, anything else is a wall
/// whose value selects the wall texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMap {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GridMap {
    pub fn new(width: usize, height: usize) -> Result<Self, MapError> {
        if width == 0 || height == 0 {
            return Err(MapError::ZeroSized { width, height });
        }
        Ok(Self {
            width,
            height,
            data: vec![0; width * height],
        })
    }

    pub fn from_data(width: usize, height: usize, data: &[u8]) -> Result<Self, MapError> {
        let mut map = Self::new(width, height)?;
        map.load(data)?;
        Ok(map)
    }

    /// Map with walls (value 1) on every border cell and an open interior.
    pub fn with_border(width: usize, height: usize) -> Result<Self, MapError> {
        let mut map = Self::new(width, height)?;
        map.fill_border(1);
        Ok(map)
    }

    /// Sets every cell on the outer ring to `value`.
    pub fn fill_border(&mut self, value: u8) {
        let (w, h) = (self.width, self.height);
        for x in 0..w {
            self.data[x] = value;
            self.data[(h - 1) * w + x] = value;
        }
        for y in 0..h {
            self.data[y * w] = value;
            self.data[y * w + w - 1] = value;
        }
    }

    /// Replaces every cell. The slice must cover the whole grid.
    pub fn load(&mut self, data: &[u8]) -> Result<(), MapError> {
        if data.len() != self.data.len() {
            return Err(MapError::DataLength {
                expected: self.data.len(),
                actual: data.len(),
            });
        }
        self.data.copy_from_slice(data);
        Ok(())
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
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn cells(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn index(&self, x: f64, y: f64) -> Option<usize> {
        let (x, y) = (x.floor(), y.floor());
        // NaN fails both comparisons and lands here too
        if !(x >= 0.0 && x < self.width as f64 && y >= 0.0 && y < self.height as f64) {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    pub fn get(&self, x: f64, y: f64) -> Option<u8> {
        self.index(x, y).map(|i| self.data[i])
    }

    pub fn set(&mut self, x: f64, y: f64, value: u8) -> Option<u8> {
        let i = self.index(x, y)?;
        self.data[i] = value;
        Some(value)
    }

    /// Fills every cell with a wall at probability `density`, open otherwise.
    pub fn randomize<R: Rng + ?Sized>(&mut self, density: f64, rng: &mut R) {
        let density = if density.is_nan() {
            0.0
        } else {
            density.clamp(0.0, 1.0)
        };
        for cell in &mut self.data {
            *cell = u8::from(rng.gen_bool(density));
        }
    }
}

impl Default for GridMap {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            data: vec![0; DEFAULT_WIDTH * DEFAULT_HEIGHT],
        }
    }
}

impl Occupancy for GridMap {
    #[inline]
    fn cell(&self, x: f64, y: f64) -> Option<u8> {
        self.get(x, y)
    }
}
