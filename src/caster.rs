//! Grid-DDA ray traversal.
//!
//! A ray is walked from its origin across the uniform grid one cell boundary at
//! a time. At every step both the next vertical grid line (x boundary) and the
//! next horizontal grid line (y boundary) are computed and the nearer one is
//! taken, so the steps come out strictly near to far.

use std::fmt;

use crate::cache::{BoundedCache, DEFAULT_LIMIT};
use crate::error::CasterError;
use crate::grid::Occupancy;

/// Position in world space, in map cells.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Which family of grid lines a step crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// A vertical line `x = n`.
    X,
    /// A horizontal line `y = n`.
    Y,
}

/// Candidate boundary crossing, before the map is consulted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub x: f64,
    pub y: f64,
    pub length2: f64,
}

impl Crossing {
    /// Returned when the ray runs parallel to the grid lines being searched.
    pub const UNREACHABLE: Self = Self {
        x: 0.0,
        y: 0.0,
        length2: f64::INFINITY,
    };
}

/// One grid-boundary crossing along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub x: f64,
    pub y: f64,
    /// Cell entered by this crossing.
    pub mapx: i64,
    pub mapy: i64,
    /// 1 when the entered cell is a wall.
    pub height: u8,
    /// Distance from the ray origin.
    pub distance: f64,
    /// Light bucket: 0 for x crossings heading east, 2 for west or north
    /// facing hits, 1 for y crossings heading south.
    pub shading: u8,
    /// Position along the wall face in `[0, 1)`, used as texture column.
    pub offset: f64,
    pub length2: f64,
}

impl Step {
    pub fn origin(point: Point) -> Self {
        Self {
            x: point.x,
            y: point.y,
            mapx: point.x.floor() as i64,
            mapy: point.y.floor() as i64,
            height: 0,
            distance: 0.0,
            shading: 0,
            offset: 0.0,
            length2: 0.0,
        }
    }

    #[inline]
    pub fn is_wall(&self) -> bool {
        self.height > 0
    }
}

/// Ordered steps of one cast, origin first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ray {
    pub steps: Vec<Step>,
    /// Angle relative to the view direction. Set by the camera.
    pub angle: f64,
}

impl Ray {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps, angle: 0.0 }
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn origin(&self) -> Option<&Step> {
        self.steps.first()
    }

    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// Index of the first wall step, scanning from the origin.
    pub fn hit(&self) -> Option<usize> {
        self.steps.iter().position(Step::is_wall)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }
}

impl std::ops::Index<usize> for Ray {
    type Output = Step;

    fn index(&self, index: usize) -> &Step {
        &self.steps[index]
    }
}

/// Exact-bits cache key for one cast.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RayKey([u64; 4]);

impl RayKey {
    pub fn new(origin: Point, angle: f64, range: f64) -> Self {
        Self([
            origin.x.to_bits(),
            origin.y.to_bits(),
            angle.to_bits(),
            range.to_bits(),
        ])
    }
}

impl fmt::Debug for RayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, angle, range] = self.0.map(f64::from_bits);
        write!(f, "{x};{y};{angle};{range}")
    }
}

/// Next crossing of the grid lines perpendicular to the run axis.
///
/// `run` is the direction component along the searched axis and `rise` the
/// other one. With `inverted` the roles of x and y are swapped, which is how
/// the y-boundary search reuses the same arithmetic.
pub fn step(rise: f64, run: f64, x: f64, y: f64, inverted: bool) -> Crossing {
    if run == 0.0 {
        return Crossing::UNREACHABLE;
    }

    let boundary = if run > 0.0 {
        (x + 1.0).floor()
    } else {
        (x - 1.0).ceil()
    };
    let dx = boundary - x;
    let dy = dx * (rise / run);
    let length2 = dx * dx + dy * dy;

    // the crossed coordinate is pinned to the exact grid line so the cell
    // lookup below never floors 2.9999 down to the wrong side
    if inverted {
        Crossing {
            x: y + dy,
            y: boundary,
            length2,
        }
    } else {
        Crossing {
            x: boundary,
            y: y + dy,
            length2,
        }
    }
}

/// Longest range `cast` accepts, in cells.
pub const MAX_RANGE: f64 = 10_000.0;

/// Upper bound on steps for a cast of `range`.
///
/// A segment of length `r` crosses at most `r·|cos| + 1` vertical and
/// `r·|sin| + 1` horizontal lines, and `|cos| + |sin| <= √2 < 2`.
#[inline]
pub fn max_steps(range: f64) -> usize {
    (range.ceil() as usize).saturating_add(2).saturating_mul(2)
}

fn require_finite(name: &'static str, value: f64) -> Result<(), CasterError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CasterError::InvalidArgument { name, value })
    }
}

pub struct RayCasterBuilder<M> {
    map: Option<M>,
    memoize: bool,
    cache_limit: usize,
}

impl<M: Occupancy> RayCasterBuilder<M> {
    pub fn map(mut self, map: M) -> Self {
        self.map = Some(map);
        self
    }

    /// Route `RayCaster::get` through the per-ray cache.
    pub fn memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    pub fn cache_limit(mut self, limit: usize) -> Self {
        self.cache_limit = limit;
        self
    }

    pub fn build(self) -> Result<RayCaster<M>, CasterError> {
        let map = self.map.ok_or(CasterError::MissingMap)?;
        Ok(RayCaster {
            map,
            memoize: self.memoize,
            cache: BoundedCache::strict(self.cache_limit),
        })
    }
}

pub struct RayCaster<M> {
    map: M,
    memoize: bool,
    cache: BoundedCache<RayKey, Ray>,
}

impl<M: Occupancy> RayCaster<M> {
    pub fn builder() -> RayCasterBuilder<M> {
        RayCasterBuilder {
            map: None,
            memoize: false,
            cache_limit: DEFAULT_LIMIT,
        }
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    #[inline]
    pub fn is_memoized(&self) -> bool {
        self.memoize
    }

    pub fn set_memoize(&mut self, memoize: bool) {
        self.memoize = memoize;
    }

    /// Resolves a crossing against the map.
    ///
    /// The entered cell is the one on the far side of the crossed line, which
    /// for a ray heading in the negative direction is one less than the
    /// boundary coordinate.
    pub fn inspect(&self, sin: f64, cos: f64, crossing: Crossing, axis: Axis, distance: f64) -> Step {
        let dx = if axis == Axis::X && cos < 0.0 { 1.0 } else { 0.0 };
        let dy = if axis == Axis::Y && sin < 0.0 { 1.0 } else { 0.0 };
        let mapx = crossing.x - dx;
        let mapy = crossing.y - dy;
        let occupied = self.map.cell(mapx, mapy).is_some_and(|value| value > 0);

        let (shading, along) = match axis {
            Axis::X => (if cos < 0.0 { 2 } else { 0 }, crossing.y),
            Axis::Y => (if sin < 0.0 { 2 } else { 1 }, crossing.x),
        };
        // a tiny negative fraction rounds up to exactly 1.0
        let offset = along - along.floor();
        let offset = if offset < 1.0 { offset } else { 0.0 };

        Step {
            x: crossing.x,
            y: crossing.y,
            mapx: mapx.floor() as i64,
            mapy: mapy.floor() as i64,
            height: u8::from(occupied),
            distance: distance + crossing.length2.sqrt(),
            shading,
            offset,
            length2: crossing.length2,
        }
    }

    /// Walks the ray from `origin` towards `angle` until it enters a wall or
    /// passes `range`. The step that passes `range` is kept as the last one.
    ///
    /// `range` must lie in `[0, MAX_RANGE]`.
    pub fn cast(&self, origin: Point, angle: f64, range: f64) -> Result<Ray, CasterError> {
        require_finite("origin.x", origin.x)?;
        require_finite("origin.y", origin.y)?;
        require_finite("angle", angle)?;
        require_finite("range", range)?;
        if !(0.0..=MAX_RANGE).contains(&range) {
            return Err(CasterError::InvalidArgument {
                name: "range",
                value: range,
            });
        }

        let (sin, cos) = angle.sin_cos();
        let limit = max_steps(range);
        let mut steps = Vec::with_capacity(limit.min(64));
        let mut current = Step::origin(origin);
        steps.push(current);

        for _ in 0..limit {
            let along_x = step(sin, cos, current.x, current.y, false);
            let along_y = step(cos, sin, current.y, current.x, true);
            let next = if along_x.length2 < along_y.length2 {
                self.inspect(sin, cos, along_x, Axis::X, current.distance)
            } else {
                self.inspect(sin, cos, along_y, Axis::Y, current.distance)
            };

            steps.push(next);
            if next.is_wall() || next.distance > range {
                break;
            }
            current = next;
        }

        Ok(Ray::new(steps))
    }

    /// `cast` behind the per-ray cache, when memoization is on.
    pub fn get(&mut self, origin: Point, angle: f64, range: f64) -> Result<Ray, CasterError> {
        if !self.memoize {
            return self.cast(origin, angle, range);
        }

        let key = RayKey::new(origin, angle, range);
        if let Some(ray) = self.cache.get(&key) {
            return Ok(ray.clone());
        }
        let ray = self.cast(origin, angle, range)?;
        self.cache.add(key, ray.clone())?;
        Ok(ray)
    }

    pub fn cache_size(&self) -> Result<usize, CasterError> {
        Ok(self.cache.size()?)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Drops the caster and its cache, handing the map back untouched.
    pub fn into_map(self) -> M {
        self.map
    }
}
