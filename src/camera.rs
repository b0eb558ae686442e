use std::sync::Arc;

use rand::Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::cache::{BoundedCache, DEFAULT_LIMIT};
use crate::caster::{Ray, RayCaster};
use crate::error::CasterError;
use crate::grid::Occupancy;
use crate::player::Pose;
use crate::render::{Column, Scene, Surface, draw_column};

/// Smallest view-plane depth fed into the projection. Keeps the origin step
/// (distance 0) and rays grazing the view plane finite.
pub const NEAR: f64 = 1e-3;

pub const DEFAULT_RESOLUTION: usize = 320;
pub const DEFAULT_FOCAL_LENGTH: f64 = 0.8;
pub const DEFAULT_RANGE: f64 = 14.0;

/// Focal length that spreads the columns over `fov_degrees` horizontally.
pub fn focal_length_for_fov(fov_degrees: f64) -> f64 {
    // column offsets span [-0.5, 0.5] on the view plane
    0.5 / (0.5 * fov_degrees.to_radians()).tan()
}

/// Vertical screen extents of one slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub top: f64,
    pub bottom: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    viewport_height: f64,
}

impl Projector {
    pub fn new(viewport_height: f64) -> Self {
        Self { viewport_height }
    }

    #[inline]
    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    #[inline]
    pub fn screen_center_y(&self) -> f64 {
        0.5 * self.viewport_height
    }

    /// Projects a slice `wall_height` cells tall seen `distance` away along a
    /// ray `angle_h` off the view direction, with vertical look `angle_v`.
    #[inline]
    pub fn project(&self, wall_height: f64, angle_h: f64, angle_v: f64, distance: f64) -> Projection {
        // depth along the view direction, not along the ray: no fisheye
        let z = (distance * angle_h.cos()).max(NEAR);
        let height = self.viewport_height * wall_height / z;
        let bottom = self.screen_center_y() * ((1.0 - angle_v) + 1.0 / z);
        Projection {
            top: bottom - height,
            bottom,
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    /// Rays per frame, one per screen column.
    pub resolution: usize,
    pub focal_length: f64,
    /// Maximum ray length in cells.
    pub range: f64,
    /// Keep whole frames of rays keyed by pose.
    pub frame_memo: bool,
    /// Cast through `RayCaster::get` so the caster's own cache is consulted.
    pub ray_memo: bool,
    /// Cast columns on the rayon pool. Ignored while `ray_memo` is set.
    pub parallel: bool,
    pub cache_limit: usize,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            focal_length: DEFAULT_FOCAL_LENGTH,
            range: DEFAULT_RANGE,
            frame_memo: true,
            ray_memo: false,
            parallel: true,
            cache_limit: DEFAULT_LIMIT,
        }
    }
}

/// Exact-bits identity of a pose. Any movement or turn changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MovementKey([u64; 3]);

impl From<Pose> for MovementKey {
    fn from(pose: Pose) -> Self {
        Self([pose.x.to_bits(), pose.y.to_bits(), pose.direction.to_bits()])
    }
}

pub struct Camera {
    width: usize,
    height: usize,
    spacing: f64,
    config: CameraConfig,
    projector: Projector,
    key: Option<MovementKey>,
    frames: BoundedCache<MovementKey, Arc<Vec<Ray>>>,
    rays: Arc<Vec<Ray>>,
}

impl Camera {
    pub fn new(width: usize, height: usize, config: CameraConfig) -> Self {
        let resolution = config.resolution.max(1);
        Self {
            width,
            height,
            spacing: width as f64 / resolution as f64,
            projector: Projector::new(height as f64),
            key: None,
            frames: BoundedCache::new(config.cache_limit),
            rays: Arc::new(Vec::new()),
            config: CameraConfig {
                resolution,
                ..config
            },
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.spacing = width as f64 / self.config.resolution as f64;
        self.projector = Projector::new(height as f64);
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Screen pixels per column.
    #[inline]
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    /// Rays of the current frame, left to right.
    pub fn rays(&self) -> &[Ray] {
        &self.rays
    }

    pub fn cached_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn project(&self, wall_height: f64, angle_h: f64, angle_v: f64, distance: f64) -> Projection {
        self.projector.project(wall_height, angle_h, angle_v, distance)
    }

    /// Angle of `column` relative to the view direction.
    #[inline]
    pub fn column_angle(&self, column: usize) -> f64 {
        let x = column as f64 / self.config.resolution as f64 - 0.5;
        x.atan2(self.config.focal_length)
    }

    /// Brings the ray batch up to date with `pose`.
    ///
    /// Returns `false` when the pose is unchanged since the last call and the
    /// current batch was kept as is.
    pub fn update<M: Occupancy + Sync>(
        &mut self,
        pose: Pose,
        caster: &mut RayCaster<M>,
    ) -> Result<bool, CasterError> {
        let key = MovementKey::from(pose);
        if self.key == Some(key) {
            return Ok(false);
        }

        if self.config.frame_memo {
            if let Some(batch) = self.frames.get(&key) {
                self.rays = Arc::clone(batch);
                self.key = Some(key);
                return Ok(true);
            }
        }

        let batch = Arc::new(self.cast_batch(pose, caster)?);
        if self.config.frame_memo {
            self.frames.add(key, Arc::clone(&batch))?;
        }
        self.rays = batch;
        self.key = Some(key);
        Ok(true)
    }

    fn cast_batch<M: Occupancy + Sync>(
        &self,
        pose: Pose,
        caster: &mut RayCaster<M>,
    ) -> Result<Vec<Ray>, CasterError> {
        let origin = pose.point();
        let range = self.config.range;
        let columns = 0..self.config.resolution;

        if self.config.ray_memo {
            return columns
                .map(|column| -> Result<Ray, CasterError> {
                    let angle = self.column_angle(column);
                    Ok(caster.get(origin, pose.direction + angle, range)?.with_angle(angle))
                })
                .collect();
        }

        let caster = &*caster;
        let cast = |column: usize| {
            let angle = self.column_angle(column);
            caster
                .cast(origin, pose.direction + angle, range)
                .map(|ray| ray.with_angle(angle))
        };
        if self.config.parallel {
            columns.into_par_iter().map(cast).collect()
        } else {
            columns.map(cast).collect()
        }
    }

    /// Draws every column of the current batch.
    pub fn render<S, M, R>(&self, surface: &mut S, scene: &Scene<'_, M>, rng: &mut R)
    where
        S: Surface + ?Sized,
        M: Occupancy + ?Sized,
        R: Rng + ?Sized,
    {
        for (index, ray) in self.rays.iter().enumerate() {
            let column = Column::at(index, self.spacing);
            draw_column(surface, column, ray, &self.projector, scene, rng);
        }
    }
}
