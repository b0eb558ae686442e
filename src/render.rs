//! Per-column compositing of a cast ray.

use rand::Rng;

use crate::camera::Projector;
use crate::caster::Ray;
use crate::environment::Environment;
use crate::grid::Occupancy;
use crate::texture::Texture;

/// Every wall is one cell tall.
pub const WALL_HEIGHT: f64 = 1.0;
/// Height of a rain streak relative to a wall.
const RAIN_HEIGHT: f64 = 0.1;
const RAIN_ALPHA: f64 = 0.15;

const BLACK: u32 = 0x000000;
const WHITE: u32 = 0xFFFFFF;

/// Pixel-space rectangle; may extend past the surface or be fractional.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

/// Drawing target for the column renderer.
pub trait Surface {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Fills `dst` with `color` at opacity `alpha` (clamped to 1).
    fn fill_rect(&mut self, dst: Rect, color: u32, alpha: f64);
    /// Copies the `src` region of `texture` stretched over `dst`.
    fn blit(&mut self, texture: &Texture, src: Rect, dst: Rect);
}

/// Horizontal span of one screen column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub left: f64,
    pub width: f64,
}

impl Column {
    pub fn at(index: usize, spacing: f64) -> Self {
        Self {
            left: (index as f64 * spacing).floor(),
            width: spacing.ceil(),
        }
    }
}

/// What a column is drawn against besides its ray.
pub struct Scene<'a, M: ?Sized> {
    pub environment: &'a Environment,
    pub map: &'a M,
    /// Vertical look, `Player::direction_v`.
    pub pitch: f64,
}

/// Draws one ray far to near: ground up to and including the wall step, the
/// wall slice at the first wall step, then optional rain streaks.
///
/// A ray without a wall step gets ground only.
pub fn draw_column<S, M, R>(
    surface: &mut S,
    column: Column,
    ray: &Ray,
    projector: &Projector,
    scene: &Scene<'_, M>,
    rng: &mut R,
) where
    S: Surface + ?Sized,
    M: Occupancy + ?Sized,
    R: Rng + ?Sized,
{
    let env = scene.environment;
    let hit = ray.hit();
    let Column { left, width } = column;

    for (s, step) in ray.iter().enumerate().rev() {
        let projection = projector.project(WALL_HEIGHT, ray.angle, scene.pitch, step.distance);
        let alpha = env.shade(step.distance, step.shading);

        if hit.is_none_or(|h| s <= h) {
            let dst = Rect::new(left, projection.bottom, width, projection.height);
            match &env.ground_texture {
                Some(ground) => {
                    if ground.is_loaded() {
                        let src = strip(ground, step.offset, 1.0);
                        surface.blit(ground, src, dst);
                    }
                    surface.fill_rect(dst, BLACK, alpha);
                }
                None => surface.fill_rect(dst, env.ground_color, alpha),
            }
        }

        if hit == Some(s) {
            let dst = Rect::new(left, projection.top, width, projection.height);
            let cell = scene
                .map
                .cell(step.mapx as f64, step.mapy as f64)
                .unwrap_or(0);
            match env.wall_texture(cell) {
                Some(texture) => {
                    if texture.is_loaded() {
                        let src = strip(texture, step.offset, WALL_HEIGHT);
                        surface.blit(texture, src, dst);
                    }
                }
                None => surface.fill_rect(dst, env.wall_color, 1.0),
            }
            surface.fill_rect(dst, BLACK, alpha);
        }

        if let Some(rain) = env.rain.filter(|rain| rain.is_active()) {
            // exponent stays non-negative so drops <= s
            let amount = rain.amount.min(100.0);
            let mut drops = rng.gen_range(0.0..1.0f64).powf(100.0 - amount) * s as f64;
            if drops > 0.0 {
                let streak = projector.project(RAIN_HEIGHT, ray.angle, scene.pitch, step.distance);
                loop {
                    drops -= 1.0;
                    if drops <= 0.0 {
                        break;
                    }
                    let y = rng.gen_range(0.0..1.0) * streak.top;
                    surface.fill_rect(Rect::new(left, y, 1.0, streak.height), WHITE, RAIN_ALPHA);
                }
            }
        }
    }
}

/// One-texel-wide vertical strip at `offset` across the texture.
fn strip(texture: &Texture, offset: f64, height: f64) -> Rect {
    Rect::new(
        texture.column_for(offset) as f64,
        0.0,
        1.0,
        texture.height() as f64 * height,
    )
}
