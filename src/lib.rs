//! Grid raycasting renderer.
//!
//! Rays are walked across a tile grid one cell boundary at a time
//! ([`caster`]); the camera casts one ray per screen column, keeps the batch
//! while the player stands still ([`camera`]), and the column renderer turns
//! each ray's steps into ground and wall slices on a [`render::Surface`].

pub mod audio;
pub mod cache;
pub mod camera;
pub mod caster;
pub mod clock;
pub mod config;
pub mod environment;
pub mod error;
pub mod framebuffer;
pub mod grid;
pub mod input;
pub mod player;
pub mod render;
pub mod texture;

pub use cache::BoundedCache;
pub use camera::{Camera, CameraConfig, Projection, Projector};
pub use caster::{Point, Ray, RayCaster, Step};
pub use config::EngineConfig;
pub use environment::Environment;
pub use error::{CacheError, CasterError, ConfigError, MapError, TextureError};
pub use framebuffer::FrameBuffer;
pub use grid::{GridMap, Occupancy};
pub use player::{Player, Pose};
pub use render::{Rect, Surface};
pub use texture::Texture;
