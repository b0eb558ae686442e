use rand::Rng;

use crate::audio::{AudioSink, SoundCue};
use crate::framebuffer::pack_rgb;
use crate::texture::Texture;

pub const DEFAULT_AMBIENT_LIGHT: f64 = 5.0;
pub const DEFAULT_THUNDER_SEED: f64 = 8.0;
pub const DEFAULT_THUNDER_VOLUME: f32 = 0.5;

/// Brightness of a fresh lightning flash; decays at `FLASH_DECAY` per second.
const FLASH_LIGHT: f64 = 2.0;
const FLASH_DECAY: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rain {
    /// 0..100, higher means more streaks per column.
    pub amount: f64,
    pub disabled: bool,
}

impl Rain {
    pub fn is_active(&self) -> bool {
        self.amount > 0.0 && !self.disabled
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thunder {
    pub volume: f32,
    /// Mean seconds between flashes, roughly.
    pub seed: f64,
}

impl Default for Thunder {
    fn default() -> Self {
        Self {
            volume: DEFAULT_THUNDER_VOLUME,
            seed: DEFAULT_THUNDER_SEED,
        }
    }
}

/// Lighting and surface look of a level.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Extra brightness from lightning, subtracted from the distance fog.
    pub light: f64,
    /// Distance at which walls fade fully to black.
    pub ambient_light: f64,
    pub rain: Option<Rain>,
    pub thunder: Option<Thunder>,
    pub wall_color: u32,
    /// Indexed by cell value - 1.
    pub wall_textures: Vec<Texture>,
    pub ground_color: u32,
    pub ground_texture: Option<Texture>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            light: 0.0,
            ambient_light: DEFAULT_AMBIENT_LIGHT,
            rain: None,
            thunder: None,
            wall_color: pack_rgb(0, 0, 0),
            wall_textures: Vec::new(),
            ground_color: pack_rgb(0, 0, 0),
            ground_texture: None,
        }
    }
}

impl Environment {
    /// Fog overlay opacity for a step `distance` away with the given shading.
    #[inline]
    pub fn shade(&self, distance: f64, shading: u8) -> f64 {
        ((distance + f64::from(shading)) / self.ambient_light - self.light).max(0.0)
    }

    pub fn wall_texture(&self, cell: u8) -> Option<&Texture> {
        let index = usize::from(cell).checked_sub(1)?;
        self.wall_textures.get(index)
    }

    /// Advances lightning. Returns `true` when a new flash starts.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        seconds: f64,
        rng: &mut R,
        audio: &mut dyn AudioSink,
    ) -> bool {
        let Some(thunder) = self.thunder else {
            return false;
        };
        if thunder.volume <= 0.0 {
            return false;
        }

        if self.light > 0.0 {
            self.light = (self.light - FLASH_DECAY * seconds).max(0.0);
            return false;
        }

        if rng.gen_range(0.0..1.0) * thunder.seed < seconds {
            audio.play(SoundCue::Thunder, false, thunder.volume);
            self.light = FLASH_LIGHT;
            return true;
        }
        false
    }
}
